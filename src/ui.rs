use crate::models::UserStats;

pub fn render_index(stats: &UserStats) -> String {
    INDEX_HTML
        .replace("{{TOTAL}}", &stats.total_scans.to_string())
        .replace("{{CLEAR}}", &stats.clear_days.to_string())
        .replace("{{ISSUES}}", &stats.issues_detected.to_string())
        .replace("{{STREAK}}", &stats.streak.to_string())
        .replace("{{IMPROVEMENT}}", &stats.improvement.to_string())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Skin Scan</title>
  <style>
    :root {
      --bg: #f6f1ec;
      --ink: #2b2a28;
      --muted: #6b6660;
      --accent: #3d7f6e;
      --card: rgba(255, 255, 255, 0.9);
      --clear: #3c9d5d;
      --mild: #d9a521;
      --moderate: #e07b2e;
      --severe: #c8413a;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg), #e8efe9);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      display: grid;
      gap: 20px;
    }

    .card {
      background: var(--card);
      border-radius: 20px;
      padding: 24px;
      box-shadow: 0 16px 40px rgba(43, 42, 40, 0.1);
    }

    h1 {
      margin: 0 0 4px;
    }

    .subtitle,
    .meta {
      color: var(--muted);
      margin: 0;
    }

    .stats {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(140px, 1fr));
      gap: 12px;
    }

    .stat strong {
      display: block;
      font-size: 1.8rem;
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 10px 20px;
      background: var(--accent);
      color: white;
      font-weight: 600;
      cursor: pointer;
    }

    button:disabled {
      opacity: 0.5;
      cursor: progress;
    }

    button.ghost {
      background: transparent;
      color: var(--severe);
      padding: 4px 10px;
    }

    .status {
      min-height: 1.2em;
      font-size: 0.9rem;
    }

    .status.error {
      color: var(--severe);
    }

    ul.history {
      list-style: none;
      padding: 0;
      margin: 0;
      display: grid;
      gap: 10px;
    }

    ul.history li {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 12px;
      border-bottom: 1px solid #e6e0da;
      padding-bottom: 8px;
    }

    .badge {
      border-radius: 999px;
      padding: 2px 10px;
      color: white;
      font-size: 0.8rem;
    }

    .badge.Clear { background: var(--clear); }
    .badge.Mild { background: var(--mild); }
    .badge.Moderate { background: var(--moderate); }
    .badge.Severe { background: var(--severe); }
  </style>
</head>
<body>
  <main class="app">
    <header class="card">
      <h1>Skin Scan</h1>
      <p class="subtitle">Upload a photo to detect skin conditions and track your history.</p>
    </header>

    <section class="card stats">
      <div class="stat"><strong id="total">{{TOTAL}}</strong>Total scans</div>
      <div class="stat"><strong id="clear">{{CLEAR}}</strong>Clear days</div>
      <div class="stat"><strong id="issues">{{ISSUES}}</strong>Issues detected</div>
      <div class="stat"><strong id="streak">{{STREAK}}</strong>Day streak</div>
      <div class="stat"><strong id="improvement">{{IMPROVEMENT}}%</strong>Improvement</div>
    </section>

    <section class="card">
      <form id="detect-form">
        <input id="file" type="file" accept="image/*" />
        <button id="detect" type="submit">Detect</button>
      </form>
      <p id="status" class="status"></p>
      <p id="result" class="meta"></p>
    </section>

    <section class="card">
      <h2>History</h2>
      <ul id="history" class="history"></ul>
    </section>
  </main>

  <script>
    const statusEl = document.getElementById('status');
    const resultEl = document.getElementById('result');
    const historyEl = document.getElementById('history');
    const fileEl = document.getElementById('file');
    const detectBtn = document.getElementById('detect');

    const setStatus = (message, tone) => {
      statusEl.textContent = message;
      statusEl.className = 'status ' + (tone || '');
    };

    const renderStats = (stats) => {
      document.getElementById('total').textContent = stats.totalScans;
      document.getElementById('clear').textContent = stats.clearDays;
      document.getElementById('issues').textContent = stats.issuesDetected;
      document.getElementById('streak').textContent = stats.streak;
      document.getElementById('improvement').textContent = stats.improvement + '%';
    };

    const renderHistory = (scans) => {
      historyEl.innerHTML = '';
      scans.forEach((scan) => {
        const item = document.createElement('li');
        const label = document.createElement('div');
        const conditions = scan.conditions.length ? scan.conditions.join(', ') : 'No conditions';
        label.innerHTML = '<span class="badge ' + scan.severity + '">' + scan.severity + '</span> ';
        label.append(scan.date + ' ' + scan.time + ' · ' + conditions + ' · ' + scan.confidence + '%');
        const remove = document.createElement('button');
        remove.className = 'ghost';
        remove.textContent = 'Delete';
        remove.addEventListener('click', () => deleteScan(scan.id).catch((err) => setStatus(err.message, 'error')));
        item.append(label, remove);
        historyEl.append(item);
      });
    };

    const refresh = async () => {
      const [scansRes, statsRes] = await Promise.all([fetch('/api/scans'), fetch('/api/stats')]);
      if (!scansRes.ok || !statsRes.ok) {
        throw new Error('Unable to load history');
      }
      renderHistory(await scansRes.json());
      renderStats(await statsRes.json());
    };

    const deleteScan = async (id) => {
      const res = await fetch('/api/scans/' + encodeURIComponent(id), { method: 'DELETE' });
      if (!res.ok) {
        throw new Error('Delete failed');
      }
      await refresh();
    };

    const readAsDataUrl = (file) => new Promise((resolve, reject) => {
      const reader = new FileReader();
      reader.onload = () => resolve(reader.result);
      reader.onerror = () => reject(new Error('Unable to read file'));
      reader.readAsDataURL(file);
    });

    document.getElementById('detect-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const file = fileEl.files[0];
      if (!file) {
        setStatus('No image selected. Please upload an image before detecting.', 'error');
        return;
      }

      detectBtn.disabled = true;
      setStatus('Analyzing...', '');
      try {
        const image = await readAsDataUrl(file);
        const res = await fetch('/api/detect', {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({ image, imageName: file.name, imageSize: Math.ceil(file.size / 1024) })
        });
        if (!res.ok) {
          throw new Error((await res.text()) || 'Detection failed');
        }
        const { scan, stats } = await res.json();
        const count = scan.conditions.length;
        resultEl.textContent = 'Found ' + count + ' condition' + (count === 1 ? '' : 's') + ' (' + scan.severity + ')';
        renderStats(stats);
        await refresh();
        setStatus('Detection complete', '');
      } catch (err) {
        setStatus(err.message, 'error');
      } finally {
        detectBtn.disabled = false;
      }
    });

    refresh().catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_fills_in_stats() {
        let stats = UserStats {
            total_scans: 11,
            clear_days: 4,
            issues_detected: 7,
            improvement: 18,
            streak: 2,
            member_since: "2023-06-15".to_string(),
        };
        let html = render_index(&stats);
        assert!(html.contains(r#"<strong id="total">11</strong>"#));
        assert!(html.contains(r#"<strong id="improvement">18%</strong>"#));
        assert!(!html.contains("{{"));
    }
}

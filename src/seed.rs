use crate::models::{NewScan, Severity};
use crate::stats::date_key;
use chrono::{Duration, NaiveDate};
use rand::Rng;
use rand::seq::{SliceRandom, index};

const HISTORY_DAYS: usize = 30;

pub const CONDITIONS: [&str; 8] = [
    "Acne",
    "Blackheads",
    "Whiteheads",
    "Cysts",
    "Papules",
    "Pustules",
    "Dark Spots",
    "Pigmentation",
];

const TIMES: [&str; 7] = [
    "8:30 AM", "9:15 AM", "10:45 AM", "2:20 PM", "4:30 PM", "7:45 PM", "9:00 PM",
];

// Cumulative: 40% Clear, 30% Mild, 20% Moderate, 10% Severe.
const SEVERITY_WEIGHTS: [(Severity, f64); 4] = [
    (Severity::Clear, 0.4),
    (Severity::Mild, 0.7),
    (Severity::Moderate, 0.9),
    (Severity::Severe, 1.0),
];

const CLEAR_NOTES: [&str; 5] = [
    "Skin looks healthy and clear today",
    "No visible issues detected",
    "Excellent skin condition, keep up the routine",
    "Skin appears well maintained",
    "Skin looks fresh and radiant today",
];

const MILD_NOTES: [&str; 5] = [
    "Minor concerns detected in the T-zone",
    "Slight breakouts noticed, common in humid weather",
    "A few small spots, try a gentle cleanser",
    "Light pigmentation spots visible",
    "Few blackheads around the nose",
];

const MODERATE_NOTES: [&str; 5] = [
    "Several skin issues detected, needs attention",
    "Moderate breakouts in multiple areas",
    "Noticeable acne and pigmentation concerns",
    "Multiple conditions identified, consider a dermatologist visit",
    "Consistent treatment recommended",
];

const SEVERE_NOTES: [&str; 5] = [
    "Significant skin issues detected, consult a dermatologist",
    "Multiple severe conditions present",
    "Professional treatment recommended",
    "Severe concerns identified, visit a skin specialist",
    "Immediate dermatological attention recommended",
];

/// Synthetic history: 8 to 12 scans on distinct days within the last 30, newest first.
pub fn generate_history<R: Rng + ?Sized>(today: NaiveDate, rng: &mut R) -> Vec<NewScan> {
    let count = rng.gen_range(8..=12);
    let mut offsets: Vec<usize> = index::sample(rng, HISTORY_DAYS, count).into_vec();
    offsets.sort_unstable();

    offsets
        .into_iter()
        .map(|offset| {
            let date = date_key(today - Duration::days(offset as i64));
            synthetic_scan(date, rng)
        })
        .collect()
}

pub fn pick_severity(roll: f64) -> Severity {
    SEVERITY_WEIGHTS
        .iter()
        .find(|(_, cumulative)| roll <= *cumulative)
        .map(|(severity, _)| *severity)
        .unwrap_or(Severity::Severe)
}

pub fn notes_for<R: Rng + ?Sized>(severity: Severity, rng: &mut R) -> String {
    let pool: &[&str] = match severity {
        Severity::Clear => &CLEAR_NOTES,
        Severity::Mild => &MILD_NOTES,
        Severity::Moderate => &MODERATE_NOTES,
        Severity::Severe => &SEVERE_NOTES,
    };
    pool.choose(rng).copied().unwrap_or_default().to_string()
}

fn synthetic_scan<R: Rng + ?Sized>(date: String, rng: &mut R) -> NewScan {
    let severity = pick_severity(rng.r#gen::<f64>());

    let conditions: Vec<String> = if severity == Severity::Clear {
        Vec::new()
    } else {
        let amount = rng.gen_range(1..=3);
        CONDITIONS
            .choose_multiple(rng, amount)
            .map(|label| label.to_string())
            .collect()
    };

    let confidence = match severity {
        Severity::Clear => rng.gen_range(92..=99),
        Severity::Mild => rng.gen_range(80..=89),
        Severity::Moderate => rng.gen_range(75..=84),
        Severity::Severe => rng.gen_range(70..=77),
    };

    let time = TIMES.choose(rng).copied().unwrap_or(TIMES[0]).to_string();

    NewScan {
        image_name: format!("skin_scan_{date}.jpg"),
        date,
        time,
        conditions,
        severity,
        confidence,
        image_url: "/placeholder.svg".to_string(),
        image_size: rng.gen_range(200..700),
        notes: notes_for(severity, rng),
    }
}

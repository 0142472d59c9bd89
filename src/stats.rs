use crate::models::{
    AnalyticsResponse, ConditionShare, MonthlyPoint, ScanRecord, Severity, SeverityWeek,
    UserStats, WeekdayPoint,
};
use chrono::{Datelike, Duration, Local, NaiveDate};
use rand::Rng;
use std::collections::{BTreeMap, HashSet};

pub const MEMBER_SINCE: &str = "2023-06-15";

const STREAK_WINDOW_DAYS: i64 = 30;
const MONTH_COUNT: usize = 6;
const TREND_WEEKS: usize = 4;
const TOP_CONDITIONS: usize = 5;
const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub fn recompute<R: Rng + ?Sized>(records: &[ScanRecord], rng: &mut R) -> UserStats {
    recompute_at(Local::now().date_naive(), records, rng)
}

pub fn recompute_at<R: Rng + ?Sized>(
    today: NaiveDate,
    records: &[ScanRecord],
    rng: &mut R,
) -> UserStats {
    let clear_days = records
        .iter()
        .filter(|record| record.severity == Severity::Clear)
        .count();
    let issues_detected = records
        .iter()
        .filter(|record| !record.conditions.is_empty())
        .count();

    UserStats {
        total_scans: records.len() as u64,
        clear_days: clear_days as u64,
        issues_detected: issues_detected as u64,
        improvement: placeholder_improvement(rng),
        streak: streak_at(today, records),
        member_since: MEMBER_SINCE.to_string(),
    }
}

/// Placeholder: a uniform draw in [15, 25). Not derived from scan history.
pub fn placeholder_improvement<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(15..25)
}

/// Consecutive days with at least one scan, counting back from `today`.
pub fn streak_at(today: NaiveDate, records: &[ScanRecord]) -> u32 {
    let dates: HashSet<&str> = records.iter().map(|record| record.date.as_str()).collect();

    let mut streak = 0;
    for offset in 0..STREAK_WINDOW_DAYS {
        let date = today - Duration::days(offset);
        if !dates.contains(date_key(date).as_str()) {
            break;
        }
        streak += 1;
    }
    streak
}

/// Per-month totals, oldest first, limited to the latest six months present.
pub fn monthly(records: &[ScanRecord]) -> Vec<MonthlyPoint> {
    let mut months: BTreeMap<&str, (u64, u64, u64)> = BTreeMap::new();
    for record in records {
        let Some(month) = record.date.get(..7) else {
            continue;
        };
        let entry = months.entry(month).or_default();
        entry.0 += 1;
        if record.severity == Severity::Clear {
            entry.1 += 1;
        } else {
            entry.2 += 1;
        }
    }

    let skip = months.len().saturating_sub(MONTH_COUNT);
    months
        .into_iter()
        .skip(skip)
        .map(|(month, (scans, clear, issues))| MonthlyPoint {
            month: month.to_string(),
            label: month_label(month),
            scans,
            clear,
            issues,
        })
        .collect()
}

pub fn build_analytics(records: &[ScanRecord]) -> AnalyticsResponse {
    build_analytics_at(Local::now().date_naive(), records)
}

pub fn build_analytics_at(today: NaiveDate, records: &[ScanRecord]) -> AnalyticsResponse {
    let clear = records
        .iter()
        .filter(|record| record.severity == Severity::Clear)
        .count();
    let confidence_sum: u64 = records.iter().map(|record| u64::from(record.confidence)).sum();
    let average_confidence = if records.is_empty() {
        0
    } else {
        (confidence_sum as f64 / records.len() as f64).round() as u32
    };

    AnalyticsResponse {
        clear_rate: percentage(clear as u64, records.len() as u64),
        average_confidence,
        top_conditions: top_conditions(records),
        weekly_trend: weekly_trend(today, records),
        last_7_days: last_7_days(today, records),
    }
}

/// Most frequent labels with their share of all detected labels. Ties keep
/// first appearance order.
fn top_conditions(records: &[ScanRecord]) -> Vec<ConditionShare> {
    let mut counts: Vec<(&str, u64)> = Vec::new();
    for condition in records.iter().flat_map(|record| record.conditions.iter()) {
        match counts.iter_mut().find(|(label, _)| *label == condition.as_str()) {
            Some((_, count)) => *count += 1,
            None => counts.push((condition.as_str(), 1)),
        }
    }

    let total: u64 = counts.iter().map(|(_, count)| count).sum();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(TOP_CONDITIONS)
        .map(|(condition, count)| ConditionShare {
            condition: condition.to_string(),
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

/// Severity counts for the last four weeks. "Week 1" is the seven days ending today.
fn weekly_trend(today: NaiveDate, records: &[ScanRecord]) -> Vec<SeverityWeek> {
    let mut weeks: Vec<SeverityWeek> = (1..=TREND_WEEKS)
        .map(|number| SeverityWeek {
            week: format!("Week {number}"),
            clear: 0,
            mild: 0,
            moderate: 0,
            severe: 0,
        })
        .collect();

    for record in records {
        let Some(age) = days_ago(today, &record.date) else {
            continue;
        };
        let Some(week) = weeks.get_mut((age / 7) as usize) else {
            continue;
        };
        match record.severity {
            Severity::Clear => week.clear += 1,
            Severity::Mild => week.mild += 1,
            Severity::Moderate => week.moderate += 1,
            Severity::Severe => week.severe += 1,
        }
    }
    weeks
}

/// Scans and scans with issues per weekday, Monday first, over the seven days ending today.
fn last_7_days(today: NaiveDate, records: &[ScanRecord]) -> Vec<WeekdayPoint> {
    let mut days: Vec<WeekdayPoint> = WEEKDAYS
        .iter()
        .map(|day| WeekdayPoint {
            day: day.to_string(),
            scans: 0,
            issues: 0,
        })
        .collect();

    for record in records {
        let Some(date) = parse_date(&record.date) else {
            continue;
        };
        if !(0..7).contains(&(today - date).num_days()) {
            continue;
        }
        let point = &mut days[date.weekday().num_days_from_monday() as usize];
        point.scans += 1;
        if record.severity != Severity::Clear {
            point.issues += 1;
        }
    }
    days
}

fn percentage(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

fn days_ago(today: NaiveDate, date: &str) -> Option<i64> {
    let age = (today - parse_date(date)?).num_days();
    (age >= 0).then_some(age)
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn month_label(month: &str) -> String {
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map(|date| date.format("%b").to_string())
        .unwrap_or_else(|_| month.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn record(date: NaiveDate, conditions: &[&str]) -> ScanRecord {
        let conditions: Vec<String> = conditions.iter().map(|c| c.to_string()).collect();
        ScanRecord {
            id: format!("scan_{date}_{}", conditions.len()),
            date: date_key(date),
            time: "9:15 AM".to_string(),
            severity: Severity::from_condition_count(conditions.len()),
            conditions,
            confidence: 90,
            image_url: "/placeholder.svg".to_string(),
            image_name: "face.jpg".to_string(),
            image_size: 300,
            notes: String::new(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    #[test]
    fn streak_stops_at_first_gap() {
        let today = today();
        let records = vec![
            record(today, &[]),
            record(today - Duration::days(1), &["acne"]),
            record(today - Duration::days(3), &[]),
        ];
        assert_eq!(streak_at(today, &records), 2);
    }

    #[test]
    fn streak_is_zero_without_a_scan_today() {
        let today = today();
        let records = vec![record(today - Duration::days(1), &[])];
        assert_eq!(streak_at(today, &records), 0);
        assert_eq!(streak_at(today, &[]), 0);
    }

    #[test]
    fn streak_caps_at_thirty_days() {
        let today = today();
        let records: Vec<_> = (0..45)
            .map(|offset| record(today - Duration::days(offset), &[]))
            .collect();
        assert_eq!(streak_at(today, &records), 30);
    }

    #[test]
    fn counters_are_stable_across_recomputation() {
        let today = today();
        let records = vec![
            record(today, &[]),
            record(today, &["acne", "cysts"]),
            record(today - Duration::days(2), &["acne"]),
        ];
        let mut rng = StdRng::seed_from_u64(7);

        let first = recompute_at(today, &records, &mut rng);
        let second = recompute_at(today, &records, &mut rng);

        assert_eq!(first.total_scans, 3);
        assert_eq!(first.clear_days, 1);
        assert_eq!(first.issues_detected, 2);
        assert_eq!(first.streak, 1);
        assert_eq!(
            (first.total_scans, first.clear_days, first.issues_detected),
            (second.total_scans, second.clear_days, second.issues_detected)
        );
        assert!((15..25).contains(&first.improvement));
        assert_eq!(first.member_since, MEMBER_SINCE);
    }

    #[test]
    fn monthly_keeps_latest_six_sorted() {
        let mut records = Vec::new();
        for month in 1..=8 {
            let date = NaiveDate::from_ymd_opt(2025, month, 10).unwrap();
            records.push(record(date, &[]));
            records.push(record(date, &["acne"]));
        }
        records.reverse();

        let points = monthly(&records);
        assert_eq!(points.len(), 6);
        assert_eq!(points[0].month, "2025-03");
        assert_eq!(points[0].label, "Mar");
        assert_eq!(points[5].month, "2025-08");
        assert!(points.iter().all(|p| p.scans == 2 && p.clear == 1 && p.issues == 1));
    }

    #[test]
    fn analytics_rates_round_to_whole_percent() {
        let today = today();
        let mut records = vec![
            record(today, &["Acne", "Cysts"]),
            record(today, &["Acne"]),
            record(today - Duration::days(1), &[]),
        ];
        records[0].confidence = 88;
        records[1].confidence = 90;
        records[2].confidence = 91;

        let analytics = build_analytics_at(today, &records);
        assert_eq!(analytics.clear_rate, 33);
        assert_eq!(analytics.average_confidence, 90);
        assert_eq!(analytics.top_conditions.len(), 2);
        assert_eq!(analytics.top_conditions[0].condition, "Acne");
        assert_eq!(analytics.top_conditions[0].count, 2);
        assert_eq!(analytics.top_conditions[0].percentage, 67);
        assert_eq!(analytics.top_conditions[1].percentage, 33);
    }

    #[test]
    fn analytics_of_empty_history_is_zeroed() {
        let analytics = build_analytics_at(today(), &[]);
        assert_eq!(analytics.clear_rate, 0);
        assert_eq!(analytics.average_confidence, 0);
        assert!(analytics.top_conditions.is_empty());
        assert_eq!(analytics.weekly_trend.len(), 4);
        assert_eq!(analytics.last_7_days.len(), 7);
    }

    #[test]
    fn top_conditions_keep_five_most_frequent() {
        let today = today();
        let records = vec![
            record(today, &["G"]),
            record(today, &["A", "B", "C", "D", "E", "F"]),
            record(today, &["B", "C", "D", "E", "F"]),
            record(today, &["C", "D", "E", "F"]),
            record(today, &["D", "E"]),
        ];

        let labels: Vec<_> = build_analytics_at(today, &records)
            .top_conditions
            .into_iter()
            .map(|share| (share.condition, share.count))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("D".to_string(), 4),
                ("E".to_string(), 4),
                ("C".to_string(), 3),
                ("F".to_string(), 3),
                ("B".to_string(), 2),
            ]
        );
    }

    #[test]
    fn weekly_trend_buckets_by_age() {
        let today = today();
        let records = vec![
            record(today + Duration::days(1), &[]),
            record(today, &[]),
            record(today - Duration::days(6), &["Acne"]),
            record(today - Duration::days(7), &["Acne", "Cysts"]),
            record(today - Duration::days(27), &["Acne", "Cysts", "Papules"]),
            record(today - Duration::days(28), &[]),
        ];

        let trend = build_analytics_at(today, &records).weekly_trend;
        assert_eq!(trend[0].week, "Week 1");
        assert_eq!((trend[0].clear, trend[0].mild), (1, 1));
        assert_eq!(trend[1].moderate, 1);
        assert_eq!(trend[2], SeverityWeek {
            week: "Week 3".to_string(),
            clear: 0,
            mild: 0,
            moderate: 0,
            severe: 0,
        });
        assert_eq!(trend[3].severe, 1);
        assert_eq!(trend.iter().map(|w| w.clear).sum::<u64>(), 1);
    }

    #[test]
    fn last_7_days_groups_by_weekday() {
        // 2026-01-05 is a Monday.
        let today = today();
        let records = vec![
            record(today, &[]),
            record(today, &["Acne"]),
            record(today - Duration::days(1), &["Cysts"]),
            record(today - Duration::days(7), &["Acne"]),
        ];

        let days = build_analytics_at(today, &records).last_7_days;
        assert_eq!(days[0].day, "Mon");
        assert_eq!((days[0].scans, days[0].issues), (2, 1));
        assert_eq!(days[6].day, "Sun");
        assert_eq!((days[6].scans, days[6].issues), (1, 1));
        assert_eq!(days.iter().map(|d| d.scans).sum::<u64>(), 3);
    }
}

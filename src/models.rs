use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Clear,
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Clear,
        Severity::Mild,
        Severity::Moderate,
        Severity::Severe,
    ];

    /// Fixed thresholds: 0 → Clear, 1 → Mild, 2 → Moderate, 3+ → Severe.
    pub fn from_condition_count(count: usize) -> Self {
        match count {
            0 => Severity::Clear,
            1 => Severity::Mild,
            2 => Severity::Moderate,
            _ => Severity::Severe,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Clear => "Clear",
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub id: String,
    pub date: String,
    pub time: String,
    pub conditions: Vec<String>,
    pub severity: Severity,
    pub confidence: u8,
    pub image_url: String,
    pub image_name: String,
    pub image_size: u64,
    pub notes: String,
}

/// A scan before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScan {
    pub date: String,
    pub time: String,
    pub conditions: Vec<String>,
    pub severity: Severity,
    pub confidence: u8,
    pub image_url: String,
    pub image_name: String,
    pub image_size: u64,
    pub notes: String,
}

impl NewScan {
    pub fn with_id(self, id: String) -> ScanRecord {
        ScanRecord {
            id,
            date: self.date,
            time: self.time,
            conditions: self.conditions,
            severity: self.severity,
            confidence: self.confidence,
            image_url: self.image_url,
            image_name: self.image_name,
            image_size: self.image_size,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_scans: u64,
    pub clear_days: u64,
    pub issues_detected: u64,
    pub improvement: u32,
    pub streak: u32,
    pub member_since: String,
}

impl UserStats {
    pub fn empty(member_since: String) -> Self {
        Self {
            total_scans: 0,
            clear_days: 0,
            issues_detected: 0,
            improvement: 0,
            streak: 0,
            member_since,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub month: String,
    pub label: String,
    pub scans: u64,
    pub clear: u64,
    pub issues: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectRequest {
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub image_name: Option<String>,
    #[serde(default)]
    pub image_size: Option<u64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionShare {
    pub condition: String,
    pub count: u64,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeverityWeek {
    pub week: String,
    pub clear: u64,
    pub mild: u64,
    pub moderate: u64,
    pub severe: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayPoint {
    pub day: String,
    pub scans: u64,
    pub issues: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub clear_rate: u32,
    pub average_confidence: u32,
    pub top_conditions: Vec<ConditionShare>,
    pub weekly_trend: Vec<SeverityWeek>,
    pub last_7_days: Vec<WeekdayPoint>,
}

#[derive(Debug, Serialize)]
pub struct DetectResponse {
    pub scan: ScanRecord,
    pub stats: UserStats,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScanQuery {
    pub severity: Option<String>,
    pub q: Option<String>,
}

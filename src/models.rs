use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::FormulaVariant;

/// One reported emotional state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodSample {
    pub mood: String,
    #[serde(default, alias = "recorded_at")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A mood history entry as callers send it: a bare label or a timestamped sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MoodInput {
    Label(String),
    Sample(MoodSample),
}

impl MoodInput {
    pub fn label(&self) -> &str {
        match self {
            MoodInput::Label(label) => label,
            MoodInput::Sample(sample) => &sample.mood,
        }
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            MoodInput::Label(_) => None,
            MoodInput::Sample(sample) => sample.timestamp,
        }
    }
}

/// Raw activity signals for one employee. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeSignalSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meetings_attended: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekend_activity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_response_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_history: Option<Vec<MoodInput>>,
}

impl EmployeeSignalSnapshot {
    /// Mood labels oldest first. Timestamped histories are ordered by time;
    /// anything else keeps the order it arrived in.
    pub fn mood_labels(&self) -> Vec<String> {
        let Some(history) = &self.mood_history else {
            return Vec::new();
        };

        let mut entries: Vec<&MoodInput> = history.iter().collect();
        if entries.iter().all(|entry| entry.timestamp().is_some()) {
            entries.sort_by_key(|entry| entry.timestamp());
        }
        entries.iter().map(|entry| entry.label().to_string()).collect()
    }

    #[cfg(test)]
    pub fn with_mood_labels(mut self, labels: Vec<String>) -> Self {
        self.mood_history = Some(labels.into_iter().map(MoodInput::Label).collect());
        self
    }
}

/// Ordinal burnout risk, declared from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
            RiskTier::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub raw_total: f64,
    pub mood_trend: f64,
    pub work_life_balance: f64,
    pub communication: f64,
    pub stress_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnoutAssessment {
    pub score: f64,
    pub risk_tier: RiskTier,
    pub risk_factors: BTreeSet<String>,
    pub confidence: f64,
    pub formula: FormulaVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}

/// A stored mood sample together with the score recorded alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub mood: String,
    #[serde(default)]
    pub burnout_score: Option<f64>,
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Score assumed for a team member whose record carries none.
pub const NEUTRAL_MEMBER_SCORE: f64 = 50.0;

fn neutral_member_score() -> f64 {
    NEUTRAL_MEMBER_SCORE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "neutral_member_score", alias = "burnout_score")]
    pub score: f64,
    #[serde(default, alias = "current_mood")]
    pub mood: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyTrend {
    pub day: NaiveDate,
    pub avg_score: f64,
    pub entry_count: i64,
    pub most_common_mood: String,
}

/// Rounds to `places` decimals. Exact ties go to the even neighbour, so
/// `91.25` becomes `91.2` and `0.625` becomes `0.62`.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}

use std::collections::BTreeSet;

use crate::config::{RiskBreakpoints, ScoringConfig};
use crate::models::{round_to, EmployeeSignalSnapshot, RiskTier};

pub const OVERTIME: &str = "Excessive overtime hours";
pub const WEEKEND_WORK: &str = "Working on weekends";
pub const SLOW_RESPONSE: &str = "Delayed communication response";
pub const NEGATIVE_MOODS: &str = "Persistent negative mood patterns";
pub const LOW_ATTENDANCE: &str = "Low meeting attendance";
pub const HIGH_IDLE: &str = "High idle time indicating disengagement";

const CONFIDENCE_FIELDS: f64 = 8.0;

pub fn classify(score: f64, breakpoints: &RiskBreakpoints) -> RiskTier {
    if score < breakpoints.critical_below {
        RiskTier::Critical
    } else if score < breakpoints.high_below {
        RiskTier::High
    } else if score < breakpoints.medium_below {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

pub fn identify_factors(
    snapshot: &EmployeeSignalSnapshot,
    config: &ScoringConfig,
) -> BTreeSet<String> {
    let defaults = &config.defaults;
    let limits = &config.factors;
    let mut factors = BTreeSet::new();

    if snapshot.work_hours.unwrap_or(defaults.work_hours) > limits.overtime_hours {
        factors.insert(OVERTIME.to_string());
    }

    if snapshot.weekend_activity.unwrap_or(defaults.weekend_activity) > limits.weekend_hours {
        factors.insert(WEEKEND_WORK.to_string());
    }

    if snapshot.avg_response_time.unwrap_or(defaults.avg_response_time) > limits.response_hours {
        factors.insert(SLOW_RESPONSE.to_string());
    }

    let moods = snapshot.mood_labels();
    let start = moods.len().saturating_sub(limits.negative_mood_window);
    let negative = moods[start..]
        .iter()
        .filter(|m| config.moods.is_negative(m))
        .count();
    if !moods.is_empty() && negative >= limits.negative_mood_count {
        factors.insert(NEGATIVE_MOODS.to_string());
    }

    if snapshot.meetings_attended.unwrap_or(defaults.meetings_attended) < limits.min_meetings {
        factors.insert(LOW_ATTENDANCE.to_string());
    }

    if snapshot.idle_time.unwrap_or(defaults.idle_time) > limits.idle_hours {
        factors.insert(HIGH_IDLE.to_string());
    }

    factors
}

/// Fraction of the eight expected inputs that were actually supplied.
pub fn confidence(snapshot: &EmployeeSignalSnapshot) -> f64 {
    let history_len = snapshot.mood_history.as_ref().map_or(0, |h| h.len());
    let present = [
        snapshot.idle_time.is_some(),
        snapshot.meetings_attended.is_some(),
        snapshot.login_count.is_some(),
        history_len > 0,
        snapshot.work_hours.is_some(),
        snapshot.weekend_activity.is_some(),
        snapshot.avg_response_time.is_some(),
        history_len >= 5,
    ]
    .iter()
    .filter(|p| **p)
    .count();

    round_to(present as f64 / CONFIDENCE_FIELDS, 2)
}

use crate::config::{BalanceParams, MoodSets};
use crate::models::HistoryEntry;

const NEUTRAL_ENGAGEMENT: f64 = 50.0;

/// Work-life balance in [0, 1]. Deviation from the baseline day is penalized
/// both ways, weekend hours only past the free allowance.
pub fn work_life_balance(work_hours: f64, weekend_activity: f64, params: &BalanceParams) -> f64 {
    let hours_score =
        (1.0 - (work_hours - params.baseline_hours).abs() / params.baseline_hours).max(0.0);
    let weekend_overflow = (weekend_activity - params.free_weekend_hours).max(0.0);
    let weekend_score = (1.0 - weekend_overflow / params.weekend_penalty_span).max(0.0);
    (hours_score + weekend_score) / 2.0
}

/// Communication responsiveness in [0, 1]; zero at or past the response ceiling.
pub fn communication(avg_response_time: f64, params: &BalanceParams) -> f64 {
    ((params.response_ceiling - avg_response_time) / params.response_ceiling).max(0.0)
}

/// Mood-adjusted mean of the most recent recorded scores.
pub fn engagement(entries: &[HistoryEntry], sets: &MoodSets) -> f64 {
    if entries.is_empty() {
        return NEUTRAL_ENGAGEMENT;
    }

    let start = entries.len().saturating_sub(sets.recent_window);
    let recent = &entries[start..];
    let total: f64 = recent
        .iter()
        .map(|entry| {
            let score = entry.burnout_score.unwrap_or(NEUTRAL_ENGAGEMENT);
            if sets.is_engaged(&entry.mood) {
                score * 1.2
            } else if sets.is_steady(&entry.mood) {
                score
            } else {
                score * 0.8
            }
        })
        .sum();

    total / recent.len() as f64
}

/// Share of the most recent samples that report a stress mood.
pub fn stress_level(labels: &[String], sets: &MoodSets) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }

    let start = labels.len().saturating_sub(sets.recent_window);
    let recent = &labels[start..];
    let stressed = recent.iter().filter(|m| sets.is_stress(m)).count();
    stressed as f64 / recent.len() as f64
}

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mood::MoodLexicon;

/// Which burnout formula the composite scorer applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaVariant {
    /// Activity base plus mood trend, work-life balance and communication terms.
    #[default]
    Predictive,
    /// Activity base only, clamped to [0, 100].
    ActivityOnly,
}

impl FormulaVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormulaVariant::Predictive => "predictive",
            FormulaVariant::ActivityOnly => "activity_only",
        }
    }
}

/// Values substituted for snapshot fields the caller did not supply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalDefaults {
    pub idle_time: f64,
    pub meetings_attended: f64,
    pub login_count: f64,
    pub work_hours: f64,
    pub weekend_activity: f64,
    pub avg_response_time: f64,
}

impl Default for SignalDefaults {
    fn default() -> Self {
        SignalDefaults {
            idle_time: 0.0,
            meetings_attended: 5.0,
            login_count: 3.0,
            work_hours: 8.0,
            weekend_activity: 0.0,
            avg_response_time: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub idle_time: f64,
    pub meetings: f64,
    pub meeting_baseline: f64,
    pub logins: f64,
    pub login_baseline: f64,
    pub mood_trend: f64,
    pub work_life_balance: f64,
    pub communication: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            idle_time: 2.0,
            meetings: 3.0,
            meeting_baseline: 5.0,
            logins: 4.0,
            login_baseline: 3.0,
            mood_trend: 30.0,
            work_life_balance: 20.0,
            communication: 15.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceParams {
    pub baseline_hours: f64,
    pub free_weekend_hours: f64,
    pub weekend_penalty_span: f64,
    pub response_ceiling: f64,
}

impl Default for BalanceParams {
    fn default() -> Self {
        BalanceParams {
            baseline_hours: 8.0,
            free_weekend_hours: 2.0,
            weekend_penalty_span: 8.0,
            response_ceiling: 4.0,
        }
    }
}

/// Upper bounds (exclusive) of the Critical, High and Medium tiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskBreakpoints {
    pub critical_below: f64,
    pub high_below: f64,
    pub medium_below: f64,
}

impl Default for RiskBreakpoints {
    fn default() -> Self {
        RiskBreakpoints {
            critical_below: 40.0,
            high_below: 60.0,
            medium_below: 75.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorThresholds {
    pub overtime_hours: f64,
    pub weekend_hours: f64,
    pub response_hours: f64,
    pub negative_mood_window: usize,
    pub negative_mood_count: usize,
    pub min_meetings: f64,
    pub idle_hours: f64,
}

impl Default for FactorThresholds {
    fn default() -> Self {
        FactorThresholds {
            overtime_hours: 10.0,
            weekend_hours: 4.0,
            response_hours: 6.0,
            negative_mood_window: 5,
            negative_mood_count: 3,
            min_meetings: 2.0,
            idle_hours: 4.0,
        }
    }
}

/// Mood label groups used by the checklist, factor scorers and team rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodSets {
    pub negative: Vec<String>,
    pub stress: Vec<String>,
    pub engaged: Vec<String>,
    pub steady: Vec<String>,
    /// Window for the engagement and stress factor scorers.
    pub recent_window: usize,
}

impl Default for MoodSets {
    fn default() -> Self {
        let labels = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        MoodSets {
            negative: labels(&["sad", "angry", "stressed"]),
            stress: labels(&["stressed", "angry", "overwhelmed"]),
            engaged: labels(&["happy", "excited"]),
            steady: labels(&["neutral", "calm"]),
            recent_window: 5,
        }
    }
}

impl MoodSets {
    pub fn is_negative(&self, mood: &str) -> bool {
        contains_label(&self.negative, mood)
    }

    pub fn is_stress(&self, mood: &str) -> bool {
        contains_label(&self.stress, mood)
    }

    pub fn is_engaged(&self, mood: &str) -> bool {
        contains_label(&self.engaged, mood)
    }

    pub fn is_steady(&self, mood: &str) -> bool {
        contains_label(&self.steady, mood)
    }
}

fn contains_label(set: &[String], mood: &str) -> bool {
    let mood = mood.trim();
    set.iter().any(|label| label.eq_ignore_ascii_case(mood))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamThresholds {
    pub at_risk_below: f64,
    pub critical_mean: f64,
    pub critical_fraction: f64,
    pub attention_mean: f64,
    pub good_mean: f64,
    pub wellness_mean: f64,
    pub negative_mood_fraction: f64,
    pub groupthink_max_distinct: usize,
}

impl Default for TeamThresholds {
    fn default() -> Self {
        TeamThresholds {
            at_risk_below: 60.0,
            critical_mean: 50.0,
            critical_fraction: 0.3,
            attention_mean: 65.0,
            good_mean: 75.0,
            wellness_mean: 60.0,
            negative_mood_fraction: 0.4,
            groupthink_max_distinct: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub critical_below: f64,
    pub high_below: f64,
    pub positive_above: f64,
    /// Labels that count toward a mood decline pattern.
    pub decline_moods: Vec<String>,
    pub decline_window: usize,
    pub decline_count: usize,
    pub team_average_below: f64,
    /// Share of Critical-tier members above which a team alert fires.
    pub team_critical_fraction: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        AlertThresholds {
            critical_below: 30.0,
            high_below: 50.0,
            positive_above: 80.0,
            decline_moods: ["sad", "angry", "stressed", "anxious"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            decline_window: 3,
            decline_count: 2,
            team_average_below: 55.0,
            team_critical_fraction: 0.25,
        }
    }
}

impl AlertThresholds {
    pub fn is_decline_mood(&self, mood: &str) -> bool {
        contains_label(&self.decline_moods, mood)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub formula: FormulaVariant,
    pub lexicon: MoodLexicon,
    pub trend_window: usize,
    pub defaults: SignalDefaults,
    pub weights: ScoreWeights,
    pub balance: BalanceParams,
    pub breakpoints: RiskBreakpoints,
    pub factors: FactorThresholds,
    pub moods: MoodSets,
    pub team: TeamThresholds,
    pub alerts: AlertThresholds,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            formula: FormulaVariant::default(),
            lexicon: MoodLexicon::default(),
            trend_window: 10,
            defaults: SignalDefaults::default(),
            weights: ScoreWeights::default(),
            balance: BalanceParams::default(),
            breakpoints: RiskBreakpoints::default(),
            factors: FactorThresholds::default(),
            moods: MoodSets::default(),
            team: TeamThresholds::default(),
            alerts: AlertThresholds::default(),
        }
    }
}

impl ScoringConfig {
    /// Reads a JSON override file. Keys left out keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let mut config: ScoringConfig = serde_json::from_str(raw)?;
        config.lexicon = config.lexicon.normalized();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.breakpoints;
        let ascending = 0.0 <= b.critical_below
            && b.critical_below < b.high_below
            && b.high_below < b.medium_below
            && b.medium_below <= 100.0;
        if !ascending {
            return Err(ConfigError::Invalid(format!(
                "risk breakpoints must ascend within [0, 100], got {}/{}/{}",
                b.critical_below, b.high_below, b.medium_below
            )));
        }

        let w = &self.weights;
        let numbers = [
            ("weights.idle_time", w.idle_time),
            ("weights.meetings", w.meetings),
            ("weights.meeting_baseline", w.meeting_baseline),
            ("weights.logins", w.logins),
            ("weights.login_baseline", w.login_baseline),
            ("weights.mood_trend", w.mood_trend),
            ("weights.work_life_balance", w.work_life_balance),
            ("weights.communication", w.communication),
            ("lexicon.default_weight", self.lexicon.default_weight),
        ];
        if let Some((name, value)) = numbers.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::Invalid(format!("{name} must be finite, got {value}")));
        }

        let lexicon = &self.lexicon;
        let out_of_range = |weight: f64| !(0.0..=1.0).contains(&weight);
        if out_of_range(lexicon.default_weight) {
            return Err(ConfigError::Invalid(format!(
                "lexicon.default_weight must lie within [0, 1], got {}",
                lexicon.default_weight
            )));
        }
        if let Some((label, weight)) = lexicon.weights.iter().find(|(_, w)| out_of_range(**w)) {
            return Err(ConfigError::Invalid(format!(
                "lexicon weight for {label} must lie within [0, 1], got {weight}"
            )));
        }

        if self.balance.baseline_hours <= 0.0
            || self.balance.weekend_penalty_span <= 0.0
            || self.balance.response_ceiling <= 0.0
        {
            return Err(ConfigError::Invalid(
                "balance baseline, penalty span and response ceiling must be positive".to_string(),
            ));
        }

        let windows = [
            self.trend_window,
            self.moods.recent_window,
            self.factors.negative_mood_window,
            self.alerts.decline_window,
        ];
        if windows.contains(&0) {
            return Err(ConfigError::Invalid("mood windows must be at least 1".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = ScoringConfig::from_json(
            r#"{ "formula": "activity_only", "breakpoints": { "critical_below": 30 } }"#,
        )
        .unwrap();
        assert_eq!(config.formula, FormulaVariant::ActivityOnly);
        assert_eq!(config.breakpoints.critical_below, 30.0);
        assert_eq!(config.breakpoints.high_below, 60.0);
        assert_eq!(config.weights.mood_trend, 30.0);
        assert_eq!(config.trend_window, 10);
    }

    #[test]
    fn rejects_unordered_breakpoints() {
        let err = ScoringConfig::from_json(r#"{ "breakpoints": { "critical_below": 70 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn lexicon_override_is_case_insensitive() {
        let config = ScoringConfig::from_json(
            r#"{ "lexicon": { "weights": { "Elated": 0.95 }, "default_weight": 0.4 } }"#,
        )
        .unwrap();
        assert_eq!(config.lexicon.weight("elated"), 0.95);
        assert_eq!(config.lexicon.weight("happy"), 0.4);
    }

    #[test]
    fn rejects_lexicon_weights_outside_unit_range() {
        let err = ScoringConfig::from_json(r#"{ "lexicon": { "weights": { "happy": 3 } } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("happy")));

        let err = ScoringConfig::from_json(r#"{ "lexicon": { "default_weight": -0.1 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let mut config = ScoringConfig::default();
        config.lexicon.weights.insert("numb".to_string(), f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_decline_window() {
        let err = ScoringConfig::from_json(r#"{ "alerts": { "decline_window": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn mood_sets_match_ignoring_case() {
        let sets = MoodSets::default();
        assert!(sets.is_negative("Sad"));
        assert!(sets.is_stress(" overwhelmed "));
        assert!(!sets.is_negative("tired"));
    }
}

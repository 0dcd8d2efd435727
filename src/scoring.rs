use crate::config::{FormulaVariant, ScoringConfig};
use crate::error::ScoringError;
use crate::factors::{communication, stress_level, work_life_balance};
use crate::models::{round_to, BurnoutAssessment, EmployeeSignalSnapshot, RiskTier, ScoreBreakdown};
use crate::mood::mood_trend;
use crate::risk::{classify, confidence, identify_factors};

const FALLBACK_SCORE: f64 = 50.0;

/// Result of one scoring call. A degraded outcome still carries a usable
/// assessment, but callers can tell it apart from a computed one.
#[derive(Debug)]
pub enum ScoreOutcome {
    Computed(BurnoutAssessment),
    Degraded {
        assessment: BurnoutAssessment,
        reason: ScoringError,
    },
}

impl ScoreOutcome {
    pub fn assessment(&self) -> &BurnoutAssessment {
        match self {
            ScoreOutcome::Computed(assessment) => assessment,
            ScoreOutcome::Degraded { assessment, .. } => assessment,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ScoreOutcome::Degraded { .. })
    }

    pub fn reason(&self) -> Option<&ScoringError> {
        match self {
            ScoreOutcome::Computed(_) => None,
            ScoreOutcome::Degraded { reason, .. } => Some(reason),
        }
    }
}

pub fn fallback_assessment(config: &ScoringConfig) -> BurnoutAssessment {
    BurnoutAssessment {
        score: FALLBACK_SCORE,
        risk_tier: RiskTier::Medium,
        risk_factors: Default::default(),
        confidence: 0.0,
        formula: config.formula,
        breakdown: None,
    }
}

/// Scores a raw JSON payload. Type errors degrade instead of failing.
pub fn score_value(value: serde_json::Value, config: &ScoringConfig) -> ScoreOutcome {
    match serde_json::from_value::<EmployeeSignalSnapshot>(value) {
        Ok(snapshot) => score(&snapshot, config),
        Err(e) => degrade(config, ScoringError::from(e)),
    }
}

pub fn score(snapshot: &EmployeeSignalSnapshot, config: &ScoringConfig) -> ScoreOutcome {
    match try_score(snapshot, config) {
        Ok(assessment) => ScoreOutcome::Computed(assessment),
        Err(reason) => degrade(config, reason),
    }
}

fn degrade(config: &ScoringConfig, reason: ScoringError) -> ScoreOutcome {
    tracing::warn!("Burnout scoring fell back to default assessment: {}", reason);
    ScoreOutcome::Degraded {
        assessment: fallback_assessment(config),
        reason,
    }
}

pub fn try_score(
    snapshot: &EmployeeSignalSnapshot,
    config: &ScoringConfig,
) -> Result<BurnoutAssessment, ScoringError> {
    validate(snapshot)?;

    let defaults = &config.defaults;
    let weights = &config.weights;

    let idle = snapshot.idle_time.unwrap_or(defaults.idle_time);
    let meetings = snapshot.meetings_attended.unwrap_or(defaults.meetings_attended);
    let logins = snapshot.login_count.unwrap_or(defaults.login_count);
    let work_hours = snapshot.work_hours.unwrap_or(defaults.work_hours);
    let weekend = snapshot.weekend_activity.unwrap_or(defaults.weekend_activity);
    let response = snapshot.avg_response_time.unwrap_or(defaults.avg_response_time);

    let base = 100.0
        - (idle * weights.idle_time
            + (weights.meeting_baseline - meetings) * weights.meetings
            + (weights.login_baseline - logins) * weights.logins);

    let moods = snapshot.mood_labels();
    let trend = mood_trend(&moods, &config.lexicon, config.trend_window);
    let balance = work_life_balance(work_hours, weekend, &config.balance);
    let responsiveness = communication(response, &config.balance);

    let raw_total = match config.formula {
        FormulaVariant::Predictive => {
            base + trend * weights.mood_trend
                + balance * weights.work_life_balance
                + responsiveness * weights.communication
        }
        FormulaVariant::ActivityOnly => base,
    };

    if !raw_total.is_finite() {
        return Err(ScoringError::NonFinite);
    }

    let score = round_to(raw_total.clamp(0.0, 100.0), 1);
    let risk_tier = classify(score, &config.breakpoints);
    tracing::debug!(score, tier = risk_tier.as_str(), "burnout score computed");

    Ok(BurnoutAssessment {
        score,
        risk_tier,
        risk_factors: identify_factors(snapshot, config),
        confidence: confidence(snapshot),
        formula: config.formula,
        breakdown: Some(ScoreBreakdown {
            base,
            raw_total,
            mood_trend: trend,
            work_life_balance: balance,
            communication: responsiveness,
            stress_level: stress_level(&moods, &config.moods),
        }),
    })
}

fn validate(snapshot: &EmployeeSignalSnapshot) -> Result<(), ScoringError> {
    let fields = [
        ("idle_time", snapshot.idle_time),
        ("meetings_attended", snapshot.meetings_attended),
        ("login_count", snapshot.login_count),
        ("work_hours", snapshot.work_hours),
        ("weekend_activity", snapshot.weekend_activity),
        ("avg_response_time", snapshot.avg_response_time),
    ];

    for (field, value) in fields {
        if let Some(value) = value {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoringError::OutOfDomain { field, value });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_snapshot_clamps_to_full_score() {
        let config = ScoringConfig::default();
        let outcome = score(&EmployeeSignalSnapshot::default(), &config);
        assert!(!outcome.is_degraded());

        let assessment = outcome.assessment();
        let breakdown = assessment.breakdown.as_ref().unwrap();
        assert!(close(breakdown.base, 100.0));
        assert!(close(breakdown.mood_trend, 0.5));
        assert!(close(breakdown.work_life_balance, 1.0));
        assert!(close(breakdown.communication, 0.5));
        assert!(close(breakdown.raw_total, 142.5));
        assert_eq!(assessment.score, 100.0);
        assert_eq!(assessment.risk_tier, RiskTier::Low);
        assert!(assessment.risk_factors.is_empty());
        assert_eq!(assessment.confidence, 0.0);
    }

    #[test]
    fn reference_snapshot_follows_formula() {
        let config = ScoringConfig::default();
        let outcome = score_value(
            json!({
                "idle_time": 3,
                "meetings_attended": 4,
                "login_count": 5,
                "mood_history": ["happy", "content", "stressed", "happy", "neutral"],
                "work_hours": 9.5,
                "weekend_activity": 2,
                "avg_response_time": 1.5
            }),
            &config,
        );

        let assessment = outcome.assessment();
        let breakdown = assessment.breakdown.as_ref().unwrap();
        // 100 - (3*2 + (5-4)*3 + (3-5)*4)
        assert!(close(breakdown.base, 99.0));
        // slope of [1.0, 0.8, 0.2, 1.0, 0.5] is -0.08
        assert!(close(breakdown.mood_trend, 0.34));
        // ((1 - 1.5/8) + 1) / 2
        assert!(close(breakdown.work_life_balance, 0.90625));
        assert!(close(breakdown.communication, 0.625));
        // 99 + 10.2 + 18.125 + 9.375
        assert!(close(breakdown.raw_total, 136.7));
        assert!(close(breakdown.stress_level, 0.2));
        assert_eq!(assessment.score, 100.0);
        assert_eq!(assessment.risk_tier, RiskTier::Low);
        assert!(assessment.risk_factors.is_empty());
        assert_eq!(assessment.confidence, 1.0);
    }

    #[test]
    fn strained_snapshot_lands_mid_range() {
        let config = ScoringConfig::default();
        let outcome = score_value(
            json!({
                "idle_time": 10,
                "meetings_attended": 1,
                "login_count": 0,
                "mood_history": ["happy", "neutral", "sad"],
                "work_hours": 12,
                "weekend_activity": 6,
                "avg_response_time": 7
            }),
            &config,
        );

        let assessment = outcome.assessment();
        // base 56, trend clamps to 0, balance 0.5 * 20, communication 0
        assert_eq!(assessment.score, 66.0);
        assert_eq!(assessment.risk_tier, RiskTier::Medium);
        assert_eq!(assessment.risk_factors.len(), 5);
        assert!(!assessment.risk_factors.contains(crate::risk::NEGATIVE_MOODS));
    }

    #[test]
    fn activity_only_variant_skips_additions() {
        let config = ScoringConfig {
            formula: FormulaVariant::ActivityOnly,
            ..Default::default()
        };
        let snapshot = EmployeeSignalSnapshot {
            idle_time: Some(20.0),
            meetings_attended: Some(0.0),
            login_count: Some(0.0),
            ..Default::default()
        };

        let assessment = score(&snapshot, &config).assessment().clone();
        assert_eq!(assessment.score, 33.0);
        assert_eq!(assessment.risk_tier, RiskTier::Critical);
        assert_eq!(assessment.formula, FormulaVariant::ActivityOnly);

        let predictive = score(&snapshot, &ScoringConfig::default());
        assert_eq!(predictive.assessment().score, 75.5);
    }

    #[test]
    fn exact_tie_rounds_to_even_tenth() {
        let config = ScoringConfig::default();
        let outcome = score_value(json!({ "idle_time": 25, "work_hours": 9 }), &config);

        let assessment = outcome.assessment();
        // 50 + 15 + 18.75 + 7.5
        assert!(close(assessment.breakdown.as_ref().unwrap().raw_total, 91.25));
        assert_eq!(assessment.score, 91.2);
        assert_eq!(assessment.confidence, 0.25);
    }

    #[test]
    fn score_never_leaves_bounds() {
        let config = ScoringConfig::default();
        let snapshot = EmployeeSignalSnapshot {
            idle_time: Some(200.0),
            meetings_attended: Some(0.0),
            login_count: Some(0.0),
            ..Default::default()
        };
        let assessment = score(&snapshot, &config).assessment().clone();
        assert_eq!(assessment.score, 0.0);
        assert_eq!(assessment.risk_tier, RiskTier::Critical);
    }

    #[test]
    fn wrong_type_degrades_to_fallback() {
        let config = ScoringConfig::default();
        let outcome = score_value(json!({ "idle_time": "lots" }), &config);
        assert!(outcome.is_degraded());
        assert!(matches!(outcome.reason(), Some(ScoringError::Malformed(_))));
        assert_eq!(outcome.assessment(), &fallback_assessment(&config));
        assert_eq!(outcome.assessment().score, 50.0);
        assert_eq!(outcome.assessment().risk_tier, RiskTier::Medium);
    }

    #[test]
    fn bad_mood_history_degrades() {
        let config = ScoringConfig::default();
        let outcome = score_value(json!({ "mood_history": [1, 2] }), &config);
        assert!(matches!(outcome.reason(), Some(ScoringError::Malformed(_))));
    }

    #[test]
    fn negative_value_is_out_of_domain() {
        let config = ScoringConfig::default();
        let outcome = score_value(json!({ "work_hours": -3 }), &config);
        match outcome.reason() {
            Some(ScoringError::OutOfDomain { field, value }) => {
                assert_eq!(*field, "work_hours");
                assert_eq!(*value, -3.0);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn overflowing_input_degrades() {
        let config = ScoringConfig::default();
        let outcome = score_value(json!({ "idle_time": 1e308 }), &config);
        assert!(matches!(outcome.reason(), Some(ScoringError::NonFinite)));
        assert!(outcome.assessment().risk_factors.is_empty());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::models::{RiskTier, TeamMember};
use crate::risk::classify;

const DECLINE_MOODS_SHOWN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    CriticalBurnout,
    BurnoutRisk,
    MoodConcern,
    MoodDecline,
    PositiveFeedback,
    TeamHealth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellnessAlert {
    /// Employee name, or the team label for team-wide alerts.
    pub employee: String,
    pub kind: AlertKind,
    pub priority: AlertPriority,
    pub title: String,
    pub message: String,
    pub action_items: Vec<String>,
    pub created_at: DateTime<Utc>,
}

fn items(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn new_alert(
    subject: &str,
    kind: AlertKind,
    priority: AlertPriority,
    title: String,
    message: String,
    action_items: Vec<String>,
) -> WellnessAlert {
    WellnessAlert {
        employee: subject.to_string(),
        kind,
        priority,
        title,
        message,
        action_items,
        created_at: Utc::now(),
    }
}

/// Rule-based alerts for one employee's latest mood and score.
pub fn generate_alerts(
    employee: &str,
    mood: Option<&str>,
    score: f64,
    config: &ScoringConfig,
) -> Vec<WellnessAlert> {
    let limits = &config.alerts;
    let mut alerts = Vec::new();

    if score < limits.critical_below {
        alerts.push(new_alert(
            employee,
            AlertKind::CriticalBurnout,
            AlertPriority::High,
            format!("Critical burnout alert - {employee}"),
            format!(
                "{employee} shows critical burnout symptoms (score {score:.1}). \
                 Immediate intervention required."
            ),
            items(&[
                "Schedule immediate one-on-one meeting",
                "Consider workload redistribution",
                "Offer mental health resources",
                "Evaluate emergency time-off",
            ]),
        ));
    } else if score < limits.high_below {
        alerts.push(new_alert(
            employee,
            AlertKind::BurnoutRisk,
            AlertPriority::Medium,
            format!("High burnout risk - {employee}"),
            format!(
                "{employee} is at high risk of burnout (score {score:.1}). \
                 Proactive measures recommended."
            ),
            items(&[
                "Schedule wellness check-in within 24 hours",
                "Review current workload and deadlines",
                "Suggest stress management resources",
            ]),
        ));
    }

    let Some(mood) = mood.map(|m| m.trim().to_lowercase()) else {
        return alerts;
    };

    if config.moods.is_negative(&mood) {
        alerts.push(new_alert(
            employee,
            AlertKind::MoodConcern,
            AlertPriority::Medium,
            format!("Mood concern - {employee}"),
            format!("{employee} is experiencing a {mood} mood. Consider supportive intervention."),
            items(&[
                "Offer supportive conversation",
                "Check for work-related stressors",
                "Provide employee assistance resources",
            ]),
        ));
    } else if mood == "happy" && score > limits.positive_above {
        alerts.push(new_alert(
            employee,
            AlertKind::PositiveFeedback,
            AlertPriority::Low,
            format!("Positive performance - {employee}"),
            format!("{employee} is doing well with a positive mood. Consider recognition."),
            items(&[
                "Acknowledge good performance",
                "Consider for recognition program",
                "Explore growth opportunities",
            ]),
        ));
    }

    alerts
}

/// Fires when enough of the latest check-ins (oldest first) are in the
/// decline set. Histories shorter than the window never fire.
pub fn mood_decline_alert(
    employee: &str,
    recent_moods: &[String],
    config: &ScoringConfig,
) -> Option<WellnessAlert> {
    let limits = &config.alerts;
    if recent_moods.len() < limits.decline_window {
        return None;
    }

    let start = recent_moods.len() - limits.decline_window;
    let negative = recent_moods[start..]
        .iter()
        .filter(|m| limits.is_decline_mood(m))
        .count();
    if negative < limits.decline_count {
        return None;
    }

    let shown = &recent_moods[recent_moods.len().saturating_sub(DECLINE_MOODS_SHOWN)..];
    Some(new_alert(
        employee,
        AlertKind::MoodDecline,
        AlertPriority::High,
        format!("Mood decline pattern - {employee}"),
        format!(
            "{employee} shows persistent negative mood patterns over recent check-ins \
             ({negative} of the last {}: {}).",
            limits.decline_window,
            shown.join(", ")
        ),
        items(&[
            "Schedule supportive conversation",
            "Offer employee assistance programs",
            "Consider flexible work arrangements",
        ]),
    ))
}

/// Team-wide alert on a low average or too many Critical-tier members.
pub fn team_health_alert(
    label: &str,
    members: &[TeamMember],
    config: &ScoringConfig,
) -> Option<WellnessAlert> {
    if members.is_empty() {
        return None;
    }

    let limits = &config.alerts;
    let mean = members.iter().map(|m| m.score).sum::<f64>() / members.len() as f64;
    let critical = members
        .iter()
        .filter(|m| classify(m.score, &config.breakpoints) == RiskTier::Critical)
        .count();
    let critical_limit = members.len() as f64 * limits.team_critical_fraction;

    if mean >= limits.team_average_below && critical as f64 <= critical_limit {
        return None;
    }

    Some(new_alert(
        label,
        AlertKind::TeamHealth,
        AlertPriority::High,
        format!("Team health alert - {label}"),
        format!(
            "Team showing signs of collective burnout. Average score: {mean:.1}, \
             {critical} members at critical risk."
        ),
        items(&[
            "Review team workload distribution",
            "Consider team building activities",
            "Implement team wellness initiatives",
            "Schedule team health meeting",
        ]),
    ))
}

/// Highest priority first; ties keep their generation order.
pub fn prioritize(mut alerts: Vec<WellnessAlert>) -> Vec<WellnessAlert> {
    alerts.sort_by(|a, b| b.priority.cmp(&a.priority));
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(alerts: &[WellnessAlert]) -> Vec<AlertKind> {
        alerts.iter().map(|a| a.kind).collect()
    }

    fn moods(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn scored(scores: &[f64]) -> Vec<TeamMember> {
        scores
            .iter()
            .map(|score| TeamMember {
                name: None,
                score: *score,
                mood: None,
            })
            .collect()
    }

    #[test]
    fn critical_score_with_negative_mood() {
        let alerts = generate_alerts("Dana", Some("Stressed"), 25.0, &ScoringConfig::default());
        assert_eq!(kinds(&alerts), vec![AlertKind::CriticalBurnout, AlertKind::MoodConcern]);
        assert_eq!(alerts[0].priority, AlertPriority::High);
        assert!(alerts[0].message.contains("25.0"));
        assert!(alerts[0].message.ends_with("Immediate intervention required."));
        assert_eq!(alerts[0].action_items.len(), 4);
    }

    #[test]
    fn high_risk_band() {
        let alerts = generate_alerts("Dana", Some("neutral"), 30.0, &ScoringConfig::default());
        assert_eq!(kinds(&alerts), vec![AlertKind::BurnoutRisk]);
    }

    #[test]
    fn happy_high_scorer_gets_recognition() {
        let config = ScoringConfig::default();
        let alerts = generate_alerts("Dana", Some("happy"), 85.0, &config);
        assert_eq!(kinds(&alerts), vec![AlertKind::PositiveFeedback]);
        assert!(generate_alerts("Dana", Some("happy"), 80.0, &config).is_empty());
        assert!(generate_alerts("Dana", None, 85.0, &config).is_empty());
    }

    #[test]
    fn two_of_last_three_negative_is_a_decline() {
        let config = ScoringConfig::default();
        let history = moods(&["happy", "calm", "Anxious", "happy", "sad"]);

        let alert = mood_decline_alert("Dana", &history, &config).unwrap();
        assert_eq!(alert.kind, AlertKind::MoodDecline);
        assert_eq!(alert.priority, AlertPriority::High);
        assert_eq!(alert.title, "Mood decline pattern - Dana");
        assert!(alert.message.contains("2 of the last 3"));
        assert_eq!(alert.action_items.len(), 3);
    }

    #[test]
    fn decline_needs_a_full_window() {
        let config = ScoringConfig::default();
        assert!(mood_decline_alert("Dana", &moods(&["sad", "angry"]), &config).is_none());
        assert!(mood_decline_alert("Dana", &[], &config).is_none());
    }

    #[test]
    fn older_negative_moods_do_not_count_toward_decline() {
        let config = ScoringConfig::default();
        let history = moods(&["sad", "angry", "stressed", "happy", "calm", "sad"]);
        assert!(mood_decline_alert("Dana", &history, &config).is_none());
    }

    #[test]
    fn low_team_average_raises_team_alert() {
        let config = ScoringConfig::default();
        let alert =
            team_health_alert("engineering", &scored(&[50.0, 55.0, 58.0]), &config).unwrap();
        assert_eq!(alert.kind, AlertKind::TeamHealth);
        assert_eq!(alert.priority, AlertPriority::High);
        assert_eq!(alert.employee, "engineering");
        assert!(alert.message.contains("Average score: 54.3, 0 members"));
    }

    #[test]
    fn critical_share_raises_team_alert() {
        let config = ScoringConfig::default();
        // one of three is over a quarter even though the average is healthy
        let members = scored(&[35.0, 80.0, 90.0]);
        let alert = team_health_alert("ops", &members, &config).unwrap();
        assert!(alert.message.contains("1 members at critical risk"));

        // one of four is exactly a quarter and does not fire
        assert!(team_health_alert("ops", &scored(&[35.0, 80.0, 90.0, 95.0]), &config).is_none());
    }

    #[test]
    fn healthy_or_empty_team_has_no_team_alert() {
        let config = ScoringConfig::default();
        assert!(team_health_alert("ops", &scored(&[55.0, 70.0]), &config).is_none());
        assert!(team_health_alert("ops", &[], &config).is_none());
    }

    #[test]
    fn prioritize_orders_by_priority() {
        let config = ScoringConfig::default();
        let mut alerts = generate_alerts("Ari", Some("happy"), 90.0, &config);
        alerts.extend(generate_alerts("Bo", Some("calm"), 10.0, &config));
        alerts.extend(generate_alerts("Cy", Some("sad"), 70.0, &config));

        let ordered = prioritize(alerts);
        assert_eq!(
            kinds(&ordered),
            vec![
                AlertKind::CriticalBurnout,
                AlertKind::MoodConcern,
                AlertKind::PositiveFeedback
            ]
        );
    }
}

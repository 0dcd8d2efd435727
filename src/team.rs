use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::models::{round_to, RiskTier, TeamMember};
use crate::risk::classify;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamStatus {
    NoData,
    Critical,
    NeedsAttention,
    Good,
    Excellent,
}

impl TeamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamStatus::NoData => "no_data",
            TeamStatus::Critical => "critical",
            TeamStatus::NeedsAttention => "needs_attention",
            TeamStatus::Good => "good",
            TeamStatus::Excellent => "excellent",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDistribution {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl TierDistribution {
    pub fn count(&self, tier: RiskTier) -> usize {
        match tier {
            RiskTier::Critical => self.critical,
            RiskTier::High => self.high,
            RiskTier::Medium => self.medium,
            RiskTier::Low => self.low,
        }
    }

    fn add(&mut self, tier: RiskTier) {
        match tier {
            RiskTier::Critical => self.critical += 1,
            RiskTier::High => self.high += 1,
            RiskTier::Medium => self.medium += 1,
            RiskTier::Low => self.low += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamAggregate {
    pub team_size: usize,
    pub average_score: f64,
    pub distribution: TierDistribution,
    pub at_risk_count: usize,
    pub mood_distribution: BTreeMap<String, usize>,
    pub status: TeamStatus,
    pub recommendations: Vec<String>,
}

pub fn aggregate(members: &[TeamMember], config: &ScoringConfig) -> TeamAggregate {
    let limits = &config.team;

    if members.is_empty() {
        return TeamAggregate {
            team_size: 0,
            average_score: 0.0,
            distribution: TierDistribution::default(),
            at_risk_count: 0,
            mood_distribution: BTreeMap::new(),
            status: TeamStatus::NoData,
            recommendations: Vec::new(),
        };
    }

    let mut distribution = TierDistribution::default();
    for member in members {
        distribution.add(classify(member.score, &config.breakpoints));
    }

    let mean = members.iter().map(|m| m.score).sum::<f64>() / members.len() as f64;
    let at_risk_count = members.iter().filter(|m| m.score < limits.at_risk_below).count();

    let moods: Vec<String> = members
        .iter()
        .filter_map(|m| m.mood.as_deref())
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty())
        .collect();
    let mut mood_distribution = BTreeMap::new();
    for mood in &moods {
        *mood_distribution.entry(mood.clone()).or_insert(0) += 1;
    }

    let status = team_status(mean, distribution.critical, members.len(), config);
    let recommendations = recommendations(mean, distribution.critical, &moods, config);

    TeamAggregate {
        team_size: members.len(),
        average_score: round_to(mean, 1),
        distribution,
        at_risk_count,
        mood_distribution,
        status,
        recommendations,
    }
}

fn team_status(mean: f64, critical: usize, size: usize, config: &ScoringConfig) -> TeamStatus {
    let limits = &config.team;
    let critical_fraction = critical as f64 / size as f64;

    if mean < limits.critical_mean || critical_fraction > limits.critical_fraction {
        TeamStatus::Critical
    } else if mean < limits.attention_mean || critical > 0 {
        TeamStatus::NeedsAttention
    } else if mean < limits.good_mean {
        TeamStatus::Good
    } else {
        TeamStatus::Excellent
    }
}

/// Team-level advice in a fixed order. The groupthink rule needs at least one
/// reported mood: a team that reported nothing is not flagged for a narrow
/// mood range.
fn recommendations(
    mean: f64,
    critical: usize,
    moods: &[String],
    config: &ScoringConfig,
) -> Vec<String> {
    let limits = &config.team;
    let mut out = Vec::new();

    if critical > 0 {
        out.push(format!("Immediate intervention needed for {critical} team members"));
    }

    if mean < limits.wellness_mean {
        out.push("Consider team-wide wellness initiatives".to_string());
        out.push("Review workload distribution across team".to_string());
    }

    let negative = moods.iter().filter(|m| config.moods.is_negative(m)).count();
    if !moods.is_empty() && negative as f64 > moods.len() as f64 * limits.negative_mood_fraction {
        out.push("Address team morale and communication issues".to_string());
    }

    let distinct: BTreeSet<&String> = moods.iter().collect();
    if !moods.is_empty() && distinct.len() <= limits.groupthink_max_distinct {
        out.push("Monitor team for signs of groupthink or suppressed communication".to_string());
    }

    out
}

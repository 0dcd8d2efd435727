use std::fmt::Write;

use chrono::NaiveDate;

use crate::alerts::WellnessAlert;
use crate::models::{DailyTrend, RiskTier, TeamMember};
use crate::team::TeamAggregate;

const AT_RISK_LISTED: usize = 10;

/// Members ordered from lowest to highest score.
pub fn most_at_risk(members: &[TeamMember]) -> Vec<&TeamMember> {
    let mut ranked: Vec<&TeamMember> = members.iter().collect();
    ranked.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

pub fn build_report(
    label: Option<&str>,
    since: NaiveDate,
    team: &TeamAggregate,
    members: &[TeamMember],
    trends: &[DailyTrend],
    alerts: &[WellnessAlert],
) -> String {
    let mut output = String::new();
    let team_label = label.unwrap_or("all departments");

    let _ = writeln!(output, "# Team Wellness Report");
    let _ = writeln!(output, "Generated for {} (entries since {})", team_label, since);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Team Health");

    if team.team_size == 0 {
        let _ = writeln!(output, "No scored members for this team.");
    } else {
        let _ = writeln!(
            output,
            "- Status: {} across {} members (average score {:.1})",
            team.status.as_str(),
            team.team_size,
            team.average_score
        );
        let _ = writeln!(output, "- At risk: {}", team.at_risk_count);
        for recommendation in team.recommendations.iter() {
            let _ = writeln!(output, "- Recommendation: {}", recommendation);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Distribution");
    for tier in [RiskTier::Critical, RiskTier::High, RiskTier::Medium, RiskTier::Low] {
        let _ = writeln!(output, "- {}: {}", tier.as_str(), team.distribution.count(tier));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Most At-Risk Members");

    if members.is_empty() {
        let _ = writeln!(output, "No members with scores recorded.");
    } else {
        for member in most_at_risk(members).iter().take(AT_RISK_LISTED) {
            let _ = writeln!(
                output,
                "- {} score {:.1} (mood: {})",
                member.name.as_deref().unwrap_or("unnamed"),
                member.score,
                member.mood.as_deref().unwrap_or("unknown")
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Daily Trend");

    if trends.is_empty() {
        let _ = writeln!(output, "No entries recorded for this window.");
    } else {
        for trend in trends.iter() {
            let _ = writeln!(
                output,
                "- {}: average score {:.1} across {} entries (most common mood: {})",
                trend.day, trend.avg_score, trend.entry_count, trend.most_common_mood
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Active Alerts");

    if alerts.is_empty() {
        let _ = writeln!(output, "No alerts for this team.");
    } else {
        for alert in alerts.iter() {
            let _ = writeln!(output, "- [{:?}] {}: {}", alert.priority, alert.title, alert.message);
        }
    }

    output
}

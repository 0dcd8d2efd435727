use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::round_to;

/// Numeric valence for each known mood label, 1.0 being the most positive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodLexicon {
    pub weights: HashMap<String, f64>,
    pub default_weight: f64,
}

impl Default for MoodLexicon {
    fn default() -> Self {
        let weights = [
            ("happy", 1.0),
            ("content", 0.8),
            ("calm", 0.7),
            ("focused", 0.6),
            ("neutral", 0.5),
            ("tired", 0.3),
            ("stressed", 0.2),
            ("anxious", 0.1),
            ("angry", 0.05),
            ("sad", 0.0),
        ]
        .into_iter()
        .map(|(label, weight)| (label.to_string(), weight))
        .collect();

        MoodLexicon {
            weights,
            default_weight: 0.5,
        }
    }
}

impl MoodLexicon {
    /// Lowercases every key so lookups stay case-insensitive.
    pub fn normalized(self) -> Self {
        MoodLexicon {
            weights: self
                .weights
                .into_iter()
                .map(|(label, weight)| (label.trim().to_lowercase(), weight))
                .collect(),
            default_weight: self.default_weight,
        }
    }

    pub fn weight(&self, label: &str) -> f64 {
        self.weights
            .get(&label.trim().to_lowercase())
            .copied()
            .unwrap_or(self.default_weight)
    }
}

/// Slope of the least-squares line through `values` plotted against their index.
pub fn least_squares_slope(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let sum_x: f64 = (0..values.len()).map(|x| x as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_x2: f64 = (0..values.len()).map(|x| (x * x) as f64).sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(x, y)| x as f64 * y).sum();

    let denom = n * sum_x2 - sum_x * sum_x;
    if denom.abs() < 1e-12 {
        return None;
    }

    Some((n * sum_xy - sum_x * sum_y) / denom)
}

/// Direction of recent mood change in [0, 1]; 0.5 means flat or unknown.
pub fn mood_trend(labels: &[String], lexicon: &MoodLexicon, window: usize) -> f64 {
    if labels.is_empty() {
        return 0.5;
    }

    let start = labels.len().saturating_sub(window);
    let weights: Vec<f64> = labels[start..].iter().map(|m| lexicon.weight(m)).collect();

    match least_squares_slope(&weights) {
        Some(slope) => (0.5 + slope * 2.0).clamp(0.0, 1.0),
        None => weights.first().copied().unwrap_or(0.5),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecentTrend {
    Improving,
    Stable,
    Declining,
    InsufficientData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodPatterns {
    pub most_common_mood: String,
    pub frequency: BTreeMap<String, usize>,
    pub recent_trend: RecentTrend,
    pub volatility: f64,
}

const RECENT_PATTERN_WINDOW: usize = 7;

pub fn analyze_patterns(labels: &[String], lexicon: &MoodLexicon) -> Option<MoodPatterns> {
    if labels.is_empty() {
        return None;
    }

    let mut frequency: BTreeMap<String, usize> = BTreeMap::new();
    for label in labels {
        *frequency.entry(label.trim().to_lowercase()).or_insert(0) += 1;
    }

    // BTreeMap iterates alphabetically, so ties resolve to the first label.
    let mut most_common_mood = String::new();
    let mut best = 0;
    for (label, count) in &frequency {
        if *count > best {
            best = *count;
            most_common_mood = label.clone();
        }
    }

    let start = labels.len().saturating_sub(RECENT_PATTERN_WINDOW);
    let recent_trend = recent_trend(&labels[start..], lexicon);

    Some(MoodPatterns {
        most_common_mood,
        frequency,
        recent_trend,
        volatility: volatility(labels, lexicon),
    })
}

fn recent_trend(labels: &[String], lexicon: &MoodLexicon) -> RecentTrend {
    if labels.len() < 3 {
        return RecentTrend::InsufficientData;
    }

    let weights: Vec<f64> = labels.iter().map(|m| lexicon.weight(m)).collect();
    match least_squares_slope(&weights) {
        Some(slope) if slope > 0.1 => RecentTrend::Improving,
        Some(slope) if slope < -0.1 => RecentTrend::Declining,
        _ => RecentTrend::Stable,
    }
}

/// Population standard deviation of valence weights, three decimals.
pub fn volatility(labels: &[String], lexicon: &MoodLexicon) -> f64 {
    if labels.len() < 2 {
        return 0.0;
    }

    let weights: Vec<f64> = labels.iter().map(|m| lexicon.weight(m)).collect();
    let n = weights.len() as f64;
    let mean = weights.iter().sum::<f64>() / n;
    let variance = weights.iter().map(|w| (w - mean).powi(2)).sum::<f64>() / n;
    round_to(variance.sqrt(), 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moods(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn lexicon_weights_follow_table() {
        let lexicon = MoodLexicon::default();
        assert_eq!(lexicon.weight("happy"), 1.0);
        assert_eq!(lexicon.weight("Content"), 0.8);
        assert_eq!(lexicon.weight("ANGRY"), 0.05);
        assert_eq!(lexicon.weight("sad"), 0.0);
    }

    #[test]
    fn unknown_label_is_neutral() {
        let lexicon = MoodLexicon::default();
        assert_eq!(lexicon.weight("bewildered"), 0.5);
        assert_eq!(lexicon.weight(""), 0.5);
    }

    #[test]
    fn empty_history_is_neutral_trend() {
        assert_eq!(mood_trend(&[], &MoodLexicon::default(), 10), 0.5);
    }

    #[test]
    fn single_sample_returns_raw_weight() {
        let lexicon = MoodLexicon::default();
        assert_eq!(mood_trend(&moods(&["tired"]), &lexicon, 10), 0.3);
    }

    #[test]
    fn zero_window_is_neutral_trend() {
        let lexicon = MoodLexicon::default();
        assert_eq!(mood_trend(&moods(&["sad", "happy", "tired"]), &lexicon, 0), 0.5);
    }

    #[test]
    fn constant_history_has_flat_trend() {
        let lexicon = MoodLexicon::default();
        let trend = mood_trend(&moods(&["tired", "tired", "tired", "tired"]), &lexicon, 10);
        assert!((trend - 0.5).abs() < 1e-9);
    }

    #[test]
    fn improving_and_declining_histories() {
        let lexicon = MoodLexicon::default();
        let up = mood_trend(&moods(&["sad", "tired", "neutral", "content"]), &lexicon, 10);
        let down = mood_trend(&moods(&["happy", "calm", "stressed", "sad"]), &lexicon, 10);
        assert!(up > 0.5);
        assert!(down < 0.5);
    }

    #[test]
    fn trend_is_clamped() {
        let lexicon = MoodLexicon::default();
        assert_eq!(mood_trend(&moods(&["sad", "happy"]), &lexicon, 10), 1.0);
        assert_eq!(mood_trend(&moods(&["happy", "sad"]), &lexicon, 10), 0.0);
    }

    #[test]
    fn trend_only_reads_recent_window() {
        let lexicon = MoodLexicon::default();
        let mut history = moods(&["happy", "happy", "happy"]);
        history.extend(moods(&["sad"; 10]));
        assert!((mood_trend(&history, &lexicon, 10) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn slope_matches_hand_computation() {
        let slope = least_squares_slope(&[1.0, 0.8, 0.2, 1.0, 0.5]).unwrap();
        assert!((slope - (-0.08)).abs() < 1e-9);
        assert!(least_squares_slope(&[0.4]).is_none());
    }

    #[test]
    fn patterns_summarize_history() {
        let lexicon = MoodLexicon::default();
        let history = moods(&["sad", "stressed", "happy", "Happy", "content", "happy"]);
        let patterns = analyze_patterns(&history, &lexicon).unwrap();
        assert_eq!(patterns.most_common_mood, "happy");
        assert_eq!(patterns.frequency.get("happy"), Some(&3));
        assert_eq!(patterns.recent_trend, RecentTrend::Improving);
        assert!(patterns.volatility > 0.0);
    }

    #[test]
    fn patterns_need_three_recent_samples_for_trend() {
        let lexicon = MoodLexicon::default();
        let patterns = analyze_patterns(&moods(&["sad", "happy"]), &lexicon).unwrap();
        assert_eq!(patterns.recent_trend, RecentTrend::InsufficientData);
        assert!(analyze_patterns(&[], &lexicon).is_none());
    }

    #[test]
    fn volatility_of_steady_history_is_zero() {
        let lexicon = MoodLexicon::default();
        assert_eq!(volatility(&moods(&["calm", "calm", "calm"]), &lexicon), 0.0);
        assert_eq!(volatility(&moods(&["happy", "sad"]), &lexicon), 0.5);
    }
}

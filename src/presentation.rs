//! Confidence score presentation.
//!
//! Maps a `[0, 1]` confidence score to a display tier. All functions are total
//! over `Option<f64>`: `None` means the backend gave no score.

/// Score at or above which a response is "High Confidence".
pub const HIGH_THRESHOLD: f64 = 0.8;

/// Score at or above which a response is "Medium Confidence".
pub const MEDIUM_THRESHOLD: f64 = 0.6;

/// Answers at or above this score are read aloud automatically.
pub const AUTO_SPEAK_THRESHOLD: f64 = 0.7;

/// Color shown when no score is available.
pub const NEUTRAL_COLOR: &str = "#666666";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High Confidence",
            Self::Medium => "Medium Confidence",
            Self::Low => "Low Confidence",
        }
    }

    /// Hex color of the tier badge.
    pub fn color(self) -> &'static str {
        match self {
            Self::High => "#4CAF50",
            Self::Medium => "#FF9800",
            Self::Low => "#F44336",
        }
    }
}

/// Bucket a score. NaN and negative scores land in [`ConfidenceTier::Low`].
pub fn tier(confidence: Option<f64>) -> Option<ConfidenceTier> {
    let c = confidence?;
    Some(if c >= HIGH_THRESHOLD {
        ConfidenceTier::High
    } else if c >= MEDIUM_THRESHOLD {
        ConfidenceTier::Medium
    } else {
        ConfidenceTier::Low
    })
}

pub fn tier_color(confidence: Option<f64>) -> &'static str {
    tier(confidence).map_or(NEUTRAL_COLOR, ConfidenceTier::color)
}

pub fn tier_label(confidence: Option<f64>) -> &'static str {
    tier(confidence).map_or("", ConfidenceTier::label)
}

/// `round(confidence * 100)`, clamped to `0..=100`.
pub fn confidence_percent(confidence: f64) -> u8 {
    if confidence.is_nan() {
        return 0;
    }
    (confidence * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Whether the answer should carry the "please verify" warning.
pub fn needs_verification(confidence: Option<f64>) -> bool {
    confidence.is_some_and(|c| c < MEDIUM_THRESHOLD)
}

/// Whether an answer is confident enough to be read aloud unprompted.
pub fn should_auto_speak(confidence: Option<f64>) -> bool {
    confidence.is_some_and(|c| c >= AUTO_SPEAK_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_thresholds() {
        assert_eq!(tier_label(Some(0.95)), "High Confidence");
        assert_eq!(tier_label(Some(0.65)), "Medium Confidence");
        assert_eq!(tier_label(Some(0.3)), "Low Confidence");
        assert_eq!(tier_label(None), "");
    }

    #[test]
    fn boundaries_are_inclusive() {
        assert_eq!(tier(Some(0.8)), Some(ConfidenceTier::High));
        assert_eq!(tier(Some(0.6)), Some(ConfidenceTier::Medium));
        assert_eq!(tier(Some(0.5999)), Some(ConfidenceTier::Low));
    }

    #[test]
    fn colors_follow_tiers() {
        assert_eq!(tier_color(Some(0.9)), "#4CAF50");
        assert_eq!(tier_color(Some(0.7)), "#FF9800");
        assert_eq!(tier_color(Some(0.1)), "#F44336");
        assert_eq!(tier_color(None), NEUTRAL_COLOR);
    }

    #[test]
    fn zero_is_a_score_not_a_missing_value() {
        assert_eq!(tier_label(Some(0.0)), "Low Confidence");
        assert_eq!(tier_color(Some(0.0)), "#F44336");
    }

    #[test]
    fn odd_scores_are_low() {
        assert_eq!(tier(Some(f64::NAN)), Some(ConfidenceTier::Low));
        assert_eq!(tier(Some(-1.0)), Some(ConfidenceTier::Low));
        assert_eq!(tier(Some(85.0)), Some(ConfidenceTier::High));
    }

    #[test]
    fn percent_rounds_and_clamps() {
        assert_eq!(confidence_percent(0.734), 73);
        assert_eq!(confidence_percent(0.738), 74);
        assert_eq!(confidence_percent(1.7), 100);
        assert_eq!(confidence_percent(-0.2), 0);
        assert_eq!(confidence_percent(f64::NAN), 0);
    }

    #[test]
    fn verification_warning_only_below_medium() {
        assert!(needs_verification(Some(0.59)));
        assert!(!needs_verification(Some(0.6)));
        assert!(!needs_verification(None));
    }

    #[test]
    fn auto_speak_from_point_seven() {
        assert!(should_auto_speak(Some(0.7)));
        assert!(!should_auto_speak(Some(0.69)));
        assert!(!should_auto_speak(None));
    }
}

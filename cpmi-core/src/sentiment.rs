//! Sentiment classification of index values

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index value that separates bullish from bearish readings
pub const NEUTRAL_INDEX: f64 = 100.0;

/// Three-way sentiment bucket derived from an index value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// Index above 100
    Bullish,
    /// Index below 100
    Bearish,
    /// Index exactly 100
    Neutral,
}

impl Sentiment {
    /// Classify an index value.
    ///
    /// NaN and infinities have no meaningful position relative to 100 and are
    /// classified as `Neutral`; callers can detect them with
    /// [`Sentiment::is_trustworthy`].
    pub fn classify(value: f64) -> Self {
        if !value.is_finite() {
            return Sentiment::Neutral;
        }

        if value > NEUTRAL_INDEX {
            Sentiment::Bullish
        } else if value < NEUTRAL_INDEX {
            Sentiment::Bearish
        } else {
            Sentiment::Neutral
        }
    }

    /// Whether `classify(value)` reflects the value rather than a fallback
    pub fn is_trustworthy(value: f64) -> bool {
        value.is_finite()
    }

    /// Display glyph: upward, downward or sideways
    pub fn glyph(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "📈",
            Sentiment::Bearish => "📉",
            Sentiment::Neutral => "➡️",
        }
    }

    /// CSS class used by the HTML page
    pub fn css_class(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "bullish",
            Sentiment::Bearish => "bearish",
            Sentiment::Neutral => "neutral",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "#00C851",
            Sentiment::Bearish => "#ff4444",
            Sentiment::Neutral => "#ffbb33",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "Bullish",
            Sentiment::Bearish => "Bearish",
            Sentiment::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_at_100() {
        assert_eq!(Sentiment::classify(100.0), Sentiment::Neutral);
        assert_eq!(Sentiment::classify(100.000_001), Sentiment::Bullish);
        assert_eq!(Sentiment::classify(99.999_999), Sentiment::Bearish);
    }

    #[test]
    fn test_ranges() {
        for v in [100.5, 104.3, 150.0, 1e9, f64::MAX] {
            assert_eq!(Sentiment::classify(v), Sentiment::Bullish, "value {}", v);
        }
        for v in [99.5, 0.0, -3.0, f64::MIN, -1e9] {
            assert_eq!(Sentiment::classify(v), Sentiment::Bearish, "value {}", v);
        }
    }

    #[test]
    fn test_non_finite_is_neutral_and_flagged() {
        for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(Sentiment::classify(v), Sentiment::Neutral);
            assert!(!Sentiment::is_trustworthy(v));
        }
        assert!(Sentiment::is_trustworthy(100.0));
    }

    #[test]
    fn test_glyphs() {
        assert_eq!(Sentiment::classify(110.0).glyph(), "📈");
        assert_eq!(Sentiment::classify(90.0).glyph(), "📉");
        assert_eq!(Sentiment::classify(100.0).glyph(), "➡️");
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&Sentiment::Bullish).unwrap();
        assert_eq!(json, "\"bullish\"");
    }
}

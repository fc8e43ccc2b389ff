use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Scores above this are positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Scores below this are negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

// Normalisation constant for raw lexicon sums, see `normalize`.
const ALPHA: f64 = 15.0;

static LEXICON: Lazy<HashMap<&'static str, i32>> = Lazy::new(|| {
    [
        // positive
        ("good", 2),
        ("great", 3),
        ("excellent", 3),
        ("best", 3),
        ("better", 2),
        ("win", 3),
        ("wins", 3),
        ("won", 3),
        ("victory", 3),
        ("success", 2),
        ("successful", 3),
        ("growth", 2),
        ("grow", 2),
        ("grows", 2),
        ("gain", 2),
        ("gains", 2),
        ("rise", 1),
        ("rises", 1),
        ("surge", 2),
        ("surges", 2),
        ("rally", 2),
        ("rallies", 2),
        ("record", 1),
        ("boost", 2),
        ("boosts", 2),
        ("profit", 2),
        ("profits", 2),
        ("strong", 2),
        ("stronger", 2),
        ("recovery", 2),
        ("recovers", 2),
        ("improve", 2),
        ("improves", 2),
        ("improved", 2),
        ("hope", 2),
        ("hopeful", 2),
        ("optimism", 2),
        ("optimistic", 2),
        ("celebrate", 3),
        ("celebrates", 3),
        ("happy", 3),
        ("praise", 3),
        ("praised", 3),
        ("welcome", 2),
        ("welcomes", 2),
        ("support", 2),
        ("supports", 2),
        ("benefit", 2),
        ("benefits", 2),
        ("safe", 1),
        ("rescue", 2),
        ("rescued", 2),
        ("peace", 2),
        ("agreement", 1),
        ("deal", 1),
        ("award", 3),
        ("awarded", 3),
        ("breakthrough", 3),
        ("launch", 1),
        ("launches", 1),
        ("innovation", 2),
        ("upgrade", 1),
        ("upbeat", 2),
        ("bullish", 2),
        ("thrive", 2),
        ("relief", 2),
        // negative
        ("bad", -3),
        ("worse", -3),
        ("worst", -3),
        ("loss", -3),
        ("losses", -3),
        ("lose", -3),
        ("loses", -3),
        ("lost", -3),
        ("fall", -2),
        ("falls", -2),
        ("fell", -2),
        ("drop", -1),
        ("drops", -1),
        ("decline", -2),
        ("declines", -2),
        ("crash", -2),
        ("crashes", -2),
        ("slump", -2),
        ("plunge", -2),
        ("plunges", -2),
        ("weak", -2),
        ("weaker", -2),
        ("crisis", -3),
        ("fear", -2),
        ("fears", -2),
        ("panic", -3),
        ("risk", -2),
        ("risks", -2),
        ("threat", -2),
        ("threats", -2),
        ("warn", -2),
        ("warns", -2),
        ("warning", -3),
        ("attack", -1),
        ("attacks", -1),
        ("killed", -3),
        ("kill", -3),
        ("kills", -3),
        ("dead", -3),
        ("death", -2),
        ("deaths", -2),
        ("injured", -2),
        ("violence", -3),
        ("war", -2),
        ("terror", -3),
        ("protest", -2),
        ("protests", -2),
        ("arrest", -2),
        ("arrested", -3),
        ("fraud", -4),
        ("scam", -2),
        ("corruption", -3),
        ("accused", -2),
        ("fail", -2),
        ("fails", -2),
        ("failed", -2),
        ("failure", -2),
        ("disaster", -2),
        ("flood", -2),
        ("floods", -2),
        ("collapse", -2),
        ("collapses", -2),
        ("shortage", -2),
        ("inflation", -1),
        ("recession", -2),
        ("layoffs", -2),
        ("bearish", -2),
        ("slowdown", -2),
        ("concern", -2),
        ("concerns", -2),
        ("anger", -3),
        ("angry", -3),
        ("sad", -2),
        ("tragedy", -2),
        ("tragic", -2),
        ("ban", -2),
        ("banned", -2),
        ("criticism", -2),
        ("slams", -2),
    ]
    .into_iter()
    .collect()
});

/// Coarse tone band of a polarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Tone {
    Positive,
    Neutral,
    Negative,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Positive => "positive",
            Tone::Neutral => "neutral",
            Tone::Negative => "negative",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Tone::Positive),
            "neutral" => Ok(Tone::Neutral),
            "negative" => Ok(Tone::Negative),
            other => Err(format!("unknown tone '{}'", other)),
        }
    }
}

impl TryFrom<String> for Tone {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Polarity of `text` in [-1, 1]. Pure and deterministic.
pub fn score(text: &str) -> f64 {
    let tokens: Vec<String> = tokenize(text).collect();
    let mut raw: i32 = 0;

    for i in 0..tokens.len() {
        let base = LEXICON.get(tokens[i].as_str()).copied().unwrap_or(0);
        if base == 0 {
            continue;
        }
        let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
        raw += if negated { -base } else { base };
    }

    normalize(raw)
}

/// Clamp any score into [-1, 1]. Non-finite input yields `None`.
pub fn clamp_score(score: f64) -> Option<f64> {
    score.is_finite().then(|| score.clamp(-1.0, 1.0))
}

/// Maps [-1, 1] onto [0, 100].
pub fn to_percent(score: f64) -> u8 {
    let unit = ((score + 1.0) / 2.0).clamp(0.0, 1.0);
    if unit.is_nan() {
        return 50;
    }
    (unit * 100.0).round() as u8
}

pub fn classify(score: f64) -> Tone {
    if score > POSITIVE_THRESHOLD {
        Tone::Positive
    } else if score < NEGATIVE_THRESHOLD {
        Tone::Negative
    } else {
        Tone::Neutral
    }
}

fn normalize(raw: i32) -> f64 {
    let raw = f64::from(raw);
    (raw / (raw * raw + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "don't"
            | "doesn't"
            | "didn't"
            | "without"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    mod score_tests {
        use super::*;

        #[test]
        fn test_empty_text_is_neutral() {
            assert_eq!(score(""), 0.0);
            assert_eq!(score("   "), 0.0);
        }

        #[test]
        fn test_unknown_words_are_neutral() {
            assert_eq!(score("Parliament session begins on Monday"), 0.0);
        }

        #[test]
        fn test_positive_headline() {
            let s = score("Markets rally as economy shows strong growth");
            assert!(s > POSITIVE_THRESHOLD, "got {}", s);
        }

        #[test]
        fn test_negative_headline() {
            let s = score("Floods kill dozens, crisis deepens");
            assert!(s < NEGATIVE_THRESHOLD, "got {}", s);
        }

        #[test]
        fn test_negation_flips_valence() {
            assert!(score("good") > 0.0);
            assert!(score("not good") < 0.0);
            assert!(score("never a good sign") < 0.0);
        }

        #[test]
        fn test_case_insensitive() {
            assert_eq!(score("GREAT WIN"), score("great win"));
        }

        #[test]
        fn test_deterministic() {
            let text = "Stocks fall on recession fears";
            assert_eq!(score(text), score(text));
        }

        #[test]
        fn test_bounded_for_extreme_text() {
            let pos = "great ".repeat(500);
            let neg = "fraud ".repeat(500);
            let p = score(&pos);
            let n = score(&neg);
            assert!((-1.0..=1.0).contains(&p));
            assert!((-1.0..=1.0).contains(&n));
            assert!(p > 0.99);
            assert!(n < -0.99);
        }
    }

    mod percent_tests {
        use super::*;

        #[test]
        fn test_anchor_points() {
            assert_eq!(to_percent(-1.0), 0);
            assert_eq!(to_percent(0.0), 50);
            assert_eq!(to_percent(1.0), 100);
        }

        #[test]
        fn test_out_of_range_is_clamped() {
            assert_eq!(to_percent(-3.0), 0);
            assert_eq!(to_percent(7.5), 100);
        }

        #[test]
        fn test_rounding() {
            assert_eq!(to_percent(0.5), 75);
            assert_eq!(to_percent(-0.25), 38);
        }

        #[test]
        fn test_nan_maps_to_midpoint() {
            assert_eq!(to_percent(f64::NAN), 50);
        }
    }

    mod classify_tests {
        use super::*;

        #[test]
        fn test_bands() {
            assert_eq!(classify(0.06), Tone::Positive);
            assert_eq!(classify(-0.06), Tone::Negative);
            assert_eq!(classify(0.0), Tone::Neutral);
        }

        #[test]
        fn test_thresholds_are_exclusive() {
            assert_eq!(classify(0.05), Tone::Neutral);
            assert_eq!(classify(-0.05), Tone::Neutral);
        }

        #[test]
        fn test_tone_from_str() {
            assert_eq!("Positive".parse::<Tone>().unwrap(), Tone::Positive);
            assert_eq!(" negative ".parse::<Tone>().unwrap(), Tone::Negative);
            assert!("angry".parse::<Tone>().is_err());
        }

        #[test]
        fn test_tone_deserializes_like_from_str() {
            let tone: Tone = serde_json::from_str("\"Positive\"").unwrap();
            assert_eq!(tone, Tone::Positive);
            let tone: Tone = serde_json::from_str("\"NEGATIVE\"").unwrap();
            assert_eq!(tone, Tone::Negative);
            assert!(serde_json::from_str::<Tone>("\"angry\"").is_err());
            assert_eq!(serde_json::to_string(&Tone::Neutral).unwrap(), "\"neutral\"");
        }
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(1.7), Some(1.0));
        assert_eq!(clamp_score(-0.3), Some(-0.3));
        assert_eq!(clamp_score(f64::NAN), None);
        assert_eq!(clamp_score(f64::INFINITY), None);
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Mood label driving the visual scene.
///
/// Closed set of four variants. Persists across ticks and only changes on a
/// classification decision or an explicit selection.
///
/// # Example
/// ```
/// use mw_core::mood::Mood;
/// let mood: Mood = "calm".parse().unwrap();
/// assert_eq!(mood, Mood::Bass);
/// assert_eq!(mood.label(), "低沉");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    /// Low, heavy content. Alias: calm.
    #[default]
    #[serde(alias = "calm")]
    Bass,
    /// Bright, high-pitched content. Alias: excited.
    #[serde(alias = "excited")]
    Treble,
    /// Loud, bright and busy content. Alias: happy.
    #[serde(alias = "happy")]
    Joyful,
    /// Quiet, static content. Alias: sad.
    #[serde(alias = "sad")]
    Melancholic,
}

impl Mood {
    /// All variants, in display order.
    pub const ALL: [Mood; 4] = [Mood::Bass, Mood::Treble, Mood::Joyful, Mood::Melancholic];

    /// Canonical snake-case name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Mood::Bass => "bass",
            Mood::Treble => "treble",
            Mood::Joyful => "joyful",
            Mood::Melancholic => "melancholic",
        }
    }

    /// User-facing label shown next to the visuals.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Mood::Bass => "低沉",
            Mood::Treble => "高亢",
            Mood::Joyful => "欢快",
            Mood::Melancholic => "忧郁",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mood {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bass" | "calm" => Ok(Mood::Bass),
            "treble" | "excited" => Ok(Mood::Treble),
            "joyful" | "happy" => Ok(Mood::Joyful),
            "melancholic" | "sad" => Ok(Mood::Melancholic),
            _ => Err(CoreError::UnknownMood {
                name: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_aliases() {
        for mood in Mood::ALL {
            assert_eq!(mood.name().parse::<Mood>(), Ok(mood));
        }
        assert_eq!("Happy".parse::<Mood>(), Ok(Mood::Joyful));
        assert_eq!(" sad ".parse::<Mood>(), Ok(Mood::Melancholic));
        assert_eq!("excited".parse::<Mood>(), Ok(Mood::Treble));
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(
            "angry".parse::<Mood>(),
            Err(CoreError::UnknownMood {
                name: "angry".into()
            })
        );
    }

    #[test]
    fn labels_are_distinct() {
        let mut labels: Vec<_> = Mood::ALL.iter().map(|m| m.label()).collect();
        labels.dedup();
        assert_eq!(labels.len(), 4);
    }
}

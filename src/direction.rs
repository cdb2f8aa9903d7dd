use serde::{Deserialize, Serialize};

/// One of the two languages the translator works between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Thai,
    Japanese,
}

impl Language {
    pub fn name(&self) -> &'static str {
        match self {
            Language::Thai => "Thai",
            Language::Japanese => "Japanese",
        }
    }

    /// BCP-47 tag handed to the speech recognizer
    pub fn speech_tag(&self) -> &'static str {
        match self {
            Language::Thai => "th-TH",
            Language::Japanese => "ja-JP",
        }
    }
}

/// Active source -> target pairing. Exactly one is active per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Direction {
    #[default]
    #[serde(rename = "TH_TO_JP")]
    ThToJp,
    #[serde(rename = "JP_TO_TH")]
    JpToTh,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::ThToJp, Direction::JpToTh];

    pub fn toggle(self) -> Self {
        match self {
            Direction::ThToJp => Direction::JpToTh,
            Direction::JpToTh => Direction::ThToJp,
        }
    }

    pub fn source(&self) -> Language {
        match self {
            Direction::ThToJp => Language::Thai,
            Direction::JpToTh => Language::Japanese,
        }
    }

    pub fn target(&self) -> Language {
        match self {
            Direction::ThToJp => Language::Japanese,
            Direction::JpToTh => Language::Thai,
        }
    }

    /// Whether results in this direction carry a phonetic reading.
    /// Only a Japanese target gets one (hiragana).
    pub fn wants_reading(&self) -> bool {
        self.target() == Language::Japanese
    }

    pub fn speech_tag(&self) -> &'static str {
        self.source().speech_tag()
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Direction::ThToJp => "พิมพ์หรือพูดภาษาไทย...",
            Direction::JpToTh => "日本語を入力...",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::ThToJp => "TH_TO_JP",
            Direction::JpToTh => "JP_TO_TH",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source().name(), self.target().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_between_the_two_directions() {
        assert_eq!(Direction::ThToJp.toggle(), Direction::JpToTh);
        assert_eq!(Direction::JpToTh.toggle(), Direction::ThToJp);
        assert_eq!(Direction::ThToJp.toggle().toggle(), Direction::ThToJp);
    }

    #[test]
    fn test_reading_only_for_japanese_target() {
        assert!(Direction::ThToJp.wants_reading());
        assert!(!Direction::JpToTh.wants_reading());
    }

    #[test]
    fn test_speech_tag_follows_source_language() {
        assert_eq!(Direction::ThToJp.speech_tag(), "th-TH");
        assert_eq!(Direction::JpToTh.speech_tag(), "ja-JP");
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&Direction::JpToTh).unwrap();
        assert_eq!(json, "\"JP_TO_TH\"");
        let parsed: Direction = serde_json::from_str("\"TH_TO_JP\"").unwrap();
        assert_eq!(parsed, Direction::ThToJp);
    }
}

//! Announcer styles, genders, and prebuilt voice selection.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AnnouncerStyle
// ---------------------------------------------------------------------------

/// Delivery style of the generated announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncerStyle {
    /// Dramatic, exaggerated "voice of god" delivery.
    Epic,
    /// Sober, polished corporate/news delivery.
    Professional,
    /// No rewrite at all — the input is announced verbatim.
    Real,
}

impl AnnouncerStyle {
    /// Parse a user-facing style name (`epic`, `professional`, `real`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "epic" => Some(Self::Epic),
            "professional" => Some(Self::Professional),
            "real" => Some(Self::Real),
            _ => None,
        }
    }
}

impl std::fmt::Display for AnnouncerStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Epic => "epic",
            Self::Professional => "professional",
            Self::Real => "real",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// AnnouncerGender
// ---------------------------------------------------------------------------

/// Voice gender of the announcer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncerGender {
    Male,
    Female,
}

impl AnnouncerGender {
    /// Parse a user-facing gender name (`male`, `female`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }
}

impl std::fmt::Display for AnnouncerGender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Male => "male",
            Self::Female => "female",
        })
    }
}

// ---------------------------------------------------------------------------
// Voice selection
// ---------------------------------------------------------------------------

/// Pick the prebuilt synthesis voice for a style/gender pair.
///
/// Pure function over four fixed voices:
///
/// | Gender | Epic     | Professional / Real |
/// |--------|----------|---------------------|
/// | Male   | `Fenrir` (deep, movie-trailer) | `Puck` (clear mid-range) |
/// | Female | `Kore` (sharp, energetic)      | `Zephyr` (calm, smooth)  |
pub fn voice_for(style: AnnouncerStyle, gender: AnnouncerGender) -> &'static str {
    match (gender, style) {
        (AnnouncerGender::Male, AnnouncerStyle::Epic) => "Fenrir",
        (AnnouncerGender::Male, _) => "Puck",
        (AnnouncerGender::Female, AnnouncerStyle::Epic) => "Kore",
        (AnnouncerGender::Female, _) => "Zephyr",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_fixed_voices() {
        assert_eq!(voice_for(AnnouncerStyle::Epic, AnnouncerGender::Male), "Fenrir");
        assert_eq!(voice_for(AnnouncerStyle::Professional, AnnouncerGender::Male), "Puck");
        assert_eq!(voice_for(AnnouncerStyle::Real, AnnouncerGender::Male), "Puck");
        assert_eq!(voice_for(AnnouncerStyle::Epic, AnnouncerGender::Female), "Kore");
        assert_eq!(voice_for(AnnouncerStyle::Professional, AnnouncerGender::Female), "Zephyr");
        assert_eq!(voice_for(AnnouncerStyle::Real, AnnouncerGender::Female), "Zephyr");
    }

    #[test]
    fn style_parse_round_trip() {
        for style in [
            AnnouncerStyle::Epic,
            AnnouncerStyle::Professional,
            AnnouncerStyle::Real,
        ] {
            assert_eq!(AnnouncerStyle::parse(&style.to_string()), Some(style));
        }
        assert_eq!(AnnouncerStyle::parse("dramatic"), None);
    }

    #[test]
    fn gender_parse_round_trip() {
        assert_eq!(AnnouncerGender::parse("MALE"), Some(AnnouncerGender::Male));
        assert_eq!(AnnouncerGender::parse("female"), Some(AnnouncerGender::Female));
        assert_eq!(AnnouncerGender::parse("other"), None);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(
            serde_json::to_string(&AnnouncerStyle::Epic).unwrap(),
            "\"epic\""
        );
        assert_eq!(
            serde_json::from_str::<AnnouncerGender>("\"female\"").unwrap(),
            AnnouncerGender::Female
        );
    }
}

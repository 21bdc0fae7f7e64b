use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Language of the user-facing output
///
/// Part of the cache key, so the same photo analyzed in two languages is
/// stored twice.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    #[default]
    Pt,
    En,
}

impl Language {
    /// Parse a client-supplied tag such as `pt`, `pt-BR` or `en_US`.
    /// Anything that is not Portuguese is answered in English.
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        if primary.is_empty() {
            return Self::default();
        }
        primary.parse().unwrap_or(Self::En)
    }

    /// Pick the text matching this language
    pub fn pick<'a>(&self, pt: &'a str, en: &'a str) -> &'a str {
        match self {
            Self::Pt => pt,
            Self::En => en,
        }
    }
}

impl From<String> for Language {
    fn from(value: String) -> Self {
        Self::from_tag(&value)
    }
}

impl From<Language> for String {
    fn from(value: Language) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pt", Language::Pt)]
    #[case("pt-BR", Language::Pt)]
    #[case("PT_pt", Language::Pt)]
    #[case("en", Language::En)]
    #[case("en-US", Language::En)]
    #[case("es", Language::En)]
    #[case("", Language::Pt)]
    fn tags_are_normalized(#[case] tag: &str, #[case] expected: Language) {
        assert_eq!(Language::from_tag(tag), expected);
    }

    #[test]
    fn serializes_as_lowercase_code() {
        assert_eq!(serde_json::to_string(&Language::En).unwrap(), "\"en\"");
        let parsed: Language = serde_json::from_str("\"pt-BR\"").unwrap();
        assert_eq!(parsed, Language::Pt);
    }
}

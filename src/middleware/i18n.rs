// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

const DEFAULT_LANG: &str = "pt";

// Extrator de idioma a partir do Accept-Language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Locale {
    pub fn is_english(&self) -> bool {
        self.0 == "en"
    }

    pub fn from_header(header_str: &str) -> Self {
        let lang = accept_language::parse(header_str)
            .first() // Pega o idioma de maior peso (ex: "pt-BR")
            .map(|tag_string| {
                // "pt-BR" -> "pt", "en" -> "en"
                tag_string
                    .split('-')
                    .next()
                    .unwrap_or(tag_string)
                    .to_lowercase()
            })
            .unwrap_or_else(|| DEFAULT_LANG.to_string());

        Locale(lang)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        Ok(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_primary_language_of_highest_weight() {
        assert_eq!(Locale::from_header("en-US,en;q=0.9,pt;q=0.8").0, "en");
        assert_eq!(Locale::from_header("pt-BR,pt;q=0.9").0, "pt");
        assert!(Locale::from_header("en").is_english());
    }

    #[test]
    fn empty_header_falls_back_to_portuguese() {
        assert_eq!(Locale::from_header(""), Locale::default());
    }
}

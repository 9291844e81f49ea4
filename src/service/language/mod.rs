mod model;

pub use model::Language;

use whatlang::Lang;

/// Best-effort detection; anything outside the supported set falls back to Lithuanian.
pub fn detect_language(text: &str) -> Language {
    match whatlang::detect_lang(text) {
        Some(Lang::Lit) => Language::Lithuanian,
        Some(Lang::Eng) => Language::English,
        Some(Lang::Rus) => Language::Russian,
        Some(Lang::Pol) => Language::Polish,
        _ => Language::default(),
    }
}

/// The stored profile language wins over detection.
pub fn resolve_language(profile_language: Option<&str>, text: &str) -> Language {
    profile_language
        .and_then(|code| code.parse::<Language>().ok())
        .unwrap_or_else(|| detect_language(text))
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Lithuanian,
    English,
    Russian,
    Polish,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Lithuanian => "lt",
            Language::English => "en",
            Language::Russian => "ru",
            Language::Polish => "pl",
        }
    }

    /// Instruction prepended to the system prompt so the model answers in this language.
    pub fn instruction(self) -> &'static str {
        match self {
            Language::Lithuanian => "Atsakyk lietuviškai.",
            Language::English => "Respond in English.",
            Language::Russian => "Ответь по-русски.",
            Language::Polish => "Odpowiedz po polsku.",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lt" | "lithuanian" | "lietuvių" => Ok(Language::Lithuanian),
            "en" | "english" => Ok(Language::English),
            "ru" | "russian" => Ok(Language::Russian),
            "pl" | "polish" => Ok(Language::Polish),
            _ => Err(format!("Unknown language code: {}", s)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

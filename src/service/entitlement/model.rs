use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd)]
pub enum Tier {
    #[default]
    Free = 0,
    Basic = 1,
    ProStudent = 2,
    Premium = 3,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Free, Tier::Basic, Tier::ProStudent, Tier::Premium];

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn from_level(level: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.level() == level)
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Free => "Free",
            Tier::Basic => "Basic",
            Tier::ProStudent => "Pro Student",
            Tier::Premium => "Premium MedTech",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(level) = trimmed.parse::<u8>() {
            return Self::from_level(level).ok_or_else(|| format!("Unknown tier level: {}", level));
        }
        match trimmed.to_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "basic" => Ok(Tier::Basic),
            "pro" | "pro_student" | "prostudent" => Ok(Tier::ProStudent),
            "premium" => Ok(Tier::Premium),
            _ => Err(format!("Unknown tier: {}", s)),
        }
    }
}

/// A capability gated behind a minimum subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Pdf,
    Flashcards,
    ImageAnalysis,
    Rooms,
}

impl Feature {
    pub fn key(self) -> &'static str {
        match self {
            Feature::Pdf => "pdf",
            Feature::Flashcards => "flashcards",
            Feature::ImageAnalysis => "image_analysis",
            Feature::Rooms => "rooms",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

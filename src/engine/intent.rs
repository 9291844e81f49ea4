use std::sync::LazyLock;
use regex::Regex;

static DOI_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^10\.\d{4,9}/[-._;()/:A-Z0-9]+$").unwrap());

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeywordIntent {
    Quiz,
    Flashcards,
    Notes,
}

/// Trigger words, checked in order. The first set with a match wins.
pub const KEYWORD_RULES: &[(KeywordIntent, &[&str])] = &[
    (KeywordIntent::Quiz, &["testas", "užduotys", "pasitikrink"]),
    (KeywordIntent::Flashcards, &["flashcards", "kortelės", "atmintinė"]),
    (KeywordIntent::Notes, &["konspektas", "santrauka", "paaiškink"]),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Quiz { topic: String },
    Flashcards { topic: String },
    Notes { topic: String },
    Literature { reference: String },
    FreeForm { text: String },
}

impl Intent {
    pub fn feature(&self) -> Option<&'static str> {
        match self {
            Intent::Quiz { .. } => Some("quiz"),
            Intent::Flashcards { .. } => Some("flashcards"),
            Intent::Notes { .. } => Some("notes"),
            Intent::Literature { .. } => Some("literature"),
            Intent::FreeForm { .. } => None,
        }
    }
}

/// One case-insensitive alternation per rule set, in `KEYWORD_RULES` order.
static KEYWORD_REGEXES: LazyLock<Vec<(KeywordIntent, Regex)>> = LazyLock::new(|| {
    KEYWORD_RULES
        .iter()
        .map(|(intent, keywords)| {
            let alternation = keywords.iter().map(|k| regex::escape(k)).collect::<Vec<_>>().join("|");
            (*intent, Regex::new(&format!("(?i){}", alternation)).unwrap())
        })
        .collect()
});

pub fn classify(text: &str) -> Intent {
    let text = text.trim();

    for (intent, regex) in KEYWORD_REGEXES.iter() {
        let Some(found) = regex.find(text) else {
            continue;
        };

        let topic = extract_topic(text, found.start(), found.end());
        return match intent {
            KeywordIntent::Quiz => Intent::Quiz { topic },
            KeywordIntent::Flashcards => Intent::Flashcards { topic },
            KeywordIntent::Notes => Intent::Notes { topic },
        };
    }

    if DOI_REGEX.is_match(text) {
        return Intent::Literature {
            reference: text.to_string(),
        };
    }

    Intent::FreeForm { text: text.to_string() }
}

/// Text after the keyword, or before it when nothing follows, or the whole text.
fn extract_topic(text: &str, start: usize, end: usize) -> String {
    let after = collapse_whitespace(&text[end..]);
    if !after.is_empty() {
        return after;
    }
    let before = collapse_whitespace(&text[..start]);
    if !before.is_empty() {
        return before;
    }
    collapse_whitespace(text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a group message is meant for the bot, and the text with the mention removed.
pub fn addressed_text(text: &str, bot_username: &str, reply_to_bot: bool) -> Option<String> {
    let mention = format!("(?i)@{}", regex::escape(bot_username.trim_start_matches('@')));
    let found = Regex::new(&mention).ok().and_then(|regex| regex.find(text).map(|m| (m.start(), m.end())));

    match found {
        Some((start, end)) => {
            let mut stripped = String::with_capacity(text.len());
            stripped.push_str(&text[..start]);
            stripped.push_str(&text[end..]);
            Some(collapse_whitespace(&stripped))
        }
        None if reply_to_bot => Some(text.trim().to_string()),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_keyword_takes_text_after_trigger() {
        assert_eq!(
            classify("sukurk testas apie astma"),
            Intent::Quiz {
                topic: "apie astma".into()
            }
        );
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        assert_eq!(
            classify("Pasitikrink   širdies   ritmas"),
            Intent::Quiz {
                topic: "širdies ritmas".into()
            }
        );
    }

    #[test]
    fn test_topic_falls_back_to_text_before_keyword() {
        assert_eq!(
            classify("diabetas konspektas"),
            Intent::Notes {
                topic: "diabetas".into()
            }
        );
        assert_eq!(
            classify("flashcards"),
            Intent::Flashcards {
                topic: "flashcards".into()
            }
        );
    }

    #[test]
    fn test_quiz_rules_win_over_later_sets() {
        assert!(matches!(classify("santrauka ir testas"), Intent::Quiz { .. }));
        assert_eq!(
            classify("kortelės: inkstai"),
            Intent::Flashcards {
                topic: ": inkstai".into()
            }
        );
    }

    #[test]
    fn test_doi_detection() {
        assert_eq!(
            classify("10.1000/xyz123"),
            Intent::Literature {
                reference: "10.1000/xyz123".into()
            }
        );
        assert_eq!(
            classify("10.1056/NEJMoa2034577"),
            Intent::Literature {
                reference: "10.1056/NEJMoa2034577".into()
            }
        );
        assert_eq!(
            classify("10.12/x"),
            Intent::FreeForm {
                text: "10.12/x".into()
            }
        );
        assert!(matches!(classify("see 10.1000/xyz123"), Intent::FreeForm { .. }));
    }

    #[test]
    fn test_free_form_fallback() {
        assert_eq!(
            classify("  Kas yra hipertenzija? "),
            Intent::FreeForm {
                text: "Kas yra hipertenzija?".into()
            }
        );
    }

    #[test]
    fn test_addressed_text() {
        assert_eq!(
            addressed_text("@Medic_Bot kas yra astma?", "medic_bot", false),
            Some("kas yra astma?".into())
        );
        assert_eq!(
            addressed_text("kas yra astma?", "medic_bot", true),
            Some("kas yra astma?".into())
        );
        assert_eq!(addressed_text("kas yra astma?", "medic_bot", false), None);
    }

    #[test]
    fn test_keyword_cut_respects_case_folded_widths() {
        // İ lowercases to three bytes and ẞ to two, so byte offsets of the
        // lowercased text do not line up with the original.
        assert_eq!(
            classify("İ testasšẞ"),
            Intent::Quiz {
                topic: "šẞ".into()
            }
        );
        assert_eq!(
            classify("ẞ KONSPEKTAS"),
            Intent::Notes {
                topic: "ẞ".into()
            }
        );
    }

    #[test]
    fn test_mention_strip_respects_case_folded_widths() {
        assert_eq!(
            addressed_text("İ @medic_botšẞ", "medic_bot", false),
            Some("İ šẞ".into())
        );
        assert_eq!(
            addressed_text("@MEDIC_BOT İẞ", "@medic_bot", false),
            Some("İẞ".into())
        );
    }
}

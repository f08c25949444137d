// src/chat/phrases.rs — Phrase matching for chat replies
//
// Reply phrases match on whole words, so "no" does not fire on "know" and
// "yes" does not fire on "eyes".

const THANK_YOU: &[&str] = &["thank you", "thanks", "thank", "thx", "appreciate it"];
const NO_FURTHER_NEED: &[&str] = &[
    "no",
    "nope",
    "that's all",
    "nothing else",
    "all set",
    "i'm good",
    "im good",
];
const WANTS_MORE: &[&str] = &[
    "yes",
    "yeah",
    "yep",
    "sure",
    "please",
    "i do",
    "i have",
    "another question",
];
const NOT_RESOLVED: &[&str] = &[
    "not resolved",
    "still having issues",
    "didn't work",
    "not working",
    "no, still having issues",
    "no",
];
const RESOLVED: &[&str] = &[
    "yes",
    "yeah",
    "yep",
    "resolved",
    "fixed",
    "solved",
    "works",
    "yes, it's resolved",
    "yes, resolved",
];
const NO_ADDITIONAL_INFO: &[&str] = &["no", "no additional info", "none"];

/// Substrings that mark a message as describing a technical problem.
const ISSUE_KEYWORDS: &[&str] = &[
    "error",
    "problem",
    "issue",
    "not working",
    "broken",
    "fails",
    "bug",
    "can't",
    "cannot",
    "doesn't",
    "does not",
];

/// Lower-cased words; apostrophes stay inside words ("didn't").
pub fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// True when the words of `phrase` appear contiguously in `message_words`.
fn contains_phrase(message_words: &[String], phrase: &str) -> bool {
    let phrase_words = words(phrase);
    if phrase_words.is_empty() || phrase_words.len() > message_words.len() {
        return false;
    }
    message_words
        .windows(phrase_words.len())
        .any(|w| w == phrase_words.as_slice())
}

fn starts_with_phrase(message_words: &[String], phrase: &str) -> bool {
    let phrase_words = words(phrase);
    !phrase_words.is_empty() && message_words.starts_with(&phrase_words)
}

fn contains_any(message: &str, phrases: &[&str]) -> bool {
    let w = words(message);
    phrases.iter().any(|p| contains_phrase(&w, p))
}

pub fn is_thanks(message: &str) -> bool {
    contains_any(message, THANK_YOU)
}

/// "No", "nope, that's all", "I'm good" and similar openings.
pub fn is_no_further_need(message: &str) -> bool {
    let w = words(message);
    NO_FURTHER_NEED.iter().any(|p| starts_with_phrase(&w, p))
}

pub fn wants_more_help(message: &str) -> bool {
    contains_any(message, WANTS_MORE)
}

pub fn is_not_resolved(message: &str) -> bool {
    contains_any(message, NOT_RESOLVED)
}

pub fn is_resolved(message: &str) -> bool {
    contains_any(message, RESOLVED)
}

pub fn declines_additional_info(message: &str) -> bool {
    let trimmed = message.trim().to_lowercase();
    NO_ADDITIONAL_INFO.contains(&trimmed.as_str())
}

pub fn mentions_issue_keyword(message: &str) -> bool {
    let lowered = message.to_lowercase();
    ISSUE_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// All digits of `message` read as one number, e.g. "4 stars" -> 4.
pub fn rating_digits(message: &str) -> Option<u64> {
    let digits: String = message.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_keep_apostrophes() {
        assert_eq!(words("Didn't work, sorry!"), vec!["didn't", "work", "sorry"]);
        assert_eq!(words("'quoted'"), vec!["quoted"]);
    }

    #[test]
    fn test_word_boundaries() {
        assert!(!is_not_resolved("I know it now"));
        assert!(!is_resolved("my eyes hurt"));
        assert!(is_not_resolved("No"));
        assert!(is_resolved("Yes!"));
    }

    #[test]
    fn test_not_resolved_variants() {
        assert!(is_not_resolved("No, still having issues"));
        assert!(is_not_resolved("that didn't work"));
        assert!(is_not_resolved("It's not resolved"));
        // Negated resolution still contains "resolved"; callers check this first.
        assert!(is_resolved("It's not resolved"));
    }

    #[test]
    fn test_resolved_variants() {
        assert!(is_resolved("Yes, it's resolved"));
        assert!(is_resolved("it works now"));
        assert!(is_resolved("fixed, thanks"));
        assert!(!is_resolved("maybe later"));
    }

    #[test]
    fn test_thanks() {
        assert!(is_thanks("Thanks a lot"));
        assert!(is_thanks("thank you so much"));
        assert!(is_thanks("I appreciate it"));
        assert!(!is_thanks("thanksgiving plans"));
    }

    #[test]
    fn test_no_further_need_is_prefix() {
        assert!(is_no_further_need("no"));
        assert!(is_no_further_need("Nope, that's all"));
        assert!(is_no_further_need("I'm good thanks"));
        assert!(!is_no_further_need("I have no idea"));
        assert!(!is_no_further_need("nothing"));
    }

    #[test]
    fn test_wants_more_help() {
        assert!(wants_more_help("Yes please"));
        assert!(wants_more_help("I have another question"));
        assert!(!wants_more_help("maybe"));
    }

    #[test]
    fn test_declines_additional_info() {
        assert!(declines_additional_info("No additional info"));
        assert!(declines_additional_info("  none "));
        assert!(!declines_additional_info("No, but it started yesterday"));
    }

    #[test]
    fn test_issue_keywords_are_substrings() {
        assert!(mentions_issue_keyword("Got an ERROR code"));
        assert!(mentions_issue_keyword("the app doesn't start"));
        assert!(mentions_issue_keyword("issues everywhere"));
        assert!(!mentions_issue_keyword("hello there"));
    }

    #[test]
    fn test_rating_digits() {
        assert_eq!(rating_digits("4 stars"), Some(4));
        assert_eq!(rating_digits("1 0"), Some(10));
        assert_eq!(rating_digits("great"), None);
    }
}

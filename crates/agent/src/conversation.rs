use std::sync::OnceLock;

use regex::Regex;

/// Structured fragments pulled out of a free-text message. Values are raw; callers
/// canonicalize them before they reach a store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageSignals {
    pub confirmation_number: Option<String>,
    pub flight_number: Option<String>,
    pub seat_number: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub company_name: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct SignalExtractor;

static FLIGHT_AFTER_KEYWORD: OnceLock<Option<Regex>> = OnceLock::new();
static HYPHENATED_FLIGHT: OnceLock<Option<Regex>> = OnceLock::new();
static CONFIRMATION: OnceLock<Option<Regex>> = OnceLock::new();
static SEAT_AFTER_KEYWORD: OnceLock<Option<Regex>> = OnceLock::new();
static SEAT_AFTER_TO: OnceLock<Option<Regex>> = OnceLock::new();
static INDUSTRY_BEFORE_NOUN: OnceLock<Option<Regex>> = OnceLock::new();
static COMPANY_NAME: OnceLock<Option<Regex>> = OnceLock::new();

const INDUSTRY_STOPWORDS: &[&str] = &[
    "a", "add", "all", "any", "find", "for", "list", "my", "new", "other", "our", "register",
    "search", "show", "some", "the", "which", "your",
];

const LOCATION_MARKERS: &[&str] = &["in", "from", "near"];

const LOCATION_STOPWORDS: &[&str] = &[
    "and", "businesses", "companies", "for", "industry", "sector", "space", "startups", "that",
    "who", "with", "working",
];

impl SignalExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, text: &str) -> MessageSignals {
        let flight_number = first_capture(
            &FLIGHT_AFTER_KEYWORD,
            r"(?i)\bflight\s+(?:number\s+|no\.?\s+|#\s*)?([a-z]{2,3}-?\d{1,4})\b",
            text,
        )
        .or_else(|| first_capture(&HYPHENATED_FLIGHT, r"\b([A-Z]{2,3}-\d{1,4})\b", text))
        .map(|value| value.to_ascii_uppercase());

        let confirmation_number =
            first_capture(&CONFIRMATION, r"(?i)\b([a-z]{3,5}\d{3,6})\b", text)
                .map(|value| value.to_ascii_uppercase())
                .filter(|value| Some(value) != flight_number.as_ref());

        let seat_number = first_capture(
            &SEAT_AFTER_KEYWORD,
            r"(?i)\bseat\s+(?:number\s+)?(?:to\s+)?(\d{1,2}[a-f])\b",
            text,
        )
        .or_else(|| first_capture(&SEAT_AFTER_TO, r"(?i)\b(?:to|into)\s+(\d{1,2}[a-f])\b", text))
        .map(|value| value.to_ascii_uppercase());

        MessageSignals {
            confirmation_number,
            flight_number,
            seat_number,
            industry: extract_industry(text),
            location: extract_location(text),
            company_name: first_capture(
                &COMPANY_NAME,
                r#"\b(?:[Cc]ompany|[Cc]alled|[Nn]amed)\s+"?([A-Z][\w&.-]*(?:\s+[A-Z][\w&.-]*){0,3})"#,
                text,
            ),
        }
    }
}

pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn first_capture(
    cell: &'static OnceLock<Option<Regex>>,
    pattern: &str,
    text: &str,
) -> Option<String> {
    compiled(cell, pattern)?
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|matched| matched.as_str().to_string())
}

fn extract_industry(text: &str) -> Option<String> {
    let pattern = compiled(
        &INDUSTRY_BEFORE_NOUN,
        r"(?i)\b([a-z][a-z-]+)\s+(?:companies|company|businesses|business|startups|startup|firms|sector|industry)\b",
    )?;

    pattern
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|matched| matched.as_str())
        .find(|word| !INDUSTRY_STOPWORDS.contains(&word.to_lowercase().as_str()))
        .map(str::to_string)
}

fn extract_location(text: &str) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();

    for (index, word) in words.iter().enumerate() {
        if !LOCATION_MARKERS.contains(&bare(word).to_lowercase().as_str()) {
            continue;
        }

        let mut phrase = Vec::new();
        let mut next = index + 1;
        while let Some(candidate) = words.get(next) {
            let cleaned = bare(candidate);
            let lowered = cleaned.to_lowercase();
            if cleaned.is_empty() || LOCATION_STOPWORDS.contains(&lowered.as_str()) {
                break;
            }
            if phrase.is_empty() && matches!(lowered.as_str(), "the" | "a" | "an" | "my") {
                break;
            }
            phrase.push(cleaned);
            next += 1;
            if phrase.len() == 3 || ends_clause(candidate) {
                break;
            }
        }

        let followed_by_sector = words
            .get(next)
            .map(|word| matches!(bare(word).to_lowercase().as_str(), "sector" | "industry" | "space"))
            .unwrap_or(false);
        if !phrase.is_empty() && !followed_by_sector {
            return Some(phrase.join(" "));
        }
    }

    None
}

fn bare(word: &str) -> &str {
    word.trim_matches(|character: char| !character.is_alphanumeric())
}

fn ends_clause(word: &str) -> bool {
    word.ends_with([',', '.', '?', '!', ';'])
}

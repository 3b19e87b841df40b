use anyhow::{anyhow, Result};
use isolang::Language;

/// Language utilities
///
/// Validation and matching of ISO 639-1 / 639-2 codes, used for caption
/// track selection and translation prompts, plus a script-based guess of a
/// transcript's language.

/// Language code type
#[derive(Debug, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

// ISO 639-2/B codes that differ from their 639-2/T counterpart
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

fn bibliographic_to_terminologic(code: &str) -> Option<&'static str> {
    BIBLIOGRAPHIC_CODES
        .iter()
        .find(|(b, _)| *b == code)
        .map(|(_, t)| *t)
}

/// Strip a region or script suffix such as `en-US` or `zh_Hans`
fn primary_subtag(code: &str) -> String {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = primary_subtag(code);

    if normalized_code.len() == 2 {
        if Language::from_639_1(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part1);
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part2T);
        }
        if bibliographic_to_terminologic(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part2B);
        }
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = primary_subtag(code);

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
        if let Some(part2t) = bibliographic_to_terminologic(&normalized_code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Guess the language of a transcript from the scripts it is written in.
///
/// Counts Hangul syllables, Japanese kana, CJK ideographs and ASCII
/// letters; the largest group wins. When even the winner is under 5% of the
/// text the guess is English.
pub fn detect_language(text: &str) -> &'static str {
    let mut korean = 0usize;
    let mut japanese = 0usize;
    let mut chinese = 0usize;
    let mut english = 0usize;
    let mut total = 0usize;

    for c in text.chars() {
        total += 1;
        match c {
            '\u{AC00}'..='\u{D7A3}' => korean += 1,
            '\u{3040}'..='\u{30FE}' => japanese += 1,
            '\u{4E00}'..='\u{9FFE}' => chinese += 1,
            c if c.is_ascii_alphabetic() => english += 1,
            _ => {}
        }
    }

    // Ties resolve in this order
    let counts = [("ko", korean), ("ja", japanese), ("zh", chinese), ("en", english)];
    let (lang, best) = counts
        .iter()
        .fold(("ko", 0usize), |acc, &(lang, n)| if n > acc.1 { (lang, n) } else { acc });

    if (best as f64) < total as f64 * 0.05 || best == 0 {
        return "en";
    }

    lang
}

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::dictionary::normalize_line;

/// A character and its two-letter split code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitAuxEntry {
    pub word: String,
    pub code: String,
}

static HAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\p{Han}$").expect("static regex"));
static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z]{2,}$").expect("static regex"));

pub fn is_han(ch: char) -> bool {
    let mut buf = [0u8; 4];
    HAN.is_match(ch.encode_utf8(&mut buf))
}

/// Parse the auxiliary code list: `<char> <code>` per line. Codes are cut to
/// two letters and `(char, code)` pairs are deduplicated, first one wins.
pub fn parse_split_aux_text(content: &str) -> Vec<SplitAuxEntry> {
    let mut result = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for line in content.lines() {
        let line = normalize_line(line.trim_start_matches('\u{feff}'));
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let (Some(first), Some(code)) = (parts.next(), parts.next()) else {
            continue;
        };

        let Some(word) = first.chars().next() else {
            continue;
        };
        if !is_han(word) {
            continue;
        }

        let code = code.to_ascii_lowercase();
        if !CODE.is_match(&code) {
            continue;
        }

        let code: String = code.chars().take(2).collect();
        let word = word.to_string();
        if !seen.insert((word.clone(), code.clone())) {
            continue;
        }

        result.push(SplitAuxEntry { word, code });
    }

    result
}

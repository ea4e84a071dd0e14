use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::dictionary::normalize_line;

/// One decomposition of a character: its radicals and the full code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChaifenEntry {
    pub word: String,
    pub radicals: String,
    pub code: String,
}

pub type ChaifenDictionary = HashMap<String, Vec<ChaifenEntry>>;

static TRAILING_NON_LETTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[^a-z]+$").expect("static regex"));
static RADICALS_AND_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*?)([a-z]+)$").expect("static regex"));
static TAB_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\t+").expect("static regex"));

/// Parse a Rime-style split dictionary: `<word>\t<radicals><code>` per line.
/// Malformed lines are skipped. A word may carry several entries; their order
/// is kept.
pub fn parse_chaifen_yaml(content: &str) -> ChaifenDictionary {
    let mut dictionary = ChaifenDictionary::new();

    for line in content.lines() {
        let line = normalize_line(line);
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed == "---" || trimmed == "..." {
            continue;
        }

        let parts: Vec<&str> = TAB_RUN.split(trimmed).collect();
        if parts.len() < 2 {
            continue;
        }

        let word = parts[0].trim();
        let raw_payload = parts[1..].concat();
        let raw_payload = raw_payload.trim();
        if word.is_empty() || raw_payload.is_empty() {
            continue;
        }

        let compact: String = raw_payload.chars().filter(|c| !c.is_whitespace()).collect();
        let cleaned = TRAILING_NON_LETTERS.replace(&compact, "");
        let Some(caps) = RADICALS_AND_CODE.captures(&cleaned) else {
            continue;
        };

        let radicals = caps[1].trim();
        let code = caps[2].to_ascii_lowercase();
        if radicals.is_empty() || code.is_empty() {
            continue;
        }

        dictionary
            .entry(word.to_string())
            .or_default()
            .push(ChaifenEntry {
                word: word.to_string(),
                radicals: radicals.to_string(),
                code,
            });
    }

    dictionary
}

/// The entry whose code matches `expected_code`, falling back to the first.
pub fn pick_entry_by_code<'a>(
    entries: &'a [ChaifenEntry],
    expected_code: &str,
) -> Option<&'a ChaifenEntry> {
    let expected = expected_code.to_ascii_lowercase();
    entries
        .iter()
        .find(|e| e.code == expected)
        .or_else(|| entries.first())
}

/// Radicals as space-separated glyphs, for display.
pub fn format_radicals(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

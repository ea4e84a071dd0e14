use serde::{Deserialize, Serialize};

use crate::practice::question::{DrillQuestion, QuestionBanks};
use crate::scheme::Scheme;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootQuestion {
    pub id: String,
    pub key: String,
    pub radical: String,
}

impl DrillQuestion for RootQuestion {
    fn id(&self) -> &str {
        &self.id
    }

    fn answer(&self) -> &str {
        &self.key
    }

    fn payload(&self) -> &str {
        &self.radical
    }
}

/// Key letter (uppercase) and the radicals assigned to it, as one string.
type MappingRow = (char, &'static str);

const BASIC_MAPPINGS: &[MappingRow] = &[
    ('Q', "火"),
    ('W', "王"),
    ('E', "禾"),
    ('R', "亻"),
    ('T', "土"),
    ('Y', "月"),
    ('U', "氵水"),
    ('I', "纟"),
    ('O', "虫"),
    ('P', "撇"),
    ('A', "讠言"),
    ('S', "竖"),
    ('D', "点"),
    ('F', "扌手"),
    ('G', "竹辶"),
    ('H', "横"),
    ('J', "钅金"),
    ('K', "口"),
    ('L', "日"),
    ('Z', "⻊足"),
    ('X', "忄心"),
    ('C', "艹"),
    ('V', "折"),
    ('B', "宀"),
    ('N', "女"),
    ('M', "木"),
];

const PLUS_MAPPINGS: &[MappingRow] = &[
    ('Q', "火龶"),
    ('W', "王亠攵"),
    ('E', "禾阝"),
    ('R', "亻彳"),
    ('T', "土田"),
    ('Y', "月又雨"),
    ('U', "氵"),
    ('I', "纟厶"),
    ('O', "虫刂"),
    ('P', "撇"),
    ('A', "讠"),
    ('S', "竖西饣尸"),
    ('D', "点"),
    ('F', "扌十"),
    ('G', "竹辶弓山⺈"),
    ('H', "横"),
    ('J', "钅几巾"),
    ('K', "口"),
    ('L', "日力大目"),
    ('Z', "⻊子疒"),
    ('X', "忄小彐广"),
    ('C', "艹车乂寸"),
    ('V', "折舟犭"),
    ('B', "宀贝勹八石"),
    ('N', "女鸟"),
    ('M', "木门"),
];

pub const KEYBOARD_ROWS: &[&[char]] = &[
    &['Q', 'W', 'E', 'R', 'T', 'Y', 'U', 'I', 'O', 'P'],
    &['A', 'S', 'D', 'F', 'G', 'H', 'J', 'K', 'L'],
    &['Z', 'X', 'C', 'V', 'B', 'N', 'M'],
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootKeyMapping {
    pub key: char,
    pub radicals: Vec<String>,
}

fn mapping_rows(scheme: Scheme) -> &'static [MappingRow] {
    match scheme {
        Scheme::Basic => BASIC_MAPPINGS,
        Scheme::Plus => PLUS_MAPPINGS,
    }
}

fn split_radicals(value: &str) -> Vec<String> {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_string())
        .collect()
}

pub fn root_mappings(scheme: Scheme) -> Vec<RootKeyMapping> {
    mapping_rows(scheme)
        .iter()
        .map(|&(key, roots)| RootKeyMapping {
            key: key.to_ascii_uppercase(),
            radicals: split_radicals(roots),
        })
        .collect()
}

/// Radicals on one key, for the keyboard chart. `key` is case-insensitive.
pub fn radicals_for_key(scheme: Scheme, key: char) -> Vec<String> {
    let key = key.to_ascii_uppercase();
    root_mappings(scheme)
        .into_iter()
        .find(|m| m.key == key)
        .map(|m| m.radicals)
        .unwrap_or_default()
}

/// One question per (key, radical), in table order.
pub fn build_root_questions(scheme: Scheme) -> Vec<RootQuestion> {
    root_mappings(scheme)
        .iter()
        .enumerate()
        .flat_map(|(mapping_index, mapping)| {
            mapping
                .radicals
                .iter()
                .enumerate()
                .map(move |(radical_index, radical)| RootQuestion {
                    id: format!(
                        "{}-{mapping_index}-{radical_index}-{}-{radical}",
                        scheme.as_str(),
                        mapping.key
                    ),
                    key: mapping.key.to_ascii_lowercase().to_string(),
                    radical: radical.clone(),
                })
        })
        .collect()
}

pub fn build_root_banks() -> QuestionBanks<RootQuestion> {
    QuestionBanks::from_fn(build_root_questions)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::scheme::ALL_SCHEMES;

    #[test]
    fn test_build_is_deterministic() {
        for scheme in ALL_SCHEMES {
            assert_eq!(build_root_questions(scheme), build_root_questions(scheme));
        }
    }

    #[test]
    fn test_ids_are_unique_per_scheme() {
        for scheme in ALL_SCHEMES {
            let questions = build_root_questions(scheme);
            let ids: HashSet<&str> = questions.iter().map(|q| q.id.as_str()).collect();
            assert_eq!(ids.len(), questions.len(), "duplicate id in {scheme:?}");
        }
    }

    #[test]
    fn test_basic_bank_shape() {
        let questions = build_root_questions(Scheme::Basic);
        // 26 keys, seven of which carry two radicals
        assert_eq!(questions.len(), 33);
        assert_eq!(questions[0].id, "basic-0-0-Q-火");
        assert_eq!(questions[0].key, "q");
        assert_eq!(questions[0].radical, "火");
        assert!(questions.iter().all(|q| q.key.len() == 1));
    }

    #[test]
    fn test_plus_bank_has_more_radicals() {
        let basic = build_root_questions(Scheme::Basic).len();
        let plus = build_root_questions(Scheme::Plus).len();
        assert!(plus > basic);
    }

    #[test]
    fn test_radicals_for_key_is_case_insensitive() {
        assert_eq!(radicals_for_key(Scheme::Basic, 'u'), vec!["氵", "水"]);
        assert_eq!(radicals_for_key(Scheme::Plus, 'B').len(), 5);
        assert!(radicals_for_key(Scheme::Basic, '1').is_empty());
    }

    #[test]
    fn test_keyboard_rows_cover_every_mapping() {
        let keys: HashSet<char> = KEYBOARD_ROWS.iter().flat_map(|r| r.iter().copied()).collect();
        for scheme in ALL_SCHEMES {
            for mapping in root_mappings(scheme) {
                assert!(keys.contains(&mapping.key));
            }
        }
    }
}

use serde::{Deserialize, Deserializer, Serialize};

use crate::dictionary::aux_codes::SplitAuxEntry;
use crate::dictionary::chaifen::{ChaifenDictionary, pick_entry_by_code};
use crate::practice::question::DrillQuestion;
use crate::scheme::Scheme;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitQuestion {
    pub id: String,
    pub word: String,
    pub code: String,
    /// Decomposition shown as a hint; `None` when the split dictionary has no
    /// entry for the character. Stored questions must carry the key, as `null`
    /// when there is no hint.
    #[serde(deserialize_with = "present_or_null")]
    pub radicals: Option<String>,
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

impl DrillQuestion for SplitQuestion {
    fn id(&self) -> &str {
        &self.id
    }

    fn answer(&self) -> &str {
        &self.code
    }

    fn payload(&self) -> &str {
        &self.word
    }
}

/// One question per auxiliary-code entry, in file order.
pub fn build_split_questions(
    scheme: Scheme,
    aux_entries: &[SplitAuxEntry],
    dictionary: &ChaifenDictionary,
) -> Vec<SplitQuestion> {
    aux_entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let radicals = dictionary
                .get(&entry.word)
                .and_then(|entries| pick_entry_by_code(entries, &entry.code))
                .map(|matched| matched.radicals.clone());
            SplitQuestion {
                id: format!("{}-{index}-{}-{}", scheme.as_str(), entry.word, entry.code),
                word: entry.word.clone(),
                code: entry.code.clone(),
                radicals,
            }
        })
        .collect()
}

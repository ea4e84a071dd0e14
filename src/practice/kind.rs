use crate::dictionary::aux_codes::parse_split_aux_text;
use crate::dictionary::cache::DictionaryCache;
use crate::dictionary::chaifen::parse_chaifen_yaml;
use crate::dictionary::loader::CancelToken;
use crate::dictionary::source::{DictionarySource, Resource};
use crate::error::LoadError;
use crate::practice::question::{DrillQuestion, QuestionBanks};
use crate::practice::root::{RootQuestion, build_root_banks};
use crate::practice::split::{SplitQuestion, build_split_questions};
use crate::scheme::{ALL_SCHEMES, Scheme};

/// What varies between the drills: the question shape, where banks come
/// from, how long an answer is, and where sessions are stored.
pub trait DrillKind: 'static {
    type Question: DrillQuestion + Send + 'static;

    /// Short name used in logs.
    const NAME: &'static str;
    /// Namespaced key of the persisted snapshot.
    const STORAGE_KEY: &'static str;
    /// Input is evaluated as soon as it reaches this many characters.
    const ANSWER_LEN: usize;

    fn load_banks(
        source: &DictionarySource,
        cache: &DictionaryCache,
        cancel: &CancelToken,
    ) -> Result<QuestionBanks<Self::Question>, LoadError>;
}

/// Radical shown, key letter expected.
pub struct RootDrill;

impl DrillKind for RootDrill {
    type Question = RootQuestion;

    const NAME: &'static str = "root";
    const STORAGE_KEY: &'static str = "shouyou.practice.root.v1";
    const ANSWER_LEN: usize = 1;

    fn load_banks(
        _source: &DictionarySource,
        _cache: &DictionaryCache,
        cancel: &CancelToken,
    ) -> Result<QuestionBanks<RootQuestion>, LoadError> {
        cancel.check()?;
        Ok(build_root_banks())
    }
}

/// Character shown, two-letter split code expected.
pub struct SplitDrill;

impl SplitDrill {
    fn load_scheme(
        scheme: Scheme,
        source: &DictionarySource,
        cache: &DictionaryCache,
        cancel: &CancelToken,
    ) -> Result<Vec<SplitQuestion>, LoadError> {
        cancel.check()?;
        let aux = cache.aux_or_load(scheme, || {
            source
                .read(Resource::AuxCodes(scheme))
                .map(|text| parse_split_aux_text(&text))
        })?;
        cancel.check()?;
        let dictionary = cache.chaifen_or_load(scheme, || {
            source
                .read(Resource::Chaifen(scheme))
                .map(|text| parse_chaifen_yaml(&text))
        })?;
        Ok(build_split_questions(scheme, &aux, &dictionary))
    }
}

impl DrillKind for SplitDrill {
    type Question = SplitQuestion;

    const NAME: &'static str = "split";
    const STORAGE_KEY: &'static str = "shouyou.practice.split.v1";
    const ANSWER_LEN: usize = 2;

    fn load_banks(
        source: &DictionarySource,
        cache: &DictionaryCache,
        cancel: &CancelToken,
    ) -> Result<QuestionBanks<SplitQuestion>, LoadError> {
        let mut banks = QuestionBanks::default();
        for scheme in ALL_SCHEMES {
            let questions = Self::load_scheme(scheme, source, cache, cancel)?;
            match scheme {
                Scheme::Basic => banks.basic = questions,
                Scheme::Plus => banks.plus = questions,
            }
        }
        Ok(banks)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write_resources(dir: &std::path::Path) {
        for scheme in ALL_SCHEMES {
            fs::write(
                dir.join(Resource::AuxCodes(scheme).file_name()),
                "的 dq\n好 nz\n",
            )
            .unwrap();
            fs::write(
                dir.join(Resource::Chaifen(scheme).file_name()),
                "的\t白勺dq\n好\t女子nz\n",
            )
            .unwrap();
        }
    }

    #[test]
    fn test_root_banks_ignore_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = DictionarySource::local(dir.path().to_path_buf());
        let banks =
            RootDrill::load_banks(&source, &DictionaryCache::new(), &CancelToken::new()).unwrap();
        assert_eq!(banks.total(Scheme::Basic), 33);
    }

    #[test]
    fn test_split_banks_from_local_files() {
        let dir = tempfile::tempdir().unwrap();
        write_resources(dir.path());
        let source = DictionarySource::local(dir.path().to_path_buf());
        let cache = DictionaryCache::new();
        let banks = SplitDrill::load_banks(&source, &cache, &CancelToken::new()).unwrap();
        assert_eq!(banks.total(Scheme::Basic), 2);
        assert_eq!(banks.get(Scheme::Plus)[1].id, "plus-1-好-nz");
        assert!(!cache.is_empty());
    }

    #[test]
    fn test_split_banks_fail_when_resources_missing() {
        let dir = tempfile::tempdir().unwrap();
        let source = DictionarySource::local(dir.path().to_path_buf());
        let err = SplitDrill::load_banks(&source, &DictionaryCache::new(), &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, LoadError::Missing { .. }));
    }

    #[test]
    fn test_cancelled_load_stops_early() {
        let dir = tempfile::tempdir().unwrap();
        write_resources(dir.path());
        let source = DictionarySource::local(dir.path().to_path_buf());
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = SplitDrill::load_banks(&source, &DictionaryCache::new(), &cancel).unwrap_err();
        assert!(err.is_cancelled());
    }
}

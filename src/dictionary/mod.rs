pub mod aux_codes;
pub mod cache;
pub mod chaifen;
pub mod loader;
pub mod source;

use icu_normalizer::ComposingNormalizerBorrowed;

/// NFC-normalise a resource line so compatibility ideographs compare equal
/// to their unified forms.
pub(crate) fn normalize_line(line: &str) -> String {
    ComposingNormalizerBorrowed::new_nfc()
        .normalize(line)
        .into_owned()
}

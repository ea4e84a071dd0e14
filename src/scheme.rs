use serde::{Deserialize, Serialize};

/// One of the two parallel variants of the input scheme. Each owns its own
/// question bank and its own drill session.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Basic,
    Plus,
}

pub const ALL_SCHEMES: [Scheme; 2] = [Scheme::Basic, Scheme::Plus];

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Basic => "basic",
            Scheme::Plus => "plus",
        }
    }

    /// Lenient parse used for stored state: anything other than `plus` is `basic`.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("plus") => Scheme::Plus,
            _ => Scheme::Basic,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Scheme::Basic => Scheme::Plus,
            Scheme::Plus => Scheme::Basic,
        }
    }

    /// Locale key for the scheme's display label.
    pub fn label_key(self) -> &'static str {
        match self {
            Scheme::Basic => "scheme.basic",
            Scheme::Plus => "scheme.plus",
        }
    }
}

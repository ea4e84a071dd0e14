use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::scheme::Scheme;

/// A single drill prompt. Questions are immutable once built; the engine only
/// moves them between queues.
pub trait DrillQuestion: Clone + std::fmt::Debug + PartialEq + Serialize + DeserializeOwned {
    /// Stable id, unique within one scheme's bank.
    fn id(&self) -> &str;
    /// Expected answer, lowercase.
    fn answer(&self) -> &str;
    /// Glyph shown to the learner.
    fn payload(&self) -> &str;
}

/// One ordered question bank per scheme.
#[derive(Clone, Debug, PartialEq)]
pub struct QuestionBanks<Q> {
    pub basic: Vec<Q>,
    pub plus: Vec<Q>,
}

impl<Q> Default for QuestionBanks<Q> {
    fn default() -> Self {
        Self {
            basic: Vec::new(),
            plus: Vec::new(),
        }
    }
}

impl<Q> QuestionBanks<Q> {
    pub fn get(&self, scheme: Scheme) -> &[Q] {
        match scheme {
            Scheme::Basic => &self.basic,
            Scheme::Plus => &self.plus,
        }
    }

    pub fn total(&self, scheme: Scheme) -> usize {
        self.get(scheme).len()
    }

    pub fn from_fn(mut build: impl FnMut(Scheme) -> Vec<Q>) -> Self {
        Self {
            basic: build(Scheme::Basic),
            plus: build(Scheme::Plus),
        }
    }
}

use std::collections::{BTreeSet, HashMap, VecDeque};

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::practice::question::DrillQuestion;

/// Outcome of evaluating one submitted answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Evaluation {
    /// Nothing left to ask; the submission was ignored.
    NoQuestion,
    /// Right answer. `corrected` is set when the question had been missed
    /// before, in which case it was queued for one more pass.
    Correct { corrected: bool },
    /// Wrong answer; the question stays at the head of the queue.
    Incorrect { expected: String },
}

/// One scheme's progress through a round. This is also the persisted form;
/// field names match the stored JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session<Q> {
    pub main_queue: VecDeque<Q>,
    pub retry_queue: Vec<Q>,
    pub attempts: u64,
    pub correct_attempts: u64,
    #[serde(rename = "completedQuestionIds")]
    pub completed_ids: BTreeSet<String>,
    pub wrong_on_current: bool,
}

impl<Q> Default for Session<Q> {
    fn default() -> Self {
        Self {
            main_queue: VecDeque::new(),
            retry_queue: Vec::new(),
            attempts: 0,
            correct_attempts: 0,
            completed_ids: BTreeSet::new(),
            wrong_on_current: false,
        }
    }
}

impl<Q: DrillQuestion> Session<Q> {
    /// A fresh round over `questions`, in a uniform random order when
    /// `shuffle` is set.
    pub fn start_round<R: Rng + ?Sized>(questions: &[Q], shuffle: bool, rng: &mut R) -> Self {
        let mut order = questions.to_vec();
        if shuffle {
            order.shuffle(rng);
        }
        Self {
            main_queue: order.into(),
            ..Self::default()
        }
    }

    /// A fresh round in bank order.
    pub fn unshuffled(questions: &[Q]) -> Self {
        Self {
            main_queue: questions.iter().cloned().collect(),
            ..Self::default()
        }
    }

    pub fn current(&self) -> Option<&Q> {
        self.main_queue.front()
    }

    /// Compare `submitted` (case-insensitive) with the current question's
    /// answer and advance the queues.
    pub fn evaluate(&mut self, submitted: &str) -> Evaluation {
        let Some(current) = self.main_queue.front() else {
            return Evaluation::NoQuestion;
        };

        let expected = current.answer().to_lowercase();
        self.attempts += 1;

        if submitted.to_lowercase() != expected {
            self.wrong_on_current = true;
            return Evaluation::Incorrect { expected };
        }

        self.correct_attempts += 1;
        let Some(answered) = self.main_queue.pop_front() else {
            return Evaluation::NoQuestion;
        };
        self.completed_ids.insert(answered.id().to_string());

        let corrected = self.wrong_on_current;
        if corrected {
            self.retry_queue.push(answered);
        }
        if self.main_queue.is_empty() && !self.retry_queue.is_empty() {
            self.main_queue = std::mem::take(&mut self.retry_queue).into();
        }
        self.wrong_on_current = false;

        Evaluation::Correct { corrected }
    }

    /// Align a restored session with the current bank. Queued questions and
    /// completed ids the bank no longer has are dropped, queued questions take
    /// the bank's copy, and a session left without a head question is refilled
    /// from its retry queue or else from the unanswered part of the bank.
    pub fn reconcile<R: Rng + ?Sized>(&mut self, questions: &[Q], rng: &mut R) {
        let known: HashMap<&str, &Q> = questions.iter().map(|q| (q.id(), q)).collect();
        let from_bank = |q: &Q| known.get(q.id()).map(|&q| q.clone());
        let head = self.current().map(|q| q.id().to_string());

        self.main_queue = self.main_queue.iter().filter_map(from_bank).collect();
        self.retry_queue = self.retry_queue.iter().filter_map(from_bank).collect();
        self.completed_ids.retain(|id| known.contains_key(id.as_str()));

        if self.main_queue.is_empty() {
            self.main_queue = std::mem::take(&mut self.retry_queue).into();
        }
        if self.main_queue.is_empty() && self.completed_count() < questions.len() {
            let mut remaining: Vec<Q> = questions
                .iter()
                .filter(|q| !self.completed_ids.contains(q.id()))
                .cloned()
                .collect();
            remaining.shuffle(rng);
            self.main_queue = remaining.into();
        }
        if self.current().map(|q| q.id()) != head.as_deref() {
            self.wrong_on_current = false;
        }
    }

    pub fn completed_count(&self) -> usize {
        self.completed_ids.len()
    }

    pub fn retry_count(&self) -> usize {
        self.retry_queue.len()
    }

    /// Percentage of correct attempts, rounded; 0 before any attempt.
    pub fn accuracy(&self) -> u32 {
        if self.attempts == 0 {
            return 0;
        }
        (self.correct_attempts as f64 / self.attempts as f64 * 100.0).round() as u32
    }

    pub fn progress(&self, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        (self.completed_count() as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// Every question answered and both queues drained. An empty bank never
    /// completes.
    pub fn is_complete(&self, total: usize) -> bool {
        total > 0
            && self.completed_count() >= total
            && self.main_queue.is_empty()
            && self.retry_queue.is_empty()
    }
}

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info};

use crate::dictionary::loader::{BankLoad, LoadToken};
use crate::practice::kind::DrillKind;
use crate::practice::question::{DrillQuestion, QuestionBanks};
use crate::scheme::Scheme;
use crate::session::input::{is_ready, normalize_input};
use crate::session::round::{Evaluation, Session};
use crate::store::adapter::PersistenceAdapter;
use crate::store::kv::KeyValueStore;
use crate::store::schema::{PersistedSnapshot, SCHEMA_VERSION};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrillStatus {
    /// Question banks are not available yet.
    Loading,
    /// Loading failed; the message is for display.
    Unavailable(String),
    /// The active scheme has no questions.
    Empty,
    InRound,
    RoundComplete,
}

/// Result of the last evaluated answer, for display.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Feedback {
    #[default]
    None,
    Correct,
    /// Right answer to a question that had been missed.
    Corrected,
    Incorrect {
        expected: String,
    },
}

/// Header counters, already formatted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopInfo {
    pub progress: String,
    pub accuracy: String,
    pub retry: String,
}

/// Owns the live session of the active scheme and every mutation of it.
/// Each mutation is mirrored to storage straight away.
pub struct DrillController<K: DrillKind, S> {
    adapter: PersistenceAdapter<S>,
    banks: Option<QuestionBanks<K::Question>>,
    load_error: Option<String>,
    load_token: LoadToken,
    active_scheme: Scheme,
    /// Scheme picked while banks were still loading; wins over the stored one.
    pending_scheme: Option<Scheme>,
    session: Session<K::Question>,
    /// Last known session of every scheme, read once from storage.
    stored: BTreeMap<Scheme, Session<K::Question>>,
    input: String,
    feedback: Feedback,
    shake_tick: u32,
    rng: SmallRng,
}

fn restore_or_start<Q: DrillQuestion>(
    stored: &BTreeMap<Scheme, Session<Q>>,
    scheme: Scheme,
    bank: &[Q],
    rng: &mut SmallRng,
) -> Session<Q> {
    match stored.get(&scheme) {
        Some(session) => {
            let mut session = session.clone();
            session.reconcile(bank, rng);
            session
        }
        None => Session::start_round(bank, true, rng),
    }
}

impl<K: DrillKind, S: KeyValueStore> DrillController<K, S> {
    pub fn new(store: S) -> Self {
        Self::with_rng(store, SmallRng::from_entropy())
    }

    pub fn with_rng(store: S, rng: SmallRng) -> Self {
        Self {
            adapter: PersistenceAdapter::new(store, K::STORAGE_KEY),
            banks: None,
            load_error: None,
            load_token: 0,
            active_scheme: Scheme::default(),
            pending_scheme: None,
            session: Session::default(),
            stored: BTreeMap::new(),
            input: String::new(),
            feedback: Feedback::None,
            shake_tick: 0,
            rng,
        }
    }

    /// Start a new load request. Results carrying an older token are ignored.
    pub fn begin_load(&mut self) -> LoadToken {
        self.load_token += 1;
        self.banks = None;
        self.load_error = None;
        self.load_token
    }

    pub fn load_token(&self) -> LoadToken {
        self.load_token
    }

    /// Apply a finished load. Returns false if it was stale.
    pub fn apply_load(&mut self, load: BankLoad<K::Question>) -> bool {
        match load.result {
            Ok(banks) => self.apply_banks(load.token, banks),
            Err(e) => self.apply_load_error(load.token, e.to_string()),
        }
    }

    pub fn apply_banks(&mut self, token: LoadToken, banks: QuestionBanks<K::Question>) -> bool {
        if token != self.load_token {
            debug!(drill = K::NAME, token, current = self.load_token, "dropping stale question banks");
            return false;
        }

        let persisted = self.adapter.load(&banks, &mut self.rng);
        let (scheme, stored) = match persisted {
            Some(snapshot) => (
                self.pending_scheme.unwrap_or(snapshot.active_scheme),
                snapshot.sessions,
            ),
            None => (self.pending_scheme.unwrap_or_default(), BTreeMap::new()),
        };

        let restored = stored.contains_key(&scheme);
        self.session = restore_or_start(&stored, scheme, banks.get(scheme), &mut self.rng);
        info!(
            drill = K::NAME,
            scheme = scheme.as_str(),
            restored,
            total = banks.total(scheme),
            "drill session ready"
        );

        self.stored = stored;
        self.active_scheme = scheme;
        self.pending_scheme = None;
        self.banks = Some(banks);
        self.load_error = None;
        self.clear_transient();
        self.persist();
        true
    }

    pub fn apply_load_error(&mut self, token: LoadToken, message: String) -> bool {
        if token != self.load_token {
            debug!(drill = K::NAME, token, "dropping stale load error");
            return false;
        }
        self.load_error = Some(message);
        true
    }

    pub fn status(&self) -> DrillStatus {
        let Some(banks) = &self.banks else {
            return match &self.load_error {
                Some(message) => DrillStatus::Unavailable(message.clone()),
                None => DrillStatus::Loading,
            };
        };
        let total = banks.total(self.active_scheme);
        if total == 0 {
            DrillStatus::Empty
        } else if self.session.is_complete(total) {
            DrillStatus::RoundComplete
        } else {
            DrillStatus::InRound
        }
    }

    /// Feed the raw contents of the answer field. Evaluates once the
    /// normalised input reaches the drill's answer length.
    pub fn submit_input(&mut self, raw: &str) -> Option<Evaluation> {
        if self.status() != DrillStatus::InRound {
            self.input.clear();
            return None;
        }

        self.input = normalize_input(raw, K::ANSWER_LEN);
        if !is_ready(&self.input, K::ANSWER_LEN) {
            return None;
        }

        let evaluation = self.session.evaluate(&self.input);
        self.input.clear();
        match &evaluation {
            Evaluation::NoQuestion => return None,
            Evaluation::Correct { corrected } => {
                self.feedback = if *corrected {
                    Feedback::Corrected
                } else {
                    Feedback::Correct
                };
            }
            Evaluation::Incorrect { expected } => {
                self.feedback = Feedback::Incorrect {
                    expected: expected.to_uppercase(),
                };
                self.shake_tick += 1;
            }
        }

        self.persist();
        Some(evaluation)
    }

    /// Throw away the active scheme's progress and start a shuffled round.
    pub fn reset_round(&mut self) {
        let Some(banks) = &self.banks else {
            return;
        };
        self.session = Session::start_round(banks.get(self.active_scheme), true, &mut self.rng);
        info!(drill = K::NAME, scheme = self.active_scheme.as_str(), "round reset");
        self.clear_transient();
        self.persist();
    }

    pub fn switch_scheme(&mut self, scheme: Scheme) {
        if scheme == self.active_scheme {
            return;
        }

        let Some(banks) = &self.banks else {
            // Nothing to keep yet; the next load restores the chosen scheme.
            self.active_scheme = scheme;
            self.pending_scheme = Some(scheme);
            self.begin_load();
            return;
        };

        self.stored.insert(self.active_scheme, self.session.clone());
        self.session = restore_or_start(&self.stored, scheme, banks.get(scheme), &mut self.rng);
        debug!(
            drill = K::NAME,
            from = self.active_scheme.as_str(),
            to = scheme.as_str(),
            "scheme switched"
        );
        self.active_scheme = scheme;
        self.clear_transient();
        self.persist();
    }

    fn clear_transient(&mut self) {
        self.input.clear();
        self.feedback = Feedback::None;
        self.shake_tick = 0;
    }

    fn persist(&mut self) {
        let Some(banks) = &self.banks else {
            return;
        };
        if banks.total(self.active_scheme) == 0 {
            return;
        }

        self.stored.insert(self.active_scheme, self.session.clone());
        let snapshot = PersistedSnapshot {
            schema_version: SCHEMA_VERSION,
            active_scheme: self.active_scheme,
            sessions: self.stored.clone(),
        };
        self.adapter.save(&snapshot);
    }

    pub fn total(&self) -> usize {
        self.banks
            .as_ref()
            .map_or(0, |banks| banks.total(self.active_scheme))
    }

    pub fn summary(&self) -> TopInfo {
        let total = self.total();
        let progress = if total > 0 {
            format!("{}/{}", self.session.completed_count(), total)
        } else {
            "--".to_string()
        };
        TopInfo {
            progress,
            accuracy: format!("{}%", self.session.accuracy()),
            retry: self.session.retry_count().to_string(),
        }
    }

    pub fn progress(&self) -> f64 {
        self.session.progress(self.total())
    }

    /// The question being asked, if a round is running.
    pub fn current_question(&self) -> Option<&K::Question> {
        match self.status() {
            DrillStatus::InRound => self.session.current(),
            _ => None,
        }
    }

    pub fn current_payload(&self) -> Option<&str> {
        self.current_question().map(|q| q.payload())
    }

    pub fn active_scheme(&self) -> Scheme {
        self.active_scheme
    }

    pub fn session(&self) -> &Session<K::Question> {
        &self.session
    }

    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Count of misses since the last reset or scheme switch.
    pub fn shake_tick(&self) -> u32 {
        self.shake_tick
    }

    pub fn store(&self) -> &S {
        self.adapter.store()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::practice::kind::{RootDrill, SplitDrill};
    use crate::practice::root::build_root_banks;
    use crate::practice::split::SplitQuestion;
    use crate::store::kv::MemoryStore;

    type RootController = DrillController<RootDrill, MemoryStore>;

    fn ready_root(store: MemoryStore, seed: u64) -> RootController {
        let mut controller = RootController::with_rng(store, SmallRng::seed_from_u64(seed));
        let token = controller.begin_load();
        assert!(controller.apply_banks(token, build_root_banks()));
        controller
    }

    fn answer_current(controller: &mut RootController) {
        let key = controller.current_question().unwrap().key.clone();
        controller.submit_input(&key);
    }

    fn split_bank(scheme: Scheme, n: usize) -> Vec<SplitQuestion> {
        (0..n)
            .map(|i| SplitQuestion {
                id: format!("{}-{i}", scheme.as_str()),
                word: "字".to_string(),
                code: format!("a{}", (b'a' + i as u8) as char),
                radicals: None,
            })
            .collect()
    }

    #[test]
    fn test_loading_until_banks_arrive() {
        let mut controller = RootController::new(MemoryStore::new());
        assert_eq!(controller.status(), DrillStatus::Loading);
        assert_eq!(controller.summary().progress, "--");
        assert!(controller.submit_input("a").is_none());
        controller.begin_load();
        assert_eq!(controller.status(), DrillStatus::Loading);
    }

    #[test]
    fn test_fresh_start_is_shuffled_basic_and_persisted() {
        let controller = ready_root(MemoryStore::new(), 3);
        assert_eq!(controller.status(), DrillStatus::InRound);
        assert_eq!(controller.active_scheme(), Scheme::Basic);
        assert_eq!(controller.summary().progress, "0/33");
        assert_eq!(controller.summary().accuracy, "0%");
        assert!(controller.store().get_item(RootDrill::STORAGE_KEY).is_some());
    }

    #[test]
    fn test_stale_tokens_are_ignored() {
        let mut controller = RootController::new(MemoryStore::new());
        let old = controller.begin_load();
        let new = controller.begin_load();
        assert!(!controller.apply_banks(old, build_root_banks()));
        assert!(!controller.apply_load_error(old, "boom".to_string()));
        assert_eq!(controller.status(), DrillStatus::Loading);
        assert!(controller.apply_banks(new, build_root_banks()));
        assert_eq!(controller.status(), DrillStatus::InRound);
    }

    #[test]
    fn test_load_error_is_unavailable() {
        let mut controller = RootController::new(MemoryStore::new());
        let token = controller.begin_load();
        controller.apply_load_error(token, "missing file".to_string());
        assert_eq!(
            controller.status(),
            DrillStatus::Unavailable("missing file".to_string())
        );
        assert!(controller.submit_input("q").is_none());
    }

    #[test]
    fn test_wrong_answer_sets_feedback_and_shakes() {
        let mut controller = ready_root(MemoryStore::new(), 5);
        let expected = controller.current_question().unwrap().key.clone();
        let wrong = if expected == "q" { "w" } else { "q" };
        let evaluation = controller.submit_input(wrong).unwrap();
        assert!(matches!(evaluation, Evaluation::Incorrect { .. }));
        assert_eq!(
            controller.feedback(),
            &Feedback::Incorrect {
                expected: expected.to_uppercase()
            }
        );
        assert_eq!(controller.shake_tick(), 1);
        assert!(controller.session().wrong_on_current);

        answer_current(&mut controller);
        assert_eq!(controller.feedback(), &Feedback::Corrected);
        assert_eq!(controller.summary().retry, "1");
        assert_eq!(controller.summary().accuracy, "50%");
    }

    #[test]
    fn test_split_input_waits_for_full_code() {
        let mut controller: DrillController<SplitDrill, MemoryStore> =
            DrillController::with_rng(MemoryStore::new(), SmallRng::seed_from_u64(1));
        let token = controller.begin_load();
        let banks = QuestionBanks {
            basic: split_bank(Scheme::Basic, 3),
            plus: split_bank(Scheme::Plus, 2),
        };
        controller.apply_banks(token, banks);

        let code = controller.current_question().unwrap().code.clone();
        assert!(controller.submit_input(&code[..1]).is_none());
        assert_eq!(controller.input(), &code[..1]);
        assert_eq!(controller.session().attempts, 0);

        let upper = code.to_uppercase();
        let evaluation = controller.submit_input(&format!(" {upper}zz")).unwrap();
        assert_eq!(evaluation, Evaluation::Correct { corrected: false });
        assert_eq!(controller.input(), "");
        assert_eq!(controller.summary().progress, "1/3");
    }

    #[test]
    fn test_empty_bank_is_empty_and_not_persisted() {
        let mut controller: DrillController<SplitDrill, MemoryStore> =
            DrillController::new(MemoryStore::new());
        let token = controller.begin_load();
        controller.apply_banks(token, QuestionBanks::default());
        assert_eq!(controller.status(), DrillStatus::Empty);
        assert_eq!(controller.summary().progress, "--");
        assert!(controller.store().get_item(SplitDrill::STORAGE_KEY).is_none());
    }

    #[test]
    fn test_full_round_completes_and_reset_restarts() {
        let mut controller = ready_root(MemoryStore::new(), 11);
        while controller.status() == DrillStatus::InRound {
            answer_current(&mut controller);
        }
        assert_eq!(controller.status(), DrillStatus::RoundComplete);
        assert_eq!(controller.summary().progress, "33/33");
        assert_eq!(controller.summary().accuracy, "100%");
        assert!(controller.current_question().is_none());
        assert!(controller.submit_input("q").is_none());

        controller.reset_round();
        assert_eq!(controller.status(), DrillStatus::InRound);
        assert_eq!(controller.summary().progress, "0/33");
        assert_eq!(controller.feedback(), &Feedback::None);
    }

    #[test]
    fn test_reset_leaves_other_scheme_alone() {
        let mut controller = ready_root(MemoryStore::new(), 2);
        controller.switch_scheme(Scheme::Plus);
        answer_current(&mut controller);
        controller.switch_scheme(Scheme::Basic);
        answer_current(&mut controller);
        controller.reset_round();
        controller.switch_scheme(Scheme::Plus);
        assert_eq!(controller.session().completed_count(), 1);
    }

    #[test]
    fn test_switch_during_load_requests_new_load() {
        let mut controller = RootController::new(MemoryStore::new());
        let first = controller.begin_load();
        controller.switch_scheme(Scheme::Plus);
        assert_ne!(controller.load_token(), first);
        assert!(!controller.apply_banks(first, build_root_banks()));
        let token = controller.load_token();
        controller.apply_banks(token, build_root_banks());
        assert_eq!(controller.active_scheme(), Scheme::Plus);
        assert_eq!(controller.total(), build_root_banks().total(Scheme::Plus));
    }

    #[test]
    fn test_completed_ids_outside_bank_are_dropped_on_restore() {
        let mut store = MemoryStore::new();
        store
            .set_item(
                RootDrill::STORAGE_KEY,
                r#"{"version":2,"activeScheme":"basic","schemes":{"basic":{"completedQuestionIds":["ghost","basic-0-0-Q-火"]}}}"#,
            )
            .unwrap();
        let controller = ready_root(store, 1);
        assert_eq!(controller.summary().progress, "1/33");
    }

    #[test]
    fn test_restored_queue_entries_outside_bank_are_dropped() {
        let banks = build_root_banks();
        let (last, answered) = banks.get(Scheme::Basic).split_last().unwrap();
        let raw = serde_json::json!({
            "version": 2,
            "activeScheme": "basic",
            "schemes": { "basic": {
                "mainQueue": [
                    { "id": "old-1", "key": "q", "radical": "火" },
                    { "id": "old-2", "key": "w", "radical": "土" },
                ],
                "retryQueue": [],
                "attempts": 32,
                "correctAttempts": 32,
                "completedQuestionIds": answered.iter().map(|q| q.id.clone()).collect::<Vec<_>>(),
                "wrongOnCurrent": false,
            }},
        });
        let mut store = MemoryStore::new();
        store.set_item(RootDrill::STORAGE_KEY, &raw.to_string()).unwrap();

        let mut controller = ready_root(store, 6);
        assert_eq!(controller.current_question(), Some(last));
        assert_eq!(controller.summary().progress, "32/33");

        answer_current(&mut controller);
        assert_eq!(controller.session().completed_count(), 33);
        assert_eq!(controller.summary().progress, "33/33");
        assert_eq!(controller.status(), DrillStatus::RoundComplete);
    }

    #[test]
    fn test_restored_session_without_head_question_is_refilled() {
        let mut store = MemoryStore::new();
        store
            .set_item(
                RootDrill::STORAGE_KEY,
                r#"{"version":2,"activeScheme":"basic","schemes":{"basic":{"mainQueue":[],"retryQueue":[],"attempts":4,"correctAttempts":3,"completedQuestionIds":"corrupt","wrongOnCurrent":false}}}"#,
            )
            .unwrap();

        let mut controller = ready_root(store, 7);
        assert_eq!(controller.status(), DrillStatus::InRound);
        assert!(controller.current_question().is_some());
        assert_eq!(controller.session().main_queue.len(), 33);

        answer_current(&mut controller);
        assert_eq!(controller.summary().progress, "1/33");
    }
}

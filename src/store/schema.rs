use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::practice::question::{DrillQuestion, QuestionBanks};
use crate::scheme::{ALL_SCHEMES, Scheme};
use crate::session::round::Session;

pub const SCHEMA_VERSION: u32 = 2;

/// Every scheme's session plus which one is active. Sessions for schemes the
/// learner never opened are simply absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot<Q> {
    #[serde(rename = "version")]
    pub schema_version: u32,
    pub active_scheme: Scheme,
    #[serde(rename = "schemes")]
    pub sessions: BTreeMap<Scheme, Session<Q>>,
}

impl<Q> PersistedSnapshot<Q> {
    pub fn new(active_scheme: Scheme) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            active_scheme,
            sessions: BTreeMap::new(),
        }
    }
}

fn question_from_value<Q: DrillQuestion>(value: &Value) -> Option<Q> {
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

/// A queue is only accepted whole: one bad element rejects the array.
fn queue_from_value<Q: DrillQuestion>(value: Option<&Value>) -> Option<Vec<Q>> {
    value?
        .as_array()?
        .iter()
        .map(question_from_value)
        .collect()
}

fn count_from_value(value: Option<&Value>) -> u64 {
    match value {
        Some(v) => v
            .as_u64()
            .or_else(|| v.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        None => 0,
    }
}

fn ids_from_value(value: Option<&Value>) -> BTreeSet<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Rebuild a session from stored JSON one field at a time. A field with the
/// wrong shape falls back to its fresh-round value; the main queue falls back
/// to `bank` in its canonical order.
pub fn session_from_value<Q: DrillQuestion>(value: &Value, bank: &[Q]) -> Session<Q> {
    if !value.is_object() {
        return Session::unshuffled(bank);
    }

    let main_queue: VecDeque<Q> = match queue_from_value(value.get("mainQueue")) {
        Some(queue) => queue.into(),
        None => bank.iter().cloned().collect(),
    };

    Session {
        main_queue,
        retry_queue: queue_from_value(value.get("retryQueue")).unwrap_or_default(),
        attempts: count_from_value(value.get("attempts")),
        correct_attempts: count_from_value(value.get("correctAttempts")),
        completed_ids: ids_from_value(value.get("completedQuestionIds")),
        wrong_on_current: value
            .get("wrongOnCurrent")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

/// Read a current-version snapshot. `None` unless `value` is an object
/// tagged with `SCHEMA_VERSION`.
pub fn snapshot_from_value<Q: DrillQuestion>(
    value: &Value,
    banks: &QuestionBanks<Q>,
) -> Option<PersistedSnapshot<Q>> {
    let object = value.as_object()?;
    if object.get("version").and_then(Value::as_u64) != Some(u64::from(SCHEMA_VERSION)) {
        return None;
    }

    let active_scheme = Scheme::from_stored(object.get("activeScheme").and_then(Value::as_str));
    let mut snapshot = PersistedSnapshot::new(active_scheme);

    if let Some(schemes) = object.get("schemes").and_then(Value::as_object) {
        for scheme in ALL_SCHEMES {
            if let Some(stored) = schemes.get(scheme.as_str()) {
                snapshot
                    .sessions
                    .insert(scheme, session_from_value(stored, banks.get(scheme)));
            }
        }
    }

    Some(snapshot)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::practice::root::{RootQuestion, build_root_banks};
    use crate::practice::split::SplitQuestion;

    fn root_q(id: &str) -> Value {
        json!({ "id": id, "key": "a", "radical": "讠" })
    }

    #[test]
    fn test_valid_session_is_read_verbatim() {
        let banks = build_root_banks();
        let stored = json!({
            "mainQueue": [root_q("x"), root_q("y")],
            "retryQueue": [root_q("z")],
            "attempts": 4,
            "correctAttempts": 3,
            "completedQuestionIds": ["z", "w"],
            "wrongOnCurrent": true,
        });
        let session: Session<RootQuestion> = session_from_value(&stored, banks.get(Scheme::Basic));
        assert_eq!(session.main_queue.len(), 2);
        assert_eq!(session.retry_queue[0].id, "z");
        assert_eq!(session.attempts, 4);
        assert_eq!(session.correct_attempts, 3);
        assert_eq!(session.completed_ids.len(), 2);
        assert!(session.wrong_on_current);
    }

    #[test]
    fn test_bad_fields_fall_back_individually() {
        let banks = build_root_banks();
        let stored = json!({
            "mainQueue": [root_q("x"), { "id": "y", "key": 3, "radical": "口" }],
            "retryQueue": "oops",
            "attempts": "4",
            "correctAttempts": 2,
            "completedQuestionIds": ["a", 5, null, "b"],
            "wrongOnCurrent": "yes",
        });
        let session: Session<RootQuestion> = session_from_value(&stored, banks.get(Scheme::Plus));
        // One invalid element rejects the whole main queue
        assert_eq!(session.main_queue.len(), banks.total(Scheme::Plus));
        assert_eq!(session.main_queue[0], banks.get(Scheme::Plus)[0]);
        assert!(session.retry_queue.is_empty());
        assert_eq!(session.attempts, 0);
        assert_eq!(session.correct_attempts, 2);
        assert_eq!(
            session.completed_ids.into_iter().collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert!(!session.wrong_on_current);
    }

    #[test]
    fn test_non_object_session_is_fresh() {
        let banks = build_root_banks();
        let session: Session<RootQuestion> = session_from_value(&json!(17), banks.get(Scheme::Basic));
        assert_eq!(session, Session::unshuffled(banks.get(Scheme::Basic)));
    }

    #[test]
    fn test_split_question_radicals_may_be_null() {
        let banks: QuestionBanks<SplitQuestion> = QuestionBanks::default();
        let stored = json!({
            "mainQueue": [
                { "id": "basic-0-的-dq", "word": "的", "code": "dq", "radicals": null },
                { "id": "basic-1-好-nz", "word": "好", "code": "nz", "radicals": "女子" },
            ],
        });
        let session = session_from_value(&stored, banks.get(Scheme::Basic));
        assert_eq!(session.main_queue.len(), 2);
        assert_eq!(session.main_queue[1].radicals.as_deref(), Some("女子"));
    }

    #[test]
    fn test_split_question_without_radicals_key_rejects_queue() {
        let bank = vec![SplitQuestion {
            id: "basic-0-的-dq".to_string(),
            word: "的".to_string(),
            code: "dq".to_string(),
            radicals: None,
        }];
        let stored = json!({
            "mainQueue": [
                { "id": "basic-0-的-dq", "word": "的", "code": "dq", "radicals": null },
                { "id": "basic-1-好-nz", "word": "好", "code": "nz" },
            ],
        });
        let session = session_from_value(&stored, bank.as_slice());
        assert_eq!(session.main_queue, VecDeque::from(bank));
    }

    #[test]
    fn test_snapshot_requires_current_version() {
        let banks = build_root_banks();
        let v3 = json!({ "version": 3, "activeScheme": "plus", "schemes": {} });
        assert!(snapshot_from_value(&v3, &banks).is_none());
        assert!(snapshot_from_value(&json!([1, 2]), &banks).is_none());
    }

    #[test]
    fn test_snapshot_keeps_only_present_schemes() {
        let banks = build_root_banks();
        let value = json!({
            "version": 2,
            "activeScheme": "unknown",
            "schemes": { "plus": { "attempts": 1 }, "extra": {} },
        });
        let snapshot = snapshot_from_value(&value, &banks).unwrap();
        assert_eq!(snapshot.active_scheme, Scheme::Basic);
        assert_eq!(snapshot.sessions.len(), 1);
        assert_eq!(snapshot.sessions[&Scheme::Plus].attempts, 1);
    }

    #[test]
    fn test_fractional_counts_are_truncated() {
        assert_eq!(count_from_value(Some(&json!(3.0))), 3);
        assert_eq!(count_from_value(Some(&json!(-1))), 0);
        assert_eq!(count_from_value(None), 0);
    }
}

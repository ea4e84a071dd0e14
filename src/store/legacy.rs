//! Version 1 snapshots. Two shapes were written under that tag: the root
//! drill stored one session inline next to `activeScheme`, the split drill
//! already used a `schemes` map. Both are lifted to the current version here
//! and nowhere else; the result is handed back without being written.
//! A scheme the old payload never recorded gets a fresh shuffled round.

use rand::Rng;
use serde_json::Value;

use crate::practice::question::{DrillQuestion, QuestionBanks};
use crate::scheme::{ALL_SCHEMES, Scheme};
use crate::session::round::Session;
use crate::store::schema::{PersistedSnapshot, session_from_value};

pub const LEGACY_VERSION: u64 = 1;

pub fn upgrade_legacy<Q: DrillQuestion, R: Rng + ?Sized>(
    raw: &Value,
    banks: &QuestionBanks<Q>,
    rng: &mut R,
) -> Option<PersistedSnapshot<Q>> {
    let object = raw.as_object()?;
    if object.get("version").and_then(Value::as_u64) != Some(LEGACY_VERSION) {
        return None;
    }

    let active_scheme = Scheme::from_stored(object.get("activeScheme").and_then(Value::as_str));
    let mut snapshot = PersistedSnapshot::new(active_scheme);

    match object.get("schemes").and_then(Value::as_object) {
        Some(schemes) => {
            for scheme in ALL_SCHEMES {
                if let Some(stored) = schemes.get(scheme.as_str()) {
                    snapshot
                        .sessions
                        .insert(scheme, session_from_value(stored, banks.get(scheme)));
                }
            }
        }
        None => {
            snapshot
                .sessions
                .insert(active_scheme, session_from_value(raw, banks.get(active_scheme)));
        }
    }

    for scheme in ALL_SCHEMES {
        snapshot
            .sessions
            .entry(scheme)
            .or_insert_with(|| Session::start_round(banks.get(scheme), true, rng));
    }

    Some(snapshot)
}

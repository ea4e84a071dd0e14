use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

use tracing::{debug, warn};

use crate::dictionary::cache::DictionaryCache;
use crate::dictionary::source::DictionarySource;
use crate::error::LoadError;
use crate::practice::kind::DrillKind;
use crate::practice::question::QuestionBanks;

/// Identifies one load request. Higher tokens supersede lower ones.
pub type LoadToken = u64;

/// Shared flag a loader checks between steps; set it to abandon the load.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<(), LoadError> {
        if self.is_cancelled() {
            Err(LoadError::Cancelled)
        } else {
            Ok(())
        }
    }
}

pub struct BankLoad<Q> {
    pub token: LoadToken,
    pub result: Result<QuestionBanks<Q>, LoadError>,
}

/// A question-bank load running on a worker thread. Dropping the handle
/// cancels the load; a cancelled load never delivers a result.
pub struct BankLoader<Q> {
    token: LoadToken,
    cancel: CancelToken,
    rx: mpsc::Receiver<BankLoad<Q>>,
}

impl<Q: Send + 'static> BankLoader<Q> {
    pub fn spawn<K>(token: LoadToken, source: DictionarySource, cache: Arc<DictionaryCache>) -> Self
    where
        K: DrillKind<Question = Q>,
    {
        let (tx, rx) = mpsc::channel();
        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();

        thread::spawn(move || {
            debug!(drill = K::NAME, token, "question bank load started");
            let result = K::load_banks(&source, &cache, &worker_cancel);
            if worker_cancel.is_cancelled() {
                debug!(drill = K::NAME, token, "question bank load abandoned");
                return;
            }
            if let Err(e) = &result {
                warn!(drill = K::NAME, token, error = %e, "question bank load failed");
            }
            // Receiver gone means the handle was dropped; nothing to deliver.
            let _ = tx.send(BankLoad { token, result });
        });

        Self { token, cancel, rx }
    }

    pub fn token(&self) -> LoadToken {
        self.token
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Non-blocking poll, for the event loop tick.
    pub fn try_take(&self) -> Option<BankLoad<Q>> {
        self.rx.try_recv().ok()
    }

    /// Block until the worker finishes. `None` if it was cancelled.
    pub fn wait(self) -> Option<BankLoad<Q>> {
        self.rx.recv().ok()
    }
}

impl<Q> Drop for BankLoader<Q> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

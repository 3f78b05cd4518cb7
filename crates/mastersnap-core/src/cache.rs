//! Per-run memoization of etablissement lookups.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::oneshot;
use tracing::debug;

use crate::domain::EtablissementDetail;
use crate::error::ApiError;
use crate::resolver::DetailSource;

/// Outcome of one etablissement lookup as seen by cache callers.
///
/// `Ok(None)` means the lookup exhausted its attempts; it is terminal and
/// retained like a success so repeat callers do not re-trigger the retry
/// cycle.
pub type DetailOutcome = Result<Option<Arc<EtablissementDetail>>, ApiError>;

enum Slot {
    /// A lookup is in flight; parked callers wait on these channels.
    Pending(Vec<oneshot::Sender<DetailOutcome>>),
    /// Terminal for the rest of the run.
    Resolved(DetailOutcome),
}

/// Deduplicating front for a [`DetailSource`], keyed by `uai` alone.
///
/// The first caller for a uai becomes the leader and drives the lookup
/// with its `inm`; callers arriving while that flight is up park on the
/// slot and receive the same outcome. A source error is delivered to the
/// leader and to callers already parked, then the slot is cleared so a
/// later caller may retry; parked callers that saw the error do not retry
/// by themselves.
pub struct DetailCache {
    source: Arc<dyn DetailSource>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl DetailCache {
    pub fn new(source: Arc<dyn DetailSource>) -> Self {
        Self {
            source,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Look up the detail for `uai`, deduplicating against every other
    /// caller in the run.
    pub async fn get(&self, uai: &str, inm: &str) -> DetailOutcome {
        loop {
            let parked = {
                let mut slots = self.lock_slots();
                match slots.get_mut(uai) {
                    Some(Slot::Resolved(outcome)) => {
                        debug!(uai, "etablissement served from cache");
                        return outcome.clone();
                    }
                    Some(Slot::Pending(waiters)) => {
                        let (tx, rx) = oneshot::channel();
                        waiters.push(tx);
                        Some(rx)
                    }
                    None => {
                        slots.insert(uai.to_string(), Slot::Pending(Vec::new()));
                        None
                    }
                }
            };

            match parked {
                Some(rx) => match rx.await {
                    Ok(outcome) => return outcome,
                    // Leader dropped mid-flight; the slot was cleared, so
                    // re-enter and either lead or join the next flight.
                    Err(_) => continue,
                },
                None => return self.lead(uai, inm).await,
            }
        }
    }

    /// Distinct institutions looked up so far, in any state.
    pub fn len(&self) -> usize {
        self.lock_slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_slots().is_empty()
    }

    /// Uais whose lookup exhausted its attempts, sorted for stable
    /// reporting.
    pub fn resolved_absent(&self) -> Vec<String> {
        let slots = self.lock_slots();
        let mut absent: Vec<String> = slots
            .iter()
            .filter_map(|(uai, slot)| match slot {
                Slot::Resolved(Ok(None)) => Some(uai.clone()),
                _ => None,
            })
            .collect();
        absent.sort();
        absent
    }

    async fn lead(&self, uai: &str, inm: &str) -> DetailOutcome {
        let mut guard = FlightGuard {
            cache: self,
            uai,
            armed: true,
        };
        let outcome = match self.source.resolve(uai, inm).await {
            Ok(detail) => Ok(detail.map(Arc::new)),
            Err(error) => Err(error),
        };
        guard.armed = false;
        self.settle(uai, &outcome);
        outcome
    }

    /// Store the terminal outcome (or clear the slot on error) and wake
    /// every parked caller with a copy.
    fn settle(&self, uai: &str, outcome: &DetailOutcome) {
        let waiters = {
            let mut slots = self.lock_slots();
            let waiters = match slots.remove(uai) {
                Some(Slot::Pending(waiters)) => waiters,
                _ => Vec::new(),
            };
            if outcome.is_ok() {
                slots.insert(uai.to_string(), Slot::Resolved(outcome.clone()));
            }
            waiters
        };

        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().expect("detail cache lock is not poisoned")
    }
}

/// Clears a pending slot if the leading future is dropped before it could
/// settle, waking parked callers so they can re-enter.
struct FlightGuard<'a> {
    cache: &'a DetailCache,
    uai: &'a str,
    armed: bool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut slots = self.cache.lock_slots();
        if matches!(slots.get(self.uai), Some(Slot::Pending(_))) {
            slots.remove(self.uai);
        }
    }
}

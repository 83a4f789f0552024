//! Versioned key-value world state with per-transaction simulation.
//!
//! A transaction runs against a [`TxSimulator`], which reads committed values
//! and buffers writes into a [`ReadWriteSet`]. Committing validates that every
//! key read is still at the version the transaction saw (MVCC) and applies
//! all writes at a new block height, or nothing at all.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use erc20_token_contract::shim::{ChaincodeStub, StubError};
use thiserror::Error;

/// Block height at which a value was last written.
pub type Version = u64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    #[error("MVCC read conflict on key {0:?}")]
    MvccConflict(String),

    #[error("world state lock poisoned")]
    Poisoned,
}

impl<T> From<PoisonError<T>> for CommitError {
    fn from(_: PoisonError<T>) -> Self {
        Self::Poisoned
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    pub value: String,
    pub version: Version,
}

#[derive(Debug, Default)]
struct Ledger {
    entries: BTreeMap<String, VersionedValue>,
    height: Version,
}

#[derive(Debug, Default)]
pub struct WorldState {
    ledger: RwLock<Ledger>,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed blocks.
    pub fn height(&self) -> Version {
        self.ledger.read().map(|l| l.height).unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<VersionedValue> {
        self.ledger
            .read()
            .ok()
            .and_then(|l| l.entries.get(key).cloned())
    }

    pub fn len(&self) -> usize {
        self.ledger.read().map(|l| l.entries.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Committed values without version information.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.ledger
            .read()
            .map(|l| {
                l.entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn simulator(&self) -> TxSimulator<'_> {
        TxSimulator {
            state: self,
            rwset: ReadWriteSet::default(),
            event: None,
        }
    }

    /// Validate and apply a transaction's read/write set. Returns the new height.
    pub fn commit(&self, rwset: &ReadWriteSet) -> Result<Version, CommitError> {
        let mut ledger = self.ledger.write()?;

        for (key, seen) in &rwset.reads {
            let current = ledger.entries.get(key).map(|v| v.version);
            if current != *seen {
                tracing::warn!(key = ?key, ?seen, ?current, "read set is stale");
                return Err(CommitError::MvccConflict(key.clone()));
            }
        }

        let height = ledger.height + 1;
        for (key, write) in &rwset.writes {
            match write {
                Some(value) => {
                    ledger.entries.insert(
                        key.clone(),
                        VersionedValue {
                            value: value.clone(),
                            version: height,
                        },
                    );
                }
                None => {
                    ledger.entries.remove(key);
                }
            }
        }
        ledger.height = height;

        tracing::debug!(height, writes = rwset.writes.len(), "block committed");
        Ok(height)
    }
}

/// Keys a transaction read (with the version it saw, `None` if absent) and
/// the values it wants to write (`None` deletes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadWriteSet {
    reads: BTreeMap<String, Option<Version>>,
    writes: BTreeMap<String, Option<String>>,
}

impl ReadWriteSet {
    pub fn reads(&self) -> impl Iterator<Item = (&str, Option<Version>)> {
        self.reads.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn writes(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.writes.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty()
    }

    /// Keys written without having been read first.
    pub fn blind_writes(&self) -> impl Iterator<Item = &str> {
        self.writes
            .keys()
            .filter(|k| !self.reads.contains_key(*k))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChaincodeEvent {
    pub name: String,
    pub payload: Vec<u8>,
}

/// Stub handed to the contract for one transaction.
///
/// Reads always see committed state, never this transaction's own writes.
pub struct TxSimulator<'a> {
    state: &'a WorldState,
    rwset: ReadWriteSet,
    event: Option<ChaincodeEvent>,
}

impl TxSimulator<'_> {
    pub fn rwset(&self) -> &ReadWriteSet {
        &self.rwset
    }

    pub fn into_parts(self) -> (ReadWriteSet, Option<ChaincodeEvent>) {
        (self.rwset, self.event)
    }
}

fn validate_key(key: &str) -> Result<(), StubError> {
    if key.is_empty() {
        return Err(StubError::InvalidKey("empty key is not allowed".to_string()));
    }
    Ok(())
}

impl ChaincodeStub for TxSimulator<'_> {
    fn get_string_state(&mut self, key: &str) -> Result<Option<String>, StubError> {
        let ledger = self
            .state
            .ledger
            .read()
            .map_err(|_| StubError::Unavailable("world state lock poisoned".to_string()))?;
        let entry = ledger.entries.get(key);
        self.rwset
            .reads
            .entry(key.to_string())
            .or_insert_with(|| entry.map(|v| v.version));
        Ok(entry.map(|v| v.value.clone()))
    }

    fn put_string_state(&mut self, key: &str, value: &str) -> Result<(), StubError> {
        validate_key(key)?;
        self.rwset
            .writes
            .insert(key.to_string(), Some(value.to_string()));
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> Result<(), StubError> {
        validate_key(key)?;
        self.rwset.writes.insert(key.to_string(), None);
        Ok(())
    }

    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), StubError> {
        self.event = Some(ChaincodeEvent {
            name: name.to_string(),
            payload,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erc20_token_contract::{ContractError, ErrorKind};

    fn commit_put(state: &WorldState, key: &str, value: &str) -> Version {
        let mut sim = state.simulator();
        sim.put_string_state(key, value).unwrap();
        let (rwset, _) = sim.into_parts();
        state.commit(&rwset).unwrap()
    }

    #[test]
    fn test_commit_applies_writes() {
        let state = WorldState::new();
        assert!(state.is_empty());
        assert_eq!(commit_put(&state, "name", "ARBTToken"), 1);
        assert_eq!(
            state.get("name"),
            Some(VersionedValue {
                value: "ARBTToken".to_string(),
                version: 1,
            })
        );
        assert_eq!(state.height(), 1);
    }

    #[test]
    fn test_simulator_does_not_read_own_writes() {
        let state = WorldState::new();
        commit_put(&state, "totalSupply", "10");

        let mut sim = state.simulator();
        sim.put_string_state("totalSupply", "20").unwrap();
        assert_eq!(
            sim.get_string_state("totalSupply").unwrap(),
            Some("10".to_string())
        );
        assert_eq!(state.get("totalSupply").unwrap().value, "10");
    }

    #[test]
    fn test_uncommitted_simulation_leaves_state() {
        let state = WorldState::new();
        let mut sim = state.simulator();
        sim.put_string_state("symbol", "ARBT").unwrap();
        drop(sim);
        assert!(state.get("symbol").is_none());
        assert_eq!(state.height(), 0);
    }

    #[test]
    fn test_delete() {
        let state = WorldState::new();
        commit_put(&state, "k", "v");

        let mut sim = state.simulator();
        sim.get_string_state("k").unwrap();
        sim.del_state("k").unwrap();
        let (rwset, _) = sim.into_parts();
        state.commit(&rwset).unwrap();
        assert!(state.get("k").is_none());
        assert!(state.snapshot().is_empty());
    }

    #[test]
    fn test_snapshot_drops_versions() {
        let state = WorldState::new();
        commit_put(&state, "name", "ARBTToken");
        commit_put(&state, "symbol", "ARBT");
        let snapshot = state.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["symbol"], "ARBT");
    }

    #[test]
    fn test_empty_key_is_invalid_argument() {
        let state = WorldState::new();
        let mut sim = state.simulator();
        let err = sim.put_string_state("", "v").unwrap_err();
        assert!(matches!(err, StubError::InvalidKey(_)));
        assert!(matches!(sim.del_state(""), Err(StubError::InvalidKey(_))));
        assert_eq!(ContractError::from(err).kind(), ErrorKind::InvalidArgument);
        assert!(sim.rwset().is_read_only());
    }

    #[test]
    fn test_mvcc_conflict() {
        let state = WorldState::new();
        commit_put(&state, "balance", "100");

        let mut first = state.simulator();
        let mut second = state.simulator();
        first.get_string_state("balance").unwrap();
        first.put_string_state("balance", "90").unwrap();
        second.get_string_state("balance").unwrap();
        second.put_string_state("balance", "80").unwrap();

        let (first, _) = first.into_parts();
        let (second, _) = second.into_parts();
        state.commit(&first).unwrap();
        assert_eq!(
            state.commit(&second),
            Err(CommitError::MvccConflict("balance".to_string()))
        );
        assert_eq!(state.get("balance").unwrap().value, "90");
        assert_eq!(state.height(), 2);
    }

    #[test]
    fn test_absent_read_conflicts_with_later_insert() {
        let state = WorldState::new();
        let mut sim = state.simulator();
        assert_eq!(sim.get_string_state("fresh").unwrap(), None);
        sim.put_string_state("fresh", "1").unwrap();

        commit_put(&state, "fresh", "2");
        let (rwset, _) = sim.into_parts();
        assert!(matches!(
            state.commit(&rwset),
            Err(CommitError::MvccConflict(_))
        ));
    }

    #[test]
    fn test_read_write_set_reporting() {
        let state = WorldState::new();
        let mut sim = state.simulator();
        sim.get_string_state("a").unwrap();
        sim.put_string_state("a", "1").unwrap();
        sim.put_string_state("b", "2").unwrap();
        sim.set_event("Transfer", b"{}".to_vec()).unwrap();

        assert!(!sim.rwset().is_read_only());
        assert_eq!(sim.rwset().blind_writes().collect::<Vec<_>>(), vec!["b"]);
        let (rwset, event) = sim.into_parts();
        assert_eq!(rwset.reads().collect::<Vec<_>>(), vec![("a", None)]);
        assert_eq!(
            rwset.writes().collect::<Vec<_>>(),
            vec![("a", Some("1")), ("b", Some("2"))]
        );
        assert_eq!(event.unwrap().name, "Transfer");
    }
}

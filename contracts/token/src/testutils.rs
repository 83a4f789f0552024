//! In-memory stub for exercising the contract without a peer.
//!
//! Writes are applied immediately, so it does not model transaction
//! isolation. Use the host crate's world state for that.

use std::collections::BTreeMap;

use crate::shim::{ChaincodeStub, StubError};

#[derive(Debug, Default, Clone)]
pub struct MemoryStub {
    state: BTreeMap<String, String>,
    event: Option<(String, Vec<u8>)>,
}

impl MemoryStub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.state.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.state.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.state.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The last event set by the contract, if any.
    pub fn event(&self) -> Option<(&str, &[u8])> {
        self.event
            .as_ref()
            .map(|(name, payload)| (name.as_str(), payload.as_slice()))
    }
}

impl ChaincodeStub for MemoryStub {
    fn get_string_state(&mut self, key: &str) -> Result<Option<String>, StubError> {
        Ok(self.state.get(key).cloned())
    }

    fn put_string_state(&mut self, key: &str, value: &str) -> Result<(), StubError> {
        self.state.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> Result<(), StubError> {
        self.state.remove(key);
        Ok(())
    }

    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), StubError> {
        self.event = Some((name.to_string(), payload));
        Ok(())
    }
}

//! Interfaces the contract consumes from its host peer.
//!
//! The contract never owns state. Every operation receives a [`Context`]
//! that pairs the transaction's view of the world state with the identity
//! of the submitting client.

use std::fmt;

use thiserror::Error;

/// Separator between the parts of a composite key.
const COMPOSITE_KEY_NAMESPACE: char = '\u{0000}';
/// Highest code point, reserved by the host for range queries.
const MAX_UNICODE_RUNE: char = '\u{10FFFF}';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StubError {
    #[error("invalid composite key: {0}")]
    InvalidCompositeKey(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("corrupt value stored under key {0:?}")]
    CorruptValue(String),

    #[error("world state unavailable: {0}")]
    Unavailable(String),
}

/// A key built from an object type and an ordered list of attributes.
///
/// Rendered as `\0<objectType>\0<attr1>\0<attr2>\0...`. This byte layout is
/// what external tooling sees in the world state and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    object_type: String,
    attributes: Vec<String>,
}

impl CompositeKey {
    pub fn new(object_type: &str, attributes: &[&str]) -> Result<Self, StubError> {
        if object_type.is_empty() {
            return Err(StubError::InvalidCompositeKey(
                "object type must not be empty".to_string(),
            ));
        }
        validate_part(object_type)?;
        for attr in attributes {
            validate_part(attr)?;
        }
        Ok(Self {
            object_type: object_type.to_string(),
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
        })
    }

    /// Split a rendered composite key back into its parts.
    pub fn parse(key: &str) -> Result<Self, StubError> {
        let body = key
            .strip_prefix(COMPOSITE_KEY_NAMESPACE)
            .and_then(|rest| rest.strip_suffix(COMPOSITE_KEY_NAMESPACE))
            .ok_or_else(|| StubError::InvalidCompositeKey(format!("{key:?} is not composite")))?;
        let mut parts = body.split(COMPOSITE_KEY_NAMESPACE);
        let object_type = parts.next().unwrap_or_default();
        let attributes: Vec<&str> = parts.collect();
        Self::new(object_type, &attributes)
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{COMPOSITE_KEY_NAMESPACE}{}{COMPOSITE_KEY_NAMESPACE}", self.object_type)?;
        for attr in &self.attributes {
            write!(f, "{attr}{COMPOSITE_KEY_NAMESPACE}")?;
        }
        Ok(())
    }
}

fn validate_part(part: &str) -> Result<(), StubError> {
    if part.contains(COMPOSITE_KEY_NAMESPACE) || part.contains(MAX_UNICODE_RUNE) {
        return Err(StubError::InvalidCompositeKey(format!(
            "{part:?} contains a reserved character"
        )));
    }
    Ok(())
}

/// Transaction-scoped access to the world state.
///
/// Values are strings; an empty value is indistinguishable from an absent
/// key for every reader in this crate.
pub trait ChaincodeStub {
    fn get_string_state(&mut self, key: &str) -> Result<Option<String>, StubError>;

    fn put_string_state(&mut self, key: &str, value: &str) -> Result<(), StubError>;

    fn del_state(&mut self, key: &str) -> Result<(), StubError>;

    /// Attach an event to the transaction. A later call replaces an earlier one.
    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), StubError>;

    fn create_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<CompositeKey, StubError> {
        CompositeKey::new(object_type, attributes)
    }
}

/// Identity of the client that submitted the transaction.
pub trait ClientIdentity {
    /// Stable, globally unique identifier of the credential.
    fn id(&self) -> String;

    /// Identifier of the organization that issued the credential.
    fn msp_id(&self) -> &str;
}

/// Identity backed by an X.509 certificate's distinguished names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct X509Identity {
    msp_id: String,
    subject: String,
    issuer: String,
}

impl X509Identity {
    pub fn new(
        msp_id: impl Into<String>,
        subject: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            msp_id: msp_id.into(),
            subject: subject.into(),
            issuer: issuer.into(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }
}

impl ClientIdentity for X509Identity {
    fn id(&self) -> String {
        format!("x509::{}::{}", self.subject, self.issuer)
    }

    fn msp_id(&self) -> &str {
        &self.msp_id
    }
}

/// Everything one contract invocation may touch.
pub struct Context<'a> {
    stub: &'a mut dyn ChaincodeStub,
    identity: &'a dyn ClientIdentity,
}

impl<'a> Context<'a> {
    pub fn new(stub: &'a mut dyn ChaincodeStub, identity: &'a dyn ClientIdentity) -> Self {
        Self { stub, identity }
    }

    pub fn stub(&mut self) -> &mut dyn ChaincodeStub {
        &mut *self.stub
    }

    pub fn client_identity(&self) -> &dyn ClientIdentity {
        self.identity
    }
}

//! Error types for graph inspection

use std::fmt;

use thiserror::Error;

use crate::Value;

/// Errors reported by a registry client implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Registry unavailable: {0}")]
    Unavailable(String),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Registry fault {code}: {message}")]
    Fault { code: i32, message: String },
}

/// Errors reported by a peer client implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeerError {
    #[error("Peer unreachable: {0}")]
    Unreachable(String),

    #[error("Peer rejected request: {0}")]
    Rejected(String),
}

/// Identity of a registry call, including its argument
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegistryCall {
    GetSystemState,
    GetTopicTypes,
    LookupNode(String),
    LookupService(String),
}

impl fmt::Display for RegistryCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryCall::GetSystemState => write!(f, "getSystemState"),
            RegistryCall::GetTopicTypes => write!(f, "getTopicTypes"),
            RegistryCall::LookupNode(name) => write!(f, "lookupNode({})", name),
            RegistryCall::LookupService(name) => write!(f, "lookupService({})", name),
        }
    }
}

/// Identity of a peer call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerCall {
    Connect,
    GetPid,
    Shutdown,
    GetBusInfo,
}

impl fmt::Display for PeerCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PeerCall::Connect => "connect",
            PeerCall::GetPid => "getPid",
            PeerCall::Shutdown => "shutdown",
            PeerCall::GetBusInfo => "getBusInfo",
        };
        f.write_str(name)
    }
}

/// A registry URL that could not be turned into `host:port`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid peer address {url:?}: {reason}")]
pub struct AddressParseError {
    pub url: String,
    pub reason: &'static str,
}

/// Why a bus-info tuple was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordDefect {
    #[error("expected at least {expected} fields, got {actual}")]
    TooShort { expected: usize, actual: usize },

    #[error("field {index} ({field}) is not {expected}")]
    WrongShape {
        index: usize,
        field: &'static str,
        expected: &'static str,
    },
}

/// A bus-info tuple that failed to decode; carries the raw tuple
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid connection record {raw:?}: {defect}")]
pub struct InvalidConnectionRecord {
    pub raw: Vec<Value>,
    pub defect: RecordDefect,
}

/// Inspection errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TopologyError {
    // Registry errors
    #[error("Registry query {call} failed: {source}")]
    RegistryQueryFailed {
        call: RegistryCall,
        source: RegistryError,
    },

    #[error("Lookup of node {node} failed: {source}")]
    NodeLookupFailed { node: String, source: RegistryError },

    // Address errors
    #[error(transparent)]
    AddressParse(#[from] AddressParseError),

    // Peer errors
    #[error("Peer {node} at {address} failed {call}: {source}")]
    PeerUnreachable {
        node: String,
        address: String,
        call: PeerCall,
        source: PeerError,
    },

    #[error(transparent)]
    InvalidConnectionRecord(#[from] InvalidConnectionRecord),
}

impl TopologyError {
    /// The registry error behind this failure, if any
    pub fn registry_error(&self) -> Option<&RegistryError> {
        match self {
            TopologyError::RegistryQueryFailed { source, .. }
            | TopologyError::NodeLookupFailed { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn is_registry_unavailable(&self) -> bool {
        matches!(self.registry_error(), Some(RegistryError::Unavailable(_)))
    }

    pub fn is_unknown_node(&self) -> bool {
        matches!(self.registry_error(), Some(RegistryError::UnknownNode(_)))
    }

    pub fn is_unknown_service(&self) -> bool {
        matches!(self.registry_error(), Some(RegistryError::UnknownService(_)))
    }
}

/// Result type for inspection operations
pub type TopologyResult<T> = Result<T, TopologyError>;

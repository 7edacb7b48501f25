//! Error types for the spanning tree engine.

use thiserror::Error;

/// Convenience alias for results returned by [`Bridge`](crate::Bridge).
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors raised while decoding a BPDU.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BpduError {
    /// Frame too short for the BPDU shape announced by its header
    #[error("bpdu too short: expected at least {expected}, got {actual}")]
    TooShort {
        /// Expected minimum size
        expected: usize,
        /// Actual size received
        actual: usize,
    },

    /// The protocol identifier is not the spanning tree one
    #[error("invalid protocol identifier: 0x{0:04X}")]
    BadProtocolId(u16),

    /// The (version, type) pair does not name a known BPDU
    #[error("unknown bpdu: version {version}, type 0x{bpdu_type:02X}")]
    UnknownType {
        /// Protocol version identifier
        version: u8,
        /// BPDU type byte
        bpdu_type: u8,
    },
}

/// Errors returned by the bridge entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// A bridge needs at least one port and at most 4095
    #[error("invalid port count: {0}")]
    InvalidPortCount(usize),

    /// At most 64 MSTIs can be carried in an MST BPDU
    #[error("invalid msti count: {0}")]
    InvalidMstiCount(usize),

    /// Port index out of range
    #[error("invalid port index: {0}")]
    InvalidPort(usize),

    /// Tree index out of range
    #[error("invalid tree index: {0}")]
    InvalidTree(usize),

    /// Bridge priority must be a multiple of 4096 not above 61440
    #[error("invalid bridge priority: {0}")]
    InvalidBridgePriority(u16),

    /// Port priority must be a multiple of 16 not above 240
    #[error("invalid port priority: {0}")]
    InvalidPortPriority(u8),

    /// MST configuration names are at most 32 bytes of printable ASCII
    #[error("invalid mst configuration name")]
    InvalidConfigName,

    /// VLAN identifiers are in 1..=4094
    #[error("invalid vlan: {0}")]
    InvalidVlan(u16),

    /// The operation needs a started bridge
    #[error("bridge not started")]
    NotStarted,

    /// The bridge timer parameters are outside of the 802.1Q ranges
    #[error("invalid bridge configuration: {0}")]
    InvalidConfig(String),
}

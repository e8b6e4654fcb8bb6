//! Unified error type for the Quizhall server.

use quizhall_engine::EngineError;
use quizhall_protocol::ProtocolError;
use quizhall_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `quizhall` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum QuizhallError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An engine-level error (room lookup, phase, scoring).
    #[error(transparent)]
    Engine(#[from] EngineError),
}

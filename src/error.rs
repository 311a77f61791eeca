use thiserror::Error;

use crate::host::Capability;

/// Failure kinds owned by this crate. Host and network failures travel as
/// `anyhow::Error` and are wrapped with context on the way up.
#[derive(Error, Debug)]
pub enum Error {
    #[error("queue entry at position {position} has no {missing} to anchor on")]
    MalformedAnchor {
        position: usize,
        missing: &'static str,
    },
    #[error("host not ready, still missing: {missing:?}")]
    HostNotReady { missing: Vec<Capability> },
    #[error("{0} is not a valid resource identifier")]
    InvalidUri(String),
    #[error("no pending selection to add")]
    EmptySelection,
}

//! Error taxonomy for the tunnel daemon.
//!
//! Setup failures are fatal to the process; runtime faults are fatal only
//! to the current bridge session. A clean peer disconnect is not an error
//! and is represented separately (see [`crate::session::SessionEnd`]).

use std::io;
use thiserror::Error;

/// Failures during startup: device creation, socket establishment.
///
/// None of these are retried; a missing TUN device node or an occupied
/// listen port will not fix itself mid-run.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("TUN device creation failed: {0}")]
    Device(#[from] tun::Error),

    #[error("Failed to bind listen socket on {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error("Failed to accept client connection: {0}")]
    Accept(io::Error),

    #[error("Failed to connect to server {addr}: {source}")]
    Connect { addr: String, source: io::Error },
}

/// Runtime faults that end the current session.
///
/// The server recovers at the session boundary by returning to accept;
/// the client exits. There is no byte-level retry.
#[derive(Debug, Error)]
pub enum Fault {
    #[error("TUN read failed: {0}")]
    TunRead(io::Error),

    #[error("TUN write failed: {0}")]
    TunWrite(io::Error),

    #[error("Receive from peer failed: {0}")]
    PeerRecv(io::Error),

    #[error("Send to peer failed: {0}")]
    PeerSend(io::Error),
}

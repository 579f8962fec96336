//! The bridge session: one TUN device paired with one peer connection.
//!
//! Wire format caveat: the TCP payload is the raw IP datagram bytes with
//! no length prefix or delimiter, for bit-compatibility with the original
//! protocol. Every receive result is treated as exactly one forwardable
//! unit, even though TCP may split or concatenate datagrams across sends.

use crate::error::Fault;
use crate::inspect;
use crate::tun_adapter::{PacketDevice, MTU};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::sleep;

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;

/// How long one readiness wait may park before the loop ticks over.
const WAIT_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Active,
    Closed,
}

/// Why a session ended. A clean peer shutdown is an expected outcome,
/// not an error; it is reported distinctly from runtime faults.
#[derive(Debug)]
pub enum SessionEnd {
    /// Peer closed the connection (receive returned 0 bytes).
    Disconnect,
    /// An I/O fault on either side ended the session.
    Fault(Fault),
}

enum Ready {
    Tun(std::io::Result<usize>),
    Peer(std::io::Result<usize>),
    Tick,
}

/// Bridges packets between a TUN device and a peer byte stream until the
/// peer disconnects or a fault occurs.
///
/// The server constructs one per accepted client, lending the process's
/// single [`crate::tun_adapter::TunAdapter`] by `&mut` borrow; the borrow
/// is what enforces the one-active-session-at-a-time discipline.
pub struct BridgeSession<D, S> {
    device: D,
    peer: S,
    state: SessionState,
}

impl<D, S> BridgeSession<D, S>
where
    D: PacketDevice,
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(device: D, peer: S) -> Self {
        Self {
            device,
            peer,
            state: SessionState::Connecting,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = ?self.state, to = ?next, "session state transition");
        self.state = next;
    }

    /// Run the session to completion. Returns how it ended; the peer
    /// connection is released when the session is dropped.
    pub async fn run(&mut self) -> SessionEnd {
        self.transition(SessionState::Active);

        let mut tun_buf = vec![0u8; MTU];
        let mut peer_buf = vec![0u8; MTU];
        let Self { device, peer, .. } = self;

        let end = loop {
            // One ready side is serviced per wakeup, TUN side first, so
            // locally generated traffic is never delayed behind an
            // inbound burst within a single tick.
            let ready = tokio::select! {
                biased;
                res = device.read_packet(&mut tun_buf) => Ready::Tun(res),
                res = peer.read(&mut peer_buf) => Ready::Peer(res),
                _ = sleep(WAIT_TIMEOUT) => Ready::Tick,
            };

            match ready {
                Ready::Tun(Ok(n)) => {
                    log_forward("tun -> peer", &tun_buf[..n]);
                    if let Err(e) = peer.write_all(&tun_buf[..n]).await {
                        break SessionEnd::Fault(Fault::PeerSend(e));
                    }
                }
                Ready::Tun(Err(e)) => break SessionEnd::Fault(Fault::TunRead(e)),
                Ready::Peer(Ok(0)) => break SessionEnd::Disconnect,
                Ready::Peer(Ok(n)) => {
                    log_forward("peer -> tun", &peer_buf[..n]);
                    if let Err(e) = device.write_packet(&peer_buf[..n]).await {
                        break SessionEnd::Fault(Fault::TunWrite(e));
                    }
                }
                Ready::Peer(Err(e)) => break SessionEnd::Fault(Fault::PeerRecv(e)),
                Ready::Tick => {
                    tracing::trace!("idle tick, neither side ready");
                }
            }
        };

        self.transition(SessionState::Closed);
        match &end {
            SessionEnd::Disconnect => tracing::info!("peer disconnected"),
            SessionEnd::Fault(fault) => tracing::warn!(%fault, "session fault"),
        }
        end
    }
}

/// Diagnostic-only header peek; malformed chunks are still forwarded.
fn log_forward(direction: &str, chunk: &[u8]) {
    match inspect::inspect(chunk) {
        Ok(view) => tracing::debug!(packet = %view, "{direction}"),
        Err(e) => tracing::debug!(len = chunk.len(), error = %e, "{direction} (malformed)"),
    }
}

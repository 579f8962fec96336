use crate::error::SetupError;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::{TcpListener, TcpStream};

/// One established TCP connection to the remote tunnel peer.
///
/// The client creates exactly one per process run via [`connect`];
/// the server gets one per accepted client from [`PeerListener::accept`]
/// and drops it when the session closes.
///
/// [`connect`]: PeerConnection::connect
pub struct PeerConnection {
    stream: TcpStream,
    remote: SocketAddr,
}

impl PeerConnection {
    /// Connect outward to a listening peer (client role).
    pub async fn connect(addr: SocketAddr) -> Result<Self, SetupError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| SetupError::Connect {
                addr: addr.to_string(),
                source,
            })?;
        Ok(Self {
            stream,
            remote: addr,
        })
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }
}

// The bridge session reads and writes the peer as a plain byte stream;
// the wire payload is the raw IP datagram bytes, unframed.
impl AsyncRead for PeerConnection {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_read(cx, buf)
    }
}

impl AsyncWrite for PeerConnection {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.stream).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_shutdown(cx)
    }
}

/// Listening socket for the server role.
///
/// Accepts clients strictly one at a time: while a session is active no
/// accept call is outstanding, so further connection attempts queue in
/// the OS listen backlog until the current session ends.
pub struct PeerListener {
    listener: TcpListener,
}

impl PeerListener {
    pub async fn bind(addr: SocketAddr) -> Result<Self, SetupError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| SetupError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn accept(&self) -> Result<PeerConnection, SetupError> {
        let (stream, remote) = self.listener.accept().await.map_err(SetupError::Accept)?;
        Ok(PeerConnection { stream, remote })
    }
}

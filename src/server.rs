//! Single-shot TCP transfer session.
//!
//! Serves exactly one peer per process run: accept one connection, write
//! the digest lines followed by the raw payload, close the connection and
//! the listening socket. The lifecycle is an explicit state machine so the
//! single-connection contract is a documented invariant rather than an
//! accident of control flow.

use crate::digest::DigestPair;
use bytes::{BufMut, Bytes, BytesMut};
use std::io::{self, Write};
use std::net::{SocketAddr, TcpListener};
use tracing::{debug, info};

/// Transfer session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    /// Bound and blocked in accept
    Listening,
    /// One peer accepted
    Connected,
    /// Frame being written to the connection
    Sending,
    /// Connection closed; no further peers are served
    Closed,
}

/// Errors during the transfer session
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("invalid listen address '{0}': {1}")]
    InvalidAddr(String, #[source] std::net::AddrParseError),

    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}

/// A bound, not-yet-served transfer session.
///
/// `serve` consumes the session, so a second transfer per process is
/// unrepresentable; the listener is dropped on every exit path.
pub struct Session {
    listener: TcpListener,
    state: SessionState,
}

impl Session {
    /// Bind the listening socket.
    pub fn bind(addr: &str) -> Result<Self, TransferError> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| TransferError::InvalidAddr(addr.to_string(), e))?;
        let listener = create_listener(addr)?;

        info!(addr = %listener.local_addr()?, "Server listening");
        Ok(Session {
            listener,
            state: SessionState::Listening,
        })
    }

    /// Address the session is listening on (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, TransferError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept one peer and deliver the frame, then close everything.
    ///
    /// Blocks indefinitely until a peer connects. The frame is written in
    /// full before the connection is closed; accept or write failures are
    /// fatal and nothing is retried. Returns the number of bytes written.
    pub fn serve(mut self, digests: &DigestPair, payload: &Bytes) -> Result<u64, TransferError> {
        let (mut stream, peer) = self.listener.accept()?;
        self.advance(SessionState::Connected);
        info!(peer = %peer, "Connected");

        let frame = build_frame(digests, payload);
        self.advance(SessionState::Sending);
        stream.write_all(&frame)?;
        stream.flush()?;

        drop(stream);
        self.advance(SessionState::Closed);
        info!(bytes = frame.len(), "Frame delivered, session closed");

        // Listener drops with self; no second accept.
        Ok(frame.len() as u64)
    }

    fn advance(&mut self, next: SessionState) {
        debug!(from = ?self.state, to = ?next, "Session state");
        self.state = next;
    }
}

/// Assemble the wire frame: `<sha256>\n<md5>\n<payload>`.
///
/// No trailing delimiter and no length prefix; the client finds the
/// payload boundary by reading until the connection closes.
fn build_frame(digests: &DigestPair, payload: &[u8]) -> Bytes {
    let mut frame =
        BytesMut::with_capacity(digests.sha256.len() + digests.md5.len() + 2 + payload.len());
    frame.put_slice(digests.sha256.as_bytes());
    frame.put_u8(b'\n');
    frame.put_slice(digests.md5.as_bytes());
    frame.put_u8(b'\n');
    frame.put_slice(payload);
    frame.freeze()
}

/// Create a blocking TCP listener with SO_REUSEADDR and a backlog of one.
fn create_listener(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = socket2::Socket::new(
        match addr {
            SocketAddr::V4(_) => socket2::Domain::IPV4,
            SocketAddr::V6(_) => socket2::Domain::IPV6,
        },
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1)?;

    Ok(socket.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::digest_reader;
    use std::io::{Cursor, Read};
    use std::net::TcpStream;
    use std::thread;

    fn read_to_eof(addr: SocketAddr) -> Vec<u8> {
        let mut stream = TcpStream::connect(addr).unwrap();
        let mut received = Vec::new();
        stream.read_to_end(&mut received).unwrap();
        received
    }

    #[test]
    fn test_frame_layout() {
        let payload = vec![0xABu8; 1024];
        let digests = digest_reader(Cursor::new(&payload)).unwrap();
        let frame = build_frame(&digests, &payload);

        assert_eq!(frame.len(), 64 + 1 + 32 + 1 + 1024);
        assert_eq!(frame[64], b'\n');
        assert_eq!(frame[64 + 1 + 32], b'\n');
        assert_eq!(&frame[..64], digests.sha256.as_bytes());
        assert_eq!(&frame[65..97], digests.md5.as_bytes());
        assert_eq!(&frame[98..], &payload[..]);
    }

    #[test]
    fn test_invalid_addr_rejected() {
        assert!(matches!(
            Session::bind("not-an-address"),
            Err(TransferError::InvalidAddr(..))
        ));
    }

    #[test]
    fn test_single_session_delivery() {
        let payload = crate::payload::generate(1024);
        let digests = digest_reader(Cursor::new(&payload[..])).unwrap();

        let session = Session::bind("127.0.0.1:0").unwrap();
        let addr = session.local_addr().unwrap();

        let client = thread::spawn(move || read_to_eof(addr));

        let written = session.serve(&digests, &payload).unwrap();
        let received = client.join().unwrap();

        // Exactly two digest lines plus the payload, nothing else
        assert_eq!(written, received.len() as u64);
        assert_eq!(received.len(), 64 + 1 + 32 + 1 + 1024);

        let mut lines = received.splitn(3, |&b| b == b'\n');
        let sha_line = lines.next().unwrap();
        let md5_line = lines.next().unwrap();
        let body = lines.next().unwrap();

        assert_eq!(sha_line.len(), 64);
        assert_eq!(md5_line.len(), 32);
        assert_eq!(body.len(), 1024);
        assert_eq!(sha_line, digests.sha256.as_bytes());
        assert_eq!(md5_line, digests.md5.as_bytes());

        // Client-side verification against the received bytes
        let recomputed = digest_reader(Cursor::new(body)).unwrap();
        assert_eq!(recomputed.sha256.as_bytes(), sha_line);
        assert_eq!(recomputed.md5.as_bytes(), md5_line);
    }

    #[test]
    fn test_second_connection_refused() {
        let payload = Bytes::from_static(b"one-shot");
        let digests = digest_reader(Cursor::new(&payload[..])).unwrap();

        let session = Session::bind("127.0.0.1:0").unwrap();
        let addr = session.local_addr().unwrap();

        let client = thread::spawn(move || read_to_eof(addr));
        session.serve(&digests, &payload).unwrap();
        client.join().unwrap();

        // Listener was dropped when serve returned
        assert!(TcpStream::connect(addr).is_err());
    }
}

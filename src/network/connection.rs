//! Connection Manager
//!
//! Owns the TCP session to the filter service: the socket, the
//! lifecycle state machine, and the reader thread feeding inbound bytes
//! to the correlator.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;

use bytes::Bytes;
use parking_lot::Mutex;

use super::correlator::{Correlator, ResponseHandle};
use crate::config::Config;
use crate::error::{BloomError, Result};
use crate::protocol::Verb;

/// Inbound read buffer size, matching the service's own frame size
const READ_BUFFER_SIZE: usize = 4096;

/// Connection lifecycle
///
/// `Closed` is terminal; a client that wants to reconnect creates a new
/// instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Constructed, never connected
    Idle,

    /// `connect()` in progress
    Connecting,

    /// Transport established, requests accepted
    Open,

    /// The transport is gone
    Closed,
}

struct Inner {
    state: State,
    stream: Option<TcpStream>,
}

/// Manages the single TCP session to the filter service
pub struct Connection {
    config: Config,
    inner: Arc<Mutex<Inner>>,
    correlator: Arc<Correlator>,
}

impl Connection {
    /// Create an unconnected manager for the configured endpoint
    pub fn new(config: Config) -> Self {
        Self {
            config,
            inner: Arc::new(Mutex::new(Inner {
                state: State::Idle,
                stream: None,
            })),
            correlator: Arc::new(Correlator::default()),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> State {
        self.inner.lock().state
    }

    /// Open the transport to the configured endpoint
    ///
    /// Resolves once the socket is established and the reader thread is
    /// running. Fails with [`BloomError::Connection`] if the transport
    /// cannot be established, or if a connection is already open.
    pub fn connect(&self) -> Result<()> {
        {
            let mut inner = self.inner.lock();
            match inner.state {
                State::Idle => inner.state = State::Connecting,
                State::Connecting | State::Open => {
                    return Err(BloomError::Connection("already connected".to_string()));
                }
                State::Closed => return Err(BloomError::NotConnected),
            }
        }

        let opened = self.open_stream();

        let mut inner = self.inner.lock();
        let stream = match opened {
            Ok(stream) => stream,
            Err(e) => {
                inner.state = State::Idle;
                return Err(BloomError::Connection(e.to_string()));
            }
        };

        // Second handle for the reader thread; the writer stays here.
        let read_half = match stream.try_clone() {
            Ok(read_half) => read_half,
            Err(e) => {
                inner.state = State::Idle;
                return Err(BloomError::Connection(e.to_string()));
            }
        };

        inner.stream = Some(stream);
        inner.state = State::Open;
        drop(inner);

        let correlator = Arc::clone(&self.correlator);
        let shared = Arc::clone(&self.inner);
        let spawned = thread::Builder::new()
            .name("bloomlink-reader".to_string())
            .spawn(move || read_loop(read_half, correlator, shared));

        if let Err(e) = spawned {
            let mut inner = self.inner.lock();
            inner.state = State::Closed;
            inner.stream = None;
            self.correlator.close();
            return Err(BloomError::Connection(e.to_string()));
        }

        tracing::debug!(addr = %self.config.addr(), "connection open");
        Ok(())
    }

    /// Establish the socket, trying each resolved address in turn
    fn open_stream(&self) -> std::io::Result<TcpStream> {
        let addrs = (self.config.host.as_str(), self.config.port).to_socket_addrs()?;

        let mut last_err = None;
        for addr in addrs {
            let attempt = match self.config.connect_timeout() {
                Some(limit) => TcpStream::connect_timeout(&addr, limit),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => {
                    if self.config.nodelay {
                        stream.set_nodelay(true)?;
                    }
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }

        Err(last_err.unwrap_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                "address resolved to nothing",
            )
        }))
    }

    /// Register a pending request, then write one encoded command line
    ///
    /// Registration happens before the write so a close racing the
    /// write still fails the request instead of leaving it unresolved.
    pub(crate) fn begin(&self, verb: Verb, frame: &[u8]) -> Result<ResponseHandle> {
        let inner = self.inner.lock();
        if inner.state != State::Open {
            return Err(BloomError::NotConnected);
        }
        let mut stream = match inner.stream.as_ref() {
            Some(stream) => stream,
            None => return Err(BloomError::NotConnected),
        };

        let handle = Correlator::register(&self.correlator, verb)?;

        if let Err(e) = stream.write_all(frame).and_then(|()| stream.flush()) {
            self.correlator.abandon();
            return Err(BloomError::Io(e));
        }

        tracing::trace!(%verb, len = frame.len(), "command written");
        Ok(handle)
    }

    /// Begin a graceful half-close
    ///
    /// Does not block on acknowledgment. An outstanding request is
    /// failed when the reader observes the close, not here.
    pub fn end(&self) {
        let inner = self.inner.lock();
        if inner.state == State::Open {
            if let Some(stream) = inner.stream.as_ref() {
                let _ = stream.shutdown(Shutdown::Write);
                tracing::debug!("half-close initiated");
            }
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        // Unblocks the reader thread if the client is dropped mid-session.
        let inner = self.inner.lock();
        if let Some(stream) = inner.stream.as_ref() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

/// Reader loop: forwards every inbound chunk to the correlator
///
/// Chunks are delivered as read. A response is trusted to arrive whole
/// in one read, mirroring the service's own framing assumption.
fn read_loop(mut stream: TcpStream, correlator: Arc<Correlator>, inner: Arc<Mutex<Inner>>) {
    let mut buf = [0u8; READ_BUFFER_SIZE];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => {
                tracing::debug!("server closed the connection");
                break;
            }
            Ok(n) => correlator.deliver_data(Bytes::copy_from_slice(&buf[..n])),
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::debug!(error = %e, "transport error");
                correlator.deliver_error(e);
                break;
            }
        }
    }

    correlator.close();
    let mut inner = inner.lock();
    inner.state = State::Closed;
    inner.stream = None;
}

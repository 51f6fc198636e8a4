//! Client Module
//!
//! The typed command surface over the codec and the connection.
//!
//! ## Concurrency Model: One Exchange In Flight
//!
//! The wire protocol answers commands strictly in order and never
//! multiplexes, so a single request may be outstanding at a time. The
//! client enforces this with a send-turn mutex held across the whole
//! register → write → wait cycle: concurrent callers queue and run one
//! exchange each, in the order their turn comes up.

use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{BloomError, Result};
use crate::network::{Connection, State};
use crate::protocol::{self, Command, Reply};

/// Client for a remote Bloom filter service
///
/// Wraps one long-lived TCP connection. Construction does not connect;
/// call [`connect`](Self::connect) before issuing commands.
///
/// ```no_run
/// use bloomlink::BloomClient;
///
/// # fn main() -> bloomlink::Result<()> {
/// let client = BloomClient::new();
/// client.connect()?;
///
/// client.add(["felix", "markus"])?;
/// assert!(client.has("felix")?);
///
/// client.end();
/// # Ok(())
/// # }
/// ```
pub struct BloomClient {
    /// The one TCP session
    connection: Connection,

    /// Grants one caller at a time the right to an exchange
    turn: Mutex<()>,

    /// Optional per-request deadline
    response_timeout: Option<Duration>,
}

impl BloomClient {
    /// Create a client for the default endpoint (`127.0.0.1:1337`)
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a client from a config
    pub fn with_config(config: Config) -> Self {
        let response_timeout = config.response_timeout();
        Self {
            connection: Connection::new(config),
            turn: Mutex::new(()),
            response_timeout,
        }
    }

    // =========================================================================
    // Connection Lifecycle
    // =========================================================================

    /// Open the connection to the filter service
    pub fn connect(&self) -> Result<()> {
        self.connection.connect()
    }

    /// Begin a graceful close; does not block on acknowledgment
    pub fn end(&self) {
        self.connection.end();
    }

    /// Whether the connection is currently open
    pub fn is_open(&self) -> bool {
        self.connection.state() == State::Open
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Add items to the filter
    ///
    /// Items are space-joined into a single command line, so they must
    /// not themselves contain whitespace.
    pub fn add<I, S>(&self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = items.into_iter().map(Into::into).collect();
        match self.exchange(Command::Add { items })? {
            Reply::Done => Ok(()),
            other => Err(mismatched(other)),
        }
    }

    /// Remove items from the filter
    ///
    /// Same wire constraints as [`add`](Self::add).
    pub fn remove<I, S>(&self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = items.into_iter().map(Into::into).collect();
        match self.exchange(Command::Remove { items })? {
            Reply::Done => Ok(()),
            other => Err(mismatched(other)),
        }
    }

    /// Test whether an item is (probably) in the filter
    pub fn has(&self, item: impl Into<String>) -> Result<bool> {
        match self.exchange(Command::Has { item: item.into() })? {
            Reply::Presence(present) => Ok(present),
            other => Err(mismatched(other)),
        }
    }

    /// Fetch the counter for an item
    ///
    /// Whatever count the service reports is relayed as-is; the floor
    /// behavior on repeated removes is service-defined.
    pub fn count(&self, item: impl Into<String>) -> Result<i64> {
        match self.exchange(Command::Count { item: item.into() })? {
            Reply::Count(count) => Ok(count),
            other => Err(mismatched(other)),
        }
    }

    /// Fetch the raw filter state
    ///
    /// The payload has no wire-level framing; it is whatever one
    /// transport read delivers.
    pub fn binary(&self) -> Result<Bytes> {
        match self.exchange(Command::Binary)? {
            Reply::State(state) => Ok(state),
            other => Err(mismatched(other)),
        }
    }

    // =========================================================================
    // Exchange
    // =========================================================================

    /// Run one request/response exchange
    ///
    /// Takes the send turn, encodes and writes the command line, then
    /// blocks until the correlator resolves it with a response, a
    /// transport error, close, or the opt-in deadline.
    fn exchange(&self, command: Command) -> Result<Reply> {
        let _turn = self.turn.lock();

        let verb = command.verb();
        let frame = protocol::encode_command(&command);

        let handle = self.connection.begin(verb, &frame)?;
        let raw = handle.wait(self.response_timeout)?;

        protocol::parse_response(verb, raw)
    }
}

impl Default for BloomClient {
    fn default() -> Self {
        Self::new()
    }
}

/// A reply variant that does not match the issued verb
fn mismatched(reply: Reply) -> BloomError {
    BloomError::Protocol(format!("{reply:?}"))
}

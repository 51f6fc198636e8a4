//! # bloomlink
//!
//! A client for a remote Bloom filter service, reachable over a single
//! long-lived TCP connection:
//! - Line-oriented ASCII wire protocol (`ADD` / `RMV` / `HAS` / `CNT` / `BIN`)
//! - One connection, one outstanding exchange at a time
//! - Internal send queue so concurrent callers never collide
//! - Typed results with the raw server text preserved on failure
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                 BloomClient                   │
//! │      add / remove / has / count / binary      │
//! └──────────┬───────────────────▲────────────────┘
//!            │ encode            │ parse
//! ┌──────────▼───────────────────┴────────────────┐
//! │               Protocol Codec                  │
//! └──────────┬───────────────────▲────────────────┘
//!            │ wire line         │ raw bytes
//! ┌──────────▼───────────────────┴────────────────┐
//! │  Connection ───────────► Correlator           │
//! │  (TCP + reader thread)   (pending request)    │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! The connection writes each encoded command and a background reader
//! thread feeds whatever the transport delivers back to the correlator,
//! which resolves the one pending request. The wire protocol is strictly
//! request-then-response, so the client serializes exchanges internally;
//! calling from multiple threads is safe, callers simply take turns.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BloomError, Result};
pub use config::Config;
pub use client::BloomClient;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of bloomlink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

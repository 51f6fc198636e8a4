//! Response definitions
//!
//! Typed results of decoding a raw response.

use bytes::Bytes;

/// A decoded response from the filter service
///
/// The wire grammar is not self-describing: the same bytes decode
/// differently depending on which verb produced them, so a `Reply` only
/// exists downstream of [`parse_response`](super::parse_response).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// ADD / RMV acknowledged
    Done,

    /// HAS answer
    Presence(bool),

    /// CNT answer
    Count(i64),

    /// BIN payload: the service's raw filter state
    State(Bytes),
}

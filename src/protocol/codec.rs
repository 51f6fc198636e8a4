//! Protocol codec
//!
//! Encoding and decoding for the line-oriented wire protocol.
//!
//! ## Wire Format
//!
//! ### Request
//! ```text
//! VERB arg1 arg2 ...\n
//! ```
//!
//! ### Response by verb
//! - ADD / RMV: `OK.\n`
//! - HAS:       `Yes.\n` or `No.\n`
//! - CNT:       decimal count text (the service appends `.\n`), or an
//!              `ERROR.`-prefixed failure line
//! - BIN:       raw filter state, no terminator
//!
//! BIN responses carry no length prefix, so the payload is whatever one
//! transport read delivers. That framing assumption comes from the wire
//! protocol itself and holds only while responses fit a single segment.

use bytes::Bytes;

use super::{Command, Reply, Verb};
use crate::error::{BloomError, Result};

/// Acknowledgment line for ADD / RMV
const ACK_LINE: &[u8] = b"OK.\n";

/// Positive HAS answer
const YES_LINE: &[u8] = b"Yes.\n";

/// Negative HAS answer
const NO_LINE: &[u8] = b"No.\n";

/// Prefix marking an application-level failure
const ERROR_PREFIX: &str = "ERROR.";

// =============================================================================
// Command Encoding
// =============================================================================

/// Encode a command into its wire line
///
/// Arguments are space-joined after the verb; a bare verb encodes with
/// no trailing space (`BIN\n`).
pub fn encode_command(command: &Command) -> Vec<u8> {
    let verb = command.verb().as_str();
    let args = command.args();

    let mut line = String::with_capacity(
        verb.len() + args.iter().map(|a| a.len() + 1).sum::<usize>() + 1,
    );
    line.push_str(verb);
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line.push('\n');

    line.into_bytes()
}

// =============================================================================
// Response Decoding
// =============================================================================

/// Decode a raw response under the grammar of the verb that was sent
pub fn parse_response(verb: Verb, raw: Bytes) -> Result<Reply> {
    match verb {
        Verb::Add | Verb::Remove => parse_ack(&raw),
        Verb::Has => parse_presence(&raw),
        Verb::Count => parse_count(&raw),
        Verb::Binary => Ok(Reply::State(raw)),
    }
}

/// Decode an ADD / RMV acknowledgment
fn parse_ack(raw: &[u8]) -> Result<Reply> {
    if raw == ACK_LINE {
        Ok(Reply::Done)
    } else {
        Err(unexpected(raw))
    }
}

/// Decode a HAS answer
fn parse_presence(raw: &[u8]) -> Result<Reply> {
    if raw == YES_LINE {
        Ok(Reply::Presence(true))
    } else if raw == NO_LINE {
        Ok(Reply::Presence(false))
    } else {
        Err(unexpected(raw))
    }
}

/// Decode a CNT answer
///
/// `ERROR.`-prefixed text is a service-reported failure and carries the
/// raw line verbatim. Anything else must lead with a decimal count.
fn parse_count(raw: &[u8]) -> Result<Reply> {
    let text = std::str::from_utf8(raw).map_err(|_| unexpected(raw))?;

    if text.starts_with(ERROR_PREFIX) {
        return Err(BloomError::Service(text.to_string()));
    }

    match leading_int(text) {
        Some(count) => Ok(Reply::Count(count)),
        None => Err(unexpected(raw)),
    }
}

/// Parse the leading decimal integer of a count response
///
/// The service terminates counts with `.\n`, so only the leading digit
/// run (after an optional sign) is significant.
fn leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }

    rest[..digits]
        .parse::<i64>()
        .ok()
        .map(|count| if negative { -count } else { count })
}

fn unexpected(raw: &[u8]) -> BloomError {
    BloomError::Protocol(String::from_utf8_lossy(raw).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_int_strips_service_trailer() {
        assert_eq!(leading_int("3.\n"), Some(3));
        assert_eq!(leading_int("12\n"), Some(12));
        assert_eq!(leading_int("-4.\n"), Some(-4));
        assert_eq!(leading_int("nope"), None);
        assert_eq!(leading_int(""), None);
    }
}

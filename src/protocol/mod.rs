//! Protocol Module
//!
//! Defines the wire protocol spoken with the filter service.
//!
//! ## Wire Format
//!
//! ### Request
//! ```text
//! VERB arg1 arg2 ...\n
//! ```
//! ASCII, space-joined arguments, single trailing newline.
//!
//! ### Verbs
//! - ADD: set one or more items
//! - RMV: remove one or more items
//! - HAS: membership test for one item
//! - CNT: counter for one item
//! - BIN: fetch the raw filter state
//!
//! ### Responses
//! Newline-terminated ASCII for ADD/RMV/HAS/CNT. BIN answers with raw
//! bytes carrying no terminator or length prefix. The grammar is
//! selected by the verb that was sent — nothing in the response bytes
//! identifies the command they answer.

mod command;
mod response;
mod codec;

pub use command::{Command, Verb};
pub use response::Reply;
pub use codec::{encode_command, parse_response};

//! Wire protocol building blocks
//!
//! The chat protocol is newline-terminated UTF-8 text over a reliable byte
//! stream. There is no framing beyond line boundaries and no length limit;
//! the terminator is `\n`, with `\r\n` accepted on input.

pub mod constants;
pub mod line;

pub use constants::{DEFAULT_PORT, NAME_PROMPT, WELCOME};
pub use line::{is_abrupt_disconnect, BoxedWriteHalf, LineReader, LineWriter};

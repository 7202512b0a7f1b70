//! Protocol constants
//!
//! The fixed lines the server emits during registration, plus the default
//! port. All server output is newline-terminated, the prompt included, so
//! line-oriented clients never block on a partial line.

/// Default TCP port for the chat service
pub const DEFAULT_PORT: u16 = 11111;

/// Prompt sent to every new connection before registration
pub const NAME_PROMPT: &str = "Enter your name:";

/// Acknowledgement sent to a session once its name is registered
pub const WELCOME: &str = "You have joined the chat. Type a message.";

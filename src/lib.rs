//! Warden - command authorization gate for chat bots
//!
//! Decides whether a chat user may run a bot command, consulting an
//! identity service (NickServ) when the access table requires it.

pub mod access;
pub mod authority;
pub mod contact;
pub mod errors;
pub mod gate;
pub mod irc;
pub mod oracle;
pub mod pending;
pub mod reload;
pub mod settings;
pub mod stdio;
pub mod transport;

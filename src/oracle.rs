//! Identity oracle boundary and its NickServ implementation.
//!
//! The oracle is asked `STATUS <nick>` and answers, at some later point,
//! with a notice `STATUS <nick> <code>`. Code 3 means the nick is
//! registered and the user has identified to it.

use std::sync::Arc;

use crate::errors::WardenError;
use crate::transport::Transport;

pub const DEFAULT_SERVICE: &str = "NickServ";
pub const DEFAULT_AUTHENTICATED_STATUS: u32 = 3;

/// Fire-and-forget status query. The answer arrives through
/// [`AuthorizationGate::on_status_reply`](crate::gate::AuthorizationGate::on_status_reply).
pub trait Oracle: Send + Sync {
    fn send_status_query(&self, user: &str) -> Result<(), WardenError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReply {
    pub user: String,
    pub authenticated: bool,
}

pub struct NickServOracle {
    transport: Arc<dyn Transport>,
    service: String,
    authenticated_status: u32,
}

impl NickServOracle {
    pub fn new(transport: Arc<dyn Transport>, service: impl Into<String>) -> Self {
        Self {
            transport,
            service: service.into(),
            authenticated_status: DEFAULT_AUTHENTICATED_STATUS,
        }
    }

    pub fn with_authenticated_status(mut self, status: u32) -> Self {
        self.authenticated_status = status;
        self
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Accept a notice only if it comes from the service and is addressed to us.
    pub fn accept_notice(
        &self,
        from: &str,
        target: &str,
        nickname: &str,
        text: &str,
    ) -> Option<StatusReply> {
        if !from.eq_ignore_ascii_case(&self.service) || !target.eq_ignore_ascii_case(nickname) {
            return None;
        }
        parse_status_notice(text, self.authenticated_status)
    }
}

impl Oracle for NickServOracle {
    fn send_status_query(&self, user: &str) -> Result<(), WardenError> {
        self.transport
            .send(&self.service, &format!("STATUS {user}"))
    }
}

/// Parse `STATUS <nick> <code>`. Anything else, including a non-numeric
/// code, is not a status reply.
pub fn parse_status_notice(text: &str, authenticated_status: u32) -> Option<StatusReply> {
    let mut words = text.split_whitespace();
    let (Some("STATUS"), Some(user), Some(code), None) =
        (words.next(), words.next(), words.next(), words.next())
    else {
        return None;
    };
    let code: u32 = code.parse().ok()?;
    Some(StatusReply {
        user: user.to_string(),
        authenticated: code == authenticated_status,
    })
}

//! Turns incoming command lines into gated command executions.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::access::types::normalize;
use crate::errors::WardenError;
use crate::gate::{AuthorizationGate, Verdict};
use crate::irc::Incoming;
use crate::reload::ReloadController;
use crate::transport::Transport;

/// Built-in command that rebuilds the access table. It is gated like any other.
pub const RELOAD_COMMAND: &str = "reload";

/// One command line that passed the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub who: String,
    pub context: String,
    /// Normalized command name.
    pub command: String,
    pub args: String,
}

/// Executes commands once they are allowed.
pub trait CommandHandler: Send + Sync {
    fn is_command(&self, name: &str) -> bool;
    fn execute(&self, invocation: &Invocation, transport: &dyn Transport) -> Result<(), WardenError>;
}

/// A fixed set of known commands that acknowledge when run.
#[derive(Debug, Clone, Default)]
pub struct CommandList {
    names: BTreeSet<String>,
}

impl CommandList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names.into_iter().map(|n| normalize(n.as_ref())).collect(),
        }
    }
}

impl CommandHandler for CommandList {
    fn is_command(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    fn execute(&self, invocation: &Invocation, transport: &dyn Transport) -> Result<(), WardenError> {
        info!(
            who = %invocation.who,
            command = %invocation.command,
            args = %invocation.args,
            "Dispatching command"
        );
        transport.send(
            &invocation.context,
            &format!("{}: {} accepted", invocation.who, invocation.command),
        )
    }
}

pub struct Contact {
    gate: Arc<AuthorizationGate>,
    reloader: Arc<ReloadController>,
    transport: Arc<dyn Transport>,
    commands: Arc<dyn CommandHandler>,
}

impl Contact {
    pub fn new(
        gate: Arc<AuthorizationGate>,
        reloader: Arc<ReloadController>,
        transport: Arc<dyn Transport>,
        commands: Arc<dyn CommandHandler>,
    ) -> Self {
        Self {
            gate,
            reloader,
            transport,
            commands,
        }
    }

    pub fn gate(&self) -> &Arc<AuthorizationGate> {
        &self.gate
    }

    /// Handle one line addressed to the bot. Unknown commands are ignored.
    pub async fn handle_message(&self, message: &Incoming) -> Result<(), WardenError> {
        let text = message.text.trim_start();
        let (word, args) = text.split_once(' ').unwrap_or((text, ""));
        let command = normalize(word);

        if command.is_empty() {
            return Ok(());
        }
        if command != RELOAD_COMMAND && !self.commands.is_command(&command) {
            debug!(who = %message.who, %command, "Ignoring unknown command");
            return Ok(());
        }

        let invocation = Invocation {
            who: message.who.clone(),
            context: message.context.clone(),
            command,
            args: args.trim().to_string(),
        };

        match self.gate.check_access(&invocation.who, &invocation.command).await {
            Verdict::Allowed if invocation.command == RELOAD_COMMAND => self.run_reload(&invocation),
            Verdict::Allowed => self.commands.execute(&invocation, self.transport.as_ref()),
            Verdict::Denied => self.reply(
                &invocation,
                &format!(
                    "{}: Sorry, you're not allowed to use the {} command",
                    invocation.who, invocation.command
                ),
            ),
            Verdict::Undetermined(reason) => self.reply(
                &invocation,
                &format!(
                    "{}: Could not verify your identity for {} ({reason}), please try again",
                    invocation.who, invocation.command
                ),
            ),
        }
    }

    fn run_reload(&self, invocation: &Invocation) -> Result<(), WardenError> {
        match self.reloader.reload() {
            Ok(summary) => self.reply(invocation, &format!("Done ({summary})")),
            Err(_) => self.reply(
                invocation,
                "Reload failed, the previous access table is still in use (see logs)",
            ),
        }
    }

    fn reply(&self, invocation: &Invocation, text: &str) -> Result<(), WardenError> {
        self.transport.send(&invocation.context, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_list_normalizes_names() {
        let commands = CommandList::new(["Force", "status"]);
        assert!(commands.is_command("force"));
        assert!(commands.is_command("status"));
        assert!(!commands.is_command("stop"));
    }
}

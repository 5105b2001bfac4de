//! Runs the bot over raw IRC lines on stdin/stdout.
//!
//! Inbound `PRIVMSG` lines become command requests, each handled in its own
//! task so a pending identity check never blocks other users. `NOTICE`
//! lines from the identity service settle pending checks.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::access::loader::AccessSource;
use crate::access::AccessTable;
use crate::authority::Authority;
use crate::contact::{CommandList, Contact};
use crate::errors::WardenError;
use crate::gate::AuthorizationGate;
use crate::irc::{self, route_privmsg};
use crate::oracle::NickServOracle;
use crate::pending::Interruption;
use crate::reload::ReloadController;
use crate::settings::Settings;
use crate::transport::Transport;

/// Writes outbound messages to stdout as `PRIVMSG` lines.
#[derive(Debug, Default)]
pub struct StdioTransport;

impl Transport for StdioTransport {
    fn send(&self, destination: &str, text: &str) -> Result<(), WardenError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", irc::privmsg(destination, text))?;
        out.flush()?;
        Ok(())
    }
}

pub async fn run(settings: Settings, table: AccessTable) -> Result<(), WardenError> {
    let transport: Arc<dyn Transport> = Arc::new(StdioTransport);
    let authority = Arc::new(Authority::new(table));
    let oracle = Arc::new(
        NickServOracle::new(Arc::clone(&transport), settings.oracle.service.clone())
            .with_authenticated_status(settings.oracle.authenticated_status),
    );
    let gate = Arc::new(
        AuthorizationGate::new(Arc::clone(&authority), oracle.clone())
            .with_timeout(settings.verification_timeout()),
    );
    let reloader = Arc::new(ReloadController::new(
        Arc::clone(&authority),
        AccessSource::File(settings.access.file.clone()),
    ));
    let contact = Arc::new(Contact::new(
        Arc::clone(&gate),
        reloader,
        Arc::clone(&transport),
        Arc::new(CommandList::new(&settings.bot.commands)),
    ));

    let nickname = settings.bot.nickname;
    info!(%nickname, service = oracle.service(), "Reading IRC lines from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(raw) = lines.next_line().await? {
        let Some(line) = irc::parse_line(&raw) else {
            continue;
        };
        let (Some(prefix), [target, text]) = (line.prefix, line.params.as_slice()) else {
            continue;
        };

        match line.command {
            "PRIVMSG" => {
                let Some(incoming) = route_privmsg(&nickname, prefix, target, text) else {
                    continue;
                };
                let contact = Arc::clone(&contact);
                tokio::spawn(async move {
                    if let Err(e) = contact.handle_message(&incoming).await {
                        warn!(who = %incoming.who, error = %e, "Failed to handle message");
                    }
                });
            }
            "NOTICE" => {
                if let Some(reply) =
                    oracle.accept_notice(irc::nick_of(prefix), target, &nickname, text)
                {
                    gate.on_status_reply(&reply.user, reply.authenticated);
                }
            }
            _ => {}
        }
    }

    let interrupted = authority.interrupt_all(Interruption::Shutdown);
    info!(interrupted, "Input closed, shutting down");
    Ok(())
}

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::task::JoinHandle;
use warden::access::loader::AccessSource;
use warden::authority::Authority;
use warden::contact::{CommandList, Contact};
use warden::gate::{AuthorizationGate, Verdict};
use warden::irc::Incoming;
use warden::reload::ReloadController;

use super::fakes::{RecordingOracle, RecordingTransport};

pub const CHANNEL: &str = "#builds";

/// Builder for a bot wired to recording fakes and an access file on disk
pub struct BotBuilder {
    access: String,
    commands: Vec<String>,
    timeout: Duration,
}

impl BotBuilder {
    pub fn new(access: &str) -> Self {
        Self {
            access: access.to_string(),
            commands: vec!["status".into(), "force".into(), "stop".into(), "deploy".into()],
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_commands(mut self, commands: &[&str]) -> Self {
        self.commands = commands.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> TestBot {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let access_file = dir.path().join("ircaccess.kdl");
        std::fs::write(&access_file, &self.access).expect("Failed to write access file");

        let source = AccessSource::File(access_file.clone());
        let authority = Arc::new(Authority::new(
            source.load().expect("Failed to load access file"),
        ));
        let transport = Arc::new(RecordingTransport::default());
        let oracle = Arc::new(RecordingOracle::default());
        let gate = Arc::new(
            AuthorizationGate::new(Arc::clone(&authority), oracle.clone())
                .with_timeout(self.timeout),
        );
        let reloader = Arc::new(ReloadController::new(Arc::clone(&authority), source));
        let contact = Arc::new(Contact::new(
            Arc::clone(&gate),
            Arc::clone(&reloader),
            transport.clone(),
            Arc::new(CommandList::new(&self.commands)),
        ));

        TestBot {
            contact,
            gate,
            reloader,
            authority,
            transport,
            oracle,
            access_file,
            _dir: dir,
        }
    }
}

pub struct TestBot {
    pub contact: Arc<Contact>,
    pub gate: Arc<AuthorizationGate>,
    pub reloader: Arc<ReloadController>,
    pub authority: Arc<Authority>,
    pub transport: Arc<RecordingTransport>,
    pub oracle: Arc<RecordingOracle>,
    pub access_file: PathBuf,
    _dir: TempDir,
}

impl TestBot {
    pub fn write_access(&self, access: &str) {
        std::fs::write(&self.access_file, access).expect("Failed to rewrite access file");
    }

    /// Handle a channel message from `who` in a background task.
    pub fn say(&self, who: &str, text: &str) -> JoinHandle<()> {
        let contact = Arc::clone(&self.contact);
        let incoming = Incoming {
            who: who.to_string(),
            context: CHANNEL.to_string(),
            text: text.to_string(),
        };
        tokio::spawn(async move {
            contact
                .handle_message(&incoming)
                .await
                .expect("Failed to handle message");
        })
    }

    pub fn check(&self, who: &str, command: &str) -> JoinHandle<Verdict> {
        let gate = Arc::clone(&self.gate);
        let who = who.to_string();
        let command = command.to_string();
        tokio::spawn(async move { gate.check_access(&who, &command).await })
    }

    /// Yield until `user` has `count` waiters on its ticket.
    pub async fn wait_for_waiters(&self, user: &str, count: usize) {
        while self.authority.waiter_count(user) < count {
            tokio::task::yield_now().await;
        }
    }

    pub fn channel_texts(&self) -> Vec<String> {
        self.transport.texts_to(CHANNEL)
    }
}

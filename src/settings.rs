use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    pub bot: Bot,
    pub access: Access,
    pub oracle: OracleSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bot {
    pub nickname: String,
    /// Commands the bot knows besides the built-in `reload`.
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Access {
    /// KDL access file. Default: ircaccess.kdl
    pub file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleSettings {
    /// Nickname of the identity service
    pub service: String,
    /// STATUS code meaning "registered and identified"
    pub authenticated_status: u32,
    /// Seconds to wait for a STATUS reply before giving up
    pub timeout_secs: u64,
}

impl Default for Bot {
    fn default() -> Self {
        Self {
            nickname: "warden".to_string(),
            commands: ["help", "list", "status", "last", "watch", "force", "stop", "version"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Default for Access {
    fn default() -> Self {
        Self {
            file: PathBuf::from("ircaccess.kdl"),
        }
    }
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            service: crate::oracle::DEFAULT_SERVICE.to_string(),
            authenticated_status: crate::oracle::DEFAULT_AUTHENTICATED_STATUS,
            timeout_secs: crate::gate::DEFAULT_VERIFICATION_TIMEOUT.as_secs(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("bot.nickname", Bot::default().nickname)
            .into_diagnostic()?
            .set_default("bot.commands", Bot::default().commands)
            .into_diagnostic()?
            .set_default(
                "access.file",
                Access::default().file.to_string_lossy().to_string(),
            )
            .into_diagnostic()?
            .set_default("oracle.service", OracleSettings::default().service)
            .into_diagnostic()?
            .set_default(
                "oracle.authenticated_status",
                OracleSettings::default().authenticated_status,
            )
            .into_diagnostic()?
            .set_default("oracle.timeout_secs", OracleSettings::default().timeout_secs)
            .into_diagnostic()?;

        // Optional file
        if Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment overrides: WARDEN__ORACLE__TIMEOUT_SECS=10, etc.
        builder = builder.add_source(config::Environment::with_prefix("WARDEN").separator("__"));

        let cfg = builder.build().into_diagnostic()?;
        let mut s: Settings = cfg.try_deserialize().into_diagnostic()?;

        if s.access.file.is_relative() {
            s.access.file = std::env::current_dir()
                .into_diagnostic()?
                .join(&s.access.file);
        }

        Ok(s)
    }

    pub fn verification_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.oracle.timeout_secs)
    }
}

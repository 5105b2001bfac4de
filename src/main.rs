use clap::Parser;
use miette::Result;
use tracing_subscriber::{fmt, EnvFilter};

use warden::access::loader::AccessSource;
use warden::access::resolver::resolve;
use warden::settings::Settings;

#[derive(Parser, Debug)]
#[command(
    name = "warden",
    version,
    about = "Command authorization gate for chat bots"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Print the static decision for USER running COMMAND and exit
    #[arg(long, num_args = 2, value_names = ["USER", "COMMAND"])]
    check: Option<Vec<String>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging goes to stderr; stdout carries protocol lines
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = Settings::load(&cli.config)?;
    tracing::info!(?settings, "Loaded configuration");

    let table = AccessSource::File(settings.access.file.clone()).load()?;

    if let Some([user, command]) = cli.check.as_deref() {
        let rule = table.lookup_rule(user, command);
        println!("{}", resolve(&table, user, command));
        tracing::info!(?rule, "First matching rule");
        return Ok(());
    }

    warden::stdio::run(settings, table).await?;
    Ok(())
}

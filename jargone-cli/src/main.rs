use clap::Parser;
use jargone_cli::Cli;
use jargone_telemetry::LogFormat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before parsing so clap sees its variables.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let format: LogFormat = cli.settings.log_format.parse()?;
    jargone_telemetry::init("jargone", format)?;

    jargone_cli::run(cli).await
}

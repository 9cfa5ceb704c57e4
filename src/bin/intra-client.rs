use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use intra_client::config::loader::{file_to_config, validate};
use intra_client::config::settings::ClientConfig;
use intra_client::scheduler::SchedulerState;
use intra_client::utils::logging::{self, LogLevel};
use intra_client::{IntraClient, Variables};
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML config file; when absent the environment is used
    #[arg(short, long, env = "CONFIG")]
    config: Option<PathBuf>,
    /// Overrides the configured campus endpoint
    #[arg(long, env = "CAMPUS_ENDPOINT")]
    endpoint: Option<String>,
    /// Overrides the configured credential
    #[arg(long, env = "API01_GITEA_TOKEN", hide_env_values = true)]
    credential: Option<String>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// GraphQL query to run once the session is established
    #[arg(short, long)]
    query: Option<String>,
    /// Query variables as a JSON object
    #[arg(long, default_value = "{}")]
    variables: String,
    /// Keep renewing the token until Ctrl-C
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load config
    // -------------------------------

    let args = Args::parse();
    let config = load_config(&args)?;
    logging::run(&config, args.log_level);

    let variables: Variables =
        serde_json::from_str(&args.variables).context("--variables must be a JSON object")?;

    // -------------------------------
    // 2. Acquire the first token
    // -------------------------------

    let client = IntraClient::connect(&config).await?;

    // -------------------------------
    // 3. Run the query, if any
    // -------------------------------

    if let Some(query) = &args.query {
        let result = client.query(query, variables).await;
        match result.into_result() {
            Ok(data) => println!("{}", serde_json::to_string_pretty(&data)?),
            Err(errors) => {
                for e in &errors {
                    error!(message = %e, "query error");
                }
                bail!("query returned {} error(s)", errors.len());
            }
        }
    }

    // -------------------------------
    // 4. Keep the token fresh
    // -------------------------------

    if args.watch {
        let scheduler = client.spawn_renewal();
        let mut state = scheduler.subscribe();
        info!("renewal scheduler running, press Ctrl-C to stop");
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res?;
                info!("shutting down gracefully");
            }
            _ = state.wait_for(|s| *s == SchedulerState::Terminated) => {}
        }
        scheduler.stop().await?;
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => file_to_config(path)?,
        None => ClientConfig::new(
            args.endpoint.clone().unwrap_or_default(),
            args.credential.clone().unwrap_or_default(),
        ),
    };
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.to_owned();
    }
    if let Some(credential) = &args.credential {
        config.credential = credential.to_owned();
    }
    validate(&config)?;
    Ok(config)
}

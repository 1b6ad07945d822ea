use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use webquest::{Agent, Brain, ChromeSession, Outcome, RunConfig, Task};

/// Drive a web page toward answering a prompt with a vision model.
#[derive(Parser)]
#[command(name = "webquest", version)]
#[command(after_help = "Example: webquest https://www.google.com \"Search for cats\"")]
struct Cli {
    /// Address to open
    address: String,
    /// What to find out
    prompt: String,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Missing arguments print usage and exit non-zero here, before any
    // session exists.
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(Outcome::Solved { answer, source }) => {
            println!("{answer}");
            info!(%source, "solved");
            0
        }
        Ok(Outcome::Exhausted { attempts_used }) => {
            warn!(attempts_used, "no solution within the attempt budget");
            0
        }
        Err(e) => {
            error!("run failed: {e:#}");
            1
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<Outcome> {
    let config = RunConfig::from_env()?;
    let task = Task {
        address: cli.address,
        prompt: cli.prompt,
    };

    let brain = Brain::new()?;

    info!(headless = config.headless, "launching chrome");
    let headless = config.headless;
    let session = tokio::task::spawn_blocking(move || ChromeSession::launch(headless))
        .await
        .map_err(|e| anyhow::anyhow!("browser launch panicked: {e}"))??;

    // The agent owns the session; teardown runs when it goes out of scope,
    // on the error path included.
    let mut agent = Agent::new(brain, session, config);
    Ok(agent.run(&task).await?)
}

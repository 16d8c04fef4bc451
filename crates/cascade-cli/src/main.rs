mod cli;
mod demo;
mod logging;

use anyhow::Result;
use cascade_core::{EngineConfig, JobKind};

use crate::cli::Command;

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("cascade error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;

    match args.command {
        Command::Demo { fail, live } => {
            let config = EngineConfig::load(&args.config)?;
            demo::run(config, fail, live).await
        }
        Command::Kinds => {
            for kind in JobKind::ALL {
                println!("{kind}");
            }
            Ok(())
        }
    }
}

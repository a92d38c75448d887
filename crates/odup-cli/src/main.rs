use clap::Parser;
use odup_core::compose::DockerCompose;
use odup_core::invocation::{Invocation, DEFAULT_SERVICE};
use odup_core::sequencer::Sequencer;
use odup_core::SequenceError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "odup",
    about = "Install or update Odoo modules through docker compose, then restart the service",
    version
)]
struct Cli {
    /// Comma-separated modules to install (mutually exclusive with --update)
    #[arg(long, short = 'i', value_name = "MODULES")]
    install: Option<String>,

    /// Comma-separated modules to update (mutually exclusive with --install)
    #[arg(long, short = 'u', value_name = "MODULES")]
    update: Option<String>,

    /// Database to apply the modules to
    #[arg(long, short = 'd', value_name = "NAME")]
    database: Option<String>,

    /// Directory holding the compose file (default: current directory)
    #[arg(long, visible_alias = "dcp", value_name = "PATH")]
    compose_path: Option<PathBuf>,

    /// Compose service running Odoo
    #[arg(long, env = "ODUP_SERVICE", default_value = DEFAULT_SERVICE, value_name = "NAME")]
    service: String,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(exit_code(&e));
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // All validation happens here; nothing external runs on a refusal.
    let invocation = Invocation::new(
        cli.install.as_deref(),
        cli.update.as_deref(),
        cli.database.as_deref(),
        cli.compose_path.as_deref(),
        &cli.service,
    )?;

    let runner = DockerCompose::detect()?;
    Sequencer::new(runner).run(&invocation)?;
    Ok(())
}

/// Distinct exit codes per failure class: 2 pre-flight, 3/4/5 per step.
fn exit_code(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<SequenceError>() {
        Some(err) => err.exit_code(),
        None => 1,
    }
}

//! questgraph CLI Application

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

use questgraph::cli::{self, Cli, CliError, OkEnvelope, OutputFormat, exit_code_for};
use questgraph::commands::{self, Outcome};
use questgraph::tracing::init_tracing;
use questgraph_chains::ResolverConfig;

fn main() {
    // NOTE: Using eprintln! in panic hook is intentional - tracing infrastructure
    // may be corrupted during a panic, so we use the most reliable output method.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with --level debug for more information.");
    }));

    let cli = cli::parse();

    if let Err(e) = init_tracing(cli.tracing_config()) {
        eprintln!("{e:?}");
    }

    let output = cli.output;
    let exit_code = match run(cli).and_then(|outcome| render_outcome(&outcome, output)) {
        Ok(code) => code,
        Err(err) => {
            let code = exit_code_for(&err);
            cli::render_error(err, output);
            code
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<Outcome, CliError> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::other(format!("Failed to create tokio runtime: {e}")))?;

    rt.block_on(async {
        let config = load_config(cli.config.as_deref())?;
        commands::execute(cli.command.into_command(), config).await
    })
}

fn load_config(path: Option<&std::path::Path>) -> Result<ResolverConfig, CliError> {
    let config = match path {
        Some(path) => ResolverConfig::from_path(path)?,
        None => ResolverConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}

fn render_outcome(outcome: &Outcome, format: OutputFormat) -> Result<i32, CliError> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string(&OkEnvelope::new(outcome))
                .map_err(|e| CliError::other(format!("Failed to serialize response: {e}")))?;
            println!("{json}");
        }
        OutputFormat::Text => {
            let text = outcome.to_string();
            println!("{}", text.trim_end());
        }
    }
    Ok(outcome.exit_code())
}

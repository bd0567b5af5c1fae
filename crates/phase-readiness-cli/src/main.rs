// crates/phase-readiness-cli/src/main.rs
// ============================================================================
// Module: Phase Readiness CLI Entry Point
// Description: Command dispatcher for serving, replaying, and probing.
// Purpose: Run the producer and dispatcher, or evaluate samples offline.
// Dependencies: clap, phase-readiness-core, phase-readiness-api, reqwest, thiserror.
// ============================================================================

//! ## Overview
//! The `phase-readiness` binary wires the decision engine, snapshot store, and
//! observability dispatcher together. `serve` feeds JSON-lines samples through
//! the engine while the dispatcher answers read-only queries; `replay`
//! evaluates a recording offline; `probe` queries a running dispatcher. All
//! user-facing strings are routed through the message catalog.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use phase_readiness_api::ApiRoute;
use phase_readiness_api::ApiServer;
use phase_readiness_api::audit_sink_from_config;
use phase_readiness_cli::feed::FeedLine;
use phase_readiness_cli::feed::SampleFeed;
use phase_readiness_cli::producer::Producer;
use phase_readiness_cli::producer::ReplayRecord;
use phase_readiness_cli::t;
use phase_readiness_config::CONFIG_ENV_VAR;
use phase_readiness_config::DEFAULT_CONFIG_NAME;
use phase_readiness_config::PhaseReadinessConfig;
use phase_readiness_config::config_toml_example;
use phase_readiness_core::ReadinessEngine;
use phase_readiness_core::Sample;
use phase_readiness_core::SnapshotStore;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Timeout applied to each probe request.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Interval between liveness checks once `serve` input is exhausted.
const IDLE_CHECK_INTERVAL: Duration = Duration::from_millis(500);

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "phase-readiness", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate live samples and serve readiness over HTTP.
    Serve(ServeCommand),
    /// Evaluate recorded samples offline, one verdict per line.
    Replay(ReplayCommand),
    /// Query a running dispatcher.
    Probe(ProbeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to phase-readiness.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// JSON-lines sample file (defaults to stdin).
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,
    /// Stop serving once the input is exhausted.
    #[arg(long, action = ArgAction::SetTrue)]
    exit_on_eof: bool,
}

/// Arguments for the `replay` command.
#[derive(Args, Debug)]
struct ReplayCommand {
    /// Optional config file path (defaults to phase-readiness.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// JSON-lines sample file (defaults to stdin).
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,
}

/// Arguments for the `probe` command.
#[derive(Args, Debug)]
struct ProbeCommand {
    /// Dispatcher address as `host:port`.
    #[arg(long, value_name = "HOST:PORT", default_value = "127.0.0.1:8080")]
    addr: String,
    /// Single path to query (defaults to every endpoint).
    #[arg(long, value_name = "PATH")]
    path: Option<String>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate a configuration file.
    Check(ConfigCheckCommand),
    /// Print a canonical example configuration.
    Example,
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigCheckCommand {
    /// Optional config file path (defaults to phase-readiness.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a rendered message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Serve(command) => command_serve(&command),
        Commands::Replay(command) => command_replay(&command),
        Commands::Probe(command) => command_probe(&command),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let help = Cli::command().render_help().to_string();
    write_stdout_line(help.trim_end()).map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
fn command_serve(command: &ServeCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let audit = audit_sink_from_config(&config.audit)
        .map_err(|err| CliError::new(t!("audit.open_failed", error = err)))?;
    let store = Arc::new(SnapshotStore::new(config.history.max_entries));

    let mut server = ApiServer::new(Arc::clone(&store), config.server.clone())
        .with_audit(Arc::clone(&audit));
    let addr =
        server.start().map_err(|err| CliError::new(t!("serve.start_failed", error = err)))?;
    write_stderr_line(&t!("serve.listening", addr = addr))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;

    let mut producer = Producer::new(ReadinessEngine::new(config.engine), store, audit);
    let mut count = 0_usize;
    for item in SampleFeed::new(open_input(command.input.as_deref())?) {
        let FeedLine {
            line,
            sample,
        } = item.map_err(|err| CliError::new(t!("input.read_failed", error = err)))?;
        let published = match sample {
            Ok(sample) => producer.step(&sample),
            Err(err) => {
                write_stderr_line(&t!("input.line_rejected", line = line, error = err))
                    .map_err(|err| CliError::new(output_error("stderr", &err)))?;
                producer.step_rejected()
            }
        };
        published.map_err(|err| CliError::new(t!("serve.store_failed", error = err)))?;
        count += 1;
    }

    if command.exit_on_eof {
        write_stderr_line(&t!("serve.eof_exit", count = count))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        server.stop();
        return Ok(ExitCode::SUCCESS);
    }
    write_stderr_line(&t!("serve.eof", count = count))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    while server.is_running() {
        thread::sleep(IDLE_CHECK_INTERVAL);
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Replay Command
// ============================================================================

/// Executes the `replay` command.
fn command_replay(command: &ReplayCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let mut engine = ReadinessEngine::new(config.engine);
    let mut stdout = std::io::stdout().lock();
    for item in SampleFeed::new(open_input(command.input.as_deref())?) {
        let FeedLine {
            line,
            sample,
        } = item.map_err(|err| CliError::new(t!("input.read_failed", error = err)))?;
        let record = match sample {
            Ok(sample) => ReplayRecord::new(line, Some(sample.t_s), &engine.evaluate(&sample)),
            Err(err) => {
                write_stderr_line(&t!("input.line_rejected", line = line, error = err))
                    .map_err(|err| CliError::new(output_error("stderr", &err)))?;
                let verdict = engine.evaluate(&Sample::invalid(f64::NAN, f64::NAN));
                ReplayRecord::new(line, None, &verdict)
            }
        };
        let encoded = serde_json::to_string(&record)
            .map_err(|err| CliError::new(t!("replay.encode_failed", error = err)))?;
        writeln!(stdout, "{encoded}").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    stdout.flush().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Probe Command
// ============================================================================

/// Executes the `probe` command.
fn command_probe(command: &ProbeCommand) -> CliResult<ExitCode> {
    let client = reqwest::blocking::Client::builder()
        .timeout(PROBE_TIMEOUT)
        .build()
        .map_err(|err| CliError::new(t!("probe.client_failed", error = err)))?;
    let paths: Vec<String> = match &command.path {
        Some(path) => vec![path.clone()],
        None => ApiRoute::ALL.iter().map(|route| route.path().to_string()).collect(),
    };

    let mut all_ok = true;
    for path in paths {
        let url = format!("http://{}{path}", command.addr);
        let response = client
            .get(&url)
            .send()
            .map_err(|err| CliError::new(t!("probe.request_failed", url = url, error = err)))?;
        let status = response.status();
        all_ok &= status.is_success();
        let body = response
            .text()
            .map_err(|err| CliError::new(t!("probe.request_failed", url = url, error = err)))?;
        write_stdout_line(&t!("probe.status", path = path, status = status))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        write_stdout_line(body.trim_end())
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(if all_ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Check(command) => command_config_check(&command),
        ConfigCommand::Example => {
            write_stdout_line(config_toml_example().trim_end())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Executes the config validation command.
fn command_config_check(command: &ConfigCheckCommand) -> CliResult<ExitCode> {
    let _config = load_config(command.config.as_deref())?;
    let message = match explicit_config_path(command.config.as_deref()) {
        Some(path) => t!("config.check.ok", path = path.display()),
        None => t!("config.check.ok_default"),
    };
    write_stdout_line(&message).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the config path that will be read, if any.
///
/// With no flag, no env override, and no default file, built-in defaults apply.
fn explicit_config_path(path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = path {
        return Some(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(env_path));
    }
    let default_path = PathBuf::from(DEFAULT_CONFIG_NAME);
    default_path.exists().then_some(default_path)
}

/// Loads configuration, falling back to defaults when no file is configured.
fn load_config(path: Option<&Path>) -> CliResult<PhaseReadinessConfig> {
    let loaded = match explicit_config_path(path) {
        Some(path) => PhaseReadinessConfig::load(Some(path.as_path())),
        None => {
            let config = PhaseReadinessConfig::default();
            config.validate().map(|()| config)
        }
    };
    loaded.map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Opens the sample input, defaulting to stdin.
fn open_input(path: Option<&Path>) -> CliResult<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file = File::open(path).map_err(|err| {
                CliError::new(t!("input.open_failed", path = path.display(), error = err))
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(std::io::stdin().lock())),
    }
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

//! Personal Data Core - redacting logger and credential tool
//!
//! The main entry point for pd-core, handling:
//! - Logging data rows with personal data fields redacted
//! - Ad-hoc redaction of `field=value;` lines
//! - Hashing and verifying credentials

use clap::{Args, Parser, Subcommand};
use pd_core::config::{Config, ConfigError};
use pd_core::exit_codes::ExitCode;
use pd_core::logging::{
    build_user_logger, generate_run_id, init_logging, LogConfig, LogFormat, LogLevel, Logger,
    LoggerRegistry, Stdout,
};
use pd_core::pipeline::{log_rows, PipelineError};
use pd_core::source::JsonLinesSource;
use pd_redact::{filter_datum, CredentialHasher, RedactionEngine, RedactionPolicy};
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Personal Data Core - redact personal data in logs, hash credentials
#[derive(Parser)]
#[command(name = "pd-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to a JSON config file
    #[arg(long, global = true, env = "PD_CONFIG")]
    config: Option<PathBuf>,

    /// Diagnostics level on stderr
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Diagnostics format on stderr
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log JSONL rows through the redacting user_data logger
    Filter(FilterArgs),

    /// Redact fields in each line read from stdin
    Redact(RedactArgs),

    /// Hash a password read from stdin
    HashPassword,

    /// Check a password read from stdin against a stored hash
    VerifyPassword(VerifyArgs),
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// JSONL input file (default: stdin)
    #[arg(long, short = 'i')]
    input: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RedactArgs {
    /// Comma-separated field names (default: from config)
    #[arg(long, value_delimiter = ',')]
    fields: Option<Vec<String>>,

    /// Replacement token (default: from config)
    #[arg(long)]
    token: Option<String>,

    /// Segment separator (default: from config)
    #[arg(long)]
    separator: Option<char>,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// Stored hash to verify against
    #[arg(long)]
    hash: String,
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = Cli::parse();
    let code = run(cli);
    if code.is_error() {
        tracing::debug!(code = code.as_i32(), "exiting with error");
    }
    std::process::exit(code.as_i32());
}

fn run(cli: Cli) -> ExitCode {
    let log_config = LogConfig::from_env(cli.global.log_level, cli.global.log_format);

    let config = match Config::resolve(cli.global.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("pd-core: {err}");
            return config_exit_code(&err);
        }
    };

    // User loggers must exist before the subscriber so their events stay off stderr.
    let registry = Arc::new(LoggerRegistry::new());
    let engine = match RedactionEngine::new(config.redaction.clone()) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("pd-core: {err}");
            return ExitCode::ConfigError;
        }
    };
    let user_logger = match build_user_logger(
        &registry,
        &config.logger.name,
        config.logger.level.into(),
        engine,
        io::stdout as Stdout,
    ) {
        Ok(logger) => logger,
        Err(err) => {
            eprintln!("pd-core: {err}");
            return ExitCode::ConfigError;
        }
    };

    if let Err(err) = init_logging(&log_config, Arc::clone(&registry)) {
        eprintln!("pd-core: {err}");
        return ExitCode::InternalError;
    }

    match cli.command {
        Commands::Filter(args) => run_filter(&config, &user_logger, &args),
        Commands::Redact(args) => run_redact(&config, &args),
        Commands::HashPassword => run_hash_password(&config),
        Commands::VerifyPassword(args) => run_verify_password(&config, &args),
    }
}

fn config_exit_code(err: &ConfigError) -> ExitCode {
    match err {
        ConfigError::IoError { .. } => ExitCode::IoError,
        _ => ExitCode::ConfigError,
    }
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_filter(config: &Config, logger: &Logger, args: &FilterArgs) -> ExitCode {
    let run_id = generate_run_id();
    let span = tracing::info_span!("filter", run_id = %run_id);
    let _guard = span.enter();

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => match std::fs::File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(err) => {
                eprintln!("pd-core: cannot open {}: {err}", path.display());
                return ExitCode::IoError;
            }
        },
        None => Box::new(io::stdin().lock()),
    };

    let mut source = JsonLinesSource::new(reader);
    match log_rows(&mut source, logger, config.redaction.separator) {
        Ok(_) => ExitCode::Clean,
        Err(PipelineError::Source(pd_core::source::SourceError::Io(err)))
        | Err(PipelineError::Log(pd_core::logging::LogError::Io(err))) => {
            eprintln!("pd-core: {err}");
            ExitCode::IoError
        }
        Err(err @ PipelineError::Source(_)) => {
            eprintln!("pd-core: {err}");
            ExitCode::DataError
        }
        Err(err) => {
            eprintln!("pd-core: {err}");
            ExitCode::InternalError
        }
    }
}

fn run_redact(config: &Config, args: &RedactArgs) -> ExitCode {
    let defaults = &config.redaction;
    let policy = RedactionPolicy {
        fields: args.fields.clone().unwrap_or_else(|| defaults.fields.clone()),
        redaction: args.token.clone().unwrap_or_else(|| defaults.redaction.clone()),
        separator: args.separator.unwrap_or(defaults.separator),
        ..defaults.clone()
    };
    if let Err(err) = policy.validate() {
        eprintln!("pd-core: {err}");
        return ExitCode::ArgsError;
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                eprintln!("pd-core: {err}");
                return ExitCode::IoError;
            }
        };
        let redacted = filter_datum(&policy.fields, &policy.redaction, &line, policy.separator);
        if let Err(err) = writeln!(out, "{redacted}") {
            eprintln!("pd-core: {err}");
            return ExitCode::IoError;
        }
    }
    ExitCode::Clean
}

fn run_hash_password(config: &Config) -> ExitCode {
    let hasher = match CredentialHasher::new(config.credentials) {
        Ok(hasher) => hasher,
        Err(err) => {
            eprintln!("pd-core: {err}");
            return ExitCode::ConfigError;
        }
    };
    let password = match read_password() {
        Ok(password) => password,
        Err(err) => {
            eprintln!("pd-core: {err}");
            return ExitCode::IoError;
        }
    };

    match hasher.hash(&password) {
        Ok(hash) => {
            println!("{hash}");
            ExitCode::Clean
        }
        Err(err) => {
            eprintln!("pd-core: {err}");
            ExitCode::InternalError
        }
    }
}

fn run_verify_password(config: &Config, args: &VerifyArgs) -> ExitCode {
    let hasher = match CredentialHasher::new(config.credentials) {
        Ok(hasher) => hasher,
        Err(err) => {
            eprintln!("pd-core: {err}");
            return ExitCode::ConfigError;
        }
    };
    let password = match read_password() {
        Ok(password) => password,
        Err(err) => {
            eprintln!("pd-core: {err}");
            return ExitCode::IoError;
        }
    };

    let digest = args.hash.trim().as_bytes();
    if !hasher.verify(digest, &password) {
        return ExitCode::Mismatch;
    }
    if hasher.needs_rehash(digest) {
        tracing::warn!("hash was produced with outdated parameters; rehash on next login");
    }
    ExitCode::Clean
}

/// One line from stdin without its line terminator.
fn read_password() -> io::Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let trimmed = line.strip_suffix('\n').unwrap_or(&line);
    let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
    Ok(trimmed.to_string())
}

//! hooksync CLI - webhook receiver for repository pushes

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hooksync_core::{HooksyncConfig, LogSync, Registry};
use hooksync_verify::{sign, SignatureAlgorithm};

#[derive(Parser)]
#[command(name = "hooksync")]
#[command(author, version, about = "hooksync - verified repository push webhooks")]
struct Cli {
    /// JSON configuration file; flags and environment override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run the webhook receiver
    Serve(ServeArgs),
    /// Load and validate the record directory
    Check {
        /// Directory of YAML repository records
        #[arg(long, env = "REPO_SOURCE_PATH")]
        repo_source: Option<PathBuf>,
    },
    /// Compute a signature header for a request body
    Sign {
        /// Body file, or `-` for stdin
        body: PathBuf,

        /// Webhook secret
        #[arg(short, long, env = "HOOKSYNC_SECRET", hide_env_values = true)]
        secret: String,

        /// sha1 or sha256
        #[arg(short, long, default_value = "sha256")]
        algorithm: SignatureAlgorithm,
    },
}

#[derive(clap::Args, Default)]
struct ServeArgs {
    /// TCP port to listen on
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Path the webhook endpoint is mounted at
    #[arg(long, env = "ENDPOINT_PATH")]
    endpoint_path: Option<String>,

    /// Root directory repositories are synced into
    #[arg(long, env = "REPO_ROOT_PATH")]
    repo_root: Option<PathBuf>,

    /// Directory of YAML repository records
    #[arg(long, env = "REPO_SOURCE_PATH")]
    repo_source: Option<PathBuf>,

    /// Largest accepted request body in bytes
    #[arg(long, env = "MAX_BODY_BYTES")]
    max_body_bytes: Option<usize>,
}

impl ServeArgs {
    /// Overlays the flags that were given onto `config`.
    fn apply(self, mut config: HooksyncConfig) -> HooksyncConfig {
        if let Some(port) = self.port {
            config.listen_port = port;
        }
        if let Some(path) = self.endpoint_path {
            config.endpoint_path = path;
        }
        if let Some(root) = self.repo_root {
            config.repo_root = root;
        }
        if let Some(source) = self.repo_source {
            config.repo_source = source;
        }
        if let Some(limit) = self.max_body_bytes {
            config.max_body_bytes = limit;
        }
        config
    }
}

fn init_tracing(verbose: bool, log_json: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(log_json.then(|| fmt::layer().json()))
        .with((!log_json).then(fmt::layer))
        .with(filter)
        .init();
}

fn base_config(path: Option<&Path>) -> Result<HooksyncConfig> {
    match path {
        Some(path) => HooksyncConfig::from_file(path).context("reading configuration"),
        None => Ok(HooksyncConfig::default()),
    }
}

/// Loads the record directory and renders one line per record.
fn check(source: &Path) -> Result<String> {
    let registry = Registry::load(source)
        .with_context(|| format!("loading records from {}", source.display()))?;

    let mut report = format!("{} repositories in {}\n", registry.len(), source.display());
    for record in registry.candidates() {
        let branch = if record.branch().is_empty() {
            "(default)"
        } else {
            record.branch()
        };
        let secrets = if record.secret_required() {
            format!("{} secret(s)", record.secrets().len())
        } else {
            "UNSIGNED".to_string()
        };
        report.push_str(&format!(
            "  {:<24} {:<6} {:<12} {}\n",
            record.name(),
            record.protocol(),
            branch,
            secrets
        ));
    }
    Ok(report)
}

fn read_body(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut body = Vec::new();
        std::io::stdin()
            .read_to_end(&mut body)
            .context("reading body from stdin")?;
        Ok(body)
    } else {
        std::fs::read(path).with_context(|| format!("reading body from {}", path.display()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let config = base_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve(args) => {
            let config = args.apply(config);
            info!("hooksync v{} starting", env!("CARGO_PKG_VERSION"));
            hooksync_server::run(config, Arc::new(LogSync)).await?;
        }
        Commands::Check { repo_source } => {
            let source = repo_source.unwrap_or(config.repo_source);
            print!("{}", check(&source)?);
        }
        Commands::Sign {
            body,
            secret,
            algorithm,
        } => {
            let body = read_body(&body)?;
            println!("{}", sign(algorithm, secret.as_bytes(), &body)?);
        }
    }

    Ok(())
}

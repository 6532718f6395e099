//! httpcompat CLI - check HTTP servers against expectations and against each other

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use httpcompat_core::{Config, Corpus, TargetLabel, VerdictStatus};
use httpcompat_runner::{
    DumpOptions, HttpTransport, RunMode, Suite, SuiteOptions, Target, render_terminal,
};

#[derive(Parser)]
#[command(name = "httpcompat")]
#[command(about = "Check HTTP servers against case expectations and against each other")]
#[command(version)]
struct Cli {
    /// Case corpus (.json, .yaml or .toml; default: cases.json)
    #[arg(long)]
    cases: Option<PathBuf>,

    /// Reference server base URL, e.g. http://127.0.0.1:3000
    #[arg(long)]
    node: Option<String>,

    /// Server under test base URL, e.g. http://127.0.0.1:8080
    #[arg(long)]
    snode: Option<String>,

    /// Only validate expectations; skip the node/snode comparison
    #[arg(long)]
    expect_only: bool,

    /// Re-request failing cases and print their responses
    #[arg(long)]
    dump_on_fail: bool,

    /// Run a single case by id
    #[arg(long, value_name = "ID")]
    only: Option<String>,

    /// Config file (default: .httpcompat.toml or .httpcompat.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "terminal")]
    output: OutputFormat,

    /// Print the JSON Schema of the corpus format and exit
    #[arg(long)]
    schema: bool,

    /// Write an example .httpcompat.toml and exit
    #[arg(long)]
    init: bool,

    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<u8> {
    if cli.schema {
        println!("{}", httpcompat_core::schema::generate_schema());
        return Ok(0);
    }
    if cli.init {
        return init_config();
    }

    let cfg = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    let cases_path = cli.cases.clone().unwrap_or_else(|| cfg.cases.clone());
    let corpus = load_corpus(&cases_path, cli.only.as_deref())?;

    let node = cli.node.as_deref().or(cfg.node.as_deref());
    let snode = cli.snode.as_deref().or(cfg.snode.as_deref());
    let mode = if cli.expect_only {
        RunMode::ExpectOnly
    } else {
        RunMode::Compare
    };

    let options = SuiteOptions::new(mode)
        .with_node(node.map(|b| Target::parse(TargetLabel::Node, b)).transpose()?)
        .with_snode(snode.map(|b| Target::parse(TargetLabel::Snode, b)).transpose()?)
        .with_critical_headers(cfg.critical_headers.clone());

    let transport = HttpTransport::new(Duration::from_secs(cfg.timeout_secs))?;
    let suite = Suite::new(transport, options)?;

    tracing::info!(
        mode = mode.as_str(),
        cases = corpus.len(),
        path = %cases_path.display(),
        "starting run"
    );
    let report = suite.run(&corpus);
    let verdict = report.verdict();

    match cli.output {
        OutputFormat::Terminal => {
            let dump = cli.dump_on_fail.then(|| DumpOptions {
                headers: cfg.dump_headers.clone(),
            });
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            render_terminal(&suite, &report, &corpus, dump.as_ref(), &mut out)?;
            out.flush()?;
        }
        OutputFormat::Json => {
            if cli.dump_on_fail {
                tracing::warn!("--dump-on-fail is ignored with --output json");
            }
            let doc = serde_json::json!({
                "mode": mode.as_str(),
                "cases": corpus.len(),
                "verdict": verdict,
                "results": report.results,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Silent => {}
    }

    if verdict.status == VerdictStatus::Fail {
        tracing::debug!(failures = report.failure_count(), "run failed");
    }
    Ok(u8::try_from(verdict.exit_code).unwrap_or(1))
}

fn load_corpus(path: &Path, only: Option<&str>) -> Result<Corpus> {
    let corpus = Corpus::load(path)?;
    match only {
        Some(id) => Ok(corpus.only(id)?),
        None => Ok(corpus),
    }
}

fn init_config() -> Result<u8> {
    let config_path = Path::new(".httpcompat.toml");
    if config_path.exists() {
        eprintln!("{} already exists", config_path.display());
        return Ok(2);
    }

    std::fs::write(config_path, Config::example())
        .with_context(|| format!("Cannot write {}", config_path.display()))?;
    println!("Created {}", config_path.display());
    println!("\nEdit the file to configure:");
    println!("  - cases: path to the case corpus");
    println!("  - node / snode: servers to check");
    Ok(0)
}

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use optstack_core::OptionRegistry;
use optstack_loader::{DefinitionsFile, Resolution, Resolver};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Output format for resolved options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "optstack")]
#[command(version)]
#[command(about = "Resolve options from defaults, JSON config files, environment and argv")]
struct Cli {
    /// Log resolution steps to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve a token list against an option definitions file.
    Resolve(ResolveArgs),
    /// Validate an option definitions file and summarize it.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct ResolveArgs {
    /// YAML or JSON file declaring the options.
    #[arg(long)]
    definitions: PathBuf,
    /// JSON config file; repeat to layer several, later files win.
    #[arg(long = "config", value_name = "FILE")]
    configs: Vec<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Start from an empty environment instead of the process environment.
    #[arg(long)]
    clear_env: bool,
    /// Set an environment variable for resolution (KEY=VALUE).
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    env: Vec<(String, String)>,
    /// Tokens to parse, given after `--`.
    #[arg(last = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// YAML or JSON file declaring the options.
    #[arg(long)]
    definitions: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Resolve(args) => run_resolve(args),
        Command::Check(args) => run_check(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

fn load_definitions(path: &Path) -> Result<DefinitionsFile, String> {
    DefinitionsFile::load(path)
        .map_err(|err| format!("failed to load definitions '{}': {err}", path.display()))
}

fn run_resolve(args: ResolveArgs) -> Result<(), String> {
    let file = load_definitions(&args.definitions)?;
    tracing::debug!(
        definitions = %args.definitions.display(),
        configs = args.configs.len(),
        tokens = args.tokens.len(),
        "resolving"
    );

    let mut env: HashMap<String, String> = if args.clear_env {
        HashMap::new()
    } else {
        std::env::vars().collect()
    };
    env.extend(args.env);

    let mut resolver = Resolver::new(file.definitions())
        .env(env)
        .args(args.tokens);
    for path in args.configs {
        resolver = resolver.config_file(path);
    }

    let resolution = resolver.resolve().map_err(|err| err.to_string())?;
    println!("{}", render(&resolution, args.format)?);
    Ok(())
}

fn render(resolution: &Resolution, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(resolution)
            .map_err(|err| format!("Failed to serialize resolution: {err}")),
        CliOutputFormat::Yaml => serde_yaml::to_string(resolution)
            .map(|text| text.trim_end().to_string())
            .map_err(|err| format!("Failed to serialize resolution: {err}")),
    }
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let file = load_definitions(&args.definitions)?;
    let registry = OptionRegistry::build(file.definitions()).map_err(|err| err.to_string())?;

    println!("Options: {}", registry.len());

    let shorts: Vec<String> = registry
        .short_flags()
        .into_iter()
        .map(|(flag, option)| format!("-{flag} {option}"))
        .collect();
    println!("Short flags: {}", list_or_none(&shorts));

    let env: Vec<String> = registry
        .env_bindings()
        .map(|(var, option)| format!("{var} -> {option}"))
        .collect();
    println!("Environment: {}", list_or_none(&env));

    let mandatory: Vec<String> = file
        .definitions()
        .iter()
        .map(|(name, _)| name)
        .filter(|name| registry.is_mandatory(name))
        .map(str::to_string)
        .collect();
    println!("Mandatory: {}", list_or_none(&mandatory));

    Ok(())
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

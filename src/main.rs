use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skillforge::cli::commands::generate::GenerateOptions;

#[derive(Parser)]
#[command(name = "skillforge")]
#[command(
    version,
    about = "Generate SKILL.md reference documents from public repositories"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(
        long,
        short,
        global = true,
        help = "Use this config file instead of the global/project chain"
    )]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a repository snapshot (metadata, README, ranked files)
    Fetch {
        #[arg(help = "Repository URL or owner/repo")]
        url: String,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Generate a SKILL.md and optionally refine it interactively
    Generate {
        #[arg(help = "Repository URL or owner/repo")]
        url: String,
        #[arg(long, help = "LLM provider (gemini, openai, ollama)")]
        provider: Option<String>,
        #[arg(long, help = "Model to use")]
        model: Option<String>,
        #[arg(long, short, help = "Output directory (default: current directory)")]
        output: Option<PathBuf>,
        #[arg(long, help = "Write use-<name>/SKILL.md instead of SKILL.md")]
        bundle: bool,
        #[arg(long = "no-chat", help = "Exit after the initial generation")]
        no_chat: bool,
    },

    /// Serve the extraction endpoint over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000", help = "Listen address")]
        addr: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, text, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mSkillForge encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // RUST_BACKTRACE=1 still prints through the default hook
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    // stdout is reserved for command output (fetch --format json)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_file = cli.config.as_deref();

    match cli.command {
        Commands::Fetch { url, format } => {
            skillforge::cli::commands::fetch::run(config_file, &url, &format)?;
        }
        Commands::Generate {
            url,
            provider,
            model,
            output,
            bundle,
            no_chat,
        } => {
            skillforge::cli::commands::generate::run(GenerateOptions {
                url,
                config_file: cli.config.clone(),
                provider,
                model,
                output,
                bundle,
                chat: !no_chat,
            })?;
        }
        Commands::Serve { addr } => {
            skillforge::cli::commands::serve::run(config_file, &addr)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                skillforge::cli::commands::config::show(config_file, &format)?;
            }
            ConfigAction::Path => {
                skillforge::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                skillforge::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prompt_router::ConfigLoader;
use prompt_router::cli::commands::{self, route::RouteArgs};

#[derive(Parser)]
#[command(name = "prompt-router")]
#[command(
    version,
    about = "Route prompts to text-generation providers by complexity"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ./prompt-router.toml when present)
    #[arg(long, short, global = true, env = "PROMPT_ROUTER_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Route a prompt to the provider for its complexity tier
    Route {
        #[arg(help = "Prompt text")]
        prompt: String,
        #[arg(long, help = "Pre-enhanced prompt text to send instead of enhancing")]
        enhanced: Option<String>,
        #[arg(long, help = "Caller identity recorded in logs")]
        user_id: Option<String>,
        #[arg(long, help = "Overall deadline in seconds across all attempts")]
        deadline: Option<u64>,
        #[arg(long, help = "Print routing metrics after the request")]
        metrics: bool,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Classify a prompt without calling any provider
    Classify {
        #[arg(help = "Prompt text")]
        prompt: String,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Probe every configured provider
    Check {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
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
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Write a default configuration file
    Init {
        #[arg(help = "Target path (default: ./prompt-router.toml)")]
        path: Option<PathBuf>,
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
        eprintln!("\x1b[31mprompt-router encountered an unexpected error:\x1b[0m");
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

        // Default hook prints the backtrace when RUST_BACKTRACE=1
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
        "prompt_router=debug,info"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Config subcommands that must work with a broken or missing config
    if let Commands::Config { action } = &cli.command {
        match action {
            ConfigAction::Path => return Ok(commands::config::path()?),
            ConfigAction::Init { path, force } => {
                return Ok(commands::config::init(path.as_deref(), *force)?);
            }
            ConfigAction::Show { .. } => {}
        }
    }

    let config = ConfigLoader::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Route {
            prompt,
            enhanced,
            user_id,
            deadline,
            metrics,
            format,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::route::run(
                &config,
                RouteArgs {
                    prompt,
                    enhanced,
                    user_id,
                    deadline: deadline.map(Duration::from_secs),
                    show_metrics: metrics,
                    format,
                },
            ))?;
        }
        Commands::Classify { prompt, format } => {
            commands::classify::run(&config, &prompt, &format)?;
        }
        Commands::Check { format } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::check::run(&config, &format))?;
        }
        Commands::Config { action } => {
            if let ConfigAction::Show { format } = action {
                commands::config::show(&config, &format)?;
            }
        }
    }

    Ok(())
}

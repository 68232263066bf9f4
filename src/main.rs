use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use siteconf::Override;
use siteconf::cli::OutputFormat;
use siteconf::cli::ui::Output;

/// Parse a `NAME=literal` override
fn parse_override(s: &str) -> Result<Override, String> {
    s.parse::<Override>().map_err(|e| e.to_string())
}

#[derive(Parser)]
#[command(name = "siteconf")]
#[command(
    version,
    about = "Inspect and validate static-site generator settings documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override a setting (highest precedence), e.g. -e "SITEURL='https://example.org'"
    #[arg(short = 'e', long = "extra", global = true, value_parser = parse_override)]
    overrides: Vec<Override>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a settings document
    Check {
        #[arg(help = "Settings file (default: $SITECONF_FILE or pelicanconf.py)")]
        path: Option<PathBuf>,
    },

    /// Print a settings document or its resolved typed configuration
    Show {
        #[arg(help = "Settings file (default: $SITECONF_FILE or pelicanconf.py)")]
        path: Option<PathBuf>,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json, toml, yaml, source"
        )]
        format: OutputFormat,
        #[arg(long, help = "Show the typed configuration with defaults applied")]
        typed: bool,
    },

    /// Print one setting
    Get {
        #[arg(help = "Setting name, e.g. SITEURL")]
        name: String,
        #[arg(help = "Settings file (default: $SITECONF_FILE or pelicanconf.py)")]
        path: Option<PathBuf>,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json, yaml, source"
        )]
        format: OutputFormat,
    },

    /// Preview the URL and output path generated for a piece of content
    Url {
        #[arg(help = "Settings file (default: $SITECONF_FILE or pelicanconf.py)")]
        path: Option<PathBuf>,
        #[arg(long, help = "Content slug")]
        slug: String,
        #[arg(long, help = "Publication date (YYYY-MM-DD, default: today)")]
        date: Option<String>,
        #[arg(long, help = "Category (default: DEFAULT_CATEGORY)")]
        category: Option<String>,
        #[arg(long, help = "Use page templates instead of article templates")]
        page: bool,
    },

    /// Compare two snapshots of a settings document
    Diff {
        old: PathBuf,
        new: PathBuf,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json, yaml"
        )]
        format: OutputFormat,
    },
}

/// Report panics in the same style as ordinary errors
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
        eprintln!("\x1b[31msiteconf encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Output::new().error(&format!("{:#}", e));
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
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let overrides = &cli.overrides;

    match cli.command {
        Commands::Check { path } => {
            siteconf::cli::commands::check::run(path, overrides)?;
        }
        Commands::Show {
            path,
            format,
            typed,
        } => {
            siteconf::cli::commands::show::run(path, format, typed, overrides)?;
        }
        Commands::Get { name, path, format } => {
            siteconf::cli::commands::get::run(&name, path, format)?;
        }
        Commands::Url {
            path,
            slug,
            date,
            category,
            page,
        } => {
            use siteconf::cli::commands::url::UrlOptions;

            siteconf::cli::commands::url::run(
                UrlOptions {
                    path,
                    slug,
                    date,
                    category,
                    page,
                },
                overrides,
            )?;
        }
        Commands::Diff { old, new, format } => {
            siteconf::cli::commands::diff::run(&old, &new, format)?;
        }
    }

    Ok(())
}

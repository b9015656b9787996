//! homeguard — home-security console simulator
//!
//! Quick start:
//!   homeguard            # start the console (same as `homeguard console`)
//!   homeguard log        # see what happened in the last session
//!   homeguard check      # validate your config
//!
//! For more info: homeguard --help

use clap::{Parser, Subcommand};
use colored::Colorize;
use homeguard::utils::paths::CONFIG_FILE_NAME;
use homeguard::{cli, config};
use std::path::{Path, PathBuf};

/// homeguard — a keypad console with lockout, guest access and owner override.
#[derive(Parser)]
#[command(
    name = "homeguard",
    version,
    about = "Home-security console simulator",
    long_about = "Set a username and 4 digit password, then unlock, grant guests\n\
                  time-limited access, or use the owner override. Three wrong\n\
                  passwords lock the console for an hour.\n\n\
                  Quick start:\n  \
                  homeguard              # start the console\n  \
                  homeguard log          # see what happened\n  \
                  homeguard init         # write a config file to edit"
)]
struct Cli {
    /// Config file (default: nearest .homeguard.yaml, else built-in settings)
    #[arg(short, long, global = true, env = "HOMEGUARD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive console session
    Console,

    /// See what happened in a session
    Log {
        /// Show a specific session
        #[arg(short, long, help = "Session ID to view")]
        session: Option<String>,

        /// Filter by event kind
        #[arg(
            short,
            long,
            help = "Filter: login, failed, lockout, override, guest, ..."
        )]
        kind: Option<String>,

        /// Filter by result
        #[arg(short, long, help = "Filter: success, failure")]
        result: Option<String>,

        /// Limit number of entries shown
        #[arg(short, long, help = "Max entries to show")]
        limit: Option<usize>,

        /// Show only the summary
        #[arg(long, help = "Show only the session summary")]
        summary: bool,

        /// List all available sessions
        #[arg(long, help = "List all recorded sessions")]
        list: bool,
    },

    /// Validate a config file
    Check {
        /// Path to config file (default: --config, else .homeguard.yaml)
        path: Option<PathBuf>,
    },

    /// Write a starter config file from a template
    Init {
        #[arg(short, long, default_value = "standard")]
        template: String,
        #[arg(short, long)]
        output: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    // Diagnostics only; the audit trail goes to its own log files
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("homeguard=warn".parse().expect("static directive")),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        None | Some(Commands::Console) => cli::run_console(config_path),

        Some(Commands::Log {
            session,
            kind,
            result,
            limit,
            summary,
            list,
        }) => run_log(
            config_path,
            list,
            &cli::log::LogOptions {
                session_id: session.as_deref(),
                kind: kind.as_deref(),
                result: result.as_deref(),
                limit,
                summary_only: summary,
            },
        ),

        Some(Commands::Check { path }) => {
            let path = path
                .as_deref()
                .or(config_path)
                .unwrap_or(Path::new(CONFIG_FILE_NAME));
            run_check(path)
        }

        Some(Commands::Init {
            template,
            output,
            force,
        }) => cli::init::run_init(Some(&template), output.as_deref(), force),
    };

    if let Err(e) = result {
        eprintln!();
        eprintln!("  {} {}", "✗".red().bold(), e);
        for cause in e.chain().skip(1) {
            eprintln!("  {} {}", "caused by:".dimmed(), cause);
        }
        eprintln!();
        std::process::exit(1);
    }
}

fn run_log(
    config_path: Option<&Path>,
    list: bool,
    options: &cli::log::LogOptions<'_>,
) -> anyhow::Result<()> {
    let (config, source) = cli::load_config(config_path)?;
    let log_dir = cli::log_directory(&config, source.as_deref())?;
    if list {
        cli::log::run_log_list(&log_dir)
    } else {
        cli::log::run_log(&log_dir, options)
    }
}

/// Run the `homeguard check` command with linting.
fn run_check(path: &Path) -> anyhow::Result<()> {
    let config = config::parser::parse_config_file(path)?;

    println!();
    println!("  {} Config is valid!", "✓".green().bold());
    println!("  Profile: {}", config.profile.cyan());
    if let Some(ref description) = config.description {
        println!("  {}", description.trim().dimmed());
    }
    println!();
    for line in config.describe() {
        println!("  • {}", line);
    }

    let warnings = config::linter::lint_config(&config);
    if warnings.is_empty() {
        println!();
        println!("  {} No issues found — config looks solid.", "✓".green());
    } else {
        println!();
        println!(
            "  {} {} {}:",
            "─".repeat(20).dimmed(),
            warnings.len(),
            if warnings.len() == 1 {
                "suggestion"
            } else {
                "suggestions"
            }
        );
        println!();
        for warning in &warnings {
            println!("{}", warning.display());
        }
    }

    println!();
    Ok(())
}

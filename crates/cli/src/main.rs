mod skills_commands;

use {
    clap::{Parser, Subcommand},
    std::{path::PathBuf, process::ExitCode},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use skills_commands::{DestinationArgs, Selection, SyncContext};

const EXAMPLES: &str = "\
Examples:
  # Install all skills to Open Code
  skillsync install --all --target opencode

  # Install a specific skill to Antigravity (global)
  skillsync install git-formatter --target antigravity

  # Install to the Antigravity workspace of the current project
  skillsync install git-formatter --target antigravity --scope workspace

  # List installed skills
  skillsync list --target opencode
  skillsync list --target antigravity --scope workspace";

#[derive(Parser)]
#[command(
    name = "skillsync",
    version,
    about = "skillsync: install, list, and remove skills for Open Code and Antigravity",
    arg_required_else_help = true,
    after_help = EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (skips discovery of skillsync.toml).
    #[arg(long, global = true, env = "SKILLSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Source directory holding one folder per skill (overrides config).
    #[arg(long, global = true)]
    source: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Install or update (overwrite) skills.
    Install {
        #[command(flatten)]
        selection: Selection,
        #[command(flatten)]
        dest: DestinationArgs,
        /// Copy into a temporary sibling directory and swap it in.
        #[arg(long)]
        staged: bool,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List installed skills.
    List {
        #[command(flatten)]
        dest: DestinationArgs,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Remove installed skills.
    Remove {
        #[command(flatten)]
        selection: Selection,
        #[command(flatten)]
        dest: DestinationArgs,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List skills available in the source directory.
    Available {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Initialise tracing on stderr so stdout stays reserved for command output.
fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<skillsync_config::SkillsyncConfig> {
    let config = match cli.config {
        Some(ref path) => skillsync_config::load_config(path)?,
        None => skillsync_config::discover_and_load(),
    };
    Ok(skillsync_config::apply_env_overrides(config))
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    debug!(version = env!("CARGO_PKG_VERSION"), "skillsync starting");

    let config = load_config(&cli)?;
    let ctx = SyncContext::new(config, cli.source)?;

    match cli.command {
        Commands::Install {
            selection,
            dest,
            staged,
            json,
        } => skills_commands::handle_install(&ctx, selection, &dest, staged, json),
        Commands::List { dest, json } => skills_commands::handle_list(&ctx, &dest, json),
        Commands::Remove {
            selection,
            dest,
            json,
        } => skills_commands::handle_remove(&ctx, selection, &dest, json),
        Commands::Available { json } => skills_commands::handle_available(&ctx, json),
    }
}

//! ghmigrate CLI - snapshot a GitHub organization and migrate memberships.

mod commands;
mod config;
mod progress;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ghmigrate::{PullTarget, UserField};
use tracing_subscriber::EnvFilter;

use crate::config::Overrides;

#[derive(Parser)]
#[command(name = "ghmigrate")]
#[command(version)]
#[command(about = "Snapshot a GitHub organization and migrate user memberships")]
#[command(
    long_about = "ghmigrate pulls the members, memberships, teams, invitations, outside \
collaborators and repositories of a GitHub organization into local JSON snapshots. \
From those snapshots it can re-invite a user with their role and teams, remove a \
user, or restore every cached team membership."
)]
#[command(after_long_help = r#"EXAMPLES
    Pull everything migration needs:
        $ ghmigrate --org acme pull

    Pull only outside collaborators:
        $ ghmigrate --org acme pull collaborators

    Re-invite a user into their teams with fresh snapshots:
        $ ghmigrate --org acme migrate octocat --refresh

    Print the email of every member of a team:
        $ ghmigrate --org acme users --field email --team core

    Generate shell completions:
        $ ghmigrate completions bash > ~/.local/share/bash-completion/completions/ghmigrate

CONFIGURATION
    ghmigrate reads configuration from (lowest priority first):
      1. ~/.config/ghmigrate/config.toml (or $XDG_CONFIG_HOME/ghmigrate/config.toml)
      2. ./ghmigrate.toml
      3. Legacy environment variables (GITHUB_ORG, GITHUB_TOKEN, DATA_DIR)
      4. Environment variables (GHMIGRATE_* prefix, e.g., GHMIGRATE_GITHUB_TOKEN)
      5. Command-line flags
    A .env file in the current directory is loaded first.

ENVIRONMENT VARIABLES
    GHMIGRATE_GITHUB_ORG      Organization login
    GHMIGRATE_GITHUB_TOKEN    GitHub token with organization admin rights
    GHMIGRATE_GITHUB_HOST     API root URL (default: https://api.github.com)
    GHMIGRATE_CACHE_DIR       Snapshot directory (default: ~/.local/state/ghmigrate/<org>)
    GHMIGRATE_CACHE_TTL       Max teams snapshot age in seconds for migrate
    GHMIGRATE_RATELIMIT_FLOOR Remaining requests at which to wait for the reset
    RUST_LOG                  Log filter (default: ghmigrate=info,ghmigrate_cli=info)
"#)]
struct Cli {
    /// Organization login
    #[arg(long, global = true)]
    org: Option<String>,

    /// GitHub token
    #[arg(long, global = true)]
    token: Option<String>,

    /// Snapshot directory
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// API root URL, for GitHub Enterprise
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pull organization state into local snapshots
    Pull {
        /// What to pull: all, users, memberships, teams, invitations,
        /// collaborators, repositories
        #[arg(default_value = "all")]
        target: PullTarget,
    },
    /// Re-invite a user, keeping their role and teams
    Migrate {
        /// User login
        login: String,

        /// Pull users, memberships and teams again before migrating
        #[arg(short, long)]
        refresh: bool,
    },
    /// Remove a user from the organization
    Remove {
        /// User login
        login: String,
    },
    /// Re-add every cached team member to their team
    RestoreTeams,
    /// Print one field of each cached user
    Users {
        /// Field to print (login, id, node_id, name, email, company, location,
        /// blog, bio, type, html_url, site_admin)
        #[arg(short, long, default_value = "login")]
        field: UserField,

        /// Only members of this team (slug)
        #[arg(short, long)]
        team: Option<String>,
    },
    /// Print cached team slugs
    Teams,
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            org: self.org.clone(),
            token: self.token.clone(),
            dir: self.dir.clone(),
            api_url: self.api_url.clone(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    shutdown::setup_shutdown_handler();

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("ghmigrate=info,ghmigrate_cli=info"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Commands that need no organization
    match &cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(*shell)?;
            return Ok(());
        }
        Commands::Man { output } => {
            commands::meta::handle_man(output.clone())?;
            return Ok(());
        }
        _ => {}
    }

    // Configuration (config files -> env vars -> flags)
    let org = config::Config::load().resolve(&cli.overrides())?;
    tracing::debug!(org = %org.org, dir = %org.data_dir.display(), "Resolved configuration");

    match cli.command {
        Commands::Pull { target } => commands::pull::handle_pull(target, &org).await?,
        Commands::Migrate { login, refresh } => {
            commands::migrate::handle_migrate(&login, refresh, &org).await?
        }
        Commands::Remove { login } => commands::migrate::handle_remove(&login, &org).await?,
        Commands::RestoreTeams => commands::migrate::handle_restore_teams(&org).await?,
        Commands::Users { field, team } => {
            commands::show::handle_users(field, team.as_deref(), &org)?
        }
        Commands::Teams => commands::show::handle_teams(&org)?,
        Commands::Completions { .. } | Commands::Man { .. } => {}
    }

    Ok(())
}

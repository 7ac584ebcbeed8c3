mod account;
mod dashboard;
mod public;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use triage_client::{FileCredentialStore, LogoutReason, Session, StatusFilter};
use triage_core::{AppConfig, ComplaintStatus};

#[derive(Debug, Parser)]
#[command(name = "triage")]
#[command(about = "Complaint triage admin console")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in as a staff member and store the session token
    Login {
        #[arg(long)]
        username: String,
        /// Read from `TRIAGE_PASSWORD` when not given
        #[arg(long, env = "TRIAGE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// File a new complaint (no login needed)
    Submit {
        /// 10-digit PNR of the journey
        #[arg(long)]
        pnr: String,
        #[arg(long)]
        complaint: String,
    },
    /// Look up a complaint's public status (no login needed)
    Status {
        id: String,
    },
    /// Show complaint counts by status
    Stats,
    /// List complaints, newest first
    List {
        /// `all`, `pending`, `in-progress` or `resolved`
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        /// Department name, or `all`
        #[arg(long)]
        department: Option<String>,
        /// Case-insensitive match against complaint id or PNR
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one complaint in detail
    Show {
        id: String,
    },
    /// Set a complaint's status and departments, then refresh
    Update {
        id: String,
        #[arg(long)]
        status: ComplaintStatus,
        /// Comma-separated, e.g. "Electrical, Maintenance"
        #[arg(long)]
        departments: String,
    },
}

/// Session backed by the configured credential file. A forced logout tells
/// the operator to log in again.
fn open_session(config: &AppConfig) -> Arc<Session> {
    let store = FileCredentialStore::new(config.session_path.clone());
    let session = Session::new(store).with_logout_hook(|reason| match reason {
        LogoutReason::MissingCredential => {
            eprintln!("not logged in; run `triage login` first");
        }
        LogoutReason::SessionExpired => {
            eprintln!("session expired; run `triage login` to sign in again");
        }
        LogoutReason::Requested => {}
    });
    Arc::new(session)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = triage_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("no command given; run `triage --help` for usage");
        return Ok(());
    };

    match command {
        Commands::Login { username, password } => {
            account::run_login(&config, &open_session(&config), &username, &password).await?;
        }
        Commands::Logout => account::run_logout(&open_session(&config)),
        Commands::Whoami => account::run_whoami(&open_session(&config))?,
        Commands::Submit { pnr, complaint } => {
            public::run_submit(&config, &pnr, &complaint).await?;
        }
        Commands::Status { id } => public::run_status(&config, &id).await?,
        Commands::Stats => {
            let mut console = dashboard::open_console(&config, open_session(&config))?;
            dashboard::run_stats(&mut console).await?;
        }
        Commands::List {
            status,
            department,
            search,
        } => {
            let mut console = dashboard::open_console(&config, open_session(&config))?;
            dashboard::run_list(&mut console, status, department.as_deref(), search).await?;
        }
        Commands::Show { id } => {
            let mut console = dashboard::open_console(&config, open_session(&config))?;
            dashboard::run_show(&mut console, &id).await?;
        }
        Commands::Update {
            id,
            status,
            departments,
        } => {
            let mut console = dashboard::open_console(&config, open_session(&config))?;
            dashboard::run_update(&mut console, &id, status, departments).await?;
        }
    }

    Ok(())
}

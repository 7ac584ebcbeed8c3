//! Login, logout and identity commands.

use triage_client::{LogoutReason, PublicClient, Session};
use triage_core::AppConfig;

/// Exchanges credentials for a token and stores it in the session file.
///
/// # Errors
///
/// Returns an error if the backend rejects the login or the session file
/// cannot be written.
pub(crate) async fn run_login(
    config: &AppConfig,
    session: &Session,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    let client = PublicClient::new(config)?;
    let credential = client.login(username, password).await?;
    session.store_credential(&credential)?;
    tracing::info!(username = %credential.identity.username, "login stored");
    println!("logged in as {}", credential.identity.username);
    Ok(())
}

pub(crate) fn run_logout(session: &Session) {
    session.logout(LogoutReason::Requested);
    println!("logged out");
}

/// # Errors
///
/// Returns an error if the session file exists but cannot be read.
pub(crate) fn run_whoami(session: &Session) -> anyhow::Result<()> {
    match session.get_credential()? {
        Some(credential) => {
            let identity = credential.identity;
            match identity.role {
                Some(role) => println!("{} ({role})", identity.username),
                None => println!("{}", identity.username),
            }
        }
        None => println!("not logged in"),
    }
    Ok(())
}

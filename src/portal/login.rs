//! Portal login

use tracing::info;

use crate::browser::{wait_for, BrowserSession};
use crate::core::{Config, Credentials, ExtractError, Result};
use crate::portal::{CONTINUE_BUTTON, DASHBOARD_MARKER, PASSWORD_INPUT, USERNAME_INPUT};

/// Sign in and wait for the dashboard.
///
/// The form is two-step: username then Continue, password then Continue.
/// Every failure except a missing driver is reported as `ExtractError::Auth`.
pub async fn login(session: &dyn BrowserSession, config: &Config, credentials: &Credentials) -> Result<()> {
    info!(user = %credentials.username, "Logging in");

    match sign_in(session, config, credentials).await {
        Ok(()) => {
            info!("Logged in");
            Ok(())
        }
        Err(e @ ExtractError::AgentBrowserNotFound) => Err(e),
        Err(e) => Err(ExtractError::auth(e.to_string())),
    }
}

async fn sign_in(session: &dyn BrowserSession, config: &Config, credentials: &Credentials) -> Result<()> {
    let timeouts = &config.timeouts;

    session.open(&config.login_url()?).await?;

    wait_for(session, USERNAME_INPUT, timeouts.login()).await?;
    session.fill(USERNAME_INPUT, &credentials.username).await?;
    wait_for(session, CONTINUE_BUTTON, timeouts.short()).await?;
    session.click(CONTINUE_BUTTON).await?;

    wait_for(session, PASSWORD_INPUT, timeouts.short()).await?;
    session.fill(PASSWORD_INPUT, &credentials.password).await?;
    wait_for(session, CONTINUE_BUTTON, timeouts.short()).await?;
    session.click(CONTINUE_BUTTON).await?;

    wait_for(session, DASHBOARD_MARKER, timeouts.page()).await
}

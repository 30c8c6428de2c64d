//! Bounded waits on page elements
//!
//! Polls the session with exponential backoff (100ms doubling, capped at 1s)
//! until the condition holds or the timeout passes. A timeout is reported as
//! `ExtractError::Timeout`; there is no cancellation. A missing element keeps
//! the wait going, any other session error ends it at once.

use std::time::Duration;
use tokio::time::Instant;

use crate::browser::BrowserSession;
use crate::core::{ExtractError, Result};

const FIRST_POLL: Duration = Duration::from_millis(100);
const MAX_POLL: Duration = Duration::from_secs(1);

/// Wait until at least one element matches `selector`
pub async fn wait_for(session: &dyn BrowserSession, selector: &str, timeout: Duration) -> Result<()> {
    poll(selector, timeout, move || is_present(session, selector)).await
}

/// Wait until `selector` is absent or hidden (e.g. a "processing" overlay)
pub async fn wait_until_hidden(
    session: &dyn BrowserSession,
    selector: &str,
    timeout: Duration,
) -> Result<()> {
    poll(selector, timeout, move || is_hidden(session, selector)).await
}

async fn is_present(session: &dyn BrowserSession, selector: &str) -> Result<bool> {
    Ok(session.count(selector).await? > 0)
}

async fn is_hidden(session: &dyn BrowserSession, selector: &str) -> Result<bool> {
    if session.count(selector).await? == 0 {
        return Ok(true);
    }
    Ok(!session.is_visible(selector).await?)
}

/// Treat a missing element as "not yet" rather than a failure
fn pending_if_missing(result: Result<bool>) -> Result<bool> {
    match result {
        Err(ExtractError::ElementNotFound(_)) => Ok(false),
        other => other,
    }
}

async fn poll<F, Fut>(selector: &str, timeout: Duration, mut check: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<bool>>,
{
    let start = Instant::now();
    let mut interval = FIRST_POLL;

    loop {
        if pending_if_missing(check().await)? {
            return Ok(());
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(ExtractError::Timeout {
                selector: selector.to_string(),
                waited_ms: elapsed.as_millis(),
            });
        }

        // Never sleep past the deadline
        tokio::time::sleep(interval.min(timeout - elapsed)).await;
        interval = (interval * 2).min(MAX_POLL);
    }
}

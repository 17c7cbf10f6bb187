//! Session ID resolution
//!
//! The console reports its session ID in answer to `sessionId`, but early in
//! startup it may answer with something else. The resolver keeps asking,
//! with a pause between attempts, until it sees an `S-` prefixed answer or
//! the attempt budget runs out.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::client::{HeadlessClient, Shared};
use crate::control::EngineCommand;
use crate::error::{HeadlessError, Result};
use crate::types::events::{ErrorKind, HeadlessEvent};
use crate::types::identifiers::SessionId;

/// Command asking the console for the current session ID
pub const SESSION_ID_COMMAND: &str = "sessionId";

impl HeadlessClient {
    /// Get the session ID of the running world
    ///
    /// Returns the cached ID when one has been resolved before. Otherwise
    /// issues `sessionId` through the command queue until the console answers
    /// with an `S-` prefixed ID. After more than `session_id_max_attempts`
    /// rejected answers an error event fires and `Ok(None)` is returned; a
    /// later call starts a fresh cycle.
    ///
    /// Concurrent callers share one resolution cycle.
    ///
    /// # Errors
    /// Returns `Closed` if the engine stopped while resolving
    pub async fn get_session_id(&self) -> Result<Option<SessionId>> {
        resolve(&self.shared, || Some(self.clone())).await
    }
}

/// Resolve the session ID after the world started and announce readiness
///
/// Only a weak sender is held between attempts, so dropping the last client
/// handle stops the engine and ends the check.
pub(crate) async fn announce_ready(
    shared: Arc<Shared>,
    handle_tx: mpsc::WeakUnboundedSender<EngineCommand>,
) {
    match resolve(&shared, || HeadlessClient::upgrade(&handle_tx, &shared)).await {
        Ok(Some(session_id)) => {
            let first = {
                let mut state = shared.state.write();
                let first = !state.ready;
                state.ready = true;
                first
            };
            if first {
                log::info!("Headless client ready in session {session_id}");
                shared.emit(HeadlessEvent::Ready { session_id });
            }
        }
        Ok(None) => {
            log::warn!("World is running but its session ID is unknown; not ready");
        }
        Err(e) => {
            log::debug!("Readiness check aborted: {e}");
        }
    }
}

/// Run one resolution cycle, taking a fresh handle for every attempt
async fn resolve<F>(shared: &Shared, mut handle: F) -> Result<Option<SessionId>>
where
    F: FnMut() -> Option<HeadlessClient>,
{
    if let Some(session_id) = cached(shared) {
        return Ok(Some(session_id));
    }

    let _cycle = shared.resolver_lock.lock().await;
    let options = &shared.options;

    loop {
        if let Some(session_id) = cached(shared) {
            return Ok(Some(session_id));
        }

        let Some(client) = handle() else {
            return Err(HeadlessError::Closed);
        };
        let response = match client.run_command(SESSION_ID_COMMAND).await {
            Ok(response) => Some(response),
            Err(HeadlessError::Closed) => return Err(HeadlessError::Closed),
            Err(e) => {
                log::warn!("Session ID request failed: {e}");
                None
            }
        };
        drop(client);

        if let Some(session_id) = response.as_deref().and_then(SessionId::parse) {
            let mut state = shared.state.write();
            state.session_id_attempts = 0;
            let cached = state.session_id.get_or_insert(session_id).clone();
            log::info!("Session ID: {cached}");
            return Ok(Some(cached));
        }

        let attempts = {
            let mut state = shared.state.write();
            state.session_id_attempts += 1;
            let attempts = state.session_id_attempts;
            if attempts > options.session_id_max_attempts {
                state.session_id_attempts = 0;
            }
            attempts
        };

        if attempts > options.session_id_max_attempts {
            let message = format!("Could not retrieve session ID after {attempts} attempts");
            log::error!("{message}");
            shared.emit(HeadlessEvent::error(
                ErrorKind::SessionResolutionExhausted,
                message,
            ));
            return Ok(None);
        }

        log::warn!(
            "Rejected session ID response {response:?} (attempt {attempts}/{})",
            options.session_id_max_attempts
        );
        tokio::time::sleep(options.session_id_retry_delay).await;
    }
}

fn cached(shared: &Shared) -> Option<SessionId> {
    shared.state.read().session_id.clone()
}

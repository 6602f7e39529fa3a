use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::SearchError;

/// Quiet period between the last keystroke and the lookup.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Hands out one cancellation token per invocation. Beginning a new invocation
/// cancels the previous token, so at most one invocation is ever live.
#[derive(Default)]
pub struct LatestWins {
    current: Option<CancellationToken>,
}

impl LatestWins {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Cancel the in-flight invocation (if any) and return the token for the
    /// next one.
    pub fn begin(&mut self) -> CancellationToken {
        if let Some(prev) = self.current.take() {
            prev.cancel();
        }
        let token = CancellationToken::new();
        self.current = Some(token.clone());
        token
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }
}

impl Drop for LatestWins {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Resolve `op`, unless `token` is cancelled first. A cancelled invocation
/// reports `SearchError::Cancelled` instead of whatever it would have
/// produced, so a stale result can never be mistaken for a live one.
pub async fn run_until_cancelled<T, F>(token: CancellationToken, op: F) -> Result<T, SearchError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    tokio::select! {
        _ = token.cancelled() => Err(SearchError::Cancelled),
        res = op => res.map_err(SearchError::Failed),
    }
}

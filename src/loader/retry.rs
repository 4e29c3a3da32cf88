//! Fetch attempts with timeout and jittered exponential backoff.
//!
//! # Design Decisions
//! - Every attempt has a deadline unless the timeout is configured to 0
//! - Retries are opt-in (`retry_attempts = 0` by default)
//! - Jitter keeps parallel apps from hammering a recovering asset server

use std::time::Duration;

use rand::Rng;
use tokio::time::{sleep, timeout};

use crate::config::LoaderConfig;
use crate::error::LoadError;
use crate::loader::view::{LazyView, ViewHandle};

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`,
/// capped at `max_ms`, plus up to 10% jitter.
pub fn backoff_delay(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let capped = base_ms
        .saturating_mul(2u64.saturating_pow(attempt - 1))
        .min(max_ms);

    let jitter_range = capped / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped + jitter)
}

/// Run the loader until it succeeds or the attempts are used up.
pub(crate) async fn fetch_with_retry(
    lazy: &LazyView,
    config: &LoaderConfig,
) -> Result<ViewHandle, LoadError> {
    let mut attempt = 0;
    loop {
        let result = match config.timeout() {
            Some(limit) => timeout(limit, lazy.fetch())
                .await
                .unwrap_or(Err(LoadError::Timeout(config.timeout_ms))),
            None => lazy.fetch().await,
        };

        match result {
            Ok(view) => return Ok(view),
            Err(error) if attempt < config.retry_attempts => {
                attempt += 1;
                let delay = backoff_delay(attempt, config.backoff_base_ms, config.backoff_max_ms);
                tracing::warn!(
                    module = %lazy.key(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Module load failed, retrying"
                );
                sleep(delay).await;
            }
            Err(error) => return Err(error),
        }
    }
}

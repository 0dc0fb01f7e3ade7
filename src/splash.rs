use std::{future::Future, time::Duration};
use tokio::time::sleep;
use tracing::debug;

pub const DEFAULT_SPLASH: Duration = Duration::from_millis(2000);
pub const TITLE: &str = "Aikta";

/// Keeps the splash up until `ready` completes and then for `minimum` more.
pub async fn hold<F: Future>(ready: F, minimum: Duration) -> F::Output {
    let output = ready.await;
    debug!("startup ready, holding splash for {:?}", minimum);
    sleep(minimum).await;
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn waits_for_ready_then_minimum() {
        let start = Instant::now();
        let value = hold(
            async {
                sleep(Duration::from_millis(500)).await;
                7
            },
            DEFAULT_SPLASH,
        )
        .await;

        assert_eq!(value, 7);
        assert!(start.elapsed() >= Duration::from_millis(2500));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_minimum_returns_when_ready() {
        let start = Instant::now();
        hold(async {}, Duration::ZERO).await;
        assert!(start.elapsed() < Duration::from_millis(1));
    }
}

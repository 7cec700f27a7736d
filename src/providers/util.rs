use anyhow::Error;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Total tries per snapshot request, first attempt included.
pub const FETCH_ATTEMPTS: usize = 3;
/// Pause between tries.
pub const FETCH_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Runs `operation` until it succeeds or `attempts` tries are used up,
/// sleeping `delay` between tries. TEFAS drops connections under load often
/// enough that a second try rescues most snapshot fetches; anything still
/// failing after the last try is returned as the error.
pub async fn with_retry<F, Fut, T, E>(
    mut operation: F,
    attempts: usize,
    delay: Duration,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<Error>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                let err = err.into();
                if attempt >= attempts {
                    return Err(err);
                }
                debug!("Attempt {attempt}/{attempts} failed: {err}. Retrying...");
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
        }
    }
}

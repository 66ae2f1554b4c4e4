use std::{fmt::Display, future::Future, time::Duration};

///
/// Runs `operation` until it returns Ok, sleeping `retry_interval` between attempts.
/// `action` describes the operation in logs.
///
pub async fn retry_until_ok<F, Fut, T, E>(
    action: &'static str,
    retry_interval: Duration,
    operation: F,
) -> T
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        tracing::info!(attempt, action);
        match operation().await {
            Ok(output) => return output,
            Err(err) => tracing::warn!(attempt, action, %err, "attempt failed"),
        }

        tokio::time::sleep(retry_interval).await;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retry_until_ok_returns_first_success() {
        let attempts = AtomicU32::new(0);

        let output = retry_until_ok("counting", Duration::from_millis(1), || async {
            match attempts.fetch_add(1, Ordering::SeqCst) {
                0 | 1 => Err("not yet"),
                attempt => Ok(attempt),
            }
        })
        .await;

        assert_eq!(output, 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}

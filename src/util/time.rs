use std::sync::atomic::{AtomicU64, Ordering};

// Last value handed out by `unique_timestamp_millis`
static LAST_STAMP: AtomicU64 = AtomicU64::new(0);

/// Get the current time in milliseconds since the UNIX epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn current_time_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Get the current time in milliseconds since the UNIX epoch
#[cfg(target_arch = "wasm32")]
pub fn current_time_millis() -> u64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|perf| (perf.time_origin() + perf.now()) as u64)
        .unwrap_or(0)
}

/// Millisecond timestamp that is strictly greater than every previous one
/// returned in this process.
///
/// Two exports within the same millisecond still get distinct file names.
pub fn unique_timestamp_millis() -> u64 {
    let now = current_time_millis();
    let previous = LAST_STAMP
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    now.max(previous + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_timestamps_increase() {
        let first = unique_timestamp_millis();
        let second = unique_timestamp_millis();
        let third = unique_timestamp_millis();
        assert!(second > first);
        assert!(third > second);
    }
}

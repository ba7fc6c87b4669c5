//! Per-key log throttling for warnings that can fire on every request.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

struct Window {
    opened_at: Instant,
    suppressed: u64,
}

static WINDOWS: OnceLock<Mutex<HashMap<&'static str, Window>>> = OnceLock::new();

/// Returns `Some(suppressed)` if a log for `key` may be written now, where
/// `suppressed` counts the events swallowed since the previous one. Returns
/// `None` (and counts the event) while the current window is still open.
pub fn should_emit(key: &'static str, interval: Duration) -> Option<u64> {
    let mut windows = WINDOWS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let now = Instant::now();

    let Some(window) = windows.get_mut(key) else {
        windows.insert(
            key,
            Window {
                opened_at: now,
                suppressed: 0,
            },
        );
        return Some(0);
    };

    if now.duration_since(window.opened_at) < interval {
        window.suppressed += 1;
        return None;
    }

    let suppressed = std::mem::take(&mut window.suppressed);
    window.opened_at = now;
    Some(suppressed)
}

#[cfg(test)]
mod tests {
    use super::should_emit;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_first_event_passes_then_window_suppresses() {
        let key = "test.log_throttle.window";
        let interval = Duration::from_millis(40);

        assert_eq!(should_emit(key, interval), Some(0));
        assert_eq!(should_emit(key, interval), None);
        assert_eq!(should_emit(key, interval), None);

        sleep(Duration::from_millis(60));
        assert_eq!(should_emit(key, interval), Some(2));
        assert_eq!(should_emit(key, interval), None);
    }

    #[test]
    fn test_keys_are_independent() {
        let interval = Duration::from_secs(60);
        assert_eq!(should_emit("test.log_throttle.a", interval), Some(0));
        assert_eq!(should_emit("test.log_throttle.b", interval), Some(0));
    }
}

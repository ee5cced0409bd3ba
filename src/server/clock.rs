// ABOUTME: Wall-clock timestamp source
// ABOUTME: Provides the epoch-millisecond timestamps embedded in frames

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in milliseconds since the Unix epoch
///
/// Both wire formats stamp frames with this value at encode time. A clock
/// set before 1970 collapses to 0 rather than going negative.
#[inline]
pub fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_past_2020() {
        // 2020-01-01T00:00:00Z in milliseconds
        assert!(unix_millis() > 1_577_836_800_000);
    }

    #[test]
    fn test_clock_non_decreasing() {
        let t1 = unix_millis();
        let t2 = unix_millis();
        assert!(t2 >= t1);
    }
}

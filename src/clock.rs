//! Wall-clock source for handshake timestamps.

use chrono::Utc;

/// Supplies the current time as Unix seconds.
pub trait Clock {
    fn now(&self) -> i64;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now() > 1_577_836_800);
    }
}

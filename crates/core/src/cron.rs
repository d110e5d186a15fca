// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal cron-expression-to-interval parser used by the Server Scheduler.
//! This is intentionally not a general cron engine: it
//! recognizes exactly the two shapes the scheduler cares about and falls
//! back to a conservative default for everything else.

/// Default interval when `schedule_cron` doesn't match a recognized shape.
pub const FALLBACK_INTERVAL_SECONDS: u64 = 6 * 60 * 60;

/// Parse `schedule_cron` into a polling interval in seconds.
///
/// Recognizes:
/// - `0 */N * * *` → N hours
/// - `*/N * * * *` → N minutes
/// - anything else → [`FALLBACK_INTERVAL_SECONDS`] (6 hours)
pub fn cron_to_seconds(schedule_cron: &str) -> u64 {
    let fields: Vec<&str> = schedule_cron.split_whitespace().collect();
    if fields.len() != 5 {
        return FALLBACK_INTERVAL_SECONDS;
    }

    if fields[0] == "0" {
        if let Some(n) = step_value(fields[1]) {
            if fields[2] == "*" && fields[3] == "*" && fields[4] == "*" && n > 0 {
                return u64::from(n) * 3600;
            }
        }
    }

    if let Some(n) = step_value(fields[0]) {
        if fields[1] == "*" && fields[2] == "*" && fields[3] == "*" && fields[4] == "*" && n > 0 {
            return u64::from(n) * 60;
        }
    }

    FALLBACK_INTERVAL_SECONDS
}

/// Parses a `*/N` step expression, returning `N`.
fn step_value(field: &str) -> Option<u32> {
    field.strip_prefix("*/")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        every_2_hours = { "0 */2 * * *", 7200 },
        every_6_hours = { "0 */6 * * *", 21600 },
        every_15_minutes = { "*/15 * * * *", 900 },
        every_5_minutes = { "*/5 * * * *", 300 },
        unrecognized_falls_back = { "30 4 1 * *", FALLBACK_INTERVAL_SECONDS },
        garbage_falls_back = { "not a cron", FALLBACK_INTERVAL_SECONDS },
    )]
    fn parses_expected_interval(expr: &str, expected_seconds: u64) {
        assert_eq!(cron_to_seconds(expr), expected_seconds);
    }

    #[test]
    fn zero_step_falls_back_rather_than_looping_forever() {
        assert_eq!(cron_to_seconds("*/0 * * * *"), FALLBACK_INTERVAL_SECONDS);
    }
}

//! Display formatting for durations and interval countdowns.

use crate::service::types::ServiceInterval;

/// Remaining seconds as a short human string: "36h", "9d", "2w", "3mo", "2y".
/// Zero or negative remainders read "0".
pub fn format_remaining_seconds(seconds: i64) -> String {
    if seconds <= 0 {
        return "0".to_string();
    }
    let hours = seconds / 3600;
    let days = hours / 24;
    if hours < 24 {
        format!("{hours}h")
    } else if days < 14 {
        format!("{days}d")
    } else if days <= 31 {
        format!("{}w", days / 7)
    } else if days <= 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}

/// Parse a human time interval ("2 weeks", "50 hours", "1 month") into
/// seconds. None when the input is not a number plus a known unit.
pub fn parse_interval_time(input: &str) -> Option<i64> {
    let trimmed = input.trim().to_lowercase();
    let mut parts = trimmed.split_whitespace();
    let num: f64 = parts.next()?.parse().ok()?;
    let unit = parts.next()?;
    let seconds_per_unit = if unit.starts_with("hour") {
        3600.0
    } else if unit.starts_with("day") {
        24.0 * 3600.0
    } else if unit.starts_with("week") {
        7.0 * 24.0 * 3600.0
    } else if unit.starts_with("month") {
        30.0 * 24.0 * 3600.0
    } else if unit.starts_with("year") {
        365.0 * 24.0 * 3600.0
    } else {
        return None;
    };
    Some(((num * seconds_per_unit) as i64).max(0))
}

/// Duration as H:MM:SS ("0:12:34", "1:05:00"). Negative durations read as
/// zero.
pub fn format_duration_ms(duration_ms: i64) -> String {
    format_duration_seconds((duration_ms / 1000).max(0))
}

/// Total seconds as H:MM:SS.
pub fn format_duration_seconds(total_seconds: i64) -> String {
    let seconds = total_seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours}:{minutes:02}:{secs:02}")
}

/// Parse a duration string into seconds. Accepts H:MM:SS, M:SS, or plain
/// seconds; None for anything else or any negative field.
pub fn parse_duration_seconds(input: &str) -> Option<i64> {
    let parts: Vec<&str> = input.trim().split(':').map(str::trim).collect();
    let field = |s: &str| -> Option<i64> {
        let n: i64 = s.parse().ok()?;
        (n >= 0).then_some(n)
    };
    match parts.as_slice() {
        [secs] => field(secs),
        [mins, secs] => Some(field(mins)? * 60 + field(secs)?),
        [hours, mins, secs] => Some(field(hours)? * 3600 + field(mins)? * 60 + field(secs)?),
        _ => None,
    }
}

/// Countdown text for an interval: the distance part, the time part, or both
/// joined with a separator ("180km of 250km left · 2w left"). Empty when the
/// interval tracks nothing.
pub fn interval_description(interval: &ServiceInterval) -> String {
    let km_text = if interval.interval_km > 0.0 {
        let remaining = (interval.interval_km - interval.tracked_km).max(0.0);
        Some(format!(
            "{}km of {}km left",
            remaining as i64, interval.interval_km as i64
        ))
    } else {
        None
    };
    let time_text = match interval.interval_time_seconds {
        Some(limit) if limit > 0 => {
            let tracked = interval.tracked_time_seconds.unwrap_or(0);
            let remaining = (limit - tracked).max(0);
            Some(format!("{} left", format_remaining_seconds(remaining)))
        }
        _ => None,
    };
    match (km_text, time_text) {
        (Some(km), Some(time)) => format!("{km} · {time}"),
        (Some(km), None) => km,
        (None, Some(time)) => time,
        (None, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::catalog::time;
    use crate::service::types::ServiceKind;

    #[test]
    fn test_format_remaining_seconds() {
        assert_eq!(format_remaining_seconds(0), "0");
        assert_eq!(format_remaining_seconds(-100), "0");
        assert_eq!(format_remaining_seconds(3 * 3600), "3h");
        assert_eq!(format_remaining_seconds(5 * 24 * 3600), "5d");
        assert_eq!(format_remaining_seconds(time::TWO_WEEKS), "2w");
        assert_eq!(format_remaining_seconds(time::THREE_MONTHS), "3mo");
        assert_eq!(format_remaining_seconds(time::FIFTY_HOURS), "50h");
        assert_eq!(format_remaining_seconds(time::THREE_YEARS), "3y");
    }

    #[test]
    fn test_parse_interval_time() {
        assert_eq!(parse_interval_time("2 weeks"), Some(time::TWO_WEEKS));
        assert_eq!(parse_interval_time("50 hours"), Some(time::FIFTY_HOURS));
        assert_eq!(parse_interval_time("1 month"), Some(30 * 24 * 3600));
        assert_eq!(parse_interval_time("1.5 hours"), Some(5400));
        assert_eq!(parse_interval_time("  3 Days "), Some(3 * 24 * 3600));
        assert_eq!(parse_interval_time("weeks"), None);
        assert_eq!(parse_interval_time("2 fortnights"), None);
        assert_eq!(parse_interval_time(""), None);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration_ms(754_000), "0:12:34");
        assert_eq!(format_duration_ms(3_900_000), "1:05:00");
        assert_eq!(format_duration_ms(-1_000), "0:00:00");
        assert_eq!(format_duration_seconds(3661), "1:01:01");
    }

    #[test]
    fn test_parse_duration_seconds() {
        assert_eq!(parse_duration_seconds("1:30:00"), Some(5400));
        assert_eq!(parse_duration_seconds("0:45:30"), Some(2730));
        assert_eq!(parse_duration_seconds("45:30"), Some(2730));
        assert_eq!(parse_duration_seconds("90"), Some(90));
        assert_eq!(parse_duration_seconds("-1:00:00"), None);
        assert_eq!(parse_duration_seconds("1:2:3:4"), None);
        assert_eq!(parse_duration_seconds("abc"), None);
    }

    #[test]
    fn test_interval_description() {
        let mut interval = ServiceInterval::new(1, "Inspect", 250.0, ServiceKind::Inspection)
            .with_time(time::TWO_WEEKS);
        interval.tracked_km = 70.0;
        assert_eq!(interval_description(&interval), "180km of 250km left · 2w left");

        let distance_only = ServiceInterval::new(1, "Replace", 3500.0, ServiceKind::Replace);
        assert_eq!(interval_description(&distance_only), "3500km of 3500km left");

        let mut time_only =
            ServiceInterval::new(1, "Top-up", 0.0, ServiceKind::Inspection).with_time(time::THREE_MONTHS);
        time_only.tracked_time_seconds = Some(time::THREE_MONTHS);
        assert_eq!(interval_description(&time_only), "0 left");
    }

    #[test]
    fn test_overdue_clamps_at_zero_remaining() {
        let mut interval = ServiceInterval::new(1, "Replace", 2000.0, ServiceKind::Replace);
        interval.tracked_km = 2_500.0;
        assert_eq!(interval_description(&interval), "0km of 2000km left");
    }
}

use chrono::{DateTime, Duration, FixedOffset, Timelike};

/// Format an instant as a 24-hour clock without the leading zero ("5:12", "17:10").
pub fn format_clock(t: DateTime<FixedOffset>) -> String {
    format!("{}:{:02}", t.hour(), t.minute())
}

/// Format a countdown as "H:MM:SS"; negative durations clamp to zero.
pub fn format_countdown(remaining: Duration) -> String {
    let secs = remaining.num_seconds().max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}

/// Coarse "Xh Ym" / "Ym" form of a duration in seconds; "now" once it has passed.
pub fn format_duration_secs(secs: i64) -> String {
    if secs <= 0 {
        return "now".to_string();
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_clock_strips_leading_zero() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let t = utc.with_ymd_and_hms(2024, 1, 1, 5, 2, 0).unwrap();
        assert_eq!(format_clock(t), "5:02");
        let t = utc.with_ymd_and_hms(2024, 1, 1, 17, 10, 0).unwrap();
        assert_eq!(format_clock(t), "17:10");
        let t = utc.with_ymd_and_hms(2024, 1, 1, 0, 15, 0).unwrap();
        assert_eq!(format_clock(t), "0:15");
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(Duration::minutes(140)), "2:20:00");
        assert_eq!(format_countdown(Duration::seconds(59)), "0:00:59");
        assert_eq!(format_countdown(Duration::seconds(-3)), "0:00:00");
        assert_eq!(format_countdown(Duration::hours(25)), "25:00:00");
    }

    #[test]
    fn test_format_duration_secs() {
        assert_eq!(format_duration_secs(0), "now");
        assert_eq!(format_duration_secs(-30), "now");
        assert_eq!(format_duration_secs(8400), "2h 20m");
        assert_eq!(format_duration_secs(300), "5m");
    }
}

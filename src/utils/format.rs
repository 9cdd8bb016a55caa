/// Countdown display: `MM:SS`, or `H:MM:SS` from one hour up.
pub fn format_clock(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Workout duration display: `45 min`, `1h 05m`.
pub fn format_elapsed(minutes: u64) -> String {
    if minutes < 60 {
        format!("{minutes} min")
    } else {
        format!("{}h {:02}m", minutes / 60, minutes % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pads_minutes_and_seconds() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(45), "00:45");
        assert_eq!(format_clock(90), "01:30");
        assert_eq!(format_clock(3599), "59:59");
        assert_eq!(format_clock(3661), "1:01:01");
    }

    #[test]
    fn elapsed_switches_to_hours() {
        assert_eq!(format_elapsed(0), "0 min");
        assert_eq!(format_elapsed(59), "59 min");
        assert_eq!(format_elapsed(60), "1h 00m");
        assert_eq!(format_elapsed(125), "2h 05m");
    }
}

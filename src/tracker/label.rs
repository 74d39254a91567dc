use chrono::{DateTime, Utc};

pub const PASSING_LABEL: &str = "NOW";
pub const UNKNOWN_LABEL: &str = "--:--";

/// Countdown text for the next pass: `42m`, `3h 7m`, or a UTC clock time
/// when more than a day away.
pub fn next_pass_label(pass_start: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(start) = pass_start else {
        return UNKNOWN_LABEL.to_string();
    };

    let minutes = (start - now).num_milliseconds().div_euclid(60_000);
    if minutes < 60 {
        format!("{}m", minutes.max(0))
    } else if minutes < 1440 {
        format!("{}h {}m", minutes / 60, minutes % 60)
    } else {
        format!("{} UTC", start.format("%H:%M"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn formats_countdowns() {
        let now = now();
        assert_eq!(next_pass_label(None, now), "--:--");
        assert_eq!(next_pass_label(Some(now), now), "0m");
        assert_eq!(
            next_pass_label(Some(now + Duration::seconds(59 * 60 + 59)), now),
            "59m"
        );
        assert_eq!(
            next_pass_label(Some(now + Duration::minutes(60)), now),
            "1h 0m"
        );
        assert_eq!(
            next_pass_label(Some(now + Duration::minutes(187)), now),
            "3h 7m"
        );
        assert_eq!(
            next_pass_label(Some(now + Duration::minutes(1440 + 95)), now),
            "13:35 UTC"
        );
    }
}

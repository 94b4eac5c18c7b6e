use chrono::{DateTime, Local, Utc};

use crate::services::settings::Locale;

/// Render `at` relative to `now` for the sidebar.
///
/// Thresholds: under a minute, under an hour, under a day, exactly one day,
/// under a week. Anything older becomes a calendar date in the locale's
/// format, on the local calendar. Instants in the future count as "just now".
pub fn format_relative(at: DateTime<Utc>, now: DateTime<Utc>, locale: Locale) -> String {
    let diff = now.signed_duration_since(at);
    let minutes = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();

    if minutes < 1 {
        return match locale {
            Locale::English => "just now".to_string(),
            Locale::Vietnamese => "Vừa xong".to_string(),
        };
    }
    if minutes < 60 {
        return match locale {
            Locale::English => plural(minutes, "minute"),
            Locale::Vietnamese => format!("{} phút trước", minutes),
        };
    }
    if hours < 24 {
        return match locale {
            Locale::English => plural(hours, "hour"),
            Locale::Vietnamese => format!("{} giờ trước", hours),
        };
    }
    if days == 1 {
        return match locale {
            Locale::English => "yesterday".to_string(),
            Locale::Vietnamese => "Hôm qua".to_string(),
        };
    }
    if days < 7 {
        return match locale {
            Locale::English => plural(days, "day"),
            Locale::Vietnamese => format!("{} ngày trước", days),
        };
    }

    let local = at.with_timezone(&Local);
    match locale {
        Locale::English => local.format("%m/%d/%Y").to_string(),
        Locale::Vietnamese => local.format("%-d/%-m/%Y").to_string(),
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap()
    }

    fn ago(d: Duration) -> String {
        format_relative(now() - d, now(), Locale::English)
    }

    #[test]
    fn test_minute_threshold() {
        assert_eq!(ago(Duration::seconds(0)), "just now");
        assert_eq!(ago(Duration::seconds(59)), "just now");
        assert_eq!(ago(Duration::seconds(60)), "1 minute ago");
        assert_eq!(ago(Duration::minutes(59)), "59 minutes ago");
    }

    #[test]
    fn test_hour_threshold() {
        assert_eq!(ago(Duration::minutes(60)), "1 hour ago");
        assert_eq!(ago(Duration::hours(5)), "5 hours ago");
        assert_eq!(ago(Duration::hours(23) + Duration::minutes(59)), "23 hours ago");
    }

    #[test]
    fn test_day_thresholds() {
        assert_eq!(ago(Duration::hours(24)), "yesterday");
        assert_eq!(ago(Duration::hours(47)), "yesterday");
        assert_eq!(ago(Duration::days(2)), "2 days ago");
        assert_eq!(ago(Duration::days(6) + Duration::hours(23)), "6 days ago");
    }

    #[test]
    fn test_older_than_a_week_is_a_date() {
        let week = (now() - Duration::days(7)).with_timezone(&Local);
        assert_eq!(ago(Duration::days(7)), week.format("%m/%d/%Y").to_string());

        let month = (now() - Duration::days(30)).with_timezone(&Local);
        assert_eq!(
            format_relative(now() - Duration::days(30), now(), Locale::Vietnamese),
            format!("{}/{}/{}", month.day(), month.month(), month.year())
        );
    }

    #[test]
    fn test_future_is_just_now() {
        assert_eq!(
            format_relative(now() + Duration::hours(3), now(), Locale::English),
            "just now"
        );
    }

    #[test]
    fn test_vietnamese_labels() {
        let vi = |d: Duration| format_relative(now() - d, now(), Locale::Vietnamese);
        assert_eq!(vi(Duration::seconds(10)), "Vừa xong");
        assert_eq!(vi(Duration::minutes(5)), "5 phút trước");
        assert_eq!(vi(Duration::hours(2)), "2 giờ trước");
        assert_eq!(vi(Duration::days(1)), "Hôm qua");
        assert_eq!(vi(Duration::days(3)), "3 ngày trước");
    }
}

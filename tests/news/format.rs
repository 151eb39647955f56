use chrono::{Duration, TimeZone, Utc};
use finnews_rs::format_relative;

#[test]
fn relative_publish_times() {
    let now = Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap();
    let ago = |d: Duration| format_relative(now - d, now);

    assert_eq!(ago(Duration::seconds(5)), "just now");
    assert_eq!(ago(Duration::seconds(-30)), "just now");
    assert_eq!(ago(Duration::minutes(1)), "1 minute ago");
    assert_eq!(ago(Duration::minutes(5)), "5 minutes ago");
    assert_eq!(ago(Duration::hours(3)), "3 hours ago");
    assert_eq!(ago(Duration::days(1)), "1 day ago");
    assert_eq!(ago(Duration::days(2)), "2 days ago");
    assert_eq!(ago(Duration::days(65)), "2 months ago");
    assert_eq!(ago(Duration::days(800)), "2 years ago");
}

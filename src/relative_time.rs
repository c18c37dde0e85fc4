//! "n mins ago" style rendering of timestamps.

use chrono::{DateTime, Utc};

/// Render how long ago `then` was, relative to `now`.
///
/// Anything under a minute (including clock skew into the future) reads as
/// "< 1 min ago".
pub fn format_relative(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let elapsed = now.signed_duration_since(then);

  let minutes = elapsed.num_minutes();
  if minutes < 1 {
    return "< 1 min ago".to_string();
  }
  if minutes < 60 {
    return ago(minutes, "min");
  }

  let hours = elapsed.num_hours();
  if hours < 24 {
    return ago(hours, "hour");
  }

  ago(elapsed.num_days(), "day")
}

fn ago(n: i64, unit: &str) -> String {
  if n == 1 {
    format!("1 {} ago", unit)
  } else {
    format!("{} {}s ago", n, unit)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, TimeZone};

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
  }

  #[test]
  fn test_under_a_minute() {
    assert_eq!(format_relative(now() - Duration::seconds(30), now()), "< 1 min ago");
  }

  #[test]
  fn test_future_timestamp() {
    assert_eq!(format_relative(now() + Duration::minutes(5), now()), "< 1 min ago");
  }

  #[test]
  fn test_minutes() {
    assert_eq!(format_relative(now() - Duration::minutes(1), now()), "1 min ago");
    assert_eq!(format_relative(now() - Duration::minutes(27), now()), "27 mins ago");
  }

  #[test]
  fn test_hours() {
    assert_eq!(format_relative(now() - Duration::minutes(60), now()), "1 hour ago");
    assert_eq!(format_relative(now() - Duration::hours(2), now()), "2 hours ago");
  }

  #[test]
  fn test_days() {
    assert_eq!(format_relative(now() - Duration::hours(49), now()), "2 days ago");
  }
}

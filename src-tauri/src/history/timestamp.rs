use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

/// Epoch values below this are seconds, at or above it milliseconds.
/// 10^12 seconds is year ~33658, so no realistic seconds value crosses it.
const EPOCH_MILLIS_THRESHOLD: f64 = 1e12;

/// Parse a raw timestamp value as servers actually send them.
///
/// Numbers are epoch seconds or milliseconds (split at 10^12). Strings allow
/// a space instead of `T`, over-long fractional seconds, and a missing
/// timezone marker, which means UTC. Anything unparsable is `None`, never an
/// error.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => parse_epoch(n.as_f64()?),
        Value::String(s) => parse_timestamp_str(s),
        _ => None,
    }
}

fn parse_epoch(raw: f64) -> Option<DateTime<Utc>> {
    if !raw.is_finite() {
        return None;
    }
    let millis = if raw < EPOCH_MILLIS_THRESHOLD {
        raw * 1000.0
    } else {
        raw
    };
    DateTime::from_timestamp_millis(millis as i64)
}

/// Parse a timestamp string, normalizing the shapes seen in the wild.
pub fn parse_timestamp_str(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut normalized = truncate_fraction(&trimmed.replacen(' ', "T", 1));
    if !has_timezone_suffix(&normalized) {
        normalized.push('Z');
    }

    DateTime::parse_from_rfc3339(&normalized)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Keep at most three fractional-second digits; parsers reject longer runs.
fn truncate_fraction(text: &str) -> String {
    let Some(dot) = text.find('.') else {
        return text.to_string();
    };
    let digits = text[dot + 1..]
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits <= 3 {
        return text.to_string();
    }
    format!(
        "{}{}{}",
        &text[..dot + 1],
        &text[dot + 1..dot + 4],
        &text[dot + 1 + digits..]
    )
}

/// True when the string already ends in `Z` or a numeric UTC offset.
fn has_timezone_suffix(text: &str) -> bool {
    let bytes = text.as_bytes();
    if matches!(bytes.last(), Some(b'Z') | Some(b'z')) {
        return true;
    }

    // Trailing +HH:MM / -HH:MM, or the colon-less +HHMM form.
    let offset_at = |len: usize, colon: Option<usize>| -> bool {
        if bytes.len() < len + 1 {
            return false;
        }
        let tail = &bytes[bytes.len() - len..];
        if tail[0] != b'+' && tail[0] != b'-' {
            return false;
        }
        tail.iter().enumerate().skip(1).all(|(i, b)| match colon {
            Some(c) if i == c => *b == b':',
            _ => b.is_ascii_digit(),
        })
    };

    offset_at(6, Some(3)) || offset_at(5, None)
}

/// Calendar day of `instant` as seen from `tz`, the grouping key.
pub fn day_in<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Day heading like "Tuesday, March 5, 2024".
pub fn day_label<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant
        .with_timezone(tz)
        .format("%A, %B %-d, %Y")
        .to_string()
}

/// Clock label like "6:05 PM".
pub fn time_label<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant.with_timezone(tz).format("%-I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_seconds_and_millis_agree() {
        let from_secs = parse_timestamp(&serde_json::json!(1_700_000_000_i64)).unwrap();
        let from_millis = parse_timestamp(&serde_json::json!(1_700_000_000_000_i64)).unwrap();
        assert_eq!(from_secs, from_millis);
        assert_eq!(from_secs.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_missing_timezone_assumes_utc() {
        let bare = parse_timestamp_str("2024-01-01T12:00:00").unwrap();
        let explicit = parse_timestamp_str("2024-01-01T12:00:00Z").unwrap();
        assert_eq!(bare, explicit);
    }

    #[test]
    fn test_space_separator_accepted() {
        let spaced = parse_timestamp_str("2024-03-01 18:30:00").unwrap();
        assert_eq!(spaced, parse_timestamp_str("2024-03-01T18:30:00Z").unwrap());
    }

    #[test]
    fn test_long_fraction_truncated_to_millis() {
        let dt = parse_timestamp_str("2024-03-01T18:30:00.123456789").unwrap();
        assert_eq!(dt.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn test_explicit_offset_respected() {
        let dt = parse_timestamp_str("2024-03-01T12:00:00+02:00").unwrap();
        assert_eq!(dt, parse_timestamp_str("2024-03-01T10:00:00Z").unwrap());
    }

    #[test]
    fn test_unparsable_inputs_are_none() {
        assert!(parse_timestamp_str("").is_none());
        assert!(parse_timestamp_str("yesterday-ish").is_none());
        // Numeric strings are not epochs; only JSON numbers take that path.
        assert!(parse_timestamp_str("1700000000").is_none());
        assert!(parse_timestamp(&serde_json::json!(null)).is_none());
        assert!(parse_timestamp(&serde_json::json!(["2024"])).is_none());
    }

    #[test]
    fn test_day_in_respects_zone() {
        let instant = parse_timestamp_str("2024-01-01T23:30:00Z").unwrap();
        let utc_day = day_in(&instant, &Utc);
        let ahead = chrono::FixedOffset::east_opt(2 * 3600).unwrap();
        let ahead_day = day_in(&instant, &ahead);

        assert_eq!(utc_day.to_string(), "2024-01-01");
        assert_eq!(ahead_day.to_string(), "2024-01-02");
    }

    #[test]
    fn test_labels_format() {
        let instant = parse_timestamp_str("2024-03-05T18:05:00Z").unwrap();
        assert_eq!(day_label(&instant, &Utc), "Tuesday, March 5, 2024");
        assert_eq!(time_label(&instant, &Utc), "6:05 PM");
    }
}

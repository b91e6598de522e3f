//! Payload-token coercion into Go literal expressions.
//!
//! Coercion never fails: an unparsable token yields the declared type's
//! zero value. That leniency is deliberate and load-bearing for output
//! compatibility; one bad token must not take down the rest of the group.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::TypeTag;

/// Render one payload token as a Go expression for the declared tag.
pub fn coerce(tag: TypeTag, raw: &str) -> String {
    let raw = raw.trim();
    match tag {
        TypeTag::Int | TypeTag::Int64 => render_i64(raw.parse::<i64>().unwrap_or(0)),
        TypeTag::Int8 => render_i64(raw.parse::<i8>().unwrap_or(0) as i64),
        TypeTag::Int16 => render_i64(raw.parse::<i16>().unwrap_or(0) as i64),
        TypeTag::Int32 => render_i64(raw.parse::<i32>().unwrap_or(0) as i64),
        TypeTag::Uint | TypeTag::Uint64 => render_u64(raw.parse::<u64>().unwrap_or(0)),
        TypeTag::Uint8 => render_u64(raw.parse::<u8>().unwrap_or(0) as u64),
        TypeTag::Uint16 => render_u64(raw.parse::<u16>().unwrap_or(0) as u64),
        TypeTag::Uint32 => render_u64(raw.parse::<u32>().unwrap_or(0) as u64),
        TypeTag::Float32 => render_float(raw.parse::<f32>().unwrap_or(0.0) as f64),
        TypeTag::Float64 => render_float(raw.parse::<f64>().unwrap_or(0.0)),
        TypeTag::Bool => {
            // Case-sensitive on purpose; "True" is not a bool here.
            if raw == "true" { "true".to_string() } else { "false".to_string() }
        }
        TypeTag::String => quote_go(raw),
        TypeTag::Duration => render_duration(parse_go_duration(raw).unwrap_or(0)),
        TypeTag::Time => {
            let ts = parse_timestamp(raw).unwrap_or_else(zero_time);
            format!(
                "mustParseTime({})",
                quote_go(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            )
        }
    }
}

fn render_i64(v: i64) -> String {
    v.to_string()
}

fn render_u64(v: u64) -> String {
    v.to_string()
}

/// Go float literals need a decimal point or exponent to stay floats.
fn render_float(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') || s.contains('e') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{s}.0")
    }
}

/// Quote a string for Go source, escaping the characters that matter.
pub fn quote_go(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

// ----------------------------- Durations ---------------------------------- //

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: i64 = 60 * NANOS_PER_MINUTE;

static DURATION_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+(?:\.[0-9]+)?)(ns|us|µs|μs|ms|s|m|h)").unwrap());

/// Parse Go duration syntax (`300ms`, `2h45m`, `1.5h`, optional sign) into
/// nanoseconds. `None` when the text is not a duration.
pub fn parse_go_duration(raw: &str) -> Option<i64> {
    let mut s = raw.trim();
    let mut neg = false;
    if let Some(rest) = s.strip_prefix('-') {
        neg = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }
    if s == "0" {
        return Some(0);
    }
    if s.is_empty() {
        return None;
    }

    let mut total = 0f64;
    while !s.is_empty() {
        let caps = DURATION_SEGMENT.captures(s)?;
        let value: f64 = caps[1].parse().ok()?;
        let unit = match &caps[2] {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return None,
        };
        total += value * unit;
        let consumed = caps.get(0)?.end();
        s = &s[consumed..];
    }

    let ns = total as i64;
    Some(if neg { -ns } else { ns })
}

/// Re-render nanoseconds as the largest whole unit that evenly divides:
/// hours, else minutes, else seconds, else a raw nanosecond cast.
pub fn render_duration(ns: i64) -> String {
    if ns % NANOS_PER_HOUR == 0 {
        format!("{} * time.Hour", ns / NANOS_PER_HOUR)
    } else if ns % NANOS_PER_MINUTE == 0 {
        format!("{} * time.Minute", ns / NANOS_PER_MINUTE)
    } else if ns % NANOS_PER_SECOND == 0 {
        format!("{} * time.Second", ns / NANOS_PER_SECOND)
    } else {
        format!("time.Duration({ns})")
    }
}

// ----------------------------- Timestamps --------------------------------- //

/// Named-zone formats parsed as naive datetimes with the zone word
/// stripped; chrono cannot resolve zone abbreviations, so UTC is assumed.
const NAIVE_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S",  // RFC1123 sans zone
    "%d %b %y %H:%M:%S",      // RFC822 with seconds, sans zone
    "%d %b %y %H:%M",         // RFC822 sans zone
    "%A, %d-%b-%y %H:%M:%S",  // RFC850 sans zone
];

/// Try the fixed format sequence: RFC3339 (covers the nano variant),
/// date-only, RFC1123Z/RFC822Z via RFC2822, then the named-zone forms.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let stripped = strip_zone_word(raw);
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(stripped, fmt) {
            return Some(dt.and_utc());
        }
    }
    None
}

/// Drop a trailing all-alphabetic zone word ("GMT", "UTC", "PST", ...).
fn strip_zone_word(s: &str) -> &str {
    match s.rsplit_once(' ') {
        Some((head, tail))
            if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            head.trim_end()
        }
        _ => s,
    }
}

/// Go's zero time: 0001-01-01T00:00:00Z.
fn zero_time() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_default_to_zero() {
        assert_eq!(coerce(TypeTag::Int, "42"), "42");
        assert_eq!(coerce(TypeTag::Int, "-7"), "-7");
        assert_eq!(coerce(TypeTag::Int, "nope"), "0");
        assert_eq!(coerce(TypeTag::Int8, "300"), "0"); // out of range for i8
        assert_eq!(coerce(TypeTag::Uint, "-1"), "0");
        assert_eq!(coerce(TypeTag::Uint16, "65535"), "65535");
    }

    #[test]
    fn floats_keep_a_decimal_point() {
        assert_eq!(coerce(TypeTag::Float64, "0.378"), "0.378");
        assert_eq!(coerce(TypeTag::Float64, "5"), "5.0");
        assert_eq!(coerce(TypeTag::Float64, "junk"), "0.0");
        assert_eq!(coerce(TypeTag::Float32, "1.5"), "1.5");
    }

    #[test]
    fn bools_are_case_sensitive() {
        assert_eq!(coerce(TypeTag::Bool, "true"), "true");
        assert_eq!(coerce(TypeTag::Bool, "True"), "false");
        assert_eq!(coerce(TypeTag::Bool, "yes"), "false");
    }

    #[test]
    fn strings_are_quoted_verbatim() {
        assert_eq!(coerce(TypeTag::String, "closest to the sun"), "\"closest to the sun\"");
        assert_eq!(coerce(TypeTag::String, ""), "\"\"");
        assert_eq!(coerce(TypeTag::String, "say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn duration_parse_and_units() {
        assert_eq!(parse_go_duration("90s"), Some(90 * NANOS_PER_SECOND));
        assert_eq!(parse_go_duration("2h45m"), Some(2 * NANOS_PER_HOUR + 45 * NANOS_PER_MINUTE));
        assert_eq!(parse_go_duration("1.5h"), Some(90 * NANOS_PER_MINUTE));
        assert_eq!(parse_go_duration("-90m"), Some(-90 * NANOS_PER_MINUTE));
        assert_eq!(parse_go_duration("300ms"), Some(300_000_000));
        assert_eq!(parse_go_duration("0"), Some(0));
        assert_eq!(parse_go_duration("five minutes"), None);
        assert_eq!(parse_go_duration("90"), None); // unit required
    }

    #[test]
    fn duration_renders_largest_even_unit() {
        assert_eq!(coerce(TypeTag::Duration, "2h"), "2 * time.Hour");
        assert_eq!(coerce(TypeTag::Duration, "90m"), "90 * time.Minute");
        assert_eq!(coerce(TypeTag::Duration, "1.5h"), "90 * time.Minute");
        assert_eq!(coerce(TypeTag::Duration, "90s"), "90 * time.Second");
        assert_eq!(coerce(TypeTag::Duration, "300ms"), "time.Duration(300000000)");
        assert_eq!(coerce(TypeTag::Duration, "bogus"), "0 * time.Hour");
    }

    #[test]
    fn timestamp_formats_in_order() {
        assert_eq!(
            coerce(TypeTag::Time, "2024-03-01T12:30:00Z"),
            "mustParseTime(\"2024-03-01T12:30:00Z\")"
        );
        assert_eq!(
            coerce(TypeTag::Time, "2024-03-01"),
            "mustParseTime(\"2024-03-01T00:00:00Z\")"
        );
        assert_eq!(
            coerce(TypeTag::Time, "Fri, 01 Mar 2024 12:30:00 +0000"),
            "mustParseTime(\"2024-03-01T12:30:00Z\")"
        );
        assert_eq!(
            coerce(TypeTag::Time, "Fri, 01 Mar 2024 12:30:00 GMT"),
            "mustParseTime(\"2024-03-01T12:30:00Z\")"
        );
    }

    #[test]
    fn timestamp_defaults_to_go_zero_time() {
        assert_eq!(
            coerce(TypeTag::Time, "not a time"),
            "mustParseTime(\"0001-01-01T00:00:00Z\")"
        );
    }

    #[test]
    fn fractional_seconds_round_trip() {
        let got = coerce(TypeTag::Time, "2024-03-01T12:30:00.250Z");
        assert_eq!(got, "mustParseTime(\"2024-03-01T12:30:00.250Z\")");
    }
}

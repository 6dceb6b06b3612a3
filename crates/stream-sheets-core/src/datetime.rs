//! ISO 8601 parsing for machine-readable date and time attributes

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Parse an ISO 8601 date or date-time (`2016-05-19`, `2016-05-19T16:39:00`,
/// `2016-05-19T16:39:00.250`). A trailing `Z` or `±HH:MM` offset is accepted
/// and ignored: values are returned in the wall-clock time the file stores.
pub fn parse_iso_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    let body = strip_zone(raw);
    NaiveDateTime::parse_from_str(body, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(body, "%Y-%m-%dT%H:%M"))
        .ok()
}

fn strip_zone(raw: &str) -> &str {
    if let Some(stripped) = raw.strip_suffix('Z') {
        return stripped;
    }
    let bytes = raw.as_bytes();
    let len = bytes.len();
    if raw.contains('T')
        && len > 6
        && matches!(bytes[len - 6], b'+' | b'-')
        && bytes[len - 3] == b':'
    {
        return &raw[..len - 6];
    }
    raw
}

/// Parse an ISO 8601 duration (`PT13H24M00S`, `P1DT2H`, `-PT0.5S`).
///
/// Years and months have no fixed length, so they are only accepted when zero.
pub fn parse_iso_duration(raw: &str) -> Option<Duration> {
    let mut s = raw.trim();
    let negative = s.starts_with('-');
    if negative {
        s = &s[1..];
    }
    let s = s.strip_prefix('P')?;
    let (date_part, time_part) = match s.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (s, None),
    };

    let mut seconds: i64 = 0;
    let mut nanos: i64 = 0;
    let mut components = 0;

    for (value, designator) in components_of(date_part)? {
        let whole = parse_whole(value)?;
        let factor = match designator {
            'Y' | 'M' if whole == 0 => 0,
            'W' => 7 * 86_400,
            'D' => 86_400,
            _ => return None,
        };
        seconds = seconds.checked_add(whole.checked_mul(factor)?)?;
        components += 1;
    }

    if let Some(time_part) = time_part {
        let time_components = components_of(time_part)?;
        if time_components.is_empty() {
            return None;
        }
        for (value, designator) in time_components {
            match designator {
                'H' => seconds = seconds.checked_add(parse_whole(value)?.checked_mul(3600)?)?,
                'M' => seconds = seconds.checked_add(parse_whole(value)?.checked_mul(60)?)?,
                'S' => {
                    let (whole, fraction) = match value.split_once(['.', ',']) {
                        Some((whole, fraction)) => (whole, fraction),
                        None => (value, ""),
                    };
                    seconds = seconds.checked_add(parse_whole(whole)?)?;
                    nanos = parse_fraction_nanos(fraction)?;
                }
                _ => return None,
            }
            components += 1;
        }
    }

    if components == 0 {
        return None;
    }

    let duration = Duration::try_seconds(seconds)?.checked_add(&Duration::nanoseconds(nanos))?;
    Some(if negative { -duration } else { duration })
}

/// Split `1D2H` style text into `(number, designator)` pairs
fn components_of(part: &str) -> Option<Vec<(&str, char)>> {
    let mut components = Vec::new();
    let mut start = 0;
    for (i, c) in part.char_indices() {
        if c.is_ascii_alphabetic() {
            if i == start {
                return None;
            }
            components.push((&part[start..i], c));
            start = i + 1;
        }
    }
    if start != part.len() {
        return None;
    }
    Some(components)
}

fn parse_whole(value: &str) -> Option<i64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn parse_fraction_nanos(fraction: &str) -> Option<i64> {
    if fraction.is_empty() {
        return Some(0);
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits: String = fraction.chars().chain(std::iter::repeat('0')).take(9).collect();
    digits.parse().ok()
}

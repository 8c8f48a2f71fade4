//! Datetime literal parsing for the `date(..)`, `time(..)`, and
//! `datetime(.. [options])` comparator forms, grounded on
//! `dlquery.validation.DatetimeValidation` (`parse_custom_date`,
//! `get_default_datetime_format`, `apply_skips`, `compare_datetime`).

use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static OPTION_KEYWORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|\s)(format|skips|timezone|iso|dayfirst|fuzzy)\s*=").unwrap());

const DEFAULT_DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%m-%d-%Y", "%Y-%m-%d", "%b %d %Y", "%d %b %Y"];
const DEFAULT_DAYFIRST_DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d", "%d %b %Y"];
const DEFAULT_TIME_FORMATS: &[&str] = &[
    "%H:%M:%S%.f",
    "%H:%M:%S",
    "%I:%M:%S %p",
    "%I:%M %p",
    "%H:%M",
];

/// Full datetime templates where the year doesn't sit adjacent to the rest
/// of the date (e.g. `Jun 14 11:30 PM 2021`), so the plain `{date} {time}`
/// cross product below can't express them.
const DEFAULT_MONTH_NAME_DATETIME_FORMATS: &[&str] = &[
    "%b %d %I:%M %p %Y",
    "%b %d %I:%M:%S %p %Y",
    "%b %d %H:%M:%S %Y",
    "%b %d %Y %I:%M %p",
    "%b %d %Y %H:%M:%S",
    "%d %b %Y %I:%M %p",
    "%d %b %Y %H:%M:%S",
];

#[derive(Debug, Default, Clone)]
pub struct DatetimeOptions {
    pub formats: Vec<String>,
    pub skips: Vec<String>,
    pub timezones: HashMap<String, i32>,
    pub iso: bool,
    pub dayfirst: bool,
    pub fuzzy: bool,
}

/// Parse the trailing ` key=value key=value` option bag that may follow a
/// `datetime(..)` literal's text. Keys recognized: `format`, `skips`,
/// `timezone`, `iso`, `dayfirst`, `fuzzy`. List-valued keys accept a
/// comma-separated value, e.g. `format=%Y-%m-%d,%m/%d/%Y`.
pub fn parse_options(raw: &str) -> DatetimeOptions {
    let mut opts = DatetimeOptions::default();
    let matches: Vec<(usize, usize, String)> = OPTION_KEYWORD_RE
        .captures_iter(raw)
        .map(|c| {
            let whole = c.get(0).unwrap();
            let key = c.get(1).unwrap().as_str().to_ascii_lowercase();
            (whole.start(), whole.end(), key)
        })
        .collect();

    for (i, (_start, end, key)) in matches.iter().enumerate() {
        let value_end = matches.get(i + 1).map(|(s, _, _)| *s).unwrap_or(raw.len());
        let value = raw[*end..value_end].trim();
        match key.as_str() {
            "format" => opts
                .formats
                .extend(value.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty())),
            "skips" => opts
                .skips
                .extend(value.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty())),
            "timezone" => {
                for entry in value.split(',') {
                    if let Some((name, offset)) = entry.split_once(':') {
                        if let Ok(secs) = offset.trim().parse::<i32>() {
                            opts.timezones.insert(name.trim().to_string(), secs);
                        }
                    }
                }
            }
            "iso" => opts.iso = value.eq_ignore_ascii_case("true"),
            "dayfirst" => opts.dayfirst = value.eq_ignore_ascii_case("true"),
            "fuzzy" => opts.fuzzy = value.eq_ignore_ascii_case("true"),
            _ => {}
        }
    }
    opts
}

/// Strip every configured skip token from `s` (literal substring match,
/// falling back to a best-effort regex if the token itself is a pattern).
fn apply_skips(s: &str, skips: &[String]) -> String {
    let mut out = s.to_string();
    for skip in skips {
        if let Ok(re) = regex::Regex::new(skip) {
            out = re.replace_all(&out, "").to_string();
        } else {
            out = out.replace(skip.as_str(), "");
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn try_formats(s: &str, formats: &[&str]) -> Option<NaiveDateTime> {
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    None
}

fn try_date_formats(s: &str, dayfirst: bool) -> Option<NaiveDate> {
    let formats = if dayfirst {
        DEFAULT_DAYFIRST_DATE_FORMATS
    } else {
        DEFAULT_DATE_FORMATS
    };
    for fmt in formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

fn try_time_formats(s: &str) -> Option<NaiveTime> {
    for fmt in DEFAULT_TIME_FORMATS {
        if let Ok(t) = NaiveTime::parse_from_str(s, fmt) {
            return Some(t);
        }
    }
    None
}

/// Parse a `date(..)` literal.
pub fn parse_date(raw: &str, opts: &DatetimeOptions) -> Result<NaiveDate> {
    let cleaned = apply_skips(raw.trim(), &opts.skips);
    for fmt in &opts.formats {
        if let Ok(d) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return Ok(d);
        }
    }
    try_date_formats(&cleaned, opts.dayfirst)
        .ok_or_else(|| Error::PredicateArgument(format!("cannot parse date {raw:?}")))
}

/// Parse a `time(..)` literal.
pub fn parse_time(raw: &str, opts: &DatetimeOptions) -> Result<NaiveTime> {
    let cleaned = apply_skips(raw.trim(), &opts.skips);
    for fmt in &opts.formats {
        if let Ok(t) = NaiveTime::parse_from_str(&cleaned, fmt) {
            return Ok(t);
        }
    }
    try_time_formats(&cleaned)
        .ok_or_else(|| Error::PredicateArgument(format!("cannot parse time {raw:?}")))
}

/// Parse a `datetime(.. [options])` literal into a fixed-offset instant.
/// Literals without an explicit timezone are treated as UTC.
pub fn parse_datetime(raw: &str, opts: &DatetimeOptions) -> Result<DateTime<FixedOffset>> {
    let cleaned = apply_skips(raw.trim(), &opts.skips);

    if opts.iso {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&cleaned) {
            return Ok(dt);
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(&cleaned, "%Y-%m-%dT%H:%M:%S") {
            return Ok(FixedOffset::east_opt(0).unwrap().from_utc_datetime(&naive));
        }
    }

    let explicit: Vec<&str> = opts.formats.iter().map(|s| s.as_str()).collect();
    if let Some(naive) = try_formats(&cleaned, &explicit) {
        return Ok(offset_for(&cleaned, opts).from_utc_datetime(&naive));
    }

    let mut builtin = Vec::new();
    for d in DEFAULT_DATE_FORMATS.iter().chain(DEFAULT_DAYFIRST_DATE_FORMATS.iter()) {
        for t in DEFAULT_TIME_FORMATS {
            builtin.push(format!("{d} {t}"));
            builtin.push(format!("{d}T{t}"));
        }
    }
    builtin.extend(DEFAULT_MONTH_NAME_DATETIME_FORMATS.iter().map(|s| s.to_string()));
    let builtin_refs: Vec<&str> = builtin.iter().map(|s| s.as_str()).collect();
    if let Some(naive) = try_formats(&cleaned, &builtin_refs) {
        return Ok(offset_for(&cleaned, opts).from_utc_datetime(&naive));
    }

    if opts.fuzzy {
        let tokens: Vec<&str> = cleaned.split_whitespace().collect();
        for start in 0..tokens.len() {
            for end in (start + 1..=tokens.len()).rev() {
                let window = tokens[start..end].join(" ");
                if let Some(naive) = try_formats(&window, &builtin_refs) {
                    return Ok(offset_for(&cleaned, opts).from_utc_datetime(&naive));
                }
            }
        }
    }

    Err(Error::PredicateArgument(format!(
        "cannot parse datetime {raw:?}"
    )))
}

fn offset_for(cleaned: &str, opts: &DatetimeOptions) -> FixedOffset {
    for (name, secs) in &opts.timezones {
        if cleaned.contains(name.as_str()) {
            return FixedOffset::east_opt(*secs).unwrap_or_else(|| FixedOffset::east_opt(0).unwrap());
        }
    }
    FixedOffset::east_opt(0).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_date_format() {
        let opts = DatetimeOptions::default();
        let d = parse_date("06/14/2021", &opts).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2021, 6, 14).unwrap());
    }

    #[test]
    fn parses_datetime_with_am_pm() {
        let opts = DatetimeOptions::default();
        let a = parse_datetime("06/14/2021 15:30:00", &opts).unwrap();
        let b = parse_datetime("06/14/2021 03:30:00 PM", &opts).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn mismatched_times_are_not_equal() {
        let opts = DatetimeOptions::default();
        let a = parse_datetime("06/14/2021 23:30:00", &opts).unwrap();
        let b = parse_datetime("06/14/2021 11:30 PM", &opts).unwrap();
        assert_eq!(a, b);
        let c = parse_datetime("06/14/2021 15:30:00", &opts).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn explicit_format_option() {
        let opts = parse_options("format=%Y.%m.%d");
        let d = parse_date("2021.06.14", &opts).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2021, 6, 14).unwrap());
    }

    #[test]
    fn skips_strip_timezone_abbreviation() {
        let opts = parse_options("skips=UTC");
        let cleaned = apply_skips("06/14/2021 15:30:00 UTC", &opts.skips);
        assert_eq!(cleaned, "06/14/2021 15:30:00");
    }

    #[test]
    fn parses_month_name_datetime_by_default() {
        let opts = DatetimeOptions::default();
        let a = parse_datetime("06/14/2021 23:30:00", &opts).unwrap();
        let b = parse_datetime("Jun 14 11:30 PM 2021", &opts).unwrap();
        assert_eq!(a, b);
    }
}

//! Built-in template functions
//!
//! Time values travel through templates as RFC 3339 strings (Unix seconds
//! are accepted as input). Layouts are strftime patterns. Zones are IANA
//! names (`Europe/Paris`), `UTC`, `Local`, an empty string (UTC) or a fixed
//! offset such as `+02:00`.

use std::fmt::Write;
use std::sync::Arc;

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use serde_json::Value;

use crate::function::{FunctionError, FunctionResult, TemplateFunction, arg, arg_i64, arg_str};

/// Names and implementations of every built-in function
pub fn default_functions() -> Vec<(&'static str, Arc<dyn TemplateFunction>)> {
    vec![
        entry("Now", now),
        entry("NowUnix", now_unix),
        entry("NowUnixNano", now_unix_nano),
        entry("TimeFormat", time_format),
        entry("TimeChangeTimeZone", time_change_time_zone),
        entry("TimeParse", time_parse),
        entry("MustTimeParse", must_time_parse),
        entry("ToLower", to_lower),
        entry("ToUpper", to_upper),
        entry("Replace", replace),
        entry("Split", split),
        entry("ParseFloat", parse_float),
        entry("MustParseFloat", must_parse_float),
    ]
}

fn entry(
    name: &'static str,
    f: fn(&[Value]) -> FunctionResult,
) -> (&'static str, Arc<dyn TemplateFunction>) {
    (name, Arc::new(f))
}

// =============================================================================
// Time
// =============================================================================

/// Current local time, RFC 3339 unless a layout is given
fn now(args: &[Value]) -> FunctionResult {
    let now = Local::now();
    match args.first() {
        Some(Value::String(layout)) => format_time(&now.fixed_offset(), layout).map(Value::from),
        _ => Ok(Value::from(now.to_rfc3339())),
    }
}

fn now_unix(_args: &[Value]) -> FunctionResult {
    Ok(Value::from(Utc::now().timestamp()))
}

fn now_unix_nano(_args: &[Value]) -> FunctionResult {
    Utc::now()
        .timestamp_nanos_opt()
        .map(Value::from)
        .ok_or_else(|| FunctionError::new("current time is out of range for nanoseconds"))
}

/// TimeFormat(layout, time)
fn time_format(args: &[Value]) -> FunctionResult {
    let layout = arg_str(args, 0, "layout")?;
    let time = parse_time_value(arg(args, 1, "time")?)?;
    format_time(&time, layout).map(Value::from)
}

/// TimeChangeTimeZone(zone, time)
fn time_change_time_zone(args: &[Value]) -> FunctionResult {
    let zone = Zone::parse(arg_str(args, 0, "zone")?)?;
    let time = parse_time_value(arg(args, 1, "time")?)?;
    Ok(Value::from(zone.convert(&time).to_rfc3339()))
}

/// MustTimeParse(layout, zone, value), failing on malformed input
fn must_time_parse(args: &[Value]) -> FunctionResult {
    let layout = arg_str(args, 0, "layout")?;
    let zone = Zone::parse(arg_str(args, 1, "zone")?)?;
    let value = arg_str(args, 2, "value")?;
    parse_in_zone(layout, &zone, value).map(|t| Value::from(t.to_rfc3339()))
}

/// TimeParse(layout, zone, value), the Unix epoch on malformed input
fn time_parse(args: &[Value]) -> FunctionResult {
    match must_time_parse(args) {
        Ok(value) => Ok(value),
        Err(_) => Ok(Value::from(DateTime::<Utc>::UNIX_EPOCH.to_rfc3339())),
    }
}

fn format_time(time: &DateTime<FixedOffset>, layout: &str) -> Result<String, FunctionError> {
    let mut out = String::new();
    write!(out, "{}", time.format(layout))
        .map_err(|_| FunctionError::new(format!("invalid time layout {:?}", layout)))?;
    Ok(out)
}

fn parse_time_value(value: &Value) -> Result<DateTime<FixedOffset>, FunctionError> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map_err(|e| FunctionError::new(format!("invalid time {:?}: {}", s, e))),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .map(|t| t.fixed_offset())
            .ok_or_else(|| FunctionError::new(format!("invalid unix time {}", n))),
        other => Err(FunctionError::new(format!(
            "expected an RFC 3339 string or unix seconds, got {}",
            other
        ))),
    }
}

/// Parse `value` with `layout`; layouts without an offset are read in `zone`
fn parse_in_zone(
    layout: &str,
    zone: &Zone,
    value: &str,
) -> Result<DateTime<FixedOffset>, FunctionError> {
    if let Ok(time) = DateTime::parse_from_str(value, layout) {
        return Ok(zone.convert(&time));
    }

    let naive = NaiveDateTime::parse_from_str(value, layout)
        .or_else(|_| {
            NaiveDate::parse_from_str(value, layout).map(|d| d.and_time(NaiveTime::MIN))
        })
        .map_err(|e| {
            FunctionError::new(format!("cannot parse {:?} as {:?}: {}", value, layout, e))
        })?;

    zone.localize(&naive).ok_or_else(|| {
        FunctionError::new(format!("{:?} does not exist in the requested time zone", value))
    })
}

/// A resolved time zone
#[derive(Debug, Clone, Copy)]
enum Zone {
    Utc,
    Local,
    Named(chrono_tz::Tz),
    Fixed(FixedOffset),
}

impl Zone {
    fn parse(name: &str) -> Result<Self, FunctionError> {
        match name {
            "" | "UTC" | "utc" => Ok(Self::Utc),
            "Local" | "local" => Ok(Self::Local),
            _ if name.starts_with('+') || name.starts_with('-') => parse_offset(name)
                .map(Self::Fixed)
                .ok_or_else(|| FunctionError::new(format!("invalid offset {:?}", name))),
            _ => name
                .parse::<chrono_tz::Tz>()
                .map(Self::Named)
                .map_err(|e| FunctionError::new(format!("unknown time zone {:?}: {}", name, e))),
        }
    }

    fn convert(&self, time: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        match self {
            Self::Utc => time.with_timezone(&Utc).fixed_offset(),
            Self::Local => time.with_timezone(&Local).fixed_offset(),
            Self::Named(tz) => time.with_timezone(tz).fixed_offset(),
            Self::Fixed(offset) => time.with_timezone(offset),
        }
    }

    fn localize(&self, naive: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Utc => Some(Utc.from_utc_datetime(naive).fixed_offset()),
            Self::Local => Local
                .from_local_datetime(naive)
                .earliest()
                .map(|t| t.fixed_offset()),
            Self::Named(tz) => tz
                .from_local_datetime(naive)
                .earliest()
                .map(|t| t.fixed_offset()),
            Self::Fixed(offset) => offset.from_local_datetime(naive).single(),
        }
    }
}

/// Parse `+HH:MM`, `-HHMM` or `+HH`
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

// =============================================================================
// Strings
// =============================================================================

fn to_lower(args: &[Value]) -> FunctionResult {
    Ok(Value::from(arg_str(args, 0, "s")?.to_lowercase()))
}

fn to_upper(args: &[Value]) -> FunctionResult {
    Ok(Value::from(arg_str(args, 0, "s")?.to_uppercase()))
}

/// Replace(s, old, new, n); a negative `n` replaces every occurrence
fn replace(args: &[Value]) -> FunctionResult {
    let s = arg_str(args, 0, "s")?;
    let old = arg_str(args, 1, "old")?;
    let new = arg_str(args, 2, "new")?;
    let n = arg_i64(args, 3, "n")?;

    let replaced = if n < 0 {
        s.replace(old, new)
    } else {
        s.replacen(old, new, n as usize)
    };
    Ok(Value::from(replaced))
}

/// Split(s, sep); an empty separator splits into characters
fn split(args: &[Value]) -> FunctionResult {
    let s = arg_str(args, 0, "s")?;
    let sep = arg_str(args, 1, "sep")?;

    let parts: Vec<Value> = if sep.is_empty() {
        s.chars().map(|c| Value::from(c.to_string())).collect()
    } else {
        s.split(sep).map(Value::from).collect()
    };
    Ok(Value::Array(parts))
}

// =============================================================================
// Numbers
// =============================================================================

/// ParseFloat(s[, bits]), 0 when `s` is not a number
fn parse_float(args: &[Value]) -> FunctionResult {
    match must_parse_float(args) {
        Ok(value) => Ok(value),
        Err(_) => Ok(Value::from(0.0)),
    }
}

/// MustParseFloat(s[, bits])
fn must_parse_float(args: &[Value]) -> FunctionResult {
    let parsed = match arg(args, 0, "s")? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| FunctionError::new(format!("{} is not a float", n)))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| FunctionError::new(format!("cannot parse {:?} as float: {}", s, e)))?,
        other => {
            return Err(FunctionError::new(format!(
                "expected a string or number, got {}",
                other
            )));
        }
    };

    let bits = if args.len() > 1 {
        arg_i64(args, 1, "bitSize")?
    } else {
        64
    };
    let value = match bits {
        32 => parsed as f32 as f64,
        64 => parsed,
        other => {
            return Err(FunctionError::new(format!(
                "bitSize must be 32 or 64, got {}",
                other
            )));
        }
    };
    // JSON has no NaN or infinity.
    if !value.is_finite() {
        return Err(FunctionError::new(format!("{} is not a finite float", value)));
    }
    Ok(Value::from(value))
}

#[cfg(test)]
#[path = "defaults_test.rs"]
mod tests;

/*
    beanio
    https://github.com/beanio-rs/beanio

    src/typehandler/xml_datetime.rs

    XML Schema-flavored date/time handlers. Three variants share one
    implementation distinguished by `Kind`:

      - `date`:     `yyyy-MM-dd`, optional zone, time defaults to midnight.
      - `time`:     `HH:mm:ss[.fff]`, optional zone, date replaced by the
                    Unix epoch (1970-01-01).
      - `datetime`: `yyyy-MM-ddTHH:mm:ss[.fff]`, optional zone.

    Non-lenient parsing is tried first (strict regex); if the handler was
    built with `lenient(true)` and the strict match fails, a looser
    multi-format fallback is attempted. `time_zone_allowed(false)` rejects
    any offset other than `Z`/`+00:00`.

    The timezone offset is parsed as the full `[+-]HH:MM` span and the
    `chrono::FixedOffset` is built from the total offset in seconds, rather
    than from a truncated sub-component — see `DESIGN.md`.
*/

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::FieldError;
use crate::typehandler::TypeHandler;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Date,
    Time,
    DateTime,
}

static STRICT_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap());
static STRICT_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2}):(\d{2}):(\d{2})(?:\.\d+)?(Z|[+-]\d{2}:\d{2})?$").unwrap());
static STRICT_DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2})(?:\.\d+)?(Z|[+-]\d{2}:\d{2})?$").unwrap()
});

fn parse_total_offset(token: &str) -> Result<FixedOffset, String> {
    if token == "Z" {
        return Ok(FixedOffset::east_opt(0).unwrap());
    }
    let sign = if token.starts_with('-') { -1 } else { 1 };
    let rest = &token[1..];
    let (hours, minutes) = rest
        .split_once(':')
        .ok_or_else(|| format!("malformed zone offset '{token}'"))?;
    let hours: i32 = hours.parse().map_err(|_| format!("malformed zone offset '{token}'"))?;
    let minutes: i32 = minutes.parse().map_err(|_| format!("malformed zone offset '{token}'"))?;
    let total_seconds = sign * (hours * 3600 + minutes * 60);
    FixedOffset::east_opt(total_seconds).ok_or_else(|| format!("zone offset '{token}' out of range"))
}

/// Parser for `date`, `time`, and `datetime` XML-flavored fields.
#[derive(Debug, Clone, Copy)]
pub struct XmlDateTimeHandler {
    kind: Kind,
    lenient: bool,
    time_zone_allowed: bool,
}

impl XmlDateTimeHandler {
    pub fn date() -> Self {
        XmlDateTimeHandler {
            kind: Kind::Date,
            lenient: false,
            time_zone_allowed: true,
        }
    }

    pub fn time() -> Self {
        XmlDateTimeHandler {
            kind: Kind::Time,
            lenient: false,
            time_zone_allowed: true,
        }
    }

    pub fn date_time() -> Self {
        XmlDateTimeHandler {
            kind: Kind::DateTime,
            lenient: false,
            time_zone_allowed: true,
        }
    }

    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    pub fn time_zone_allowed(mut self, allowed: bool) -> Self {
        self.time_zone_allowed = allowed;
        self
    }

    fn parse_strict(&self, text: &str) -> Result<NaiveDateTime, String> {
        match self.kind {
            Kind::Date => {
                let caps = STRICT_DATE.captures(text).ok_or("does not match yyyy-MM-dd")?;
                let date = naive_date(&caps[1], &caps[2], &caps[3])?;
                Ok(date.and_time(NaiveTime::from_hms_opt(0, 0, 0).unwrap()))
            }
            Kind::Time => {
                let caps = STRICT_TIME
                    .captures(text)
                    .ok_or("does not match HH:mm:ss")?;
                self.check_zone(caps.get(4).map(|m| m.as_str()))?;
                let time = naive_time(&caps[1], &caps[2], &caps[3])?;
                Ok(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_time(time))
            }
            Kind::DateTime => {
                let caps = STRICT_DATETIME
                    .captures(text)
                    .ok_or("does not match yyyy-MM-ddTHH:mm:ss")?;
                self.check_zone(caps.get(7).map(|m| m.as_str()))?;
                let date = naive_date(&caps[1], &caps[2], &caps[3])?;
                let time = naive_time(&caps[4], &caps[5], &caps[6])?;
                Ok(date.and_time(time))
            }
        }
    }

    fn check_zone(&self, zone: Option<&str>) -> Result<(), String> {
        let Some(token) = zone else { return Ok(()) };
        let offset = parse_total_offset(token)?;
        if !self.time_zone_allowed && offset.local_minus_utc() != 0 {
            return Err(format!("zone offset '{token}' not allowed for this field"));
        }
        Ok(())
    }

    fn parse_lenient(&self, text: &str) -> Result<NaiveDateTime, String> {
        let candidates: &[&str] = match self.kind {
            Kind::Date => &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"],
            Kind::Time => &["%H:%M:%S", "%H:%M", "%I:%M:%S %p"],
            Kind::DateTime => &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M"],
        };
        for fmt in candidates {
            let parsed = match self.kind {
                Kind::Date => NaiveDate::parse_from_str(text.trim(), fmt)
                    .map(|d| d.and_time(NaiveTime::from_hms_opt(0, 0, 0).unwrap())),
                Kind::Time => NaiveTime::parse_from_str(text.trim(), fmt)
                    .map(|t| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_time(t)),
                Kind::DateTime => NaiveDateTime::parse_from_str(text.trim(), fmt),
            };
            if let Ok(value) = parsed {
                return Ok(value);
            }
        }
        Err(format!("no lenient format matched '{text}'"))
    }
}

fn naive_date(y: &str, m: &str, d: &str) -> Result<NaiveDate, String> {
    let (y, m, d): (i32, u32, u32) = (
        y.parse().map_err(|_| "invalid year")?,
        m.parse().map_err(|_| "invalid month")?,
        d.parse().map_err(|_| "invalid day")?,
    );
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| "out-of-range calendar date".to_string())
}

fn naive_time(h: &str, m: &str, s: &str) -> Result<NaiveTime, String> {
    let (h, m, s): (u32, u32, u32) = (
        h.parse().map_err(|_| "invalid hour")?,
        m.parse().map_err(|_| "invalid minute")?,
        s.parse().map_err(|_| "invalid second")?,
    );
    NaiveTime::from_hms_opt(h, m, s).ok_or_else(|| "out-of-range time of day".to_string())
}

impl TypeHandler for XmlDateTimeHandler {
    fn parse(&self, text: &str) -> Result<Value, FieldError> {
        let result = self
            .parse_strict(text)
            .or_else(|strict_err| {
                if self.lenient {
                    self.parse_lenient(text)
                } else {
                    Err(strict_err)
                }
            })
            .map_err(|cause| FieldError::TypeConversion {
                record: String::new(),
                field: String::new(),
                line: 0,
                text: text.to_string(),
                cause,
            })?;
        Ok(Value::Time(result))
    }

    fn format(&self, value: &Value) -> Result<String, FieldError> {
        let Value::Time(dt) = value else {
            return Ok(value.to_string());
        };
        Ok(match self.kind {
            Kind::Date => dt.format("%Y-%m-%d").to_string(),
            Kind::Time => dt.format("%H:%M:%S").to_string(),
            Kind::DateTime => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_date_round_trips() {
        let handler = XmlDateTimeHandler::date();
        let value = handler.parse("2026-07-28").unwrap();
        assert_eq!(handler.format(&value).unwrap(), "2026-07-28");
    }

    #[test]
    fn time_replaces_date_with_epoch() {
        let handler = XmlDateTimeHandler::time();
        let Value::Time(dt) = handler.parse("08:30:00").unwrap() else {
            panic!("expected time");
        };
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
    }

    #[test]
    fn total_offset_is_not_truncated() {
        // A +05:30 offset must be rejected in full (5h30m), not just 5h,
        // when the field disallows nonzero zones.
        let strict = XmlDateTimeHandler::date_time().time_zone_allowed(false);
        assert!(strict.parse("2026-07-28T08:30:00+05:30").is_err());
        assert!(strict.parse("2026-07-28T08:30:00+00:00").is_ok());
    }

    #[test]
    fn lenient_fallback_accepts_alternate_format() {
        let strict = XmlDateTimeHandler::date();
        assert!(strict.parse("07/28/2026").is_err());
        let lenient = XmlDateTimeHandler::date().lenient(true);
        assert!(lenient.parse("07/28/2026").is_ok());
    }
}

//! XEP-0202: Entity Time
//!
//! ```xml
//! <time xmlns='urn:xmpp:time'>
//!   <tzo>-06:00</tzo>
//!   <utc>2006-12-19T17:58:35Z</utc>
//! </time>
//! ```

use chrono::{DateTime, FixedOffset, Local, SecondsFormat, SubsecRound, Utc};
use serde::Serialize;

use crate::element::Element;
use crate::error::ParseError;
use crate::payload::Extension;

/// Namespace for XEP-0202 Entity Time
pub const NS_TIME: &str = "urn:xmpp:time";

/// An entity's current time: UTC instant plus its timezone offset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityTime {
    /// Offset from UTC in seconds
    pub tzo: Option<i32>,
    pub utc: Option<DateTime<Utc>>,
}

impl EntityTime {
    pub fn new(tzo: i32, utc: DateTime<Utc>) -> Self {
        Self {
            tzo: Some(tzo),
            utc: Some(utc),
        }
    }

    /// Empty query, as sent in a `get`.
    pub fn query() -> Self {
        Self::default()
    }

    /// The local clock, truncated to whole seconds.
    pub fn now() -> Self {
        let tzo = Local::now().offset().local_minus_utc();
        Self::new(tzo, Utc::now().trunc_subsecs(0))
    }

    /// The instant expressed in the entity's own timezone.
    pub fn local_time(&self) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.tzo?)?;
        Some(self.utc?.with_timezone(&offset))
    }
}

/// Parse `Z` or `±hh:mm` into seconds east of UTC.
pub fn parse_tzo(value: &str) -> Result<i32, ParseError> {
    let invalid = || ParseError::invalid("tzo", value);

    if value == "Z" {
        return Ok(0);
    }

    let (sign, rest) = match value.as_bytes().first() {
        Some(b'+') => (1, &value[1..]),
        Some(b'-') => (-1, &value[1..]),
        _ => return Err(invalid()),
    };

    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return Err(invalid());
    }

    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    Ok(sign * (hours * 3600 + minutes * 60))
}

/// Format seconds east of UTC as `Z` or `±hh:mm`.
pub fn format_tzo(seconds: i32) -> String {
    if seconds == 0 {
        return "Z".to_string();
    }

    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.unsigned_abs() / 60;
    format!("{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

/// Parse an XEP-0082 DateTime in UTC (`YYYY-MM-DDThh:mm:ss[.fff]Z`).
pub fn parse_utc(value: &str) -> Result<DateTime<Utc>, ParseError> {
    if !value.ends_with('Z') {
        return Err(ParseError::invalid("utc", value));
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ParseError::invalid("utc", value))
}

/// Format a UTC instant, with fractional seconds only when present.
pub fn format_utc(utc: &DateTime<Utc>) -> String {
    utc.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl Extension for EntityTime {
    const NAMESPACE: &'static str = NS_TIME;
    const NAME: &'static str = "time";

    fn from_element(elem: &Element) -> Result<Self, ParseError> {
        Self::ensure_root(elem)?;

        let text = |name: &str| elem.get_child(name, NS_TIME).map(|child| child.text());

        Ok(Self {
            tzo: text("tzo").map(|v| parse_tzo(v.trim())).transpose()?,
            utc: text("utc").map(|v| parse_utc(v.trim())).transpose()?,
        })
    }

    fn to_element(&self) -> Element {
        let mut builder = Element::builder("time", NS_TIME);

        if let Some(tzo) = self.tzo {
            builder = builder.append(
                Element::builder("tzo", NS_TIME)
                    .append(format_tzo(tzo))
                    .build(),
            );
        }

        if let Some(ref utc) = self.utc {
            builder = builder.append(
                Element::builder("utc", NS_TIME)
                    .append(format_utc(utc))
                    .build(),
            );
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_entity_time_result() {
        let xml = "<time xmlns=\"urn:xmpp:time\"><tzo>-06:00</tzo><utc>2006-12-19T17:58:35Z</utc></time>";
        let time = EntityTime::from_xml(xml.as_bytes()).unwrap();

        assert_eq!(time.tzo, Some(-21600));
        assert_eq!(
            time.utc,
            Some(Utc.with_ymd_and_hms(2006, 12, 19, 17, 58, 35).unwrap())
        );
        assert_eq!(time.to_xml(), xml);
    }

    #[test]
    fn test_entity_time_query() {
        let time = EntityTime::from_xml(b"<time xmlns=\"urn:xmpp:time\"/>").unwrap();
        assert_eq!(time, EntityTime::query());
        assert_eq!(time.to_xml(), "<time xmlns=\"urn:xmpp:time\"/>");
    }

    #[test]
    fn test_parse_tzo() {
        assert_eq!(parse_tzo("-06:00"), Ok(-21600));
        assert_eq!(parse_tzo("+05:30"), Ok(19800));
        assert_eq!(parse_tzo("+00:00"), Ok(0));
        assert_eq!(parse_tzo("Z"), Ok(0));

        for bad in ["", "06:00", "-6:00", "+0600", "+24:00", "+01:60", "-aa:bb", "-+1:00", "+1+:00", "+01:-1"] {
            assert_eq!(parse_tzo(bad), Err(ParseError::invalid("tzo", bad)), "{bad}");
        }
    }

    #[test]
    fn test_format_tzo() {
        assert_eq!(format_tzo(-21600), "-06:00");
        assert_eq!(format_tzo(19800), "+05:30");
        assert_eq!(format_tzo(0), "Z");
    }

    #[test]
    fn test_utc_fractional_seconds() {
        let time = EntityTime::from_xml(
            b"<time xmlns=\"urn:xmpp:time\"><utc>2006-12-19T17:58:35.250Z</utc></time>",
        )
        .unwrap();

        let utc = time.utc.unwrap();
        assert_eq!(utc.nanosecond(), 250_000_000);
        assert_eq!(format_utc(&utc), "2006-12-19T17:58:35.250Z");
    }

    #[test]
    fn test_invalid_utc_rejected() {
        let xml = "<time xmlns=\"urn:xmpp:time\"><utc>yesterday</utc></time>";
        assert_eq!(
            EntityTime::from_xml(xml.as_bytes()),
            Err(ParseError::invalid("utc", "yesterday"))
        );
    }

    #[test]
    fn test_utc_with_offset_rejected() {
        let value = "2006-12-19T19:58:35+02:00";
        assert_eq!(parse_utc(value), Err(ParseError::invalid("utc", value)));
        assert!(parse_utc("2006-12-19T17:58:35Z").is_ok());
    }

    #[test]
    fn test_local_time() {
        let time = EntityTime::new(-21600, Utc.with_ymd_and_hms(2006, 12, 19, 17, 58, 35).unwrap());
        let local = time.local_time().unwrap();
        assert_eq!(local.hour(), 11);
        assert_eq!(local.offset().local_minus_utc(), -21600);

        assert_eq!(EntityTime::query().local_time(), None);
    }

    #[test]
    fn test_now_has_whole_seconds() {
        let time = EntityTime::now();
        assert!(time.tzo.is_some());
        assert_eq!(time.utc.unwrap().nanosecond(), 0);
    }
}

//! Resolution of the three required chart parameters

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone};
use reqwest::Url;

use crate::aw_client::TimePeriod;
use crate::error::{Result, ValidationError};

/// Parameters as supplied, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams {
    pub hostname: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Validated parameters for one chart run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartParams {
    pub hostname: String,
    pub period: TimePeriod,
}

impl RawParams {
    /// Reads `hostname`, `start` and `end` from a visualization URL's query string.
    pub fn from_url(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| ValidationError::InvalidUrl(format!("{}: {}", url, e)))?;

        let mut params = RawParams::default();
        for (key, value) in url.query_pairs() {
            let slot = match key.as_ref() {
                "hostname" => &mut params.hostname,
                "start" => &mut params.start,
                "end" => &mut params.end,
                _ => continue,
            };
            // First occurrence wins, like URLSearchParams.get
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        Ok(params)
    }

    /// Fills unset values from `other`.
    pub fn or(self, other: RawParams) -> Self {
        RawParams {
            hostname: self.hostname.or(other.hostname),
            start: self.start.or(other.start),
            end: self.end.or(other.end),
        }
    }

    /// Checks presence of all three values, then parses the range.
    pub fn resolve(self) -> Result<ChartParams> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let (hostname, start, end) = match (
            present(self.hostname),
            present(self.start),
            present(self.end),
        ) {
            (Some(hostname), Some(start), Some(end)) => (hostname, start, end),
            (hostname, start, end) => {
                let missing = [
                    ("hostname", hostname.is_none()),
                    ("start", start.is_none()),
                    ("end", end.is_none()),
                ]
                .into_iter()
                .filter(|(_, absent)| *absent)
                .map(|(name, _)| name.to_string())
                .collect();
                return Err(ValidationError::MissingParameter(missing).into());
            }
        };

        let period = TimePeriod {
            start: parse_instant("start", &start)?,
            end: parse_instant("end", &end)?,
        };
        if period.start >= period.end {
            return Err(ValidationError::EmptyRange { start, end }.into());
        }

        Ok(ChartParams {
            hostname: hostname.trim().to_string(),
            period,
        })
    }
}

/// Parses an RFC 3339 instant. Date-times without an offset and bare dates
/// are taken as local time, bare dates at midnight.
pub fn parse_instant(field: &str, value: &str) -> Result<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant);
    }

    let invalid = || ValidationError::InvalidTimestamp {
        field: field.to_string(),
        value: value.to_string(),
    };

    let naive = match value.parse::<NaiveDateTime>() {
        Ok(naive) => naive,
        Err(_) => {
            let formats = ["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d"];
            formats
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .ok_or_else(invalid)?
        }
    };

    // Earliest mapping on a DST fold; a gap has no local time at all
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(invalid)?;
    Ok(local.into())
}

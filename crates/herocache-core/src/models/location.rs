use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::LocationRecord;

const MAX_LATITUDE: f64 = 90.0;
const MAX_LONGITUDE: f64 = 180.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub date: String,
    pub latitude: String,
    pub longitude: String,
}

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Parsed coordinate, or `None` when either value is not a finite number
    /// or falls outside the valid range.
    pub fn coordinate(&self) -> Option<Coordinate> {
        let latitude: f64 = self.latitude.trim().parse().ok()?;
        let longitude: f64 = self.longitude.trim().parse().ok()?;

        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        if latitude.abs() > MAX_LATITUDE || longitude.abs() > MAX_LONGITUDE {
            return None;
        }
        Some(Coordinate {
            latitude,
            longitude,
        })
    }

    /// Best-effort parse of the sighting date.
    ///
    /// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC) or a
    /// bare `YYYY-MM-DD` (midnight UTC).
    pub fn parsed_date(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.date.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt);
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc().fixed_offset());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc).fixed_offset())
    }
}

impl From<LocationRecord> for Location {
    fn from(record: LocationRecord) -> Self {
        Self {
            id: record.id,
            date: record.date,
            latitude: record.latitude,
            longitude: record.longitude,
        }
    }
}

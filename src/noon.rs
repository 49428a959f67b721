//! Solar noon estimation from timezone geometry.
//!
//! Approximates the local clock time of solar noon from longitude and the
//! civil UTC offset alone. No equation-of-time or declination terms; the
//! residual error is the width of the analemma itself, a few minutes over
//! the year, which is exactly the drift the capture sequence photographs.

use crate::location::Location;
use serde::Serialize;

/// Degrees of longitude per hour of UTC offset (360 / 24).
const DEGREES_PER_HOUR: f64 = 15.0;

/// Minutes of clock time per degree of longitude (1440 / 360).
const MINUTES_PER_DEGREE: f64 = 4.0;

/// Civil noon, in minutes after midnight.
const CIVIL_NOON_MINUTES: f64 = 720.0;

/// An estimated solar noon, split into clock fields.
///
/// `hours` and `minutes` are truncated toward zero from the real-valued
/// minute count. Extreme inputs can push them negative or past 23; they
/// pass through unclamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoonEstimate {
    pub hours: i64,
    pub minutes: i64,
    /// Raw minutes after midnight, before splitting.
    pub noon_minutes: f64,
}

impl NoonEstimate {
    /// Clock rendering, each field zero-padded to two digits. A negative
    /// field prints its sign ahead of the digits, the sign counting toward
    /// the pad width ("-1", not "-01").
    pub fn clock(&self) -> String {
        format!("{:02}:{:02}", self.hours, self.minutes)
    }
}

/// Longitude nominally centered in the timezone of a UTC offset.
/// Never negative.
pub fn central_meridian(offset_hours: i32) -> f64 {
    f64::from(offset_hours.abs()) * DEGREES_PER_HOUR
}

/// Estimate solar noon for a longitude and civil UTC offset.
///
/// Total over all real longitudes and integer offsets: always returns,
/// never validates.
pub fn estimate(lon: f64, offset_hours: i32) -> NoonEstimate {
    let diff_deg = lon.abs() - central_meridian(offset_hours);
    let noon_minutes = CIVIL_NOON_MINUTES + diff_deg * MINUTES_PER_DEGREE;
    NoonEstimate {
        // `as` truncates toward zero; floored division would disagree
        // below midnight
        hours: (noon_minutes / 60.0) as i64,
        minutes: (noon_minutes % 60.0) as i64,
        noon_minutes,
    }
}

/// One display line for a site, in registry output format.
pub fn noon_line(loc: &Location) -> String {
    let est = estimate(loc.lon, loc.utc_offset_hours);
    format!(
        "{}: {} (Offset UTC{}, Lon {})",
        loc.name,
        est.clock(),
        loc.utc_offset_hours,
        loc.lon
    )
}

/// Per-site report for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct NoonReport {
    pub id: &'static str,
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub utc_offset_hours: i32,
    /// Estimated solar noon on the site's civil clock (HH:MM).
    pub solar_noon: String,
}

pub fn report(loc: &Location) -> NoonReport {
    let est = estimate(loc.lon, loc.utc_offset_hours);
    NoonReport {
        id: loc.id,
        name: loc.name,
        latitude: loc.lat,
        longitude: loc.lon,
        utc_offset_hours: loc.utc_offset_hours,
        solar_noon: est.clock(),
    }
}

//! Monthly capture schedules for the analemma sequence.
//!
//! One frame per day per site: the Sun at its estimated solar noon, the
//! Moon at a fixed evening hour. Every entry pairs the wall time at the
//! capture site with the wall time on the observer's home clock, so the
//! operator reads a single column no matter where the camera sits.

use crate::location::{Location, LOCATIONS};
use crate::noon;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The observer's home clock (Santa Cruz, Bolivia). No DST.
pub const HOME_TZ: Tz = Tz::America__La_Paz;

/// Fixed home-clock time for Moon captures, (hour, minute).
pub const FIXED_LUNAR_TIME: (u32, u32) = (20, 0);

/// How long past its scheduled time a capture still counts as pending.
const GRACE_SECONDS: i64 = 60;

/// Which body a schedule tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CelestialBody {
    Sun,
    Moon,
}

impl CelestialBody {
    /// Data-directory segment for this body.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Sun => "sun",
            Self::Moon => "moon",
        }
    }
}

impl fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sun => write!(f, "Sun"),
            Self::Moon => write!(f, "Moon"),
        }
    }
}

/// One scheduled capture as stored on disk.
///
/// Dotted keys keep the JSON column-like for hand editing; lunar months
/// in particular start as generated templates and get adjusted manually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(rename = "loc.date")]
    pub loc_date: String,
    #[serde(rename = "loc.time")]
    pub loc_time: String,
    #[serde(rename = "home.date")]
    pub home_date: String,
    #[serde(rename = "home.time")]
    pub home_time: String,
}

/// A loaded entry tagged with its body and site.
#[derive(Debug, Clone, Serialize)]
pub struct CombinedEntry {
    pub body: CelestialBody,
    pub location_id: &'static str,
    #[serde(flatten)]
    pub times: ScheduleEntry,
}

/// A capture due within the current hour.
#[derive(Debug, Clone)]
pub struct PendingCapture {
    pub entry: CombinedEntry,
    /// Whole seconds until the scheduled time, clamped at zero.
    pub wait_seconds: i64,
}

/// Schedule persistence errors.
#[derive(Debug)]
pub enum ScheduleError {
    Io(PathBuf, io::Error),
    Malformed(PathBuf, serde_json::Error),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "Cannot access {}: {}", path.display(), e),
            Self::Malformed(path, e) => write!(f, "Malformed schedule {}: {}", path.display(), e),
        }
    }
}

impl std::error::Error for ScheduleError {}

/// Number of days in a calendar month. Zero for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|d| d.pred_opt()).map(|d| d.day()).unwrap_or(0)
}

/// Build the schedule for one site, body, and month.
///
/// Days whose capture time does not exist on the local calendar (a DST
/// gap) are skipped rather than faked.
pub fn month_schedule(loc: &Location, body: CelestialBody, year: i32, month: u32) -> Vec<ScheduleEntry> {
    let mut entries = Vec::new();
    for day in 1..=days_in_month(year, month) {
        let date = match NaiveDate::from_ymd_opt(year, month, day) {
            Some(d) => d,
            None => continue,
        };
        let entry = match body {
            CelestialBody::Sun => sun_entry(loc, date),
            CelestialBody::Moon => moon_entry(loc, date),
        };
        if let Some(e) = entry {
            entries.push(e);
        }
    }
    entries
}

/// Sun frame: the site's estimated solar noon, read on both clocks.
fn sun_entry(loc: &Location, date: NaiveDate) -> Option<ScheduleEntry> {
    let est = noon::estimate(loc.lon, loc.utc_offset_hours);
    // wrap into one civil day; extreme offsets can push the raw estimate
    // outside [0, 1440)
    let total = (est.hours * 60 + est.minutes).rem_euclid(1440);
    let time = NaiveTime::from_hms_opt((total / 60) as u32, (total % 60) as u32, 0)?;
    let local = loc.tz.from_local_datetime(&date.and_time(time)).earliest()?;
    let home = local.with_timezone(&HOME_TZ);
    Some(entry_from(local.naive_local(), home.naive_local()))
}

/// Moon frame: the fixed evening hour on the home clock, read at the site.
fn moon_entry(loc: &Location, date: NaiveDate) -> Option<ScheduleEntry> {
    let (h, m) = FIXED_LUNAR_TIME;
    let time = NaiveTime::from_hms_opt(h, m, 0)?;
    let home = HOME_TZ.from_local_datetime(&date.and_time(time)).earliest()?;
    let local = home.with_timezone(&loc.tz);
    Some(entry_from(local.naive_local(), home.naive_local()))
}

fn entry_from(local: NaiveDateTime, home: NaiveDateTime) -> ScheduleEntry {
    ScheduleEntry {
        loc_date: local.format("%Y-%m-%d").to_string(),
        loc_time: local.format("%H:%M").to_string(),
        home_date: home.format("%Y-%m-%d").to_string(),
        home_time: home.format("%H:%M").to_string(),
    }
}

/// Path of a month's schedule file: `<dir>/<id>/<sun|moon>/<YYYY-MM>.json`.
pub fn schedule_path(dir: &Path, loc_id: &str, body: CelestialBody, year: i32, month: u32) -> PathBuf {
    dir.join(loc_id)
        .join(body.dir_name())
        .join(format!("{:04}-{:02}.json", year, month))
}

/// Persist a month's entries, creating parent directories as needed.
/// Returns the path written.
pub fn save_month(
    dir: &Path,
    loc_id: &str,
    body: CelestialBody,
    year: i32,
    month: u32,
    entries: &[ScheduleEntry],
) -> Result<PathBuf, ScheduleError> {
    let path = schedule_path(dir, loc_id, body, year, month);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ScheduleError::Io(parent.to_path_buf(), e))?;
    }
    let json = serde_json::to_string(entries).map_err(|e| ScheduleError::Malformed(path.clone(), e))?;
    fs::write(&path, json + "\n").map_err(|e| ScheduleError::Io(path.clone(), e))?;
    Ok(path)
}

/// Load a month's entries. A missing file is an empty month, not an error.
pub fn load_month(
    dir: &Path,
    loc_id: &str,
    body: CelestialBody,
    year: i32,
    month: u32,
) -> Result<Vec<ScheduleEntry>, ScheduleError> {
    let path = schedule_path(dir, loc_id, body, year, month);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(&path).map_err(|e| ScheduleError::Io(path.clone(), e))?;
    serde_json::from_str(&data).map_err(|e| ScheduleError::Malformed(path, e))
}

/// Merge Sun and Moon schedules across every registry site for a month.
pub fn load_all(dir: &Path, year: i32, month: u32) -> Result<Vec<CombinedEntry>, ScheduleError> {
    let mut all = Vec::new();
    for loc in &LOCATIONS {
        for body in [CelestialBody::Sun, CelestialBody::Moon] {
            for times in load_month(dir, loc.id, body, year, month)? {
                all.push(CombinedEntry { body, location_id: loc.id, times });
            }
        }
    }
    Ok(all)
}

/// Find a capture scheduled within the current home-clock hour.
///
/// Entries up to 60 seconds in the past still match, absorbing loop
/// jitter; anything older is gone for the day.
pub fn find_capture_this_hour(entries: &[CombinedEntry], now_home: NaiveDateTime) -> Option<PendingCapture> {
    let today = now_home.date().format("%Y-%m-%d").to_string();
    for combined in entries {
        if combined.times.home_date != today {
            continue;
        }
        let scheduled = match NaiveTime::parse_from_str(&combined.times.home_time, "%H:%M") {
            Ok(t) => t,
            Err(_) => continue,
        };
        if scheduled.hour() != now_home.time().hour() {
            continue;
        }
        let wait = (now_home.date().and_time(scheduled) - now_home).num_seconds();
        if wait >= -GRACE_SECONDS {
            return Some(PendingCapture {
                entry: combined.clone(),
                wait_seconds: wait.max(0),
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site(id: &str) -> &'static Location {
        LOCATIONS.iter().find(|l| l.id == id).unwrap()
    }

    fn at(date: (i32, u32, u32), time: (u32, u32, u32)) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(time.0, time.1, time.2)
            .unwrap()
    }

    fn combined(home_date: &str, home_time: &str) -> CombinedEntry {
        CombinedEntry {
            body: CelestialBody::Sun,
            location_id: "phoenix",
            times: ScheduleEntry {
                loc_date: home_date.to_string(),
                loc_time: home_time.to_string(),
                home_date: home_date.to_string(),
                home_time: home_time.to_string(),
            },
        }
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2026, 12), 31);
        assert_eq!(days_in_month(2026, 13), 0);
    }

    #[test]
    fn test_phoenix_sun_month() {
        let entries = month_schedule(site("phoenix"), CelestialBody::Sun, 2026, 2);
        assert_eq!(entries.len(), 28);
        let first = &entries[0];
        assert_eq!(first.loc_date, "2026-02-01");
        assert_eq!(first.loc_time, "12:28");
        // Bolivia runs 3 hours ahead of Phoenix
        assert_eq!(first.home_date, "2026-02-01");
        assert_eq!(first.home_time, "15:28");
    }

    #[test]
    fn test_phoenix_moon_month_fixed_evening() {
        let entries = month_schedule(site("phoenix"), CelestialBody::Moon, 2026, 2);
        assert_eq!(entries.len(), 28);
        assert_eq!(entries[0].home_time, "20:00");
        assert_eq!(entries[0].loc_time, "17:00");
    }

    #[test]
    fn test_entry_json_uses_dotted_keys() {
        let entries = month_schedule(site("ojai"), CelestialBody::Sun, 2026, 1);
        let json = serde_json::to_string(&entries[0]).unwrap();
        assert!(json.contains("\"loc.date\""));
        assert!(json.contains("\"home.time\""));
    }

    #[test]
    fn test_save_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let entries = month_schedule(site("phoenix"), CelestialBody::Sun, 2026, 3);
        let path = save_month(tmp.path(), "phoenix", CelestialBody::Sun, 2026, 3, &entries).unwrap();
        assert!(path.ends_with("phoenix/sun/2026-03.json"));
        let loaded = load_month(tmp.path(), "phoenix", CelestialBody::Sun, 2026, 3).unwrap();
        assert_eq!(loaded, entries);
    }

    #[test]
    fn test_load_missing_month_is_empty() {
        let tmp = TempDir::new().unwrap();
        let loaded = load_month(tmp.path(), "ojai", CelestialBody::Moon, 2026, 1).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_malformed_schedule_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = schedule_path(tmp.path(), "ojai", CelestialBody::Sun, 2026, 1);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();
        let err = load_month(tmp.path(), "ojai", CelestialBody::Sun, 2026, 1).unwrap_err();
        assert!(matches!(err, ScheduleError::Malformed(..)));
    }

    #[test]
    fn test_load_all_tags_body_and_site() {
        let tmp = TempDir::new().unwrap();
        for id in ["phoenix", "ojai"] {
            let entries = month_schedule(site(id), CelestialBody::Sun, 2026, 2);
            save_month(tmp.path(), id, CelestialBody::Sun, 2026, 2, &entries).unwrap();
        }
        let all = load_all(tmp.path(), 2026, 2).unwrap();
        assert_eq!(all.len(), 56);
        assert!(all.iter().any(|c| c.location_id == "phoenix"));
        assert!(all.iter().all(|c| c.body == CelestialBody::Sun));
    }

    #[test]
    fn test_find_capture_within_hour() {
        let entries = vec![combined("2026-02-01", "15:28")];
        let hit = find_capture_this_hour(&entries, at((2026, 2, 1), (15, 10, 0))).unwrap();
        assert_eq!(hit.wait_seconds, 18 * 60);
        assert_eq!(hit.entry.location_id, "phoenix");
    }

    #[test]
    fn test_find_skips_other_hours_and_days() {
        let entries = vec![combined("2026-02-01", "15:28")];
        assert!(find_capture_this_hour(&entries, at((2026, 2, 1), (14, 59, 0))).is_none());
        assert!(find_capture_this_hour(&entries, at((2026, 2, 2), (15, 10, 0))).is_none());
    }

    #[test]
    fn test_grace_period() {
        let entries = vec![combined("2026-02-01", "15:28")];
        // 30 seconds late: still pending, wait clamped to zero
        let hit = find_capture_this_hour(&entries, at((2026, 2, 1), (15, 28, 30))).unwrap();
        assert_eq!(hit.wait_seconds, 0);
        // two minutes late: gone
        assert!(find_capture_this_hour(&entries, at((2026, 2, 1), (15, 30, 0))).is_none());
    }
}

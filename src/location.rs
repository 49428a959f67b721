//! The fixed capture-site registry.
//!
//! Six observation sites, built at compile time and iterated in declaration
//! order. Latitude is carried on each record for the sites' own sake; the
//! noon formula consumes only longitude and the civil UTC offset.

use chrono_tz::Tz;

/// An observation site.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    /// Filesystem-safe identifier, used in schedule data paths.
    pub id: &'static str,
    /// Display label.
    pub name: &'static str,
    /// Signed decimal degrees. Not consumed by the noon formula.
    pub lat: f64,
    /// Signed decimal degrees, conventionally [-180, 180].
    pub lon: f64,
    /// Civil timezone offset from UTC, whole hours.
    pub utc_offset_hours: i32,
    /// IANA zone, used only for schedule conversion.
    pub tz: Tz,
}

/// Registry of capture sites, in output order.
pub const LOCATIONS: [Location; 6] = [
    Location {
        id: "englewood",
        name: "Englewood Beach, FL",
        lat: 26.9184,
        lon: -82.3568,
        utc_offset_hours: -5,
        tz: Tz::America__New_York,
    },
    Location {
        id: "ojai",
        name: "Ojai, CA",
        lat: 34.4480,
        lon: -119.2430,
        utc_offset_hours: -8,
        tz: Tz::America__Los_Angeles,
    },
    Location {
        id: "peaks-island",
        name: "Peaks Island, ME",
        lat: 43.6570,
        lon: -70.1962,
        utc_offset_hours: -5,
        tz: Tz::America__New_York,
    },
    Location {
        id: "prescott",
        name: "Prescott, AZ",
        lat: 34.5400,
        lon: -112.4685,
        utc_offset_hours: -7,
        tz: Tz::America__Phoenix,
    },
    Location {
        id: "fountain-hills",
        name: "Fountain Hills, AZ",
        lat: 33.6117,
        lon: -111.7174,
        utc_offset_hours: -7,
        tz: Tz::America__Phoenix,
    },
    Location {
        id: "phoenix",
        name: "Phoenix, AZ",
        lat: 33.4484,
        lon: -112.0740,
        utc_offset_hours: -7,
        tz: Tz::America__Phoenix,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Offset, TimeZone};

    #[test]
    fn test_registry_ids_are_unique_and_path_safe() {
        for (i, a) in LOCATIONS.iter().enumerate() {
            assert!(a.id.chars().all(|c| c.is_ascii_lowercase() || c == '-'),
                "id '{}' is not path-safe", a.id);
            for b in &LOCATIONS[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn test_offsets_match_standard_time() {
        // Registry offsets are the winter offsets of each site's zone.
        let dt = NaiveDate::from_ymd_opt(2026, 1, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        for loc in &LOCATIONS {
            let seconds = loc.tz.offset_from_utc_datetime(&dt).fix().local_minus_utc();
            assert_eq!(seconds, loc.utc_offset_hours * 3600, "{} offset mismatch", loc.id);
        }
    }

    #[test]
    fn test_coordinates_in_range() {
        for loc in &LOCATIONS {
            assert!((-90.0..=90.0).contains(&loc.lat), "{} latitude", loc.id);
            assert!((-180.0..=180.0).contains(&loc.lon), "{} longitude", loc.id);
        }
    }
}

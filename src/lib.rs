//! Analemma Chronos: solar-noon estimation and capture scheduling for a
//! fixed registry of observation sites.
//!
//! The noon estimate is pure timezone geometry: 15 degrees of longitude per
//! hour of UTC offset, 4 minutes of clock time per degree. Schedules pair
//! each capture's wall time at the site with the observer's home clock.

pub mod location;
pub mod noon;
pub mod schedule;

//! Solar position calculations for the brightness baseline.
//!
//! This module provides the solar elevation angle for a geographic coordinate
//! at an instant, using the NOAA solar position algorithm. Elevation feeds the
//! baseline-brightness curve on every poll. It also computes today's sunrise
//! and sunset times for the startup diagnostics block.

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, Timelike, Utc};
use sunrise::{Coordinates, SolarDay, SolarEvent};

/// Validate geographic coordinates, shared by the calculations below.
fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        anyhow::bail!(
            "Invalid latitude: {}. Must be between -90 and 90 degrees",
            latitude
        );
    }
    if !(-180.0..=180.0).contains(&longitude) {
        anyhow::bail!(
            "Invalid longitude: {}. Must be between -180 and 180 degrees",
            longitude
        );
    }
    Ok(())
}

/// Calculate the solar elevation angle in degrees for a location and instant.
///
/// Implements the NOAA solar position algorithm: Julian century, solar
/// declination and the equation of time give the sun's hour angle, from which
/// the zenith angle follows. Accuracy is within a small fraction of a degree,
/// far below what a brightness curve can resolve. Atmospheric refraction is
/// not applied; near the horizon it shifts elevation by about half a degree,
/// which the baseline curves flatten out anyway.
///
/// # Arguments
/// * `latitude` - Geographic latitude in degrees (-90 to +90)
/// * `longitude` - Geographic longitude in degrees (-180 to +180)
/// * `instant` - UTC instant to evaluate
///
/// # Returns
/// * `Ok(elevation)` - Degrees above the horizon (negative below it)
/// * `Err(_)` - If the coordinates are out of range
pub fn solar_elevation(latitude: f64, longitude: f64, instant: DateTime<Utc>) -> Result<f64> {
    validate_coordinates(latitude, longitude)?;

    // Julian date from the Unix epoch offset, then Julian century
    let unix_seconds = instant.timestamp() as f64 + instant.timestamp_subsec_millis() as f64 / 1e3;
    let julian_day = unix_seconds / 86400.0 + 2440587.5;
    let jc = (julian_day - 2451545.0) / 36525.0;

    // Geometric mean longitude and anomaly of the sun (degrees)
    let mean_long = (280.46646 + jc * (36000.76983 + jc * 0.0003032)).rem_euclid(360.0);
    let mean_anom = 357.52911 + jc * (35999.05029 - 0.0001537 * jc);
    let eccentricity = 0.016708634 - jc * (0.000042037 + 0.0000001267 * jc);

    // Equation of center and the sun's apparent longitude
    let anom_rad = mean_anom.to_radians();
    let eq_of_center = anom_rad.sin() * (1.914602 - jc * (0.004817 + 0.000014 * jc))
        + (2.0 * anom_rad).sin() * (0.019993 - 0.000101 * jc)
        + (3.0 * anom_rad).sin() * 0.000289;
    let true_long = mean_long + eq_of_center;
    let omega = (125.04 - 1934.136 * jc).to_radians();
    let apparent_long = true_long - 0.00569 - 0.00478 * omega.sin();

    // Obliquity of the ecliptic and solar declination
    let mean_obliquity =
        23.0 + (26.0 + (21.448 - jc * (46.815 + jc * (0.00059 - jc * 0.001813))) / 60.0) / 60.0;
    let obliquity = mean_obliquity + 0.00256 * omega.cos();
    let declination = (obliquity.to_radians().sin() * apparent_long.to_radians().sin())
        .asin()
        .to_degrees();

    // Equation of time (minutes)
    let var_y = (obliquity.to_radians() / 2.0).tan().powi(2);
    let mean_long_rad = mean_long.to_radians();
    let eq_of_time = 4.0
        * (var_y * (2.0 * mean_long_rad).sin() - 2.0 * eccentricity * anom_rad.sin()
            + 4.0 * eccentricity * var_y * anom_rad.sin() * (2.0 * mean_long_rad).cos()
            - 0.5 * var_y * var_y * (4.0 * mean_long_rad).sin()
            - 1.25 * eccentricity * eccentricity * (2.0 * anom_rad).sin())
        .to_degrees();

    // True solar time and hour angle at this longitude
    let minutes_past_midnight = instant.hour() as f64 * 60.0
        + instant.minute() as f64
        + instant.second() as f64 / 60.0;
    let true_solar_time =
        (minutes_past_midnight + eq_of_time + 4.0 * longitude).rem_euclid(1440.0);
    let hour_angle = true_solar_time / 4.0 - 180.0;

    // Zenith angle from the spherical triangle, elevation is its complement
    let lat_rad = latitude.to_radians();
    let dec_rad = declination.to_radians();
    let cos_zenith = lat_rad.sin() * dec_rad.sin()
        + lat_rad.cos() * dec_rad.cos() * hour_angle.to_radians().cos();
    let zenith = cos_zenith.clamp(-1.0, 1.0).acos().to_degrees();

    Ok(90.0 - zenith)
}

/// Calculate today's sunrise and sunset times in local time for a location.
///
/// Used only for the startup diagnostics block, so the user can sanity-check
/// their configured coordinates against what the daylight tracking will do.
///
/// # Arguments
/// * `latitude` - Geographic latitude in degrees (-90 to +90)
/// * `longitude` - Geographic longitude in degrees (-180 to +180)
/// * `date` - Date for which to calculate sunrise/sunset
///
/// # Returns
/// * `Ok((sunrise_time, sunset_time))` - Local times of the solar events
/// * `Err(_)` - If the coordinates are invalid
pub fn sunrise_sunset_local(
    latitude: f64,
    longitude: f64,
    date: NaiveDate,
) -> Result<(NaiveTime, NaiveTime)> {
    validate_coordinates(latitude, longitude)?;

    let coord = Coordinates::new(latitude, longitude)
        .ok_or_else(|| anyhow::anyhow!("Failed to create coordinates"))?;
    let solar_day = SolarDay::new(coord, date);

    let sunrise_time = solar_day
        .event_time(SolarEvent::Sunrise)
        .with_timezone(&Local)
        .time();
    let sunset_time = solar_day
        .event_time(SolarEvent::Sunset)
        .with_timezone(&Local)
        .time();

    Ok((sunrise_time, sunset_time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rejects_invalid_coordinates() {
        let now = Utc::now();
        assert!(solar_elevation(91.0, 0.0, now).is_err());
        assert!(solar_elevation(-91.0, 0.0, now).is_err());
        assert!(solar_elevation(0.0, 181.0, now).is_err());
        assert!(solar_elevation(0.0, -181.0, now).is_err());
        assert!(solar_elevation(45.0, 12.0, now).is_ok());
    }

    #[test]
    fn equinox_noon_at_greenwich_equator_is_near_zenith() {
        // March equinox 2025, solar noon near 12:00 UTC at (0, 0)
        let instant = Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
        let elevation = solar_elevation(0.0, 0.0, instant).unwrap();
        assert!(elevation > 80.0, "expected near-zenith sun, got {elevation}");
    }

    #[test]
    fn equinox_midnight_at_greenwich_equator_is_deep_below_horizon() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 20, 0, 0, 0).unwrap();
        let elevation = solar_elevation(0.0, 0.0, instant).unwrap();
        assert!(elevation < -70.0, "expected sun far below horizon, got {elevation}");
    }

    #[test]
    fn summer_noon_in_temperate_north_is_high_but_not_zenith() {
        // Amsterdam (52.37N, 4.90E) around local solar noon on the June solstice
        let instant = Utc.with_ymd_and_hms(2025, 6, 21, 11, 40, 0).unwrap();
        let elevation = solar_elevation(52.37, 4.90, instant).unwrap();
        assert!(
            (55.0..=65.0).contains(&elevation),
            "expected roughly 61 degrees, got {elevation}"
        );
    }

    #[test]
    fn winter_night_in_temperate_north_is_below_horizon() {
        let instant = Utc.with_ymd_and_hms(2025, 12, 21, 22, 0, 0).unwrap();
        let elevation = solar_elevation(52.37, 4.90, instant).unwrap();
        assert!(elevation < 0.0);
    }

    #[test]
    fn elevation_declines_through_the_afternoon() {
        let noon = Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
        let afternoon = Utc.with_ymd_and_hms(2025, 3, 20, 15, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2025, 3, 20, 18, 30, 0).unwrap();
        let e_noon = solar_elevation(0.0, 0.0, noon).unwrap();
        let e_afternoon = solar_elevation(0.0, 0.0, afternoon).unwrap();
        let e_evening = solar_elevation(0.0, 0.0, evening).unwrap();
        assert!(e_noon > e_afternoon);
        assert!(e_afternoon > e_evening);
    }

    #[test]
    fn june_daylight_in_new_york_lasts_about_fifteen_hours() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 21).unwrap();
        let (sunrise, sunset) = sunrise_sunset_local(40.7128, -74.0060, date).unwrap();
        // Local times can wrap past midnight depending on the host timezone,
        // so compare through the daylight span rather than direct ordering
        let mut daylight = sunset - sunrise;
        if daylight < chrono::Duration::zero() {
            daylight += chrono::Duration::days(1);
        }
        let minutes = daylight.num_minutes();
        assert!(
            (14 * 60..=16 * 60).contains(&minutes),
            "unexpected daylight length: {minutes} minutes"
        );
    }
}

//! Unit conversions from an estimate to what the kiosk displays.

use std::fmt;

use crate::util::round2;

pub const CM_PER_FOOT: f64 = 30.48;
pub const CM_PER_INCH: f64 = 2.54;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightReport {
    /// Height above the floor, 2 decimals.
    pub cm: f64,
    pub feet: u32,
    pub inches: u32,
}

impl HeightReport {
    /// `"5 feet 7 inches"`.
    pub fn feet_and_inches(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HeightReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} feet {} inches", self.feet, self.inches)
    }
}

/// Subject height from the sensor-to-head distance.
///
/// `height_cm = max(0, reference_height_cm - distance_cm)`. Inches are rounded
/// to the nearest whole inch; when that rounds up to 12 and
/// `normalize_inches` is set, it carries into the feet count.
pub fn height_report(
    distance_cm: f64,
    reference_height_cm: f64,
    normalize_inches: bool,
) -> HeightReport {
    let cm = round2((reference_height_cm - distance_cm).max(0.0));
    let mut feet = (cm / CM_PER_FOOT).floor() as u32;
    let mut inches = ((cm % CM_PER_FOOT) / CM_PER_INCH).round() as u32;
    if normalize_inches && inches >= 12 {
        feet += inches / 12;
        inches %= 12;
    }
    HeightReport { cm, feet, inches }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureReport {
    pub celsius: f64,
    pub fahrenheit: f64,
}

#[inline]
pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    round2(c * 9.0 / 5.0 + 32.0)
}

pub fn temperature_report(celsius: f64) -> TemperatureReport {
    TemperatureReport {
        celsius,
        fahrenheit: celsius_to_fahrenheit(celsius),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let r = height_report(30.0, 200.0, true);
        assert_eq!(r.feet_and_inches(), "5 feet 7 inches");
        assert_eq!(r.cm, 170.0);
    }

    #[test]
    fn never_negative() {
        let r = height_report(250.0, 200.0, true);
        assert_eq!((r.cm, r.feet, r.inches), (0.0, 0, 0));
    }
}

use serde::{Deserialize, Serialize};

/// Distance bucket of a trip. It selects the emission factor of flights, since
/// take-off and landing weigh more on short flights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeCategory {
    VeryShortHaul,
    ShortHaul,
    MediumHaul,
    LongHaul,
}

impl RangeCategory {
    /// Classifies a distance in km. Upper bounds are inclusive.
    ///
    /// Zero and negative distances are not rejected and classify as
    /// [`RangeCategory::VeryShortHaul`].
    pub fn classify(distance: f64) -> Self {
        if distance <= 500.0 {
            Self::VeryShortHaul
        } else if distance <= 1500.0 {
            Self::ShortHaul
        } else if distance <= 4000.0 {
            Self::MediumHaul
        } else {
            Self::LongHaul
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::VeryShortHaul => "very short haul",
            Self::ShortHaul => "short haul",
            Self::MediumHaul => "medium haul",
            Self::LongHaul => "long haul",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::VeryShortHaul => "below 500 km",
            Self::ShortHaul => "500 to 1500 km",
            Self::MediumHaul => "1500 to 4000 km",
            Self::LongHaul => "above 4000 km",
        }
    }
}

impl std::fmt::Display for RangeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Range of a bus or train connection. Chosen by the caller, not derived from
/// the distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleRange {
    #[serde(rename = "local")]
    Local,
    #[default]
    #[serde(rename = "long-distance")]
    LongDistance,
}

impl std::fmt::Display for VehicleRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::LongDistance => "long-distance",
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn check(distance: f64, name: &str, description: &str) {
        let category = RangeCategory::classify(distance);
        assert_eq!(category.name(), name, "{distance}");
        assert_eq!(category.description(), description, "{distance}");
    }

    #[test]
    fn boundaries() {
        check(0.0, "very short haul", "below 500 km");
        check(42.7, "very short haul", "below 500 km");
        check(500.0, "very short haul", "below 500 km");
        check(501.0, "short haul", "500 to 1500 km");
        check(1500.0, "short haul", "500 to 1500 km");
        check(1501.0, "medium haul", "1500 to 4000 km");
        check(4000.0, "medium haul", "1500 to 4000 km");
        check(4001.0, "long haul", "above 4000 km");
    }

    #[test]
    fn signed_distances_are_very_short_haul() {
        check(-42.7, "very short haul", "below 500 km");
        check(-500.0, "very short haul", "below 500 km");
    }

    #[test]
    fn default_vehicle_range() {
        assert_eq!(VehicleRange::default(), VehicleRange::LongDistance);
        assert_eq!(VehicleRange::LongDistance.to_string(), "long-distance");
    }
}

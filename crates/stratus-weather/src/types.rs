use serde::Deserialize;

/// Placeholder shown when a place candidate carries no region.
pub const UNKNOWN_REGION: &str = "Unknown region";
/// Placeholder shown when a place candidate carries no country.
pub const UNKNOWN_COUNTRY: &str = "Unknown country";

/// A place returned by the geocoding search endpoint.
///
/// Produced fresh per request; never persisted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaceCandidate {
    pub id: i64,
    pub name: String,
    pub admin1: Option<String>,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl PlaceCandidate {
    /// Display label: "name, admin1, country" with absent parts skipped.
    pub fn label(&self) -> String {
        let mut parts = vec![self.name.as_str()];
        if let Some(admin1) = self.admin1.as_deref() {
            parts.push(admin1);
        }
        if let Some(country) = self.country.as_deref() {
            parts.push(country);
        }
        parts.join(", ")
    }
}

/// The resolved location every forecast consumer reads.
///
/// Immutable once constructed; the pipeline replaces it wholesale on each
/// successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedLocation {
    pub city: String,
    pub region: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl SelectedLocation {
    /// "City, Region, Country" as shown above every view.
    pub fn display(&self) -> String {
        format!("{}, {}, {}", self.city, self.region, self.country)
    }
}

impl From<&PlaceCandidate> for SelectedLocation {
    fn from(candidate: &PlaceCandidate) -> Self {
        Self {
            city: candidate.name.clone(),
            region: candidate
                .admin1
                .clone()
                .unwrap_or_else(|| UNKNOWN_REGION.to_string()),
            country: candidate
                .country
                .clone()
                .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string()),
            latitude: candidate.latitude,
            longitude: candidate.longitude,
        }
    }
}

/// Current conditions for a coordinate pair.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentConditions {
    pub temperature_2m: f64,
    pub weather_code: i32,
    pub wind_speed_10m: f64,
}

/// One hour of today's forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySample {
    pub time: String,
    pub temperature_2m: f64,
    pub weather_code: i32,
    pub wind_speed_10m: f64,
}

/// One day of the weekly forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySample {
    pub date: String,
    pub temperature_2m_max: f64,
    pub temperature_2m_min: f64,
    pub weather_code: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(admin1: Option<&str>, country: Option<&str>) -> PlaceCandidate {
        PlaceCandidate {
            id: 1,
            name: "Paris".to_string(),
            admin1: admin1.map(String::from),
            country: country.map(String::from),
            latitude: 48.85,
            longitude: 2.35,
        }
    }

    #[test]
    fn test_label_skips_absent_parts() {
        assert_eq!(
            candidate(Some("Île-de-France"), Some("France")).label(),
            "Paris, Île-de-France, France"
        );
        assert_eq!(candidate(None, Some("France")).label(), "Paris, France");
        assert_eq!(candidate(None, None).label(), "Paris");
    }

    #[test]
    fn test_selected_location_defaults_missing_fields() {
        let location = SelectedLocation::from(&candidate(None, None));
        assert_eq!(location.city, "Paris");
        assert_eq!(location.region, UNKNOWN_REGION);
        assert_eq!(location.country, UNKNOWN_COUNTRY);
        assert_eq!(location.latitude, 48.85);
    }

    #[test]
    fn test_selected_location_display() {
        let location = SelectedLocation::from(&candidate(Some("Île-de-France"), Some("France")));
        assert_eq!(location.display(), "Paris, Île-de-France, France");
    }
}

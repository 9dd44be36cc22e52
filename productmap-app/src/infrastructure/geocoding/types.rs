use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ReverseResponse {
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub municipality: Option<String>,
    pub county: Option<String>,
}

impl Address {
    /// The most specific settlement name present.
    pub fn locality(&self) -> Option<&str> {
        [
            &self.city,
            &self.town,
            &self.village,
            &self.municipality,
            &self.county,
        ]
        .into_iter()
        .flatten()
        .map(|name| name.trim())
        .find(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> ReverseResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_prefers_city_over_smaller_units() {
        let response = parse(json!({
            "display_name": "University Avenue, Palo Alto",
            "address": {"city": "Palo Alto", "county": "Santa Clara County", "country": "United States"}
        }));
        assert_eq!(response.address.unwrap().locality(), Some("Palo Alto"));
    }

    #[test]
    fn test_falls_back_to_town_then_county() {
        let town = parse(json!({"address": {"town": "Los Gatos", "county": "Santa Clara County"}}));
        assert_eq!(town.address.unwrap().locality(), Some("Los Gatos"));

        let county = parse(json!({"address": {"city": " ", "county": "Marin County"}}));
        assert_eq!(county.address.unwrap().locality(), Some("Marin County"));
    }

    #[test]
    fn test_unresolvable_location() {
        let response = parse(json!({"error": "Unable to geocode"}));
        assert!(response.address.is_none());
        assert_eq!(response.error.as_deref(), Some("Unable to geocode"));
    }
}

//! Reference city registry for side-by-side AQI comparison.
//!
//! Defines the default set of metro areas a user's location is compared
//! against. The list can be overridden in the `[comparison]` section of the
//! config file; this registry only supplies the default.

/// Default comparison cities: the four largest CPCB-monitored metros, as
/// names passed to the geocoder.
pub static REFERENCE_CITIES: &[&str] = &["Delhi", "Mumbai", "Bengaluru", "Kolkata"];

/// Names of all reference cities, in registry order.
pub fn reference_city_names() -> Vec<String> {
    REFERENCE_CITIES.iter().map(|name| name.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_duplicate_city_names() {
        let mut seen = std::collections::HashSet::new();
        for name in REFERENCE_CITIES {
            assert!(
                seen.insert(name.to_ascii_lowercase()),
                "duplicate city '{}' found in REFERENCE_CITIES",
                name
            );
        }
    }

    #[test]
    fn test_names_are_trimmed_and_non_empty() {
        for name in REFERENCE_CITIES {
            assert!(!name.is_empty() && name.trim() == *name, "bad city name '{}'", name);
        }
    }

    #[test]
    fn test_names_helper_matches_registry_order() {
        assert_eq!(reference_city_names(), vec!["Delhi", "Mumbai", "Bengaluru", "Kolkata"]);
    }
}

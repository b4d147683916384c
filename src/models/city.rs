use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// City row as returned by the city lookup.
///
/// Lookup rows may carry numeric ids and `null` for optional columns; both
/// are normalized on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub country: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state_province: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub population: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_capital: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub latitude: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub longitude: f64,
}

impl City {
    /// Whether `needle` (already lowercased) appears in the name, region or country
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.state_province.to_lowercase().contains(needle)
            || self.country.to_lowercase().contains(needle)
    }

    pub fn name_starts_with(&self, needle: &str) -> bool {
        self.name.to_lowercase().starts_with(needle)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string or numeric id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_lookup_row_with_nulls() {
        let row = json!({
            "id": 1,
            "name": "Manama",
            "country": "Bahrain",
            "country_code": "BH",
            "state_province": null,
            "population": null,
            "is_capital": true,
            "latitude": 26.2285,
            "longitude": null
        });
        let city: City = serde_json::from_value(row).unwrap();
        assert_eq!(city.id, "1");
        assert_eq!(city.name, "Manama");
        assert_eq!(city.state_province, "");
        assert_eq!(city.population, 0);
        assert!(city.is_capital);
        assert_eq!(city.longitude, 0.0);
    }

    #[test]
    fn test_missing_optional_columns_default() {
        let city: City = serde_json::from_value(json!({
            "id": "c-1",
            "name": "Doha",
            "country": "Qatar"
        }))
        .unwrap();
        assert_eq!(city.id, "c-1");
        assert_eq!(city.country_code, "");
        assert!(!city.is_capital);
    }

    #[test]
    fn test_rejects_object_id() {
        let err = serde_json::from_value::<City>(json!({
            "id": {"x": 1},
            "name": "Doha",
            "country": "Qatar"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("string or numeric id"));
    }
}

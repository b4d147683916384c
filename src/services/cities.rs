//! Built-in city table used when no lookup table is available.

use crate::models::city::City;

#[allow(clippy::too_many_arguments)]
fn row(
    id: &str,
    name: &str,
    country: &str,
    country_code: &str,
    state_province: &str,
    population: u64,
    is_capital: bool,
    latitude: f64,
    longitude: f64,
) -> City {
    City {
        id: id.to_string(),
        name: name.to_string(),
        country: country.to_string(),
        country_code: country_code.to_string(),
        state_province: state_province.to_string(),
        population,
        is_capital,
        latitude,
        longitude,
    }
}

/// Major US, international and Gulf cities
#[rustfmt::skip]
pub fn builtin_cities() -> Vec<City> {
    vec![
        row("1", "New York", "United States", "US", "New York", 8_336_817, false, 40.7128, -74.0060),
        row("2", "Los Angeles", "United States", "US", "California", 3_979_576, false, 34.0522, -118.2437),
        row("3", "Chicago", "United States", "US", "Illinois", 2_693_976, false, 41.8781, -87.6298),
        row("4", "Houston", "United States", "US", "Texas", 2_320_268, false, 29.7604, -95.3698),
        row("5", "Phoenix", "United States", "US", "Arizona", 1_680_992, true, 33.4484, -112.0740),
        row("6", "Philadelphia", "United States", "US", "Pennsylvania", 1_584_064, false, 39.9526, -75.1652),
        row("7", "San Antonio", "United States", "US", "Texas", 1_547_253, false, 29.4241, -98.4936),
        row("8", "San Diego", "United States", "US", "California", 1_423_851, false, 32.7157, -117.1611),
        row("9", "Dallas", "United States", "US", "Texas", 1_343_573, false, 32.7767, -96.7970),
        row("10", "San Jose", "United States", "US", "California", 1_035_317, false, 37.3382, -121.8863),
        row("11", "Austin", "United States", "US", "Texas", 978_908, true, 30.2672, -97.7431),
        row("12", "Jacksonville", "United States", "US", "Florida", 949_611, false, 30.3322, -81.6557),
        row("13", "Fort Worth", "United States", "US", "Texas", 918_915, false, 32.7555, -97.3308),
        row("14", "Columbus", "United States", "US", "Ohio", 898_553, true, 39.9612, -82.9988),
        row("15", "Charlotte", "United States", "US", "North Carolina", 885_708, false, 35.2271, -80.8431),
        row("16", "Seattle", "United States", "US", "Washington", 749_256, false, 47.6062, -122.3321),
        row("17", "Denver", "United States", "US", "Colorado", 715_522, true, 39.7392, -104.9903),
        row("18", "Washington", "United States", "US", "District of Columbia", 705_749, true, 38.9072, -77.0369),
        row("19", "Boston", "United States", "US", "Massachusetts", 692_600, true, 42.3601, -71.0589),
        row("20", "El Paso", "United States", "US", "Texas", 681_728, false, 31.7619, -106.4850),
        row("21", "London", "United Kingdom", "GB", "England", 8_982_000, true, 51.5074, -0.1278),
        row("22", "Paris", "France", "FR", "Île-de-France", 2_161_000, true, 48.8566, 2.3522),
        row("23", "Tokyo", "Japan", "JP", "Tokyo", 13_960_000, true, 35.6762, 139.6503),
        row("24", "Sydney", "Australia", "AU", "New South Wales", 5_312_000, false, -33.8688, 151.2093),
        row("25", "Toronto", "Canada", "CA", "Ontario", 2_930_000, false, 43.6532, -79.3832),
        row("26", "Berlin", "Germany", "DE", "Berlin", 3_769_000, true, 52.5200, 13.4050),
        row("27", "Madrid", "Spain", "ES", "Madrid", 3_223_000, true, 40.4168, -3.7038),
        row("28", "Rome", "Italy", "IT", "Lazio", 2_873_000, true, 41.9028, 12.4964),
        row("29", "Amsterdam", "Netherlands", "NL", "North Holland", 872_680, true, 52.3676, 4.9041),
        row("30", "Vancouver", "Canada", "CA", "British Columbia", 675_218, false, 49.2827, -123.1207),
        row("31", "Manama", "Bahrain", "BH", "Capital Governorate", 200_000, true, 26.0667, 50.5577),
        row("32", "Dubai", "United Arab Emirates", "AE", "Dubai", 3_400_000, false, 25.2048, 55.2708),
        row("33", "Abu Dhabi", "United Arab Emirates", "AE", "Abu Dhabi", 1_450_000, true, 24.4539, 54.3773),
        row("34", "Riyadh", "Saudi Arabia", "SA", "Riyadh", 8_000_000, true, 24.7136, 46.6753),
        row("35", "Doha", "Qatar", "QA", "Doha", 1_200_000, true, 25.2854, 51.5310),
        row("36", "Kuwait City", "Kuwait", "KW", "Kuwait", 3_000_000, true, 29.3759, 47.9774),
        row("37", "Muscat", "Oman", "OM", "Muscat", 1_500_000, true, 23.5880, 58.3829),
        row("38", "Tehran", "Iran", "IR", "Tehran", 9_000_000, true, 35.6892, 51.3890),
        row("39", "Istanbul", "Turkey", "TR", "Istanbul", 15_500_000, false, 41.0082, 28.9784),
        row("40", "Cairo", "Egypt", "EG", "Cairo", 20_000_000, true, 30.0444, 31.2357),
    ]
}

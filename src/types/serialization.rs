use std::fs::File;
use std::path::Path;

use serde::Deserialize;

use super::{City, TspError};

// The raw shape of the city data file. Names are optional in the file and get
// resolved into the City here, once, rather than looked up again at render
// time.
#[derive(Deserialize)]
struct CityFile {
    locations: Vec<RawLocation>,
}

#[derive(Deserialize)]
struct RawLocation {
    id: u64,
    name: Option<String>,
    latitude: f64,
    longitude: f64,
}

// Loads the ordered city list from a JSON data file of the form
// `{"locations": [{"id": .., "name": .., "latitude": .., "longitude": ..}]}`.
//
// Fails fast on an empty list or a duplicate id so no solver ever sees a
// malformed city set.
pub fn load_cities_from_json(data_file_path: &Path) -> Result<Vec<City>, TspError> {
    let data_file = File::open(data_file_path)?;
    let city_file: CityFile = serde_json::from_reader(data_file)?;

    parse_locations(city_file)
}

fn parse_locations(city_file: CityFile) -> Result<Vec<City>, TspError> {
    if city_file.locations.is_empty() {
        return Err(TspError::EmptyCityList);
    }

    let mut cities: Vec<City> = vec![];
    for location in city_file.locations {
        if cities.iter().any(|city| city.id == location.id) {
            return Err(TspError::DuplicateCityId(location.id));
        }

        cities.push(City::new(
            location.id,
            location.name,
            location.longitude,
            location.latitude,
        ));
    }

    return Ok(cities);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(raw: &str) -> Result<Vec<City>, TspError> {
        let city_file: CityFile = serde_json::from_str(raw).unwrap();
        parse_locations(city_file)
    }

    #[test]
    fn parses_locations_with_and_without_names() {
        let cities = parse_str(
            r#"{"locations": [
                {"id": 1, "name": "Hanoi", "latitude": 21.0285, "longitude": 105.8542},
                {"id": 2, "latitude": 10.8231, "longitude": 106.6297}
            ]}"#,
        )
        .unwrap();

        assert_eq!(cities.len(), 2);
        assert_eq!(cities[0].display_name(), "Hanoi");
        assert_eq!(cities[1].display_name(), "City 2");
        assert_eq!(cities[0].y, 21.0285);
        assert_eq!(cities[0].x, 105.8542);
    }

    #[test]
    fn rejects_empty_location_list() {
        let result = parse_str(r#"{"locations": []}"#);
        assert!(matches!(result, Err(TspError::EmptyCityList)));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let result = parse_str(
            r#"{"locations": [
                {"id": 7, "latitude": 0.0, "longitude": 0.0},
                {"id": 7, "latitude": 1.0, "longitude": 1.0}
            ]}"#,
        );
        assert!(matches!(result, Err(TspError::DuplicateCityId(7))));
    }
}

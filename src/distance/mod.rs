use std::collections::{BTreeSet, HashMap};

use ndarray::Array2;

use crate::types::{City, TspError};

const EARTH_RADIUS_KM: f64 = 6371.0;

// Great-circle distance in kilometres between two (latitude, longitude)
// points in degrees. Geographic city sets need this rather than planar
// Euclidean distance: two points that look close on a flat projection can be
// far apart once latitude is accounted for.
pub fn haversine_distance(lat1_deg: f64, lon1_deg: f64, lat2_deg: f64, lon2_deg: f64) -> f64 {
    let lat1 = lat1_deg.to_radians();
    let lat2 = lat2_deg.to_radians();
    let delta_lat = (lat2_deg - lat1_deg).to_radians();
    let delta_lon = (lon2_deg - lon1_deg).to_radians();

    let a =
        (delta_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    return EARTH_RADIUS_KM * c;
}

// Precomputed symmetric pairwise distances over a fixed city set.
//
// Built once per solve and shared by reference afterwards; it is never
// mutated, so every tour and solver derived from the same city set can read
// it concurrently. Lookups are O(1) through an id-to-index map backed by a
// dense matrix.
pub struct DistanceTable {
    id_to_index: HashMap<u64, usize>,
    distances: Array2<f64>,
}

impl DistanceTable {
    // Computes the full matrix in O(n^2). Fails fast on an empty city list
    // or a duplicate id so a malformed city set never reaches a solver.
    pub fn build(cities: &[City]) -> Result<DistanceTable, TspError> {
        if cities.is_empty() {
            return Err(TspError::EmptyCityList);
        }

        let mut id_to_index: HashMap<u64, usize> = HashMap::with_capacity(cities.len());
        for (i, city) in cities.iter().enumerate() {
            if id_to_index.insert(city.id, i).is_some() {
                return Err(TspError::DuplicateCityId(city.id));
            }
        }

        let num_cities = cities.len();
        let mut distances = Array2::zeros((num_cities, num_cities));
        for i in 0..num_cities {
            for j in i + 1..num_cities {
                let distance =
                    haversine_distance(cities[i].y, cities[i].x, cities[j].y, cities[j].x);
                distances[[i, j]] = distance;
                distances[[j, i]] = distance;
            }
        }

        return Ok(DistanceTable {
            id_to_index,
            distances,
        });
    }

    pub fn contains(&self, city_id: u64) -> bool {
        return self.id_to_index.contains_key(&city_id);
    }

    fn index_of(&self, city_id: u64) -> usize {
        return *self.id_to_index.get(&city_id).expect(&format!(
            "city id {} was not part of this distance table",
            city_id
        ));
    }

    // O(1) lookup of the distance between two city ids. Ids not present at
    // construction are a hard failure, never an infinity sentinel: a silent
    // infinity would corrupt every distance sum built on top of it.
    pub fn distance(&self, city_id_a: u64, city_id_b: u64) -> f64 {
        let a = self.index_of(city_id_a);
        let b = self.index_of(city_id_b);

        return self.distances[[a, b]];
    }

    // The unvisited city nearest to `from_id`. The set iterates in ascending
    // id order and the comparison is strict, so ties deterministically go to
    // the lowest id.
    pub fn nearest_unvisited(&self, from_id: u64, unvisited: &BTreeSet<u64>) -> Option<u64> {
        let mut best_distance = f64::INFINITY;
        let mut nearest = None;

        for &candidate in unvisited {
            let distance = self.distance(from_id, candidate);
            if distance < best_distance {
                best_distance = distance;
                nearest = Some(candidate);
            }
        }

        return nearest;
    }
}

use crate::distance::DistanceTable;
use crate::types::City;

// A closed visiting order over the city set with its total cycle length.
//
// The order and the cached distance are fixed at construction; every
// "mutation" (rotation, a 2-opt move, a velocity application) builds a new
// Tour, so the cached distance can never go stale behind the order's back.
#[derive(Debug, Clone)]
pub struct Tour {
    cities: Vec<City>,
    distance: f64,
}

impl Tour {
    pub fn new(cities: Vec<City>, table: &DistanceTable) -> Tour {
        let distance = total_cycle_distance(&cities, table);

        Tour { cities, distance }
    }

    // Builds a Tour from an order whose total distance is already known,
    // skipping the O(n) recomputation. Rotation and cloning use this: a
    // rotation never changes a cycle's length.
    pub fn with_known_distance(cities: Vec<City>, distance: f64) -> Tour {
        Tour { cities, distance }
    }

    pub fn cities(&self) -> &[City] {
        return &self.cities;
    }

    pub fn distance(&self) -> f64 {
        return self.distance;
    }

    pub fn len(&self) -> usize {
        return self.cities.len();
    }

    pub fn path_ids(&self) -> Vec<u64> {
        return self.cities.iter().map(|city| city.id).collect();
    }

    // A new Tour rotated so the requested city sits at position 0. Rotation
    // preserves cyclic order and total distance. `None`, or an id that is
    // not part of this tour, leaves the order unchanged; callers that need a
    // guarantee must check membership themselves.
    pub fn rotated_to_start(&self, start_city_id: Option<u64>) -> Tour {
        let rotated = rotate_to_start(&self.cities, start_city_id);

        Tour::with_known_distance(rotated, self.distance)
    }

    // Renders the cycle as `A -> B -> C -> A` using display names.
    pub fn render_path(&self) -> String {
        let mut names: Vec<String> = self.cities.iter().map(|city| city.display_name()).collect();
        if let Some(first) = names.first().cloned() {
            names.push(first);
        }

        return names.join(" -> ");
    }
}

// Sum of consecutive pairwise distances including the wrap-around edge from
// the last city back to the first.
pub fn total_cycle_distance(cities: &[City], table: &DistanceTable) -> f64 {
    let mut tot_distance = 0.0;

    for (i, city) in cities.iter().enumerate() {
        if i == 0 {
            tot_distance += table.distance(cities[cities.len() - 1].id, city.id);
        } else {
            tot_distance += table.distance(cities[i - 1].id, city.id);
        }
    }

    return tot_distance;
}

// Rotates a city sequence so the city with `start_city_id` comes first while
// preserving cyclic order. An absent id (or `None`) is a caller-visible
// no-op, not a failure.
pub fn rotate_to_start(cities: &[City], start_city_id: Option<u64>) -> Vec<City> {
    let start_id = match start_city_id {
        Some(start_id) => start_id,
        None => {
            return cities.to_vec();
        }
    };

    let start_index = match cities.iter().position(|city| city.id == start_id) {
        Some(start_index) => start_index,
        None => {
            return cities.to_vec();
        }
    };

    let mut rotated = Vec::with_capacity(cities.len());
    rotated.extend_from_slice(&cities[start_index..]);
    rotated.extend_from_slice(&cities[..start_index]);

    return rotated;
}

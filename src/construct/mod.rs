use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::distance::DistanceTable;
use crate::tour::Tour;
use crate::types::City;

// The seed-tour strategies, selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialMethod {
    Random,
    NearestNeighbor,
    GreedyEdge,
}

impl InitialMethod {
    pub fn from_name(name: &str) -> Option<InitialMethod> {
        match name {
            "random" => {
                return Some(InitialMethod::Random);
            }
            "nearest-neighbor" | "nn" => {
                return Some(InitialMethod::NearestNeighbor);
            }
            "greedy-edge" | "greedy" => {
                return Some(InitialMethod::GreedyEdge);
            }
            _ => {
                return None;
            }
        }
    }

    pub fn to_string(&self) -> String {
        match self {
            InitialMethod::Random => {
                return "random".to_string();
            }
            InitialMethod::NearestNeighbor => {
                return "nearest-neighbor".to_string();
            }
            InitialMethod::GreedyEdge => {
                return "greedy-edge".to_string();
            }
        }
    }
}

// Builds a seed tour by the chosen strategy and rotates it so the requested
// start city (if present) leads the order.
pub fn build_initial_tour(
    method: InitialMethod,
    cities: &[City],
    table: &DistanceTable,
    start_city_id: Option<u64>,
    rng: &mut StdRng,
) -> Tour {
    let seed_tour = match method {
        InitialMethod::Random => random_tour(cities, table, rng),
        InitialMethod::NearestNeighbor => nearest_neighbor_tour(cities, table, start_city_id),
        InitialMethod::GreedyEdge => greedy_edge_tour(cities, table),
    };

    return seed_tour.rotated_to_start(start_city_id);
}

// A uniformly random permutation of the city list. The caller's seeded RNG
// makes the permutation deterministic for a fixed seed.
pub fn random_tour(cities: &[City], table: &DistanceTable, rng: &mut StdRng) -> Tour {
    let mut order = cities.to_vec();
    order.shuffle(rng);

    return Tour::new(order, table);
}

// Starts at `start_city_id` (or the first city when unspecified or unknown)
// and repeatedly appends the nearest unvisited city. O(n^2) table lookups;
// equidistant candidates resolve to the lowest id.
pub fn nearest_neighbor_tour(
    cities: &[City],
    table: &DistanceTable,
    start_city_id: Option<u64>,
) -> Tour {
    let start_city = start_city_id
        .and_then(|start_id| cities.iter().find(|city| city.id == start_id))
        .unwrap_or(&cities[0]);

    let mut unvisited: BTreeSet<u64> = cities.iter().map(|city| city.id).collect();
    unvisited.remove(&start_city.id);

    let mut order = vec![start_city.clone()];
    let mut current_id = start_city.id;

    while let Some(next_id) = table.nearest_unvisited(current_id, &unvisited) {
        unvisited.remove(&next_id);
        let next_city = cities
            .iter()
            .find(|city| city.id == next_id)
            .expect("nearest_unvisited only returns ids drawn from the city set");
        order.push(next_city.clone());
        current_id = next_id;
    }

    return Tour::new(order, table);
}

// Every city starts as its own one-city path fragment; each accepted edge
// links two fragments together. fragment_links[city] points toward the
// fragment's representative city, and the lookup halves the chain as it
// walks so repeated lookups stay cheap.
fn fragment_root(fragment_links: &mut [usize], start_city: usize) -> usize {
    let mut city = start_city;
    while fragment_links[city] != city {
        fragment_links[city] = fragment_links[fragment_links[city]];
        city = fragment_links[city];
    }
    return city;
}

// Greedy-edge matching: sort all C(n,2) edges ascending by distance and
// accept an edge while both endpoint degrees stay at most 2 and no sub-cycle
// closes before n edges are in (the n-th accepted edge may close the full
// cycle). The selected edges form paths; the walk below linearizes them and
// appends any city a disconnected greedy result left out, in input order.
// O(n^2 log n), dominated by the edge sort.
pub fn greedy_edge_tour(cities: &[City], table: &DistanceTable) -> Tour {
    let num_cities = cities.len();
    if num_cities < 3 {
        return Tour::new(cities.to_vec(), table);
    }

    let mut edges: Vec<(usize, usize, f64)> = vec![];
    for i in 0..num_cities {
        for j in i + 1..num_cities {
            edges.push((i, j, table.distance(cities[i].id, cities[j].id)));
        }
    }
    edges.sort_by(|a, b| {
        a.2.partial_cmp(&b.2)
            .expect("haversine distances are always finite")
    });

    let mut degree = vec![0usize; num_cities];
    let mut adjacency: Vec<Vec<usize>> = vec![vec![]; num_cities];
    let mut fragment_links: Vec<usize> = (0..num_cities).collect();
    let mut accepted_edges = 0;

    for (city_a, city_b, _) in edges {
        if accepted_edges == num_cities {
            break;
        }
        if degree[city_a] == 2 || degree[city_b] == 2 {
            continue;
        }
        let root_a = fragment_root(&mut fragment_links, city_a);
        let root_b = fragment_root(&mut fragment_links, city_b);
        // Endpoints already sharing a fragment means the edge closes a
        // cycle, which is only acceptable as the final edge of the full
        // tour.
        if root_a == root_b && accepted_edges < num_cities - 1 {
            continue;
        }

        fragment_links[root_b] = root_a;
        adjacency[city_a].push(city_b);
        adjacency[city_b].push(city_a);
        degree[city_a] += 1;
        degree[city_b] += 1;
        accepted_edges += 1;
    }

    // Walk the path structure from a degree-1 endpoint, or from the first
    // city if the edges already form a single cycle.
    let walk_start = (0..num_cities).find(|&i| degree[i] == 1).unwrap_or(0);
    let mut order: Vec<usize> = vec![];
    let mut visited = vec![false; num_cities];
    let mut current = walk_start;
    loop {
        order.push(current);
        visited[current] = true;

        match adjacency[current].iter().find(|&&next| !visited[next]) {
            Some(&next) => {
                current = next;
            }
            None => {
                break;
            }
        }
    }

    // Repair: a disconnected greedy result leaves cities unreached from the
    // walk start; append them in input order.
    for i in 0..num_cities {
        if !visited[i] {
            order.push(i);
        }
    }

    let ordered_cities = order.into_iter().map(|i| cities[i].clone()).collect();

    return Tour::new(ordered_cities, table);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn fixture() -> (Vec<City>, DistanceTable) {
        let cities = vec![
            City::new(1, None, 0.0, 0.0),
            City::new(2, None, 3.0, 0.1),
            City::new(3, None, 1.0, 2.0),
            City::new(4, None, 4.0, 2.2),
            City::new(5, None, 2.0, 4.0),
            City::new(6, None, 0.5, 3.1),
        ];
        let table = DistanceTable::build(&cities).unwrap();
        (cities, table)
    }

    fn assert_is_permutation(tour: &Tour, cities: &[City]) {
        assert_eq!(tour.len(), cities.len());
        let mut seen: Vec<u64> = tour.path_ids();
        seen.sort_unstable();
        let mut expected: Vec<u64> = cities.iter().map(|city| city.id).collect();
        expected.sort_unstable();
        assert_eq!(seen, expected);
    }

    #[test]
    fn random_tour_is_a_permutation_and_seed_deterministic() {
        let (cities, table) = fixture();

        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let tour_a = random_tour(&cities, &table, &mut rng_a);
        let tour_b = random_tour(&cities, &table, &mut rng_b);

        assert_is_permutation(&tour_a, &cities);
        assert_eq!(tour_a.path_ids(), tour_b.path_ids());
    }

    #[test]
    fn nearest_neighbor_starts_at_the_requested_city() {
        let (cities, table) = fixture();

        let tour = nearest_neighbor_tour(&cities, &table, Some(3));

        assert_is_permutation(&tour, &cities);
        assert_eq!(tour.cities()[0].id, 3);
    }

    #[test]
    fn nearest_neighbor_falls_back_to_the_first_city() {
        let (cities, table) = fixture();

        let unknown_start = nearest_neighbor_tour(&cities, &table, Some(99));
        assert_eq!(unknown_start.cities()[0].id, 1);

        let unspecified = nearest_neighbor_tour(&cities, &table, None);
        assert_eq!(unspecified.cities()[0].id, 1);
    }

    #[test]
    fn nearest_neighbor_always_takes_the_closest_next_city() {
        let (cities, table) = fixture();

        let tour = nearest_neighbor_tour(&cities, &table, Some(1));
        let ids = tour.path_ids();

        // Each hop must be the nearest among the cities still unvisited at
        // that point.
        let mut unvisited: BTreeSet<u64> = cities.iter().map(|city| city.id).collect();
        unvisited.remove(&ids[0]);
        for pair in ids.windows(2) {
            assert_eq!(table.nearest_unvisited(pair[0], &unvisited), Some(pair[1]));
            unvisited.remove(&pair[1]);
        }
    }

    #[test]
    fn greedy_edge_visits_every_city_exactly_once() {
        let (cities, table) = fixture();

        let tour = greedy_edge_tour(&cities, &table);

        assert_is_permutation(&tour, &cities);
    }

    #[test]
    fn greedy_edge_covers_collinear_cities() {
        // Collinear points force many degree/sub-cycle rejections; the walk
        // plus repair must still produce a full permutation.
        let cities: Vec<City> = (0u64..7)
            .map(|i| City::new(i + 1, None, i as f64, 0.0))
            .collect();
        let table = DistanceTable::build(&cities).unwrap();

        let tour = greedy_edge_tour(&cities, &table);

        assert_is_permutation(&tour, &cities);
    }

    #[test]
    fn greedy_edge_handles_tiny_city_sets() {
        let cities = vec![City::new(1, None, 0.0, 0.0), City::new(2, None, 1.0, 1.0)];
        let table = DistanceTable::build(&cities).unwrap();

        let tour = greedy_edge_tour(&cities, &table);

        assert_is_permutation(&tour, &cities);
    }

    #[test]
    fn build_initial_tour_rotates_to_the_start_city() {
        let (cities, table) = fixture();
        let mut rng = StdRng::seed_from_u64(7);

        let tour = build_initial_tour(
            InitialMethod::Random,
            &cities,
            &table,
            Some(5),
            &mut rng,
        );

        assert_is_permutation(&tour, &cities);
        assert_eq!(tour.cities()[0].id, 5);
    }

    #[test]
    fn initial_method_parses_by_name() {
        assert_eq!(
            InitialMethod::from_name("random"),
            Some(InitialMethod::Random)
        );
        assert_eq!(
            InitialMethod::from_name("nn"),
            Some(InitialMethod::NearestNeighbor)
        );
        assert_eq!(
            InitialMethod::from_name("greedy-edge"),
            Some(InitialMethod::GreedyEdge)
        );
        assert_eq!(InitialMethod::from_name("simulated-annealing"), None);
    }
}

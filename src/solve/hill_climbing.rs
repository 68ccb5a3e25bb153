use std::time::Instant;

use crate::construct::{build_initial_tour, InitialMethod};
use crate::distance::DistanceTable;
use crate::tour::Tour;
use crate::types::{City, ImprovementRecord, SolveReport, SolverKind, TspError};

use super::create_rng;

#[derive(Debug, Clone)]
pub struct HillClimbingConfig {
    pub initial_method: InitialMethod,
    pub start_city_id: Option<u64>,
    pub seed: Option<u64>,
    pub max_no_improve: u32,
}

impl Default for HillClimbingConfig {
    fn default() -> HillClimbingConfig {
        HillClimbingConfig {
            initial_method: InitialMethod::NearestNeighbor,
            start_city_id: None,
            seed: None,
            max_no_improve: 100,
        }
    }
}

// Classic 2-opt edge swap: reversing the contiguous segment [i, k] removes
// two edges from the cycle and reconnects it with two different ones.
fn two_opt_swap(cities: &[City], i: usize, k: usize) -> Vec<City> {
    let mut new_order = cities.to_vec();
    new_order[i..=k].reverse();

    return new_order;
}

// 2-opt hill climbing with first-improvement acceptance.
//
// Each round scans every position pair `(i, k)` with `i < k` in row-major
// order and accepts the first segment reversal that strictly beats the
// incumbent, re-rotating it to the fixed start city since a reversal can
// move that city away from position 0. A round with no acceptance bumps the
// stall counter; `max_no_improve` fruitless rounds in a row terminate the
// search (0 terminates before the first round and returns the seed tour).
// The convergence history receives the incumbent distance every round,
// improving or not, so its length tracks elapsed rounds.
pub fn run_hill_climbing(
    cities: &[City],
    table: &DistanceTable,
    config: &HillClimbingConfig,
) -> Result<SolveReport, TspError> {
    let start_time = Instant::now();
    let mut rng = create_rng(config.seed);

    let seed_tour = build_initial_tour(
        config.initial_method,
        cities,
        table,
        config.start_city_id,
        &mut rng,
    );

    let mut current_tour = seed_tour;
    let mut best_tour = current_tour.clone();

    let mut history = vec![best_tour.distance()];
    let mut improvement_log = vec![ImprovementRecord {
        step: 0,
        distance: best_tour.distance(),
        description: format!("Tour: {}", best_tour.render_path()),
    }];

    let num_cities = current_tour.len();
    let mut no_improve: u32 = 0;
    let mut round: usize = 0;

    while no_improve < config.max_no_improve {
        let mut improved = false;
        round += 1;

        'scan: for i in 0..num_cities.saturating_sub(1) {
            for k in i + 1..num_cities {
                let candidate_order = two_opt_swap(current_tour.cities(), i, k);
                let candidate_tour = Tour::new(candidate_order, table);

                if candidate_tour.distance() < best_tour.distance() {
                    // First improvement wins the round. Reversal can displace
                    // the designated start city, so rotate before recording.
                    best_tour = candidate_tour.rotated_to_start(config.start_city_id);
                    current_tour = best_tour.clone();
                    improved = true;
                    no_improve = 0;

                    improvement_log.push(ImprovementRecord {
                        step: round,
                        distance: best_tour.distance(),
                        description: format!("Tour: {}", best_tour.render_path()),
                    });

                    break 'scan;
                }
            }
        }

        history.push(best_tour.distance());

        if !improved {
            no_improve += 1;
        }
    }

    return Ok(SolveReport {
        solver_name: SolverKind::HillClimbing.to_string(),
        best_distance: best_tour.distance(),
        best_tour: Some(best_tour),
        history,
        improvement_log,
        calculation_time: start_time.elapsed().as_secs_f32(),
    });
}

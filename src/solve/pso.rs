use std::collections::HashMap;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::construct::random_tour;
use crate::distance::DistanceTable;
use crate::tour::Tour;
use crate::types::{City, ImprovementRecord, SolveReport, SolverKind, TspError};

use super::create_rng;

// An ordered list of position transpositions, standing in for a PSO velocity
// vector. Permutations have no vector space, so "velocity" is the sequence
// of swaps that turns one tour into another. Subtraction is diff, addition
// is concat, and the scalar multiple is the stochastic, lossy
// sample_fraction rather than anything linear.
#[derive(Debug, Clone, Default)]
pub struct SwapSequence {
    swaps: Vec<(usize, usize)>,
}

impl SwapSequence {
    pub fn new() -> SwapSequence {
        SwapSequence { swaps: vec![] }
    }

    pub fn from_swaps(swaps: Vec<(usize, usize)>) -> SwapSequence {
        SwapSequence { swaps }
    }

    pub fn len(&self) -> usize {
        return self.swaps.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.swaps.is_empty();
    }

    // The "subtraction" `to - from`: scanning positions left to right,
    // whenever the working copy of `from` disagrees with `to`, swap the
    // required city into place and record the transposition. Applying the
    // result to `from` in order reproduces `to`; at most n-1 swaps.
    pub fn diff(from: &Tour, to: &Tour) -> SwapSequence {
        let mut working: Vec<u64> = from.path_ids();
        let target: Vec<u64> = to.path_ids();

        let mut position_of: HashMap<u64, usize> = working
            .iter()
            .enumerate()
            .map(|(i, &city_id)| (city_id, i))
            .collect();

        let mut swaps: Vec<(usize, usize)> = vec![];
        for i in 0..working.len() {
            if working[i] != target[i] {
                let required = target[i];
                let j = position_of[&required];
                let displaced = working[i];

                working.swap(i, j);
                position_of.insert(displaced, j);
                position_of.insert(required, i);

                swaps.push((i, j));
            }
        }

        return SwapSequence::from_swaps(swaps);
    }

    // The "scalar multiplication": keeps `clamp(round(len * factor), 0, len)`
    // transpositions chosen uniformly without replacement. The retained
    // transpositions keep their original relative order, so a fixed seed
    // reproduces the exact velocity. A factor above 1 keeps the whole list.
    pub fn sample_fraction(&self, factor: f64, rng: &mut StdRng) -> SwapSequence {
        if self.is_empty() {
            return SwapSequence::new();
        }

        let len = self.len();
        let k = ((len as f64) * factor).round() as i64;
        let k = k.clamp(0, len as i64) as usize;

        let mut indices = rand::seq::index::sample(rng, len, k).into_vec();
        indices.sort_unstable();

        return SwapSequence::from_swaps(indices.into_iter().map(|i| self.swaps[i]).collect());
    }

    // The "addition": list concatenation, preserving order.
    pub fn concat(mut self, other: SwapSequence) -> SwapSequence {
        self.swaps.extend(other.swaps);
        return self;
    }

    // Applies every transposition in list order, swapping absolute positions
    // in the city order. An out-of-range index fails fast rather than being
    // skipped, so a malformed velocity can never half-apply.
    pub fn apply(&self, order: &mut Vec<City>) -> Result<(), TspError> {
        let len = order.len();
        for &(i, j) in &self.swaps {
            if i >= len {
                return Err(TspError::SwapOutOfRange { index: i, len });
            }
            if j >= len {
                return Err(TspError::SwapOutOfRange { index: j, len });
            }
            order.swap(i, j);
        }

        return Ok(());
    }
}

struct Particle {
    current: Tour,
    personal_best: Tour,
    velocity: SwapSequence,
    rng: StdRng,
}

impl Particle {
    fn new(initial_tour: Tour, rng: StdRng) -> Particle {
        Particle {
            personal_best: initial_tour.clone(),
            current: initial_tour,
            velocity: SwapSequence::new(),
            rng,
        }
    }

    fn update_personal_best(&mut self) {
        if self.current.distance() < self.personal_best.distance() {
            self.personal_best = self.current.clone();
        }
    }
}

#[derive(Debug, Clone)]
pub struct PsoConfig {
    pub swarm_size: usize,
    pub iterations: usize,
    // Inertia weight `w`: the fraction of the previous velocity carried over.
    pub inertia: f64,
    // Cognitive coefficient `c1`: attraction toward the personal best.
    pub cognitive: f64,
    // Social coefficient `c2`: attraction toward the global best.
    pub social: f64,
    pub seed: Option<u64>,
    pub start_city_id: Option<u64>,
}

impl Default for PsoConfig {
    fn default() -> PsoConfig {
        PsoConfig {
            swarm_size: 30,
            iterations: 100,
            inertia: 0.7,
            cognitive: 1.5,
            social: 1.5,
            seed: None,
            start_city_id: None,
        }
    }
}

fn refresh_incumbent(swarm: &[Particle], best_tour: &mut Option<Tour>, best_distance: &mut f64) {
    for particle in swarm {
        if particle.personal_best.distance() < *best_distance {
            *best_distance = particle.personal_best.distance();
            *best_tour = Some(particle.personal_best.clone());
        }
    }
}

// The improvement log is derived from the history after the fact: entry 0
// marks initialization, then one entry per iteration where the incumbent
// strictly decreased.
fn derive_improvement_log(history: &[f64]) -> Vec<ImprovementRecord> {
    let mut improvement_log: Vec<ImprovementRecord> = vec![];

    if let Some(&initial_distance) = history.first() {
        improvement_log.push(ImprovementRecord {
            step: 0,
            distance: initial_distance,
            description: "Swarm initialized".to_string(),
        });

        let mut current_best = initial_distance;
        for (i, &distance) in history.iter().enumerate() {
            if distance < current_best {
                current_best = distance;
                improvement_log.push(ImprovementRecord {
                    step: i,
                    distance,
                    description: "New global best".to_string(),
                });
            }
        }
    }

    return improvement_log;
}

// Permutation particle swarm optimization.
//
// Each particle starts on an independent random tour drawn from its own RNG
// (seeded from the invocation generator, so a fixed seed reproduces the
// whole swarm). Per iteration every particle builds a new velocity from an
// inertia-sampled fraction of its old velocity, a cognitive fraction of
// `diff(current, personal-best)` scaled by `c1*r1`, and a social fraction of
// `diff(current, incumbent)` scaled by `c2*r2`, then applies it. The
// incumbent is refreshed from the personal bests once before the particle
// loop (the snapshot every particle observes that iteration) and once after
// it, when the iteration's global best enters the history. There is no
// early-stopping criterion: the swarm always runs the configured iteration
// count, unlike hill climbing's stall threshold.
//
// A zero swarm size yields an absent best tour at +infinity; zero iterations
// return the best initialization tour. Neither is an error.
pub fn run_particle_swarm(
    cities: &[City],
    table: &DistanceTable,
    config: &PsoConfig,
) -> Result<SolveReport, TspError> {
    let start_time = Instant::now();
    let mut master_rng = create_rng(config.seed);

    let mut swarm: Vec<Particle> = Vec::with_capacity(config.swarm_size);
    for _ in 0..config.swarm_size {
        let mut particle_rng = StdRng::seed_from_u64(master_rng.gen());
        let initial_tour = random_tour(cities, table, &mut particle_rng);
        swarm.push(Particle::new(initial_tour, particle_rng));
    }

    let mut best_tour: Option<Tour> = None;
    let mut best_distance = f64::INFINITY;
    refresh_incumbent(&swarm, &mut best_tour, &mut best_distance);

    let mut history = vec![best_distance];

    for _ in 0..config.iterations {
        // The snapshot every particle's social term reads this iteration. It
        // is never re-read mid-iteration, so particle update order does not
        // change the outcome of the sampling inputs.
        refresh_incumbent(&swarm, &mut best_tour, &mut best_distance);
        let incumbent = match &best_tour {
            Some(incumbent) => incumbent.clone(),
            None => {
                // Zero particles: nothing moves, the history just extends.
                history.push(best_distance);
                continue;
            }
        };

        for particle in &mut swarm {
            let inertia_swaps = particle
                .velocity
                .sample_fraction(config.inertia, &mut particle.rng);

            let r1: f64 = particle.rng.gen();
            let cognitive_swaps = SwapSequence::diff(&particle.current, &particle.personal_best)
                .sample_fraction(config.cognitive * r1, &mut particle.rng);

            let r2: f64 = particle.rng.gen();
            let social_swaps = SwapSequence::diff(&particle.current, &incumbent)
                .sample_fraction(config.social * r2, &mut particle.rng);

            particle.velocity = inertia_swaps.concat(cognitive_swaps).concat(social_swaps);

            let mut new_order = particle.current.cities().to_vec();
            particle.velocity.apply(&mut new_order)?;
            particle.current = Tour::new(new_order, table);
            particle.update_personal_best();
        }

        refresh_incumbent(&swarm, &mut best_tour, &mut best_distance);
        history.push(best_distance);
    }

    let best_tour = best_tour.map(|tour| tour.rotated_to_start(config.start_city_id));
    let improvement_log = derive_improvement_log(&history);

    return Ok(SolveReport {
        solver_name: SolverKind::ParticleSwarm.to_string(),
        best_tour,
        best_distance,
        history,
        improvement_log,
        calculation_time: start_time.elapsed().as_secs_f32(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn tour_of(ids: &[u64], cities: &[City], table: &DistanceTable) -> Tour {
        let order = ids
            .iter()
            .map(|id| {
                cities
                    .iter()
                    .find(|city| city.id == *id)
                    .unwrap()
                    .clone()
            })
            .collect();
        Tour::new(order, table)
    }

    #[test]
    fn diff_applied_to_from_reproduces_to() {
        let (cities, table) = fixture();
        let from = tour_of(&[1, 2, 3, 4, 5, 6], &cities, &table);
        let to = tour_of(&[4, 6, 1, 3, 2, 5], &cities, &table);

        let swaps = SwapSequence::diff(&from, &to);
        assert!(swaps.len() <= cities.len() - 1);

        let mut order = from.cities().to_vec();
        swaps.apply(&mut order).unwrap();
        let reproduced = Tour::new(order, &table);

        assert_eq!(reproduced.path_ids(), to.path_ids());
    }

    #[test]
    fn diff_of_identical_tours_is_empty() {
        let (cities, table) = fixture();
        let tour = tour_of(&[2, 4, 6, 1, 3, 5], &cities, &table);

        assert!(SwapSequence::diff(&tour, &tour).is_empty());
    }

    #[test]
    fn sample_fraction_clamps_to_the_full_list() {
        let swaps = SwapSequence::from_swaps(vec![(0, 1), (1, 2), (2, 3)]);
        let mut rng = StdRng::seed_from_u64(9);

        // A factor above 1 keeps everything, in the original order.
        let all = swaps.sample_fraction(2.5, &mut rng);
        assert_eq!(all.swaps, vec![(0, 1), (1, 2), (2, 3)]);

        let none = swaps.sample_fraction(0.0, &mut rng);
        assert!(none.is_empty());
    }

    #[test]
    fn sample_fraction_preserves_relative_order() {
        let swaps = SwapSequence::from_swaps((0..10).map(|i| (i, i + 1)).collect());
        let mut rng = StdRng::seed_from_u64(13);

        let half = swaps.sample_fraction(0.5, &mut rng);
        assert_eq!(half.len(), 5);
        for pair in half.swaps.windows(2) {
            assert!(pair[0].0 < pair[1].0);
        }
    }

    #[test]
    fn apply_rejects_out_of_range_indices() {
        let (cities, table) = fixture();
        let tour = tour_of(&[1, 2, 3, 4, 5, 6], &cities, &table);
        let swaps = SwapSequence::from_swaps(vec![(0, 99)]);

        let mut order = tour.cities().to_vec();
        let result = swaps.apply(&mut order);

        assert!(matches!(
            result,
            Err(TspError::SwapOutOfRange { index: 99, len: 6 })
        ));
    }

    #[test]
    fn zero_iterations_return_the_initial_swarm_best() {
        let (cities, table) = fixture();
        let config = PsoConfig {
            swarm_size: 1,
            iterations: 0,
            seed: Some(21),
            ..PsoConfig::default()
        };

        let report = run_particle_swarm(&cities, &table, &config).unwrap();

        assert_eq!(report.history.len(), 1);
        let best_tour = report.best_tour.unwrap();
        assert_eq!(best_tour.distance(), report.best_distance);
        assert_eq!(report.history[0], report.best_distance);
        assert_eq!(best_tour.len(), cities.len());
    }

    #[test]
    fn zero_particles_yield_an_absent_result() {
        let (cities, table) = fixture();
        let config = PsoConfig {
            swarm_size: 0,
            iterations: 5,
            seed: Some(2),
            ..PsoConfig::default()
        };

        let report = run_particle_swarm(&cities, &table, &config).unwrap();

        assert!(report.best_tour.is_none());
        assert_eq!(report.best_distance, f64::INFINITY);
        assert_eq!(report.history.len(), 6);
    }

    #[test]
    fn history_is_non_increasing_and_matches_the_returned_best() {
        let (cities, table) = fixture();
        let config = PsoConfig {
            swarm_size: 10,
            iterations: 40,
            seed: Some(5),
            ..PsoConfig::default()
        };

        let report = run_particle_swarm(&cities, &table, &config).unwrap();

        assert_eq!(report.history.len(), 41);
        for pair in report.history.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
        assert_eq!(*report.history.last().unwrap(), report.best_distance);
        assert_eq!(report.best_tour.unwrap().distance(), report.best_distance);
    }

    #[test]
    fn fixed_seed_reproduces_the_whole_run() {
        let (cities, table) = fixture();
        let config = PsoConfig {
            swarm_size: 8,
            iterations: 15,
            seed: Some(77),
            ..PsoConfig::default()
        };

        let report_a = run_particle_swarm(&cities, &table, &config).unwrap();
        let report_b = run_particle_swarm(&cities, &table, &config).unwrap();

        assert_eq!(report_a.history, report_b.history);
        assert_eq!(
            report_a.best_tour.unwrap().path_ids(),
            report_b.best_tour.unwrap().path_ids()
        );
    }

    #[test]
    fn derived_log_marks_initialization_and_every_decrease() {
        let improvement_log = derive_improvement_log(&[10.0, 10.0, 8.5, 8.5, 7.0]);

        assert_eq!(improvement_log.len(), 3);
        assert_eq!(improvement_log[0].step, 0);
        assert_eq!(improvement_log[0].description, "Swarm initialized");
        assert_eq!(improvement_log[1].step, 2);
        assert_eq!(improvement_log[1].distance, 8.5);
        assert_eq!(improvement_log[2].step, 4);
        assert_eq!(improvement_log[2].distance, 7.0);
    }

    #[test]
    fn result_is_rotated_to_the_requested_start_city() {
        let (cities, table) = fixture();
        let config = PsoConfig {
            swarm_size: 6,
            iterations: 10,
            seed: Some(4),
            start_city_id: Some(5),
            ..PsoConfig::default()
        };

        let report = run_particle_swarm(&cities, &table, &config).unwrap();

        assert_eq!(report.best_tour.unwrap().cities()[0].id, 5);
    }
}

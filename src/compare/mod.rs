use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::distance::DistanceTable;
use crate::solve::{run_hill_climbing, run_particle_swarm, HillClimbingConfig, PsoConfig};
use crate::types::{City, SolverKind, TspError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const THREAD_POOL_SIZE: usize = 8;

// Aggregated distances and timings over repeated runs of one solver.
#[derive(Debug, Clone)]
pub struct ComparisonStats {
    pub solver_name: String,
    pub num_runs: usize,
    pub mean_distance: f64,
    pub best_distance: f64,
    pub worst_distance: f64,
    pub std_dev_distance: f64,
    pub mean_time: f32,
}

fn aggregate(solver_name: String, distances: &[f64], times: &[f32]) -> ComparisonStats {
    let num_runs = distances.len();
    let mean_distance = distances.iter().sum::<f64>() / (num_runs as f64);
    let best_distance = distances.iter().cloned().fold(f64::INFINITY, f64::min);
    let worst_distance = distances.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let variance = distances
        .iter()
        .map(|distance| (distance - mean_distance).powi(2))
        .sum::<f64>()
        / (num_runs as f64);
    let mean_time = times.iter().sum::<f32>() / (num_runs as f32);

    ComparisonStats {
        solver_name,
        num_runs,
        mean_distance,
        best_distance,
        worst_distance,
        std_dev_distance: variance.sqrt(),
        mean_time,
    }
}

// Runs both solvers `num_runs` times each and aggregates their results.
//
// Runs are independent solves fanned out on a bounded worker pool; each run
// gets its own seed derived up front from the configured base seed, so a
// fixed base seed reproduces every run no matter how the pool schedules
// them. The engine configs' own seeds are overridden per run.
pub fn run_comparison(
    cities: &[City],
    table: &DistanceTable,
    hc_config: &HillClimbingConfig,
    pso_config: &PsoConfig,
    base_seed: Option<u64>,
    num_runs: usize,
) -> Result<Vec<ComparisonStats>, TspError> {
    if num_runs == 0 {
        return Ok(vec![]);
    }

    let mut seed_rng = match base_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let run_seeds: Vec<u64> = (0..num_runs).map(|_| seed_rng.gen()).collect();

    let pb = ProgressBar::new((num_runs as u64) * 2);
    let sty = ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:100.cyan/blue} {pos:>7}/{len:7} {msg}",
    )
    .unwrap();
    pb.set_style(sty);
    pb.set_message("Comparison solves completed");

    let pool = match ThreadPoolBuilder::new()
        .num_threads(THREAD_POOL_SIZE)
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Error creating thread pool: {}", e),
            )
            .into());
        }
    };

    let run_results: Result<Vec<((f64, f32), (f64, f32))>, TspError> = pool.install(|| {
        run_seeds
            .into_par_iter()
            .map(|run_seed| {
                let mut run_hc_config = hc_config.clone();
                run_hc_config.seed = Some(run_seed);
                let hc_report = run_hill_climbing(cities, table, &run_hc_config)?;
                pb.inc(1);

                let mut run_pso_config = pso_config.clone();
                run_pso_config.seed = Some(run_seed);
                let pso_report = run_particle_swarm(cities, table, &run_pso_config)?;
                pb.inc(1);

                Ok((
                    (hc_report.best_distance, hc_report.calculation_time),
                    (pso_report.best_distance, pso_report.calculation_time),
                ))
            })
            .collect()
    });
    let run_results = run_results?;
    pb.finish_and_clear();

    let hc_distances: Vec<f64> = run_results.iter().map(|(hc, _)| hc.0).collect();
    let hc_times: Vec<f32> = run_results.iter().map(|(hc, _)| hc.1).collect();
    let pso_distances: Vec<f64> = run_results.iter().map(|(_, pso)| pso.0).collect();
    let pso_times: Vec<f32> = run_results.iter().map(|(_, pso)| pso.1).collect();

    return Ok(vec![
        aggregate(SolverKind::HillClimbing.to_string(), &hc_distances, &hc_times),
        aggregate(SolverKind::ParticleSwarm.to_string(), &pso_distances, &pso_times),
    ]);
}

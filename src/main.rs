mod compare;
mod construct;
mod distance;
mod solve;
mod tour;
mod types;

use clap::{Arg, ArgAction, Command};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use compare::run_comparison;
use construct::InitialMethod;
use distance::DistanceTable;
use solve::{run_hill_climbing, run_particle_swarm, HillClimbingConfig, PsoConfig};
use types::{RunRecord, SolveReport};

fn print_report(report: &SolveReport) {
    println!("=== {} ===", report.solver_name);
    match &report.best_tour {
        Some(best_tour) => {
            println!("Best distance: {:.2} km", report.best_distance);
            println!("Best tour: {}", best_tour.render_path());
        }
        None => {
            println!("No tour found (empty swarm).");
        }
    }
    println!(
        "Recorded steps: {} Improvements: {}",
        report.history.len(),
        report.improvement_log.len()
    );
    for record in &report.improvement_log {
        println!(
            "  step {:>4}  {:>10.2} km  {}",
            record.step, record.distance, record.description
        );
    }
    println!("Calculation time: {:.3}s", report.calculation_time);
}

fn store_report(report: &SolveReport, parameters: String, history_path: &Path) {
    let record = RunRecord::new(report, parameters);
    match record.store_as_json(history_path) {
        Ok(_) => println!("Run record {} stored.", record.uuid),
        Err(e) => eprintln!("Failed to store the run record: {}", e),
    }
}

fn main() {
    // City data file
    let data_path_arg = Arg::new("data-path")
        .short('d')
        .action(ArgAction::Set)
        .required(true)
        .value_parser(PathBuf::from_str)
        .help(
            "Path to the city data file: a JSON object with a \"locations\" array of {id, name, latitude, longitude} records."
        );
    // Solver selection
    let hill_climbing_arg = Arg::new("hill-climbing")
        .short('c')
        .action(ArgAction::SetTrue)
        .required(false)
        .help("Solve with 2-opt hill climbing.");
    let particle_swarm_arg = Arg::new("particle-swarm")
        .short('p')
        .action(ArgAction::SetTrue)
        .required(false)
        .help("Solve with permutation particle swarm optimization.");
    let compare_arg = Arg::new("compare")
        .short('n')
        .action(ArgAction::Set)
        .required(false)
        .value_parser(clap::value_parser!(usize))
        .help(
            "Run both solvers this many times and print aggregate statistics instead of a single solve."
        );
    // Shared options
    let seed_arg = Arg::new("seed")
        .short('s')
        .action(ArgAction::Set)
        .required(false)
        .value_parser(clap::value_parser!(u64))
        .help("Seed for the random number generator. Omit for a fresh seed from OS entropy.");
    let start_city_arg = Arg::new("start-city")
        .short('t')
        .long("start-city")
        .action(ArgAction::Set)
        .required(false)
        .value_parser(clap::value_parser!(u64))
        .help("Rotate resulting tours to begin at this city id. Must exist in the data file.");
    let list_history_arg = Arg::new("list-history")
        .short('l')
        .long("list-history")
        .action(ArgAction::SetTrue)
        .required(false)
        .help("List the stored run records in the history directory and exit.");
    let history_path_arg = Arg::new("history-path")
        .short('o')
        .long("history-path")
        .action(ArgAction::Set)
        .required(false)
        .value_parser(PathBuf::from_str)
        .help("Directory to append run-record JSON files to.");
    // Hill climbing options
    let method_arg = Arg::new("method")
        .short('m')
        .long("method")
        .action(ArgAction::Set)
        .required(false)
        .default_value("nearest-neighbor")
        .help("Seed tour strategy for hill climbing: random, nearest-neighbor, or greedy-edge.");
    let max_no_improve_arg = Arg::new("max-no-improve")
        .long("max-no-improve")
        .action(ArgAction::Set)
        .required(false)
        .value_parser(clap::value_parser!(u32))
        .default_value("100")
        .help("Number of consecutive fruitless 2-opt rounds before hill climbing terminates.");
    // PSO options
    let swarm_size_arg = Arg::new("swarm-size")
        .long("swarm-size")
        .action(ArgAction::Set)
        .required(false)
        .value_parser(clap::value_parser!(usize))
        .default_value("30")
        .help("Number of particles in the swarm.");
    let iterations_arg = Arg::new("iterations")
        .short('i')
        .long("iterations")
        .action(ArgAction::Set)
        .required(false)
        .value_parser(clap::value_parser!(usize))
        .default_value("100")
        .help("Number of swarm iterations.");
    let inertia_arg = Arg::new("inertia")
        .short('w')
        .long("inertia")
        .action(ArgAction::Set)
        .required(false)
        .value_parser(clap::value_parser!(f64))
        .default_value("0.7")
        .help("Inertia weight w.");
    let cognitive_arg = Arg::new("c1")
        .long("c1")
        .action(ArgAction::Set)
        .required(false)
        .value_parser(clap::value_parser!(f64))
        .default_value("1.5")
        .help("Cognitive coefficient c1 (attraction toward each particle's personal best).");
    let social_arg = Arg::new("c2")
        .long("c2")
        .action(ArgAction::Set)
        .required(false)
        .value_parser(clap::value_parser!(f64))
        .default_value("1.5")
        .help("Social coefficient c2 (attraction toward the swarm's global best).");

    // Take all the arguments and create a command line interface
    let args = Command::new("tsp-atlas")
        .arg(data_path_arg)
        .arg(hill_climbing_arg)
        .arg(particle_swarm_arg)
        .arg(compare_arg)
        .arg(seed_arg)
        .arg(start_city_arg)
        .arg(list_history_arg)
        .arg(history_path_arg)
        .arg(method_arg)
        .arg(max_no_improve_arg)
        .arg(swarm_size_arg)
        .arg(iterations_arg)
        .arg(inertia_arg)
        .arg(cognitive_arg)
        .arg(social_arg);

    // Parse the command line arguments
    let matches = args.get_matches();

    let data_path = Path::new(matches.get_one::<PathBuf>("data-path").unwrap());
    let cities = match types::load_cities_from_json(data_path) {
        Ok(cities) => cities,
        Err(e) => {
            eprintln!("Failed to load cities from {}: {}", data_path.display(), e);
            return;
        }
    };
    println!("Loaded {} cities from {}", cities.len(), data_path.display());

    let table = match DistanceTable::build(&cities) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Failed to build the distance table: {}", e);
            return;
        }
    };

    let seed = matches.get_one::<u64>("seed").copied();
    let start_city_id = matches.get_one::<u64>("start-city").copied();
    if let Some(start_id) = start_city_id {
        // Rotation itself treats an absent city as a no-op, but a start city
        // the data file does not contain is a configuration mistake.
        if !table.contains(start_id) {
            eprintln!("Invalid start city: {}", types::TspError::UnknownCityId(start_id));
            return;
        }
    }
    // Records for this data file land in their own subdirectory of the
    // history path, so histories of different city sets stay separate.
    let history_dir = matches
        .get_one::<PathBuf>("history-path")
        .map(|history_path| history_path.join(types::create_run_sub_dir_name(data_path)));

    if matches.get_flag("list-history") {
        let history_dir = match &history_dir {
            Some(history_dir) => history_dir,
            None => {
                eprintln!("Listing run history requires a history directory (-o).");
                return;
            }
        };
        match types::get_run_record_file_paths(history_dir) {
            Ok(record_paths) => {
                for record_path in record_paths {
                    match RunRecord::from_json(&record_path) {
                        Ok(record) => println!(
                            "{}  {:<16} {:>10.2} km  {:.3}s  {}",
                            record.uuid,
                            record.solver_name,
                            record.best_distance,
                            record.calculation_time,
                            record.parameters
                        ),
                        Err(e) => eprintln!(
                            "Error reading run record ({:?}): {} Skipping...",
                            record_path, e
                        ),
                    }
                }
            }
            Err(e) => eprintln!("Failed to list run records: {}", e),
        }
        return;
    }

    let method_name = matches.get_one::<String>("method").unwrap();
    let initial_method = match InitialMethod::from_name(method_name) {
        Some(initial_method) => initial_method,
        None => {
            eprintln!(
                "Unknown seed method \"{}\". Expected random, nearest-neighbor, or greedy-edge.",
                method_name
            );
            return;
        }
    };

    let hc_config = HillClimbingConfig {
        initial_method,
        start_city_id,
        seed,
        max_no_improve: *matches.get_one::<u32>("max-no-improve").unwrap(),
    };
    let pso_config = PsoConfig {
        swarm_size: *matches.get_one::<usize>("swarm-size").unwrap(),
        iterations: *matches.get_one::<usize>("iterations").unwrap(),
        inertia: *matches.get_one::<f64>("inertia").unwrap(),
        cognitive: *matches.get_one::<f64>("c1").unwrap(),
        social: *matches.get_one::<f64>("c2").unwrap(),
        seed,
        start_city_id,
    };

    // Check if we are comparing rather than running a single solve
    if let Some(&num_runs) = matches.get_one::<usize>("compare") {
        println!("Running each solver {} times for comparison...", num_runs);
        match run_comparison(&cities, &table, &hc_config, &pso_config, seed, num_runs) {
            Ok(all_stats) => {
                println!(
                    "{:<16} {:>5} {:>10} {:>10} {:>10} {:>10} {:>10}",
                    "Solver", "runs", "mean km", "best km", "worst km", "std dev", "mean s"
                );
                for stats in all_stats {
                    println!(
                        "{:<16} {:>5} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.3}",
                        stats.solver_name,
                        stats.num_runs,
                        stats.mean_distance,
                        stats.best_distance,
                        stats.worst_distance,
                        stats.std_dev_distance,
                        stats.mean_time
                    );
                }
            }
            Err(e) => eprintln!("Comparison failed: {}", e),
        }
        return;
    }

    // With no explicit selection, run both solvers
    let run_hc = matches.get_flag("hill-climbing");
    let run_pso = matches.get_flag("particle-swarm");
    let run_both = !run_hc && !run_pso;

    if run_hc || run_both {
        match run_hill_climbing(&cities, &table, &hc_config) {
            Ok(report) => {
                print_report(&report);
                if let Some(history_dir) = &history_dir {
                    let parameters = format!(
                        "method={} start_city={:?} seed={:?} max_no_improve={}",
                        hc_config.initial_method.to_string(),
                        hc_config.start_city_id,
                        hc_config.seed,
                        hc_config.max_no_improve
                    );
                    store_report(&report, parameters, history_dir);
                }
            }
            Err(e) => eprintln!("Hill climbing failed: {}", e),
        }
    }

    if run_pso || run_both {
        match run_particle_swarm(&cities, &table, &pso_config) {
            Ok(report) => {
                print_report(&report);
                if let Some(history_dir) = &history_dir {
                    let parameters = format!(
                        "swarm_size={} iterations={} w={} c1={} c2={} seed={:?} start_city={:?}",
                        pso_config.swarm_size,
                        pso_config.iterations,
                        pso_config.inertia,
                        pso_config.cognitive,
                        pso_config.social,
                        pso_config.seed,
                        pso_config.start_city_id
                    );
                    store_report(&report, parameters, history_dir);
                }
            }
            Err(e) => eprintln!("Particle swarm failed: {}", e),
        }
    }
}

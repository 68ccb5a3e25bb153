use std::hash::{Hash, Hasher};

mod error;
mod helpers;
mod serialization;
mod struct_functionality;

pub use error::TspError;
pub use helpers::{create_run_sub_dir_name, get_run_record_file_paths};
pub use serialization::load_cities_from_json;

use crate::tour::Tour;

// A geographic point to visit. `x` holds the longitude and `y` the latitude,
// both in degrees. The display name is resolved once when the data file is
// loaded; cities without one render as `City <id>`.
#[derive(Debug, Clone)]
pub struct City {
    pub id: u64,
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
}

impl City {
    pub fn new(id: u64, name: Option<String>, longitude: f64, latitude: f64) -> City {
        City {
            id,
            name,
            x: longitude,
            y: latitude,
        }
    }

    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("City {}", self.id),
        }
    }
}

// Two City values with the same id are interchangeable regardless of the
// coordinate payload.
impl PartialEq for City {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for City {}

impl Hash for City {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

pub enum SolverKind {
    HillClimbing,
    ParticleSwarm,
}

impl SolverKind {
    pub fn to_string(&self) -> String {
        match self {
            SolverKind::HillClimbing => {
                return "Hill Climbing".to_string();
            }
            SolverKind::ParticleSwarm => {
                return "Particle Swarm".to_string();
            }
        }
    }
}

// One entry of a solver's improvement log: the step (round or iteration) at
// which the incumbent improved, the new best distance, and a rendered
// description of the tour or event.
#[derive(Debug, Clone)]
pub struct ImprovementRecord {
    pub step: usize,
    pub distance: f64,
    pub description: String,
}

// Everything a single solver invocation hands back to its caller.
//
// `best_tour` is `None` only in the degenerate zero-particle case, in which
// case `best_distance` is +infinity. `history` holds the best-known distance
// at every recorded step and is non-increasing by construction.
pub struct SolveReport {
    pub solver_name: String,
    pub best_tour: Option<Tour>,
    pub best_distance: f64,
    pub history: Vec<f64>,
    pub improvement_log: Vec<ImprovementRecord>,
    pub calculation_time: f32,
}

// A persisted record of one solver run, stored as a JSON file named by its
// uuid in the run-history directory.
#[derive(serde::Deserialize, Clone, serde::Serialize)]
pub struct RunRecord {
    pub uuid: String,
    pub solver_name: String,
    pub parameters: String,
    pub best_distance: f64,
    pub best_path: Vec<u64>,
    pub calculation_time: f32,
    pub unix_time_secs: u64,
}

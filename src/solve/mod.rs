mod hill_climbing;
mod pso;

pub use hill_climbing::{run_hill_climbing, HillClimbingConfig};
pub use pso::{run_particle_swarm, PsoConfig};

use rand::rngs::StdRng;
use rand::SeedableRng;

// Every solver invocation owns its generator. A fixed seed reproduces the
// whole run; without one the generator is drawn from OS entropy.
pub(crate) fn create_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

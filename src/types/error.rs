use std::io;

use thiserror::Error;

// Failures surfaced by the solvers and the data boundary.
//
// Construction-time problems (bad input data) abort the solve that hit them;
// nothing in this crate retries on its own.
#[derive(Debug, Error)]
pub enum TspError {
    #[error("the city list is empty")]
    EmptyCityList,

    #[error("duplicate city id {0} in the input data")]
    DuplicateCityId(u64),

    #[error("unknown city id {0}")]
    UnknownCityId(u64),

    #[error("swap index {index} is out of range for a tour of {len} cities")]
    SwapOutOfRange { index: usize, len: usize },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

use std::fs::File;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use super::{RunRecord, SolveReport, TspError};

fn create_json_file_name(run_uuid: &str) -> String {
    return format!("{}.json", run_uuid);
}

impl RunRecord {
    // Packages a finished solve into a persistable record. The uuid is a v7
    // so record files sort by creation time on disk.
    pub fn new(report: &SolveReport, parameters: String) -> RunRecord {
        let ts = uuid::Timestamp::now(uuid::NoContext);
        let unix_time_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0);

        RunRecord {
            uuid: uuid::Uuid::new_v7(ts).to_string(),
            solver_name: report.solver_name.clone(),
            parameters,
            best_distance: report.best_distance,
            best_path: match &report.best_tour {
                Some(tour) => tour.path_ids(),
                None => vec![],
            },
            calculation_time: report.calculation_time,
            unix_time_secs,
        }
    }

    pub fn from_json(json_file_path: &Path) -> Result<RunRecord, TspError> {
        let json_file = File::open(json_file_path)?;
        let run_record: RunRecord = serde_json::from_reader(json_file)?;

        return Ok(run_record);
    }

    pub fn store_as_json(&self, history_path: &Path) -> Result<(), TspError> {
        // Create or verify the existence of the history directory
        match history_path.exists() {
            true => {}
            false => {
                match std::fs::create_dir_all(history_path) {
                    Ok(_) => {}
                    Err(e) => {
                        match e.kind() {
                            // If the directory already exists, we can ignore the error
                            std::io::ErrorKind::AlreadyExists => {}
                            _ => {
                                return Err(e.into());
                            }
                        }
                    }
                }
            }
        }

        let json_file_path = history_path.join(create_json_file_name(&self.uuid));
        let json_file = File::create(json_file_path)?;
        serde_json::to_writer(json_file, self)?;

        return Ok(());
    }
}

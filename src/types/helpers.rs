use std::path::{Path, PathBuf};

use super::TspError;

// Run records for one data file live in their own subdirectory, so the
// histories of different city sets never mix in one listing.
pub fn create_run_sub_dir_name(data_file_path: &Path) -> String {
    let data_file_stem = data_file_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("data");

    return format!("runs_for_{}", data_file_stem);
}

// Lists the run-record JSON files under a history directory, sorted by file
// name. Record files are named by uuid v7, so this order is creation order.
pub fn get_run_record_file_paths(history_path: &Path) -> Result<Vec<PathBuf>, TspError> {
    let mut json_file_paths: Vec<PathBuf> = vec![];

    match history_path.exists() {
        false => {
            return Ok(json_file_paths);
        }
        true => {}
    }

    for entry in std::fs::read_dir(history_path)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().map(|ext| ext == "json").unwrap_or(false) {
            json_file_paths.push(path);
        }
    }

    json_file_paths.sort();

    return Ok(json_file_paths);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_sub_dir_name_uses_the_data_file_stem() {
        let name = create_run_sub_dir_name(Path::new("/tmp/data_cities.json"));
        assert_eq!(name, "runs_for_data_cities");
    }

    #[test]
    fn missing_history_directory_lists_nothing() {
        let paths =
            get_run_record_file_paths(Path::new("/tmp/tsp_atlas_no_such_history")).unwrap();
        assert!(paths.is_empty());
    }
}

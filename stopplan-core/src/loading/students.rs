//! Student roster loading from CSV

use std::{fs::File, path::Path};

use log::{info, warn};
use serde::Deserialize;

use crate::{Error, StudentId, model::Student};

#[derive(Debug, Deserialize)]
struct StudentRecord {
    id: StudentId,
    lat: f64,
    lon: f64,
}

/// Reads students from a CSV file with an `id,lat,lon` header.
/// Rows that fail to deserialize are skipped with a warning.
///
/// # Errors
///
/// Returns an error if the file can't be opened.
pub fn load_students_csv(path: &Path) -> Result<Vec<Student>, Error> {
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;
    let students = read_students(file);
    info!("Loaded {} students from {}", students.len(), path.display());
    Ok(students)
}

pub(crate) fn read_students<R: std::io::Read>(reader: R) -> Vec<Student> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize::<StudentRecord>()
        .enumerate()
        .filter_map(|(row, record)| match record {
            Ok(r) if r.lat.is_finite() && r.lon.is_finite() => {
                Some(Student::from_lat_lon(r.id, r.lat, r.lon))
            }
            Ok(r) => {
                warn!("Skipping student {} with non-finite position", r.id);
                None
            }
            Err(e) => {
                warn!("Skipping malformed student row {}: {e}", row + 1);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_malformed_rows() {
        let data = "id,lat,lon\n1, 30.1, -97.7\nx,1,2\n3,30.2,-97.8\n";
        let students = read_students(data.as_bytes());
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].id, 1);
        assert!((students[1].geometry.y() - 30.2).abs() < 1e-12);
        assert!((students[1].geometry.x() + 97.8).abs() < 1e-12);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_students_csv(Path::new("/nonexistent/students.csv")).unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }
}

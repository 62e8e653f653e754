//! Persistence of evaluation reports.

use jetsim_domain::{EvalResult, EvaluationReport, StorageError};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes the report to `<output_dir>/evaluation_<timestamp>_<run>.json`,
/// where `<run>` is the first 8 hex digits of the run id. An existing file is
/// never overwritten.
///
/// # Returns
///
/// The path to the written file on success.
pub fn write_report(report: &EvaluationReport, output_dir: &Path) -> EvalResult<PathBuf> {
    fs::create_dir_all(output_dir).map_err(|e| StorageError::io(output_dir, e))?;

    let timestamp = report.generated_at.format("%Y%m%d_%H%M%S");
    let run_id = report.run_id.simple().to_string();
    let file_path = output_dir.join(format!("evaluation_{timestamp}_{}.json", &run_id[..8]));

    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&file_path)
        .map_err(|e| StorageError::io(&file_path, e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|e| StorageError::format(&file_path, e))?;
    writer
        .flush()
        .map_err(|e| StorageError::io(&file_path, e))?;

    Ok(file_path)
}

/// Reads a report from a JSON file.
pub fn read_report(path: &Path) -> EvalResult<EvaluationReport> {
    let file = File::open(path).map_err(|e| StorageError::io(path, e))?;
    let reader = BufReader::new(file);

    let report = serde_json::from_reader(reader).map_err(|e| StorageError::format(path, e))?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jetsim_domain::{Scores, SubmissionReport};
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read_report() {
        let temp_dir = TempDir::new().unwrap();

        let mut submission = SubmissionReport::default();
        submission.record(
            "jetnet",
            "g30",
            Scores {
                w1m: (0.5, 0.1),
                w1p: (0.2, 0.05),
                fpd: 0.03,
                kpd: 0.001,
            },
        );
        let mut report = EvaluationReport::new();
        report.submissions.insert("mp-gan".to_string(), submission);

        let path = write_report(&report, temp_dir.path()).unwrap();
        assert!(path.exists());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("evaluation_"));

        let read = read_report(&path).unwrap();
        assert_eq!(read.run_id, report.run_id);
        assert_eq!(
            read.submissions["mp-gan"].results["jetnet"]["g30"].w1m,
            (0.5, 0.1)
        );
    }

    #[test]
    fn test_creates_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("results").join("run");

        let path = write_report(&EvaluationReport::new(), &nested).unwrap();
        assert!(path.starts_with(&nested));
    }

    #[test]
    fn test_reports_in_the_same_second_are_kept() {
        let temp_dir = TempDir::new().unwrap();
        let first = EvaluationReport::new();
        let mut second = EvaluationReport::new();
        second.generated_at = first.generated_at;

        let first_path = write_report(&first, temp_dir.path()).unwrap();
        let second_path = write_report(&second, temp_dir.path()).unwrap();

        assert_ne!(first_path, second_path);
        assert_eq!(read_report(&first_path).unwrap().run_id, first.run_id);
        assert_eq!(read_report(&second_path).unwrap().run_id, second.run_id);
    }

    #[test]
    fn test_existing_report_is_not_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let report = EvaluationReport::new();
        write_report(&report, temp_dir.path()).unwrap();

        let err = write_report(&report, temp_dir.path()).unwrap_err();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
    }

    #[test]
    fn test_read_invalid_report() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = read_report(&path).unwrap_err();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
    }
}

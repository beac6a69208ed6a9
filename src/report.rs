use std::path::Path;

use crate::model::ScanReport;

pub fn format_directory_report(path: &Path, report: &ScanReport) -> String {
    format!(
        "The directory {} has {} directories, {} files, and uses {:.6}MB of memory",
        path.display(),
        report.directories,
        report.files,
        report.total_bytes as f64 / 1e6
    )
}

pub fn format_file_report(name: &str, size: u64) -> String {
    format!("{name} uses {:.2}KB of memory", size as f64 / 1e3)
}

use crate::core::VideoRow;
use crate::utils::format_thousands;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

const RULE_WIDTH: usize = 60;

/// Figures printed once the table is on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub output_path: PathBuf,
    pub rows: usize,
    pub languages: usize,
    pub total_comments: u64,
    /// Smallest and largest `year`, compared as text.
    pub year_range: Option<(String, String)>,
    pub dropped: usize,
}

impl Summary {
    pub fn new(rows: &[VideoRow], output_path: &Path, dropped: usize) -> Self {
        let languages: HashSet<&str> = rows.iter().map(|r| r.language_detected.as_str()).collect();
        let min = rows.iter().map(|r| &r.year).min();
        let max = rows.iter().map(|r| &r.year).max();

        Self {
            output_path: output_path.to_path_buf(),
            rows: rows.len(),
            languages: languages.len(),
            total_comments: rows.iter().map(|r| r.comment_count).sum(),
            year_range: min.zip(max).map(|(lo, hi)| (lo.clone(), hi.clone())),
            dropped,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        let file_name = self
            .output_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let year_range = match &self.year_range {
            Some((lo, hi)) => format!("{} - {}", lo, hi),
            None => "n/a".to_string(),
        };

        writeln!(f, "{}", rule)?;
        writeln!(f, "SUMMARY REPORT")?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "Output file           : {}", file_name)?;
        writeln!(f, "Output path           : {}", self.output_path.display())?;
        writeln!(f, "Total videos processed: {}", format_thousands(self.rows as u64))?;
        writeln!(f, "Videos dropped        : {}", format_thousands(self.dropped as u64))?;
        writeln!(f, "Languages detected    : {}", self.languages)?;
        writeln!(f, "Total comments        : {}", format_thousands(self.total_comments))?;
        writeln!(f, "Year range            : {}", year_range)?;
        write!(f, "{}", rule)
    }
}

use super::Finding;
use std::io::{self, Write};

/// Findings grouped by file, in the order files were linted.
#[derive(Debug, Default)]
pub struct Report {
    files: Vec<(String, Vec<Finding>)>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add findings for `file`, appending to earlier ones for the same file.
    pub fn record(&mut self, file: impl Into<String>, findings: Vec<Finding>) {
        let file = file.into();
        match self.files.iter_mut().find(|(name, _)| *name == file) {
            Some((_, existing)) => existing.extend(findings),
            None => self.files.push((file, findings)),
        }
    }

    pub fn findings(&self, file: &str) -> Option<&[Finding]> {
        self.files
            .iter()
            .find(|(name, _)| name == file)
            .map(|(_, findings)| findings.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn has_findings(&self) -> bool {
        self.files.iter().any(|(_, findings)| !findings.is_empty())
    }

    pub fn finding_count(&self) -> usize {
        self.files.iter().map(|(_, findings)| findings.len()).sum()
    }

    /// Write every file with findings as a header followed by one
    /// `line<TAB>message` row per finding. Unknown lines print as `?`.
    ///
    /// Returns whether anything was written.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<bool> {
        for (file, findings) in &self.files {
            if findings.is_empty() {
                continue;
            }
            writeln!(out, "\n{file}:")?;
            for finding in findings {
                match finding.line_number {
                    0 => writeln!(out, "?\t{}", finding.message)?,
                    line => writeln!(out, "{line}\t{}", finding.message)?,
                }
            }
        }
        Ok(self.has_findings())
    }
}

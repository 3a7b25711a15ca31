use std::collections::{BTreeMap, BTreeSet};

/// Which input file a header row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileSide {
    File1,
    File2,
}

/// Per-run record of why examined block pairs were rejected, keyed by
/// header row. Owned by the run context and discarded with it.
#[derive(Debug, Default)]
pub struct UnmatchedTracker {
    reasons: BTreeMap<(FileSide, usize), Vec<String>>,
    matched1: BTreeSet<usize>,
    matched2: BTreeSet<usize>,
}

impl UnmatchedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rejection reason for a header row. Repeats of a reason
    /// already on file for that row are dropped.
    pub fn record_rejection(&mut self, side: FileSide, header_row: usize, reason: &str) {
        let reasons = self.reasons.entry((side, header_row)).or_default();
        if !reasons.iter().any(|r| r == reason) {
            reasons.push(reason.to_string());
        }
    }

    pub fn mark_matched(&mut self, file1_header: usize, file2_headers: &[usize]) {
        self.matched1.insert(file1_header);
        self.matched2.extend(file2_headers.iter().copied());
    }

    pub fn is_matched(&self, side: FileSide, header_row: usize) -> bool {
        match side {
            FileSide::File1 => self.matched1.contains(&header_row),
            FileSide::File2 => self.matched2.contains(&header_row),
        }
    }

    pub fn reasons(&self, side: FileSide, header_row: usize) -> &[String] {
        self.reasons
            .get(&(side, header_row))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Audit text for a header row: `None` when the row was matched, a
    /// numbered reason list otherwise.
    pub fn audit_text(&self, side: FileSide, header_row: usize) -> Option<String> {
        if self.is_matched(side, header_row) {
            return None;
        }
        let reasons = self.reasons(side, header_row);
        if reasons.is_empty() {
            return Some("No match found - No matching criteria met".to_string());
        }
        let mut out = String::from("Unmatched Record\nReasons:\n");
        for (i, reason) in reasons.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, reason));
        }
        Some(out.trim_end().to_string())
    }
}

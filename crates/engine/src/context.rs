use std::collections::BTreeSet;

use interunit_core::MatchRecord;

use crate::amount_index::CandidatePair;
use crate::engine::FileData;
use crate::tracker::UnmatchedTracker;

/// Mutable state of one reconciliation run, threaded through the cascade.
/// Created per run; nothing here outlives the report.
#[derive(Debug, Default)]
pub struct RunContext {
    /// Header rows already consumed by a match, per file. Later
    /// strategies never re-examine a claimed block.
    pub claimed1: BTreeSet<usize>,
    pub claimed2: BTreeSet<usize>,
    pub matches: Vec<MatchRecord>,
    pub tracker: UnmatchedTracker,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when either side of the pair is already spoken for.
    pub fn pair_claimed(&self, file1: &FileData, file2: &FileData, pair: &CandidatePair) -> bool {
        let h1 = file1.blocks[pair.file1_block].header_row;
        let h2 = file2.blocks[pair.file2_block].header_row;
        self.claimed1.contains(&h1) || self.claimed2.contains(&h2)
    }

    /// Accept a match: claim both sides and mark them in the tracker.
    pub fn accept(&mut self, record: MatchRecord) {
        self.claimed1.insert(record.file1_header);
        self.claimed2.extend(record.file2_headers.iter().copied());
        self.tracker.mark_matched(record.file1_header, &record.file2_headers);
        self.matches.push(record);
    }
}

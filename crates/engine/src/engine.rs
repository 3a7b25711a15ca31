use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use interunit_core::TransactionBlock;
use interunit_sheet::{identify_blocks, BlockIndex, SheetModel, WorkbookError};

use crate::amount_index::{find_matching_pairs, AmountIndex};
use crate::assign::assign_ids;
use crate::context::RunContext;
use crate::extract::BlockTokens;
use crate::mapping::{AccountMapping, MappingError};
use crate::report::{self, ReconOutcome};
use crate::strategy::manual::{self, ManualConfirmation};
use crate::strategy::{cascade, StrategyInput};
use crate::tracker::FileSide;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Workbook(#[from] WorkbookError),
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error("reconciliation cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Narration rows shorter than this are treated as noise.
    pub min_narration_len: usize,
    /// Drop blocks that never saw an "Entered By :" terminator instead of
    /// reconciling them as-is.
    pub drop_unterminated: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            min_narration_len: 10,
            drop_unterminated: false,
        }
    }
}

/// One loaded ledger file with everything derived from it: segmented
/// blocks, the row-to-block reverse map and per-block text tokens.
#[derive(Debug)]
pub struct FileData {
    pub sheet: SheetModel,
    pub blocks: Vec<TransactionBlock>,
    pub index: BlockIndex,
    pub tokens: Vec<BlockTokens>,
}

impl FileData {
    pub fn prepare(sheet: SheetModel, options: &EngineOptions) -> Self {
        let mut blocks = identify_blocks(&sheet);
        if options.drop_unterminated {
            let before = blocks.len();
            blocks.retain(|b| b.terminated);
            if blocks.len() < before {
                warn!(dropped = before - blocks.len(), "unterminated blocks dropped");
            }
        }
        let index = BlockIndex::build(&blocks, sheet.rows.len());
        let tokens = blocks.iter().map(|b| BlockTokens::collect(&sheet, b)).collect();
        FileData { sheet, blocks, index, tokens }
    }

    pub fn load(path: &Path, options: &EngineOptions) -> Result<Self, EngineError> {
        Ok(Self::prepare(SheetModel::load(path)?, options))
    }
}

/// The reconciliation engine: amount gate, fixed-priority cascade, manual
/// fold, ID assignment, audit texts.
pub struct MatchEngine {
    mapping: AccountMapping,
    options: EngineOptions,
}

impl MatchEngine {
    pub fn new(mapping: AccountMapping, options: EngineOptions) -> Self {
        MatchEngine { mapping, options }
    }

    pub fn run(
        &self,
        file1: &FileData,
        file2: &FileData,
        confirmed: &[ManualConfirmation],
    ) -> Result<ReconOutcome, EngineError> {
        self.run_with_cancel(file1, file2, confirmed, &AtomicBool::new(false))
    }

    /// Like [`run`](Self::run), but checks the flag between cascade stages
    /// and bails out with [`EngineError::Cancelled`] once it is set.
    pub fn run_with_cancel(
        &self,
        file1: &FileData,
        file2: &FileData,
        confirmed: &[ManualConfirmation],
        cancel: &AtomicBool,
    ) -> Result<ReconOutcome, EngineError> {
        let mut ctx = RunContext::new();

        let index1 = AmountIndex::build(&file1.blocks);
        let index2 = AmountIndex::build(&file2.blocks);
        let pairs =
            find_matching_pairs(&index1, &index2, &file1.blocks, &file2.blocks, &mut ctx.tracker);
        info!(
            blocks1 = file1.blocks.len(),
            blocks2 = file2.blocks.len(),
            pairs = pairs.len(),
            "amount gate complete"
        );

        let input = StrategyInput {
            file1,
            file2,
            pairs: &pairs,
            mapping: &self.mapping,
            options: &self.options,
        };

        for strategy in cascade() {
            if cancel.load(Ordering::Relaxed) {
                return Err(EngineError::Cancelled);
            }
            let before = ctx.matches.len();
            strategy.run(&input, &mut ctx);
            info!(
                stage = %strategy.match_type(),
                matched = ctx.matches.len() - before,
                "cascade stage complete"
            );
        }

        if cancel.load(Ordering::Relaxed) {
            return Err(EngineError::Cancelled);
        }
        manual::fold_confirmed(&input, &mut ctx, confirmed);
        let manual_candidates = manual::candidates(&input, &ctx);

        let RunContext { mut matches, tracker, .. } = ctx;
        assign_ids(&mut matches);
        for record in &mut matches {
            record.audit_info = report::create_audit_info(record);
        }

        let unmatched_file1 = file1
            .blocks
            .iter()
            .filter_map(|b| {
                tracker
                    .audit_text(FileSide::File1, b.header_row)
                    .map(|text| (b.header_row, text))
            })
            .collect();
        let unmatched_file2 = file2
            .blocks
            .iter()
            .filter_map(|b| {
                tracker
                    .audit_text(FileSide::File2, b.header_row)
                    .map(|text| (b.header_row, text))
            })
            .collect();

        let outcome = ReconOutcome::assemble(matches, manual_candidates, unmatched_file1, unmatched_file2);
        info!(
            matches = outcome.matches.len(),
            manual = outcome.manual_candidates.len(),
            unmatched1 = outcome.unmatched_file1.len(),
            unmatched2 = outcome.unmatched_file2.len(),
            "reconciliation complete"
        );
        Ok(outcome)
    }
}

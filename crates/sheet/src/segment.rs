use tracing::{debug, warn};

use interunit_core::{BlockId, Direction, Money, RowRole, TransactionBlock};

use crate::model::SheetModel;

/// Split a sheet into transaction blocks with a single forward scan.
///
/// A header row opens a block; rows are appended until an "Entered By :"
/// row closes it (inclusive). A new header before the terminator closes
/// the running block short, and a block still open at end-of-sheet is
/// emitted unterminated; both malformations are tolerated and logged.
pub fn identify_blocks(model: &SheetModel) -> Vec<TransactionBlock> {
    let mut blocks = Vec::new();
    let mut open: Option<(usize, Vec<usize>)> = None;

    for row in &model.rows {
        match row.role {
            RowRole::Header => {
                if let Some((header, rows)) = open.take() {
                    warn!(header, next = row.row, "block closed by next header without terminator");
                    push_block(model, &mut blocks, header, rows, false);
                }
                open = Some((row.row, vec![row.row]));
            }
            RowRole::Terminator => {
                if let Some((header, mut rows)) = open.take() {
                    rows.push(row.row);
                    push_block(model, &mut blocks, header, rows, true);
                }
            }
            _ => {
                if let Some((_, rows)) = open.as_mut() {
                    rows.push(row.row);
                }
            }
        }
    }

    if let Some((header, rows)) = open.take() {
        warn!(header, "block ran to end of sheet without terminator");
        push_block(model, &mut blocks, header, rows, false);
    }

    debug!(blocks = blocks.len(), "segmentation complete");
    blocks
}

fn push_block(
    model: &SheetModel,
    blocks: &mut Vec<TransactionBlock>,
    header_row: usize,
    rows: Vec<usize>,
    terminated: bool,
) {
    let header = match model.row(header_row) {
        Some(r) => r,
        None => return,
    };
    let debit = header.debit.unwrap_or_else(Money::zero);
    let credit = header.credit.unwrap_or_else(Money::zero);
    let (direction, amount) = if debit.is_positive() {
        (Direction::Lender, debit)
    } else if credit.is_positive() {
        (Direction::Borrower, credit)
    } else {
        warn!(header_row, "header with no positive amount; block skipped");
        return;
    };

    blocks.push(TransactionBlock {
        header_row,
        rows,
        terminated,
        direction,
        amount,
        debit,
        credit,
    });
}

/// Row to block reverse map, built once per file so strategies never scan
/// for a block boundary.
#[derive(Debug, Clone)]
pub struct BlockIndex {
    block_of_row: Vec<Option<BlockId>>,
}

impl BlockIndex {
    pub fn build(blocks: &[TransactionBlock], row_count: usize) -> Self {
        let mut block_of_row = vec![None; row_count];
        for (id, block) in blocks.iter().enumerate() {
            for &row in &block.rows {
                if let Some(slot) = block_of_row.get_mut(row) {
                    *slot = Some(id);
                }
            }
        }
        BlockIndex { block_of_row }
    }

    pub fn block_of(&self, row: usize) -> Option<BlockId> {
        self.block_of_row.get(row).copied().flatten()
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// Ordinal of a block within one file's segmentation output.
pub type BlockId = usize;

/// Which side of the loan a voucher sits on. A header row with a positive
/// debit lends money out; a positive credit receives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Lender,
    Borrower,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Lender => Direction::Borrower,
            Direction::Borrower => Direction::Lender,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Lender => write!(f, "Lender"),
            Direction::Borrower => write!(f, "Borrower"),
        }
    }
}

/// A contiguous run of rows belonging to one voucher: header first, then
/// ledger/narration lines, closed by a terminator row (when present).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionBlock {
    pub header_row: usize,
    /// All row indices in the block, header included, in sheet order.
    pub rows: Vec<usize>,
    /// False when the block ran to end-of-sheet or into the next header
    /// without an "Entered By :" row.
    pub terminated: bool,
    pub direction: Direction,
    /// The positive side of the header amounts.
    pub amount: Money,
    pub debit: Money,
    pub credit: Money,
}

impl TransactionBlock {
    pub fn is_lender(&self) -> bool {
        self.direction == Direction::Lender
    }

    pub fn last_row(&self) -> usize {
        *self.rows.last().unwrap_or(&self.header_row)
    }
}

pub mod block;
pub mod matching;
pub mod money;
pub mod row;

pub use block::{BlockId, Direction, TransactionBlock};
pub use matching::{MatchDetail, MatchRecord, MatchType};
pub use money::Money;
pub use row::{CellStyle, DrCr, LedgerRow, RowRole};

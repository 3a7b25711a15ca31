pub mod dump;
pub mod model;
pub mod segment;

pub use dump::{CellDump, SheetDump};
pub use model::{SheetModel, WorkbookError};
pub use segment::{identify_blocks, BlockIndex};

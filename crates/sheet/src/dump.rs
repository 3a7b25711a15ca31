use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::WorkbookError;

/// One cell of the export: text value plus the two font flags the matcher
/// cares about. Missing fields default to empty/plain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellDump {
    #[serde(default)]
    pub v: String,
    #[serde(default)]
    pub b: bool,
    #[serde(default)]
    pub i: bool,
}

impl CellDump {
    pub fn text(v: &str) -> Self {
        CellDump { v: v.to_string(), ..Default::default() }
    }

    pub fn bold(v: &str) -> Self {
        CellDump { v: v.to_string(), b: true, i: false }
    }

    pub fn italic(v: &str) -> Self {
        CellDump { v: v.to_string(), b: false, i: true }
    }
}

/// Raw workbook contents as exported by the spreadsheet side: one entry
/// per sheet row, each a list of cells for columns A..I. Rows 1-8 are the
/// report preamble, row 9 the column headers, data from row 10.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetDump {
    pub rows: Vec<Vec<CellDump>>,
}

impl SheetDump {
    pub fn load(path: &Path) -> Result<Self, WorkbookError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

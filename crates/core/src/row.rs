use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// Font attributes of a cell, as carried by the sheet dump. The exports
/// encode row meaning in the font: bold ledger lines, italic narrations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellStyle {
    pub bold: bool,
    pub italic: bool,
}

/// Column B marker on a voucher header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrCr {
    Dr,
    Cr,
}

impl DrCr {
    pub fn parse(marker: &str) -> Option<DrCr> {
        match marker.trim() {
            m if m.eq_ignore_ascii_case("dr") => Some(DrCr::Dr),
            m if m.eq_ignore_ascii_case("cr") => Some(DrCr::Cr),
            _ => None,
        }
    }
}

impl fmt::Display for DrCr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrCr::Dr => write!(f, "Dr"),
            DrCr::Cr => write!(f, "Cr"),
        }
    }
}

/// Structural role of a data row, decided once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowRole {
    /// Voucher header: date, Dr/Cr marker, bold voucher type, bold amount.
    Header,
    /// Bold, non-italic particulars: a ledger account line.
    LedgerAccount,
    /// Italic, non-bold particulars: narration text.
    Narration,
    /// "Entered By :" row closing a voucher block.
    Terminator,
    Plain,
}

/// One data row of a ledger export, columns A..I with the font flags of
/// the cells the matcher inspects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Dense 0-based index over data rows (sheet row 10 is index 0).
    pub row: usize,
    /// Raw date text, kept verbatim for output pass-through.
    pub date: String,
    /// Raw column B text.
    pub marker: String,
    pub particulars: String,
    pub particulars_style: CellStyle,
    pub voucher_type: String,
    pub voucher_type_style: CellStyle,
    pub voucher_no: String,
    pub voucher_no_style: CellStyle,
    pub debit: Option<Money>,
    pub debit_style: CellStyle,
    pub credit: Option<Money>,
    pub credit_style: CellStyle,
    pub role: RowRole,
}

impl LedgerRow {
    pub fn dr_cr(&self) -> Option<DrCr> {
        DrCr::parse(&self.marker)
    }
}

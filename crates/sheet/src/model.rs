use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use interunit_core::{CellStyle, DrCr, LedgerRow, Money, RowRole};

use crate::dump::{CellDump, SheetDump};

/// Rows 1-8 of the export are company/report metadata.
const META_ROWS: usize = 8;

const COL_DATE: usize = 0;
const COL_MARKER: usize = 1;
const COL_PARTICULARS: usize = 2;
const COL_VOUCHER_TYPE: usize = 5;
const COL_VOUCHER_NO: usize = 6;
const COL_DEBIT: usize = 7;
const COL_CREDIT: usize = 8;

const TERMINATOR_TEXT: &str = "Entered By :";

/// Tally writes dates a few different ways depending on export settings.
const DATE_FORMATS: &[&str] = &["%d/%b/%Y", "%d-%b-%Y", "%d-%b-%y", "%d/%m/%Y", "%Y-%m-%d"];

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("failed to read sheet dump: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse sheet dump: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sheet has only {rows} rows; expected the 8-row preamble plus a header row")]
    TooFewRows { rows: usize },
    #[error("row 9 does not look like the column header row (first cell: '{found}')")]
    MissingHeaderRow { found: String },
}

/// A loaded ledger export: the metadata preamble kept verbatim plus the
/// data rows with their roles already decided.
#[derive(Debug, Clone)]
pub struct SheetModel {
    pub metadata: Vec<Vec<String>>,
    pub rows: Vec<LedgerRow>,
}

impl SheetModel {
    pub fn load(path: &Path) -> Result<Self, WorkbookError> {
        Self::from_dump(SheetDump::load(path)?)
    }

    pub fn from_dump(dump: SheetDump) -> Result<Self, WorkbookError> {
        if dump.rows.len() <= META_ROWS {
            return Err(WorkbookError::TooFewRows { rows: dump.rows.len() });
        }

        let header = &dump.rows[META_ROWS];
        let first = header.first().map(|c| c.v.trim()).unwrap_or("");
        if !first.eq_ignore_ascii_case("Date") {
            return Err(WorkbookError::MissingHeaderRow { found: first.to_string() });
        }

        let metadata = dump.rows[..META_ROWS]
            .iter()
            .map(|r| r.iter().map(|c| c.v.clone()).collect())
            .collect();

        let rows = dump.rows[META_ROWS + 1..]
            .iter()
            .enumerate()
            .map(|(i, cells)| build_row(i, cells))
            .collect();

        Ok(SheetModel { metadata, rows })
    }

    pub fn row(&self, index: usize) -> Option<&LedgerRow> {
        self.rows.get(index)
    }
}

fn cell(cells: &[CellDump], col: usize) -> (String, CellStyle) {
    match cells.get(col) {
        Some(c) => (c.v.trim().to_string(), CellStyle { bold: c.b, italic: c.i }),
        None => (String::new(), CellStyle::default()),
    }
}

fn build_row(index: usize, cells: &[CellDump]) -> LedgerRow {
    let (date, _) = cell(cells, COL_DATE);
    let (marker, _) = cell(cells, COL_MARKER);
    let (particulars, particulars_style) = cell(cells, COL_PARTICULARS);
    let (voucher_type, voucher_type_style) = cell(cells, COL_VOUCHER_TYPE);
    let (voucher_no, voucher_no_style) = cell(cells, COL_VOUCHER_NO);
    let (debit_text, debit_style) = cell(cells, COL_DEBIT);
    let (credit_text, credit_style) = cell(cells, COL_CREDIT);

    let debit = Money::parse_cell(&debit_text);
    if debit.is_none() && !debit_text.is_empty() {
        debug!(row = index, text = %debit_text, "unparseable debit cell treated as absent");
    }
    let credit = Money::parse_cell(&credit_text);
    if credit.is_none() && !credit_text.is_empty() {
        debug!(row = index, text = %credit_text, "unparseable credit cell treated as absent");
    }

    let mut row = LedgerRow {
        row: index,
        date,
        marker,
        particulars,
        particulars_style,
        voucher_type,
        voucher_type_style,
        voucher_no,
        voucher_no_style,
        debit,
        debit_style,
        credit,
        credit_style,
        role: RowRole::Plain,
    };
    row.role = classify(&row);
    row
}

fn classify(row: &LedgerRow) -> RowRole {
    if row.marker == TERMINATOR_TEXT {
        return RowRole::Terminator;
    }
    if is_header(row) {
        return RowRole::Header;
    }
    if !row.particulars.is_empty() {
        let s = row.particulars_style;
        if s.bold && !s.italic {
            return RowRole::LedgerAccount;
        }
        if s.italic && !s.bold {
            return RowRole::Narration;
        }
    }
    RowRole::Plain
}

/// The structural header predicate: a real date, a Dr/Cr marker, a bold
/// voucher type, a plain voucher number, and a bold amount on either side.
/// Opening-balance carryover rows are excluded.
fn is_header(row: &LedgerRow) -> bool {
    if !looks_like_date(&row.date) {
        return false;
    }
    if DrCr::parse(&row.marker).is_none() || row.marker.contains("Opening Balance") {
        return false;
    }
    if row.voucher_type.is_empty() || !row.voucher_type_style.bold {
        return false;
    }
    if row.voucher_no.is_empty() || row.voucher_no_style.bold || row.voucher_no_style.italic {
        return false;
    }
    let bold_debit = row.debit.is_some() && row.debit_style.bold;
    let bold_credit = row.credit.is_some() && row.credit_style.bold;
    bold_debit || bold_credit
}

fn looks_like_date(text: &str) -> bool {
    let t = text.trim();
    if t.is_empty() {
        return false;
    }
    DATE_FORMATS
        .iter()
        .any(|f| NaiveDate::parse_from_str(t, f).is_ok())
}

use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// Which strategy produced a match. Variants are ordered by cascade
/// priority; serialized names match the report vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchType {
    Narration,
    #[serde(rename = "LC")]
    Lc,
    #[serde(rename = "PO")]
    Po,
    #[serde(rename = "Aggregated_PO")]
    AggregatedPo,
    Interunit,
    Settlement,
    Salary,
    #[serde(rename = "USD")]
    Usd,
    Manual,
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchType::Narration => "Narration",
            MatchType::Lc => "LC",
            MatchType::Po => "PO",
            MatchType::AggregatedPo => "Aggregated_PO",
            MatchType::Interunit => "Interunit",
            MatchType::Settlement => "Settlement",
            MatchType::Salary => "Salary",
            MatchType::Usd => "USD",
            MatchType::Manual => "Manual",
        };
        write!(f, "{s}")
    }
}

/// Strategy-specific evidence carried on a match record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MatchDetail {
    Narration { text: String },
    Lc { number: String },
    Po { number: String },
    AggregatedPo { po_numbers: Vec<String> },
    Interunit { short_code: String },
    Settlement { employee_id: String, keyword_found: bool },
    Salary { month: String, year: String },
    Usd { amounts: Vec<String> },
    Manual,
}

/// One accepted pairing between a file-1 block and one or more file-2
/// blocks (aggregated PO matches list several borrower headers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Dense sequential ID ("M001", ...), assigned after the cascade.
    pub id: Option<String>,
    pub match_type: MatchType,
    pub file1_header: usize,
    pub file2_headers: Vec<usize>,
    pub file1_is_lender: bool,
    pub amount: Money,
    pub detail: MatchDetail,
    /// Human-readable summary written into the report.
    #[serde(default)]
    pub audit_info: String,
}

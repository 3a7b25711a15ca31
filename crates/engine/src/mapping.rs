use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// The interunit account map: full bank account names, as they appear in
/// bold ledger cells, to the short codes counterparties use in narrations
/// (e.g. "Brac Bank PLC-CD-A/C-2028701210002" -> BBL#0002, BBL#10002).
#[derive(Debug, Clone)]
pub struct AccountMapping {
    entries: Vec<Entry>,
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    name_upper: String,
    codes: Vec<CompiledCode>,
}

/// A short code with its precompiled bare-number fallback pattern, so
/// narration scans never rebuild regexes.
#[derive(Debug, Clone)]
struct CompiledCode {
    code: String,
    code_upper: String,
    bare_number: Option<Regex>,
}

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("failed to read mapping file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse mapping TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("account '{account}' has no short codes")]
    EmptyCodes { account: String },
}

#[derive(Debug, Deserialize)]
struct RawMapping {
    #[serde(default)]
    accounts: Vec<RawAccount>,
}

#[derive(Debug, Deserialize)]
struct RawAccount {
    name: String,
    codes: Vec<String>,
}

impl AccountMapping {
    pub fn from_toml(toml_content: &str) -> Result<Self, MappingError> {
        let raw: RawMapping = toml::from_str(toml_content)?;
        let mut entries = Vec::with_capacity(raw.accounts.len());
        for account in raw.accounts {
            if account.codes.is_empty() {
                return Err(MappingError::EmptyCodes { account: account.name });
            }
            let codes = account.codes.iter().map(|c| compile_code(c)).collect();
            entries.push(Entry {
                name_upper: account.name.to_uppercase(),
                name: account.name,
                codes,
            });
        }
        Ok(AccountMapping { entries })
    }

    pub fn from_path(path: &Path) -> Result<Self, MappingError> {
        Self::from_toml(&fs::read_to_string(path)?)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Resolve a bold ledger cell to the short codes of the first mapped
    /// account whose full name appears in the cell text. First match wins.
    pub fn ledger_account_codes(&self, cell_text: &str) -> Option<(&str, Vec<String>)> {
        let upper = cell_text.to_uppercase();
        self.entries
            .iter()
            .find(|e| upper.contains(&e.name_upper))
            .map(|e| {
                let codes = e.codes.iter().map(|c| c.code.clone()).collect();
                (e.name.as_str(), codes)
            })
    }

    /// Every short code referenced by a narration text, either verbatim
    /// (case-insensitive) or through the bare account number with an
    /// optional bank prefix, e.g. "4056" or "EBL 4056" for EBL#4056.
    pub fn narration_codes(&self, narration: &str) -> Vec<String> {
        let upper = narration.to_uppercase();
        let mut found = Vec::new();
        for entry in &self.entries {
            for code in &entry.codes {
                if found.contains(&code.code) {
                    continue;
                }
                let hit = upper.contains(&code.code_upper)
                    || code
                        .bare_number
                        .as_ref()
                        .is_some_and(|re| re.is_match(&upper));
                if hit {
                    found.push(code.code.clone());
                }
            }
        }
        found
    }
}

fn compile_code(code: &str) -> CompiledCode {
    let bare_number = code.split('#').nth(1).and_then(|number| {
        let pat = format!(r"(?:[A-Z]{{2,4}}[#\s]*)?{}(?:\s|&|,|$)", regex::escape(number));
        Regex::new(&pat).ok()
    });
    CompiledCode {
        code: code.to_string(),
        code_upper: code.to_uppercase(),
        bare_number,
    }
}

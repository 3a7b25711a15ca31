use std::collections::BTreeSet;

use interunit_core::MatchRecord;

/// Dense sequential match identifiers: M001, M002, ... in record order.
/// Assignment happens exactly once, after every strategy and manual fold
/// has run, so the sequence never has gaps.
pub fn assign_ids(records: &mut [MatchRecord]) {
    for (i, record) in records.iter_mut().enumerate() {
        record.id = Some(format_id(i + 1));
    }
}

pub fn format_id(n: usize) -> String {
    format!("M{n:03}")
}

/// Check an already-assigned set of records for the density contract:
/// every ID present, unique, and exactly M001..M{len}.
pub fn validate_sequence(records: &[MatchRecord]) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen = BTreeSet::new();
    for (i, record) in records.iter().enumerate() {
        let expected = format_id(i + 1);
        match &record.id {
            None => problems.push(format!("match at position {i} has no ID")),
            Some(id) if !seen.insert(id.clone()) => {
                problems.push(format!("duplicate match ID {id}"));
            }
            Some(id) if *id != expected => {
                problems.push(format!("match ID {id} out of sequence, expected {expected}"));
            }
            Some(_) => {}
        }
    }
    problems
}

use tracing::debug;

use interunit_core::{MatchDetail, MatchType};

use crate::context::RunContext;
use crate::strategy::{pair_record, reject_pair, Strategy, StrategyInput};

/// Salary and festival-bonus matching on normalized (month, year) and
/// (EID kind, year) keys. Both blocks must look like payroll text before
/// any key comparison happens.
pub struct SalaryStrategy;

impl Strategy for SalaryStrategy {
    fn match_type(&self) -> MatchType {
        MatchType::Salary
    }

    fn run(&self, input: &StrategyInput<'_>, ctx: &mut RunContext) {
        let mut found = 0usize;
        for pair in input.pairs {
            if ctx.pair_claimed(input.file1, input.file2, pair) {
                continue;
            }
            let (t1, t2) = input.tokens(pair);
            if !t1.salary_like || !t2.salary_like {
                continue;
            }

            // Bonus keys win over plain month/year keys when both exist.
            if let Some((kind, year)) = t1.bonus_keys.intersection(&t2.bonus_keys).next() {
                ctx.accept(pair_record(
                    input,
                    pair,
                    MatchType::Salary,
                    MatchDetail::Salary {
                        month: format!("EID_UL_{kind}"),
                        year: year.clone(),
                    },
                ));
                found += 1;
                continue;
            }
            if let Some((month, year)) = t1.salary_keys.intersection(&t2.salary_keys).next() {
                ctx.accept(pair_record(
                    input,
                    pair,
                    MatchType::Salary,
                    MatchDetail::Salary { month: month.clone(), year: year.clone() },
                ));
                found += 1;
                continue;
            }

            let reason = format!(
                "Salary/Bonus mismatch: no common keys (salary_my_file1={:?}, salary_my_file2={:?}, bonus_file1={:?}, bonus_file2={:?})",
                t1.salary_keys, t2.salary_keys, t1.bonus_keys, t2.bonus_keys
            );
            reject_pair(ctx, input, pair, &reason);
        }
        debug!(found, "salary matching complete");
    }
}

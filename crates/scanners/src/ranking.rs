//! Finding merge and ranking.
//!
//! Scores are severity-derived with two bonuses: a fixed uplift for rule ids
//! known to indicate directly exploitable classes, and a corroboration uplift
//! when several findings land on the same function or file. The sort
//! tie-breaks equal scores on the raw severity string, ascending. That is
//! lexicographic, not intensity order ("HIGH" < "LOW" < "MEDIUM"), and is
//! preserved deliberately for output compatibility.

use crate::core::{base_score_for, Finding, RankedFinding};
use std::collections::HashMap;

const SERIOUS_BONUS: f64 = 0.3;
const CORROBORATION_BONUS: f64 = 0.2;

/// Rule ids treated as directly exploitable regardless of reported severity.
fn is_serious(rule_id: &str) -> bool {
    rule_id.contains("REENTRANCY") || rule_id == "SC-004" || rule_id == "TAINT-001"
}

/// Merge, score, and sort the findings from every analyzer that ran.
///
/// The full list is returned; top-N trimming belongs to presentation layers.
pub fn rank_findings(findings: Vec<Finding>) -> Vec<RankedFinding> {
    let mut group_counts: HashMap<String, usize> = HashMap::new();
    for finding in &findings {
        *group_counts.entry(finding.grouping_key()).or_insert(0) += 1;
    }

    let mut ranked: Vec<RankedFinding> = findings
        .into_iter()
        .map(|finding| {
            let mut score = base_score_for(&finding.severity);
            if is_serious(&finding.rule_id) {
                score += SERIOUS_BONUS;
            }
            if group_counts
                .get(&finding.grouping_key())
                .is_some_and(|&count| count > 1)
            {
                score += CORROBORATION_BONUS;
            }
            let rank_score = round3(score.clamp(0.0, 1.0));
            RankedFinding {
                finding,
                rank_score,
            }
        })
        .collect();

    // Stable sort: descending score, then ascending raw severity string.
    ranked.sort_by(|a, b| {
        b.rank_score
            .total_cmp(&a.rank_score)
            .then_with(|| a.finding.severity.cmp(&b.finding.severity))
    });

    ranked
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

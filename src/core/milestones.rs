use serde::Serialize;

use super::compare::Winner;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub label: String,
    pub target_amount: f64,
    pub period: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneTarget {
    pub label: String,
    pub amount: f64,
}

impl MilestoneTarget {
    pub fn new(label: impl Into<String>, amount: f64) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

/// First period at which `value` reaches each target.
///
/// Targets that are not positive and finite are skipped; targets the trace
/// never reaches are omitted. The result is ordered by period, keeping the
/// target order for ties.
pub fn find_milestones<S, F>(
    trace: &[S],
    targets: &[MilestoneTarget],
    period: impl Fn(&S) -> u32,
    value: F,
) -> Vec<Milestone>
where
    F: Fn(&S) -> f64,
{
    let mut reached = Vec::new();
    for target in targets {
        if !target.amount.is_finite() || target.amount <= 0.0 {
            continue;
        }
        if let Some(row) = trace.iter().find(|row| value(row) >= target.amount) {
            reached.push(Milestone {
                label: target.label.clone(),
                target_amount: target.amount,
                period: period(row),
            });
        }
    }
    reached.sort_by_key(|m| m.period);
    reached
}

/// Strength band for a comparative verdict, by percentage difference.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Margin {
    Slight,
    Clear,
    Decisive,
}

pub fn margin_for(percentage_difference: f64) -> Margin {
    if percentage_difference >= 25.0 {
        Margin::Decisive
    } else if percentage_difference >= 5.0 {
        Margin::Clear
    } else {
        Margin::Slight
    }
}

/// Wording for a two-way comparison. `option_a`/`option_b` name the
/// scenarios as the caller presents them (e.g. "renting", "buying").
pub fn recommendation_text(
    winner: Winner,
    percentage_difference: f64,
    option_a: &str,
    option_b: &str,
    amount: f64,
) -> String {
    let amount = amount.abs().round();
    let (chosen, other) = match winner {
        Winner::ScenarioA => (option_a, option_b),
        Winner::ScenarioB => (option_b, option_a),
        Winner::Neutral => {
            return format!(
                "{} and {} end within {:.1}% of each other; the difference of {amount:.0} \
                 is too small to favour either under these assumptions.",
                capitalize(option_a),
                option_b,
                percentage_difference
            );
        }
    };

    match margin_for(percentage_difference) {
        Margin::Decisive => format!(
            "{} comes out well ahead: {amount:.0} more net worth than {other} ({:.1}%).",
            capitalize(chosen),
            percentage_difference
        ),
        Margin::Clear => format!(
            "{} is the better choice, ending {amount:.0} ahead of {other} ({:.1}%).",
            capitalize(chosen),
            percentage_difference
        ),
        Margin::Slight => format!(
            "{} is slightly ahead by {amount:.0} ({:.1}%); small changes in the assumptions \
             could reverse this.",
            capitalize(chosen),
            percentage_difference
        ),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

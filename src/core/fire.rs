use log::debug;

use super::engine::{Policy, monthly_growth_factor, simulate, year_end_rows};
use super::milestones::{MilestoneTarget, find_milestones};
use super::types::{FireInputs, FireMonth, FirePhase, FireResult};

const FIXED_MILESTONES: [(&str, f64); 3] = [
    ("$100K", 100_000.0),
    ("$500K", 500_000.0),
    ("$1M", 1_000_000.0),
];

/// Annual expenses divided by the withdrawal rate; infinite for a rate ≤ 0.
pub fn fire_number(annual_expenses: f64, withdrawal_rate: f64) -> f64 {
    if withdrawal_rate <= 0.0 {
        return f64::INFINITY;
    }
    annual_expenses.max(0.0) / (withdrawal_rate / 100.0)
}

/// Amount that, left untouched at the real return, grows into the FIRE
/// number by the target retirement age.
pub fn coast_fire_number(inputs: &FireInputs) -> f64 {
    let target = fire_number(inputs.annual_expenses, inputs.withdrawal_rate);
    if !target.is_finite() {
        return target;
    }
    let real_growth =
        (1.0 + inputs.expected_return / 100.0) / (1.0 + inputs.inflation_rate / 100.0);
    if !real_growth.is_finite() || real_growth <= 0.0 {
        return target;
    }
    let years = inputs.target_retirement_age.saturating_sub(inputs.current_age);
    target / real_growth.powi(years as i32)
}

#[derive(Debug)]
struct FireState {
    phase: FirePhase,
    portfolio: f64,
    contribution: f64,
    withdrawal: f64,
    growth: f64,
    cumulative_contributions: f64,
    cumulative_growth: f64,
    cumulative_withdrawals: f64,
}

struct FirePolicy<'a> {
    inputs: &'a FireInputs,
    fire_number: f64,
    return_factor: f64,
    inflation_factor: f64,
}

impl FirePolicy<'_> {
    fn new(inputs: &FireInputs) -> FirePolicy<'_> {
        FirePolicy {
            inputs,
            fire_number: fire_number(inputs.annual_expenses, inputs.withdrawal_rate),
            return_factor: monthly_growth_factor(inputs.expected_return),
            inflation_factor: monthly_growth_factor(inputs.inflation_rate),
        }
    }

    fn price_level(&self, month: u32) -> f64 {
        self.inflation_factor.powi(month as i32)
    }

    fn target_at(&self, month: u32) -> f64 {
        self.fire_number * self.price_level(month)
    }

    fn contribution_for(&self, month: u32) -> f64 {
        let year = month.saturating_sub(1) / 12;
        let step = (1.0 + self.inputs.contribution_increase / 100.0).max(0.0);
        self.inputs.monthly_contribution.max(0.0) * step.powi(year as i32)
    }
}

impl Policy for FirePolicy<'_> {
    type State = FireState;
    type Snapshot = FireMonth;

    fn initial_state(&self) -> FireState {
        FireState {
            phase: FirePhase::Accumulating,
            portfolio: self.inputs.current_savings.max(0.0),
            contribution: 0.0,
            withdrawal: 0.0,
            growth: 0.0,
            cumulative_contributions: 0.0,
            cumulative_growth: 0.0,
            cumulative_withdrawals: 0.0,
        }
    }

    fn accrue(&self, state: &mut FireState, _month: u32) {
        state.growth = state.portfolio * (self.return_factor - 1.0);
        state.portfolio += state.growth;
        state.cumulative_growth += state.growth;
    }

    fn apply_cash_flows(&self, state: &mut FireState, month: u32) {
        state.contribution = 0.0;
        state.withdrawal = 0.0;
        match state.phase {
            FirePhase::Accumulating => {
                state.contribution = self.contribution_for(month);
                state.portfolio += state.contribution;
                state.cumulative_contributions += state.contribution;
            }
            FirePhase::Drawdown => {
                let spending =
                    self.inputs.annual_expenses.max(0.0) / 12.0 * self.price_level(month);
                state.withdrawal = spending.min(state.portfolio);
                state.portfolio -= state.withdrawal;
                state.cumulative_withdrawals += state.withdrawal;
            }
        }
    }

    fn apply_transitions(&self, state: &mut FireState, month: u32) {
        if state.phase == FirePhase::Accumulating && state.portfolio >= self.target_at(month) {
            state.phase = FirePhase::Drawdown;
        }
    }

    fn snapshot(&self, state: &FireState, month: u32) -> FireMonth {
        FireMonth {
            month,
            age: self.inputs.current_age as f64 + month as f64 / 12.0,
            phase: state.phase,
            portfolio: state.portfolio,
            contribution: state.contribution,
            withdrawal: state.withdrawal,
            growth: state.growth,
            fire_target: self.target_at(month),
            cumulative_contributions: state.cumulative_contributions,
            cumulative_growth: state.cumulative_growth,
            cumulative_withdrawals: state.cumulative_withdrawals,
        }
    }
}

/// Fractions of the FIRE number, measured in today's money like the
/// retirement switch itself.
fn fire_fraction_targets(fire_number: f64) -> Vec<MilestoneTarget> {
    [25.0, 50.0, 75.0, 100.0]
        .into_iter()
        .map(|pct| {
            MilestoneTarget::new(format!("{pct:.0}% of FIRE number"), fire_number * pct / 100.0)
        })
        .collect()
}

/// Round-number balances, measured in nominal money.
fn fixed_targets() -> Vec<MilestoneTarget> {
    FIXED_MILESTONES
        .iter()
        .map(|(label, amount)| MilestoneTarget::new(*label, *amount))
        .collect()
}

fn age_at(inputs: &FireInputs, month: u32) -> f64 {
    inputs.current_age as f64 + month as f64 / 12.0
}

pub fn run_fire(inputs: &FireInputs) -> FireResult {
    let fire_number = fire_number(inputs.annual_expenses, inputs.withdrawal_rate);
    let coast_fire_number = coast_fire_number(inputs);
    let years_left = inputs.life_expectancy.saturating_sub(inputs.current_age);
    let horizon = i32::try_from(years_left.saturating_mul(12)).unwrap_or(i32::MAX);

    let policy = FirePolicy::new(inputs);
    let monthly_data = simulate(&policy, horizon);
    let Some(last) = monthly_data.last().copied() else {
        return FireResult {
            fire_number,
            coast_fire_number,
            months_to_fire: None,
            years_to_fire: None,
            fire_age: None,
            portfolio_at_fire: None,
            reaches_fire_by_target_age: false,
            final_portfolio: inputs.current_savings.max(0.0),
            total_contributions: 0.0,
            total_growth: 0.0,
            total_withdrawals: 0.0,
            depletion_age: None,
            milestones: Vec::new(),
            summary: "Life expectancy must be above the current age to project a FIRE plan."
                .to_string(),
            monthly_data,
            yearly_data: Vec::new(),
        };
    };

    let fire_row = monthly_data
        .iter()
        .find(|row| row.phase == FirePhase::Drawdown)
        .copied();
    let depletion_month = fire_row.and_then(|fired| {
        monthly_data
            .iter()
            .skip(fired.month as usize)
            .find(|row| row.portfolio <= 0.0 && row.withdrawal > 0.0)
            .map(|row| row.month)
    });

    let months_to_fire = fire_row.map(|row| row.month);
    let fire_age = months_to_fire.map(|m| age_at(inputs, m));
    let reaches_fire_by_target_age =
        fire_age.is_some_and(|age| age <= inputs.target_retirement_age as f64);
    let depletion_age = depletion_month.map(|m| age_at(inputs, m));

    let mut milestones = find_milestones(
        &monthly_data,
        &fire_fraction_targets(fire_number),
        |row| row.month,
        |row| row.portfolio / policy.price_level(row.month),
    );
    milestones.extend(find_milestones(
        &monthly_data,
        &fixed_targets(),
        |row| row.month,
        |row| row.portfolio,
    ));
    milestones.sort_by_key(|m| m.period);

    let summary = match (fire_row, fire_age) {
        (Some(row), Some(age)) => {
            let mut text = format!(
                "You reach financial independence at age {age:.1}, {:.1} years from now, \
                 with a portfolio of {:.0}.",
                row.month as f64 / 12.0,
                row.portfolio
            );
            if reaches_fire_by_target_age {
                text.push_str(&format!(
                    " That is on or before your target age of {}.",
                    inputs.target_retirement_age
                ));
            } else {
                text.push_str(&format!(
                    " That is later than your target age of {}.",
                    inputs.target_retirement_age
                ));
            }
            match depletion_age {
                Some(age) => text.push_str(&format!(
                    " At the planned spending the portfolio runs out at age {age:.1}."
                )),
                None => text.push_str(&format!(
                    " The portfolio lasts to age {}, ending at {:.0}.",
                    inputs.life_expectancy, last.portfolio
                )),
            }
            text
        }
        _ if !fire_number.is_finite() => {
            "A withdrawal rate of zero or less has no finite FIRE number; the projection \
             only shows accumulation."
                .to_string()
        }
        _ => format!(
            "The portfolio does not reach the FIRE number of {fire_number:.0} (in today's money) \
             before age {}.",
            inputs.life_expectancy
        ),
    };

    debug!(
        "fire: months={horizon} fire_month={months_to_fire:?} depletion={depletion_month:?} \
         final={:.2}",
        last.portfolio
    );

    FireResult {
        fire_number,
        coast_fire_number,
        months_to_fire,
        years_to_fire: months_to_fire.map(|m| m as f64 / 12.0),
        fire_age,
        portfolio_at_fire: fire_row.map(|row| row.portfolio),
        reaches_fire_by_target_age,
        final_portfolio: last.portfolio,
        total_contributions: last.cumulative_contributions,
        total_growth: last.cumulative_growth,
        total_withdrawals: last.cumulative_withdrawals,
        depletion_age,
        milestones,
        summary,
        yearly_data: year_end_rows(&monthly_data),
        monthly_data,
    }
}

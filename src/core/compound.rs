use log::debug;

use super::engine::{Policy, simulate, year_end_rows};
use super::types::{
    CompoundInterestInputs, CompoundInterestResult, CompoundYear, CompoundingFrequency,
};

/// `(1 + r/n)^n - 1`, in percent.
pub fn effective_annual_rate(annual_rate: f64, compounding: CompoundingFrequency) -> f64 {
    let n = compounding.periods_per_year();
    let per_period = 1.0 + annual_rate / 100.0 / n;
    if per_period <= 0.0 {
        return -100.0;
    }
    (per_period.powf(n) - 1.0) * 100.0
}

/// Growth over one month when interest compounds `n` times a year.
fn monthly_factor(annual_rate: f64, compounding: CompoundingFrequency) -> f64 {
    let n = compounding.periods_per_year();
    let per_period = 1.0 + annual_rate / 100.0 / n;
    if per_period <= 0.0 {
        return 0.0;
    }
    per_period.powf(n / 12.0)
}

#[derive(Debug, Clone, Copy)]
struct Balance {
    month: u32,
    balance: f64,
    contributions: f64,
    interest: f64,
}

struct DepositPolicy {
    principal: f64,
    contribution: f64,
    factor: f64,
}

impl Policy for DepositPolicy {
    type State = Balance;
    type Snapshot = Balance;

    fn initial_state(&self) -> Balance {
        Balance {
            month: 0,
            balance: self.principal,
            contributions: 0.0,
            interest: 0.0,
        }
    }

    fn accrue(&self, state: &mut Balance, _month: u32) {
        let interest = state.balance * (self.factor - 1.0);
        state.balance += interest;
        state.interest += interest;
    }

    // Deposits land at the end of the month and earn from the next one.
    fn apply_cash_flows(&self, state: &mut Balance, month: u32) {
        state.month = month;
        state.balance += self.contribution;
        state.contributions += self.contribution;
    }

    fn snapshot(&self, state: &Balance, _month: u32) -> Balance {
        *state
    }
}

pub fn run_compound_interest(inputs: &CompoundInterestInputs) -> CompoundInterestResult {
    let principal = inputs.principal.max(0.0);
    let policy = DepositPolicy {
        principal,
        contribution: inputs.monthly_contribution.max(0.0),
        factor: monthly_factor(inputs.annual_rate, inputs.compounding),
    };
    let trace = simulate(&policy, inputs.years.saturating_mul(12));

    let mut opening = principal;
    let mut previous = policy.initial_state();
    let mut yearly_data = Vec::with_capacity(trace.len() / 12);
    for row in year_end_rows(&trace) {
        yearly_data.push(CompoundYear {
            year: row.month / 12,
            opening_balance: opening,
            contributions: row.contributions - previous.contributions,
            interest: row.interest - previous.interest,
            closing_balance: row.balance,
            cumulative_contributions: row.contributions,
            cumulative_interest: row.interest,
        });
        opening = row.balance;
        previous = row;
    }

    let last = trace.last().copied().unwrap_or(previous);
    let total_contributions = principal + last.contributions;
    debug!(
        "compound interest: months={} final={:.2} interest={:.2}",
        trace.len(),
        last.balance,
        last.interest
    );

    CompoundInterestResult {
        final_balance: last.balance,
        total_contributions,
        total_interest: last.interest,
        effective_annual_rate: effective_annual_rate(inputs.annual_rate, inputs.compounding),
        yearly_data,
    }
}

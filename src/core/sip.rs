use log::debug;

use super::engine::{Policy, simulate, year_end_rows};
use super::types::{SipInputs, SipResult, SipYear};

#[derive(Debug, Clone, Copy)]
struct SipState {
    month: u32,
    installment: f64,
    invested: f64,
    value: f64,
}

/// Fixed installment at the end of every month, raised once a year by the
/// step-up. Returns compound monthly at `r / 12`.
struct SipPolicy {
    installment: f64,
    monthly_rate: f64,
    step_up: f64,
}

impl Policy for SipPolicy {
    type State = SipState;
    type Snapshot = SipState;

    fn initial_state(&self) -> SipState {
        SipState {
            month: 0,
            installment: 0.0,
            invested: 0.0,
            value: 0.0,
        }
    }

    fn accrue(&self, state: &mut SipState, _month: u32) {
        state.value *= 1.0 + self.monthly_rate;
    }

    fn apply_cash_flows(&self, state: &mut SipState, month: u32) {
        let year = month.saturating_sub(1) / 12;
        state.month = month;
        state.installment = self.installment * self.step_up.powi(year as i32);
        state.invested += state.installment;
        state.value += state.installment;
    }

    fn snapshot(&self, state: &SipState, _month: u32) -> SipState {
        *state
    }
}

pub fn run_sip(inputs: &SipInputs) -> SipResult {
    let policy = SipPolicy {
        installment: inputs.monthly_investment.max(0.0),
        monthly_rate: (inputs.expected_return / 100.0 / 12.0).max(-1.0),
        step_up: (1.0 + inputs.annual_step_up / 100.0).max(0.0),
    };
    let trace = simulate(&policy, inputs.years.saturating_mul(12));

    let yearly_data = year_end_rows(&trace)
        .into_iter()
        .map(|row| SipYear {
            year: row.month / 12,
            monthly_installment: row.installment,
            invested_amount: row.invested,
            estimated_returns: row.value - row.invested,
            total_value: row.value,
        })
        .collect();

    let last = trace.last().copied().unwrap_or_else(|| policy.initial_state());
    debug!(
        "sip: months={} invested={:.2} value={:.2}",
        trace.len(),
        last.invested,
        last.value
    );

    SipResult {
        invested_amount: last.invested,
        estimated_returns: last.value - last.invested,
        total_value: last.value,
        yearly_data,
    }
}

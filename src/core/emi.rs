use log::debug;

use super::amortization::{amortization_schedule, monthly_payment};
use super::types::{EmiInputs, EmiResult, EmiYear};

pub fn run_emi(inputs: &EmiInputs) -> EmiResult {
    let emi = monthly_payment(inputs.loan_amount, inputs.annual_rate, inputs.tenure_months);
    let schedule =
        amortization_schedule(inputs.loan_amount, inputs.annual_rate, inputs.tenure_months);

    let total_payment: f64 = schedule.iter().map(|row| row.payment).sum();
    let total_interest: f64 = schedule.iter().map(|row| row.interest).sum();
    let interest_share = if total_payment > 0.0 {
        total_interest / total_payment * 100.0
    } else {
        0.0
    };

    let yearly_data = schedule
        .chunks(12)
        .enumerate()
        .map(|(idx, rows)| EmiYear {
            year: idx as u32 + 1,
            principal_paid: rows.iter().map(|row| row.principal).sum(),
            interest_paid: rows.iter().map(|row| row.interest).sum(),
            closing_balance: rows.last().map_or(0.0, |row| row.balance),
        })
        .collect();

    debug!(
        "emi: months={} emi={emi:.2} interest={total_interest:.2}",
        schedule.len()
    );

    EmiResult {
        emi,
        total_payment,
        total_interest,
        interest_share,
        schedule,
        yearly_data,
    }
}

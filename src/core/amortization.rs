use serde::Serialize;

/// Balances below this share of the principal are treated as fully repaid.
const BALANCE_DUST_RATIO: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub balance: f64,
}

pub fn monthly_rate(annual_rate_pct: f64) -> f64 {
    annual_rate_pct / 100.0 / 12.0
}

/// Fixed monthly payment that retires `principal` over `term_months`.
///
/// Returns 0 for a non-positive principal or term.
pub fn monthly_payment(principal: f64, annual_rate_pct: f64, term_months: i32) -> f64 {
    if principal <= 0.0 || term_months <= 0 {
        return 0.0;
    }
    let n = term_months as f64;
    let r = monthly_rate(annual_rate_pct);
    if r == 0.0 {
        return principal / n;
    }
    let growth = (1.0 + r).powf(n);
    principal * r * growth / (growth - 1.0)
}

/// Outstanding balance after `periods_elapsed` payments of `payment`.
pub fn remaining_balance(
    principal: f64,
    payment: f64,
    annual_rate_pct: f64,
    periods_elapsed: i32,
) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }
    let n = periods_elapsed.max(0) as f64;
    let r = monthly_rate(annual_rate_pct);
    let balance = if r == 0.0 {
        principal - payment * n
    } else {
        let growth = (1.0 + r).powf(n);
        principal * growth - payment * (growth - 1.0) / r
    };
    let dust = (principal * BALANCE_DUST_RATIO).max(1e-9);
    if balance < dust { 0.0 } else { balance }
}

pub fn amortization_schedule(
    principal: f64,
    annual_rate_pct: f64,
    term_months: i32,
) -> Vec<AmortizationRow> {
    let payment = monthly_payment(principal, annual_rate_pct, term_months);
    if payment <= 0.0 {
        return Vec::new();
    }

    let r = monthly_rate(annual_rate_pct);
    let mut balance = principal;
    let mut rows = Vec::with_capacity(term_months as usize);
    for month in 1..=term_months as u32 {
        let interest = balance * r;
        // Final row absorbs floating drift so the schedule closes at zero.
        let principal_paid = if month == term_months as u32 {
            balance
        } else {
            (payment - interest).min(balance)
        };
        balance = (balance - principal_paid).max(0.0);
        rows.push(AmortizationRow {
            month,
            payment: principal_paid + interest,
            principal: principal_paid,
            interest,
            balance,
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn zero_rate_payment_is_straight_line() {
        assert_eq!(monthly_payment(12_000.0, 0.0, 12), 1_000.0);
        assert_eq!(monthly_payment(100.0, 0.0, 3), 100.0 / 3.0);
    }

    #[test]
    fn payment_matches_textbook_value() {
        // 200k over 30 years at 6% is the classic 1199.10 payment.
        assert_approx_tol(monthly_payment(200_000.0, 6.0, 360), 1_199.10, 0.01);
    }

    #[test]
    fn degenerate_inputs_return_zero_payment() {
        assert_eq!(monthly_payment(0.0, 5.0, 360), 0.0);
        assert_eq!(monthly_payment(-10.0, 5.0, 360), 0.0);
        assert_eq!(monthly_payment(10_000.0, 5.0, 0), 0.0);
        assert_eq!(monthly_payment(10_000.0, 5.0, -12), 0.0);
    }

    #[test]
    fn balance_beyond_term_is_zero() {
        let payment = monthly_payment(50_000.0, 4.5, 120);
        assert_eq!(remaining_balance(50_000.0, payment, 4.5, 200), 0.0);
        assert_eq!(remaining_balance(50_000.0, 500.0, 0.0, 101), 0.0);
    }

    #[test]
    fn negative_elapsed_is_treated_as_start() {
        let payment = monthly_payment(50_000.0, 4.5, 120);
        assert_approx_tol(remaining_balance(50_000.0, payment, 4.5, -3), 50_000.0, 1e-9);
    }

    #[test]
    fn schedule_closes_at_zero_and_sums_to_principal() {
        let rows = amortization_schedule(25_000.0, 9.0, 48);
        assert_eq!(rows.len(), 48);
        assert_eq!(rows.last().map(|r| r.balance), Some(0.0));
        let principal: f64 = rows.iter().map(|r| r.principal).sum();
        assert_approx_tol(principal, 25_000.0, 1e-6);
        let payment = monthly_payment(25_000.0, 9.0, 48);
        for row in &rows {
            assert_approx_tol(row.payment, payment, 1e-6);
        }
    }

    #[test]
    fn schedule_is_empty_for_degenerate_loan() {
        assert!(amortization_schedule(0.0, 9.0, 48).is_empty());
        assert!(amortization_schedule(1_000.0, 9.0, 0).is_empty());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_principal_components_sum_to_principal(
            principal in 1_000u32..2_000_000,
            rate_bp in 0u32..2_000,
            term in 1i32..480
        ) {
            let principal = principal as f64;
            let rate = rate_bp as f64 / 100.0;
            let payment = monthly_payment(principal, rate, term);

            let mut repaid = 0.0;
            let mut previous = principal;
            for k in 1..=term {
                let balance = remaining_balance(principal, payment, rate, k);
                repaid += previous - balance;
                previous = balance;
            }
            prop_assert!((repaid - principal).abs() <= principal * 1e-9 + 1e-6);
        }

        #[test]
        fn prop_balance_is_non_increasing_and_zero_at_term(
            principal in 1_000u32..2_000_000,
            rate_bp in 0u32..2_000,
            term in 1i32..480
        ) {
            let principal = principal as f64;
            let rate = rate_bp as f64 / 100.0;
            let payment = monthly_payment(principal, rate, term);

            let mut previous = remaining_balance(principal, payment, rate, 0);
            for k in 1..=term {
                let balance = remaining_balance(principal, payment, rate, k);
                prop_assert!(balance <= previous + 1e-9);
                previous = balance;
            }
            prop_assert!(remaining_balance(principal, payment, rate, term) <= 1e-6);
        }
    }
}

//! Prepaying a mortgage versus investing the same cash.
//!
//! Scenario A puts the lump sum and the extra payment into the loan and
//! redirects the whole payment into the market once the loan is gone.
//! Scenario B pays the scheduled EMI only and invests everything else from
//! day one. Both spend exactly the same cash every month.

use log::debug;

use super::amortization::{monthly_payment, monthly_rate};
use super::compare::{
    NetWorthPoint, Winner, classify_winner, compare_traces, percentage_difference,
};
use super::engine::{Policy, monthly_growth_factor, simulate};
use super::milestones::recommendation_text;
use super::solver::{BisectionConfig, bisect_root};
use super::types::{
    BreakevenSearch, LoanPortfolioSnapshot, MortgagePayoffInputs, MortgagePayoffResult,
    PayoffMonth, PayoffScenarioSummary, PayoffVerdict,
};

/// A balance at or below this is considered repaid.
const PAYOFF_EPSILON: f64 = 0.01;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Strategy {
    Prepay,
    Invest,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum LoanState {
    Repaying,
    PaidOff,
}

#[derive(Debug)]
struct PayoffState {
    loan_balance: f64,
    loan_state: LoanState,
    cleared_this_month: bool,
    portfolio: f64,
    invested: f64,
    interest_paid: f64,
    tax_savings: f64,
    month_interest: f64,
    payoff_month: Option<u32>,
}

struct PayoffPolicy<'a> {
    inputs: &'a MortgagePayoffInputs,
    strategy: Strategy,
    emi: f64,
    loan_rate: f64,
    market_factor: f64,
}

impl<'a> PayoffPolicy<'a> {
    fn new(inputs: &'a MortgagePayoffInputs, strategy: Strategy, market_return: f64) -> Self {
        Self {
            inputs,
            strategy,
            emi: effective_emi(inputs),
            loan_rate: monthly_rate(inputs.interest_rate),
            market_factor: monthly_growth_factor(market_return),
        }
    }

    /// Cash sent towards the loan each month while it is outstanding.
    fn loan_budget(&self) -> f64 {
        match self.strategy {
            Strategy::Prepay => self.emi + self.inputs.extra_monthly_payment.max(0.0),
            Strategy::Invest => self.emi,
        }
    }

    fn total_budget(&self) -> f64 {
        self.emi + self.inputs.extra_monthly_payment.max(0.0)
    }
}

impl Policy for PayoffPolicy<'_> {
    type State = PayoffState;
    type Snapshot = LoanPortfolioSnapshot;

    fn initial_state(&self) -> PayoffState {
        let balance = self.inputs.current_balance.max(0.0);
        let lump = self.inputs.lump_sum_amount.max(0.0);
        let (loan_balance, portfolio) = match self.strategy {
            Strategy::Prepay => {
                let applied = lump.min(balance);
                (balance - applied, lump - applied)
            }
            Strategy::Invest => (balance, lump),
        };
        let paid_off = loan_balance <= PAYOFF_EPSILON;
        PayoffState {
            loan_balance: if paid_off { 0.0 } else { loan_balance },
            loan_state: if paid_off {
                LoanState::PaidOff
            } else {
                LoanState::Repaying
            },
            cleared_this_month: false,
            portfolio,
            invested: portfolio,
            interest_paid: 0.0,
            tax_savings: 0.0,
            month_interest: 0.0,
            payoff_month: if paid_off { Some(0) } else { None },
        }
    }

    fn accrue(&self, state: &mut PayoffState, _month: u32) {
        state.portfolio *= self.market_factor;
        state.month_interest = match state.loan_state {
            LoanState::Repaying => state.loan_balance * self.loan_rate,
            LoanState::PaidOff => 0.0,
        };
        state.loan_balance += state.month_interest;
        state.interest_paid += state.month_interest;
    }

    fn apply_cash_flows(&self, state: &mut PayoffState, _month: u32) {
        let mut to_invest = self.total_budget();
        if state.loan_state == LoanState::Repaying {
            let budget = self.loan_budget();
            let payment = if state.loan_balance - budget <= PAYOFF_EPSILON {
                state.cleared_this_month = true;
                state.loan_balance
            } else {
                budget
            };
            state.loan_balance -= payment;
            to_invest -= payment;
            if state.cleared_this_month {
                state.loan_balance = 0.0;
            }
        }

        let tax_saving =
            state.month_interest * self.inputs.mortgage_tax_deduction.max(0.0) / 100.0;
        state.tax_savings += tax_saving;
        to_invest += tax_saving;

        state.portfolio += to_invest;
        state.invested += to_invest;
    }

    fn apply_transitions(&self, state: &mut PayoffState, month: u32) {
        if state.cleared_this_month {
            state.cleared_this_month = false;
            state.loan_state = LoanState::PaidOff;
            state.payoff_month = Some(month);
        }
    }

    fn snapshot(&self, state: &PayoffState, month: u32) -> LoanPortfolioSnapshot {
        LoanPortfolioSnapshot {
            month,
            loan_balance: state.loan_balance,
            paid_off: state.loan_state == LoanState::PaidOff,
            payoff_month: state.payoff_month,
            portfolio: state.portfolio,
            invested: state.invested,
            interest_paid: state.interest_paid,
            tax_savings: state.tax_savings,
            net_worth: state.portfolio - state.loan_balance,
        }
    }
}

impl NetWorthPoint for LoanPortfolioSnapshot {
    fn period(&self) -> u32 {
        self.month
    }

    fn net_worth(&self) -> f64 {
        self.net_worth
    }
}

/// The stated EMI, or the amortizing payment when none was given.
fn effective_emi(inputs: &MortgagePayoffInputs) -> f64 {
    if inputs.monthly_emi > 0.0 {
        inputs.monthly_emi
    } else {
        monthly_payment(
            inputs.current_balance,
            inputs.interest_rate,
            inputs.remaining_tenure,
        )
    }
}

fn capital_gains_tax(snapshot: &LoanPortfolioSnapshot, rate_pct: f64) -> f64 {
    let gain = (snapshot.portfolio - snapshot.invested).max(0.0);
    gain * rate_pct.clamp(0.0, 100.0) / 100.0
}

/// Net worth at the horizon after liquidating the portfolio.
fn after_tax_net_worth(snapshot: &LoanPortfolioSnapshot, rate_pct: f64) -> f64 {
    snapshot.net_worth - capital_gains_tax(snapshot, rate_pct)
}

fn is_degenerate(inputs: &MortgagePayoffInputs) -> bool {
    inputs.current_balance <= 0.0 || inputs.remaining_tenure <= 0
}

fn run_scenario(
    inputs: &MortgagePayoffInputs,
    strategy: Strategy,
    market_return: f64,
) -> Vec<LoanPortfolioSnapshot> {
    let policy = PayoffPolicy::new(inputs, strategy, market_return);
    simulate(&policy, inputs.remaining_tenure)
}

/// After-tax `invest - prepay` at the horizon for a given market return.
pub fn final_net_worth_difference(inputs: &MortgagePayoffInputs, market_return: f64) -> f64 {
    if is_degenerate(inputs) {
        return 0.0;
    }
    let prepay = run_scenario(inputs, Strategy::Prepay, market_return);
    let invest = run_scenario(inputs, Strategy::Invest, market_return);
    match (prepay.last(), invest.last()) {
        (Some(a), Some(b)) => {
            after_tax_net_worth(b, inputs.capital_gains_tax)
                - after_tax_net_worth(a, inputs.capital_gains_tax)
        }
        _ => 0.0,
    }
}

/// Bisects the market return over 0–50% for the rate at which both
/// strategies end level.
pub fn breakeven_market_return(inputs: &MortgagePayoffInputs) -> BreakevenSearch {
    bisect_root(BisectionConfig::default(), |rate| {
        final_net_worth_difference(inputs, rate)
    })
}

fn summarize(
    trace: &[LoanPortfolioSnapshot],
    horizon: u32,
    capital_gains_rate: f64,
) -> PayoffScenarioSummary {
    let Some(last) = trace.last() else {
        return empty_summary();
    };
    let payoff_month = last.payoff_month;
    let cgt = capital_gains_tax(last, capital_gains_rate);
    PayoffScenarioSummary {
        total_interest_paid: last.interest_paid,
        interest_saved: 0.0,
        payoff_month,
        new_tenure_months: payoff_month.unwrap_or(horizon),
        final_loan_balance: last.loan_balance,
        final_portfolio: last.portfolio,
        total_invested: last.invested,
        tax_savings: last.tax_savings,
        capital_gains_tax_paid: cgt,
        final_net_worth: last.net_worth,
        final_net_worth_after_tax: last.net_worth - cgt,
    }
}

fn empty_summary() -> PayoffScenarioSummary {
    PayoffScenarioSummary {
        total_interest_paid: 0.0,
        interest_saved: 0.0,
        payoff_month: None,
        new_tenure_months: 0,
        final_loan_balance: 0.0,
        final_portfolio: 0.0,
        total_invested: 0.0,
        tax_savings: 0.0,
        capital_gains_tax_paid: 0.0,
        final_net_worth: 0.0,
        final_net_worth_after_tax: 0.0,
    }
}

fn verdict_from(winner: Winner) -> PayoffVerdict {
    match winner {
        Winner::ScenarioA => PayoffVerdict::Prepay,
        Winner::ScenarioB => PayoffVerdict::Invest,
        Winner::Neutral => PayoffVerdict::Neutral,
    }
}

fn empty_result() -> MortgagePayoffResult {
    MortgagePayoffResult {
        prepay: empty_summary(),
        invest: empty_summary(),
        net_worth_difference: 0.0,
        percentage_difference: 0.0,
        winner: PayoffVerdict::Neutral,
        break_even_month: None,
        breakeven_roi: BreakevenSearch {
            rate: 0.0,
            residual: 0.0,
            converged: false,
            search_min: 0.0,
            search_max: 0.0,
            iterations: Vec::new(),
            message: "Not enough data to search for a breakeven return.".to_string(),
        },
        recommendation: "Enter a loan balance and remaining tenure to compare prepaying \
                         with investing."
            .to_string(),
        monthly_data: Vec::new(),
    }
}

pub fn run_mortgage_payoff(inputs: &MortgagePayoffInputs) -> MortgagePayoffResult {
    if is_degenerate(inputs) {
        return empty_result();
    }

    let horizon = inputs.remaining_tenure as u32;
    let prepay_trace = run_scenario(inputs, Strategy::Prepay, inputs.expected_market_return);
    let invest_trace = run_scenario(inputs, Strategy::Invest, inputs.expected_market_return);
    let comparison = compare_traces(&prepay_trace, &invest_trace);

    let mut prepay = summarize(&prepay_trace, horizon, inputs.capital_gains_tax);
    let invest = summarize(&invest_trace, horizon, inputs.capital_gains_tax);
    prepay.interest_saved = invest.total_interest_paid - prepay.total_interest_paid;

    let net_worth_difference = invest.final_net_worth_after_tax - prepay.final_net_worth_after_tax;
    let winner = classify_winner(net_worth_difference, inputs.current_balance);
    let base = prepay
        .final_net_worth_after_tax
        .abs()
        .max(invest.final_net_worth_after_tax.abs());
    let pct = percentage_difference(net_worth_difference, base);
    let breakeven_roi = breakeven_market_return(inputs);

    let mut recommendation =
        recommendation_text(winner, pct, "prepaying", "investing", net_worth_difference);
    if breakeven_roi.converged {
        recommendation.push_str(&format!(
            " Investing pays off when the market returns more than {:.2}% a year.",
            breakeven_roi.rate
        ));
    }

    let monthly_data = comparison
        .series
        .iter()
        .zip(prepay_trace.iter().zip(&invest_trace))
        .map(|(point, (a, b))| PayoffMonth {
            month: point.period,
            prepay_loan_balance: a.loan_balance,
            prepay_portfolio: a.portfolio,
            prepay_net_worth: a.net_worth,
            invest_loan_balance: b.loan_balance,
            invest_portfolio: b.portfolio,
            invest_net_worth: b.net_worth,
            net_worth_difference: point.difference,
        })
        .collect();

    debug!(
        "mortgage payoff: horizon={horizon} prepay_payoff={:?} diff={net_worth_difference:.2} \
         winner={winner:?} breakeven={:.4}",
        prepay.payoff_month, breakeven_roi.rate
    );

    MortgagePayoffResult {
        prepay,
        invest,
        net_worth_difference,
        percentage_difference: pct,
        winner: verdict_from(winner),
        break_even_month: comparison.break_even_period,
        breakeven_roi,
        recommendation,
        monthly_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_inputs() -> MortgagePayoffInputs {
        MortgagePayoffInputs {
            current_balance: 300_000.0,
            interest_rate: 6.5,
            remaining_tenure: 300,
            monthly_emi: 2_028.0,
            lump_sum_amount: 20_000.0,
            extra_monthly_payment: 500.0,
            expected_market_return: 10.0,
            capital_gains_tax: 15.0,
            mortgage_tax_deduction: 0.0,
        }
    }

    #[test]
    fn concrete_scenario_accelerates_payoff() {
        let result = run_mortgage_payoff(&sample_inputs());
        assert!(result.prepay.new_tenure_months < 300);
        assert!(result.prepay.payoff_month.is_some());
        assert!(result.prepay.interest_saved > 0.0);
        assert_eq!(result.monthly_data.len(), 300);
        assert!(matches!(
            result.winner,
            PayoffVerdict::Prepay | PayoffVerdict::Invest | PayoffVerdict::Neutral
        ));
        // A 10% market against a 6.5% loan favours investing.
        assert_eq!(result.winner, PayoffVerdict::Invest);
    }

    #[test]
    fn result_scalars_match_trace() {
        let inputs = sample_inputs();
        let result = run_mortgage_payoff(&inputs);
        let prepay = run_scenario(&inputs, Strategy::Prepay, inputs.expected_market_return);
        let invest = run_scenario(&inputs, Strategy::Invest, inputs.expected_market_return);
        let last_a = prepay.last().expect("trace");
        let last_b = invest.last().expect("trace");

        assert_eq!(result.prepay.final_net_worth, last_a.net_worth);
        assert_eq!(result.invest.final_net_worth, last_b.net_worth);
        assert_eq!(result.prepay.final_portfolio, last_a.portfolio);
        assert_eq!(result.invest.total_interest_paid, last_b.interest_paid);
        let last_row = result.monthly_data.last().expect("rows");
        assert_eq!(last_row.prepay_net_worth, last_a.net_worth);
        assert_eq!(last_row.invest_net_worth, last_b.net_worth);
    }

    #[test]
    fn both_strategies_spend_the_same_cash() {
        let mut inputs = sample_inputs();
        inputs.expected_market_return = 0.0;
        inputs.capital_gains_tax = 0.0;
        let prepay = run_scenario(&inputs, Strategy::Prepay, 0.0);
        let invest = run_scenario(&inputs, Strategy::Invest, 0.0);
        // With no growth, net worth differs only by the interest each paid.
        for (a, b) in prepay.iter().zip(&invest) {
            let spent_a = a.invested + (inputs.current_balance - a.loan_balance) + a.interest_paid;
            let spent_b = b.invested + (inputs.current_balance - b.loan_balance) + b.interest_paid;
            assert!((spent_a - spent_b).abs() < 1e-6, "month {}", a.month);
        }
    }

    #[test]
    fn payoff_month_truncates_payment_and_starts_investing() {
        let inputs = MortgagePayoffInputs {
            current_balance: 1_000.0,
            interest_rate: 0.0,
            remaining_tenure: 6,
            monthly_emi: 300.0,
            lump_sum_amount: 0.0,
            extra_monthly_payment: 0.0,
            expected_market_return: 0.0,
            capital_gains_tax: 0.0,
            mortgage_tax_deduction: 0.0,
        };
        let trace = run_scenario(&inputs, Strategy::Prepay, 0.0);
        // 300, 300, 300, then 100 clears the loan and 200 is invested.
        assert!(!trace[2].paid_off);
        assert!(trace[3].paid_off);
        assert_eq!(trace[3].loan_balance, 0.0);
        assert_approx(trace[3].portfolio, 200.0);
        assert_approx(trace[4].portfolio, 500.0);
        assert_approx(trace[5].portfolio, 800.0);

        let result = run_mortgage_payoff(&inputs);
        assert_eq!(result.prepay.payoff_month, Some(4));
        assert_eq!(result.prepay.new_tenure_months, 4);
    }

    #[test]
    fn lump_sum_larger_than_balance_pays_off_immediately() {
        let mut inputs = sample_inputs();
        inputs.current_balance = 10_000.0;
        inputs.remaining_tenure = 12;
        inputs.lump_sum_amount = 15_000.0;
        let trace = run_scenario(&inputs, Strategy::Prepay, inputs.expected_market_return);
        assert!(trace.iter().all(|s| s.paid_off && s.loan_balance == 0.0));
        assert!(trace.iter().all(|s| s.interest_paid == 0.0));

        let result = run_mortgage_payoff(&inputs);
        assert_eq!(result.prepay.payoff_month, Some(0));
        assert_eq!(result.prepay.total_interest_paid, 0.0);
    }

    #[test]
    fn missing_emi_falls_back_to_amortizing_payment() {
        let mut inputs = sample_inputs();
        inputs.monthly_emi = 0.0;
        inputs.lump_sum_amount = 0.0;
        inputs.extra_monthly_payment = 0.0;
        let trace = run_scenario(&inputs, Strategy::Invest, 0.0);
        let last = trace.last().expect("trace");
        assert!(last.paid_off);
        assert!(last.loan_balance <= PAYOFF_EPSILON);
    }

    #[test]
    fn mortgage_tax_deduction_is_invested() {
        let mut inputs = sample_inputs();
        inputs.mortgage_tax_deduction = 24.0;
        let trace = run_scenario(&inputs, Strategy::Invest, 0.0);
        let first = trace[0];
        assert_approx(first.tax_savings, first.interest_paid * 0.24);
        assert_approx(first.invested, 20_000.0 + 500.0 + first.tax_savings);
    }

    #[test]
    fn capital_gains_tax_applies_only_at_horizon() {
        let inputs = sample_inputs();
        let result = run_mortgage_payoff(&inputs);
        let last = result.monthly_data.last().expect("rows");
        // Monthly rows are pre-tax.
        assert_eq!(last.invest_net_worth, result.invest.final_net_worth);
        assert!(result.invest.capital_gains_tax_paid > 0.0);
        assert_approx(
            result.invest.final_net_worth_after_tax,
            result.invest.final_net_worth - result.invest.capital_gains_tax_paid,
        );
    }

    #[test]
    fn low_market_return_favours_prepaying() {
        let mut inputs = sample_inputs();
        inputs.expected_market_return = 1.0;
        let result = run_mortgage_payoff(&inputs);
        assert_eq!(result.winner, PayoffVerdict::Prepay);
        assert!(result.recommendation.starts_with("Prepaying"));
    }

    #[test]
    fn breakeven_rate_levels_the_strategies() {
        let inputs = sample_inputs();
        let result = run_mortgage_payoff(&inputs);
        let search = &result.breakeven_roi;
        assert!(search.converged, "{}", search.message);
        assert!(search.rate > 0.0 && search.rate < 50.0);
        assert!(search.iterations.len() <= 50);
        assert!(final_net_worth_difference(&inputs, search.rate).abs() < 100.0);
    }

    #[test]
    fn degenerate_inputs_give_neutral_empty_result() {
        for (balance, tenure) in [(0.0, 300), (-5.0, 300), (300_000.0, 0), (300_000.0, -12)] {
            let mut inputs = sample_inputs();
            inputs.current_balance = balance;
            inputs.remaining_tenure = tenure;
            let result = run_mortgage_payoff(&inputs);
            assert_eq!(result.winner, PayoffVerdict::Neutral);
            assert!(result.monthly_data.is_empty());
            assert_eq!(result.break_even_month, None);
            assert_eq!(result.net_worth_difference, 0.0);
            assert!(!result.recommendation.is_empty());
        }
    }

    #[test]
    fn reruns_are_identical() {
        let inputs = sample_inputs();
        let a = serde_json::to_string(&run_mortgage_payoff(&inputs)).expect("serialize");
        let b = serde_json::to_string(&run_mortgage_payoff(&inputs)).expect("serialize");
        assert_eq!(a, b);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(24))]

        #[test]
        fn prop_final_net_worth_matches_last_snapshot(
            balance in 10_000u32..800_000,
            rate_bp in 0u32..1_200,
            tenure in 12i32..360,
            lump in 0u32..50_000,
            extra in 0u32..2_000,
            market_bp in 0u32..1_500
        ) {
            let inputs = MortgagePayoffInputs {
                current_balance: balance as f64,
                interest_rate: rate_bp as f64 / 100.0,
                remaining_tenure: tenure,
                monthly_emi: 0.0,
                lump_sum_amount: lump as f64,
                extra_monthly_payment: extra as f64,
                expected_market_return: market_bp as f64 / 100.0,
                capital_gains_tax: 15.0,
                mortgage_tax_deduction: 0.0,
            };
            let result = run_mortgage_payoff(&inputs);
            prop_assert_eq!(result.monthly_data.len(), tenure as usize);
            let last = result.monthly_data.last().expect("rows");
            prop_assert_eq!(result.prepay.final_net_worth, last.prepay_net_worth);
            prop_assert_eq!(result.invest.final_net_worth, last.invest_net_worth);
            prop_assert!(result.prepay.new_tenure_months <= tenure as u32);
            prop_assert!(
                result.prepay.total_interest_paid <= result.invest.total_interest_paid + 1e-6
            );
        }
    }
}

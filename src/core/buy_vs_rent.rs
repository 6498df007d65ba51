use log::debug;

use super::amortization::{monthly_payment, monthly_rate};
use super::compare::{
    NetWorthPoint, Winner, classify_winner, compare_traces, percentage_difference,
};
use super::engine::{Policy, monthly_growth_factor, simulate, year_end_rows};
use super::milestones::recommendation_text;
use super::types::{BuyRentMonth, BuyRentYear, BuyVsRentInputs, BuyVsRentResult, HousingVerdict};

/// Fixed quantities derived once per run.
#[derive(Debug, Clone, Copy)]
struct Purchase {
    down_payment: f64,
    closing_costs: f64,
    loan_amount: f64,
    payment: f64,
    term_months: u32,
    appreciation_factor: f64,
    investment_factor: f64,
}

impl Purchase {
    fn from_inputs(inputs: &BuyVsRentInputs) -> Self {
        let price = inputs.home_price.max(0.0);
        let down_payment = price * inputs.down_payment_pct.clamp(0.0, 100.0) / 100.0;
        let loan_amount = price - down_payment;
        let term = inputs.loan_term_years.max(0).saturating_mul(12);
        Self {
            down_payment,
            closing_costs: price * inputs.closing_cost_pct.max(0.0) / 100.0,
            loan_amount,
            payment: monthly_payment(loan_amount, inputs.mortgage_rate, term),
            term_months: term as u32,
            appreciation_factor: monthly_growth_factor(inputs.home_appreciation),
            investment_factor: monthly_growth_factor(inputs.investment_return),
        }
    }

    fn upfront(&self) -> f64 {
        self.down_payment + self.closing_costs
    }

    fn home_value_at(&self, inputs: &BuyVsRentInputs, month: u32) -> f64 {
        inputs.home_price.max(0.0) * self.appreciation_factor.powi(month as i32)
    }

    /// Owner's cash outlay for `month`, on the home value reached that month.
    fn buy_cost(&self, inputs: &BuyVsRentInputs, month: u32) -> f64 {
        let value = self.home_value_at(inputs, month);
        let mortgage = if month <= self.term_months {
            self.payment
        } else {
            0.0
        };
        mortgage
            + value * inputs.property_tax_rate.max(0.0) / 100.0 / 12.0
            + inputs.home_insurance_annual.max(0.0) / 12.0
            + value * inputs.maintenance_pct.max(0.0) / 100.0 / 12.0
            + inputs.hoa_monthly.max(0.0)
    }

    /// Rent steps up once a year, at the start of each lease year.
    fn rent_cost(&self, inputs: &BuyVsRentInputs, month: u32) -> f64 {
        let lease_year = month.saturating_sub(1) / 12;
        let escalation = (1.0 + inputs.rent_increase / 100.0).max(0.0);
        inputs.monthly_rent.max(0.0) * escalation.powi(lease_year as i32)
            + inputs.renters_insurance_monthly.max(0.0)
    }
}

#[derive(Debug)]
struct BuyState {
    home_value: f64,
    loan_balance: f64,
    portfolio: f64,
    month_cost: f64,
    cumulative_cost: f64,
}

#[derive(Debug, Clone, Copy)]
struct BuySnapshot {
    month: u32,
    home_value: f64,
    loan_balance: f64,
    portfolio: f64,
    month_cost: f64,
    cumulative_cost: f64,
    net_worth: f64,
}

#[derive(Debug)]
struct RentState {
    portfolio: f64,
    month_cost: f64,
    cumulative_cost: f64,
}

#[derive(Debug, Clone, Copy)]
struct RentSnapshot {
    month: u32,
    portfolio: f64,
    month_cost: f64,
    cumulative_cost: f64,
}

struct BuyPolicy<'a> {
    inputs: &'a BuyVsRentInputs,
    purchase: Purchase,
}

struct RentPolicy<'a> {
    inputs: &'a BuyVsRentInputs,
    purchase: Purchase,
}

impl Policy for BuyPolicy<'_> {
    type State = BuyState;
    type Snapshot = BuySnapshot;

    fn initial_state(&self) -> BuyState {
        BuyState {
            home_value: self.inputs.home_price.max(0.0),
            loan_balance: self.purchase.loan_amount,
            portfolio: 0.0,
            month_cost: 0.0,
            cumulative_cost: 0.0,
        }
    }

    fn accrue(&self, state: &mut BuyState, month: u32) {
        state.home_value = self.purchase.home_value_at(self.inputs, month);
        state.portfolio *= self.purchase.investment_factor;
        state.loan_balance += state.loan_balance * monthly_rate(self.inputs.mortgage_rate);
    }

    fn apply_cash_flows(&self, state: &mut BuyState, month: u32) {
        if month <= self.purchase.term_months && state.loan_balance > 0.0 {
            if month == self.purchase.term_months
                || state.loan_balance - self.purchase.payment <= 0.01
            {
                state.loan_balance = 0.0;
            } else {
                state.loan_balance -= self.purchase.payment;
            }
        }

        let buy = self.purchase.buy_cost(self.inputs, month);
        let rent = self.purchase.rent_cost(self.inputs, month);
        state.portfolio += (rent - buy).max(0.0);
        state.month_cost = buy;
        state.cumulative_cost += buy;
    }

    fn snapshot(&self, state: &BuyState, month: u32) -> BuySnapshot {
        let selling = self.inputs.selling_cost_pct.clamp(0.0, 100.0) / 100.0;
        let sale_value = state.home_value * (1.0 - selling);
        BuySnapshot {
            month,
            home_value: state.home_value,
            loan_balance: state.loan_balance,
            portfolio: state.portfolio,
            month_cost: state.month_cost,
            cumulative_cost: state.cumulative_cost,
            net_worth: sale_value - state.loan_balance + state.portfolio,
        }
    }
}

impl Policy for RentPolicy<'_> {
    type State = RentState;
    type Snapshot = RentSnapshot;

    fn initial_state(&self) -> RentState {
        RentState {
            portfolio: self.purchase.upfront(),
            month_cost: 0.0,
            cumulative_cost: 0.0,
        }
    }

    fn accrue(&self, state: &mut RentState, _month: u32) {
        state.portfolio *= self.purchase.investment_factor;
    }

    fn apply_cash_flows(&self, state: &mut RentState, month: u32) {
        let buy = self.purchase.buy_cost(self.inputs, month);
        let rent = self.purchase.rent_cost(self.inputs, month);
        state.portfolio += (buy - rent).max(0.0);
        state.month_cost = rent;
        state.cumulative_cost += rent;
    }

    fn snapshot(&self, state: &RentState, month: u32) -> RentSnapshot {
        RentSnapshot {
            month,
            portfolio: state.portfolio,
            month_cost: state.month_cost,
            cumulative_cost: state.cumulative_cost,
        }
    }
}

impl NetWorthPoint for BuySnapshot {
    fn period(&self) -> u32 {
        self.month
    }
    fn net_worth(&self) -> f64 {
        self.net_worth
    }
}

impl NetWorthPoint for RentSnapshot {
    fn period(&self) -> u32 {
        self.month
    }
    fn net_worth(&self) -> f64 {
        self.portfolio
    }
}

fn verdict_from(winner: Winner) -> HousingVerdict {
    match winner {
        Winner::ScenarioA => HousingVerdict::Rent,
        Winner::ScenarioB => HousingVerdict::Buy,
        Winner::Neutral => HousingVerdict::Neutral,
    }
}

fn empty_result(purchase: &Purchase) -> BuyVsRentResult {
    BuyVsRentResult {
        down_payment: purchase.down_payment,
        closing_costs: purchase.closing_costs,
        loan_amount: purchase.loan_amount,
        monthly_mortgage_payment: purchase.payment,
        total_buy_cost: 0.0,
        total_rent_cost: 0.0,
        final_home_value: 0.0,
        final_home_equity: 0.0,
        final_buy_net_worth: 0.0,
        final_rent_net_worth: 0.0,
        net_worth_difference: 0.0,
        percentage_difference: 0.0,
        break_even_month: None,
        break_even_year: None,
        verdict: HousingVerdict::Neutral,
        explanation: "Enter a home price and a comparison period to compare buying with renting."
            .to_string(),
        monthly_data: Vec::new(),
        yearly_data: Vec::new(),
    }
}

pub fn run_buy_vs_rent(inputs: &BuyVsRentInputs) -> BuyVsRentResult {
    let purchase = Purchase::from_inputs(inputs);
    if inputs.home_price <= 0.0 || inputs.years <= 0 {
        return empty_result(&purchase);
    }

    let horizon = inputs.years.saturating_mul(12);
    let buy_trace = simulate(&BuyPolicy { inputs, purchase }, horizon);
    let rent_trace = simulate(&RentPolicy { inputs, purchase }, horizon);
    let comparison = compare_traces(&rent_trace, &buy_trace);

    let monthly_data: Vec<BuyRentMonth> = buy_trace
        .iter()
        .zip(&rent_trace)
        .zip(&comparison.series)
        .map(|((buy, rent), point)| BuyRentMonth {
            month: buy.month,
            home_value: buy.home_value,
            loan_balance: buy.loan_balance,
            home_equity: buy.home_value - buy.loan_balance,
            monthly_buy_cost: buy.month_cost,
            monthly_rent_cost: rent.month_cost,
            cumulative_buy_cost: buy.cumulative_cost,
            cumulative_rent_cost: rent.cumulative_cost,
            buyer_portfolio: buy.portfolio,
            renter_portfolio: rent.portfolio,
            buy_net_worth: buy.net_worth,
            rent_net_worth: rent.portfolio,
            net_worth_difference: point.difference,
        })
        .collect();

    let yearly_data = year_end_rows(&monthly_data)
        .into_iter()
        .map(|row| BuyRentYear {
            year: row.month / 12,
            home_value: row.home_value,
            home_equity: row.home_equity,
            cumulative_buy_cost: row.cumulative_buy_cost,
            cumulative_rent_cost: row.cumulative_rent_cost,
            buy_net_worth: row.buy_net_worth,
            rent_net_worth: row.rent_net_worth,
        })
        .collect();

    let Some(last) = monthly_data.last().copied() else {
        return empty_result(&purchase);
    };
    let net_worth_difference = comparison.final_difference();
    let winner = classify_winner(net_worth_difference, inputs.home_price);
    let pct = percentage_difference(
        net_worth_difference,
        last.buy_net_worth.abs().max(last.rent_net_worth.abs()),
    );

    let mut explanation =
        recommendation_text(winner, pct, "renting", "buying", net_worth_difference);
    match comparison.break_even_period {
        Some(month) => explanation.push_str(&format!(
            " The two paths cross after {month} months ({:.1} years).",
            month as f64 / 12.0
        )),
        None => explanation.push_str(" The lead never changes hands within the period."),
    }

    debug!(
        "buy vs rent: months={horizon} diff={net_worth_difference:.2} winner={winner:?} \
         break_even={:?}",
        comparison.break_even_period
    );

    BuyVsRentResult {
        down_payment: purchase.down_payment,
        closing_costs: purchase.closing_costs,
        loan_amount: purchase.loan_amount,
        monthly_mortgage_payment: purchase.payment,
        total_buy_cost: purchase.upfront() + last.cumulative_buy_cost,
        total_rent_cost: last.cumulative_rent_cost,
        final_home_value: last.home_value,
        final_home_equity: last.home_equity,
        final_buy_net_worth: last.buy_net_worth,
        final_rent_net_worth: last.rent_net_worth,
        net_worth_difference,
        percentage_difference: pct,
        break_even_month: comparison.break_even_period,
        break_even_year: comparison.break_even_period.map(|m| m as f64 / 12.0),
        verdict: verdict_from(winner),
        explanation,
        monthly_data,
        yearly_data,
    }
}

use serde::Serialize;

use super::amortization::AmortizationRow;
use super::milestones::Milestone;

#[derive(Debug, Clone)]
pub struct MortgagePayoffInputs {
    pub current_balance: f64,
    pub interest_rate: f64,
    pub remaining_tenure: i32,
    pub monthly_emi: f64,
    pub lump_sum_amount: f64,
    pub extra_monthly_payment: f64,
    pub expected_market_return: f64,
    pub capital_gains_tax: f64,
    pub mortgage_tax_deduction: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayoffVerdict {
    Prepay,
    Invest,
    Neutral,
}

/// State of one payoff scenario at the end of a month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanPortfolioSnapshot {
    pub month: u32,
    pub loan_balance: f64,
    pub paid_off: bool,
    /// Month the loan was cleared; 0 when the lump sum cleared it up front.
    pub payoff_month: Option<u32>,
    pub portfolio: f64,
    pub invested: f64,
    pub interest_paid: f64,
    pub tax_savings: f64,
    pub net_worth: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffScenarioSummary {
    pub total_interest_paid: f64,
    pub interest_saved: f64,
    pub payoff_month: Option<u32>,
    pub new_tenure_months: u32,
    pub final_loan_balance: f64,
    pub final_portfolio: f64,
    pub total_invested: f64,
    pub tax_savings: f64,
    pub capital_gains_tax_paid: f64,
    pub final_net_worth: f64,
    pub final_net_worth_after_tax: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffMonth {
    pub month: u32,
    pub prepay_loan_balance: f64,
    pub prepay_portfolio: f64,
    pub prepay_net_worth: f64,
    pub invest_loan_balance: f64,
    pub invest_portfolio: f64,
    pub invest_net_worth: f64,
    pub net_worth_difference: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakevenIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_rate: f64,
    pub net_worth_difference: f64,
}

/// Market return at which prepaying and investing end level.
///
/// The search assumes the final difference grows with the market return.
/// When that fails, or no sign change exists in the bracket, `converged` is
/// false and `rate` is the closest midpoint found.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakevenSearch {
    pub rate: f64,
    pub residual: f64,
    pub converged: bool,
    pub search_min: f64,
    pub search_max: f64,
    pub iterations: Vec<BreakevenIteration>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgagePayoffResult {
    pub prepay: PayoffScenarioSummary,
    pub invest: PayoffScenarioSummary,
    pub net_worth_difference: f64,
    pub percentage_difference: f64,
    pub winner: PayoffVerdict,
    pub break_even_month: Option<u32>,
    pub breakeven_roi: BreakevenSearch,
    pub recommendation: String,
    pub monthly_data: Vec<PayoffMonth>,
}

#[derive(Debug, Clone)]
pub struct BuyVsRentInputs {
    pub home_price: f64,
    pub down_payment_pct: f64,
    pub mortgage_rate: f64,
    pub loan_term_years: i32,
    pub closing_cost_pct: f64,
    pub property_tax_rate: f64,
    pub home_insurance_annual: f64,
    pub maintenance_pct: f64,
    pub hoa_monthly: f64,
    pub home_appreciation: f64,
    pub selling_cost_pct: f64,
    pub monthly_rent: f64,
    pub rent_increase: f64,
    pub renters_insurance_monthly: f64,
    pub investment_return: f64,
    pub years: i32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HousingVerdict {
    Buy,
    Rent,
    Neutral,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyRentMonth {
    pub month: u32,
    pub home_value: f64,
    pub loan_balance: f64,
    pub home_equity: f64,
    pub monthly_buy_cost: f64,
    pub monthly_rent_cost: f64,
    pub cumulative_buy_cost: f64,
    pub cumulative_rent_cost: f64,
    pub buyer_portfolio: f64,
    pub renter_portfolio: f64,
    pub buy_net_worth: f64,
    pub rent_net_worth: f64,
    pub net_worth_difference: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyRentYear {
    pub year: u32,
    pub home_value: f64,
    pub home_equity: f64,
    pub cumulative_buy_cost: f64,
    pub cumulative_rent_cost: f64,
    pub buy_net_worth: f64,
    pub rent_net_worth: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyVsRentResult {
    pub down_payment: f64,
    pub closing_costs: f64,
    pub loan_amount: f64,
    pub monthly_mortgage_payment: f64,
    pub total_buy_cost: f64,
    pub total_rent_cost: f64,
    pub final_home_value: f64,
    pub final_home_equity: f64,
    pub final_buy_net_worth: f64,
    pub final_rent_net_worth: f64,
    pub net_worth_difference: f64,
    pub percentage_difference: f64,
    pub break_even_month: Option<u32>,
    pub break_even_year: Option<f64>,
    pub verdict: HousingVerdict,
    pub explanation: String,
    pub monthly_data: Vec<BuyRentMonth>,
    pub yearly_data: Vec<BuyRentYear>,
}

#[derive(Debug, Clone)]
pub struct FireInputs {
    pub current_age: u32,
    pub target_retirement_age: u32,
    pub life_expectancy: u32,
    pub current_savings: f64,
    pub monthly_contribution: f64,
    pub contribution_increase: f64,
    pub annual_expenses: f64,
    pub expected_return: f64,
    pub inflation_rate: f64,
    pub withdrawal_rate: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FirePhase {
    Accumulating,
    Drawdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FireMonth {
    pub month: u32,
    pub age: f64,
    pub phase: FirePhase,
    pub portfolio: f64,
    pub contribution: f64,
    pub withdrawal: f64,
    pub growth: f64,
    pub fire_target: f64,
    pub cumulative_contributions: f64,
    pub cumulative_growth: f64,
    pub cumulative_withdrawals: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FireResult {
    /// Infinite when the withdrawal rate is not positive.
    pub fire_number: f64,
    pub coast_fire_number: f64,
    pub months_to_fire: Option<u32>,
    pub years_to_fire: Option<f64>,
    pub fire_age: Option<f64>,
    pub portfolio_at_fire: Option<f64>,
    pub reaches_fire_by_target_age: bool,
    pub final_portfolio: f64,
    pub total_contributions: f64,
    pub total_growth: f64,
    pub total_withdrawals: f64,
    pub depletion_age: Option<f64>,
    pub milestones: Vec<Milestone>,
    pub summary: String,
    pub monthly_data: Vec<FireMonth>,
    pub yearly_data: Vec<FireMonth>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CompoundingFrequency {
    Annually,
    SemiAnnually,
    Quarterly,
    Monthly,
    Daily,
}

impl CompoundingFrequency {
    pub fn periods_per_year(self) -> f64 {
        match self {
            CompoundingFrequency::Annually => 1.0,
            CompoundingFrequency::SemiAnnually => 2.0,
            CompoundingFrequency::Quarterly => 4.0,
            CompoundingFrequency::Monthly => 12.0,
            CompoundingFrequency::Daily => 365.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompoundInterestInputs {
    pub principal: f64,
    pub annual_rate: f64,
    pub years: i32,
    pub compounding: CompoundingFrequency,
    pub monthly_contribution: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundYear {
    pub year: u32,
    pub opening_balance: f64,
    pub contributions: f64,
    pub interest: f64,
    pub closing_balance: f64,
    pub cumulative_contributions: f64,
    pub cumulative_interest: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundInterestResult {
    pub final_balance: f64,
    pub total_contributions: f64,
    pub total_interest: f64,
    pub effective_annual_rate: f64,
    pub yearly_data: Vec<CompoundYear>,
}

#[derive(Debug, Clone)]
pub struct EmiInputs {
    pub loan_amount: f64,
    pub annual_rate: f64,
    pub tenure_months: i32,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmiYear {
    pub year: u32,
    pub principal_paid: f64,
    pub interest_paid: f64,
    pub closing_balance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmiResult {
    pub emi: f64,
    pub total_payment: f64,
    pub total_interest: f64,
    pub interest_share: f64,
    pub schedule: Vec<AmortizationRow>,
    pub yearly_data: Vec<EmiYear>,
}

#[derive(Debug, Clone)]
pub struct SipInputs {
    pub monthly_investment: f64,
    pub expected_return: f64,
    pub years: i32,
    pub annual_step_up: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SipYear {
    pub year: u32,
    pub monthly_installment: f64,
    pub invested_amount: f64,
    pub estimated_returns: f64,
    pub total_value: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SipResult {
    pub invested_amount: f64,
    pub estimated_returns: f64,
    pub total_value: f64,
    pub yearly_data: Vec<SipYear>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaxRegime {
    New,
    Old,
}

#[derive(Debug, Clone)]
pub struct IncomeTaxInputs {
    pub annual_income: f64,
    /// Chapter VI-A style deductions; only the old regime honours them.
    pub deductions: f64,
    pub preferred_regime: TaxRegime,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlabTax {
    pub lower: f64,
    pub upper: Option<f64>,
    pub rate: f64,
    pub taxable_amount: f64,
    pub tax: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegimeTax {
    pub regime: TaxRegime,
    pub gross_income: f64,
    pub standard_deduction: f64,
    pub deductions: f64,
    pub taxable_income: f64,
    pub slabs: Vec<SlabTax>,
    pub tax_before_rebate: f64,
    pub rebate: f64,
    pub cess: f64,
    pub total_tax: f64,
    pub effective_rate: f64,
    pub monthly_take_home: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeTaxResult {
    pub preferred_regime: TaxRegime,
    pub preferred_tax: f64,
    pub new_regime: RegimeTax,
    pub old_regime: RegimeTax,
    pub recommended_regime: TaxRegime,
    pub savings: f64,
    pub explanation: String,
}

mod amortization;
mod buy_vs_rent;
mod compare;
mod compound;
mod emi;
mod engine;
mod fire;
mod income_tax;
mod milestones;
mod mortgage_payoff;
mod sip;
mod solver;
mod types;

pub use amortization::{
    AmortizationRow, amortization_schedule, monthly_payment, monthly_rate, remaining_balance,
};
pub use buy_vs_rent::run_buy_vs_rent;
pub use compare::{
    Comparison, DiffPoint, MATERIALITY_FLOOR, MATERIALITY_RATIO, NetWorthPoint, Winner,
    break_even_period, classify_winner, compare_traces, materiality_threshold,
    percentage_difference,
};
pub use compound::{effective_annual_rate, run_compound_interest};
pub use emi::run_emi;
pub use engine::{Policy, monthly_growth_factor, simulate, year_end_rows};
pub use fire::{coast_fire_number, fire_number, run_fire};
pub use income_tax::{regime_tax, run_income_tax};
pub use milestones::{
    Margin, Milestone, MilestoneTarget, find_milestones, margin_for, recommendation_text,
};
pub use mortgage_payoff::{
    breakeven_market_return, final_net_worth_difference, run_mortgage_payoff,
};
pub use sip::run_sip;
pub use solver::{BisectionConfig, bisect_root};
pub use types::{
    BreakevenIteration, BreakevenSearch, BuyRentMonth, BuyRentYear, BuyVsRentInputs,
    BuyVsRentResult, CompoundInterestInputs, CompoundInterestResult, CompoundYear,
    CompoundingFrequency, EmiInputs, EmiResult, EmiYear, FireInputs, FireMonth, FirePhase,
    FireResult, HousingVerdict, IncomeTaxInputs, IncomeTaxResult, LoanPortfolioSnapshot,
    MortgagePayoffInputs, MortgagePayoffResult, PayoffMonth, PayoffScenarioSummary,
    PayoffVerdict, RegimeTax, SipInputs, SipResult, SipYear, SlabTax, TaxRegime,
};

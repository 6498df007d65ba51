use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::ValueEnum;
use log::{debug, info};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::{
    BuyVsRentInputs, CompoundInterestInputs, CompoundingFrequency, EmiInputs, FireInputs,
    IncomeTaxInputs, MortgagePayoffInputs, SipInputs, TaxRegime, run_buy_vs_rent,
    run_compound_interest, run_emi, run_fire, run_income_tax, run_mortgage_payoff, run_sip,
};

/// Longest projection the API will run, in months.
const MAX_MONTHS: i32 = 1_200;
const MAX_YEARS: i32 = MAX_MONTHS / 12;
const MAX_AGE: u32 = 150;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid API payload: {0}")]
    InvalidPayload(String),
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("{field} {message}")]
    InvalidField {
        field: &'static str,
        message: &'static str,
    },
    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Calculator {
    MortgagePayoff,
    BuyVsRent,
    Fire,
    CompoundInterest,
    Emi,
    Sip,
    IncomeTax,
}

impl Calculator {
    pub fn path(self) -> &'static str {
        match self {
            Calculator::MortgagePayoff => "/api/mortgage-payoff",
            Calculator::BuyVsRent => "/api/buy-vs-rent",
            Calculator::Fire => "/api/fire",
            Calculator::CompoundInterest => "/api/compound-interest",
            Calculator::Emi => "/api/emi",
            Calculator::Sip => "/api/sip",
            Calculator::IncomeTax => "/api/income-tax",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiCompounding {
    #[serde(alias = "yearly")]
    Annually,
    #[serde(alias = "semiAnnually", alias = "semi_annually", alias = "half-yearly")]
    SemiAnnually,
    Quarterly,
    Monthly,
    Daily,
}

impl From<ApiCompounding> for CompoundingFrequency {
    fn from(value: ApiCompounding) -> Self {
        match value {
            ApiCompounding::Annually => CompoundingFrequency::Annually,
            ApiCompounding::SemiAnnually => CompoundingFrequency::SemiAnnually,
            ApiCompounding::Quarterly => CompoundingFrequency::Quarterly,
            ApiCompounding::Monthly => CompoundingFrequency::Monthly,
            ApiCompounding::Daily => CompoundingFrequency::Daily,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiTaxRegime {
    #[serde(alias = "NEW", alias = "newRegime")]
    New,
    #[serde(alias = "OLD", alias = "oldRegime")]
    Old,
}

impl From<ApiTaxRegime> for TaxRegime {
    fn from(value: ApiTaxRegime) -> Self {
        match value {
            ApiTaxRegime::New => TaxRegime::New,
            ApiTaxRegime::Old => TaxRegime::Old,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MortgagePayoffPayload {
    current_balance: Option<f64>,
    interest_rate: Option<f64>,
    remaining_tenure: Option<i32>,
    monthly_emi: Option<f64>,
    lump_sum_amount: Option<f64>,
    extra_monthly_payment: Option<f64>,
    expected_market_return: Option<f64>,
    capital_gains_tax: Option<f64>,
    mortgage_tax_deduction: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct BuyVsRentPayload {
    home_price: Option<f64>,
    down_payment_pct: Option<f64>,
    mortgage_rate: Option<f64>,
    loan_term_years: Option<i32>,
    closing_cost_pct: Option<f64>,
    property_tax_rate: Option<f64>,
    home_insurance_annual: Option<f64>,
    maintenance_pct: Option<f64>,
    hoa_monthly: Option<f64>,
    home_appreciation: Option<f64>,
    selling_cost_pct: Option<f64>,
    monthly_rent: Option<f64>,
    rent_increase: Option<f64>,
    renters_insurance_monthly: Option<f64>,
    investment_return: Option<f64>,
    years: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FirePayload {
    current_age: Option<u32>,
    target_retirement_age: Option<u32>,
    life_expectancy: Option<u32>,
    current_savings: Option<f64>,
    monthly_contribution: Option<f64>,
    contribution_increase: Option<f64>,
    annual_expenses: Option<f64>,
    expected_return: Option<f64>,
    inflation_rate: Option<f64>,
    withdrawal_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CompoundInterestPayload {
    principal: Option<f64>,
    annual_rate: Option<f64>,
    years: Option<i32>,
    compounding: Option<ApiCompounding>,
    monthly_contribution: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EmiPayload {
    loan_amount: Option<f64>,
    annual_rate: Option<f64>,
    tenure_months: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SipPayload {
    monthly_investment: Option<f64>,
    expected_return: Option<f64>,
    years: Option<i32>,
    annual_step_up: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct IncomeTaxPayload {
    annual_income: Option<f64>,
    deductions: Option<f64>,
    #[serde(alias = "regime")]
    preferred_regime: Option<ApiTaxRegime>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// A request body for one calculator: merged over that calculator's
/// defaults, validated, then run.
trait Calculation: DeserializeOwned + Send + 'static {
    const NAME: &'static str;
    type Output: Serialize;

    fn evaluate(self) -> Result<Self::Output, ApiError>;
}

fn set_f64(target: &mut f64, value: Option<f64>, field: &'static str) -> Result<(), ApiError> {
    if let Some(v) = value {
        if !v.is_finite() {
            return Err(ApiError::NonFinite { field });
        }
        *target = v;
    }
    Ok(())
}

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *target = v;
    }
}

fn ensure(condition: bool, field: &'static str, message: &'static str) -> Result<(), ApiError> {
    if condition {
        Ok(())
    } else {
        Err(ApiError::InvalidField { field, message })
    }
}

fn default_mortgage_payoff_inputs() -> MortgagePayoffInputs {
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

fn default_buy_vs_rent_inputs() -> BuyVsRentInputs {
    BuyVsRentInputs {
        home_price: 500_000.0,
        down_payment_pct: 20.0,
        mortgage_rate: 7.0,
        loan_term_years: 30,
        closing_cost_pct: 3.0,
        property_tax_rate: 1.2,
        home_insurance_annual: 1_500.0,
        maintenance_pct: 1.0,
        hoa_monthly: 0.0,
        home_appreciation: 3.0,
        selling_cost_pct: 6.0,
        monthly_rent: 2_500.0,
        rent_increase: 3.0,
        renters_insurance_monthly: 15.0,
        investment_return: 7.0,
        years: 10,
    }
}

fn default_fire_inputs() -> FireInputs {
    FireInputs {
        current_age: 30,
        target_retirement_age: 45,
        life_expectancy: 90,
        current_savings: 50_000.0,
        monthly_contribution: 2_000.0,
        contribution_increase: 3.0,
        annual_expenses: 40_000.0,
        expected_return: 7.0,
        inflation_rate: 3.0,
        withdrawal_rate: 4.0,
    }
}

fn default_compound_interest_inputs() -> CompoundInterestInputs {
    CompoundInterestInputs {
        principal: 10_000.0,
        annual_rate: 8.0,
        years: 10,
        compounding: CompoundingFrequency::Monthly,
        monthly_contribution: 0.0,
    }
}

fn default_emi_inputs() -> EmiInputs {
    EmiInputs {
        loan_amount: 1_000_000.0,
        annual_rate: 8.5,
        tenure_months: 240,
    }
}

fn default_sip_inputs() -> SipInputs {
    SipInputs {
        monthly_investment: 5_000.0,
        expected_return: 12.0,
        years: 10,
        annual_step_up: 0.0,
    }
}

fn default_income_tax_inputs() -> IncomeTaxInputs {
    IncomeTaxInputs {
        annual_income: 1_200_000.0,
        deductions: 150_000.0,
        preferred_regime: TaxRegime::New,
    }
}

impl MortgagePayoffPayload {
    fn into_inputs(self) -> Result<MortgagePayoffInputs, ApiError> {
        let mut inputs = default_mortgage_payoff_inputs();
        set_f64(&mut inputs.current_balance, self.current_balance, "currentBalance")?;
        set_f64(&mut inputs.interest_rate, self.interest_rate, "interestRate")?;
        set(&mut inputs.remaining_tenure, self.remaining_tenure);
        set_f64(&mut inputs.monthly_emi, self.monthly_emi, "monthlyEmi")?;
        set_f64(&mut inputs.lump_sum_amount, self.lump_sum_amount, "lumpSumAmount")?;
        set_f64(
            &mut inputs.extra_monthly_payment,
            self.extra_monthly_payment,
            "extraMonthlyPayment",
        )?;
        set_f64(
            &mut inputs.expected_market_return,
            self.expected_market_return,
            "expectedMarketReturn",
        )?;
        set_f64(&mut inputs.capital_gains_tax, self.capital_gains_tax, "capitalGainsTax")?;
        set_f64(
            &mut inputs.mortgage_tax_deduction,
            self.mortgage_tax_deduction,
            "mortgageTaxDeduction",
        )?;

        ensure(
            inputs.remaining_tenure <= MAX_MONTHS,
            "remainingTenure",
            "must be at most 1200 months",
        )?;
        Ok(inputs)
    }
}

impl BuyVsRentPayload {
    fn into_inputs(self) -> Result<BuyVsRentInputs, ApiError> {
        let mut inputs = default_buy_vs_rent_inputs();
        set_f64(&mut inputs.home_price, self.home_price, "homePrice")?;
        set_f64(&mut inputs.down_payment_pct, self.down_payment_pct, "downPaymentPct")?;
        set_f64(&mut inputs.mortgage_rate, self.mortgage_rate, "mortgageRate")?;
        set(&mut inputs.loan_term_years, self.loan_term_years);
        set_f64(&mut inputs.closing_cost_pct, self.closing_cost_pct, "closingCostPct")?;
        set_f64(&mut inputs.property_tax_rate, self.property_tax_rate, "propertyTaxRate")?;
        set_f64(
            &mut inputs.home_insurance_annual,
            self.home_insurance_annual,
            "homeInsuranceAnnual",
        )?;
        set_f64(&mut inputs.maintenance_pct, self.maintenance_pct, "maintenancePct")?;
        set_f64(&mut inputs.hoa_monthly, self.hoa_monthly, "hoaMonthly")?;
        set_f64(&mut inputs.home_appreciation, self.home_appreciation, "homeAppreciation")?;
        set_f64(&mut inputs.selling_cost_pct, self.selling_cost_pct, "sellingCostPct")?;
        set_f64(&mut inputs.monthly_rent, self.monthly_rent, "monthlyRent")?;
        set_f64(&mut inputs.rent_increase, self.rent_increase, "rentIncrease")?;
        set_f64(
            &mut inputs.renters_insurance_monthly,
            self.renters_insurance_monthly,
            "rentersInsuranceMonthly",
        )?;
        set_f64(&mut inputs.investment_return, self.investment_return, "investmentReturn")?;
        set(&mut inputs.years, self.years);

        ensure(inputs.years <= MAX_YEARS, "years", "must be at most 100")?;
        ensure(
            inputs.loan_term_years <= MAX_YEARS,
            "loanTermYears",
            "must be at most 100",
        )?;
        Ok(inputs)
    }
}

impl FirePayload {
    fn into_inputs(self) -> Result<FireInputs, ApiError> {
        let mut inputs = default_fire_inputs();
        set(&mut inputs.current_age, self.current_age);
        set(&mut inputs.target_retirement_age, self.target_retirement_age);
        set(&mut inputs.life_expectancy, self.life_expectancy);
        set_f64(&mut inputs.current_savings, self.current_savings, "currentSavings")?;
        set_f64(
            &mut inputs.monthly_contribution,
            self.monthly_contribution,
            "monthlyContribution",
        )?;
        set_f64(
            &mut inputs.contribution_increase,
            self.contribution_increase,
            "contributionIncrease",
        )?;
        set_f64(&mut inputs.annual_expenses, self.annual_expenses, "annualExpenses")?;
        set_f64(&mut inputs.expected_return, self.expected_return, "expectedReturn")?;
        set_f64(&mut inputs.inflation_rate, self.inflation_rate, "inflationRate")?;
        set_f64(&mut inputs.withdrawal_rate, self.withdrawal_rate, "withdrawalRate")?;

        ensure(
            inputs.life_expectancy <= MAX_AGE,
            "lifeExpectancy",
            "must be at most 150",
        )?;
        ensure(
            inputs.target_retirement_age <= MAX_AGE,
            "targetRetirementAge",
            "must be at most 150",
        )?;
        Ok(inputs)
    }
}

impl CompoundInterestPayload {
    fn into_inputs(self) -> Result<CompoundInterestInputs, ApiError> {
        let mut inputs = default_compound_interest_inputs();
        set_f64(&mut inputs.principal, self.principal, "principal")?;
        set_f64(&mut inputs.annual_rate, self.annual_rate, "annualRate")?;
        set(&mut inputs.years, self.years);
        set(&mut inputs.compounding, self.compounding.map(Into::into));
        set_f64(
            &mut inputs.monthly_contribution,
            self.monthly_contribution,
            "monthlyContribution",
        )?;

        ensure(inputs.years <= MAX_YEARS, "years", "must be at most 100")?;
        Ok(inputs)
    }
}

impl EmiPayload {
    fn into_inputs(self) -> Result<EmiInputs, ApiError> {
        let mut inputs = default_emi_inputs();
        set_f64(&mut inputs.loan_amount, self.loan_amount, "loanAmount")?;
        set_f64(&mut inputs.annual_rate, self.annual_rate, "annualRate")?;
        set(&mut inputs.tenure_months, self.tenure_months);

        ensure(
            inputs.tenure_months <= MAX_MONTHS,
            "tenureMonths",
            "must be at most 1200 months",
        )?;
        Ok(inputs)
    }
}

impl SipPayload {
    fn into_inputs(self) -> Result<SipInputs, ApiError> {
        let mut inputs = default_sip_inputs();
        set_f64(
            &mut inputs.monthly_investment,
            self.monthly_investment,
            "monthlyInvestment",
        )?;
        set_f64(&mut inputs.expected_return, self.expected_return, "expectedReturn")?;
        set(&mut inputs.years, self.years);
        set_f64(&mut inputs.annual_step_up, self.annual_step_up, "annualStepUp")?;

        ensure(inputs.years <= MAX_YEARS, "years", "must be at most 100")?;
        Ok(inputs)
    }
}

impl IncomeTaxPayload {
    fn into_inputs(self) -> Result<IncomeTaxInputs, ApiError> {
        let mut inputs = default_income_tax_inputs();
        set_f64(&mut inputs.annual_income, self.annual_income, "annualIncome")?;
        set_f64(&mut inputs.deductions, self.deductions, "deductions")?;
        set(
            &mut inputs.preferred_regime,
            self.preferred_regime.map(Into::into),
        );
        Ok(inputs)
    }
}

macro_rules! calculation {
    ($payload:ty, $name:literal, $output:ty, $run:ident) => {
        impl Calculation for $payload {
            const NAME: &'static str = $name;
            type Output = $output;

            fn evaluate(self) -> Result<Self::Output, ApiError> {
                let inputs = self.into_inputs()?;
                Ok($run(&inputs))
            }
        }
    };
}

calculation!(
    MortgagePayoffPayload,
    "mortgage-payoff",
    crate::core::MortgagePayoffResult,
    run_mortgage_payoff
);
calculation!(
    BuyVsRentPayload,
    "buy-vs-rent",
    crate::core::BuyVsRentResult,
    run_buy_vs_rent
);
calculation!(FirePayload, "fire", crate::core::FireResult, run_fire);
calculation!(
    CompoundInterestPayload,
    "compound-interest",
    crate::core::CompoundInterestResult,
    run_compound_interest
);
calculation!(EmiPayload, "emi", crate::core::EmiResult, run_emi);
calculation!(SipPayload, "sip", crate::core::SipResult, run_sip);
calculation!(
    IncomeTaxPayload,
    "income-tax",
    crate::core::IncomeTaxResult,
    run_income_tax
);

fn evaluate_json<C: Calculation>(payload: &str) -> Result<serde_json::Value, ApiError> {
    let payload = if payload.trim().is_empty() {
        "{}"
    } else {
        payload
    };
    let parsed = serde_json::from_str::<C>(payload)
        .map_err(|e| ApiError::InvalidPayload(e.to_string()))?;
    Ok(serde_json::to_value(parsed.evaluate()?)?)
}

/// Runs `calculator` on a camelCase JSON payload. Missing fields take the
/// calculator's defaults; an empty payload runs the defaults as-is.
pub fn run_calculator_json(
    calculator: Calculator,
    payload: &str,
) -> Result<serde_json::Value, ApiError> {
    match calculator {
        Calculator::MortgagePayoff => evaluate_json::<MortgagePayoffPayload>(payload),
        Calculator::BuyVsRent => evaluate_json::<BuyVsRentPayload>(payload),
        Calculator::Fire => evaluate_json::<FirePayload>(payload),
        Calculator::CompoundInterest => evaluate_json::<CompoundInterestPayload>(payload),
        Calculator::Emi => evaluate_json::<EmiPayload>(payload),
        Calculator::Sip => evaluate_json::<SipPayload>(payload),
        Calculator::IncomeTax => evaluate_json::<IncomeTaxPayload>(payload),
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route(
            Calculator::MortgagePayoff.path(),
            get(calculation_get::<MortgagePayoffPayload>)
                .post(calculation_post::<MortgagePayoffPayload>),
        )
        .route(
            Calculator::BuyVsRent.path(),
            get(calculation_get::<BuyVsRentPayload>).post(calculation_post::<BuyVsRentPayload>),
        )
        .route(
            Calculator::Fire.path(),
            get(calculation_get::<FirePayload>).post(calculation_post::<FirePayload>),
        )
        .route(
            Calculator::CompoundInterest.path(),
            get(calculation_get::<CompoundInterestPayload>)
                .post(calculation_post::<CompoundInterestPayload>),
        )
        .route(
            Calculator::Emi.path(),
            get(calculation_get::<EmiPayload>).post(calculation_post::<EmiPayload>),
        )
        .route(
            Calculator::Sip.path(),
            get(calculation_get::<SipPayload>).post(calculation_post::<SipPayload>),
        )
        .route(
            Calculator::IncomeTax.path(),
            get(calculation_get::<IncomeTaxPayload>).post(calculation_post::<IncomeTaxPayload>),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("calculator API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/api/health");

    axum::serve(listener, router()).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculation_get<C: Calculation>(query: Result<Query<C>, QueryRejection>) -> Response {
    match query {
        Ok(Query(payload)) => calculation_response(payload),
        Err(rejection) => rejected(ApiError::InvalidPayload(rejection.body_text())),
    }
}

async fn calculation_post<C: Calculation>(body: Result<Json<C>, JsonRejection>) -> Response {
    match body {
        Ok(Json(payload)) => calculation_response(payload),
        Err(rejection) => rejected(ApiError::InvalidPayload(rejection.body_text())),
    }
}

fn calculation_response<C: Calculation>(payload: C) -> Response {
    match payload.evaluate() {
        Ok(result) => {
            debug!("{} request served", C::NAME);
            json_response(StatusCode::OK, result)
        }
        Err(err) => rejected(err),
    }
}

fn rejected(err: ApiError) -> Response {
    debug!("rejected request: {err}");
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    fn parse<C: Calculation>(json: &str) -> C {
        serde_json::from_str::<C>(json).expect("valid payload")
    }

    #[test]
    fn mortgage_payload_overrides_only_given_fields() {
        let payload: MortgagePayoffPayload = parse(
            r#"{
              "currentBalance": 250000,
              "interestRate": 5.25,
              "remainingTenure": 240,
              "mortgageTaxDeduction": 22
            }"#,
        );
        let inputs = payload.into_inputs().expect("valid inputs");
        assert_approx(inputs.current_balance, 250_000.0);
        assert_approx(inputs.interest_rate, 5.25);
        assert_eq!(inputs.remaining_tenure, 240);
        assert_approx(inputs.mortgage_tax_deduction, 22.0);

        let defaults = default_mortgage_payoff_inputs();
        assert_approx(inputs.monthly_emi, defaults.monthly_emi);
        assert_approx(inputs.lump_sum_amount, defaults.lump_sum_amount);
        assert_approx(inputs.expected_market_return, defaults.expected_market_return);
    }

    #[test]
    fn empty_payload_runs_buy_vs_rent_defaults() {
        let value = run_calculator_json(Calculator::BuyVsRent, "").expect("runs");
        assert_eq!(value["downPayment"], serde_json::json!(100_000.0));
        assert_eq!(value["closingCosts"], serde_json::json!(15_000.0));
        assert_eq!(value["monthlyData"].as_array().map(Vec::len), Some(120));
        assert!(value["verdict"].is_string());
    }

    #[test]
    fn mortgage_response_uses_camel_case_keys() {
        let value = run_calculator_json(Calculator::MortgagePayoff, "{}").expect("runs");
        for key in [
            "prepay",
            "invest",
            "netWorthDifference",
            "percentageDifference",
            "winner",
            "breakEvenMonth",
            "breakevenRoi",
            "recommendation",
            "monthlyData",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        assert!(value["prepay"].get("finalNetWorthAfterTax").is_some());
        assert!(value["breakevenRoi"].get("converged").is_some());
        assert!(
            value["prepay"]["newTenureMonths"].as_u64().expect("tenure") < 300,
            "prepaying should shorten the loan"
        );
    }

    #[test]
    fn enum_fields_accept_aliases() {
        let payload: CompoundInterestPayload = parse(r#"{"compounding": "semiAnnually"}"#);
        let inputs = payload.into_inputs().expect("valid");
        assert_eq!(inputs.compounding, CompoundingFrequency::SemiAnnually);

        let payload: CompoundInterestPayload = parse(r#"{"compounding": "quarterly"}"#);
        assert_eq!(
            payload.into_inputs().expect("valid").compounding,
            CompoundingFrequency::Quarterly
        );

        let payload: IncomeTaxPayload = parse(r#"{"regime": "old"}"#);
        assert_eq!(
            payload.into_inputs().expect("valid").preferred_regime,
            TaxRegime::Old
        );
    }

    #[test]
    fn malformed_json_is_an_invalid_payload() {
        let err = run_calculator_json(Calculator::Emi, "{\"loanAmount\": ").expect_err("bad json");
        assert!(matches!(err, ApiError::InvalidPayload(_)));
        assert!(err.to_string().starts_with("Invalid API payload"));

        let err = run_calculator_json(Calculator::Emi, r#"{"tenureMonths": "ten"}"#)
            .expect_err("wrong type");
        assert!(matches!(err, ApiError::InvalidPayload(_)));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let payload = EmiPayload {
            annual_rate: Some(f64::NAN),
            ..EmiPayload::default()
        };
        let err = payload.into_inputs().expect_err("nan rejected");
        assert!(matches!(err, ApiError::NonFinite { field: "annualRate" }));
        assert_eq!(err.to_string(), "annualRate must be a finite number");
    }

    #[test]
    fn query_string_parses_and_validates() {
        let uri: Uri = "http://localhost/api/emi?loanAmount=500000&annualRate=9&tenureMonths=120"
            .parse()
            .expect("uri");
        let Query(payload) = Query::<EmiPayload>::try_from_uri(&uri).expect("query");
        let inputs = payload.into_inputs().expect("valid");
        assert_approx(inputs.loan_amount, 500_000.0);
        assert_approx(inputs.annual_rate, 9.0);
        assert_eq!(inputs.tenure_months, 120);

        let uri: Uri = "http://localhost/api/emi?annualRate=inf".parse().expect("uri");
        let Query(payload) = Query::<EmiPayload>::try_from_uri(&uri).expect("query");
        assert!(matches!(
            payload.into_inputs(),
            Err(ApiError::NonFinite { field: "annualRate" })
        ));
    }

    #[test]
    fn oversized_horizons_are_rejected() {
        let err = run_calculator_json(Calculator::Sip, r#"{"years": 5000}"#).expect_err("too long");
        assert_eq!(err.to_string(), "years must be at most 100");

        let err = run_calculator_json(Calculator::MortgagePayoff, r#"{"remainingTenure": 1201}"#)
            .expect_err("too long");
        assert!(matches!(
            err,
            ApiError::InvalidField {
                field: "remainingTenure",
                ..
            }
        ));
    }

    #[test]
    fn degenerate_inputs_still_succeed() {
        let value =
            run_calculator_json(Calculator::BuyVsRent, r#"{"homePrice": 0}"#).expect("runs");
        assert_eq!(value["verdict"], serde_json::json!("neutral"));
        assert_eq!(value["monthlyData"].as_array().map(Vec::len), Some(0));

        let value =
            run_calculator_json(Calculator::Fire, r#"{"withdrawalRate": 0}"#).expect("runs");
        assert!(value["fireNumber"].is_null());
        assert!(value["monthsToFire"].is_null());
    }

    #[test]
    fn every_calculator_runs_on_defaults() {
        for calculator in Calculator::value_variants() {
            let value = run_calculator_json(*calculator, "{}").expect("defaults run");
            assert!(value.is_object(), "{calculator:?} should produce an object");
            assert!(calculator.path().starts_with("/api/"));
        }
    }

    #[test]
    fn responses_are_not_cached() {
        let response = json_response(StatusCode::OK, HealthResponse { status: "ok" });
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );
        let response = error_response(StatusCode::BAD_REQUEST, "bad");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

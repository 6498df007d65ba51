use log::debug;

use super::types::{IncomeTaxInputs, IncomeTaxResult, RegimeTax, SlabTax, TaxRegime};

/// `(lower, upper, rate)`; the last slab is open-ended.
type Slab = (f64, Option<f64>, f64);

const NEW_REGIME_SLABS: [Slab; 6] = [
    (0.0, Some(300_000.0), 0.0),
    (300_000.0, Some(700_000.0), 0.05),
    (700_000.0, Some(1_000_000.0), 0.10),
    (1_000_000.0, Some(1_200_000.0), 0.15),
    (1_200_000.0, Some(1_500_000.0), 0.20),
    (1_500_000.0, None, 0.30),
];

const OLD_REGIME_SLABS: [Slab; 4] = [
    (0.0, Some(250_000.0), 0.0),
    (250_000.0, Some(500_000.0), 0.05),
    (500_000.0, Some(1_000_000.0), 0.20),
    (1_000_000.0, None, 0.30),
];

const CESS_RATE: f64 = 0.04;

struct RegimeRules {
    slabs: &'static [Slab],
    standard_deduction: f64,
    /// Section 87A: full rebate up to `rebate_cap` while taxable income is
    /// at most `rebate_income_limit`.
    rebate_income_limit: f64,
    rebate_cap: f64,
    allows_deductions: bool,
}

impl TaxRegime {
    fn rules(self) -> RegimeRules {
        match self {
            TaxRegime::New => RegimeRules {
                slabs: &NEW_REGIME_SLABS,
                standard_deduction: 75_000.0,
                rebate_income_limit: 700_000.0,
                rebate_cap: 25_000.0,
                allows_deductions: false,
            },
            TaxRegime::Old => RegimeRules {
                slabs: &OLD_REGIME_SLABS,
                standard_deduction: 50_000.0,
                rebate_income_limit: 500_000.0,
                rebate_cap: 12_500.0,
                allows_deductions: true,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaxRegime::New => "new",
            TaxRegime::Old => "old",
        }
    }
}

fn slab_breakdown(taxable_income: f64, slabs: &[Slab]) -> Vec<SlabTax> {
    slabs
        .iter()
        .map(|&(lower, upper, rate)| {
            let ceiling = upper.unwrap_or(f64::INFINITY);
            let taxable_amount = (taxable_income.min(ceiling) - lower).max(0.0);
            SlabTax {
                lower,
                upper,
                rate: rate * 100.0,
                taxable_amount,
                tax: taxable_amount * rate,
            }
        })
        .collect()
}

pub fn regime_tax(regime: TaxRegime, annual_income: f64, deductions: f64) -> RegimeTax {
    let rules = regime.rules();
    let gross_income = annual_income.max(0.0);
    let deductions = if rules.allows_deductions {
        deductions.max(0.0)
    } else {
        0.0
    };
    let standard_deduction = rules.standard_deduction.min(gross_income);
    let taxable_income = (gross_income - standard_deduction - deductions).max(0.0);

    let slabs = slab_breakdown(taxable_income, rules.slabs);
    let tax_before_rebate: f64 = slabs.iter().map(|slab| slab.tax).sum();
    let rebate = if taxable_income <= rules.rebate_income_limit {
        tax_before_rebate.min(rules.rebate_cap)
    } else {
        0.0
    };
    let cess = (tax_before_rebate - rebate) * CESS_RATE;
    let total_tax = tax_before_rebate - rebate + cess;
    let effective_rate = if gross_income > 0.0 {
        total_tax / gross_income * 100.0
    } else {
        0.0
    };

    RegimeTax {
        regime,
        gross_income,
        standard_deduction,
        deductions,
        taxable_income,
        slabs,
        tax_before_rebate,
        rebate,
        cess,
        total_tax,
        effective_rate,
        monthly_take_home: (gross_income - total_tax) / 12.0,
    }
}

pub fn run_income_tax(inputs: &IncomeTaxInputs) -> IncomeTaxResult {
    let new_regime = regime_tax(TaxRegime::New, inputs.annual_income, inputs.deductions);
    let old_regime = regime_tax(TaxRegime::Old, inputs.annual_income, inputs.deductions);

    // Ties go to the new regime.
    let recommended_regime = if old_regime.total_tax < new_regime.total_tax {
        TaxRegime::Old
    } else {
        TaxRegime::New
    };
    let (recommended, other) = match recommended_regime {
        TaxRegime::New => (&new_regime, &old_regime),
        TaxRegime::Old => (&old_regime, &new_regime),
    };
    let savings = other.total_tax - recommended.total_tax;
    let preferred_tax = match inputs.preferred_regime {
        TaxRegime::New => new_regime.total_tax,
        TaxRegime::Old => old_regime.total_tax,
    };

    let mut explanation = if savings > 0.0 {
        format!(
            "The {} regime costs {savings:.0} less: {:.0} against {:.0} under the {} regime.",
            recommended.regime.label(),
            recommended.total_tax,
            other.total_tax,
            other.regime.label()
        )
    } else {
        format!(
            "Both regimes come to the same tax of {:.0}.",
            recommended.total_tax
        )
    };
    if savings > 0.0 && inputs.preferred_regime != recommended_regime {
        explanation.push_str(&format!(
            " Staying with the {} regime would cost {savings:.0} more.",
            inputs.preferred_regime.label()
        ));
    }

    debug!(
        "income tax: income={:.2} new={:.2} old={:.2} recommended={:?}",
        inputs.annual_income, new_regime.total_tax, old_regime.total_tax, recommended_regime
    );

    IncomeTaxResult {
        preferred_regime: inputs.preferred_regime,
        preferred_tax,
        recommended_regime,
        savings,
        explanation,
        new_regime,
        old_regime,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    fn inputs(income: f64, deductions: f64, preferred: TaxRegime) -> IncomeTaxInputs {
        IncomeTaxInputs {
            annual_income: income,
            deductions,
            preferred_regime: preferred,
        }
    }

    #[test]
    fn new_regime_applies_progressive_slabs() {
        let tax = regime_tax(TaxRegime::New, 1_200_000.0, 0.0);
        assert_approx(tax.taxable_income, 1_125_000.0);
        assert_approx(tax.tax_before_rebate, 68_750.0);
        assert_approx(tax.rebate, 0.0);
        assert_approx(tax.cess, 2_750.0);
        assert_approx(tax.total_tax, 71_500.0);
        let slab_total: f64 = tax.slabs.iter().map(|s| s.taxable_amount).sum();
        assert_approx(slab_total, tax.taxable_income);
    }

    #[test]
    fn new_regime_ignores_deductions() {
        let with = regime_tax(TaxRegime::New, 1_200_000.0, 200_000.0);
        let without = regime_tax(TaxRegime::New, 1_200_000.0, 0.0);
        assert_approx(with.total_tax, without.total_tax);
        assert_eq!(with.deductions, 0.0);
    }

    #[test]
    fn old_regime_honours_deductions() {
        let tax = regime_tax(TaxRegime::Old, 1_200_000.0, 150_000.0);
        assert_approx(tax.taxable_income, 1_000_000.0);
        assert_approx(tax.tax_before_rebate, 112_500.0);
        assert_approx(tax.total_tax, 117_000.0);
    }

    #[test]
    fn rebate_clears_tax_below_limits() {
        let new = regime_tax(TaxRegime::New, 750_000.0, 0.0);
        assert_approx(new.tax_before_rebate, 18_750.0);
        assert_approx(new.total_tax, 0.0);

        let old = regime_tax(TaxRegime::Old, 550_000.0, 0.0);
        assert_approx(old.rebate, 12_500.0);
        assert_approx(old.total_tax, 0.0);
    }

    #[test]
    fn recommends_cheaper_regime() {
        let result = run_income_tax(&inputs(1_200_000.0, 150_000.0, TaxRegime::Old));
        assert_eq!(result.recommended_regime, TaxRegime::New);
        assert_approx(result.savings, 45_500.0);
        assert_approx(result.preferred_tax, 117_000.0);
        assert!(result.explanation.contains("Staying with the old regime"));

        let result = run_income_tax(&inputs(1_000_000.0, 400_000.0, TaxRegime::New));
        assert_eq!(result.recommended_regime, TaxRegime::Old);
        assert_approx(result.old_regime.total_tax, 23_400.0);
        assert_approx(result.new_regime.total_tax, 44_200.0);
        assert_approx(result.savings, 20_800.0);
    }

    #[test]
    fn tie_goes_to_new_regime() {
        let result = run_income_tax(&inputs(400_000.0, 0.0, TaxRegime::Old));
        assert_eq!(result.new_regime.total_tax, 0.0);
        assert_eq!(result.old_regime.total_tax, 0.0);
        assert_eq!(result.recommended_regime, TaxRegime::New);
        assert_eq!(result.savings, 0.0);
        assert!(result.explanation.contains("same tax"));
    }

    #[test]
    fn zero_income_is_tax_free() {
        let result = run_income_tax(&inputs(0.0, 0.0, TaxRegime::New));
        assert_eq!(result.new_regime.total_tax, 0.0);
        assert_eq!(result.new_regime.effective_rate, 0.0);
        assert_eq!(result.new_regime.monthly_take_home, 0.0);
    }
}

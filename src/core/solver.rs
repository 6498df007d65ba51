use log::{trace, warn};

use super::types::{BreakevenIteration, BreakevenSearch};

#[derive(Debug, Clone, Copy)]
pub struct BisectionConfig {
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for BisectionConfig {
    /// Market returns in percent; stop within 100 currency units.
    fn default() -> Self {
        Self {
            search_min: 0.0,
            search_max: 50.0,
            tolerance: 100.0,
            max_iterations: 50,
        }
    }
}

/// Finds `x` in the bracket where `difference(x)` crosses zero.
///
/// `difference` must be non-decreasing in `x`; this is assumed, not checked.
/// The loop always terminates after `max_iterations` and never fails: when
/// it does not reach the tolerance it reports the midpoint with the
/// smallest residual and `converged = false`.
pub fn bisect_root<F>(config: BisectionConfig, mut difference: F) -> BreakevenSearch
where
    F: FnMut(f64) -> f64,
{
    let low_eval = difference(config.search_min);
    let high_eval = difference(config.search_max);
    let bracketed = low_eval <= 0.0 && high_eval >= 0.0;

    let mut lo = config.search_min;
    let mut hi = config.search_max;
    let mut best_rate = if low_eval.abs() <= high_eval.abs() { lo } else { hi };
    let mut best_residual = low_eval.abs().min(high_eval.abs());
    let mut best_signed = if low_eval.abs() <= high_eval.abs() {
        low_eval
    } else {
        high_eval
    };
    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let mut converged = false;

    let mut it = 0;
    while it < config.max_iterations {
        it += 1;
        let mid = (lo + hi) * 0.5;
        let eval = difference(mid);
        trace!("bisection iteration {it}: [{lo}, {hi}] mid={mid} diff={eval}");
        iterations.push(BreakevenIteration {
            iteration: it,
            lower_bound: lo,
            upper_bound: hi,
            candidate_rate: mid,
            net_worth_difference: eval,
        });

        if eval.abs() <= best_residual {
            best_rate = mid;
            best_residual = eval.abs();
            best_signed = eval;
        }
        if eval.abs() < config.tolerance {
            converged = true;
            best_rate = mid;
            best_signed = eval;
            break;
        }

        if eval > 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    let message = if converged {
        "Found the market return at which both strategies end level.".to_string()
    } else if !bracketed {
        "No sign change within the search bounds; returning the closest rate found.".to_string()
    } else {
        "Reached max iterations before tolerance was met; returning best estimate.".to_string()
    };
    if !converged {
        warn!("breakeven search did not converge: best rate {best_rate}, residual {best_signed}");
    }

    BreakevenSearch {
        rate: best_rate,
        residual: best_signed,
        converged,
        search_min: config.search_min,
        search_max: config.search_max,
        iterations,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn finds_root_of_linear_function() {
        // Root at 12.5; tolerance of 1 currency unit means |x - 12.5| < 0.001.
        let config = BisectionConfig {
            tolerance: 1.0,
            ..BisectionConfig::default()
        };
        let result = bisect_root(config, |x| (x - 12.5) * 1_000.0);
        assert!(result.converged);
        assert_close(result.rate, 12.5, 1e-3);
        assert!(result.residual.abs() < 1.0);
        assert!(!result.iterations.is_empty());
    }

    #[test]
    fn iterations_narrow_the_bracket() {
        let result = bisect_root(
            BisectionConfig {
                tolerance: 1e-9,
                ..BisectionConfig::default()
            },
            |x| x - 7.0,
        );
        for pair in result.iterations.windows(2) {
            let width_a = pair[0].upper_bound - pair[0].lower_bound;
            let width_b = pair[1].upper_bound - pair[1].lower_bound;
            assert!(width_b < width_a);
        }
    }

    #[test]
    fn respects_iteration_ceiling() {
        // A step function never gets within tolerance.
        let result = bisect_root(BisectionConfig::default(), |x| {
            if x < 20.0 { -1_000.0 } else { 1_000.0 }
        });
        assert!(!result.converged);
        assert_eq!(result.iterations.len(), 50);
        assert_close(result.rate, 20.0, 1e-6);
        assert!(result.message.contains("max iterations"));
    }

    #[test]
    fn unbracketed_search_returns_closest_bound() {
        let result = bisect_root(BisectionConfig::default(), |x| x - 1_000.0);
        assert!(!result.converged);
        assert!(result.rate > 49.0);
        assert!(result.message.contains("No sign change"));
    }
}

//! Deterministic period-stepping simulator shared by every calculator.
//!
//! A [`Policy`] owns the update rules for one scenario; [`simulate`] drives
//! it through the horizon and collects one snapshot per period.

/// Update rules for one scenario.
///
/// Each period runs, in order: [`accrue`](Policy::accrue),
/// [`apply_cash_flows`](Policy::apply_cash_flows),
/// [`apply_transitions`](Policy::apply_transitions) and finally
/// [`snapshot`](Policy::snapshot). Periods are numbered from 1.
pub trait Policy {
    type State;
    type Snapshot;

    fn initial_state(&self) -> Self::State;

    /// Interest and growth on the balances carried into `period`.
    fn accrue(&self, state: &mut Self::State, period: u32);

    /// Payments, contributions and withdrawals scheduled for `period`.
    fn apply_cash_flows(&self, state: &mut Self::State, period: u32);

    /// One-time switches that take effect from the next period.
    fn apply_transitions(&self, _state: &mut Self::State, _period: u32) {}

    fn snapshot(&self, state: &Self::State, period: u32) -> Self::Snapshot;
}

/// Runs `policy` for `horizon` periods. A non-positive horizon yields an
/// empty trace.
pub fn simulate<P: Policy>(policy: &P, horizon: i32) -> Vec<P::Snapshot> {
    if horizon <= 0 {
        return Vec::new();
    }

    let mut state = policy.initial_state();
    let mut trace = Vec::with_capacity(horizon as usize);
    for period in 1..=horizon as u32 {
        policy.accrue(&mut state, period);
        policy.apply_cash_flows(&mut state, period);
        policy.apply_transitions(&mut state, period);
        trace.push(policy.snapshot(&state, period));
    }
    trace
}

/// Monthly growth factor equivalent to compounding `annual_pct` once a year.
pub fn monthly_growth_factor(annual_pct: f64) -> f64 {
    let annual = 1.0 + annual_pct / 100.0;
    if annual <= 0.0 {
        return 0.0;
    }
    annual.powf(1.0 / 12.0)
}

/// Keeps every twelfth snapshot, i.e. the state at each year end.
pub fn year_end_rows<S: Clone>(trace: &[S]) -> Vec<S> {
    trace.iter().skip(11).step_by(12).cloned().collect()
}

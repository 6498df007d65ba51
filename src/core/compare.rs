use serde::Serialize;

/// Smallest final difference that counts as a win, in currency units.
pub const MATERIALITY_FLOOR: f64 = 1_000.0;

/// Share of the principal that counts as a win when it exceeds the floor.
pub const MATERIALITY_RATIO: f64 = 0.01;

/// Anything a comparison can read a net worth from.
pub trait NetWorthPoint {
    fn period(&self) -> u32;
    fn net_worth(&self) -> f64;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Winner {
    ScenarioA,
    ScenarioB,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffPoint {
    pub period: u32,
    pub net_worth_a: f64,
    pub net_worth_b: f64,
    pub difference: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub series: Vec<DiffPoint>,
    pub break_even_period: Option<u32>,
}

impl Comparison {
    pub fn final_difference(&self) -> f64 {
        self.series.last().map(|p| p.difference).unwrap_or(0.0)
    }
}

/// Pairs both traces by period and derives `B - A` for each one.
///
/// Traces of unequal length are compared over their common prefix.
pub fn compare_traces<A, B>(scenario_a: &[A], scenario_b: &[B]) -> Comparison
where
    A: NetWorthPoint,
    B: NetWorthPoint,
{
    let series: Vec<DiffPoint> = scenario_a
        .iter()
        .zip(scenario_b)
        .map(|(a, b)| {
            debug_assert_eq!(a.period(), b.period());
            DiffPoint {
                period: a.period(),
                net_worth_a: a.net_worth(),
                net_worth_b: b.net_worth(),
                difference: b.net_worth() - a.net_worth(),
            }
        })
        .collect();
    let break_even_period = break_even_period(&series);
    Comparison {
        series,
        break_even_period,
    }
}

/// First period whose difference has the opposite sign to the first
/// nonzero difference in the series.
pub fn break_even_period(series: &[DiffPoint]) -> Option<u32> {
    let mut initial_sign = None;
    for point in series {
        let sign = if point.difference > 0.0 {
            1
        } else if point.difference < 0.0 {
            -1
        } else {
            continue;
        };
        match initial_sign {
            None => initial_sign = Some(sign),
            Some(first) if first != sign => return Some(point.period),
            Some(_) => {}
        }
    }
    None
}

pub fn materiality_threshold(principal: f64) -> f64 {
    (principal.max(0.0) * MATERIALITY_RATIO).max(MATERIALITY_FLOOR)
}

pub fn classify_winner(final_difference: f64, principal: f64) -> Winner {
    let threshold = materiality_threshold(principal);
    if final_difference > threshold {
        Winner::ScenarioB
    } else if final_difference < -threshold {
        Winner::ScenarioA
    } else {
        Winner::Neutral
    }
}

/// Final difference as a percentage of `base`; 0 when the base is empty.
pub fn percentage_difference(final_difference: f64, base: f64) -> f64 {
    if base.abs() < 1e-9 {
        return 0.0;
    }
    final_difference.abs() / base.abs() * 100.0
}

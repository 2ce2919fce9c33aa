//! Return calculations

/// Return on investment of a campaign: `(revenue - cost) / cost`.
///
/// A zero cost yields `0.0` rather than an infinite or NaN ratio.
pub fn return_on_investment(revenue: f64, cost: f64) -> f64 {
    if cost != 0.0 {
        (revenue - cost) / cost
    } else {
        0.0
    }
}

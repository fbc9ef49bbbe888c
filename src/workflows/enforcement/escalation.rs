/// Repeat-offender multiplier: doubles for every violation of the owner that
/// has already settled (PAID or CLOSED, excluding the one being settled).
///
/// Unbounded growth is municipal policy, not an oversight. A future ceiling
/// belongs in this module, behind these two functions, so the transition
/// layer never learns about it.
pub fn multiplier(prior_settled: u32) -> f64 {
    f64::powi(2.0, prior_settled as i32)
}

pub fn escalate(base_fine: f64, prior_settled: u32) -> f64 {
    base_fine * multiplier(prior_settled)
}

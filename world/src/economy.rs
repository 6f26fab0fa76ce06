//! Currency formulas for wave rewards and structure refunds.

use bastion_core::CoreMining;

/// Reward for the wave before mining efficiency is applied.
#[must_use]
pub fn base_mining_reward(mining: &CoreMining, wave: u32) -> u32 {
    let steps = wave.saturating_sub(1);
    let linear = mining
        .reward_base
        .saturating_add(steps.saturating_mul(mining.reward_growth));
    match mining.reward_multiplier_per_wave {
        Some(multiplier) => {
            let exponent = i32::try_from(steps).unwrap_or(i32::MAX);
            round_currency(f64::from(linear) * multiplier.powi(exponent))
        }
        None => linear,
    }
}

/// Reward paid for a wave, scaled by the core's mining efficiency.
#[must_use]
pub fn mining_reward(mining: &CoreMining, wave: u32, efficiency: f64) -> u32 {
    let base = base_mining_reward(mining, wave);
    round_currency(f64::from(base) * efficiency)
}

/// Currency returned when selling a structure, truncated to whole units.
#[must_use]
pub fn sell_refund(cost: u32, refund_pct: f64) -> u32 {
    let refund = f64::from(cost) * refund_pct;
    if refund.is_finite() && refund > 0.0 {
        (refund.floor() as u32).min(cost)
    } else {
        0
    }
}

/// Rounds half to even, saturating at the `u32` range.
fn round_currency(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round_ties_even().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

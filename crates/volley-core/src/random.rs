//! Random generation: payout amounts, idempotency nonces, and the
//! weighted scenario draw. None of this needs cryptographic strength;
//! callers pass whatever `Rng` the engine hands them (seeded `StdRng`
//! for reproducible runs, thread RNG otherwise).

use rand::Rng;

use crate::errors::RunError;
use crate::model::Scenario;

/// 62-symbol alphabet used for nonces, matching the upstream contract
/// of "alphanumeric only".
const NONCE_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draws a nonce of exactly `len` characters, one uniform draw per
/// character.
pub fn random_nonce<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..NONCE_ALPHABET.len());
            NONCE_ALPHABET[idx] as char
        })
        .collect()
}

/// Draws an amount uniformly in [1, 500) and truncates to whole cents.
/// Truncation (floor), not rounding: the distribution is biased the
/// same way the original generator was.
pub fn random_amount_cents<R: Rng + ?Sized>(rng: &mut R) -> u64 {
    let raw = rng.gen_range(1.0_f64..500.0);
    (raw * 100.0).floor() as u64
}

/// Renders cents as a decimal quantity string without trailing zero
/// padding: 3020 -> "30.2", 3000 -> "30", 3025 -> "30.25".
pub fn format_amount(cents: u64) -> String {
    if cents % 100 == 0 {
        format!("{}", cents / 100)
    } else if cents % 10 == 0 {
        format!("{}.{}", cents / 100, (cents % 100) / 10)
    } else {
        format!("{}.{:02}", cents / 100, cents % 100)
    }
}

/// Fresh amount quantity string for a random-amount scenario.
pub fn random_amount<R: Rng + ?Sized>(rng: &mut R) -> String {
    format_amount(random_amount_cents(rng))
}

/// Selects a scenario for a percentage draw in [0, 100) by walking the
/// table and accumulating weights; the first row whose cumulative
/// weight meets or exceeds the draw wins.
///
/// Validated tables (weights summing to exactly 100) always match.
/// A fallthrough is still an error rather than an unset variable set.
pub fn select_scenario(scenarios: &[Scenario], draw: f64) -> Result<&Scenario, RunError> {
    let mut cumulative = 0u32;
    for scenario in scenarios {
        cumulative = cumulative.saturating_add(scenario.weight);
        if draw <= f64::from(cumulative) {
            return Ok(scenario);
        }
    }
    Err(RunError::ScenarioSelection { draw })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::builtin_scenarios;
    use crate::model::DisbursementType;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn draw_zero_selects_first_scenario() {
        let table = builtin_scenarios();
        let sc = select_scenario(&table, 0.0).unwrap();
        assert_eq!(sc.name, table[0].name);
        assert_eq!(sc.weight, 5);
        assert_eq!(sc.disbursement_type, DisbursementType::Instant);
    }

    #[test]
    fn draw_near_hundred_selects_last_scenario() {
        let table = builtin_scenarios();
        let sc = select_scenario(&table, 99.9).unwrap();
        assert_eq!(sc.name, table.last().unwrap().name);
        assert_eq!(sc.weight, 20);
        assert_eq!(sc.disbursement_type, DisbursementType::Default);
    }

    #[test]
    fn fallthrough_is_an_error_not_a_panic() {
        let mut table = builtin_scenarios();
        table.truncate(2); // 10% of cumulative weight
        let err = select_scenario(&table, 50.0).unwrap_err();
        assert!(err.to_string().contains("no scenario matched"));
    }

    #[test]
    fn format_amount_trims_trailing_zeros() {
        assert_eq!(format_amount(3020), "30.2");
        assert_eq!(format_amount(3000), "30");
        assert_eq!(format_amount(3025), "30.25");
        assert_eq!(format_amount(100), "1");
        assert_eq!(format_amount(49999), "499.99");
    }

    #[test]
    fn nonce_has_requested_length() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(random_nonce(&mut rng, 10).len(), 10);
        assert_eq!(random_nonce(&mut rng, 0), "");
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        assert_eq!(random_nonce(&mut a, 10), random_nonce(&mut b, 10));
        assert_eq!(random_amount_cents(&mut a), random_amount_cents(&mut b));
    }

    proptest! {
        #[test]
        fn amounts_stay_in_range_with_two_decimals(seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let cents = random_amount_cents(&mut rng);
            prop_assert!((100..50_000).contains(&cents));
            let rendered = format_amount(cents);
            let decimals = rendered.split('.').nth(1).map_or(0, str::len);
            prop_assert!(decimals <= 2);
        }

        #[test]
        fn nonces_are_alphanumeric(seed in any::<u64>(), len in 0usize..64) {
            let mut rng = StdRng::seed_from_u64(seed);
            let nonce = random_nonce(&mut rng, len);
            prop_assert_eq!(nonce.len(), len);
            prop_assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
        }

        #[test]
        fn every_draw_selects_exactly_one_scenario(draw in 0.0f64..100.0) {
            let table = builtin_scenarios();
            let sc = select_scenario(&table, draw).unwrap();
            prop_assert!(table.iter().any(|s| s.name == sc.name));
        }
    }
}

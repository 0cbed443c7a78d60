//! Growth index: a `[0, 100]` score combining how close the temperature is to
//! the optimum and how much light the plant gets.
//!
//! ```text
//! temp_score   = max(0, 1 - |t - 25| / 10)
//! light_score  = clamp(light / 200, 0, 1)
//! growth_index = round((temp_score * 0.5 + light_score * 0.5) * 100, 1)
//! ```
//!
//! Both sub-scores are weighted equally. The calibration constants are fixed.

/// Temperature at which the temperature term peaks (°C).
pub const OPTIMAL_TEMPERATURE_C: f64 = 25.0;

/// Distance from the optimum at which the temperature term reaches zero (°C).
pub const TEMPERATURE_TOLERANCE_C: f64 = 10.0;

/// Light level at which the light term saturates.
pub const LIGHT_SATURATION: f64 = 200.0;

const TEMPERATURE_WEIGHT: f64 = 0.5;
const LIGHT_WEIGHT: f64 = 0.5;

pub const GROWTH_MIN: f64 = 0.0;
pub const GROWTH_MAX: f64 = 100.0;

/// Temperature term in `[0, 1]`; 1.0 at 25°C, 0.0 at or beyond 15°C / 35°C.
pub fn temperature_score(temperature: f64) -> f64 {
    let raw = 1.0 - (temperature - OPTIMAL_TEMPERATURE_C).abs() / TEMPERATURE_TOLERANCE_C;
    // `f64::max` ignores NaN, so a NaN temperature scores 0 here.
    raw.max(0.0).min(1.0)
}

/// Light term in `[0, 1]`; linear ramp that saturates at [`LIGHT_SATURATION`].
///
/// Negative light is floored at 0 so it cannot drag the index below zero.
pub fn light_score(light: f64) -> f64 {
    (light / LIGHT_SATURATION).min(1.0).max(0.0)
}

/// Growth index in `[0, 100]`, rounded to one decimal place.
pub fn score(temperature: f64, light: f64) -> f64 {
    let combined =
        temperature_score(temperature) * TEMPERATURE_WEIGHT + light_score(light) * LIGHT_WEIGHT;
    round_to_tenth(combined * 100.0).clamp(GROWTH_MIN, GROWTH_MAX)
}

/// Map a growth index onto `[0, 1]` for presentation (color, gauges).
pub fn growth_fraction(growth: f64) -> f64 {
    (growth / GROWTH_MAX).clamp(0.0, 1.0)
}

/// Round to one decimal place on the exact decimal value of `v`, ties to
/// even. Scaling by 10 first is not equivalent: it can create a tie.
fn round_to_tenth(v: f64) -> f64 {
    format!("{v:.1}").parse::<f64>().unwrap_or(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reference_reading_scores_97_5() {
        assert!((temperature_score(24.5) - 0.95).abs() < 1e-12);
        assert!((light_score(600.0) - 1.0).abs() < 1e-12);
        let g = score(24.5, 600.0);
        assert!((g - 97.5).abs() < 1e-9, "expected 97.5, got {g}");
    }

    #[test]
    fn optimum_with_saturated_light_is_full_score() {
        assert_eq!(score(25.0, 200.0), 100.0);
        assert_eq!(score(25.0, 10_000.0), 100.0);
    }

    #[test]
    fn temperature_window_edges_score_zero() {
        assert_eq!(temperature_score(15.0), 0.0);
        assert_eq!(temperature_score(35.0), 0.0);
        assert_eq!(temperature_score(-40.0), 0.0);
        assert_eq!(temperature_score(120.0), 0.0);
        assert_eq!(score(35.0, 0.0), 0.0);
    }

    #[test]
    fn half_light_at_optimum() {
        // 1.0 * 0.5 + 0.5 * 0.5 = 0.75
        let g = score(25.0, 100.0);
        assert!((g - 75.0).abs() < 1e-9, "got {g}");
    }

    #[test]
    fn negative_light_is_floored() {
        assert_eq!(light_score(-500.0), 0.0);
        let g = score(25.0, -1_000.0);
        assert!((g - 50.0).abs() < 1e-9, "got {g}");
    }

    #[test]
    fn result_has_one_decimal_place() {
        let g = score(23.37, 123.4);
        let scaled = g * 10.0;
        assert!((scaled - scaled.round()).abs() < 1e-6, "got {g}");
    }

    #[test]
    fn rounding_uses_exact_decimal_value() {
        // Near-ties where scaling by 10 before rounding picks the wrong side.
        let cases = [
            (15.0, 0.6, 0.1),
            (0.0, 0.2, 0.1),
            (0.0, 2.6, 0.7),
            (0.0, 1.4, 0.3),
        ];
        for (t, l, expected) in cases {
            let g = score(t, l);
            assert_eq!(g, expected, "score({t}, {l}) = {g}, expected {expected}");
        }
    }

    #[test]
    fn growth_fraction_clamps() {
        assert_eq!(growth_fraction(-3.0), 0.0);
        assert_eq!(growth_fraction(50.0), 0.5);
        assert_eq!(growth_fraction(250.0), 1.0);
    }

    proptest! {
        #[test]
        fn score_stays_in_range(t in -1.0e6f64..1.0e6, l in -1.0e9f64..1.0e9) {
            let g = score(t, l);
            prop_assert!((GROWTH_MIN..=GROWTH_MAX).contains(&g), "score({t}, {l}) = {g}");
        }

        #[test]
        fn score_non_increasing_away_from_optimum(
            d1 in 0.0f64..50.0,
            extra in 0.0f64..50.0,
            above in any::<bool>(),
            l in 0.0f64..400.0,
        ) {
            let d2 = d1 + extra;
            let sign = if above { 1.0 } else { -1.0 };
            let near = score(OPTIMAL_TEMPERATURE_C + sign * d1, l);
            let far = score(OPTIMAL_TEMPERATURE_C + sign * d2, l);
            prop_assert!(far <= near, "near={near} far={far}");
        }

        #[test]
        fn light_saturates_above_threshold(l in LIGHT_SATURATION..1.0e9, t in 0.0f64..50.0) {
            prop_assert_eq!(light_score(l), 1.0);
            prop_assert_eq!(score(t, l), score(t, LIGHT_SATURATION));
        }

        #[test]
        fn score_is_deterministic(t in -100.0f64..100.0, l in -100.0f64..1000.0) {
            prop_assert_eq!(score(t, l).to_bits(), score(t, l).to_bits());
        }
    }
}

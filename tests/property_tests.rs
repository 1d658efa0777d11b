//! Property-based tests for the gas arithmetic.
//!
//! These use proptest to check the percentage invariants across the whole
//! range of plausible canister weights.

use gas_gauge::calculations::{
    consumption_percentage, gas_capacity, remaining_gas, remaining_percentage, status_class,
    weight_at_percentage, GasReading, StatusClass, CHEAT_SHEET_BANDS,
};
use gas_gauge::repositories::canister_repository::generate_canister_id;
use proptest::prelude::*;

// Strategies for generating test data
fn canister_type_strategy() -> impl Strategy<Value = (i32, i32)> {
    (1i32..2_000, 1i32..2_000).prop_map(|(empty, capacity)| (empty + capacity, empty))
}

fn weighing_strategy() -> impl Strategy<Value = (i32, i32, i32)> {
    canister_type_strategy()
        .prop_flat_map(|(full, empty)| (Just(full), Just(empty), empty..=full))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn remaining_and_consumed_sum_to_one_hundred((full, empty, weight) in weighing_strategy()) {
        let capacity = gas_capacity(full, empty);
        let remaining = remaining_percentage(weight, empty, capacity);
        prop_assert!((0.0..=100.0).contains(&remaining), "out of range: {}", remaining);
        let total = remaining + consumption_percentage(remaining);
        prop_assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn percentage_never_decreases_with_weight(
        (full, empty) in canister_type_strategy(),
        a in 0i32..5_000,
        b in 0i32..5_000,
    ) {
        let (lighter, heavier) = if a <= b { (a, b) } else { (b, a) };
        let capacity = gas_capacity(full, empty);
        prop_assert!(
            remaining_percentage(lighter, empty, capacity)
                <= remaining_percentage(heavier, empty, capacity)
        );
    }

    #[test]
    fn any_weight_stays_in_range(
        (full, empty) in canister_type_strategy(),
        weight in -5_000i32..10_000,
    ) {
        let reading = GasReading::new(weight, empty, full);
        prop_assert!((0.0..=100.0).contains(&reading.remaining_percentage));
        prop_assert_eq!(reading.remaining_gas, remaining_gas(weight, empty));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn non_positive_capacity_is_zero_percent(
        full in 1i32..2_000,
        extra in 0i32..2_000,
        weight in -5_000i32..5_000,
    ) {
        let empty = full + extra;
        let capacity = gas_capacity(full, empty);
        prop_assert!(capacity <= 0);
        prop_assert_eq!(remaining_percentage(weight, empty, capacity), 0.0);
    }

    #[test]
    fn band_weights_invert_to_their_percentages((full, empty) in canister_type_strategy()) {
        let capacity = gas_capacity(full, empty);
        for band in CHEAT_SHEET_BANDS {
            let top = weight_at_percentage(band.top * 100.0, empty, capacity);
            let bottom = weight_at_percentage(band.bottom * 100.0, empty, capacity);
            prop_assert!(top >= bottom);
            prop_assert!(bottom >= f64::from(empty) && top <= f64::from(full));
        }
    }

    #[test]
    fn status_class_follows_thresholds(pct in 0.0f64..=100.0, depleted in any::<bool>()) {
        let class = status_class(Some(pct), depleted);
        let expected = if depleted {
            StatusClass::Depleted
        } else if pct > 50.0 {
            StatusClass::High
        } else if pct > 25.0 {
            StatusClass::Medium
        } else {
            StatusClass::Low
        };
        prop_assert_eq!(class, expected);
    }
}

#[test]
fn generated_ids_do_not_repeat_in_a_burst() {
    let ids: std::collections::HashSet<String> = (0..50).map(|_| generate_canister_id()).collect();
    assert_eq!(ids.len(), 50);
}

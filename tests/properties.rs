use proptest::prelude::*;

use fxdescent::fixed::{add_sub, capped_diff, multiply_wide, round_to_integer};
use fxdescent::pipeline::check_convergence;
use fxdescent::{Controller, Narrow, Quad, SessionConfig, Wide};

fn any_wide() -> impl Strategy<Value = Wide> {
    any::<i32>().prop_map(Wide::from_raw)
}

fn any_narrow() -> impl Strategy<Value = Narrow> {
    any::<i16>().prop_map(Narrow::from_raw)
}

fn any_start() -> impl Strategy<Value = Quad<i8>> {
    any::<[i8; 4]>().prop_map(Quad)
}

/// Rates up to 2.0; anything above 1.0 on `a` or `c` diverges.
fn any_rates() -> impl Strategy<Value = Quad<Wide>> {
    [0i32..=512, 0i32..=512, 0i32..=512, 0i32..=512].prop_map(|r| Quad(r.map(Wide::from_raw)))
}

proptest! {
    #[test]
    fn prop_capped_diff_in_range_and_flags_exactly(x in any_narrow(), y in any_narrow()) {
        let r = capped_diff(x, y);
        let exact = x.raw() as i32 - y.raw() as i32;
        let out_of_range = exact < i16::MIN as i32 || exact > i16::MAX as i32;
        prop_assert_eq!(r.overflowed(), out_of_range);
        if !out_of_range {
            prop_assert_eq!(r.value.raw() as i32, exact);
        } else if exact > 0 {
            prop_assert_eq!(r.value, Narrow::MAX);
        } else {
            prop_assert_eq!(r.value, Narrow::MIN);
        }
    }

    #[test]
    fn prop_add_sub_saturation_is_monotonic(x in any_wide(), y1 in any_wide(), y2 in any_wide()) {
        let (lo, hi) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        prop_assert!(add_sub(x, lo, false).value <= add_sub(x, hi, false).value);
        prop_assert!(add_sub(x, lo, true).value >= add_sub(x, hi, true).value);
    }

    #[test]
    fn prop_add_sub_flags_exactly(x in any_wide(), y in any_wide(), is_sub in any::<bool>()) {
        let exact = if is_sub {
            x.raw() as i64 - y.raw() as i64
        } else {
            x.raw() as i64 + y.raw() as i64
        };
        let r = add_sub(x, y, is_sub);
        prop_assert_eq!(r.overflowed(), exact != r.value.raw() as i64);
    }

    #[test]
    fn prop_multiply_wide_saturation_is_monotonic(
        x in 0i32..=i32::MAX,
        y1 in any_wide(),
        y2 in any_wide(),
    ) {
        let x = Wide::from_raw(x);
        let (lo, hi) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        prop_assert!(multiply_wide(x, lo).value <= multiply_wide(x, hi).value);
    }

    #[test]
    fn prop_multiply_wide_sign_survives_saturation(x in any_wide(), y in any_wide()) {
        let exact = x.raw() as i64 * y.raw() as i64;
        let r = multiply_wide(x, y);
        if r.overflowed() {
            prop_assert_eq!(r.value == Wide::MAX, exact > 0);
            prop_assert_eq!(r.value == Wide::MIN, exact < 0);
        }
    }

    #[test]
    fn prop_round_flag_iff_beyond_127(x in any_narrow()) {
        let r = round_to_integer(x);
        prop_assert_eq!(r.overflowed(), x.to_f64().abs() > 127.0);
        let expected = x.to_f64().round().clamp(-128.0, 127.0) as i8;
        prop_assert_eq!(r.value, expected);
    }

    #[test]
    fn prop_zero_change_converges_when_window_contains_zero(
        v in any_wide(),
        lower in -1024i32..=0,
        upper in 0i32..=1024,
    ) {
        prop_assert!(check_convergence(v, v, Wide::from_raw(lower), Wide::from_raw(upper)));
    }

    #[test]
    fn prop_best_value_is_running_minimum(start in any_start(), rates in any_rates()) {
        let config = SessionConfig::default()
            .with_learning_rates(rates)
            .with_max_iterations(20)
            .unwrap();
        let mut ctrl = Controller::new(config).with_trace();
        let out = ctrl.run(start).unwrap();

        let mut running = Wide::MAX;
        for r in ctrl.trace().unwrap().records() {
            running = running.min(r.objective);
            prop_assert_eq!(r.best_value, running);
        }
        prop_assert_eq!(out.min_value, running);
    }

    #[test]
    fn prop_terminates_within_cap(
        start in any_start(),
        rates in any_rates(),
        cap in 1u32..=25,
    ) {
        let config = SessionConfig::default()
            .with_learning_rates(rates)
            .with_max_iterations(cap)
            .unwrap();
        let mut ctrl = Controller::new(config);
        let out = ctrl.run(start).unwrap();
        prop_assert!(out.done);
        prop_assert!(out.iterations >= 1 && out.iterations <= cap);
        if !out.converged {
            prop_assert_eq!(out.iterations, cap);
        }
        prop_assert_eq!(ctrl.cycles(), 2 + 5 * out.iterations as u64);
    }
}

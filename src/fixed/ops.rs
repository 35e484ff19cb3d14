//! Saturating fixed-point primitives.
//!
//! Every operation is pure and total: out-of-range results are clamped to
//! the nearest representable bound and reported through `Saturation`,
//! never wrapped and never trapped. Rescaling shifts are arithmetic, so
//! they round toward negative infinity exactly like a hardware `>>>`.

use super::{DoubleWide, Narrow, Saturated, Saturation, Wide, FRAC_BITS};

const WIDE_MIN: i64 = i32::MIN as i64;
const WIDE_MAX: i64 = i32::MAX as i64;
const NARROW_MIN: i64 = i16::MIN as i64;
const NARROW_MAX: i64 = i16::MAX as i64;

/// Largest magnitude `round_to_integer` accepts without raising its flag: 127.0.
const ROUND_LIMIT: i32 = 127 << FRAC_BITS;

#[inline]
fn wide(raw: i64) -> Saturated<Wide> {
    let (raw, saturation) = Saturation::classify(raw, WIDE_MIN, WIDE_MAX);
    Saturated {
        value: Wide(raw as i32),
        saturation,
    }
}

#[inline]
fn narrow(raw: i64) -> Saturated<Narrow> {
    let (raw, saturation) = Saturation::classify(raw, NARROW_MIN, NARROW_MAX);
    Saturated {
        value: Narrow(raw as i16),
        saturation,
    }
}

/// Wide add (`is_sub == false`) or subtract (`is_sub == true`).
#[inline]
pub fn add_sub(x: Wide, y: Wide, is_sub: bool) -> Saturated<Wide> {
    let (x, y) = (x.0 as i64, y.0 as i64);
    wide(if is_sub { x - y } else { x + y })
}

/// Unsaturated double-width product of two wide values.
#[inline]
pub fn multiply_double(x: Wide, y: Wide) -> DoubleWide {
    DoubleWide(x.0 as i64 * y.0 as i64)
}

/// Saturating double-wide addition (summation of products).
#[inline]
pub fn add_double(x: DoubleWide, y: DoubleWide) -> Saturated<DoubleWide> {
    match x.0.checked_add(y.0) {
        Some(sum) => Saturated::exact(DoubleWide(sum)),
        None if y.0 > 0 => Saturated {
            value: DoubleWide(i64::MAX),
            saturation: Saturation::Overflow,
        },
        None => Saturated {
            value: DoubleWide(i64::MIN),
            saturation: Saturation::Underflow,
        },
    }
}

/// Rescale a double-wide value back to 8 fractional bits and saturate into
/// the wide range.
#[inline]
pub fn clamp_double_to_wide(x: DoubleWide) -> Saturated<Wide> {
    wide(x.0 >> FRAC_BITS)
}

/// Rescale a double-wide value and saturate into the narrow range.
#[inline]
pub fn clamp_double_to_narrow(x: DoubleWide) -> Saturated<Narrow> {
    narrow(x.0 >> FRAC_BITS)
}

/// Wide multiply with rescale. `Overflow` and `Underflow` distinguish a
/// product clamped at the positive bound from one clamped at the negative
/// bound, so the sign of a saturated product is always correct.
#[inline]
pub fn multiply_wide(x: Wide, y: Wide) -> Saturated<Wide> {
    clamp_double_to_wide(multiply_double(x, y))
}

/// Narrow `x - y`, clamped at both narrow bounds.
///
/// Used for the parameter update so that a diverging gradient pins the
/// parameter at a bound instead of wrapping it to the opposite sign.
#[inline]
pub fn capped_diff(x: Narrow, y: Narrow) -> Saturated<Narrow> {
    narrow(x.0 as i64 - y.0 as i64)
}

/// Round a narrow value to the nearest integer, ties away from zero.
///
/// The result is clamped to `[-128, 127]`. The flag is raised whenever
/// `|x| > 127.0`, i.e. whenever the input lies outside the symmetric
/// integer range the snapshot registers are specified for.
#[inline]
pub fn round_to_integer(x: Narrow) -> Saturated<i8> {
    let raw = x.0 as i32;
    let half = 1 << (FRAC_BITS - 1);
    let magnitude = (raw.abs() + half) >> FRAC_BITS;
    let rounded = if raw < 0 { -magnitude } else { magnitude };
    let value = rounded.clamp(i8::MIN as i32, i8::MAX as i32) as i8;
    let saturation = if raw > ROUND_LIMIT {
        Saturation::Overflow
    } else if raw < -ROUND_LIMIT {
        Saturation::Underflow
    } else {
        Saturation::Exact
    };
    Saturated { value, saturation }
}

/// Ordered wide comparison for minimum tracking.
#[inline]
pub fn less_than(x: Wide, y: Wide) -> bool {
    x.0 < y.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(v: i32) -> Wide {
        Wide::from_int(v)
    }

    #[test]
    fn add_sub_in_range() {
        assert_eq!(add_sub(w(3), w(4), false), Saturated::exact(w(7)));
        assert_eq!(add_sub(w(3), w(4), true), Saturated::exact(w(-1)));
    }

    #[test]
    fn add_sub_saturates_at_both_bounds() {
        let hi = add_sub(Wide::MAX, Wide::from_raw(1), false);
        assert_eq!(hi.value, Wide::MAX);
        assert_eq!(hi.saturation, Saturation::Overflow);

        let lo = add_sub(Wide::MIN, Wide::from_raw(1), true);
        assert_eq!(lo.value, Wide::MIN);
        assert_eq!(lo.saturation, Saturation::Underflow);

        // MIN - MIN is exactly zero, no flag
        assert_eq!(add_sub(Wide::MIN, Wide::MIN, true), Saturated::exact(Wide::ZERO));
    }

    #[test]
    fn multiply_wide_rescales() {
        assert_eq!(multiply_wide(w(3), w(-4)), Saturated::exact(w(-12)));
        // 0.5 * 0.5 = 0.25
        let half = Wide::from_raw(128);
        assert_eq!(multiply_wide(half, half).value, Wide::from_raw(64));
    }

    #[test]
    fn multiply_wide_truncates_toward_negative_infinity() {
        // (1/256) * (-1/256) = -1/65536, floors to -1/256
        let tiny = Wide::from_raw(1);
        let neg = Wide::from_raw(-1);
        assert_eq!(multiply_wide(tiny, neg).value, Wide::from_raw(-1));
        assert_eq!(multiply_wide(tiny, tiny).value, Wide::ZERO);
    }

    #[test]
    fn multiply_wide_flags_direction() {
        let big = w(1 << 20);
        let pos = multiply_wide(big, big);
        assert_eq!(pos.value, Wide::MAX);
        assert_eq!(pos.saturation, Saturation::Overflow);

        let neg = multiply_wide(big, w(-(1 << 20)));
        assert_eq!(neg.value, Wide::MIN);
        assert_eq!(neg.saturation, Saturation::Underflow);
    }

    #[test]
    fn multiply_double_keeps_full_product() {
        let p = multiply_double(Wide::MAX, Wide::MAX);
        assert_eq!(p.raw(), i32::MAX as i64 * i32::MAX as i64);
        assert_eq!(multiply_double(Wide::MIN, Wide::MIN).raw(), 1i64 << 62);
    }

    #[test]
    fn add_double_saturates() {
        let sum = add_double(DoubleWide(i64::MAX), DoubleWide(1));
        assert_eq!(sum.value, DoubleWide(i64::MAX));
        assert_eq!(sum.saturation, Saturation::Overflow);
        let diff = add_double(DoubleWide(i64::MIN), DoubleWide(-1));
        assert_eq!(diff.saturation, Saturation::Underflow);
        assert!(!add_double(DoubleWide(5), DoubleWide(-7)).overflowed());
    }

    #[test]
    fn clamp_double_to_narrow_bounds() {
        // 100 * 2 = 200 does not fit Q8.8
        let p = multiply_double(w(100), w(2));
        let c = clamp_double_to_narrow(p);
        assert_eq!(c.value, Narrow::MAX);
        assert_eq!(c.saturation, Saturation::Overflow);

        let p = multiply_double(w(-100), w(2));
        let c = clamp_double_to_narrow(p);
        assert_eq!(c.value, Narrow::MIN);
        assert_eq!(c.saturation, Saturation::Underflow);

        // 12 * 0.125 = 1.5
        let c = clamp_double_to_narrow(multiply_double(w(12), Wide::from_raw(32)));
        assert_eq!(c, Saturated::exact(Narrow::from_raw(384)));
    }

    #[test]
    fn clamp_double_to_wide_matches_multiply_wide() {
        let (x, y) = (Wide::from_raw(-12345), Wide::from_raw(6789));
        assert_eq!(clamp_double_to_wide(multiply_double(x, y)), multiply_wide(x, y));
    }

    #[test]
    fn capped_diff_saturates() {
        let d = capped_diff(Narrow::MAX, Narrow::from_int(-1));
        assert_eq!(d.value, Narrow::MAX);
        assert_eq!(d.saturation, Saturation::Overflow);

        let d = capped_diff(Narrow::MIN, Narrow::from_raw(1));
        assert_eq!(d.value, Narrow::MIN);
        assert_eq!(d.saturation, Saturation::Underflow);

        let d = capped_diff(Narrow::from_int(3), Narrow::from_int(5));
        assert_eq!(d, Saturated::exact(Narrow::from_int(-2)));
    }

    #[test]
    fn round_ties_away_from_zero() {
        assert_eq!(round_to_integer(Narrow::from_raw(128)).value, 1);
        assert_eq!(round_to_integer(Narrow::from_raw(-128)).value, -1);
        assert_eq!(round_to_integer(Narrow::from_raw(127)).value, 0);
        assert_eq!(round_to_integer(Narrow::from_raw(-127)).value, 0);
        // 2.5 -> 3, -2.5 -> -3
        assert_eq!(round_to_integer(Narrow::from_raw(640)).value, 3);
        assert_eq!(round_to_integer(Narrow::from_raw(-640)).value, -3);
        assert!(!round_to_integer(Narrow::from_raw(640)).overflowed());
    }

    #[test]
    fn round_flags_beyond_127() {
        let exactly = round_to_integer(Narrow::from_int(127));
        assert_eq!(exactly, Saturated::exact(127));

        let above = round_to_integer(Narrow::from_raw(127 * 256 + 1));
        assert_eq!(above.value, 127);
        assert_eq!(above.saturation, Saturation::Overflow);

        // 127.5 ties to 128, which clamps to 127
        let tie = round_to_integer(Narrow::from_raw(127 * 256 + 128));
        assert_eq!(tie.value, 127);
        assert!(tie.overflowed());

        let max = round_to_integer(Narrow::MAX);
        assert_eq!(max.value, 127);
        assert!(max.overflowed());

        let min = round_to_integer(Narrow::MIN);
        assert_eq!(min.value, -128);
        assert_eq!(min.saturation, Saturation::Underflow);
    }

    #[test]
    fn less_than_is_strict() {
        assert!(less_than(w(-5), w(3)));
        assert!(!less_than(w(3), w(3)));
        assert!(!less_than(Wide::MAX, Wide::MIN));
    }
}

//! Fixed-point value types for the descent pipeline.
//!
//! Two working formats share the same fractional width (8 bits, scale 1/256):
//! - `Narrow` (Q8.8, 16 bits): parameters and per-step deltas
//! - `Wide` (Q24.8, 32 bits): objective values and learning-rate constants
//!
//! `DoubleWide` is the raw product of two wide values (scale 2^-16). It is
//! never saturated on its own; `ops` clamps it back into a working format.

pub mod ops;

pub use ops::{
    add_double, add_sub, capped_diff, clamp_double_to_narrow, clamp_double_to_wide, less_than,
    multiply_double, multiply_wide, round_to_integer,
};

/// Number of fractional bits in both working formats.
pub const FRAC_BITS: u32 = 8;

/// Scale factor: 2^8 = 256.
pub const SCALE: i32 = 1 << FRAC_BITS;

// ─── Saturation ────────────────────────────────────────────────────

/// Which bound, if any, a result was clamped to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Saturation {
    /// Result was representable.
    #[default]
    Exact,
    /// Clamped to the positive bound.
    Overflow,
    /// Clamped to the negative bound.
    Underflow,
}

impl Saturation {
    /// Classify a raw wide result against an inclusive range.
    #[inline]
    pub(crate) fn classify(raw: i64, min: i64, max: i64) -> (i64, Self) {
        if raw > max {
            (max, Self::Overflow)
        } else if raw < min {
            (min, Self::Underflow)
        } else {
            (raw, Self::Exact)
        }
    }
}

/// A value produced by a saturating operation, with its overflow indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Saturated<T> {
    pub value: T,
    pub saturation: Saturation,
}

impl<T> Saturated<T> {
    #[inline]
    pub fn exact(value: T) -> Self {
        Self {
            value,
            saturation: Saturation::Exact,
        }
    }

    /// The single-bit overflow flag of the hardware contract.
    #[inline]
    pub fn overflowed(&self) -> bool {
        self.saturation != Saturation::Exact
    }

    /// Fold this result's flag into an accumulating OR-reduction.
    #[inline]
    pub fn flag_into(self, acc: &mut bool) -> T {
        *acc |= self.overflowed();
        self.value
    }
}

// ─── Narrow (Q8.8) ─────────────────────────────────────────────────

/// Signed Q8.8 fixed-point value, range [-128.0, 127.99609375].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Narrow(pub i16);

impl Narrow {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(SCALE as i16);
    pub const MIN: Self = Self(i16::MIN);
    pub const MAX: Self = Self(i16::MAX);

    /// Construct from the raw scaled representation.
    #[inline]
    pub const fn from_raw(raw: i16) -> Self {
        Self(raw)
    }

    /// Raw scaled representation.
    #[inline]
    pub const fn raw(self) -> i16 {
        self.0
    }

    /// Encode a whole number. Every `i8` is exactly representable.
    #[inline]
    pub const fn from_int(v: i8) -> Self {
        Self((v as i16) << FRAC_BITS)
    }

    /// Sign-extend into the wide format (lossless).
    #[inline]
    pub const fn widen(self) -> Wide {
        Wide(self.0 as i32)
    }

    /// Decode to f64. Reporting and reference comparison only.
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// Encode an f64 that is an exact multiple of 1/256 inside the range.
    pub fn from_f64_exact(v: f64) -> Option<Self> {
        let raw = exact_raw(v)?;
        i16::try_from(raw).ok().map(Self)
    }
}

impl std::fmt::Display for Narrow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}", self.to_f64())
    }
}

// ─── Wide (Q24.8) ──────────────────────────────────────────────────

/// Signed Q24.8 fixed-point value, range [-8388608.0, 8388607.99609375].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Wide(pub i32);

impl Wide {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(SCALE);
    pub const MIN: Self = Self(i32::MIN);
    pub const MAX: Self = Self(i32::MAX);

    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Encode a whole number. `v` must lie in the 24-bit integer range.
    #[inline]
    pub const fn from_int(v: i32) -> Self {
        Self(v << FRAC_BITS)
    }

    /// Narrow with saturation at the Q8.8 bounds.
    #[inline]
    pub fn narrow(self) -> Saturated<Narrow> {
        let (raw, saturation) =
            Saturation::classify(self.0 as i64, i16::MIN as i64, i16::MAX as i64);
        Saturated {
            value: Narrow(raw as i16),
            saturation,
        }
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// Encode an f64 that is an exact multiple of 1/256 inside the range.
    pub fn from_f64_exact(v: f64) -> Option<Self> {
        let raw = exact_raw(v)?;
        i32::try_from(raw).ok().map(Self)
    }

    /// Nearest representable value to `v`, for error messages.
    pub fn nearest_f64(v: f64) -> f64 {
        (v * SCALE as f64).round() / SCALE as f64
    }
}

impl std::fmt::Display for Wide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}", self.to_f64())
    }
}

/// Scaled raw value of `v`, if `v` is finite and a multiple of 1/256.
fn exact_raw(v: f64) -> Option<i64> {
    if !v.is_finite() {
        return None;
    }
    let scaled = v * SCALE as f64;
    if scaled.fract() != 0.0 || scaled.abs() > i64::MAX as f64 {
        return None;
    }
    Some(scaled as i64)
}

// ─── DoubleWide ────────────────────────────────────────────────────

/// Unsaturated product of two wide raws (16 fractional bits).
///
/// `|i32 * i32| < 2^62`, so a single product always fits. Sums of
/// products go through `ops::add_double`, which saturates at the i64 bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DoubleWide(pub i64);

impl DoubleWide {
    pub const ZERO: Self = Self(0);

    /// Fractional bits carried by a product.
    pub const FRAC_BITS: u32 = 2 * FRAC_BITS;

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Lift a wide value to double-wide scale without rounding.
    #[inline]
    pub const fn from_wide(w: Wide) -> Self {
        Self((w.0 as i64) << FRAC_BITS)
    }
}

// ─── Quad ──────────────────────────────────────────────────────────

/// One value per parameter, in the fixed order (a, b, c, d).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Quad<T>(pub [T; 4]);

impl<T: Copy> Quad<T> {
    pub const fn new(a: T, b: T, c: T, d: T) -> Self {
        Self([a, b, c, d])
    }

    pub fn splat(v: T) -> Self {
        Self([v; 4])
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Quad<U> {
        Quad(self.0.map(f))
    }

    /// Pairwise combination with another quadruple.
    pub fn zip_with<U: Copy, V>(self, other: Quad<U>, mut f: impl FnMut(T, U) -> V) -> Quad<V> {
        let [a, b, c, d] = self.0;
        let [w, x, y, z] = other.0;
        Quad([f(a, w), f(b, x), f(c, y), f(d, z)])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }
}

impl<T> std::ops::Index<usize> for Quad<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.0[i]
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Quad<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d] = &self.0;
        write!(f, "({}, {}, {}, {})", a, b, c, d)
    }
}

impl Quad<i8> {
    /// Boundary conversion: integer inputs to narrow fixed-point.
    pub fn to_narrow(self) -> Quad<Narrow> {
        self.map(Narrow::from_int)
    }
}

/// Parameter names in quadruple order.
pub const PARAM_NAMES: [&str; 4] = ["a", "b", "c", "d"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_from_int_is_exact() {
        assert_eq!(Narrow::from_int(1), Narrow::ONE);
        assert_eq!(Narrow::from_int(-128), Narrow::MIN);
        assert_eq!(Narrow::from_int(127).raw(), 127 * 256);
    }

    #[test]
    fn widen_preserves_value() {
        let n = Narrow::from_raw(-300);
        assert_eq!(n.widen().raw(), -300);
        assert_eq!(n.widen().narrow(), Saturated::exact(n));
    }

    #[test]
    fn wide_narrow_saturates_both_ways() {
        let hi = Wide::from_int(200).narrow();
        assert_eq!(hi.value, Narrow::MAX);
        assert_eq!(hi.saturation, Saturation::Overflow);

        let lo = Wide::from_int(-129).narrow();
        assert_eq!(lo.value, Narrow::MIN);
        assert_eq!(lo.saturation, Saturation::Underflow);

        let edge = Wide::from_int(-128).narrow();
        assert!(!edge.overflowed());
    }

    #[test]
    fn exact_f64_encoding() {
        assert_eq!(Wide::from_f64_exact(0.125), Some(Wide::from_raw(32)));
        assert_eq!(Wide::from_f64_exact(-0.00390625), Some(Wide::from_raw(-1)));
        assert_eq!(Wide::from_f64_exact(0.1), None);
        assert_eq!(Wide::from_f64_exact(f64::NAN), None);
        assert_eq!(Narrow::from_f64_exact(128.0), None);
        assert_eq!(Narrow::from_f64_exact(-128.0), Some(Narrow::MIN));
    }

    #[test]
    fn quad_zip_and_display() {
        let a = Quad::new(1i8, 2, 3, 4);
        let b = Quad::new(10i8, 20, 30, 40);
        assert_eq!(a.zip_with(b, |x, y| x + y), Quad::new(11, 22, 33, 44));
        assert_eq!(a.to_string(), "(1, 2, 3, 4)");
        assert_eq!(a.to_narrow()[3], Narrow::from_int(4));
    }
}

// Semiring weights: tropical, log and boolean.

use std::fmt;

/// Comparison tolerance for float weights.
pub const DELTA: f32 = 1.0 / 1024.0;

/// A weight algebra with ⊕ (plus), ⊗ (times), Zero and One.
///
/// Weights are small `Copy` values. Float-backed weights compare with a
/// tolerance of [`DELTA`]; [`quantize`](Semiring::quantize) produces a hash key
/// at the same resolution so that weights can participate in state tables.
pub trait Semiring: Copy + fmt::Debug + PartialEq + 'static {
    /// Human-readable weight type name.
    const NAME: &'static str;
    /// Tag stored in the binary file header.
    const TAG: u8;
    /// Whether `w ⊕ w = w` for every weight.
    const IDEMPOTENT: bool;

    fn zero() -> Self;
    fn one() -> Self;
    fn plus(&self, rhs: &Self) -> Self;
    fn times(&self, rhs: &Self) -> Self;

    /// Left division: the weight `x` with `rhs ⊗ x = self`.
    ///
    /// Dividing by Zero yields Zero.
    fn divide(&self, rhs: &Self) -> Self;

    /// Hash key; equal keys imply approximately equal weights.
    fn quantize(&self) -> i64;

    /// Encoding used by the file formats: One is `0.0`, Zero is `+inf`.
    fn to_f32(&self) -> f32;
    fn from_f32(value: f32) -> Self;

    fn approx_eq(&self, rhs: &Self) -> bool {
        self == rhs
    }

    fn is_zero(&self) -> bool {
        self.approx_eq(&Self::zero())
    }

    fn is_one(&self) -> bool {
        self.approx_eq(&Self::one())
    }

    /// Natural order: `self < rhs` iff `self ⊕ rhs = self` and the two differ.
    ///
    /// Only meaningful for idempotent semirings; otherwise nothing is less.
    fn natural_less(&self, rhs: &Self) -> bool {
        Self::IDEMPOTENT && self.plus(rhs).approx_eq(self) && !self.approx_eq(rhs)
    }
}

fn quantize_f32(value: f32) -> i64 {
    if value.is_infinite() {
        if value > 0.0 { i64::MAX } else { i64::MIN }
    } else {
        (value / DELTA).round() as i64
    }
}

fn approx_eq_f32(a: f32, b: f32) -> bool {
    if a.is_infinite() || b.is_infinite() {
        a == b
    } else {
        (a - b).abs() <= DELTA
    }
}

/// Tropical weight: ⊕ is `min`, ⊗ is `+`.
#[derive(Clone, Copy, PartialEq, PartialOrd)]
pub struct TropicalWeight(pub f32);

impl TropicalWeight {
    pub fn new(value: f32) -> Self {
        Self(value)
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl fmt::Debug for TropicalWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for TropicalWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_infinite() {
            f.write_str("Infinity")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Semiring for TropicalWeight {
    const NAME: &'static str = "tropical";
    const TAG: u8 = 1;
    const IDEMPOTENT: bool = true;

    fn zero() -> Self {
        Self(f32::INFINITY)
    }

    fn one() -> Self {
        Self(0.0)
    }

    fn plus(&self, rhs: &Self) -> Self {
        if rhs.0 < self.0 { *rhs } else { *self }
    }

    fn times(&self, rhs: &Self) -> Self {
        if self.0.is_infinite() || rhs.0.is_infinite() {
            Self::zero()
        } else {
            Self(self.0 + rhs.0)
        }
    }

    fn divide(&self, rhs: &Self) -> Self {
        if rhs.0.is_infinite() || self.0.is_infinite() {
            Self::zero()
        } else {
            Self(self.0 - rhs.0)
        }
    }

    fn quantize(&self) -> i64 {
        quantize_f32(self.0)
    }

    fn to_f32(&self) -> f32 {
        self.0
    }

    fn from_f32(value: f32) -> Self {
        Self(value)
    }

    fn approx_eq(&self, rhs: &Self) -> bool {
        approx_eq_f32(self.0, rhs.0)
    }
}

/// Log weight: ⊕ is `-ln(e^-a + e^-b)`, ⊗ is `+`.
#[derive(Clone, Copy, PartialEq, PartialOrd)]
pub struct LogWeight(pub f32);

impl LogWeight {
    pub fn new(value: f32) -> Self {
        Self(value)
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl fmt::Debug for LogWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for LogWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_infinite() {
            f.write_str("Infinity")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Semiring for LogWeight {
    const NAME: &'static str = "log";
    const TAG: u8 = 2;
    const IDEMPOTENT: bool = false;

    fn zero() -> Self {
        Self(f32::INFINITY)
    }

    fn one() -> Self {
        Self(0.0)
    }

    fn plus(&self, rhs: &Self) -> Self {
        if self.0.is_infinite() {
            return *rhs;
        }
        if rhs.0.is_infinite() {
            return *self;
        }
        let (lo, hi) = if self.0 < rhs.0 {
            (self.0, rhs.0)
        } else {
            (rhs.0, self.0)
        };
        Self(lo - (-(hi - lo)).exp().ln_1p())
    }

    fn times(&self, rhs: &Self) -> Self {
        if self.0.is_infinite() || rhs.0.is_infinite() {
            Self::zero()
        } else {
            Self(self.0 + rhs.0)
        }
    }

    fn divide(&self, rhs: &Self) -> Self {
        if rhs.0.is_infinite() || self.0.is_infinite() {
            Self::zero()
        } else {
            Self(self.0 - rhs.0)
        }
    }

    fn quantize(&self) -> i64 {
        quantize_f32(self.0)
    }

    fn to_f32(&self) -> f32 {
        self.0
    }

    fn from_f32(value: f32) -> Self {
        Self(value)
    }

    fn approx_eq(&self, rhs: &Self) -> bool {
        approx_eq_f32(self.0, rhs.0)
    }
}

/// Boolean weight: ⊕ is `or`, ⊗ is `and`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BooleanWeight(pub bool);

impl fmt::Display for BooleanWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Semiring for BooleanWeight {
    const NAME: &'static str = "boolean";
    const TAG: u8 = 0;
    const IDEMPOTENT: bool = true;

    fn zero() -> Self {
        Self(false)
    }

    fn one() -> Self {
        Self(true)
    }

    fn plus(&self, rhs: &Self) -> Self {
        Self(self.0 || rhs.0)
    }

    fn times(&self, rhs: &Self) -> Self {
        Self(self.0 && rhs.0)
    }

    fn divide(&self, _rhs: &Self) -> Self {
        *self
    }

    fn quantize(&self) -> i64 {
        self.0 as i64
    }

    fn to_f32(&self) -> f32 {
        if self.0 { 0.0 } else { f32::INFINITY }
    }

    fn from_f32(value: f32) -> Self {
        Self(value.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tropical_laws() {
        let a = TropicalWeight(1.5);
        let b = TropicalWeight(2.0);
        assert_eq!(a.plus(&b), a);
        assert_eq!(a.times(&b), TropicalWeight(3.5));
        assert_eq!(a.times(&TropicalWeight::zero()), TropicalWeight::zero());
        assert_eq!(a.plus(&TropicalWeight::zero()), a);
        assert_eq!(a.times(&TropicalWeight::one()), a);
        assert!(b.times(&a).divide(&b).approx_eq(&a));
    }

    #[test]
    fn tropical_natural_order() {
        assert!(TropicalWeight(1.0).natural_less(&TropicalWeight(2.0)));
        assert!(!TropicalWeight(2.0).natural_less(&TropicalWeight(1.0)));
        assert!(!TropicalWeight(1.0).natural_less(&TropicalWeight(1.0)));
    }

    #[test]
    fn log_plus_adds_probabilities() {
        // -ln(0.5 + 0.5) = 0
        let half = LogWeight(std::f32::consts::LN_2);
        assert!(half.plus(&half).approx_eq(&LogWeight::one()));
        assert_eq!(half.plus(&LogWeight::zero()), half);
        assert!(!LogWeight(1.0).natural_less(&LogWeight(2.0)));
    }

    #[test]
    fn boolean_laws() {
        let t = BooleanWeight::one();
        let f = BooleanWeight::zero();
        assert_eq!(t.plus(&f), t);
        assert_eq!(t.times(&f), f);
        assert!(f.is_zero());
        assert!(t.is_one());
    }

    #[test]
    fn float_encoding() {
        assert_eq!(BooleanWeight::one().to_f32(), 0.0);
        assert_eq!(BooleanWeight::from_f32(f32::INFINITY), BooleanWeight::zero());
        assert_eq!(TropicalWeight::from_f32(2.5), TropicalWeight(2.5));
    }

    #[test]
    fn quantize_is_tolerant() {
        let a = TropicalWeight(1.0);
        let b = TropicalWeight(1.0 + DELTA / 8.0);
        assert_eq!(a.quantize(), b.quantize());
        assert!(a.approx_eq(&b));
        assert_eq!(TropicalWeight::zero().quantize(), i64::MAX);
    }
}

//! Tweening curves
//!
//! Stateless `(start, end, percent) -> value` interpolation functions and the
//! bounded table a timeline keeps them in. Property animation code looks curves
//! up by their 8-bit index; the scheduler itself never evaluates them.

use std::f32::consts::{FRAC_PI_2, PI, TAU};
use std::str::FromStr;

use thiserror::Error;

/// Curve function type: takes a range (start, end) and the progress through it
pub type CurveFn = fn(f32, f32, f32) -> f32;

/// Maximum number of slots in a [`CurveTable`], sentinel included
pub const CURVE_TABLE_CAPACITY: usize = 256;

/// Linear interpolation
#[inline]
pub fn lerp(start: f32, end: f32, percent: f32) -> f32 {
    start + (end - start) * percent
}

#[inline]
pub fn power2(start: f32, end: f32, percent: f32) -> f32 {
    start + (end - start) * percent * percent
}

#[inline]
pub fn power3(start: f32, end: f32, percent: f32) -> f32 {
    start + (end - start) * percent * percent * percent
}

#[inline]
pub fn power4(start: f32, end: f32, percent: f32) -> f32 {
    start + (end - start) * percent * percent * percent * percent
}

#[inline]
pub fn power5(start: f32, end: f32, percent: f32) -> f32 {
    start + (end - start) * percent * percent * percent * percent * percent
}

/// Lerp with the percentage raised to the power of `n`
#[inline]
pub fn power_n(start: f32, end: f32, percent: f32, n: f32) -> f32 {
    start + (end - start) * percent.powf(n)
}

/// Complete sine wave cycle
#[inline]
pub fn sine(start: f32, end: f32, percent: f32) -> f32 {
    start + (end - start) * (percent * TAU).sin()
}

#[inline]
pub fn sine_half(start: f32, end: f32, percent: f32) -> f32 {
    start + (end - start) * (percent * PI).sin()
}

#[inline]
pub fn sine_quarter(start: f32, end: f32, percent: f32) -> f32 {
    start + (end - start) * (percent * FRAC_PI_2).sin()
}

/// Complete cosine wave cycle
#[inline]
pub fn cosine(start: f32, end: f32, percent: f32) -> f32 {
    start + (end - start) * (percent * TAU).cos()
}

#[inline]
pub fn cosine_half(start: f32, end: f32, percent: f32) -> f32 {
    start + (end - start) * (percent * PI).cos()
}

#[inline]
pub fn cosine_quarter(start: f32, end: f32, percent: f32) -> f32 {
    start + (end - start) * (percent * FRAC_PI_2).cos()
}

/// Overshoots the end, then comes back.
///
/// The first half is a quartic ease toward `end`; the second half evaluates a
/// half sine with the endpoints swapped.
#[inline]
pub fn overshoot(start: f32, end: f32, percent: f32) -> f32 {
    if percent < 0.5 {
        return power4(start, end, percent * 2.0);
    }
    sine_half(end, start, percent * 2.0)
}

/// The built-in curve library
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Curve {
    #[default]
    Linear,
    Power2,
    Power3,
    Power4,
    Power5,
    Sine,
    SineHalf,
    SineQuarter,
    Cosine,
    CosineHalf,
    CosineQuarter,
    Overshoot,
}

impl Curve {
    /// Every curve, in library registration order
    pub const ALL: [Curve; 12] = [
        Curve::Linear,
        Curve::Power2,
        Curve::Power3,
        Curve::Power4,
        Curve::Power5,
        Curve::Sine,
        Curve::SineHalf,
        Curve::SineQuarter,
        Curve::Cosine,
        Curve::CosineHalf,
        Curve::CosineQuarter,
        Curve::Overshoot,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Curve::Linear => "linear",
            Curve::Power2 => "power2",
            Curve::Power3 => "power3",
            Curve::Power4 => "power4",
            Curve::Power5 => "power5",
            Curve::Sine => "sine",
            Curve::SineHalf => "sine_half",
            Curve::SineQuarter => "sine_quarter",
            Curve::Cosine => "cosine",
            Curve::CosineHalf => "cosine_half",
            Curve::CosineQuarter => "cosine_quarter",
            Curve::Overshoot => "overshoot",
        }
    }

    /// The plain function pointer for this curve
    pub fn as_fn(&self) -> CurveFn {
        match self {
            Curve::Linear => lerp,
            Curve::Power2 => power2,
            Curve::Power3 => power3,
            Curve::Power4 => power4,
            Curve::Power5 => power5,
            Curve::Sine => sine,
            Curve::SineHalf => sine_half,
            Curve::SineQuarter => sine_quarter,
            Curve::Cosine => cosine,
            Curve::CosineHalf => cosine_half,
            Curve::CosineQuarter => cosine_quarter,
            Curve::Overshoot => overshoot,
        }
    }

    /// Evaluate the curve between `start` and `end`
    pub fn apply(&self, start: f32, end: f32, percent: f32) -> f32 {
        (self.as_fn())(start, end, percent)
    }
}

/// Error returned when parsing an unknown curve name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown curve: {0}")]
pub struct ParseCurveError(pub String);

impl FromStr for Curve {
    type Err = ParseCurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Curve::ALL
            .into_iter()
            .find(|curve| curve.name() == wanted)
            .ok_or_else(|| ParseCurveError(s.to_string()))
    }
}

/// Fixed-capacity table of curve functions, indexed by an 8-bit id.
///
/// Slot 0 is an empty sentinel, so index 0 always means "no tweening".
#[derive(Clone, Debug)]
pub struct CurveTable {
    slots: [Option<CurveFn>; CURVE_TABLE_CAPACITY],
    len: usize,
}

impl CurveTable {
    /// A table holding only the empty sentinel
    pub fn new() -> Self {
        Self {
            slots: [None; CURVE_TABLE_CAPACITY],
            len: 1,
        }
    }

    /// A table with every [`Curve`] registered after the sentinel, in
    /// [`Curve::ALL`] order (so `Curve::Linear` sits at index 1)
    pub fn with_library() -> Self {
        let mut table = Self::new();
        table.add(Curve::ALL.iter().map(Curve::as_fn));
        table
    }

    /// Append curve functions while capacity remains.
    ///
    /// Returns the index of the first function added. If the table fills up,
    /// the remaining functions are dropped with a warning and the index of the
    /// last function actually added is returned instead; callers that need all
    /// of their functions must check [`CurveTable::len`] themselves.
    pub fn add<I>(&mut self, funcs: I) -> u8
    where
        I: IntoIterator<Item = CurveFn>,
    {
        let first = self.len;
        let mut funcs = funcs.into_iter();
        while let Some(func) = funcs.next() {
            if self.len >= CURVE_TABLE_CAPACITY {
                let dropped = 1 + funcs.count();
                tracing::warn!(
                    "Curve table is full ({} slots); dropped {} tweening functions",
                    CURVE_TABLE_CAPACITY,
                    dropped
                );
                return (self.len - 1) as u8;
            }
            self.slots[self.len] = Some(func);
            self.len += 1;
        }
        u8::try_from(first).unwrap_or(u8::MAX)
    }

    /// Look up a curve function. `None` for the sentinel or an unpopulated slot
    pub fn get(&self, index: u8) -> Option<CurveFn> {
        let index = usize::from(index);
        if index >= self.len {
            return None;
        }
        self.slots[index]
    }

    /// Reset the table to just the empty sentinel
    pub fn clear(&mut self) {
        self.slots = [None; CURVE_TABLE_CAPACITY];
        self.len = 1;
    }

    /// Number of populated slots, sentinel included
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when only the sentinel is present
    pub fn is_empty(&self) -> bool {
        self.len <= 1
    }

    pub fn remaining(&self) -> usize {
        CURVE_TABLE_CAPACITY - self.len
    }
}

impl Default for CurveTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_basic_curves() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(power2(0.0, 10.0, 0.5), 2.5);
        assert_eq!(power3(0.0, 8.0, 0.5), 1.0);
        assert_eq!(power4(0.0, 16.0, 0.5), 1.0);
        assert_eq!(power5(0.0, 32.0, 0.5), 1.0);
        assert!(approx(power_n(0.0, 10.0, 0.5, 2.0), 2.5));
    }

    #[test]
    fn test_endpoints() {
        for curve in [Curve::Linear, Curve::Power2, Curve::Power5, Curve::SineQuarter] {
            assert!(approx(curve.apply(2.0, 7.0, 0.0), 2.0), "{}", curve.name());
            assert!(approx(curve.apply(2.0, 7.0, 1.0), 7.0), "{}", curve.name());
        }
    }

    #[test]
    fn test_trig_curves() {
        assert!(approx(sine(0.0, 10.0, 0.25), 10.0));
        assert!(approx(sine_half(0.0, 10.0, 0.5), 10.0));
        assert!(approx(sine_quarter(0.0, 10.0, 1.0), 10.0));
        assert!(approx(cosine(0.0, 10.0, 0.0), 10.0));
        assert!(approx(cosine_half(0.0, 10.0, 1.0), -10.0));
        assert!(approx(cosine_quarter(0.0, 10.0, 1.0), 0.0));
    }

    #[test]
    fn test_overshoot() {
        assert_eq!(overshoot(0.0, 10.0, 0.25), power4(0.0, 10.0, 0.5));
        assert_eq!(overshoot(0.0, 10.0, 0.75), sine_half(10.0, 0.0, 1.5));
    }

    #[test]
    fn test_curve_from_str() {
        assert_eq!("linear".parse::<Curve>(), Ok(Curve::Linear));
        assert_eq!("Sine-Half".parse::<Curve>(), Ok(Curve::SineHalf));
        assert!("bounce".parse::<Curve>().is_err());
    }

    #[test]
    fn test_table_starts_with_sentinel() {
        let table = CurveTable::new();
        assert_eq!(table.len(), 1);
        assert!(table.is_empty());
        assert!(table.get(0).is_none());
        assert!(table.get(1).is_none());
    }

    #[test]
    fn test_table_add_and_get() {
        let mut table = CurveTable::new();
        let first = table.add([lerp as CurveFn, power2 as CurveFn]);
        assert_eq!(first, 1);

        let func = table.get(2).expect("power2 registered");
        assert_eq!(func(0.0, 10.0, 0.5), 2.5);
        assert!(table.get(3).is_none());
    }

    #[test]
    fn test_table_with_library() {
        let table = CurveTable::with_library();
        assert_eq!(table.len(), 1 + Curve::ALL.len());
        let overshoot_fn = table.get(12).expect("overshoot registered");
        assert_eq!(overshoot_fn(0.0, 10.0, 0.25), power4(0.0, 10.0, 0.5));
    }

    #[test]
    fn test_table_overflow_returns_last_added() {
        let mut table = CurveTable::new();
        let first = table.add(std::iter::repeat(lerp as CurveFn).take(250));
        assert_eq!(first, 1);
        assert_eq!(table.remaining(), 5);

        let index = table.add(std::iter::repeat(power2 as CurveFn).take(10));
        assert_eq!(index, 255);
        assert_eq!(table.len(), CURVE_TABLE_CAPACITY);
        assert!(table.get(255).is_some());

        // Already full: nothing added, last populated index reported
        let index = table.add([power3 as CurveFn]);
        assert_eq!(index, 255);
    }

    #[test]
    fn test_table_clear() {
        let mut table = CurveTable::with_library();
        table.clear();
        assert_eq!(table.len(), 1);
        assert!(table.get(1).is_none());
    }
}

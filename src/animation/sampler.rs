//! Keyframe samplers.
//!
//! A sampler pairs strictly ascending keyframe times with output values and
//! evaluates the animated value at an arbitrary time:
//! - before the first keyframe the first value is held
//! - after the last keyframe the last value is held
//! - between keyframes the interpolation mode decides

use super::interpolation::{hermite, Interpolation, Keyframe};
use crate::accessor::Decoded;
use crate::util::{Error, Result};

/// Times closer than this to a keyframe snap to its value.
pub const KEYFRAME_EPSILON: f32 = 1e-3;

/// Morph target weights, one entry per target.
pub type Weights = Vec<f32>;

/// Keyframe times, output values and an interpolation mode.
#[derive(Clone, Debug, PartialEq)]
pub struct Sampler<T> {
    input: Vec<f32>,
    output: Vec<T>,
    interpolation: Interpolation,
}

impl<T: Keyframe> Sampler<T> {
    /// Validate and build a sampler.
    ///
    /// `input` must be strictly ascending. `output` holds one value per
    /// keyframe, or three (`in`, `value`, `out`) for cubic splines.
    pub fn new(input: Vec<f32>, output: Vec<T>, interpolation: Interpolation) -> Result<Self> {
        // `!(a < b)` also rejects NaN.
        if let Some(i) = input.windows(2).position(|w| !(w[0] < w[1])) {
            return Err(Error::NotAscending { index: i + 1 });
        }
        if input.iter().any(|t| t.is_nan()) {
            return Err(Error::NotAscending { index: 0 });
        }
        let expected = input.len() * interpolation.output_multiplier();
        if output.len() != expected {
            return Err(Error::OutputLength { expected, actual: output.len() });
        }
        if let Some(arity) = output.first().and_then(T::arity) {
            if let Some(i) = output.iter().position(|v| v.arity() != Some(arity)) {
                return Err(Error::invalid(format!(
                    "output value {} has {} components, expected {}",
                    i,
                    output[i].arity().unwrap_or(0),
                    arity
                )));
            }
        }
        Ok(Self { input, output, interpolation })
    }

    pub fn linear(input: Vec<f32>, output: Vec<T>) -> Result<Self> {
        Self::new(input, output, Interpolation::Linear)
    }

    pub fn step(input: Vec<f32>, output: Vec<T>) -> Result<Self> {
        Self::new(input, output, Interpolation::Step)
    }

    /// `output` is laid out `[in_0, v_0, out_0, in_1, v_1, out_1, ...]`.
    pub fn cubic_spline(input: Vec<f32>, output: Vec<T>) -> Result<Self> {
        Self::new(input, output, Interpolation::CubicSpline)
    }

    /// Build from decoded input (SCALAR times) and output accessors.
    pub fn from_decoded(input: &Decoded, output: &Decoded, interpolation: Interpolation) -> Result<Self> {
        let times = input.to_scalars()?;
        let count = times.len() * interpolation.output_multiplier();
        let values = T::from_output(output, count)?;
        Self::new(times, values, interpolation)
    }

    #[inline]
    pub fn input(&self) -> &[f32] {
        &self.input
    }

    #[inline]
    pub fn output(&self) -> &[T] {
        &self.output
    }

    #[inline]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Number of keyframes.
    #[inline]
    pub fn len(&self) -> usize {
        self.input.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Time of the first keyframe.
    pub fn start(&self) -> Option<f32> {
        self.input.first().copied()
    }

    /// Time of the last keyframe.
    pub fn end(&self) -> Option<f32> {
        self.input.last().copied()
    }

    /// Playback length measured from time zero: the last keyframe time, or 0
    /// for an empty sampler.
    pub fn duration(&self) -> f32 {
        self.end().unwrap_or(0.0).max(0.0)
    }

    /// Value at keyframe `k`.
    #[inline]
    pub fn value(&self, k: usize) -> &T {
        match self.interpolation {
            Interpolation::CubicSpline => &self.output[3 * k + 1],
            _ => &self.output[k],
        }
    }

    /// Largest keyframe index with time <= `time`, clamped to the valid range.
    fn floor_index(&self, time: f32) -> usize {
        self.input.partition_point(|&t| t <= time).saturating_sub(1)
    }

    /// Evaluate at `time`. `None` only when there are no keyframes.
    pub fn sample(&self, time: f32) -> Option<T> {
        let n = self.input.len();
        if n == 0 {
            return None;
        }
        let first = self.input[0];
        let last = self.input[n - 1];
        if n == 1 || time.is_nan() || time <= first {
            return Some(self.value(0).clone());
        }
        if time >= last {
            return Some(self.value(n - 1).clone());
        }

        let k = self.floor_index(time);
        let (t1, t2) = (self.input[k], self.input[k + 1]);
        if (time - t1).abs() < KEYFRAME_EPSILON {
            return Some(self.value(k).clone());
        }

        let h = t2 - t1;
        let f = (time - t1) / h;
        let value = match self.interpolation {
            Interpolation::Step => self.value(k).clone(),
            Interpolation::Linear => self.value(k).lerp(self.value(k + 1), f),
            Interpolation::CubicSpline => {
                let out1 = &self.output[3 * k + 2];
                let in2 = &self.output[3 * (k + 1)];
                hermite(self.value(k), out1, self.value(k + 1), in2, f, h)
            }
        };
        Some(value)
    }

    /// Evaluate at `time`, falling back to `default` when empty.
    pub fn sample_or(&self, time: f32, default: T) -> T {
        self.sample(time).unwrap_or(default)
    }
}

impl Sampler<Weights> {
    /// Morph weight sampler from flat output values.
    ///
    /// The number of targets is `values.len() / (keyframes * multiplier)`.
    pub fn from_flat(input: Vec<f32>, values: &[f32], interpolation: Interpolation) -> Result<Self> {
        let count = input.len() * interpolation.output_multiplier();
        let output = if count == 0 {
            if !values.is_empty() {
                return Err(Error::OutputLength { expected: 0, actual: values.len() });
            }
            Vec::new()
        } else {
            if values.is_empty() || values.len() % count != 0 {
                return Err(Error::OutputLength { expected: count, actual: values.len() });
            }
            values.chunks_exact(values.len() / count).map(<[f32]>::to_vec).collect()
        };
        Self::new(input, output, interpolation)
    }

    /// Number of morph targets per keyframe.
    pub fn num_targets(&self) -> usize {
        self.output.first().map_or(0, Vec::len)
    }
}

//! Channels bind samplers to node properties; timelines group channels.

use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;

use super::interpolation::Interpolation;
use super::sampler::{Sampler, Weights};
use crate::accessor::Decoded;
use crate::util::{Error, Quat, Result, Vec3};

/// Node property driven by a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetProperty {
    Translation,
    Rotation,
    Scale,
    Weights,
}

impl TargetProperty {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Translation => "translation",
            Self::Rotation => "rotation",
            Self::Scale => "scale",
            Self::Weights => "weights",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "translation" => Ok(Self::Translation),
            "rotation" => Ok(Self::Rotation),
            "scale" => Ok(Self::Scale),
            "weights" => Ok(Self::Weights),
            other => Err(Error::unsupported(format!("target path {:?}", other))),
        }
    }
}

impl fmt::Display for TargetProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared sampler typed by the property it drives.
///
/// Samplers are reference counted so several channels can share one.
#[derive(Clone, Debug)]
pub enum ChannelSampler {
    Translation(Arc<Sampler<Vec3>>),
    Rotation(Arc<Sampler<Quat>>),
    Scale(Arc<Sampler<Vec3>>),
    Weights(Arc<Sampler<Weights>>),
}

impl ChannelSampler {
    /// Build the sampler for `property` from decoded input/output accessors.
    pub fn from_decoded(
        property: TargetProperty,
        input: &Decoded,
        output: &Decoded,
        interpolation: Interpolation,
    ) -> Result<Self> {
        Ok(match property {
            TargetProperty::Translation => {
                Self::Translation(Arc::new(Sampler::from_decoded(input, output, interpolation)?))
            }
            TargetProperty::Rotation => Self::Rotation(Arc::new(Sampler::from_decoded(input, output, interpolation)?)),
            TargetProperty::Scale => Self::Scale(Arc::new(Sampler::from_decoded(input, output, interpolation)?)),
            TargetProperty::Weights => Self::Weights(Arc::new(Sampler::from_decoded(input, output, interpolation)?)),
        })
    }

    pub fn property(&self) -> TargetProperty {
        match self {
            Self::Translation(_) => TargetProperty::Translation,
            Self::Rotation(_) => TargetProperty::Rotation,
            Self::Scale(_) => TargetProperty::Scale,
            Self::Weights(_) => TargetProperty::Weights,
        }
    }

    pub fn duration(&self) -> f32 {
        match self {
            Self::Translation(s) | Self::Scale(s) => s.duration(),
            Self::Rotation(s) => s.duration(),
            Self::Weights(s) => s.duration(),
        }
    }

    pub fn sample(&self, time: f32) -> Option<ChannelValue> {
        match self {
            Self::Translation(s) => s.sample(time).map(ChannelValue::Translation),
            Self::Rotation(s) => s.sample(time).map(ChannelValue::Rotation),
            Self::Scale(s) => s.sample(time).map(ChannelValue::Scale),
            Self::Weights(s) => s.sample(time).map(ChannelValue::Weights),
        }
    }
}

/// A sampled property value.
#[derive(Clone, Debug, PartialEq)]
pub enum ChannelValue {
    Translation(Vec3),
    Rotation(Quat),
    Scale(Vec3),
    Weights(Weights),
}

impl ChannelValue {
    pub fn property(&self) -> TargetProperty {
        match self {
            Self::Translation(_) => TargetProperty::Translation,
            Self::Rotation(_) => TargetProperty::Rotation,
            Self::Scale(_) => TargetProperty::Scale,
            Self::Weights(_) => TargetProperty::Weights,
        }
    }
}

/// Binds one sampler to one property of one node.
#[derive(Clone, Debug)]
pub struct Channel {
    pub node: usize,
    pub sampler: ChannelSampler,
}

impl Channel {
    pub fn new(node: usize, sampler: ChannelSampler) -> Self {
        Self { node, sampler }
    }

    pub fn translation(node: usize, sampler: Arc<Sampler<Vec3>>) -> Self {
        Self::new(node, ChannelSampler::Translation(sampler))
    }

    pub fn rotation(node: usize, sampler: Arc<Sampler<Quat>>) -> Self {
        Self::new(node, ChannelSampler::Rotation(sampler))
    }

    pub fn scale(node: usize, sampler: Arc<Sampler<Vec3>>) -> Self {
        Self::new(node, ChannelSampler::Scale(sampler))
    }

    pub fn weights(node: usize, sampler: Arc<Sampler<Weights>>) -> Self {
        Self::new(node, ChannelSampler::Weights(sampler))
    }

    #[inline]
    pub fn property(&self) -> TargetProperty {
        self.sampler.property()
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.sampler.duration()
    }

    /// Sampled value at `time`, or `None` if the sampler has no keyframes.
    pub fn sample(&self, time: f32) -> Option<ChannelValue> {
        self.sampler.sample(time)
    }
}

/// One sampled channel: the node and the value for its property.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelSample {
    pub node: usize,
    pub value: ChannelValue,
}

/// A named animation: an ordered set of channels played together.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    pub name: String,
    channels: Vec<Channel>,
}

impl Timeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), channels: Vec::new() }
    }

    pub fn with_channels(name: impl Into<String>, channels: Vec<Channel>) -> Self {
        Self { name: name.into(), channels }
    }

    pub fn push(&mut self, channel: Channel) {
        self.channels.push(channel);
    }

    #[inline]
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Longest channel duration; 0 with no channels.
    pub fn duration(&self) -> f32 {
        self.channels.iter().map(Channel::duration).fold(0.0, f32::max)
    }

    /// Sample every channel at `time`, in channel order.
    ///
    /// Channels with empty samplers are skipped.
    pub fn sample(&self, time: f32) -> Vec<ChannelSample> {
        self.channels
            .iter()
            .filter_map(|c| c.sample(time).map(|value| ChannelSample { node: c.node, value }))
            .collect()
    }

    /// Same as [`sample`](Self::sample), spread across the rayon pool.
    pub fn par_sample(&self, time: f32) -> Vec<ChannelSample> {
        self.channels
            .par_iter()
            .filter_map(|c| c.sample(time).map(|value| ChannelSample { node: c.node, value }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounce() -> Arc<Sampler<Vec3>> {
        Arc::new(Sampler::linear(vec![0.0, 1.0, 2.0], vec![Vec3::ZERO, Vec3::Y, Vec3::ZERO]).unwrap())
    }

    #[test]
    fn test_property_names() {
        for p in [TargetProperty::Translation, TargetProperty::Rotation, TargetProperty::Scale, TargetProperty::Weights] {
            assert_eq!(TargetProperty::from_name(p.name()).unwrap(), p);
        }
        assert!(TargetProperty::from_name("pointer").is_err());
    }

    #[test]
    fn test_shared_sampler() {
        let sampler = bounce();
        let a = Channel::translation(0, Arc::clone(&sampler));
        let b = Channel::scale(1, Arc::clone(&sampler));
        assert_eq!(Arc::strong_count(&sampler), 3);
        assert_eq!(a.sample(1.0), Some(ChannelValue::Translation(Vec3::Y)));
        assert_eq!(b.sample(1.0), Some(ChannelValue::Scale(Vec3::Y)));
        assert_eq!(b.property(), TargetProperty::Scale);
    }

    #[test]
    fn test_timeline_duration() {
        let mut timeline = Timeline::new("walk");
        assert_eq!(timeline.duration(), 0.0);

        timeline.push(Channel::translation(0, bounce()));
        let spin = Sampler::linear(vec![0.0, 3.5], vec![Quat::IDENTITY, Quat::IDENTITY]).unwrap();
        timeline.push(Channel::rotation(0, Arc::new(spin)));
        assert_eq!(timeline.duration(), 3.5);
        assert_eq!(timeline.len(), 2);
    }

    #[test]
    fn test_timeline_sample() {
        let empty: Sampler<Weights> = Sampler::linear(vec![], vec![]).unwrap();
        let weights = Sampler::<Weights>::from_flat(vec![0.0, 2.0], &[0.0, 1.0, 1.0, 0.0], Interpolation::Linear).unwrap();
        let timeline = Timeline::with_channels(
            "morph",
            vec![
                Channel::translation(3, bounce()),
                Channel::weights(4, Arc::new(empty)),
                Channel::weights(5, Arc::new(weights)),
            ],
        );

        let samples = timeline.sample(0.5);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0], ChannelSample { node: 3, value: ChannelValue::Translation(Vec3::new(0.0, 0.5, 0.0)) });
        assert_eq!(samples[1], ChannelSample { node: 5, value: ChannelValue::Weights(vec![0.25, 0.75]) });

        assert_eq!(timeline.par_sample(0.5), samples);
    }
}

// ABOUTME: Sample batch data model
// ABOUTME: One capture cycle of per-channel voltage samples and intervals

/// Index of a waveform input channel
pub type ChannelId = usize;

/// Samples captured on a single channel during one acquisition cycle
///
/// An empty sample vector means the channel is disabled for this batch and
/// must be excluded from every encoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelSamples {
    /// Sampling interval in seconds (may be zero when undefined)
    pub interval: f64,
    /// Voltage samples in capture order
    pub samples: Vec<f64>,
}

impl ChannelSamples {
    /// Create channel data from an interval and its samples
    pub fn new(interval: f64, samples: Vec<f64>) -> Self {
        Self { interval, samples }
    }

    /// Create an inactive channel (no samples this cycle)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of samples in this cycle
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the channel is disabled for this batch
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample rate in Hz derived from the interval
    ///
    /// A zero or negative interval yields rate 0 so both wire formats stay
    /// deterministic.
    pub fn rate(&self) -> f64 {
        if self.interval > 0.0 {
            1.0 / self.interval
        } else {
            0.0
        }
    }
}

/// One delivery of samples across all channels for a single acquisition cycle
///
/// Immutable once produced; the broadcast path only borrows it for the
/// duration of one encode.
#[derive(Debug, Clone, Default)]
pub struct SampleBatch {
    channels: Vec<ChannelSamples>,
}

impl SampleBatch {
    /// Create a batch from per-channel data, indexed by channel id
    pub fn new(channels: Vec<ChannelSamples>) -> Self {
        Self { channels }
    }

    /// Total number of channels in the batch, active or not
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Data for a single channel, if present in the batch
    pub fn channel(&self, channel: ChannelId) -> Option<&ChannelSamples> {
        self.channels.get(channel)
    }

    /// Iterate all channels with their ids
    pub fn iter(&self) -> impl Iterator<Item = (ChannelId, &ChannelSamples)> {
        self.channels.iter().enumerate()
    }

    /// Iterate only channels that carry samples this cycle
    pub fn active_channels(&self) -> impl Iterator<Item = (ChannelId, &ChannelSamples)> {
        self.iter().filter(|(_, data)| !data.is_empty())
    }

    /// Whether no channel carries samples this cycle
    pub fn is_silent(&self) -> bool {
        self.active_channels().next().is_none()
    }
}

// ABOUTME: Sample source abstraction for the demo binary
// ABOUTME: Stands in for the acquisition pipeline with a synthetic signal

use crate::capture::{ChannelSamples, SampleBatch};
use std::f64::consts::PI;

/// Trait for batch producers feeding the capture engine
pub trait SampleSource: Send {
    /// Produce the next batch of samples across all channels
    fn next_batch(&mut self) -> SampleBatch;

    /// Number of channels this source captures
    fn channel_count(&self) -> usize;

    /// Sample rate in Hz
    fn sample_rate(&self) -> f64;
}

/// Synthetic sine-wave source
///
/// Generates phase-continuous sine batches, with each channel shifted a
/// quarter period from the previous one so multi-channel output is visibly
/// distinct on a client.
pub struct TestSignalSource {
    frequency: f64,
    sample_rate: f64,
    channels: usize,
    samples_per_batch: usize,
    amplitude: f64,
    phase: f64,
}

impl TestSignalSource {
    /// Create a sine source
    ///
    /// # Arguments
    /// * `frequency` - Signal frequency in Hz (e.g. 1000.0)
    /// * `sample_rate` - Simulated sample rate in Hz
    /// * `channels` - Number of simulated channels
    /// * `samples_per_batch` - Samples per channel per acquisition cycle
    pub fn new(frequency: f64, sample_rate: f64, channels: usize, samples_per_batch: usize) -> Self {
        Self {
            frequency,
            sample_rate,
            channels,
            samples_per_batch,
            // Volts, roughly a typical probe signal
            amplitude: 2.0,
            phase: 0.0,
        }
    }

    /// Set the peak amplitude in volts
    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }
}

impl SampleSource for TestSignalSource {
    fn next_batch(&mut self) -> SampleBatch {
        let interval = if self.sample_rate > 0.0 {
            1.0 / self.sample_rate
        } else {
            0.0
        };
        let phase_increment = 2.0 * PI * self.frequency * interval;

        let channels = (0..self.channels)
            .map(|channel| {
                let offset = channel as f64 * PI / 2.0;
                let samples = (0..self.samples_per_batch)
                    .map(|n| (self.phase + offset + n as f64 * phase_increment).sin() * self.amplitude)
                    .collect();
                ChannelSamples::new(interval, samples)
            })
            .collect();

        self.phase += self.samples_per_batch as f64 * phase_increment;
        self.phase %= 2.0 * PI;

        SampleBatch::new(channels)
    }

    fn channel_count(&self) -> usize {
        self.channels
    }

    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

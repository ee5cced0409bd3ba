// ABOUTME: Frame encoders for the two wire formats
// ABOUTME: CSV-like text frames and fixed-layout big-endian binary frames

use crate::capture::SampleBatch;
use crate::exporter::ExportSettings;
use crate::server::tracker::ChannelStateTracker;
use std::fmt::Write as _;
use std::sync::Arc;

/// Wire format a server instance speaks, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// Self-describing CSV-like text stream with conditional header lines
    Text,
    /// Compact fixed-layout binary frames, big-endian throughout
    Binary,
}

impl std::fmt::Display for WireFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireFormat::Text => write!(f, "text"),
            WireFormat::Binary => write!(f, "binary"),
        }
    }
}

/// Trait for frame encoders
///
/// One encoder instance exists per server and is invoked once per batch;
/// the resulting buffer is broadcast verbatim to every connection.
pub trait FrameEncoder: Send {
    /// Encode a batch into one wire frame, stamped with `timestamp_ms`
    fn encode(&mut self, batch: &SampleBatch, timestamp_ms: i64) -> Vec<u8>;

    /// The wire format this encoder produces
    fn format(&self) -> WireFormat;

    /// Ask for a header with the next frame, where the format has one
    fn request_header(&mut self) {}
}

/// Text frame encoder
///
/// Emits an optional header line naming each active channel and its sample
/// count, then a data line with the timestamp, per-channel rate, and every
/// sample, each field followed by a comma. Channels without samples produce
/// no columns at all.
pub struct TextEncoder {
    settings: Arc<ExportSettings>,
    tracker: ChannelStateTracker,
}

impl TextEncoder {
    /// Create a text encoder resolving display names from `settings`
    pub fn new(settings: Arc<ExportSettings>) -> Self {
        Self {
            settings,
            tracker: ChannelStateTracker::new(),
        }
    }
}

impl FrameEncoder for TextEncoder {
    fn encode(&mut self, batch: &SampleBatch, timestamp_ms: i64) -> Vec<u8> {
        let mut out = String::new();

        if self.tracker.needs_header(batch) {
            out.push_str("#timestamp,");
            for (channel, data) in batch.active_channels() {
                let name = self.settings.channel_name(channel);
                let _ = write!(out, "{} sample rate,<{} {} samples>,", name, data.len(), name);
            }
            out.push('\n');
        }

        let _ = write!(out, "{}.{:03},", timestamp_ms / 1000, timestamp_ms % 1000);
        for (_, data) in batch.active_channels() {
            let _ = write!(out, "{},", data.rate());
            for sample in &data.samples {
                let _ = write!(out, "{},", sample);
            }
        }
        out.push('\n');

        out.into_bytes()
    }

    fn format(&self) -> WireFormat {
        WireFormat::Text
    }

    fn request_header(&mut self) {
        self.tracker.request_header();
    }
}

/// Binary frame encoder
///
/// Layout, all multi-byte values big-endian:
///
/// ```text
/// i64   timestamp_ms      milliseconds since the Unix epoch
/// i32   channel_count     channels with samples, not total channels
/// repeated channel_count times:
///   f32 sample_rate       1 / interval
///   i32 sample_count
///   f32 x sample_count    voltage samples in channel order
/// ```
///
/// No header, footer, checksum, or version field; the protocol is positional
/// and versioned out-of-band.
#[derive(Debug, Default)]
pub struct BinaryEncoder;

impl BinaryEncoder {
    /// Create a binary encoder
    pub fn new() -> Self {
        Self
    }
}

impl FrameEncoder for BinaryEncoder {
    fn encode(&mut self, batch: &SampleBatch, timestamp_ms: i64) -> Vec<u8> {
        let payload: usize = batch
            .active_channels()
            .map(|(_, data)| 8 + data.len() * 4)
            .sum();
        let mut out = Vec::with_capacity(12 + payload);

        out.extend_from_slice(&timestamp_ms.to_be_bytes());
        out.extend_from_slice(&(batch.active_channels().count() as i32).to_be_bytes());

        for (_, data) in batch.active_channels() {
            out.extend_from_slice(&(data.rate() as f32).to_be_bytes());
            out.extend_from_slice(&(data.len() as i32).to_be_bytes());
            for &sample in &data.samples {
                out.extend_from_slice(&(sample as f32).to_be_bytes());
            }
        }

        out
    }

    fn format(&self) -> WireFormat {
        WireFormat::Binary
    }
}

/// Create the encoder for the given wire format
pub fn create_encoder(format: WireFormat, settings: Arc<ExportSettings>) -> Box<dyn FrameEncoder> {
    match format {
        WireFormat::Text => Box::new(TextEncoder::new(settings)),
        WireFormat::Binary => Box::new(BinaryEncoder::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::ChannelSamples;

    fn scope_settings() -> Arc<ExportSettings> {
        Arc::new(ExportSettings::new(vec!["Ch0".to_string(), "Ch1".to_string()]))
    }

    fn two_channel_batch() -> SampleBatch {
        SampleBatch::new(vec![
            ChannelSamples::new(0.001, vec![0.5, -0.25, 1.0]),
            ChannelSamples::empty(),
        ])
    }

    #[test]
    fn test_text_first_frame_carries_header() {
        let mut encoder = TextEncoder::new(scope_settings());
        let frame = encoder.encode(&two_channel_batch(), 1_700_000_000_123);
        let text = String::from_utf8(frame).unwrap();

        assert_eq!(
            text,
            "#timestamp,Ch0 sample rate,<3 Ch0 samples>,\n\
             1700000000.123,1000,0.5,-0.25,1,\n"
        );
    }

    #[test]
    fn test_text_steady_state_drops_header() {
        let mut encoder = TextEncoder::new(scope_settings());
        encoder.encode(&two_channel_batch(), 1_700_000_000_123);

        let frame = encoder.encode(&two_channel_batch(), 1_700_000_001_007);
        let text = String::from_utf8(frame).unwrap();

        assert_eq!(text, "1700000001.007,1000,0.5,-0.25,1,\n");
    }

    #[test]
    fn test_text_requested_header_reappears() {
        let mut encoder = TextEncoder::new(scope_settings());
        encoder.encode(&two_channel_batch(), 1);

        encoder.request_header();
        let frame = encoder.encode(&two_channel_batch(), 2);
        let text = String::from_utf8(frame).unwrap();

        assert!(text.starts_with("#timestamp,Ch0 sample rate,"));
    }

    #[test]
    fn test_text_silent_batch_is_well_formed() {
        let mut encoder = TextEncoder::new(scope_settings());
        let silent = SampleBatch::new(vec![ChannelSamples::empty(), ChannelSamples::empty()]);

        let frame = encoder.encode(&silent, 42_000);
        let text = String::from_utf8(frame).unwrap();

        // Header is due (first batch) but names no channels.
        assert_eq!(text, "#timestamp,\n42.000,\n");
    }

    #[test]
    fn test_text_zero_interval_rate() {
        let mut encoder = TextEncoder::new(scope_settings());
        let batch = SampleBatch::new(vec![ChannelSamples::new(0.0, vec![1.5])]);

        let frame = encoder.encode(&batch, 1_000);
        let text = String::from_utf8(frame).unwrap();

        assert!(text.ends_with("1.000,0,1.5,\n"));
    }

    #[test]
    fn test_binary_layout_round_trip() {
        let mut encoder = BinaryEncoder::new();
        let frame = encoder.encode(&two_channel_batch(), 1_700_000_000_123);

        // Empty channel 1 consumes no slot: header + one channel block.
        assert_eq!(frame.len(), 12 + 8 + 3 * 4);

        let timestamp = i64::from_be_bytes(frame[0..8].try_into().unwrap());
        assert_eq!(timestamp, 1_700_000_000_123);

        let channel_count = i32::from_be_bytes(frame[8..12].try_into().unwrap());
        assert_eq!(channel_count, 1);

        let rate = f32::from_be_bytes(frame[12..16].try_into().unwrap());
        assert_eq!(rate, 1000.0);

        let sample_count = i32::from_be_bytes(frame[16..20].try_into().unwrap());
        assert_eq!(sample_count, 3);

        let samples: Vec<f32> = frame[20..]
            .chunks_exact(4)
            .map(|chunk| f32::from_be_bytes(chunk.try_into().unwrap()))
            .collect();
        assert_eq!(samples, vec![0.5, -0.25, 1.0]);
    }

    #[test]
    fn test_binary_silent_batch() {
        let mut encoder = BinaryEncoder::new();
        let silent = SampleBatch::new(vec![ChannelSamples::empty()]);

        let frame = encoder.encode(&silent, 99);
        assert_eq!(frame.len(), 12);
        assert_eq!(i32::from_be_bytes(frame[8..12].try_into().unwrap()), 0);
    }

    #[test]
    fn test_binary_header_request_is_ignored() {
        let mut encoder = BinaryEncoder::new();
        encoder.request_header();

        let frame = encoder.encode(&two_channel_batch(), 7);
        assert_eq!(i64::from_be_bytes(frame[0..8].try_into().unwrap()), 7);
    }

    #[test]
    fn test_create_encoder_formats() {
        let settings = scope_settings();
        assert_eq!(
            create_encoder(WireFormat::Text, Arc::clone(&settings)).format(),
            WireFormat::Text
        );
        assert_eq!(
            create_encoder(WireFormat::Binary, settings).format(),
            WireFormat::Binary
        );
    }
}

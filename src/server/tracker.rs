// ABOUTME: Per-channel state tracker for text-mode framing
// ABOUTME: Decides when the CSV header line must be re-emitted

use crate::capture::{ChannelId, SampleBatch};
use std::collections::HashMap;

/// Last observed shape of one channel
#[derive(Debug, Clone, Copy, PartialEq)]
struct ChannelState {
    sample_count: usize,
    interval: f64,
}

/// Tracks per-channel sample counts and intervals across batches
///
/// The text encoder consults this before every frame: a header is due when
/// any active channel's shape changed since the last batch, when no batch has
/// been seen yet, or when a header was explicitly requested (a client joined
/// mid-stream). Channels with zero samples are skipped entirely; their stored
/// state stays untouched, so a channel that goes silent and later resumes
/// with an identical shape does not re-trigger a header.
///
/// Not safe for concurrent batches; callers serialize submissions.
#[derive(Debug, Default)]
pub struct ChannelStateTracker {
    states: HashMap<ChannelId, ChannelState>,
    initialized: bool,
    header_requested: bool,
}

impl ChannelStateTracker {
    /// Create a tracker with no recorded state
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the next `needs_header` call to report true
    pub fn request_header(&mut self) {
        self.header_requested = true;
    }

    /// Whether the next text frame must carry a header, updating stored
    /// state to match `batch`
    pub fn needs_header(&mut self, batch: &SampleBatch) -> bool {
        let requested = std::mem::take(&mut self.header_requested);

        if !self.initialized {
            self.initialized = true;
            for (channel, data) in batch.active_channels() {
                self.states.insert(
                    channel,
                    ChannelState {
                        sample_count: data.len(),
                        interval: data.interval,
                    },
                );
            }
            return true;
        }

        let mut changed = requested;
        for (channel, data) in batch.active_channels() {
            let current = ChannelState {
                sample_count: data.len(),
                interval: data.interval,
            };
            match self.states.get(&channel) {
                Some(previous) if *previous == current => {}
                _ => {
                    self.states.insert(channel, current);
                    changed = true;
                }
            }
        }

        changed
    }
}

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::wire::{ChannelId, SyncMessage};

#[derive(Debug, Clone, Default)]
pub struct LinkConditions {
    pub loss_percent: f32,
    pub min_latency_ms: u32,
    pub max_latency_ms: u32,
    pub jitter_ms: u32,
}

impl LinkConditions {
    fn drops(&self, roll: f32) -> bool {
        self.loss_percent > 0.0 && roll < self.loss_percent / 100.0
    }

    fn delay_secs(&self, latency_roll: f32, jitter_roll: f32) -> f64 {
        if self.max_latency_ms == 0 && self.jitter_ms == 0 {
            return 0.0;
        }
        let range = self.max_latency_ms.saturating_sub(self.min_latency_ms);
        let jitter = if self.jitter_ms > 0 {
            (jitter_roll * self.jitter_ms as f32) as u32
        } else {
            0
        };
        (self.min_latency_ms + (latency_roll * range as f32) as u32 + jitter) as f64 / 1000.0
    }
}

#[derive(Debug)]
struct DelayedMessage {
    release_time: f64,
    remote_timestamp: f64,
    bytes: Vec<u8>,
}

impl PartialEq for DelayedMessage {
    fn eq(&self, other: &Self) -> bool {
        self.release_time == other.release_time
    }
}

impl Eq for DelayedMessage {}

impl PartialOrd for DelayedMessage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DelayedMessage {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other.release_time.total_cmp(&self.release_time)
    }
}

/// One direction of an in-process transport with configurable loss and
/// delay, driven by the simulation clock rather than wall time. Every
/// message carries the sender's clock at send time; `recv` hands that stamp
/// back with the payload, and the driver builds snapshot timestamps from it.
///
/// Loss and delay rolls are mixed from the simulation clock and a draw
/// counter, so a session replayed with the same send times sees the same
/// drops and delays.
#[derive(Debug, Default)]
pub struct LossyLink {
    conditions: LinkConditions,
    queue: BinaryHeap<DelayedMessage>,
    draws: u64,
    messages_sent: u64,
    messages_dropped: u64,
}

impl LossyLink {
    pub fn new(conditions: LinkConditions) -> Self {
        Self {
            conditions,
            queue: BinaryHeap::new(),
            draws: 0,
            messages_sent: 0,
            messages_dropped: 0,
        }
    }

    pub fn set_conditions(&mut self, conditions: LinkConditions) {
        self.conditions = conditions;
    }

    pub fn send(&mut self, local_time: f64, channel: ChannelId, message: &SyncMessage) {
        self.messages_sent += 1;

        // Loss only applies to the unreliable channel.
        if channel == ChannelId::Unreliable {
            let roll = self.roll(local_time);
            if self.conditions.drops(roll) {
                self.messages_dropped += 1;
                return;
            }
        }

        let bytes = match message.serialize() {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("dropping unserializable message: {err}");
                self.messages_dropped += 1;
                return;
            }
        };

        let latency_roll = self.roll(local_time);
        let jitter_roll = self.roll(local_time);
        self.queue.push(DelayedMessage {
            release_time: local_time + self.conditions.delay_secs(latency_roll, jitter_roll),
            remote_timestamp: local_time,
            bytes,
        });
    }

    pub fn recv(&mut self, local_time: f64) -> Vec<(f64, SyncMessage)> {
        let mut messages = Vec::new();
        while let Some(delayed) = self.queue.peek() {
            if delayed.release_time > local_time {
                break;
            }
            let delayed = self.queue.pop().unwrap();
            match SyncMessage::deserialize(&delayed.bytes) {
                Ok(message) => messages.push((delayed.remote_timestamp, message)),
                Err(err) => log::warn!("discarding malformed message: {err}"),
            }
        }
        messages
    }

    pub fn in_flight(&self) -> usize {
        self.queue.len()
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent
    }

    pub fn messages_dropped(&self) -> u64 {
        self.messages_dropped
    }

    // One value in [0, 1), mixed from the clock bits and the draw counter.
    fn roll(&mut self, local_time: f64) -> f32 {
        self.draws = self.draws.wrapping_add(1);

        let mut z = local_time.to_bits() ^ self.draws.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;

        (z % 10_000) as f32 / 10_000.0
    }
}

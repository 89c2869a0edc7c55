use serde::{Deserialize, Serialize};

use crate::net::ChannelId;

pub const DEFAULT_SEND_INTERVAL: f32 = 0.1;
pub const DEFAULT_BUFFER_TIME_MULTIPLIER: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// When set, the owning client asserts the canonical pose and the
    /// server interpolates; otherwise the server is canonical.
    pub client_authority: bool,
    pub channel: ChannelId,
    /// Seconds between outbound snapshots, in [0, 1].
    pub send_interval: f32,
    /// Playback delay in send intervals; at least 1.
    pub buffer_time_multiplier: u32,
    pub sync_position: bool,
    pub sync_rotation: bool,
    pub sync_scale: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            client_authority: false,
            channel: ChannelId::Unreliable,
            send_interval: DEFAULT_SEND_INTERVAL,
            buffer_time_multiplier: DEFAULT_BUFFER_TIME_MULTIPLIER,
            sync_position: true,
            sync_rotation: true,
            sync_scale: true,
        }
    }
}

impl SyncConfig {
    pub fn buffer_time(&self) -> f64 {
        self.send_interval as f64 * self.buffer_time_multiplier.max(1) as f64
    }
}

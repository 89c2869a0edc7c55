mod config;
mod scheduler;
mod stats;

pub use config::{DEFAULT_BUFFER_TIME_MULTIPLIER, DEFAULT_SEND_INTERVAL, SyncConfig};
pub use scheduler::SendScheduler;
pub use stats::SyncStats;

use bitflags::bitflags;

use crate::interp::{InterpolationState, compute};
use crate::net::{ChannelId, SyncMessage, TransformState};
use crate::snapshot::{Snapshot, SnapshotBuffer, Transform};

bitflags! {
    /// What the local node is with respect to this entity. Host mode is
    /// `SERVER | CLIENT`; `OWNER` marks the locally-owned entity.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NodeRole: u8 {
        const SERVER = 1 << 0;
        const CLIENT = 1 << 1;
        const OWNER = 1 << 2;
    }
}

// The message variant carries the direction; callers hand it to their
// transport unchanged.
#[derive(Debug, Clone)]
pub struct OutboundSnapshot {
    pub channel: ChannelId,
    pub message: SyncMessage,
}

/// Per-entity transform sync driver. Runs two independent interpolation
/// machines: one over client-sourced snapshots (consumed on the server
/// under client authority) and one over server-sourced snapshots (consumed
/// on every non-host client). They share nothing but the kernel.
#[derive(Debug)]
pub struct TransformSync {
    config: SyncConfig,
    role: NodeRole,
    client_snapshots: SnapshotBuffer,
    client_interp: InterpolationState,
    server_snapshots: SnapshotBuffer,
    server_interp: InterpolationState,
    server_send: SendScheduler,
    client_send: SendScheduler,
    last_tick_time: Option<f64>,
    stats: SyncStats,
}

impl TransformSync {
    pub fn new(config: SyncConfig, role: NodeRole) -> Self {
        let server_send = SendScheduler::new(config.send_interval);
        let client_send = SendScheduler::new(config.send_interval);

        Self {
            config,
            role,
            client_snapshots: SnapshotBuffer::new(),
            client_interp: InterpolationState::new(),
            server_snapshots: SnapshotBuffer::new(),
            server_interp: InterpolationState::new(),
            server_send,
            client_send,
            last_tick_time: None,
            stats: SyncStats::default(),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn set_role(&mut self, role: NodeRole) {
        self.role = role;
    }

    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Send gating for the authoritative side, interpolation and pose
    /// application for the other. Returns the snapshot to put on the wire
    /// when the scheduler fired.
    pub fn on_tick(&mut self, local_time: f64, transform: &mut Transform) -> Option<OutboundSnapshot> {
        let delta_time = self
            .last_tick_time
            .map(|prev| (local_time - prev).max(0.0))
            .unwrap_or(0.0);
        self.last_tick_time = Some(local_time);

        if self.role.contains(NodeRole::SERVER) {
            self.server_tick(local_time, delta_time, transform)
        } else if self.role.contains(NodeRole::CLIENT) {
            self.client_tick(local_time, delta_time, transform)
        } else {
            None
        }
    }

    fn server_tick(
        &mut self,
        local_time: f64,
        delta_time: f64,
        transform: &mut Transform,
    ) -> Option<OutboundSnapshot> {
        // The server broadcasts unconditionally; under client authority it
        // is relaying the pose it interpolates from the owner below.
        let mut outbound = None;
        if self.server_send.should_send(local_time) {
            self.server_send.mark_sent(local_time);
            self.stats.snapshots_sent += 1;
            outbound = Some(OutboundSnapshot {
                channel: self.config.channel,
                message: SyncMessage::ServerToClientSync(TransformState::from_transform(transform)),
            });
        }

        if self.config.client_authority && !self.role.contains(NodeRole::OWNER) {
            if let Some(snapshot) = compute(
                self.config.buffer_time(),
                delta_time,
                &mut self.client_interp,
                &mut self.client_snapshots,
            ) {
                self.apply(transform, &snapshot);
            }
        }

        outbound
    }

    fn client_tick(
        &mut self,
        local_time: f64,
        delta_time: f64,
        transform: &mut Transform,
    ) -> Option<OutboundSnapshot> {
        if self.config.client_authority && self.role.contains(NodeRole::OWNER) {
            if self.client_send.should_send(local_time) {
                self.client_send.mark_sent(local_time);
                self.stats.snapshots_sent += 1;
                return Some(OutboundSnapshot {
                    channel: self.config.channel,
                    message: SyncMessage::ClientToServerSync(TransformState::from_transform(
                        transform,
                    )),
                });
            }
            return None;
        }

        if let Some(snapshot) = compute(
            self.config.buffer_time(),
            delta_time,
            &mut self.server_interp,
            &mut self.server_snapshots,
        ) {
            self.apply(transform, &snapshot);
        }

        None
    }

    /// `remote_timestamp` is the transport's per-message remote time; the
    /// wire pose itself carries no timestamp.
    pub fn on_received(&mut self, remote_timestamp: f64, message: &SyncMessage) {
        match message {
            SyncMessage::ClientToServerSync(state) => {
                if !self.role.contains(NodeRole::SERVER) {
                    return;
                }
                if !self.config.client_authority {
                    log::debug!("ignoring client sync for a server-authoritative entity");
                    return;
                }
                Self::admit(
                    &mut self.client_snapshots,
                    &mut self.stats,
                    state.to_snapshot(remote_timestamp),
                );
            }
            SyncMessage::ServerToClientSync(state) => {
                // On a host the server's own broadcast loops back; consuming
                // it would grow this buffer without bound.
                if self.role.contains(NodeRole::SERVER) {
                    return;
                }
                Self::admit(
                    &mut self.server_snapshots,
                    &mut self.stats,
                    state.to_snapshot(remote_timestamp),
                );
            }
        }
    }

    fn admit(buffer: &mut SnapshotBuffer, stats: &mut SyncStats, snapshot: Snapshot) {
        stats.snapshots_received += 1;
        if !buffer.insert_if_new_enough(snapshot) {
            stats.snapshots_rejected += 1;
            log::trace!("rejected stale snapshot at t={}", snapshot.timestamp);
        }
    }

    fn apply(&mut self, transform: &mut Transform, snapshot: &Snapshot) {
        if self.config.sync_position {
            transform.position = snapshot.position;
        }
        if self.config.sync_rotation {
            transform.rotation = snapshot.rotation;
        }
        if self.config.sync_scale {
            transform.scale = snapshot.scale;
        }
        self.stats.poses_applied += 1;
    }

    // As on entity disable/enable. Counters survive.
    pub fn reset(&mut self) {
        self.client_snapshots.clear();
        self.client_interp.reset();
        self.server_snapshots.clear();
        self.server_interp.reset();
        self.server_send.reset();
        self.client_send.reset();
        self.last_tick_time = None;
    }
}

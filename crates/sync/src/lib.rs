pub mod interp;
pub mod math;
pub mod net;
pub mod snapshot;
pub mod sync;

pub use interp::{InterpolationState, compute};
pub use net::{ChannelId, LinkConditions, LossyLink, SyncMessage, TransformState, WireError};
pub use snapshot::{Snapshot, SnapshotBuffer, Transform, interpolate};
pub use sync::{
    DEFAULT_BUFFER_TIME_MULTIPLIER, DEFAULT_SEND_INTERVAL, NodeRole, OutboundSnapshot,
    SendScheduler, SyncConfig, SyncStats, TransformSync,
};

mod link;
mod wire;

pub use link::{LinkConditions, LossyLink};
pub use wire::{ChannelId, SyncMessage, TransformState, WireError};

use glam::{Quat, Vec3};
use rkyv::{Archive, Deserialize, Serialize, rancor};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use crate::snapshot::{Snapshot, Transform};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, SerdeSerialize, SerdeDeserialize, Archive,
    Serialize, Deserialize,
)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub enum ChannelId {
    Reliable,
    #[default]
    Unreliable,
}

/// On-wire pose. Carries no timestamp: the receiver reconstructs it from
/// the transport's per-message remote time, so snapshots batched together
/// share one stamp instead of each paying for eight bytes.
#[derive(Debug, Clone, Copy, Default, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct TransformState {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl TransformState {
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            position: transform.position.into(),
            rotation: [
                transform.rotation.x,
                transform.rotation.y,
                transform.rotation.z,
                transform.rotation.w,
            ],
            scale: transform.scale.into(),
        }
    }

    pub fn to_snapshot(&self, timestamp: f64) -> Snapshot {
        let [x, y, z, w] = self.rotation;

        Snapshot::new(
            timestamp,
            Vec3::from(self.position),
            Quat::from_xyzw(x, y, z, w).normalize(),
            Vec3::from(self.scale),
        )
    }
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum SyncMessage {
    ClientToServerSync(TransformState),
    ServerToClientSync(TransformState),
}

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("serialization failed: {0}")]
    Serialize(rancor::Error),
    #[error("deserialization failed: {0}")]
    Deserialize(rancor::Error),
}

impl SyncMessage {
    pub fn serialize(&self) -> Result<Vec<u8>, WireError> {
        rkyv::to_bytes::<rancor::Error>(self)
            .map(|aligned| aligned.into_vec())
            .map_err(WireError::Serialize)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, WireError> {
        rkyv::from_bytes::<Self, rancor::Error>(data).map_err(WireError::Deserialize)
    }
}

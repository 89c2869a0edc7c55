#[derive(Debug, Clone, Copy, Default)]
pub struct SyncStats {
    pub snapshots_sent: u64,
    pub snapshots_received: u64,
    pub snapshots_rejected: u64,
    pub poses_applied: u64,
}

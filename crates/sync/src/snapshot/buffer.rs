use super::Snapshot;

/// Timestamp-ordered buffer. Once two snapshots are buffered, interpolation
/// over the oldest pair may be underway, so nothing at or before the
/// second-oldest timestamp is admitted: a late arrival landing inside the
/// active pair would steer the motion visibly backward.
#[derive(Debug, Default)]
pub struct SnapshotBuffer {
    snapshots: Vec<Snapshot>,
}

impl SnapshotBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_if_new_enough(&mut self, snapshot: Snapshot) -> bool {
        let admitted = match self.snapshots.len() {
            0 => {
                self.snapshots.push(snapshot);
                true
            }
            1 => {
                if snapshot.timestamp <= self.snapshots[0].timestamp {
                    false
                } else {
                    self.snapshots.push(snapshot);
                    true
                }
            }
            _ => {
                if snapshot.timestamp <= self.snapshots[1].timestamp {
                    false
                } else {
                    match self
                        .snapshots
                        .binary_search_by(|s| s.timestamp.total_cmp(&snapshot.timestamp))
                    {
                        // Equal timestamp already buffered.
                        Ok(_) => false,
                        Err(index) => {
                            self.snapshots.insert(index, snapshot);
                            true
                        }
                    }
                }
            }
        };

        debug_assert!(
            self.snapshots
                .windows(2)
                .all(|w| w[0].timestamp < w[1].timestamp),
            "snapshot buffer keys must be strictly increasing"
        );

        admitted
    }

    pub fn first(&self) -> Option<&Snapshot> {
        self.snapshots.first()
    }

    pub fn second(&self) -> Option<&Snapshot> {
        self.snapshots.get(1)
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn pop_oldest(&mut self) -> Option<Snapshot> {
        if self.snapshots.is_empty() {
            None
        } else {
            Some(self.snapshots.remove(0))
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

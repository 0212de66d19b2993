//! File identifier generation.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use revstore_core::traits::IdGenerator;

/// Generates `<node>-<sequence>-<random>` identifiers.
///
/// The node id separates instances, the sequence separates calls within
/// one instance, and the random part separates restarts of the same node.
#[derive(Debug)]
pub struct NodeIdGenerator {
    node_id: String,
    sequence: AtomicU64,
}

impl NodeIdGenerator {
    /// Create a generator for `node_id`.
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            sequence: AtomicU64::new(0),
        }
    }

    /// The node id embedded in every value.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }
}

impl IdGenerator for NodeIdGenerator {
    fn next_value(&self) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let random = Uuid::new_v4().simple().to_string();
        format!("{}-{:x}-{}", self.node_id, sequence, &random[..12])
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_values_carry_node_and_are_unique() {
        let generator = Arc::new(NodeIdGenerator::new("node7"));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = Arc::clone(&generator);
                std::thread::spawn(move || {
                    (0..250).map(|_| generator.next_value()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for value in handle.join().unwrap() {
                assert!(value.starts_with("node7-"));
                assert!(seen.insert(value));
            }
        }
        assert_eq!(seen.len(), 1000);
    }
}

//! Error types for graph traversal.

use crate::graph::NodeId;

/// Errors reported by graph traversals.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A traversal reached a node that was already on its active path.
    ///
    /// `path` starts and ends at the repeated node, so a self-edge on node 3
    /// is reported as `[3, 3]`.
    #[error("cyclic dependency graph: {}", format_path(.path))]
    CycleDetected {
        /// Node ids forming the cycle.
        path: Vec<NodeId>,
    },
}

impl GraphError {
    /// Number of distinct nodes in the reported cycle.
    pub fn cycle_len(&self) -> usize {
        match self {
            Self::CycleDetected { path } => path.len().saturating_sub(1),
        }
    }
}

fn format_path(path: &[NodeId]) -> String {
    path.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Result alias for fallible graph operations.
pub type Result<T, E = GraphError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_path() {
        let err = GraphError::CycleDetected {
            path: vec![NodeId::from(1), NodeId::from(2), NodeId::from(1)],
        };
        assert_eq!(err.to_string(), "cyclic dependency graph: #1 -> #2 -> #1");
        assert_eq!(err.cycle_len(), 2);
    }

    #[test]
    fn self_loop_has_length_one() {
        let err = GraphError::CycleDetected {
            path: vec![NodeId::from(7), NodeId::from(7)],
        };
        assert_eq!(err.cycle_len(), 1);
    }
}

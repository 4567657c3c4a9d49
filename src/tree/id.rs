//! Node identifier and path allocation
//!
//! Every rule-tree node carries a collision-resistant `id` and a `path`
//! holding the ancestor id chain. Allocation is injectable so hydration can
//! be made reproducible in tests.

use uuid::Uuid;

/// Identifier of one rule-tree node
pub type RuleId = String;

/// Source of fresh node identifiers
///
/// Implementations must be safe to call concurrently from multiple threads;
/// uniqueness is probabilistic, not coordinated.
pub trait IdSource: Send + Sync {
    /// Allocate a fresh identifier
    fn next_id(&self) -> RuleId;
}

/// Default allocator backed by UUID v4
///
/// 122 bits of cryptographically seeded randomness per id; independent
/// hydration calls cannot collide through a shared counter because there is
/// no shared state at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIdSource;

impl IdSource for UuidIdSource {
    fn next_id(&self) -> RuleId {
        Uuid::new_v4().to_string()
    }
}

/// Build a child node's path from its parent's path and its own id
pub fn child_path(parent: &[RuleId], id: &RuleId) -> Vec<RuleId> {
    let mut path = Vec::with_capacity(parent.len() + 1);
    path.extend_from_slice(parent);
    path.push(id.clone());
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let ids = UuidIdSource;
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_child_path_appends() {
        let root = "r".to_string();
        let group = "g".to_string();
        let rule = "x".to_string();

        let group_path = child_path(&[root.clone()], &group);
        assert_eq!(group_path, vec![root.clone(), group.clone()]);

        let rule_path = child_path(&group_path, &rule);
        assert_eq!(rule_path, vec![root, group, rule]);
    }
}

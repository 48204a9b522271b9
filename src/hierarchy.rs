//! Location hierarchy traversal
//!
//! Flattens the owned location forest and validates parent/child kind
//! ordering. Parent links are derived during traversal and never stored
//! on the nodes.
//!
//! Traversal uses an explicit stack, so arbitrarily deep trees cannot
//! overflow the call stack. Output order is unspecified.

use crate::snapshot::HierarchyNode;
use rustc_hash::FxHashMap;

/// A node paired with the id of its parent (`None` for roots)
pub type ParentedNode<'a> = (&'a HierarchyNode, Option<&'a str>);

/// Every node in the forest, each exactly once
pub fn flatten(roots: &[HierarchyNode]) -> Vec<&HierarchyNode> {
    let mut result = Vec::new();
    let mut stack: Vec<&HierarchyNode> = roots.iter().collect();

    while let Some(node) = stack.pop() {
        result.push(node);
        stack.extend(node.children.iter());
    }

    result
}

/// Every node in the forest together with its parent id
pub fn flatten_with_parent(roots: &[HierarchyNode]) -> Vec<ParentedNode<'_>> {
    let mut result = Vec::new();
    let mut stack: Vec<ParentedNode<'_>> = roots.iter().map(|n| (n, None)).collect();

    while let Some((node, parent_id)) = stack.pop() {
        result.push((node, parent_id));
        for child in &node.children {
            stack.push((child, Some(node.id.as_str())));
        }
    }

    result
}

/// Count parent/child pairs whose kinds are not strictly deeper than the parent.
///
/// Pairs whose parent id cannot be resolved are skipped. A child of an
/// unranked kind never violates against a ranked parent.
pub fn count_rank_violations(pairs: &[ParentedNode<'_>]) -> usize {
    let by_id: FxHashMap<&str, &HierarchyNode> =
        pairs.iter().map(|(node, _)| (node.id.as_str(), *node)).collect();

    pairs
        .iter()
        .filter_map(|(node, parent_id)| {
            let parent = by_id.get((*parent_id)?)?;
            Some(node.kind.rank() <= parent.kind.rank())
        })
        .filter(|violates| *violates)
        .count()
}

use std::collections::{HashMap, HashSet};

use crate::error::CloError;

/// Detect cycles in the subtask graph using DFS 3-color.
/// edges: (parent_id, subtask_id) meaning parent lists subtask among its subtasks.
pub fn detect_cycle<'a>(nodes: &[&'a str], edges: &[(&'a str, &'a str)]) -> Result<(), CloError> {
    let mut adj: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
    for &node in nodes {
        adj.entry(node).or_default();
    }
    for &(parent, child) in edges {
        adj.entry(parent).or_default().push(child);
    }

    // 0=white, 1=gray, 2=black
    let mut color: HashMap<&'a str, u8> = adj.keys().map(|&n| (n, 0)).collect();

    let roots: Vec<&'a str> = adj.keys().copied().collect();
    for node in roots {
        if color.get(node) == Some(&0) && has_cycle_dfs(node, &adj, &mut color) {
            return Err(CloError::cycle_detected());
        }
    }
    Ok(())
}

fn has_cycle_dfs<'a>(
    node: &'a str,
    adj: &HashMap<&'a str, Vec<&'a str>>,
    color: &mut HashMap<&'a str, u8>,
) -> bool {
    color.insert(node, 1);
    if let Some(children) = adj.get(node) {
        for &child in children {
            match color.get(child) {
                Some(1) => return true,
                Some(0) | None => {
                    if has_cycle_dfs(child, adj, color) {
                        return true;
                    }
                }
                _ => {}
            }
        }
    }
    color.insert(node, 2);
    false
}

/// Check if making `subtask_id` a subtask of `parent_id` would close a
/// cycle, i.e. whether `parent_id` is reachable from `subtask_id`. Cycles
/// elsewhere in the graph do not matter.
pub fn would_create_cycle<'a>(
    edges: &[(&'a str, &'a str)],
    parent_id: &'a str,
    subtask_id: &'a str,
) -> Result<(), CloError> {
    if reaches(edges, subtask_id, parent_id) {
        return Err(CloError::cycle_detected());
    }
    Ok(())
}

/// Whether `to` can be reached from `from` along edges. A node reaches
/// itself.
pub fn reaches<'a>(edges: &[(&'a str, &'a str)], from: &'a str, to: &'a str) -> bool {
    let mut adj: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
    for &(parent, child) in edges {
        adj.entry(parent).or_default().push(child);
    }

    let mut seen: HashSet<&'a str> = HashSet::new();
    let mut stack = vec![from];
    while let Some(node) = stack.pop() {
        if node == to {
            return true;
        }
        if !seen.insert(node) {
            continue;
        }
        if let Some(children) = adj.get(node) {
            stack.extend(children.iter().copied());
        }
    }
    false
}

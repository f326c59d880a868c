use crate::model::{FamilyGraph, FamilyMember};
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub type NodeIdx = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub member: FamilyMember,
    pub parent: Option<NodeIdx>,
    pub children: Vec<NodeIdx>,
    pub depth: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub attached: usize,
    pub skipped_duplicates: usize,
    pub skipped_cycles: usize,
    pub unreachable: usize,
}

/// Arena-backed rooted tree. Node 0 is the root; every member appears at
/// most once.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<TreeNode>,
    stats: BuildStats,
}

impl Tree {
    fn with_root(member: FamilyMember) -> Self {
        Self {
            nodes: vec![TreeNode {
                member,
                parent: None,
                children: Vec::new(),
                depth: 0,
            }],
            stats: BuildStats {
                attached: 1,
                ..Default::default()
            },
        }
    }

    fn attach(&mut self, parent: NodeIdx, member: FamilyMember) -> NodeIdx {
        let idx = self.nodes.len();
        let depth = self.nodes[parent].depth + 1;
        self.nodes.push(TreeNode {
            member,
            parent: Some(parent),
            children: Vec::new(),
            depth,
        });
        self.nodes[parent].children.push(idx);
        self.stats.attached += 1;
        idx
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    pub fn node(&self, idx: NodeIdx) -> &TreeNode {
        &self.nodes[idx]
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    pub fn find(&self, id: &str) -> Option<NodeIdx> {
        self.nodes.iter().position(|node| node.member.id == id)
    }

    pub fn child_ids(&self, idx: NodeIdx) -> Vec<&str> {
        self.nodes[idx]
            .children
            .iter()
            .map(|&child| self.nodes[child].member.id.as_str())
            .collect()
    }

    /// True when `id` names `idx` itself or any node on its parent chain.
    pub fn is_ancestor_or_self(&self, idx: NodeIdx, id: &str) -> bool {
        let mut cursor = Some(idx);
        while let Some(current) = cursor {
            if self.nodes[current].member.id == id {
                return true;
            }
            cursor = self.nodes[current].parent;
        }
        false
    }

    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }
}

/// Reduces the family graph to a single rooted tree.
///
/// The root is the first member without parents. Children of a node are the
/// members listing it as a parent, in input order; all of them are attached
/// before descending depth-first, so the first parent discovered wins when a
/// member lists several. Returns `None` when no member is parentless.
pub fn build_hierarchy(graph: &FamilyGraph) -> Option<Tree> {
    let root_member = graph.iter().find(|member| member.is_root_candidate())?;

    let mut children_of: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, member) in graph.iter().enumerate() {
        for parent in &member.parent_ids {
            let entry = children_of.entry(parent.as_str()).or_default();
            if entry.last() != Some(&idx) {
                entry.push(idx);
            }
        }
    }

    let mut tree = Tree::with_root(root_member.clone());
    let mut attached: HashSet<&str> = HashSet::new();
    attached.insert(root_member.id.as_str());

    let mut stack: Vec<NodeIdx> = vec![0];
    while let Some(node_idx) = stack.pop() {
        let Some(candidates) = children_of.get(tree.node(node_idx).member.id.as_str()) else {
            continue;
        };
        let mut added = Vec::new();
        for &candidate in candidates {
            let Some(member) = graph.member_at(candidate) else {
                continue;
            };
            if tree.is_ancestor_or_self(node_idx, &member.id) {
                tree.stats.skipped_cycles += 1;
                continue;
            }
            if !attached.insert(member.id.as_str()) {
                tree.stats.skipped_duplicates += 1;
                continue;
            }
            added.push(tree.attach(node_idx, member.clone()));
        }
        stack.extend(added.into_iter().rev());
    }

    tree.stats.unreachable = graph.len().saturating_sub(tree.len());
    debug!(
        root = %tree.root().member.id,
        attached = tree.stats.attached,
        duplicates = tree.stats.skipped_duplicates,
        cycles = tree.stats.skipped_cycles,
        unreachable = tree.stats.unreachable,
        "built family hierarchy"
    );
    Some(tree)
}

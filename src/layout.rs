use crate::config::RenderOptions;
use crate::hierarchy::{NodeIdx, Tree};
use crate::model::FamilyMember;

/// Lines reserved under the deepest row for name, dates and occupation.
const LABEL_LINES: f32 = 3.0;
const LABEL_LINE_GAP: f32 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode {
    pub member: FamilyMember,
    pub parent: Option<NodeIdx>,
    pub children: Vec<NodeIdx>,
    pub depth: usize,
    pub x: f32,
    pub y: f32,
}

impl PositionedNode {
    pub fn id(&self) -> &str {
        &self.member.id
    }
}

/// Laid-out tree, indexed like the `Tree` it came from. `width`/`height` is
/// the extent all coordinates fall inside.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedTree {
    pub nodes: Vec<PositionedNode>,
    pub width: f32,
    pub height: f32,
}

impl PositionedTree {
    pub fn root(&self) -> Option<&PositionedNode> {
        self.nodes.first()
    }

    pub fn find(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|node| node.member.id == id)
    }

    /// Parent → child pairs in node order.
    pub fn links(&self) -> impl Iterator<Item = (&PositionedNode, &PositionedNode)> {
        self.nodes.iter().filter_map(|child| {
            child
                .parent
                .and_then(|parent| self.nodes.get(parent))
                .map(|parent| (parent, child))
        })
    }
}

fn preorder(tree: &Tree) -> Vec<NodeIdx> {
    let mut order = Vec::with_capacity(tree.len());
    let mut stack = vec![0];
    while let Some(idx) = stack.pop() {
        order.push(idx);
        stack.extend(tree.node(idx).children.iter().rev());
    }
    order
}

/// Top-down tree layout.
///
/// Leaves take successive columns `node_spacing` apart in depth-first order
/// and every parent sits at the mean x of its children, so subtrees never
/// interleave and neighbours on a level stay at least `node_spacing` apart.
/// Rows are `level_height` apart. The extent grows past the canvas instead of
/// compressing the tree, and the tree is centered horizontally inside it.
pub fn compute_layout(tree: &Tree, options: &RenderOptions) -> PositionedTree {
    let options = options.sanitized();
    if tree.is_empty() {
        return PositionedTree {
            nodes: Vec::new(),
            width: options.width,
            height: options.height,
        };
    }

    let order = preorder(tree);
    let mut xs = vec![0.0_f32; tree.len()];

    let mut column = 0usize;
    for &idx in &order {
        if tree.node(idx).children.is_empty() {
            xs[idx] = column as f32 * options.node_spacing;
            column += 1;
        }
    }
    for &idx in order.iter().rev() {
        let children = &tree.node(idx).children;
        if !children.is_empty() {
            let sum: f32 = children.iter().map(|&child| xs[child]).sum();
            xs[idx] = sum / children.len() as f32;
        }
    }

    let margin = options.node_radius * 2.0;
    let label_space =
        options.node_radius + LABEL_LINES * (options.font_size + LABEL_LINE_GAP) + LABEL_LINE_GAP;
    let natural_width = column.saturating_sub(1) as f32 * options.node_spacing;
    let natural_height = tree.max_depth() as f32 * options.level_height;
    let width = options.width.max(natural_width + margin * 2.0);
    let height = options.height.max(margin + natural_height + label_space);
    let offset_x = (width - natural_width) / 2.0;

    let nodes = tree
        .nodes()
        .iter()
        .enumerate()
        .map(|(idx, node)| PositionedNode {
            member: node.member.clone(),
            parent: node.parent,
            children: node.children.clone(),
            depth: node.depth,
            x: clamp_coord(offset_x + xs[idx], width),
            y: clamp_coord(margin + node.depth as f32 * options.level_height, height),
        })
        .collect();

    PositionedTree {
        nodes,
        width,
        height,
    }
}

fn clamp_coord(value: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, max)
    } else {
        max / 2.0
    }
}

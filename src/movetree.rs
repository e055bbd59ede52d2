//! The game tree: nodes, the editable tree handle, and read-only cursors.
//!
//! Nodes live in an arena owned by [`MoveTree`] and are addressed by
//! [`NodeId`]. The tree only ever grows, so an id stays valid for the life of
//! the tree. `MoveTree` is the single editable handle: it keeps a current
//! position and is the only way to add nodes or change properties.
//!
//! Reading is done through [`Cursor`], a `Copy` view that borrows the tree.
//! Any number of cursors can walk the same tree at once, and the borrow
//! checker keeps them from overlapping with an edit.

use std::cell::OnceCell;

use tracing::{debug, warn};

use crate::constants::{APP_NAME, DEFAULT_SIZE, MAX_SIZE};
use crate::error::ParseError;
use crate::goban::Goban;
use crate::parse;
use crate::point::{Point, Rotation};
use crate::properties::{Prop, Properties};
use crate::stone::{Color, Move};
use crate::treepath::Treepath;

/// Index of a node in its tree's arena. The root is always `0`.
pub type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Clone, Debug, Default)]
pub struct MoveNode {
    properties: Properties,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    node_num: usize,
    var_num: usize,
}

impl MoveNode {
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Depth of the node; the root is node 0.
    pub fn node_num(&self) -> usize {
        self.node_num
    }

    /// Position of the node among its parent's children.
    pub fn var_num(&self) -> usize {
        self.var_num
    }
}

/// A game tree plus the editing position.
#[derive(Clone, Debug)]
pub struct MoveTree {
    nodes: Vec<MoveNode>,
    current: NodeId,
    mainline: OnceCell<Vec<bool>>,
}

impl Default for MoveTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveTree {
    /// A tree holding only an empty root.
    pub fn new() -> Self {
        Self {
            nodes: vec![MoveNode::default()],
            current: ROOT,
            mainline: OnceCell::new(),
        }
    }

    /// A tree for an empty board of the given size.
    pub fn with_size(size: i32) -> Self {
        let mut mt = Self::new();
        mt.properties_mut().add(Prop::SZ, size.to_string());
        mt
    }

    /// Parse a game record and fill in any missing root properties. The tree
    /// is positioned at the root.
    pub fn from_sgf(record: &str) -> Result<Self, ParseError> {
        let mut mt = parse::parse(record)?;
        mt.init_root_properties();
        Ok(mt)
    }

    /// Parse a game record and move to `init_path`.
    pub fn from_sgf_at(record: &str, init_path: &[usize]) -> Result<Self, ParseError> {
        let mut mt = Self::from_sgf(record)?;
        mt.move_to(init_path);
        Ok(mt)
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    /// A cursor at the current position.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor {
            tree: self,
            id: self.current,
        }
    }

    pub fn root(&self) -> Cursor<'_> {
        Cursor { tree: self, id: ROOT }
    }

    /// A cursor at `id`. Panics if `id` did not come from this tree.
    pub fn cursor_at(&self, id: NodeId) -> Cursor<'_> {
        assert!(id < self.nodes.len(), "node id {id} is not in this tree");
        Cursor { tree: self, id }
    }

    pub fn node(&self, id: NodeId) -> &MoveNode {
        &self.nodes[id]
    }

    pub fn current_id(&self) -> NodeId {
        self.current
    }

    pub fn properties(&self) -> &Properties {
        &self.nodes[self.current].properties
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // A tree always has a root.
        false
    }

    /// Board size from the root's `SZ`, defaulting to 19. Sizes above the
    /// largest supported board fall back to the default.
    pub fn intersections(&self) -> i32 {
        let Some(sz) = self.nodes[ROOT].properties.get_one(Prop::SZ) else {
            return DEFAULT_SIZE;
        };
        // Rectangular boards (`SZ[19:13]`) are read by their first dimension.
        let dim = sz.split(':').next().unwrap_or(sz).trim();
        match dim.parse::<i32>() {
            Ok(n) if (1..=MAX_SIZE).contains(&n) => n,
            _ => {
                warn!(sz, "unsupported board size, using default");
                DEFAULT_SIZE
            }
        }
    }

    /// Node ids in pre-order, children in variation order.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id].children.iter().rev());
        }
        out
    }

    fn mainline_flags(&self) -> &[bool] {
        self.mainline.get_or_init(|| {
            let mut flags = vec![false; self.nodes.len()];
            let mut id = ROOT;
            flags[id] = true;
            while let Some(&next) = self.nodes[id].children.first() {
                flags[next] = true;
                id = next;
            }
            flags
        })
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Move to child `i`. Returns `false`, staying put, if there is none.
    pub fn move_down(&mut self, i: usize) -> bool {
        match self.nodes[self.current].children.get(i) {
            Some(&child) => {
                self.current = child;
                true
            }
            None => false,
        }
    }

    /// Move to the parent. Returns `false` at the root.
    pub fn move_up(&mut self) -> bool {
        match self.nodes[self.current].parent {
            Some(parent) => {
                self.current = parent;
                true
            }
            None => false,
        }
    }

    pub fn move_to_root(&mut self) {
        self.current = ROOT;
    }

    /// Go to the root and then follow `path`, stopping at the first missing
    /// child.
    pub fn move_to(&mut self, path: &[usize]) {
        self.current = self.root().descend(path).id();
    }

    pub fn set_current(&mut self, id: NodeId) {
        assert!(id < self.nodes.len(), "node id {id} is not in this tree");
        self.current = id;
    }

    // -------------------------------------------------------------------------
    // Editing
    // -------------------------------------------------------------------------

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.nodes[self.current].properties
    }

    pub fn properties_at_mut(&mut self, id: NodeId) -> &mut Properties {
        &mut self.nodes[id].properties
    }

    /// Append an empty child to `parent`, returning its id.
    pub fn add_child_to(&mut self, parent: NodeId) -> NodeId {
        let id = self.nodes.len();
        let node_num = self.nodes[parent].node_num + 1;
        let var_num = self.nodes[parent].children.len();
        self.nodes.push(MoveNode {
            properties: Properties::new(),
            children: Vec::new(),
            parent: Some(parent),
            node_num,
            var_num,
        });
        self.nodes[parent].children.push(id);
        self.mainline = OnceCell::new();
        id
    }

    /// Append an empty child to the current node without moving.
    pub fn add_child(&mut self) -> NodeId {
        self.add_child_to(self.current)
    }

    /// Append an empty child to the current node and move to it.
    pub fn add_node(&mut self) -> NodeId {
        let id = self.add_child();
        self.current = id;
        id
    }

    /// Fill in the standard root properties that are missing.
    pub fn init_root_properties(&mut self) {
        let defaults = [
            (Prop::GM, "1".to_string()),
            (Prop::FF, "4".to_string()),
            (Prop::CA, "UTF-8".to_string()),
            (Prop::AP, format!("{APP_NAME}:{}", env!("CARGO_PKG_VERSION"))),
            (Prop::KM, "0.00".to_string()),
            (Prop::RU, "Japanese".to_string()),
            (Prop::SZ, DEFAULT_SIZE.to_string()),
            (Prop::PB, "Black".to_string()),
            (Prop::PW, "White".to_string()),
        ];
        let root = &mut self.nodes[ROOT].properties;
        for (prop, value) in defaults {
            if !root.contains(prop) {
                root.add(prop, value);
            }
        }
    }

    /// Rotate every point in the tree.
    pub fn rotate(&mut self, rotation: Rotation) {
        let size = self.intersections();
        for node in &mut self.nodes {
            node.properties.rotate(size, rotation);
        }
    }

    pub fn flip_horz(&mut self) {
        let size = self.intersections();
        for node in &mut self.nodes {
            node.properties.flip_horz(size);
        }
    }

    pub fn flip_vert(&mut self) {
        let size = self.intersections();
        for node in &mut self.nodes {
            node.properties.flip_vert(size);
        }
    }

    /// Build a new tree whose root holds the position at the current node.
    ///
    /// The board at the current node, after captures, becomes `AB`/`AW` on
    /// the new root, and the current node's subtree is copied below it. The
    /// old root's non-stone properties carry over, overridden by the current
    /// node's. If the side to move would change, `PL` records it.
    pub fn rebase(&self) -> MoveTree {
        let here = self.cursor();
        let player = here.current_player();
        let goban = Goban::from_tree(self, &here.treepath_to_here()).goban;

        let mut out = MoveTree::new();
        let is_stone_prop = |p: Prop| matches!(p, Prop::AB | Prop::AW | Prop::AE | Prop::B | Prop::W);
        {
            let root = out.properties_mut();
            for (prop, values) in self.nodes[ROOT].properties.iter() {
                if !is_stone_prop(prop) {
                    root.set(prop, values.iter().cloned());
                }
            }
            if self.current != ROOT {
                for (prop, values) in here.properties().iter() {
                    if !is_stone_prop(prop) {
                        root.set(prop, values.iter().cloned());
                    }
                }
            }
            for mv in goban.all_placed_stones() {
                let prop = if mv.color == Color::Black { Prop::AB } else { Prop::AW };
                if let Some(pt) = mv.point {
                    root.add(prop, pt.to_sgf());
                }
            }
        }

        // Children are pushed in reverse so they are re-added in order.
        let mut stack: Vec<(NodeId, NodeId)> = self.nodes[self.current]
            .children
            .iter()
            .rev()
            .map(|&c| (c, ROOT))
            .collect();
        while let Some((old, new_parent)) = stack.pop() {
            let new_id = out.add_child_to(new_parent);
            out.nodes[new_id].properties = self.nodes[old].properties.clone();
            for &c in self.nodes[old].children.iter().rev() {
                stack.push((c, new_id));
            }
        }

        if out.root().current_player() != player {
            if let Some(token) = player.token() {
                out.properties_mut().set(Prop::PL, [token]);
            }
        }
        debug!(nodes = out.len(), "rebased tree");
        out
    }

    /// Serialize the whole tree as an SGF record.
    pub fn to_sgf(&self) -> String {
        enum Step {
            Enter(NodeId),
            Exit(NodeId),
        }
        let grouped = |id: NodeId| match self.nodes[id].parent {
            None => true,
            Some(p) => self.nodes[p].children.len() > 1,
        };

        let mut out = String::new();
        let mut stack = vec![Step::Enter(ROOT)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(id) => {
                    let node = &self.nodes[id];
                    if node.parent.is_some() {
                        out.push('\n');
                    }
                    if grouped(id) {
                        out.push('(');
                    }
                    out.push(';');
                    for (prop, values) in node.properties.iter() {
                        out.push_str(prop.into());
                        if values.is_empty() {
                            out.push_str("[]");
                        }
                        for v in values {
                            out.push('[');
                            out.push_str(&escape(v));
                            out.push(']');
                        }
                    }
                    stack.push(Step::Exit(id));
                    for &c in node.children.iter().rev() {
                        stack.push(Step::Enter(c));
                    }
                }
                Step::Exit(id) => {
                    if grouped(id) {
                        out.push(')');
                    }
                }
            }
        }
        out
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == ']' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// A read-only position in a [`MoveTree`].
///
/// Navigation returns a new cursor and never fails: moving past a leaf or
/// above the root leaves the cursor where it was.
#[derive(Copy, Clone, Debug)]
pub struct Cursor<'a> {
    tree: &'a MoveTree,
    id: NodeId,
}

impl PartialEq for Cursor<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl<'a> Cursor<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'a MoveTree {
        self.tree
    }

    pub fn node(&self) -> &'a MoveNode {
        &self.tree.nodes[self.id]
    }

    pub fn properties(&self) -> &'a Properties {
        &self.node().properties
    }

    pub fn is_root(&self) -> bool {
        self.node().parent.is_none()
    }

    pub fn num_children(&self) -> usize {
        self.node().children.len()
    }

    pub fn child(&self, i: usize) -> Option<Cursor<'a>> {
        self.node().children.get(i).map(|&id| Cursor {
            tree: self.tree,
            id,
        })
    }

    pub fn parent(&self) -> Option<Cursor<'a>> {
        self.node().parent.map(|id| Cursor {
            tree: self.tree,
            id,
        })
    }

    pub fn move_down(self, i: usize) -> Cursor<'a> {
        self.child(i).unwrap_or(self)
    }

    pub fn move_up(self) -> Cursor<'a> {
        self.parent().unwrap_or(self)
    }

    /// Follow `path` from here, stopping at the first missing child.
    pub fn descend(self, path: &[usize]) -> Cursor<'a> {
        let mut cur = self;
        for &i in path {
            match cur.child(i) {
                Some(next) => cur = next,
                None => break,
            }
        }
        cur
    }

    /// The move made at this node.
    pub fn last_move(&self) -> Option<Move> {
        self.properties().get_move()
    }

    /// Whose turn it is at this node.
    ///
    /// A `PL` at this node decides outright. Otherwise the nearest ancestor
    /// (or this node) with a move hands the turn to the other color, and a
    /// `PL` met on the way up counts as that player being next. Black moves
    /// first when nothing is found.
    pub fn current_player(&self) -> Color {
        if let Some(c) = self.properties().get_one(Prop::PL).and_then(Color::from_token) {
            return c;
        }
        let mut cur = Some(*self);
        while let Some(c) = cur {
            if let Some(mv) = c.last_move() {
                return mv.color.opposite();
            }
            if let Some(pl) = c.properties().get_one(Prop::PL).and_then(Color::from_token) {
                return pl;
            }
            cur = c.parent();
        }
        Color::Black
    }

    /// Whether the node is reached from the root by always taking child 0.
    pub fn on_mainline(&self) -> bool {
        self.tree.mainline_flags()[self.id]
    }

    /// Variation indices from the root down to this node.
    pub fn treepath_to_here(&self) -> Treepath {
        let mut path = Vec::with_capacity(self.node().node_num);
        let mut cur = *self;
        while let Some(parent) = cur.parent() {
            path.push(cur.node().var_num);
            cur = parent;
        }
        path.reverse();
        path
    }

    /// The nearest node at or above this one that is on the mainline.
    pub fn mainline_node(&self) -> Cursor<'a> {
        let mut cur = *self;
        while !cur.on_mainline() {
            cur = cur.move_up();
        }
        cur
    }

    /// Steps up to the mainline; 0 when already on it.
    pub fn moves_to_mainline(&self) -> usize {
        let mut n = 0;
        let mut cur = *self;
        while !cur.on_mainline() {
            match cur.parent() {
                Some(p) => cur = p,
                None => break,
            }
            n += 1;
        }
        n
    }

    /// Moves held by the children, in variation order. Children without a
    /// move are skipped.
    pub fn next_moves(&self) -> Vec<Move> {
        self.node()
            .children
            .iter()
            .filter_map(|&c| self.tree.nodes[c].properties.get_move())
            .collect()
    }

    /// The variation whose move is `color` at `point`, if one exists.
    pub fn find_next_move(&self, point: Point, color: Color) -> Option<usize> {
        self.node().children.iter().find_map(|&c| {
            let node = &self.tree.nodes[c];
            match node.properties.get_move() {
                Some(mv) if mv.color == color && mv.point == Some(point) => Some(node.var_num),
                _ => None,
            }
        })
    }
}

//! The rules engine: a board of stones with captures, self-capture, and ko.
//!
//! A [`Goban`] holds one [`Color`] per intersection plus at most one ko
//! point. Stones enter the board two ways: [`Goban::add_stone`] plays a move
//! under the rules, while [`Goban::set_color`] places setup stones (`AB`,
//! `AW`) without any checks. A rejected move never changes the board.

use std::fmt;

use tracing::trace;

use crate::movetree::MoveTree;
use crate::point::Point;
use crate::properties::Properties;
use crate::stone::{Captures, Color, Move};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Goban {
    size: i32,
    cells: Vec<Color>,
    ko: Option<Point>,
}

/// Outcome of [`Goban::add_stone`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoneResult {
    pub successful: bool,
    /// Stones removed by the move, all of the opposite color.
    pub captures: Vec<Point>,
    /// The new ko point, if the move created one.
    pub ko_point: Option<Point>,
}

impl StoneResult {
    fn failed() -> Self {
        Self::default()
    }
}

/// A board rebuilt by replaying a path from the root.
#[derive(Clone, Debug)]
pub struct Replay {
    pub goban: Goban,
    /// Captures made at each step of the path.
    pub captures: Vec<Captures>,
    /// Stones removed by `AE` at each step of the path.
    pub clear_history: Vec<Vec<Move>>,
}

/// A connected chain of one color.
struct Group {
    stones: Vec<Point>,
    liberties: usize,
}

impl Goban {
    /// An empty `size` x `size` board.
    ///
    /// # Panics
    ///
    /// If `size` is not positive.
    pub fn new(size: i32) -> Self {
        assert!(size > 0, "board size must be positive, got {size}");
        Self {
            size,
            cells: vec![Color::Empty; (size * size) as usize],
            ko: None,
        }
    }

    /// Rebuild the board at the end of `treepath`: root setup first, then
    /// each node along the path. The replay stops at the first missing child.
    pub fn from_tree(tree: &MoveTree, treepath: &[usize]) -> Replay {
        let mut goban = Goban::new(tree.intersections());
        let mut cur = tree.root();
        goban.load_node(cur.properties());
        let mut captures = Vec::with_capacity(treepath.len());
        let mut clear_history = Vec::with_capacity(treepath.len());
        for &var in treepath {
            let Some(next) = cur.child(var) else {
                break;
            };
            cur = next;
            let (cleared, caps) = goban.load_node(cur.properties());
            clear_history.push(cleared);
            captures.push(caps);
        }
        Replay {
            goban,
            captures,
            clear_history,
        }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    fn idx(&self, pt: Point) -> usize {
        (pt.y * self.size + pt.x) as usize
    }

    pub fn in_bounds(&self, pt: Point) -> bool {
        pt.in_bounds(self.size)
    }

    /// The color at `pt`. Off-board points read as empty.
    pub fn stone(&self, pt: Point) -> Color {
        if !self.in_bounds(pt) {
            return Color::Empty;
        }
        self.cells[self.idx(pt)]
    }

    pub fn ko(&self) -> Option<Point> {
        self.ko
    }

    pub fn set_ko(&mut self, pt: Point) {
        self.ko = Some(pt);
    }

    pub fn clear_ko(&mut self) {
        self.ko = None;
    }

    /// Whether a stone may go at `pt`: on the board, empty, and not the ko.
    pub fn placeable(&self, pt: Point) -> bool {
        self.in_bounds(pt) && self.ko != Some(pt) && self.stone(pt) == Color::Empty
    }

    /// Put `color` at `pt` with no rule checks. Returns `false` off the board.
    pub fn set_color(&mut self, pt: Point, color: Color) -> bool {
        if !self.in_bounds(pt) {
            return false;
        }
        let i = self.idx(pt);
        self.cells[i] = color;
        true
    }

    /// Empty `pt`, returning what was there.
    pub fn clear_stone(&mut self, pt: Point) -> Color {
        let prev = self.stone(pt);
        self.set_color(pt, Color::Empty);
        prev
    }

    /// Every stone on the board, row by row.
    pub fn all_placed_stones(&self) -> Vec<Move> {
        let mut out = Vec::new();
        for y in 0..self.size {
            for x in 0..self.size {
                let pt = Point::new(x, y);
                let color = self.stone(pt);
                if color != Color::Empty {
                    out.push(Move::new(color, pt));
                }
            }
        }
        out
    }

    /// Play `color` at `pt` under the rules.
    ///
    /// Opposing groups left without liberties are removed. A move that
    /// captures nothing and leaves its own group without liberties is
    /// self-capture and is rejected. Capturing exactly one stone where the
    /// opponent could immediately take back exactly the played stone sets the
    /// ko point; any other successful move clears it.
    pub fn add_stone(&mut self, pt: Point, color: Color) -> StoneResult {
        if color == Color::Empty || !self.placeable(pt) {
            return StoneResult::failed();
        }
        self.set_color(pt, color);

        let captured_groups = self.captured_groups(pt, color);
        if captured_groups.is_empty() && self.find_group(pt, color).liberties == 0 {
            self.clear_stone(pt);
            trace!(%pt, %color, "rejected self-capture");
            return StoneResult::failed();
        }

        self.clear_ko();
        let mut captures = Vec::new();
        for group in captured_groups {
            for p in group.stones {
                self.clear_stone(p);
                captures.push(p);
            }
        }

        let mut ko_point = None;
        if let &[cap] = captures.as_slice() {
            // Probe the recapture, then undo it.
            let opp = color.opposite();
            self.set_color(cap, opp);
            let retaken = self.captured_groups(cap, opp);
            self.clear_stone(cap);
            if let [g] = &retaken[..] {
                if g.stones == [pt] {
                    self.set_ko(cap);
                    ko_point = Some(cap);
                }
            }
        }
        trace!(%pt, %color, captured = captures.len(), ?ko_point, "placed stone");
        StoneResult {
            successful: true,
            captures,
            ko_point,
        }
    }

    /// Whether `color` could legally play at `pt`. The board and ko point
    /// are left exactly as they were.
    pub fn test_add_stone(&mut self, pt: Point, color: Color) -> bool {
        let ko = self.ko;
        let result = self.add_stone(pt, color);
        if result.successful {
            self.clear_stone(pt);
            for &p in &result.captures {
                self.set_color(p, color.opposite());
            }
        }
        self.ko = ko;
        result.successful
    }

    /// Empty the points listed in `AE`, returning the stones removed.
    pub fn apply_clear_locations(&mut self, props: &Properties) -> Vec<Move> {
        let mut cleared = Vec::new();
        for pt in props.clear_locations() {
            let color = self.clear_stone(pt);
            if color != Color::Empty {
                cleared.push(Move::new(color, pt));
            }
        }
        cleared
    }

    /// Apply one node: `AE` clears, then `AB`/`AW` setup stones, then the
    /// node's move. Returns the stones the move captured, by their color.
    pub fn load_stones_from_node(&mut self, props: &Properties) -> Captures {
        self.load_node(props).1
    }

    fn load_node(&mut self, props: &Properties) -> (Vec<Move>, Captures) {
        let cleared = self.apply_clear_locations(props);
        for color in [Color::Black, Color::White] {
            for pt in props.placements(color) {
                self.set_color(pt, color);
            }
        }
        let mut captures = Captures::default();
        if let Some(Move {
            color,
            point: Some(pt),
        }) = props.get_move()
        {
            let result = self.add_stone(pt, color);
            if result.successful {
                captures.extend(color.opposite(), result.captures);
            } else {
                trace!(%pt, %color, "recorded move is not playable");
            }
        }
        (cleared, captures)
    }

    /// Flood-fill the chain through `start` if it has `color`.
    fn find_group(&self, start: Point, color: Color) -> Group {
        let mut group = Group {
            stones: Vec::new(),
            liberties: 0,
        };
        if self.stone(start) != color || color == Color::Empty {
            return group;
        }
        let mut seen = vec![false; self.cells.len()];
        let mut libs = vec![false; self.cells.len()];
        let mut stack = vec![start];
        while let Some(p) = stack.pop() {
            let i = self.idx(p);
            if seen[i] {
                continue;
            }
            seen[i] = true;
            group.stones.push(p);
            for n in p.neighbors(self.size) {
                let ni = self.idx(n);
                match self.stone(n) {
                    Color::Empty if !libs[ni] => {
                        libs[ni] = true;
                        group.liberties += 1;
                    }
                    c if c == color && !seen[ni] => stack.push(n),
                    _ => {}
                }
            }
        }
        group
    }

    /// Opposing groups next to `pt` that have no liberties, each counted
    /// once.
    fn captured_groups(&self, pt: Point, color: Color) -> Vec<Group> {
        let opp = color.opposite();
        let mut groups: Vec<Group> = Vec::new();
        for n in pt.neighbors(self.size) {
            if self.stone(n) != opp || groups.iter().any(|g| g.stones.contains(&n)) {
                continue;
            }
            groups.push(self.find_group(n, opp));
        }
        groups.retain(|g| g.liberties == 0);
        groups
    }
}

impl fmt::Display for Goban {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            for x in 0..self.size {
                let pt = Point::new(x, y);
                let ch = match self.stone(pt) {
                    Color::Black => 'X',
                    Color::White => 'O',
                    Color::Empty if self.ko == Some(pt) => '*',
                    Color::Empty => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::Prop;

    fn pt(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_simple_capture() {
        let mut g = Goban::new(9);
        g.set_color(pt(1, 1), Color::White);
        for p in [pt(0, 1), pt(1, 0), pt(2, 1)] {
            assert!(g.add_stone(p, Color::Black).successful);
        }
        let r = g.add_stone(pt(1, 2), Color::Black);
        assert!(r.successful);
        assert_eq!(r.captures, vec![pt(1, 1)]);
        assert_eq!(g.stone(pt(1, 1)), Color::Empty);
        assert_eq!(r.ko_point, None);
    }

    #[test]
    fn test_capture_group_only() {
        let mut g = Goban::new(5);
        // White pair in the corner, a separate white stone elsewhere.
        g.set_color(pt(0, 0), Color::White);
        g.set_color(pt(1, 0), Color::White);
        g.set_color(pt(4, 4), Color::White);
        g.set_color(pt(0, 1), Color::Black);
        g.set_color(pt(1, 1), Color::Black);
        let r = g.add_stone(pt(2, 0), Color::Black);
        assert!(r.successful);
        assert_eq!(r.captures.len(), 2);
        assert_eq!(g.stone(pt(4, 4)), Color::White);
    }

    #[test]
    fn test_self_capture_is_noop() {
        let mut g = Goban::new(9);
        g.set_color(pt(1, 0), Color::Black);
        g.set_color(pt(0, 1), Color::Black);
        let before = g.clone();
        let r = g.add_stone(pt(0, 0), Color::White);
        assert!(!r.successful);
        assert_eq!(g, before);
        assert!(!g.test_add_stone(pt(0, 0), Color::White));
        assert_eq!(g, before);
    }

    #[test]
    fn test_occupied_and_off_board() {
        let mut g = Goban::new(9);
        assert!(g.add_stone(pt(3, 3), Color::Black).successful);
        assert!(!g.add_stone(pt(3, 3), Color::White).successful);
        assert!(!g.add_stone(pt(9, 0), Color::White).successful);
        assert!(!g.add_stone(pt(-1, 0), Color::White).successful);
        assert!(!g.add_stone(pt(4, 4), Color::Empty).successful);
    }

    /// Black and white stones shaped so that black at (2,1) takes a white
    /// stone at (1,1) in a ko.
    fn ko_board() -> Goban {
        let mut g = Goban::new(9);
        for p in [pt(1, 0), pt(0, 1), pt(1, 2)] {
            g.set_color(p, Color::Black);
        }
        for p in [pt(2, 0), pt(3, 1), pt(2, 2), pt(1, 1)] {
            g.set_color(p, Color::White);
        }
        g
    }

    #[test]
    fn test_ko() {
        let mut g = ko_board();
        let take = g.add_stone(pt(2, 1), Color::Black);
        assert!(take.successful);
        assert_eq!(take.captures, vec![pt(1, 1)]);
        assert_eq!(take.ko_point, Some(pt(1, 1)));
        assert_eq!(g.ko(), Some(pt(1, 1)));

        // Immediate retake is illegal and leaves the board alone.
        let before = g.clone();
        assert!(!g.add_stone(pt(1, 1), Color::White).successful);
        assert_eq!(g, before);

        // A move elsewhere clears the ko, after which the retake works.
        assert!(g.add_stone(pt(6, 6), Color::White).successful);
        assert_eq!(g.ko(), None);
        assert!(g.add_stone(pt(7, 7), Color::Black).successful);
        let retake = g.add_stone(pt(1, 1), Color::White);
        assert!(retake.successful);
        assert_eq!(retake.captures, vec![pt(2, 1)]);
    }

    #[test]
    fn test_test_add_stone_restores_captures_and_ko() {
        let mut g = ko_board();
        g.set_ko(pt(8, 8));
        let before = g.clone();
        assert!(g.test_add_stone(pt(2, 1), Color::Black));
        assert_eq!(g, before);
        assert_eq!(g.ko(), Some(pt(8, 8)));
    }

    #[test]
    fn test_load_stones_from_node() {
        let mut g = Goban::new(9);
        g.set_color(pt(0, 0), Color::White);
        g.set_color(pt(5, 5), Color::White);
        let mut props = Properties::new();
        props.add(Prop::AE, "ff");
        props.add(Prop::AB, "ba");
        props.add(Prop::B, "ab");
        let caps = g.load_stones_from_node(&props);
        assert_eq!(caps.white, vec![pt(0, 0)]);
        assert!(caps.black.is_empty());
        assert_eq!(g.stone(pt(5, 5)), Color::Empty);
        assert_eq!(g.stone(pt(1, 0)), Color::Black);
    }

    #[test]
    fn test_from_tree_records_history() {
        let mt = MoveTree::from_sgf("(;AW[aa]AB[ba];B[ab];AE[ba]W[cc])").unwrap();
        let replay = Goban::from_tree(&mt, &[0, 0, 0]);
        assert_eq!(replay.captures.len(), 2);
        assert_eq!(replay.captures[0].white, vec![pt(0, 0)]);
        assert_eq!(replay.clear_history[1], vec![Move::new(Color::Black, pt(1, 0))]);
        assert_eq!(replay.goban.stone(pt(2, 2)), Color::White);
        assert_eq!(replay.goban.all_placed_stones().len(), 2);
    }

    #[test]
    #[should_panic(expected = "board size must be positive")]
    fn test_zero_size_panics() {
        let _ = Goban::new(0);
    }
}

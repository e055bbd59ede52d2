use crate::point::Point;

use super::symbols::Symbol;

/// Everything drawn at one point of a flattened board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Intersection {
    /// The goban point, not the position within a cropped board.
    pub point: Point,
    /// Board lines: a corner, an edge, the center, or a star point.
    pub base: Symbol,
    /// `BStone`, `WStone`, or `Empty`.
    pub stone: Symbol,
    pub mark: Symbol,
    pub text_label: Option<String>,
}

impl Intersection {
    pub fn new(point: Point, base: Symbol) -> Self {
        Self {
            point,
            base,
            stone: Symbol::Empty,
            mark: Symbol::Empty,
            text_label: None,
        }
    }

    /// The symbol a renderer would draw on top: the stone if there is one,
    /// otherwise the board lines.
    pub fn top_symbol(&self) -> Symbol {
        if self.stone.is_stone() { self.stone } else { self.base }
    }
}

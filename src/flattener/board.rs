use std::collections::HashMap;

use crate::constants::starpoints;
use crate::point::Point;
use crate::stone::Color;

use super::cropbox::Cropbox;
use super::intersection::Intersection;
use super::symbols::Symbol;

/// A cropped grid of [`Intersection`]s.
///
/// Board points are relative to the crop: `(0, 0)` is the top-left corner of
/// the visible area, whatever goban point that is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatBoard {
    cropbox: Cropbox,
    rows: Vec<Vec<Intersection>>,
}

impl FlatBoard {
    pub(crate) fn build(
        size: i32,
        cropbox: Cropbox,
        stones: &HashMap<Point, Color>,
        marks: &HashMap<Point, Symbol>,
        labels: &HashMap<Point, String>,
    ) -> Self {
        let mut rows = Vec::with_capacity(cropbox.height() as usize);
        for y in cropbox.top_left.y..=cropbox.bot_right.y {
            let mut row = Vec::with_capacity(cropbox.width() as usize);
            for x in cropbox.top_left.x..=cropbox.bot_right.x {
                let pt = Point::new(x, y);
                let mut isect = Intersection::new(pt, base_symbol(pt, size));
                if let Some(&color) = stones.get(&pt) {
                    isect.stone = Symbol::from_stone(color);
                }
                if let Some(&mark) = marks.get(&pt) {
                    isect.mark = mark;
                }
                isect.text_label = labels.get(&pt).cloned();
                row.push(isect);
            }
            rows.push(row);
        }
        Self { cropbox, rows }
    }

    pub fn cropbox(&self) -> Cropbox {
        self.cropbox
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Intersection>] {
        &self.rows
    }

    /// The intersection at a board point, or `None` outside the crop.
    pub fn intersection_at(&self, board_pt: Point) -> Option<&Intersection> {
        let x = usize::try_from(board_pt.x).ok()?;
        let y = usize::try_from(board_pt.y).ok()?;
        self.rows.get(y)?.get(x)
    }

    /// Map a goban point into board coordinates.
    pub fn board_point(&self, goban_pt: Point) -> Option<Point> {
        self.cropbox
            .contains(goban_pt)
            .then(|| goban_pt.translate(-self.cropbox.top_left.x, -self.cropbox.top_left.y))
    }

    pub fn goban_point(&self, board_pt: Point) -> Point {
        board_pt.translate(self.cropbox.top_left.x, self.cropbox.top_left.y)
    }

    /// Intersections of `other` that differ from this board.
    ///
    /// # Panics
    ///
    /// If the two boards have different dimensions.
    pub fn diff<'b>(&self, other: &'b FlatBoard) -> Vec<&'b Intersection> {
        assert!(
            self.width() == other.width() && self.height() == other.height(),
            "cannot diff a {}x{} board with a {}x{} board",
            self.width(),
            self.height(),
            other.width(),
            other.height()
        );
        self.rows
            .iter()
            .flatten()
            .zip(other.rows.iter().flatten())
            .filter(|(a, b)| a != b)
            .map(|(_, b)| b)
            .collect()
    }
}

/// Board lines at `pt`: corners, then edges, then star points.
pub fn base_symbol(pt: Point, size: i32) -> Symbol {
    let max = size - 1;
    match (pt.x, pt.y) {
        (0, 0) => Symbol::TlCorner,
        (x, 0) if x == max => Symbol::TrCorner,
        (0, y) if y == max => Symbol::BlCorner,
        (x, y) if x == max && y == max => Symbol::BrCorner,
        (_, 0) => Symbol::TopEdge,
        (_, y) if y == max => Symbol::BotEdge,
        (0, _) => Symbol::LeftEdge,
        (x, _) if x == max => Symbol::RightEdge,
        (x, y) if starpoints(size).contains(&(x, y)) => Symbol::CenterStarpoint,
        _ => Symbol::Center,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flattener::cropbox::BoardRegion;

    fn board(size: i32, stones: &[(Point, Color)]) -> FlatBoard {
        let stones: HashMap<Point, Color> = stones.iter().copied().collect();
        FlatBoard::build(
            size,
            Cropbox::new(BoardRegion::All, size),
            &stones,
            &HashMap::new(),
            &HashMap::new(),
        )
    }

    #[test]
    fn test_base_symbols() {
        assert_eq!(base_symbol(Point::new(0, 0), 19), Symbol::TlCorner);
        assert_eq!(base_symbol(Point::new(18, 0), 19), Symbol::TrCorner);
        assert_eq!(base_symbol(Point::new(0, 18), 19), Symbol::BlCorner);
        assert_eq!(base_symbol(Point::new(18, 18), 19), Symbol::BrCorner);
        assert_eq!(base_symbol(Point::new(5, 0), 19), Symbol::TopEdge);
        assert_eq!(base_symbol(Point::new(5, 18), 19), Symbol::BotEdge);
        assert_eq!(base_symbol(Point::new(0, 5), 19), Symbol::LeftEdge);
        assert_eq!(base_symbol(Point::new(18, 5), 19), Symbol::RightEdge);
        assert_eq!(base_symbol(Point::new(3, 3), 19), Symbol::CenterStarpoint);
        assert_eq!(base_symbol(Point::new(4, 4), 9), Symbol::CenterStarpoint);
        assert_eq!(base_symbol(Point::new(4, 4), 19), Symbol::Center);
    }

    #[test]
    fn test_board_points_in_a_crop() {
        let b = FlatBoard::build(
            19,
            Cropbox::new(BoardRegion::BottomRight, 19),
            &HashMap::new(),
            &HashMap::new(),
            &HashMap::new(),
        );
        assert_eq!((b.width(), b.height()), (12, 11));
        let corner = Point::new(18, 18);
        let bp = b.board_point(corner).unwrap();
        assert_eq!(bp, Point::new(11, 10));
        assert_eq!(b.intersection_at(bp).unwrap().base, Symbol::BrCorner);
        assert_eq!(b.goban_point(bp), corner);
        assert_eq!(b.board_point(Point::new(0, 0)), None);
        assert!(b.intersection_at(Point::new(-1, 0)).is_none());
    }

    #[test]
    fn test_diff() {
        let a = board(9, &[(Point::new(2, 2), Color::Black)]);
        let b = board(9, &[(Point::new(3, 3), Color::White)]);
        let changed = a.diff(&b);
        let pts: Vec<Point> = changed.iter().map(|i| i.point).collect();
        assert_eq!(pts, vec![Point::new(2, 2), Point::new(3, 3)]);
        assert_eq!(changed[1].stone, Symbol::WStone);
        assert!(a.diff(&a).is_empty());
    }

    #[test]
    #[should_panic(expected = "cannot diff")]
    fn test_diff_mismatched_sizes_panics() {
        let _ = board(9, &[]).diff(&board(13, &[]));
    }
}

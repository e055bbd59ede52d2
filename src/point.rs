//! Board coordinates and their SGF text form.
//!
//! A [`Point`] is a plain value: two points are equal when their coordinates
//! are equal, so points can be used directly as map keys. The origin is the
//! top-left corner; `x` grows to the right and `y` grows downward, matching
//! the SGF convention where `"ab"` is column `a`, row `b`.

use std::fmt;

use strum::{Display, EnumIter, EnumString};
use tracing::warn;

/// An intersection on the board.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Whole-board rotations, measured clockwise.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Rotation {
    #[default]
    NoRotation,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Parse a two-letter SGF coordinate such as `"ab"`.
    ///
    /// Returns `None` for anything that is not exactly two lowercase letters.
    pub fn from_sgf(coord: &str) -> Option<Point> {
        let bytes = coord.as_bytes();
        if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_lowercase) {
            return None;
        }
        Some(Point::new(
            i32::from(bytes[0] - b'a'),
            i32::from(bytes[1] - b'a'),
        ))
    }

    /// The two-letter SGF coordinate for this point.
    pub fn to_sgf(self) -> String {
        let x = char::from(b'a' + self.x.clamp(0, 25) as u8);
        let y = char::from(b'a' + self.y.clamp(0, 25) as u8);
        format!("{x}{y}")
    }

    pub fn translate(self, dx: i32, dy: i32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    pub fn in_bounds(self, size: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < size && self.y < size
    }

    /// Rotate this point clockwise about the center of a `size` board.
    pub fn rotate(self, size: i32, rotation: Rotation) -> Point {
        let m = size - 1;
        match rotation {
            Rotation::NoRotation => self,
            Rotation::Clockwise90 => Point::new(m - self.y, self.x),
            Rotation::Clockwise180 => Point::new(m - self.x, m - self.y),
            Rotation::Clockwise270 => Point::new(self.y, m - self.x),
        }
    }

    /// Mirror across the vertical center line.
    pub fn flip_horz(self, size: i32) -> Point {
        Point::new(size - 1 - self.x, self.y)
    }

    /// Mirror across the horizontal center line.
    pub fn flip_vert(self, size: i32) -> Point {
        Point::new(self.x, size - 1 - self.y)
    }

    /// The four orthogonal neighbors that lie on a `size` board.
    pub fn neighbors(self, size: i32) -> impl Iterator<Item = Point> {
        [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .into_iter()
            .map(move |(dx, dy)| self.translate(dx, dy))
            .filter(move |p| p.in_bounds(size))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Expand one SGF point value into points.
///
/// Accepts either a single coordinate (`"ab"`) or a point rectangle
/// (`"aa:cc"`), which expands row by row from the top-left corner. Malformed
/// values are logged and yield no points.
pub fn points_from_sgf_value(value: &str) -> Vec<Point> {
    if let Some(pt) = Point::from_sgf(value) {
        return vec![pt];
    }
    let Some((tl, br)) = value.split_once(':') else {
        warn!(value, "skipping unparseable point");
        return Vec::new();
    };
    match (Point::from_sgf(tl), Point::from_sgf(br)) {
        (Some(tl), Some(br)) if br.x >= tl.x && br.y >= tl.y => {
            let mut out = Vec::with_capacity(((br.x - tl.x + 1) * (br.y - tl.y + 1)) as usize);
            for y in tl.y..=br.y {
                for x in tl.x..=br.x {
                    out.push(Point::new(x, y));
                }
            }
            out
        }
        _ => {
            warn!(value, "skipping invalid point rectangle");
            Vec::new()
        }
    }
}

/// Whether a value is written as a point rectangle such as `"aa:cc"`.
pub fn is_point_rectangle(value: &str) -> bool {
    let b = value.as_bytes();
    b.len() == 5 && b[2] == b':' && [b[0], b[1], b[3], b[4]].iter().all(u8::is_ascii_lowercase)
}

/// Split a label value of the form `"ab:Text"` into its point and text.
pub fn label_from_sgf_value(value: &str) -> Option<(Point, String)> {
    let (coord, text) = value.split_once(':')?;
    let pt = Point::from_sgf(coord)?;
    Some((pt, text.to_string()))
}

//! Stone colors, moves, and per-color point collections.

use strum::{Display, EnumString};

use crate::point::Point;

/// The state of an intersection, or the color of a player.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Color {
    Black,
    White,
    #[default]
    Empty,
}

impl Color {
    /// The other player. `Empty` stays `Empty`.
    pub fn opposite(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
            Color::Empty => Color::Empty,
        }
    }

    /// The SGF move token for this color (`"B"` or `"W"`).
    pub fn token(self) -> Option<&'static str> {
        match self {
            Color::Black => Some("B"),
            Color::White => Some("W"),
            Color::Empty => None,
        }
    }

    pub fn from_token(token: &str) -> Option<Color> {
        match token {
            "B" => Some(Color::Black),
            "W" => Some(Color::White),
            _ => None,
        }
    }
}

/// A colored stone at a point, or a pass when `point` is `None`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub color: Color,
    pub point: Option<Point>,
}

impl Move {
    pub fn new(color: Color, point: Point) -> Self {
        Self {
            color,
            point: Some(point),
        }
    }

    pub fn pass(color: Color) -> Self {
        Self { color, point: None }
    }

    pub fn is_pass(&self) -> bool {
        self.point.is_none()
    }
}

/// Points grouped by the color of the stones that were on them.
///
/// Used for captures: `black` holds the black stones removed from the board.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Captures {
    pub black: Vec<Point>,
    pub white: Vec<Point>,
}

impl Captures {
    pub fn get(&self, color: Color) -> &[Point] {
        match color {
            Color::Black => &self.black,
            Color::White => &self.white,
            Color::Empty => &[],
        }
    }

    pub fn extend(&mut self, color: Color, points: impl IntoIterator<Item = Point>) {
        match color {
            Color::Black => self.black.extend(points),
            Color::White => self.white.extend(points),
            Color::Empty => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        self.black.is_empty() && self.white.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite() {
        assert_eq!(Color::Black.opposite(), Color::White);
        assert_eq!(Color::White.opposite(), Color::Black);
        assert_eq!(Color::Empty.opposite(), Color::Empty);
    }

    #[test]
    fn test_tokens() {
        assert_eq!(Color::from_token("B"), Some(Color::Black));
        assert_eq!(Color::from_token("x"), None);
        assert_eq!(Color::White.token(), Some("W"));
        assert_eq!(Color::Black.to_string(), "BLACK");
    }

    #[test]
    fn test_captures_by_color() {
        let mut caps = Captures::default();
        assert!(caps.is_empty());
        caps.extend(Color::White, [Point::new(1, 1)]);
        caps.extend(Color::Empty, [Point::new(2, 2)]);
        assert_eq!(caps.get(Color::White), &[Point::new(1, 1)]);
        assert!(caps.get(Color::Black).is_empty());
    }
}

use strum::{Display, EnumIter, EnumString};

use crate::constants::MIN_CROPPABLE_SIZE;
use crate::point::Point;

/// Part of the board a diagram shows.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum BoardRegion {
    #[default]
    All,
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// An inclusive rectangle of board points.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cropbox {
    pub top_left: Point,
    pub bot_right: Point,
}

impl Cropbox {
    /// The rectangle for `region` on a `size` board. Boards smaller than a
    /// full 19x19 are always shown whole.
    pub fn new(region: BoardRegion, size: i32) -> Self {
        let max = size - 1;
        let (mut top, mut left, mut bot, mut right) = (0, 0, max, max);
        if size >= MIN_CROPPABLE_SIZE {
            let half = (max + 1) / 2;
            match region {
                BoardRegion::All => {}
                BoardRegion::Left => right = half + 1,
                BoardRegion::Right => left = half - 1,
                BoardRegion::Top => bot = half + 1,
                BoardRegion::Bottom => top = half - 1,
                BoardRegion::TopLeft => {
                    bot = half + 1;
                    right = half + 2;
                }
                BoardRegion::TopRight => {
                    bot = half + 1;
                    left = half - 2;
                }
                BoardRegion::BottomLeft => {
                    top = half - 1;
                    right = half + 2;
                }
                BoardRegion::BottomRight => {
                    top = half - 1;
                    left = half - 2;
                }
            }
        }
        Self {
            top_left: Point::new(left, top),
            bot_right: Point::new(right, bot),
        }
    }

    pub fn width(&self) -> i32 {
        self.bot_right.x - self.top_left.x + 1
    }

    pub fn height(&self) -> i32 {
        self.bot_right.y - self.top_left.y + 1
    }

    pub fn contains(&self, pt: Point) -> bool {
        (self.top_left.x..=self.bot_right.x).contains(&pt.x) && (self.top_left.y..=self.bot_right.y).contains(&pt.y)
    }

    /// Whether this box shows less than a whole `size` board.
    pub fn is_cropped(&self, size: i32) -> bool {
        *self != Cropbox::new(BoardRegion::All, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_small_boards_are_never_cropped() {
        for region in BoardRegion::iter() {
            let cb = Cropbox::new(region, 9);
            assert_eq!((cb.width(), cb.height()), (9, 9));
            assert!(!cb.is_cropped(9));
        }
    }

    #[test]
    fn test_regions_on_19() {
        let all = Cropbox::new(BoardRegion::All, 19);
        assert_eq!((all.width(), all.height()), (19, 19));

        let top = Cropbox::new(BoardRegion::Top, 19);
        assert_eq!(top.top_left, Point::new(0, 0));
        assert_eq!(top.bot_right, Point::new(18, 10));
        assert!(top.is_cropped(19));

        let br = Cropbox::new(BoardRegion::BottomRight, 19);
        assert_eq!(br.top_left, Point::new(7, 8));
        assert_eq!(br.bot_right, Point::new(18, 18));
        assert!(br.contains(Point::new(18, 18)));
        assert!(!br.contains(Point::new(0, 0)));

        let left = Cropbox::new(BoardRegion::Left, 19);
        assert_eq!((left.width(), left.height()), (11, 19));
    }

    #[test]
    fn test_region_from_str() {
        assert_eq!("TOP_LEFT".parse::<BoardRegion>().unwrap(), BoardRegion::TopLeft);
        assert_eq!("bottom_right".parse::<BoardRegion>().unwrap(), BoardRegion::BottomRight);
        assert!("middle".parse::<BoardRegion>().is_err());
    }
}

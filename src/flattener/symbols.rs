use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::properties::Mark;
use crate::stone::Color;

/// What a renderer draws at one layer of an intersection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Symbol {
    #[default]
    Empty,

    // Board lines
    TlCorner,
    TrCorner,
    BlCorner,
    BrCorner,
    TopEdge,
    BotEdge,
    LeftEdge,
    RightEdge,
    Center,
    CenterStarpoint,

    // Stones
    #[strum(serialize = "BSTONE")]
    BStone,
    #[strum(serialize = "WSTONE")]
    WStone,

    // Marks
    Triangle,
    Square,
    Circle,
    #[strum(serialize = "XMARK")]
    XMark,
    #[strum(serialize = "TEXTLABEL")]
    TextLabel,
    #[strum(serialize = "LASTMOVE")]
    LastMove,
    #[strum(serialize = "NEXTVARIATION")]
    NextVariation,
    CorrectVariation,
    KoLocation,
}

impl Symbol {
    pub fn from_stone(color: Color) -> Symbol {
        match color {
            Color::Black => Symbol::BStone,
            Color::White => Symbol::WStone,
            Color::Empty => Symbol::Empty,
        }
    }

    pub fn from_mark(mark: Mark) -> Symbol {
        match mark {
            Mark::Circle => Symbol::Circle,
            Mark::Label => Symbol::TextLabel,
            Mark::XMark => Symbol::XMark,
            Mark::Square => Symbol::Square,
            Mark::Triangle => Symbol::Triangle,
        }
    }

    pub fn is_stone(self) -> bool {
        matches!(self, Symbol::BStone | Symbol::WStone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_names() {
        assert_eq!(Symbol::TlCorner.to_string(), "TL_CORNER");
        assert_eq!(Symbol::CenterStarpoint.to_string(), "CENTER_STARPOINT");
        assert_eq!(Symbol::BStone.to_string(), "BSTONE");
        assert_eq!(Symbol::XMark.to_string(), "XMARK");
        assert_eq!(Symbol::CorrectVariation.to_string(), "CORRECT_VARIATION");
        assert_eq!("KO_LOCATION".parse::<Symbol>().unwrap(), Symbol::KoLocation);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Symbol::from_stone(Color::White), Symbol::WStone);
        assert_eq!(Symbol::from_mark(Mark::Label), Symbol::TextLabel);
        assert!(Symbol::BStone.is_stone());
        assert!(!Symbol::Circle.is_stone());
    }
}

//! The per-node property store.
//!
//! Every node in a [`MoveTree`](crate::movetree::MoveTree) carries a
//! [`Properties`]: a map from a validated SGF property code ([`Prop`]) to an
//! ordered list of string values. Codes keep the order they were first added
//! in, and values keep insertion order with duplicates allowed.
//!
//! Typed access goes through [`Prop`], so an unknown code can only arrive via
//! [`Properties::add_raw`], which logs and drops it.

use std::collections::BTreeMap;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::warn;

use crate::point::{Point, Rotation, is_point_rectangle, label_from_sgf_value, points_from_sgf_value};
use crate::stone::{Color, Move};

/// The closed set of property codes the engine accepts.
#[allow(clippy::upper_case_acronyms)]
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter, IntoStaticStr,
)]
pub enum Prop {
    /// Add black stones.
    AB,
    /// Clear points.
    AE,
    /// Annotator.
    AN,
    /// Application that wrote the record.
    AP,
    /// Arrow between two points.
    AR,
    AS,
    /// Add white stones.
    AW,
    /// Black move.
    B,
    BL,
    BM,
    /// Black rank.
    BR,
    BS,
    BT,
    /// Comment.
    C,
    /// Charset.
    CA,
    CH,
    CP,
    /// Circle mark.
    CR,
    /// Dim points.
    DD,
    DM,
    DO,
    /// Date.
    DT,
    EL,
    /// Event.
    EV,
    EX,
    /// File format.
    FF,
    FG,
    /// Good for black.
    GB,
    /// Game comment.
    GC,
    /// Game type.
    GM,
    /// Game name.
    GN,
    /// Good for white.
    GW,
    /// Handicap.
    HA,
    HO,
    ID,
    IP,
    IT,
    IY,
    /// Komi.
    KM,
    KO,
    L,
    /// Text label, `"ab:Text"`.
    LB,
    /// Line between two points.
    LN,
    LT,
    M,
    /// X mark.
    MA,
    MN,
    MU,
    N,
    OB,
    OH,
    OM,
    ON,
    OP,
    OT,
    OV,
    OW,
    /// Black player name.
    PB,
    /// Place.
    PC,
    /// Player to move.
    PL,
    PM,
    /// White player name.
    PW,
    /// Result.
    RE,
    RG,
    /// Round.
    RO,
    /// Ruleset.
    RU,
    SC,
    SE,
    SI,
    /// Selected points.
    SL,
    /// Source.
    SO,
    /// Square mark.
    SQ,
    ST,
    SU,
    /// Board size.
    SZ,
    /// Black territory.
    TB,
    TC,
    TE,
    TM,
    /// Triangle mark.
    TR,
    /// White territory.
    TW,
    UC,
    US,
    V,
    VW,
    /// White move.
    W,
    WL,
    /// White rank.
    WR,
    WS,
    WT,
}

impl Prop {
    /// Properties whose values are board coordinates. Only these are
    /// touched by rotation and flipping.
    pub fn holds_points(self) -> bool {
        matches!(
            self,
            Prop::CR
                | Prop::LB
                | Prop::MA
                | Prop::SQ
                | Prop::TR
                | Prop::B
                | Prop::W
                | Prop::AW
                | Prop::AB
                | Prop::AE
                | Prop::AR
                | Prop::DD
                | Prop::LN
                | Prop::TB
                | Prop::TW
        )
    }

    /// Properties whose values may be written as point rectangles.
    pub fn accepts_rectangles(self) -> bool {
        matches!(
            self,
            Prop::AB
                | Prop::AW
                | Prop::AE
                | Prop::CR
                | Prop::DD
                | Prop::MA
                | Prop::SL
                | Prop::SQ
                | Prop::TB
                | Prop::TR
                | Prop::TW
        )
    }
}

/// Board marks that can be read from a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Mark {
    Circle,
    Label,
    XMark,
    Square,
    Triangle,
}

impl Mark {
    /// The marking properties, in the order marks are collected.
    pub const PROPS: [(Prop, Mark); 5] = [
        (Prop::CR, Mark::Circle),
        (Prop::LB, Mark::Label),
        (Prop::MA, Mark::XMark),
        (Prop::SQ, Mark::Square),
        (Prop::TR, Mark::Triangle),
    ];
}

/// A mark at a point. Only labels carry text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkedPoint {
    pub point: Point,
    pub label: Option<String>,
}

/// Conditions used to judge a position, e.g. `{GB: [], C: ["Correct"]}`.
///
/// An empty substring list means "the property exists".
pub type ProblemConditions = BTreeMap<Prop, Vec<String>>;

/// One line of displayable game information.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameInfo {
    pub prop: Prop,
    pub display_name: &'static str,
    pub value: String,
}

const GAME_INFO_NAMES: [(Prop, &str); 12] = [
    (Prop::PW, "White Player"),
    (Prop::PB, "Black Player"),
    (Prop::RE, "Result"),
    (Prop::AN, "Commenter"),
    (Prop::SO, "Source"),
    (Prop::RU, "Ruleset"),
    (Prop::KM, "Komi"),
    (Prop::GN, "Game Name"),
    (Prop::EV, "Event"),
    (Prop::RO, "Round"),
    (Prop::PC, "Place Name"),
    (Prop::DT, "Date"),
];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(Prop, Vec<String>)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_mut(&mut self, prop: Prop) -> &mut Vec<String> {
        let idx = match self.entries.iter().position(|(p, _)| *p == prop) {
            Some(idx) => idx,
            None => {
                self.entries.push((prop, Vec::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    /// Append one value to `prop`. A point rectangle given to a property
    /// that accepts them is stored as the points it covers.
    pub fn add(&mut self, prop: Prop, value: impl Into<String>) -> &mut Self {
        push_value(self.entry_mut(prop), prop, value.into());
        self
    }

    /// Append several values to `prop`, keeping their order.
    ///
    /// Adding an empty list still records the property with no values, which
    /// serializes as `KEY[]`.
    pub fn add_all<I, S>(&mut self, prop: Prop, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.entry_mut(prop);
        for v in values {
            push_value(entry, prop, v.into());
        }
        self
    }

    /// Append values under a textual property code.
    ///
    /// Returns `false`, storing nothing, when the code is not a known
    /// property.
    pub fn add_raw(&mut self, code: &str, values: Vec<String>) -> bool {
        match code.parse::<Prop>() {
            Ok(prop) => {
                self.add_all(prop, values);
                true
            }
            Err(_) => {
                warn!(code, "ignoring unknown property");
                false
            }
        }
    }

    /// Replace every value of `prop`.
    pub fn set<I, S>(&mut self, prop: Prop, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.entry_mut(prop);
        entry.clear();
        for v in values {
            push_value(entry, prop, v.into());
        }
        self
    }

    pub fn get_all(&self, prop: Prop) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(p, _)| *p == prop)
            .map(|(_, v)| v.as_slice())
    }

    /// The first value of `prop`.
    pub fn get_one(&self, prop: Prop) -> Option<&str> {
        self.get_nth(prop, 0)
    }

    pub fn get_nth(&self, prop: Prop, index: usize) -> Option<&str> {
        self.get_all(prop)
            .and_then(|v| v.get(index))
            .map(String::as_str)
    }

    pub fn contains(&self, prop: Prop) -> bool {
        self.entries.iter().any(|(p, _)| *p == prop)
    }

    pub fn has_value(&self, prop: Prop, value: &str) -> bool {
        self.get_all(prop)
            .is_some_and(|vals| vals.iter().any(|v| v == value))
    }

    /// Delete `prop`, returning the values it held.
    pub fn remove(&mut self, prop: Prop) -> Option<Vec<String>> {
        let idx = self.entries.iter().position(|(p, _)| *p == prop)?;
        Some(self.entries.remove(idx).1)
    }

    /// Remove the first occurrence of `value` under `prop`. The property is
    /// dropped entirely once it has no values left.
    pub fn remove_one_value(&mut self, prop: Prop, value: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(p, _)| *p == prop)?;
        let vals = &mut self.entries[idx].1;
        let pos = vals.iter().position(|v| v == value)?;
        let removed = vals.remove(pos);
        if vals.is_empty() {
            self.entries.remove(idx);
        }
        Some(removed)
    }

    /// Iterate properties in the order they were first added.
    pub fn iter(&self) -> impl Iterator<Item = (Prop, &[String])> {
        self.entries.iter().map(|(p, v)| (*p, v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse the first value of `prop` as a coordinate.
    pub fn get_as_point(&self, prop: Prop) -> Option<Point> {
        self.get_one(prop).and_then(Point::from_sgf)
    }

    /// The move recorded at this node, if any. `B[]` and `W[]` are passes.
    pub fn get_move(&self) -> Option<Move> {
        let (color, value) = if let Some(v) = self.get_one(Prop::B) {
            (Color::Black, v)
        } else if let Some(v) = self.get_one(Prop::W) {
            (Color::White, v)
        } else if self.contains(Prop::B) {
            (Color::Black, "")
        } else if self.contains(Prop::W) {
            (Color::White, "")
        } else {
            return None;
        };
        if value.is_empty() {
            return Some(Move::pass(color));
        }
        match Point::from_sgf(value) {
            Some(pt) => Some(Move::new(color, pt)),
            None => {
                warn!(value, "move has an unparseable coordinate");
                Some(Move::pass(color))
            }
        }
    }

    fn points_of(&self, prop: Prop) -> Vec<Point> {
        self.get_all(prop)
            .map(|vals| vals.iter().flat_map(|v| points_from_sgf_value(v)).collect())
            .unwrap_or_default()
    }

    /// Stones placed with `AB` or `AW`.
    pub fn placements(&self, color: Color) -> Vec<Point> {
        match color {
            Color::Black => self.points_of(Prop::AB),
            Color::White => self.points_of(Prop::AW),
            Color::Empty => Vec::new(),
        }
    }

    /// Points cleared with `AE`.
    pub fn clear_locations(&self) -> Vec<Point> {
        self.points_of(Prop::AE)
    }

    pub fn comment(&self) -> Option<&str> {
        self.get_one(Prop::C)
    }

    /// All marks at this node, grouped by mark type. Labels carry their text.
    pub fn all_marks(&self) -> BTreeMap<Mark, Vec<MarkedPoint>> {
        let mut out = BTreeMap::new();
        for (prop, mark) in Mark::PROPS {
            let Some(vals) = self.get_all(prop) else {
                continue;
            };
            let mut marked = Vec::new();
            for v in vals {
                if prop == Prop::LB {
                    match label_from_sgf_value(v) {
                        Some((point, text)) => marked.push(MarkedPoint {
                            point,
                            label: Some(text),
                        }),
                        None => warn!(value = %v, "skipping malformed label"),
                    }
                } else {
                    marked.extend(
                        points_from_sgf_value(v)
                            .into_iter()
                            .map(|point| MarkedPoint { point, label: None }),
                    );
                }
            }
            if !marked.is_empty() {
                out.insert(mark, marked);
            }
        }
        out
    }

    /// Placements plus the node's move, by color. Passes are left out.
    pub fn all_stones(&self) -> Vec<Move> {
        let mut out: Vec<Move> = self
            .placements(Color::Black)
            .into_iter()
            .map(|p| Move::new(Color::Black, p))
            .chain(
                self.placements(Color::White)
                    .into_iter()
                    .map(|p| Move::new(Color::White, p)),
            )
            .collect();
        if let Some(mv) = self.get_move().filter(|m| !m.is_pass()) {
            out.push(mv);
        }
        out
    }

    /// Whether any condition holds for these properties.
    pub fn matches(&self, conditions: &ProblemConditions) -> bool {
        conditions.iter().any(|(prop, substrings)| {
            let Some(values) = self.get_all(*prop) else {
                return false;
            };
            substrings.is_empty()
                || values
                    .iter()
                    .any(|v| substrings.iter().any(|s| v.contains(s.as_str())))
        })
    }

    /// Display pairs for the standard game-information properties.
    pub fn game_info(&self) -> Vec<GameInfo> {
        let mut out = Vec::new();
        for (prop, display_name) in GAME_INFO_NAMES {
            let Some(raw) = self.get_one(prop) else {
                continue;
            };
            let mut value = raw.to_string();
            match prop {
                Prop::PW => {
                    if let Some(rank) = self.get_one(Prop::WR) {
                        value = format!("{value} [{rank}]");
                    }
                }
                Prop::PB => {
                    if let Some(rank) = self.get_one(Prop::BR) {
                        value = format!("{value} [{rank}]");
                    }
                }
                Prop::KM => {
                    value = raw
                        .trim()
                        .parse::<f64>()
                        .map(|k| k.to_string())
                        .unwrap_or_else(|_| "0".to_string());
                }
                _ => {}
            }
            out.push(GameInfo {
                prop,
                display_name,
                value,
            });
        }
        out
    }

    /// Rotate every point-valued property on a `size` board.
    pub fn rotate(&mut self, size: i32, rotation: Rotation) {
        if rotation == Rotation::NoRotation {
            return;
        }
        self.map_points(|p| p.rotate(size, rotation));
    }

    pub fn flip_horz(&mut self, size: i32) {
        self.map_points(|p| p.flip_horz(size));
    }

    pub fn flip_vert(&mut self, size: i32) {
        self.map_points(|p| p.flip_vert(size));
    }

    fn map_points(&mut self, f: impl Fn(Point) -> Point) {
        for (prop, vals) in &mut self.entries {
            if !prop.holds_points() {
                continue;
            }
            let is_label = *prop == Prop::LB;
            for v in vals.iter_mut() {
                *v = transform_value(v, is_label, &f);
            }
        }
    }
}

fn push_value(entry: &mut Vec<String>, prop: Prop, value: String) {
    if prop.accepts_rectangles() && is_point_rectangle(&value) {
        entry.extend(points_from_sgf_value(&value).into_iter().map(|p| p.to_sgf()));
    } else {
        entry.push(value);
    }
}

/// Rewrite the coordinates inside one value. Labels only transform the part
/// before the first `:`; other values transform each `:`-separated part that
/// is a coordinate.
fn transform_value(value: &str, is_label: bool, f: &impl Fn(Point) -> Point) -> String {
    let apply = |part: &str| match Point::from_sgf(part) {
        Some(pt) => f(pt).to_sgf(),
        None => part.to_string(),
    };
    if is_label {
        return match value.split_once(':') {
            Some((coord, text)) => format!("{}:{text}", apply(coord)),
            None => value.to_string(),
        };
    }
    value.split(':').map(apply).collect::<Vec<_>>().join(":")
}

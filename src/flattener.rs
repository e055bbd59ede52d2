//! Flattening: turning a position into a display-ready grid.
//!
//! [`flatten`] combines the node under a cursor, the board at that node, and
//! an optional run of next moves into a [`Flattened`] value. Each point of
//! the (possibly cropped) board gets its board lines, a stone, a mark, and a
//! text label. Moves from the next-moves path are numbered; a move that lands
//! on an occupied point is recorded as a [`CollisionRecord`] so a renderer
//! can list it under the diagram ("5 at a").
//!
//! A `Flattened` is computed fresh for each query and never changes.

mod board;
mod cropbox;
mod intersection;
mod symbols;

use std::collections::{HashMap, HashSet};

use strum::{Display, EnumString};
use tracing::debug;

pub use board::{FlatBoard, base_symbol};
pub use cropbox::{BoardRegion, Cropbox};
pub use intersection::Intersection;
pub use symbols::Symbol;

use crate::constants::{COLLISION_LABELS, LABEL_WRAP};
use crate::goban::Goban;
use crate::movetree::{Cursor, MoveTree};
use crate::point::Point;
use crate::problems::correct_next_moves;
use crate::properties::ProblemConditions;
use crate::stone::{Color, Move};
use crate::treepath::{AppliedStone, Collision, Treepath, apply_next_moves};

/// When to number the variations that follow the shown position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ShowVariations {
    #[default]
    Never,
    Always,
    MoreThanOne,
}

/// Display options for [`flatten`].
#[derive(Clone, Debug, Default)]
pub struct FlattenOptions<'g> {
    /// Board to draw from. When absent the board is rebuilt from the root.
    pub goban: Option<&'g Goban>,
    /// Start from this path (from the root) instead of the given cursor.
    pub init_position: Option<Treepath>,
    /// Moves to show numbered on top of the position.
    pub next_moves_path: Treepath,
    /// Number of the first move in `next_moves_path`; worked out from the
    /// tree when absent.
    pub starting_move_num: Option<usize>,
    pub board_region: BoardRegion,
    pub show_variations: ShowVariations,
    pub mark_last_move: bool,
    /// The next move a viewer has picked; its variation label gets a `.`.
    pub selected_next_move: Option<Move>,
    pub mark_ko: bool,
    /// Used to tell correct variations from the rest.
    pub problem_conditions: ProblemConditions,
    /// Drop the marks stored in the record.
    pub clear_marks: bool,
    /// Drop every text label, including move numbers.
    pub ignore_labels: bool,
}

/// A numbered move whose point was already occupied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollisionRecord {
    pub color: Color,
    pub move_number: usize,
    /// The label of the point the move landed on.
    pub label: String,
    /// Color of the stone shown at that point.
    pub collision_stone_color: Color,
}

/// A flattened position.
#[derive(Clone, Debug)]
pub struct Flattened {
    board: FlatBoard,
    collisions: Vec<CollisionRecord>,
    comment: String,
    is_on_main_path: bool,
    starting_move_num: usize,
    ending_move_num: usize,
    base_move_num: usize,
    main_line_move_num: usize,
    main_line_move: Option<Move>,
    next_main_line_move: Option<Move>,
    stone_map: HashMap<Point, Color>,
    size: i32,
}

impl Flattened {
    /// A bare board of the given size.
    pub fn empty(size: i32) -> Self {
        let cropbox = Cropbox::new(BoardRegion::All, size);
        Self {
            board: FlatBoard::build(size, cropbox, &HashMap::new(), &HashMap::new(), &HashMap::new()),
            collisions: Vec::new(),
            comment: String::new(),
            is_on_main_path: true,
            starting_move_num: 1,
            ending_move_num: 1,
            base_move_num: 0,
            main_line_move_num: 0,
            main_line_move: None,
            next_main_line_move: None,
            stone_map: HashMap::new(),
            size,
        }
    }

    pub fn board(&self) -> &FlatBoard {
        &self.board
    }

    pub fn collisions(&self) -> &[CollisionRecord] {
        &self.collisions
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn is_on_main_path(&self) -> bool {
        self.is_on_main_path
    }

    pub fn starting_move_num(&self) -> usize {
        self.starting_move_num
    }

    pub fn ending_move_num(&self) -> usize {
        self.ending_move_num
    }

    /// Node number of the position the next moves start from.
    pub fn base_move_num(&self) -> usize {
        self.base_move_num
    }

    pub fn main_line_move_num(&self) -> usize {
        self.main_line_move_num
    }

    /// The move at the nearest mainline node at or above the position.
    pub fn main_line_move(&self) -> Option<Move> {
        self.main_line_move
    }

    pub fn next_main_line_move(&self) -> Option<Move> {
        self.next_main_line_move
    }

    pub fn stone_at(&self, pt: Point) -> Color {
        self.stone_map.get(&pt).copied().unwrap_or(Color::Empty)
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn is_cropped(&self) -> bool {
        self.board.cropbox().is_cropped(self.size)
    }

    /// Shorten a move-number label for this diagram. Diagrams spanning a
    /// hundred moves or more keep full numbers.
    pub fn auto_truncate_label(&self, label: &str) -> String {
        let long_branch = self.ending_move_num.saturating_sub(self.starting_move_num) >= LABEL_WRAP as usize;
        auto_truncate_label(label, long_branch)
    }
}

/// Wrap numeric labels above 100 to their last two digits: `101` is `"1"`,
/// `222` is `"22"`. Exact hundreds and non-numbers are left alone, as is
/// everything when `long_branch` is set.
pub fn auto_truncate_label(label: &str, long_branch: bool) -> String {
    match label.parse::<u32>() {
        Ok(n) if !long_branch && n > LABEL_WRAP && n % LABEL_WRAP != 0 => (n % LABEL_WRAP).to_string(),
        _ => label.to_string(),
    }
}

/// Flatten the whole tree from its root with the given options.
pub fn flatten_tree(tree: &MoveTree, opts: &FlattenOptions<'_>) -> Flattened {
    flatten(tree.root(), opts)
}

/// Flatten the position at `cursor`.
pub fn flatten(cursor: Cursor<'_>, opts: &FlattenOptions<'_>) -> Flattened {
    let tree = cursor.tree();
    let cur = match &opts.init_position {
        Some(path) => tree.root().descend(path),
        None => cursor,
    };
    let rebuilt;
    let goban = match opts.goban {
        Some(g) => g,
        None => {
            rebuilt = Goban::from_tree(tree, &cur.treepath_to_here()).goban;
            &rebuilt
        }
    };
    let nmtp = &opts.next_moves_path;

    let starting = opts.starting_move_num.unwrap_or_else(|| {
        if cur.on_mainline() {
            if nmtp.first().is_some_and(|&v| v > 0) { 1 } else { cur.node().node_num() + 1 }
        } else {
            cur.moves_to_mainline() + 1
        }
    });
    let cropbox = Cropbox::new(opts.board_region, goban.size());

    let mainline = cur.mainline_node();
    let main_line_move = mainline.last_move();
    let next_main_line_move = mainline.child(0).and_then(|c| c.last_move());

    let applied = apply_next_moves(cur, goban, nmtp);
    let end = applied.cursor;

    let mut stone_map: HashMap<Point, Color> = HashMap::new();
    for mv in goban.all_placed_stones() {
        if let Some(pt) = mv.point {
            stone_map.insert(pt, mv.color);
        }
    }
    for stone in &applied.stones {
        stone_map.entry(stone.point).or_insert(stone.color);
    }

    let steps = end.node().node_num() - cur.node().node_num();
    let ending = (starting + steps).saturating_sub(1).max(starting);

    let correct: HashSet<Point> = if opts.problem_conditions.is_empty() {
        HashSet::new()
    } else {
        correct_next_moves(end, &opts.problem_conditions)
            .into_iter()
            .filter_map(|m| m.point)
            .collect()
    };

    let mut marks = MarkLayer::default();
    if !opts.clear_marks {
        for (mark, points) in end.properties().all_marks() {
            for mp in points {
                marks.marks.insert(mp.point, Symbol::from_mark(mark));
                if let Some(text) = mp.label {
                    marks.labels.insert(mp.point, text);
                }
            }
        }
    }

    let show_variations = match opts.show_variations {
        ShowVariations::Always => true,
        ShowVariations::MoreThanOne => end.num_children() > 1,
        ShowVariations::Never => false,
    };
    if show_variations {
        marks.variation_labels(end, opts.selected_next_move, &correct);
    }

    let collisions = if applied.stones.is_empty() {
        Vec::new()
    } else {
        marks.stone_labels(&applied.stones, starting, &stone_map)
    };

    if opts.mark_last_move {
        if let Some(pt) = end.last_move().and_then(|m| m.point) {
            marks.marks.entry(pt).or_insert(Symbol::LastMove);
        }
    }
    if opts.mark_ko && nmtp.is_empty() {
        if let Some(ko) = goban.ko() {
            marks.marks.entry(ko).or_insert(Symbol::KoLocation);
        }
    }
    if opts.ignore_labels {
        marks.marks.retain(|_, m| *m != Symbol::TextLabel);
        marks.labels.clear();
    }

    let board = FlatBoard::build(goban.size(), cropbox, &stone_map, &marks.marks, &marks.labels);
    debug!(
        starting,
        ending,
        collisions = collisions.len(),
        cropped = cropbox.is_cropped(goban.size()),
        "flattened position"
    );
    Flattened {
        board,
        collisions,
        comment: end.properties().comment().unwrap_or_default().to_string(),
        is_on_main_path: end.on_mainline(),
        starting_move_num: starting,
        ending_move_num: ending,
        base_move_num: cur.node().node_num(),
        main_line_move_num: mainline.node().node_num(),
        main_line_move,
        next_main_line_move,
        stone_map,
        size: goban.size(),
    }
}

/// Marks and labels under construction, one of each per point.
#[derive(Default)]
struct MarkLayer {
    marks: HashMap<Point, Symbol>,
    labels: HashMap<Point, String>,
}

impl MarkLayer {
    /// Mark the children of `end`, numbering those at points that carry no
    /// label yet.
    fn variation_labels(&mut self, end: Cursor<'_>, selected: Option<Move>, correct: &HashSet<Point>) {
        for i in 0..end.num_children() {
            let Some(mv) = end.child(i).and_then(|c| c.last_move()) else {
                continue;
            };
            let Some(pt) = mv.point else {
                continue;
            };
            let mark = if correct.contains(&pt) {
                Symbol::CorrectVariation
            } else {
                Symbol::NextVariation
            };
            self.marks.insert(pt, mark);
            self.labels.entry(pt).or_insert_with(|| {
                let mut label = (i + 1).to_string();
                if selected == Some(mv) {
                    label.push('.');
                }
                label
            });
        }
    }

    /// Label each applied stone with its move number, or record a collision
    /// when the point was taken.
    fn stone_labels(
        &mut self,
        stones: &[AppliedStone],
        starting: usize,
        stone_map: &HashMap<Point, Color>,
    ) -> Vec<CollisionRecord> {
        // Old move numbers would clash with the new ones.
        let stale: Vec<Point> = self
            .labels
            .iter()
            .filter(|(_, l)| l.chars().any(|c| c.is_ascii_digit()))
            .map(|(&pt, _)| pt)
            .collect();
        for pt in stale {
            self.labels.remove(&pt);
            self.marks.remove(&pt);
        }

        let mut letters = COLLISION_LABELS.chars().cycle();
        let mut collisions = Vec::new();
        for stone in stones {
            let pt = stone.point;
            let move_number = starting + stone.ply;
            let Some(collision) = stone.collision else {
                self.marks.insert(pt, Symbol::TextLabel);
                self.labels.insert(pt, move_number.to_string());
                continue;
            };
            let label = match (self.labels.get(&pt), collision) {
                (Some(existing), _) => existing.clone(),
                (None, Collision::Earlier(ply)) => (starting + ply).to_string(),
                (None, Collision::External) => {
                    let letter = letters.next().map(String::from).unwrap_or_default();
                    self.marks.insert(pt, Symbol::TextLabel);
                    self.labels.insert(pt, letter.clone());
                    letter
                }
            };
            collisions.push(CollisionRecord {
                color: stone.color,
                move_number,
                label,
                collision_stone_color: stone_map.get(&pt).copied().unwrap_or(Color::Empty),
            });
        }
        collisions
    }
}

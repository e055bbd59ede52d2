//! Treepaths: compact descriptions of routes through a [`MoveTree`].
//!
//! A treepath is a list of variation indices; element `i` says which child to
//! take at step `i`. Two string forms exist:
//!
//! - A *fragment* describes a route from wherever you are:
//!   `"0.1.0"` is `[0, 1, 0]`, `"1:3"` is `[1, 1, 1]`, and a trailing `+`
//!   appends [`TO_END_LEN`] zeros ("follow the first variation to the end").
//! - An *initial path* describes a route from the root, where the first
//!   number is a move number along the mainline: `"3"` is `[0, 0, 0]` and
//!   `"2.1"` is `[0, 0, 1]`.
//!
//! [`MoveTree`]: crate::movetree::MoveTree

use tracing::trace;

use crate::constants::{DEFAULT_MAX_MOVES, MAX_TREEPATH_LEN, TO_END_LEN};
use crate::error::TreepathError;
use crate::goban::Goban;
use crate::movetree::Cursor;
use crate::point::Point;
use crate::stone::Color;

/// A sequence of variation indices.
pub type Treepath = Vec<usize>;

/// The "go to the end" run of first-child steps.
pub fn to_end() -> Treepath {
    vec![0; TO_END_LEN]
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Token<'s> {
    Num(&'s str),
    Sep(char),
}

/// Split a fragment into numbers and the separators `.`, `:` and `+`.
fn tokenize(s: &str) -> Vec<Token<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if matches!(c, '.' | ':' | '+') {
            if start < i {
                out.push(Token::Num(&s[start..i]));
            }
            out.push(Token::Sep(c));
            start = i + c.len_utf8();
        }
    }
    if start < s.len() {
        out.push(Token::Num(&s[start..]));
    }
    out
}

fn number(token: &str, path: &str) -> Result<usize, TreepathError> {
    let expected = || TreepathError::ExpectedNumber {
        token: token.to_string(),
        path: path.to_string(),
    };
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(expected());
    }
    token.parse().map_err(|_| expected())
}

/// Push `n` copies of `v`, refusing to grow the path past [`MAX_TREEPATH_LEN`].
fn extend_capped(out: &mut Treepath, v: usize, n: usize, path: &str) -> Result<(), TreepathError> {
    if n > MAX_TREEPATH_LEN - out.len().min(MAX_TREEPATH_LEN) {
        return Err(TreepathError::TooLong {
            path: path.to_string(),
            max: MAX_TREEPATH_LEN,
        });
    }
    out.extend(std::iter::repeat_n(v, n));
    Ok(())
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Expect {
    Variation,
    Separator,
    Multiplier,
}

/// Parse a fragment string such as `"0.1:3.2+"`.
///
/// An empty string is the empty path. `a:n` repeats `a` n times in total, so
/// `0:0` and `0:1` both mean `[0]`.
pub fn parse_fragment(s: &str) -> Result<Treepath, TreepathError> {
    let mut out = Vec::new();
    let mut expect = Expect::Variation;
    let mut prev: Option<usize> = None;
    if s.is_empty() {
        return Ok(out);
    }
    for token in tokenize(s) {
        match (expect, token) {
            (Expect::Separator, Token::Sep('.')) => expect = Expect::Variation,
            (Expect::Separator, Token::Sep(':')) => expect = Expect::Multiplier,
            (Expect::Separator, Token::Sep(_)) => {
                extend_capped(&mut out, 0, TO_END_LEN, s)?;
                return Ok(out);
            }
            (Expect::Separator, Token::Num(tok)) => {
                return Err(TreepathError::UnexpectedToken {
                    token: tok.to_string(),
                    path: s.to_string(),
                });
            }
            (Expect::Variation, Token::Num(tok)) => {
                let n = number(tok, s)?;
                extend_capped(&mut out, n, 1, s)?;
                prev = Some(n);
                expect = Expect::Separator;
            }
            (Expect::Multiplier, Token::Num(tok)) => {
                let n = number(tok, s)?;
                let Some(v) = prev.take() else {
                    return Err(TreepathError::DanglingMultiplier { path: s.to_string() });
                };
                extend_capped(&mut out, v, n.saturating_sub(1), s)?;
                expect = Expect::Separator;
            }
            (_, Token::Sep(c)) => {
                return Err(TreepathError::ExpectedNumber {
                    token: c.to_string(),
                    path: s.to_string(),
                });
            }
        }
    }
    if expect == Expect::Separator {
        Ok(out)
    } else {
        Err(TreepathError::ExpectedNumber {
            token: String::new(),
            path: s.to_string(),
        })
    }
}

/// Parse an initial path such as `"53"`, `"2.1.0"`, or `"+"`.
pub fn parse_initial_path(s: &str) -> Result<Treepath, TreepathError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(Vec::new());
    }
    if s == "+" {
        return Ok(to_end());
    }
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    let move_num = number(&s[..digits], s)?;
    let mut out = Vec::new();
    extend_capped(&mut out, 0, move_num, s)?;
    let rest = &s[digits..];
    match rest.chars().next() {
        None => {}
        Some('.') => {
            let tail = parse_fragment(&rest[1..])?;
            if tail.len() > MAX_TREEPATH_LEN - out.len() {
                return Err(TreepathError::TooLong {
                    path: s.to_string(),
                    max: MAX_TREEPATH_LEN,
                });
            }
            out.extend(tail);
        }
        Some('+') => extend_capped(&mut out, 0, TO_END_LEN, s)?,
        Some(c) => {
            return Err(TreepathError::UnexpectedToken {
                token: c.to_string(),
                path: s.to_string(),
            });
        }
    }
    Ok(out)
}

/// Write a fragment back out, collapsing runs: `[0,0,0,0,1,1,1]` is
/// `"0:4.1:3"`. The empty path is `""`.
pub fn to_fragment_string(path: &[usize]) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut i = 0;
    while i < path.len() {
        let v = path[i];
        let run = path[i..].iter().take_while(|&&x| x == v).count();
        if run < 2 {
            parts.push(v.to_string());
        } else {
            parts.push(format!("{v}:{run}"));
        }
        i += run;
    }
    parts.join(".")
}

/// Write a path from the root as an initial path: leading zeros become a
/// move number, so `[0,0,0,1]` is `"3.1"`. The empty path is `"0"`.
pub fn to_init_path_string(path: &[usize]) -> String {
    let leading = path.iter().take_while(|&&v| v == 0).count();
    let rest = to_fragment_string(&path[leading..]);
    if rest.is_empty() {
        leading.to_string()
    } else {
        format!("{leading}.{rest}")
    }
}

// =============================================================================
// Replaying paths
// =============================================================================

/// How a next-move relates to stones already accounted for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Collision {
    /// The point already holds a stone on the starting board.
    External,
    /// The point was played earlier in the same path, at this ply.
    Earlier(usize),
}

/// A move met while replaying a next-moves path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedStone {
    pub color: Color,
    pub point: Point,
    /// Index of the step in the path that produced this move.
    pub ply: usize,
    pub collision: Option<Collision>,
}

#[derive(Clone, Debug)]
pub struct AppliedTreepath<'a> {
    /// Where the replay ended.
    pub cursor: Cursor<'a>,
    pub stones: Vec<AppliedStone>,
}

/// Walk `next_moves` from `cursor`, classifying each move against `goban`
/// (the board at the starting position) and against earlier moves of the
/// walk. The board itself is not changed.
///
/// The walk stops at the first missing child. Passes are stepped over.
pub fn apply_next_moves<'a>(cursor: Cursor<'a>, goban: &Goban, next_moves: &[usize]) -> AppliedTreepath<'a> {
    let mut cur = cursor;
    let mut stones: Vec<AppliedStone> = Vec::new();
    for (ply, &var) in next_moves.iter().enumerate() {
        let Some(next) = cur.child(var) else {
            break;
        };
        cur = next;
        let Some(mv) = cur.last_move() else {
            continue;
        };
        let Some(point) = mv.point else {
            continue;
        };
        let collision = if goban.stone(point) != Color::Empty {
            Some(Collision::External)
        } else {
            stones
                .iter()
                .rev()
                .find(|s| s.point == point)
                .map(|s| Collision::Earlier(s.ply))
        };
        trace!(ply, %point, ?collision, "applied next move");
        stones.push(AppliedStone {
            color: mv.color,
            point,
            ply,
            collision,
        });
    }
    AppliedTreepath { cursor: cur, stones }
}

/// Options for [`find_next_moves_path`].
#[derive(Clone, Debug)]
pub struct NextMovesOptions {
    /// Start here (from the root) instead of at the given cursor.
    pub init_treepath: Option<Treepath>,
    /// Stop at the first ancestor with a comment.
    pub break_on_comment: bool,
    /// Upper bound on the number of steps walked.
    pub max_moves: usize,
}

impl Default for NextMovesOptions {
    fn default() -> Self {
        Self {
            init_treepath: None,
            break_on_comment: true,
            max_moves: DEFAULT_MAX_MOVES,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NextMovesPath<'a> {
    /// The position the path starts from.
    pub cursor: Cursor<'a>,
    /// Route from the root to `cursor`.
    pub treepath: Treepath,
    /// Route from `cursor` back down to the starting node.
    pub next_moves: Treepath,
}

/// Walk up from a position to find a sensible start for numbering the moves
/// that led to it.
///
/// The walk stops after moving onto a node with a comment (when enabled),
/// when a walk that began in a variation reaches the mainline, at the root,
/// or after `max_moves` steps.
pub fn find_next_moves_path<'a>(cursor: Cursor<'a>, opts: &NextMovesOptions) -> NextMovesPath<'a> {
    let mut cur = match &opts.init_treepath {
        Some(path) => cursor.tree().root().descend(path),
        None => cursor,
    };
    let started_on_mainline = cur.on_mainline();
    let mut next_moves = Vec::new();
    while let Some(parent) = cur.parent() {
        if next_moves.len() >= opts.max_moves {
            break;
        }
        next_moves.push(cur.node().var_num());
        cur = parent;
        if opts.break_on_comment && cur.properties().comment().is_some_and(|c| !c.is_empty()) {
            break;
        }
        if !started_on_mainline && cur.on_mainline() {
            break;
        }
    }
    next_moves.reverse();
    NextMovesPath {
        cursor: cur,
        treepath: cur.treepath_to_here(),
        next_moves,
    }
}

/// Every route from `cursor` down to a leaf, as fragments. Each route starts
/// with the index of the first child taken.
pub fn flatten_move_tree(cursor: Cursor<'_>) -> Vec<Treepath> {
    let mut out = Vec::new();
    let mut stack: Vec<(Cursor<'_>, Treepath)> = (0..cursor.num_children())
        .rev()
        .filter_map(|i| cursor.child(i).map(|c| (c, vec![i])))
        .collect();
    while let Some((node, path)) = stack.pop() {
        if node.num_children() == 0 {
            out.push(path);
            continue;
        }
        for i in (0..node.num_children()).rev() {
            if let Some(child) = node.child(i) {
                let mut p = path.clone();
                p.push(i);
                stack.push((child, p));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movetree::MoveTree;

    #[test]
    fn test_parse_fragment() {
        assert_eq!(parse_fragment("").unwrap(), Vec::<usize>::new());
        assert_eq!(parse_fragment("0").unwrap(), vec![0]);
        assert_eq!(parse_fragment("53").unwrap(), vec![53]);
        assert_eq!(parse_fragment("2.3").unwrap(), vec![2, 3]);
        assert_eq!(parse_fragment("0:4").unwrap(), vec![0, 0, 0, 0]);
        assert_eq!(parse_fragment("1.2:1.0.2:3").unwrap(), vec![1, 2, 0, 2, 2, 2]);
        assert_eq!(parse_fragment("0:0").unwrap(), vec![0]);
        let to_end = parse_fragment("1+").unwrap();
        assert_eq!(to_end.len(), TO_END_LEN + 1);
        assert_eq!(to_end[0], 1);
    }

    #[test]
    fn test_parse_fragment_errors() {
        assert!(parse_fragment("a").is_err());
        assert!(parse_fragment("1..2").is_err());
        assert!(parse_fragment("1.").is_err());
        assert!(parse_fragment("1:2:3").is_err());
        assert!(parse_fragment(":3").is_err());
        assert!(parse_fragment("+").is_err());
    }

    #[test]
    fn test_parse_initial_path() {
        assert_eq!(parse_initial_path("0").unwrap(), Vec::<usize>::new());
        assert_eq!(parse_initial_path("1").unwrap(), vec![0]);
        assert_eq!(parse_initial_path("0.1").unwrap(), vec![1]);
        assert_eq!(parse_initial_path("2.3").unwrap(), vec![0, 0, 3]);
        assert_eq!(parse_initial_path("3.1.0").unwrap(), vec![0, 0, 0, 1, 0]);
        assert_eq!(parse_initial_path("53").unwrap().len(), 53);
        assert_eq!(parse_initial_path("0.0:3.1:3").unwrap(), vec![0, 0, 0, 1, 1, 1]);
        assert_eq!(parse_initial_path("+").unwrap().len(), TO_END_LEN);
        assert_eq!(parse_initial_path("1+").unwrap().len(), TO_END_LEN + 1);
        let p = parse_initial_path("0.2.6+").unwrap();
        assert_eq!(&p[..3], &[2, 6, 0]);
        assert!(parse_initial_path("3x").is_err());
        assert!(parse_initial_path("x3").is_err());
    }

    #[test]
    fn test_huge_counts_are_rejected() {
        let too_long = |r: Result<Treepath, TreepathError>| matches!(r, Err(TreepathError::TooLong { .. }));
        assert!(too_long(parse_fragment("0:99999999999")));
        assert!(too_long(parse_fragment("0:18446744073709551615")));
        assert!(too_long(parse_initial_path("99999999999")));
        assert!(too_long(parse_initial_path("18446744073709551615")));
        assert!(too_long(parse_initial_path("9000.0:2000")));
        assert!(too_long(parse_initial_path("9999+")));
        // Past usize is a bad number, not a long path.
        assert!(matches!(
            parse_fragment("0:99999999999999999999999"),
            Err(TreepathError::ExpectedNumber { .. })
        ));

        let at_cap = format!("0:{MAX_TREEPATH_LEN}");
        assert_eq!(parse_fragment(&at_cap).unwrap().len(), MAX_TREEPATH_LEN);
        assert_eq!(parse_initial_path(&MAX_TREEPATH_LEN.to_string()).unwrap().len(), MAX_TREEPATH_LEN);
        assert!(too_long(parse_fragment(&format!("{at_cap}.1"))));
    }

    #[test]
    fn test_to_strings() {
        assert_eq!(to_fragment_string(&[]), "");
        assert_eq!(to_fragment_string(&[2, 0, 1, 2, 6]), "2.0.1.2.6");
        assert_eq!(to_fragment_string(&[0, 0, 0, 0]), "0:4");
        assert_eq!(to_fragment_string(&[0, 0, 0, 0, 1, 1, 1]), "0:4.1:3");
        assert_eq!(to_init_path_string(&[]), "0");
        assert_eq!(to_init_path_string(&[0, 0, 0]), "3");
        assert_eq!(to_init_path_string(&[0, 0, 0, 1]), "3.1");
        assert_eq!(to_init_path_string(&[1, 0, 0]), "0.1.0:2");
    }

    #[test]
    fn test_init_path_round_trip() {
        for path in [vec![], vec![0, 0, 3], vec![1, 0, 0, 2, 2], vec![0, 5]] {
            assert_eq!(parse_initial_path(&to_init_path_string(&path)).unwrap(), path);
        }
    }

    fn sample_tree() -> MoveTree {
        MoveTree::from_sgf("(;GM[1];B[aa];W[ab](;B[ac]C[hi];W[ad];B[ae])(;B[ba];W[bb]))").unwrap()
    }

    #[test]
    fn test_flatten_move_tree() {
        let mt = sample_tree();
        let paths = flatten_move_tree(mt.root());
        assert_eq!(paths, vec![vec![0, 0, 0, 0, 0], vec![0, 0, 1, 0]]);
        let mid = mt.root().descend(&[0, 0]);
        assert_eq!(flatten_move_tree(mid), vec![vec![0, 0, 0], vec![1, 0]]);
        assert!(flatten_move_tree(mt.root().descend(&[0, 0, 1, 0])).is_empty());
    }

    #[test]
    fn test_find_next_moves_path_breaks_on_comment() {
        let mt = sample_tree();
        let end = mt.root().descend(&[0, 0, 0, 0, 0]);
        let found = find_next_moves_path(end, &NextMovesOptions::default());
        assert_eq!(found.treepath, vec![0, 0, 0]);
        assert_eq!(found.next_moves, vec![0, 0]);

        let opts = NextMovesOptions {
            break_on_comment: false,
            ..Default::default()
        };
        let found = find_next_moves_path(end, &opts);
        assert!(found.cursor.is_root());
        assert_eq!(found.next_moves, vec![0; 5]);
    }

    #[test]
    fn test_find_next_moves_path_stops_at_mainline() {
        let mt = sample_tree();
        let var_end = mt.root().descend(&[0, 0, 1, 0]);
        let found = find_next_moves_path(var_end, &NextMovesOptions::default());
        assert_eq!(found.treepath, vec![0, 0]);
        assert_eq!(found.next_moves, vec![1, 0]);
    }

    #[test]
    fn test_find_next_moves_path_caps() {
        let mt = sample_tree();
        let opts = NextMovesOptions {
            init_treepath: Some(vec![0, 0, 0, 0, 0]),
            break_on_comment: false,
            max_moves: 2,
        };
        let found = find_next_moves_path(mt.root(), &opts);
        assert_eq!(found.next_moves, vec![0, 0]);
        assert_eq!(found.treepath, vec![0, 0, 0]);
    }

    #[test]
    fn test_apply_next_moves_collisions() {
        let mt = MoveTree::from_sgf("(;AB[cc];B[aa];W[cc];B[bb];W[aa];B[])").unwrap();
        let goban = Goban::from_tree(&mt, &[]).goban;
        let applied = apply_next_moves(mt.root(), &goban, &[0, 0, 0, 0, 0, 0, 0]);
        let cols: Vec<_> = applied.stones.iter().map(|s| s.collision).collect();
        assert_eq!(cols, vec![None, Some(Collision::External), None, Some(Collision::Earlier(0))]);
        assert_eq!(applied.stones[3].ply, 3);
        // Stopped at the last node; the pass was stepped over.
        assert_eq!(applied.cursor.node().node_num(), 5);
    }
}

//! Judging positions in problem records.
//!
//! A problem marks its correct outcomes with properties, e.g. `GB[1]` or a
//! comment containing "Correct". A position is correct when it matches the
//! conditions itself or when every line below it reaches a match.

use strum::Display;

use crate::movetree::Cursor;
use crate::properties::ProblemConditions;
use crate::stone::Move;
use crate::treepath::flatten_move_tree;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ProblemResult {
    Correct,
    Incorrect,
    /// Some lines below reach a correct node and some do not.
    Indeterminate,
}

pub fn is_correct_position(cursor: Cursor<'_>, conditions: &ProblemConditions) -> ProblemResult {
    if cursor.properties().matches(conditions) {
        return ProblemResult::Correct;
    }
    let mut any_correct = false;
    let mut any_incorrect = false;
    for path in flatten_move_tree(cursor) {
        let mut cur = cursor;
        let mut path_correct = false;
        for &var in &path {
            cur = cur.move_down(var);
            if cur.properties().matches(conditions) {
                path_correct = true;
                break;
            }
        }
        if path_correct {
            any_correct = true;
        } else {
            any_incorrect = true;
        }
    }
    match (any_correct, any_incorrect) {
        (true, false) => ProblemResult::Correct,
        (true, true) => ProblemResult::Indeterminate,
        _ => ProblemResult::Incorrect,
    }
}

/// Moves from `cursor` that do not lead only to incorrect positions.
pub fn correct_next_moves(cursor: Cursor<'_>, conditions: &ProblemConditions) -> Vec<Move> {
    (0..cursor.num_children())
        .filter_map(|i| cursor.child(i))
        .filter_map(|child| {
            let mv = child.last_move()?;
            (is_correct_position(child, conditions) != ProblemResult::Incorrect).then_some(mv)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movetree::MoveTree;
    use crate::point::Point;
    use crate::properties::Prop;
    use crate::stone::Color;

    fn conditions() -> ProblemConditions {
        let mut c = ProblemConditions::new();
        c.insert(Prop::GB, vec![]);
        c.insert(Prop::C, vec!["Correct".to_string()]);
        c
    }

    fn problem() -> MoveTree {
        MoveTree::from_sgf(
            "(;AB[aa](;B[ba];W[ca];B[da]GB[1])\
             (;B[bb];W[cb](;B[db]C[Correct!])(;B[eb]C[Nope]))\
             (;B[bc]C[Wrong]))",
        )
        .unwrap()
    }

    #[test]
    fn test_is_correct_position() {
        let mt = problem();
        let cond = conditions();
        let root = mt.root();
        assert_eq!(is_correct_position(root.move_down(0), &cond), ProblemResult::Correct);
        assert_eq!(
            is_correct_position(root.move_down(1), &cond),
            ProblemResult::Indeterminate
        );
        assert_eq!(is_correct_position(root.move_down(2), &cond), ProblemResult::Incorrect);
        assert_eq!(
            is_correct_position(root.descend(&[0, 0, 0]), &cond),
            ProblemResult::Correct
        );
    }

    #[test]
    fn test_correct_next_moves() {
        let mt = problem();
        let moves = correct_next_moves(mt.root(), &conditions());
        assert_eq!(
            moves,
            vec![
                Move::new(Color::Black, Point::new(1, 0)),
                Move::new(Color::Black, Point::new(1, 1)),
            ]
        );
    }
}

//! Property-based tests for treepaths and replay.
//!
//! 1. Fragment strings round-trip for any path.
//! 2. Initial-path strings round-trip for any path.
//! 3. Every leaf path of a random tree round-trips and leads to a leaf.
//! 4. Replaying the same path twice gives the same board.

use kifu_core::goban::Goban;
use kifu_core::movetree::MoveTree;
use kifu_core::point::Point;
use kifu_core::properties::Prop;
use kifu_core::treepath::{
    flatten_move_tree, parse_fragment, parse_initial_path, to_fragment_string, to_init_path_string,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn path_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(prop_oneof![3 => Just(0usize), 1 => 0usize..4], 0..40)
}

/// Build a tree by attaching each new node to one of the nodes made so far.
/// Nodes alternate colors and play at points drawn from `moves`.
fn build_tree(parents: &[usize], moves: &[(i32, i32)]) -> MoveTree {
    let mut mt = MoveTree::with_size(9);
    let mut ids = vec![mt.current_id()];
    for (i, (&parent, &(x, y))) in parents.iter().zip(moves).enumerate() {
        let id = mt.add_child_to(ids[parent % ids.len()]);
        let prop = if i % 2 == 0 { Prop::B } else { Prop::W };
        mt.properties_at_mut(id).add(prop, Point::new(x, y).to_sgf());
        ids.push(id);
    }
    mt
}

fn tree_strategy() -> impl Strategy<Value = MoveTree> {
    (1usize..30).prop_flat_map(|n| {
        (
            prop::collection::vec(any::<usize>(), n),
            prop::collection::vec((0i32..9, 0i32..9), n),
        )
            .prop_map(|(parents, moves)| build_tree(&parents, &moves))
    })
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Fragment round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn fragment_round_trip(path in path_strategy()) {
        let s = to_fragment_string(&path);
        prop_assert_eq!(parse_fragment(&s).unwrap(), path, "fragment {:?}", s);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Initial-path round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn init_path_round_trip(path in path_strategy()) {
        let s = to_init_path_string(&path);
        prop_assert_eq!(parse_initial_path(&s).unwrap(), path, "initial path {:?}", s);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Leaf paths of random trees
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn leaf_paths_round_trip(mt in tree_strategy()) {
        let paths = flatten_move_tree(mt.root());
        let leaves = mt.preorder().into_iter().filter(|&id| mt.cursor_at(id).num_children() == 0).count();
        prop_assert_eq!(paths.len(), leaves);
        for path in paths {
            let parsed = parse_fragment(&to_fragment_string(&path)).unwrap();
            prop_assert_eq!(&parsed, &path);
            let leaf = mt.root().descend(&parsed);
            prop_assert_eq!(leaf.num_children(), 0);
            prop_assert_eq!(leaf.treepath_to_here(), path);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Replay determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn replay_is_deterministic(mt in tree_strategy()) {
        for path in flatten_move_tree(mt.root()) {
            let a = Goban::from_tree(&mt, &path);
            let b = Goban::from_tree(&mt, &path);
            prop_assert_eq!(&a.goban, &b.goban);
            prop_assert_eq!(&a.captures, &b.captures);
        }
    }
}

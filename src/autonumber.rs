//! Rewrites move-number labels on commented nodes.
//!
//! Commented nodes in a commentary record usually stand for a diagram: the
//! moves since the previous diagram are shown with numbers. This pass walks
//! every commented node, finds the moves that led to it since the last
//! comment (or since leaving the mainline), and stores their numbers as `LB`
//! labels. Existing numeric labels are replaced; text labels are kept.

use tracing::debug;

use crate::goban::Goban;
use crate::movetree::MoveTree;
use crate::properties::Prop;
use crate::treepath::{NextMovesOptions, apply_next_moves, find_next_moves_path};

/// Relabel every commented node in the tree.
pub fn autonumber(tree: &mut MoveTree) {
    let mut relabeled = 0;
    for id in tree.preorder() {
        let labels = {
            let cur = tree.cursor_at(id);
            if cur.properties().comment().is_none_or(str::is_empty) {
                continue;
            }
            let mut labels: Vec<(String, String)> = cur
                .properties()
                .get_all(Prop::LB)
                .unwrap_or_default()
                .iter()
                .filter_map(|v| v.split_once(':'))
                .filter(|(_, text)| !text.chars().any(|c| c.is_ascii_digit()))
                .map(|(coord, text)| (coord.to_string(), text.to_string()))
                .collect();

            let found = find_next_moves_path(cur, &NextMovesOptions::default());
            let goban = Goban::from_tree(tree, &found.treepath).goban;
            let first = if cur.on_mainline() {
                found.cursor.node().node_num() + 1
            } else {
                found.cursor.moves_to_mainline() + 1
            };
            let applied = apply_next_moves(found.cursor, &goban, &found.next_moves);
            for stone in applied.stones.iter().filter(|s| s.collision.is_none()) {
                let coord = stone.point.to_sgf();
                let number = (first + stone.ply).to_string();
                match labels.iter_mut().find(|(c, _)| *c == coord) {
                    Some(entry) => entry.1 = number,
                    None => labels.push((coord, number)),
                }
            }
            labels
        };

        let props = tree.properties_at_mut(id);
        if labels.is_empty() {
            props.remove(Prop::LB);
        } else {
            props.set(
                Prop::LB,
                labels
                    .iter()
                    .map(|(coord, text)| format!("{coord}:{}", shorten_number(text))),
            );
        }
        for prop in [Prop::TR, Prop::SQ] {
            let Some(values) = props.get_all(prop) else {
                continue;
            };
            let kept: Vec<String> = values
                .iter()
                .filter(|v| !labels.iter().any(|(c, t)| c == *v && !t.is_empty()))
                .cloned()
                .collect();
            if kept.is_empty() {
                props.remove(prop);
            } else {
                props.set(prop, kept);
            }
        }
        relabeled += 1;
    }
    debug!(relabeled, "autonumbered tree");
}

/// Keep the last two digits of a long label unless that gives `00`, then
/// drop a leading zero: `"123"` is `"23"`, `"105"` is `"5"`, `"200"` stays.
fn shorten_number(label: &str) -> String {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() <= 2 {
        return label.to_string();
    }
    let tail: String = chars[chars.len() - 2..].iter().collect();
    let mut out = if tail == "00" { label.to_string() } else { tail };
    if out.len() == 2 && out.starts_with('0') {
        out.remove(0);
    }
    out
}

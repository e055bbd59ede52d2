//! kifu-core: a Go game-record engine.
//!
//! This crate reads SGF game records into a tree of moves with variations,
//! replays any position against a rules-checked board (captures,
//! self-capture, ko), and flattens a position into a labeled grid ready for
//! drawing a diagram.
//!
//! ## Modules
//!
//! - [`properties`] - Per-node property store
//! - [`movetree`] - The move tree, its cursor, and SGF output
//! - [`parse`] - SGF record parser
//! - [`treepath`] - Path strings and next-move replay
//! - [`goban`] - Board state and the rules engine
//! - [`flattener`] - Display-ready snapshots of a position
//! - [`problems`] - Judging positions in problem records
//! - [`autonumber`] - Move-number labels for commentary diagrams
//! - [`point`], [`stone`] - Coordinates, colors, and moves
//! - [`constants`] - Board sizes and engine parameters
//!
//! ## Example
//!
//! ```
//! use kifu_core::flattener::{FlattenOptions, flatten};
//! use kifu_core::movetree::MoveTree;
//! use kifu_core::treepath::parse_fragment;
//!
//! let tree = MoveTree::from_sgf("(;GM[1]SZ[9];B[cc];W[gg];B[cg])").unwrap();
//!
//! // Number the first three moves on top of the empty board.
//! let opts = FlattenOptions {
//!     next_moves_path: parse_fragment("0:3").unwrap(),
//!     ..Default::default()
//! };
//! let flat = flatten(tree.root(), &opts);
//! assert_eq!(flat.ending_move_num(), 3);
//! assert!(flat.collisions().is_empty());
//! ```

pub mod autonumber;
pub mod constants;
pub mod error;
pub mod flattener;
pub mod goban;
pub mod movetree;
pub mod parse;
pub mod point;
pub mod problems;
pub mod properties;
pub mod stone;
pub mod treepath;

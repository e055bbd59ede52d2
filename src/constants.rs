//! Constants for board geometry, path expansion, and display labeling.
//!
//! Everything the engine treats as a fixed parameter lives here so that the
//! rules engine, the treepath parser, and the flattener agree on one value.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size used when a record carries no `SZ` property.
pub const DEFAULT_SIZE: i32 = 19;

/// Largest board the engine supports. Coordinates are single letters `a..s`.
pub const MAX_SIZE: i32 = 19;

/// Boards smaller than this are never cropped to a region.
pub const MIN_CROPPABLE_SIZE: i32 = 19;

/// Star points (hoshi) for the standard board sizes, as `(x, y)` pairs.
pub const STARPOINTS_9: [(i32, i32); 1] = [(4, 4)];

pub const STARPOINTS_13: [(i32, i32); 5] = [(3, 3), (3, 9), (6, 6), (9, 3), (9, 9)];

pub const STARPOINTS_19: [(i32, i32); 9] = [
    (3, 3),
    (3, 9),
    (3, 15),
    (9, 3),
    (9, 9),
    (9, 15),
    (15, 3),
    (15, 9),
    (15, 15),
];

/// Star points for a board of the given size. Unknown sizes have none.
pub fn starpoints(size: i32) -> &'static [(i32, i32)] {
    match size {
        9 => &STARPOINTS_9,
        13 => &STARPOINTS_13,
        19 => &STARPOINTS_19,
        _ => &[],
    }
}

// =============================================================================
// Treepaths
// =============================================================================

/// Number of first-child steps a trailing `+` expands to ("go to the end").
pub const TO_END_LEN: usize = 500;

/// Default cap on how far `find_next_moves_path` walks toward the root.
pub const DEFAULT_MAX_MOVES: usize = 1000;

/// Longest treepath a path string may expand to.
pub const MAX_TREEPATH_LEN: usize = 10_000;

// =============================================================================
// Labels
// =============================================================================

/// Move numbers above this wrap around (`101` is shown as `1`).
pub const LABEL_WRAP: u32 = 100;

/// Labels handed out, in order, to moves that land on an occupied point.
pub const COLLISION_LABELS: &str = "abcdefghijklmnopqrstuvwxyz";

// =============================================================================
// Record Defaults
// =============================================================================

/// Application name written into `AP` by `init_root_properties`.
pub const APP_NAME: &str = "kifu-core";

//! kifu: inspect SGF game records from the command line.
//!
//! ## Usage
//!
//! - `kifu show game.sgf --init-path 53 --next-moves 0:5` - Print a diagram
//! - `kifu paths game.sgf` - List every line of play as a treepath
//! - `kifu sgf game.sgf` - Re-serialize a record
//! - `kifu autonumber game.sgf` - Rewrite move labels on commented nodes
//!
//! Set `RUST_LOG` (e.g. `RUST_LOG=kifu_core=debug`) to see what the engine
//! skipped or replayed.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kifu_core::autonumber::autonumber;
use kifu_core::flattener::{BoardRegion, FlattenOptions, Flattened, Intersection, ShowVariations, Symbol, flatten};
use kifu_core::movetree::MoveTree;
use kifu_core::treepath::{flatten_move_tree, parse_fragment, parse_initial_path, to_fragment_string};

/// kifu: a Go game-record engine
#[derive(Parser)]
#[command(name = "kifu")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an ASCII diagram of a position
    Show {
        /// SGF record to read
        file: PathBuf,
        /// Position to show, e.g. `53` or `2.1.0`
        #[arg(long, default_value = "0")]
        init_path: String,
        /// Moves to number on top of the position, e.g. `0:5` or `1.0+`
        #[arg(long, default_value = "")]
        next_moves: String,
        /// Part of the board to show (ALL, TOP_LEFT, BOTTOM, ...)
        #[arg(long, default_value_t = BoardRegion::All)]
        region: BoardRegion,
        /// When to number the following variations
        #[arg(long, default_value_t = ShowVariations::MoreThanOne)]
        show_variations: ShowVariations,
        /// Mark the last move played
        #[arg(long)]
        mark_last_move: bool,
        /// Mark the ko point, if any
        #[arg(long)]
        mark_ko: bool,
    },
    /// List every line of play from the root as a treepath fragment
    Paths {
        /// SGF record to read
        file: PathBuf,
    },
    /// Parse a record and write it back out
    Sgf {
        /// SGF record to read
        file: PathBuf,
    },
    /// Rewrite move-number labels on commented nodes and print the record
    Autonumber {
        /// SGF record to read
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show {
            file,
            init_path,
            next_moves,
            region,
            show_variations,
            mark_last_move,
            mark_ko,
        } => {
            let tree = load(&file)?;
            let opts = FlattenOptions {
                init_position: Some(
                    parse_initial_path(&init_path).with_context(|| format!("bad initial path {init_path:?}"))?,
                ),
                next_moves_path: parse_fragment(&next_moves)
                    .with_context(|| format!("bad next-moves path {next_moves:?}"))?,
                board_region: region,
                show_variations,
                mark_last_move,
                mark_ko,
                ..Default::default()
            };
            print_diagram(&flatten(tree.root(), &opts));
        }
        Commands::Paths { file } => {
            let tree = load(&file)?;
            for path in flatten_move_tree(tree.root()) {
                println!("{}", to_fragment_string(&path));
            }
        }
        Commands::Sgf { file } => {
            println!("{}", load(&file)?.to_sgf());
        }
        Commands::Autonumber { file } => {
            let mut tree = load(&file)?;
            autonumber(&mut tree);
            println!("{}", tree.to_sgf());
        }
    }
    Ok(())
}

fn load(path: &Path) -> Result<MoveTree> {
    let record = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    MoveTree::from_sgf(&record).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_diagram(flat: &Flattened) {
    for row in flat.board().rows() {
        let line: Vec<String> = row.iter().map(|i| glyph(flat, i)).collect();
        println!("{}", line.join(" "));
    }
    for c in flat.collisions() {
        println!("{} ({}) at {}", c.move_number, c.color, c.label);
    }
    if !flat.comment().is_empty() {
        println!();
        println!("{}", flat.comment());
    }
}

/// One character (or a short label) per intersection.
fn glyph(flat: &Flattened, i: &Intersection) -> String {
    if let Some(label) = &i.text_label {
        return flat.auto_truncate_label(label);
    }
    let ch = match (i.stone, i.mark) {
        (Symbol::BStone, Symbol::LastMove) => '#',
        (Symbol::WStone, Symbol::LastMove) => '@',
        (Symbol::BStone, _) => 'X',
        (Symbol::WStone, _) => 'O',
        (_, Symbol::Triangle) => '^',
        (_, Symbol::Square) => 's',
        (_, Symbol::Circle) => 'o',
        (_, Symbol::XMark) => 'x',
        (_, Symbol::KoLocation) => '*',
        _ if i.base == Symbol::CenterStarpoint => '+',
        _ => '.',
    };
    ch.to_string()
}

//! SGF record parser.
//!
//! A single pass over the characters drives a small state machine that builds
//! the tree through the ordinary [`MoveTree`] editing calls. Bad data inside
//! an otherwise well-formed record (unknown property codes, trailing garbage)
//! is logged and skipped; structural problems stop the parse with a
//! [`ParseError`] that points at the offending character.

use tracing::{debug, warn};

use crate::error::ParseError;
use crate::movetree::{MoveTree, NodeId};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    /// Before the opening `(`.
    BeforeParen,
    /// After `(`, waiting for the first `;`.
    Beginning,
    /// Reading a property name.
    Property,
    /// Inside `[...]`.
    PropData,
    /// Between properties, nodes, and variations.
    Between,
    /// The outermost `)` has been read.
    Finished,
}

struct Parser {
    tree: MoveTree,
    state: State,
    line: usize,
    column: usize,
    ch: char,
    buffer: String,
    escaped: bool,
    prop: String,
    prop_data: Vec<String>,
    /// Nodes to return to when a variation closes.
    branches: Vec<NodeId>,
}

/// Parse a complete record into a tree positioned at the root.
pub fn parse(record: &str) -> Result<MoveTree, ParseError> {
    let mut p = Parser {
        tree: MoveTree::new(),
        state: State::BeforeParen,
        line: 0,
        column: 0,
        ch: '\0',
        buffer: String::new(),
        escaped: false,
        prop: String::new(),
        prop_data: Vec::new(),
        branches: Vec::new(),
    };
    for ch in record.chars() {
        p.column += 1;
        p.ch = ch;
        if ch == '\n' {
            p.line += 1;
            p.column = 0;
            if p.state != State::PropData {
                continue;
            }
        }
        p.step(ch)?;
    }
    if p.state == State::PropData {
        return Err(p.error("unterminated property value"));
    }
    p.flush_prop();
    if !p.branches.is_empty() {
        return Err(p.error("unclosed '(' at the end of the record"));
    }
    if !p.tree.cursor().is_root() {
        return Err(p.error("expected to end up at the root"));
    }
    debug!(nodes = p.tree.len(), "parsed record");
    Ok(p.tree)
}

impl Parser {
    fn error(&self, message: &str) -> ParseError {
        ParseError {
            line: self.line,
            column: self.column,
            ch: self.ch,
            message: message.to_string(),
        }
    }

    fn step(&mut self, ch: char) -> Result<(), ParseError> {
        match self.state {
            State::BeforeParen => {
                if ch == '(' {
                    self.branches.push(self.tree.current_id());
                    self.state = State::Beginning;
                } else if !ch.is_whitespace() {
                    return Err(self.error("expected the record to start with '('"));
                }
            }
            State::Beginning => {
                if ch == ';' {
                    self.state = State::Between;
                } else if !ch.is_whitespace() {
                    return Err(self.error("expected ';'"));
                }
            }
            State::Property => {
                if ch.is_ascii_uppercase() {
                    self.buffer.push(ch);
                } else if ch.is_ascii_lowercase() {
                    // Old (FF1-3) names such as `AddBlack`: keep the capitals.
                } else if ch == '[' {
                    self.prop = std::mem::take(&mut self.buffer);
                    self.state = State::PropData;
                } else if ch.is_whitespace() {
                    return Err(self.error("unexpected whitespace in property name"));
                } else {
                    return Err(self.error("unexpected character in property name"));
                }
            }
            State::PropData => {
                if self.escaped {
                    self.buffer.push(ch);
                    self.escaped = false;
                } else if ch == '\\' {
                    self.escaped = true;
                } else if ch == ']' {
                    self.flush_value();
                    self.state = State::Between;
                } else {
                    self.buffer.push(ch);
                }
            }
            State::Between => self.step_between(ch)?,
            State::Finished => {
                if ch == ')' {
                    return Err(self.error("unmatched ')'"));
                }
                if !ch.is_whitespace() {
                    warn!(line = self.line, column = self.column, "garbage after the end of the record");
                }
            }
        }
        Ok(())
    }

    fn step_between(&mut self, ch: char) -> Result<(), ParseError> {
        match ch {
            'A'..='Z' => {
                self.flush_prop();
                self.buffer.push(ch);
                self.state = State::Property;
            }
            '[' => {
                if self.prop.is_empty() {
                    return Err(self.error("orphan property data"));
                }
                self.state = State::PropData;
            }
            '(' => {
                self.flush_prop();
                self.branches.push(self.tree.current_id());
            }
            ')' => {
                self.flush_prop();
                let Some(branch) = self.branches.pop() else {
                    return Err(self.error("unmatched ')'"));
                };
                self.tree.set_current(branch);
                if self.branches.is_empty() {
                    self.state = State::Finished;
                }
            }
            ';' => {
                self.flush_prop();
                self.tree.add_node();
            }
            c if c.is_whitespace() => {}
            _ => return Err(self.error("unknown token")),
        }
        Ok(())
    }

    /// Finish one `[...]` value. Point rectangles are expanded when the
    /// property is stored.
    fn flush_value(&mut self) {
        let value = std::mem::take(&mut self.buffer);
        self.prop_data.push(value);
    }

    /// Store the pending property on the current node.
    fn flush_prop(&mut self) {
        if self.prop.is_empty() {
            return;
        }
        let prop = std::mem::take(&mut self.prop);
        let data = std::mem::take(&mut self.prop_data);
        if !self.tree.properties_mut().add_raw(&prop, data) {
            warn!(line = self.line, column = self.column, prop, "skipped property");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::Prop;
    use crate::stone::Color;
    use tracing_test::traced_test;

    #[test]
    fn test_simple_record() {
        let mt = parse("(;GM[1]SZ[9];B[aa];W[bb])").unwrap();
        let root = mt.root();
        assert_eq!(root.properties().get_one(Prop::SZ), Some("9"));
        let last = root.descend(&[0, 0]);
        assert_eq!(last.node().node_num(), 2);
        assert_eq!(last.last_move().map(|m| m.color), Some(Color::White));
    }

    #[test]
    fn test_variations() {
        let mt = parse("(;GM[1](;B[aa];W[ab])(;B[ba])(;B[ca]C[third]))").unwrap();
        let root = mt.root();
        assert_eq!(root.num_children(), 3);
        assert_eq!(root.move_down(0).num_children(), 1);
        assert_eq!(root.move_down(2).properties().comment(), Some("third"));
    }

    #[test]
    fn test_multiple_values_and_escapes() {
        let mt = parse("(;AB[aa][bb]C[a \\] b\\\\ c])").unwrap();
        let props = mt.root().properties();
        assert_eq!(props.get_all(Prop::AB).unwrap(), ["aa", "bb"]);
        assert_eq!(props.comment(), Some("a ] b\\ c"));
    }

    #[test]
    fn test_point_rectangle_expansion() {
        let mt = parse("(;AW[aa:bb]LB[aa:bb])").unwrap();
        let props = mt.root().properties();
        assert_eq!(props.get_all(Prop::AW).unwrap(), ["aa", "ba", "ab", "bb"]);
        assert_eq!(props.get_all(Prop::LB).unwrap(), ["aa:bb"]);

        let mt = parse("(;TB[aa:ab][cc])").unwrap();
        assert_eq!(mt.root().properties().get_all(Prop::TB).unwrap(), ["aa", "ab", "cc"]);
    }

    #[test]
    fn test_old_style_names() {
        let mt = parse("(;AddBlack[aa]Comment[hi])").unwrap();
        let props = mt.root().properties();
        assert!(props.has_value(Prop::AB, "aa"));
        assert_eq!(props.comment(), Some("hi"));
    }

    #[test]
    fn test_newlines_in_values() {
        let mt = parse("(;C[line one\nline two]\n;B[aa])").unwrap();
        assert_eq!(mt.root().properties().comment(), Some("line one\nline two"));
        assert_eq!(mt.root().num_children(), 1);
    }

    #[test]
    #[traced_test]
    fn test_unknown_property_skipped() {
        let mt = parse("(;ZZ[foo]GB[1])").unwrap();
        let props = mt.root().properties();
        assert!(props.contains(Prop::GB));
        assert_eq!(props.iter().count(), 1);
        assert!(logs_contain("ignoring unknown property"));
    }

    #[test]
    #[traced_test]
    fn test_trailing_garbage_is_a_warning() {
        let mt = parse("(;GM[1]) junk").unwrap();
        assert!(mt.root().properties().contains(Prop::GM));
        assert!(logs_contain("garbage after the end of the record"));
    }

    #[test]
    fn test_structural_errors() {
        let err = parse("x(;GM[1])").unwrap_err();
        assert_eq!((err.line, err.column, err.ch), (0, 1, 'x'));

        let err = parse("(;GM[1]\n;[2])").unwrap_err();
        assert_eq!((err.line, err.column, err.ch), (1, 2, '['));

        assert!(parse("(;GM[1];B[aa]").is_err());
        assert!(parse("(;B [aa])").is_err());
        assert!(parse("(;B[aa").is_err());
        assert!(parse("(;;[aa])").is_err());
    }

    #[test]
    fn test_unbalanced_parens() {
        let err = parse("(;GM[1]").unwrap_err();
        assert_eq!((err.line, err.column, err.ch), (0, 7, ']'));
        assert!(err.message.contains("unclosed"));

        let err = parse("(;GM[1](;B[aa])").unwrap_err();
        assert!(err.message.contains("unclosed"));

        let err = parse("(;GM[1]))").unwrap_err();
        assert_eq!((err.line, err.column, err.ch), (0, 9, ')'));
        assert_eq!(err.message, "unmatched ')'");

        assert!(parse("(;GM[1](;B[aa]))").is_ok());
    }

    #[test]
    fn test_empty_record_is_empty_tree() {
        let mt = parse("").unwrap();
        assert_eq!(mt.len(), 1);
    }
}

//! Coordinate-preserving YAML parse and key lookup.
//!
//! `serde_yaml_ng` discards source positions, so the document is parsed a
//! second time from the raw event stream to record where every mapping
//! key starts. The resulting [`SourceTree`] is only used to point
//! diagnostics at the right line.

use serde::Serialize;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::Marker;

use crate::error::SourceError;

/// 1-based line and column of a token in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

impl SourcePosition {
    /// Position used when a key can't be located.
    pub const START: SourcePosition = SourcePosition { line: 1, column: 1 };

    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    fn from_marker(mark: Marker) -> Self {
        // Marker lines are 1-based, columns 0-based
        Self {
            line: mark.line().max(1),
            column: mark.col() + 1,
        }
    }
}

/// One key/value pair of a mapping, with the key's position.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEntry {
    /// Key text; `None` for non-scalar keys.
    pub key: Option<String>,
    pub position: SourcePosition,
    pub value: SourceNode,
}

/// A node of the parsed document.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceNode {
    Scalar(String),
    Sequence(Vec<SourceNode>),
    Mapping(Vec<SourceEntry>),
    Alias,
}

/// Parsed document that remembers where each mapping key came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTree {
    root: SourceNode,
}

impl SourceTree {
    /// Parse the first document in `text`.
    pub fn parse(text: &str) -> Result<Self, SourceError> {
        let mut builder = TreeBuilder::default();
        let mut parser = Parser::new_from_str(text);
        parser.load(&mut builder, false)?;
        builder.root.map(|root| Self { root }).ok_or(SourceError::Empty)
    }

    /// Root node of the document.
    #[must_use]
    pub fn root(&self) -> &SourceNode {
        &self.root
    }

    /// Find the position of the first occurrence of `key`.
    ///
    /// At each mapping the direct keys are checked before descending into
    /// mapping-valued entries, in document order. Sequences are not
    /// searched.
    #[must_use]
    pub fn locate(&self, key: &str) -> Option<SourcePosition> {
        locate_in(&self.root, key)
    }
}

fn locate_in(node: &SourceNode, key: &str) -> Option<SourcePosition> {
    let SourceNode::Mapping(entries) = node else {
        return None;
    };
    if let Some(entry) = entries.iter().find(|e| e.key.as_deref() == Some(key)) {
        return Some(entry.position);
    }
    entries
        .iter()
        .filter(|e| matches!(e.value, SourceNode::Mapping(_)))
        .find_map(|e| locate_in(&e.value, key))
}

enum Frame {
    Mapping {
        entries: Vec<SourceEntry>,
        pending: Option<(Option<String>, SourcePosition)>,
        start: SourcePosition,
    },
    Sequence {
        items: Vec<SourceNode>,
        start: SourcePosition,
    },
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Frame>,
    root: Option<SourceNode>,
}

impl TreeBuilder {
    fn finish_node(&mut self, node: SourceNode, start: SourcePosition) {
        match self.stack.last_mut() {
            Some(Frame::Mapping { entries, pending, .. }) => match pending.take() {
                None => {
                    let key = match node {
                        SourceNode::Scalar(s) => Some(s),
                        _ => None,
                    };
                    *pending = Some((key, start));
                }
                Some((key, position)) => entries.push(SourceEntry {
                    key,
                    position,
                    value: node,
                }),
            },
            Some(Frame::Sequence { items, .. }) => items.push(node),
            None => {
                if self.root.is_none() {
                    self.root = Some(node);
                }
            }
        }
    }
}

impl MarkedEventReceiver for TreeBuilder {
    fn on_event(&mut self, ev: Event, mark: Marker) {
        let position = SourcePosition::from_marker(mark);
        match ev {
            Event::Scalar(value, ..) => self.finish_node(SourceNode::Scalar(value), position),
            Event::Alias(..) => self.finish_node(SourceNode::Alias, position),
            Event::MappingStart(..) => self.stack.push(Frame::Mapping {
                entries: Vec::new(),
                pending: None,
                start: position,
            }),
            Event::SequenceStart(..) => self.stack.push(Frame::Sequence {
                items: Vec::new(),
                start: position,
            }),
            Event::MappingEnd | Event::SequenceEnd => {
                let (node, start) = match self.stack.pop() {
                    Some(Frame::Mapping { entries, start, .. }) => (SourceNode::Mapping(entries), start),
                    Some(Frame::Sequence { items, start }) => (SourceNode::Sequence(items), start),
                    None => return,
                };
                self.finish_node(node, start);
            }
            _ => {}
        }
    }
}

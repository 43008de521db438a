//! Inline marks carried by text nodes

use serde::{Deserialize, Serialize};

/// Kind of a mark, without attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MarkType {
    Link,
    Bold,
    Italic,
    Underline,
}

/// A formatting mark on a text node.
///
/// The variant order is the nesting order used when marks are written out:
/// links wrap bold, bold wraps italic, italic wraps underline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mark {
    Link { href: String },
    Bold,
    Italic,
    Underline,
}

impl Mark {
    pub fn link(href: impl Into<String>) -> Self {
        Mark::Link { href: href.into() }
    }

    pub fn mark_type(&self) -> MarkType {
        match self {
            Mark::Link { .. } => MarkType::Link,
            Mark::Bold => MarkType::Bold,
            Mark::Italic => MarkType::Italic,
            Mark::Underline => MarkType::Underline,
        }
    }
}

/// An ordered set of marks holding at most one mark per [`MarkType`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkSet(Vec<Mark>);

impl MarkSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_marks(marks: impl IntoIterator<Item = Mark>) -> Self {
        let mut set = Self::new();
        for mark in marks {
            set = set.with(mark);
        }
        set
    }

    /// Add a mark, replacing any existing mark of the same type
    pub fn with(&self, mark: Mark) -> Self {
        let mut marks: Vec<Mark> = self
            .0
            .iter()
            .filter(|m| m.mark_type() != mark.mark_type())
            .cloned()
            .collect();
        marks.push(mark);
        marks.sort();
        Self(marks)
    }

    pub fn without(&self, mark_type: MarkType) -> Self {
        Self(
            self.0
                .iter()
                .filter(|m| m.mark_type() != mark_type)
                .cloned()
                .collect(),
        )
    }

    pub fn has(&self, mark_type: MarkType) -> bool {
        self.0.iter().any(|m| m.mark_type() == mark_type)
    }

    pub fn get(&self, mark_type: MarkType) -> Option<&Mark> {
        self.0.iter().find(|m| m.mark_type() == mark_type)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Mark> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_set_is_ordered() {
        let set = MarkSet::from_marks([Mark::Underline, Mark::Bold, Mark::link("a")]);
        let types: Vec<_> = set.iter().map(Mark::mark_type).collect();
        assert_eq!(types, vec![MarkType::Link, MarkType::Bold, MarkType::Underline]);
    }

    #[test]
    fn test_link_replaces_link() {
        let set = MarkSet::new().with(Mark::link("a")).with(Mark::link("b"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(MarkType::Link), Some(&Mark::link("b")));
    }

    #[test]
    fn test_without_removes_by_type() {
        let set = MarkSet::from_marks([Mark::Bold, Mark::Italic]);
        let set = set.without(MarkType::Bold);
        assert!(!set.has(MarkType::Bold));
        assert!(set.has(MarkType::Italic));
    }

    #[test]
    fn test_order_independent_equality() {
        let a = MarkSet::from_marks([Mark::Italic, Mark::Bold]);
        let b = MarkSet::from_marks([Mark::Bold, Mark::Italic]);
        assert_eq!(a, b);
    }
}

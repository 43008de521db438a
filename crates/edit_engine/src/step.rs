//! Replace steps and position mapping
//!
//! Every structural edit is expressed as a [`ReplaceStep`]: replace the content
//! between two positions that share a parent with a fragment. Applying a step
//! yields the new document and the step that undoes it, plus a [`StepMap`]
//! describing how positions move.

use doc_model::{resolve, DocModelError, Fragment, Node};

/// Which side a position sticks to when content is inserted exactly at it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Before,
    After,
}

/// Replace `from..to` with `content`; both ends must sit in the same parent
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceStep {
    pub from: usize,
    pub to: usize,
    pub content: Fragment,
}

impl ReplaceStep {
    pub fn new(from: usize, to: usize, content: Fragment) -> Self {
        Self { from, to, content }
    }

    pub fn delete(from: usize, to: usize) -> Self {
        Self::new(from, to, Fragment::empty())
    }

    pub fn insert(pos: usize, content: Fragment) -> Self {
        Self::new(pos, pos, content)
    }

    /// Apply to `doc`, returning the new document and the inverse step.
    ///
    /// The ancestor chain of the replaced range is rebuilt and re-validated,
    /// so a result is always schema-valid.
    pub fn apply(&self, doc: &Node) -> doc_model::Result<(Node, ReplaceStep)> {
        if self.from > self.to {
            return Err(DocModelError::InvalidRange {
                from: self.from,
                to: self.to,
            });
        }
        let rfrom = resolve(doc, self.from)?;
        let rto = resolve(doc, self.to)?;
        if !rfrom.same_parent(&rto) {
            return Err(DocModelError::InvalidRange {
                from: self.from,
                to: self.to,
            });
        }
        let parent = rfrom.parent();
        let start = rfrom.start(rfrom.depth());
        let (from, to) = (self.from - start, self.to - start);
        let removed = parent.content().cut(from, to);
        let replaced = parent.with_content(parent.content().replace(from, to, &self.content))?;
        let new_doc = doc.replace_at_path(&rfrom.path(), replaced)?;
        let inverse = ReplaceStep::new(self.from, self.from + self.content.size(), removed);
        Ok((new_doc, inverse))
    }

    pub fn get_map(&self) -> StepMap {
        StepMap {
            start: self.from,
            old_size: self.to - self.from,
            new_size: self.content.size(),
        }
    }

    /// This step with its positions carried through `mapping`
    pub fn map(&self, mapping: &Mapping) -> ReplaceStep {
        let from = mapping.map(self.from, Assoc::After);
        let to = mapping.map(self.to, Assoc::Before).max(from);
        ReplaceStep::new(from, to, self.content.clone())
    }
}

/// How one step moves positions: `old_size` tokens at `start` became `new_size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepMap {
    start: usize,
    old_size: usize,
    new_size: usize,
}

impl StepMap {
    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        let end = self.start + self.old_size;
        if pos < self.start {
            return pos;
        }
        if pos > end {
            return pos - self.old_size + self.new_size;
        }
        let side = if self.old_size == 0 {
            assoc
        } else if pos == self.start {
            Assoc::Before
        } else if pos == end {
            Assoc::After
        } else {
            assoc
        };
        match side {
            Assoc::Before => self.start,
            Assoc::After => self.start + self.new_size,
        }
    }
}

/// A sequence of step maps applied in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// The maps from index `from` onwards
    pub fn slice(&self, from: usize) -> Mapping {
        Mapping {
            maps: self.maps[from.min(self.maps.len())..].to_vec(),
        }
    }

    pub fn truncate(&mut self, len: usize) {
        self.maps.truncate(len);
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.maps.iter().fold(pos, |pos, map| map.map(pos, assoc))
    }
}

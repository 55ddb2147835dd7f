use serde::Serialize;

use super::{ColumnId, PartId, RowId};
use crate::text::{Occurrence, Text, TextId};

/// Entry in a possibility list (e.g. a discourse-feature tag) that a cell can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PossibilityId(pub u32);

/// Contiguous run of wordforms, from `begin` to `end` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordGroupSpan {
    pub text: TextId,
    pub begin: Occurrence,
    pub end: Occurrence,
}

impl WordGroupSpan {
    pub fn new(text: &Text, begin: Occurrence, end: Occurrence) -> Self {
        Self {
            text: text.id(),
            begin,
            end,
        }
    }

    pub fn occurrences(&self, text: &Text) -> Vec<Occurrence> {
        text.wordforms_between(self.begin, self.end)
    }

    pub fn contains(&self, occ: Occurrence) -> bool {
        self.begin <= occ && occ <= self.end
    }

    pub fn grow_from_end(&mut self, text: &Text) -> bool {
        match text.next_wordform(self.end) {
            Some(next) => {
                self.end = next;
                true
            }
            None => false,
        }
    }

    pub fn grow_from_beginning(&mut self, text: &Text) -> bool {
        match text.previous_wordform(self.begin) {
            Some(prev) => {
                self.begin = prev;
                true
            }
            None => false,
        }
    }

    /// Drops the last word. Returns false, leaving the span untouched, if that would empty it.
    pub fn shrink_from_end(&mut self, text: &Text) -> bool {
        match text.previous_wordform(self.end) {
            Some(prev) if prev >= self.begin => {
                self.end = prev;
                true
            }
            _ => false,
        }
    }

    /// Drops the first word. Returns false, leaving the span untouched, if that would empty it.
    pub fn shrink_from_beginning(&mut self, text: &Text) -> bool {
        match text.next_wordform(self.begin) {
            Some(next) if next <= self.end => {
                self.begin = next;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellPartKind {
    WordGroup(WordGroupSpan),
    /// `None` is the "missing" marker: the user asserts the cell is deliberately empty.
    Tag(Option<PossibilityId>),
    ClauseMarker {
        dependent_rows: Vec<RowId>,
    },
    MovedTextMarker {
        word_group: PartId,
        /// True when the target sits earlier in the chart than the marker.
        preposed: bool,
    },
}

/// Something placed in a cell.
#[derive(Debug, Clone)]
pub struct CellPart {
    pub(crate) row: RowId,
    pub(crate) column: ColumnId,
    pub merges_before: bool,
    pub merges_after: bool,
    pub(crate) kind: CellPartKind,
}

impl CellPart {
    pub fn row(&self) -> RowId {
        self.row
    }

    pub fn column(&self) -> ColumnId {
        self.column
    }

    pub fn kind(&self) -> &CellPartKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut CellPartKind {
        &mut self.kind
    }

    pub fn word_group(&self) -> Option<&WordGroupSpan> {
        match &self.kind {
            CellPartKind::WordGroup(span) => Some(span),
            _ => None,
        }
    }

    pub fn word_group_mut(&mut self) -> Option<&mut WordGroupSpan> {
        match &mut self.kind {
            CellPartKind::WordGroup(span) => Some(span),
            _ => None,
        }
    }

    pub fn is_word_group(&self) -> bool {
        matches!(self.kind, CellPartKind::WordGroup(_))
    }

    pub fn is_missing_marker(&self) -> bool {
        matches!(self.kind, CellPartKind::Tag(None))
    }

    pub fn is_clause_marker(&self) -> bool {
        matches!(self.kind, CellPartKind::ClauseMarker { .. })
    }

    pub fn dependent_rows(&self) -> Option<&[RowId]> {
        match &self.kind {
            CellPartKind::ClauseMarker { dependent_rows } => Some(dependent_rows),
            _ => None,
        }
    }

    /// Target word group and direction, for moved-text markers.
    pub fn moved_text_target(&self) -> Option<(PartId, bool)> {
        match self.kind {
            CellPartKind::MovedTextMarker {
                word_group,
                preposed,
            } => Some((word_group, preposed)),
            _ => None,
        }
    }

    pub fn is_preposed_marker(&self) -> bool {
        matches!(
            self.kind,
            CellPartKind::MovedTextMarker { preposed: true, .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shrink_refuses_to_empty_a_single_word_group() {
        let text = Text::parse("alpha beta");
        let mut span = WordGroupSpan::new(&text, Occurrence::new(0, 0), Occurrence::new(0, 0));

        assert!(!span.shrink_from_end(&text));
        assert!(!span.shrink_from_beginning(&text));
        assert_eq!(span.occurrences(&text).len(), 1);
    }

    #[test]
    fn test_grow_and_shrink_skip_punctuation() {
        let text = Text::parse("alpha , beta gamma");
        let mut span = WordGroupSpan::new(&text, Occurrence::new(0, 0), Occurrence::new(0, 0));

        assert!(span.grow_from_end(&text));
        assert_eq!(span.end, Occurrence::new(0, 2));
        assert!(span.shrink_from_beginning(&text));
        assert_eq!(span.begin, Occurrence::new(0, 2));
        assert!(span.grow_from_beginning(&text));
        assert_eq!(span.begin, Occurrence::new(0, 0));
    }

    #[test]
    fn test_grow_stops_at_text_edges() {
        let text = Text::parse("alpha beta");
        let mut span = WordGroupSpan::new(&text, Occurrence::new(0, 0), Occurrence::new(0, 1));

        assert!(!span.grow_from_end(&text));
        assert!(!span.grow_from_beginning(&text));
    }
}

use serde::Serialize;

/// Flat, document-ordered index of a segment within a [`Text`](super::Text).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SegmentId(pub usize);

/// One analysis position in a text: a segment plus the index of the analysis within it.
///
/// The derived ordering is document order, so `a < b` means `a` is read before `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Occurrence {
    pub segment: SegmentId,
    pub index: usize,
}

impl Occurrence {
    pub fn new(segment: usize, index: usize) -> Self {
        Self {
            segment: SegmentId(segment),
            index,
        }
    }

    /// Strictly later in document order; an occurrence is never after itself.
    pub fn is_after(&self, other: &Occurrence) -> bool {
        self > other
    }
}

/// Paragraph-relative address of an occurrence, used when comparing a word with chart content.
///
/// `offset` counts analyses (wordforms and punctuation) from the start of the paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TextPosition {
    pub paragraph: usize,
    pub offset: usize,
}

impl TextPosition {
    pub fn new(paragraph: usize, offset: usize) -> Self {
        Self { paragraph, offset }
    }
}

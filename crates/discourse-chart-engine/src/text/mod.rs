//! Document model for the text being charted.
//!
//! A [`Text`] is a sequence of paragraphs, each a sequence of segments (roughly sentences),
//! each a sequence of [`Analysis`] items. Only wordforms are ever placed in a chart; punctuation
//! still occupies an offset within its paragraph.

mod occurrence;
mod parse;

pub use occurrence::{Occurrence, SegmentId, TextPosition};

use serde::Serialize;
use uuid::Uuid;

/// Identity of a text, so chart content can tell whether it was built against this text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TextId(Uuid);

impl TextId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TextId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Analysis {
    Wordform(String),
    Punctuation(String),
}

impl Analysis {
    pub fn is_wordform(&self) -> bool {
        matches!(self, Analysis::Wordform(_))
    }

    pub fn form(&self) -> &str {
        match self {
            Analysis::Wordform(form) | Analysis::Punctuation(form) => form,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    pub analyses: Vec<Analysis>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub segments: Vec<Segment>,
}

/// Where a flat segment lives inside the paragraph structure.
#[derive(Debug, Clone, Copy)]
struct SegmentInfo {
    paragraph: usize,
    local: usize,
    start_offset: usize,
}

#[derive(Debug, Clone)]
pub struct Text {
    id: TextId,
    paragraphs: Vec<Paragraph>,
    segments: Vec<SegmentInfo>,
}

impl Text {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        let mut segments = Vec::new();
        for (paragraph, para) in paragraphs.iter().enumerate() {
            let mut start_offset = 0;
            for (local, segment) in para.segments.iter().enumerate() {
                segments.push(SegmentInfo {
                    paragraph,
                    local,
                    start_offset,
                });
                start_offset += segment.analyses.len();
            }
        }
        Self {
            id: TextId::new(),
            paragraphs,
            segments,
        }
    }

    pub fn id(&self) -> TextId {
        self.id
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    fn segment(&self, id: SegmentId) -> Option<&Segment> {
        let info = self.segments.get(id.0)?;
        self.paragraphs
            .get(info.paragraph)
            .and_then(|p| p.segments.get(info.local))
    }

    fn segment_len(&self, id: SegmentId) -> usize {
        self.segment(id).map_or(0, |s| s.analyses.len())
    }

    pub fn analysis(&self, occ: Occurrence) -> Option<&Analysis> {
        self.segment(occ.segment)?.analyses.get(occ.index)
    }

    pub fn is_valid(&self, occ: Occurrence) -> bool {
        self.analysis(occ).is_some()
    }

    pub fn has_wordform(&self, occ: Occurrence) -> bool {
        self.analysis(occ).is_some_and(Analysis::is_wordform)
    }

    pub fn form(&self, occ: Occurrence) -> Option<&str> {
        self.analysis(occ).map(Analysis::form)
    }

    /// Paragraph index and offset within that paragraph, or `None` for an invalid occurrence.
    pub fn position(&self, occ: Occurrence) -> Option<TextPosition> {
        if !self.is_valid(occ) {
            return None;
        }
        let info = self.segments.get(occ.segment.0)?;
        Some(TextPosition::new(
            info.paragraph,
            info.start_offset + occ.index,
        ))
    }

    /// Inverse of [`Text::position`]. `None` when the paragraph has no analysis at that offset.
    pub fn occurrence_at(&self, position: TextPosition) -> Option<Occurrence> {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, info)| info.paragraph == position.paragraph)
            .find_map(|(flat, info)| {
                let len = self.segment_len(SegmentId(flat));
                (position.offset >= info.start_offset && position.offset < info.start_offset + len)
                    .then(|| Occurrence::new(flat, position.offset - info.start_offset))
            })
    }

    fn occurrences_in_segment(&self, id: SegmentId) -> impl Iterator<Item = Occurrence> + '_ {
        (0..self.segment_len(id)).map(move |index| Occurrence { segment: id, index })
    }

    fn next_occurrence(&self, occ: Occurrence) -> Option<Occurrence> {
        if occ.index + 1 < self.segment_len(occ.segment) {
            return Some(Occurrence {
                segment: occ.segment,
                index: occ.index + 1,
            });
        }
        (occ.segment.0 + 1..self.segment_count())
            .find(|&s| self.segment_len(SegmentId(s)) > 0)
            .map(|s| Occurrence::new(s, 0))
    }

    fn previous_occurrence(&self, occ: Occurrence) -> Option<Occurrence> {
        if occ.index > 0 {
            return Some(Occurrence {
                segment: occ.segment,
                index: occ.index - 1,
            });
        }
        (0..occ.segment.0.min(self.segment_count()))
            .rev()
            .find(|&s| self.segment_len(SegmentId(s)) > 0)
            .map(|s| Occurrence::new(s, self.segment_len(SegmentId(s)) - 1))
    }

    /// The first wordform strictly after `occ`, skipping punctuation.
    pub fn next_wordform(&self, occ: Occurrence) -> Option<Occurrence> {
        let mut current = self.next_occurrence(occ)?;
        while !self.has_wordform(current) {
            current = self.next_occurrence(current)?;
        }
        Some(current)
    }

    /// The last wordform strictly before `occ`, skipping punctuation.
    pub fn previous_wordform(&self, occ: Occurrence) -> Option<Occurrence> {
        let mut current = self.previous_occurrence(occ)?;
        while !self.has_wordform(current) {
            current = self.previous_occurrence(current)?;
        }
        Some(current)
    }

    pub fn wordform_at_or_before(&self, occ: Occurrence) -> Option<Occurrence> {
        if self.has_wordform(occ) {
            Some(occ)
        } else {
            self.previous_wordform(occ)
        }
    }

    /// Every wordform in document order.
    pub fn wordforms(&self) -> impl Iterator<Item = Occurrence> + '_ {
        (0..self.segment_count())
            .flat_map(|s| self.occurrences_in_segment(SegmentId(s)))
            .filter(|occ| self.has_wordform(*occ))
    }

    /// Wordforms from `begin` to `end` inclusive; empty when `begin` is after `end`.
    pub fn wordforms_between(&self, begin: Occurrence, end: Occurrence) -> Vec<Occurrence> {
        if begin > end {
            return Vec::new();
        }
        let last_segment = end.segment.0.min(self.segment_count().saturating_sub(1));
        (begin.segment.0..=last_segment)
            .flat_map(|s| self.occurrences_in_segment(SegmentId(s)))
            .filter(|occ| *occ >= begin && *occ <= end && self.has_wordform(*occ))
            .collect()
    }

    /// Space-separated forms of the wordforms in `begin..=end`.
    pub fn span_text(&self, begin: Occurrence, end: Occurrence) -> String {
        self.wordforms_between(begin, end)
            .into_iter()
            .filter_map(|occ| self.form(occ))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

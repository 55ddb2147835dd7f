use serde::Serialize;

use super::PartId;

/// Kind of clause a row represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ClauseType {
    #[default]
    Normal,
    Dependent,
    Speech,
    Song,
}

/// One clause line of the chart.
#[derive(Debug, Clone, Default)]
pub struct Row {
    pub(crate) label: String,
    pub end_sentence: bool,
    pub end_paragraph: bool,
    pub clause_type: ClauseType,
    /// First row of a run of rows forming one embedded clause.
    pub start_dependent_group: bool,
    /// Last row of such a run.
    pub end_dependent_group: bool,
    pub notes: Option<String>,
    pub(crate) parts: Vec<PartId>,
}

impl Row {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parts(&self) -> &[PartId] {
        &self.parts
    }

    /// Writes the label only when it differs. Returns whether anything changed.
    pub fn set_label(&mut self, label: &str) -> bool {
        if self.label == label {
            return false;
        }
        self.label = label.to_string();
        true
    }

    pub fn reset_clause_properties(&mut self) {
        self.clause_type = ClauseType::Normal;
        self.start_dependent_group = false;
        self.end_dependent_group = false;
    }

    /// Copy of everything except the cell parts.
    pub fn properties(&self) -> Row {
        Row {
            parts: Vec::new(),
            ..self.clone()
        }
    }
}

/// Human-readable undo/redo captions for one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoLabels {
    pub undo: &'static str,
    pub redo: &'static str,
}

impl UndoLabels {
    const fn new(undo: &'static str, redo: &'static str) -> Self {
        Self { undo, redo }
    }

    pub const MOVE_TO_COLUMN: Self = Self::new("Undo Move to Column", "Redo Move to Column");
    pub const NEW_CLAUSE: Self = Self::new("Undo Move Here in New Clause", "Redo Move Here in New Clause");
    pub const MAKE_MOVED: Self = Self::new("Undo Make Moved Text", "Redo Make Moved Text");
    pub const MARK_MOVED: Self = Self::new("Undo Mark Moved Text", "Redo Mark Moved Text");
    pub const REMOVE_MOVED: Self = Self::new("Undo Remove Moved Text Marker", "Redo Remove Moved Text Marker");
    pub const INSERT_ROW: Self = Self::new("Undo Insert Row", "Redo Insert Row");
    pub const CLEAR_FROM_HERE: Self = Self::new("Undo Clear Chart From Here", "Redo Clear Chart From Here");
    pub const MERGE_CELL: Self = Self::new("Undo Toggle Merge Cell", "Redo Toggle Merge Cell");
    pub const MISSING_MARKER: Self = Self::new("Undo Toggle Missing Marker", "Redo Toggle Missing Marker");
    pub const POSSIBILITY_TAG: Self = Self::new("Undo Toggle Marker", "Redo Toggle Marker");
    pub const DEPENDENT_CLAUSE: Self = Self::new("Undo Make Dependent Clause", "Redo Make Dependent Clause");
    pub const REMOVE_DEPENDENT_CLAUSE: Self = Self::new("Undo Remove Clause Marker", "Redo Remove Clause Marker");
    pub const MOVE_CELL_FORWARD: Self = Self::new("Undo Move Cell Forward", "Redo Move Cell Forward");
    pub const MOVE_CELL_BACK: Self = Self::new("Undo Move Cell Back", "Redo Move Cell Back");
    pub const MOVE_WORD_FORWARD: Self = Self::new("Undo Move Word Forward", "Redo Move Word Forward");
    pub const MOVE_WORD_BACK: Self = Self::new("Undo Move Word Back", "Redo Move Word Back");
    pub const END_SENTENCE: Self = Self::new("Undo Row Ends Sentence", "Redo Row Ends Sentence");
    pub const END_PARAGRAPH: Self = Self::new("Undo Row Ends Paragraph", "Redo Row Ends Paragraph");
    pub const CLEANUP: Self = Self::new("Undo Chart Repair", "Redo Chart Repair");
}

/// Host-side undo support. Every command brackets its mutations with exactly one
/// begin/end pair; rollback on failure is the host's business.
pub trait ActionHandler {
    fn begin_unit_of_work(&mut self, labels: &UndoLabels);
    fn end_unit_of_work(&mut self);
}

/// Default handler: no undo, just a debug trace.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingActionHandler;

impl ActionHandler for LoggingActionHandler {
    fn begin_unit_of_work(&mut self, labels: &UndoLabels) {
        log::debug!("Begin unit of work: {}", labels.redo);
    }

    fn end_unit_of_work(&mut self) {
        log::debug!("End unit of work");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::test_support::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recording(Rc<RefCell<Vec<String>>>);

    impl ActionHandler for Recording {
        fn begin_unit_of_work(&mut self, labels: &UndoLabels) {
            self.0.borrow_mut().push(format!("begin {}", labels.undo));
        }

        fn end_unit_of_work(&mut self) {
            self.0.borrow_mut().push("end".to_string());
        }
    }

    #[test]
    fn test_nested_units_join_the_outermost() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut logic =
            logic_with("one two", 2).with_action_handler(Box::new(Recording(Rc::clone(&log))));

        logic.in_unit_of_work(UndoLabels::MAKE_MOVED, |l| {
            l.in_unit_of_work(UndoLabels::MOVE_TO_COLUMN, |_| ());
        });

        assert_eq!(
            *log.borrow(),
            vec!["begin Undo Make Moved Text".to_string(), "end".to_string()]
        );
    }
}

/*!
# Chart editing logic

[`ChartLogic`] is the command and query surface a charting UI talks to. It owns the text being
charted, the [`Chart`] store, the column list, and the ribbon of words still waiting to be
charted.

## Submodules

- `inspect`: query primitives over the parts of a cell or row
- `orphan`: words that belong earlier in the chart than its last charted word
- `planner`: deciding where new words go
- `numbering`: sentence/clause row labels
- `merge`: moving cell contents and single words between neighbouring cells
- `moved_text`: preposed/postposed markers, including splitting word groups
- `commands`: user-level commands, each wrapped in one unit of work
- `queries`: read-only helpers for menus and display
- `cleanup`: the consistency sweep that drops stale cell parts

Commands report "row modified" and "ribbon changed" through [`ChartEvent`] listeners and wrap
their mutations in an [`ActionHandler`] unit of work so the host can offer undo.
*/

mod cleanup;
mod commands;
mod inspect;
mod merge;
mod moved_text;
mod numbering;
mod orphan;
mod planner;
mod queries;
mod unit_of_work;

pub use cleanup::CleanupReport;
pub use moved_text::MovedFromMarker;
pub use numbering::{clause_number_from_label, decipher_row_label, label_from_clause_number};
pub use orphan::BorderingCells;
pub use planner::{WhereToAdd, WhereToAddChOrph};
pub use queries::MissingState;
pub use unit_of_work::{ActionHandler, LoggingActionHandler, UndoLabels};

use crate::chart::{Chart, ChartLocation, Column, ColumnId, TemplateNode, collect_columns};
use crate::error::ChartError;
use crate::text::{Occurrence, Text};

/// Tunables for chart editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSettings {
    /// How many uncharted words the ribbon shows.
    pub max_ribbon_context: usize,
    /// How far either way to look for rows in the same sentence.
    pub rows_in_sentence_limit: usize,
    /// Columns that are routinely left empty on purpose and so never need a missing marker.
    pub auto_missing_columns: Vec<String>,
    /// Columns are displayed right to left.
    pub right_to_left: bool,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            max_ribbon_context: 20,
            rows_in_sentence_limit: 5,
            auto_missing_columns: vec!["Subject".to_string(), "Verb".to_string()],
            right_to_left: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartEvent {
    RowModified(crate::chart::RowId),
    RibbonChanged,
}

/// Limit on how far the ribbon selection may extend, set while inserting chart orphans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RibbonLimit {
    /// Index in the ribbon of the last word that may be selected.
    pub end_index: usize,
    pub occurrence: Occurrence,
}

/// The uncharted words shown to the user, and the leading run of them currently selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ribbon {
    items: Vec<Occurrence>,
    selected: usize,
    limit: Option<RibbonLimit>,
}

impl Ribbon {
    pub fn items(&self) -> &[Occurrence] {
        &self.items
    }

    pub fn selected(&self) -> &[Occurrence] {
        &self.items[..self.selected.min(self.items.len())]
    }

    pub fn limit(&self) -> Option<RibbonLimit> {
        self.limit
    }

    /// Selects the first `count` words, clamped to the ribbon and to any limit.
    pub fn select(&mut self, count: usize) {
        let max = self
            .limit
            .map_or(self.items.len(), |l| (l.end_index + 1).min(self.items.len()));
        self.selected = count.min(max);
    }

    fn reset(&mut self, items: Vec<Occurrence>) {
        self.selected = usize::from(!items.is_empty());
        self.items = items;
        self.limit = None;
    }
}

/// Rectangle of cells, in row/column index space, where a chart orphan may be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightRange {
    pub first_row: usize,
    pub first_column: usize,
    pub last_row: usize,
    pub last_column: usize,
}

type Listener = Box<dyn FnMut(&ChartEvent)>;

pub struct ChartLogic {
    text: Text,
    chart: Chart,
    columns: Vec<Column>,
    settings: ChartSettings,
    ribbon: Ribbon,
    highlight: Option<HighlightRange>,
    last_move_cell: Option<ChartLocation>,
    action_handler: Box<dyn ActionHandler>,
    unit_of_work_depth: usize,
    listeners: Vec<Listener>,
}

impl ChartLogic {
    pub fn new(text: Text, template: &TemplateNode, settings: ChartSettings) -> Self {
        let columns = collect_columns(template);
        log::debug!(
            "Charting text with {} columns: {}",
            columns.len(),
            columns
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        let mut logic = Self {
            text,
            chart: Chart::new(),
            columns,
            settings,
            ribbon: Ribbon::default(),
            highlight: None,
            last_move_cell: None,
            action_handler: Box::new(LoggingActionHandler),
            unit_of_work_depth: 0,
            listeners: Vec::new(),
        };
        logic.refresh_ribbon();
        logic
    }

    pub fn with_action_handler(mut self, handler: Box<dyn ActionHandler>) -> Self {
        self.action_handler = handler;
        self
    }

    pub fn text(&self) -> &Text {
        &self.text
    }

    /// Swaps in an edited text. Chart content built against the old text is left for
    /// [`ChartLogic::cleanup_invalid_chart_cells`] to repair.
    pub fn set_text(&mut self, text: Text) {
        self.text = text;
        self.refresh_ribbon();
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    /// Direct store access, for loading a saved chart or building fixtures.
    pub fn chart_mut(&mut self) -> &mut Chart {
        &mut self.chart
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    pub fn ribbon(&self) -> &Ribbon {
        &self.ribbon
    }

    pub fn ribbon_mut(&mut self) -> &mut Ribbon {
        &mut self.ribbon
    }

    pub fn highlight(&self) -> Option<HighlightRange> {
        self.highlight
    }

    pub fn last_move_cell(&self) -> Option<ChartLocation> {
        self.last_move_cell
    }

    pub fn column_id(&self, index: usize) -> Result<ColumnId, ChartError> {
        self.columns
            .get(index)
            .map(|c| c.id)
            .ok_or(ChartError::ColumnOutOfRange {
                column: index,
                count: self.columns.len(),
            })
    }

    pub fn is_valid_location(&self, cell: &ChartLocation) -> bool {
        self.chart.contains_row(cell.row) && cell.column < self.columns.len()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ChartEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn fire(&mut self, event: ChartEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    pub(crate) fn fire_row_modified(&mut self, row: Option<crate::chart::RowId>) {
        if let Some(row) = row
            && self.chart.contains_row(row)
        {
            self.fire(ChartEvent::RowModified(row));
        }
    }

    /// Re-reads the uncharted words, selects the first, and prepares orphan insertion if needed.
    pub(crate) fn note_ribbon_changed(&mut self) {
        self.refresh_ribbon();
        self.fire(ChartEvent::RibbonChanged);
    }

    fn refresh_ribbon(&mut self) {
        let items = self.next_uncharted_input(self.settings.max_ribbon_context);
        self.ribbon.reset(items);
        self.highlight = None;
        if let Some(first) = self.ribbon.items().first().copied()
            && let Ok(Some(position)) = self.is_chorph(first)
        {
            self.prepare_for_chorph_insert(position);
        }
    }

    /// Runs `f` inside one undoable unit. Nested calls join the outermost unit.
    pub(crate) fn in_unit_of_work<T>(
        &mut self,
        labels: UndoLabels,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        if self.unit_of_work_depth == 0 {
            self.action_handler.begin_unit_of_work(&labels);
        }
        self.unit_of_work_depth += 1;
        let result = f(self);
        self.unit_of_work_depth -= 1;
        if self.unit_of_work_depth == 0 {
            self.action_handler.end_unit_of_work();
        }
        result
    }
}

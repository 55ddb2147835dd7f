use serde::Serialize;

use crate::chart::{CellPartKind, ClauseType, PartId, RowId};
use crate::logic::ChartLogic;

#[derive(Debug, Serialize)]
pub struct Snap {
    pub columns: Vec<String>,
    pub rows: Vec<RowSnap>,
    /// Forms of the uncharted words on the ribbon.
    pub ribbon: Vec<String>,
    /// How many leading ribbon words are selected.
    pub selected: usize,
}

#[derive(Debug, Serialize)]
pub struct RowSnap {
    pub label: String,
    pub flags: Vec<String>,
    /// One entry per column, empty when the cell holds nothing.
    pub cells: Vec<String>,
    pub notes: Option<String>,
}

pub fn normalize(logic: &ChartLogic) -> Snap {
    let chart = logic.chart();
    let rows = chart
        .rows()
        .iter()
        .filter_map(|row| {
            let props = chart.row(*row)?;
            let mut cells = vec![Vec::new(); logic.column_count()];
            for part in chart.parts_in_row(*row) {
                if let Some(column) = logic.column_index_of_part(*part) {
                    cells[column].push(cell_text(logic, *part));
                }
            }
            Some(RowSnap {
                label: props.label().to_string(),
                flags: row_flags(logic, *row),
                cells: cells.into_iter().map(|c| c.join(" ")).collect(),
                notes: props.notes.clone(),
            })
        })
        .collect();

    let ribbon = logic.ribbon();
    Snap {
        columns: logic.columns().iter().map(|c| c.name.clone()).collect(),
        rows,
        ribbon: ribbon
            .items()
            .iter()
            .filter_map(|occ| logic.text().form(*occ))
            .map(str::to_string)
            .collect(),
        selected: ribbon.selected().len(),
    }
}

fn row_flags(logic: &ChartLogic, row: RowId) -> Vec<String> {
    let Some(props) = logic.chart().row(row) else {
        return Vec::new();
    };
    let mut flags = Vec::new();
    if props.clause_type != ClauseType::Normal {
        flags.push(format!("{:?}", props.clause_type));
    }
    if props.start_dependent_group {
        flags.push("StartDep".to_string());
    }
    if props.end_dependent_group {
        flags.push("EndDep".to_string());
    }
    if props.end_sentence {
        flags.push("EndSentence".to_string());
    }
    if props.end_paragraph {
        flags.push("EndParagraph".to_string());
    }
    flags
}

/// Display string for one cell part.
///
/// Word groups show their words in brackets, with a trailing `*` when they are moved text.
/// Merge flags show as `<` and `>` on the side that merges.
pub fn cell_text(logic: &ChartLogic, part: PartId) -> String {
    let chart = logic.chart();
    let Some(cell_part) = chart.part(part) else {
        return String::new();
    };
    let body = match cell_part.kind() {
        CellPartKind::WordGroup(span) => {
            let moved = if logic.is_moved_text(part) { "*" } else { "" };
            format!("[{}]{moved}", logic.text().span_text(span.begin, span.end))
        }
        CellPartKind::Tag(None) => "---".to_string(),
        CellPartKind::Tag(Some(tag)) => format!("#{}", tag.0),
        CellPartKind::ClauseMarker { dependent_rows } => {
            let labels: Vec<&str> = dependent_rows
                .iter()
                .filter_map(|r| chart.row_label(*r))
                .collect();
            format!("[{}]", labels.join(" "))
        }
        CellPartKind::MovedTextMarker {
            word_group,
            preposed,
        } => {
            let words = chart
                .word_group(*word_group)
                .map(|span| logic.text().span_text(span.begin, span.end))
                .unwrap_or_default();
            if *preposed {
                format!("<<{words}")
            } else {
                format!("{words}>>")
            }
        }
    };
    let before = if cell_part.merges_before { "<" } else { "" };
    let after = if cell_part.merges_after { ">" } else { "" };
    format!("{before}{body}{after}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{PossibilityId, TemplateNode};
    use crate::logic::ChartSettings;
    use crate::text::Text;
    use pretty_assertions::assert_eq;

    fn logic(source: &str) -> ChartLogic {
        ChartLogic::new(
            Text::parse(source),
            &TemplateNode::flat(&["Pre", "Subj", "Verb", "Obj"]),
            ChartSettings::default(),
        )
    }

    #[test]
    fn test_empty_chart_lists_columns_and_ribbon() {
        let logic = logic("The dog barked.");

        let snap = normalize(&logic);

        assert_eq!(snap.columns, vec!["Pre", "Subj", "Verb", "Obj"]);
        assert!(snap.rows.is_empty());
        assert_eq!(snap.ribbon, vec!["The", "dog", "barked"]);
        assert_eq!(snap.selected, 1);
    }

    #[test]
    fn test_cells_render_one_string_per_column() {
        let mut logic = logic("The dog barked.");
        logic.ribbon_mut().select(2);
        logic.move_to_column(1).unwrap();
        logic.move_to_column(2).unwrap();
        let row = logic.chart().rows()[0];
        logic
            .toggle_possibility_tag(
                crate::chart::ChartLocation::new(row, 3),
                PossibilityId(7),
            )
            .unwrap();
        logic.toggle_row_ends_sentence(row).unwrap();

        let snap = normalize(&logic);

        assert_eq!(snap.rows.len(), 1);
        let row = &snap.rows[0];
        assert_eq!(row.label, "1");
        assert_eq!(row.cells, vec!["", "[The dog]", "[barked]", "#7"]);
        assert_eq!(row.flags, vec!["EndSentence"]);
        assert!(snap.ribbon.is_empty());
    }
}

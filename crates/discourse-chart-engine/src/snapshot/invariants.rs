use std::collections::HashSet;

use crate::chart::CellPartKind;
use crate::logic::ChartLogic;

pub fn check(logic: &ChartLogic) {
    let chart = logic.chart();
    let text = logic.text();
    let mut labels = HashSet::new();
    let mut spans = Vec::new();

    for row in chart.rows() {
        let props = chart
            .row(*row)
            .unwrap_or_else(|| panic!("row list holds deleted row {row:?}"));
        assert!(
            labels.insert(props.label().to_string()),
            "duplicate row label: {}",
            props.label()
        );

        let mut last_column = 0;
        for part in chart.parts_in_row(*row) {
            let cell_part = chart
                .part(*part)
                .unwrap_or_else(|| panic!("row {} holds deleted part {part:?}", props.label()));
            assert_eq!(
                cell_part.row(),
                *row,
                "part {part:?} listed in row {} but owned by another row",
                props.label()
            );
            let column = logic
                .column_index_of_part(*part)
                .unwrap_or_else(|| panic!("part {part:?} is in a column outside the template"));
            assert!(
                column >= last_column,
                "parts out of column order in row {}: column {column} after {last_column}",
                props.label()
            );
            last_column = column;

            match cell_part.kind() {
                CellPartKind::WordGroup(span) => {
                    assert!(
                        text.has_wordform(span.begin) && text.has_wordform(span.end),
                        "word group {part:?} does not begin and end on wordforms: {span:?}"
                    );
                    assert!(
                        span.begin <= span.end,
                        "word group {part:?} ends before it begins: {span:?}"
                    );
                    spans.push((span.begin, span.end));
                }
                CellPartKind::MovedTextMarker { word_group, .. } => {
                    assert!(
                        logic.is_word_group(*word_group),
                        "moved text marker {part:?} points at missing word group {word_group:?}"
                    );
                }
                CellPartKind::ClauseMarker { dependent_rows } => {
                    assert!(
                        !dependent_rows.is_empty(),
                        "clause marker {part:?} has no dependent rows"
                    );
                    for dependent in dependent_rows {
                        assert!(
                            chart.contains_row(*dependent),
                            "clause marker {part:?} points at deleted row {dependent:?}"
                        );
                    }
                }
                CellPartKind::Tag(_) => {}
            }
        }
    }

    spans.sort();
    for pair in spans.windows(2) {
        assert!(
            pair[0].1 < pair[1].0,
            "word groups overlap: {:?} and {:?}",
            pair[0],
            pair[1]
        );
    }
}

#![allow(dead_code)]

use discourse_chart_engine::chart::CellPartKind;
use discourse_chart_engine::{
    ChartLocation, ChartLogic, ChartSettings, Occurrence, PartId, RowId, TemplateNode, Text,
};

/// "w0 w1 ... w{count-1}": one segment, so word `n` is `Occurrence::new(0, n)`.
pub fn words(count: usize) -> String {
    (0..count)
        .map(|i| format!("w{i}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn logic_with(source: &str, columns: usize) -> ChartLogic {
    let names: Vec<String> = (0..columns).map(|i| format!("C{i}")).collect();
    ChartLogic::new(
        Text::parse(source),
        &TemplateNode::flat(&names),
        ChartSettings::default(),
    )
}

pub fn occ(index: usize) -> Occurrence {
    Occurrence::new(0, index)
}

pub fn cell(row: RowId, column: usize) -> ChartLocation {
    ChartLocation::new(row, column)
}

pub fn add_group(
    logic: &mut ChartLogic,
    row: RowId,
    column: usize,
    begin: usize,
    end: usize,
) -> PartId {
    logic
        .append_word_group(cell(row, column), occ(begin), occ(end))
        .unwrap()
}

pub fn add_missing(logic: &mut ChartLogic, row: RowId, column: usize) -> PartId {
    let index = logic.index_of_cell_part_in_later_column(row, column);
    let id = logic.column_id(column).unwrap();
    logic
        .chart_mut()
        .insert_part(row, index, id, CellPartKind::Tag(None))
        .unwrap()
}

pub fn words_of(logic: &ChartLogic, part: PartId) -> Vec<usize> {
    logic.occurrences(part).iter().map(|o| o.index).collect()
}

pub fn cell_words(logic: &ChartLogic, row: RowId, column: usize) -> Vec<Vec<usize>> {
    logic
        .word_groups_in(&logic.parts_in_cell(&cell(row, column)))
        .into_iter()
        .map(|p| words_of(logic, p))
        .collect()
}

pub fn charted_word_count(logic: &ChartLogic) -> usize {
    let chart = logic.chart();
    chart
        .rows()
        .iter()
        .flat_map(|r| chart.parts_in_row(*r))
        .filter(|p| logic.is_word_group(**p))
        .map(|p| logic.occurrences(*p).len())
        .sum()
}

pub fn labels(logic: &ChartLogic) -> Vec<String> {
    let chart = logic.chart();
    chart
        .rows()
        .iter()
        .filter_map(|r| chart.row_label(*r))
        .map(str::to_string)
        .collect()
}

/// (row index, column) so cells compare in chart order.
pub fn grid_position(logic: &ChartLogic, location: &ChartLocation) -> (usize, usize) {
    (
        logic.chart().row_index(location.row).unwrap(),
        location.column,
    )
}

mod common;

use common::*;
use discourse_chart_engine::logic::{MovedFromMarker, WhereToAdd};
use discourse_chart_engine::{ChartLogic, ChartSettings, TemplateNode, Text, snapshot};
use pretty_assertions::assert_eq;

#[test]
fn move_cell_forward_into_empty_column_relocates_group() {
    let mut logic = logic_with(&words(3), 4);
    let row = logic.chart_mut().append_row("1");
    let group = add_group(&mut logic, row, 2, 0, 2);

    logic.move_cell_forward(cell(row, 2)).unwrap();

    assert_eq!(logic.column_index_of_part(group), Some(3));
    assert_eq!(cell_words(&logic, row, 3), vec![vec![0, 1, 2]]);
    assert!(logic.is_cell_empty(&cell(row, 2)));
    assert_eq!(logic.chart().word_group_count(), 1);
    assert_eq!(logic.last_move_cell(), Some(cell(row, 3)));
    snapshot::invariants(&logic);
}

#[test]
fn missing_marker_slot_is_reused_and_marker_removed() {
    let mut logic = logic_with(&words(3), 3);
    let row = logic.chart_mut().append_row("1");
    add_group(&mut logic, row, 0, 0, 0);
    let marker = add_missing(&mut logic, row, 1);
    logic.ribbon_mut().select(1);

    assert_eq!(
        logic.find_where_to_add_words(1),
        WhereToAdd::InsertInRow {
            index: 1,
            replacing: Some(marker),
        }
    );

    logic.move_to_column(1).unwrap();

    assert!(!logic.chart().contains_part(marker));
    assert_eq!(cell_words(&logic, row, 1), vec![vec![1]]);
    assert_eq!(logic.chart().parts_in_row(row).len(), 2);
    snapshot::invariants(&logic);
}

#[test]
fn appending_row_after_open_clause_letters_both() {
    let mut logic = logic_with(&words(3), 3);
    let first = logic.chart_mut().append_row("1");
    add_group(&mut logic, first, 0, 0, 0);
    logic.chart_mut().row_mut(first).unwrap().end_sentence = true;
    let second = logic.chart_mut().append_row("2");
    add_group(&mut logic, second, 0, 1, 1);

    let third = logic.make_new_row();

    assert_eq!(logic.row_label(second), Some("2a"));
    assert_eq!(logic.row_label(third), Some("2b"));
    assert_eq!(labels(&logic), vec!["1", "2a", "2b"]);
}

#[test]
fn partial_moved_text_splits_group_in_three() {
    let mut logic = logic_with(&words(5), 3);
    let row = logic.chart_mut().append_row("1");
    let whole = add_group(&mut logic, row, 0, 0, 4);

    let marker = logic
        .mark_as_moved_from(cell(row, 0), cell(row, 2), Some((occ(2), occ(3))))
        .unwrap()
        .unwrap();

    assert_eq!(
        cell_words(&logic, row, 0),
        vec![vec![0, 1], vec![2, 3], vec![4]]
    );
    let (target, preposed) = logic
        .chart()
        .part(marker)
        .and_then(|p| p.moved_text_target())
        .unwrap();
    assert!(preposed);
    assert_eq!(words_of(&logic, target), vec![2, 3]);
    assert_eq!(words_of(&logic, whole), vec![0, 1]);
    assert!(logic.is_moved_text(target));
    assert!(!logic.is_moved_text(whole));
    snapshot::invariants(&logic);

    logic.remove_moved_from(cell(row, 0), MovedFromMarker::Part(marker));

    assert_eq!(cell_words(&logic, row, 0), vec![vec![0, 1, 2, 3, 4]]);
}

#[test]
fn charting_a_story_end_to_end() {
    let mut logic = ChartLogic::new(
        Text::parse("The old man saw a dog. It barked loudly."),
        &TemplateNode::flat(&["Pre", "Subj", "Verb", "Obj", "Post"]),
        ChartSettings::default(),
    );

    logic.ribbon_mut().select(3);
    let first = logic.move_to_column(1).unwrap();
    logic.move_to_column(2).unwrap();
    logic.ribbon_mut().select(2);
    logic.move_to_column(3).unwrap();
    logic.toggle_row_ends_sentence(first).unwrap();
    logic.move_to_column(1).unwrap();
    logic.move_to_column(2).unwrap();
    let last = logic.move_to_here_in_new_clause(4).unwrap();
    logic.toggle_missing_marker(cell(last, 3)).unwrap();

    assert!(logic.is_chart_complete());
    snapshot::invariants(&logic);
    insta::assert_yaml_snapshot!("story_chart", snapshot::normalize(&logic));
}

#[test]
fn editing_text_under_chart_archives_notes() {
    let mut logic = logic_with(&words(4), 3);
    logic.ribbon_mut().select(2);
    let row = logic.move_to_column(0).unwrap();
    logic.chart_mut().row_mut(row).unwrap().notes = Some("topic shift".to_string());

    logic.set_text(Text::parse("a brand new text"));
    let mut archived = Vec::new();
    let report = logic.cleanup_invalid_chart_cells(|notes| archived.extend_from_slice(notes));

    assert!(report.cleared_chart);
    assert_eq!(archived, vec!["topic shift".to_string()]);
    assert!(logic.chart().is_empty());
    assert_eq!(logic.ribbon().items().len(), 4);
}

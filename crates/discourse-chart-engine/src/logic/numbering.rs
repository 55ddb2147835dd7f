//! Row labels: a sentence number followed by a bijective base-26 clause letter ("3", "3a", "12ab").
//! The letter is left off when the row is a sentence on its own.

use super::ChartLogic;
use crate::chart::RowId;

/// `"a"` is 1, `"z"` is 26, `"aa"` is 27. The empty string is 0.
pub fn clause_number_from_label(letters: &str) -> usize {
    letters
        .bytes()
        .filter(u8::is_ascii_lowercase)
        .fold(0, |acc, b| acc * 26 + usize::from(b - b'a') + 1)
}

/// Inverse of [`clause_number_from_label`]. Values below 1 give an empty label.
pub fn label_from_clause_number(mut value: usize) -> String {
    let mut letters = Vec::new();
    while value > 0 {
        value -= 1;
        letters.push(b'a' + (value % 26) as u8);
        value /= 26;
    }
    letters.iter().rev().map(|b| char::from(*b)).collect()
}

/// Splits a label into (sentence number, clause number).
///
/// A label with no clause letters is clause 1. Unreadable numbers fall back to 1.
pub fn decipher_row_label(label: &str) -> (usize, usize) {
    let first_letter = label
        .char_indices()
        .skip(1)
        .find(|(_, c)| c.is_ascii_lowercase())
        .map(|(i, _)| i);
    match first_letter {
        None => (label.parse().unwrap_or(1), 1),
        Some(i) => (
            label[..i].parse().unwrap_or(1),
            clause_number_from_label(&label[i..]),
        ),
    }
}

/// Advances the running (sentence, clause) counters for one row and returns its label.
pub(crate) fn calculate_row_label(
    sentence: &mut usize,
    clause: &mut usize,
    break_before: bool,
    break_after: bool,
) -> String {
    if break_before {
        *sentence += 1;
        *clause = 1;
    } else {
        *clause += 1;
    }
    if break_before && break_after {
        sentence.to_string()
    } else {
        format!("{sentence}{}", label_from_clause_number(*clause))
    }
}

impl ChartLogic {
    /// Recomputes labels from row `from` onward, writing only the ones that changed.
    ///
    /// The last row always counts as ending its sentence. With `one_sentence_only` the walk
    /// stops at the second sentence end it reaches, which covers edits that straddle a boundary.
    pub fn renumber_rows(&mut self, from: usize, one_sentence_only: bool) {
        let rows = self.chart.rows().to_vec();
        if from >= rows.len() {
            return;
        }
        let mut prev_eos = true;
        let mut sentence = 0;
        let mut clause = 1;
        if from > 0
            && let Some(prev) = self.chart.row(rows[from - 1])
        {
            prev_eos = prev.end_sentence;
            (sentence, clause) = decipher_row_label(prev.label());
        }

        let mut finished_one = false;
        for (index, id) in rows.iter().enumerate().skip(from) {
            let Some(row) = self.chart.row_mut(*id) else {
                continue;
            };
            let this_eos = index + 1 == rows.len() || row.end_sentence;
            let label = calculate_row_label(&mut sentence, &mut clause, prev_eos, this_eos);
            if row.set_label(&label) {
                log::debug!("Relabelled row {index} as {label}");
            }
            if this_eos && one_sentence_only && finished_one {
                break;
            }
            if this_eos {
                finished_one = true;
            }
            prev_eos = this_eos;
        }
    }

    /// Label for a row about to be appended at the end of the chart.
    ///
    /// A bare-number last row that does not end its sentence gains an "a", since it is no
    /// longer the only clause.
    pub(crate) fn create_new_row_label(&mut self) -> String {
        let Some(last) = self.chart.last_row() else {
            return "1".to_string();
        };
        let Some(row) = self.chart.row_mut(last) else {
            return "1".to_string();
        };
        let prev_eos = row.end_sentence;
        let (mut sentence, mut clause) = decipher_row_label(row.label());
        if clause == 1 && !prev_eos {
            row.set_label(&format!("{sentence}a"));
        }
        calculate_row_label(&mut sentence, &mut clause, prev_eos, true)
    }

    /// Appends a correctly labelled empty row.
    pub fn make_new_row(&mut self) -> RowId {
        let label = self.create_new_row_label();
        log::debug!("Appending row {label}");
        self.chart.append_row(label)
    }
}

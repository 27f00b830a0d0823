use serde::Serialize;

use crate::models::{AggregateStudentScores, Dimension, GradeState, Student};
use crate::palette::{Palette, ScoreBand};
use crate::periods::Column;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Cell {
    NoData,
    Graded {
        state: GradeState,
        score: f64,
        color: String,
    },
    Total {
        value: f64,
    },
    Score {
        value: f64,
        band: ScoreBand,
        color: String,
    },
    Points {
        value: f64,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRow {
    pub student_id: i64,
    pub full_name: String,
    pub cells: Vec<Vec<Cell>>,
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// QNA and month averages: anything that rounds to 0 has not been
/// evaluated yet.
pub fn aggregate_cell(score: f64, palette: &Palette) -> Cell {
    let value = round_one_decimal(score);
    if value <= 0.0 {
        return Cell::NoData;
    }
    let band = ScoreBand::for_score(score);
    Cell::Score {
        value,
        band,
        color: palette.band_color(band).to_string(),
    }
}

/// Number of cells a column renders for one student.
pub fn cell_width(column: &Column<'_>) -> usize {
    match column {
        Column::Week { .. } => Dimension::ALL.len() + 1,
        Column::Qna { .. } | Column::Month { .. } => Dimension::ALL.len(),
        Column::Bimester { .. } => 1,
    }
}

pub fn resolve_cells(student_id: i64, column: &Column<'_>, palette: &Palette) -> Vec<Cell> {
    match column {
        Column::Week { data, .. } => {
            let Some(entry) = data.students.iter().find(|s| s.student_id == student_id) else {
                return vec![Cell::NoData; cell_width(column)];
            };
            let mut cells: Vec<Cell> = Dimension::ALL
                .iter()
                .map(|dimension| {
                    let score = entry.dimension(*dimension);
                    Cell::Graded {
                        state: score.state,
                        score: score.score,
                        color: palette.state_color(score.state).to_string(),
                    }
                })
                .collect();
            cells.push(Cell::Total {
                value: entry.total_score,
            });
            cells
        }
        Column::Qna { data, .. } => aggregate_cells(&data.students, student_id, palette),
        Column::Month { data, .. } => aggregate_cells(&data.students, student_id, palette),
        Column::Bimester { data, .. } => {
            let total = data
                .students
                .iter()
                .find(|s| s.student_id == student_id)
                .map(|s| s.total_points)
                .unwrap_or(0.0);
            if total > 0.0 {
                vec![Cell::Points { value: total }]
            } else {
                vec![Cell::NoData]
            }
        }
    }
}

pub fn resolve_row(student: &Student, columns: &[Column<'_>], palette: &Palette) -> StudentRow {
    StudentRow {
        student_id: student.student_id,
        full_name: student.full_name.clone(),
        cells: columns
            .iter()
            .map(|column| resolve_cells(student.student_id, column, palette))
            .collect(),
    }
}

fn aggregate_cells(
    students: &[AggregateStudentScores],
    student_id: i64,
    palette: &Palette,
) -> Vec<Cell> {
    match students.iter().find(|s| s.student_id == student_id) {
        Some(scores) => Dimension::ALL
            .iter()
            .map(|dimension| aggregate_cell(scores.dimension(*dimension), palette))
            .collect(),
        None => vec![Cell::NoData; Dimension::ALL.len()],
    }
}

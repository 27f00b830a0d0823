use std::fmt::Write;

use serde::Serialize;

use crate::cells::{self, Cell, StudentRow};
use crate::grid::{self, GridCell, ScheduleView};
use crate::models::{hhmm, Dimension, Student};
use crate::palette::{Palette, PaletteState};
use crate::periods::{Column, ColumnKind};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnHeader {
    pub kind: ColumnKind,
    pub label: String,
    pub width: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryTable<'a> {
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<StudentRow>,
    pub palette: &'a Palette,
    pub palette_fetched: bool,
}

pub fn history_table<'a>(
    students: &[Student],
    columns: &[Column<'_>],
    palette: &'a PaletteState,
) -> HistoryTable<'a> {
    HistoryTable {
        columns: columns
            .iter()
            .map(|column| ColumnHeader {
                kind: column.kind(),
                label: column.label().to_string(),
                width: cells::cell_width(column),
            })
            .collect(),
        rows: students
            .iter()
            .map(|student| cells::resolve_row(student, columns, palette.palette()))
            .collect(),
        palette: palette.palette(),
        palette_fetched: palette.is_fetched(),
    }
}

pub fn history_json(
    students: &[Student],
    columns: &[Column<'_>],
    palette: &PaletteState,
) -> anyhow::Result<String> {
    let table = history_table(students, columns, palette);
    Ok(serde_json::to_string_pretty(&table)?)
}

pub fn history_markdown(
    students: &[Student],
    columns: &[Column<'_>],
    palette: &PaletteState,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# ERICA Evaluation History");
    let _ = writeln!(
        output,
        "{} columns for {} students (colors: {})",
        columns.len(),
        students.len(),
        if palette.is_fetched() { "stored" } else { "built-in" }
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Columns");

    if columns.is_empty() {
        let _ = writeln!(output, "No evaluation periods recorded.");
        return output;
    }

    for (position, column) in columns.iter().enumerate() {
        let _ = writeln!(output, "{}. {}", position + 1, column.label());
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Students");

    if students.is_empty() {
        let _ = writeln!(output, "No students in this section.");
        return output;
    }

    let headers: Vec<String> = columns.iter().flat_map(sub_headers).collect();
    let _ = writeln!(output, "| Student | {} |", headers.join(" | "));
    let _ = writeln!(output, "|---|{}", "---|".repeat(headers.len()));

    for student in students {
        let row = cells::resolve_row(student, columns, palette.palette());
        let values: Vec<String> = row.cells.iter().flatten().map(format_cell).collect();
        let _ = writeln!(output, "| {} | {} |", row.full_name, values.join(" | "));
    }

    output
}

pub fn timetable_json(view: &ScheduleView<'_>) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(view)?)
}

pub fn timetable_markdown(section: Option<&str>, view: &ScheduleView<'_>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Timetable");
    if let Some(section) = section {
        let _ = writeln!(output, "Section {section}");
    }
    let _ = writeln!(output);

    let schedule = match view {
        ScheduleView::NotConfigured => {
            let _ = writeln!(output, "This section has no schedule configuration yet.");
            return output;
        }
        ScheduleView::Loading => {
            let _ = writeln!(output, "Schedule is still loading.");
            return output;
        }
        ScheduleView::NoMatches => {
            let _ = writeln!(output, "No classes scheduled for the selected days.");
            return output;
        }
        ScheduleView::Ready(schedule) => schedule,
    };

    let day_names: Vec<&str> = schedule.days.iter().map(|day| grid::day_name(*day)).collect();
    let _ = writeln!(output, "| Time | {} |", day_names.join(" | "));
    let _ = writeln!(output, "|---|{}", "---|".repeat(day_names.len()));

    for row in &schedule.rows {
        let rendered: Vec<String> = row
            .cells
            .iter()
            .map(|cell| match cell {
                GridCell::Break { label } => format!("_{}_", label.as_deref().unwrap_or("Break")),
                GridCell::Class {
                    course_name,
                    teacher_name,
                    classroom,
                    ..
                } if classroom.is_empty() => format!("{course_name} / {teacher_name}"),
                GridCell::Class {
                    course_name,
                    teacher_name,
                    classroom,
                    ..
                } => format!("{course_name} / {teacher_name} / {classroom}"),
                GridCell::Empty => "-".to_string(),
            })
            .collect();
        let _ = writeln!(
            output,
            "| {}-{} | {} |",
            hhmm::format(&row.slot.start),
            hhmm::format(&row.slot.end),
            rendered.join(" | ")
        );
    }

    output
}

fn sub_headers(column: &Column<'_>) -> Vec<String> {
    let dimension_headers = |prefix: String| -> Vec<String> {
        Dimension::ALL
            .iter()
            .map(|dimension| format!("{prefix} {}", dimension.short_code()))
            .collect()
    };

    match column {
        Column::Week { data, .. } => {
            let mut headers = dimension_headers(format!("W{}", data.week_number));
            headers.push(format!("W{} TOT", data.week_number));
            headers
        }
        Column::Qna { data, .. } => dimension_headers(format!("Q{}", data.qna_number)),
        Column::Month { data, .. } => dimension_headers(format!("M{}", data.month_number)),
        Column::Bimester { data, .. } => vec![format!("B{} PTS", data.bimester_number)],
    }
}

fn format_cell(cell: &Cell) -> String {
    match cell {
        Cell::NoData => "-".to_string(),
        Cell::Graded { state, score, .. } => format!("{} {:.2}", state.letter(), score),
        Cell::Total { value } => format!("{value:.2}"),
        Cell::Score { value, .. } => format!("{value:.1}"),
        Cell::Points { value } => format!("{value:.1}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::record;
    use crate::grid::{compose_view, DayFilter};
    use crate::models::{AggregateStudentScores, QnaRecord};
    use crate::periods::build_columns;
    use crate::periods::tests::sample_week;
    use crate::slots::generate_time_slots;
    use crate::slots::tests::sample_config;

    fn roster() -> Vec<Student> {
        vec![Student {
            student_id: 7,
            full_name: "Ana Flores".to_string(),
        }]
    }

    #[test]
    fn history_markdown_lists_columns_and_cells() {
        let weeks: Vec<_> = (1..=2).map(sample_week).collect();
        let qnas = vec![QnaRecord {
            qna_id: 1,
            qna_number: 1,
            weeks: vec![1, 2],
            students: vec![AggregateStudentScores {
                student_id: 7,
                ejecuta: 0.93,
                retiene: 0.0,
                interpreta: 0.0,
                conoce: 0.0,
                aplica: 0.0,
            }],
        }];
        let columns = build_columns(&weeks, &qnas, &[], None);
        let palette = PaletteState::Defaults(Palette::defaults());

        let report = history_markdown(&roster(), &columns, &palette);

        assert!(report.contains("3 columns for 1 students (colors: built-in)"));
        assert!(report.contains("3. QNA 1 (02/03 - 13/03)"));
        assert!(report.contains("| Student | W1 EJ |"));
        assert!(report.contains("Q1 AP |"));
        // Both weeks lack the student, the QNA has one real score.
        let row = report.lines().find(|l| l.starts_with("| Ana Flores")).unwrap();
        assert_eq!(row.matches(" - ").count(), 6 + 6 + 4);
        assert!(row.contains("| 0.9 |"));
    }

    #[test]
    fn history_markdown_without_periods() {
        let palette = PaletteState::Defaults(Palette::defaults());
        let report = history_markdown(&roster(), &[], &palette);
        assert!(report.contains("No evaluation periods recorded."));
    }

    #[test]
    fn history_json_reports_palette_phase() {
        let weeks = vec![sample_week(1)];
        let columns = build_columns(&weeks, &[], &[], None);
        let palette = PaletteState::Fetched(Palette::defaults());
        let json: serde_json::Value =
            serde_json::from_str(&history_json(&roster(), &columns, &palette).unwrap()).unwrap();

        assert_eq!(json["paletteFetched"], true);
        assert_eq!(json["columns"][0]["kind"], "week");
        assert_eq!(json["columns"][0]["width"], 6);
        assert_eq!(json["rows"][0]["cells"][0][0]["type"], "noData");
    }

    #[test]
    fn timetable_states_render_differently() {
        let config = sample_config();
        let slots = generate_time_slots(&config).unwrap();
        let records = vec![record(2, "08:00", 1, "Math")];

        let not_configured =
            timetable_markdown(None, &compose_view(None, Some(records.as_slice()), &slots, DayFilter::All));
        let loading =
            timetable_markdown(None, &compose_view(Some(&config), None, &slots, DayFilter::All));
        let no_matches = timetable_markdown(
            None,
            &compose_view(Some(&config), Some(records.as_slice()), &slots, DayFilter::Single(5)),
        );

        assert!(not_configured.contains("no schedule configuration"));
        assert!(loading.contains("still loading"));
        assert!(no_matches.contains("No classes scheduled"));
    }

    #[test]
    fn timetable_markdown_renders_grid() {
        let config = sample_config();
        let slots = generate_time_slots(&config).unwrap();
        let records = vec![record(2, "08:00", 1, "Math")];
        let view = compose_view(Some(&config), Some(records.as_slice()), &slots, DayFilter::Single(2));

        let report = timetable_markdown(Some("3A"), &view);
        assert!(report.contains("Section 3A"));
        assert!(report.contains("| Time | Tuesday |"));
        assert!(report.contains("| 08:00-09:00 | Math / Jorge Huaman / B-12 |"));
        assert!(report.contains("| 10:00-10:20 | _Recess_ |"));
        assert!(report.contains("| 09:00-10:00 | - |"));

        let json: serde_json::Value = serde_json::from_str(&timetable_json(&view).unwrap()).unwrap();
        assert_eq!(json["state"], "ready");
        assert_eq!(json["grid"]["rows"][0]["cells"][0]["courseName"], "Math");
    }
}

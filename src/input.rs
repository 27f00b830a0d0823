use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::models::{hhmm, Course, CourseAssignment, HistoryBundle, ScheduleRecord, Teacher};
use crate::slots::SectionScheduleConfig;

pub fn load_history(path: &Path) -> anyhow::Result<HistoryBundle> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let bundle: HistoryBundle = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid evaluation history export", path.display()))?;
    tracing::info!(
        weeks = bundle.weeks.len(),
        qnas = bundle.qnas.len(),
        months = bundle.months.len(),
        students = bundle.students.len(),
        "history loaded"
    );
    Ok(bundle)
}

pub fn load_section_config(path: &Path) -> anyhow::Result<SectionScheduleConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid section schedule config", path.display()))
}

/// Reads schedule records from a `.csv` export or a JSON array.
pub fn load_schedule(path: &Path) -> anyhow::Result<Vec<ScheduleRecord>> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let records = if is_csv {
        let reader = csv::Reader::from_path(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        read_schedule_csv(reader)?
    } else {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("{} is not a valid schedule export", path.display()))?
    };

    tracing::info!(records = records.len(), "schedule loaded");
    Ok(records)
}

pub fn read_schedule_csv<R: std::io::Read>(
    mut reader: csv::Reader<R>,
) -> anyhow::Result<Vec<ScheduleRecord>> {
    #[derive(Deserialize)]
    struct CsvRow {
        day_of_week: u8,
        start_time: String,
        end_time: String,
        classroom: Option<String>,
        course_id: i64,
        course_name: String,
        teacher_id: i64,
        teacher_name: String,
    }

    let mut records = Vec::new();
    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid schedule row {}", line + 1))?;
        let start_time = hhmm::parse(&row.start_time)
            .with_context(|| format!("invalid start_time `{}` on row {}", row.start_time, line + 1))?;
        let end_time = hhmm::parse(&row.end_time)
            .with_context(|| format!("invalid end_time `{}` on row {}", row.end_time, line + 1))?;

        records.push(ScheduleRecord {
            day_of_week: row.day_of_week,
            start_time,
            end_time,
            classroom: row.classroom.unwrap_or_default(),
            course_assignment: CourseAssignment {
                course: Course {
                    course_id: row.course_id,
                    name: row.course_name,
                },
                teacher: Teacher {
                    teacher_id: row.teacher_id,
                    full_name: row.teacher_name,
                },
            },
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_become_schedule_records() {
        let data = "\
day_of_week,start_time,end_time,classroom,course_id,course_name,teacher_id,teacher_name
2,08:00,09:00,A-101,1,Math,10,Rosa Quispe
3,09:00:00,10:00:00,,2,Art,20,Jorge Huaman
";
        let records = read_schedule_csv(csv::Reader::from_reader(data.as_bytes())).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].classroom, "A-101");
        assert_eq!(hhmm::format(&records[1].start_time), "09:00");
        assert_eq!(records[1].classroom, "");
        assert_eq!(records[1].course_assignment.teacher.full_name, "Jorge Huaman");
    }

    #[test]
    fn bad_time_names_the_row() {
        let data = "\
day_of_week,start_time,end_time,classroom,course_id,course_name,teacher_id,teacher_name
2,8am,09:00,A-101,1,Math,10,Rosa Quispe
";
        let err = read_schedule_csv(csv::Reader::from_reader(data.as_bytes())).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn history_bundle_defaults_missing_sections() {
        let raw = r#"{
            "weeks": [{
                "weekId": 1, "weekNumber": 1,
                "startDate": "2026-03-02", "endDate": "2026-03-06",
                "weekTheme": "Fractions"
            }]
        }"#;
        let bundle: HistoryBundle = serde_json::from_str(raw).unwrap();
        assert_eq!(bundle.weeks.len(), 1);
        assert!(bundle.qnas.is_empty());
        assert!(bundle.bimester.is_none());
    }
}

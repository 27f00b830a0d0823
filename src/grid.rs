use std::collections::HashMap;

use chrono::NaiveTime;
use serde::Serialize;

use crate::models::{hhmm, ScheduleRecord, TimeSlot};
use crate::slots::SectionScheduleConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayFilter {
    All,
    Single(u8),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GridCell<'a> {
    Break {
        label: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Class {
        course_name: String,
        teacher_name: String,
        classroom: String,
        color: String,
        #[serde(skip)]
        record: &'a ScheduleRecord,
    },
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRow<'a> {
    pub slot: TimeSlot,
    pub cells: Vec<GridCell<'a>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleGrid<'a> {
    pub days: Vec<u8>,
    pub rows: Vec<GridRow<'a>>,
}

/// The three ways a timetable can have nothing to show are kept apart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "grid", rename_all = "camelCase")]
pub enum ScheduleView<'a> {
    NotConfigured,
    Loading,
    NoMatches,
    Ready(ScheduleGrid<'a>),
}

pub fn slot_key(day: u8, start: NaiveTime) -> String {
    format!("{}-{}", day, hhmm::format(&start))
}

/// `"{day}-{HH:MM}"` to record. Duplicate keys: the later record wins.
pub fn build_lookup(records: &[ScheduleRecord]) -> HashMap<String, &ScheduleRecord> {
    let mut lookup = HashMap::with_capacity(records.len());
    for record in records {
        let key = slot_key(record.day_of_week, record.start_time);
        if lookup.insert(key, record).is_some() {
            tracing::debug!(
                day = record.day_of_week,
                start = %hhmm::format(&record.start_time),
                "duplicate schedule slot, keeping the later record"
            );
        }
    }
    lookup
}

pub fn displayed_days(config: &SectionScheduleConfig, filter: DayFilter) -> Vec<u8> {
    match filter {
        DayFilter::All => config.working_days.clone(),
        DayFilter::Single(day) => vec![day],
    }
}

pub fn course_hue(course_id: i64) -> f64 {
    (course_id as f64 * 137.5).rem_euclid(360.0)
}

pub fn course_color(course_id: i64) -> String {
    format!("hsl({}, 70%, 85%)", course_hue(course_id))
}

pub fn compose_grid<'a>(
    records: &'a [ScheduleRecord],
    slots: &[TimeSlot],
    days: &[u8],
) -> ScheduleGrid<'a> {
    let lookup = build_lookup(records);
    let rows = slots
        .iter()
        .map(|slot| GridRow {
            slot: slot.clone(),
            cells: days
                .iter()
                .map(|day| {
                    if slot.is_break {
                        return GridCell::Break {
                            label: slot.label.clone(),
                        };
                    }
                    match lookup.get(&slot_key(*day, slot.start)) {
                        Some(&record) => class_cell(record),
                        None => GridCell::Empty,
                    }
                })
                .collect(),
        })
        .collect();

    ScheduleGrid {
        days: days.to_vec(),
        rows,
    }
}

/// `records` is `None` while the schedule is still being fetched.
pub fn compose_view<'a>(
    config: Option<&SectionScheduleConfig>,
    records: Option<&'a [ScheduleRecord]>,
    slots: &[TimeSlot],
    filter: DayFilter,
) -> ScheduleView<'a> {
    let Some(config) = config else {
        return ScheduleView::NotConfigured;
    };
    let Some(records) = records else {
        return ScheduleView::Loading;
    };

    let days = displayed_days(config, filter);
    if !records.iter().any(|r| days.contains(&r.day_of_week)) {
        return ScheduleView::NoMatches;
    }

    ScheduleView::Ready(compose_grid(records, slots, &days))
}

pub fn day_name(day: u8) -> &'static str {
    match day {
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        7 => "Sunday",
        _ => "Unknown",
    }
}

fn class_cell(record: &ScheduleRecord) -> GridCell<'_> {
    let assignment = &record.course_assignment;
    GridCell::Class {
        course_name: assignment.course.name.clone(),
        teacher_name: assignment.teacher.full_name.clone(),
        classroom: record.classroom.clone(),
        color: course_color(assignment.course.course_id),
        record,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Course, CourseAssignment, Teacher};
    use crate::slots::generate_time_slots;
    use crate::slots::tests::sample_config;

    pub(crate) fn record(day: u8, start: &str, course_id: i64, course: &str) -> ScheduleRecord {
        let start_time = hhmm::parse(start).unwrap();
        ScheduleRecord {
            day_of_week: day,
            start_time,
            end_time: start_time + chrono::Duration::minutes(60),
            classroom: "B-12".to_string(),
            course_assignment: CourseAssignment {
                course: Course {
                    course_id,
                    name: course.to_string(),
                },
                teacher: Teacher {
                    teacher_id: course_id * 10,
                    full_name: "Jorge Huaman".to_string(),
                },
            },
        }
    }

    fn class_names(grid: &ScheduleGrid<'_>) -> Vec<(u8, String, String)> {
        let mut found = Vec::new();
        for row in &grid.rows {
            for (day, cell) in grid.days.iter().zip(&row.cells) {
                if let GridCell::Class { course_name, .. } = cell {
                    found.push((*day, hhmm::format(&row.slot.start), course_name.clone()));
                }
            }
        }
        found
    }

    #[test]
    fn records_land_only_in_their_exact_cell() {
        let records = vec![record(2, "08:00", 1, "Math"), record(3, "09:00", 2, "Art")];
        let slots = generate_time_slots(&sample_config()).unwrap();
        let grid = compose_grid(&records, &slots, &[2, 3]);

        assert_eq!(
            class_names(&grid),
            vec![
                (2, "08:00".to_string(), "Math".to_string()),
                (3, "09:00".to_string(), "Art".to_string()),
            ]
        );
        let empty = grid
            .rows
            .iter()
            .flat_map(|row| &row.cells)
            .filter(|cell| matches!(cell, GridCell::Empty))
            .count();
        let breaks = grid
            .rows
            .iter()
            .flat_map(|row| &row.cells)
            .filter(|cell| matches!(cell, GridCell::Break { .. }))
            .count();
        assert_eq!(breaks, 2);
        assert_eq!(empty, 5 * 2 - 2 - 2);
        assert!(matches!(
            &grid.rows[0].cells[0],
            GridCell::Class { record: source, .. } if std::ptr::eq(*source, &records[0])
        ));
    }

    #[test]
    fn break_wins_over_a_matching_record() {
        let records = vec![record(1, "10:00", 4, "Music")];
        let slots = generate_time_slots(&sample_config()).unwrap();
        assert!(slots[2].is_break);
        assert_eq!(hhmm::format(&slots[2].start), "10:00");

        let grid = compose_grid(&records, &slots, &[1]);
        assert_eq!(
            grid.rows[2].cells[0],
            GridCell::Break {
                label: Some("Recess".to_string())
            }
        );
        assert!(class_names(&grid).is_empty());
    }

    #[test]
    fn duplicate_slot_keeps_later_record() {
        let records = vec![record(1, "08:00", 1, "Math"), record(1, "08:00", 2, "Art")];
        let lookup = build_lookup(&records);
        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup["1-08:00"].course_assignment.course.name, "Art");
    }

    #[test]
    fn course_hue_is_stable_per_course() {
        assert_eq!(course_hue(1), 137.5);
        assert_eq!(course_hue(3), 52.5);
        assert_eq!(course_hue(0), 0.0);
        assert_eq!(course_color(2), course_color(2));
        assert_eq!(course_color(2), "hsl(275, 70%, 85%)");
    }

    #[test]
    fn empty_states_stay_distinct() {
        let config = sample_config();
        let slots = generate_time_slots(&config).unwrap();
        let records = vec![record(2, "08:00", 1, "Math")];

        assert_eq!(
            compose_view(None, Some(records.as_slice()), &slots, DayFilter::All),
            ScheduleView::NotConfigured
        );
        assert_eq!(
            compose_view(Some(&config), None, &slots, DayFilter::All),
            ScheduleView::Loading
        );
        assert_eq!(
            compose_view(Some(&config), Some(records.as_slice()), &slots, DayFilter::Single(4)),
            ScheduleView::NoMatches
        );
        match compose_view(Some(&config), Some(records.as_slice()), &slots, DayFilter::Single(2)) {
            ScheduleView::Ready(grid) => {
                assert_eq!(grid.days, vec![2]);
                assert_eq!(grid.rows.len(), slots.len());
            }
            other => panic!("expected a ready grid, got {other:?}"),
        }
    }
}

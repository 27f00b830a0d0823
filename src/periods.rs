use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{BimesterRecord, MonthRecord, QnaRecord, WeekRecord};

pub const WEEKS_PER_MONTH: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Week,
    Qna,
    Month,
    Bimester,
}

/// One header group of the evaluation history table, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Column<'a> {
    Week { label: String, data: &'a WeekRecord },
    Qna { label: String, data: &'a QnaRecord },
    Month { label: String, data: &'a MonthRecord },
    Bimester { label: String, data: &'a BimesterRecord },
}

impl Column<'_> {
    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Week { .. } => ColumnKind::Week,
            Column::Qna { .. } => ColumnKind::Qna,
            Column::Month { .. } => ColumnKind::Month,
            Column::Bimester { .. } => ColumnKind::Bimester,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Column::Week { label, .. }
            | Column::Qna { label, .. }
            | Column::Month { label, .. }
            | Column::Bimester { label, .. } => label,
        }
    }
}

/// Keys every QNA by the highest week it covers. Two QNAs closing on the
/// same week: the later one wins.
pub fn qna_by_last_week(qnas: &[QnaRecord]) -> HashMap<u32, &QnaRecord> {
    let mut index = HashMap::new();
    for qna in qnas {
        match qna.closing_week() {
            Some(week) => {
                index.insert(week, qna);
            }
            None => tracing::debug!(qna_id = qna.qna_id, "qna covers no weeks, skipping"),
        }
    }
    index
}

/// Keys every month by its closing week. Without an explicit `closing_week`
/// the month in input position `i` closes at week `(i + 1) * 4`, so months
/// are expected sorted by `month_number` and four weeks long.
pub fn month_by_last_week(months: &[MonthRecord]) -> HashMap<u32, &MonthRecord> {
    let mut index = HashMap::new();
    for (position, month) in months.iter().enumerate() {
        let derived = (position as u32 + 1) * WEEKS_PER_MONTH;
        index.insert(month.closing_week.unwrap_or(derived), month);
    }
    index
}

pub fn build_columns<'a>(
    weeks: &'a [WeekRecord],
    qnas: &'a [QnaRecord],
    months: &'a [MonthRecord],
    bimester: Option<&'a BimesterRecord>,
) -> Vec<Column<'a>> {
    let qna_index = qna_by_last_week(qnas);
    let month_index = month_by_last_week(months);
    let mut columns = Vec::with_capacity(weeks.len() + qna_index.len() + month_index.len() + 1);

    for week in weeks {
        columns.push(Column::Week {
            label: week_label(week),
            data: week,
        });

        if let Some(&qna) = qna_index.get(&week.week_number) {
            let range = date_span(weeks, |number| qna.weeks.contains(&number));
            columns.push(Column::Qna {
                label: format!("QNA {}{}", qna.qna_number, range_suffix(range)),
                data: qna,
            });
        }

        if let Some(&month) = month_index.get(&week.week_number) {
            let last = week.week_number;
            let first = last.saturating_sub(WEEKS_PER_MONTH - 1);
            let range = date_span(weeks, |number| (first..=last).contains(&number));
            columns.push(Column::Month {
                label: format!("Month {}{}", month.month_number, range_suffix(range)),
                data: month,
            });
        }
    }

    if let Some(bimester) = bimester {
        columns.push(Column::Bimester {
            label: format!("Bimester {}", bimester.bimester_number),
            data: bimester,
        });
    }

    columns
}

fn week_label(week: &WeekRecord) -> String {
    let mut label = format!(
        "Week {} ({} - {})",
        week.week_number,
        short_date(week.start_date),
        short_date(week.end_date)
    );
    let theme = week.week_theme.trim();
    if !theme.is_empty() {
        label.push(' ');
        label.push_str(theme);
    }
    label
}

fn date_span(
    weeks: &[WeekRecord],
    covers: impl Fn(u32) -> bool,
) -> Option<(NaiveDate, NaiveDate)> {
    weeks
        .iter()
        .filter(|week| covers(week.week_number))
        .fold(None, |span, week| match span {
            None => Some((week.start_date, week.end_date)),
            Some((start, end)) => Some((start.min(week.start_date), end.max(week.end_date))),
        })
}

fn range_suffix(range: Option<(NaiveDate, NaiveDate)>) -> String {
    match range {
        Some((start, end)) => format!(" ({} - {})", short_date(start), short_date(end)),
        None => String::new(),
    }
}

fn short_date(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{hhmm, TimeSlot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakConfig {
    pub after_period: u32,
    pub minutes: u32,
    #[serde(default)]
    pub label: Option<String>,
}

/// Daily timetable shape of one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionScheduleConfig {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    pub periods_per_day: u32,
    pub period_minutes: u32,
    #[serde(default)]
    pub breaks: Vec<BreakConfig>,
    pub working_days: Vec<u8>,
}

#[derive(Debug, Error, PartialEq)]
pub enum SlotError {
    #[error("period length must be positive")]
    ZeroPeriodLength,
    #[error("a school day needs at least one period")]
    NoPeriods,
    #[error("working day {0} is outside 1-7")]
    InvalidWorkingDay(u8),
    #[error("the school day runs past midnight at period {0}")]
    PastMidnight(u32),
}

pub fn validate(config: &SectionScheduleConfig) -> Result<(), SlotError> {
    if config.period_minutes == 0 {
        return Err(SlotError::ZeroPeriodLength);
    }
    if config.periods_per_day == 0 {
        return Err(SlotError::NoPeriods);
    }
    if let Some(day) = config.working_days.iter().find(|d| !(1..=7).contains(*d)) {
        return Err(SlotError::InvalidWorkingDay(*day));
    }
    Ok(())
}

/// Lays out the periods of one day starting at `start_time`, with a break
/// slot after every period that has one configured.
pub fn generate_time_slots(config: &SectionScheduleConfig) -> Result<Vec<TimeSlot>, SlotError> {
    validate(config)?;

    let mut slots = Vec::new();
    let mut cursor = config.start_time;

    for period in 1..=config.periods_per_day {
        let end = advance(cursor, config.period_minutes, period)?;
        slots.push(TimeSlot {
            start: cursor,
            end,
            is_break: false,
            label: None,
        });
        cursor = end;

        for pause in config.breaks.iter().filter(|b| b.after_period == period) {
            let end = advance(cursor, pause.minutes, period)?;
            slots.push(TimeSlot {
                start: cursor,
                end,
                is_break: true,
                label: Some(pause.label.clone().unwrap_or_else(|| "Break".to_string())),
            });
            cursor = end;
        }
    }

    Ok(slots)
}

fn advance(from: NaiveTime, minutes: u32, period: u32) -> Result<NaiveTime, SlotError> {
    let (next, wrapped) = from.overflowing_add_signed(Duration::minutes(minutes as i64));
    if wrapped != 0 {
        return Err(SlotError::PastMidnight(period));
    }
    Ok(next)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_config() -> SectionScheduleConfig {
        SectionScheduleConfig {
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            periods_per_day: 4,
            period_minutes: 60,
            breaks: vec![BreakConfig {
                after_period: 2,
                minutes: 20,
                label: Some("Recess".to_string()),
            }],
            working_days: vec![1, 2, 3, 4, 5],
        }
    }

    fn starts(slots: &[TimeSlot]) -> Vec<String> {
        slots.iter().map(|s| hhmm::format(&s.start)).collect()
    }

    #[test]
    fn breaks_are_inserted_after_their_period() {
        let slots = generate_time_slots(&sample_config()).unwrap();
        assert_eq!(starts(&slots), vec!["08:00", "09:00", "10:00", "10:20", "11:20"]);
        assert!(slots[2].is_break);
        assert_eq!(slots[2].label.as_deref(), Some("Recess"));
        assert_eq!(hhmm::format(&slots[4].end), "12:20");
        assert_eq!(slots.iter().filter(|s| s.is_break).count(), 1);
    }

    #[test]
    fn rejects_broken_configurations() {
        let mut config = sample_config();
        config.period_minutes = 0;
        assert_eq!(generate_time_slots(&config), Err(SlotError::ZeroPeriodLength));

        let mut config = sample_config();
        config.working_days = vec![1, 8];
        assert_eq!(generate_time_slots(&config), Err(SlotError::InvalidWorkingDay(8)));

        let mut config = sample_config();
        config.periods_per_day = 0;
        assert_eq!(generate_time_slots(&config), Err(SlotError::NoPeriods));
    }

    #[test]
    fn day_cannot_cross_midnight() {
        let mut config = sample_config();
        config.start_time = NaiveTime::from_hms_opt(22, 0, 0).unwrap();
        assert_eq!(generate_time_slots(&config), Err(SlotError::PastMidnight(2)));
    }

    #[test]
    fn config_reads_camel_case_json() {
        let raw = r#"{
            "startTime": "07:45",
            "periodsPerDay": 2,
            "periodMinutes": 45,
            "breaks": [{"afterPeriod": 1, "minutes": 15}],
            "workingDays": [1, 3, 5]
        }"#;
        let config: SectionScheduleConfig = serde_json::from_str(raw).unwrap();
        let slots = generate_time_slots(&config).unwrap();
        assert_eq!(starts(&slots), vec!["07:45", "08:30", "08:45"]);
        assert_eq!(slots[1].label.as_deref(), Some("Break"));
    }
}

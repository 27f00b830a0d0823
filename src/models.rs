use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GradeState {
    #[serde(rename = "E", alias = "EXCELLENT")]
    Excellent,
    #[serde(rename = "B", alias = "GOOD")]
    Good,
    #[serde(rename = "P", alias = "LITTLE")]
    Little,
    #[serde(rename = "CN", alias = "ALMOST_NONE")]
    AlmostNone,
    #[serde(rename = "N", alias = "NONE")]
    None,
}

impl GradeState {
    pub fn letter(self) -> &'static str {
        match self {
            GradeState::Excellent => "E",
            GradeState::Good => "B",
            GradeState::Little => "P",
            GradeState::AlmostNone => "CN",
            GradeState::None => "N",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Dimension {
    Ejecuta,
    Retiene,
    Interpreta,
    Conoce,
    Aplica,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Ejecuta,
        Dimension::Retiene,
        Dimension::Interpreta,
        Dimension::Conoce,
        Dimension::Aplica,
    ];

    pub fn short_code(self) -> &'static str {
        match self {
            Dimension::Ejecuta => "EJ",
            Dimension::Retiene => "RE",
            Dimension::Interpreta => "IN",
            Dimension::Conoce => "CO",
            Dimension::Aplica => "AP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub state: GradeState,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekStudentEntry {
    pub student_id: i64,
    #[serde(rename = "EJECUTA")]
    pub ejecuta: DimensionScore,
    #[serde(rename = "RETIENE")]
    pub retiene: DimensionScore,
    #[serde(rename = "INTERPRETA")]
    pub interpreta: DimensionScore,
    #[serde(rename = "CONOCE")]
    pub conoce: DimensionScore,
    #[serde(rename = "APLICA")]
    pub aplica: DimensionScore,
    pub total_score: f64,
}

impl WeekStudentEntry {
    pub fn dimension(&self, dimension: Dimension) -> &DimensionScore {
        match dimension {
            Dimension::Ejecuta => &self.ejecuta,
            Dimension::Retiene => &self.retiene,
            Dimension::Interpreta => &self.interpreta,
            Dimension::Conoce => &self.conoce,
            Dimension::Aplica => &self.aplica,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRecord {
    pub week_id: i64,
    pub week_number: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub week_theme: String,
    #[serde(default)]
    pub students: Vec<WeekStudentEntry>,
}

/// Biweekly or monthly per-student averages. A value of 0 means the
/// dimension has not been evaluated yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStudentScores {
    pub student_id: i64,
    #[serde(default)]
    pub ejecuta: f64,
    #[serde(default)]
    pub retiene: f64,
    #[serde(default)]
    pub interpreta: f64,
    #[serde(default)]
    pub conoce: f64,
    #[serde(default)]
    pub aplica: f64,
}

impl AggregateStudentScores {
    pub fn dimension(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Ejecuta => self.ejecuta,
            Dimension::Retiene => self.retiene,
            Dimension::Interpreta => self.interpreta,
            Dimension::Conoce => self.conoce,
            Dimension::Aplica => self.aplica,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QnaRecord {
    pub qna_id: i64,
    pub qna_number: u32,
    pub weeks: Vec<u32>,
    #[serde(default)]
    pub students: Vec<AggregateStudentScores>,
}

impl QnaRecord {
    pub fn closing_week(&self) -> Option<u32> {
        self.weeks.iter().copied().max()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthRecord {
    pub month_id: i64,
    pub month_number: u32,
    /// Overrides the four-weeks-per-month derivation when the backend sends it.
    #[serde(default)]
    pub closing_week: Option<u32>,
    #[serde(default)]
    pub students: Vec<AggregateStudentScores>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BimesterStudentTotal {
    pub student_id: i64,
    pub total_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BimesterRecord {
    pub bimester_id: i64,
    pub bimester_number: u32,
    #[serde(default)]
    pub students: Vec<BimesterStudentTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub student_id: i64,
    pub full_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryBundle {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub weeks: Vec<WeekRecord>,
    #[serde(default)]
    pub qnas: Vec<QnaRecord>,
    #[serde(default)]
    pub months: Vec<MonthRecord>,
    #[serde(default)]
    pub bimester: Option<BimesterRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    pub is_break: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub course_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub teacher_id: i64,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseAssignment {
    pub course: Course,
    pub teacher: Teacher,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecord {
    pub day_of_week: u8,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub classroom: String,
    pub course_assignment: CourseAssignment,
}

/// `HH:MM` on the way out, `HH:MM` or `HH:MM:SS` on the way in.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(value: &str) -> Option<NaiveTime> {
        let value = value.trim();
        NaiveTime::parse_from_str(value, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
            .ok()
    }

    pub fn format(value: &NaiveTime) -> String {
        value.format("%H:%M").to_string()
    }

    pub fn serialize<S: Serializer>(value: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid time `{raw}`")))
    }
}

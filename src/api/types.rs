use serde::{Deserialize, Deserializer};

/// A faculty as returned by `/schedule/faculties`
#[derive(Debug, Clone, Deserialize)]
pub struct Faculty {
    pub id: i64,
    pub text: String,
}

/// A speciality as returned by `/rating/specialities`
#[derive(Debug, Clone, Deserialize)]
pub struct Speciality {
    pub id: i64,
    pub text: String,
}

/// One course-year entry as returned by `/rating/courses`
#[derive(Debug, Clone, Deserialize)]
pub struct CourseEntry {
    pub course: u32,
}

/// A roster entry as returned by `/rating?sdef=&course=`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Identifier; the API emits it as a number or a string depending on endpoint
    #[serde(deserialize_with = "string_or_number")]
    pub student_card_number: String,
    pub average: f64,
    pub hours: f64,
    pub average_shift: f64,
}

/// Per-student detail payload from `/rating/studentRating`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentRating {
    #[serde(default)]
    pub lessons: Vec<LessonRecord>,
}

/// One lesson within a student's detail payload
#[derive(Debug, Clone, Deserialize)]
pub struct LessonRecord {
    #[serde(rename = "lessonNameAbbrev")]
    pub lesson_name: String,
    #[serde(rename = "lessonTypeAbbrev", default)]
    pub lesson_type: String,
    #[serde(default)]
    pub marks: Vec<Mark>,
}

/// A single mark. The API is inconsistent about encoding: most marks are
/// JSON numbers, but re-takes and absences show up as strings ("4", "н").
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Mark {
    Number(f64),
    Text(String),
}

impl Mark {
    /// Numeric value of the mark, or None for non-numeric/NaN entries.
    /// Aggregation drops everything this returns None for.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Mark::Number(n) => *n,
            Mark::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        if value.is_nan() {
            None
        } else {
            Some(value)
        }
    }
}

/// Accept a JSON string or number and store it as a String
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_number() {
        let mark = Mark::Number(8.0);
        assert_eq!(mark.as_f64(), Some(8.0));
    }

    #[test]
    fn test_mark_numeric_string() {
        let mark = Mark::Text("9".to_string());
        assert_eq!(mark.as_f64(), Some(9.0));
    }

    #[test]
    fn test_mark_non_numeric_string_dropped() {
        let mark = Mark::Text("н".to_string());
        assert_eq!(mark.as_f64(), None);
    }

    #[test]
    fn test_mark_nan_dropped() {
        let mark = Mark::Number(f64::NAN);
        assert_eq!(mark.as_f64(), None);
    }

    #[test]
    fn test_student_card_number_from_json_number() {
        let json = r#"{"studentCardNumber": 12345678, "average": 8.5, "hours": 120.0, "averageShift": 0.3}"#;
        let student: Student = serde_json::from_str(json).unwrap();
        assert_eq!(student.student_card_number, "12345678");
    }

    #[test]
    fn test_student_card_number_from_json_string() {
        let json = r#"{"studentCardNumber": "12345678", "average": 8.5, "hours": 120.0, "averageShift": 0.3}"#;
        let student: Student = serde_json::from_str(json).unwrap();
        assert_eq!(student.student_card_number, "12345678");
    }

    #[test]
    fn test_lesson_record_parse() {
        let json = r#"{"lessonNameAbbrev": "МА", "lessonTypeAbbrev": "ЛК", "marks": [8, "9", "н"]}"#;
        let lesson: LessonRecord = serde_json::from_str(json).unwrap();
        assert_eq!(lesson.lesson_name, "МА");
        assert_eq!(lesson.lesson_type, "ЛК");
        assert_eq!(lesson.marks.len(), 3);
    }

    #[test]
    fn test_student_rating_missing_lessons() {
        let rating: StudentRating = serde_json::from_str("{}").unwrap();
        assert!(rating.lessons.is_empty());
    }
}

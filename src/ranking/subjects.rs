use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::api::types::LessonRecord;

/// The subject universe for a roster: every subject seen in any student's
/// lesson records, mapped to the lesson types seen for it anywhere.
///
/// Built as a union across all students, so it is total even when students
/// have uneven detail payloads. Sorted maps keep display order stable.
#[derive(Debug, Clone, Default)]
pub struct SubjectCatalog {
    subjects: BTreeMap<String, BTreeSet<String>>,
}

impl SubjectCatalog {
    pub fn from_details(details: &HashMap<String, Vec<LessonRecord>>) -> Self {
        let mut subjects: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for lessons in details.values() {
            for lesson in lessons {
                let types = subjects.entry(lesson.lesson_name.clone()).or_default();
                if !lesson.lesson_type.is_empty() {
                    types.insert(lesson.lesson_type.clone());
                }
            }
        }

        Self { subjects }
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Subject names in sorted order
    pub fn subjects(&self) -> Vec<&str> {
        self.subjects.keys().map(String::as_str).collect()
    }

    /// Lesson types observed for a subject, sorted; empty for unknown subjects
    pub fn lesson_types(&self, subject: &str) -> Vec<&str> {
        self.subjects
            .get(subject)
            .map(|types| types.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Mark;

    fn lesson(name: &str, kind: &str) -> LessonRecord {
        LessonRecord {
            lesson_name: name.to_string(),
            lesson_type: kind.to_string(),
            marks: vec![Mark::Number(8.0)],
        }
    }

    fn details_of(entries: &[(&str, Vec<LessonRecord>)]) -> HashMap<String, Vec<LessonRecord>> {
        entries
            .iter()
            .map(|(card, lessons)| (card.to_string(), lessons.clone()))
            .collect()
    }

    #[test]
    fn test_catalog_unions_across_students() {
        // "Физика" only exists in student 2's payload; it must still appear
        let details = details_of(&[
            ("1", vec![lesson("МА", "ЛК")]),
            ("2", vec![lesson("Физика", "ЛБ"), lesson("МА", "ПЗ")]),
        ]);

        let catalog = SubjectCatalog::from_details(&details);
        assert_eq!(catalog.subjects(), vec!["МА", "Физика"]);
        assert_eq!(catalog.lesson_types("МА"), vec!["ЛК", "ПЗ"]);
        assert_eq!(catalog.lesson_types("Физика"), vec!["ЛБ"]);
    }

    #[test]
    fn test_catalog_empty_details() {
        let catalog = SubjectCatalog::from_details(&HashMap::new());
        assert!(catalog.is_empty());
        assert!(catalog.subjects().is_empty());
    }

    #[test]
    fn test_catalog_unknown_subject_has_no_types() {
        let details = details_of(&[("1", vec![lesson("МА", "ЛК")])]);
        let catalog = SubjectCatalog::from_details(&details);
        assert!(catalog.lesson_types("Физика").is_empty());
    }

    #[test]
    fn test_catalog_ignores_empty_lesson_type() {
        let details = details_of(&[("1", vec![lesson("МА", "")])]);
        let catalog = SubjectCatalog::from_details(&details);
        assert_eq!(catalog.subjects(), vec!["МА"]);
        assert!(catalog.lesson_types("МА").is_empty());
    }
}

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::api::types::{LessonRecord, Student};

/// Floats within this distance are tied and fall through to the next
/// tie-break criterion. Repeated division leaves noise well below this.
pub const EPSILON: f64 = 1e-9;

/// Which metric leads the comparator chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankMode {
    #[default]
    ByAverage,
    BySum,
}

impl RankMode {
    pub fn label(&self) -> &'static str {
        match self {
            RankMode::ByAverage => "average",
            RankMode::BySum => "sum",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            RankMode::ByAverage => RankMode::BySum,
            RankMode::BySum => RankMode::ByAverage,
        }
    }
}

/// Per-student aggregate over the marks that survived the subject/type filter
#[derive(Debug, Clone)]
pub struct AggregateResult {
    pub student_card_number: String,
    /// Marks in collection order, not sorted
    pub marks: Vec<f64>,
    pub sum: f64,
    pub average: f64,
    pub count: usize,
}

/// An aggregate with its 1-based position in the ranking
#[derive(Debug, Clone)]
pub struct RankedStudent {
    pub rank: usize,
    pub result: AggregateResult,
}

/// Collect and aggregate one student's marks for a subject.
///
/// Lesson records match on exact subject name and, when a lesson-type
/// filter is given, exact type. Non-numeric marks are dropped.
/// `average = sum / count` when any marks survive, else sum and average
/// are both zero.
pub fn aggregate(
    card_number: &str,
    lessons: &[LessonRecord],
    subject: &str,
    lesson_type: Option<&str>,
) -> AggregateResult {
    let marks: Vec<f64> = lessons
        .iter()
        .filter(|lesson| lesson.lesson_name == subject)
        .filter(|lesson| lesson_type.is_none_or(|t| lesson.lesson_type == t))
        .flat_map(|lesson| lesson.marks.iter())
        .filter_map(|mark| mark.as_f64())
        .collect();

    let count = marks.len();
    let sum: f64 = marks.iter().sum();
    let average = if count > 0 { sum / count as f64 } else { 0.0 };

    AggregateResult {
        student_card_number: card_number.to_string(),
        marks,
        sum,
        average,
        count,
    }
}

/// Descending comparison with the epsilon tie window
fn cmp_metric(a: f64, b: f64) -> Ordering {
    if (a - b).abs() <= EPSILON {
        Ordering::Equal
    } else {
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    }
}

/// The full comparator chain for the given mode, evaluated top-to-bottom
/// until a non-tie. The final criterion (card number, ascending lexical)
/// never ties for distinct students, so the order is total.
pub fn compare(a: &AggregateResult, b: &AggregateResult, mode: RankMode) -> Ordering {
    let chain = match mode {
        RankMode::ByAverage => [
            cmp_metric(a.average, b.average),
            b.count.cmp(&a.count),
            cmp_metric(a.sum, b.sum),
        ],
        RankMode::BySum => [
            cmp_metric(a.sum, b.sum),
            cmp_metric(a.average, b.average),
            b.count.cmp(&a.count),
        ],
    };

    chain
        .into_iter()
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or_else(|| a.student_card_number.cmp(&b.student_card_number))
}

/// Rank a roster for one subject.
///
/// Every roster member appears in the output; a student missing from the
/// detail map contributes zero marks rather than being excluded. Ranks are
/// 1-based and sequential, ties included.
pub fn rank_students(
    roster: &[Student],
    details: &HashMap<String, Vec<LessonRecord>>,
    subject: &str,
    lesson_type: Option<&str>,
    mode: RankMode,
) -> Vec<RankedStudent> {
    let mut results: Vec<AggregateResult> = roster
        .iter()
        .map(|student| {
            let lessons = details
                .get(&student.student_card_number)
                .map(Vec::as_slice)
                .unwrap_or_default();
            aggregate(&student.student_card_number, lessons, subject, lesson_type)
        })
        .collect();

    results.sort_by(|a, b| compare(a, b, mode));

    results
        .into_iter()
        .enumerate()
        .map(|(idx, result)| RankedStudent {
            rank: idx + 1,
            result,
        })
        .collect()
}

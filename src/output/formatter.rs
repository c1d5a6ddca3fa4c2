use std::io::IsTerminal;

use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::api::types::{CourseEntry, Faculty, Speciality, Student};
use crate::ranking::{RankedStudent, RowDisplay};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a label to fit available width, accounting for Unicode
fn truncate_label(label: &str, max_width: usize) -> String {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() <= max_width {
        label.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn format_id_list(rows: &[(i64, &str)], use_colors: bool) -> String {
    let width = get_terminal_width().unwrap_or(usize::MAX);
    rows.iter()
        .map(|(id, text)| {
            let id_str = format!("{:>6}", id);
            let label = truncate_label(text, width.saturating_sub(8).max(20));
            if use_colors {
                format!("{}  {}", id_str.cyan(), label)
            } else {
                format!("{}  {}", id_str, label)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the faculty list as "    id  name" lines
pub fn format_faculties(faculties: &[Faculty], use_colors: bool) -> String {
    if faculties.is_empty() {
        return "No faculties found.".to_string();
    }
    let rows: Vec<(i64, &str)> = faculties.iter().map(|f| (f.id, f.text.as_str())).collect();
    format_id_list(&rows, use_colors)
}

/// Format the speciality list as "    id  name" lines
pub fn format_specialities(specialities: &[Speciality], use_colors: bool) -> String {
    if specialities.is_empty() {
        return "No specialities found.".to_string();
    }
    let rows: Vec<(i64, &str)> = specialities
        .iter()
        .map(|s| (s.id, s.text.as_str()))
        .collect();
    format_id_list(&rows, use_colors)
}

/// Format available course years as "Course N" lines
pub fn format_courses(courses: &[CourseEntry], use_colors: bool) -> String {
    if courses.is_empty() {
        return "No courses found.".to_string();
    }
    courses
        .iter()
        .map(|c| {
            if use_colors {
                format!("{} {}", "Course".dimmed(), c.course)
            } else {
                format!("Course {}", c.course)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the roster table: card number, average, hours, shift.
/// Two decimal places, matching the site's own table.
pub fn format_roster(roster: &[Student], use_colors: bool) -> String {
    if roster.is_empty() {
        return "No students found.".to_string();
    }

    let header = format!(
        "{:<12}  {:>8}  {:>8}  {:>8}",
        "Card", "Average", "Hours", "Shift"
    );
    let mut lines = Vec::with_capacity(roster.len() + 1);
    if use_colors {
        lines.push(header.bold().to_string());
    } else {
        lines.push(header);
    }

    for student in roster {
        lines.push(format!(
            "{:<12}  {:>8.2}  {:>8.2}  {:>8.2}",
            student.student_card_number, student.average, student.hours, student.average_shift
        ));
    }

    lines.join("\n")
}

/// Format a ranked list: rank, card number, average, sum, count.
///
/// `display` is an optional parallel row state from the highlight filter:
/// hidden rows are omitted, highlighted rows are colored (or starred when
/// colors are off).
pub fn format_ranked(
    ranked: &[RankedStudent],
    display: Option<&[RowDisplay]>,
    use_colors: bool,
) -> String {
    if ranked.is_empty() {
        return "No students found.".to_string();
    }

    let header = format!(
        "{:>4}  {:<12}  {:>8}  {:>8}  {:>6}",
        "#", "Card", "Average", "Sum", "Marks"
    );
    let mut lines = Vec::with_capacity(ranked.len() + 1);
    if use_colors {
        lines.push(header.bold().to_string());
    } else {
        lines.push(header);
    }

    for (idx, entry) in ranked.iter().enumerate() {
        let state = display
            .and_then(|d| d.get(idx).copied())
            .unwrap_or(RowDisplay::Shown);
        if state == RowDisplay::Hidden {
            continue;
        }

        let row = format!(
            "{:>3}.  {:<12}  {:>8.2}  {:>8.2}  {:>6}",
            entry.rank,
            entry.result.student_card_number,
            entry.result.average,
            entry.result.sum,
            entry.result.count
        );

        let line = match state {
            RowDisplay::Highlighted if use_colors => row.green().bold().to_string(),
            RowDisplay::Highlighted => format!("{} *", row),
            _ => row,
        };
        lines.push(line);
    }

    lines.join("\n")
}

/// Format a ranked list as tab-separated values for scripting.
/// Columns: rank, card, average, sum, count (no headers, no colors).
pub fn format_ranked_tsv(ranked: &[RankedStudent]) -> String {
    ranked
        .iter()
        .map(|entry| {
            format!(
                "{}\t{}\t{:.4}\t{:.2}\t{}",
                entry.rank,
                entry.result.student_card_number,
                entry.result.average,
                entry.result.sum,
                entry.result.count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the subject catalog: one subject per line with its lesson types
pub fn format_subjects(catalog: &crate::ranking::SubjectCatalog, use_colors: bool) -> String {
    if catalog.is_empty() {
        return "No subjects found.".to_string();
    }

    catalog
        .subjects()
        .iter()
        .map(|subject| {
            let types = catalog.lesson_types(subject);
            let suffix = if types.is_empty() {
                String::new()
            } else {
                format!("  ({})", types.join(", "))
            };
            if use_colors {
                format!("{}{}", subject, suffix.dimmed())
            } else {
                format!("{}{}", subject, suffix)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::AggregateResult;

    fn sample_roster() -> Vec<Student> {
        vec![Student {
            student_card_number: "12345678".to_string(),
            average: 8.5,
            hours: 120.0,
            average_shift: 0.25,
        }]
    }

    fn sample_ranked() -> Vec<RankedStudent> {
        ["2", "1", "3"]
            .iter()
            .enumerate()
            .map(|(idx, card)| RankedStudent {
                rank: idx + 1,
                result: AggregateResult {
                    student_card_number: card.to_string(),
                    marks: vec![8.0],
                    sum: 8.0,
                    average: 8.0,
                    count: 1,
                },
            })
            .collect()
    }

    #[test]
    fn test_format_roster_two_decimals() {
        let result = format_roster(&sample_roster(), false);
        assert!(result.contains("12345678"));
        assert!(result.contains("8.50"));
        assert!(result.contains("120.00"));
        assert!(result.contains("0.25"));
    }

    #[test]
    fn test_format_roster_empty() {
        let result = format_roster(&[], false);
        assert_eq!(result, "No students found.");
    }

    #[test]
    fn test_format_ranked_has_sequential_ranks() {
        let result = format_ranked(&sample_ranked(), None, false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 4); // header + 3 rows
        assert!(lines[1].trim_start().starts_with("1."));
        assert!(lines[3].trim_start().starts_with("3."));
    }

    #[test]
    fn test_format_ranked_hides_and_stars() {
        let display = vec![
            RowDisplay::Highlighted,
            RowDisplay::Hidden,
            RowDisplay::Shown,
        ];
        let result = format_ranked(&sample_ranked(), Some(&display), false);
        let lines: Vec<&str> = result.lines().collect();
        // Hidden row dropped: header + 2 rows
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with('*'));
        assert!(!lines[2].ends_with('*'));
    }

    #[test]
    fn test_format_ranked_tsv() {
        let result = format_ranked_tsv(&sample_ranked());
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].split('\t').count(), 5);
        assert!(lines[0].starts_with("1\t2\t"));
    }

    #[test]
    fn test_format_faculties() {
        let faculties = vec![Faculty {
            id: 20005,
            text: "ФКСиС".to_string(),
        }];
        let result = format_faculties(&faculties, false);
        assert!(result.contains("20005"));
        assert!(result.contains("ФКСиС"));
    }

    #[test]
    fn test_format_courses() {
        let courses = vec![CourseEntry { course: 1 }, CourseEntry { course: 2 }];
        let result = format_courses(&courses, false);
        assert_eq!(result, "Course 1\nCourse 2");
    }

    #[test]
    fn test_truncate_label_unicode() {
        assert_eq!(truncate_label("короткое", 20), "короткое");
        assert_eq!(truncate_label("очень длинное название", 10), "очень д...");
    }
}

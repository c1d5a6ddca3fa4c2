use std::time::Instant;

use anyhow::Result;
use ratatui::widgets::{ListState, TableState};

use crate::api::types::{CourseEntry, Faculty, Speciality};
use crate::config::Config;
use crate::fetch::RosterData;
use crate::ranking::{
    apply_highlight, rank_students, HighlightSpec, RankMode, RankedStudent, RowDisplay,
};

/// Which pane of the cascading selection is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Faculties,
    Specialities,
    Courses,
    Results,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    HighlightInput,
    Help,
}

/// A load the event loop should start next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Faculties,
    Specialities {
        faculty_id: i64,
    },
    Courses {
        faculty_id: i64,
        speciality_id: i64,
    },
    Roster {
        speciality_id: i64,
        course: u32,
    },
}

/// What a finished background load produced
#[derive(Debug)]
pub enum FetchOutcome {
    Faculties(Result<Vec<Faculty>>),
    Specialities(Result<Vec<Speciality>>),
    Courses(Result<Vec<CourseEntry>>),
    Roster(Result<RosterData>),
}

pub struct App {
    pub config: Config,
    pub verbose: bool,

    pub stage: Stage,
    pub faculties: Vec<Faculty>,
    pub specialities: Vec<Speciality>,
    pub courses: Vec<CourseEntry>,
    pub selected_faculty: Option<Faculty>,
    pub selected_speciality: Option<Speciality>,
    pub selected_course: Option<u32>,

    pub data: Option<RosterData>,
    pub subjects: Vec<String>,
    pub subject_idx: usize,
    /// Lesson types for the current subject; index 0 means "all types"
    pub lesson_types: Vec<String>,
    pub lesson_type_idx: usize,
    pub mode: RankMode,
    pub ranked: Vec<RankedStudent>,
    pub row_display: Option<Vec<RowDisplay>>,
    pub highlight: Option<HighlightSpec>,

    pub list_state: ListState,
    pub table_state: TableState,
    pub input_mode: InputMode,
    pub highlight_input: String,
    pub flash_message: Option<(String, Instant)>,
    pub is_loading: bool,
    pub spinner_frame: usize,
    pub should_quit: bool,

    /// Consumed by the event loop; set here, spawned there
    pub pending_request: Option<FetchRequest>,
    /// Monotone counter; a finished load older than this is stale and dropped
    pub fetch_generation: u64,
}

impl App {
    pub fn new(config: Config, verbose: bool) -> Self {
        Self {
            config,
            verbose,
            stage: Stage::Faculties,
            faculties: Vec::new(),
            specialities: Vec::new(),
            courses: Vec::new(),
            selected_faculty: None,
            selected_speciality: None,
            selected_course: None,
            data: None,
            subjects: Vec::new(),
            subject_idx: 0,
            lesson_types: Vec::new(),
            lesson_type_idx: 0,
            mode: RankMode::default(),
            ranked: Vec::new(),
            row_display: None,
            highlight: None,
            list_state: ListState::default(),
            table_state: TableState::default(),
            input_mode: InputMode::Normal,
            highlight_input: String::new(),
            flash_message: None,
            is_loading: true,
            spinner_frame: 0,
            should_quit: false,
            pending_request: Some(FetchRequest::Faculties),
            fetch_generation: 0,
        }
    }

    /// Bump the generation for a new load; anything tagged lower is stale
    pub fn begin_fetch(&mut self) -> u64 {
        self.fetch_generation += 1;
        self.is_loading = true;
        self.fetch_generation
    }

    fn request(&mut self, request: FetchRequest) {
        self.pending_request = Some(request);
    }

    // --- navigation -----------------------------------------------------

    fn selection_len(&self) -> usize {
        match self.stage {
            Stage::Faculties => self.faculties.len(),
            Stage::Specialities => self.specialities.len(),
            Stage::Courses => self.courses.len(),
            Stage::Results => self.visible_rows().len(),
        }
    }

    pub fn next_row(&mut self) {
        let len = self.selection_len();
        if len == 0 {
            return;
        }
        let mut state = self.active_state_mut();
        let i = match state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.selection_len();
        if len == 0 {
            return;
        }
        let mut state = self.active_state_mut();
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    fn active_state_mut(&mut self) -> ActiveState<'_> {
        match self.stage {
            Stage::Results => ActiveState::Table(&mut self.table_state),
            _ => ActiveState::List(&mut self.list_state),
        }
    }

    /// Enter on a selection pane descends one level
    pub fn select_current(&mut self) {
        match self.stage {
            Stage::Faculties => {
                if let Some(faculty) = self
                    .list_state
                    .selected()
                    .and_then(|i| self.faculties.get(i).cloned())
                {
                    self.request(FetchRequest::Specialities {
                        faculty_id: faculty.id,
                    });
                    self.selected_faculty = Some(faculty);
                }
            }
            Stage::Specialities => {
                if let (Some(faculty), Some(speciality)) = (
                    self.selected_faculty.clone(),
                    self.list_state
                        .selected()
                        .and_then(|i| self.specialities.get(i).cloned()),
                ) {
                    self.request(FetchRequest::Courses {
                        faculty_id: faculty.id,
                        speciality_id: speciality.id,
                    });
                    self.selected_speciality = Some(speciality);
                }
            }
            Stage::Courses => {
                if let (Some(speciality), Some(entry)) = (
                    self.selected_speciality.clone(),
                    self.list_state
                        .selected()
                        .and_then(|i| self.courses.get(i).cloned()),
                ) {
                    self.request(FetchRequest::Roster {
                        speciality_id: speciality.id,
                        course: entry.course,
                    });
                    self.selected_course = Some(entry.course);
                }
            }
            Stage::Results => {}
        }
    }

    /// Drop any in-flight load; its result will arrive with a stale
    /// generation and be ignored
    fn invalidate_fetch(&mut self) {
        self.fetch_generation += 1;
        self.is_loading = false;
    }

    /// Esc walks back up the cascade, dropping downstream selection and
    /// superseding whatever load was in flight for the abandoned level
    pub fn go_back(&mut self) {
        if self.stage != Stage::Faculties {
            self.invalidate_fetch();
        }
        match self.stage {
            Stage::Faculties => {}
            Stage::Specialities => {
                self.stage = Stage::Faculties;
                self.selected_faculty = None;
                self.specialities.clear();
                self.reset_list_selection(self.faculties.len());
            }
            Stage::Courses => {
                self.stage = Stage::Specialities;
                self.selected_speciality = None;
                self.courses.clear();
                self.reset_list_selection(self.specialities.len());
            }
            Stage::Results => {
                self.stage = Stage::Courses;
                self.selected_course = None;
                self.data = None;
                self.ranked.clear();
                self.row_display = None;
                self.highlight = None;
                self.reset_list_selection(self.courses.len());
            }
        }
    }

    fn reset_list_selection(&mut self, len: usize) {
        if len == 0 {
            self.list_state.select(None);
        } else {
            self.list_state.select(Some(0));
        }
    }

    /// Re-request whatever the current stage shows
    pub fn refresh(&mut self) {
        let request = match self.stage {
            Stage::Faculties => FetchRequest::Faculties,
            Stage::Specialities => match &self.selected_faculty {
                Some(f) => FetchRequest::Specialities { faculty_id: f.id },
                None => return,
            },
            Stage::Courses => match (&self.selected_faculty, &self.selected_speciality) {
                (Some(f), Some(s)) => FetchRequest::Courses {
                    faculty_id: f.id,
                    speciality_id: s.id,
                },
                _ => return,
            },
            Stage::Results => match (&self.selected_speciality, self.selected_course) {
                (Some(s), Some(course)) => FetchRequest::Roster {
                    speciality_id: s.id,
                    course,
                },
                _ => return,
            },
        };
        self.request(request);
        self.show_flash("Refreshing...".to_string());
    }

    // --- load results ---------------------------------------------------

    /// Apply a finished load. Loads tagged with a generation older than the
    /// current one lost the race to a newer request and are dropped.
    pub fn apply_outcome(&mut self, generation: u64, outcome: FetchOutcome) {
        if generation != self.fetch_generation {
            return;
        }
        self.is_loading = false;

        match outcome {
            FetchOutcome::Faculties(Ok(faculties)) => {
                self.faculties = faculties;
                self.stage = Stage::Faculties;
                self.reset_list_selection(self.faculties.len());
            }
            FetchOutcome::Specialities(Ok(specialities)) => {
                self.specialities = specialities;
                self.stage = Stage::Specialities;
                self.reset_list_selection(self.specialities.len());
            }
            FetchOutcome::Courses(Ok(courses)) => {
                self.courses = courses;
                self.stage = Stage::Courses;
                self.reset_list_selection(self.courses.len());
            }
            FetchOutcome::Roster(Ok(data)) => {
                self.subjects = data.catalog.subjects().iter().map(|s| s.to_string()).collect();
                self.subject_idx = 0;
                self.data = Some(data);
                self.highlight = None;
                self.row_display = None;
                self.stage = Stage::Results;
                self.sync_lesson_types();
                self.recompute_ranking();
            }
            FetchOutcome::Faculties(Err(e))
            | FetchOutcome::Specialities(Err(e))
            | FetchOutcome::Courses(Err(e))
            | FetchOutcome::Roster(Err(e)) => {
                self.show_flash(format!("Error: {}", e));
            }
        }
    }

    // --- ranking controls ----------------------------------------------

    pub fn current_subject(&self) -> Option<&str> {
        self.subjects.get(self.subject_idx).map(String::as_str)
    }

    /// Active lesson-type filter; index 0 means no filter
    pub fn current_lesson_type(&self) -> Option<&str> {
        if self.lesson_type_idx == 0 {
            None
        } else {
            self.lesson_types
                .get(self.lesson_type_idx - 1)
                .map(String::as_str)
        }
    }

    fn sync_lesson_types(&mut self) {
        self.lesson_types = match (self.current_subject(), &self.data) {
            (Some(subject), Some(data)) => data
                .catalog
                .lesson_types(subject)
                .iter()
                .map(|t| t.to_string())
                .collect(),
            _ => Vec::new(),
        };
        self.lesson_type_idx = 0;
    }

    pub fn cycle_subject(&mut self, forward: bool) {
        if self.subjects.is_empty() {
            return;
        }
        let len = self.subjects.len();
        self.subject_idx = if forward {
            (self.subject_idx + 1) % len
        } else {
            (self.subject_idx + len - 1) % len
        };
        self.sync_lesson_types();
        self.recompute_ranking();
    }

    pub fn cycle_lesson_type(&mut self) {
        // lesson_type_idx ranges over [0, len]: 0 = all, then each type
        self.lesson_type_idx = (self.lesson_type_idx + 1) % (self.lesson_types.len() + 1);
        self.recompute_ranking();
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.recompute_ranking();
    }

    /// Re-rank from the in-memory data; no network involved
    pub fn recompute_ranking(&mut self) {
        let Some(data) = &self.data else {
            self.ranked.clear();
            self.row_display = None;
            return;
        };
        let Some(subject) = self.current_subject() else {
            self.ranked.clear();
            self.row_display = None;
            return;
        };

        self.ranked = rank_students(
            &data.roster,
            &data.details,
            subject,
            self.current_lesson_type(),
            self.mode,
        );
        self.reapply_highlight();

        let len = self.visible_rows().len();
        if len == 0 {
            self.table_state.select(None);
        } else {
            match self.table_state.selected() {
                Some(i) if i < len => {}
                _ => self.table_state.select(Some(0)),
            }
        }
    }

    fn reapply_highlight(&mut self) {
        self.row_display = self
            .highlight
            .as_ref()
            .map(|spec| apply_highlight(&self.ranked, spec));
    }

    /// Rows to draw: (position in `ranked`, entry, display state), hidden
    /// rows omitted. Without an active highlight everything is Shown.
    pub fn visible_rows(&self) -> Vec<(usize, &RankedStudent, RowDisplay)> {
        self.ranked
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| {
                let state = self
                    .row_display
                    .as_ref()
                    .and_then(|d| d.get(idx).copied())
                    .unwrap_or(RowDisplay::Shown);
                (state != RowDisplay::Hidden).then_some((idx, entry, state))
            })
            .collect()
    }

    // --- highlight input -------------------------------------------------

    pub fn start_highlight_input(&mut self) {
        if self.stage == Stage::Results && !self.ranked.is_empty() {
            self.input_mode = InputMode::HighlightInput;
            self.highlight_input.clear();
        }
    }

    pub fn confirm_highlight_input(&mut self) {
        let input = self.highlight_input.trim().to_string();
        self.input_mode = InputMode::Normal;
        self.highlight_input.clear();

        if input.is_empty() {
            self.clear_highlight();
            return;
        }

        match parse_highlight_input(&input) {
            Some(spec) => {
                self.highlight = Some(spec);
                self.reapply_highlight();
                let shown = self.visible_rows().len();
                self.table_state
                    .select(if shown == 0 { None } else { Some(0) });
                self.show_flash(format!("Highlight on ({} rows in range)", shown));
            }
            None => {
                self.show_flash(format!(
                    "Invalid highlight: '{}' (want: PERCENT FROM TO)",
                    input
                ));
            }
        }
    }

    pub fn cancel_highlight_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.highlight_input.clear();
    }

    pub fn clear_highlight(&mut self) {
        if self.highlight.take().is_some() {
            self.row_display = None;
            let len = self.visible_rows().len();
            self.table_state
                .select(if len == 0 { None } else { Some(0) });
            self.show_flash("Highlight cleared".to_string());
        }
    }

    // --- chrome ----------------------------------------------------------

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }
}

enum ActiveState<'a> {
    List(&'a mut ListState),
    Table(&'a mut TableState),
}

impl ActiveState<'_> {
    fn selected(&self) -> Option<usize> {
        match self {
            ActiveState::List(s) => s.selected(),
            ActiveState::Table(s) => s.selected(),
        }
    }

    fn select(&mut self, index: Option<usize>) {
        match self {
            ActiveState::List(s) => s.select(index),
            ActiveState::Table(s) => s.select(index),
        }
    }
}

/// Parse "PERCENT FROM TO" into a highlight spec
fn parse_highlight_input(input: &str) -> Option<HighlightSpec> {
    let mut parts = input.split_whitespace();
    let percent = parts.next()?.parse::<f64>().ok()?;
    let from = parts.next()?.parse::<f64>().ok()?;
    let to = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() || from > to {
        return None;
    }
    Some(HighlightSpec::new(percent, from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{LessonRecord, Mark, Student};
    use crate::ranking::SubjectCatalog;
    use std::collections::HashMap;

    fn app() -> App {
        App::new(Config::default(), false)
    }

    fn sample_data() -> RosterData {
        let roster = vec![
            Student {
                student_card_number: "100".to_string(),
                average: 0.0,
                hours: 0.0,
                average_shift: 0.0,
            },
            Student {
                student_card_number: "200".to_string(),
                average: 0.0,
                hours: 0.0,
                average_shift: 0.0,
            },
        ];
        let mut details = HashMap::new();
        details.insert(
            "100".to_string(),
            vec![LessonRecord {
                lesson_name: "МА".to_string(),
                lesson_type: "ЛК".to_string(),
                marks: vec![Mark::Number(9.0)],
            }],
        );
        details.insert(
            "200".to_string(),
            vec![LessonRecord {
                lesson_name: "МА".to_string(),
                lesson_type: "ПЗ".to_string(),
                marks: vec![Mark::Number(5.0)],
            }],
        );
        let catalog = SubjectCatalog::from_details(&details);
        RosterData {
            roster,
            details,
            catalog,
        }
    }

    #[test]
    fn test_initial_state_requests_faculties() {
        let app = app();
        assert_eq!(app.stage, Stage::Faculties);
        assert_eq!(app.pending_request, Some(FetchRequest::Faculties));
        assert!(app.is_loading);
    }

    #[test]
    fn test_stale_outcome_dropped() {
        let mut app = app();
        let stale = app.begin_fetch();
        let _fresh = app.begin_fetch();

        app.apply_outcome(
            stale,
            FetchOutcome::Faculties(Ok(vec![Faculty {
                id: 1,
                text: "stale".to_string(),
            }])),
        );
        assert!(app.faculties.is_empty());
        // A stale result must not clear the loading overlay either
        assert!(app.is_loading);
    }

    #[test]
    fn test_fresh_outcome_applied() {
        let mut app = app();
        let generation = app.begin_fetch();
        app.apply_outcome(
            generation,
            FetchOutcome::Faculties(Ok(vec![Faculty {
                id: 1,
                text: "ФКСиС".to_string(),
            }])),
        );
        assert_eq!(app.faculties.len(), 1);
        assert!(!app.is_loading);
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn test_roster_outcome_enters_results_and_ranks() {
        let mut app = app();
        let generation = app.begin_fetch();
        app.apply_outcome(generation, FetchOutcome::Roster(Ok(sample_data())));

        assert_eq!(app.stage, Stage::Results);
        assert_eq!(app.subjects, vec!["МА"]);
        assert_eq!(app.ranked.len(), 2);
        // Higher average first
        assert_eq!(app.ranked[0].result.student_card_number, "100");
    }

    #[test]
    fn test_lesson_type_cycle_filters() {
        let mut app = app();
        let generation = app.begin_fetch();
        app.apply_outcome(generation, FetchOutcome::Roster(Ok(sample_data())));

        assert_eq!(app.current_lesson_type(), None);
        app.cycle_lesson_type();
        assert_eq!(app.current_lesson_type(), Some("ЛК"));
        // Student 200 has no ЛК marks -> zero aggregate, drops to rank 2
        assert_eq!(app.ranked[1].result.student_card_number, "200");
        assert_eq!(app.ranked[1].result.count, 0);

        app.cycle_lesson_type();
        assert_eq!(app.current_lesson_type(), Some("ПЗ"));
        app.cycle_lesson_type();
        assert_eq!(app.current_lesson_type(), None);
    }

    #[test]
    fn test_mode_toggle_recomputes() {
        let mut app = app();
        let generation = app.begin_fetch();
        app.apply_outcome(generation, FetchOutcome::Roster(Ok(sample_data())));

        assert_eq!(app.mode, RankMode::ByAverage);
        app.toggle_mode();
        assert_eq!(app.mode, RankMode::BySum);
        assert_eq!(app.ranked.len(), 2);
    }

    #[test]
    fn test_highlight_input_applies_and_clears() {
        let mut app = app();
        let generation = app.begin_fetch();
        app.apply_outcome(generation, FetchOutcome::Roster(Ok(sample_data())));

        app.start_highlight_input();
        assert_eq!(app.input_mode, InputMode::HighlightInput);
        app.highlight_input = "50 0 150".to_string();
        app.confirm_highlight_input();

        // "200" is out of range -> hidden; one visible row, highlighted
        let rows = app.visible_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1.result.student_card_number, "100");
        assert_eq!(rows[0].2, RowDisplay::Highlighted);

        app.clear_highlight();
        assert_eq!(app.visible_rows().len(), 2);
    }

    #[test]
    fn test_highlight_input_rejects_garbage() {
        let mut app = app();
        let generation = app.begin_fetch();
        app.apply_outcome(generation, FetchOutcome::Roster(Ok(sample_data())));

        app.start_highlight_input();
        app.highlight_input = "fifty 0 100".to_string();
        app.confirm_highlight_input();
        assert!(app.highlight.is_none());

        // Inverted range is rejected too
        app.start_highlight_input();
        app.highlight_input = "50 200 100".to_string();
        app.confirm_highlight_input();
        assert!(app.highlight.is_none());
    }

    #[test]
    fn test_go_back_unwinds_cascade() {
        let mut app = app();
        let generation = app.begin_fetch();
        app.apply_outcome(generation, FetchOutcome::Roster(Ok(sample_data())));
        app.selected_course = Some(1);

        app.go_back();
        assert_eq!(app.stage, Stage::Courses);
        assert!(app.data.is_none());
        assert!(app.selected_course.is_none());

        app.go_back();
        assert_eq!(app.stage, Stage::Specialities);
        app.go_back();
        assert_eq!(app.stage, Stage::Faculties);
        app.go_back();
        assert_eq!(app.stage, Stage::Faculties);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app();
        let generation = app.begin_fetch();
        app.apply_outcome(
            generation,
            FetchOutcome::Faculties(Ok(vec![
                Faculty {
                    id: 1,
                    text: "a".to_string(),
                },
                Faculty {
                    id: 2,
                    text: "b".to_string(),
                },
            ])),
        );

        assert_eq!(app.list_state.selected(), Some(0));
        app.next_row();
        assert_eq!(app.list_state.selected(), Some(1));
        app.next_row();
        assert_eq!(app.list_state.selected(), Some(0));
        app.previous_row();
        assert_eq!(app.list_state.selected(), Some(1));
    }

    #[test]
    fn test_select_faculty_requests_specialities() {
        let mut app = app();
        let generation = app.begin_fetch();
        app.apply_outcome(
            generation,
            FetchOutcome::Faculties(Ok(vec![Faculty {
                id: 7,
                text: "ФКСиС".to_string(),
            }])),
        );
        app.pending_request = None;

        app.select_current();
        assert_eq!(
            app.pending_request,
            Some(FetchRequest::Specialities { faculty_id: 7 })
        );
        assert_eq!(app.selected_faculty.as_ref().map(|f| f.id), Some(7));
    }

    #[test]
    fn test_parse_highlight_input() {
        assert_eq!(
            parse_highlight_input("50 100 200"),
            Some(HighlightSpec::new(50.0, 100.0, 200.0))
        );
        assert!(parse_highlight_input("50 100").is_none());
        assert!(parse_highlight_input("50 100 200 300").is_none());
        assert!(parse_highlight_input("").is_none());
    }
}

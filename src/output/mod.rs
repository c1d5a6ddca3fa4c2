pub mod formatter;

pub use formatter::{
    format_courses, format_faculties, format_ranked, format_ranked_tsv, format_roster,
    format_specialities, format_subjects, should_use_colors,
};

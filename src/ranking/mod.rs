pub mod engine;
pub mod filter;
pub mod subjects;

pub use engine::{aggregate, compare, rank_students, AggregateResult, RankMode, RankedStudent, EPSILON};
pub use filter::{apply_highlight, HighlightSpec, RowDisplay};
pub use subjects::SubjectCatalog;

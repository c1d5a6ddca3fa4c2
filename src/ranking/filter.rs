use crate::ranking::engine::RankedStudent;

/// "Highlight the top P% of the students whose card number falls in a
/// numeric range" -- an overlay on the displayed list, not a re-ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightSpec {
    /// Percentage, clamped to [1, 100] on construction
    pub percent: f64,
    pub from: f64,
    pub to: f64,
}

impl HighlightSpec {
    pub fn new(percent: f64, from: f64, to: f64) -> Self {
        Self {
            percent: percent.clamp(1.0, 100.0),
            from,
            to,
        }
    }
}

/// Display state of one row while a highlight spec is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowDisplay {
    Highlighted,
    Shown,
    /// Outside the card-number range; hidden from view, still in the data
    Hidden,
}

/// Apply a highlight spec to an already-ranked list.
///
/// Rows whose card number parses as a number inside `[from, to]` form the
/// in-range subsequence (order preserved); the first `ceil(n * p / 100)` of
/// it are highlighted and the rest shown. Everything else -- out of range
/// or non-numeric id -- is hidden. The returned vec is parallel to `list`.
pub fn apply_highlight(list: &[RankedStudent], spec: &HighlightSpec) -> Vec<RowDisplay> {
    let in_range: Vec<bool> = list
        .iter()
        .map(|entry| {
            entry
                .result
                .student_card_number
                .parse::<f64>()
                .is_ok_and(|id| id >= spec.from && id <= spec.to)
        })
        .collect();

    let matching = in_range.iter().filter(|&&m| m).count();
    let highlight_count = (matching as f64 * spec.percent / 100.0).ceil() as usize;

    let mut seen_in_range = 0;
    in_range
        .into_iter()
        .map(|matches| {
            if !matches {
                return RowDisplay::Hidden;
            }
            seen_in_range += 1;
            if seen_in_range <= highlight_count {
                RowDisplay::Highlighted
            } else {
                RowDisplay::Shown
            }
        })
        .collect()
}

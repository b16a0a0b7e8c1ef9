//! # Page Break Decisions
//!
//! How a breakable unit (the lines of a list box or a detail section) is
//! distributed when it doesn't fit in the space left on a page.

/// What to do with a unit at the current cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakDecision {
    /// The whole unit fits here.
    Place,
    /// Start a new page and place the unit there.
    MoveToNextPage,
    /// Place the first `items_on_current_page` lines here, continue on the
    /// next page.
    Split { items_on_current_page: usize },
}

/// Decide how to place a unit made of `item_heights` in `remaining_height`.
///
/// `overhead` is the fixed part of the unit (box padding) that every
/// segment carries. Splitting is refused when fewer than `min_orphan_lines`
/// lines would stay on the current page, unless `at_fresh_top`, in which
/// case at least one line is always placed so the caller makes progress.
pub fn decide_break(
    remaining_height: f64,
    overhead: f64,
    item_heights: &[f64],
    min_orphan_lines: usize,
    at_fresh_top: bool,
) -> BreakDecision {
    let total: f64 = overhead + item_heights.iter().sum::<f64>();
    if total <= remaining_height {
        return BreakDecision::Place;
    }

    let mut running = overhead;
    let mut fit_count = 0;
    for &h in item_heights {
        if running + h > remaining_height {
            break;
        }
        running += h;
        fit_count += 1;
    }

    if at_fresh_top {
        if fit_count >= item_heights.len() {
            return BreakDecision::Place;
        }
        return BreakDecision::Split {
            items_on_current_page: fit_count.max(1),
        };
    }

    if fit_count == 0 || fit_count < min_orphan_lines.min(item_heights.len()) {
        return BreakDecision::MoveToNextPage;
    }

    BreakDecision::Split {
        items_on_current_page: fit_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn everything_fits() {
        let d = decide_break(100.0, 4.0, &[20.0, 30.0, 40.0], 2, false);
        assert_eq!(d, BreakDecision::Place);
    }

    #[test]
    fn splits_after_last_fitting_line() {
        let d = decide_break(60.0, 4.0, &[20.0, 30.0, 40.0], 1, false);
        assert_eq!(
            d,
            BreakDecision::Split {
                items_on_current_page: 2
            }
        );
    }

    #[test]
    fn orphan_moves_whole_unit() {
        let d = decide_break(26.0, 4.0, &[20.0, 30.0, 40.0], 2, false);
        assert_eq!(d, BreakDecision::MoveToNextPage);
    }

    #[test]
    fn nothing_fits_moves() {
        let d = decide_break(10.0, 4.0, &[20.0], 1, false);
        assert_eq!(d, BreakDecision::MoveToNextPage);
    }

    #[test]
    fn fresh_top_always_places_something() {
        let d = decide_break(10.0, 4.0, &[20.0, 20.0], 2, true);
        assert_eq!(
            d,
            BreakDecision::Split {
                items_on_current_page: 1
            }
        );
        let d = decide_break(10.0, 4.0, &[20.0], 2, true);
        assert_eq!(d, BreakDecision::Place);
    }
}

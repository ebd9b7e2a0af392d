//! The ordered rule set that narrows cell state.
//!
//! Each rule is a pure narrowing function over one cell and the grid: it may
//! only *clear* candidate booleans (directly or on neighbors), never set
//! them. The order matters for which contradiction surfaces first, not for
//! the reachable fixpoint — narrowing is monotonic and commutative once the
//! queue drains.
//!
//! Rules read a copy of the examined cell's record first and then write
//! through the grid's guarded setters, so any real change re-dirties the
//! affected cells.

use crate::cell::CellField;
use crate::grid::Grid;

/// One named narrowing step.
pub struct Rule {
    name: &'static str,
    apply: fn(&mut Grid, usize, usize),
}

impl Rule {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run this rule against the cell at `(x, y)`.
    pub fn apply(&self, grid: &mut Grid, x: usize, y: usize) {
        (self.apply)(grid, x, y);
    }
}

/// The twelve rules in priority order.
pub static RULES: [Rule; 12] = [
    Rule {
        name: "prune short runs",
        apply: prune_short_runs,
    },
    Rule {
        name: "arrowless cells cannot be blocks",
        apply: arrowless_cannot_be_block,
    },
    Rule {
        name: "non-blocks carry no arrows",
        apply: non_blocks_carry_no_arrows,
    },
    Rule {
        name: "a lone arrow is forced",
        apply: lone_arrow_is_forced,
    },
    Rule {
        name: "undefined cells cannot be letters",
        apply: undefined_cannot_be_letter,
    },
    Rule {
        name: "arrowed cells cannot be letters",
        apply: arrowed_cannot_be_letter,
    },
    Rule {
        name: "arrows need room for a word",
        apply: arrow_needs_room,
    },
    Rule {
        name: "blocks cannot touch",
        apply: blocks_cannot_touch,
    },
    Rule {
        name: "a single definition pins its origin",
        apply: single_definition_origin,
    },
    Rule {
        name: "reachable definitions keep runs open",
        apply: reachable_definition_extends_run,
    },
    Rule {
        name: "definitions beyond max length exclude letters",
        apply: unreachable_definition_excludes_letter,
    },
    Rule {
        name: "a word must pass through every letter",
        apply: word_must_pass_through,
    },
];

/// Rule 1: clear any arrow whose run would be shorter than
/// `min_word_length`, or empty altogether.
fn prune_short_runs(grid: &mut Grid, x: usize, y: usize) {
    let min = grid.config().min_word_length;
    let c = grid.cell_state(x, y);
    let Some(cell) = grid.cell_mut(x as isize, y as isize) else {
        return;
    };

    if c.letters_bottom < min {
        cell.set_arrow_bottom_down(false);
    }
    if c.letters_right < min {
        cell.set_arrow_right_across(false);
    }
    if c.letters_bottom_across < min {
        cell.set_arrow_bottom_across(false);
    }
    if c.letters_right_down < min {
        cell.set_arrow_right_down(false);
    }

    if c.letters_bottom == 0 {
        cell.set_arrow_bottom_across(false);
        cell.set_arrow_bottom_down(false);
    }
    if c.letters_right == 0 {
        cell.set_arrow_right_across(false);
        cell.set_arrow_right_down(false);
    }
}

/// Rule 2: with `block_must_have_definition`, a cell with zero surviving
/// arrow candidates cannot be a block.
fn arrowless_cannot_be_block(grid: &mut Grid, x: usize, y: usize) {
    let enforced = grid.config().block_must_have_definition;
    let c = grid.cell_state(x, y);
    if enforced && c.number_of_arrows() == 0 {
        grid.set_cell(x as isize, y as isize, CellField::IsBlock(false));
    }
}

/// Rule 3: a cell that can no longer be a block holds no arrows.
fn non_blocks_carry_no_arrows(grid: &mut Grid, x: usize, y: usize) {
    let c = grid.cell_state(x, y);
    if !c.is_block {
        let Some(cell) = grid.cell_mut(x as isize, y as isize) else {
            return;
        };
        cell.set_arrow_right_down(false);
        cell.set_arrow_right_across(false);
        cell.set_arrow_bottom_down(false);
        cell.set_arrow_bottom_across(false);
    }
}

/// Rule 4: with `block_must_have_definition`, a block whose arrow domain is
/// down to a single candidate must keep it — clear `none` on that axis.
fn lone_arrow_is_forced(grid: &mut Grid, x: usize, y: usize) {
    let enforced = grid.config().block_must_have_definition;
    let c = grid.cell_state(x, y);
    if enforced && !c.is_letter && c.number_of_arrows() == 1 {
        let Some(cell) = grid.cell_mut(x as isize, y as isize) else {
            return;
        };
        if c.arrow_bottom_across || c.arrow_bottom_down {
            cell.set_arrow_bottom_none(false);
        } else {
            cell.set_arrow_right_none(false);
        }
    }
}

/// Rule 5: a cell no definition can reach cannot be a letter.
fn undefined_cannot_be_letter(grid: &mut Grid, x: usize, y: usize) {
    let c = grid.cell_state(x, y);
    if c.number_of_definitions() == 0 {
        grid.set_cell(x as isize, y as isize, CellField::IsLetter(false));
    }
}

/// Rule 6: a cell with a committed arrow on both edges cannot be a letter.
fn arrowed_cannot_be_letter(grid: &mut Grid, x: usize, y: usize) {
    let c = grid.cell_state(x, y);
    if !c.arrow_bottom_none && !c.arrow_right_none {
        grid.set_cell(x as isize, y as isize, CellField::IsLetter(false));
    }
}

/// Rule 7: along a committed arrow direction, the next `min_word_length`
/// cells cannot be blocks.
fn arrow_needs_room(grid: &mut Grid, x: usize, y: usize) {
    let min = grid.config().min_word_length as isize;
    let c = grid.cell_state(x, y);
    let (xi, yi) = (x as isize, y as isize);

    if c.arrow_bottom_fixed() && !c.arrow_bottom_none {
        // Word starts just below, running down or bending across.
        let (bx, by) = (xi, yi + 1);
        for i in 0..min {
            grid.set_cell(
                bx + i * isize::from(c.arrow_bottom_across),
                by + i * isize::from(c.arrow_bottom_down),
                CellField::IsBlock(false),
            );
        }
    }

    if c.arrow_right_fixed() && !c.arrow_right_none {
        let (bx, by) = (xi + 1, yi);
        for i in 0..min {
            grid.set_cell(
                bx + i * isize::from(c.arrow_right_across),
                by + i * isize::from(c.arrow_right_down),
                CellField::IsBlock(false),
            );
        }
    }
}

/// Rule 8: unless `blocks_can_touch`, a committed block clears the block
/// candidate on all four neighbors.
fn blocks_cannot_touch(grid: &mut Grid, x: usize, y: usize) {
    let allowed = grid.config().blocks_can_touch;
    let c = grid.cell_state(x, y);
    let (xi, yi) = (x as isize, y as isize);

    if c.is_block && !c.is_letter && !allowed {
        grid.set_cell(xi, yi - 1, CellField::IsBlock(false));
        grid.set_cell(xi + 1, yi, CellField::IsBlock(false));
        grid.set_cell(xi, yi + 1, CellField::IsBlock(false));
        grid.set_cell(xi - 1, yi, CellField::IsBlock(false));
    }
}

/// Rule 9: when a letter cell's unique crossing definition can only come
/// from one axis, walk back to the originating block and commit its arrow;
/// if no plausible origin exists, the cell cannot be a letter.
fn single_definition_origin(grid: &mut Grid, x: usize, y: usize) {
    let min = grid.config().min_word_length;
    let c = grid.cell_state(x, y);
    let (xi, yi) = (x as isize, y as isize);

    let top_established = c.fixed_letters_top + 1 >= min;
    let left_established = c.fixed_letters_left + 1 >= min;

    let applicable = !c.is_block
        && (c.number_of_definitions() == 1
            || (top_established && c.number_definitions_from_top == 1)
            || (left_established && c.number_definitions_from_left == 1));
    if !applicable {
        return;
    }

    if c.number_definitions_from_top == 1
        && (c.number_definitions_from_left == 0 || top_established)
    {
        // A single definition count guarantees a finite distance.
        let d = c.closest_definition_from_top as isize;
        let straight = (xi, yi - 1 - d);
        let bent = (xi - 1, yi - d);

        if grid
            .cell(straight.0, straight.1)
            .is_some_and(|origin| origin.arrow_bottom_down())
        {
            grid.set_cell(straight.0, straight.1, CellField::ArrowBottomAcross(false));
            grid.set_cell(straight.0, straight.1, CellField::ArrowBottomNone(false));
        } else if grid
            .cell(bent.0, bent.1)
            .is_some_and(|origin| origin.arrow_right_down())
        {
            grid.set_cell(bent.0, bent.1, CellField::ArrowRightAcross(false));
            grid.set_cell(bent.0, bent.1, CellField::ArrowRightNone(false));
        } else {
            grid.set_cell(xi, yi, CellField::IsLetter(false));
        }
    }

    if c.number_definitions_from_left == 1
        && (c.number_definitions_from_top == 0 || left_established)
    {
        let d = c.closest_definition_from_left as isize;
        let straight = (xi - 1 - d, yi);
        let bent = (xi - d, yi - 1);

        if grid
            .cell(straight.0, straight.1)
            .is_some_and(|origin| origin.arrow_right_across())
        {
            grid.set_cell(straight.0, straight.1, CellField::ArrowRightDown(false));
            grid.set_cell(straight.0, straight.1, CellField::ArrowRightNone(false));
        } else if grid
            .cell(bent.0, bent.1)
            .is_some_and(|origin| origin.arrow_bottom_across())
        {
            grid.set_cell(bent.0, bent.1, CellField::ArrowBottomDown(false));
            grid.set_cell(bent.0, bent.1, CellField::ArrowBottomNone(false));
        } else {
            grid.set_cell(xi, yi, CellField::IsLetter(false));
        }
    }
}

/// Rule 10: a letter whose nearest definition is within `max_word_length`
/// keeps every cell back to that definition out of the block domain.
fn reachable_definition_extends_run(grid: &mut Grid, x: usize, y: usize) {
    let min = grid.config().min_word_length;
    let max = grid.config().max_word_length;
    let c = grid.cell_state(x, y);
    let (xi, yi) = (x as isize, y as isize);

    if !c.is_block
        && c.closest_definition_from_top < max
        && (c.number_definitions_from_left == 0 || c.fixed_letters_top + 1 >= min)
    {
        for i in 0..c.closest_definition_from_top {
            grid.set_cell(xi, yi - i as isize - 1, CellField::IsBlock(false));
        }
    }

    if !c.is_block
        && c.closest_definition_from_left < max
        && (c.number_definitions_from_top == 0 || c.fixed_letters_left + 1 >= min)
    {
        for i in 0..c.closest_definition_from_left {
            grid.set_cell(xi - i as isize - 1, yi, CellField::IsBlock(false));
        }
    }
}

/// Rule 11: a cell whose run already satisfies `min_word_length` but whose
/// nearest definition lies beyond `max_word_length` cannot be a letter.
fn unreachable_definition_excludes_letter(grid: &mut Grid, x: usize, y: usize) {
    let min = grid.config().min_word_length;
    let max = grid.config().max_word_length;
    let c = grid.cell_state(x, y);
    let (xi, yi) = (x as isize, y as isize);

    if c.fixed_letters_top + 1 >= min && c.closest_definition_from_top > max {
        grid.set_cell(xi, yi, CellField::IsLetter(false));
    }
    if c.fixed_letters_left + 1 >= min && c.closest_definition_from_left > max {
        grid.set_cell(xi, yi, CellField::IsLetter(false));
    }
}

/// Rule 12: a committed letter whose run on one axis cannot reach
/// `min_word_length` forces the crossing run to stay open.
fn word_must_pass_through(grid: &mut Grid, x: usize, y: usize) {
    let min = grid.config().min_word_length;
    let c = grid.cell_state(x, y);
    let (xi, yi) = (x as isize, y as isize);

    if c.is_letter
        && !c.is_block
        && c.letters_left.saturating_add(1).saturating_add(c.letters_right) < min
    {
        for i in 1..min.saturating_sub(c.letters_top) {
            grid.set_cell(xi, yi + i as isize, CellField::IsBlock(false));
        }
        for i in 1..min.saturating_sub(c.letters_bottom) {
            grid.set_cell(xi, yi - i as isize, CellField::IsBlock(false));
        }
    }

    if c.is_letter
        && !c.is_block
        && c.letters_top.saturating_add(1).saturating_add(c.letters_bottom) < min
    {
        for i in 1..min.saturating_sub(c.letters_left) {
            grid.set_cell(xi + i as isize, yi, CellField::IsBlock(false));
        }
        for i in 1..min.saturating_sub(c.letters_right) {
            grid.set_cell(xi - i as isize, yi, CellField::IsBlock(false));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;

    fn grid(width: usize, height: usize) -> Grid {
        let mut grid = Grid::new(GridConfig {
            width,
            height,
            min_word_length: 2,
            max_word_length: 4,
            ..GridConfig::default()
        });
        grid.measure();
        grid.was_updated();
        grid
    }

    #[test]
    fn rule_table_is_complete_and_uniquely_named() {
        assert_eq!(RULES.len(), 12);
        let mut names: Vec<_> = RULES.iter().map(Rule::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 12);
    }

    #[test]
    fn prune_short_runs_clears_bottom_row_arrows() {
        let mut g = grid(4, 4);
        // Bottom row: no letters below, so no downward word can start.
        RULES[0].apply(&mut g, 2, 3);
        let cell = g.cell(2, 3).unwrap();
        assert!(!cell.arrow_bottom_down());
        assert!(!cell.arrow_bottom_across());
    }

    #[test]
    fn arrowless_cells_cannot_be_blocks() {
        let mut g = grid(4, 4);
        {
            let cell = g.cell_mut(2, 2).unwrap();
            cell.set_arrow_bottom_down(false);
            cell.set_arrow_bottom_across(false);
            cell.set_arrow_right_down(false);
            cell.set_arrow_right_across(false);
        }
        RULES[1].apply(&mut g, 2, 2);
        assert!(!g.cell(2, 2).unwrap().is_block());
        assert!(g.cell(2, 2).unwrap().is_letter());
    }

    #[test]
    fn non_blocks_lose_their_arrows() {
        let mut g = grid(4, 4);
        g.cell_mut(2, 1).unwrap().set_is_block(false);
        RULES[2].apply(&mut g, 2, 1);
        let cell = g.cell(2, 1).unwrap();
        assert_eq!(cell.number_of_arrows(), 0);
        // The `none` candidates stay untouched.
        assert!(cell.arrow_bottom_none());
        assert!(cell.arrow_right_none());
    }

    #[test]
    fn lone_arrow_on_a_block_is_forced() {
        let mut g = grid(4, 4);
        {
            let cell = g.cell_mut(1, 1).unwrap();
            cell.set_is_letter(false);
            cell.set_arrow_right_down(false);
            cell.set_arrow_right_across(false);
            cell.set_arrow_bottom_across(false);
            // Only arrow_bottom_down survives.
        }
        RULES[3].apply(&mut g, 1, 1);
        let cell = g.cell(1, 1).unwrap();
        assert!(!cell.arrow_bottom_none());
        assert!(cell.arrow_bottom_down());
    }

    #[test]
    fn undefined_cells_cannot_be_letters() {
        let mut g = grid(4, 4);
        // (0, 0) has no neighbor able to define it once edge words are
        // disallowed.
        assert_eq!(g.cell(0, 0).unwrap().number_of_definitions(), 0);
        RULES[4].apply(&mut g, 0, 0);
        assert!(!g.cell(0, 0).unwrap().is_letter());
    }

    #[test]
    fn committed_arrows_on_both_edges_exclude_letter() {
        let mut g = grid(4, 4);
        {
            let cell = g.cell_mut(1, 1).unwrap();
            cell.set_arrow_bottom_none(false);
            cell.set_arrow_right_none(false);
        }
        RULES[5].apply(&mut g, 1, 1);
        assert!(!g.cell(1, 1).unwrap().is_letter());
    }

    #[test]
    fn committed_arrow_reserves_room_below() {
        let mut g = grid(4, 4);
        {
            let cell = g.cell_mut(1, 0).unwrap();
            // Commit the bottom arrow to "down".
            cell.set_arrow_bottom_across(false);
            cell.set_arrow_bottom_none(false);
        }
        RULES[6].apply(&mut g, 1, 0);
        // min_word_length = 2: the two cells below cannot be blocks.
        assert!(!g.cell(1, 1).unwrap().is_block());
        assert!(!g.cell(1, 2).unwrap().is_block());
        assert!(g.cell(1, 3).unwrap().is_block());
    }

    #[test]
    fn committed_blocks_repel_their_neighbors() {
        let mut g = grid(4, 4);
        g.cell_mut(2, 2).unwrap().set_is_letter(false);
        RULES[7].apply(&mut g, 2, 2);
        assert!(!g.cell(2, 1).unwrap().is_block());
        assert!(!g.cell(3, 2).unwrap().is_block());
        assert!(!g.cell(2, 3).unwrap().is_block());
        assert!(!g.cell(1, 2).unwrap().is_block());
        // Diagonals are unaffected.
        assert!(g.cell(1, 1).unwrap().is_block());
    }

    #[test]
    fn blocks_may_touch_when_allowed() {
        let mut g = Grid::new(GridConfig {
            width: 4,
            height: 4,
            blocks_can_touch: true,
            ..GridConfig::default()
        });
        g.measure();
        g.was_updated();
        g.cell_mut(2, 2).unwrap().set_is_letter(false);
        RULES[7].apply(&mut g, 2, 2);
        assert!(g.cell(2, 1).unwrap().is_block());
    }

    #[test]
    fn run_too_short_forces_crossing_word_open() {
        let mut g = grid(4, 4);
        // Make (1, 1) a committed letter walled in horizontally and above.
        g.cell_mut(0, 1).unwrap().set_is_letter(false);
        g.cell_mut(2, 1).unwrap().set_is_letter(false);
        g.cell_mut(1, 0).unwrap().set_is_letter(false);
        g.cell_mut(1, 1).unwrap().set_is_block(false);
        g.measure();
        g.was_updated();

        // Horizontal run is 1 < 2, so the downward run must stay open.
        RULES[11].apply(&mut g, 1, 1);
        assert!(!g.cell(1, 2).unwrap().is_block());
    }
}

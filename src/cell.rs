//! The cell finite-domain variable.
//!
//! A cell starts fully undecided: it may still become a letter or a block,
//! and each of its two arrow groups (bottom edge, right edge) may still
//! resolve to `down`, `across` or `none`. Rules only ever *clear* candidate
//! booleans; a cleared candidate comes back only through an explicit
//! snapshot restore in the backtracking search.
//!
//! Every write goes through a guarded setter: if the value actually changes,
//! the cell reports itself on the injected [`ChangeBus`] handle. That
//! notification is the sole mechanism that marks a cell dirty for
//! propagation.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::GridConfig;
use crate::grid::ChangeBus;

/// Sentinel for "no bound yet" measurements, standing in for an infinite
/// distance or run length.
pub const UNBOUNDED: usize = usize::MAX;

/// Flat, copyable record of every per-cell field.
///
/// Snapshots taken by the backtracking search are plain value copies of this
/// record, so save/restore is O(1) per cell with no serialization round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellState {
    pub(crate) arrow_bottom_down: bool,
    pub(crate) arrow_bottom_across: bool,
    pub(crate) arrow_bottom_none: bool,
    pub(crate) arrow_right_down: bool,
    pub(crate) arrow_right_across: bool,
    pub(crate) arrow_right_none: bool,
    pub(crate) is_letter: bool,
    pub(crate) is_block: bool,
    pub(crate) closest_definition_from_top: usize,
    pub(crate) closest_definition_from_left: usize,
    pub(crate) number_definitions_from_top: usize,
    pub(crate) number_definitions_from_left: usize,
    pub(crate) letters_right: usize,
    pub(crate) letters_right_down: usize,
    pub(crate) letters_bottom: usize,
    pub(crate) letters_bottom_across: usize,
    pub(crate) letters_left: usize,
    pub(crate) letters_top: usize,
    pub(crate) fixed_letters_top: usize,
    pub(crate) fixed_letters_left: usize,
}

impl Default for CellState {
    fn default() -> Self {
        Self {
            arrow_bottom_down: true,
            arrow_bottom_across: true,
            arrow_bottom_none: true,
            arrow_right_down: true,
            arrow_right_across: true,
            arrow_right_none: true,
            is_letter: true,
            is_block: true,
            closest_definition_from_top: 0,
            closest_definition_from_left: 0,
            number_definitions_from_top: 0,
            number_definitions_from_left: 0,
            letters_right: UNBOUNDED,
            letters_right_down: UNBOUNDED,
            letters_bottom: UNBOUNDED,
            letters_bottom_across: UNBOUNDED,
            letters_left: UNBOUNDED,
            letters_top: UNBOUNDED,
            fixed_letters_top: 0,
            fixed_letters_left: 0,
        }
    }
}

impl CellState {
    /// Surviving arrow candidates across both groups (`none` excluded).
    pub(crate) fn number_of_arrows(&self) -> usize {
        usize::from(self.arrow_bottom_across)
            + usize::from(self.arrow_bottom_down)
            + usize::from(self.arrow_right_across)
            + usize::from(self.arrow_right_down)
    }

    /// Definitions whose word could still pass through this cell.
    pub(crate) fn number_of_definitions(&self) -> usize {
        self.number_definitions_from_top + self.number_definitions_from_left
    }

    /// Neither letter nor block remains possible: a contradiction.
    pub(crate) fn type_error(&self) -> bool {
        !self.is_letter && !self.is_block
    }

    /// At most one of letter/block remains possible.
    pub(crate) fn type_fixed(&self) -> bool {
        !self.is_letter || !self.is_block
    }

    pub(crate) fn arrow_bottom_error(&self) -> bool {
        !self.arrow_bottom_down && !self.arrow_bottom_across && !self.arrow_bottom_none
    }

    pub(crate) fn arrow_right_error(&self) -> bool {
        !self.arrow_right_down && !self.arrow_right_across && !self.arrow_right_none
    }

    pub(crate) fn arrow_bottom_fixed(&self) -> bool {
        usize::from(self.arrow_bottom_down)
            + usize::from(self.arrow_bottom_across)
            + usize::from(self.arrow_bottom_none)
            <= 1
    }

    pub(crate) fn arrow_right_fixed(&self) -> bool {
        usize::from(self.arrow_right_down)
            + usize::from(self.arrow_right_across)
            + usize::from(self.arrow_right_none)
            <= 1
    }
}

/// The ten cell fields the grid-level setter may write.
///
/// Closed, exhaustive dispatch instead of by-name field access: the six
/// arrow candidates, the two type candidates, and the two "around the
/// corner" run lengths only the measurement pass writes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellField {
    ArrowBottomDown(bool),
    ArrowBottomAcross(bool),
    ArrowBottomNone(bool),
    ArrowRightDown(bool),
    ArrowRightAcross(bool),
    ArrowRightNone(bool),
    IsLetter(bool),
    IsBlock(bool),
    LettersRightDown(usize),
    LettersBottomAcross(usize),
}

/// One grid position with its candidate domains and measurements.
pub struct Cell {
    x: usize,
    y: usize,
    state: CellState,
    bus: Rc<RefCell<ChangeBus>>,
}

/// Declares a getter plus a guarded, change-notifying setter for one field.
macro_rules! guarded_accessors {
    ($(#[$doc:meta])* $field:ident, $setter:ident, $ty:ty) => {
        $(#[$doc])*
        #[must_use]
        pub fn $field(&self) -> $ty {
            self.state.$field
        }

        pub fn $setter(&mut self, value: $ty) {
            if self.state.$field != value {
                self.state.$field = value;
                self.bus.borrow_mut().notify(self.x, self.y);
            }
        }
    };
}

impl Cell {
    /// Build a fully undecided cell at `(x, y)` reporting changes to `bus`.
    ///
    /// Bent arrows only exist along the edges, so construction already
    /// rules out `arrow_bottom_across` off column 0 and `arrow_right_down`
    /// off row 0. These initial clears do not fire notifications.
    pub(crate) fn new(x: usize, y: usize, bus: Rc<RefCell<ChangeBus>>) -> Self {
        let mut state = CellState::default();
        if x > 0 {
            state.arrow_bottom_across = false;
        }
        if y > 0 {
            state.arrow_right_down = false;
        }
        Self { x, y, state, bus }
    }

    #[must_use]
    pub fn x(&self) -> usize {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> usize {
        self.y
    }

    guarded_accessors!(
        /// Bottom-edge arrow candidate: word starts below, runs down.
        arrow_bottom_down,
        set_arrow_bottom_down,
        bool
    );
    guarded_accessors!(
        /// Bottom-edge arrow candidate: word starts below, bends across.
        arrow_bottom_across,
        set_arrow_bottom_across,
        bool
    );
    guarded_accessors!(
        /// Bottom-edge arrow candidate: no definition on this edge.
        arrow_bottom_none,
        set_arrow_bottom_none,
        bool
    );
    guarded_accessors!(
        /// Right-edge arrow candidate: word starts to the right, bends down.
        arrow_right_down,
        set_arrow_right_down,
        bool
    );
    guarded_accessors!(
        /// Right-edge arrow candidate: word starts to the right, runs across.
        arrow_right_across,
        set_arrow_right_across,
        bool
    );
    guarded_accessors!(
        /// Right-edge arrow candidate: no definition on this edge.
        arrow_right_none,
        set_arrow_right_none,
        bool
    );
    guarded_accessors!(
        /// Whether this cell may still hold a letter.
        is_letter,
        set_is_letter,
        bool
    );
    guarded_accessors!(
        /// Whether this cell may still be a block.
        is_block,
        set_is_block,
        bool
    );
    guarded_accessors!(closest_definition_from_top, set_closest_definition_from_top, usize);
    guarded_accessors!(closest_definition_from_left, set_closest_definition_from_left, usize);
    guarded_accessors!(number_definitions_from_top, set_number_definitions_from_top, usize);
    guarded_accessors!(number_definitions_from_left, set_number_definitions_from_left, usize);
    guarded_accessors!(letters_right, set_letters_right, usize);
    guarded_accessors!(letters_right_down, set_letters_right_down, usize);
    guarded_accessors!(letters_bottom, set_letters_bottom, usize);
    guarded_accessors!(letters_bottom_across, set_letters_bottom_across, usize);
    guarded_accessors!(letters_left, set_letters_left, usize);
    guarded_accessors!(letters_top, set_letters_top, usize);
    guarded_accessors!(fixed_letters_top, set_fixed_letters_top, usize);
    guarded_accessors!(fixed_letters_left, set_fixed_letters_left, usize);

    #[must_use]
    pub fn number_of_arrows(&self) -> usize {
        self.state.number_of_arrows()
    }

    #[must_use]
    pub fn number_of_definitions(&self) -> usize {
        self.state.number_of_definitions()
    }

    /// Neither letter nor block remains possible.
    #[must_use]
    pub fn type_error(&self) -> bool {
        self.state.type_error()
    }

    /// The type domain has narrowed to (at most) one candidate.
    #[must_use]
    pub fn type_fixed(&self) -> bool {
        self.state.type_fixed()
    }

    #[must_use]
    pub fn arrow_bottom_error(&self) -> bool {
        self.state.arrow_bottom_error()
    }

    #[must_use]
    pub fn arrow_right_error(&self) -> bool {
        self.state.arrow_right_error()
    }

    #[must_use]
    pub fn arrow_bottom_fixed(&self) -> bool {
        self.state.arrow_bottom_fixed()
    }

    #[must_use]
    pub fn arrow_right_fixed(&self) -> bool {
        self.state.arrow_right_fixed()
    }

    /// Tie-break score in `[0, 1]` for branch-variable selection.
    ///
    /// Combines normalized Manhattan distance from the origin (closer is
    /// lower) with the inverse of the already-fixed letter context above and
    /// to the left (more established context is lower). An ordering score,
    /// not a probability; recomputed on demand, never cached.
    #[must_use]
    pub fn entropy(&self, config: &GridConfig) -> f64 {
        let size = (config.width + config.height) as f64;
        let ratio = |v: usize| ((v as f64) / size).min(1.0);

        ratio(self.x + self.y)
            * (1.0 - ratio(self.state.fixed_letters_top.saturating_add(self.state.fixed_letters_left)))
    }

    /// Apply one typed field write through the guarded setters.
    pub fn set_field(&mut self, field: CellField) {
        match field {
            CellField::ArrowBottomDown(v) => self.set_arrow_bottom_down(v),
            CellField::ArrowBottomAcross(v) => self.set_arrow_bottom_across(v),
            CellField::ArrowBottomNone(v) => self.set_arrow_bottom_none(v),
            CellField::ArrowRightDown(v) => self.set_arrow_right_down(v),
            CellField::ArrowRightAcross(v) => self.set_arrow_right_across(v),
            CellField::ArrowRightNone(v) => self.set_arrow_right_none(v),
            CellField::IsLetter(v) => self.set_is_letter(v),
            CellField::IsBlock(v) => self.set_is_block(v),
            CellField::LettersRightDown(v) => self.set_letters_right_down(v),
            CellField::LettersBottomAcross(v) => self.set_letters_bottom_across(v),
        }
    }

    /// Copy out the flat field record for a snapshot.
    pub(crate) fn state(&self) -> CellState {
        self.state
    }

    /// Overwrite the field record from a snapshot, without notifications.
    pub(crate) fn restore_state(&mut self, state: CellState) {
        self.state = state;
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_bus() -> Rc<RefCell<ChangeBus>> {
        Rc::new(RefCell::new(ChangeBus::default()))
    }

    #[test]
    fn new_cell_is_fully_undecided() {
        let cell = Cell::new(0, 0, test_bus());
        assert!(cell.is_letter());
        assert!(cell.is_block());
        assert!(!cell.type_fixed());
        assert!(!cell.type_error());
        assert_eq!(cell.number_of_arrows(), 4);
    }

    #[test]
    fn edge_constraints_applied_at_construction() {
        let bus = test_bus();
        // Off column 0: no bent bottom arrow.
        let cell = Cell::new(3, 0, Rc::clone(&bus));
        assert!(!cell.arrow_bottom_across());
        assert!(cell.arrow_right_down());
        // Off row 0: no bent right arrow.
        let cell = Cell::new(0, 3, Rc::clone(&bus));
        assert!(cell.arrow_bottom_across());
        assert!(!cell.arrow_right_down());
        // Construction never notifies.
        assert!(!bus.borrow_mut().take_updated());
    }

    #[test]
    fn guarded_setter_notifies_only_on_change() {
        let bus = test_bus();
        let mut cell = Cell::new(2, 5, Rc::clone(&bus));

        cell.set_is_block(true); // no-op: already true
        assert!(!bus.borrow_mut().take_updated());

        cell.set_is_block(false);
        let mut bus = bus.borrow_mut();
        assert!(bus.take_updated());
        assert_eq!(bus.pop(), Some((2, 5)));
    }

    #[test]
    fn type_error_requires_both_candidates_cleared() {
        let mut cell = Cell::new(1, 1, test_bus());
        cell.set_is_letter(false);
        assert!(cell.type_fixed());
        assert!(!cell.type_error());
        cell.set_is_block(false);
        assert!(cell.type_error());
    }

    #[test]
    fn arrow_group_error_and_fixed() {
        let mut cell = Cell::new(1, 1, test_bus());
        assert!(!cell.arrow_bottom_fixed());
        cell.set_arrow_bottom_down(false);
        cell.set_arrow_bottom_across(false);
        assert!(cell.arrow_bottom_fixed());
        assert!(!cell.arrow_bottom_error());
        cell.set_arrow_bottom_none(false);
        assert!(cell.arrow_bottom_error());
    }

    #[test]
    fn set_field_dispatches_to_guarded_setters() {
        let bus = test_bus();
        let mut cell = Cell::new(1, 2, Rc::clone(&bus));
        cell.set_field(CellField::ArrowRightAcross(false));
        assert!(!cell.arrow_right_across());
        assert_eq!(bus.borrow_mut().pop(), Some((1, 2)));
        cell.set_field(CellField::LettersRightDown(4));
        assert_eq!(cell.letters_right_down(), 4);
    }

    #[test]
    fn entropy_prefers_origin_and_established_context() {
        let config = GridConfig::default();
        let bus = test_bus();
        let near = Cell::new(1, 1, Rc::clone(&bus));
        let far = Cell::new(9, 9, Rc::clone(&bus));
        assert!(near.entropy(&config) < far.entropy(&config));

        // More fixed letters above/left scores lower at equal distance.
        let mut anchored = Cell::new(9, 9, Rc::clone(&bus));
        anchored.set_fixed_letters_top(3);
        anchored.set_fixed_letters_left(2);
        assert!(anchored.entropy(&config) < far.entropy(&config));
    }

    #[test]
    fn entropy_is_clamped_to_unit_interval() {
        let config = GridConfig {
            width: 2,
            height: 2,
            ..GridConfig::default()
        };
        let mut cell = Cell::new(30, 30, test_bus());
        cell.set_fixed_letters_top(100);
        let e = cell.entropy(&config);
        assert!((0.0..=1.0).contains(&e));
    }

    #[test]
    fn snapshot_round_trips_through_restore() {
        let mut cell = Cell::new(0, 0, test_bus());
        let saved = cell.state();
        cell.set_is_letter(false);
        cell.set_arrow_right_none(false);
        cell.set_letters_top(7);
        assert_ne!(cell.state(), saved);
        cell.restore_state(saved);
        assert_eq!(cell.state(), saved);
        assert!(cell.is_letter());
    }
}

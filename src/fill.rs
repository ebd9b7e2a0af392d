//! Dictionary word fill over a structurally resolved grid.
//!
//! Once `collapse` has decided which cells are letters and which are blocks,
//! the filler extracts every maximal run of letter cells (length two or
//! more, across and down), gives each run cell a domain of candidate
//! letters, and narrows those domains against the dictionary: a run only
//! admits words compatible with every cell domain it crosses, and each cell
//! only admits letters some compatible word puts there. Crossing runs share
//! cells, so narrowing one run narrows the other.
//!
//! Narrowing is monotonic, mirroring the structural rules: domains only
//! shrink, and an emptied domain is a hard [`FillError`] rather than a
//! backtracking point.

use std::collections::HashMap;
use std::fmt;
use std::ops::BitAnd;

use log::debug;
use rand::rngs::StdRng;
use rand::Rng;

use crate::dictionary::Dictionary;
use crate::errors::FillError;
use crate::grid::Grid;

/// A set of candidate letters `a..=z` as a 26-bit mask.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LetterSet(u32);

const ALL_LETTERS: u32 = (1 << 26) - 1;

impl LetterSet {
    pub const EMPTY: Self = Self(0);
    pub const FULL: Self = Self(ALL_LETTERS);

    /// The singleton set holding one lowercase ASCII letter.
    #[must_use]
    pub fn singleton(ch: char) -> Self {
        let mut set = Self::EMPTY;
        set.insert(ch);
        set
    }

    fn bit(ch: char) -> u32 {
        debug_assert!(ch.is_ascii_lowercase());
        1 << (ch as u32 - 'a' as u32)
    }

    pub fn insert(&mut self, ch: char) {
        self.0 |= Self::bit(ch);
    }

    #[must_use]
    pub fn contains(self, ch: char) -> bool {
        self.0 & Self::bit(ch) != 0
    }

    #[must_use]
    pub fn len(self) -> u32 {
        self.0.count_ones()
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The contained letter, if exactly one remains.
    #[must_use]
    pub fn as_singleton(self) -> Option<char> {
        if self.len() == 1 {
            let offset = self.0.trailing_zeros();
            char::from_u32('a' as u32 + offset)
        } else {
            None
        }
    }

    pub fn iter(self) -> impl Iterator<Item = char> {
        ('a'..='z').filter(move |&ch| self.contains(ch))
    }
}

impl BitAnd for LetterSet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for LetterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for ch in self.iter() {
            write!(f, "{ch}")?;
        }
        write!(f, "}}")
    }
}

/// One maximal run of letter cells, in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub cells: Vec<(usize, usize)>,
    pub across: bool,
}

impl Run {
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Extract every maximal run of resolved letter cells of length >= 2,
/// across runs first (top to bottom), then down runs (left to right).
///
/// Only cells whose type domain has collapsed to "letter" count; on a
/// partially solved grid, undecided cells break runs.
#[must_use]
pub fn letter_runs(grid: &Grid) -> Vec<Run> {
    let is_letter = |x: isize, y: isize| {
        grid.cell(x, y)
            .is_some_and(|cell| cell.is_letter() && !cell.is_block())
    };

    let mut runs = Vec::new();
    let mut push = |cells: &mut Vec<(usize, usize)>, across: bool| {
        if cells.len() >= 2 {
            runs.push(Run {
                cells: std::mem::take(cells),
                across,
            });
        } else {
            cells.clear();
        }
    };

    for y in 0..grid.height() {
        let mut current = Vec::new();
        for x in 0..grid.width() {
            if is_letter(x as isize, y as isize) {
                current.push((x, y));
            } else {
                push(&mut current, true);
            }
        }
        push(&mut current, true);
    }

    for x in 0..grid.width() {
        let mut current = Vec::new();
        for y in 0..grid.height() {
            if is_letter(x as isize, y as isize) {
                current.push((x, y));
            } else {
                push(&mut current, false);
            }
        }
        push(&mut current, false);
    }

    runs
}

/// Letter-domain narrowing and word assignment over one grid.
pub struct WordFill<'a> {
    dictionary: &'a Dictionary,
    runs: Vec<Run>,
    domains: HashMap<(usize, usize), LetterSet>,
}

impl<'a> WordFill<'a> {
    /// Set up full letter domains for every run cell of `grid`.
    #[must_use]
    pub fn new(grid: &Grid, dictionary: &'a Dictionary) -> Self {
        let runs = letter_runs(grid);
        let mut domains = HashMap::new();
        for run in &runs {
            for &cell in &run.cells {
                domains.insert(cell, LetterSet::FULL);
            }
        }
        Self {
            dictionary,
            runs,
            domains,
        }
    }

    #[must_use]
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// The current letter domain at `(x, y)`; empty off any run.
    #[must_use]
    pub fn domain(&self, x: usize, y: usize) -> LetterSet {
        self.domains
            .get(&(x, y))
            .copied()
            .unwrap_or(LetterSet::EMPTY)
    }

    /// The resolved letter at `(x, y)`, once its domain is a singleton.
    #[must_use]
    pub fn letter_at(&self, x: usize, y: usize) -> Option<char> {
        self.domain(x, y).as_singleton()
    }

    /// Force the domain at `(x, y)` to a single letter.
    pub fn pin(&mut self, x: usize, y: usize, ch: char) {
        self.domains.insert((x, y), LetterSet::singleton(ch));
    }

    /// Dictionary words of the run's length compatible with every cell
    /// domain the run crosses.
    #[must_use]
    pub fn consistent_words(&self, run: &Run) -> Vec<&'a str> {
        self.dictionary
            .words(run.len())
            .iter()
            .map(String::as_str)
            .filter(|word| {
                word.chars()
                    .zip(&run.cells)
                    .all(|(ch, &(x, y))| self.domain(x, y).contains(ch))
            })
            .collect()
    }

    /// Narrow every cell domain to a fixpoint against the dictionary.
    ///
    /// Per pass, each run's domains are intersected with the per-position
    /// union over its consistent words. Passes repeat until nothing shrinks.
    /// An emptied domain aborts with [`FillError::EmptyDomain`].
    pub fn narrow(&mut self) -> Result<(), FillError> {
        loop {
            let mut changed = false;

            for run_index in 0..self.runs.len() {
                let run = self.runs[run_index].clone();
                let words = self.consistent_words(&run);

                for (position, &(x, y)) in run.cells.iter().enumerate() {
                    let mut union = LetterSet::EMPTY;
                    for word in &words {
                        if let Some(ch) = word.chars().nth(position) {
                            union.insert(ch);
                        }
                    }

                    let current = self.domain(x, y);
                    let narrowed = current & union;
                    if narrowed.is_empty() {
                        return Err(FillError::EmptyDomain { x, y });
                    }
                    if narrowed != current {
                        self.domains.insert((x, y), narrowed);
                        changed = true;
                    }
                }
            }

            if !changed {
                return Ok(());
            }
        }
    }

    /// Assign a concrete word to every run.
    ///
    /// Greedy with propagation: narrow to a fixpoint, then per run pick one
    /// of its consistent words at random, pin its letters and narrow again
    /// so crossing runs feel the choice immediately. No backtracking over
    /// word choices; a dead end surfaces as [`FillError::EmptyDomain`].
    pub fn assign(&mut self, rng: &mut StdRng) -> Result<Vec<(Run, String)>, FillError> {
        self.narrow()?;

        let mut chosen = Vec::with_capacity(self.runs.len());
        for run_index in 0..self.runs.len() {
            let run = self.runs[run_index].clone();
            let words = self.consistent_words(&run);
            if words.is_empty() {
                let (x, y) = run.cells[0];
                return Err(FillError::EmptyDomain { x, y });
            }
            let word = words[rng.gen_range(0..words.len())].to_string();
            debug!(
                "run at ({}, {}) {} -> {word}",
                run.cells[0].0,
                run.cells[0].1,
                if run.across { "across" } else { "down" }
            );

            for (ch, &(x, y)) in word.chars().zip(&run.cells) {
                self.pin(x, y, ch);
            }
            self.narrow()?;
            chosen.push((run, word));
        }

        Ok(chosen)
    }
}

//! Grid generation parameters.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Everything the generator needs to know up front.
///
/// A configuration is immutable once a grid is built from it; changing a
/// parameter means building a new grid. Deserialization fills omitted
/// fields from [`GridConfig::default`], so partial JSON configs work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Shortest admissible word.
    pub min_word_length: usize,
    /// Longest admissible word; also bounds how far a definition can reach.
    pub max_word_length: usize,
    /// Every block must end up carrying at least one definition arrow.
    pub block_must_have_definition: bool,
    /// Reserved: the letter area must form a single connected region.
    pub all_letters_must_be_connected: bool,
    /// Whether two blocks may sit orthogonally adjacent.
    pub blocks_can_touch: bool,
    /// Whether words may run along row 0 and column 0.
    pub allow_words_along_first_row_column: bool,
    /// Fraction of branch decisions that try "block" before "letter".
    pub blocks_density: f64,
    /// Reserved: cap on the size of a connected clump of blocks.
    pub max_block_island_size: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 12,
            height: 12,
            min_word_length: 2,
            max_word_length: 12,
            block_must_have_definition: true,
            all_letters_must_be_connected: true,
            blocks_can_touch: false,
            allow_words_along_first_row_column: false,
            blocks_density: 0.3,
            max_block_island_size: 2,
        }
    }
}

impl GridConfig {
    /// Check the parameters for internal consistency.
    ///
    /// Grids below 2x2 cannot host a word and its definition, so they are
    /// rejected outright rather than left to fail during search.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 2 || self.height < 2 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.min_word_length < 1
            || self.min_word_length > self.max_word_length
            || self.max_word_length < 2
        {
            return Err(ConfigError::InvalidWordLengths {
                min: self.min_word_length,
                max: self.max_word_length,
            });
        }
        if !(0.0..=1.0).contains(&self.blocks_density) {
            return Err(ConfigError::InvalidDensity {
                density: self.blocks_density,
            });
        }
        if self.max_block_island_size < 1 {
            return Err(ConfigError::InvalidIslandSize {
                size: self.max_block_island_size,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GridConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cell_count(), 144);
    }

    #[test]
    fn tiny_grids_are_rejected() {
        let config = GridConfig {
            width: 1,
            height: 8,
            ..GridConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidDimensions {
                width: 1,
                height: 8
            })
        );
    }

    #[test]
    fn inverted_word_lengths_are_rejected() {
        let config = GridConfig {
            min_word_length: 5,
            max_word_length: 3,
            ..GridConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWordLengths { min: 5, max: 3 })
        ));
    }

    #[test]
    fn density_outside_unit_interval_is_rejected() {
        let config = GridConfig {
            blocks_density: 1.5,
            ..GridConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDensity { .. })
        ));
    }

    #[test]
    fn serde_round_trip_preserves_every_field() {
        let config = GridConfig {
            width: 9,
            height: 7,
            blocks_density: 0.42,
            blocks_can_touch: true,
            ..GridConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: GridConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: GridConfig =
            serde_json::from_str(r#"{"width": 8, "height": 10}"#).unwrap();
        assert_eq!(config.width, 8);
        assert_eq!(config.height, 10);
        assert_eq!(config.min_word_length, 2);
        assert!((config.blocks_density - 0.3).abs() < f64::EPSILON);
    }
}

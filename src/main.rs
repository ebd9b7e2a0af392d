use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use arroword::config::GridConfig;
use arroword::dictionary::Dictionary;
use arroword::errors::{ConfigError, DictionaryError, FillError};
use arroword::fill::WordFill;
use arroword::grid::Grid;

/// Arrowword grid generator
#[derive(Parser, Debug)]
#[command(
    author,
    about,
    long_about = None,
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")")
)]
struct Cli {
    /// Grid width in cells
    #[arg(short = 'W', long, default_value_t = 12)]
    width: usize,

    /// Grid height in cells
    #[arg(short = 'H', long, default_value_t = 12)]
    height: usize,

    /// Minimum word length
    #[arg(short = 'm', long, default_value_t = 2)]
    min_word_length: usize,

    /// Maximum word length
    #[arg(short = 'M', long, default_value_t = 12)]
    max_word_length: usize,

    /// Fraction of branch decisions that try "block" first
    #[arg(short = 'd', long, default_value_t = 0.3)]
    blocks_density: f64,

    /// Allow two blocks to sit side by side
    #[arg(long, default_value_t = false)]
    blocks_can_touch: bool,

    /// Allow words to run along the first row and column
    #[arg(long, default_value_t = false)]
    allow_edge_words: bool,

    /// Drop the requirement that every block carries a definition arrow
    #[arg(long, default_value_t = false)]
    no_block_definition: bool,

    /// Seed for the search's random choices (reproducible runs)
    #[arg(short = 's', long)]
    seed: Option<u64>,

    /// Number of generation attempts before giving up
    #[arg(short = 'a', long, default_value_t = 10)]
    attempts: u32,

    /// Path to a word list (one word per line, or a length-keyed .json)
    #[arg(short = 'D', long)]
    dictionary: Option<String>,

    /// Load the grid configuration from a JSON file instead of flags
    #[arg(short = 'c', long)]
    config: Option<String>,
}

impl Cli {
    fn grid_config(&self) -> Result<GridConfig, Box<dyn std::error::Error>> {
        if let Some(path) = &self.config {
            let contents = std::fs::read_to_string(path)?;
            return Ok(serde_json::from_str(&contents)?);
        }

        Ok(GridConfig {
            width: self.width,
            height: self.height,
            min_word_length: self.min_word_length,
            max_word_length: self.max_word_length,
            blocks_density: self.blocks_density,
            blocks_can_touch: self.blocks_can_touch,
            allow_words_along_first_row_column: self.allow_edge_words,
            block_must_have_definition: !self.no_block_definition,
            ..GridConfig::default()
        })
    }
}

/// Entry point of the arroword CLI.
///
/// Delegates to [`try_main`], catching any errors and printing them in a
/// user-friendly way before exiting with code 1.
fn main() -> ExitCode {
    // Set up logging
    let debug_enabled = std::env::var("ARROWORD_DEBUG").is_ok();
    arroword::log::init_logger(debug_enabled);

    if let Err(e) = try_main() {
        // Print with code and help text where the error carries them.
        if let Some(err) = e.downcast_ref::<ConfigError>() {
            eprintln!("Error: {}", err.display_detailed());
        } else if let Some(err) = e.downcast_ref::<DictionaryError>() {
            eprintln!("Error: {}", err.display_detailed());
        } else if let Some(err) = e.downcast_ref::<FillError>() {
            eprintln!("Error: {}", err.display_detailed());
        } else {
            eprintln!("Error: {e}");
        }
        // Exit explicitly with a nonzero code so scripts can detect failure
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Core application logic.
///
/// Steps:
/// 1. Parse CLI arguments with Clap and validate the grid configuration.
/// 2. Search for a consistent grid topology, retrying with fresh seeds.
/// 3. Print the resolved topology on stdout.
/// 4. If a dictionary was given, fill the runs with words and print again.
/// 5. Print performance metrics (timings, counts) on stderr.
fn try_main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = cli.grid_config()?;
    config.validate()?;

    let dictionary = match &cli.dictionary {
        Some(path) => {
            let t_load = Instant::now();
            let dictionary = Dictionary::load(path)?;
            log::info!(
                "loaded {} words in {:.3}s",
                dictionary.len(),
                t_load.elapsed().as_secs_f64()
            );
            dictionary.warn_on_missing_lengths(config.min_word_length, config.max_word_length);
            Some(dictionary)
        }
        None => None,
    };

    // 1. Search for a consistent topology; each attempt gets its own seed so
    // a failed search does not repeat itself.
    let t_search = Instant::now();
    let mut solved: Option<Grid> = None;
    for attempt in 0..cli.attempts {
        let rng = match cli.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(u64::from(attempt))),
            None => StdRng::from_entropy(),
        };
        let mut grid = Grid::new(config.clone()).with_rng(rng);
        if grid.collapse() {
            log::info!("grid resolved on attempt {}", attempt + 1);
            solved = Some(grid);
            break;
        }
        log::info!("attempt {} failed, retrying", attempt + 1);
    }
    let search_secs = t_search.elapsed().as_secs_f64();

    let Some(grid) = solved else {
        eprintln!(
            "No consistent grid found after {} attempts ({search_secs:.3}s); \
             the configuration may be impossible",
            cli.attempts
        );
        return Err("no consistent grid found".into());
    };

    // 2. Print the bare topology.
    println!("{}", render(&grid, None));

    // 3. Word fill, when a dictionary is available.
    let fill_secs = if let Some(dictionary) = &dictionary {
        let t_fill = Instant::now();
        let mut fill = WordFill::new(&grid, dictionary);
        let mut rng = StdRng::seed_from_u64(cli.seed.unwrap_or_else(rand::random));
        let words = fill.assign(&mut rng)?;
        let secs = t_fill.elapsed().as_secs_f64();

        println!("{}", render(&grid, Some(&fill)));
        for (run, word) in &words {
            let (x, y) = run.cells[0];
            println!(
                "({x}, {y}) {}: {word}",
                if run.across { "across" } else { "down" }
            );
        }
        Some(secs)
    } else {
        None
    };

    // 4. Diagnostics to stderr.
    let blocks = grid.cells().iter().filter(|c| !c.is_letter()).count();
    match fill_secs {
        Some(fill_secs) => eprintln!(
            "Resolved {}x{} grid with {blocks} blocks in {search_secs:.3}s; filled in {fill_secs:.3}s.",
            grid.width(),
            grid.height()
        ),
        None => eprintln!(
            "Resolved {}x{} grid with {blocks} blocks in {search_secs:.3}s.",
            grid.width(),
            grid.height()
        ),
    }

    Ok(())
}

/// Render the grid as ASCII rows: `#` for blocks, the assigned letter for
/// filled cells, `.` for unfilled letter cells, `?` for undecided cells.
fn render(grid: &Grid, fill: Option<&WordFill>) -> String {
    let mut out = String::new();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let cell = grid
                .cell(x as isize, y as isize)
                .unwrap_or_else(|| unreachable!("in-range coordinates"));
            let glyph = if cell.type_error() || !cell.type_fixed() {
                '?'
            } else if !cell.is_letter() {
                '#'
            } else {
                fill.and_then(|f| f.letter_at(x, y)).unwrap_or('.')
            };
            out.push(glyph);
            if x + 1 < grid.width() {
                out.push(' ');
            }
        }
        if y + 1 < grid.height() {
            out.push('\n');
        }
    }
    out
}

//! # Life Game
//!
//! Conway's Game of Life on a toroidal grid, advanced one generation per frame.
//!
//! The game ends itself when the population dies out, when the board
//! stops changing, or after a configured number of generations.

use serde::{Deserialize, Serialize};
use std::fmt::Write;
use steppable::{StepFault, Steppable};
use thiserror::Error;

/// Largest board the game will allocate
pub const MAX_CELLS: usize = 1 << 20;

/// Rejected board configurations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifeConfigError {
    #[error("Board too large: {width}x{height} exceeds {max} cells")]
    TooLarge {
        width: usize,
        height: usize,
        max: usize,
    },
}

impl From<LifeConfigError> for StepFault {
    fn from(err: LifeConfigError) -> Self {
        StepFault::error(err.to_string())
    }
}

/// Life game configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifeConfig {
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
    /// Seed for the initial board
    pub seed: u64,
    /// Generations before the game ends itself (0 = unlimited)
    pub max_generations: u64,
    /// Generation at which to report a fault (for exercising fault handling)
    pub fault_at: Option<u64>,
}

impl LifeConfig {
    /// Checks the board size, returning the number of cells
    ///
    /// Zero dimensions count as one, matching how the game clamps them.
    pub fn validate(&self) -> Result<usize, LifeConfigError> {
        let (width, height) = (self.width.max(1), self.height.max(1));
        width
            .checked_mul(height)
            .filter(|&cells| cells <= MAX_CELLS)
            .ok_or(LifeConfigError::TooLarge {
                width,
                height,
                max: MAX_CELLS,
            })
    }
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 16,
            seed: 0x5eed,
            max_generations: 0,
            fault_at: None,
        }
    }
}

/// Why the game ended itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeEnding {
    Extinct,
    Stable,
    GenerationLimit,
    Shutdown,
}

/// A running Life board
#[derive(Debug, Clone)]
pub struct LifeGame {
    config: LifeConfig,
    cells: Vec<bool>,
    scratch: Vec<bool>,
    generation: u64,
    alive: bool,
    ending: Option<LifeEnding>,
}

impl LifeGame {
    /// Creates a game seeded from the configuration
    pub fn new(config: LifeConfig) -> Result<Self, LifeConfigError> {
        let len = config.validate()?;
        let config = LifeConfig {
            width: config.width.max(1),
            height: config.height.max(1),
            ..config
        };
        let cells = seed_cells(len, config.seed);

        Ok(Self {
            scratch: vec![false; cells.len()],
            cells,
            config,
            generation: 0,
            alive: false,
            ending: None,
        })
    }

    /// Creates a game from an explicit board (row-major, `#` alive)
    pub fn from_pattern(config: LifeConfig, rows: &[&str]) -> Result<Self, LifeConfigError> {
        let mut game = Self::new(config)?;
        game.cells.iter_mut().for_each(|cell| *cell = false);
        for (y, row) in rows.iter().enumerate().take(game.config.height) {
            for (x, ch) in row.chars().enumerate().take(game.config.width) {
                let index = game.index(x, y);
                game.cells[index] = ch == '#';
            }
        }
        Ok(game)
    }

    /// Current generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of live cells
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }

    /// Why the game ended, if it has
    pub fn ending(&self) -> Option<LifeEnding> {
        self.ending
    }

    /// Returns true if the cell at (x, y) is alive
    pub fn cell(&self, x: usize, y: usize) -> bool {
        self.cells[self.index(x % self.config.width, y % self.config.height)]
    }

    /// Renders the board with a header line
    pub fn render(&self) -> String {
        let mut out = String::with_capacity((self.config.width + 1) * (self.config.height + 1));
        let _ = writeln!(
            out,
            "generation {} | population {}",
            self.generation,
            self.population()
        );
        for row in self.cells.chunks(self.config.width) {
            out.extend(row.iter().map(|&cell| if cell { '#' } else { '.' }));
            out.push('\n');
        }
        out
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.config.width + x
    }

    fn live_neighbors(&self, x: usize, y: usize) -> usize {
        let (w, h) = (self.config.width, self.config.height);
        let mut count = 0;
        for dy in [h - 1, 0, 1] {
            for dx in [w - 1, 0, 1] {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if self.cells[self.index((x + dx) % w, (y + dy) % h)] {
                    count += 1;
                }
            }
        }
        count
    }

    fn end(&mut self, ending: LifeEnding) {
        log::debug!("life game ended at generation {}: {:?}", self.generation, ending);
        self.alive = false;
        self.ending = Some(ending);
    }
}

impl Steppable for LifeGame {
    fn begin(&mut self) {
        self.alive = true;
        self.ending = None;
    }

    fn advance(&mut self) -> Result<(), StepFault> {
        let next = self.generation + 1;
        if self.config.fault_at == Some(next) {
            return Err(StepFault::error(format!(
                "injected fault at generation {}",
                next
            )));
        }

        for y in 0..self.config.height {
            for x in 0..self.config.width {
                let index = self.index(x, y);
                let neighbors = self.live_neighbors(x, y);
                self.scratch[index] = matches!((self.cells[index], neighbors), (true, 2) | (_, 3));
            }
        }
        let changed = self.scratch != self.cells;
        std::mem::swap(&mut self.cells, &mut self.scratch);
        self.generation = next;

        if self.population() == 0 {
            self.end(LifeEnding::Extinct);
        } else if !changed {
            self.end(LifeEnding::Stable);
        } else if self.config.max_generations > 0 && self.generation >= self.config.max_generations {
            self.end(LifeEnding::GenerationLimit);
        }
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn shutdown(&mut self) {
        self.end(LifeEnding::Shutdown);
    }

    fn describe(&self) -> Option<String> {
        Some(self.render())
    }
}

/// Fills a board from a xorshift64 stream, roughly one cell in three alive
fn seed_cells(len: usize, seed: u64) -> Vec<bool> {
    let mut state = seed.max(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state % 3 == 0
        })
        .collect()
}

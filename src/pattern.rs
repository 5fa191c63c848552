use std::path::Path;

use serde::Deserialize;

use crate::error::{SignError, SignResult};

/// Immutable grid of LED states. `0` is off, `1..=N` selects an active
/// state color. Rows may be ragged; everything past a row's end reads as 0.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "Vec<Vec<u8>>")]
pub struct Pattern {
    rows: Vec<Vec<u8>>,
    cols: usize,
}

impl From<Vec<Vec<u8>>> for Pattern {
    fn from(rows: Vec<Vec<u8>>) -> Self {
        Self::new(rows)
    }
}

impl Pattern {
    pub fn new(rows: Vec<Vec<u8>>) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { rows, cols }
    }

    /// All-off pattern of the given shape
    pub fn zeros(cols: usize, rows: usize) -> Self {
        Self {
            rows: vec![Vec::new(); rows],
            cols,
        }
    }

    /// Width of the widest row
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// True when the pattern has no area at all.
    pub fn is_empty(&self) -> bool {
        self.cols == 0 || self.rows.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(0)
    }

    /// Largest state value used anywhere in the pattern
    pub fn max_value(&self) -> u8 {
        self.rows
            .iter()
            .flat_map(|r| r.iter().copied())
            .max()
            .unwrap_or(0)
    }

    /// Iterate `(row, col, value)` for every cell with value > 0.
    pub fn active_cells(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, v)| **v > 0)
                .map(move |(c, v)| (r, c, *v))
        })
    }

    pub fn active_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.iter().filter(|v| **v > 0).count())
            .sum()
    }

    /// Parse a digit grid, one row per line.
    ///
    /// Digits map to their value, `#`, `*`, `@`, `x` and `X` mean state 1,
    /// anything else is off. Trailing blank lines are dropped.
    pub fn parse_text(text: &str) -> Self {
        let mut rows: Vec<Vec<u8>> = text
            .lines()
            .map(|line| line.trim_end().chars().map(cell_value).collect())
            .collect();

        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }

        Self::new(rows)
    }

    /// Parse a JSON array of arrays, e.g. `[[0,1],[1]]`.
    pub fn parse_json(json: &str) -> SignResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a pattern file. `.json` files are parsed as JSON, everything
    /// else as a digit grid.
    pub fn load(path: &Path) -> SignResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let pattern = if is_json {
            Self::parse_json(&content)?
        } else {
            Self::parse_text(&content)
        };

        if pattern.is_empty() {
            return Err(SignError::Pattern(format!(
                "{} contains no pattern rows",
                path.display()
            )));
        }
        Ok(pattern)
    }

    /// Replace every active value with `state`.
    pub fn recolored(&self, state: u8) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|r| r.iter().map(|v| if *v > 0 { state } else { 0 }).collect())
            .collect();
        Self::new(rows)
    }
}

fn cell_value(c: char) -> u8 {
    match c {
        '0'..='9' => c as u8 - b'0',
        '#' | '*' | '@' | 'x' | 'X' => 1,
        _ => 0,
    }
}

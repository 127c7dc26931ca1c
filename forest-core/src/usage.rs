//! Token usage input: validated manual counts and CSV usage exports.
//!
//! A usage export is summed down a single resolved column. The header is
//! searched, in order, for:
//! 1. a column whose name contains `total tokens` / `total_tokens`,
//! 2. a column named exactly `tokens`,
//! 3. `input_tokens` and/or `output_tokens`, summed per row,
//!
//! and when none match, [`UsageConfig::fallback_column`] is summed instead.
//! Rows whose token cell is not numeric are skipped.

use std::path::Path;

use crate::config::UsageConfig;
use crate::error::{ForestError, Result};

/// A finite, strictly positive number of tokens.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct TokenCount(f64);

impl TokenCount {
    pub fn new(tokens: f64) -> Result<Self> {
        if !tokens.is_finite() {
            return Err(ForestError::InvalidTokens(format!("{tokens} is not a finite number")));
        }
        if tokens <= 0.0 {
            return Err(ForestError::InvalidTokens(format!("{tokens} must be greater than zero")));
        }
        Ok(Self(tokens))
    }

    /// Parses user-entered text such as `1000000`, `1_000_000` or `1,000,000`.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ForestError::InvalidTokens("no value entered".to_string()));
        }
        let value = parse_number(trimmed)
            .ok_or_else(|| ForestError::InvalidTokens(format!("`{trimmed}` is not a number")))?;
        Self::new(value)
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

/// Which header rule supplied the token values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnSource {
    TotalTokens(usize),
    Tokens(usize),
    InputOutput {
        input: Option<usize>,
        output: Option<usize>,
    },
    Fallback(usize),
}

impl ColumnSource {
    /// Picks the token column(s) from a lowercased, trimmed header row.
    pub fn resolve(header: &[String], cfg: &UsageConfig) -> Self {
        if let Some(i) = header
            .iter()
            .position(|h| h.contains("total tokens") || h.contains("total_tokens"))
        {
            return ColumnSource::TotalTokens(i);
        }
        if let Some(i) = header.iter().position(|h| h == "tokens") {
            return ColumnSource::Tokens(i);
        }

        let input = header.iter().position(|h| h == "input_tokens");
        let output = header.iter().position(|h| h == "output_tokens");
        if input.is_some() || output.is_some() {
            return ColumnSource::InputOutput { input, output };
        }

        ColumnSource::Fallback(cfg.fallback_column)
    }

    /// Token value of one data row, or `None` if the row has no numeric token cell.
    fn row_tokens(&self, cells: &[String]) -> Option<f64> {
        let cell = |i: usize| cells.get(i).and_then(|c| parse_number(c));
        match *self {
            ColumnSource::TotalTokens(i) | ColumnSource::Tokens(i) | ColumnSource::Fallback(i) => {
                cell(i)
            }
            ColumnSource::InputOutput { input, output } => {
                let a = input.and_then(cell);
                let b = output.and_then(cell);
                match (a, b) {
                    (None, None) => None,
                    (a, b) => Some(a.unwrap_or(0.0) + b.unwrap_or(0.0)),
                }
            }
        }
    }
}

/// Sums the token column of a CSV usage export.
///
/// ### Parameters
/// - `text` - Full CSV text; the first non-blank line is the header.
/// - `cfg` - Import settings providing the last-resort column index.
///
/// ### Returns
/// - `Ok(TokenCount)` with the summed tokens.
/// - `Err(ForestError::EmptyUsage)` if there is no header or no data row.
/// - `Err(ForestError::NoTokenColumn)` if no row had a numeric token cell.
/// - `Err(ForestError::InvalidTokens)` if the total is not positive.
pub fn tokens_from_csv(text: &str, cfg: &UsageConfig) -> Result<TokenCount> {
    // Line numbers are counted before blank lines are dropped.
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());

    let header: Vec<String> = match lines.next() {
        Some((_, line)) => split_row(line)
            .into_iter()
            .map(|h| h.trim().to_lowercase())
            .collect(),
        None => return Err(ForestError::EmptyUsage),
    };

    let source = ColumnSource::resolve(&header, cfg);
    tracing::info!(?source, "resolved token column");

    let mut rows = 0usize;
    let mut matched = 0usize;
    let mut total = 0.0;
    for (idx, line) in lines {
        rows += 1;
        let cells = split_row(line);
        match source.row_tokens(&cells) {
            Some(tokens) => {
                matched += 1;
                total += tokens;
            }
            None => tracing::debug!(line = idx + 1, "skipping row without numeric tokens"),
        }
    }

    if rows == 0 {
        return Err(ForestError::EmptyUsage);
    }
    if matched == 0 {
        return Err(ForestError::NoTokenColumn);
    }

    tracing::debug!(rows, matched, total, "summed usage export");
    TokenCount::new(total)
}

/// Reads a CSV usage export from disk and sums its token column.
pub fn tokens_from_csv_file(path: impl AsRef<Path>, cfg: &UsageConfig) -> Result<TokenCount> {
    let text = std::fs::read_to_string(path.as_ref())?;
    tokens_from_csv(&text, cfg)
}

/// Splits one CSV line on commas, keeping commas inside double quotes.
fn split_row(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => cells.push(std::mem::take(&mut cell)),
            _ => cell.push(c),
        }
    }
    cells.push(cell);
    cells
}

/// Parses a numeric cell, allowing `_` anywhere and `,` only as a
/// thousands separator in the integer part (`1,234,567.5`).
fn parse_number(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '"'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let number = if cleaned.contains(',') {
        strip_thousands(&cleaned)?
    } else {
        cleaned
    };
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Removes `,` group separators, or `None` if any group is misplaced.
fn strip_thousands(text: &str) -> Option<String> {
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (text, None),
    };
    if frac_part.is_some_and(|f| f.contains(',')) {
        return None;
    }

    let digits = int_part.trim_start_matches(['+', '-']);
    let sign = &int_part[..int_part.len() - digits.len()];
    let mut groups = digits.split(',');
    let lead = groups.next()?;
    if !(1..=3).contains(&lead.len()) || !lead.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut out = format!("{sign}{lead}");
    for group in groups {
        if group.len() != 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        out.push_str(group);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    Some(out)
}

//! Transform functions usable as field value sources.
//!
//! A transform receives the whole input row and the ordered column indices
//! named in the mapping, and returns the output value. It must depend on
//! nothing else.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{OperationError, OperationResult};
use crate::models::InputRow;

/// Signature shared by every transform function.
pub type TransformFn = fn(&InputRow, &[usize]) -> OperationResult;

static STRICT_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("valid date pattern"));

/// How many positions a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    pub const fn exactly(n: usize) -> Self {
        Self { min: n, max: Some(n) }
    }

    pub const fn at_least(n: usize) -> Self {
        Self { min: n, max: None }
    }

    pub fn accepts(&self, given: usize) -> bool {
        given >= self.min && self.max.map_or(true, |max| given <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "exactly {}", self.min),
            Some(max) => write!(f, "{} to {}", self.min, max),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// A registered function plus the number of positions it reads.
#[derive(Clone, Copy)]
pub struct Operation {
    pub function: TransformFn,
    pub arity: Arity,
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation").field("arity", &self.arity).finish_non_exhaustive()
    }
}

/// Registry of transform functions, looked up by name when a mapping is loaded.
#[derive(Debug, Clone)]
pub struct TransformRegistry {
    operations: BTreeMap<String, Operation>,
}

impl TransformRegistry {
    /// A registry with no functions.
    pub fn empty() -> Self {
        Self {
            operations: BTreeMap::new(),
        }
    }

    /// A registry holding the built-in functions.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("format_date", Arity::exactly(1), format_date);
        registry.register("format_date_strict", Arity::exactly(1), format_date_strict);
        registry.register("first", Arity::at_least(1), first);
        registry.register("concat", Arity::at_least(1), concat);
        registry.register("join_space", Arity::at_least(1), join_space);
        registry.register("trim", Arity::exactly(1), trim);
        registry.register("uppercase", Arity::exactly(1), uppercase);
        registry
    }

    /// Add a function, replacing any function already registered under `name`.
    pub fn register(&mut self, name: &str, arity: Arity, function: TransformFn) -> &mut Self {
        self.operations.insert(name.to_string(), Operation { function, arity });
        self
    }

    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Value of the `n`th referenced column.
fn arg<'a>(row: &'a InputRow, positions: &[usize], n: usize) -> Result<&'a str, OperationError> {
    positions
        .get(n)
        .and_then(|&index| row.get(index))
        .ok_or(OperationError::MissingArgument(n))
}

fn args<'a>(row: &'a InputRow, positions: &[usize]) -> Result<Vec<&'a str>, OperationError> {
    (0..positions.len()).map(|n| arg(row, positions, n)).collect()
}

// =============================================================================
// Built-in functions
// =============================================================================

/// `DD/MM/YYYY` to `DDMMYYYY`, dropping the characters at offsets 2 and 5.
///
/// Separators and digits are not checked: malformed input gives malformed
/// output. Use [`format_date_strict`] to reject bad dates.
pub fn format_date(row: &InputRow, positions: &[usize]) -> OperationResult {
    let chars: Vec<char> = arg(row, positions, 0)?.chars().collect();
    let slice = |start: usize, end: usize| -> String {
        let end = end.min(chars.len());
        chars.get(start..end).map(|c| c.iter().collect()).unwrap_or_default()
    };
    Ok(format!("{}{}{}", slice(0, 2), slice(3, 5), slice(6, chars.len())))
}

/// Like [`format_date`], but the value must be a real date written `DD/MM/YYYY`.
pub fn format_date_strict(row: &InputRow, positions: &[usize]) -> OperationResult {
    let value = arg(row, positions, 0)?;
    let invalid = |reason: &str| OperationError::InvalidValue {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    if !STRICT_DATE.is_match(value) {
        return Err(invalid("expected DD/MM/YYYY"));
    }
    let date =
        NaiveDate::parse_from_str(value, "%d/%m/%Y").map_err(|_| invalid("not a calendar date"))?;
    Ok(date.format("%d%m%Y").to_string())
}

/// Value of the first referenced column.
pub fn first(row: &InputRow, positions: &[usize]) -> OperationResult {
    arg(row, positions, 0).map(str::to_string)
}

/// Referenced values joined with no separator.
pub fn concat(row: &InputRow, positions: &[usize]) -> OperationResult {
    Ok(args(row, positions)?.concat())
}

/// Non-empty referenced values, trimmed, joined with single spaces.
pub fn join_space(row: &InputRow, positions: &[usize]) -> OperationResult {
    let parts: Vec<&str> = args(row, positions)?
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    Ok(parts.join(" "))
}

pub fn trim(row: &InputRow, positions: &[usize]) -> OperationResult {
    arg(row, positions, 0).map(|s| s.trim().to_string())
}

pub fn uppercase(row: &InputRow, positions: &[usize]) -> OperationResult {
    arg(row, positions, 0).map(str::to_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        let row = InputRow::from(["20/07/1983"]);
        assert_eq!(format_date(&row, &[0]).unwrap(), "20071983");
        let row = InputRow::from(["01/02/2013"]);
        assert_eq!(format_date(&row, &[0]).unwrap(), "01022013");
    }

    #[test]
    fn test_format_date_does_not_validate() {
        let row = InputRow::from(["2013-02-01"]);
        assert_eq!(format_date(&row, &[0]).unwrap(), "203-2-01");

        let row = InputRow::from(["1/2"]);
        assert_eq!(format_date(&row, &[0]).unwrap(), "1/");
    }

    #[test]
    fn test_format_date_strict() {
        let row = InputRow::from(["20/07/1983", "31/02/2013", "1/2/2013"]);
        assert_eq!(format_date_strict(&row, &[0]).unwrap(), "20071983");
        assert!(matches!(
            format_date_strict(&row, &[1]),
            Err(OperationError::InvalidValue { .. })
        ));
        assert!(format_date_strict(&row, &[2]).is_err());
    }

    #[test]
    fn test_concat_and_first() {
        let row = InputRow::from(["this", "is", "a", "test"]);
        assert_eq!(concat(&row, &[3, 1]).unwrap(), "testis");
        assert_eq!(first(&row, &[2, 0]).unwrap(), "a");
    }

    #[test]
    fn test_join_space_skips_blanks() {
        let row = InputRow::from([" Mary ", "", "Ann"]);
        assert_eq!(join_space(&row, &[0, 1, 2]).unwrap(), "Mary Ann");
    }

    #[test]
    fn test_missing_argument() {
        let row = InputRow::from(["only"]);
        assert_eq!(first(&row, &[]), Err(OperationError::MissingArgument(0)));
        assert_eq!(concat(&row, &[0, 4]), Err(OperationError::MissingArgument(1)));
    }

    #[test]
    fn test_registry_builtins_and_override() {
        let mut registry = TransformRegistry::new();
        assert!(registry.get("format_date").is_some());
        assert!(registry.get("nope").is_none());

        fn constant(_: &InputRow, _: &[usize]) -> OperationResult {
            Ok("X".to_string())
        }
        registry.register("trim", Arity::exactly(0), constant);
        let op = registry.get("trim").unwrap();
        assert_eq!(op.arity, Arity::exactly(0));
        assert_eq!((op.function)(&InputRow::default(), &[]).unwrap(), "X");
    }

    #[test]
    fn test_arity() {
        assert!(Arity::exactly(1).accepts(1));
        assert!(!Arity::exactly(1).accepts(2));
        assert!(Arity::at_least(1).accepts(5));
        assert!(!Arity::at_least(1).accepts(0));
        assert_eq!(Arity::at_least(1).to_string(), "at least 1");
    }
}

//! A single user filter and its compilation into a row mask.
//!
//! Literal coercion rules:
//! - `=` on an integer column parses the literal as an integer; on any other
//!   column the literal is parsed as that column's native type.
//! - `>`, `>=`, `<=`, `<` always parse the literal as a float, whatever the
//!   column type. Ordering filters are numeric-only; text columns reject them.
//! - `contains` upper-cases both sides and only applies to text columns.
//!
//! Null cells never match.

use crate::dataset::{ColumnKind, Dataset};
use arrow::array::{Array, AsArray, BooleanArray, BooleanBuilder};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Gt,
    Ge,
    Eq,
    Le,
    Lt,
    Contains,
}

impl Operator {
    /// Display order used by operator pickers.
    pub const ALL: [Operator; 6] = [
        Operator::Gt,
        Operator::Ge,
        Operator::Eq,
        Operator::Le,
        Operator::Lt,
        Operator::Contains,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Eq => "=",
            Operator::Le => "<=",
            Operator::Lt => "<",
            Operator::Contains => "contains",
        }
    }

    pub fn is_ordering(self) -> bool {
        matches!(self, Operator::Gt | Operator::Ge | Operator::Le | Operator::Lt)
    }

    pub fn next(self) -> Self {
        let pos = Self::ALL.iter().position(|o| *o == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }

    fn holds(self, ord: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            Operator::Gt => ord == Greater,
            Operator::Ge => ord != Less,
            Operator::Eq => ord == Equal,
            Operator::Le => ord != Greater,
            Operator::Lt => ord == Less,
            Operator::Contains => false,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            "=" | "==" => Ok(Operator::Eq),
            "<=" => Ok(Operator::Le),
            "<" => Ok(Operator::Lt),
            "contains" => Ok(Operator::Contains),
            other => Err(FilterError::Malformed(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("invalid literal '{raw}' for filter `{field} {operator}`")]
    InvalidLiteral {
        field: String,
        operator: Operator,
        raw: String,
    },
    #[error("operator `{operator}` does not apply to {kind} column '{field}'")]
    TypeMismatch {
        field: String,
        operator: Operator,
        kind: ColumnKind,
    },
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("cannot parse filter expression '{0}'")]
    Malformed(String),
    #[error("mask kernel failed: {0}")]
    Kernel(String),
}

/// One user filter. Any unset or blank part leaves the predicate inert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub field: Option<String>,
    pub operator: Option<Operator>,
    pub literal: Option<String>,
}

impl Predicate {
    pub fn new(field: impl Into<String>, operator: Operator, literal: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            operator: Some(operator),
            literal: Some(literal.into()),
        }
    }

    /// The shape a freshly added filter row starts with.
    pub fn blank() -> Self {
        Self {
            field: None,
            operator: Some(Operator::Eq),
            literal: None,
        }
    }

    pub fn is_inert(&self) -> bool {
        let blank = |s: &Option<String>| s.as_deref().map_or(true, str::is_empty);
        blank(&self.field) || self.operator.is_none() || blank(&self.literal)
    }

    /// Resolves column and literal against the dataset schema.
    /// `Ok(None)` means inert.
    pub fn compile(&self, dataset: &Dataset) -> Result<Option<CompiledPredicate>, FilterError> {
        if self.is_inert() {
            return Ok(None);
        }
        let (Some(field), Some(op), Some(raw)) =
            (self.field.as_deref(), self.operator, self.literal.as_deref())
        else {
            return Ok(None);
        };
        let column = dataset
            .column_index(field)
            .ok_or_else(|| FilterError::UnknownColumn(field.to_string()))?;
        let kind = dataset
            .column_kind(field)
            .ok_or_else(|| FilterError::UnknownColumn(field.to_string()))?;
        let condition = coerce(field, op, raw, kind)?;
        Ok(Some(CompiledPredicate { column, condition }))
    }

    /// Mask for this predicate alone; `Ok(None)` when inert.
    pub fn evaluate(&self, dataset: &Dataset) -> Result<Option<BooleanArray>, FilterError> {
        match self.compile(dataset)? {
            Some(compiled) => compiled.mask(dataset.batch()).map(Some),
            None => Ok(None),
        }
    }

    /// Parses `field op literal`, e.g. `gdp per capita >= 1000` or
    /// `country contains "fra"`. Field names may contain spaces.
    pub fn parse_expr(expr: &str) -> Result<Self, FilterError> {
        let caps = re_contains()
            .captures(expr)
            .or_else(|| re_symbolic().captures(expr))
            .ok_or_else(|| FilterError::Malformed(expr.to_string()))?;
        let field = caps["field"].trim().to_string();
        let operator: Operator = caps["op"].parse()?;
        let literal = strip_quotes(caps["lit"].trim());
        Ok(Self::new(field, operator, literal))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field.as_deref().unwrap_or("?");
        let op = self.operator.map_or("?", Operator::symbol);
        let lit = self.literal.as_deref().unwrap_or("?");
        write!(f, "{field} {op} {lit}")
    }
}

static RE_CONTAINS: OnceLock<Regex> = OnceLock::new();
static RE_SYMBOLIC: OnceLock<Regex> = OnceLock::new();

fn re_contains() -> &'static Regex {
    RE_CONTAINS.get_or_init(|| {
        Regex::new(r"^\s*(?P<field>.+?)\s+(?P<op>(?i:contains))\s+(?P<lit>.+?)\s*$").unwrap()
    })
}
fn re_symbolic() -> &'static Regex {
    RE_SYMBOLIC.get_or_init(|| {
        Regex::new(r"^\s*(?P<field>.+?)\s*(?P<op>>=|<=|==|=|>|<)\s*(?P<lit>.+?)\s*$").unwrap()
    })
}

fn strip_quotes(s: &str) -> String {
    if s.len() >= 2
        && ((s.starts_with('\'') && s.ends_with('\'')) || (s.starts_with('"') && s.ends_with('"')))
    {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

/// Literal already coerced to the type it will be compared as.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    IntEq(i64),
    FloatCmp(Operator, f64),
    TextEq(String),
    BoolEq(bool),
    Contains(String), // upper-cased needle
}

fn coerce(field: &str, op: Operator, raw: &str, kind: ColumnKind) -> Result<Condition, FilterError> {
    let invalid = || FilterError::InvalidLiteral {
        field: field.to_string(),
        operator: op,
        raw: raw.to_string(),
    };
    let mismatch = || FilterError::TypeMismatch {
        field: field.to_string(),
        operator: op,
        kind,
    };
    match op {
        Operator::Contains => match kind {
            ColumnKind::Text => Ok(Condition::Contains(raw.to_uppercase())),
            _ => Err(mismatch()),
        },
        Operator::Eq => match kind {
            ColumnKind::Integer => raw.trim().parse::<i64>().map(Condition::IntEq).map_err(|_| invalid()),
            ColumnKind::Float => raw
                .trim()
                .parse::<f64>()
                .map(|v| Condition::FloatCmp(Operator::Eq, v))
                .map_err(|_| invalid()),
            ColumnKind::Text => Ok(Condition::TextEq(raw.to_string())),
            ColumnKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Condition::BoolEq(true)),
                "false" => Ok(Condition::BoolEq(false)),
                _ => Err(invalid()),
            },
            ColumnKind::Other => Err(mismatch()),
        },
        // ordering operators compare as floats regardless of column type
        _ => match kind {
            ColumnKind::Integer | ColumnKind::Float | ColumnKind::Boolean => raw
                .trim()
                .parse::<f64>()
                .map(|v| Condition::FloatCmp(op, v))
                .map_err(|_| invalid()),
            ColumnKind::Text | ColumnKind::Other => Err(mismatch()),
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPredicate {
    pub column: usize,
    pub condition: Condition,
}

impl CompiledPredicate {
    pub fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray, FilterError> {
        let arr = batch.column(self.column);
        let n = arr.len();
        let kernel = |e: arrow::error::ArrowError| FilterError::Kernel(e.to_string());
        let mut b = BooleanBuilder::with_capacity(n);
        match &self.condition {
            Condition::IntEq(cv) => {
                let values = cast(arr, &DataType::Int64).map_err(kernel)?;
                let a = values.as_primitive::<Int64Type>();
                for i in 0..n {
                    b.append_value(a.is_valid(i) && a.value(i) == *cv);
                }
            }
            Condition::FloatCmp(op, cv) => {
                let values = cast(arr, &DataType::Float64).map_err(kernel)?;
                let a = values.as_primitive::<Float64Type>();
                for i in 0..n {
                    if a.is_null(i) {
                        b.append_value(false);
                        continue;
                    }
                    // NaN compares as no match
                    let matched = a.value(i).partial_cmp(cv).is_some_and(|o| op.holds(o));
                    b.append_value(matched);
                }
            }
            Condition::TextEq(sv) => {
                let values = cast(arr, &DataType::Utf8).map_err(kernel)?;
                let a = values.as_string::<i32>();
                for i in 0..n {
                    b.append_value(a.is_valid(i) && a.value(i) == sv.as_str());
                }
            }
            Condition::Contains(needle) => {
                let values = cast(arr, &DataType::Utf8).map_err(kernel)?;
                let a = values.as_string::<i32>();
                for i in 0..n {
                    b.append_value(a.is_valid(i) && a.value(i).to_uppercase().contains(needle.as_str()));
                }
            }
            Condition::BoolEq(bv) => {
                let Some(a) = arr.as_boolean_opt() else {
                    return Err(FilterError::Kernel("expected boolean column".into()));
                };
                for i in 0..n {
                    b.append_value(a.is_valid(i) && a.value(i) == *bv);
                }
            }
        }
        Ok(b.finish())
    }
}

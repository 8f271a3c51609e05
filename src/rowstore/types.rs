//! Row Store Types
//!
//! Request and response shapes shared by every `RowStore` implementation.

use std::cmp::Ordering;
use std::collections::HashMap;

use thiserror::Error;

// == Column Value ==
/// A typed attribute cell as the row store persists it.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Integer(i64),
    Double(f64),
    Boolean(bool),
    String(String),
    Binary(Vec<u8>),
}

impl ColumnValue {
    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnValue::Integer(_) => "integer",
            ColumnValue::Double(_) => "double",
            ColumnValue::Boolean(_) => "boolean",
            ColumnValue::String(_) => "string",
            ColumnValue::Binary(_) => "binary",
        }
    }

    /// Orders two cells of the same type. Cells of different types are incomparable.
    pub fn compare(&self, other: &ColumnValue) -> Option<Ordering> {
        match (self, other) {
            (ColumnValue::Integer(a), ColumnValue::Integer(b)) => Some(a.cmp(b)),
            (ColumnValue::Double(a), ColumnValue::Double(b)) => a.partial_cmp(b),
            (ColumnValue::Boolean(a), ColumnValue::Boolean(b)) => Some(a.cmp(b)),
            (ColumnValue::String(a), ColumnValue::String(b)) => Some(a.cmp(b)),
            (ColumnValue::Binary(a), ColumnValue::Binary(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

// == Primary Key ==
/// Single-column string primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrimaryKey {
    /// Name of the primary key column
    pub column: String,
    /// Key value
    pub value: String,
}

impl PrimaryKey {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

// == Row ==
/// A primary key plus its attribute columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub primary_key: PrimaryKey,
    pub columns: HashMap<String, ColumnValue>,
}

impl Row {
    pub fn new(primary_key: PrimaryKey) -> Self {
        Self {
            primary_key,
            columns: HashMap::new(),
        }
    }

    /// Builder-style column setter.
    pub fn with_column(mut self, name: impl Into<String>, value: ColumnValue) -> Self {
        self.columns.insert(name.into(), value);
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnValue> {
        self.columns.get(name)
    }
}

// == Conditions ==
/// Expectation about the row's existence, checked before any column condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowExistence {
    #[default]
    Ignore,
    ExpectExist,
    ExpectNotExist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterEqual,
    LessThan,
    LessEqual,
}

impl Comparator {
    fn accepts(self, ordering: Option<Ordering>) -> bool {
        match (self, ordering) {
            (Comparator::Equal, Some(o)) => o == Ordering::Equal,
            (Comparator::NotEqual, Some(o)) => o != Ordering::Equal,
            // Values of different types are never equal
            (Comparator::NotEqual, None) => true,
            (Comparator::GreaterThan, Some(o)) => o == Ordering::Greater,
            (Comparator::GreaterEqual, Some(o)) => o != Ordering::Less,
            (Comparator::LessThan, Some(o)) => o == Ordering::Less,
            (Comparator::LessEqual, Some(o)) => o != Ordering::Greater,
            (_, None) => false,
        }
    }
}

/// Server-evaluated predicate over a row's attribute columns.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnCondition {
    Single {
        column: String,
        comparator: Comparator,
        value: ColumnValue,
        /// Outcome when the row or the column is missing
        pass_if_missing: bool,
    },
    And(Vec<ColumnCondition>),
}

impl ColumnCondition {
    pub fn single(
        column: impl Into<String>,
        comparator: Comparator,
        value: ColumnValue,
        pass_if_missing: bool,
    ) -> Self {
        ColumnCondition::Single {
            column: column.into(),
            comparator,
            value,
            pass_if_missing,
        }
    }

    /// Evaluates the predicate against the current row, if any.
    pub fn evaluate(&self, row: Option<&Row>) -> bool {
        match self {
            ColumnCondition::Single {
                column,
                comparator,
                value,
                pass_if_missing,
            } => match row.and_then(|r| r.column(column)) {
                Some(current) => comparator.accepts(current.compare(value)),
                None => *pass_if_missing,
            },
            ColumnCondition::And(conditions) => conditions.iter().all(|c| c.evaluate(row)),
        }
    }
}

/// Full write condition: row existence plus an optional column predicate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Condition {
    pub row_existence: RowExistence,
    pub column_condition: Option<ColumnCondition>,
}

impl Condition {
    /// No expectation at all; the write always applies.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(row_existence: RowExistence, column_condition: Option<ColumnCondition>) -> Self {
        Self {
            row_existence,
            column_condition,
        }
    }

    /// Evaluates existence first, then the column predicate.
    pub fn evaluate(&self, row: Option<&Row>) -> bool {
        let existence_ok = match self.row_existence {
            RowExistence::Ignore => true,
            RowExistence::ExpectExist => row.is_some(),
            RowExistence::ExpectNotExist => row.is_none(),
        };

        existence_ok
            && self
                .column_condition
                .as_ref()
                .map_or(true, |condition| condition.evaluate(row))
    }
}

// == Updates ==
/// One column mutation inside an `update_row` call.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnUpdate {
    Put(String, ColumnValue),
    Delete(String),
}

// == Outcomes ==
/// Result of a conditional single-row write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    /// The row's condition did not hold; nothing was written
    ConditionFailed,
}

impl WriteOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, WriteOutcome::Applied)
    }
}

/// Per-row result of a batch write.
#[derive(Debug, Clone, PartialEq)]
pub struct RowResult {
    pub primary_key: PrimaryKey,
    pub outcome: std::result::Result<WriteOutcome, RowStoreError>,
}

// == Row Store Error ==
/// Failures reported by the row store other than a failed condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowStoreError {
    /// The table does not exist
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// The store could not be reached
    #[error("Row store unavailable: {0}")]
    Unavailable(String),

    /// Any other error code returned by the store
    #[error("Row store error [{code}]: {message}")]
    Backend { code: String, message: String },
}

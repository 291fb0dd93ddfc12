//! The in-memory transaction table for one customer and one billing period.

use crate::model::{format_amount, CellValue, ColumnMap};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// One transaction record. Cells are keyed by lowercased column name; the transaction date is
/// derived once at insert time so that sorting does not re-parse text dates.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    date: Option<NaiveDateTime>,
    cells: BTreeMap<String, CellValue>,
}

impl TransactionRow {
    /// The parsed transaction date, if the date cell held one.
    pub fn date(&self) -> Option<NaiveDateTime> {
        self.date
    }

    pub fn cell(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(&column.to_lowercase())
    }

    /// The textual value of a column, or the empty string when the column is absent.
    pub fn text(&self, column: &str) -> String {
        self.cell(column).map(CellValue::to_text).unwrap_or_default()
    }

    /// The numeric value of a column, if it is present and has a numeric reading.
    pub fn decimal(&self, column: &str) -> Option<Decimal> {
        self.cell(column).and_then(CellValue::as_decimal)
    }
}

/// All transactions assembled for one customer, in statement order once
/// [`TransactionTable::sort_by_date`] has run.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionTable {
    columns: ColumnMap,
    rows: Vec<TransactionRow>,
}

impl TransactionTable {
    pub fn new(columns: ColumnMap) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    pub fn rows(&self) -> &[TransactionRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Adds a row. Column names are lowercased so that lookups are case-insensitive across
    /// data files that disagree on casing.
    pub fn push(&mut self, cells: BTreeMap<String, CellValue>) {
        let cells: BTreeMap<String, CellValue> = cells
            .into_iter()
            .map(|(name, value)| (name.to_lowercase(), value))
            .collect();
        let date = cells
            .get(&self.columns.date().to_lowercase())
            .and_then(CellValue::as_timestamp);
        self.rows.push(TransactionRow { date, cells });
    }

    /// Sorts rows by transaction date. The sort is stable and rows without a parseable date
    /// order before dated rows, so reruns over the same data produce identical statements.
    pub fn sort_by_date(&mut self) {
        self.rows.sort_by_key(|row| row.date());
    }

    /// Totals for the summary block. Non-numeric or missing amounts count as zero. The
    /// closing balance is the balance cell of the final row in statement order.
    pub fn summary(&self) -> StatementSummary {
        let mut total_credits = Decimal::ZERO;
        let mut total_debits = Decimal::ZERO;
        for row in &self.rows {
            let amount = row.decimal(self.columns.amount()).unwrap_or_default();
            if amount >= Decimal::ZERO {
                total_credits += amount;
            } else {
                total_debits += amount.abs();
            }
        }
        let closing_balance = self
            .rows
            .last()
            .and_then(|row| row.decimal(self.columns.balance()))
            .unwrap_or_default();
        StatementSummary {
            total_credits,
            total_debits,
            closing_balance,
        }
    }
}

/// The totals printed in the statement's summary block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementSummary {
    total_credits: Decimal,
    total_debits: Decimal,
    closing_balance: Decimal,
}

impl StatementSummary {
    pub fn total_credits(&self) -> Decimal {
        self.total_credits
    }

    pub fn total_debits(&self) -> Decimal {
        self.total_debits
    }

    pub fn closing_balance(&self) -> Decimal {
        self.closing_balance
    }

    pub fn lines(&self) -> [String; 3] {
        [
            format!("Total Credits: {}", format_amount(self.total_credits)),
            format!("Total Debits: {}", format_amount(self.total_debits)),
            format!("Closing Balance: {}", format_amount(self.closing_balance)),
        ]
    }
}

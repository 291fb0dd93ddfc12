//! Customer contact and account details pulled from transaction data.

use crate::model::TransactionTable;

/// Customer details used for the statement header, the PDF password and the email envelope.
/// The source data repeats these on every row; the first row of the assembled table wins,
/// so rows that disagree are resolved by statement order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerMetadata {
    name: String,
    email: String,
    phone: String,
    account: String,
}

impl CustomerMetadata {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        account: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            account: account.into(),
        }
    }

    /// Reads metadata from the first row of the table. Missing columns become empty strings;
    /// downstream code decides what to do with those (password fallback, skipped email).
    pub fn from_table(table: &TransactionTable) -> Self {
        let columns = table.columns();
        match table.rows().first() {
            Some(row) => Self {
                name: row.text(columns.name()),
                email: row.text(columns.email()),
                phone: row.text(columns.phone()),
                account: row.text(columns.account()),
            },
            None => Self::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn account(&self) -> &str {
        &self.account
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, ColumnMap};
    use std::collections::BTreeMap;

    fn row(name: &str, phone: CellValue) -> BTreeMap<String, CellValue> {
        let mut cells = BTreeMap::new();
        cells.insert(
            "first_name".to_string(),
            CellValue::Text(name.to_string()),
        );
        cells.insert(
            "email_id".to_string(),
            CellValue::Text(format!("{}@example.com", name.to_lowercase())),
        );
        cells.insert("phone_no".to_string(), phone);
        cells.insert(
            "account_id".to_string(),
            CellValue::Text("ACC-77".to_string()),
        );
        cells
    }

    #[test]
    fn test_first_row_wins() {
        let mut table = TransactionTable::new(ColumnMap::default());
        table.push(row("Priya", CellValue::Text("1234567890".to_string())));
        table.push(row("Someone", CellValue::Text("0000000000".to_string())));
        let metadata = CustomerMetadata::from_table(&table);
        assert_eq!("Priya", metadata.name());
        assert_eq!("priya@example.com", metadata.email());
        assert_eq!("1234567890", metadata.phone());
        assert_eq!("ACC-77", metadata.account());
    }

    #[test]
    fn test_missing_columns_are_empty() {
        let mut table = TransactionTable::new(ColumnMap::default());
        table.push(BTreeMap::new());
        let metadata = CustomerMetadata::from_table(&table);
        assert_eq!("", metadata.name());
        assert_eq!("", metadata.email());
    }

    #[test]
    fn test_numeric_phone_becomes_digits() {
        let mut table = TransactionTable::new(ColumnMap::default());
        table.push(row("Priya", CellValue::Int(1234567890)));
        let metadata = CustomerMetadata::from_table(&table);
        assert_eq!("1234567890", metadata.phone());
    }

    #[test]
    fn test_empty_table_yields_defaults() {
        let table = TransactionTable::new(ColumnMap::default());
        let metadata = CustomerMetadata::from_table(&table);
        assert_eq!(CustomerMetadata::default(), metadata);
    }
}

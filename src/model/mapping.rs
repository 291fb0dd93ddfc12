//! Maps the logical fields the pipeline needs onto the column names found in the source data.

use serde::{Deserialize, Serialize};

/// The source column name for each logical field. Deserialized from the `columns` section of
/// the config file; any field left out keeps its default. Matching against row data is
/// case-insensitive because column names are lowercased at read time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ColumnMap {
    customer_id: String,
    name: String,
    email: String,
    phone: String,
    account: String,
    date: String,
    description: String,
    amount: String,
    balance: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            customer_id: "customer_id".to_string(),
            name: "first_name".to_string(),
            email: "email_id".to_string(),
            phone: "phone_no".to_string(),
            account: "account_id".to_string(),
            date: "transaction_date".to_string(),
            description: "description".to_string(),
            amount: "amount".to_string(),
            balance: "availablebalance".to_string(),
        }
    }
}

impl ColumnMap {
    pub fn customer_id(&self) -> &str {
        &self.customer_id
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

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn balance(&self) -> &str {
        &self.balance
    }
}

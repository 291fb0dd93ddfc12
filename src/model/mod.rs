//! Types that represent the core data model, such as `TransactionTable` and `Period`.
mod cell;
mod mapping;
mod metadata;
mod money;
mod period;
mod table;

pub use cell::CellValue;
pub use mapping::ColumnMap;
pub use metadata::CustomerMetadata;
pub use money::format_amount;
pub use period::{Period, PeriodParseError};
pub use table::{StatementSummary, TransactionRow, TransactionTable};

mod aggregate;
pub mod args;
mod aws;
mod config;
mod distribute;
mod error;
pub mod mail;
pub mod model;
mod protect;
mod reader;
mod records;
mod render;
pub mod run;
pub mod store;

pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use error::StageError;
pub use model::Period;
pub use store::Mode;

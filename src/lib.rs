//! Monthly export of federation ratings to Swiss Perfect (`.dbf`) and Swiss
//! Manager (`.txt`) player lists, one zip per rating variant.

pub mod archive;
pub mod config;
pub mod database_ops;
pub mod error;
pub mod export;
pub mod formats;
pub mod logging;
pub mod merge;
pub mod model;

pub mod util {
    pub mod db;
    pub mod env;
}

pub use error::{ExportError, Result};
pub use export::{run, ExportOptions, ExportSummary};

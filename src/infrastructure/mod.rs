pub mod config;
pub mod oracle;
pub mod progress;
pub mod spreadsheet;
pub mod storage;

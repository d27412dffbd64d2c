pub mod aggregation;
pub mod clock;
pub mod config;
pub mod format;
pub mod intake;
pub mod models;
pub mod oracle;
pub mod storage;
pub mod telegram;

pub mod calendar;
pub mod columns;
pub mod config;
pub mod detection;
pub mod error;
pub mod output;
pub mod parser;

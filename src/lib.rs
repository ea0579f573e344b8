pub mod app;
pub mod chain;
pub mod classifier;
pub mod config;
pub mod copier;
pub mod correspondence;
pub mod domain;
pub mod error;
pub mod fs_util;
pub mod merge;
pub mod output;
pub mod scanner;
pub mod store;

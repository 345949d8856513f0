pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod http;
pub mod infrastructure;
pub mod ml;
pub mod serving;
pub mod store;
pub mod tasks;

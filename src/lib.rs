pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod map;
pub mod model;
pub mod output;
pub mod query;
pub mod runner;
pub mod store;
pub mod utils;

#[cfg(test)]
mod tests;

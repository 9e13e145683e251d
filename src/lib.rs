pub mod bot;
pub mod config;
pub mod lookup;
pub mod models;
pub mod notify;
pub mod report;
pub mod startup;
pub mod sweep;
pub mod telegram;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

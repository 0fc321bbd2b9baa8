pub mod journal;
pub mod query;
pub mod settings;
pub mod stats;
pub mod trade;
pub mod user;

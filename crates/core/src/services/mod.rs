pub mod pnl_service;
pub mod query_service;
pub mod stats_service;
pub mod validation_service;

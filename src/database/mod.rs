pub mod connection;
pub mod matches;
pub mod position_points;
pub mod rules;
pub mod season_rankings;
pub mod settings;
pub mod setup;
pub mod stats;
pub mod thresholds;
pub mod tournaments;

pub use connection::{create_memory_pool, create_pool, get_connection, DbConn, DbPool};

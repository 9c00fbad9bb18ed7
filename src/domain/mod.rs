pub mod breakdown;
pub mod models;
pub mod rules;
pub mod settings;

pub use breakdown::{BonusBreakdown, BonusCategory};
pub use models::*;
pub use rules::*;
pub use settings::*;

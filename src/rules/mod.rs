pub mod classifier;
pub mod rule_model;
pub mod store;

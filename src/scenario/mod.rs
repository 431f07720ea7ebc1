pub mod driver;
pub mod scenario_model;

pub mod builder;
pub mod generated;
pub mod query;

pub mod backend;
pub mod css_model;

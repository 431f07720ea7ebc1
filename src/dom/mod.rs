pub mod dom_model;
pub mod html;
pub mod live;
pub mod style;

pub mod render;
pub mod serializer;

pub mod matcher;
pub mod synonyms;

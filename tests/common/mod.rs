// Each test binary compiles this module separately and uses its own
// subset of the fixtures.
#![allow(dead_code)]

pub mod pages;

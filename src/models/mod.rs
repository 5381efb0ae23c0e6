pub mod common;
pub mod data;
pub mod domain;
pub mod reply;

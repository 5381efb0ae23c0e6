pub mod birthday;
pub mod hello;

pub mod birthday_database;
pub mod birthday_store;

pub mod connections;
pub mod reports;
pub mod schema;

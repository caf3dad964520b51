// The study engine and its persistence live in the library so integration
// tests can drive them; the terminal front end is in main.rs.
pub mod config;
pub mod deck;
pub mod session;
pub mod store;

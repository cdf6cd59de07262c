pub mod auth;
pub mod practitioners;

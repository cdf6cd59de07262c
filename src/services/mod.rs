pub mod practitioner_service;
pub mod profile_service;
pub mod session_service;

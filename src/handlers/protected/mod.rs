pub mod agora;
pub mod presence;
pub mod profile;
pub mod sessions;
pub mod upload;

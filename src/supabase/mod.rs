//! Clients for the hosted backend services: the identity provider, the
//! database's REST query interface, and file storage. All three share one
//! `reqwest` client and are constructed once at startup.

pub mod error;
pub mod identity;
pub mod storage;
pub mod table;

pub use error::SupabaseError;
pub use identity::{Identity, IdentityError, IdentityUser, TokenGrant};
pub use storage::{SignedUpload, Storage};
pub use table::{Database, TableQuery};

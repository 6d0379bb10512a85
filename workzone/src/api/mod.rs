pub mod client;
pub mod common;
pub mod error;
pub mod transport;
pub mod users;
pub mod workzone;

#[cfg(test)]
pub mod test_helpers;

pub use client::{Client, ClientConfig};
pub use error::ApiError;
pub use transport::{ApiResponse, Transport};
pub use users::{UnresolvedUsers, User, UserResolver, UsersApi};
pub use workzone::{PolicyApi, WorkzonePolicy};

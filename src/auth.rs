//! Session identifiers, provider identifiers, secrets, and token models.

pub mod id;
pub mod secret;
pub mod token;

pub use id::*;
pub use secret::*;
pub use token::*;

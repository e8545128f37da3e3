//! Data models shared between the API surface, the store, and the presentation engine.

mod movie;
mod review;
mod user;

pub use movie::*;
pub use review::*;
pub use user::*;

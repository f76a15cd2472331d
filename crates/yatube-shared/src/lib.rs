//! # Yatube Shared
//!
//! Wire types shared by the server and whatever renders its output.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, Rendered};

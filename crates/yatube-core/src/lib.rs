//! # Yatube Core
//!
//! The domain layer of Yatube.
//! Entities, ports, pagination and form validation with zero infrastructure
//! dependencies.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;

pub use error::{DomainError, RepoError};
pub use forms::{FieldErrors, PostForm, ValidatedPost};
pub use pagination::{PAGE_SIZE, Page, PageWindow, paginate};

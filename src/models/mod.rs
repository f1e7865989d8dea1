//! Data models for the LMS

pub mod book;
pub mod request;
pub mod section;
pub mod user;

// Re-export commonly used types
pub use book::{Book, SectionBooks};
pub use request::{RequestDetails, RequestState, UserBook, UserRequest};
pub use section::Section;
pub use user::{Librarian, Role, SessionClaims, User};

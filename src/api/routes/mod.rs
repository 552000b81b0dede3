//! API Routes
//!
//! Route handlers organized by functionality.

pub mod export;
pub mod extract;
pub mod health;
pub mod records;
pub mod share;
pub mod summary;

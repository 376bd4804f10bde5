//! Background Tasks Module
//!
//! Contains background tasks that run during server operation.
//!
//! # Tasks
//! - Expiry: reaps expired cache entries as their deadlines fall due

mod expiry;

pub use expiry::spawn_expiry_task;

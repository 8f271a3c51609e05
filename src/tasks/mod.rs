//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expired-row sweep: physically deletes rows whose expiration has passed,
//!   standing in for the garbage collection a hosted row store performs

mod sweep;

pub use sweep::spawn_sweep_task;

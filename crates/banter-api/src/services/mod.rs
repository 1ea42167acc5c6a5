//! Background services for the API server.

pub mod stall_sweeper;

pub use stall_sweeper::{StallSweeper, STALL_ERROR_MESSAGE};

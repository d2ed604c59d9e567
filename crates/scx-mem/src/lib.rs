//! Memory management for the `scx` interpreter.
//!
//! - **Arena**: a fixed-capacity region (at most 65535 bytes) that accounts
//!   for the parsed program text and hosts refcounted runtime objects, with
//!   first-fit reuse of freed slots through a free-list table
//! - **Handles**: generation-checked references into the arena
//!

pub mod arena;

pub use arena::{
    Arena, ArenaError, ArenaStats, Exhaustion, FREE_SLOT_SIZE, HEADER_SIZE,
    Handle, MAX_CAPACITY,
};

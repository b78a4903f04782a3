//! Worked problem domains built on the core abstractions.

mod frog_escape;
mod snakes_ladders;

pub use frog_escape::{Croak, Pad, frog_escape};
pub use snakes_ladders::{Square, classic_jumps, snakes_and_ladders};

//! Pure tic-tac-toe logic for XOXO Arena.
//!
//! - [`Board`]: immutable 3x3 board with a nine-character encoding
//! - [`rules`]: win and draw detection
//! - [`opponent`]: the greedy computer opponent
//!
//! Nothing here performs I/O or holds shared state; the match controllers
//! in `xoxo_arena` build on these values.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod codec;
mod outcome;
mod position;
mod types;

pub mod opponent;
pub mod rules;

pub use action::MoveError;
pub use codec::{DecodeError, EMPTY_SYMBOL};
pub use outcome::{Outcome, WinResult};
pub use position::Position;
pub use rules::{evaluate, is_draw, is_full};
pub use types::{Board, Player, Square};

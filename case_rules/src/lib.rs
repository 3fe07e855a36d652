//! # Case Rules
//!
//! The "Case File" crate - contains the cast, the crime scenario, transcripts and the
//! rules of the game. This crate is the single source of truth for game state and does
//! not contain any AI logic or I/O.

pub mod entities;
pub mod error;
pub mod rules;
pub mod scenario;
pub mod state;
pub mod transcript;

pub use entities::*;
pub use error::*;
pub use rules::*;
pub use scenario::*;
pub use state::*;
pub use transcript::*;

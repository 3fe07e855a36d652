//! # Mystery Core
//!
//! The AI side of the murder mystery. This crate drives `case_rules` through a game:
//! it generates the case, speaks for the characters, lets a detective assistant ask
//! questions and keeps sessions on disk.
//!
//! ## Core Components
//!
//! - **backend**: The generation backend port, an OpenAI-compatible client and a timeout wrapper
//! - **prompt_assembler**: Builds every prompt from visible facts and transcripts
//! - **generator**: One-shot case generation (cast, story, narration)
//! - **dialogue**: Character answers and the detective assistant
//! - **session**: The command surface used by the presentation layer
//! - **snapshot**: Versioned session persistence
//!
//! ## Design Philosophy
//!
//! - **Rules First**: Every state change goes through `case_rules`; this crate only supplies generated text
//! - **Commit Last**: Commands await the backend before touching state, so failures change nothing
//! - **Sealed Solution**: The solution never reaches a prompt or the presentation layer before the end

pub mod backend;
pub mod dialogue;
pub mod generator;
pub mod prompt_assembler;
pub mod session;
pub mod snapshot;

pub use backend::*;
pub use dialogue::*;
pub use generator::*;
pub use prompt_assembler::*;
pub use session::*;
pub use snapshot::*;

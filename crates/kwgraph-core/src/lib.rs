//! kwgraph Core Library
//!
//! Settings, domain models and text utilities shared by every kwgraph crate.

pub mod config;
pub mod error;
pub mod model;
pub mod text;

pub use config::Settings;
pub use error::{KwError, KwResult};
pub use model::{EntityType, ExtractedKeyword, IAB_CATEGORIES};

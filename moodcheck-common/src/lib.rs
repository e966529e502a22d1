//! # Moodcheck Common Library
//!
//! Shared code for the moodcheck services including:
//! - Emotion data model (labels, icons, display colors)
//! - Canvas flattening (RGBA over white, JPEG encoding)
//! - Configuration loading (Firebase credentials)
//! - Common error types

pub mod config;
pub mod error;
pub mod image;
pub mod model;

pub use error::{Error, Result};
pub use model::{Emotion, EmotionRecord, NewEmotionRecord};

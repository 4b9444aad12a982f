//! Domain models

pub mod media;
pub mod member;

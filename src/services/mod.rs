//! Business logic services

pub mod fines;
pub mod library;
pub mod members;

//! Command implementations for the hookbus CLI

pub mod check;
pub mod serve;

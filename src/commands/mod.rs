//! CLI commands

pub mod check;
pub mod list;
pub mod new;
pub mod series;
pub mod show;

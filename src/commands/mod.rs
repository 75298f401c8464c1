//! CLI commands

pub mod build;
pub mod category;
pub mod list;
pub mod new;
pub mod publish;

//! Helper functions shared by views and the admin server

mod date;
mod url;

pub use date::*;
pub use url::*;

//! Configuration module

mod site;

pub use site::NavItem;
pub use site::SiteConfig;
pub use site::CONFIG_FILE;

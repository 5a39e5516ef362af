//! Resource naming and location
//!
//! Maps the closed set of dashboard data files to the place they are served from.

pub mod locator;
pub mod name;

pub use locator::{DataSource, InvalidSource, Location, ResourceLocator, DEFAULT_BASE_PATH};
pub use name::{ResourceName, UnknownResource};

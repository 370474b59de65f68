pub mod config;
pub mod error;
pub mod link;
pub mod rfc3339;
pub mod stac;

pub use config::Settings;
pub use error::ConvertError;
pub use link::*;
pub use stac::*;

mod config;
mod resolution;

pub use config::Config;
pub use resolution::Resolution;

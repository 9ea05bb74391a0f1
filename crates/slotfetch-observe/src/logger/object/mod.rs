mod format;
mod level;

pub use format::LoggerFormat;
pub use level::LoggerLevel;

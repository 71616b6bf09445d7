pub use stockpile_logging::init;
pub use stockpile_logging::LoggingError;

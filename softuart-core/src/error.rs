//! Crate-level error type

use crate::config::ConfigError;
use crate::persist::PersistError;
use crate::sink::SinkError;
use crate::source::SourceError;

/// Any error raised by the serial port facade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Port setup rejected
    Config(ConfigError),
    /// Write source rejected
    Source(SourceError),
    /// Settings could not be saved or restored
    Persist(PersistError),
    /// Write cut short by the output
    Sink(SinkError),
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<SourceError> for Error {
    fn from(e: SourceError) -> Self {
        Error::Source(e)
    }
}

impl From<PersistError> for Error {
    fn from(e: PersistError) -> Self {
        Error::Persist(e)
    }
}

impl From<SinkError> for Error {
    fn from(e: SinkError) -> Self {
        Error::Sink(e)
    }
}

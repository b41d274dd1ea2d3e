//! Port settings persistence
//!
//! The registry is stored as one postcard record under
//! [`StorageKey::PortSettings`]. Only the raw settings are written; frame
//! configurations are derived again, and validated again, on load.

use heapless::Vec;
use softuart_hal::{FlashError, FlashStorage, PortId, StorageKey};

use crate::config::{ConfigError, PortRegistry, PortSettings, MAX_PORTS};

/// Buffer size for one encoded registry
pub const SETTINGS_BUFFER_SIZE: usize = 512;

/// Errors from saving or loading port settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistError {
    /// Registry did not fit the buffer
    Encode,
    /// Stored record is not a registry
    Decode,
    /// Stored settings failed validation
    Invalid(ConfigError),
    /// Flash access failed
    Flash(FlashError),
}

impl From<FlashError> for PersistError {
    fn from(e: FlashError) -> Self {
        PersistError::Flash(e)
    }
}

/// Serialize a registry into `buf`, returning the used length
pub fn encode(registry: &PortRegistry, buf: &mut [u8]) -> Result<usize, PersistError> {
    let mut entries: Vec<(PortId, &PortSettings), MAX_PORTS> = Vec::new();
    for entry in registry.iter() {
        entries.push(entry).map_err(|_| PersistError::Encode)?;
    }

    postcard::to_slice(&entries, buf)
        .map(|used| used.len())
        .map_err(|_| PersistError::Encode)
}

/// Rebuild a registry from an encoded record
pub fn decode(bytes: &[u8]) -> Result<PortRegistry, PersistError> {
    let entries: Vec<(PortId, PortSettings), MAX_PORTS> =
        postcard::from_bytes(bytes).map_err(|_| PersistError::Decode)?;
    PortRegistry::from_settings(entries).map_err(PersistError::Invalid)
}

/// Write the registry to flash
pub async fn save<F: FlashStorage>(registry: &PortRegistry, flash: &mut F) -> Result<(), PersistError> {
    let mut buf = [0u8; SETTINGS_BUFFER_SIZE];
    let len = encode(registry, &mut buf)?;
    flash.write(StorageKey::PortSettings, &buf[..len]).await?;
    debug!("saved {} ports ({} bytes)", registry.len(), len);
    Ok(())
}

/// Read the registry from flash
///
/// Returns `None` if nothing has been saved yet.
pub async fn load<F: FlashStorage>(flash: &mut F) -> Result<Option<PortRegistry>, PersistError> {
    let mut buf = [0u8; SETTINGS_BUFFER_SIZE];
    let len = match flash.read(StorageKey::PortSettings, &mut buf).await {
        Ok(len) => len,
        Err(FlashError::NotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    match decode(&buf[..len]) {
        Ok(registry) => {
            debug!("loaded {} ports", registry.len());
            Ok(Some(registry))
        }
        Err(e) => {
            warn!("stored port settings rejected: {:?}", e);
            Err(e)
        }
    }
}

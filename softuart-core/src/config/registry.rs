//! Per-port configuration registry
//!
//! Maps each port to the settings it was last configured with and the
//! validated frame derived from them. Port setup is the only writer; the
//! sink selector and encoder only read.

use heapless::FnvIndexMap;
use serde::{Deserialize, Serialize};
use softuart_hal::PortId;

use super::frame::{validate_baud_rate, ConfigError, FrameConfig, DEFAULT_BAUD_RATE};
use super::options::SerialOptions;

/// Maximum number of configured ports (power of two)
pub const MAX_PORTS: usize = 8;

/// Settings persisted for a port and replayed after a restart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortSettings {
    /// Last accepted baud rate
    pub baud_rate: u32,
    /// Last options structure, as given
    pub options: Option<SerialOptions>,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            options: None,
        }
    }
}

#[derive(Debug, Clone)]
struct PortEntry {
    settings: PortSettings,
    frame: FrameConfig,
}

/// Configuration registry
#[derive(Debug, Clone, Default)]
pub struct PortRegistry {
    ports: FnvIndexMap<PortId, PortEntry, MAX_PORTS>,
}

impl PortRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure a port
    ///
    /// A missing `baud_rate` keeps the port's current rate, and missing
    /// `options` keep its current options; present options replace the
    /// stored ones as a whole. On error nothing changes.
    pub fn configure(
        &mut self,
        port: PortId,
        baud_rate: Option<u32>,
        options: Option<&SerialOptions>,
    ) -> Result<FrameConfig, ConfigError> {
        let previous = self
            .ports
            .get(&port)
            .map(|entry| entry.settings.clone())
            .unwrap_or_default();

        let settings = PortSettings {
            baud_rate: match baud_rate {
                Some(baud) => validate_baud_rate(baud)?,
                None => previous.baud_rate,
            },
            options: match options {
                Some(options) => Some(options.clone()),
                None => previous.options,
            },
        };

        self.insert(port, settings)
    }

    /// Validate and store settings for a port
    fn insert(&mut self, port: PortId, settings: PortSettings) -> Result<FrameConfig, ConfigError> {
        let frame = FrameConfig::from_settings(settings.baud_rate, settings.options.as_ref())?;
        self.ports
            .insert(port, PortEntry { settings, frame })
            .map_err(|_| ConfigError::TooManyPorts)?;
        Ok(frame)
    }

    /// Rebuild a registry from persisted settings
    ///
    /// Every entry is validated again, so a corrupted or outdated record
    /// is rejected instead of producing a bad waveform.
    pub fn from_settings<I>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (PortId, PortSettings)>,
    {
        let mut registry = Self::new();
        for (port, settings) in entries {
            registry.insert(port, settings)?;
        }
        Ok(registry)
    }

    /// Frame configuration of a port, or the defaults if never configured
    pub fn frame_config(&self, port: PortId) -> FrameConfig {
        self.ports
            .get(&port)
            .map(|entry| entry.frame)
            .unwrap_or_default()
    }

    /// Stored settings of a port
    pub fn settings(&self, port: PortId) -> Option<&PortSettings> {
        self.ports.get(&port).map(|entry| &entry.settings)
    }

    /// Check if a port has been configured
    pub fn contains(&self, port: PortId) -> bool {
        self.ports.contains_key(&port)
    }

    /// Iterate over configured ports and their settings
    pub fn iter(&self) -> impl Iterator<Item = (PortId, &PortSettings)> + '_ {
        self.ports.iter().map(|(port, entry)| (*port, &entry.settings))
    }

    /// Number of configured ports
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Check if no port has been configured
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FlowArg, ParityArg};
    use softuart_hal::{Parity, Pin};

    fn full_options() -> SerialOptions {
        SerialOptions {
            tx: Some(Pin(2)),
            rx: Some(Pin(3)),
            parity: Some(ParityArg::name("odd")),
            stopbits: Some(2),
            ..SerialOptions::default()
        }
    }

    #[test]
    fn test_unconfigured_port_defaults() {
        let registry = PortRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.frame_config(PortId::Software(0)), FrameConfig::default());
        assert!(registry.settings(PortId::Software(0)).is_none());
    }

    #[test]
    fn test_configure_is_idempotent() {
        let mut registry = PortRegistry::new();
        let port = PortId::Software(1);
        let first = registry.configure(port, Some(19_200), Some(&full_options())).unwrap();
        let second = registry.configure(port, Some(19_200), Some(&full_options())).unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_baud_only_keeps_options() {
        let mut registry = PortRegistry::new();
        let port = PortId::Software(1);
        registry.configure(port, Some(19_200), Some(&full_options())).unwrap();

        let config = registry.configure(port, Some(57_600), None).unwrap();

        assert_eq!(config.baud_rate, 57_600);
        assert_eq!(config.tx, Some(Pin(2)));
        assert_eq!(config.rx, Some(Pin(3)));
        assert_eq!(config.parity, Parity::Odd);
        assert_eq!(config.stop_bits, 2);
        assert_eq!(registry.settings(port).unwrap().options, Some(full_options()));
    }

    #[test]
    fn test_options_only_keeps_baud() {
        let mut registry = PortRegistry::new();
        let port = PortId::Software(1);
        registry.configure(port, Some(4800), None).unwrap();

        let config = registry.configure(port, None, Some(&SerialOptions::with_tx(Pin(9)))).unwrap();

        assert_eq!(config.baud_rate, 4800);
        assert_eq!(config.tx, Some(Pin(9)));
    }

    #[test]
    fn test_options_replace_wholesale() {
        let mut registry = PortRegistry::new();
        let port = PortId::Software(1);
        registry.configure(port, None, Some(&full_options())).unwrap();

        let config = registry.configure(port, None, Some(&SerialOptions::with_tx(Pin(9)))).unwrap();

        assert_eq!(config.rx, None);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, 1);
    }

    #[test]
    fn test_invalid_baud_leaves_previous() {
        let mut registry = PortRegistry::new();
        let port = PortId::Software(1);
        registry.configure(port, Some(38_400), Some(&full_options())).unwrap();

        assert_eq!(
            registry.configure(port, Some(50), None),
            Err(ConfigError::InvalidBaudRate(50))
        );
        assert_eq!(
            registry.configure(port, Some(20_000_000), None),
            Err(ConfigError::InvalidBaudRate(20_000_000))
        );
        assert_eq!(registry.frame_config(port).baud_rate, 38_400);
    }

    #[test]
    fn test_invalid_options_leave_previous() {
        let mut registry = PortRegistry::new();
        let port = PortId::Software(1);
        registry.configure(port, Some(38_400), Some(&full_options())).unwrap();

        let bad_parity = SerialOptions {
            parity: Some(ParityArg::Code(7)),
            ..SerialOptions::default()
        };
        assert_eq!(
            registry.configure(port, Some(9600), Some(&bad_parity)),
            Err(ConfigError::InvalidParity)
        );

        let bad_flow = SerialOptions {
            flow: Some(FlowArg::name("rts")),
            ..SerialOptions::default()
        };
        assert_eq!(
            registry.configure(port, None, Some(&bad_flow)),
            Err(ConfigError::InvalidFlowControl)
        );

        let config = registry.frame_config(port);
        assert_eq!(config.baud_rate, 38_400);
        assert_eq!(config.tx, Some(Pin(2)));
    }

    #[test]
    fn test_registry_full() {
        let mut registry = PortRegistry::new();
        for n in 0..MAX_PORTS as u8 {
            registry.configure(PortId::Software(n), None, None).unwrap();
        }
        assert_eq!(
            registry.configure(PortId::Software(99), None, None),
            Err(ConfigError::TooManyPorts)
        );
        // Existing ports can still be reconfigured
        assert!(registry.configure(PortId::Software(0), Some(1200), None).is_ok());
    }

    #[test]
    fn test_from_settings_validates() {
        let good = PortSettings {
            baud_rate: 2400,
            options: Some(full_options()),
        };
        let registry = PortRegistry::from_settings([(PortId::Serial(1), good.clone())]).unwrap();
        assert_eq!(registry.settings(PortId::Serial(1)), Some(&good));
        assert_eq!(registry.frame_config(PortId::Serial(1)).baud_rate, 2400);

        let bad = PortSettings {
            baud_rate: 7,
            options: None,
        };
        assert_eq!(
            PortRegistry::from_settings([(PortId::Serial(1), bad)]).map(|r| r.len()),
            Err(ConfigError::InvalidBaudRate(7))
        );
    }
}

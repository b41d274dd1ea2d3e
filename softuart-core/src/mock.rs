//! Host-side platform mocks shared by the unit tests

use std::vec::Vec;

use softuart_hal::{
    Clock, FlashError, FlashStorage, HardwareUart, Instant, Level, Pin, PinDriver, PinScheduler,
    PortId, StorageKey, UartConfig,
};

use crate::encoder::EdgeEvent;

/// Records scheduled edges and immediate pin writes
#[derive(Debug, Default)]
pub struct RecordingPins {
    pub edges: Vec<EdgeEvent>,
    pub driven: Vec<(Pin, Level)>,
}

impl RecordingPins {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PinScheduler for RecordingPins {
    fn schedule_pin_output(&mut self, at: Instant, pin: Pin, level: Level) {
        self.edges.push(EdgeEvent { pin, at, level });
    }
}

impl PinDriver for RecordingPins {
    fn drive(&mut self, pin: Pin, level: Level) {
        self.driven.push((pin, level));
    }
}

/// Clock frozen at a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Instant);

impl Clock for FixedClock {
    fn now(&self) -> Instant {
        self.0
    }
}

/// UART with hardware on a fixed set of ports
#[derive(Debug, Default)]
pub struct MockUart {
    pub ports: Vec<PortId>,
    pub configured: Vec<(PortId, UartConfig)>,
    pub sent: Vec<(PortId, u8)>,
}

impl MockUart {
    pub fn with_ports(ports: &[PortId]) -> Self {
        Self {
            ports: ports.to_vec(),
            ..Self::default()
        }
    }

    pub fn sent_on(&self, port: PortId) -> Vec<u8> {
        self.sent
            .iter()
            .filter(|(p, _)| *p == port)
            .map(|(_, byte)| *byte)
            .collect()
    }
}

impl HardwareUart for MockUart {
    fn has_hardware(&self, port: PortId) -> bool {
        self.ports.contains(&port)
    }

    fn configure(&mut self, port: PortId, config: &UartConfig) {
        self.configured.push((port, *config));
    }

    fn transmit(&mut self, port: PortId, byte: u8) {
        self.sent.push((port, byte));
    }
}

/// In-memory key-value flash
#[derive(Debug, Default)]
pub struct MemoryFlash {
    pub entries: Vec<(StorageKey, Vec<u8>)>,
    pub fail_writes: bool,
}

impl FlashStorage for MemoryFlash {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let (_, data) = self
            .entries
            .iter()
            .find(|(k, _)| *k == key)
            .ok_or(FlashError::NotFound)?;
        if data.len() > buffer.len() {
            return Err(FlashError::BufferTooSmall);
        }
        buffer[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        if self.fail_writes {
            return Err(FlashError::Flash);
        }
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push((key, data.to_vec()));
        Ok(())
    }

    async fn exists(&mut self, key: StorageKey) -> bool {
        self.entries.iter().any(|(k, _)| *k == key)
    }

    async fn erase_all(&mut self) -> Result<(), FlashError> {
        self.entries.clear();
        Ok(())
    }
}

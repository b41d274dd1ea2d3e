//! Output sink selection
//!
//! Every write goes through exactly one sink, chosen once per call: the
//! port's hardware UART if the platform has one, otherwise the software
//! encoder on the port's transmit pin. A software port without a transmit
//! pin has no sink at all and the write is silently dropped.
//!
//! The software sink only starts a frame when the pin scheduler has room
//! for all of its edges plus the closing idle edge. Once a frame does not
//! fit, the rest of the write is dropped and reported, so a partial write
//! always ends on a frame boundary.

use softuart_hal::{Clock, HardwareUart, Level, Parity, PinDriver, PinScheduler, PortId};

use crate::config::{FrameConfig, PortRegistry};
use crate::encoder::{EdgeEvent, SoftUartEncoder, LEAD_TIME};

/// Errors reported when a write call ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// Pin scheduler ran out of room; only the first `sent` bytes went out
    Truncated { sent: usize, dropped: usize },
}

/// Destination for the bytes of one write call
pub trait ByteSink {
    /// Send one byte
    fn put(&mut self, byte: u8);

    /// End the write call
    fn finish(self) -> Result<(), SinkError>;

    /// Send every byte of `bytes` in order
    fn put_all<I: IntoIterator<Item = u8>>(&mut self, bytes: I)
    where
        Self: Sized,
    {
        for byte in bytes {
            self.put(byte);
        }
    }
}

/// Forwards bytes to a hardware UART
pub struct HardwareSink<'a, U: HardwareUart> {
    uart: &'a mut U,
    port: PortId,
}

impl<'a, U: HardwareUart> HardwareSink<'a, U> {
    pub fn new(uart: &'a mut U, port: PortId) -> Self {
        Self { uart, port }
    }
}

impl<U: HardwareUart> ByteSink for HardwareSink<'_, U> {
    fn put(&mut self, byte: u8) {
        self.uart.transmit(self.port, byte);
    }

    fn finish(self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Encodes bytes into scheduled edges on the transmit pin
pub struct SoftwareSink<'a, P: PinScheduler> {
    pins: &'a mut P,
    encoder: SoftUartEncoder,
    /// Upper bound on the edges of one frame
    frame_edges: usize,
    edges: usize,
    sent: usize,
    dropped: usize,
}

impl<'a, P: PinScheduler + PinDriver> SoftwareSink<'a, P> {
    /// Start a transmission on `config`'s transmit pin
    ///
    /// Drives the pin to idle right away; the first frame starts
    /// [`LEAD_TIME`] after `clock`'s current time. Returns `None` if no
    /// transmit pin is assigned.
    pub fn start<C: Clock>(config: &FrameConfig, pins: &'a mut P, clock: &C) -> Option<Self> {
        let pin = config.tx?;

        if config.parity != Parity::None {
            warn!("parity {:?} is not emitted by the software encoder", config.parity);
        }

        pins.drive(pin, Level::High);
        let start = clock.now() + LEAD_TIME;
        trace!("software tx on {:?} from {:?}", pin, start);

        Some(Self {
            pins,
            encoder: SoftUartEncoder::new(config, pin, start),
            frame_edges: config.frame_bits() as usize,
            edges: 0,
            sent: 0,
            dropped: 0,
        })
    }

    /// Finish and return the idle edge that ends the transmission
    ///
    /// The idle edge is scheduled even when bytes were dropped; the error
    /// then tells how many made it out.
    pub fn close(self) -> Result<EdgeEvent, SinkError> {
        let idle = self.encoder.finish(self.pins);
        trace!("software tx done: {} edges, idle at {:?}", self.edges + 1, idle.at);

        if self.dropped > 0 {
            warn!("pin scheduler full: sent {} bytes, dropped {}", self.sent, self.dropped);
            return Err(SinkError::Truncated {
                sent: self.sent,
                dropped: self.dropped,
            });
        }
        Ok(idle)
    }

    /// Check if the scheduler can take one more frame and the idle edge
    fn has_room(&self) -> bool {
        self.pins.free_slots(self.encoder.cursor().pin) > self.frame_edges
    }
}

impl<P: PinScheduler + PinDriver> ByteSink for SoftwareSink<'_, P> {
    fn put(&mut self, byte: u8) {
        if self.dropped == 0 && self.has_room() {
            self.edges += self.encoder.encode(byte, &mut *self.pins);
            self.sent += 1;
        } else {
            self.dropped += 1;
        }
    }

    fn finish(self) -> Result<(), SinkError> {
        self.close().map(|_| ())
    }
}

/// Sink chosen for one write call
pub enum OutputSink<'a, U: HardwareUart, P: PinScheduler + PinDriver> {
    Hardware(HardwareSink<'a, U>),
    Software(SoftwareSink<'a, P>),
}

impl<'a, U, P> OutputSink<'a, U, P>
where
    U: HardwareUart,
    P: PinScheduler + PinDriver,
{
    /// Pick the sink for `port`
    ///
    /// Returns `None` for a software port without a transmit pin.
    pub fn select<C: Clock>(
        port: PortId,
        registry: &PortRegistry,
        uart: &'a mut U,
        pins: &'a mut P,
        clock: &C,
    ) -> Option<Self> {
        if uart.has_hardware(port) {
            trace!("{:?}: hardware sink", port);
            return Some(OutputSink::Hardware(HardwareSink::new(uart, port)));
        }

        let config = registry.frame_config(port);
        match SoftwareSink::start(&config, pins, clock) {
            Some(sink) => Some(OutputSink::Software(sink)),
            None => {
                debug!("{:?}: no tx pin, write dropped", port);
                None
            }
        }
    }
}

impl<U, P> ByteSink for OutputSink<'_, U, P>
where
    U: HardwareUart,
    P: PinScheduler + PinDriver,
{
    fn put(&mut self, byte: u8) {
        match self {
            OutputSink::Hardware(sink) => sink.put(byte),
            OutputSink::Software(sink) => sink.put(byte),
        }
    }

    fn finish(self) -> Result<(), SinkError> {
        match self {
            OutputSink::Hardware(sink) => sink.finish(),
            OutputSink::Software(sink) => sink.finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SerialOptions;
    use crate::mock::{FixedClock, MockUart, RecordingPins};
    use softuart_hal::{Instant, Pin, PinQueues};

    const NOW: Instant = Instant::from_micros(250);

    #[test]
    fn test_hardware_preferred() {
        let mut registry = PortRegistry::new();
        registry
            .configure(PortId::Serial(1), None, Some(&SerialOptions::with_tx(Pin(0))))
            .unwrap();
        let mut uart = MockUart::with_ports(&[PortId::Serial(1)]);
        let mut pins = RecordingPins::new();

        let mut sink =
            OutputSink::select(PortId::Serial(1), &registry, &mut uart, &mut pins, &FixedClock(NOW)).unwrap();
        assert!(matches!(sink, OutputSink::Hardware(_)));
        sink.put_all([0x10, 0x20]);
        assert_eq!(sink.finish(), Ok(()));

        assert_eq!(uart.sent_on(PortId::Serial(1)), [0x10, 0x20]);
        assert!(pins.edges.is_empty());
        assert!(pins.driven.is_empty());
    }

    #[test]
    fn test_no_tx_pin_is_silent() {
        let registry = PortRegistry::new();
        let mut uart = MockUart::default();
        let mut pins = RecordingPins::new();

        let sink = OutputSink::select(PortId::Software(0), &registry, &mut uart, &mut pins, &FixedClock(NOW));

        assert!(sink.is_none());
        assert!(pins.edges.is_empty());
        assert!(pins.driven.is_empty());
    }

    #[test]
    fn test_software_sink_timing() {
        let mut registry = PortRegistry::new();
        let config = registry
            .configure(PortId::Software(0), Some(9600), Some(&SerialOptions::with_tx(Pin(3))))
            .unwrap();
        let mut uart = MockUart::default();
        let mut pins = RecordingPins::new();

        let mut sink =
            OutputSink::select(PortId::Software(0), &registry, &mut uart, &mut pins, &FixedClock(NOW)).unwrap();
        sink.put(0xFF);
        sink.finish().unwrap();

        let period = softuart_hal::Duration::from_hz(config.baud_rate);
        let start = NOW + LEAD_TIME;

        // Idle level is driven before anything is scheduled
        assert_eq!(pins.driven, [(Pin(3), Level::High)]);
        // Start bit, the high run, then the idle edge at the frame end
        assert_eq!(
            pins.edges,
            [
                EdgeEvent { pin: Pin(3), at: start + period, level: Level::Low },
                EdgeEvent { pin: Pin(3), at: start + period * 10, level: Level::High },
                EdgeEvent { pin: Pin(3), at: start + period * 10, level: Level::High },
            ]
        );
        assert!(uart.sent.is_empty());
    }

    #[test]
    fn test_empty_write_only_idles() {
        let config = FrameConfig {
            tx: Some(Pin(5)),
            ..FrameConfig::default()
        };
        let mut pins = RecordingPins::new();

        let sink = SoftwareSink::start(&config, &mut pins, &FixedClock(NOW)).unwrap();
        let idle = sink.close().unwrap();

        assert_eq!(idle.at, NOW + LEAD_TIME);
        assert_eq!(idle.level, Level::High);
        assert_eq!(pins.edges, [idle]);
    }

    #[test]
    fn test_parity_does_not_change_waveform() {
        let plain = FrameConfig {
            tx: Some(Pin(5)),
            ..FrameConfig::default()
        };
        let odd = FrameConfig {
            parity: Parity::Odd,
            ..plain
        };

        let mut expected = RecordingPins::new();
        let mut sink = SoftwareSink::start(&plain, &mut expected, &FixedClock(NOW)).unwrap();
        sink.put(b'x');
        sink.finish().unwrap();

        let mut actual = RecordingPins::new();
        let mut sink = SoftwareSink::start(&odd, &mut actual, &FixedClock(NOW)).unwrap();
        sink.put(b'x');
        sink.finish().unwrap();

        assert_eq!(expected.edges, actual.edges);
    }

    #[test]
    fn test_full_scheduler_truncates_at_frame_boundary() {
        let config = FrameConfig {
            tx: Some(Pin(4)),
            ..FrameConfig::default()
        };
        // 0x55 toggles on every bit: ten edges per 8N1 frame
        let mut queues: PinQueues<4, 32> = PinQueues::new();

        let mut sink = SoftwareSink::start(&config, &mut queues, &FixedClock(NOW)).unwrap();
        sink.put_all([0x55; 16]);
        assert_eq!(
            sink.finish(),
            Err(SinkError::Truncated { sent: 3, dropped: 13 })
        );

        // Drive, three whole frames, idle edge: exactly the queue size
        assert_eq!(queues.len(), 32);
        assert_eq!(queues.free_slots(Pin(4)), 0);

        let mut levels = std::vec::Vec::new();
        while let Some((pin, level)) = queues.pop_due(Instant::from_micros(10_000_000)) {
            assert_eq!(pin, Pin(4));
            levels.push(level);
        }
        assert_eq!(levels.len(), 32);
        assert_eq!(levels[0], Level::High);
        for (n, level) in levels[1..31].iter().enumerate() {
            let expected = if n % 2 == 0 { Level::Low } else { Level::High };
            assert_eq!(*level, expected);
        }
        assert_eq!(levels[31], Level::High);
    }

    #[test]
    fn test_nothing_sent_without_room() {
        let config = FrameConfig {
            tx: Some(Pin(4)),
            ..FrameConfig::default()
        };
        // Room for the drive and the idle edge only
        let mut queues: PinQueues<4, 2> = PinQueues::new();

        let mut sink = SoftwareSink::start(&config, &mut queues, &FixedClock(NOW)).unwrap();
        sink.put_all([1, 2]);
        assert_eq!(
            sink.finish(),
            Err(SinkError::Truncated { sent: 0, dropped: 2 })
        );
        assert_eq!(queues.len(), 2);
    }

    #[test]
    fn test_write_fits_when_room() {
        let config = FrameConfig {
            tx: Some(Pin(4)),
            ..FrameConfig::default()
        };
        let mut queues: PinQueues<4, 256> = PinQueues::new();

        let mut sink = SoftwareSink::start(&config, &mut queues, &FixedClock(NOW)).unwrap();
        sink.put_all([0x55; 16]);
        assert_eq!(sink.finish(), Ok(()));
        assert_eq!(queues.len(), 1 + 16 * 10 + 1);
    }
}

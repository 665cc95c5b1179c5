//! RFID hardware abstraction: a small trait plus two concrete
//! workers, each a dedicated thread with an `Arc<AtomicBool>` running
//! flag polling for tag reads, unified behind one contract instead of
//! per-reader-model subclassing or GUI-event emission.

use crate::model::normalize_tag;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Fire-and-forget LED feedback command (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedCommand {
    Success,
    Error,
}

/// Capability set a concrete tag source must provide: `start`/`stop`
/// the background worker, plus best-effort LED feedback. Spec §9
/// explicitly asks for this as a tagged variant / trait object rather
/// than per-reader-model subclassing.
pub trait TagSource: Send + Sync {
    fn start(&self) -> Result<(), String>;
    fn stop(&self);
    fn indicate_success(&self);
    fn indicate_error(&self);
}

/// Low-level single-shot scan, implemented per hardware model. Mirrors
/// the teacher's `rfid_trait::RfidReader::scan`.
trait RawReader: Send {
    /// `Ok(Some(tag))` on a read, `Ok(None)` when nothing is present,
    /// `Err` on a transient hardware fault.
    fn scan(&mut self) -> Result<Option<String>, String>;
}

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const BACKOFF_START: Duration = Duration::from_millis(250);
const BACKOFF_CAP: Duration = Duration::from_secs(5);
const LED_QUEUE_DEPTH: usize = 8;

/// Shared worker loop: polls `reader` at `POLL_INTERVAL`, suppresses
/// immediate repeats, invokes `on_tag` from this (non-event-loop)
/// thread, and drains the LED queue. Used by both concrete sources so
/// the debounce-of-repeats and backoff behavior (spec §4.1) live in
/// exactly one place.
fn run_worker(
    mut reader: Box<dyn RawReader>,
    on_tag: Arc<dyn Fn(String) + Send + Sync>,
    running: Arc<AtomicBool>,
    led_rx: Receiver<LedCommand>,
    reader_label: &'static str,
) {
    let mut last_seen: Option<String> = None;
    let mut backoff = BACKOFF_START;

    while running.load(Ordering::SeqCst) {
        match led_rx.try_recv() {
            Ok(LedCommand::Success) => flash_success(),
            Ok(LedCommand::Error) => blink_error(),
            Err(_) => {}
        }

        match reader.scan() {
            Ok(Some(raw)) => {
                backoff = BACKOFF_START;
                let tag = normalize_tag(&raw);
                if last_seen.as_deref() != Some(tag.as_str()) {
                    log::info!("{reader_label}: tag read {tag}");
                    on_tag(tag.clone());
                }
                last_seen = Some(tag);
            }
            Ok(None) => {
                // A null read clears the suppression window (spec
                // §4.1: "no intervening null read").
                last_seen = None;
                backoff = BACKOFF_START;
            }
            Err(e) => {
                log::warn!("{reader_label}: transient read error: {e}, backing off {backoff:?}");
                thread::sleep(backoff);
                backoff = (backoff * 2).min(BACKOFF_CAP);
                continue;
            }
        }

        thread::sleep(POLL_INTERVAL);
    }
}

fn flash_success() {
    log::debug!("LED: green flash (success)");
}

fn blink_error() {
    log::debug!("LED: red blink x3 (error)");
}

struct WorkerHandle {
    running: Arc<AtomicBool>,
    led_tx: Sender<LedCommand>,
    join: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl WorkerHandle {
    fn spawn(
        reader: Box<dyn RawReader>,
        on_tag: Arc<dyn Fn(String) + Send + Sync>,
        reader_label: &'static str,
    ) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let (led_tx, led_rx) = bounded(LED_QUEUE_DEPTH);
        let worker_running = Arc::clone(&running);
        let join = thread::Builder::new()
            .name(format!("tagsource-{reader_label}"))
            .spawn(move || run_worker(reader, on_tag, worker_running, led_rx, reader_label))
            .expect("failed to spawn tag source worker thread");
        Self {
            running,
            led_tx,
            join: std::sync::Mutex::new(Some(join)),
        }
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.join.lock().unwrap_or_else(|p| p.into_inner()).take() {
            let _ = handle.join();
        }
    }

    fn indicate(&self, cmd: LedCommand) {
        // Best-effort: a full queue silently drops the command rather
        // than blocking the caller (spec §4.1).
        let _ = self.led_tx.try_send(cmd);
    }
}

/// Development/test tag source: cycles a small fixed set of plausible
/// tag ids on a timer, mirroring the teacher's `MockRfidReader` but
/// driven by [`RawReader`] instead of Tauri events.
pub struct MockTagSource {
    handle: WorkerHandle,
}

struct CyclingReader {
    tags: Vec<&'static str>,
    index: usize,
    ticks: u32,
}

impl RawReader for CyclingReader {
    fn scan(&mut self) -> Result<Option<String>, String> {
        self.ticks += 1;
        // Emit a tag roughly every third poll (~300ms), null reads
        // in between, exactly like the teacher's 1-in-3-cycles mock.
        if self.ticks % 3 != 0 {
            return Ok(None);
        }
        let tag = self.tags[self.index % self.tags.len()];
        self.index += 1;
        Ok(Some(tag.to_string()))
    }
}

impl MockTagSource {
    pub fn new(on_tag: impl Fn(String) + Send + Sync + 'static) -> Self {
        let reader: Box<dyn RawReader> = Box::new(CyclingReader {
            tags: vec!["AAAA1111", "BBBB2222", "CCCC3333"],
            index: 0,
            ticks: 0,
        });
        Self {
            handle: WorkerHandle::spawn(reader, Arc::new(on_tag), "mock"),
        }
    }
}

impl TagSource for MockTagSource {
    fn start(&self) -> Result<(), String> {
        Ok(())
    }

    fn stop(&self) {
        self.handle.stop();
    }

    fn indicate_success(&self) {
        self.handle.indicate(LedCommand::Success);
    }

    fn indicate_error(&self) {
        self.handle.indicate(LedCommand::Error);
    }
}

/// Real hardware tag source (MFRC522 over SPI/GPIO), compiled only on
/// Linux behind the `rfid` feature — the only place the teacher's
/// `rfid_mfrc522.rs`/`rppal` stack applies. On any other target the
/// factory below falls straight to [`MockTagSource`].
#[cfg(all(target_os = "linux", feature = "rfid"))]
pub struct HardwareTagSource {
    handle: WorkerHandle,
}

#[cfg(all(target_os = "linux", feature = "rfid"))]
mod hardware {
    use super::RawReader;
    use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
    use linux_embedded_hal::Spidev;
    use mfrc522::comm::eh02::spi::{DummyDelay, DummyNSS, SpiInterface};
    use mfrc522::{Mfrc522, RxGain};
    use rppal::gpio::Gpio;
    use std::thread;
    use std::time::Duration;

    const GPIO_RST: u8 = 22;

    type Scanner = Mfrc522<SpiInterface<Spidev, DummyNSS, DummyDelay>, mfrc522::Initialized>;

    pub struct Mfrc522RawReader {
        mfrc522: Scanner,
    }

    impl Mfrc522RawReader {
        pub fn open() -> Result<Self, String> {
            let mut spi =
                Spidev::open("/dev/spidev0.0").map_err(|e| format!("open SPI: {e:?}"))?;
            let options = SpidevOptions::new()
                .bits_per_word(8)
                .max_speed_hz(1_000_000)
                .mode(SpiModeFlags::SPI_MODE_0)
                .build();
            spi.configure(&options)
                .map_err(|e| format!("configure SPI: {e:?}"))?;

            let gpio = Gpio::new().map_err(|e| format!("GPIO init: {e:?}"))?;
            let mut reset_pin = gpio
                .get(GPIO_RST.into())
                .map_err(|e| format!("RST pin: {e:?}"))?
                .into_output();
            reset_pin.set_high();
            reset_pin.set_low();
            thread::sleep(Duration::from_millis(50));
            reset_pin.set_high();
            thread::sleep(Duration::from_millis(50));

            let spi_interface = SpiInterface::new(spi);
            let mut mfrc522 = Mfrc522::new(spi_interface)
                .init()
                .map_err(|e| format!("MFRC522 init: {e:?}"))?;
            mfrc522
                .set_antenna_gain(RxGain::DB48)
                .map_err(|e| format!("antenna gain: {e:?}"))?;

            Ok(Self { mfrc522 })
        }

        fn format_uid(bytes: &[u8]) -> String {
            bytes.iter().map(|b| format!("{b:02X}")).collect()
        }
    }

    impl RawReader for Mfrc522RawReader {
        fn scan(&mut self) -> Result<Option<String>, String> {
            match self.mfrc522.wupa() {
                Ok(atqa) => match self.mfrc522.select(&atqa) {
                    Ok(uid) => {
                        let _ = self.mfrc522.hlta();
                        Ok(Some(Self::format_uid(uid.as_bytes())))
                    }
                    Err(e) => {
                        let _ = self.mfrc522.hlta();
                        Err(format!("select failed: {e:?}"))
                    }
                },
                Err(_) => Ok(None),
            }
        }
    }
}

#[cfg(all(target_os = "linux", feature = "rfid"))]
impl HardwareTagSource {
    fn try_open(on_tag: Arc<dyn Fn(String) + Send + Sync>) -> Result<Self, String> {
        let reader = hardware::Mfrc522RawReader::open()?;
        Ok(Self {
            handle: WorkerHandle::spawn(Box::new(reader), on_tag, "mfrc522"),
        })
    }
}

#[cfg(all(target_os = "linux", feature = "rfid"))]
impl TagSource for HardwareTagSource {
    fn start(&self) -> Result<(), String> {
        Ok(())
    }

    fn stop(&self) {
        self.handle.stop();
    }

    fn indicate_success(&self) {
        self.handle.indicate(LedCommand::Success);
    }

    fn indicate_error(&self) {
        self.handle.indicate(LedCommand::Error);
    }
}

/// Opens the best available tag source: real hardware on Linux with
/// the `rfid` feature enabled, falling back to [`MockTagSource`] on
/// any other target or on a hardware open failure (spec §4.1: "on
/// failure, the factory returns a MockTagSource instead").
pub fn open(on_tag: impl Fn(String) + Send + Sync + 'static) -> Box<dyn TagSource> {
    let on_tag: Arc<dyn Fn(String) + Send + Sync> = Arc::new(on_tag);

    #[cfg(all(target_os = "linux", feature = "rfid"))]
    {
        match HardwareTagSource::try_open(Arc::clone(&on_tag)) {
            Ok(source) => {
                log::info!("using HardwareTagSource (MFRC522)");
                return Box::new(source);
            }
            Err(e) => {
                log::warn!("hardware RFID unavailable ({e}), falling back to MockTagSource");
            }
        }
    }

    Box::new(MockTagSource::new(move |tag| on_tag(tag)))
}

//! canpanel - control panel module firmware for the nRF52840.
//!
//! Scans a 64-button matrix, turns debounced transitions into produced
//! events and drives 64 LEDs through a MAX6951 from consumed events.
//!
//! Task layout:
//! - `panel_task`: 10 ms scan ticker, consumed-event actions, start-of-day
//!   responses, LED test mode
//! - `producer_task`: drains produced events towards the transport

#![no_std]
#![no_main]

use core::cell::RefCell;

use canpanel::bus::SharedBus;
use canpanel::config::{
    CONSUMED_QUEUE_LEN, LED_TEST_STEP_MS, PRODUCED_QUEUE_LEN, SCAN_PERIOD_MS,
};
use canpanel::events::actions::{self, ConsumedEvent};
use canpanel::events::sod::{SodResponder, SodStep};
use canpanel::events::{EventSink, Happening, ProducedEvent};
use canpanel::leds::max6951::Max6951;
use canpanel::leds::{LedMap, LedTestCycle, Plane, SegmentWriter};
use canpanel::matrix::pins::PinMatrix;
use canpanel::matrix::scanner::ButtonScanner;
use canpanel::matrix::{ColumnSampler, RowLevels};
use canpanel::nv::NodeVariables;
use canpanel::startup_logic::{sod_ticks_per_step, startup_complete};
use canpanel::Error;
use defmt::{error, info, warn};
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::{Input, Level, Output, OutputDrive, Pull};
use embassy_nrf::spim::{self, Spim};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::{Duration, Instant, Ticker};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    SPIM3 => spim::InterruptHandler<peripherals::SPI3>;
});

type Display = Max6951<Spim<'static, peripherals::SPI3>, Output<'static>>;
type Bus = SharedBus<CriticalSectionRawMutex, PanelIo>;

/// Events produced by the panel, consumed by the transport.
static PRODUCED: Channel<CriticalSectionRawMutex, ProducedEvent, PRODUCED_QUEUE_LEN> =
    Channel::new();

/// Inbound taught events with their actions, filled by the transport.
static CONSUMED: Channel<CriticalSectionRawMutex, ConsumedEvent, CONSUMED_QUEUE_LEN> =
    Channel::new();

/// Run-time configuration, shared with the transport's NV read/write.
static NODE_VARIABLES: Mutex<CriticalSectionRawMutex, RefCell<NodeVariables>> =
    Mutex::new(RefCell::new(NodeVariables::new()));

static BUS: StaticCell<Bus> = StaticCell::new();

/// Everything wired to the shared I/O lines.
struct PanelIo {
    matrix: PinMatrix<Output<'static>, Input<'static>>,
    display: Display,
}

impl ColumnSampler for PanelIo {
    fn configure(&mut self) -> Result<(), Error> {
        self.matrix.configure()
    }

    fn sample_column(&mut self, column: usize) -> Result<RowLevels, Error> {
        self.matrix.sample_column(column)
    }
}

impl SegmentWriter for PanelIo {
    fn write_digit(&mut self, plane: Plane, digit: u8, segments: u8) -> Result<(), Error> {
        self.display.write_digit(plane, digit, segments)
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.display.clear()
    }

    fn set_intensity(&mut self, level: u8) -> Result<(), Error> {
        self.display.set_intensity(level)
    }

    fn set_test_mode(&mut self, enabled: bool) -> Result<(), Error> {
        self.display.set_test_mode(enabled)
    }
}

/// Produced events go straight into the outbound channel.
struct ChannelSink(Sender<'static, CriticalSectionRawMutex, ProducedEvent, PRODUCED_QUEUE_LEN>);

impl EventSink for ChannelSink {
    fn emit(&mut self, event: ProducedEvent) {
        if self.0.try_send(event).is_err() {
            warn!("Produced event channel full - dropping {}", event);
        }
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());
    info!("canpanel starting");

    let strobes = [
        Output::new(p.P1_01, Level::High, OutputDrive::Standard),
        Output::new(p.P1_02, Level::High, OutputDrive::Standard),
        Output::new(p.P1_03, Level::High, OutputDrive::Standard),
        Output::new(p.P1_04, Level::High, OutputDrive::Standard),
        Output::new(p.P1_05, Level::High, OutputDrive::Standard),
        Output::new(p.P1_06, Level::High, OutputDrive::Standard),
        Output::new(p.P1_07, Level::High, OutputDrive::Standard),
        Output::new(p.P1_08, Level::High, OutputDrive::Standard),
    ];
    let senses = [
        Input::new(p.P0_03, Pull::Up),
        Input::new(p.P0_04, Pull::Up),
        Input::new(p.P0_28, Pull::Up),
        Input::new(p.P0_29, Pull::Up),
        Input::new(p.P0_30, Pull::Up),
        Input::new(p.P0_31, Pull::Up),
        Input::new(p.P0_26, Pull::Up),
        Input::new(p.P0_27, Pull::Up),
    ];

    let mut spi_config = spim::Config::default();
    spi_config.frequency = spim::Frequency::M8;
    spi_config.mode = spim::MODE_0;
    let spi = Spim::new_txonly(p.SPI3, Irqs, p.P0_13, p.P0_14, spi_config);
    let cs = Output::new(p.P0_15, Level::High, OutputDrive::Standard);

    let mut display = Max6951::new(spi, cs);
    let brightness = NODE_VARIABLES.lock(|nv| nv.borrow().brightness());
    if let Err(e) = display.init(brightness) {
        error!("Display init failed: {}", e);
    }

    let bus: &'static Bus = BUS.init(SharedBus::new(PanelIo {
        matrix: PinMatrix::new(strobes, senses),
        display,
    }));

    spawner.must_spawn(panel_task(bus, CONSUMED.receiver(), PRODUCED.sender()));
    spawner.must_spawn(producer_task(PRODUCED.receiver()));
}

/// Scan, consumed-event and start-of-day handling.
///
/// Matrix, LED and start-of-day state live only in this task. Node
/// variables are snapshotted once per tick.
#[embassy_executor::task]
async fn panel_task(
    bus: &'static Bus,
    consumed: Receiver<'static, CriticalSectionRawMutex, ConsumedEvent, CONSUMED_QUEUE_LEN>,
    produced: Sender<'static, CriticalSectionRawMutex, ProducedEvent, PRODUCED_QUEUE_LEN>,
) -> ! {
    let mut sink = ChannelSink(produced);
    let mut leds = LedMap::new(bus);
    let mut scanner = ButtonScanner::new(bus);
    let mut responder = SodResponder::new();
    let mut led_test = LedTestCycle::new();

    // The chip was cleared by its power-on sequence in `main`.
    let mut brightness = NODE_VARIABLES.lock(|nv| nv.borrow().brightness());
    if let Err(e) = scanner.init() {
        error!("Button matrix init failed: {}", e);
    }

    let boot = Instant::now();
    let mut started = false;
    let mut sod_ticks = 0u32;
    let mut test_ticks = 0u64;
    let mut ticker = Ticker::every(Duration::from_millis(SCAN_PERIOD_MS));
    info!("Panel task started");

    loop {
        match select(ticker.next(), consumed.receive()).await {
            Either::First(()) => {
                if !started {
                    let sod_delay = NODE_VARIABLES.lock(|nv| nv.borrow().sod_delay_ms());
                    if startup_complete(boot.elapsed().as_millis(), sod_delay) {
                        started = true;
                        info!("Start-up delay over, scanning");
                        sink.emit(ProducedEvent::on(Happening::SOD));
                    }
                    continue;
                }

                let nv = NODE_VARIABLES.lock(|nv| nv.borrow().clone());

                if nv.brightness() != brightness {
                    brightness = nv.brightness();
                    if let Err(e) = leds.set_brightness(brightness) {
                        warn!("Brightness update failed: {}", e);
                    }
                }

                if let Err(e) = scanner.scan(&nv, &mut sink) {
                    warn!("Scan failed: {}", e);
                }

                if responder.is_active() {
                    sod_ticks += 1;
                    if sod_ticks >= sod_ticks_per_step(nv.response_delay()) {
                        sod_ticks = 0;
                        if let SodStep::Next(Some(event)) = responder.step(&nv, scanner.states()) {
                            sink.emit(event);
                        }
                    }
                }

                let result = if nv.test_mode() {
                    test_ticks += SCAN_PERIOD_MS;
                    if test_ticks >= LED_TEST_STEP_MS {
                        test_ticks = 0;
                        led_test.step(&mut leds).map(|_| ())
                    } else {
                        Ok(())
                    }
                } else {
                    led_test.stop(&mut leds)
                };
                if let Err(e) = result {
                    warn!("LED test failed: {}", e);
                }
            }
            Either::Second(event) => match actions::apply(&event, &mut leds) {
                Ok(true) => {
                    info!("Start-of-day requested");
                    sod_ticks = 0;
                    responder.start();
                }
                Ok(false) => {}
                Err(e) => warn!("Consumed event action failed: {}", e),
            },
        }
    }
}

/// Hands produced events to the transport.
///
/// The bus protocol stack is not part of this firmware; events are logged
/// so they can be observed over RTT.
#[embassy_executor::task]
async fn producer_task(
    produced: Receiver<'static, CriticalSectionRawMutex, ProducedEvent, PRODUCED_QUEUE_LEN>,
) -> ! {
    info!("Producer task started");
    loop {
        let event = produced.receive().await;
        info!(
            "Produced happening {} -> {}",
            event.happening.number(),
            event.state
        );
    }
}

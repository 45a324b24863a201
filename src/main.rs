//! CanDebugger - firmware entry point
//!
//! 1. Initialize hardware (log UART, host UART, TWAI, button, LEDs)
//! 2. Poll the debugger in the main loop
//! 3. Tick the mode-select button every 10 ms
//! 4. Drain the log stream to UART1

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    hal::{
        delay::FreeRtos,
        gpio::{AnyInputPin, AnyOutputPin, Output, PinDriver, Pull},
        peripherals::Peripherals,
    },
    sys::{esp_restart, esp_timer_get_time, EspError},
};

#[cfg(target_os = "espidf")]
use can_debugger::{
    config::{CONFIG, VERSION},
    console::ShellEvent,
    debugger::Debugger,
    hal::{PinConfig, TwaiBus, UartTransport},
    log_info,
    mode::{Duo, LedState, ModeSelector},
    uart_logger::{init_uart_logger, UartLogger, UartLoggerConfig},
};

/// Mode-select tick period.
#[cfg(target_os = "espidf")]
const MODE_TICK_US: i64 = 10_000;

/// Debugger polls between two yields. Must outrun 115200 baud over one
/// RTOS tick.
#[cfg(target_os = "espidf")]
const POLL_BATCH: usize = 256;

#[cfg(target_os = "espidf")]
type Led = PinDriver<'static, AnyOutputPin, Output>;

/// The two duo LEDs.
#[cfg(target_os = "espidf")]
struct Leds {
    duo1: (Led, Led),
    duo2: (Led, Led),
}

#[cfg(target_os = "espidf")]
impl Leds {
    fn new(pins: &PinConfig) -> Result<Self, EspError> {
        // SAFETY: each GPIO is claimed once, here, and by nothing else.
        let led = |n| PinDriver::output(unsafe { AnyOutputPin::new(n) });
        Ok(Self {
            duo1: (led(pins.duo1_green)?, led(pins.duo1_red)?),
            duo2: (led(pins.duo2_green)?, led(pins.duo2_red)?),
        })
    }

    fn show(&mut self, state: LedState) -> Result<(), EspError> {
        set_duo(&mut self.duo1, state.duo1)?;
        set_duo(&mut self.duo2, state.duo2)
    }
}

#[cfg(target_os = "espidf")]
fn set_duo((green, red): &mut (Led, Led), colour: Duo) -> Result<(), EspError> {
    green.set_level((colour == Duo::Green).into())?;
    red.set_level((colour == Duo::Red).into())
}

#[cfg(target_os = "espidf")]
fn timestamp_us() -> i64 {
    unsafe { esp_timer_get_time() }
}

#[cfg(target_os = "espidf")]
fn main() -> Result<(), EspError> {
    // Initialize ESP-IDF
    esp_idf_svc::sys::link_patches();

    let peripherals = Peripherals::take()?;
    let pins = PinConfig::default();

    let log_uart = init_uart_logger(
        peripherals.uart1,
        peripherals.pins.gpio17,
        &UartLoggerConfig::default(),
    )?;
    let mut logger = UartLogger::new(log_uart);

    let mut host = UartTransport::new(
        peripherals.uart0,
        peripherals.pins.gpio1,
        peripherals.pins.gpio3,
    )?;
    let mut can = TwaiBus::new(pins.can_tx, pins.can_rx)?;

    // SAFETY: pins from the board table, not handed out elsewhere.
    let mut button = PinDriver::input(unsafe { AnyInputPin::new(pins.mode_button) })?;
    button.set_pull(Pull::Up)?;
    let mut termination = PinDriver::output(unsafe { AnyOutputPin::new(pins.termination) })?;
    let mut termination_on = false;
    termination.set_low()?;

    let mut leds = Leds::new(&pins)?;
    leds.show(LedState::for_mode(CONFIG.mode()))?;

    let mut debugger = Debugger::new();
    let mut selector = ModeSelector::new();
    let mut next_tick = timestamp_us();

    log_info!(timestamp_us(), "{} started", VERSION);

    loop {
        let now_us = timestamp_us();

        if now_us >= next_tick {
            next_tick += MODE_TICK_US;
            if let Some(state) = selector.tick(button.is_low(), &CONFIG) {
                leds.show(state)?;
            }
        }

        for _ in 0..POLL_BATCH {
            let event = debugger.poll(timestamp_us(), &mut host, &mut can, &CONFIG);
            if event == ShellEvent::RestartRequested {
                logger.drain(now_us);
                FreeRtos::delay_ms(10);
                unsafe { esp_restart() };
            }
        }

        if CONFIG.termination() != termination_on {
            termination_on = CONFIG.termination();
            termination.set_level(termination_on.into())?;
            log_info!(now_us, "termination {}", if termination_on { "on" } else { "off" });
        }

        logger.drain(now_us);

        // Yield to the idle task (watchdog)
        FreeRtos::delay_ms(1);
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    println!(
        "{}: firmware image, build for target_os = \"espidf\"",
        can_debugger::config::VERSION
    );
}

//! FeedLog Firmware: Main Entry Point
//!
//! Every button press wakes the chip from deep sleep into a fresh boot.
//! `main` wires the adapters, runs exactly one wake cycle and goes back to
//! sleep; it never loops.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  RtcMemory      BoardAdapter                    NetworkLink    │
//! │  (Retained)     (Clock·Button·Display·Battery·  (WiFi + MQTT)  │
//! │                  Power)                                        │
//! │  NvsAdapter     LogEventSink                                   │
//! │  (Config)       (EventSink)                                    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │           WakeCycleController (pure logic)             │    │
//! │  │  IntegrityStore · GestureAccumulator · SyncSession     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::Delay;
use esp_idf_svc::hal::gpio::PinDriver;
use esp_idf_svc::hal::prelude::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;
use log::{error, info, warn};

use feedlog::adapters::battery::BatteryMonitor;
use feedlog::adapters::board::BoardAdapter;
use feedlog::adapters::button::GpioButton;
use feedlog::adapters::display::LogDisplay;
use feedlog::adapters::link::NetworkLink;
use feedlog::adapters::log_sink::LogEventSink;
use feedlog::adapters::mqtt::MqttAdapter;
use feedlog::adapters::nvs::NvsAdapter;
use feedlog::adapters::power::PowerManager;
use feedlog::adapters::rtc_memory::RtcMemory;
use feedlog::adapters::time::Esp32Clock;
use feedlog::adapters::wifi::WifiAdapter;
use feedlog::app::ports::ConfigPort;
use feedlog::app::service::WakeCycleController;
use feedlog::config::DeviceConfig;
use feedlog::drivers::hw_init;
use feedlog::error::Error;
use feedlog::pins;

fn load_config() -> Result<DeviceConfig, Error> {
    let nvs = NvsAdapter::new()?;
    Ok(nvs.load()?)
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("FeedLog v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Config from NVS (or build-time defaults) ───────────
    let config = load_config().unwrap_or_else(|e| {
        warn!("{}, using defaults", e);
        DeviceConfig::default()
    });
    log::set_max_level(config.log_level());

    // ── 3. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Battery readings will be 0 V; everything else still works.
        error!("HAL init failed: {}", e);
    }

    let peripherals = Peripherals::take().context("peripherals already taken")?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    let button_pin = PinDriver::input(peripherals.pins.gpio4)?; // BUTTON_GPIO
    let pressed_at_boot = button_pin.is_low();
    let sense_enable = PinDriver::output(peripherals.pins.gpio25)?; // BATTERY_SENSE_EN_GPIO
    let rail = PinDriver::output(peripherals.pins.gpio26)?; // PERIPHERAL_POWER_GPIO

    let wifi = EspWifi::new(peripherals.modem, sysloop, Some(nvs_partition))?;

    // ── 4. Adapters ───────────────────────────────────────────
    let battery = BatteryMonitor::new(
        sense_enable,
        Delay::new_default(),
        || hw_init::adc1_read(pins::BATTERY_ADC_CHANNEL),
        config.battery,
    );
    let mut board = BoardAdapter::new(
        Esp32Clock::new(),
        GpioButton::new(button_pin, pressed_at_boot),
        LogDisplay::new(),
        battery,
        PowerManager::new(rail),
    );
    let mut link = NetworkLink::new(WifiAdapter::new(wifi), MqttAdapter::new());
    let mut sink = LogEventSink::new();

    // ── 5. One wake cycle, ending in deep sleep ───────────────
    let mut controller = WakeCycleController::new(config, RtcMemory::new());
    let report = controller.run(&mut board, &mut link, &mut sink);

    // Only reached if deep sleep returned.
    warn!("wake cycle returned: {:?}", report.command);
    Ok(())
}

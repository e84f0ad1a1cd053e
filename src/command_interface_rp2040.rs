use core::cell::RefCell;

use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::USB;
use embassy_rp::rom_data::reset_to_usb_boot;
use embassy_rp::usb::{Driver, InterruptHandler};
use embassy_rp::Peri;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Timer;
use embassy_usb_logger::ReceiverHandler;

use crate::command::{execute_line, LineBuffer};
use crate::log::*;
use crate::telemetry::StatusMonitor;
use crate::{CONFIG, SYSTEM_TICK_MILLIS};

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => InterruptHandler<USB>;
});

/// USB packets carry at most 64 bytes, so lines are reassembled here.
static LINE: Mutex<CriticalSectionRawMutex, RefCell<LineBuffer>> =
    Mutex::new(RefCell::new(LineBuffer::new()));

struct Handler;

impl ReceiverHandler for Handler {
    async fn handle_data(&self, data: &[u8]) {
        LINE.lock(|buffer| {
            buffer.borrow_mut().feed(data, |line| {
                // sent by elf2uf2-term -t when the monitor closes
                if line == "q" || line == "elf2uf2-term" {
                    reset_to_usb_boot(0, 0);
                } else {
                    let _ = execute_line(&CONFIG, line);
                }
            })
        });
    }

    fn new() -> Self {
        Self
    }
}

#[embassy_executor::task]
async fn logger_task(driver: Driver<'static, USB>) {
    embassy_usb_logger::run!(1024, ::log::LevelFilter::Info, driver, Handler);
}

/// USB serial: command lines in, one status line out per second.
#[embassy_executor::task]
pub async fn usb_task(spawner: Spawner, usb: Peri<'static, USB>) {
    let driver = Driver::new(usb, Irqs);
    match logger_task(driver) {
        Ok(token) => spawner.spawn(token),
        Err(_) => {
            error!("Failed to spawn USB logger task");
            return;
        }
    }

    let Some(mut monitor) = StatusMonitor::new() else {
        error!("No telemetry receiver available");
        return;
    };

    loop {
        Timer::after_millis((SYSTEM_TICK_MILLIS * 10).into()).await;
        match monitor.snapshot(&CONFIG).to_json() {
            Ok(json) => ::log::info!("{}", json.as_str()),
            Err(_) => warn!("Status did not fit the JSON buffer"),
        }
    }
}

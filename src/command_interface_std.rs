extern crate std;

use async_io::Async;
use embassy_time::Timer;
use embedded_io_adapters::futures_03::FromFutures;
use embedded_io_async::Read;

use crate::command::{execute_line, LineBuffer};
use crate::log::*;
use crate::telemetry::StatusMonitor;
use crate::{CONFIG, SYSTEM_TICK_MILLIS};

/// Reads JSON write requests from stdin, one per line.
#[embassy_executor::task]
pub async fn command_task() {
    info!("Starting command interface on stdin");

    let stdin = match Async::new(std::io::stdin()) {
        Ok(stdin) => stdin,
        Err(e) => {
            error!("Failed to open stdin: {}", e);
            return;
        }
    };
    let mut stdin = FromFutures::new(stdin);
    let mut buf = [0u8; 64];
    let mut line = LineBuffer::new();

    loop {
        let read = match stdin.read(&mut buf).await {
            Ok(0) => {
                info!("stdin closed, command interface stopped");
                return;
            }
            Ok(n) => n,
            Err(e) => {
                error!("stdin read failed: {:?}", e);
                return;
            }
        };

        line.feed(&buf[..read], |text| {
            let _ = execute_line(&CONFIG, text);
        });
    }
}

#[embassy_executor::task]
pub async fn status_task() {
    let Some(mut monitor) = StatusMonitor::new() else {
        error!("No telemetry receiver available");
        return;
    };

    loop {
        Timer::after_millis((SYSTEM_TICK_MILLIS * 10).into()).await;
        match monitor.snapshot(&CONFIG).to_json() {
            Ok(json) => info!("{}", json.as_str()),
            Err(_) => warn!("Status did not fit the JSON buffer"),
        }
    }
}

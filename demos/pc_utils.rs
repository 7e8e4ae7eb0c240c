use std::io::{Read, Write};
use std::thread;
use std::time::Duration;

use embedded_hal::blocking::delay::DelayMs;
use fpm383::Transport;
use log::error;
use serialport::{available_ports, SerialPort};

// We're cheating here and will use the host OS's serial port
// as the module's UART, so the driver needs a Transport for it.

pub const DEFAULT_BAUD_RATE: u32 = 57600;

pub struct HostTransport(pub Box<dyn SerialPort>);

impl Transport for HostTransport {
    fn write(&mut self, bytes: &[u8]) {
        if let Err(e) = self.0.write_all(bytes).and_then(|_| self.0.flush()) {
            error!("write failed: {}", e);
        }
    }

    fn bytes_available(&mut self) -> usize {
        self.0.bytes_to_read().map(|n| n as usize).unwrap_or(0)
    }

    fn read_byte(&mut self) -> Option<u8> {
        let mut buf = [0u8; 1];
        match self.0.read(&mut buf) {
            Ok(1) => Some(buf[0]),
            Ok(_) => None,
            Err(e) => {
                error!("read failed: {}", e);
                None
            }
        }
    }
}

pub struct HostDelay;

impl DelayMs<u32> for HostDelay {
    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}

pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

pub fn print_ports() {
    let ports = available_ports().unwrap();
    for port in ports {
        println!("Available port: {} ({:#?})", port.port_name, port.port_type);
    }
}

pub fn open_port(port_name: &str) -> serialport::Result<HostTransport> {
    println!("Using port {}", port_name);
    serialport::new(port_name, DEFAULT_BAUD_RATE)
        .timeout(Duration::from_millis(50))
        .open()
        .map(HostTransport)
}

#[allow(dead_code)]
// This allows us to share code between different PC-based demos.
// There's probably a better way to do it!
fn main() {}

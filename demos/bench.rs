use std::{cell::RefCell, env, time::Instant as StdInstant};

use dual_psu_control::{
    bus::{ModbusModule, SharedBus},
    command::Command,
    config::{Instant, SupplyConfig},
    error_queue::ErrorQueue,
    instrument::Output,
    params::{ParamList, Unit},
    supply::Supply,
};
use inquire::Select;
use serialport::SerialPort;

// Configuration constants - adjust these for your setup
const BAUD_RATE: u32 = 115200;
const RUN_TIME_MS: u64 = 5000;

pub struct PortWrapper(Box<dyn SerialPort>);

#[derive(Debug)]
pub struct IoError(std::io::Error);

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl embedded_io::Error for IoError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self.0.kind() {
            std::io::ErrorKind::NotFound => embedded_io::ErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => embedded_io::ErrorKind::PermissionDenied,
            std::io::ErrorKind::BrokenPipe => embedded_io::ErrorKind::BrokenPipe,
            std::io::ErrorKind::InvalidInput => embedded_io::ErrorKind::InvalidInput,
            std::io::ErrorKind::InvalidData => embedded_io::ErrorKind::InvalidData,
            std::io::ErrorKind::TimedOut => embedded_io::ErrorKind::TimedOut,
            std::io::ErrorKind::Interrupted => embedded_io::ErrorKind::Interrupted,
            std::io::ErrorKind::Unsupported => embedded_io::ErrorKind::Unsupported,
            std::io::ErrorKind::OutOfMemory => embedded_io::ErrorKind::OutOfMemory,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for PortWrapper {
    type Error = IoError;
}

impl embedded_io::Read for PortWrapper {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        std::io::Read::read(&mut self.0, buf).map_err(IoError)
    }
}

impl embedded_io::Write for PortWrapper {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        std::io::Write::write(&mut self.0, buf).map_err(IoError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        std::io::Write::flush(&mut self.0).map_err(IoError)
    }
}

/// Commands a host would send, already tokenized.
fn script() -> Vec<(Command, ParamList)> {
    vec![
        (Command::Reset, ParamList::new()),
        (
            Command::Apply,
            ParamList::new()
                .with_number(5.0, Unit::Volt)
                .with_number(0.2, Unit::Ampere)
                .with_mnemonic("OUT1"),
        ),
        (Command::Output, ParamList::new().with_bool(true)),
        (
            Command::Apply,
            ParamList::new()
                .with_number(3.3, Unit::Volt)
                .with_mnemonic("MIN")
                .with_mnemonic("OUT2"),
        ),
        (Command::Current, ParamList::new().with_mnemonic("UP")),
        (Command::Output, ParamList::new().with_mnemonic("ON")),
        // Rejected, ends up in the error queue.
        (
            Command::Voltage,
            ParamList::new().with_number(99.0, Unit::None),
        ),
        (Command::SelfTestQuery, ParamList::new()),
    ]
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Get serial port from command line arg or interactive selection
    let port_name = env::args().nth(1).unwrap_or_else(|| {
        let ports = serialport::available_ports().expect("Failed to enumerate serial ports");

        if ports.is_empty() {
            eprintln!("No serial ports found!");
            std::process::exit(1);
        }

        let port_names: Vec<String> = ports.iter().map(|p| p.port_name.clone()).collect();

        Select::new("Select a serial port:", port_names)
            .prompt()
            .expect("Failed to select port")
    });

    println!("Using port: {}", port_name);

    let config = SupplyConfig::default();

    // The modules can take a while to respond, the configured bus timeout is generous.
    let port = serialport::new(&port_name, BAUD_RATE)
        .timeout(std::time::Duration::from_millis(config.bus_timeout.to_millis()))
        .open()
        .expect("Failed to open serial port");
    let port = RefCell::new(PortWrapper(port));

    let modules = [
        ModbusModule::<_, 128>::new(SharedBus::new(&port)),
        ModbusModule::<_, 128>::new(SharedBus::new(&port)),
    ];
    let mut supply = Supply::new(modules, config);
    let mut errors: ErrorQueue = ErrorQueue::new();

    let start = StdInstant::now();
    let now = || Instant::from_ticks(start.elapsed().as_millis() as u64);

    // Let both channels connect first.
    while start.elapsed().as_millis() < 500 {
        supply.poll(now());
    }

    for (command, mut params) in script() {
        match supply.execute(command, &mut params, &mut errors) {
            Ok(response) => println!("{:<50} -> {:?}", command.pattern(), response),
            Err(e) => println!("{:<50} -> error: {}", command.pattern(), e),
        }
        supply.poll(now());
    }

    while start.elapsed().as_millis() < RUN_TIME_MS as u128 {
        if supply.poll(now()) {
            for output in [Output::One, Output::Two] {
                let snapshot = supply.channel(output).snapshot();
                println!(
                    "OUT{} {:?} {:.2}V {:.3}A {:?}",
                    output.number(),
                    snapshot.connection,
                    snapshot.voltage_measured,
                    snapshot.current_measured,
                    snapshot.mode
                );
            }
        }
        while supply.panel_mut().take_beep() {
            println!("*beep*");
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
    }

    println!("\n--- Error queue ---");
    while let Some(error) = errors.next() {
        let (code, message) = ErrorQueue::<16>::code_and_message(Some(error));
        println!("{}, \"{}\"", code, message);
    }
    let (code, message) = ErrorQueue::<16>::code_and_message(None);
    println!("{}, \"{}\"", code, message);
}

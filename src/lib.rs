//! This crate provides the control core of a dual output bench power supply.
//!
//! It keeps the setpoints and live measurements of both outputs, manages the
//! sessions with the power modules on a shared bus, and answers the SCPI style
//! commands a host sends to remote control the supply.
//!
//! It supports `no-std` environments by use of the `no-std` feature flag.
//!
//! The pieces fit together like so:
//! * [`supply::Supply`] owns both [`channel::Channel`]s, the [`instrument::InstrumentRegister`]
//!   and the [`panel::FrontPanel`].
//! * A grammar engine matches command lines against [`command::Command::pattern`] and
//!   calls [`supply::Supply::execute`] with the typed [`params::Parameters`].
//! * Failures go to an [`error_queue::ErrorSink`], usually an [`error_queue::ErrorQueue`].
//! * [`supply::Supply::poll`] refreshes connections and measurements at the configured cadence.
//! * Modules are reached through the [`module::PowerModule`] trait. [`bus::ModbusModule`]
//!   implements it over Modbus RTU.
//!
//! The serial port used for module comms should be configured like so:
//! * Default baud rate: 115200
//! * Data bits: 8
//! * Stop bits: 1
//! * Parity: None

#![cfg_attr(feature = "no-std", no_std)]

pub mod bus;
pub mod channel;
pub mod command;
pub mod config;
pub mod error;
pub mod error_queue;
pub mod instrument;
pub mod module;
pub mod panel;
pub mod params;
pub mod register;
pub mod resolve;
pub mod router;
pub mod scaling;
pub mod supply;

#[cfg(test)]
mod mock_bus;
#[cfg(test)]
mod mock_module;

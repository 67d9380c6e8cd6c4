//! The supply as a whole: both channels, the instrument register, the front panel
//! and the refresh schedule, owned by one context object.
//!
//! A control loop executes pending commands through [`Supply::execute`] and then
//! calls [`Supply::poll`] with the current time:
//!
//! ```ignore
//! loop {
//!     while let Some((command, mut params)) = engine.next_command() {
//!         let _ = supply.execute(command, &mut params, &mut errors);
//!     }
//!     supply.poll(clock.now());
//! }
//! ```

use modular_bitfield::prelude::*;

use crate::{
    channel::{Channel, ChannelSnapshot},
    config::{Instant, SupplyConfig},
    instrument::{CHANNEL_COUNT, InstrumentRegister, Output},
    module::PowerModule,
    panel::FrontPanel,
};

/// Connectivity summary answered to `*TST?`. A set bit means the output's module is not connected.
#[bitfield(bits = 32)]
#[derive(Debug, Clone, Copy)]
pub struct SelfTestReport {
    pub output1_missing: bool,
    pub output2_missing: bool,
    #[skip]
    __: B30,
}

impl From<SelfTestReport> for u32 {
    fn from(report: SelfTestReport) -> Self {
        u32::from_le_bytes(report.into_bytes())
    }
}

/// Everything the display collaborator shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupplySnapshot {
    pub channels: [ChannelSnapshot; CHANNEL_COUNT],
    pub selected: Output,
    pub voltage_step: f32,
    pub current_step: f32,
}

pub struct Supply<M: PowerModule> {
    pub(crate) channels: [Channel<M>; CHANNEL_COUNT],
    pub(crate) register: InstrumentRegister,
    pub(crate) panel: FrontPanel,
    pub(crate) config: SupplyConfig,
    next_refresh: Option<Instant>,
    /// Time of the last handshake attempt, per channel.
    last_attempt: [Option<Instant>; CHANNEL_COUNT],
}

impl<M: PowerModule> Supply<M> {
    /// One module per output, in output order. Channels take their bus
    /// address from the configuration.
    pub fn new(modules: [M; CHANNEL_COUNT], config: SupplyConfig) -> Self {
        let mut index = 0;
        let channels = modules.map(|module| {
            let channel = Channel::new(module, config.addresses[index], config.default_current);
            index += 1;
            channel
        });

        Self {
            channels,
            register: InstrumentRegister::new(&config),
            panel: FrontPanel::default(),
            config,
            next_refresh: None,
            last_attempt: [None; CHANNEL_COUNT],
        }
    }

    /// Refresh connections and measurements if the refresh interval has elapsed.
    ///
    /// Connected channels are ticked on every refresh. A disconnected channel
    /// only gets a handshake attempt once the reconnect interval has passed
    /// since its previous attempt. Returns whether a refresh was due.
    pub fn poll(&mut self, now: Instant) -> bool {
        if let Some(next) = self.next_refresh {
            if now < next {
                return false;
            }
        }
        self.next_refresh = Some(now + self.config.refresh_interval);

        for (channel, last_attempt) in self.channels.iter_mut().zip(self.last_attempt.iter_mut()) {
            if !channel.is_connected() {
                if let Some(last) = *last_attempt {
                    if now < last + self.config.reconnect_interval {
                        continue;
                    }
                }
                *last_attempt = Some(now);
                log::debug!("handshake with module {:#04x}", channel.address());
            }
            channel.tick();
        }
        true
    }

    pub fn channel(&self, output: Output) -> &Channel<M> {
        &self.channels[output.index()]
    }

    pub fn channel_mut(&mut self, output: Output) -> &mut Channel<M> {
        &mut self.channels[output.index()]
    }

    pub fn register(&self) -> &InstrumentRegister {
        &self.register
    }

    pub fn panel(&self) -> &FrontPanel {
        &self.panel
    }

    /// Mutable access for the audio collaborator, see [`FrontPanel::take_beep`].
    pub fn panel_mut(&mut self) -> &mut FrontPanel {
        &mut self.panel
    }

    pub fn config(&self) -> &SupplyConfig {
        &self.config
    }

    pub fn self_test(&self) -> SelfTestReport {
        SelfTestReport::new()
            .with_output1_missing(!self.channel(Output::One).is_connected())
            .with_output2_missing(!self.channel(Output::Two).is_connected())
    }

    pub fn snapshot(&self) -> SupplySnapshot {
        SupplySnapshot {
            channels: [
                self.channel(Output::One).snapshot(),
                self.channel(Output::Two).snapshot(),
            ],
            selected: self.register.selected(),
            voltage_step: self.register.voltage_step(),
            current_step: self.register.current_step(),
        }
    }

    /// Register and panel back to defaults, every channel reset.
    pub fn reset(&mut self) {
        self.register.reset();
        self.panel.reset();
        for channel in self.channels.iter_mut() {
            channel.reset();
        }
    }

    pub(crate) fn selected_channel(&self) -> &Channel<M> {
        self.channel(self.register.selected())
    }

    pub(crate) fn selected_channel_mut(&mut self) -> &mut Channel<M> {
        let output = self.register.selected();
        self.channel_mut(output)
    }
}

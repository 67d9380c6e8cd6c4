//! Power modules attached to a Modbus RTU bus.

use core::cell::RefCell;

use embedded_io::Error as _;

use crate::{
    error::{BusResult, Error},
    module::{PowerModule, RegulationMode},
    register::ModuleRegister,
    scaling::ScalingFactors,
};

/// A [`PowerModule`] reached over any interface implementing [embedded_io::Read] & [embedded_io::Write].
///
/// `L` is the size of the frame buffers.
pub struct ModbusModule<S: embedded_io::Read + embedded_io::Write, const L: usize = 64> {
    interface: S,
    unit_id: u8,
    scaling: ScalingFactors,
}

impl<S: embedded_io::Read + embedded_io::Write, const L: usize> ModbusModule<S, L> {
    /// The unit id is assigned by the first [`PowerModule::connect`].
    pub fn new(interface: S) -> Self {
        Self {
            interface,
            unit_id: 0,
            scaling: ScalingFactors::default(),
        }
    }

    /// Override the register resolution for module variants that differ from the default.
    pub fn with_scaling(mut self, scaling: ScalingFactors) -> Self {
        self.scaling = scaling;
        self
    }

    pub fn unit_id(&self) -> u8 {
        self.unit_id
    }

    /// Write to a single register of the module.
    pub fn write_register(
        &mut self,
        register: impl Into<u16>,
        data: impl Into<u16>,
    ) -> BusResult<(), S::Error> {
        let mut request: heapless::Vec<u8, L> = heapless::Vec::new();
        let mut response: heapless::Vec<u8, L> = heapless::Vec::new();

        let mut req = rmodbus::client::ModbusRequest::new(self.unit_id, rmodbus::ModbusProto::Rtu);
        req.generate_set_holding(register.into(), data.into(), &mut request)?;

        self.interface
            .write_all(&request)
            .map_err(Error::SerialError)?;

        // A successful single register write is echoed back verbatim.
        self.receive(&mut response, request.len())?;
        if request.as_slice() != response.as_slice() {
            Err(Error::InvalidResponse)
        } else {
            Ok(())
        }
    }

    /// Read a single register from the module.
    pub fn read_register(&mut self, register: impl Into<u16>) -> BusResult<u16, S::Error> {
        let mut buff: heapless::Vec<u8, L> = heapless::Vec::new();
        let mut req = rmodbus::client::ModbusRequest::new(self.unit_id, rmodbus::ModbusProto::Rtu);
        req.generate_get_holdings(register.into(), 1, &mut buff)?;

        self.interface
            .write_all(&buff)
            .map_err(Error::SerialError)?;

        buff.clear();
        // unit_id + function + byte_count + 2 data bytes + 2 CRC
        self.receive(&mut buff, 7)?;

        let mut parsed: heapless::Vec<u16, 4> = heapless::Vec::new();
        req.parse_u16(&buff, &mut parsed)
            .map_err(|_| Error::InvalidResponse)?;

        parsed.first().copied().ok_or(Error::InvalidResponse)
    }

    /// Collect a response frame until `expected` bytes arrived or the line went quiet.
    fn receive(
        &mut self,
        frame: &mut heapless::Vec<u8, L>,
        expected: usize,
    ) -> BusResult<(), S::Error> {
        let mut chunk = [0u8; 8];
        while frame.len() < expected {
            match self.interface.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => frame
                    .extend_from_slice(&chunk[..n])
                    .map_err(|_| Error::BufferError)?,
                Err(e) => {
                    // A short frame (e.g. an exception response) ends with a quiet line.
                    if matches!(
                        e.kind(),
                        embedded_io::ErrorKind::Other | embedded_io::ErrorKind::TimedOut
                    ) && !frame.is_empty()
                    {
                        break;
                    }
                    return Err(Error::SerialError(e));
                }
            }
        }
        Ok(())
    }
}

impl<S: embedded_io::Read + embedded_io::Write, const L: usize> PowerModule for ModbusModule<S, L> {
    type Error = Error<S::Error>;

    fn connect(&mut self, address: u8) -> bool {
        self.unit_id = address;
        match self.read_register(ModuleRegister::Model) {
            Ok(model) => {
                log::debug!("module at {:#04x} answered, model {:#06x}", address, model);
                true
            }
            Err(e) => {
                log::debug!("no answer from module at {:#04x}: {:?}", address, e);
                false
            }
        }
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), Self::Error> {
        self.write_register(ModuleRegister::OutputEnable, enabled as u16)
    }

    fn set_voltage_target(&mut self, voltage: f32) -> Result<(), Self::Error> {
        let raw = self.scaling.volts_to_raw(voltage);
        self.write_register(ModuleRegister::VoltageSet, raw)
    }

    fn set_current_target(&mut self, current: f32) -> Result<(), Self::Error> {
        let raw = self.scaling.amps_to_raw(current);
        self.write_register(ModuleRegister::CurrentSet, raw)
    }

    fn read_voltage(&mut self) -> Result<f32, Self::Error> {
        let raw = self.read_register(ModuleRegister::VoltageOut)?;
        Ok(self.scaling.raw_to_volts(raw))
    }

    fn read_current(&mut self) -> Result<f32, Self::Error> {
        let raw = self.read_register(ModuleRegister::CurrentOut)?;
        Ok(self.scaling.raw_to_amps(raw))
    }

    fn read_mode(&mut self) -> Result<RegulationMode, Self::Error> {
        let raw = self.read_register(ModuleRegister::Regulation)?;
        RegulationMode::try_from(raw).map_err(|_| Error::InvalidResponse)
    }

    fn set_address(&mut self, new_address: u8) -> Result<(), Self::Error> {
        if new_address == 0 {
            return Err(Error::InvalidRange);
        }
        self.write_register(ModuleRegister::UnitAddress, new_address as u16)?;
        self.unit_id = new_address;
        Ok(())
    }
}

/// Lets several [`ModbusModule`]s share one port.
///
/// All access happens from the single control loop, so a transaction never
/// overlaps another one.
pub struct SharedBus<'a, S> {
    port: &'a RefCell<S>,
}

impl<'a, S> SharedBus<'a, S> {
    pub fn new(port: &'a RefCell<S>) -> Self {
        Self { port }
    }
}

impl<S: embedded_io::ErrorType> embedded_io::ErrorType for SharedBus<'_, S> {
    type Error = S::Error;
}

impl<S: embedded_io::Read> embedded_io::Read for SharedBus<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.port.borrow_mut().read(buf)
    }
}

impl<S: embedded_io::Write> embedded_io::Write for SharedBus<'_, S> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.port.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.port.borrow_mut().flush()
    }
}

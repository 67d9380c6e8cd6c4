//! Scripted Modbus bus for unit tests.
//!
//! Every frame written releases the next queued response, the way a module
//! only talks after being addressed. With nothing queued the line stays quiet.

pub struct MockBus {
    /// Every byte written to the bus.
    written: heapless::Vec<u8, 256>,
    /// Responses waiting for a request.
    responses: heapless::Deque<heapless::Vec<u8, 32>, 8>,
    /// Response currently readable.
    pending: heapless::Vec<u8, 32>,
    read_position: usize,
    fail_writes: bool,
}

#[derive(Debug)]
pub enum MockBusError {
    /// Nothing to read, the line is quiet.
    Silent,
    BufferOverflow,
    WriteFailure,
}

impl core::fmt::Display for MockBusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl core::error::Error for MockBusError {}

impl embedded_io::Error for MockBusError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockBusError::Silent => embedded_io::ErrorKind::TimedOut,
            MockBusError::BufferOverflow => embedded_io::ErrorKind::OutOfMemory,
            MockBusError::WriteFailure => embedded_io::ErrorKind::BrokenPipe,
        }
    }
}

impl embedded_io::ErrorType for MockBus {
    type Error = MockBusError;
}

impl embedded_io::Write for MockBus {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_writes {
            return Err(MockBusError::WriteFailure);
        }
        self.written
            .extend_from_slice(buf)
            .map_err(|_| MockBusError::BufferOverflow)?;

        self.pending = self.responses.pop_front().unwrap_or_default();
        self.read_position = 0;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl embedded_io::Read for MockBus {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let remaining = &self.pending[self.read_position..];
        if remaining.is_empty() {
            return Err(MockBusError::Silent);
        }
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.read_position += n;
        Ok(n)
    }
}

impl MockBus {
    pub fn new() -> Self {
        Self {
            written: heapless::Vec::new(),
            responses: heapless::Deque::new(),
            pending: heapless::Vec::new(),
            read_position: 0,
            fail_writes: false,
        }
    }

    /// Queue the answer to the next request.
    pub fn queue_response(&mut self, frame: &[u8]) {
        let frame = heapless::Vec::from_slice(frame).expect("response frame too long");
        self.responses
            .push_back(frame)
            .expect("too many queued responses");
    }

    pub fn written_data(&self) -> &[u8] {
        &self.written
    }

    pub fn set_write_error(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

/// Modbus RTU CRC-16, appended low byte first.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = 0xFFFFu16;
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

fn with_crc(body: &[u8]) -> heapless::Vec<u8, 32> {
    let mut frame: heapless::Vec<u8, 32> = heapless::Vec::from_slice(body).unwrap();
    let crc = crc16(body);
    frame.extend_from_slice(&crc.to_le_bytes()).unwrap();
    frame
}

/// Response to a single holding register read.
pub fn read_response(unit_id: u8, value: u16) -> heapless::Vec<u8, 32> {
    let [hi, lo] = value.to_be_bytes();
    with_crc(&[unit_id, 0x03, 0x02, hi, lo])
}

/// Echo of a single register write.
pub fn write_echo(unit_id: u8, register: u16, value: u16) -> heapless::Vec<u8, 32> {
    let [reg_hi, reg_lo] = register.to_be_bytes();
    let [hi, lo] = value.to_be_bytes();
    with_crc(&[unit_id, 0x06, reg_hi, reg_lo, hi, lo])
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Read, Write};

    #[test]
    fn crc_matches_known_frame() {
        let frame = write_echo(0x01, 0x10, 0x1234);
        assert_eq!(frame.as_slice(), &[0x01, 0x06, 0x00, 0x10, 0x12, 0x34, 0x85, 0x78]);
    }

    #[test]
    fn quiet_until_addressed() {
        let mut bus = MockBus::new();
        bus.queue_response(b"pong");

        let mut buffer = [0u8; 8];
        assert!(matches!(bus.read(&mut buffer), Err(MockBusError::Silent)));

        bus.write(b"ping").unwrap();
        assert_eq!(bus.read(&mut buffer).unwrap(), 4);
        assert_eq!(&buffer[..4], b"pong");
        assert!(matches!(bus.read(&mut buffer), Err(MockBusError::Silent)));
    }

    #[test]
    fn partial_reads() {
        let mut bus = MockBus::new();
        bus.queue_response(b"Hello World");
        bus.write(b"?").unwrap();

        let mut first = [0u8; 5];
        let mut second = [0u8; 6];
        assert_eq!(bus.read(&mut first).unwrap(), 5);
        assert_eq!(bus.read(&mut second).unwrap(), 6);
        assert_eq!(&first, b"Hello");
        assert_eq!(&second, b" World");
    }

    #[test]
    fn write_error_simulation() {
        let mut bus = MockBus::new();
        bus.set_write_error(true);

        assert!(matches!(bus.write(b"test"), Err(MockBusError::WriteFailure)));
        assert!(bus.written_data().is_empty());
    }
}

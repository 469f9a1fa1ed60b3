#![allow(missing_docs)]
//! Host tests for the 23K256 adapter: command framing and fault latching.

use embedded_hal::spi::{Error, ErrorKind, ErrorType, Operation, SpiDevice};
use strand_kit::sram::{Spi23k256, SramAlloc, SramBus};

/// Records every transaction and answers reads with `0x5A`.
#[derive(Default)]
struct RecordingSpi {
    writes: Vec<Vec<u8>>,
}

impl ErrorType for RecordingSpi {
    type Error = BusFault;
}

impl SpiDevice for RecordingSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), BusFault> {
        let mut written = Vec::new();
        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => written.extend_from_slice(bytes),
                Operation::Read(buf) => buf.fill(0x5A),
                _ => panic!("adapter only issues writes and reads"),
            }
        }
        self.writes.push(written);
        Ok(())
    }
}

/// Succeeds for a fixed number of transactions, then fails forever.
struct FailsAfter {
    remaining_ok: usize,
}

#[derive(Debug)]
struct BusFault;

impl Error for BusFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl ErrorType for FailsAfter {
    type Error = BusFault;
}

impl SpiDevice for FailsAfter {
    fn transaction(&mut self, _operations: &mut [Operation<'_, u8>]) -> Result<(), BusFault> {
        if self.remaining_ok == 0 {
            return Err(BusFault);
        }
        self.remaining_ok -= 1;
        Ok(())
    }
}

#[test]
fn commands_carry_big_endian_addresses() {
    let mut alloc = SramAlloc::with_capacity(1000);
    let first = alloc.alloc(100).unwrap();
    let second = alloc.alloc(100).unwrap();
    assert_eq!(second.offset(), 101);

    let mut spi = RecordingSpi::default();
    let mut part = Spi23k256::new(&mut spi);
    part.write_stream(second, &[7, 8, 9]);
    let mut buf = [0u8; 2];
    part.read_stream(first, &mut buf);

    assert_eq!(buf, [0x5A, 0x5A]);
    assert_eq!(spi.writes.len(), 3);
    // Sequential mode select, then WRITE at 101, then READ at 1.
    assert_eq!(spi.writes[0], [0x01, 0x40]);
    assert_eq!(spi.writes[1], [0x02, 0x00, 0x65, 7, 8, 9]);
    assert_eq!(spi.writes[2], [0x03, 0x00, 0x01]);
}

#[test]
fn dead_bus_faults_at_construction() {
    let mut alloc = SramAlloc::with_capacity(64);
    let addr = alloc.alloc(8).unwrap();

    let mut part = Spi23k256::new(FailsAfter { remaining_ok: 0 });
    assert!(part.is_faulted());

    part.write_stream(addr, &[1, 2, 3, 4]);
    let mut buf = [0xFF; 4];
    part.read_stream(addr, &mut buf);
    assert_eq!(buf, [0, 0, 0, 0]);
    assert!(part.is_faulted());
}

#[test]
fn later_fault_latches_and_zero_fills_reads() {
    let mut alloc = SramAlloc::with_capacity(64);
    let addr = alloc.alloc(8).unwrap();

    // Mode select succeeds; the first data transfer does not.
    let mut part = Spi23k256::new(FailsAfter { remaining_ok: 1 });
    assert!(!part.is_faulted());

    part.write_stream(addr, &[1, 2, 3]);
    assert!(part.is_faulted());

    let mut buf = [0xFF; 3];
    part.read_stream(addr, &mut buf);
    assert_eq!(buf, [0, 0, 0]);
}

//! Simulated two-wire bus with one register-file slave
//!
//! The master engine only ever touches the bus through the `bitbus-hal`
//! traits, so the simulation implements those traits over a shared
//! wired-AND line model and steps a slave state machine on every edge
//! the master produces. The slave mirrors a generic register device:
//! it acks its own address, consumes the configured number of pointer
//! bytes, stores/serves data bytes at the pointer, and can be told to
//! misbehave (NACK a given data byte, stretch the clock forever, or
//! hold the bus from the outset).

// Not every test file exercises every helper.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bitbus_core::{Address, BusMaster};
use bitbus_hal::{BitDelay, OpenDrainLine, Watchdog};

/// Default watchdog bound for simulated masters, in poll iterations
pub const WATCHDOG_POLLS: u32 = 32;

/// No-op bit timing; the simulation advances on edges, not time
pub struct NoDelay;

impl BitDelay for NoDelay {
    fn half_bit(&mut self) {}
}

/// Watchdog that treats each `is_expired` poll as one elapsed tick
pub struct PollWatchdog {
    limit: u32,
    left: Cell<u32>,
}

impl PollWatchdog {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            left: Cell::new(limit),
        }
    }
}

impl Watchdog for PollWatchdog {
    fn arm(&mut self) {
        self.left.set(self.limit);
    }

    fn is_expired(&self) -> bool {
        let left = self.left.get();
        if left == 0 {
            true
        } else {
            self.left.set(left - 1);
            false
        }
    }
}

/// [`PollWatchdog`] that also records how many expiry polls each
/// armed wait consumed
///
/// A wait that runs all the way to the bound consumes exactly
/// `limit + 1` polls: `limit` negative answers plus the one that
/// reports expiry.
pub struct MeteredWatchdog {
    limit: u32,
    left: Cell<u32>,
    cycles: Rc<RefCell<Vec<u32>>>,
}

impl MeteredWatchdog {
    pub fn new(limit: u32) -> (Self, Rc<RefCell<Vec<u32>>>) {
        let cycles = Rc::new(RefCell::new(Vec::new()));
        let watchdog = Self {
            limit,
            left: Cell::new(limit),
            cycles: Rc::clone(&cycles),
        };
        (watchdog, cycles)
    }
}

impl Watchdog for MeteredWatchdog {
    fn arm(&mut self) {
        self.left.set(self.limit);
        self.cycles.borrow_mut().push(0);
    }

    fn is_expired(&self) -> bool {
        if let Some(current) = self.cycles.borrow_mut().last_mut() {
            *current += 1;
        }
        let left = self.left.get();
        if left == 0 {
            true
        } else {
            self.left.set(left - 1);
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line {
    Scl,
    Sda,
}

/// Receive sub-phase: what the next received byte means
#[derive(Debug, Clone, Copy)]
enum Phase {
    /// Address + direction byte
    Address,
    /// Register pointer bytes, high byte first
    Pointer { acc: u16, received: usize },
    /// Payload bytes stored at the pointer
    Data,
}

#[derive(Debug, Clone, Copy)]
enum SlaveState {
    Idle,
    /// Master transmits; `edges` counts rising clock edges of the
    /// current byte (1-8 data, 9 = ack slot)
    Receive {
        edges: u8,
        shift: u8,
        phase: Phase,
        will_ack: bool,
    },
    /// Slave transmits; same edge counting, ack slot owned by master
    Transmit {
        edges: u8,
        shift: u8,
        acked: bool,
    },
    /// Declined or finished; ignore clocks until start/stop
    WaitStop,
}

struct Slave {
    addr: u8,
    ptr_width: usize,
    regs: Vec<u8>,
    pointer: usize,
    /// true = not driving the line
    sda_release: bool,
    scl_release: bool,
    /// Hold SCL low from the first ack slot onward (device that never
    /// releases the line)
    stretch_at_ack: bool,
    /// NACK the n-th data byte of a write (1-based)
    nack_data_byte: Option<usize>,
    data_bytes_received: usize,
    stops_seen: usize,
    state: SlaveState,
    /// Staged during the ack slot, applied when it ends
    next_phase: Phase,
    read_selected: bool,
}

impl Slave {
    fn new(addr: u8, ptr_width: usize, size: usize) -> Self {
        Self {
            addr,
            ptr_width,
            regs: vec![0; size],
            pointer: 0,
            sda_release: true,
            scl_release: true,
            stretch_at_ack: false,
            nack_data_byte: None,
            data_bytes_received: 0,
            stops_seen: 0,
            state: SlaveState::Idle,
            next_phase: Phase::Address,
            read_selected: false,
        }
    }

    fn on_start(&mut self) {
        self.sda_release = true;
        self.read_selected = false;
        self.state = SlaveState::Receive {
            edges: 0,
            shift: 0,
            phase: Phase::Address,
            will_ack: false,
        };
    }

    fn on_stop(&mut self) {
        self.sda_release = true;
        self.stops_seen += 1;
        self.state = SlaveState::Idle;
    }

    fn on_scl_rise(&mut self, sda: bool) {
        match self.state {
            SlaveState::Receive {
                ref mut edges,
                ref mut shift,
                ..
            } => {
                if *edges < 8 {
                    *shift = (*shift << 1) | u8::from(sda);
                }
                *edges += 1;
            }
            SlaveState::Transmit {
                ref mut edges,
                ref mut acked,
                ..
            } => {
                *edges += 1;
                if *edges == 9 {
                    // Master drives the ack slot on reads: low = more
                    *acked = !sda;
                }
            }
            SlaveState::Idle | SlaveState::WaitStop => {}
        }
    }

    fn on_scl_fall(&mut self) {
        let snapshot = self.state;
        match snapshot {
            SlaveState::Receive {
                edges: 8,
                shift,
                phase,
                ..
            } => {
                let ack = self.byte_received(shift, phase);
                if ack {
                    self.sda_release = false;
                }
                if self.stretch_at_ack {
                    self.scl_release = false;
                }
                if let SlaveState::Receive {
                    ref mut will_ack, ..
                } = self.state
                {
                    *will_ack = ack;
                }
            }
            SlaveState::Receive {
                edges: 9, will_ack, ..
            } => {
                self.sda_release = true;
                if will_ack {
                    if self.read_selected {
                        self.read_selected = false;
                        self.load_transmit_byte();
                    } else {
                        self.state = SlaveState::Receive {
                            edges: 0,
                            shift: 0,
                            phase: self.next_phase,
                            will_ack: false,
                        };
                    }
                } else {
                    self.state = SlaveState::WaitStop;
                }
            }
            SlaveState::Transmit {
                edges,
                shift,
                acked,
            } => match edges {
                1..=7 => {
                    let shift = shift << 1;
                    self.sda_release = shift & 0x80 != 0;
                    self.state = SlaveState::Transmit {
                        edges,
                        shift,
                        acked,
                    };
                }
                8 => self.sda_release = true,
                9 => {
                    self.sda_release = true;
                    if acked {
                        self.load_transmit_byte();
                    } else {
                        self.state = SlaveState::WaitStop;
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    /// Decide the acknowledgment for a completed byte and stage the
    /// next phase
    fn byte_received(&mut self, byte: u8, phase: Phase) -> bool {
        match phase {
            Phase::Address => {
                if byte >> 1 != self.addr {
                    return false;
                }
                self.read_selected = byte & 1 == 1;
                self.next_phase = if !self.read_selected && self.ptr_width > 0 {
                    Phase::Pointer {
                        acc: 0,
                        received: 0,
                    }
                } else {
                    Phase::Data
                };
                true
            }
            Phase::Pointer { acc, received } => {
                let acc = (acc << 8) | u16::from(byte);
                let received = received + 1;
                if received == self.ptr_width {
                    self.pointer = acc as usize % self.regs.len();
                    self.next_phase = Phase::Data;
                } else {
                    self.next_phase = Phase::Pointer { acc, received };
                }
                true
            }
            Phase::Data => {
                self.data_bytes_received += 1;
                if self.nack_data_byte == Some(self.data_bytes_received) {
                    return false;
                }
                self.regs[self.pointer] = byte;
                self.pointer = (self.pointer + 1) % self.regs.len();
                self.next_phase = Phase::Data;
                true
            }
        }
    }

    fn load_transmit_byte(&mut self) {
        let shift = self.regs[self.pointer];
        self.pointer = (self.pointer + 1) % self.regs.len();
        self.sda_release = shift & 0x80 != 0;
        self.state = SlaveState::Transmit {
            edges: 0,
            shift,
            acked: false,
        };
    }
}

struct BusState {
    /// true = released
    master_scl: bool,
    master_sda: bool,
    /// Last resolved (wired-AND) line levels
    scl_level: bool,
    sda_level: bool,
    slave: Slave,
}

impl BusState {
    /// Re-resolve the lines and fire slave edge handlers until stable
    fn settle(&mut self) {
        loop {
            let scl = self.master_scl && self.slave.scl_release;
            let sda = self.master_sda && self.slave.sda_release;
            let (prev_scl, prev_sda) = (self.scl_level, self.sda_level);
            if scl == prev_scl && sda == prev_sda {
                return;
            }
            self.scl_level = scl;
            self.sda_level = sda;

            if scl != prev_scl {
                if scl {
                    self.slave.on_scl_rise(sda);
                } else {
                    self.slave.on_scl_fall();
                }
            }
            // Start/stop: SDA transition while the clock stays high
            if sda != prev_sda && scl && prev_scl {
                if sda {
                    self.slave.on_stop();
                } else {
                    self.slave.on_start();
                }
            }
        }
    }
}

/// Handle on the shared simulated bus
#[derive(Clone)]
pub struct SimBus {
    state: Rc<RefCell<BusState>>,
}

impl SimBus {
    /// Healthy bus with one register device attached
    ///
    /// `ptr_width` is the number of register-pointer bytes the device
    /// expects on writes (0, 1 or 2); `size` is its register count.
    pub fn with_device(addr: u8, ptr_width: usize, size: usize) -> Self {
        Self::build(Slave::new(addr, ptr_width, size))
    }

    /// Bus held low by a wedged device; nothing ever responds
    pub fn held() -> Self {
        let mut slave = Slave::new(0, 0, 1);
        slave.scl_release = false;
        Self::build(slave)
    }

    fn build(slave: Slave) -> Self {
        let mut state = BusState {
            master_scl: true,
            master_sda: true,
            scl_level: true,
            sda_level: true,
            slave,
        };
        state.scl_level = state.master_scl && state.slave.scl_release;
        state.sda_level = state.master_sda && state.slave.sda_release;
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Make the device NACK the n-th data byte of a write (1-based)
    pub fn nack_data_byte(&self, n: usize) {
        self.state.borrow_mut().slave.nack_data_byte = Some(n);
    }

    /// Make the device hold SCL low from the first ack slot onward
    pub fn stretch_at_ack(&self) {
        self.state.borrow_mut().slave.stretch_at_ack = true;
    }

    pub fn scl(&self) -> SimLine {
        SimLine {
            state: Rc::clone(&self.state),
            line: Line::Scl,
        }
    }

    pub fn sda(&self) -> SimLine {
        SimLine {
            state: Rc::clone(&self.state),
            line: Line::Sda,
        }
    }

    /// Bus master wired to this bus with the default watchdog bound
    pub fn master(&self) -> BusMaster<SimLine, SimLine, NoDelay, PollWatchdog> {
        BusMaster::new(
            self.scl(),
            self.sda(),
            NoDelay,
            PollWatchdog::new(WATCHDOG_POLLS),
        )
    }

    pub fn reg(&self, index: usize) -> u8 {
        self.state.borrow().slave.regs[index]
    }

    pub fn set_reg(&self, index: usize, value: u8) {
        self.state.borrow_mut().slave.regs[index] = value;
    }

    /// Data bytes the device has seen on writes, NACKed ones included
    pub fn data_bytes_received(&self) -> usize {
        self.state.borrow().slave.data_bytes_received
    }

    /// Stop conditions the device has observed
    pub fn stops_seen(&self) -> usize {
        self.state.borrow().slave.stops_seen
    }

    /// Both lines high and nobody driving
    pub fn is_idle(&self) -> bool {
        let state = self.state.borrow();
        state.scl_level && state.sda_level
    }
}

/// [`Address`] helper for test literals
pub fn addr(value: u8) -> Address {
    Address::new(value).expect("test address fits 7 bits")
}

/// One wire of the simulated bus
pub struct SimLine {
    state: Rc<RefCell<BusState>>,
    line: Line,
}

impl OpenDrainLine for SimLine {
    fn drive_low(&mut self) {
        let mut state = self.state.borrow_mut();
        match self.line {
            Line::Scl => state.master_scl = false,
            Line::Sda => state.master_sda = false,
        }
        state.settle();
    }

    fn release(&mut self) {
        let mut state = self.state.borrow_mut();
        match self.line {
            Line::Scl => state.master_scl = true,
            Line::Sda => state.master_sda = true,
        }
        state.settle();
    }

    fn is_high(&self) -> bool {
        let state = self.state.borrow();
        match self.line {
            Line::Scl => state.scl_level,
            Line::Sda => state.sda_level,
        }
    }
}

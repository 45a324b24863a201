//! CAN message subsystem interface.
//!
//! The engines never touch the controller directly. Everything goes
//! through [`CanBus`], implemented by the TWAI driver on target and by
//! mocks on the host.

use crate::config::FILTER_COUNT;

/// Highest standard (11-bit) identifier.
pub const STANDARD_ID_MAX: u32 = 0x7FF;

/// Highest extended (29-bit) identifier.
pub const EXTENDED_ID_MAX: u32 = 0x1FFF_FFFF;

/// One CAN message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    pub id: u32,
    pub extended: bool,
    pub rtr: bool,
    /// Data length code, 0..=8.
    pub length: u8,
    pub data: [u8; 8],
    /// Receive timestamp, controller ticks (wraps).
    pub timestamp: u16,
}

impl Frame {
    /// Data frame. Returns `None` if `data` is longer than 8 bytes.
    pub fn new_data(id: u32, extended: bool, data: &[u8]) -> Option<Self> {
        if data.len() > 8 {
            return None;
        }
        let mut buf = [0u8; 8];
        buf[..data.len()].copy_from_slice(data);
        Some(Self {
            id,
            extended,
            rtr: false,
            length: data.len() as u8,
            data: buf,
            timestamp: 0,
        })
    }

    /// Remote frame requesting `length` bytes.
    pub fn new_remote(id: u32, extended: bool, length: u8) -> Option<Self> {
        if length > 8 {
            return None;
        }
        Some(Self {
            id,
            extended,
            rtr: true,
            length,
            data: [0u8; 8],
            timestamp: 0,
        })
    }

    /// Payload bytes (empty for remote frames).
    pub fn payload(&self) -> &[u8] {
        if self.rtr {
            &[]
        } else {
            &self.data[..(self.length as usize).min(8)]
        }
    }

    /// True if the identifier fits the 11/29-bit range of its format.
    pub fn id_in_range(&self) -> bool {
        if self.extended {
            self.id <= EXTENDED_ID_MAX
        } else {
            self.id <= STANDARD_ID_MAX
        }
    }
}

/// Bus bitrate, in controller slot order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Bitrate {
    Kbps10 = 0,
    Kbps20 = 1,
    Kbps50 = 2,
    Kbps100 = 3,
    Kbps125 = 4,
    Kbps250 = 5,
    Kbps500 = 6,
    Mbps1 = 7,
}

impl Bitrate {
    /// Slot index, 0..=7.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Convert from slot index.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Bitrate::Kbps10),
            1 => Some(Bitrate::Kbps20),
            2 => Some(Bitrate::Kbps50),
            3 => Some(Bitrate::Kbps100),
            4 => Some(Bitrate::Kbps125),
            5 => Some(Bitrate::Kbps250),
            6 => Some(Bitrate::Kbps500),
            7 => Some(Bitrate::Mbps1),
            _ => None,
        }
    }

    /// Bitrate in kbit/s.
    pub fn kbps(self) -> u32 {
        match self {
            Bitrate::Kbps10 => 10,
            Bitrate::Kbps20 => 20,
            Bitrate::Kbps50 => 50,
            Bitrate::Kbps100 => 100,
            Bitrate::Kbps125 => 125,
            Bitrate::Kbps250 => 250,
            Bitrate::Kbps500 => 500,
            Bitrate::Mbps1 => 1000,
        }
    }

    /// Convert from kbit/s. Only exact matches.
    pub fn from_kbps(kbps: u32) -> Option<Self> {
        (0..8)
            .filter_map(Self::from_index)
            .find(|b| b.kbps() == kbps)
    }
}

/// Controller operating mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CanMode {
    Normal,
    ListenOnly,
}

/// Identifier format a filter accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdKind {
    Any,
    Standard,
    Extended,
}

/// Frame type a filter accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RtrKind {
    Any,
    DataOnly,
    RemoteOnly,
}

/// Acceptance filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Filter {
    pub mask: u32,
    pub id: u32,
    pub id_kind: IdKind,
    pub rtr: RtrKind,
}

impl Filter {
    /// Filter that lets every frame through.
    pub const RECEIVE_ALL: Filter = Filter {
        mask: 0,
        id: 0,
        id_kind: IdKind::Any,
        rtr: RtrKind::Any,
    };

    /// Check a frame against this filter.
    pub fn matches(&self, frame: &Frame) -> bool {
        let kind_ok = match self.id_kind {
            IdKind::Any => true,
            IdKind::Standard => !frame.extended,
            IdKind::Extended => frame.extended,
        };
        let rtr_ok = match self.rtr {
            RtrKind::Any => true,
            RtrKind::DataOnly => !frame.rtr,
            RtrKind::RemoteOnly => frame.rtr,
        };
        kind_ok && rtr_ok && (frame.id & self.mask) == (self.id & self.mask)
    }
}

/// Result of reading back a filter slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterState {
    /// Slot could not be read (bad index, controller error).
    Error,
    Active(Filter),
    /// Slot exists but is disabled.
    Unused,
    /// Controller cannot report the slot right now.
    Unknown,
}

/// Receive/transmit error counters of the controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ErrorCounters {
    pub rx: u8,
    pub tx: u8,
}

/// CAN controller as seen by the protocol engines.
///
/// All calls must return promptly. `poll_received` returns `None` when
/// nothing is pending.
pub trait CanBus {
    /// Queue a frame for transmission. `false` if it was not accepted.
    fn send(&mut self, frame: &Frame) -> bool;

    /// Take the next received frame, if any.
    fn poll_received(&mut self) -> Option<Frame>;

    fn set_filter(&mut self, index: u8, filter: &Filter) -> bool;

    fn get_filter(&mut self, index: u8) -> FilterState;

    fn disable_filter(&mut self, index: u8) -> bool;

    /// Reconfigure the bus bitrate. Clears all filters.
    fn set_bitrate(&mut self, bitrate: Bitrate);

    fn set_mode(&mut self, mode: CanMode);

    fn read_error_counters(&mut self) -> ErrorCounters;

    /// Restart the receive timestamp counter.
    fn reset_timestamp(&mut self) {}

    /// Disable every filter slot. `false` if any slot failed.
    fn disable_all_filters(&mut self) -> bool {
        (0..FILTER_COUNT).fold(true, |ok, i| self.disable_filter(i) && ok)
    }
}

/// Software filter bank.
///
/// Message-object controllers have one filter per mailbox; the TWAI has
/// a single acceptance filter, so the per-slot semantics live here.
#[derive(Clone, Debug)]
pub struct FilterBank {
    slots: [Option<Filter>; FILTER_COUNT as usize],
}

impl FilterBank {
    /// All slots disabled.
    pub const fn new() -> Self {
        Self {
            slots: [None; FILTER_COUNT as usize],
        }
    }

    pub fn set(&mut self, index: u8, filter: &Filter) -> bool {
        match self.slots.get_mut(index as usize) {
            Some(slot) => {
                *slot = Some(*filter);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, index: u8) -> FilterState {
        match self.slots.get(index as usize) {
            Some(Some(filter)) => FilterState::Active(*filter),
            Some(None) => FilterState::Unused,
            None => FilterState::Error,
        }
    }

    pub fn disable(&mut self, index: u8) -> bool {
        match self.slots.get_mut(index as usize) {
            Some(slot) => {
                *slot = None;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.slots = [None; FILTER_COUNT as usize];
    }

    /// A frame is accepted if any enabled slot matches it.
    pub fn accepts(&self, frame: &Frame) -> bool {
        self.slots.iter().flatten().any(|f| f.matches(frame))
    }
}

impl Default for FilterBank {
    fn default() -> Self {
        Self::new()
    }
}

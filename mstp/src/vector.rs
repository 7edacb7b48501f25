//! Bridge and port identifiers, priority vectors and timer parameters.
//!
//! Everything that decides "which path to the root is better" goes through
//! the derived ordering of [`PriorityVector`]: the fields are compared
//! lexicographically in declaration order and the numerically smaller vector
//! wins.

use core::cmp::Ordering;
use core::fmt;

/// A 48-bit Ethernet MAC address.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct EtherAddr(pub [u8; 6]);

impl EtherAddr {
    /// Construct an Ethernet address from a sequence of octets, in big-endian.
    ///
    /// # Panics
    /// The function panics if `data` is not six octets long.
    pub fn from_bytes(data: &[u8]) -> EtherAddr {
        let mut bytes = [0; 6];
        bytes.copy_from_slice(data);
        EtherAddr(bytes)
    }

    /// Return an Ethernet address as a sequence of octets, in big-endian.
    pub const fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Query whether the 'multicast' bit in the OUI is set.
    pub const fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    /// Parse a string with the form 'Aa:0b:Cc:11:02:33' into `EtherAddr`.
    pub fn parse_from<T: AsRef<str>>(s: T) -> Option<Self> {
        let mut result = [0; 6];
        let mut parts = s.as_ref().split(':');
        for byte in result.iter_mut() {
            let part = parts.next()?;
            if part.len() != 2 {
                return None;
            }
            *byte = u8::from_str_radix(part, 16).ok()?;
        }
        match parts.next() {
            Some(_) => None,
            None => Some(EtherAddr(result)),
        }
    }
}

impl fmt::Display for EtherAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5]
        )
    }
}

/// `BridgeId` represents the root/bridge identifier from the stp protocol.
///
/// The root/bridge identifier contains the following fields:
/// * Priority: 4 bits, accessed with `priority`/`set_priority`.
/// * System ID extension: 12 bits, accessed with `sys_id_ext`/`set_sys_id_ext`.
///   For MSTP this carries the MSTID of the tree the identifier belongs to.
/// * MAC address: 48 bits, accessed with `mac_addr`/`set_mac_addr`.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct BridgeId(pub [u8; 8]);

impl BridgeId {
    /// Build an identifier from its three components.
    ///
    /// # Panics
    ///
    /// `priority` is not a multiple of 4096 or `sys_id_ext` does not fit in
    /// 12 bits.
    #[inline]
    pub fn new(priority: u16, sys_id_ext: u16, mac: EtherAddr) -> Self {
        let mut id = Self::default();
        id.set_priority(priority);
        id.set_sys_id_ext(sys_id_ext);
        id.set_mac_addr(mac);
        id
    }

    /// Convert byte slice to `BridgeId`.
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut buf = [0; 8];
        buf.copy_from_slice(bytes);
        Self(buf)
    }

    /// Create a byte slice from the `BridgeId`.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The identifier as a big-endian integer.
    #[inline]
    pub fn to_u64(&self) -> u64 {
        u64::from_be_bytes(self.0)
    }

    /// Build the identifier from a big-endian integer.
    #[inline]
    pub fn from_u64(value: u64) -> Self {
        Self(value.to_be_bytes())
    }

    /// Get the priority from the `BridgeId`.
    ///
    /// Note: the result is a multiple of 4096.
    #[inline]
    pub fn priority(&self) -> u16 {
        ((self.0[0] >> 4) as u16) << 12
    }

    /// Get the system id extension from the `BridgeId`.
    #[inline]
    pub fn sys_id_ext(&self) -> u16 {
        u16::from_be_bytes([self.0[0], self.0[1]]) & 0xfff
    }

    /// Get the mac address from the `BridgeId`.
    #[inline]
    pub fn mac_addr(&self) -> EtherAddr {
        EtherAddr::from_bytes(&self.0[2..8])
    }

    /// Set the priority for the `BridgeId`.
    ///
    /// # Panics
    ///
    /// The lower 12 bits of `value` is not all zero.
    #[inline]
    pub fn set_priority(&mut self, value: u16) {
        assert!(value & 0x0fff == 0);
        let value = (value >> 12) as u8;
        self.0[0] = (self.0[0] & 0x0f) | (value << 4);
    }

    /// Set the system id extension for the `BridgeId`.
    #[inline]
    pub fn set_sys_id_ext(&mut self, value: u16) {
        assert!(value <= 0xfff);
        let write_value = ((self.0[0] & 0xf0) as u16) << 8 | value;
        self.0[0..2].copy_from_slice(&write_value.to_be_bytes());
    }

    /// Set the mac address for the `BridgeId`.
    #[inline]
    pub fn set_mac_addr(&mut self, value: EtherAddr) {
        self.0[2..8].copy_from_slice(value.as_bytes());
    }
}

impl fmt::Display for BridgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:x}.{:03x}.{}",
            self.priority() >> 12,
            self.sys_id_ext(),
            self.mac_addr()
        )
    }
}

/// A port identifier: a 4-bit priority followed by a 12-bit port number.
///
/// Port numbers start at 1; port index `i` of a bridge has number `i + 1`.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct PortId(pub u16);

impl PortId {
    /// Build an identifier from a priority (a multiple of 16) and a port
    /// number.
    #[inline]
    pub fn new(priority: u8, number: u16) -> Self {
        assert!(priority & 0x0f == 0);
        assert!(number <= 0xfff);
        Self(((priority as u16) << 8) | number)
    }

    /// Get the priority, a multiple of 16.
    #[inline]
    pub fn priority(&self) -> u8 {
        ((self.0 >> 8) as u8) & 0xf0
    }

    /// Get the port number.
    #[inline]
    pub fn number(&self) -> u16 {
        self.0 & 0xfff
    }

    /// Set the port priority.
    ///
    /// # Panics
    ///
    /// The lower 4 bits of `priority` are not all zero.
    #[inline]
    pub fn set_priority(&mut self, priority: u8) {
        assert!(priority & 0x0f == 0);
        self.0 = ((priority as u16) << 8) | self.number();
    }

    /// The identifier as sent on the wire.
    #[inline]
    pub fn raw(&self) -> u16 {
        self.0
    }
}

/// The seven-component priority vector of 802.1Q-2011 §13.10.
///
/// MSTI vectors leave `root_id` and `external_root_path_cost` at zero, so
/// that the same ordering serves the CIST and every MSTI.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct PriorityVector {
    /// CIST root identifier.
    pub root_id: BridgeId,
    /// Cost to the CIST root from the region.
    pub external_root_path_cost: u32,
    /// Regional root identifier.
    pub regional_root_id: BridgeId,
    /// Cost to the regional root.
    pub internal_root_path_cost: u32,
    /// Identifier of the bridge that sent the information.
    pub designated_bridge_id: BridgeId,
    /// Identifier of the port that sent the information.
    pub designated_port_id: PortId,
    /// Identifier of the port that received it. Only breaks ties between
    /// the ports of one bridge.
    pub bridge_port_id: PortId,
}

/// Size of [`PriorityVector::to_bytes`].
pub const PRIORITY_VECTOR_LEN: usize = 36;

impl PriorityVector {
    /// Compare the components that describe the transmitting port, leaving
    /// out the receiving port identifier.
    #[inline]
    pub fn cmp_designated(&self, other: &Self) -> Ordering {
        (
            self.root_id,
            self.external_root_path_cost,
            self.regional_root_id,
            self.internal_root_path_cost,
            self.designated_bridge_id,
            self.designated_port_id,
        )
            .cmp(&(
                other.root_id,
                other.external_root_path_cost,
                other.regional_root_id,
                other.internal_root_path_cost,
                other.designated_bridge_id,
                other.designated_port_id,
            ))
    }

    /// `true` when `self` is better than or the same as `other`.
    #[inline]
    pub fn is_better_or_same(&self, other: &Self) -> bool {
        self.cmp_designated(other) != Ordering::Greater
    }

    /// The "superior" relation used to validate received information.
    ///
    /// A message is superior when it is better, or when it was sent by the
    /// same designated bridge and port as the information it replaces.
    #[inline]
    pub fn is_superior_to(&self, other: &Self) -> bool {
        match self.cmp_designated(other) {
            Ordering::Less => true,
            Ordering::Equal => false,
            Ordering::Greater => {
                self.designated_bridge_id.mac_addr() == other.designated_bridge_id.mac_addr()
                    && self.designated_port_id.number() == other.designated_port_id.number()
            }
        }
    }

    /// Serialize the vector in transmission order.
    pub fn to_bytes(&self) -> [u8; PRIORITY_VECTOR_LEN] {
        let mut buf = [0; PRIORITY_VECTOR_LEN];
        buf[0..8].copy_from_slice(self.root_id.as_bytes());
        buf[8..12].copy_from_slice(&self.external_root_path_cost.to_be_bytes());
        buf[12..20].copy_from_slice(self.regional_root_id.as_bytes());
        buf[20..24].copy_from_slice(&self.internal_root_path_cost.to_be_bytes());
        buf[24..32].copy_from_slice(self.designated_bridge_id.as_bytes());
        buf[32..34].copy_from_slice(&self.designated_port_id.0.to_be_bytes());
        buf[34..36].copy_from_slice(&self.bridge_port_id.0.to_be_bytes());
        buf
    }
}

/// Add a port path cost to a root path cost, saturating at `u32::MAX`.
#[inline]
pub fn add_path_cost(root_path_cost: u32, port_path_cost: u32) -> u32 {
    root_path_cost.saturating_add(port_path_cost)
}

/// Timer parameters carried by a BPDU, in whole seconds.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, Default)]
pub struct Times {
    /// Age of the information.
    pub message_age: u16,
    /// Age at which the information is discarded.
    pub max_age: u16,
    /// Time spent in each of the discarding and learning states.
    pub forward_delay: u16,
    /// Interval between BPDUs.
    pub hello_time: u16,
    /// MST hops left.
    pub remaining_hops: u8,
}

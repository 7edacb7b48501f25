//! Bridge parameters and the MST configuration identifier.

use hmac::{Hmac, Mac};
use md5::Md5;

use crate::error::{BridgeError, Result};
use crate::vector::EtherAddr;

/// Size of the configuration name field of an MST BPDU.
pub const MST_CONFIG_NAME_LEN: usize = 32;

/// Number of entries of the VLAN to MSTID table.
pub const VLAN_TABLE_LEN: usize = 4096;

/// Key of the HMAC-MD5 configuration digest (802.1Q-2011 §13.7).
const MST_CONFIG_DIGEST_KEY: [u8; 16] = [
    0x13, 0xac, 0x06, 0xa6, 0x2e, 0x47, 0xfd, 0x51, 0xf9, 0x5d, 0x2b, 0xa2, 0x43, 0xcd, 0x03, 0x46,
];

/// The protocol a bridge is forced to run (ForceProtocolVersion).
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub enum StpVersion {
    /// 802.1D-1998 spanning tree: Config and TCN BPDUs only.
    LegacyStp = 0,
    /// Rapid spanning tree.
    Rstp = 2,
    /// Multiple spanning trees.
    #[default]
    Mstp = 3,
}

impl StpVersion {
    /// `rstpVersion`: the bridge may send RST or MST BPDUs.
    #[inline]
    pub fn is_rstp(&self) -> bool {
        *self >= StpVersion::Rstp
    }

    /// `stpVersion`: the bridge is forced to legacy behaviour.
    #[inline]
    pub fn is_stp(&self) -> bool {
        *self < StpVersion::Rstp
    }

    /// The bridge runs MSTP and takes part in MST regions.
    #[inline]
    pub fn is_mstp(&self) -> bool {
        *self >= StpVersion::Mstp
    }
}

/// Administrative point-to-point setting of a port (adminPointToPointMAC).
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, Default)]
pub enum AdminP2P {
    /// Always a point-to-point link.
    ForceTrue,
    /// Never a point-to-point link.
    ForceFalse,
    /// Follow the duplex mode the host reports when enabling the port.
    #[default]
    Auto,
}

impl AdminP2P {
    pub(crate) fn resolve(&self, detected: bool) -> bool {
        match self {
            AdminP2P::ForceTrue => true,
            AdminP2P::ForceFalse => false,
            AdminP2P::Auto => detected,
        }
    }
}

/// Bridge-wide protocol parameters.
///
/// Times are in seconds. The defaults are the ones recommended by 802.1Q.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Highest protocol version the bridge speaks.
    pub force_version: StpVersion,
    /// Interval between BPDUs while this bridge is the root.
    pub hello_time: u16,
    /// Age at which root information is discarded.
    pub max_age: u16,
    /// Time spent in each of the discarding and learning states.
    pub forward_delay: u16,
    /// BPDUs a port may send per hello time.
    pub tx_hold_count: u32,
    /// How long a port waits before changing protocol version again.
    pub migrate_time: u16,
    /// Hop limit of MST regions.
    pub max_hops: u8,
    /// Initial priority of every tree, a multiple of 4096.
    pub bridge_priority: u16,
    /// Initial priority of every port on every tree, a multiple of 16.
    pub port_priority: u8,
    /// Initial administrative edge setting of every port.
    pub admin_edge: bool,
    /// Initial automatic edge detection setting of every port.
    pub auto_edge: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            force_version: StpVersion::Mstp,
            hello_time: 2,
            max_age: 20,
            forward_delay: 15,
            tx_hold_count: 6,
            migrate_time: 3,
            max_hops: 20,
            bridge_priority: 0x8000,
            port_priority: 0x80,
            admin_edge: false,
            auto_edge: true,
        }
    }
}

impl BridgeConfig {
    /// Check the parameter ranges and the relation
    /// `2 * (forward_delay - 1) >= max_age >= 2 * (hello_time + 1)`.
    pub fn validate(&self) -> Result<()> {
        let invalid = |what: &str| Err(BridgeError::InvalidConfig(what.to_string()));

        if !(1..=10).contains(&self.hello_time) {
            return invalid("hello time out of range 1..=10");
        }
        if !(6..=40).contains(&self.max_age) {
            return invalid("max age out of range 6..=40");
        }
        if !(4..=30).contains(&self.forward_delay) {
            return invalid("forward delay out of range 4..=30");
        }
        if 2 * (self.forward_delay - 1) < self.max_age {
            return invalid("max age exceeds 2 * (forward delay - 1)");
        }
        if self.max_age < 2 * (self.hello_time + 1) {
            return invalid("max age below 2 * (hello time + 1)");
        }
        if !(1..=10).contains(&self.tx_hold_count) {
            return invalid("transmit hold count out of range 1..=10");
        }
        if self.migrate_time == 0 {
            return invalid("migrate time is zero");
        }
        if !(6..=40).contains(&self.max_hops) {
            return invalid("max hops out of range 6..=40");
        }
        if self.bridge_priority & 0x0fff != 0 {
            return Err(BridgeError::InvalidBridgePriority(self.bridge_priority));
        }
        if self.port_priority & 0x0f != 0 {
            return Err(BridgeError::InvalidPortPriority(self.port_priority));
        }
        Ok(())
    }
}

/// The VLAN to MSTID allocation table (MST Configuration Table).
///
/// Entry 0 and entry 4095 are reserved and always map to the CIST.
#[derive(Clone, PartialEq, Eq)]
pub struct MstConfigTable(Box<[u16; VLAN_TABLE_LEN]>);

impl Default for MstConfigTable {
    fn default() -> Self {
        Self(Box::new([0; VLAN_TABLE_LEN]))
    }
}

impl core::fmt::Debug for MstConfigTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mapped = self.0.iter().filter(|&&mstid| mstid != 0).count();
        f.debug_struct("MstConfigTable")
            .field("mapped_vlans", &mapped)
            .finish()
    }
}

impl MstConfigTable {
    /// A table with every VLAN on the CIST.
    pub fn new() -> Self {
        Self::default()
    }

    /// The MSTID a VLAN is allocated to.
    #[inline]
    pub fn get(&self, vlan: u16) -> u16 {
        self.0.get(vlan as usize).copied().unwrap_or(0)
    }

    /// Allocate `vlan` to `mstid`.
    pub fn set(&mut self, vlan: u16, mstid: u16) -> Result<()> {
        if vlan == 0 || vlan as usize >= VLAN_TABLE_LEN - 1 {
            return Err(BridgeError::InvalidVlan(vlan));
        }
        if mstid > 0xfff {
            return Err(BridgeError::InvalidTree(mstid as usize));
        }
        self.0[vlan as usize] = mstid;
        Ok(())
    }

    /// The highest MSTID referenced by the table.
    pub fn max_mstid(&self) -> u16 {
        self.0.iter().copied().max().unwrap_or(0)
    }

    /// The MSTID of every VLAN, indexed by VLAN id.
    pub fn entries(&self) -> &[u16; VLAN_TABLE_LEN] {
        &self.0
    }

    /// HMAC-MD5 over the 4096 big-endian MSTIDs.
    pub fn digest(&self) -> [u8; 16] {
        let mut mac = <Hmac<Md5> as Mac>::new_from_slice(&MST_CONFIG_DIGEST_KEY)
            .expect("HMAC can take key of any size");
        for mstid in self.0.iter() {
            mac.update(&mstid.to_be_bytes());
        }
        let mut digest = [0; 16];
        digest.copy_from_slice(&mac.finalize().into_bytes());
        digest
    }
}

/// The MST Configuration Identifier: bridges with equal identifiers
/// belong to the same MST region.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub struct MstConfigId {
    /// Always 0.
    pub format_selector: u8,
    /// Null-padded region name.
    pub name: [u8; MST_CONFIG_NAME_LEN],
    /// Revision level.
    pub revision: u16,
    /// HMAC-MD5 digest of the VLAN to MSTID table.
    pub digest: [u8; 16],
}

impl Default for MstConfigId {
    fn default() -> Self {
        Self {
            format_selector: 0,
            name: [0; MST_CONFIG_NAME_LEN],
            revision: 0,
            digest: MstConfigTable::default().digest(),
        }
    }
}

impl MstConfigId {
    /// Byte length of the identifier on the wire.
    pub const LEN: usize = 51;

    /// The identifier a fresh bridge uses: its MAC address as the name,
    /// revision 0 and every VLAN on the CIST.
    pub fn with_bridge_address(mac: EtherAddr) -> Self {
        let mut id = Self::default();
        // The formatted address is 17 ASCII bytes, it always fits.
        let text = mac.to_string();
        id.name[..text.len()].copy_from_slice(text.as_bytes());
        id
    }

    /// Replace the configuration name.
    ///
    /// The name is stored null-padded; it must not be longer than 32 bytes
    /// and must be printable ASCII.
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        if name.len() > MST_CONFIG_NAME_LEN || !name.bytes().all(|b| (0x20..0x7f).contains(&b)) {
            return Err(BridgeError::InvalidConfigName);
        }
        self.name = [0; MST_CONFIG_NAME_LEN];
        self.name[..name.len()].copy_from_slice(name.as_bytes());
        Ok(())
    }

    /// The configuration name without its null padding.
    pub fn name_str(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(MST_CONFIG_NAME_LEN);
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }

    /// The identifier in wire order.
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut buf = [0; Self::LEN];
        buf[0] = self.format_selector;
        buf[1..33].copy_from_slice(&self.name);
        buf[33..35].copy_from_slice(&self.revision.to_be_bytes());
        buf[35..51].copy_from_slice(&self.digest);
        buf
    }

    /// # Panics
    ///
    /// `bytes` is shorter than [`MstConfigId::LEN`].
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut name = [0; MST_CONFIG_NAME_LEN];
        name.copy_from_slice(&bytes[1..33]);
        let mut digest = [0; 16];
        digest.copy_from_slice(&bytes[35..51]);
        Self {
            format_selector: bytes[0],
            name,
            revision: u16::from_be_bytes([bytes[33], bytes[34]]),
            digest,
        }
    }
}

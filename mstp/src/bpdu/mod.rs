//! BPDU codec.
//!
//! Two layers are provided:
//!
//! - zero-copy message views ([`ConfigBpduMessage`], [`TcnBpduMessage`],
//!   [`RstBpduMessage`], [`MstBpduMessage`] and [`MstiConfigMessage`]) over
//!   any [`Buf`](crate::Buf), dispatched by [`BpduMessageGroup::group_parse`];
//! - the owned [`Bpdu`] value the bridge works with, obtained with
//!   [`Bpdu::decode`] and turned back into bytes with [`Bpdu::encode`].
//!
//! Frames are the BPDU payload only: the caller strips the MAC and LLC
//! headers before handing a frame to the bridge and adds them back when
//! transmitting.
//!
//! ```
//! use mstp::bpdu::{Bpdu, RstBpdu, BpduRole, flags};
//! use mstp::{BridgeId, PortId};
//!
//! let rst = RstBpdu {
//!     flags: flags::LEARNING | flags::FORWARDING | BpduRole::Designated.to_flags(),
//!     root_id: BridgeId::from_u64(0x6001000d65adf600),
//!     root_path_cost: 10,
//!     bridge_id: BridgeId::from_u64(0x8001000bfd860f00),
//!     port_id: PortId(0x8001),
//!     message_age: 1,
//!     max_age: 20,
//!     hello_time: 2,
//!     forward_delay: 15,
//! };
//! let bytes = Bpdu::Rst(rst).encode();
//! assert_eq!(bytes.len(), 36);
//! assert_eq!(Bpdu::decode(&bytes)?, Bpdu::Rst(rst));
//! # Ok::<(), mstp::BpduError>(())
//! ```

mod message;
pub use message::{classify, BpduMessageGroup, BpduShape, MAX_MSTI_MSGS, MIN_VERSION3_LEN};
pub use message::{ConfigBpduMessage, CONFIG_BPDU_HEADER_LEN, CONFIG_BPDU_HEADER_TEMPLATE};
pub use message::{MstBpduMessage, MST_BPDU_HEADER_LEN, MST_BPDU_HEADER_TEMPLATE};
pub use message::{MstiConfigMessage, MSTI_CONFIG_HEADER_LEN, MSTI_CONFIG_HEADER_TEMPLATE};
pub use message::{RstBpduMessage, RST_BPDU_HEADER_LEN, RST_BPDU_HEADER_TEMPLATE};
pub use message::{TcnBpduMessage, TCN_BPDU_HEADER_LEN, TCN_BPDU_HEADER_TEMPLATE};

use crate::config::MstConfigId;
use crate::cursors::CursorMut;
use crate::error::BpduError;
use crate::traits::Buf;
use crate::vector::{BridgeId, PortId, Times};

enum_sim! {
    /// An enum-like type for representing the protocol version identifier.
    pub struct BpduVersion (u8) {
        /// Config and TCN BPDUs.
        STP = 0x00,

        /// RST BPDUs.
        RSTP = 0x02,

        /// MST BPDUs.
        MSTP = 0x03,
    }
}

enum_sim! {
    /// An enum-like type for representing the BPDU type.
    pub struct BpduType (u8) {
        /// Configuration BPDU.
        CONFIG = 0x00,

        /// RST or MST BPDU.
        RST = 0x02,

        /// Topology Change Notification BPDU.
        TCN = 0x80,
    }
}

/// Bits of the flags octet of Config, RST and MST BPDUs and of MSTI
/// configuration messages.
pub mod flags {
    /// Topology change.
    pub const TC: u8 = 0x01;
    /// Proposal.
    pub const PROPOSAL: u8 = 0x02;
    /// The two bits encoding the port role.
    pub const ROLE_MASK: u8 = 0x0c;
    /// Position of the role bits.
    pub const ROLE_SHIFT: u8 = 2;
    /// The sending port is learning.
    pub const LEARNING: u8 = 0x10;
    /// The sending port is forwarding.
    pub const FORWARDING: u8 = 0x20;
    /// Agreement.
    pub const AGREEMENT: u8 = 0x40;
    /// Topology change acknowledgment, Config BPDUs only.
    pub const TCA: u8 = 0x80;
    /// Master flag, MSTI configuration messages only.
    pub const MASTER: u8 = 0x80;

    /// The only bits a Config BPDU carries.
    pub const CONFIG_MASK: u8 = TC | TCA;
}

/// Port role as encoded in the flags of an RST BPDU or MSTI message.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum BpduRole {
    /// "Unknown" in a CIST message, Master Port in an MSTI message.
    MasterOrUnknown = 0,
    /// Alternate or Backup Port.
    AlternateOrBackup = 1,
    /// Root Port.
    Root = 2,
    /// Designated Port.
    Designated = 3,
}

impl BpduRole {
    /// Extract the role from a flags octet. Other bits are ignored.
    #[inline]
    pub fn from_flags(value: u8) -> Self {
        match (value & flags::ROLE_MASK) >> flags::ROLE_SHIFT {
            0 => BpduRole::MasterOrUnknown,
            1 => BpduRole::AlternateOrBackup,
            2 => BpduRole::Root,
            _ => BpduRole::Designated,
        }
    }

    /// The role bits of a flags octet.
    #[inline]
    pub fn to_flags(self) -> u8 {
        (self as u8) << flags::ROLE_SHIFT
    }
}

/// Configuration BPDU. Only the TC and TCA flags are kept.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, Default)]
pub struct ConfigBpdu {
    /// See [`flags`].
    pub flags: u8,
    /// The CIST root.
    pub root_id: BridgeId,
    /// Cost of the path to the root.
    pub root_path_cost: u32,
    /// Identifier of the transmitting bridge.
    pub bridge_id: BridgeId,
    /// Identifier of the transmitting port.
    pub port_id: PortId,
    /// Age of the root information, in seconds like the other times.
    pub message_age: u16,
    /// Age at which the root information is discarded.
    pub max_age: u16,
    /// Interval between BPDUs on a designated port.
    pub hello_time: u16,
    /// Time spent in each of the discarding and learning states.
    pub forward_delay: u16,
}

/// RST BPDU, also the common part of an MST BPDU.
///
/// In an MST BPDU `bridge_id` carries the CIST regional root identifier
/// and `root_path_cost` the CIST external root path cost.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, Default)]
pub struct RstBpdu {
    /// See [`flags`].
    pub flags: u8,
    /// The CIST root.
    pub root_id: BridgeId,
    /// Cost of the path to the root.
    pub root_path_cost: u32,
    /// Identifier of the transmitting bridge, or the CIST regional root in
    /// an MST BPDU.
    pub bridge_id: BridgeId,
    /// Identifier of the transmitting port.
    pub port_id: PortId,
    /// Age of the root information, in seconds like the other times.
    pub message_age: u16,
    /// Age at which the root information is discarded.
    pub max_age: u16,
    /// Interval between BPDUs on a designated port.
    pub hello_time: u16,
    /// Time spent in each of the discarding and learning states.
    pub forward_delay: u16,
}

/// One MSTI configuration message.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, Default)]
pub struct MstiConfig {
    /// See [`flags`]; the master flag replaces TCA.
    pub flags: u8,
    /// The MSTI regional root. Its system id extension is the MSTID.
    pub regional_root_id: BridgeId,
    /// Cost of the path to the regional root.
    pub internal_root_path_cost: u32,
    /// Upper four bits of the transmitting bridge's priority.
    pub bridge_priority: u8,
    /// Upper four bits of the transmitting port's priority.
    pub port_priority: u8,
    /// Hops left before the message is discarded.
    pub remaining_hops: u8,
}

impl MstiConfig {
    /// The MSTI this message describes.
    #[inline]
    pub fn mstid(&self) -> u16 {
        self.regional_root_id.sys_id_ext()
    }
}

/// MST BPDU.
#[derive(Debug, Hash, PartialEq, Eq, Clone)]
pub struct MstBpdu {
    /// The CIST information, laid out as in an RST BPDU.
    pub cist: RstBpdu,
    /// MST configuration identifier of the sender's region.
    pub config_id: MstConfigId,
    /// Cost of the path to the CIST regional root.
    pub cist_internal_root_path_cost: u32,
    /// Identifier of the transmitting bridge.
    pub cist_bridge_id: BridgeId,
    /// Hops left for the CIST information.
    pub cist_remaining_hops: u8,
    /// One message per MSTI, at most [`MAX_MSTI_MSGS`].
    pub mstis: Vec<MstiConfig>,
}

impl MstBpdu {
    /// The MSTI message for `mstid`, if the BPDU carries one.
    pub fn msti(&self, mstid: u16) -> Option<&MstiConfig> {
        self.mstis.iter().find(|m| m.mstid() == mstid)
    }
}

/// A decoded BPDU.
#[derive(Debug, Hash, PartialEq, Eq, Clone)]
pub enum Bpdu {
    /// Configuration BPDU.
    Config(ConfigBpdu),
    /// Topology Change Notification BPDU.
    Tcn,
    /// RST BPDU.
    Rst(RstBpdu),
    /// MST BPDU.
    Mst(MstBpdu),
}

impl Bpdu {
    /// Decode a BPDU, validating it the way 802.1Q-2011 §14.4 requires.
    pub fn decode(bytes: &[u8]) -> Result<Bpdu, BpduError> {
        let bpdu = match message::classify(bytes)? {
            BpduShape::Tcn => Bpdu::Tcn,
            BpduShape::Config => {
                let msg = ConfigBpduMessage::parse_unchecked(bytes);
                Bpdu::Config(ConfigBpdu {
                    flags: msg.flags() & flags::CONFIG_MASK,
                    root_id: msg.root_id(),
                    root_path_cost: msg.root_path_cost(),
                    bridge_id: msg.bridge_id(),
                    port_id: msg.port_id(),
                    message_age: msg.message_age(),
                    max_age: msg.max_age(),
                    hello_time: msg.hello_time(),
                    forward_delay: msg.forward_delay(),
                })
            }
            BpduShape::Rst => {
                let msg = RstBpduMessage::parse_unchecked(bytes);
                Bpdu::Rst(RstBpdu {
                    flags: msg.flags(),
                    root_id: msg.root_id(),
                    root_path_cost: msg.root_path_cost(),
                    bridge_id: msg.bridge_id(),
                    port_id: msg.port_id(),
                    message_age: msg.message_age(),
                    max_age: msg.max_age(),
                    hello_time: msg.hello_time(),
                    forward_delay: msg.forward_delay(),
                })
            }
            BpduShape::Mst => {
                let msg = MstBpduMessage::parse_unchecked(bytes);
                let mstis = (0..msg.num_of_msti_msg())
                    .map(|i| {
                        let m = msg.msti_config_message(i);
                        MstiConfig {
                            flags: m.flags(),
                            regional_root_id: m.regional_root_id(),
                            internal_root_path_cost: m.internal_root_path_cost(),
                            bridge_priority: m.bridge_priority(),
                            port_priority: m.port_priority(),
                            remaining_hops: m.remaining_hops(),
                        }
                    })
                    .collect();
                Bpdu::Mst(MstBpdu {
                    cist: RstBpdu {
                        flags: msg.flags(),
                        root_id: msg.root_id(),
                        root_path_cost: msg.root_path_cost(),
                        bridge_id: msg.bridge_id(),
                        port_id: msg.port_id(),
                        message_age: msg.message_age(),
                        max_age: msg.max_age(),
                        hello_time: msg.hello_time(),
                        forward_delay: msg.forward_delay(),
                    },
                    config_id: msg.mst_config_id(),
                    cist_internal_root_path_cost: msg.cist_internal_root_path_cost(),
                    cist_bridge_id: msg.cist_bridge_id(),
                    cist_remaining_hops: msg.cist_remaining_hops(),
                    mstis,
                })
            }
        };
        Ok(bpdu)
    }

    /// Size of the encoded BPDU.
    pub fn encoded_len(&self) -> usize {
        match self {
            Bpdu::Config(_) => CONFIG_BPDU_HEADER_LEN,
            Bpdu::Tcn => TCN_BPDU_HEADER_LEN,
            Bpdu::Rst(_) => RST_BPDU_HEADER_LEN,
            Bpdu::Mst(mst) => {
                MST_BPDU_HEADER_LEN + MSTI_CONFIG_HEADER_LEN * mst.mstis.len().min(MAX_MSTI_MSGS)
            }
        }
    }

    /// Encode the BPDU. Reserved flag bits are written as zero, and at most
    /// 64 MSTI messages are written.
    pub fn encode(&self) -> Vec<u8> {
        let len = self.encoded_len();
        let mut buf = vec![0u8; len];
        let mut cursor = CursorMut::new(&mut buf[..]);
        cursor.advance(len);

        match self {
            Bpdu::Tcn => {
                TcnBpduMessage::prepend_header(cursor, &TCN_BPDU_HEADER_TEMPLATE);
            }
            Bpdu::Config(config) => {
                let mut msg = ConfigBpduMessage::prepend_header(cursor, &CONFIG_BPDU_HEADER_TEMPLATE);
                msg.set_flags(config.flags & flags::CONFIG_MASK);
                msg.set_root_id(config.root_id);
                msg.set_root_path_cost(config.root_path_cost);
                msg.set_bridge_id(config.bridge_id);
                msg.set_port_id(config.port_id);
                msg.set_message_age(config.message_age);
                msg.set_max_age(config.max_age);
                msg.set_hello_time(config.hello_time);
                msg.set_forward_delay(config.forward_delay);
            }
            Bpdu::Rst(rst) => {
                let mut msg = RstBpduMessage::prepend_header(cursor, &RST_BPDU_HEADER_TEMPLATE);
                msg.set_flags(rst.flags);
                msg.set_root_id(rst.root_id);
                msg.set_root_path_cost(rst.root_path_cost);
                msg.set_bridge_id(rst.bridge_id);
                msg.set_port_id(rst.port_id);
                msg.set_message_age(rst.message_age);
                msg.set_max_age(rst.max_age);
                msg.set_hello_time(rst.hello_time);
                msg.set_forward_delay(rst.forward_delay);
            }
            Bpdu::Mst(mst) => {
                let count = mst.mstis.len().min(MAX_MSTI_MSGS);
                let mut msg =
                    MstBpduMessage::prepend_header(cursor, &MST_BPDU_HEADER_TEMPLATE, count);
                let cist = &mst.cist;
                msg.set_flags(cist.flags);
                msg.set_root_id(cist.root_id);
                msg.set_root_path_cost(cist.root_path_cost);
                msg.set_bridge_id(cist.bridge_id);
                msg.set_port_id(cist.port_id);
                msg.set_message_age(cist.message_age);
                msg.set_max_age(cist.max_age);
                msg.set_hello_time(cist.hello_time);
                msg.set_forward_delay(cist.forward_delay);
                msg.set_mst_config_id(&mst.config_id);
                msg.set_cist_internal_root_path_cost(mst.cist_internal_root_path_cost);
                msg.set_cist_bridge_id(mst.cist_bridge_id);
                msg.set_cist_remaining_hops(mst.cist_remaining_hops);
                for (i, msti) in mst.mstis.iter().take(count).enumerate() {
                    let mut m = msg.msti_config_message_mut(i);
                    m.set_flags(msti.flags);
                    m.set_regional_root_id(msti.regional_root_id);
                    m.set_internal_root_path_cost(msti.internal_root_path_cost);
                    m.set_bridge_priority(msti.bridge_priority);
                    m.set_port_priority(msti.port_priority);
                    m.set_remaining_hops(msti.remaining_hops);
                }
            }
        }
        buf
    }

    /// The flags of the CIST message, zero for a TCN BPDU.
    pub fn cist_flags(&self) -> u8 {
        match self {
            Bpdu::Config(config) => config.flags,
            Bpdu::Tcn => 0,
            Bpdu::Rst(rst) => rst.flags,
            Bpdu::Mst(mst) => mst.cist.flags,
        }
    }

    /// The port role the CIST message conveys. A Config BPDU implicitly
    /// conveys a Designated Port role; a TCN BPDU conveys none.
    pub fn cist_role(&self) -> Option<BpduRole> {
        match self {
            Bpdu::Config(_) => Some(BpduRole::Designated),
            Bpdu::Tcn => None,
            Bpdu::Rst(rst) => Some(BpduRole::from_flags(rst.flags)),
            Bpdu::Mst(mst) => Some(BpduRole::from_flags(mst.cist.flags)),
        }
    }

    /// The CIST timer parameters; remaining hops are only carried by MST
    /// BPDUs and read as `default_hops` otherwise.
    pub fn cist_times(&self, default_hops: u8) -> Option<Times> {
        let (message_age, max_age, hello_time, forward_delay, remaining_hops) = match self {
            Bpdu::Config(c) => (c.message_age, c.max_age, c.hello_time, c.forward_delay, default_hops),
            Bpdu::Tcn => return None,
            Bpdu::Rst(r) => (r.message_age, r.max_age, r.hello_time, r.forward_delay, default_hops),
            Bpdu::Mst(m) => (
                m.cist.message_age,
                m.cist.max_age,
                m.cist.hello_time,
                m.cist.forward_delay,
                m.cist_remaining_hops,
            ),
        };
        Some(Times {
            message_age,
            max_age,
            forward_delay,
            hello_time,
            remaining_hops,
        })
    }

    /// `true` for the BPDUs a legacy STP bridge sends.
    pub fn is_stp(&self) -> bool {
        matches!(self, Bpdu::Config(_) | Bpdu::Tcn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_bits() {
        assert_eq!(BpduRole::from_flags(0x3d), BpduRole::Designated);
        assert_eq!(BpduRole::from_flags(0x7c), BpduRole::Designated);
        assert_eq!(BpduRole::from_flags(0x08), BpduRole::Root);
        assert_eq!(BpduRole::from_flags(0x04), BpduRole::AlternateOrBackup);
        assert_eq!(BpduRole::Root.to_flags(), 0x08);
    }

    #[test]
    fn config_reserved_flags_are_dropped() {
        let config = ConfigBpdu {
            flags: 0xff,
            max_age: 20,
            hello_time: 2,
            forward_delay: 15,
            ..Default::default()
        };
        let bytes = Bpdu::Config(config).encode();
        assert_eq!(bytes[4], flags::TC | flags::TCA);
        match Bpdu::decode(&bytes).unwrap() {
            Bpdu::Config(c) => assert_eq!(c.flags, flags::CONFIG_MASK),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn times_use_256ths_of_a_second() {
        let bpdu = Bpdu::Config(ConfigBpdu {
            message_age: 1,
            max_age: 20,
            hello_time: 2,
            forward_delay: 15,
            ..Default::default()
        });
        let bytes = bpdu.encode();
        assert_eq!(&bytes[27..35], &[0x01, 0x00, 0x14, 0x00, 0x02, 0x00, 0x0f, 0x00]);
    }
}

#![allow(missing_docs)]

use crate::config::MstConfigId;
use crate::cursors::*;
use crate::error::BpduError;
use crate::traits::*;
use crate::vector::{BridgeId, PortId};

use super::{BpduType, BpduVersion};

/// Largest number of MSTI configuration messages an MST BPDU may carry.
pub const MAX_MSTI_MSGS: usize = 64;

/// Smallest legal value of the version 3 length field.
pub const MIN_VERSION3_LEN: u16 = 64;

#[inline]
fn be_u16(chunk: &[u8], off: usize) -> u16 {
    u16::from_be_bytes((&chunk[off..off + 2]).try_into().unwrap())
}

#[inline]
fn be_u32(chunk: &[u8], off: usize) -> u32 {
    u32::from_be_bytes((&chunk[off..off + 4]).try_into().unwrap())
}

// Getters and setters of the 35 bytes every BPDU but the TCN starts with.
// Times are carried in units of 1/256 second; the accessors work in whole
// seconds.
macro_rules! bpdu_header_fields {
    ($name:ident) => {
        impl<T: Buf> $name<T> {
            #[inline]
            pub fn proto_id(&self) -> u16 {
                be_u16(self.buf.chunk(), 0)
            }
            #[inline]
            pub fn version(&self) -> BpduVersion {
                BpduVersion::from(self.buf.chunk()[2])
            }
            #[inline]
            pub fn type_(&self) -> BpduType {
                BpduType::from(self.buf.chunk()[3])
            }
            #[inline]
            pub fn flags(&self) -> u8 {
                self.buf.chunk()[4]
            }
            #[inline]
            pub fn root_id(&self) -> BridgeId {
                BridgeId::from_bytes(&self.buf.chunk()[5..13])
            }
            #[inline]
            pub fn root_path_cost(&self) -> u32 {
                be_u32(self.buf.chunk(), 13)
            }
            #[inline]
            pub fn bridge_id(&self) -> BridgeId {
                BridgeId::from_bytes(&self.buf.chunk()[17..25])
            }
            #[inline]
            pub fn port_id(&self) -> PortId {
                PortId(be_u16(self.buf.chunk(), 25))
            }
            #[inline]
            pub fn message_age(&self) -> u16 {
                be_u16(self.buf.chunk(), 27) >> 8
            }
            #[inline]
            pub fn max_age(&self) -> u16 {
                be_u16(self.buf.chunk(), 29) >> 8
            }
            #[inline]
            pub fn hello_time(&self) -> u16 {
                be_u16(self.buf.chunk(), 31) >> 8
            }
            #[inline]
            pub fn forward_delay(&self) -> u16 {
                be_u16(self.buf.chunk(), 33) >> 8
            }
        }

        impl<T: PktBufMut> $name<T> {
            #[inline]
            pub fn set_proto_id(&mut self, value: u16) {
                assert!(value == 0);
                self.buf.chunk_mut()[0..2].copy_from_slice(&value.to_be_bytes());
            }
            #[inline]
            pub fn set_version(&mut self, value: BpduVersion) {
                self.buf.chunk_mut()[2] = u8::from(value);
            }
            #[inline]
            pub fn set_type_(&mut self, value: BpduType) {
                self.buf.chunk_mut()[3] = u8::from(value);
            }
            #[inline]
            pub fn set_flags(&mut self, value: u8) {
                self.buf.chunk_mut()[4] = value;
            }
            #[inline]
            pub fn set_root_id(&mut self, value: BridgeId) {
                self.buf.chunk_mut()[5..13].copy_from_slice(value.as_bytes());
            }
            #[inline]
            pub fn set_root_path_cost(&mut self, value: u32) {
                self.buf.chunk_mut()[13..17].copy_from_slice(&value.to_be_bytes());
            }
            #[inline]
            pub fn set_bridge_id(&mut self, value: BridgeId) {
                self.buf.chunk_mut()[17..25].copy_from_slice(value.as_bytes());
            }
            #[inline]
            pub fn set_port_id(&mut self, value: PortId) {
                self.buf.chunk_mut()[25..27].copy_from_slice(&value.0.to_be_bytes());
            }
            /// Times are whole seconds carried in 1/256 s units; values above
            /// 255 are written as 255.
            #[inline]
            pub fn set_message_age(&mut self, value: u16) {
                let raw = value.min(255) << 8;
                self.buf.chunk_mut()[27..29].copy_from_slice(&raw.to_be_bytes());
            }
            #[inline]
            pub fn set_max_age(&mut self, value: u16) {
                let raw = value.min(255) << 8;
                self.buf.chunk_mut()[29..31].copy_from_slice(&raw.to_be_bytes());
            }
            #[inline]
            pub fn set_hello_time(&mut self, value: u16) {
                let raw = value.min(255) << 8;
                self.buf.chunk_mut()[31..33].copy_from_slice(&raw.to_be_bytes());
            }
            #[inline]
            pub fn set_forward_delay(&mut self, value: u16) {
                let raw = value.min(255) << 8;
                self.buf.chunk_mut()[33..35].copy_from_slice(&raw.to_be_bytes());
            }
        }
    };
}

// Constructors and buffer access shared by the fixed-size messages.
macro_rules! fixed_message {
    ($name:ident, $len:expr) => {
        impl<T: Buf> $name<T> {
            #[inline]
            pub fn parse_unchecked(buf: T) -> Self {
                Self { buf }
            }
            #[inline]
            pub fn buf(&self) -> &T {
                &self.buf
            }
            #[inline]
            pub fn release(self) -> T {
                self.buf
            }
            #[inline]
            pub fn parse(buf: T) -> Result<Self, T> {
                let chunk_len = buf.chunk().len();
                if chunk_len < $len {
                    return Err(buf);
                }
                Ok(Self { buf })
            }
            #[inline]
            pub fn fix_header_slice(&self) -> &[u8] {
                &self.buf.chunk()[0..$len]
            }
        }
        impl<T: PktBuf> $name<T> {
            #[inline]
            pub fn payload(self) -> T {
                let mut buf = self.buf;
                buf.advance($len);
                buf
            }
        }
        impl<T: PktBufMut> $name<T> {
            #[inline]
            pub fn prepend_header<'a>(mut buf: T, header: &'a [u8; $len]) -> Self {
                assert!(buf.chunk_headroom() >= $len);
                buf.move_back($len);
                buf.chunk_mut()[0..$len].copy_from_slice(&header[..]);
                Self { buf }
            }
        }
    };
}

/// A constant that defines the fixed byte length of the TcnBpdu message.
pub const TCN_BPDU_HEADER_LEN: usize = 4;
/// A fixed TcnBpdu header.
pub const TCN_BPDU_HEADER_TEMPLATE: [u8; 4] = [0x00, 0x00, 0x00, 0x80];

/// Topology Change Notification BPDU.
#[derive(Debug, Clone, Copy)]
pub struct TcnBpduMessage<T> {
    buf: T,
}
fixed_message!(TcnBpduMessage, 4);
impl<T: Buf> TcnBpduMessage<T> {
    #[inline]
    pub fn proto_id(&self) -> u16 {
        be_u16(self.buf.chunk(), 0)
    }
    #[inline]
    pub fn version(&self) -> BpduVersion {
        BpduVersion::from(self.buf.chunk()[2])
    }
    #[inline]
    pub fn type_(&self) -> BpduType {
        BpduType::from(self.buf.chunk()[3])
    }
}

/// A constant that defines the fixed byte length of the ConfigBpdu message.
pub const CONFIG_BPDU_HEADER_LEN: usize = 35;
/// A fixed ConfigBpdu header.
pub const CONFIG_BPDU_HEADER_TEMPLATE: [u8; 35] = [0x00; 35];

/// Configuration BPDU of 802.1D-1998.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBpduMessage<T> {
    buf: T,
}
fixed_message!(ConfigBpduMessage, 35);
bpdu_header_fields!(ConfigBpduMessage);

/// A constant that defines the fixed byte length of the RstBpdu message.
pub const RST_BPDU_HEADER_LEN: usize = 36;
/// A fixed RstBpdu header.
pub const RST_BPDU_HEADER_TEMPLATE: [u8; 36] = [
    0x00, 0x00, 0x02, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00,
];

/// Rapid Spanning Tree BPDU.
#[derive(Debug, Clone, Copy)]
pub struct RstBpduMessage<T> {
    buf: T,
}
fixed_message!(RstBpduMessage, 36);
bpdu_header_fields!(RstBpduMessage);
impl<T: Buf> RstBpduMessage<T> {
    #[inline]
    pub fn version1_len(&self) -> u8 {
        self.buf.chunk()[35]
    }
}
impl<T: PktBufMut> RstBpduMessage<T> {
    #[inline]
    pub fn set_version1_len(&mut self, value: u8) {
        self.buf.chunk_mut()[35] = value;
    }
}

/// A constant that defines the fixed byte length of the MstBpdu message.
pub const MST_BPDU_HEADER_LEN: usize = 102;
/// A fixed MstBpdu header.
pub const MST_BPDU_HEADER_TEMPLATE: [u8; 102] = {
    let mut header = [0u8; 102];
    header[2] = 0x03;
    header[3] = 0x02;
    header[37] = MIN_VERSION3_LEN as u8;
    header
};

/// Multiple Spanning Tree BPDU.
///
/// The `bridge_id` field of the common header carries the CIST regional
/// root identifier.
#[derive(Debug, Clone, Copy)]
pub struct MstBpduMessage<T> {
    buf: T,
}
bpdu_header_fields!(MstBpduMessage);
impl<T: Buf> MstBpduMessage<T> {
    #[inline]
    pub fn parse_unchecked(buf: T) -> Self {
        Self { buf }
    }
    #[inline]
    pub fn buf(&self) -> &T {
        &self.buf
    }
    #[inline]
    pub fn release(self) -> T {
        self.buf
    }
    /// Parse an MST BPDU.
    ///
    /// The fixed part must be present, the version 1 length must be zero
    /// and the version 3 length must cover at least the fixed MST fields.
    #[inline]
    pub fn parse(buf: T) -> Result<Self, T> {
        let chunk = buf.chunk();
        if chunk.len() < MST_BPDU_HEADER_LEN
            || chunk[35] != 0
            || be_u16(chunk, 36) < MIN_VERSION3_LEN
        {
            return Err(buf);
        }
        Ok(Self { buf })
    }
    #[inline]
    pub fn fix_header_slice(&self) -> &[u8] {
        &self.buf.chunk()[0..MST_BPDU_HEADER_LEN]
    }
    #[inline]
    pub fn version1_len(&self) -> u8 {
        self.buf.chunk()[35]
    }
    #[inline]
    pub fn version3_len(&self) -> u16 {
        be_u16(self.buf.chunk(), 36)
    }
    #[inline]
    pub fn mst_config_id(&self) -> MstConfigId {
        MstConfigId::from_bytes(&self.buf.chunk()[38..89])
    }
    #[inline]
    pub fn mst_config_name(&self) -> &[u8] {
        &self.buf.chunk()[39..71]
    }
    #[inline]
    pub fn mst_config_revision(&self) -> u16 {
        be_u16(self.buf.chunk(), 71)
    }
    #[inline]
    pub fn mst_config_digest(&self) -> &[u8] {
        &self.buf.chunk()[73..89]
    }
    #[inline]
    pub fn cist_internal_root_path_cost(&self) -> u32 {
        be_u32(self.buf.chunk(), 89)
    }
    #[inline]
    pub fn cist_bridge_id(&self) -> BridgeId {
        BridgeId::from_bytes(&self.buf.chunk()[93..101])
    }
    #[inline]
    pub fn cist_remaining_hops(&self) -> u8 {
        self.buf.chunk()[101]
    }

    /// Number of complete MSTI configuration messages.
    ///
    /// Bounded by the version 3 length, by the bytes actually present and by
    /// the 64 MSTIs a region may have; a trailing partial message is ignored.
    #[inline]
    pub fn num_of_msti_msg(&self) -> usize {
        let announced =
            self.version3_len().saturating_sub(MIN_VERSION3_LEN) as usize / MSTI_CONFIG_HEADER_LEN;
        let present =
            self.buf.chunk().len().saturating_sub(MST_BPDU_HEADER_LEN) / MSTI_CONFIG_HEADER_LEN;
        announced.min(present).min(MAX_MSTI_MSGS)
    }

    /// Get the `index`-th `MstiConfigMessage`.
    ///
    /// # Panics
    ///
    /// This method panics if `index` is not below `num_of_msti_msg`.
    #[inline]
    pub fn msti_config_message(&self, index: usize) -> MstiConfigMessage<Cursor<'_>> {
        assert!(index < self.num_of_msti_msg());
        let offset = MST_BPDU_HEADER_LEN + MSTI_CONFIG_HEADER_LEN * index;
        MstiConfigMessage::parse_unchecked(Cursor::new(
            &self.buf.chunk()[offset..offset + MSTI_CONFIG_HEADER_LEN],
        ))
    }
}
impl<T: PktBufMut> MstBpduMessage<T> {
    /// Reserve the fixed part plus `msti_count` MSTI messages in front of
    /// the cursor, and fill the fixed part from `header`.
    #[inline]
    pub fn prepend_header<'a>(mut buf: T, header: &'a [u8; 102], msti_count: usize) -> Self {
        assert!(msti_count <= MAX_MSTI_MSGS);
        let total = MST_BPDU_HEADER_LEN + MSTI_CONFIG_HEADER_LEN * msti_count;
        assert!(buf.chunk_headroom() >= total);
        buf.move_back(total);
        buf.chunk_mut()[0..MST_BPDU_HEADER_LEN].copy_from_slice(&header[..]);
        buf.chunk_mut()[MST_BPDU_HEADER_LEN..total].fill(0);
        let mut msg = Self { buf };
        msg.set_version3_len(MIN_VERSION3_LEN + (MSTI_CONFIG_HEADER_LEN * msti_count) as u16);
        msg
    }
    #[inline]
    pub fn set_version1_len(&mut self, value: u8) {
        self.buf.chunk_mut()[35] = value;
    }
    #[inline]
    pub fn set_version3_len(&mut self, value: u16) {
        self.buf.chunk_mut()[36..38].copy_from_slice(&value.to_be_bytes());
    }
    #[inline]
    pub fn set_mst_config_id(&mut self, value: &MstConfigId) {
        self.buf.chunk_mut()[38..89].copy_from_slice(&value.to_bytes());
    }
    #[inline]
    pub fn set_cist_internal_root_path_cost(&mut self, value: u32) {
        self.buf.chunk_mut()[89..93].copy_from_slice(&value.to_be_bytes());
    }
    #[inline]
    pub fn set_cist_bridge_id(&mut self, value: BridgeId) {
        self.buf.chunk_mut()[93..101].copy_from_slice(value.as_bytes());
    }
    #[inline]
    pub fn set_cist_remaining_hops(&mut self, value: u8) {
        self.buf.chunk_mut()[101] = value;
    }
    /// Get the `index`-th `MstiConfigMessage` for writing.
    ///
    /// # Panics
    ///
    /// This method panics if `index` is not below `num_of_msti_msg`.
    #[inline]
    pub fn msti_config_message_mut(&mut self, index: usize) -> MstiConfigMessage<CursorMut<'_>> {
        assert!(index < self.num_of_msti_msg());
        let offset = MST_BPDU_HEADER_LEN + MSTI_CONFIG_HEADER_LEN * index;
        MstiConfigMessage::parse_unchecked(CursorMut::new(
            &mut self.buf.chunk_mut()[offset..offset + MSTI_CONFIG_HEADER_LEN],
        ))
    }
}

/// A constant that defines the fixed byte length of the MstiConfig message.
pub const MSTI_CONFIG_HEADER_LEN: usize = 16;
/// A fixed MstiConfig header.
pub const MSTI_CONFIG_HEADER_TEMPLATE: [u8; 16] = [0x00; 16];

/// MSTI configuration message carried at the end of an MST BPDU.
#[derive(Debug, Clone, Copy)]
pub struct MstiConfigMessage<T> {
    buf: T,
}
fixed_message!(MstiConfigMessage, 16);
impl<T: Buf> MstiConfigMessage<T> {
    #[inline]
    pub fn flags(&self) -> u8 {
        self.buf.chunk()[0]
    }
    /// The system id extension of this identifier is the MSTID.
    #[inline]
    pub fn regional_root_id(&self) -> BridgeId {
        BridgeId::from_bytes(&self.buf.chunk()[1..9])
    }
    #[inline]
    pub fn internal_root_path_cost(&self) -> u32 {
        be_u32(self.buf.chunk(), 9)
    }
    /// Only the upper nibble is significant.
    #[inline]
    pub fn bridge_priority(&self) -> u8 {
        self.buf.chunk()[13] & 0xf0
    }
    /// Only the upper nibble is significant.
    #[inline]
    pub fn port_priority(&self) -> u8 {
        self.buf.chunk()[14] & 0xf0
    }
    #[inline]
    pub fn remaining_hops(&self) -> u8 {
        self.buf.chunk()[15]
    }
}
impl<T: PktBufMut> MstiConfigMessage<T> {
    #[inline]
    pub fn set_flags(&mut self, value: u8) {
        self.buf.chunk_mut()[0] = value;
    }
    #[inline]
    pub fn set_regional_root_id(&mut self, value: BridgeId) {
        self.buf.chunk_mut()[1..9].copy_from_slice(value.as_bytes());
    }
    #[inline]
    pub fn set_internal_root_path_cost(&mut self, value: u32) {
        self.buf.chunk_mut()[9..13].copy_from_slice(&value.to_be_bytes());
    }
    #[inline]
    pub fn set_bridge_priority(&mut self, value: u8) {
        self.buf.chunk_mut()[13] = value & 0xf0;
    }
    #[inline]
    pub fn set_port_priority(&mut self, value: u8) {
        self.buf.chunk_mut()[14] = value & 0xf0;
    }
    #[inline]
    pub fn set_remaining_hops(&mut self, value: u8) {
        self.buf.chunk_mut()[15] = value;
    }
}

/// The shape of a BPDU, as decided from its header and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BpduShape {
    Config,
    Tcn,
    Rst,
    Mst,
}

/// Classify a received frame following the validation rules of
/// 802.1Q-2011 §14.4.
///
/// A version 3 (or later) BPDU that does not carry a well-formed MST part
/// is handled as an RST BPDU.
pub fn classify(chunk: &[u8]) -> Result<BpduShape, BpduError> {
    if chunk.len() < TCN_BPDU_HEADER_LEN {
        return Err(BpduError::TooShort {
            expected: TCN_BPDU_HEADER_LEN,
            actual: chunk.len(),
        });
    }
    let proto_id = be_u16(chunk, 0);
    if proto_id != 0 {
        return Err(BpduError::BadProtocolId(proto_id));
    }

    let version = BpduVersion::from(chunk[2]);
    let bpdu_type = BpduType::from(chunk[3]);
    let too_short = |expected: usize| BpduError::TooShort {
        expected,
        actual: chunk.len(),
    };

    match bpdu_type {
        BpduType::TCN => Ok(BpduShape::Tcn),
        BpduType::CONFIG if chunk.len() >= CONFIG_BPDU_HEADER_LEN => Ok(BpduShape::Config),
        BpduType::CONFIG => Err(too_short(CONFIG_BPDU_HEADER_LEN)),
        BpduType::RST if version >= BpduVersion::RSTP => {
            if chunk.len() < RST_BPDU_HEADER_LEN {
                return Err(too_short(RST_BPDU_HEADER_LEN));
            }
            if version >= BpduVersion::MSTP && MstBpduMessage::parse(chunk).is_ok() {
                Ok(BpduShape::Mst)
            } else {
                Ok(BpduShape::Rst)
            }
        }
        _ => Err(BpduError::UnknownType {
            version: version.raw(),
            bpdu_type: bpdu_type.raw(),
        }),
    }
}

/// A received BPDU of any kind, as a zero-copy view.
#[derive(Debug)]
pub enum BpduMessageGroup<T> {
    Tcn(TcnBpduMessage<T>),
    Config(ConfigBpduMessage<T>),
    Rst(RstBpduMessage<T>),
    Mst(MstBpduMessage<T>),
}
impl<T: Buf> BpduMessageGroup<T> {
    /// Classify the frame and wrap it in the matching view. A frame that is
    /// not a valid BPDU is handed back.
    pub fn group_parse(buf: T) -> Result<Self, T> {
        match classify(buf.chunk()) {
            Ok(BpduShape::Tcn) => Ok(BpduMessageGroup::Tcn(TcnBpduMessage::parse_unchecked(buf))),
            Ok(BpduShape::Config) => Ok(BpduMessageGroup::Config(
                ConfigBpduMessage::parse_unchecked(buf),
            )),
            Ok(BpduShape::Rst) => Ok(BpduMessageGroup::Rst(RstBpduMessage::parse_unchecked(buf))),
            Ok(BpduShape::Mst) => Ok(BpduMessageGroup::Mst(MstBpduMessage::parse_unchecked(buf))),
            Err(_) => Err(buf),
        }
    }
}

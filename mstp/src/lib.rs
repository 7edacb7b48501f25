#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

//! An IEEE 802.1Q-2011 spanning tree engine covering STP, RSTP and MSTP.
//!
//! The crate is a pure automaton library: a [`Bridge`] owns its ports and
//! trees, the host feeds it received BPDUs, link events and one-second ticks,
//! and the bridge answers through the [`StpCallbacks`] capability it was built
//! with (transmitting BPDUs, switching learning/forwarding, flushing the
//! filtering database). Every entry point runs the state machines to a fixed
//! point before returning.
//!
//! The [`bpdu`] module can also be used on its own as a BPDU codec, either
//! through the zero-copy message views or through the owned [`Bpdu`] value.
//!
//! ```
//! use mstp::{Bridge, BridgeConfig, EtherAddr, NoopCallbacks, PortRole, CIST};
//!
//! let mac = EtherAddr([0x02, 0, 0, 0, 0, 0x01]);
//! let mut bridge = Bridge::new(2, 0, mac, BridgeConfig::default(), NoopCallbacks)?;
//! bridge.start(0)?;
//! bridge.enable_port(0, 100, true, 0)?;
//!
//! assert_eq!(bridge.port_role(0, CIST)?, PortRole::Designated);
//! assert_eq!(bridge.port_role(1, CIST)?, PortRole::Disabled);
//! # Ok::<(), mstp::BridgeError>(())
//! ```

#[macro_use]
mod macros;

mod traits;
pub use traits::{Buf, PktBuf, PktBufMut};

mod cursors;
pub use cursors::{Cursor, CursorMut};

mod error;
pub use error::{BpduError, BridgeError, Result};

pub mod bpdu;
pub use bpdu::Bpdu;

mod vector;
pub use vector::{BridgeId, EtherAddr, PortId, PriorityVector, Times, PRIORITY_VECTOR_LEN};

pub mod timer;

mod config;
pub use config::{
    AdminP2P, BridgeConfig, MstConfigId, MstConfigTable, StpVersion, MST_CONFIG_NAME_LEN,
};

mod callbacks;
pub use callbacks::{FlushFdbType, NoopCallbacks, StpCallbacks};

mod bridge;
pub use bridge::{Bridge, PortRole, PortState, CIST};

mod sm;

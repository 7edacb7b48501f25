use crate::sm::port_role_selection;
use crate::vector::{BridgeId, PortId, PriorityVector, Times};

/// Per tree variables of the bridge. Tree 0 is the CIST, tree `n` the MSTI
/// whose MSTID is `n`.
#[derive(Debug, Clone)]
pub(crate) struct Tree {
    pub(crate) bridge_id: BridgeId,
    pub(crate) root_priority: PriorityVector,
    pub(crate) root_port_id: PortId,
    pub(crate) root_times: Times,
    pub(crate) role_selection: port_role_selection::State,
}

impl Tree {
    pub(crate) fn new(bridge_id: BridgeId, bridge_times: Times) -> Self {
        let mut tree = Self {
            bridge_id,
            root_priority: PriorityVector::default(),
            root_port_id: PortId::default(),
            root_times: bridge_times,
            role_selection: port_role_selection::State::InitTree,
        };
        tree.root_priority = tree.bridge_priority();
        tree
    }

    pub(crate) fn is_cist(&self) -> bool {
        self.bridge_id.sys_id_ext() == 0
    }

    /// The bridge priority vector: the vector this bridge would advertise if
    /// it were the root.
    pub(crate) fn bridge_priority(&self) -> PriorityVector {
        let root_id = if self.is_cist() {
            self.bridge_id
        } else {
            BridgeId::default()
        };
        PriorityVector {
            root_id,
            external_root_path_cost: 0,
            regional_root_id: self.bridge_id,
            internal_root_path_cost: 0,
            designated_bridge_id: self.bridge_id,
            designated_port_id: PortId::default(),
            bridge_port_id: PortId::default(),
        }
    }
}

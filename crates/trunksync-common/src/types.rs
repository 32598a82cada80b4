//! Domain types for trunk port synchronization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::fields;

/// Reserved device owner tag marking a port as an attached trunk subport.
pub const TRUNK_SUBPORT_OWNER: &str = "trunk:subport";

/// Operational status of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortStatus {
    /// Port is up and passing traffic.
    Active,
    /// Port is down.
    Down,
}

impl PortStatus {
    /// Returns the status as the string stored in the port database.
    pub fn as_str(&self) -> &'static str {
        match self {
            PortStatus::Active => "ACTIVE",
            PortStatus::Down => "DOWN",
        }
    }
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PortStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(PortStatus::Active),
            "DOWN" => Ok(PortStatus::Down),
            _ => Err(()),
        }
    }
}

/// Status of a trunk as seen by the trunk management subsystem.
///
/// The synchronizer only ever advances this field; it never creates or
/// deletes trunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrunkStatus {
    /// No subports attached or trunk not yet processed.
    Down,
    /// Trunk processed and serving its subports.
    Active,
    /// Some subports failed to attach.
    Degraded,
    /// Trunk processing failed.
    Error,
}

impl TrunkStatus {
    /// Returns the status as the string stored in the trunk database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrunkStatus::Down => "DOWN",
            TrunkStatus::Active => "ACTIVE",
            TrunkStatus::Degraded => "DEGRADED",
            TrunkStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for TrunkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Virtual interface type of a port binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VifType {
    /// Plain OVS interface.
    Ovs,
    /// vhost-user interface.
    VhostUser,
    /// Port is not plugged anywhere.
    Unbound,
}

impl VifType {
    /// Returns the VIF type as the string stored in the binding record.
    pub fn as_str(&self) -> &'static str {
        match self {
            VifType::Ovs => "ovs",
            VifType::VhostUser => "vhostuser",
            VifType::Unbound => "unbound",
        }
    }

    /// Returns true if this VIF type indicates the port is plugged into
    /// a dataplane.
    pub fn is_plugged(&self) -> bool {
        !matches!(self, VifType::Unbound)
    }
}

/// Segmentation type of a subport. Only VLAN is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentationType {
    /// 802.1Q VLAN tagging.
    Vlan,
}

impl SegmentationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentationType::Vlan => "vlan",
        }
    }
}

/// Typed binding profile.
///
/// The profile travels as an open string-keyed mapping at the store
/// boundary; inside the synchronizer it is this small structure with
/// optional fields. Unknown keys are not preserved - the synchronizer
/// owns exactly these three.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingProfile {
    /// Trunk parent port identifier, set while attached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,

    /// VLAN tag, set while attached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<u16>,

    /// Live-migration target host, set by the compute layer mid-migration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrating_to: Option<String>,
}

impl BindingProfile {
    /// Returns true if no profile field is set.
    pub fn is_empty(&self) -> bool {
        self.parent_name.is_none() && self.tag.is_none() && self.migrating_to.is_none()
    }

    /// Serializes the profile to its wire form, a sparse string-keyed map.
    ///
    /// This is the seam for host store implementations: the persistence
    /// layer stores the profile as an open mapping, and real `PortStore`
    /// backends convert at this boundary. Nothing inside the
    /// synchronizer touches the wire form.
    pub fn to_wire(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if let Some(parent) = &self.parent_name {
            map.insert(
                fields::PROFILE_PARENT_NAME.to_string(),
                Value::String(parent.clone()),
            );
        }
        if let Some(tag) = self.tag {
            map.insert(fields::PROFILE_TAG.to_string(), Value::from(tag));
        }
        if let Some(target) = &self.migrating_to {
            map.insert(
                fields::PROFILE_MIGRATING_TO.to_string(),
                Value::String(target.clone()),
            );
        }
        map
    }

    /// Parses the wire form back into the typed profile, the inverse of
    /// [`BindingProfile::to_wire`] for host store implementations.
    ///
    /// Keys the synchronizer does not own are dropped, as are values of
    /// the wrong shape: a tag outside the u16 range parses as absent
    /// rather than truncating.
    pub fn from_wire(map: &Map<String, Value>) -> Self {
        Self {
            parent_name: map
                .get(fields::PROFILE_PARENT_NAME)
                .and_then(Value::as_str)
                .map(str::to_string),
            tag: map
                .get(fields::PROFILE_TAG)
                .and_then(Value::as_u64)
                .and_then(|t| u16::try_from(t).ok()),
            migrating_to: map
                .get(fields::PROFILE_MIGRATING_TO)
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// A port binding record, keyed by (port id, host).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBinding {
    /// Port this binding belongs to.
    pub port_id: String,
    /// Host the port is bound on; empty when unbound.
    pub host: String,
    /// Virtual interface type.
    pub vif_type: VifType,
    /// Binding status.
    pub status: PortStatus,
    /// Out-of-band attributes.
    pub profile: BindingProfile,
}

impl PortBinding {
    /// Returns the host this binding is effectively on.
    ///
    /// While a live migration is in progress the migration target host
    /// takes precedence over the recorded host.
    pub fn effective_host(&self) -> &str {
        self.profile.migrating_to.as_deref().unwrap_or(&self.host)
    }
}

/// A network-attachable port with its bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// Port identifier.
    pub id: String,
    /// Free-form role tag; [`TRUNK_SUBPORT_OWNER`] while attached as a
    /// subport, empty otherwise.
    pub device_owner: String,
    /// Operational status.
    pub status: PortStatus,
    /// Local revision counter for this port, advanced on every committed
    /// synchronization.
    pub revision: u64,
    /// Bindings; zero, one (normal) or two (mid-migration).
    pub bindings: Vec<PortBinding>,
}

impl Port {
    /// Returns the port's active binding, if any.
    ///
    /// When more than one binding is active (mid-migration) the last one
    /// in storage order wins. Upstream leaves the multi-active tie-break
    /// unspecified; storage order matches its observed behavior.
    pub fn active_binding(&self) -> Option<&PortBinding> {
        self.bindings
            .iter()
            .filter(|b| b.status == PortStatus::Active)
            .last()
    }

    /// Returns true if the port is actively bound somewhere: some binding
    /// has a host and a VIF type that indicates it is plugged.
    pub fn is_bound(&self) -> bool {
        self.bindings
            .iter()
            .any(|b| !b.host.is_empty() && b.vif_type.is_plugged())
    }
}

/// A subport entry: a child port attached to a trunk with a VLAN tag.
///
/// Immutable once created; deletion removes the mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subport {
    /// The child port identifier.
    pub port_id: String,
    /// Segmentation type; only VLAN is supported.
    pub segmentation_type: SegmentationType,
    /// The VLAN tag.
    pub segmentation_id: u16,
}

impl Subport {
    /// Creates a VLAN subport.
    pub fn vlan(port_id: impl Into<String>, tag: u16) -> Self {
        Self {
            port_id: port_id.into(),
            segmentation_type: SegmentationType::Vlan,
            segmentation_id: tag,
        }
    }
}

/// A trunk: a parent port carrying multiple tagged subports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trunk {
    /// Trunk identifier.
    pub id: String,
    /// Parent port identifier.
    pub port_id: String,
    /// Trunk status, advanced by the synchronizer.
    pub status: TrunkStatus,
    /// Attached subports.
    pub sub_ports: Vec<Subport>,
}

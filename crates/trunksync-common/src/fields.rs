//! Field and key name constants for binding profiles and remote records.

/// Binding profile field carrying the trunk parent port identifier.
pub const PROFILE_PARENT_NAME: &str = "parent_name";

/// Binding profile field carrying the VLAN tag.
pub const PROFILE_TAG: &str = "tag";

/// Binding profile field set while a live migration is in progress;
/// its value is the migration target host.
pub const PROFILE_MIGRATING_TO: &str = "migrating_to";

/// External-id key on the remote logical port record mirroring the
/// local port's device owner.
pub const EXT_ID_DEVICE_OWNER: &str = "device_owner";

//! Account topology: groups and the devices inside them.

use crate::models::comfort_cloud::{Device, Groups};

/// All devices, group order first, then device order within each group.
/// No dedup and no sorting.
pub fn flatten(groups: Groups) -> Vec<Device> {
    groups.groups.into_iter().flat_map(|g| g.devices).collect()
}

/// GUIDs of all devices in the same order as [`flatten`].
pub fn device_guids(groups: &Groups) -> Vec<String> {
    groups
        .groups
        .iter()
        .flat_map(|g| g.devices.iter().map(|d| d.device_guid.clone()))
        .collect()
}

/// Look up a device by GUID.
pub fn find<'a>(groups: &'a Groups, device_guid: &str) -> Option<&'a Device> {
    groups
        .groups
        .iter()
        .flat_map(|g| g.devices.iter())
        .find(|d| d.device_guid == device_guid)
}

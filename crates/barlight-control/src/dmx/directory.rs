//! Device directory
//!
//! Devices are bucketed by color-mapping group into lists of device indices.
//! Each device's DMX channels are resolved to payload offsets once, so the
//! per-frame loop only does array lookups.

use barlight_core::Device;

use super::artnet::channel_index;

/// A device resolved against the universe table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSlot {
    /// Index into the universe buffers
    pub universe: usize,
    /// Payload offsets for red, green, blue; `None` for an invalid channel
    pub offsets: [Option<usize>; 3],
}

/// Static table of devices grouped by color mapping
#[derive(Debug, Clone, Default)]
pub struct DeviceDirectory {
    slots: Vec<Option<DeviceSlot>>,
    groups: Vec<Vec<usize>>,
}

impl DeviceDirectory {
    /// Build the directory
    ///
    /// Devices naming an unknown group or universe are left out of every
    /// group and logged once here. A channel outside 1-512 is dropped on its
    /// own; the device's other channels still receive light.
    pub fn build(devices: &[Device], group_count: usize, universe_count: usize) -> Self {
        let mut groups = vec![Vec::new(); group_count];
        let mut slots = Vec::with_capacity(devices.len());

        for (index, device) in devices.iter().enumerate() {
            if device.group >= group_count {
                tracing::warn!(
                    "Device {} uses unknown color mapping {} ({} configured), device will be ignored",
                    index,
                    device.group,
                    group_count
                );
                slots.push(None);
                continue;
            }
            if device.universe >= universe_count {
                tracing::warn!(
                    "Device {} uses unknown universe {} ({} configured), device will be ignored",
                    index,
                    device.universe,
                    universe_count
                );
                slots.push(None);
                continue;
            }

            let channels = device.channels();
            let offsets = channels.map(channel_index);
            for (channel, offset) in channels.iter().zip(offsets.iter()) {
                if offset.is_none() {
                    tracing::warn!(
                        "Device {} has DMX channel {} outside 1-512, channel will be ignored",
                        index,
                        channel
                    );
                }
            }

            slots.push(Some(DeviceSlot {
                universe: device.universe,
                offsets,
            }));
            groups[device.group].push(index);
        }

        for (group, members) in groups.iter().enumerate() {
            tracing::debug!("Group {} has {} devices: {:?}", group, members.len(), members);
        }

        Self { slots, groups }
    }

    /// Device indices in a group, in configured order
    pub fn devices_in_group(&self, group: usize) -> &[usize] {
        self.groups.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolved slot of a device, `None` if it was excluded
    pub fn slot(&self, device: usize) -> Option<&DeviceSlot> {
        self.slots.get(device).and_then(Option::as_ref)
    }

    /// Indices of devices excluded at build time
    pub fn excluded(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.is_none().then_some(i))
            .collect()
    }
}

//! Band-to-hue color mapping per group

use barlight_core::{ColorMapping, MappingEntry};

use super::color::Rgb8;

#[derive(Debug, Clone)]
struct GroupTable {
    entries: Vec<MappingEntry>,
    // Out-of-range entries already warned about
    reported: Vec<bool>,
}

/// Ordered band-to-hue assignments for every color-mapping group
///
/// Entries are kept exactly as configured, duplicates included; each one
/// contributes its own color to the devices of its group.
#[derive(Debug, Clone, Default)]
pub struct ColorMapTable {
    groups: Vec<GroupTable>,
}

impl ColorMapTable {
    /// Copy the configured groups
    pub fn new(groups: &[ColorMapping]) -> Self {
        Self {
            groups: groups
                .iter()
                .map(|g| GroupTable {
                    entries: g.entries.clone(),
                    reported: vec![false; g.entries.len()],
                })
                .collect(),
        }
    }

    /// Number of groups
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Entries of one group, empty for an unknown group
    pub fn entries(&self, group: usize) -> &[MappingEntry] {
        self.groups
            .get(group)
            .map(|g| g.entries.as_slice())
            .unwrap_or(&[])
    }

    /// Compute the color of every entry of `group` for this frame
    ///
    /// `frame` holds clamped band intensities. Entries whose band lies outside
    /// the frame are skipped (a warning is logged the first time) and
    /// counted in the return value.
    pub fn for_each_color(
        &mut self,
        group: usize,
        frame: &[u8],
        mut apply: impl FnMut(Rgb8),
    ) -> usize {
        let Some(table) = self.groups.get_mut(group) else {
            return 0;
        };

        let mut skipped = 0;
        for (entry, reported) in table.entries.iter().zip(table.reported.iter_mut()) {
            let Some(&value) = frame.get(entry.band) else {
                if !*reported {
                    tracing::warn!(
                        "Color mapping {} references band {} but only {} bands exist, entry ignored",
                        group,
                        entry.band,
                        frame.len()
                    );
                    *reported = true;
                }
                skipped += 1;
                continue;
            };
            apply(Rgb8::from_hue(entry.hue as f32, value));
        }
        skipped
    }
}

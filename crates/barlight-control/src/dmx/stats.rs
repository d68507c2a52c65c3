//! Frame counters

use serde::Serialize;

/// Counters maintained by the engine; every field only ever grows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Completed `update_colors` calls
    pub frames_sent: u64,
    /// Input values above 255 that were clamped
    pub value_exceed_count: u64,
    /// Datagrams handed to the network
    pub packets_sent: u64,
    /// Sends that failed
    pub send_failures: u64,
    /// Frames re-rendered at the darkness floor
    pub floor_substitutions: u64,
}

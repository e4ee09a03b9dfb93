use serde::{Deserialize, Serialize};

pub mod sync_external_bookings {
    use super::*;

    #[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        /// Newly discovered bookings
        pub synced: usize,
        /// Existing bookings refreshed from the scheduling service
        pub updated: usize,
        pub failed: usize,
        pub timed_out: bool,
        /// A page fetch failed and the pass stopped early
        #[serde(default)]
        pub upstream_error: bool,
    }
}

pub mod send_due_reminders {
    use super::*;

    #[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub scanned: usize,
        pub sent: usize,
        pub skipped: usize,
        pub failed: usize,
    }
}

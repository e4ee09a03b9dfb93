use practice_booking_domain::Role;
use serde::{Deserialize, Serialize};

/// A Policy decides which actions a `User` can and cannot take.
///
/// Every `UseCase` that needs one contains a list of `Permission`s that is
/// required for a `User` to execute it. If the `User`s `Policy` is not
/// authorized some of these `Permission`s the request will be rejected.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Policy {
    /// `Permission`s allowed by the `Policy`
    allow: Option<Vec<Permission>>,
    /// `Permission`s rejected by the `Policy`
    reject: Option<Vec<Permission>>,
}

impl Policy {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => Self {
                allow: Some(vec![Permission::All]),
                reject: None,
            },
            Role::Client => Self {
                allow: Some(vec![Permission::CreateBooking, Permission::CancelBooking]),
                reject: None,
            },
        }
    }

    /// Checks if this `Policy` has the right to list of `Permission`s
    pub fn authorize(&self, permissions: &[Permission]) -> bool {
        if permissions.is_empty() {
            return true;
        }

        if let Some(rejected) = &self.reject {
            for rejected_permission in rejected {
                if *rejected_permission == Permission::All {
                    return false;
                }
                if permissions.contains(rejected_permission) {
                    return false;
                }
            }
        }

        if let Some(allowed) = &self.allow {
            if allowed.contains(&Permission::All) {
                return true;
            }

            return permissions
                .iter()
                .all(|permission| allowed.contains(permission));
        }

        false
    }
}

/// `Permission` are different kind of actions that can be performed.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum Permission {
    #[serde(rename = "*")]
    All,
    CreateBooking,
    /// Cancel a booking owned by the caller
    CancelBooking,
    /// Any other status change, and status changes of bookings owned by others
    UpdateBookingStatus,
    SendUrgentMessage,
    DeleteBooking,
    DeleteUser,
}

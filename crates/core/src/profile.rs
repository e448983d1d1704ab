//! Customer profiles.

use serde::{Deserialize, Serialize};

use crate::address::AddressBook;
use crate::types::{Email, Role, UserProfileId};

/// Profile linked 1:1 to an authenticated identity by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserProfileId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    pub addresses: AddressBook,
}

impl UserProfile {
    /// Fallback display name: the part of the email before the @.
    #[must_use]
    pub fn default_name(email: &Email) -> String {
        email.local_part().to_owned()
    }
}

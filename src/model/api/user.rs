use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::db::user::User;

/// A request to create (or overwrite) a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSpec {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// The email is the user's key, so a user cannot be made without one.
impl TryFrom<UserSpec> for User {
    type Error = Error;

    fn try_from(spec: UserSpec) -> Result<Self, Self::Error> {
        Ok(Self {
            email: spec.email.ok_or(Error::MissingField("email"))?,
            first_name: spec.first_name,
            last_name: spec.last_name,
        })
    }
}

#[cfg(test)]
mod examples {
    use super::*;

    impl UserSpec {
        pub fn example() -> Self {
            Self {
                email: Some("ada@example.com".to_string()),
                first_name: Some("Ada".to_string()),
                last_name: Some("Lovelace".to_string()),
            }
        }
    }
}

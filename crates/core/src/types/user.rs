//! Store user entity.

use serde::{Deserialize, Serialize};

use super::UserId;

/// A registered user.
///
/// `password` is accepted on input but never serialized. Once persisted it
/// holds an Argon2 PHC string, not the plaintext.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub phone: String,
    pub user_status: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_is_read_but_never_written() {
        let user: User = serde_json::from_str(
            r#"{"username":"johndoe","firstName":"John","password":"secret123","userStatus":1}"#,
        )
        .unwrap();
        assert_eq!(user.password, "secret123");
        assert_eq!(user.first_name, "John");
        assert_eq!(user.user_status, 1);

        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["username"], "johndoe");
        assert_eq!(value["lastName"], "");
    }
}

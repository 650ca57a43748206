use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A stored user. Holds the bcrypt hash, so it is never serialized directly;
/// responses go through [`UserProfile`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub age: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outward-facing view of a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            age: user.age,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            age: user.age,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Registration payload. Missing fields deserialize to empty values so they are
/// reported as field-level validation errors rather than parse failures.
#[derive(Debug, Deserialize, Validate)]
pub struct UserInput {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Name is required!"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Please enter valid email"))]
    pub email: String,
    #[validate(range(min = 0, max = 150, message = "Age must be a number between 0 and 150"))]
    pub age: Option<i32>,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password with Minimum 6 character!"))]
    pub password: String,
}

/// Partial update payload for `PUT /users/{id}`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UserUpdateInput {
    #[validate(length(min = 1, max = 100, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Please enter valid email"))]
    pub email: Option<String>,
    #[validate(range(min = 0, max = 150, message = "Age must be a number between 0 and 150"))]
    pub age: Option<i32>,
    #[validate(length(min = 6, message = "Password with Minimum 6 character!"))]
    pub password: Option<String>,
}

/// Everything the store needs to insert a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub age: Option<i32>,
}

/// Fields to overwrite on an existing user; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(age) = self.age {
            user.age = Some(age);
        }
        if let Some(password_hash) = self.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn stored_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$2b$04$abcdefghijklmnopqrstuu".into(),
            age: Some(36),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_user_input_validation() {
        let input = UserInput {
            name: "testuser".to_string(),
            email: "test@example.com".to_string(),
            age: Some(30),
            password: "password123".to_string(),
        };
        assert!(input.validate().is_ok());

        let input = UserInput {
            name: "testuser".to_string(),
            email: "invalid-email".to_string(),
            age: None,
            password: "password123".to_string(),
        };
        assert!(input.validate().is_err());

        let input = UserInput {
            name: "testuser".to_string(),
            email: "test@example.com".to_string(),
            age: None,
            password: "short".to_string(),
        };
        assert!(input.validate().is_err());

        let input = UserInput {
            name: String::new(),
            email: "test@example.com".to_string(),
            age: Some(-1),
            password: "password123".to_string(),
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("age"));
    }

    #[test]
    fn test_missing_fields_deserialize_as_invalid() {
        let input: UserInput = serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("email"));
    }

    #[test]
    fn test_profile_never_contains_password_hash() {
        let user = stored_user();
        let json = serde_json::to_value(UserProfile::from(&user)).unwrap();

        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains(&user.password_hash));
        assert_eq!(json["email"], "ada@example.com");
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn test_user_changes_apply_only_given_fields() {
        let mut user = stored_user();
        let before = user.clone();

        UserChanges {
            name: Some("Grace".into()),
            ..Default::default()
        }
        .apply(&mut user);

        assert_eq!(user.name, "Grace");
        assert_eq!(user.email, before.email);
        assert_eq!(user.age, before.age);
        assert_eq!(user.password_hash, before.password_hash);
        assert!(user.updated_at >= before.updated_at);
    }
}

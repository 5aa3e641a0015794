//! Profile records and the client-facing profile view.

use serde::{Deserialize, Serialize};

/// Role assigned to every profile view. There is no role system upstream.
pub const DEFAULT_ROLE: &str = "user";

/// Profile as stored and returned by the profile service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRecord {
    pub username: String,
    pub name: String,
    pub surname: String,
    pub patronymic: String,
    pub gender: String,
    pub birthday: String,
    pub avatar_path: String,
}

/// Profile shape returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileView {
    pub username: String,
    pub name: String,
    pub surname: String,
    pub patronymic: String,
    pub gender: String,
    pub date_of_birth: String,
    pub avatar_path: String,
    pub role: String,
}

impl ProfileView {
    /// Replace the avatar path (e.g. after URL normalization).
    pub fn with_avatar_path(mut self, avatar_path: impl Into<String>) -> Self {
        self.avatar_path = avatar_path.into();
        self
    }
}

/// Build the client view of a profile record.
///
/// Never fails: a missing record yields empty fields with the default role,
/// since this runs on the response path.
pub fn map_profile(record: Option<&ProfileRecord>) -> ProfileView {
    let Some(record) = record else {
        return ProfileView {
            username: String::new(),
            name: String::new(),
            surname: String::new(),
            patronymic: String::new(),
            gender: String::new(),
            date_of_birth: String::new(),
            avatar_path: String::new(),
            role: DEFAULT_ROLE.to_string(),
        };
    };

    ProfileView {
        username: record.username.clone(),
        name: record.name.clone(),
        surname: record.surname.clone(),
        patronymic: record.patronymic.clone(),
        gender: record.gender.clone(),
        date_of_birth: record.birthday.clone(),
        avatar_path: record.avatar_path.clone(),
        role: DEFAULT_ROLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_record_maps_to_empty_view_with_default_role() {
        let view = map_profile(None);
        assert_eq!(view.username, "");
        assert_eq!(view.name, "");
        assert_eq!(view.surname, "");
        assert_eq!(view.patronymic, "");
        assert_eq!(view.gender, "");
        assert_eq!(view.date_of_birth, "");
        assert_eq!(view.avatar_path, "");
        assert_eq!(view.role, "user");
    }

    #[test]
    fn birthday_becomes_date_of_birth() {
        let record = ProfileRecord {
            username: "ivan@mail.example".into(),
            name: "Ivan".into(),
            surname: "Petrov".into(),
            patronymic: "Sergeevich".into(),
            gender: "male".into(),
            birthday: "1990-04-12".into(),
            avatar_path: "http://minio:9000/avatars/ivan.png".into(),
        };

        let view = map_profile(Some(&record));
        assert_eq!(view.username, record.username);
        assert_eq!(view.name, "Ivan");
        assert_eq!(view.surname, "Petrov");
        assert_eq!(view.patronymic, "Sergeevich");
        assert_eq!(view.gender, "male");
        assert_eq!(view.date_of_birth, "1990-04-12");
        assert_eq!(view.avatar_path, record.avatar_path);
        assert_eq!(view.role, DEFAULT_ROLE);
    }

    #[test]
    fn view_serializes_with_client_field_names() {
        let json = serde_json::to_value(map_profile(None)).unwrap();
        assert!(json.get("date_of_birth").is_some());
        assert!(json.get("birthday").is_none());
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn record_tolerates_missing_fields() {
        let record: ProfileRecord = serde_json::from_str(r#"{"username":"a"}"#).unwrap();
        assert_eq!(record.username, "a");
        assert_eq!(record.birthday, "");
    }
}

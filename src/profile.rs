use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub grade: String,
    /// Image data URL; empty when unset.
    #[serde(default)]
    pub avatar: String,
}

impl UserProfile {
    pub fn guest() -> Self {
        Self {
            name: "Guest".to_string(),
            school: "Guest Mode".to_string(),
            grade: String::new(),
            avatar: String::new(),
        }
    }

    /// Up to two uppercase initials of the name.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "Student".to_string(),
            school: String::new(),
            grade: String::new(),
            avatar: String::new(),
        }
    }
}

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Entrepreneur,
    Investor,
    Admin,
}

impl UserRole {
    /// Value stored in the `users.role` column.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::Entrepreneur => "emprendedor",
            Self::Investor => "inversor",
            Self::Admin => "admin",
        }
    }

    pub fn parse_db(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "emprendedor" | "entrepreneur" => Some(Self::Entrepreneur),
            "inversor" | "investor" => Some(Self::Investor),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Entrepreneur => "emprendedor",
            Self::Investor => "inversionista",
            Self::Admin => "administrador",
        }
    }
}

/// The authenticated identity behind one assistant request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: UserId,
    pub role: UserRole,
}

//! User model
//!
//! Users are maintained through the server's collection surface and consumed
//! read-only by the workflow engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sf_core::Id;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Leader,
    Manager,
    DeputyManager,
    #[default]
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Leader => "leader",
            Self::Manager => "manager",
            Self::DeputyManager => "deputy_manager",
            Self::Employee => "employee",
        }
    }

    /// Admin and leader act across department boundaries.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::Admin | Self::Leader)
    }

    /// Roles permitted to assign a work process to an employee.
    pub fn can_assign(&self) -> bool {
        matches!(
            self,
            Self::Admin | Self::Leader | Self::Manager | Self::DeputyManager
        )
    }
}

/// Department
///
/// `Admin` and `Leader` are organisational pseudo-departments; the six
/// production departments own work processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Department {
    Admin,
    Leader,
    Design,
    Procurement,
    Production,
    Assembly,
    Electrical,
    Quality,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Leader => "leader",
            Self::Design => "design",
            Self::Procurement => "procurement",
            Self::Production => "production",
            Self::Assembly => "assembly",
            Self::Electrical => "electrical",
            Self::Quality => "quality",
        }
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    pub username: String,
    /// Present only in the raw store document; stripped before any listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub full_name: String,
    pub role: Role,
    /// None for the seeded administrator account.
    pub department: Option<Department>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        full_name: impl Into<String>,
        role: Role,
        department: Option<Department>,
    ) -> Self {
        let username = username.into();
        Self {
            id: format!("user_{username}"),
            username,
            password: None,
            full_name: full_name.into(),
            role,
            department,
            created_at: Some(Utc::now()),
        }
    }

    /// Copy with the password removed, safe for listings.
    pub fn sanitized(&self) -> Self {
        Self {
            password: None,
            ..self.clone()
        }
    }

    pub fn is_elevated(&self) -> bool {
        self.role.is_elevated()
    }
}

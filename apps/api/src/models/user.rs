use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    JobSeeker,
    Employer,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::JobSeeker => "job_seeker",
            UserRole::Employer => "employer",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "job_seeker" => Ok(UserRole::JobSeeker),
            "employer" => Ok(UserRole::Employer),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub email_verified: bool,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub hebrew_level: Option<String>,
    pub arrival_timeline: Option<String>,
    pub resume_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The user as returned over the API. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: Option<String>,
    pub full_name: String,
    pub role: String,
    pub email_verified: bool,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub hebrew_level: Option<String>,
    pub arrival_timeline: Option<String>,
    pub has_resume: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Full profile for the account owner.
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: Some(self.email.clone()),
            full_name: self.full_name.clone(),
            role: self.role.clone(),
            email_verified: self.email_verified,
            phone: self.phone.clone(),
            bio: self.bio.clone(),
            skills: self.skills.clone(),
            hebrew_level: self.hebrew_level.clone(),
            arrival_timeline: self.arrival_timeline.clone(),
            has_resume: self.resume_key.is_some(),
            created_at: self.created_at,
        }
    }

    /// Profile as seen by other users: contact details stripped.
    pub fn to_public_profile(&self) -> UserProfile {
        UserProfile {
            email: None,
            phone: None,
            ..self.to_profile()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            email: "dana@example.com".to_string(),
            password_hash: "$argon2id$v=19$...".to_string(),
            full_name: "Dana Levi".to_string(),
            role: "job_seeker".to_string(),
            email_verified: true,
            phone: Some("+972-50-000-0000".to_string()),
            bio: None,
            skills: vec!["react".to_string()],
            hebrew_level: Some("basic".to_string()),
            arrival_timeline: Some("3-months".to_string()),
            resume_key: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_public_profile_strips_contact_details() {
        let profile = make_user().to_public_profile();
        assert!(profile.email.is_none());
        assert!(profile.phone.is_none());
        assert_eq!(profile.full_name, "Dana Levi");
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("employer".parse::<UserRole>().unwrap(), UserRole::Employer);
        assert!("recruiter".parse::<UserRole>().is_err());
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role. Admins also hold every `User` permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i16)]
pub enum UserRole {
    #[default]
    User = 0,
    Admin = 1,
}

impl UserRole {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(UserRole::User),
            1 => Some(UserRole::Admin),
            _ => None,
        }
    }

    /// Colon-joined role list exposed to clients
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            UserRole::User => "USER",
            UserRole::Admin => "USER:ADMIN",
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id() {
        assert_eq!(UserRole::from_id(0), Some(UserRole::User));
        assert_eq!(UserRole::from_id(1), Some(UserRole::Admin));
        assert_eq!(UserRole::from_id(9), None);
    }

    #[test]
    fn test_codes() {
        assert_eq!(UserRole::User.to_string(), "USER");
        assert_eq!(UserRole::Admin.to_string(), "USER:ADMIN");
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::User.is_admin());
    }
}

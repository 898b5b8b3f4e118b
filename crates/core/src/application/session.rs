// Staff Session
//
// Replaces the ambient authenticated-session flag of the original with
// an explicit principal passed into each staff-only use case.

use crate::error::{AppError, Result};

/// Caller identity for lifecycle operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// Unauthenticated caller (submitters, confirmation links)
    Anonymous,
    /// Authenticated staff principal
    Staff { name: String },
}

impl Session {
    pub fn staff(name: impl Into<String>) -> Self {
        Session::Staff { name: name.into() }
    }

    /// Authorization guard for staff-only operations.
    pub fn require_staff(&self) -> Result<&str> {
        match self {
            Session::Staff { name } => Ok(name),
            Session::Anonymous => Err(AppError::Unauthorized(
                "staff authentication required".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_fails_the_staff_guard() {
        assert!(Session::Anonymous.require_staff().is_err());
        assert_eq!(Session::staff("kim").require_staff().unwrap(), "kim");
    }
}

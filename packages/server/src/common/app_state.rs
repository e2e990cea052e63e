//! Per-request visitor context.

use crate::common::MemberId;

/// Role carried by the authenticated member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitorRole {
    Member,
    Trainer,
    Admin,
}

impl VisitorRole {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "member" => Some(VisitorRole::Member),
            "trainer" => Some(VisitorRole::Trainer),
            "admin" => Some(VisitorRole::Admin),
            _ => None,
        }
    }
}

/// Request-scoped identity resolved by the upstream gateway.
///
/// This is the same for all domains - just tracks who is calling.
/// Domain-specific results come from action return values.
#[derive(Debug, Clone, Default)]
pub struct Visitor {
    /// The authenticated member ID, if any.
    pub member_id: Option<MemberId>,
    /// Role of the authenticated member.
    pub role: Option<VisitorRole>,
}

impl Visitor {
    /// Create a visitor for an authenticated member.
    pub fn authenticated(member_id: MemberId, role: VisitorRole) -> Self {
        Self {
            member_id: Some(member_id),
            role: Some(role),
        }
    }

    /// Create a visitor for an unauthenticated/anonymous request.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Check if the visitor is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.member_id.is_some()
    }

    /// Check if the visitor is an admin.
    /// Returns false for unauthenticated visitors.
    pub fn is_admin(&self) -> bool {
        self.member_id.is_some() && self.role == Some(VisitorRole::Admin)
    }

    /// Require the visitor to be authenticated.
    /// Returns the member_id or an error.
    pub fn require_auth(&self) -> anyhow::Result<MemberId> {
        self.member_id
            .ok_or_else(|| anyhow::anyhow!("Unauthenticated: valid identity required"))
    }

    /// Require the visitor to be an admin.
    pub fn require_admin(&self) -> anyhow::Result<MemberId> {
        let member_id = self.require_auth()?;
        if self.role != Some(VisitorRole::Admin) {
            anyhow::bail!("Unauthorized: admin access required");
        }
        Ok(member_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_is_not_authenticated() {
        let visitor = Visitor::anonymous();
        assert!(!visitor.is_authenticated());
        assert!(!visitor.is_admin());
        assert!(visitor.require_auth().is_err());
    }

    #[test]
    fn test_admin_requires_admin_role() {
        let member = Visitor::authenticated(MemberId::new(), VisitorRole::Member);
        assert!(member.is_authenticated());
        assert!(!member.is_admin());
        assert!(member.require_admin().is_err());

        let admin = Visitor::authenticated(MemberId::new(), VisitorRole::Admin);
        assert!(admin.is_admin());
        assert!(admin.require_admin().is_ok());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(VisitorRole::parse("trainer"), Some(VisitorRole::Trainer));
        assert_eq!(VisitorRole::parse("superuser"), None);
    }
}

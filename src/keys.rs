/// Cache key naming convention
///
/// Every cache key is `{kind}:{id}:{field}`, e.g.
/// `contractor:ACME-001:profile`. Prefixing keys with the logical entity is
/// what makes pattern-based invalidation meaningful: removing everything for
/// one contractor is a single anchored regex over the key space.
use std::fmt;

/// Logical entity kinds served by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Contractor,
    Portfolio,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Contractor => "contractor",
            EntityKind::Portfolio => "portfolio",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "contractor" => Some(EntityKind::Contractor),
            "portfolio" => Some(EntityKind::Portfolio),
            _ => None,
        }
    }
}

/// Structured form of a cache key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: String,
    pub field: String,
}

impl EntityKey {
    pub fn new(kind: EntityKind, id: &str, field: &str) -> Self {
        Self {
            kind,
            id: id.to_string(),
            field: field.to_string(),
        }
    }

    pub fn contractor(id: &str, field: &str) -> Self {
        Self::new(EntityKind::Contractor, id, field)
    }

    pub fn portfolio(id: &str, field: &str) -> Self {
        Self::new(EntityKind::Portfolio, id, field)
    }

    /// Parse a `{kind}:{id}:{field}` string. Ids may not contain `:`.
    pub fn parse(key: &str) -> Option<Self> {
        let mut parts = key.splitn(3, ':');
        let kind = EntityKind::parse(parts.next()?)?;
        let id = parts.next()?;
        let field = parts.next()?;
        if id.is_empty() || field.is_empty() || field.contains(':') {
            return None;
        }
        Some(Self::new(kind, id, field))
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.kind.as_str(), self.id, self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        let key = EntityKey::contractor("ACME-001", "profile");
        assert_eq!(key.to_string(), "contractor:ACME-001:profile");
        assert_eq!(EntityKey::parse("contractor:ACME-001:profile"), Some(key));
    }

    #[test]
    fn test_key_parse_rejects_garbage() {
        assert_eq!(EntityKey::parse("unknown:ACME-001:profile"), None);
        assert_eq!(EntityKey::parse("contractor:ACME-001"), None);
        assert_eq!(EntityKey::parse("contractor::profile"), None);
        assert_eq!(EntityKey::parse(""), None);
    }

    #[test]
    fn test_portfolio_keys() {
        let key = EntityKey::portfolio("PF-100", "holdings");
        assert_eq!(key.to_string(), "portfolio:PF-100:holdings");
    }
}

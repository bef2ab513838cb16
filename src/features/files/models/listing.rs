/// Which file records a listing may include
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingScope {
    /// Every record in the system
    All,
    /// Only records uploaded by this user id
    Owner(i64),
}

/// Allow-listed sort columns for file listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Id,
}

impl SortKey {
    /// Parse a requested sort key. Unknown or missing keys fall back to `id`.
    pub fn parse(requested: Option<&str>) -> Self {
        match requested.map(|s| s.trim().to_lowercase()).as_deref() {
            None | Some("") | Some("id") => Self::Id,
            Some(other) => {
                tracing::debug!("Unsupported sort key '{}', sorting by id", other);
                Self::Id
            }
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_falls_back_to_id() {
        assert_eq!(SortKey::parse(None), SortKey::Id);
        assert_eq!(SortKey::parse(Some("ID")), SortKey::Id);
        assert_eq!(SortKey::parse(Some("bogus")), SortKey::Id);
        assert_eq!(SortKey::parse(Some("id; DROP TABLE users")), SortKey::Id);
        assert_eq!(SortKey::Id.column(), "id");
    }
}

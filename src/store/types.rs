/// One person entry in the roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
  /// Opaque document id assigned by the store on creation, immutable after
  pub id: String,
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub avatar: String,
  pub role: String,
  pub salary: u64,
}

/// A candidate record before the store has assigned it an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub avatar: String,
  pub role: String,
  pub salary: u64,
}

/// Roles offered by the role picker. The field itself is an open string
/// set; this is only the menu.
pub const ROLES: &[&str] = &[
  "Frontend",
  "Backend",
  "Fullstack",
  "UI/UX",
  "Product Manager",
  "Testing",
];

impl Member {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }

  /// Combined list filter: case-insensitive substring match of `search`
  /// against the full name or the email, AND exact role equality. The
  /// empty role string is the "no filter" sentinel matching every role.
  pub fn matches(&self, search: &str, role_filter: &str) -> bool {
    let needle = search.to_lowercase();
    let matches_search = needle.is_empty()
      || self.full_name().to_lowercase().contains(&needle)
      || self.email.to_lowercase().contains(&needle);
    let matches_role = role_filter.is_empty() || self.role == role_filter;
    matches_search && matches_role
  }

  /// The field set written back on save (wholesale replacement).
  pub fn as_fields(&self) -> NewMember {
    NewMember {
      first_name: self.first_name.clone(),
      last_name: self.last_name.clone(),
      email: self.email.clone(),
      avatar: self.avatar.clone(),
      role: self.role.clone(),
      salary: self.salary,
    }
  }
}

impl NewMember {
  /// Attach a store-assigned id to produce a full record.
  pub fn with_id(self, id: String) -> Member {
    Member {
      id,
      first_name: self.first_name,
      last_name: self.last_name,
      email: self.email,
      avatar: self.avatar,
      role: self.role,
      salary: self.salary,
    }
  }
}

//! Schema validation for the add-member form.
//!
//! Creation is the only validated path; the edit flow deliberately applies
//! none of these rules. Errors are reported per field so the form can show
//! them inline, and an invalid draft never reaches the store client.

use crate::store::types::NewMember;
use url::Url;

/// Form fields, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  FirstName,
  LastName,
  Email,
  Avatar,
  Role,
  Salary,
}

impl Field {
  pub fn label(&self) -> &'static str {
    match self {
      Field::FirstName => "First Name",
      Field::LastName => "Last Name",
      Field::Email => "Email",
      Field::Avatar => "Avatar URL",
      Field::Role => "Role",
      Field::Salary => "Salary",
    }
  }
}

/// Raw form input, as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub avatar: String,
  pub role: String,
  pub salary: String,
}

/// Per-field validation failures for one submission attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
  errors: Vec<(Field, String)>,
}

impl ValidationErrors {
  pub fn is_empty(&self) -> bool {
    self.errors.is_empty()
  }

  pub fn message_for(&self, field: Field) -> Option<&str> {
    self
      .errors
      .iter()
      .find(|(f, _)| *f == field)
      .map(|(_, msg)| msg.as_str())
  }

  fn push(&mut self, field: Field, message: impl Into<String>) {
    self.errors.push((field, message.into()));
  }
}

/// Validate a draft against the creation schema. A valid draft converts to
/// a submittable record; an invalid one yields the per-field error map.
pub fn validate(draft: &Draft) -> Result<NewMember, ValidationErrors> {
  let mut errors = ValidationErrors::default();

  let first_name = draft.first_name.trim();
  if first_name.is_empty() {
    errors.push(Field::FirstName, "First Name is required");
  } else if first_name.chars().count() < 3 {
    errors.push(Field::FirstName, "min 3 char required");
  }

  let last_name = draft.last_name.trim();
  if last_name.is_empty() {
    errors.push(Field::LastName, "Last Name is required");
  }

  let email = draft.email.trim();
  if email.is_empty() {
    errors.push(Field::Email, "Email is required");
  } else if !is_valid_email(email) {
    errors.push(Field::Email, "Invalid email");
  }

  let avatar = draft.avatar.trim();
  if avatar.is_empty() {
    errors.push(Field::Avatar, "Avatar URL is required");
  } else if Url::parse(avatar).is_err() {
    errors.push(Field::Avatar, "Invalid URL");
  }

  let role = draft.role.trim();
  if role.is_empty() {
    errors.push(Field::Role, "Role is required");
  }

  let salary = match draft.salary.trim().parse::<u64>() {
    Ok(n) if n >= 1000 => Some(n),
    Ok(_) => {
      errors.push(Field::Salary, "min salary will be 1000");
      None
    }
    Err(_) => {
      errors.push(Field::Salary, "Salary must be a number");
      None
    }
  };

  if !errors.is_empty() {
    return Err(errors);
  }

  Ok(NewMember {
    first_name: first_name.to_string(),
    last_name: last_name.to_string(),
    email: email.to_string(),
    avatar: avatar.to_string(),
    role: role.to_string(),
    // salary is Some whenever errors is empty
    salary: salary.unwrap_or(1000),
  })
}

/// Syntactic email check: one `@`, a non-empty local part, and a domain
/// with at least one dot and no whitespace.
fn is_valid_email(email: &str) -> bool {
  let mut parts = email.splitn(2, '@');
  let local = parts.next().unwrap_or_default();
  let domain = parts.next().unwrap_or_default();

  !local.is_empty()
    && !domain.is_empty()
    && domain.contains('.')
    && !domain.starts_with('.')
    && !domain.ends_with('.')
    && !email.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn valid_draft() -> Draft {
    Draft {
      first_name: "Ann".to_string(),
      last_name: "Lee".to_string(),
      email: "ann@x.com".to_string(),
      avatar: "https://example.com/a.png".to_string(),
      role: "Backend".to_string(),
      salary: "5000".to_string(),
    }
  }

  #[test]
  fn test_valid_draft_converts() {
    let member = validate(&valid_draft()).unwrap();
    assert_eq!(member.first_name, "Ann");
    assert_eq!(member.salary, 5000);
  }

  #[test]
  fn test_first_name_required_and_min_length() {
    let mut draft = valid_draft();
    draft.first_name = String::new();
    let errors = validate(&draft).unwrap_err();
    assert_eq!(errors.message_for(Field::FirstName), Some("First Name is required"));

    draft.first_name = "Al".to_string();
    let errors = validate(&draft).unwrap_err();
    assert_eq!(errors.message_for(Field::FirstName), Some("min 3 char required"));
  }

  #[test]
  fn test_last_name_required() {
    let mut draft = valid_draft();
    draft.last_name = "  ".to_string();
    let errors = validate(&draft).unwrap_err();
    assert_eq!(errors.message_for(Field::LastName), Some("Last Name is required"));
  }

  #[test]
  fn test_email_syntax() {
    let mut draft = valid_draft();
    for bad in ["ann", "ann@", "@x.com", "ann@x", "ann @x.com"] {
      draft.email = bad.to_string();
      let errors = validate(&draft).unwrap_err();
      assert_eq!(errors.message_for(Field::Email), Some("Invalid email"), "{}", bad);
    }
  }

  #[test]
  fn test_avatar_must_be_a_url() {
    let mut draft = valid_draft();
    draft.avatar = "not a url".to_string();
    let errors = validate(&draft).unwrap_err();
    assert_eq!(errors.message_for(Field::Avatar), Some("Invalid URL"));
  }

  #[test]
  fn test_role_required() {
    let mut draft = valid_draft();
    draft.role = String::new();
    let errors = validate(&draft).unwrap_err();
    assert_eq!(errors.message_for(Field::Role), Some("Role is required"));
  }

  #[test]
  fn test_salary_below_minimum_rejected() {
    let mut draft = valid_draft();
    draft.salary = "500".to_string();
    let errors = validate(&draft).unwrap_err();
    assert_eq!(errors.message_for(Field::Salary), Some("min salary will be 1000"));
  }

  #[test]
  fn test_salary_must_parse() {
    let mut draft = valid_draft();
    draft.salary = "lots".to_string();
    let errors = validate(&draft).unwrap_err();
    assert_eq!(errors.message_for(Field::Salary), Some("Salary must be a number"));
  }

  #[test]
  fn test_multiple_errors_reported_together() {
    let errors = validate(&Draft::default()).unwrap_err();
    assert!(errors.message_for(Field::FirstName).is_some());
    assert!(errors.message_for(Field::Email).is_some());
    assert!(errors.message_for(Field::Role).is_some());
    assert!(errors.message_for(Field::Salary).is_some());
  }
}

use ratatui::prelude::Color;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", cut)
  }
}

/// Display color for a role label
pub fn role_color(role: &str) -> Color {
  match role {
    "Frontend" => Color::Cyan,
    "Backend" => Color::Green,
    "Fullstack" => Color::Magenta,
    "UI/UX" => Color::Yellow,
    "Product Manager" => Color::Blue,
    "Testing" => Color::Red,
    _ => Color::White,
  }
}

/// Format a salary with thousands separators, e.g. 1234567 -> "1,234,567"
pub fn format_salary(salary: u64) -> String {
  let digits = salary.to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push(',');
    }
    out.push(c);
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_role_colors_distinguish_menu_roles() {
    assert_eq!(role_color("Backend"), Color::Green);
    assert_eq!(role_color("Frontend"), Color::Cyan);
    // Open set: unknown roles still render
    assert_eq!(role_color("Wizard"), Color::White);
  }

  #[test]
  fn test_format_salary_groups_thousands() {
    assert_eq!(format_salary(0), "0");
    assert_eq!(format_salary(999), "999");
    assert_eq!(format_salary(5000), "5,000");
    assert_eq!(format_salary(1234567), "1,234,567");
  }
}

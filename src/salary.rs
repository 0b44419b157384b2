//! Pure reducer for the salary adjustment control on the detail view.
//!
//! The control accumulates increments/decrements against a working value
//! that is only written back to the store on save. Keeping this as a plain
//! function over a tagged action keeps it testable without any UI.

/// An adjustment applied to the working salary value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalaryAction {
  /// Raise the salary by the given amount
  Increment(u64),
  /// Lower the salary by the given amount, clamped at zero
  Decrement(u64),
  /// Replace the salary outright (used when seeding from a fetched record)
  Set(u64),
}

/// Apply one action to the current salary and return the new value.
pub fn apply(salary: u64, action: SalaryAction) -> u64 {
  match action {
    SalaryAction::Increment(amount) => salary.saturating_add(amount),
    SalaryAction::Decrement(amount) => salary.saturating_sub(amount),
    SalaryAction::Set(value) => value,
  }
}

/// Parse the transient amount input. Adjustments are only legal for a
/// positive amount; anything else disables the +/- controls.
pub fn parse_amount(input: &str) -> Option<u64> {
  match input.trim().parse::<u64>() {
    Ok(n) if n > 0 => Some(n),
    _ => None,
  }
}

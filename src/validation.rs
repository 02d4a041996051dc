// Validation utilities module
// Provides custom validation functions for domain-specific rules

use chrono::NaiveDate;
use validator::ValidationError;

/// Validates that a stay's end date is strictly after its start date
pub fn validate_date_order(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if end > start {
        Ok(())
    } else {
        Err(ValidationError::new("end_date_not_after_start_date"))
    }
}

/// Validates that a lead guest name is not blank
pub fn validate_guest_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        Err(ValidationError::new("guest_name_blank"))
    } else {
        Ok(())
    }
}

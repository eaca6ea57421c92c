//! RSVP form validation and rows

use serde::{Deserialize, Serialize};

use super::ApiError;

/// Raw `POST /api/rsvp` body; every field optional so validation can
/// report what is missing instead of failing to parse
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RsvpForm {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub attending: bool,
    pub guest_count: Option<i64>,
    pub dietary_restrictions: Option<String>,
    pub potluck_dish: Option<String>,
    pub message: Option<String>,
}

/// A validated, normalized RSVP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRsvp {
    pub name: String,
    pub email: String,
    pub attending: bool,
    pub guest_count: u32,
    pub dietary_restrictions: Option<String>,
    pub potluck_dish: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvpRow {
    pub id: u64,
    #[serde(flatten)]
    pub rsvp: NewRsvp,
    pub created_at: String,
}

/// Trim; blank becomes None
fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RsvpForm {
    pub fn validate(self) -> Result<NewRsvp, ApiError> {
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(ApiError::Validation("Name is required".into()));
        }

        let email = self
            .email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .unwrap_or_default();
        if !email.contains('@') {
            return Err(ApiError::Validation(
                "A valid email address is required".into(),
            ));
        }

        let guest_count = if self.attending {
            match self.guest_count {
                Some(n) if n >= 1 => u32::try_from(n).map_err(|_| {
                    ApiError::Validation("Guest count is too large".into())
                })?,
                _ => {
                    return Err(ApiError::Validation(
                        "Guest count must be at least 1 when attending".into(),
                    ));
                }
            }
        } else {
            0
        };

        Ok(NewRsvp {
            name: name.to_string(),
            email,
            attending: self.attending,
            guest_count,
            dietary_restrictions: optional_text(self.dietary_restrictions),
            potluck_dish: optional_text(self.potluck_dish),
            message: optional_text(self.message),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> RsvpForm {
        RsvpForm {
            name: Some("  Ana Lima ".into()),
            email: Some(" Ana@Example.COM ".into()),
            attending: true,
            guest_count: Some(2),
            dietary_restrictions: Some("  ".into()),
            potluck_dish: Some(" lemon bars ".into()),
            message: None,
        }
    }

    #[test]
    fn test_normalizes_fields() {
        let rsvp = form().validate().unwrap();
        assert_eq!(rsvp.name, "Ana Lima");
        assert_eq!(rsvp.email, "ana@example.com");
        assert_eq!(rsvp.guest_count, 2);
        assert_eq!(rsvp.dietary_restrictions, None);
        assert_eq!(rsvp.potluck_dish.as_deref(), Some("lemon bars"));
    }

    #[test]
    fn test_declining_zeroes_guest_count() {
        let rsvp = RsvpForm {
            attending: false,
            guest_count: Some(4),
            ..form()
        }
        .validate()
        .unwrap();
        assert_eq!(rsvp.guest_count, 0);
    }

    #[test]
    fn test_rejects_bad_input() {
        let blank_name = RsvpForm {
            name: Some("   ".into()),
            ..form()
        };
        assert!(matches!(blank_name.validate(), Err(ApiError::Validation(_))));

        let bad_email = RsvpForm {
            email: Some("ana.example.com".into()),
            ..form()
        };
        assert!(matches!(bad_email.validate(), Err(ApiError::Validation(_))));

        let no_guests = RsvpForm {
            guest_count: Some(0),
            ..form()
        };
        assert!(matches!(no_guests.validate(), Err(ApiError::Validation(_))));

        let missing_guests = RsvpForm {
            guest_count: None,
            ..form()
        };
        assert!(matches!(missing_guests.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_row_serializes_flat() {
        let row = RsvpRow {
            id: 7,
            rsvp: form().validate().unwrap(),
            created_at: "2026-06-20T12:00:00.000Z".into(),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["email"], "ana@example.com");
        assert_eq!(json["dietary_restrictions"], serde_json::Value::Null);
    }
}

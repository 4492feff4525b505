use crate::error::ReservationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Project-brief data collected after payment confirmation. Linked 1:1 to
/// a booking; resubmission overwrites the prior record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeSubmission {
    pub booking_id: Uuid,
    pub brand_name: String,
    pub offer_headline: String,
    pub packages_pricing: String,
    pub whatsapp_number: String,
    pub benefits: Vec<String>,
    pub testimonials: Option<String>,
    pub brand_colors: Option<String>,
    pub links: Option<String>,
}

impl IntakeSubmission {
    pub fn validate(&self) -> Result<(), ReservationError> {
        for (field, value) in [
            ("brandName", &self.brand_name),
            ("offerHeadline", &self.offer_headline),
            ("packagesPricing", &self.packages_pricing),
            ("whatsappNumber", &self.whatsapp_number),
        ] {
            if value.trim().is_empty() {
                return Err(ReservationError::Validation(format!(
                    "{} is required",
                    field
                )));
            }
        }

        if self.benefits.iter().all(|b| b.trim().is_empty()) {
            return Err(ReservationError::Validation(
                "at least one benefit is required".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> IntakeSubmission {
        IntakeSubmission {
            booking_id: Uuid::new_v4(),
            brand_name: "Acme Studio".to_string(),
            offer_headline: "Leads in 48 hours".to_string(),
            packages_pricing: "Starter 4999".to_string(),
            whatsapp_number: "+911234567890".to_string(),
            benefits: vec!["Fast".to_string(), "Done for you".to_string()],
            testimonials: None,
            brand_colors: None,
            links: None,
        }
    }

    #[test]
    fn complete_submission_passes() {
        assert!(submission().validate().is_ok());
    }

    #[test]
    fn blank_required_field_fails() {
        let mut s = submission();
        s.whatsapp_number = "   ".to_string();
        let err = s.validate().unwrap_err();
        assert!(matches!(err, ReservationError::Validation(_)));
    }

    #[test]
    fn empty_benefits_fail() {
        let mut s = submission();
        s.benefits = vec!["".to_string()];
        assert!(s.validate().is_err());
    }
}

//! Customer registration and edit.

use tracing::info;

use super::{clean, Intake, IntakeError, IntakeResult};
use crate::models::{Allergy, Customer, CustomerInput, MedicalHistory};
use crate::util::generate_customer_code;
use crate::validation::validate_customer;

impl Intake<'_> {
    /// Register a new customer, assigning the next free code when none is given.
    pub fn register_customer(&self, input: &CustomerInput) -> IntakeResult<Customer> {
        let input = normalize(input);
        validate_customer(&input).into_result()?;

        let codes = self.db.customer_codes()?;
        let code = match clean(&input.customer_code) {
            Some(code) if codes.contains(&code) => return Err(IntakeError::DuplicateCode(code)),
            Some(code) => code,
            None => generate_customer_code(&codes)?,
        };

        let mut customer = Customer::new(input.name.clone());
        customer.customer_code = Some(code);
        apply(&mut customer, &input);
        self.db.insert_customer(&customer)?;

        info!(
            customer_id = %customer.id,
            code = customer.display_code(),
            "Registered customer"
        );
        Ok(customer)
    }

    /// Replace a customer's profile. A blank code keeps the existing one.
    pub fn edit_customer(&self, customer_id: &str, input: &CustomerInput) -> IntakeResult<Customer> {
        let input = normalize(input);
        validate_customer(&input).into_result()?;

        let mut customer = self
            .db
            .get_customer(customer_id)?
            .ok_or_else(|| IntakeError::NotFound(customer_id.to_string()))?;

        if let Some(code) = clean(&input.customer_code) {
            if customer.customer_code.as_deref() != Some(code.as_str()) {
                if self.db.customer_codes()?.contains(&code) {
                    return Err(IntakeError::DuplicateCode(code));
                }
                customer.customer_code = Some(code);
            }
        }

        customer.name = input.name.clone();
        apply(&mut customer, &input);
        customer.touch();
        self.db.update_customer(&customer)?;
        Ok(customer)
    }
}

/// Trim every text field the way the form submits it.
fn normalize(input: &CustomerInput) -> CustomerInput {
    CustomerInput {
        customer_code: clean(&input.customer_code),
        name: input.name.trim().to_string(),
        name_kana: clean(&input.name_kana),
        birth_date: clean(&input.birth_date),
        gender: clean(&input.gender),
        phone: clean(&input.phone),
        email: clean(&input.email),
        address: clean(&input.address),
        occupation: clean(&input.occupation),
        referral_source: clean(&input.referral_source),
        visit_motivation: clean(&input.visit_motivation),
        first_visit_date: clean(&input.first_visit_date),
        practitioner: clean(&input.practitioner),
        memo: clean(&input.memo),
        allergies: input.allergies.clone(),
        medical_history: input.medical_history.clone(),
    }
}

fn apply(customer: &mut Customer, input: &CustomerInput) {
    customer.name_kana = input.name_kana.clone();
    customer.birth_date = input.birth_date.clone();
    customer.gender = input.gender.as_deref().and_then(|g| g.parse().ok());
    customer.phone = input.phone.clone();
    customer.email = input.email.clone();
    customer.address = input.address.clone();
    customer.occupation = input.occupation.clone();
    customer.referral_source = input.referral_source.clone();
    customer.visit_motivation = input.visit_motivation.clone();
    customer.first_visit_date = input.first_visit_date.clone();
    customer.practitioner = input.practitioner.clone();
    customer.memo = input.memo.clone();

    // Rows with a blank allergen or condition are dropped
    customer.allergies = input
        .allergies
        .iter()
        .filter(|row| !row.allergen.trim().is_empty())
        .map(|row| Allergy {
            allergen: row.allergen.trim().to_string(),
            severity: clean(&row.severity).and_then(|s| s.parse().ok()),
            note: clean(&row.note),
        })
        .collect();
    customer.medical_history = input
        .medical_history
        .iter()
        .filter(|row| !row.condition.trim().is_empty())
        .map(|row| MedicalHistory {
            condition: row.condition.trim().to_string(),
            note: clean(&row.note),
        })
        .collect();
}

use thiserror::Error;

use crate::{
    club::model::{NewPurchase, Purchase, PurchaseEdit},
    constants::CLUB,
};

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid Phone Number")]
    Phone,
    #[error("Enter a valid purchase amount.")]
    Amount,
    #[error("Enter a valid profit.")]
    Profit,
    #[error("Enter customer name.")]
    Name,
}

pub fn validate_phone(input: &str) -> Result<String, ValidationError> {
    let phone = input.trim();
    let well_formed = phone.len() == CLUB.phone_len
        && phone.starts_with(CLUB.phone_prefix)
        && phone.chars().all(|c| c.is_ascii_digit());
    if well_formed {
        Ok(phone.to_string())
    } else {
        Err(ValidationError::Phone)
    }
}

pub fn parse_amount(input: &str) -> Result<f64, ValidationError> {
    match input.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
        _ => Err(ValidationError::Amount),
    }
}

pub fn parse_profit(input: &str) -> Result<f64, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(0.0);
    }
    match input.parse::<f64>() {
        Ok(profit) if profit.is_finite() => Ok(profit),
        _ => Err(ValidationError::Profit),
    }
}

pub fn validate_name(input: &str) -> Result<String, ValidationError> {
    let name = input.trim();
    if name.is_empty() {
        Err(ValidationError::Name)
    } else {
        Ok(name.to_string())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PurchaseForm {
    pub name: String,
    pub amount: String,
    pub profit: String,
}

impl PurchaseForm {
    pub fn validate(&self, is_new_customer: bool) -> Result<NewPurchase, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let amount = parse_amount(&self.amount).map_err(|e| errors.push(e)).ok();
        let profit = parse_profit(&self.profit).map_err(|e| errors.push(e)).ok();
        let name = if is_new_customer {
            validate_name(&self.name).map_err(|e| errors.push(e)).ok()
        } else {
            None
        };

        match (amount, profit) {
            (Some(amount), Some(profit)) if errors.is_empty() => Ok(NewPurchase {
                amount,
                profit,
                name,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EditDraft {
    pub amount: f64,
    pub profit: Option<f64>,
}

impl EditDraft {
    // The server overwrites profit, so an omitted one keeps the stored value.
    pub fn resolve(self, current: &Purchase) -> PurchaseEdit {
        PurchaseEdit {
            amount: self.amount,
            profit: self.profit.unwrap_or(current.profit),
        }
    }
}

pub fn validate_edit(
    amount: &str,
    profit: Option<&str>,
) -> Result<EditDraft, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let amount = parse_amount(amount).map_err(|e| errors.push(e)).ok();
    let profit = match profit {
        Some(raw) => match parse_profit(raw) {
            Ok(profit) => Some(Some(profit)),
            Err(e) => {
                errors.push(e);
                None
            }
        },
        None => Some(None),
    };

    match (amount, profit) {
        (Some(amount), Some(profit)) => Ok(EditDraft { amount, profit }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_rule() {
        assert_eq!(validate_phone("09123456789").as_deref(), Ok("09123456789"));
        assert_eq!(validate_phone(" 09123456789 ").as_deref(), Ok("09123456789"));
        assert_eq!(validate_phone("0912345678"), Err(ValidationError::Phone));
        assert_eq!(validate_phone("091234567"), Err(ValidationError::Phone));
        assert_eq!(validate_phone("08123456789"), Err(ValidationError::Phone));
        assert_eq!(validate_phone("0912345678a"), Err(ValidationError::Phone));
        assert_eq!(validate_phone("091234567890"), Err(ValidationError::Phone));
    }

    #[test]
    fn test_amount_must_be_positive() {
        assert_eq!(parse_amount("350"), Ok(350.0));
        assert_eq!(parse_amount(" 12.5 "), Ok(12.5));
        assert_eq!(parse_amount("0"), Err(ValidationError::Amount));
        assert_eq!(parse_amount("-4"), Err(ValidationError::Amount));
        assert_eq!(parse_amount(""), Err(ValidationError::Amount));
        assert_eq!(parse_amount("abc"), Err(ValidationError::Amount));
        assert_eq!(parse_amount("inf"), Err(ValidationError::Amount));
    }

    #[test]
    fn test_profit_sign_is_not_checked() {
        assert_eq!(parse_profit("-20"), Ok(-20.0));
        assert_eq!(parse_profit(""), Ok(0.0));
        assert_eq!(parse_profit("x"), Err(ValidationError::Profit));
    }

    #[test]
    fn test_form_collects_every_error() {
        let form = PurchaseForm {
            name: "  ".to_string(),
            amount: "0".to_string(),
            profit: "5".to_string(),
        };
        assert_eq!(
            form.validate(true),
            Err(vec![ValidationError::Amount, ValidationError::Name])
        );
    }

    #[test]
    fn test_form_name_only_for_new_customers() {
        let form = PurchaseForm {
            name: " Reza ".to_string(),
            amount: "120".to_string(),
            profit: "".to_string(),
        };
        let existing = form.validate(false).unwrap();
        assert_eq!(existing.name, None);
        assert_eq!(existing.profit, 0.0);

        let new = form.validate(true).unwrap();
        assert_eq!(new.name.as_deref(), Some("Reza"));
    }

    #[test]
    fn test_validate_edit() {
        let draft = validate_edit("99.5", Some("-1")).unwrap();
        assert_eq!((draft.amount, draft.profit), (99.5, Some(-1.0)));
        assert_eq!(
            validate_edit("-1", Some("nope")),
            Err(vec![ValidationError::Amount, ValidationError::Profit])
        );
        assert_eq!(validate_edit("0", None), Err(vec![ValidationError::Amount]));
    }

    #[test]
    fn test_edit_without_profit_keeps_stored_profit() {
        let current = Purchase {
            id: 7,
            date: "2024-03-01".to_string(),
            phone: "09123456789".to_string(),
            amount: 120.0,
            profit: 35.5,
        };

        let edit = validate_edit("50", None).unwrap().resolve(&current);
        assert_eq!(edit, PurchaseEdit { amount: 50.0, profit: 35.5 });

        let edit = validate_edit("50", Some("")).unwrap().resolve(&current);
        assert_eq!(edit.profit, 0.0);
    }
}

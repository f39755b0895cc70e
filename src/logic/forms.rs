//! Raw screen forms and their record bindings.
//!
//! Forms carry field values as text, exactly as an input widget hands them
//! over; `Editable::parse` is where numeric and date fields get validated,
//! so a bad price or date is reported before any storage call.

use chrono::NaiveDate;

use crate::logic::edit::EditError;
use crate::logic::session::Editable;
use crate::model::{Customer, FruitBasket, Purchase, Student};

fn invalid(field: &'static str, value: &str) -> EditError {
    EditError::InvalidField {
        field,
        value: value.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentForm {
    pub personal_no: String,
    pub name: String,
    pub email: String,
}

impl Editable for Student {
    type Form = StudentForm;
    type Key = String;

    const ENTITY: &'static str = "student";
    const KEY_DESC: &'static str = "student personal number";

    fn key(&self) -> String {
        self.personal_no.clone()
    }

    fn parse(form: &StudentForm) -> Result<Self, EditError> {
        Ok(Student {
            personal_no: form.personal_no.trim().to_string(),
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
        })
    }

    fn to_form(&self) -> StudentForm {
        StudentForm {
            personal_no: self.personal_no.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerForm {
    pub account_no: String,
    pub name: String,
    pub delivery_address: String,
}

impl Editable for Customer {
    type Form = CustomerForm;
    type Key = String;

    const ENTITY: &'static str = "customer";
    const KEY_DESC: &'static str = "customer account number";

    fn key(&self) -> String {
        self.account_no.clone()
    }

    fn parse(form: &CustomerForm) -> Result<Self, EditError> {
        Ok(Customer {
            account_no: form.account_no.trim().to_string(),
            name: form.name.trim().to_string(),
            delivery_address: form.delivery_address.trim().to_string(),
        })
    }

    fn to_form(&self) -> CustomerForm {
        CustomerForm {
            account_no: self.account_no.clone(),
            name: self.name.clone(),
            delivery_address: self.delivery_address.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasketForm {
    pub basket_no: String,
    pub name: String,
    pub price: String,
}

impl Editable for FruitBasket {
    type Form = BasketForm;
    type Key = String;

    const ENTITY: &'static str = "basket";
    const KEY_DESC: &'static str = "basket number";

    fn key(&self) -> String {
        self.basket_no.clone()
    }

    fn parse(form: &BasketForm) -> Result<Self, EditError> {
        let price: f64 = form
            .price
            .trim()
            .parse()
            .map_err(|_| invalid("price", &form.price))?;

        Ok(FruitBasket {
            basket_no: form.basket_no.trim().to_string(),
            name: form.name.trim().to_string(),
            price,
        })
    }

    fn to_form(&self) -> BasketForm {
        BasketForm {
            basket_no: self.basket_no.clone(),
            name: self.name.clone(),
            price: self.price.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PurchaseForm {
    pub account_no: String,
    pub basket_no: String,
    /// ISO date, e.g. "2024-01-01".
    pub purchase_date: String,
}

impl Editable for Purchase {
    type Form = PurchaseForm;
    type Key = (String, String);

    const ENTITY: &'static str = "purchase";
    const KEY_DESC: &'static str = "purchase account or basket number";

    fn key(&self) -> (String, String) {
        (self.account_no.clone(), self.basket_no.clone())
    }

    fn parse(form: &PurchaseForm) -> Result<Self, EditError> {
        let purchase_date: NaiveDate = form
            .purchase_date
            .trim()
            .parse()
            .map_err(|_| invalid("purchase date", &form.purchase_date))?;

        Ok(Purchase {
            account_no: form.account_no.trim().to_string(),
            basket_no: form.basket_no.trim().to_string(),
            purchase_date,
        })
    }

    fn to_form(&self) -> PurchaseForm {
        PurchaseForm {
            account_no: self.account_no.clone(),
            basket_no: self.basket_no.clone(),
            purchase_date: self.purchase_date.to_string(),
        }
    }
}

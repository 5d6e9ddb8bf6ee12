use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fieldtrack_core::{DomainError, DomainResult, Entity, OwnerId};

/// A customer is the owner of inventory and jobs; both ids are the same value.
pub type CustomerId = OwnerId;

/// Customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub notes: String,
    pub created: DateTime<Utc>,
}

impl Customer {
    /// Case-insensitive substring match over name, address and phone.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        [&self.name, &self.address, &self.phone]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }

    pub fn apply(&mut self, patch: CustomerPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Raw customer fields as sent by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerFields {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub notes: String,
}

impl NewCustomer {
    pub fn into_customer(self, id: CustomerId, created: DateTime<Utc>) -> Customer {
        Customer {
            id,
            name: self.name,
            address: self.address,
            phone: self.phone,
            email: self.email,
            notes: self.notes,
            created,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

impl CustomerFields {
    pub fn into_new(self) -> DomainResult<NewCustomer> {
        Ok(NewCustomer {
            name: name(self.name)?,
            address: self.address.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
        })
    }

    pub fn into_patch(self) -> DomainResult<CustomerPatch> {
        Ok(CustomerPatch {
            name: self.name.map(|n| name(Some(n))).transpose()?,
            address: self.address,
            phone: self.phone,
            email: self.email,
            notes: self.notes,
        })
    }
}

fn name(value: Option<String>) -> DomainResult<String> {
    match value {
        Some(n) if !n.trim().is_empty() => Ok(n.trim().to_string()),
        Some(_) => Err(DomainError::validation("name cannot be empty")),
        None => Err(DomainError::validation("name is required")),
    }
}

//! Business collections exposed by the API.
//!
//! Their payloads are owned by the backend and pass through the client as
//! opaque JSON; only the routing lives here.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A CRUD collection of the scheduling API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    /// Customers of the business.
    Clients,
    /// Booked appointments.
    Appointments,
    /// Prepaid session packages.
    Packages,
    /// Payments and refunds.
    Transactions,
    /// Working hours and breaks.
    Schedules,
}

impl Resource {
    /// Collection path, e.g. `/clients`.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Clients => "/clients",
            Self::Appointments => "/appointments",
            Self::Packages => "/packages",
            Self::Transactions => "/transactions",
            Self::Schedules => "/schedules",
        }
    }

    /// Item path, e.g. `/clients/42`.
    #[must_use]
    pub fn item_path(self, id: &str) -> String {
        format!("{}/{id}", self.path())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path()[1..])
    }
}

impl FromStr for Resource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('/').to_ascii_lowercase().as_str() {
            "clients" => Ok(Self::Clients),
            "appointments" => Ok(Self::Appointments),
            "packages" => Ok(Self::Packages),
            "transactions" => Ok(Self::Transactions),
            "schedules" => Ok(Self::Schedules),
            other => Err(DomainError::UnknownResource(other.to_string())),
        }
    }
}

/// Filter for the available-slots lookup behind the weekly availability grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotQuery {
    /// Day to inspect.
    pub date: NaiveDate,
    /// Restrict to one professional.
    pub professional_id: Option<String>,
    /// Service being booked; its duration drives slot length.
    pub service_id: Option<String>,
}

impl SlotQuery {
    /// Path of the lookup endpoint.
    pub const PATH: &'static str = "/schedules/available-slots";

    /// Creates a query for `date`.
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self {
            date,
            professional_id: None,
            service_id: None,
        }
    }

    /// Query string pairs in the order the API documents them.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("date".to_string(), self.date.format("%Y-%m-%d").to_string())];
        if let Some(id) = &self.professional_id {
            pairs.push(("professionalId".to_string(), id.clone()));
        }
        if let Some(id) = &self.service_id {
            pairs.push(("serviceId".to_string(), id.clone()));
        }
        pairs
    }
}

//! Employee records
//!
//! Plain attribute bags stored in the cache as JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(flatten)]
    pub person: Person,
    pub job_title: String,
    pub hire_date: NaiveDate,
}

impl Employee {
    pub fn id(&self) -> u32 {
        self.person.id
    }
}

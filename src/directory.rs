//! Employee Directory
//!
//! A deliberately slow source of employee records. The demo API caches its
//! answers so repeated reads skip the simulated latency.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{bail, Result};
use chrono::NaiveDate;

use crate::models::{Employee, Person};

pub struct EmployeeDirectory {
    employees: BTreeMap<u32, Employee>,
    /// Delay applied to every lookup
    latency: Duration,
    lookups: AtomicU64,
    available: AtomicBool,
}

impl EmployeeDirectory {
    pub fn new(employees: Vec<Employee>, latency: Duration) -> Self {
        Self {
            employees: employees.into_iter().map(|e| (e.id(), e)).collect(),
            latency,
            lookups: AtomicU64::new(0),
            available: AtomicBool::new(true),
        }
    }

    /// A directory pre-filled with a handful of employees.
    pub fn seeded(latency: Duration) -> Self {
        let rows = [
            (1, "Ada", "Lovelace", "Analyst", (1842, 9, 1)),
            (2, "Grace", "Hopper", "Compiler Engineer", (1949, 6, 15)),
            (3, "Alan", "Turing", "Cryptanalyst", (1939, 9, 4)),
            (4, "Katherine", "Johnson", "Research Mathematician", (1953, 6, 1)),
            (5, "Edsger", "Dijkstra", "Programmer", (1952, 3, 1)),
        ];

        let employees = rows
            .into_iter()
            .filter_map(|(id, first, last, title, (y, m, d))| {
                Some(Employee {
                    person: Person {
                        id,
                        first_name: first.to_string(),
                        last_name: last.to_string(),
                        email: format!("{}.{}@example.com", first, last).to_lowercase(),
                    },
                    job_title: title.to_string(),
                    hire_date: NaiveDate::from_ymd_opt(y, m, d)?,
                })
            })
            .collect();

        Self::new(employees, latency)
    }

    /// Looks up one employee after the simulated latency.
    pub async fn find(&self, id: u32) -> Result<Option<Employee>> {
        self.begin_lookup().await?;
        Ok(self.employees.get(&id).cloned())
    }

    /// Every employee, ordered by id.
    pub async fn all(&self) -> Result<Vec<Employee>> {
        self.begin_lookup().await?;
        Ok(self.employees.values().cloned().collect())
    }

    /// Lookups served so far, failed ones included.
    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Simulates an outage: lookups fail while unavailable.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    async fn begin_lookup(&self) -> Result<()> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if !self.available.load(Ordering::Relaxed) {
            bail!("employee directory is unavailable");
        }
        Ok(())
    }
}

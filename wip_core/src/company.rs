//! # Company Data Structures
//!
//! The `Company` struct is the root container for one contractor's records.
//! Companies serialize to `.wip` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Company
//! ├── meta: CompanyMetadata (version, name, timestamps)
//! ├── settings: CompanySettings (labor defaults, T&M markups, tolerance)
//! ├── jobs / change_orders: HashMap<Uuid, …>
//! ├── employees / departments: HashMap<Uuid, …>
//! ├── allocations: HashMap<Uuid, DepartmentAllocation>
//! └── valuations: HashMap<Uuid, Valuation>
//! ```
//!
//! Only raw records are stored. Every derived figure is recomputed on read.
//!
//! ## Example
//!
//! ```rust
//! use wip_core::company::Company;
//! use wip_core::jobs::{Job, JobBilling};
//!
//! let mut company = Company::new("Oakdale Builders");
//! let id = company.add_job(Job::new("24-101", "Library", "City of Oakdale", JobBilling::fixed_price()));
//! assert!(company.get_job(&id).is_some());
//!
//! let json = serde_json::to_string_pretty(&company).unwrap();
//! assert!(json.contains("Oakdale Builders"));
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CalcError, CalcResult};
use crate::jobs::billing::BILLING_TOLERANCE_FRACTION;
use crate::jobs::{
    ChangeOrder, Job, JobBilling, LaborBilling, TmSettings, DEFAULT_LABOR_MARKUP, DEFAULT_MATERIAL_MARKUP,
    DEFAULT_OTHER_MARKUP,
};
use crate::labor::projection::DEFAULT_MONTHS_AHEAD;
use crate::labor::{
    Department, DepartmentAllocation, Employee, DEFAULT_ANNUAL_PTO_HOURS, DEFAULT_BURDEN_MULTIPLIER,
    DEFAULT_FTE, DEFAULT_UTILIZATION_TARGET,
};
use crate::units::Multiplier;
use crate::valuation::Valuation;

/// Current schema version for .wip files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root company container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub meta: CompanyMetadata,

    #[serde(default)]
    pub settings: CompanySettings,

    #[serde(default)]
    pub jobs: HashMap<Uuid, Job>,

    #[serde(default)]
    pub change_orders: HashMap<Uuid, ChangeOrder>,

    #[serde(default)]
    pub employees: HashMap<Uuid, Employee>,

    #[serde(default)]
    pub departments: HashMap<Uuid, Department>,

    #[serde(default)]
    pub allocations: HashMap<Uuid, DepartmentAllocation>,

    #[serde(default)]
    pub valuations: HashMap<Uuid, Valuation>,
}

impl Company {
    /// Create a new, empty company.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Company {
            meta: CompanyMetadata {
                version: SCHEMA_VERSION.to_string(),
                name: name.into(),
                created: now,
                modified: now,
            },
            settings: CompanySettings::default(),
            jobs: HashMap::new(),
            change_orders: HashMap::new(),
            employees: HashMap::new(),
            departments: HashMap::new(),
            allocations: HashMap::new(),
            valuations: HashMap::new(),
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn add_job(&mut self, job: Job) -> Uuid {
        let id = job.id;
        self.jobs.insert(id, job);
        self.touch();
        id
    }

    pub fn get_job(&self, id: &Uuid) -> Option<&Job> {
        self.jobs.get(id)
    }

    /// Remove a job and its change orders.
    pub fn remove_job(&mut self, id: &Uuid) -> Option<Job> {
        let job = self.jobs.remove(id);
        if job.is_some() {
            self.change_orders.retain(|_, co| co.job_id != *id);
            self.touch();
        }
        job
    }

    /// Jobs sorted by job number.
    pub fn jobs_sorted(&self) -> Vec<&Job> {
        let mut jobs: Vec<&Job> = self.jobs.values().collect();
        jobs.sort_by(|a, b| a.job_no.cmp(&b.job_no));
        jobs
    }

    /// Attach a change order to an existing job.
    pub fn add_change_order(&mut self, change_order: ChangeOrder) -> CalcResult<Uuid> {
        if !self.jobs.contains_key(&change_order.job_id) {
            return Err(CalcError::record_not_found("Job", change_order.job_id));
        }
        let id = change_order.id;
        self.change_orders.insert(id, change_order);
        self.touch();
        Ok(id)
    }

    /// Change orders for one job, sorted by number.
    pub fn change_orders_for(&self, job_id: &Uuid) -> Vec<&ChangeOrder> {
        let mut orders: Vec<&ChangeOrder> = self.change_orders.values().filter(|co| co.job_id == *job_id).collect();
        orders.sort_by(|a, b| a.co_number.cmp(&b.co_number));
        orders
    }

    pub fn add_employee(&mut self, employee: Employee) -> Uuid {
        let id = employee.id;
        self.employees.insert(id, employee);
        self.touch();
        id
    }

    /// Remove an employee and their allocations.
    pub fn remove_employee(&mut self, id: &Uuid) -> Option<Employee> {
        let employee = self.employees.remove(id);
        if employee.is_some() {
            self.allocations.retain(|_, a| a.employee_id != *id);
            self.touch();
        }
        employee
    }

    pub fn add_department(&mut self, department: Department) -> Uuid {
        let id = department.id;
        self.departments.insert(id, department);
        self.touch();
        id
    }

    /// Allocate part of an employee's time to a department.
    ///
    /// An employee has at most one allocation per department; change the
    /// existing one instead of adding a second.
    pub fn allocate(&mut self, allocation: DepartmentAllocation) -> CalcResult<Uuid> {
        if !self.employees.contains_key(&allocation.employee_id) {
            return Err(CalcError::record_not_found("Employee", allocation.employee_id));
        }
        if !self.departments.contains_key(&allocation.department_id) {
            return Err(CalcError::record_not_found("Department", allocation.department_id));
        }
        let duplicate = self.allocations.values().any(|a| {
            a.id != allocation.id
                && a.employee_id == allocation.employee_id
                && a.department_id == allocation.department_id
        });
        if duplicate {
            return Err(CalcError::invalid_input(
                "department_id",
                allocation.department_id.to_string(),
                "Employee is already allocated to this department",
            ));
        }
        let id = allocation.id;
        self.allocations.insert(id, allocation);
        self.touch();
        Ok(id)
    }

    pub fn remove_allocation(&mut self, id: &Uuid) -> Option<DepartmentAllocation> {
        let allocation = self.allocations.remove(id);
        if allocation.is_some() {
            self.touch();
        }
        allocation
    }

    /// Allocations as a list, ordered by employee, then department.
    pub fn allocation_list(&self) -> Vec<DepartmentAllocation> {
        let mut allocations: Vec<DepartmentAllocation> = self.allocations.values().copied().collect();
        allocations.sort_by_key(|a| (a.employee_id, a.department_id, a.id));
        allocations
    }

    /// Employees as a list, sorted by name.
    pub fn employee_list(&self) -> Vec<Employee> {
        let mut employees: Vec<Employee> = self.employees.values().cloned().collect();
        employees.sort_by(|a, b| a.name.cmp(&b.name));
        employees
    }

    /// Departments as a list, in display order.
    pub fn department_list(&self) -> Vec<Department> {
        let mut departments: Vec<Department> = self.departments.values().cloned().collect();
        departments.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
        departments
    }

    pub fn add_valuation(&mut self, valuation: Valuation) -> Uuid {
        let id = valuation.id;
        let is_current = valuation.is_current;
        self.valuations.insert(id, valuation);
        if is_current {
            self.clear_current_except(&id);
        }
        self.touch();
        id
    }

    /// Mark one valuation current and clear the flag on all others.
    pub fn set_current_valuation(&mut self, id: &Uuid) -> CalcResult<()> {
        let valuation = self
            .valuations
            .get_mut(id)
            .ok_or_else(|| CalcError::record_not_found("Valuation", id))?;
        valuation.is_current = true;
        self.clear_current_except(id);
        self.touch();
        Ok(())
    }

    fn clear_current_except(&mut self, id: &Uuid) {
        for (other_id, valuation) in self.valuations.iter_mut() {
            if other_id != id {
                valuation.is_current = false;
            }
        }
    }

    /// The current valuation.
    ///
    /// A hand-edited file can flag more than one; the latest valuation date
    /// wins, then the name, then the id.
    pub fn current_valuation(&self) -> Option<&Valuation> {
        self.valuations
            .values()
            .filter(|v| v.is_current)
            .max_by(|a, b| {
                a.valuation_date
                    .cmp(&b.valuation_date)
                    .then_with(|| a.name.cmp(&b.name))
                    .then_with(|| a.id.cmp(&b.id))
            })
    }

    /// How many valuations are flagged current. More than one is a data error.
    pub fn current_valuation_count(&self) -> usize {
        self.valuations.values().filter(|v| v.is_current).count()
    }

    /// Start a new job using the company's default T&M markups.
    pub fn new_tm_job(&self, job_no: impl Into<String>, job_name: impl Into<String>, client: impl Into<String>) -> Job {
        Job::new(
            job_no,
            job_name,
            client,
            JobBilling::TimeAndMaterial(self.settings.default_tm_settings()),
        )
    }

    /// Start a new employee record using the company's labor defaults.
    pub fn new_employee(&self, name: impl Into<String>, hourly_rate: f64) -> Employee {
        let mut employee = Employee::new(name, hourly_rate);
        employee.fte = self.settings.default_fte;
        employee.burden_multiplier = self.settings.default_burden_multiplier;
        employee.annual_pto_hours = self.settings.default_annual_pto_hours;
        employee.utilization_target = self.settings.default_utilization_target;
        employee
    }
}

impl Default for Company {
    fn default() -> Self {
        Company::new("")
    }
}

/// Company metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    pub name: String,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

/// Company-wide defaults for new records and summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanySettings {
    pub default_burden_multiplier: Multiplier,
    pub default_utilization_target: f64,
    pub default_annual_pto_hours: f64,
    pub default_fte: f64,
    pub default_labor_markup: Multiplier,
    pub default_material_markup: Multiplier,
    pub default_other_markup: Multiplier,
    /// Band for the on-target billing position, as a fraction of contract
    pub billing_tolerance: f64,
    /// Horizon for capacity projections
    pub projection_months: usize,
}

impl CompanySettings {
    pub fn default_tm_settings(&self) -> TmSettings {
        TmSettings {
            labor: LaborBilling::Markup {
                markup: self.default_labor_markup,
            },
            material_markup: self.default_material_markup,
            other_markup: self.default_other_markup,
        }
    }
}

impl Default for CompanySettings {
    fn default() -> Self {
        CompanySettings {
            default_burden_multiplier: DEFAULT_BURDEN_MULTIPLIER,
            default_utilization_target: DEFAULT_UTILIZATION_TARGET,
            default_annual_pto_hours: DEFAULT_ANNUAL_PTO_HOURS,
            default_fte: DEFAULT_FTE,
            default_labor_markup: DEFAULT_LABOR_MARKUP,
            default_material_markup: DEFAULT_MATERIAL_MARKUP,
            default_other_markup: DEFAULT_OTHER_MARKUP,
            billing_tolerance: BILLING_TOLERANCE_FRACTION,
            projection_months: DEFAULT_MONTHS_AHEAD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::ChangeOrderStatus;
    use crate::units::Percent;

    #[test]
    fn test_company_creation() {
        let company = Company::new("Oakdale Builders");
        assert_eq!(company.meta.name, "Oakdale Builders");
        assert_eq!(company.meta.version, SCHEMA_VERSION);
        assert!(company.jobs.is_empty());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = CompanySettings::default();
        assert_eq!(settings.default_burden_multiplier, Multiplier(1.16));
        assert_eq!(settings.default_labor_markup, Multiplier(1.5));
        assert_eq!(settings.billing_tolerance, 0.02);
        assert_eq!(settings.projection_months, 12);
        assert_eq!(settings.default_tm_settings(), TmSettings::default());
    }

    #[test]
    fn test_company_serialization() {
        let mut company = Company::new("Oakdale Builders");
        company.add_job(Job::new("24-101", "Library", "City", JobBilling::fixed_price()));
        let json = serde_json::to_string_pretty(&company).unwrap();
        assert!(json.contains("24-101"));

        let roundtrip: Company = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.jobs.len(), 1);
        assert_eq!(roundtrip.settings, company.settings);
    }

    #[test]
    fn test_change_order_requires_job() {
        let mut company = Company::new("Test");
        let orphan = ChangeOrder::new(Uuid::new_v4(), "CO-001", JobBilling::fixed_price());
        assert!(company.add_change_order(orphan).is_err());

        let job_id = company.add_job(Job::new("24-1", "Job", "Client", JobBilling::fixed_price()));
        let mut co = ChangeOrder::new(job_id, "CO-001", JobBilling::fixed_price());
        co.set_status(ChangeOrderStatus::Approved, Utc::now());
        company.add_change_order(co).unwrap();
        assert_eq!(company.change_orders_for(&job_id).len(), 1);

        company.remove_job(&job_id);
        assert!(company.change_orders.is_empty());
    }

    #[test]
    fn test_allocation_requires_records() {
        let mut company = Company::new("Test");
        let emp = company.add_employee(Employee::new("A", 30.0));
        let dept = company.add_department(Department::new("Field", true, 1));

        assert!(company.allocate(DepartmentAllocation::new(Uuid::new_v4(), dept, 100.0)).is_err());
        company.allocate(DepartmentAllocation::new(emp, dept, 100.0)).unwrap();
        assert_eq!(company.allocations.len(), 1);

        company.remove_employee(&emp);
        assert!(company.allocations.is_empty());
    }

    #[test]
    fn test_duplicate_allocation_rejected() {
        let mut company = Company::new("Test");
        let emp = company.add_employee(Employee::new("A", 40.0));
        let field = company.add_department(Department::new("Field", true, 1));
        let office = company.add_department(Department::new("Office", false, 2));

        let first = DepartmentAllocation::new(emp, field, 50.0);
        let first_id = company.allocate(first).unwrap();
        company.allocate(DepartmentAllocation::new(emp, office, 50.0)).unwrap();

        let err = company.allocate(DepartmentAllocation::new(emp, field, 50.0)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert_eq!(company.allocations.len(), 2);

        let mut changed = first;
        changed.allocation_percent = Percent(60.0);
        assert_eq!(company.allocate(changed).unwrap(), first_id);
        assert_eq!(company.allocations[&first_id].allocation_percent, Percent(60.0));
        assert_eq!(company.allocations.len(), 2);

        assert!(company.remove_allocation(&first_id).is_some());
        assert_eq!(company.allocation_list().len(), 1);
    }

    #[test]
    fn test_allocation_list_is_ordered() {
        let mut company = Company::new("Test");
        let dept = company.add_department(Department::new("Field", true, 1));
        for name in ["A", "B", "C"] {
            let emp = company.add_employee(Employee::new(name, 30.0));
            company.allocate(DepartmentAllocation::new(emp, dept, 100.0)).unwrap();
        }
        let list = company.allocation_list();
        assert!(list.windows(2).all(|w| w[0].employee_id <= w[1].employee_id));
        assert_eq!(company.allocation_list(), list);
    }

    #[test]
    fn test_current_valuation_is_deterministic_when_several_flagged() {
        let mut company = Company::new("Test");
        let mut older = Valuation::new("One");
        older.valuation_date = chrono::NaiveDate::from_ymd_opt(2023, 12, 31);
        older.is_current = true;
        let mut newer = Valuation::new("Two");
        newer.valuation_date = chrono::NaiveDate::from_ymd_opt(2024, 12, 31);
        newer.is_current = true;
        // Bypass add_valuation, as a hand-edited file would
        company.valuations.insert(older.id, older);
        company.valuations.insert(newer.id, newer);
        let json = serde_json::to_string(&company).unwrap();

        for _ in 0..32 {
            let loaded: Company = serde_json::from_str(&json).unwrap();
            assert_eq!(loaded.current_valuation_count(), 2);
            assert_eq!(loaded.current_valuation().unwrap().name, "Two");
        }
    }

    #[test]
    fn test_single_current_valuation() {
        let mut company = Company::new("Test");
        let mut first = Valuation::new("2023");
        first.is_current = true;
        let first_id = company.add_valuation(first);

        let mut second = Valuation::new("2024");
        second.is_current = true;
        let second_id = company.add_valuation(second);

        assert_eq!(company.valuations.values().filter(|v| v.is_current).count(), 1);
        assert_eq!(company.current_valuation().unwrap().id, second_id);

        company.set_current_valuation(&first_id).unwrap();
        assert_eq!(company.current_valuation().unwrap().id, first_id);
        assert_eq!(company.valuations.values().filter(|v| v.is_current).count(), 1);

        assert!(company.set_current_valuation(&Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_new_records_use_settings() {
        let mut company = Company::new("Test");
        company.settings.default_burden_multiplier = Multiplier(1.3);
        company.settings.default_material_markup = Multiplier(1.2);

        let emp = company.new_employee("A", 30.0);
        assert_eq!(emp.burden_multiplier, Multiplier(1.3));

        let job = company.new_tm_job("24-9", "Service", "Acme");
        assert_eq!(job.billing.tm_settings().unwrap().material_markup, Multiplier(1.2));
    }

    #[test]
    fn test_lists_are_sorted() {
        let mut company = Company::new("Test");
        company.add_department(Department::new("Office", false, 2));
        company.add_department(Department::new("Field", true, 1));
        company.add_job(Job::new("24-2", "B", "C", JobBilling::fixed_price()));
        company.add_job(Job::new("24-1", "A", "C", JobBilling::fixed_price()));

        let names: Vec<_> = company.department_list().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Field", "Office"]);
        let numbers: Vec<_> = company.jobs_sorted().into_iter().map(|j| j.job_no.as_str()).collect();
        assert_eq!(numbers, vec!["24-1", "24-2"]);
    }
}

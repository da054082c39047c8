pub mod admin;
pub mod auth;
pub mod payroll;

pub use admin::AdminService;
pub use auth::{AuthService, LoginOutcome};
pub use payroll::{PayrollService, employee_of};

pub mod attendance;
pub mod department;
pub mod employee;
pub mod leave_request;
pub mod salary;

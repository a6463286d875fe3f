use crate::api::attendance::CheckInReq;
use crate::api::department::CreateDepartment;
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery, UpdateGrants};
use crate::api::leave_request::{CreateLeave, LeaveFilter, LeaveListResponse, LeaveType};
use crate::api::salary::{CreateSalary, SalaryQuery};
use crate::attendance::geo::GeoPoint;
use crate::attendance::timesheet::{Period, TimesheetSummary};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::leave_request::LeaveRequest;
use crate::model::permission::Permission;
use crate::model::role::Role;
use crate::model::salary::Salary;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Employee Management System API",
        version = "1.0.0",
        description = r#"
## Employee Management System (EMS)

This API powers an **Employee Management System** covering the day-to-day HR
operations of an organization.

### 🔹 Key Features
- **Employee & Department Management**
  - Create, update, list, and view profiles and departments
- **Role & Permission Grants**
  - Hybrid access control: coarse roles plus fine-grained permission tags
- **Leave Management**
  - Request leave, approve/reject, and view leave history
- **Attendance Management**
  - Daily check-in/check-out with office-network and geofence verification,
    late classification, and weekly/monthly timesheets
- **Salary Management**
  - Record salaries and let employees view their own

### 🔐 Security
All endpoints outside `/auth` are protected with **JWT Bearer authentication**
and gated by a centralized access-rule table. `admin` overrides every rule;
other roles pass by membership or by an explicit permission tag.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints
- Every rejection carries a machine-readable `code` plus detail fields

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::today_status,
        crate::api::attendance::my_timesheet,
        crate::api::attendance::list_attendance,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::my_leaves,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,
        crate::api::employee::update_grants,

        crate::api::department::create_department,
        crate::api::department::list_departments,
        crate::api::department::get_department,
        crate::api::department::update_department,
        crate::api::department::delete_department,

        crate::api::salary::create_salary,
        crate::api::salary::list_salaries,
        crate::api::salary::my_salary
    ),
    components(
        schemas(
            Role,
            Permission,
            AttendanceRecord,
            AttendanceStatus,
            GeoPoint,
            Period,
            TimesheetSummary,
            CheckInReq,
            LeaveRequest,
            LeaveType,
            LeaveFilter,
            LeaveListResponse,
            CreateLeave,
            CreateEmployee,
            EmployeeQuery,
            UpdateGrants,
            Employee,
            EmployeeListResponse,
            Department,
            CreateDepartment,
            Salary,
            CreateSalary,
            SalaryQuery
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance verification and timesheets"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Department", description = "Department management APIs"),
        (name = "Salary", description = "Salary management APIs"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

//! Role-based capability checks.
//!
//! Every mutating operation names a capability; handlers gate on
//! `role.allows(capability)` before touching the database. Ownership
//! checks (a patient acting on their own record) happen in the
//! lifecycle layer, not here.

use crate::models::enums::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    BookAppointment,
    ApproveAppointment,
    RescheduleAppointment,
    CompleteConsultation,
    DeleteAppointment,
    DispenseMedicine,
    ManageInventory,
    ViewActivityLogs,
    ViewAllAppointments,
    ManagePatients,
    UpdateUserRole,
}

impl Role {
    pub fn allows(&self, capability: Capability) -> bool {
        use Capability::*;
        match self {
            // Patients book and may delete their own appointments; the
            // "own" part is enforced where the record is loaded.
            Role::Patient => matches!(capability, BookAppointment | DeleteAppointment),
            Role::Staff => matches!(
                capability,
                ApproveAppointment
                    | RescheduleAppointment
                    | CompleteConsultation
                    | DeleteAppointment
                    | DispenseMedicine
                    | ViewAllAppointments
                    | ManagePatients
            ),
            Role::Admin => true,
        }
    }
}

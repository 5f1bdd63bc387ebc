use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(AppointmentStatus {
    Pending => "pending",
    Approved => "approved",
    Completed => "completed",
});

str_enum!(NotificationTag {
    Approved => "approved",
    Rescheduled => "rescheduled",
    Completed => "completed",
});

str_enum!(LogAction {
    ApproveAppointment => "approve_appointment",
    RescheduleAppointment => "reschedule_appointment",
    CompleteConsultation => "complete_consultation",
    DispenseMedicine => "dispense_medicine",
    UpdateUserRole => "update_user_role",
    DeleteAppointment => "delete_appointment",
});

str_enum!(EntityType {
    Appointment => "appointment",
    Medicine => "medicine",
    User => "user",
});

str_enum!(Role {
    Patient => "patient",
    Staff => "staff",
    Admin => "admin",
});

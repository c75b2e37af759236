use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
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

        impl rusqlite::types::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(self.as_str().into())
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e| rusqlite::types::FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

str_enum!(UserRole {
    Admin => "admin",
    Doctor => "doctor",
    Patient => "patient",
});

str_enum!(AppointmentStatus {
    Requested => "requested",
    OptionsProposed => "options_proposed",
    Scheduled => "scheduled",
    Finalized => "finalized",
    Cancelled => "cancelled",
});

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Requested,
        AppointmentStatus::OptionsProposed,
        AppointmentStatus::Scheduled,
        AppointmentStatus::Finalized,
        AppointmentStatus::Cancelled,
    ];

    /// Finalized and Cancelled admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized | Self::Cancelled)
    }

    /// Doctor and date are only present once the appointment is scheduled.
    pub fn carries_schedule(&self) -> bool {
        !matches!(self, Self::Requested | Self::OptionsProposed)
    }
}

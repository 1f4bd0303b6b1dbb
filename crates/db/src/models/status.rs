//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

use bookclub_core::error::CoreError;

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Lower-case name as seeded in the lookup table.
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }

            /// Resolve a status from its lookup-table name.
            pub fn from_name(name: &str) -> Result<Self, CoreError> {
                match name {
                    $( $label => Ok($name::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        concat!("Invalid ", stringify!($name), " '{}'"),
                        other
                    ))),
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Book lifecycle status.
    BookStatus {
        Draft = 1 => "draft",
        /// Candidate in an open poll.
        Nominated = 2 => "nominated",
        /// Won a poll; assigned a reading month.
        Scheduled = 3 => "scheduled",
        Current = 4 => "current",
        Completed = 5 => "completed",
    }
}

//! Models for the Comfort Cloud JSON responses.
//!
//! Notes
//! - Field names follow the vendor's camelCase; Rust names are snake_case.
//! - Flags and timestamps go through the drift-tolerant helpers in `crate::decode`.
//! - Fields the service omits in some payloads default when absent. A field that
//!   is present with the wrong type is always an error.

use chrono::{FixedOffset, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::decode::{flag, timestamp};

// =====================
// Integer-coded enums
// =====================

/// Declares an enum that travels as an integer on the wire and parses from a
/// lowercase name on the command line.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident = $value:literal => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn code(self) -> i32 {
                match self {
                    $($name::$variant => $value),+
                }
            }

            pub fn from_code(code: i64) -> Option<Self> {
                match code {
                    $($value => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl core::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.name() == wanted)
                    .ok_or_else(|| {
                        let names = $name::ALL.iter().map(|v| v.name()).collect::<Vec<_>>().join(", ");
                        format!("unknown {} '{}', expected one of: {}", stringify!($name), s, names)
                    })
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_i32(self.code())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                struct V;
                impl<'de> serde::de::Visitor<'de> for V {
                    type Value = $name;

                    fn expecting(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                        write!(f, "an integer code for {}", stringify!($name))
                    }

                    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
                    where
                        E: serde::de::Error,
                    {
                        $name::from_code(value)
                            .ok_or_else(|| E::invalid_value(serde::de::Unexpected::Signed(value), &self))
                    }

                    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
                    where
                        E: serde::de::Error,
                    {
                        i64::try_from(value)
                            .ok()
                            .and_then($name::from_code)
                            .ok_or_else(|| E::invalid_value(serde::de::Unexpected::Unsigned(value), &self))
                    }
                }

                deserializer.deserialize_any(V)
            }
        }
    };
}

wire_enum! {
    /// Unit power state.
    #[derive(Default)]
    Power {
        #[default]
        Off = 0 => "off",
        On = 1 => "on",
    }
}

wire_enum! {
    /// Operation mode. `Auto` is the wire zero.
    #[derive(Default)]
    OperationMode {
        #[default]
        Auto = 0 => "auto",
        Dry = 1 => "dry",
        Cool = 2 => "cool",
        Heat = 3 => "heat",
        Fan = 4 => "fan",
    }
}

wire_enum! {
    /// Eco setting; `Powerful` and `Quiet` are the boost/silent toggles.
    #[derive(Default)]
    EcoMode {
        #[default]
        Auto = 0 => "auto",
        Powerful = 1 => "powerful",
        Quiet = 2 => "quiet",
    }
}

wire_enum! {
    /// Bucket size for history queries.
    DataMode {
        Day = 0 => "day",
        Week = 1 => "week",
        Month = 2 => "month",
        Year = 3 => "year",
    }
}

// =====================
// Session
// =====================

/// Login response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "uToken")]
    pub token: String,
    #[serde(rename = "result")]
    pub result_code: i64,
    #[serde(default)]
    pub language: i64,
}

// =====================
// Directory
// =====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Groups {
    #[serde(default)]
    pub group_count: i64,
    #[serde(rename = "groupList")]
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "groupId")]
    pub id: i64,
    #[serde(rename = "groupName")]
    pub name: String,
    #[serde(rename = "deviceList", default)]
    pub devices: Vec<Device>,
}

// =====================
// Device
// =====================

/// Modes the unit offers as selectable (`modeAvlList`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeAvailability {
    #[serde(default, deserialize_with = "flag")]
    pub auto_mode: bool,
    #[serde(default, deserialize_with = "flag")]
    pub fan_mode: bool,
}

/// A unit with its static capabilities and a snapshot of its live parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_guid: String,
    #[serde(default)]
    pub device_name: String,
    #[serde(default)]
    pub device_type: String,
    #[serde(default)]
    pub device_module_number: String,
    #[serde(default)]
    pub device_hash_guid: String,
    #[serde(default)]
    pub permission: i64,
    #[serde(default)]
    pub summer_house: i64,

    #[serde(default, deserialize_with = "flag")]
    pub auto_mode: bool,
    #[serde(default, deserialize_with = "flag")]
    pub heat_mode: bool,
    #[serde(default, deserialize_with = "flag")]
    pub cool_mode: bool,
    #[serde(default, deserialize_with = "flag")]
    pub dry_mode: bool,
    #[serde(default, deserialize_with = "flag")]
    pub fan_mode: bool,
    #[serde(default, deserialize_with = "flag")]
    pub quiet_mode: bool,
    #[serde(default, deserialize_with = "flag")]
    pub powerful_mode: bool,
    #[serde(default, deserialize_with = "flag")]
    pub eco_navi: bool,
    #[serde(default, deserialize_with = "flag")]
    pub eco_function: bool,
    #[serde(rename = "iAutoX", default, deserialize_with = "flag")]
    pub i_auto_x: bool,
    #[serde(default, deserialize_with = "flag")]
    pub nanoe: bool,
    #[serde(rename = "airSwingLR", default, deserialize_with = "flag")]
    pub air_swing_lr: bool,
    #[serde(default, deserialize_with = "flag")]
    pub temperature_unit: bool,
    #[serde(rename = "modeAvlList", default)]
    pub mode_availability: ModeAvailability,

    #[serde(default)]
    pub auto_temp_min: i64,
    #[serde(default)]
    pub auto_temp_max: i64,
    #[serde(default, alias = "heatTeampMin")]
    pub heat_temp_min: i64,
    #[serde(default)]
    pub heat_temp_max: i64,
    #[serde(default)]
    pub cool_temp_min: i64,
    #[serde(default, alias = "coolTeampMax")]
    pub cool_temp_max: i64,
    #[serde(default)]
    pub dry_temp_min: i64,
    #[serde(default)]
    pub dry_temp_max: i64,

    #[serde(default)]
    pub fan_speed_mode: i64,
    #[serde(default)]
    pub fan_direction_mode: i64,
    #[serde(default, deserialize_with = "timestamp")]
    pub timestamp: i64,

    #[serde(default)]
    pub parameters: DeviceParameters,
}

impl Device {
    /// Whether the unit advertises support for `mode`.
    pub fn supports(&self, mode: OperationMode) -> bool {
        match mode {
            OperationMode::Auto => self.auto_mode,
            OperationMode::Dry => self.dry_mode,
            OperationMode::Cool => self.cool_mode,
            OperationMode::Heat => self.heat_mode,
            OperationMode::Fan => self.fan_mode,
        }
    }

    /// Setpoint bounds `(min, max)` for `mode`. Fan mode has no setpoint.
    pub fn temperature_range(&self, mode: OperationMode) -> Option<(i64, i64)> {
        match mode {
            OperationMode::Auto => Some((self.auto_temp_min, self.auto_temp_max)),
            OperationMode::Dry => Some((self.dry_temp_min, self.dry_temp_max)),
            OperationMode::Cool => Some((self.cool_temp_min, self.cool_temp_max)),
            OperationMode::Heat => Some((self.heat_temp_min, self.heat_temp_max)),
            OperationMode::Fan => None,
        }
    }
}

/// Live operating state of a unit at `update_time`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceParameters {
    #[serde(default)]
    pub operate: Power,
    #[serde(default)]
    pub operation_mode: OperationMode,
    #[serde(default)]
    pub temperature_set: f64,
    #[serde(default)]
    pub inside_temperature: f64,
    #[serde(default)]
    pub out_temperature: f64,
    #[serde(default)]
    pub fan_speed: i64,
    #[serde(default)]
    pub fan_auto_mode: i64,
    #[serde(rename = "airSwingLR", default)]
    pub air_swing_lr: i64,
    #[serde(rename = "airSwingUD", default)]
    pub air_swing_ud: i64,
    #[serde(default)]
    pub air_direction: i64,
    #[serde(default)]
    pub air_quality: i64,
    #[serde(default)]
    pub eco_mode: EcoMode,
    #[serde(default)]
    pub eco_navi: i64,
    #[serde(default)]
    pub eco_function_data: i64,
    #[serde(default)]
    pub nanoe: i64,
    #[serde(default)]
    pub actual_nanoe: i64,
    #[serde(rename = "iAuto", default)]
    pub i_auto: i64,
    #[serde(default)]
    pub defrosting: i64,
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub error_code_str: String,
    #[serde(default)]
    pub error_status: i64,
    #[serde(default, deserialize_with = "flag")]
    pub error_status_flg: bool,
    #[serde(default, deserialize_with = "flag")]
    pub online: bool,
    #[serde(default, deserialize_with = "flag")]
    pub powerful_mode: bool,
    #[serde(default)]
    pub permission: i64,
    #[serde(rename = "devGuid", default)]
    pub dev_guid: String,
    #[serde(default)]
    pub dev_rac_communicate_status: i64,
    #[serde(default)]
    pub http_error_code: i64,
    #[serde(default, deserialize_with = "timestamp")]
    pub update_time: i64,
}

// =====================
// History
// =====================

/// Aggregated consumption for one query period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    pub energy_consumption: f64,
    pub estimated_cost: f64,
    #[serde(default)]
    pub currency_unit: String,
    #[serde(rename = "deviceRegisterTime", default, deserialize_with = "timestamp")]
    pub register_time: i64,
    #[serde(rename = "historyDataList", default)]
    pub entries: Vec<HistoryEntry>,
}

/// One bucket of a [`History`]. Buckets without data carry [`HistoryEntry::NO_DATA`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub data_number: i64,
    pub consumption: f64,
    pub cost: f64,
    pub average_setting_temp: f64,
    pub average_inside_temp: f64,
    pub average_outside_temp: f64,
}

impl HistoryEntry {
    pub const NO_DATA: f64 = -255.0;

    pub fn is_no_data(value: f64) -> bool {
        value == Self::NO_DATA
    }

    /// True when every measurement in the bucket is the no-data sentinel.
    pub fn is_empty(&self) -> bool {
        [
            self.consumption,
            self.cost,
            self.average_setting_temp,
            self.average_inside_temp,
            self.average_outside_temp,
        ]
        .into_iter()
        .all(Self::is_no_data)
    }
}

/// Parameters of a history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    pub mode: DataMode,
    pub date: NaiveDate,
    pub timezone: FixedOffset,
}

impl HistoryQuery {
    /// Query the period containing today, in the local timezone.
    pub fn today(mode: DataMode) -> Self {
        let now = Local::now();
        HistoryQuery {
            mode,
            date: now.date_naive(),
            timezone: *now.offset(),
        }
    }
}

/// Wire body of a history request. The service expects every member as a string.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HistoryRequest<'a> {
    pub data_mode: String,
    pub date: String,
    pub device_guid: &'a str,
    pub os_timezone: String,
}

impl<'a> HistoryRequest<'a> {
    pub fn new(device_guid: &'a str, query: &HistoryQuery) -> Self {
        HistoryRequest {
            data_mode: query.mode.code().to_string(),
            date: query.date.format("%Y%m%d").to_string(),
            device_guid,
            os_timezone: query.timezone.to_string(),
        }
    }
}

//! Sparse control commands.
//!
//! Every controllable attribute is an `Option`: `None` is left out of the
//! payload entirely, `Some` is always sent, including wire zeros such as
//! `Power::Off` or `OperationMode::Auto`.

use serde::{Deserialize, Serialize};

use super::comfort_cloud::{EcoMode, OperationMode, Power};

/// Body of `POST /deviceStatus/control`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub device_guid: String,
    pub parameters: CommandParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandParameters {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub operate: Option<Power>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub operation_mode: Option<OperationMode>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub temperature_set: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fan_speed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fan_auto_mode: Option<i64>,
    #[serde(rename = "airSwingLR", skip_serializing_if = "Option::is_none", default)]
    pub air_swing_lr: Option<i64>,
    #[serde(rename = "airSwingUD", skip_serializing_if = "Option::is_none", default)]
    pub air_swing_ud: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub air_direction: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub eco_mode: Option<EcoMode>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub eco_navi: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub eco_function_data: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub nanoe: Option<i64>,
    #[serde(rename = "iAuto", skip_serializing_if = "Option::is_none", default)]
    pub i_auto: Option<i64>,
}

impl CommandParameters {
    /// Number of attributes that will be sent.
    pub fn len(&self) -> usize {
        [
            self.operate.is_some(),
            self.operation_mode.is_some(),
            self.temperature_set.is_some(),
            self.fan_speed.is_some(),
            self.fan_auto_mode.is_some(),
            self.air_swing_lr.is_some(),
            self.air_swing_ud.is_some(),
            self.air_direction.is_some(),
            self.eco_mode.is_some(),
            self.eco_navi.is_some(),
            self.eco_function_data.is_some(),
            self.nanoe.is_some(),
            self.i_auto.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Command {
    /// A command for `device_guid` with nothing set yet.
    pub fn new(device_guid: impl Into<String>) -> Self {
        Command {
            device_guid: device_guid.into(),
            parameters: CommandParameters::default(),
        }
    }

    pub fn power(mut self, power: Power) -> Self {
        self.parameters.operate = Some(power);
        self
    }

    pub fn mode(mut self, mode: OperationMode) -> Self {
        self.parameters.operation_mode = Some(mode);
        self
    }

    /// Setpoint in degrees Celsius.
    pub fn temperature(mut self, celsius: f64) -> Self {
        self.parameters.temperature_set = Some(celsius);
        self
    }

    pub fn fan_speed(mut self, speed: i64) -> Self {
        self.parameters.fan_speed = Some(speed);
        self
    }

    pub fn fan_auto_mode(mut self, value: i64) -> Self {
        self.parameters.fan_auto_mode = Some(value);
        self
    }

    pub fn air_swing_lr(mut self, value: i64) -> Self {
        self.parameters.air_swing_lr = Some(value);
        self
    }

    pub fn air_swing_ud(mut self, value: i64) -> Self {
        self.parameters.air_swing_ud = Some(value);
        self
    }

    pub fn air_direction(mut self, value: i64) -> Self {
        self.parameters.air_direction = Some(value);
        self
    }

    pub fn eco_mode(mut self, mode: EcoMode) -> Self {
        self.parameters.eco_mode = Some(mode);
        self
    }

    pub fn eco_navi(mut self, value: i64) -> Self {
        self.parameters.eco_navi = Some(value);
        self
    }

    pub fn eco_function_data(mut self, value: i64) -> Self {
        self.parameters.eco_function_data = Some(value);
        self
    }

    pub fn nanoe(mut self, value: i64) -> Self {
        self.parameters.nanoe = Some(value);
        self
    }

    pub fn i_auto(mut self, value: i64) -> Self {
        self.parameters.i_auto = Some(value);
        self
    }
}

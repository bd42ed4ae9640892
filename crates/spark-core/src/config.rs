//! Training hyperparameters and partial updates to them

use crate::error::{CoreError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

pub const DEFAULT_BATCH_SIZE: u32 = 16;
pub const DEFAULT_LEARNING_RATE: f64 = 0.001;
pub const DEFAULT_EPOCHS: u32 = 10;
pub const DEFAULT_VALIDATION_SPLIT: f64 = 0.2;
/// Upper bound accepted for `epochs`
pub const MAX_EPOCHS: u32 = 1000;

/// Output resolution for image generation models
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Resolution {
    #[serde(rename = "256x256")]
    #[strum(serialize = "256x256")]
    R256,
    #[default]
    #[serde(rename = "512x512")]
    #[strum(serialize = "512x512")]
    R512,
    #[serde(rename = "768x768")]
    #[strum(serialize = "768x768")]
    R768,
    #[serde(rename = "1024x1024")]
    #[strum(serialize = "1024x1024")]
    R1024,
}

/// Hyperparameters of a training job. Every field may be cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingConfig {
    pub batch_size: Option<u32>,
    pub learning_rate: Option<f64>,
    pub epochs: Option<u32>,
    /// Fraction of examples held out, in [0, 1]
    pub validation_split: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            batch_size: Some(DEFAULT_BATCH_SIZE),
            learning_rate: Some(DEFAULT_LEARNING_RATE),
            epochs: Some(DEFAULT_EPOCHS),
            validation_split: Some(DEFAULT_VALIDATION_SPLIT),
            prompt: None,
            resolution: None,
            seed: None,
        }
    }
}

impl TrainingConfig {
    /// Shallow merge: fields absent from the patch are kept, explicit clears empty the field.
    pub fn merged(mut self, patch: TrainingConfigPatch) -> Self {
        if let Some(value) = patch.batch_size {
            self.batch_size = value;
        }
        if let Some(value) = patch.learning_rate {
            self.learning_rate = value;
        }
        if let Some(value) = patch.epochs {
            self.epochs = value;
        }
        if let Some(value) = patch.validation_split {
            self.validation_split = value;
        }
        if let Some(value) = patch.prompt {
            self.prompt = value;
        }
        if let Some(value) = patch.resolution {
            self.resolution = value;
        }
        if let Some(value) = patch.seed {
            self.seed = value;
        }
        self
    }

    /// Resolution shown when none is chosen
    pub fn effective_resolution(&self) -> Resolution {
        self.resolution.unwrap_or_default()
    }
}

/// Partial update of a [`TrainingConfig`].
///
/// Each field is tri-state: `None` leaves the field untouched, `Some(None)`
/// clears it and `Some(Some(v))` sets it. In JSON an absent key is untouched
/// and an explicit `null` clears.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingConfigPatch {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<Option<u32>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub learning_rate: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub epochs: Option<Option<u32>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub validation_split: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub prompt: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Option<Resolution>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub seed: Option<Option<u64>>,
}

// A key that is present (even as null) deserializes to Some.
fn present<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl TrainingConfigPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch clearing every parameter ("Auto Hyperparameter")
    pub fn clear_all() -> Self {
        Self {
            batch_size: Some(None),
            learning_rate: Some(None),
            epochs: Some(None),
            validation_split: Some(None),
            prompt: Some(None),
            resolution: Some(None),
            seed: Some(None),
        }
    }

    pub fn batch_size(mut self, value: impl Into<Option<u32>>) -> Self {
        self.batch_size = Some(value.into());
        self
    }

    pub fn learning_rate(mut self, value: impl Into<Option<f64>>) -> Self {
        self.learning_rate = Some(value.into());
        self
    }

    pub fn epochs(mut self, value: impl Into<Option<u32>>) -> Self {
        self.epochs = Some(value.into());
        self
    }

    pub fn validation_split(mut self, value: impl Into<Option<f64>>) -> Self {
        self.validation_split = Some(value.into());
        self
    }

    pub fn prompt(mut self, value: Option<String>) -> Self {
        self.prompt = Some(value);
        self
    }

    pub fn resolution(mut self, value: impl Into<Option<Resolution>>) -> Self {
        self.resolution = Some(value.into());
        self
    }

    pub fn seed(mut self, value: impl Into<Option<u64>>) -> Self {
        self.seed = Some(value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether the patch touches prompt, resolution or seed
    pub fn touches_generation_params(&self) -> bool {
        self.prompt.is_some() || self.resolution.is_some() || self.seed.is_some()
    }

    /// Input constraints of the configuration form.
    pub fn validate(&self) -> Result<()> {
        if let Some(Some(split)) = self.validation_split {
            if !(0.0..=1.0).contains(&split) {
                return Err(CoreError::ValidationSplitOutOfRange(split));
            }
        }
        if let Some(Some(rate)) = self.learning_rate {
            if !rate.is_finite() || rate < 0.0 {
                return Err(CoreError::InvalidConfigValue {
                    field: "learningRate".to_string(),
                    value: rate.to_string(),
                });
            }
        }
        if let Some(Some(epochs)) = self.epochs {
            if epochs > MAX_EPOCHS {
                return Err(CoreError::InvalidConfigValue {
                    field: "epochs".to_string(),
                    value: epochs.to_string(),
                });
            }
        }
        if let Some(Some(0)) = self.seed {
            return Err(CoreError::InvalidSeed);
        }
        Ok(())
    }

    /// Apply a textual `field=value` edit, as typed into a form field.
    ///
    /// Field names are accepted in camelCase or snake_case. An empty value,
    /// `none`, `null` or `clear` clears the field.
    pub fn assign(&mut self, field: &str, raw: &str) -> Result<()> {
        let raw = raw.trim();
        let clear = raw.is_empty() || matches!(raw, "none" | "null" | "clear");

        match field.trim() {
            "batchSize" | "batch_size" => {
                self.batch_size = Some(if clear { None } else { Some(parse(field, raw)?) });
            }
            "learningRate" | "learning_rate" => {
                self.learning_rate = Some(if clear { None } else { Some(parse(field, raw)?) });
            }
            "epochs" => {
                self.epochs = Some(if clear { None } else { Some(parse(field, raw)?) });
            }
            "validationSplit" | "validation_split" => {
                self.validation_split = Some(if clear { None } else { Some(parse(field, raw)?) });
            }
            "prompt" => {
                self.prompt = Some(if clear { None } else { Some(raw.to_string()) });
            }
            "resolution" => {
                let value = if clear {
                    None
                } else {
                    Some(
                        Resolution::from_str(raw)
                            .map_err(|_| CoreError::UnknownResolution(raw.to_string()))?,
                    )
                };
                self.resolution = Some(value);
            }
            "seed" => {
                self.seed = Some(if clear { None } else { Some(parse(field, raw)?) });
            }
            other => return Err(CoreError::UnknownConfigField(other.to_string())),
        }
        Ok(())
    }
}

fn parse<T: FromStr>(field: &str, raw: &str) -> Result<T> {
    raw.parse().map_err(|_| CoreError::InvalidConfigValue {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

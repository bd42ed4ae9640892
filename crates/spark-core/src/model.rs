//! Trainable model catalog

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Models a training job can be launched for.
///
/// `Display` and serde both use the wire names (`"GPT-2"`, `"Stable Diffusion"`, ...).
/// Parsing is case-insensitive and also accepts compact aliases such as `gpt2`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum ModelId {
    #[serde(rename = "Llama2")]
    #[strum(to_string = "Llama2", serialize = "llama-2", serialize = "llama 2")]
    Llama2,
    #[serde(rename = "BERT")]
    #[strum(to_string = "BERT")]
    Bert,
    #[serde(rename = "GPT-2")]
    #[strum(to_string = "GPT-2", serialize = "gpt2")]
    Gpt2,
    #[serde(rename = "Stable Diffusion")]
    #[strum(
        to_string = "Stable Diffusion",
        serialize = "stable-diffusion",
        serialize = "stablediffusion",
        serialize = "sd"
    )]
    StableDiffusion,
    #[serde(rename = "Whisper")]
    #[strum(to_string = "Whisper")]
    Whisper,
    #[serde(rename = "RoBERTa")]
    #[strum(to_string = "RoBERTa")]
    Roberta,
}

/// Parameters a model accepts beyond the common hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCapabilities {
    /// Accepts prompt, output resolution and seed
    pub generation_params: bool,
    /// Training runs return sample images
    pub image_samples: bool,
}

impl ModelId {
    /// All models in catalog order
    pub fn all() -> Vec<ModelId> {
        ModelId::iter().collect()
    }

    /// Parse a wire name or alias, surrounding whitespace ignored
    pub fn parse(name: &str) -> Result<ModelId> {
        name.trim()
            .parse()
            .map_err(|_| CoreError::UnknownModel(name.to_string()))
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelId::Llama2 => "Llama 2",
            ModelId::Bert => "BERT",
            ModelId::Gpt2 => "GPT-2",
            ModelId::StableDiffusion => "Stable Diffusion",
            ModelId::Whisper => "Whisper",
            ModelId::Roberta => "RoBERTa",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ModelId::Llama2 => "Meta's open-source large language model",
            ModelId::Bert => "Bidirectional Encoder Representations from Transformers",
            ModelId::Gpt2 => "Generative Pre-trained Transformer 2",
            ModelId::StableDiffusion => "Latent text-to-image diffusion model",
            ModelId::Whisper => "Automatic speech recognition system",
            ModelId::Roberta => "Robustly optimized BERT approach",
        }
    }

    pub fn capabilities(&self) -> ModelCapabilities {
        ModelCapabilities {
            generation_params: matches!(self, ModelId::Gpt2 | ModelId::StableDiffusion),
            image_samples: matches!(self, ModelId::StableDiffusion),
        }
    }

    /// Whether the configuration step exposes prompt, resolution and seed
    pub fn is_generative(&self) -> bool {
        self.capabilities().generation_params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_wire_names_round_trip_through_display() {
        for model in ModelId::all() {
            let parsed = ModelId::from_str(&model.to_string()).unwrap();
            assert_eq!(parsed, model);
        }
        assert_eq!(ModelId::Gpt2.to_string(), "GPT-2");
        assert_eq!(ModelId::StableDiffusion.to_string(), "Stable Diffusion");
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(ModelId::from_str("gpt2").unwrap(), ModelId::Gpt2);
        assert_eq!(ModelId::from_str("bert").unwrap(), ModelId::Bert);
        assert_eq!(ModelId::from_str("sd").unwrap(), ModelId::StableDiffusion);
        assert!(ModelId::from_str("resnet").is_err());
        assert_eq!(ModelId::parse(" Whisper ").unwrap(), ModelId::Whisper);
        assert!(matches!(ModelId::parse("resnet"), Err(CoreError::UnknownModel(_))));
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&ModelId::StableDiffusion).unwrap();
        assert_eq!(json, "\"Stable Diffusion\"");
        let model: ModelId = serde_json::from_str("\"RoBERTa\"").unwrap();
        assert_eq!(model, ModelId::Roberta);
    }

    #[test]
    fn test_generative_capability() {
        let generative: Vec<ModelId> = ModelId::all()
            .into_iter()
            .filter(|m| m.is_generative())
            .collect();
        assert_eq!(generative, vec![ModelId::Gpt2, ModelId::StableDiffusion]);
        assert!(ModelId::StableDiffusion.capabilities().image_samples);
        assert!(!ModelId::Gpt2.capabilities().image_samples);
    }
}

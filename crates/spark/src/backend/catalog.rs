//! Canned catalog served by the mock backend

use spark_core::{Dataset, DatasetId, Gpu};

/// Download link attached to every generated result
pub const MODEL_URL: &str = "https://example.com/download/model.bin";

/// Sample images returned for image generation models
pub const SAMPLE_IMAGE_URLS: [&str; 2] = [
    "https://images.unsplash.com/photo-1679678691006-0ad24fecb769",
    "https://images.unsplash.com/photo-1680169291844-4c6a394a0304",
];

fn dataset(id: &str, name: &str, data_type: &str, description: &str, size: &str, example_count: u64) -> Dataset {
    Dataset {
        id: DatasetId::from_string(id),
        name: name.to_string(),
        data_type: data_type.to_string(),
        description: description.to_string(),
        size: size.to_string(),
        example_count,
    }
}

fn gpu(id: &str, name: &str, vram: &str, cost: f64, available: bool, estimated_time: &str) -> Gpu {
    Gpu {
        id: id.to_string(),
        name: name.to_string(),
        vram: vram.to_string(),
        cost,
        available,
        estimated_time: estimated_time.to_string(),
    }
}

pub fn datasets() -> Vec<Dataset> {
    vec![
        dataset(
            "1",
            "Common Crawl",
            "Text",
            "Petabytes of data extracted from web crawl data.",
            "1.2TB",
            4_500_000,
        ),
        dataset(
            "2",
            "MNIST",
            "Image",
            "Handwritten digits database with 70,000 examples.",
            "11MB",
            70_000,
        ),
        dataset(
            "3",
            "LibriSpeech",
            "Audio",
            "Corpus of read English speech from audiobooks.",
            "60GB",
            100_000,
        ),
        dataset(
            "4",
            "LAION-400M",
            "Image",
            "Dataset of 400 million image-text pairs.",
            "240GB",
            400_000_000,
        ),
        dataset(
            "5",
            "Wikipedia",
            "Text",
            "Cleaned articles from all of Wikipedia.",
            "20GB",
            6_000_000,
        ),
    ]
}

pub fn gpus() -> Vec<Gpu> {
    vec![
        gpu("1", "RTX 4090", "24GB", 0.35, true, "2h 15m"),
        gpu("2", "RTX 3080", "10GB", 0.25, true, "3h 30m"),
        gpu("3", "A100", "80GB", 1.2, false, "45m"),
        gpu("4", "V100", "32GB", 0.9, true, "1h 30m"),
        gpu("5", "H100", "80GB", 2.2, false, "25m"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_dataset_ids_are_unique() {
        let ids: HashSet<_> = datasets().into_iter().map(|d| d.id).collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_a100_and_h100_unavailable() {
        let unavailable: Vec<_> = gpus().into_iter().filter(|g| !g.available).map(|g| g.name).collect();
        assert_eq!(unavailable, vec!["A100", "H100"]);
    }
}

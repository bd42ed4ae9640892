//! Catalog listings

use crate::error::Result;
use crate::progress::create_spinner;
use spark::{Dataset, Gpu, ModelId, WizardSession};

pub async fn run_models() -> Result<()> {
    println!("🧠 Available models\n");
    for model in ModelId::all() {
        print_model(model);
    }
    Ok(())
}

pub async fn run_datasets(session: &WizardSession) -> Result<()> {
    let spinner = create_spinner("Loading datasets...");
    let datasets = session.available_datasets().await;
    spinner.finish_and_clear();

    println!("📚 Available datasets\n");
    for dataset in &datasets? {
        print_dataset(dataset);
    }
    Ok(())
}

pub async fn run_gpus(session: &WizardSession) -> Result<()> {
    let spinner = create_spinner("Loading GPUs...");
    let gpus = session.available_gpus().await;
    spinner.finish_and_clear();

    println!("🖥️  Available GPUs\n");
    for gpu in &gpus? {
        print_gpu(gpu);
    }
    Ok(())
}

pub(crate) fn print_model(model: ModelId) {
    let caps = model.capabilities();
    println!("📦 {} ({})", model.display_name(), model);
    println!("   📝 {}", model.description());
    if caps.generation_params {
        println!("   ✨ Accepts prompt, resolution and seed");
    }
    if caps.image_samples {
        println!("   🖼️  Returns sample images");
    }
    println!();
}

pub(crate) fn print_dataset(dataset: &Dataset) {
    println!("[{}] {} · {} · {}", dataset.id, dataset.name, dataset.data_type, dataset.size);
    println!("    {} ({} examples)", dataset.description, dataset.example_count);
}

pub(crate) fn print_gpu(gpu: &Gpu) {
    let marker = if gpu.available { "✅" } else { "⛔" };
    println!(
        "{} [{}] {} {} · ${:.2}/h · est. {} (${:.2})",
        marker,
        gpu.id,
        gpu.name,
        gpu.vram,
        gpu.cost,
        gpu.estimated_time,
        gpu.estimated_cost()
    );
}

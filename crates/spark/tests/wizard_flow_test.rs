use spark::prelude::*;
use spark::{LocalStorage, ResultsExporter, TrainingStatus};
use std::sync::Arc;

fn session() -> WizardSession {
    WizardSession::new(Arc::new(MockBackend::new().without_delays().with_seed(99)))
}

#[tokio::test]
async fn test_full_wizard_run_and_export() {
    let mut session = session();

    session.select_model_by_name("stable diffusion").unwrap();
    let datasets = session.available_datasets().await.unwrap();
    assert_eq!(datasets.len(), 5);
    session.select_dataset(datasets[3].clone());
    assert_eq!(session.current_step(), WizardStep::Configure);

    session
        .update_config(
            TrainingConfigPatch::new()
                .epochs(6)
                .prompt(Some("a lighthouse at dusk".to_string()))
                .seed(1234),
        )
        .unwrap();
    assert!(session.state().is_generative());

    session.go_next();
    session.select_gpu_by_id("2").await.unwrap();
    let state = session.start_training().await.unwrap();
    assert_eq!(state.training_status, TrainingStatus::Complete);

    let results = session.results().unwrap().clone();
    assert_eq!(results.epoch_stats.len(), 6);
    assert_eq!(results.dataset_name, "LAION-400M");
    assert_eq!(session.current_step(), WizardStep::ViewResults);

    let base = std::env::temp_dir().join(format!("spark-flow-{}", std::process::id()));
    let path = ResultsExporter::new(Arc::new(LocalStorage::new(&base)))
        .export_to(&results, "out")
        .await
        .unwrap();
    let body = std::fs::read_to_string(base.join(&path)).unwrap();
    assert_eq!(body, session.export_results_json().unwrap());
    std::fs::remove_dir_all(&base).ok();
}

#[tokio::test]
async fn test_same_seed_reproduces_results() {
    async fn run() -> spark::TrainingResults {
        let mut session = session();
        session.select_model(ModelId::Bert);
        session.select_dataset_by_id("1").await.unwrap();
        session.go_next();
        session.start_training().await.unwrap();
        session.results().unwrap().clone()
    }

    assert_eq!(run().await, run().await);
}

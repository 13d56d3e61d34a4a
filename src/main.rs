//! dbmodel - generate or update a database model file
//!
//! Reads the schema snapshot named by `DBMODEL_SCHEMA_FILE`. If the model
//! file (`DBMODEL_MODEL_FILE`) already exists it is updated and the change
//! log is printed, otherwise a new model is generated.

use anyhow::Context;
use dbmodel_repository::config::Settings;
use dbmodel_repository::{logging, JsonModelStore, ModelGenerator, ModelStore, ModelUpdater, SchemaSnapshot};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    logging::init(&settings.log_filter);

    info!("📋 Configuration loaded");

    let snapshot = SchemaSnapshot::from_json_file(&settings.files.schema_file)
        .with_context(|| format!("cannot read schema file {}", settings.files.schema_file.display()))?;
    let store = JsonModelStore::new(&settings.files.model_file);

    if store.exists() {
        let before = store
            .load()
            .with_context(|| format!("cannot load model file {}", store.path().display()))?;
        let result = ModelUpdater::update(&before, &snapshot)?;
        store.save(&result.model)?;

        info!(
            "✅ Model '{}' updated ({} entities)",
            result.model.name(),
            result.model.number_of_entities()
        );
        print!("{}", result.change_log);
    } else {
        let mut model = ModelGenerator::generate(&snapshot)?;
        model.database_id = settings.model.database_id;
        model.name = settings.model.name.clone();
        store.save(&model)?;

        info!(
            "✅ Model '{}' generated: {} entities, {} links -> {}",
            model.name(),
            model.number_of_entities(),
            model.number_of_links(),
            store.path().display()
        );
    }

    Ok(())
}

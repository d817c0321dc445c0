pub mod body_composition;
pub mod db;
pub mod error;
pub mod health;
pub mod inputs;
pub mod models;
pub mod settings;
pub mod store;
pub mod units;
pub mod utils;

use anyhow::{Context, Result};

pub use error::InputError;
pub use health::{BmiPolicy, BodyFatPolicy, DerivedValues, HealthClassifier, HealthStatus};
pub use inputs::{ControllerStatus, InputController, InputSnapshot};
pub use models::{BodyFatInputs, Gender, MeasurementField};
pub use settings::CalculatorSettings;
pub use store::{open_store, InputPatch, InputStore, PersistedInputs, StoreKind};
pub use units::UnitSystem;

/// Opens the configured store and returns a controller that has already
/// finished loading. Must be called inside a Tokio runtime.
pub async fn start(settings: &CalculatorSettings) -> Result<InputController> {
    utils::logging::init(settings.debug);

    if settings.store != StoreKind::Memory {
        std::fs::create_dir_all(&settings.data_dir).with_context(|| {
            format!("failed to create data directory {}", settings.data_dir.display())
        })?;
    }

    let store = open_store(settings.store, &settings.data_dir)
        .with_context(|| format!("failed to open {} store", settings.store))?;
    log::info!(
        "Body fat calculator starting ({} store, {} / {} policies)",
        settings.store,
        settings.body_fat_policy.as_str(),
        settings.bmi_policy.as_str()
    );

    let controller = InputController::new(store, settings.classifier());
    controller.load().await;
    Ok(controller)
}

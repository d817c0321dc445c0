use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tokio::sync::{watch, Mutex};

use crate::{
    error::InputError,
    health::{DerivedValues, HealthClassifier},
    log_info, log_warn,
    models::{BodyFatInputs, Gender, MeasurementField},
    store::{InputPatch, InputStore},
    units::UnitSystem,
};

use super::{
    display::display_measurement,
    persist::PersistQueue,
    state::{parse_measurement, to_canonical},
    ControllerStatus, InputState,
};

const ENABLE_LOGS: bool = true;

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InputSnapshot {
    pub status: ControllerStatus,
    pub inputs: BodyFatInputs,
    pub derived: DerivedValues,
}

impl InputSnapshot {
    fn new(state: &InputState, classifier: &HealthClassifier) -> Self {
        Self {
            status: state.status,
            inputs: state.inputs.clone(),
            derived: classifier.classify(&state.inputs),
        }
    }
}

fn read_state(state: &RwLock<InputState>) -> RwLockReadGuard<'_, InputState> {
    match state.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_state(state: &RwLock<InputState>) -> RwLockWriteGuard<'_, InputState> {
    match state.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Owns the session's inputs. Edits land in memory immediately; the store
/// is written behind them through a single ordered queue.
#[derive(Clone)]
pub struct InputController {
    state: Arc<RwLock<InputState>>,
    store: Arc<dyn InputStore>,
    persist: Arc<PersistQueue>,
    classifier: HealthClassifier,
    updates: Arc<watch::Sender<InputSnapshot>>,
    load_gate: Arc<Mutex<()>>,
}

impl InputController {
    /// Creates a controller in the Loading state. Must be called inside a
    /// Tokio runtime.
    pub fn new(store: Arc<dyn InputStore>, classifier: HealthClassifier) -> Self {
        let state = InputState::new();
        let (updates, _) = watch::channel(InputSnapshot::new(&state, &classifier));

        Self {
            state: Arc::new(RwLock::new(state)),
            persist: Arc::new(PersistQueue::spawn(store.clone())),
            store,
            classifier,
            updates: Arc::new(updates),
            load_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Reads the stored record and moves to Ready.
    ///
    /// A missing, unreadable or malformed record all start an empty session.
    /// Later calls return the current snapshot without reading the store.
    pub async fn load(&self) -> InputSnapshot {
        let _gate = self.load_gate.lock().await;
        if self.is_ready() {
            return self.snapshot();
        }

        let inputs = match self.store.load().await {
            Ok(Some(record)) => {
                log_info!(
                    "Restored inputs saved at {} from {} store",
                    record.updated_at.to_rfc3339(),
                    self.store.kind()
                );
                record.inputs
            }
            Ok(None) => {
                log_info!("No saved inputs in {} store; starting empty", self.store.kind());
                BodyFatInputs::default()
            }
            Err(err) => {
                log_warn!("Ignoring unreadable saved inputs: {err:#}");
                BodyFatInputs::default()
            }
        };

        let snapshot = {
            let mut state = write_state(&self.state);
            state.finish_loading(inputs);
            InputSnapshot::new(&state, &self.classifier)
        };
        self.updates.send_replace(snapshot.clone());
        snapshot
    }

    pub fn status(&self) -> ControllerStatus {
        read_state(&self.state).status
    }

    pub fn is_ready(&self) -> bool {
        read_state(&self.state).is_ready()
    }

    pub fn classifier(&self) -> HealthClassifier {
        self.classifier
    }

    pub fn inputs(&self) -> BodyFatInputs {
        read_state(&self.state).inputs.clone()
    }

    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot::new(&read_state(&self.state), &self.classifier)
    }

    pub fn derived(&self) -> DerivedValues {
        self.classifier.classify(&read_state(&self.state).inputs)
    }

    /// Receives a fresh snapshot after every load and edit.
    pub fn subscribe(&self) -> watch::Receiver<InputSnapshot> {
        self.updates.subscribe()
    }

    /// The stored value of `field` in the preferred display unit.
    pub fn display_value(&self, field: MeasurementField) -> Option<f64> {
        display_measurement(&read_state(&self.state).inputs, field)
    }

    /// Applies a typed value. Blank text clears the field.
    pub fn edit(
        &self,
        field: MeasurementField,
        raw_value: &str,
        source_unit: UnitSystem,
    ) -> Result<InputSnapshot, InputError> {
        self.ensure_ready()?;
        let value = parse_measurement(field, raw_value, source_unit)?;
        self.update(|inputs| inputs.set_measurement(field, value))
    }

    /// Numeric counterpart of [`edit`](Self::edit). NaN and infinities are
    /// rejected just like unparseable text.
    pub fn set_measurement(
        &self,
        field: MeasurementField,
        value: Option<f64>,
        source_unit: UnitSystem,
    ) -> Result<InputSnapshot, InputError> {
        self.ensure_ready()?;
        if let Some(v) = value.filter(|v| !v.is_finite()) {
            return Err(InputError::InvalidNumber {
                field,
                value: v.to_string(),
            });
        }
        let canonical = value.map(|v| to_canonical(field, v, source_unit));
        self.update(|inputs| inputs.set_measurement(field, canonical))
    }

    /// Fields belonging to the other gender are kept, just unused.
    pub fn change_gender(&self, gender: Gender) -> Result<InputSnapshot, InputError> {
        self.update(|inputs| inputs.gender = Some(gender))
    }

    pub fn change_unit_preference(&self, unit: UnitSystem) -> Result<InputSnapshot, InputError> {
        self.update(|inputs| inputs.unit_preference = Some(unit))
    }

    pub fn change_age(&self, age: Option<u32>) -> Result<InputSnapshot, InputError> {
        self.update(|inputs| inputs.age = age)
    }

    /// Waits until every edit made so far has been handed to the store.
    pub async fn flush(&self) {
        self.persist.flush().await;
    }

    fn ensure_ready(&self) -> Result<(), InputError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(InputError::NotReady)
        }
    }

    fn update(&self, mutate: impl FnOnce(&mut BodyFatInputs)) -> Result<InputSnapshot, InputError> {
        let snapshot = {
            let mut state = write_state(&self.state);
            if !state.is_ready() {
                return Err(InputError::NotReady);
            }
            mutate(&mut state.inputs);
            // Enqueued under the lock so queue order matches edit order.
            self.persist.enqueue(InputPatch::full(&state.inputs));
            InputSnapshot::new(&state, &self.classifier)
        };

        self.updates.send_replace(snapshot.clone());
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::Utc;

    use crate::{
        health::{BmiPolicy, BodyFatPolicy, HealthStatus},
        store::{MemoryInputStore, PersistedInputs, StoreKind},
    };

    struct BrokenStore;

    #[async_trait]
    impl InputStore for BrokenStore {
        fn kind(&self) -> StoreKind {
            StoreKind::Memory
        }

        async fn load(&self) -> Result<Option<PersistedInputs>> {
            Err(anyhow!("storage unavailable"))
        }

        async fn save(&self, _patch: InputPatch) -> Result<PersistedInputs> {
            Err(anyhow!("quota exceeded"))
        }
    }

    fn memory_controller() -> (Arc<MemoryInputStore>, InputController) {
        let store = Arc::new(MemoryInputStore::new());
        let controller = InputController::new(store.clone(), HealthClassifier::default());
        (store, controller)
    }

    #[tokio::test]
    async fn test_edits_are_refused_while_loading() {
        let (_store, controller) = memory_controller();
        assert_eq!(controller.status(), ControllerStatus::Loading);
        assert_eq!(
            controller.edit(MeasurementField::HeightCm, "180", UnitSystem::Metric),
            Err(InputError::NotReady)
        );
        assert_eq!(controller.change_gender(Gender::Male), Err(InputError::NotReady));
    }

    #[tokio::test]
    async fn test_empty_store_loads_ready_and_empty() {
        let (_store, controller) = memory_controller();
        let snapshot = controller.load().await;
        assert_eq!(snapshot.status, ControllerStatus::Ready);
        assert_eq!(snapshot.inputs, BodyFatInputs::default());
        assert_eq!(snapshot.derived, DerivedValues::default());
    }

    #[tokio::test]
    async fn test_load_restores_saved_record_once() {
        let saved = PersistedInputs {
            inputs: BodyFatInputs {
                gender: Some(Gender::Male),
                age: Some(25),
                height_cm: Some(180.0),
                neck_cm: Some(38.0),
                abdomen_cm: Some(90.0),
                ..Default::default()
            },
            updated_at: Utc::now(),
        };
        let store = Arc::new(MemoryInputStore::with_record(saved.clone()));
        let controller = InputController::new(store.clone(), HealthClassifier::default());

        let snapshot = controller.load().await;
        assert_eq!(snapshot.inputs, saved.inputs);
        assert_eq!(snapshot.derived.body_fat_percent, Some(19.9));
        assert_eq!(snapshot.derived.body_fat_status, Some(HealthStatus::Green));

        // A second load must not clobber edits with the stored copy.
        controller.change_age(Some(45)).unwrap();
        let again = controller.load().await;
        assert_eq!(again.inputs.age, Some(45));
    }

    #[tokio::test]
    async fn test_unreadable_store_degrades_to_empty_session() {
        let controller = InputController::new(Arc::new(BrokenStore), HealthClassifier::default());
        let snapshot = controller.load().await;
        assert_eq!(snapshot.status, ControllerStatus::Ready);
        assert_eq!(snapshot.inputs, BodyFatInputs::default());

        // Saves fail too, but the session keeps working from memory.
        controller.edit(MeasurementField::WeightKg, "70", UnitSystem::Metric).unwrap();
        let snapshot = controller
            .edit(MeasurementField::HeightCm, "170", UnitSystem::Metric)
            .unwrap();
        controller.flush().await;
        assert_eq!(snapshot.derived.bmi, Some(24.2));
        assert_eq!(controller.derived().bmi_status, Some(HealthStatus::Green));
    }

    #[tokio::test]
    async fn test_edit_updates_memory_before_persisting() {
        let (store, controller) = memory_controller();
        controller.load().await;

        let snapshot = controller
            .edit(MeasurementField::HeightCm, "180", UnitSystem::Metric)
            .unwrap();
        assert_eq!(snapshot.inputs.height_cm, Some(180.0));
        assert_eq!(controller.inputs().height_cm, Some(180.0));

        controller.flush().await;
        let stored = store.load().await.unwrap().unwrap();
        assert_eq!(stored.inputs.height_cm, Some(180.0));
    }

    #[tokio::test]
    async fn test_blank_edit_clears_the_field() {
        let (store, controller) = memory_controller();
        controller.load().await;

        controller.edit(MeasurementField::NeckCm, "38", UnitSystem::Metric).unwrap();
        let snapshot = controller.edit(MeasurementField::NeckCm, "  ", UnitSystem::Metric).unwrap();
        assert_eq!(snapshot.inputs.neck_cm, None);

        controller.flush().await;
        assert_eq!(store.load().await.unwrap().unwrap().inputs.neck_cm, None);
    }

    #[tokio::test]
    async fn test_invalid_edit_leaves_state_alone() {
        let (_store, controller) = memory_controller();
        controller.load().await;
        controller.edit(MeasurementField::HipCm, "95", UnitSystem::Metric).unwrap();

        let err = controller
            .edit(MeasurementField::HipCm, "ninety", UnitSystem::Metric)
            .unwrap_err();
        assert!(matches!(err, InputError::InvalidNumber { field: MeasurementField::HipCm, .. }));
        assert_eq!(controller.inputs().hip_cm, Some(95.0));
    }

    #[tokio::test]
    async fn test_non_finite_measurement_is_rejected() {
        let (store, controller) = memory_controller();
        controller.load().await;
        controller
            .set_measurement(MeasurementField::NeckCm, Some(38.0), UnitSystem::Metric)
            .unwrap();

        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = controller
                .set_measurement(MeasurementField::NeckCm, Some(bad), UnitSystem::Imperial)
                .unwrap_err();
            assert!(matches!(err, InputError::InvalidNumber { field: MeasurementField::NeckCm, .. }));
        }
        assert_eq!(controller.inputs().neck_cm, Some(38.0));
        assert_eq!(controller.display_value(MeasurementField::NeckCm), Some(38.0));

        controller.flush().await;
        assert_eq!(store.load().await.unwrap().unwrap().inputs.neck_cm, Some(38.0));
    }

    #[tokio::test]
    async fn test_imperial_edit_is_stored_in_canonical_units() {
        let (store, controller) = memory_controller();
        controller.load().await;
        controller.change_unit_preference(UnitSystem::Imperial).unwrap();

        controller
            .edit(MeasurementField::HeightCm, "70.9", UnitSystem::Imperial)
            .unwrap();
        controller
            .set_measurement(MeasurementField::WeightKg, Some(154.3234), UnitSystem::Imperial)
            .unwrap();

        let inputs = controller.inputs();
        assert!((inputs.height_cm.unwrap() - 180.086).abs() < 1e-9);
        assert!((inputs.weight_kg.unwrap() - 70.0).abs() < 1e-9);
        assert_eq!(controller.display_value(MeasurementField::HeightCm), Some(70.9));
        assert_eq!(controller.display_value(MeasurementField::WeightKg), Some(154.3));

        controller.flush().await;
        let stored = store.load().await.unwrap().unwrap();
        assert_eq!(stored.inputs.height_cm, inputs.height_cm);
        assert_eq!(stored.inputs.unit_preference, Some(UnitSystem::Imperial));
    }

    #[tokio::test]
    async fn test_repeated_imperial_edits_do_not_drift() {
        let (_store, controller) = memory_controller();
        controller.load().await;
        controller.change_unit_preference(UnitSystem::Imperial).unwrap();
        controller
            .edit(MeasurementField::WaistCm, "31.37", UnitSystem::Imperial)
            .unwrap();
        let first = controller.inputs().waist_cm;

        for _ in 0..10 {
            let shown = controller.display_value(MeasurementField::WaistCm).unwrap();
            assert_eq!(shown, 31.4);
            // Re-committing the shown text converts the typed value, not a rounded copy.
            controller
                .edit(MeasurementField::WaistCm, &shown.to_string(), UnitSystem::Imperial)
                .unwrap();
        }
        let waist = controller.inputs().waist_cm.unwrap();
        assert!((waist - 31.4 * 2.54).abs() < 1e-9);
        assert!((waist - first.unwrap()).abs() < 0.05 * 2.54);
    }

    #[tokio::test]
    async fn test_switching_gender_keeps_other_fields() {
        let (_store, controller) = memory_controller();
        controller.load().await;
        controller.change_gender(Gender::Male).unwrap();
        controller.edit(MeasurementField::HeightCm, "180", UnitSystem::Metric).unwrap();
        controller.edit(MeasurementField::NeckCm, "38", UnitSystem::Metric).unwrap();
        controller.edit(MeasurementField::AbdomenCm, "90", UnitSystem::Metric).unwrap();

        let female = controller.change_gender(Gender::Female).unwrap();
        assert_eq!(female.inputs.abdomen_cm, Some(90.0));
        assert_eq!(female.derived.body_fat_percent, None);

        let male = controller.change_gender(Gender::Male).unwrap();
        assert_eq!(male.derived.body_fat_percent, Some(19.9));
    }

    #[tokio::test]
    async fn test_fixed_band_policy_flows_through() {
        let store = Arc::new(MemoryInputStore::new());
        let controller = InputController::new(
            store,
            HealthClassifier::new(BodyFatPolicy::FixedBand, BmiPolicy::ThreeBand),
        );
        controller.load().await;
        controller.change_gender(Gender::Male).unwrap();
        controller.edit(MeasurementField::HeightCm, "180", UnitSystem::Metric).unwrap();
        controller.edit(MeasurementField::NeckCm, "38", UnitSystem::Metric).unwrap();
        controller.edit(MeasurementField::AbdomenCm, "90", UnitSystem::Metric).unwrap();
        let snapshot = controller
            .edit(MeasurementField::WeightKg, "100", UnitSystem::Metric)
            .unwrap();

        // 19.9% falls between the male green and yellow bands.
        assert_eq!(snapshot.derived.body_fat_percent, Some(19.9));
        assert_eq!(snapshot.derived.body_fat_status, Some(HealthStatus::Red));
        // 100 / 1.8² = 30.9, red under three bands.
        assert_eq!(snapshot.derived.bmi, Some(30.9));
        assert_eq!(snapshot.derived.bmi_status, Some(HealthStatus::Red));

        controller.edit(MeasurementField::HeightCm, "175", UnitSystem::Metric).unwrap();
        controller.edit(MeasurementField::NeckCm, "37", UnitSystem::Metric).unwrap();
        let snapshot = controller
            .edit(MeasurementField::AbdomenCm, "85", UnitSystem::Metric)
            .unwrap();
        assert_eq!(snapshot.derived.body_fat_percent, Some(17.8));
        assert_eq!(snapshot.derived.body_fat_status, Some(HealthStatus::Green));
    }

    #[tokio::test]
    async fn test_subscribers_see_every_change() {
        let (_store, controller) = memory_controller();
        let mut updates = controller.subscribe();
        assert_eq!(updates.borrow().status, ControllerStatus::Loading);

        controller.load().await;
        assert!(updates.has_changed().unwrap());
        assert_eq!(updates.borrow_and_update().status, ControllerStatus::Ready);

        controller.change_age(Some(33)).unwrap();
        updates.changed().await.unwrap();
        assert_eq!(updates.borrow().inputs.age, Some(33));
    }
}

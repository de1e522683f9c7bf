use tauri::State;

use crate::{
    error::SensorError,
    export::ExportArtifact,
    models::{Coordinate, DrawingMode, Metadata, PositionSample},
    position::{SensorCommand, SensorEvent},
    settings::SketchSettings,
    sketch::{webview::MapScene, SketchController, SketchSnapshot},
    AppState,
};

fn controller_from_state(state: &State<'_, AppState>) -> SketchController {
    state.sketch.clone()
}

#[tauri::command]
pub fn get_sketch_state(state: State<'_, AppState>) -> Result<SketchSnapshot, String> {
    Ok(controller_from_state(&state).snapshot())
}

#[tauri::command]
pub fn get_map_scene(state: State<'_, AppState>) -> Result<MapScene, String> {
    let scene = state
        .scene
        .lock()
        .map_err(|_| "map scene unavailable".to_string())?;
    Ok(scene.clone())
}

#[tauri::command]
pub fn start_drawing(state: State<'_, AppState>, mode: DrawingMode) -> Result<SketchSnapshot, String> {
    controller_from_state(&state)
        .start_drawing(mode)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn reset_drawing(state: State<'_, AppState>) -> Result<SketchSnapshot, String> {
    controller_from_state(&state)
        .reset_to_idle()
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn map_clicked(
    state: State<'_, AppState>,
    latitude: f64,
    longitude: f64,
    expected_mode: Option<DrawingMode>,
) -> Result<SketchSnapshot, String> {
    controller_from_state(&state)
        .map_clicked(Coordinate::new(latitude, longitude), expected_mode)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn save_drawing(
    state: State<'_, AppState>,
    region: String,
    description: String,
) -> Result<ExportArtifact, String> {
    controller_from_state(&state)
        .save(Metadata::new(region, description))
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn show_current_location(state: State<'_, AppState>) -> Result<bool, String> {
    controller_from_state(&state)
        .show_current_location()
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn start_tracking(state: State<'_, AppState>) -> Result<bool, String> {
    let controller = controller_from_state(&state);
    controller.start_tracking().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn stop_tracking(state: State<'_, AppState>) -> Result<bool, String> {
    let controller = controller_from_state(&state);
    controller.stop_tracking().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_position_watch(state: State<'_, AppState>) -> Result<Option<SensorCommand>, String> {
    Ok(state.sensor.current_watch())
}

#[tauri::command]
pub fn report_position(state: State<'_, AppState>, sample: PositionSample) -> Result<bool, String> {
    Ok(state.sensor.push(SensorEvent::Sample(sample)))
}

#[tauri::command]
pub fn report_position_error(
    state: State<'_, AppState>,
    code: u16,
    message: String,
) -> Result<bool, String> {
    let error = SensorError::from_code(code, message);
    Ok(state.sensor.push(SensorEvent::Error(error)))
}

#[tauri::command]
pub fn get_sketch_settings(state: State<'_, AppState>) -> Result<SketchSettings, String> {
    Ok(state.settings.get())
}

#[tauri::command]
pub fn set_sketch_settings(
    state: State<'_, AppState>,
    settings: SketchSettings,
) -> Result<(), String> {
    state.settings.update(settings).map_err(|e| e.to_string())
}

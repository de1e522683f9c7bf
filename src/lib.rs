mod drawing;
mod error;
mod export;
mod map;
mod models;
mod position;
mod settings;
mod sketch;
mod utils;

#[cfg(test)]
mod testing;

pub use drawing::{GeometryAccumulator, ModeController};
pub use error::{SensorError, SketchError, SketchResult};
pub use export::{serialize, to_wkt, DirectoryExporter, ExportArtifact, FileExporter, CSV_MIME};
pub use map::{
    MapInteractionBridge, MapSurface, Overlay, OverlayId, OverlayShape, OverlaySlot, BOOTSTRAP_LABEL,
};
pub use models::{Coordinate, DrawingMode, Geometry, GeometryKind, Metadata, PositionSample};
pub use position::{
    ChannelSensor, FeedOptions, PositionFeed, PositionSensor, SensorCommand, SensorEvent, SensorSink,
    SubscriptionHandle, WatchId,
};
pub use settings::{SettingsStore, SketchSettings, DEFAULT_CENTER, DEFAULT_ZOOM};
pub use sketch::{SketchController, SketchEvents, SketchSnapshot};

#[cfg(feature = "desktop")]
pub use desktop::run;

/// `GEOSKETCH_DEBUG=1` turns on debug logging without touching `RUST_LOG`.
pub fn debug_mode() -> bool {
    std::env::var("GEOSKETCH_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[cfg(feature = "desktop")]
mod desktop {
    use std::sync::{Arc, Mutex};

    use anyhow::anyhow;
    use log::{error, info};
    use tauri::{Manager, WindowEvent};

    use crate::{
        export::DirectoryExporter,
        position::ChannelSensor,
        settings::SettingsStore,
        sketch::{
            commands::{
                get_map_scene, get_position_watch, get_sketch_settings, get_sketch_state, map_clicked,
                report_position, report_position_error, reset_drawing, save_drawing,
                set_sketch_settings, show_current_location, start_drawing, start_tracking,
                stop_tracking,
            },
            webview::{announce_sensor_command, MapScene, WebviewEvents, WebviewSurface},
            SketchController,
        },
    };

    pub(crate) struct AppState {
        pub(crate) sketch: SketchController,
        pub(crate) sensor: Arc<ChannelSensor>,
        pub(crate) scene: Arc<Mutex<MapScene>>,
        pub(crate) settings: SettingsStore,
    }

    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        // Initialize logging (reads RUST_LOG env var)
        let level = if crate::debug_mode() {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();

        info!("GeoSketch starting up...");

        tauri::Builder::default()
            .plugin(tauri_plugin_opener::init())
            .setup(|app| {
                let result = (|| -> anyhow::Result<()> {
                    let app_data_dir = app
                        .path()
                        .app_data_dir()
                        .map_err(|err| anyhow!(err))?;
                    std::fs::create_dir_all(&app_data_dir)?;

                    let settings_store = SettingsStore::new(app_data_dir.join("settings.json"))?;
                    let settings = settings_store.get();

                    let export_dir = settings
                        .export_dir
                        .clone()
                        .or_else(|| app.path().download_dir().ok())
                        .unwrap_or_else(|| app_data_dir.join("exports"));
                    info!("exports will be written to {}", export_dir.display());

                    let announce_handle = app.handle().clone();
                    let sensor = Arc::new(ChannelSensor::with_announcer(move |command| {
                        announce_sensor_command(&announce_handle, command)
                    }));

                    let surface = WebviewSurface::new(app.handle().clone());
                    let scene = surface.scene();

                    let sketch = SketchController::new(
                        Box::new(surface),
                        sensor.clone(),
                        Arc::new(DirectoryExporter::new(export_dir)),
                        Arc::new(WebviewEvents::new(app.handle().clone())),
                        &settings,
                    )?;

                    // Follow the user from launch, as the map page always has.
                    let tracker = sketch.clone();
                    tauri::async_runtime::spawn(async move {
                        if let Err(err) = tracker.start_tracking().await {
                            error!("Failed to start position tracking: {err:#}");
                        }
                    });

                    app.manage(AppState {
                        sketch,
                        sensor,
                        scene,
                        settings: settings_store,
                    });

                    Ok(())
                })();

                result.map_err(|err| err.into())
            })
            .on_window_event(|window, event| {
                if let WindowEvent::Destroyed = event {
                    let sketch = window.state::<AppState>().sketch.clone();
                    if let Err(err) = tauri::async_runtime::block_on(sketch.shutdown()) {
                        error!("Failed to shut down sketch session: {err:#}");
                    }
                }
            })
            .invoke_handler(tauri::generate_handler![
                get_sketch_state,
                get_map_scene,
                get_position_watch,
                start_drawing,
                reset_drawing,
                map_clicked,
                save_drawing,
                show_current_location,
                start_tracking,
                stop_tracking,
                report_position,
                report_position_error,
                get_sketch_settings,
                set_sketch_settings,
            ])
            .run(tauri::generate_context!())
            .expect("error while running tauri application");
    }
}

#[cfg(feature = "desktop")]
pub(crate) use desktop::AppState;

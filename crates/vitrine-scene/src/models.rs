//! glTF model loading and attachment

use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::types::{
    DebugSettings, ModelLoaded, RefreshMaterials, ResizeRequested, ViewerOptions, ViewerSystems,
};

/// Marker for the root entity of the showcased model
#[derive(Component)]
pub struct ShowcaseModel;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModelStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

impl ModelStatus {
    /// Status line shown on the debug panel
    pub fn label(&self) -> String {
        match self {
            ModelStatus::Idle => "Modèle : aucun".to_string(),
            ModelStatus::Loading => "Modèle : chargement…".to_string(),
            ModelStatus::Ready => "Modèle : chargé".to_string(),
            ModelStatus::Failed(reason) => format!("Modèle : échec ({})", reason),
        }
    }
}

/// The single model the viewer shows
#[derive(Resource, Default)]
pub struct ModelState {
    pub path: String,
    pub handle: Option<Handle<Gltf>>,
    pub status: ModelStatus,
    pub root: Option<Entity>,
}

impl ModelState {
    pub fn is_loaded(&self) -> bool {
        self.status == ModelStatus::Ready
    }
}

pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModelState>()
            .add_systems(Startup, request_model)
            .add_systems(
                Update,
                (poll_model_load, attach_model).chain().in_set(ViewerSystems::Input),
            )
            .add_systems(
                Update,
                sync_model_rotation
                    .after(ViewerSystems::Animate)
                    .run_if(resource_changed::<DebugSettings>),
            );
    }
}

/// Asset server path for a configured model path. Absolute URLs are kept,
/// local paths lose their leading slash.
pub fn asset_path(path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    path.trim_start_matches('/').to_string()
}

fn request_model(
    mut model_state: ResMut<ModelState>,
    asset_server: Res<AssetServer>,
    options: Res<ViewerOptions>,
) {
    let path = asset_path(&options.0.model.path);
    info!("Starting to load model: {}", path);
    model_state.handle = Some(asset_server.load::<Gltf>(path.clone()));
    model_state.path = path;
    model_state.status = ModelStatus::Loading;
}

/// Check the loading state and hand the scene over once the glTF is in
fn poll_model_load(
    mut model_state: ResMut<ModelState>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
    mut loaded: MessageWriter<ModelLoaded>,
) {
    if model_state.status != ModelStatus::Loading {
        return;
    }
    let Some(handle) = model_state.handle.clone() else {
        return;
    };

    match asset_server.get_load_state(handle.id()) {
        Some(LoadState::Loaded) => {
            let Some(gltf) = gltf_assets.get(&handle) else {
                return;
            };
            let scene = gltf.default_scene.clone().or_else(|| gltf.scenes.first().cloned());
            match scene {
                Some(scene) => {
                    info!("Model loaded: {}", model_state.path);
                    loaded.write(ModelLoaded {
                        scene,
                        path: model_state.path.clone(),
                    });
                    // Attach flips the status once the scene is spawned
                    model_state.handle = None;
                }
                None => {
                    error!("Model {} contains no scene", model_state.path);
                    model_state.status = ModelStatus::Failed("aucune scène".to_string());
                }
            }
        }
        Some(LoadState::Failed(err)) => {
            error!("Failed to load model {}: {}", model_state.path, err);
            model_state.status = ModelStatus::Failed(err.to_string());
        }
        _ => {
            // Still loading
        }
    }
}

/// Spawn the loaded scene as the one showcased model
pub fn attach_model(
    mut commands: Commands,
    mut loaded: MessageReader<ModelLoaded>,
    mut model_state: ResMut<ModelState>,
    settings: Res<DebugSettings>,
    mut refresh: MessageWriter<RefreshMaterials>,
    mut resize: MessageWriter<ResizeRequested>,
) {
    for ModelLoaded { scene, path } in loaded.read() {
        if let Some(previous) = model_state.root.take() {
            debug!(?previous, "Replacing showcased model");
            commands.entity(previous).despawn();
        }

        let root = commands
            .spawn((
                SceneRoot(scene.clone()),
                Transform::from_rotation(Quat::from_rotation_y(settings.0.model_rotation_y)),
                ShowcaseModel,
                Name::new(path.clone()),
            ))
            .id();
        info!("Attached model {} as {:?}", path, root);

        model_state.root = Some(root);
        model_state.status = ModelStatus::Ready;
        refresh.write(RefreshMaterials);
        resize.write(ResizeRequested);
    }
}

fn sync_model_rotation(
    settings: Res<DebugSettings>,
    mut models: Query<&mut Transform, With<ShowcaseModel>>,
) {
    let rotation = Quat::from_rotation_y(settings.0.model_rotation_y);
    for mut transform in models.iter_mut() {
        if transform.rotation != rotation {
            transform.rotation = rotation;
        }
    }
}

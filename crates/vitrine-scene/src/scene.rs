//! Scene setup - floor, lights, camera and the settings that drive them

use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::light::{CascadeShadowConfigBuilder, DirectionalLightShadowMap, NotShadowCaster};
use bevy::prelude::*;
use vitrine_core::{Rgb, ToneMapping};

use crate::camera::MainCamera;
use crate::types::{DebugSettings, ParamChanged, RefreshMaterials, ViewerOptions, ViewerSystems};

/// Marker for the shadow-catching ground plane
#[derive(Component)]
pub struct Floor;

/// Marker for the shadow-casting directional light the panel controls
#[derive(Component)]
pub struct KeyLight;

/// Marker for the secondary directional light
#[derive(Component)]
pub struct FillLight;

/// Plugin for scene setup
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_scene)
            .add_systems(Update, apply_param_changes.in_set(ViewerSystems::Input))
            .add_systems(
                Update,
                sync_lights
                    .after(ViewerSystems::Animate)
                    .run_if(resource_changed::<DebugSettings>),
            );
    }
}

/// Convert a page color to an engine color
pub fn to_color(rgb: Rgb) -> Color {
    let [r, g, b] = rgb.to_srgb_f32();
    Color::srgb(r, g, b)
}

/// Engine tone mapping for a panel choice. Bevy has no linear operator, so
/// "Linear" renders untonemapped like "No".
pub fn engine_tonemapping(mode: ToneMapping) -> Tonemapping {
    match mode {
        ToneMapping::None | ToneMapping::Linear => Tonemapping::None,
        ToneMapping::Reinhard => Tonemapping::Reinhard,
        ToneMapping::Cineon => Tonemapping::BlenderFilmic,
        ToneMapping::AcesFilmic => Tonemapping::AcesFitted,
    }
}

/// Shadow catcher for the ground plane. A lit white surface multiplied onto
/// the background: lit texels leave it unchanged, shadowed ones darken it by
/// up to `opacity`.
pub fn floor_material(opacity: f32) -> StandardMaterial {
    StandardMaterial {
        base_color: Color::srgba(1.0, 1.0, 1.0, opacity.clamp(0.0, 1.0)),
        alpha_mode: AlphaMode::Multiply,
        perceptual_roughness: 1.0,
        reflectance: 0.0,
        ..default()
    }
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
    options: Res<ViewerOptions>,
    settings: Res<DebugSettings>,
) {
    let config = &options.0;
    let settings = &settings.0;

    commands.insert_resource(ClearColor(to_color(config.scene.background)));
    commands.insert_resource(DirectionalLightShadowMap {
        size: config.scene.shadow_map_size as usize,
    });

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(config.scene.floor_size, config.scene.floor_size))),
        MeshMaterial3d(materials.add(floor_material(config.scene.floor_opacity))),
        Transform::default(),
        NotShadowCaster,
        Floor,
    ));

    let lights = &config.lights;
    commands.spawn((
        DirectionalLight {
            color: to_color(lights.key_color),
            illuminance: settings.key_light_intensity * lights.illuminance_per_unit,
            shadows_enabled: true,
            ..default()
        },
        CascadeShadowConfigBuilder {
            num_cascades: 1,
            maximum_distance: config.scene.shadow_far.max(1.0),
            ..default()
        }
        .build(),
        Transform::from_translation(Vec3::from_array(settings.key_light_position)).looking_at(Vec3::ZERO, Vec3::Y),
        KeyLight,
    ));

    commands.spawn((
        DirectionalLight {
            color: to_color(lights.fill_color),
            illuminance: settings.fill_light_intensity * lights.illuminance_per_unit,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_translation(Vec3::from_array(settings.fill_light_position)).looking_at(Vec3::ZERO, Vec3::Y),
        FillLight,
    ));

    let camera = &config.camera;
    let mut camera_entity = commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: camera.fov_degrees.to_radians(),
            near: camera.near,
            far: camera.far,
            ..default()
        }),
        Transform::from_translation(Vec3::from_array(camera.position))
            .looking_at(Vec3::from_array(camera.target), Vec3::Y),
        engine_tonemapping(settings.tone_mapping),
        AmbientLight {
            color: to_color(lights.ambient_color),
            brightness: settings.ambient_intensity * lights.ambient_brightness_per_unit,
            ..default()
        },
        MainCamera,
    ));

    if let Some(environment) = &config.environment {
        info!(
            diffuse = %environment.diffuse_map,
            specular = %environment.specular_map,
            "Attaching environment maps"
        );
        camera_entity.insert(EnvironmentMapLight {
            diffuse_map: asset_server.load(environment.diffuse_map.clone()),
            specular_map: asset_server.load(environment.specular_map.clone()),
            intensity: settings.env_map_intensity * environment.intensity_scale,
            ..default()
        });
    }

    info!("Scene ready");
}

/// Apply panel edits to the live settings
pub fn apply_param_changes(
    mut changes: MessageReader<ParamChanged>,
    mut settings: ResMut<DebugSettings>,
    mut refresh: MessageWriter<RefreshMaterials>,
) {
    for ParamChanged(change) in changes.read() {
        match settings.0.apply(*change) {
            Ok(outcome) => {
                if outcome.changed {
                    debug!(param = ?change.id, value = ?settings.0.get(change.id), "Setting changed");
                }
                if outcome.refresh_materials {
                    refresh.write(RefreshMaterials);
                }
            }
            Err(e) => warn!("Ignoring panel edit: {}", e),
        }
    }
}

/// Push the live settings onto lights, ambient light and tone mapping
fn sync_lights(
    settings: Res<DebugSettings>,
    options: Res<ViewerOptions>,
    mut key_light: Query<(&mut DirectionalLight, &mut Transform), (With<KeyLight>, Without<FillLight>)>,
    mut fill_light: Query<(&mut DirectionalLight, &mut Transform), (With<FillLight>, Without<KeyLight>)>,
    mut camera: Query<
        (&mut AmbientLight, &mut Tonemapping, Option<&mut EnvironmentMapLight>),
        With<MainCamera>,
    >,
) {
    let settings = &settings.0;
    let lights = &options.0.lights;

    if let Ok((mut light, mut transform)) = key_light.single_mut() {
        light.illuminance = settings.key_light_intensity * lights.illuminance_per_unit;
        *transform = Transform::from_translation(Vec3::from_array(settings.key_light_position))
            .looking_at(Vec3::ZERO, Vec3::Y);
    }

    if let Ok((mut light, mut transform)) = fill_light.single_mut() {
        light.illuminance = settings.fill_light_intensity * lights.illuminance_per_unit;
        *transform = Transform::from_translation(Vec3::from_array(settings.fill_light_position))
            .looking_at(Vec3::ZERO, Vec3::Y);
    }

    if let Ok((mut ambient, mut tonemapping, environment)) = camera.single_mut() {
        ambient.brightness = settings.ambient_intensity * lights.ambient_brightness_per_unit;
        let mode = engine_tonemapping(settings.tone_mapping);
        if *tonemapping != mode {
            *tonemapping = mode;
        }
        if let (Some(mut environment), Some(config)) = (environment, options.0.environment.as_ref()) {
            environment.intensity = settings.env_map_intensity * config.intensity_scale;
        }
    }
}

//! Material refresh over the meshes of the scene
//!
//! Bevy has no per-material environment intensity. Each eligible mesh gets an
//! [`EnvironmentResponse`] recording the intensity it was refreshed with,
//! while the camera's environment map light carries the shared value.

use bevy::light::{NotShadowCaster, NotShadowReceiver};
use bevy::prelude::*;
use vitrine_core::{refresh_surfaces, RefreshReport, ShadedSurface, ShadowFlags, SurfaceKind};

use crate::scene::Floor;
use crate::types::{DebugSettings, RefreshMaterials, ViewerSystems};

/// Environment intensity a mesh was last refreshed with
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentResponse(pub f32);

/// Outcome of the most recent refresh pass
#[derive(Resource, Debug, Default)]
pub struct MaterialRefreshStats {
    pub passes: u32,
    pub last: RefreshReport,
}

pub struct MaterialsPlugin;

impl Plugin for MaterialsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MaterialRefreshStats>()
            .add_systems(Update, refresh_materials.after(ViewerSystems::Input));
    }
}

/// A mesh entity seen through the refresh pass
struct MeshSurface {
    entity: Entity,
    kind: SurfaceKind,
    env: Option<f32>,
    shadows: ShadowFlags,
    dirty: bool,
}

impl ShadedSurface for MeshSurface {
    fn kind(&self) -> SurfaceKind {
        self.kind
    }

    fn env_intensity(&self) -> Option<f32> {
        self.env
    }

    fn set_env_intensity(&mut self, intensity: f32) {
        self.env = Some(intensity);
        self.dirty = true;
    }

    fn shadows(&self) -> ShadowFlags {
        self.shadows
    }

    fn set_shadows(&mut self, shadows: ShadowFlags) {
        self.shadows = shadows;
        self.dirty = true;
    }
}

fn classify(material: Option<&StandardMaterial>, is_floor: bool) -> SurfaceKind {
    if is_floor {
        return SurfaceKind::ShadowCatcher;
    }
    match material {
        Some(material) if material.unlit => SurfaceKind::Unlit,
        Some(_) => SurfaceKind::Pbr,
        None => SurfaceKind::Other,
    }
}

/// Runs on explicit requests and whenever meshes appear, which is how a
/// glTF scene's children show up a few frames after the root is attached.
pub fn refresh_materials(
    mut commands: Commands,
    mut requests: MessageReader<RefreshMaterials>,
    new_meshes: Query<(), Added<Mesh3d>>,
    settings: Res<DebugSettings>,
    materials: Res<Assets<StandardMaterial>>,
    mut stats: ResMut<MaterialRefreshStats>,
    surfaces: Query<(
        Entity,
        Option<&MeshMaterial3d<StandardMaterial>>,
        Option<&EnvironmentResponse>,
        Has<NotShadowCaster>,
        Has<NotShadowReceiver>,
        Has<Floor>,
    ), With<Mesh3d>>,
) {
    let requested = requests.read().count() > 0;
    if !requested && new_meshes.is_empty() {
        return;
    }

    let mut meshes: Vec<MeshSurface> = surfaces
        .iter()
        .map(|(entity, material, response, no_cast, no_receive, is_floor)| MeshSurface {
            entity,
            kind: classify(material.and_then(|m| materials.get(&m.0)), is_floor),
            env: response.map(|r| r.0),
            shadows: ShadowFlags {
                cast: !no_cast,
                receive: !no_receive,
            },
            dirty: false,
        })
        .collect();

    let report = refresh_surfaces(&mut meshes, settings.0.env_map_intensity);

    for mesh in meshes.iter().filter(|m| m.dirty) {
        let mut entity = commands.entity(mesh.entity);
        if let Some(env) = mesh.env {
            entity.try_insert(EnvironmentResponse(env));
        }
        if mesh.shadows == ShadowFlags::BOTH {
            entity.try_remove::<(NotShadowCaster, NotShadowReceiver)>();
        }
    }

    debug!(
        visited = report.visited,
        updated = report.updated,
        skipped = report.skipped,
        "Material refresh"
    );
    stats.passes += 1;
    stats.last = report;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypesPlugin;
    use vitrine_core::{ParamChange, ParamId, ViewerConfig};

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(TypesPlugin {
                config: ViewerConfig::default(),
            })
            .init_resource::<Assets<StandardMaterial>>()
            .init_resource::<MaterialRefreshStats>()
            .add_systems(Update, (crate::scene::apply_param_changes, refresh_materials).chain());
        app
    }

    fn spawn_mesh(app: &mut App, material: StandardMaterial, extra: impl Bundle) -> Entity {
        let handle = app
            .world_mut()
            .resource_mut::<Assets<StandardMaterial>>()
            .add(material);
        app.world_mut()
            .spawn((Mesh3d(Handle::default()), MeshMaterial3d(handle), extra))
            .id()
    }

    #[test]
    fn test_refresh_touches_only_lit_meshes() {
        let mut app = test_app();
        let lit = spawn_mesh(&mut app, StandardMaterial::default(), (NotShadowCaster, NotShadowReceiver));
        let unlit = spawn_mesh(
            &mut app,
            StandardMaterial {
                unlit: true,
                ..default()
            },
            NotShadowCaster,
        );
        let floor = spawn_mesh(&mut app, StandardMaterial::default(), (Floor, NotShadowCaster));
        app.update();

        let world = app.world();
        assert_eq!(world.get::<EnvironmentResponse>(lit), Some(&EnvironmentResponse(5.0)));
        assert!(world.get::<NotShadowCaster>(lit).is_none());
        assert!(world.get::<NotShadowReceiver>(lit).is_none());

        assert!(world.get::<EnvironmentResponse>(unlit).is_none());
        assert!(world.get::<NotShadowCaster>(unlit).is_some());
        assert!(world.get::<EnvironmentResponse>(floor).is_none());
        assert!(world.get::<NotShadowCaster>(floor).is_some());

        let stats = world.resource::<MaterialRefreshStats>();
        assert_eq!(stats.last.visited, 3);
        assert_eq!(stats.last.updated, 1);
        assert_eq!(stats.last.skipped, 2);
    }

    #[test]
    fn test_second_pass_changes_nothing() {
        let mut app = test_app();
        spawn_mesh(&mut app, StandardMaterial::default(), ());
        spawn_mesh(&mut app, StandardMaterial::default(), NotShadowReceiver);
        app.update();

        app.world_mut().write_message(RefreshMaterials);
        app.update();

        let stats = app.world().resource::<MaterialRefreshStats>();
        assert_eq!(stats.passes, 2);
        assert_eq!(stats.last.updated, 0);
    }

    #[test]
    fn test_env_intensity_edit_reaches_every_mesh() {
        let mut app = test_app();
        let meshes: Vec<Entity> = (0..4)
            .map(|_| spawn_mesh(&mut app, StandardMaterial::default(), ()))
            .collect();
        app.update();

        app.world_mut()
            .write_message(crate::types::ParamChanged(ParamChange::number(ParamId::EnvMapIntensity, 1.5)));
        app.update();

        for entity in meshes {
            assert_eq!(
                app.world().get::<EnvironmentResponse>(entity),
                Some(&EnvironmentResponse(1.5))
            );
        }
        assert_eq!(app.world().resource::<MaterialRefreshStats>().last.updated, 4);
    }

    #[test]
    fn test_idle_frames_skip_the_pass() {
        let mut app = test_app();
        spawn_mesh(&mut app, StandardMaterial::default(), ());
        app.update();
        app.update();
        app.update();
        assert_eq!(app.world().resource::<MaterialRefreshStats>().passes, 1);
    }
}

//! Material refresh pass
//!
//! Walks shaded surfaces and pushes the shared environment intensity onto
//! every physically-based one, turning shadow casting and receiving on along
//! the way. Surfaces of any other kind are left exactly as they are.

/// How a surface is shaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Lit metallic/roughness material
    Pbr,
    /// Flat-colored, ignores lights
    Unlit,
    /// Only shows shadows it receives (the floor)
    ShadowCatcher,
    Other,
}

impl SurfaceKind {
    pub fn is_refreshable(self) -> bool {
        matches!(self, SurfaceKind::Pbr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShadowFlags {
    pub cast: bool,
    pub receive: bool,
}

impl ShadowFlags {
    pub const BOTH: ShadowFlags = ShadowFlags { cast: true, receive: true };
}

/// A mesh surface the refresh pass can inspect and update
pub trait ShadedSurface {
    fn kind(&self) -> SurfaceKind;
    fn env_intensity(&self) -> Option<f32>;
    fn set_env_intensity(&mut self, intensity: f32);
    fn shadows(&self) -> ShadowFlags;
    fn set_shadows(&mut self, shadows: ShadowFlags);
}

/// Counts from one refresh pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshReport {
    pub visited: usize,
    /// Eligible surfaces that actually changed
    pub updated: usize,
    /// Surfaces that are not physically shaded
    pub skipped: usize,
}

/// Apply `intensity` to every refreshable surface. Running it twice with the
/// same intensity reports zero updates the second time.
pub fn refresh_surfaces<'a, S, I>(surfaces: I, intensity: f32) -> RefreshReport
where
    S: ShadedSurface + 'a,
    I: IntoIterator<Item = &'a mut S>,
{
    let mut report = RefreshReport::default();
    for surface in surfaces {
        report.visited += 1;
        if !surface.kind().is_refreshable() {
            report.skipped += 1;
            continue;
        }

        let mut touched = false;
        if surface.env_intensity() != Some(intensity) {
            surface.set_env_intensity(intensity);
            touched = true;
        }
        if surface.shadows() != ShadowFlags::BOTH {
            surface.set_shadows(ShadowFlags::BOTH);
            touched = true;
        }
        if touched {
            report.updated += 1;
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct TestSurface {
        kind: SurfaceKind,
        env: Option<f32>,
        shadows: ShadowFlags,
    }

    impl TestSurface {
        fn new(kind: SurfaceKind) -> Self {
            Self {
                kind,
                env: None,
                shadows: ShadowFlags::default(),
            }
        }
    }

    impl ShadedSurface for TestSurface {
        fn kind(&self) -> SurfaceKind {
            self.kind
        }
        fn env_intensity(&self) -> Option<f32> {
            self.env
        }
        fn set_env_intensity(&mut self, intensity: f32) {
            self.env = Some(intensity);
        }
        fn shadows(&self) -> ShadowFlags {
            self.shadows
        }
        fn set_shadows(&mut self, shadows: ShadowFlags) {
            self.shadows = shadows;
        }
    }

    fn mixed_scene() -> Vec<TestSurface> {
        let mut floor = TestSurface::new(SurfaceKind::ShadowCatcher);
        floor.shadows.receive = true;
        vec![
            TestSurface::new(SurfaceKind::Pbr),
            floor,
            TestSurface::new(SurfaceKind::Unlit),
            TestSurface {
                kind: SurfaceKind::Pbr,
                env: Some(1.0),
                shadows: ShadowFlags { cast: true, receive: false },
            },
            TestSurface::new(SurfaceKind::Other),
        ]
    }

    #[test]
    fn test_refresh_sets_every_eligible_surface() {
        let mut scene = mixed_scene();
        let untouched: Vec<_> = scene.iter().filter(|s| !s.kind.is_refreshable()).cloned().collect();

        let report = refresh_surfaces(&mut scene, 5.0);
        assert_eq!(report, RefreshReport { visited: 5, updated: 2, skipped: 3 });

        for surface in scene.iter().filter(|s| s.kind.is_refreshable()) {
            assert_eq!(surface.env, Some(5.0));
            assert_eq!(surface.shadows, ShadowFlags::BOTH);
        }
        let after: Vec<_> = scene.iter().filter(|s| !s.kind.is_refreshable()).cloned().collect();
        assert_eq!(after, untouched);
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let mut scene = mixed_scene();
        refresh_surfaces(&mut scene, 2.0);
        let snapshot = scene.clone();
        let report = refresh_surfaces(&mut scene, 2.0);
        assert_eq!(report.updated, 0);
        assert_eq!(scene, snapshot);
    }

    #[test]
    fn test_new_intensity_updates_all_again() {
        let mut scene = mixed_scene();
        refresh_surfaces(&mut scene, 2.0);
        let report = refresh_surfaces(&mut scene, 7.5);
        assert_eq!(report.updated, 2);
        assert!(scene.iter().filter(|s| s.kind == SurfaceKind::Pbr).all(|s| s.env == Some(7.5)));
    }

    #[test]
    fn test_empty_scene() {
        let mut scene: Vec<TestSurface> = Vec::new();
        assert_eq!(refresh_surfaces(&mut scene, 1.0), RefreshReport::default());
    }
}

//! Scene construction: sphere, lights, starfield and one marker per location.

use fnv::FnvHashMap;
use glam::{Quat, Vec3};
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::constants::*;
use crate::geo::GeoPoint;
use crate::location::Location;
use crate::marker::Marker;
use crate::responsive::ResponsiveConfig;

/// Image references resolved by the front-end (URL on the web, path natively).
#[derive(Debug, Clone, PartialEq)]
pub struct SceneAssets {
    pub surface_image: String,
    pub glow_image: String,
}

impl Default for SceneAssets {
    fn default() -> Self {
        Self {
            surface_image: DEFAULT_SURFACE_IMAGE.to_string(),
            glow_image: DEFAULT_GLOW_IMAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SphereDesc {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub surface_image: String,
    pub bump_scale: f32,
    pub shininess: f32,
    /// Modulated by the surface image luminance.
    pub specular: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Light position; it shines towards the origin.
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl DirectionalLight {
    /// Unit vector from a surface point towards the light.
    pub fn direction(&self) -> Vec3 {
        self.position.normalize_or_zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    pub key: DirectionalLight,
    pub rim: DirectionalLight,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::ONE,
            ambient_intensity: AMBIENT_INTENSITY,
            key: DirectionalLight {
                position: Vec3::from(KEY_LIGHT_POSITION),
                color: Vec3::ONE,
                intensity: KEY_LIGHT_INTENSITY,
            },
            rim: DirectionalLight {
                position: Vec3::from(RIM_LIGHT_POSITION),
                color: Vec3::ONE,
                intensity: RIM_LIGHT_INTENSITY,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vec3,
    pub size: f32,
}

#[derive(Debug, Clone)]
pub struct SceneGraph {
    locations: Vec<Location>,
    markers: Vec<Marker>,
    by_id: FnvHashMap<String, usize>,
    sphere: SphereDesc,
    lighting: Lighting,
    stars: Vec<Star>,
    orientation: Quat,
    glow_image: String,
}

impl SceneGraph {
    /// Locations are expected to be validated already (see
    /// [`crate::location::validate_locations`]).
    pub fn build(locations: Vec<Location>, config: &ResponsiveConfig, assets: &SceneAssets, seed: u64) -> Self {
        let markers: Vec<Marker> = locations
            .iter()
            .enumerate()
            .map(|(i, loc)| Marker::new(i, loc.geo, config.radius, config.marker_base_scale))
            .collect();
        let by_id = locations
            .iter()
            .enumerate()
            .map(|(i, loc)| (loc.id.clone(), i))
            .collect();
        let orientation = initial_orientation(&locations);
        info!(
            "[scene] built: {} markers, {} stars, radius {:.2}",
            markers.len(),
            STAR_COUNT,
            config.radius
        );
        Self {
            sphere: SphereDesc {
                radius: config.radius,
                width_segments: SPHERE_WIDTH_SEGMENTS,
                height_segments: SPHERE_HEIGHT_SEGMENTS,
                surface_image: assets.surface_image.clone(),
                bump_scale: SPHERE_BUMP_SCALE,
                shininess: SPHERE_SHININESS,
                specular: Vec3::from(SPHERE_SPECULAR),
            },
            lighting: Lighting::default(),
            stars: generate_stars(STAR_COUNT, seed),
            glow_image: assets.glow_image.clone(),
            locations,
            markers,
            by_id,
            orientation,
        }
    }

    /// Follow a viewport change without rebuilding.
    pub fn apply_responsive(&mut self, config: &ResponsiveConfig) {
        self.sphere.radius = config.radius;
        for marker in &mut self.markers {
            let geo = self.locations[marker.location].geo;
            marker.reproject(geo, config.radius, config.marker_base_scale);
        }
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn location(&self, index: usize) -> Option<&Location> {
        self.locations.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn markers_mut(&mut self) -> &mut [Marker] {
        &mut self.markers
    }

    pub fn sphere(&self) -> &SphereDesc {
        &self.sphere
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn glow_image(&self) -> &str {
        &self.glow_image
    }
}

/// Static starfield behind the sphere, reproducible for a seed.
pub fn generate_stars(count: usize, seed: u64) -> Vec<Star> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| Star {
            position: Vec3::new(
                rng.gen_range(-STAR_HALF_EXTENT..=STAR_HALF_EXTENT),
                rng.gen_range(-STAR_HALF_EXTENT..=STAR_HALF_EXTENT),
                rng.gen_range(-STAR_DEPTH..=0.0),
            ),
            size: rng.gen_range(0.0..STAR_MAX_SIZE),
        })
        .collect()
}

fn in_focus_region(geo: GeoPoint) -> bool {
    geo.lat > -10.0 && geo.lat < 40.0 && geo.lng > 70.0 && geo.lng < 140.0
}

/// Mean of the locations inside the Asia focus box, or the default focus.
pub fn focus_point(locations: &[Location]) -> GeoPoint {
    let (sum_lat, sum_lng, n) = locations
        .iter()
        .map(|l| l.geo)
        .filter(|g| in_focus_region(*g))
        .fold((0.0f32, 0.0f32, 0u32), |(a, b, n), g| (a + g.lat, b + g.lng, n + 1));
    if n == 0 {
        GeoPoint {
            lat: DEFAULT_FOCUS_LAT,
            lng: DEFAULT_FOCUS_LNG,
        }
    } else {
        GeoPoint {
            lat: sum_lat / n as f32,
            lng: sum_lng / n as f32,
        }
    }
}

/// Rotation that turns the focus point towards +z (the camera's start side).
pub fn initial_orientation(locations: &[Location]) -> Quat {
    let focus = focus_point(locations);
    Quat::from_rotation_x(focus.lat.to_radians()) * Quat::from_rotation_y(-(focus.lng + 90.0).to_radians())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SphereMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    /// Row 0 of the surface image is the north pole.
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

/// Unit UV sphere in the projector's convention: `u = (lng + 180) / 360`,
/// `v = (90 - lat) / 180`.
pub fn sphere_mesh(width_segments: u32, height_segments: u32) -> SphereMesh {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);
    let mut mesh = SphereMesh::default();
    let row = ws + 1;
    for iy in 0..=hs {
        let v = iy as f32 / hs as f32;
        // pole vertices sit halfway across their triangle's span
        let u_offset = if iy == 0 {
            0.5 / ws as f32
        } else if iy == hs {
            -0.5 / ws as f32
        } else {
            0.0
        };
        let phi = v * std::f32::consts::PI;
        for ix in 0..=ws {
            let u = ix as f32 / ws as f32;
            let theta = u * std::f32::consts::TAU;
            let p = Vec3::new(-theta.cos() * phi.sin(), phi.cos(), theta.sin() * phi.sin());
            mesh.positions.push(p.to_array());
            mesh.normals.push(p.normalize_or_zero().to_array());
            mesh.uvs.push([u + u_offset, v]);
        }
    }
    for iy in 0..hs {
        for ix in 0..ws {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != hs - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::project;
    use crate::location::sample_locations;

    #[test]
    fn one_marker_per_location() {
        let cfg = ResponsiveConfig::for_viewport(1440.0, 900.0);
        let scene = SceneGraph::build(sample_locations(), &cfg, &SceneAssets::default(), 7);
        assert_eq!(scene.markers().len(), scene.locations().len());
        assert_eq!(scene.stars().len(), STAR_COUNT);
        for (i, m) in scene.markers().iter().enumerate() {
            assert_eq!(m.location, i);
        }
        assert_eq!(scene.index_of("bali-escape-with-garima"), Some(4));
    }

    #[test]
    fn scene_names_the_images_to_load() {
        let cfg = ResponsiveConfig::for_viewport(1440.0, 900.0);
        let assets = SceneAssets {
            surface_image: "textures/earth.jpg".into(),
            glow_image: "textures/glow.png".into(),
        };
        let scene = SceneGraph::build(sample_locations(), &cfg, &assets, 7);
        assert_eq!(scene.sphere().surface_image, "textures/earth.jpg");
        assert_eq!(scene.glow_image(), "textures/glow.png");

        let default = SceneGraph::build(Vec::new(), &cfg, &SceneAssets::default(), 7);
        assert_eq!(default.sphere().surface_image, DEFAULT_SURFACE_IMAGE);
        assert_eq!(default.glow_image(), DEFAULT_GLOW_IMAGE);
    }

    #[test]
    fn stars_are_seeded_and_bounded() {
        let a = generate_stars(500, 3);
        assert_eq!(a, generate_stars(500, 3));
        assert!(a.iter().all(|s| s.position.z <= 0.0 && s.position.x.abs() <= 1000.0 && s.size < 2.5));
    }

    #[test]
    fn focus_defaults_without_asian_locations() {
        let mut locs = sample_locations();
        locs.truncate(1); // Europe only
        assert_eq!(focus_point(&locs), GeoPoint { lat: 15.0, lng: 100.0 });
    }

    #[test]
    fn orientation_faces_focus_to_camera() {
        let locs = sample_locations();
        let focus = focus_point(&locs);
        let world = initial_orientation(&locs) * project(focus, 1.0, 0.0);
        assert!(world.dot(Vec3::Z) > 0.999, "{world:?}");
    }

    #[test]
    fn mesh_vertices_match_projector() {
        let mesh = sphere_mesh(64, 64);
        assert_eq!(mesh.positions.len(), 65 * 65);
        assert_eq!(mesh.indices.len(), (64 * 64 * 2 - 2 * 64) * 3);
        // vertex at u = 0.25, v = 0.5 is lat 0, lng -90
        let p = Vec3::from(mesh.positions[32 * 65 + 16]);
        let q = project(GeoPoint { lat: 0.0, lng: -90.0 }, 1.0, 0.0);
        assert!((p - q).length() < 1e-5);
    }
}

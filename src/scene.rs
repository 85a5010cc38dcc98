// src/scene.rs

use std::f32::consts::TAU;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::geometry::{build_polygon, InstanceRegistry, Placement, VertexStreams};

/// All geometry for one run: the parallel streams ready for upload and the
/// per-instance range table that drives per-frame rotation updates.
pub struct Scene {
    pub streams: VertexStreams,
    pub registry: InstanceRegistry,
}

/// Builds the whole polygon field up front. Placement is seeded, so the same
/// config reproduces the same field: offsets uniform over the window
/// (centered at the origin), sizes uniform in `[min_size, max_size]`, fill
/// colors walking the palette cyclically, initial rotation `i * 2π/360`.
pub fn build_scene(config: &Config) -> Scene {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut streams = VertexStreams::new();
    let mut registry = InstanceRegistry::with_capacity(config.polygon_count as usize);

    debug_assert!(!config.polygon_colors.is_empty());

    for i in 0..config.polygon_count {
        let offset = Vec2::new(
            rng.gen::<f32>() * config.winres.x - config.winres.x / 2.0,
            rng.gen::<f32>() * config.winres.y - config.winres.y / 2.0,
        );
        let placement = Placement {
            offset,
            rotation: i as f32 * TAU / 360.0,
            size: config.min_size + rng.gen::<f32>() * (config.max_size - config.min_size),
        };
        let fill = config.polygon_colors[i as usize % config.polygon_colors.len()];

        let range = build_polygon(
            &mut streams,
            &config.template,
            &placement,
            fill,
            config.outline_color,
        );
        registry.register(range);
    }

    log::info!(
        "built {} instances: {} vertex records, {} indices",
        registry.len(),
        streams.len(),
        streams.index_count()
    );

    Scene { streams, registry }
}

/// One animation tick: advance every registered instance's rotation records
/// in place. The caller re-uploads the rotation stream afterwards.
pub fn tick_rotations(scene: &mut Scene, delta: f32) {
    for range in scene.registry.iter() {
        // Ranges come straight from the registry, so a failure here means
        // the streams were rebuilt without re-registering.
        if let Ok(rotations) = scene.streams.instance_rotations_mut(range) {
            for r in rotations {
                *r += delta;
            }
        } else {
            log::error!("stale instance range {range:?}, skipping");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.polygon_count = 6;
        config.seed = 7;
        config
    }

    #[test]
    fn builds_one_range_per_instance() {
        let config = small_config();
        let scene = build_scene(&config);
        let n = config.template.len();

        assert_eq!(scene.registry.len(), 6);
        assert_eq!(scene.streams.len(), 6 * 9 * n);
        assert_eq!(scene.streams.index_count(), 6 * (15 * n - 6));

        // Ranges tile the streams contiguously.
        let mut expected_start = 0;
        for range in scene.registry.iter() {
            assert_eq!(range.start, expected_start);
            assert_eq!(range.count, (9 * n) as u32);
            expected_start += range.count;
        }
    }

    #[test]
    fn same_seed_reproduces_the_field() {
        let config = small_config();
        let a = build_scene(&config);
        let b = build_scene(&config);
        assert_eq!(a.streams.offsets, b.streams.offsets);
        assert_eq!(a.streams.sizes, b.streams.sizes);
    }

    #[test]
    fn fill_colors_cycle_through_palette() {
        let config = small_config();
        let scene = build_scene(&config);
        let palette = &config.polygon_colors;
        for (i, range) in scene.registry.iter().enumerate() {
            // First record of each instance is a body vertex.
            let body_color = scene.streams.colors[range.start as usize];
            assert_eq!(body_color, palette[i % palette.len()]);
        }
    }

    #[test]
    fn tick_advances_every_rotation() {
        let config = small_config();
        let mut scene = build_scene(&config);
        let before = scene.streams.rotations.clone();
        tick_rotations(&mut scene, 0.01);
        for (&now, &was) in scene.streams.rotations.iter().zip(&before) {
            assert!((now - (was + 0.01)).abs() < 1e-6);
        }
    }
}

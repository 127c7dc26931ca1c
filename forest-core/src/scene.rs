//! Procedural forest layout on a square ground plot.
//!
//! [`generate_scene`] turns an [`EmissionsEstimate`] into a [`SceneLayout`]:
//! 1. Derive the object counts per category with [`SceneCounts::from_trees`].
//! 2. Size the plot with [`plot_size`].
//! 3. Scatter each object uniformly over the usable square in the plot
//!    centre, with a random variant, scale and (trees only) heading.
//!
//! Objects may overlap; no spacing is enforced.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;

use crate::{
    config::{ScaleRange, SceneConfig},
    emissions::EmissionsEstimate,
    types::Category,
};

const FLOWERS_PER_TREE_DIVISOR: u64 = 3;
const MUSHROOMS_PER_TREE_DIVISOR: u64 = 10;
const LOGS_PER_TREE_DIVISOR: u64 = 10;
const PLANTS_PER_TREE_DIVISOR: u64 = 5;

/// Most trees ever laid out, whatever `max_trees` says.
pub const MAX_LAID_OUT_TREES: u64 = 10_000;

/// Number of objects to place per scattered category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SceneCounts {
    pub trees: u64,
    pub flowers: u64,
    pub mushrooms: u64,
    pub logs: u64,
    pub plants: u64,
}

impl SceneCounts {
    pub fn from_trees(trees: u64) -> Self {
        Self {
            trees,
            flowers: trees / FLOWERS_PER_TREE_DIVISOR,
            mushrooms: trees / MUSHROOMS_PER_TREE_DIVISOR,
            logs: trees / LOGS_PER_TREE_DIVISOR,
            plants: trees / PLANTS_PER_TREE_DIVISOR,
        }
    }

    pub fn get(&self, category: Category) -> u64 {
        match category {
            Category::Tree => self.trees,
            Category::Flower => self.flowers,
            Category::Mushroom => self.mushrooms,
            Category::Log => self.logs,
            Category::Plant => self.plants,
            Category::Ground => 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.trees
            .saturating_add(self.flowers)
            .saturating_add(self.mushrooms)
            .saturating_add(self.logs)
            .saturating_add(self.plants)
    }
}

/// One decorative object ready to be drawn.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlacedObject {
    pub category: Category,
    pub variant: &'static str,
    /// Ground-plane position, centred on the plot.
    pub pos: Vec2,
    pub scale: f32,
    /// Heading in radians, `0.0` for categories that do not rotate.
    pub rotation: f32,
}

/// A generated plot and everything placed on it.
///
/// `objects[0]` is the ground plot itself, followed by trees, flowers,
/// mushrooms, logs and plants in that order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SceneLayout {
    pub plot_size: f32,
    /// Edge length of the centred square objects are scattered in.
    pub usable_area: f32,
    /// Counts actually laid out, after any `max_trees` cap.
    pub counts: SceneCounts,
    pub objects: Vec<PlacedObject>,
}

impl SceneLayout {
    pub fn iter_category(&self, category: Category) -> impl Iterator<Item = &PlacedObject> {
        self.objects.iter().filter(move |o| o.category == category)
    }

    pub fn count(&self, category: Category) -> usize {
        self.iter_category(category).count()
    }

    /// `true` if fewer trees were laid out than the estimate calls for.
    pub fn is_truncated(&self, estimate: &EmissionsEstimate) -> bool {
        self.counts.trees < estimate.trees_needed
    }
}

/// Computes the plot edge length for a tree count.
///
/// `min(base_size + sqrt(trees) * density_factor, max_size)`, so the plot
/// grows with the forest but never past `max_size`.
pub fn plot_size(trees: u64, cfg: &SceneConfig) -> f32 {
    (cfg.base_size + (trees as f32).sqrt() * cfg.density_factor).min(cfg.max_size)
}

/// Generates a random layout for the trees in `estimate`.
///
/// Every call draws fresh positions, scales, rotations and variants from
/// `rng`; pass a seeded generator (or use [`generate_scene_seeded`]) for a
/// reproducible layout.
///
/// ### Parameters
/// - `estimate` - Source of `trees_needed`.
/// - `cfg` - Plot sizing, placement margin, tree cap and scale ranges. The
///   cap never exceeds [`MAX_LAID_OUT_TREES`].
/// - `rng` - Random source for every sampled value.
///
/// ### Returns
/// A [`SceneLayout`] whose positions all lie inside
/// `[-plot_size / 2, plot_size / 2]` on both axes.
pub fn generate_scene(
    estimate: &EmissionsEstimate,
    cfg: &SceneConfig,
    rng: &mut impl Rng,
) -> SceneLayout {
    let cap = cfg.max_trees.unwrap_or(MAX_LAID_OUT_TREES).min(MAX_LAID_OUT_TREES);
    let trees = estimate.trees_needed.min(cap);
    let counts = SceneCounts::from_trees(trees);
    let plot_size = plot_size(trees, cfg);
    let usable_area = plot_size * cfg.usable_fraction;
    let half = usable_area * 0.5;

    let mut objects = Vec::with_capacity(counts.total() as usize + 1);
    objects.push(PlacedObject {
        category: Category::Ground,
        variant: Category::Ground.variants()[0],
        pos: Vec2::ZERO,
        scale: plot_size,
        rotation: 0.0,
    });

    for category in Category::SCATTERED {
        let range = scale_range(cfg, category);
        objects.extend((0..counts.get(category)).map(|_| place(category, half, range, rng)));
    }

    if trees < estimate.trees_needed {
        tracing::debug!(
            trees_needed = estimate.trees_needed,
            laid_out = trees,
            "tree count capped for layout"
        );
    }
    tracing::debug!(plot_size, objects = objects.len(), "generated scene");

    SceneLayout {
        plot_size,
        usable_area,
        counts,
        objects,
    }
}

/// [`generate_scene`] driven by a [`StdRng`] seeded with `seed`.
pub fn generate_scene_seeded(
    estimate: &EmissionsEstimate,
    cfg: &SceneConfig,
    seed: u64,
) -> SceneLayout {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_scene(estimate, cfg, &mut rng)
}

fn scale_range(cfg: &SceneConfig, category: Category) -> ScaleRange {
    match category {
        Category::Tree => cfg.tree_scale,
        Category::Flower => cfg.flower_scale,
        Category::Mushroom => cfg.mushroom_scale,
        Category::Log => cfg.log_scale,
        Category::Plant => cfg.plant_scale,
        Category::Ground => ScaleRange::new(1.0, 1.0),
    }
}

fn place(category: Category, half: f32, range: ScaleRange, rng: &mut impl Rng) -> PlacedObject {
    let variants = category.variants();
    let variant = variants[rng.random_range(0..variants.len())];

    let pos = Vec2::new(sample_axis(half, rng), sample_axis(half, rng));
    let scale = range.sample(rng);
    let rotation = if category.rotates() {
        rng.random_range(0.0..TAU)
    } else {
        0.0
    };

    PlacedObject {
        category,
        variant,
        pos,
        scale,
        rotation,
    }
}

fn sample_axis(half: f32, rng: &mut impl Rng) -> f32 {
    if half > 0.0 {
        rng.random_range(-half..half)
    } else {
        0.0
    }
}

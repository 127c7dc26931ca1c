use serde::Serialize;

/// Kind of decorative object placed on the plot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tree,
    Flower,
    Mushroom,
    Log,
    Plant,
    Ground,
}

const TREE_VARIANTS: &[&str] = &["tree_oak", "tree_oak_dark", "tree_oak_fall"];

const FLOWER_VARIANTS: &[&str] = &[
    "flower_purpleA",
    "flower_purpleB",
    "flower_purpleC",
    "flower_redA",
    "flower_redB",
    "flower_redC",
    "flower_yellowA",
    "flower_yellowB",
    "flower_yellowC",
];

const MUSHROOM_VARIANTS: &[&str] = &[
    "mushroom_red",
    "mushroom_redTall",
    "mushroom_tan",
    "mushroom_tanGroup",
];

const LOG_VARIANTS: &[&str] = &["log", "log_large", "log_stack", "log_stackLarge"];

const PLANT_VARIANTS: &[&str] = &["plant_bushSmall", "plant_flatShort"];

const GROUND_VARIANTS: &[&str] = &["ground_grass"];

impl Category {
    /// Categories scattered over the plot, in placement order.
    pub const SCATTERED: [Category; 5] = [
        Category::Tree,
        Category::Flower,
        Category::Mushroom,
        Category::Log,
        Category::Plant,
    ];

    /// Visual variants a renderer can pick a model or sprite by.
    pub fn variants(self) -> &'static [&'static str] {
        match self {
            Category::Tree => TREE_VARIANTS,
            Category::Flower => FLOWER_VARIANTS,
            Category::Mushroom => MUSHROOM_VARIANTS,
            Category::Log => LOG_VARIANTS,
            Category::Plant => PLANT_VARIANTS,
            Category::Ground => GROUND_VARIANTS,
        }
    }

    /// Whether placed objects of this category get a random heading.
    pub fn rotates(self) -> bool {
        matches!(self, Category::Tree)
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Tree => "tree",
            Category::Flower => "flower",
            Category::Mushroom => "mushroom",
            Category::Log => "log",
            Category::Plant => "plant",
            Category::Ground => "ground",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_variants() {
        for c in Category::SCATTERED.iter().chain([Category::Ground].iter()) {
            assert!(!c.variants().is_empty(), "{c:?} has no variants");
        }
    }

    #[test]
    fn only_trees_rotate() {
        assert!(Category::Tree.rotates());
        assert!(!Category::Flower.rotates());
        assert!(!Category::Ground.rotates());
    }
}

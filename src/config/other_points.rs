use serde::{Deserialize, Serialize};

use crate::{
    element::{AttribLookup, Element},
    error::LoadContext,
    types::{TallyStyle, Version},
};

/// Element name of an other-points category.
pub const TAG: &str = "OtherPts";

/// A user-defined point category such as breed points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OtherPoints {
    /// Category name, as runs refer to it.
    pub name: String,
    /// Description text.
    pub desc: String,
    /// How points are totalled.
    pub tally: TallyStyle,
    /// Points filled in for a new run entry.
    pub default_points: f64,
}

impl OtherPoints {
    /// Reads a category. `Count` is required.
    pub fn load(tree: &Element, _version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let name = ctx.required_name(tree, "Name")?;
        let default_points = tree.attrib("defValue").found().unwrap_or(0.0);
        let tally = match tree.attrib::<String>("Count") {
            AttribLookup::Found(raw) if !raw.is_empty() => match TallyStyle::from_attrib(&raw) {
                Some(tally) => tally,
                None => {
                    return ctx.invalid_choice(
                        TAG,
                        "Count",
                        &["All", "AllByEvent", "Level", "LevelByEvent"],
                    );
                }
            },
            _ => return ctx.missing(TAG, "Count"),
        };
        Some(Self {
            name,
            desc: tree.value().to_string(),
            tally,
            default_points,
        })
    }

    /// Writes the category under `parent`.
    pub fn save(&self, parent: &mut Element) -> bool {
        let other = parent.add_element(TAG);
        other.add_attrib("Name", &self.name);
        other.add_attrib("defValue", self.default_points);
        other.add_attrib("Count", self.tally.as_str());
        if !self.desc.is_empty() {
            other.set_value(&self.desc);
        }
        true
    }
}

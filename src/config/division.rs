use serde::{Deserialize, Serialize};

use super::{Named, event::Event, find_named, reorder_by, title::Title};
use crate::{
    element::Element,
    error::LoadContext,
    localization::{Localization, Message},
    types::{Version, WILDCARD},
};

/// Element name of a division.
pub const TAG: &str = "Division";
/// Element name of a level.
pub const LEVEL_TAG: &str = "Level";
/// Element name of a sublevel.
pub const SUB_LEVEL_TAG: &str = "SubLevel";

/// A leaf below a level. Runs record the sublevel name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubLevel {
    /// Sublevel name.
    pub name: String,
}

impl Named for SubLevel {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A class level. A level without sublevels is itself the leaf runs record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Level name.
    pub name: String,
    /// Leaves below this level, if any.
    pub sub_levels: Vec<SubLevel>,
}

impl Named for Level {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Level {
    /// A level without sublevels.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sub_levels: Vec::new(),
        }
    }

    /// True without sublevels.
    pub fn is_leaf(&self) -> bool {
        self.sub_levels.is_empty()
    }

    /// True when `name` is a leaf of this level: its own name when it has no
    /// sublevels, otherwise one of the sublevel names.
    pub fn has_leaf(&self, name: &str) -> bool {
        if self.is_leaf() {
            self.name == name
        } else {
            self.sub_levels.iter().any(|sub| sub.name == name)
        }
    }

    /// Reads a level and its sublevels.
    pub fn load(tree: &Element, _version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let name = ctx.required_name(tree, "Name")?;
        let mut level = Level::new(name);
        for child in tree.children_named(SUB_LEVEL_TAG) {
            // Bad sublevels are dropped without failing the level.
            if let Some(sub) = ctx.required_name(child, "Name") {
                level.sub_levels.push(SubLevel { name: sub });
            }
        }
        Some(level)
    }

    /// Writes the level under `parent`.
    pub fn save(&self, parent: &mut Element) -> bool {
        let level = parent.add_element(LEVEL_TAG);
        level.add_attrib("Name", &self.name);
        for sub in &self.sub_levels {
            level.add_element(SUB_LEVEL_TAG).add_attrib("Name", &sub.name);
        }
        true
    }

    /// Adds sublevels the new level has and this one lacks, then takes the
    /// new order. Returns true if a line was written to `info`.
    pub fn update(&mut self, indent: usize, new: &Level, info: &mut String, loc: &dyn Localization) -> bool {
        if self.name != new.name {
            return false;
        }
        let (indent_name, indent_buffer) = indents(indent);
        let mut text = String::new();
        if self.sub_levels != new.sub_levels {
            let mut added = 0;
            for sub in &new.sub_levels {
                if find_named(&self.sub_levels, &sub.name).is_none() {
                    added += 1;
                    self.sub_levels.push(sub.clone());
                }
            }
            reorder_by(&mut self.sub_levels, &new.sub_levels);
            text.push_str(&indent_buffer);
            if added > 0 {
                text.push_str(&loc.message(&Message::UpdateSubLevels { added }));
            } else {
                text.push_str(&loc.message(&Message::UpdateSubLevelsReordered));
            }
            text.push('\n');
        }
        if text.is_empty() {
            return false;
        }
        info.push_str(&format!("{indent_name}{}\n{text}", self.name));
        true
    }
}

/// Name prefix and body indent used in merge summaries.
pub(crate) fn indents(indent: usize) -> (String, String) {
    let base = "   ".repeat(indent.saturating_sub(1));
    (format!("{base}-"), format!("{base}   "))
}

/// A division and its levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division {
    /// Division name.
    pub name: String,
    /// Levels in display order.
    pub levels: Vec<Level>,
}

impl Named for Division {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Division {
    /// A division without levels.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            levels: Vec::new(),
        }
    }

    /// Loads a division. Documents before 12.0 nested the venue's titles
    /// here; those are moved into `legacy_titles`.
    pub fn load(
        tree: &Element,
        version: Version,
        legacy_titles: &mut Vec<Title>,
        ctx: &mut LoadContext<'_>,
    ) -> Option<Self> {
        let name = ctx.required_name(tree, "Name")?;
        let mut division = Division::new(name);
        for child in tree.children() {
            match child.name() {
                LEVEL_TAG => {
                    if let Some(level) = Level::load(child, version, ctx) {
                        division.levels.push(level);
                    }
                }
                super::title::TAG if version < Version::new(12, 0) => {
                    if let Some(title) = Title::load(child, version, ctx) {
                        if find_named(legacy_titles, &title.name).is_none() {
                            legacy_titles.push(title);
                        }
                    }
                }
                _ => {}
            }
        }
        Some(division)
    }

    /// Writes the division and its levels under `parent`.
    pub fn save(&self, parent: &mut Element) -> bool {
        let division = parent.add_element(TAG);
        division.add_attrib("Name", &self.name);
        self.levels.iter().all(|level| level.save(division))
    }

    /// Level lookup by level name.
    pub fn find_level(&self, name: &str) -> Option<&Level> {
        find_named(&self.levels, name)
    }

    /// Level owning the leaf `name`.
    pub fn find_sub_level(&self, name: &str) -> Option<&Level> {
        self.levels.iter().find(|level| level.has_leaf(name))
    }

    /// Level names, optionally accepting the wildcard.
    pub fn verify_level(&self, name: &str, allow_wildcard: bool) -> bool {
        (allow_wildcard && name == WILDCARD) || self.find_level(name).is_some()
    }

    /// Adds a level unless a leaf of that name already exists.
    pub fn add_level(&mut self, level: Level) -> bool {
        if level.name.is_empty() || self.find_sub_level(&level.name).is_some() {
            return false;
        }
        self.levels.push(level);
        true
    }

    /// Removes a level and any event scorings keyed to it.
    pub fn delete_level(&mut self, name: &str, events: &mut [Event]) -> bool {
        let Some(idx) = self.levels.iter().position(|level| level.name == name) else {
            return false;
        };
        for event in events.iter_mut() {
            event.delete_level(&self.name, name);
        }
        self.levels.remove(idx);
        true
    }

    /// Removes a sublevel. When the parent is left as a leaf whose name
    /// collides with another leaf, the parent is renamed with trailing `?`.
    /// Returns `(deleted, parent_renamed)`.
    pub fn delete_sub_level(&mut self, name: &str) -> (bool, bool) {
        let found = self.levels.iter().enumerate().find_map(|(lvl, level)| {
            level
                .sub_levels
                .iter()
                .position(|sub| sub.name == name)
                .map(|sub| (lvl, sub))
        });
        let Some((lvl, sub)) = found else {
            return (false, false);
        };
        let mut renamed = false;
        if self.levels[lvl].sub_levels.len() == 1 {
            let mut new_name = self.levels[lvl].name.clone();
            while self
                .levels
                .iter()
                .enumerate()
                .any(|(idx, level)| idx != lvl && level.has_leaf(&new_name))
            {
                new_name.push('?');
                renamed = true;
            }
            self.levels[lvl].name = new_name;
        }
        self.levels[lvl].sub_levels.remove(sub);
        (true, renamed)
    }

    /// Merges levels from `new`. Returns true if a line was written to `info`.
    pub fn update(&mut self, indent: usize, new: &Division, info: &mut String, loc: &dyn Localization) -> bool {
        let (indent_name, indent_buffer) = indents(indent);
        let mut text = String::new();
        if self.levels != new.levels {
            let mut detail = String::new();
            let (mut added, mut changed, mut skipped) = (0, 0, 0);
            for level in &new.levels {
                match self.levels.iter_mut().find(|old| old.name == level.name) {
                    Some(old) if *old == *level => skipped += 1,
                    Some(old) => {
                        if old.update(indent + 1, level, &mut detail, loc) {
                            changed += 1;
                        }
                    }
                    None => {
                        added += 1;
                        self.levels.push(level.clone());
                        detail.push_str(&format!("{indent_buffer}+{}\n", level.name));
                    }
                }
            }
            reorder_by(&mut self.levels, &new.levels);
            text.push_str(&indent_buffer);
            if added > 0 || changed > 0 {
                text.push_str(&loc.message(&Message::UpdateLevels {
                    added,
                    updated: changed,
                    skipped,
                }));
                text.push('\n');
                text.push_str(&detail);
            } else {
                text.push_str(&loc.message(&Message::UpdateLevelsReordered));
                text.push('\n');
            }
        }
        if text.is_empty() {
            return false;
        }
        info.push_str(&format!("{indent_name}{}\n{text}", self.name));
        true
    }
}

/// Division/level checks across a venue's divisions.
pub fn verify_level(divisions: &[Division], div: &str, level: &str) -> bool {
    if div == WILDCARD {
        // Any division defining the level will do.
        return divisions.iter().any(|d| d.verify_level(level, true));
    }
    find_named(divisions, div).is_some_and(|d| d.verify_level(level, true))
}

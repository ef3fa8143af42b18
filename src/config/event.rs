use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{Named, division::{Division, indents}, scoring::Scoring};
use crate::{
    element::Element,
    error::LoadContext,
    localization::{Localization, Message},
    types::{Date, Version, WILDCARD},
};

/// Element name of an event.
pub const TAG: &str = "Event";

/// A competition event and its scoring methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event name.
    pub name: String,
    /// Description text.
    pub desc: String,
    /// Runs may record a table.
    pub has_table: bool,
    /// Runs may record a partner.
    pub has_partner: bool,
    /// Runs may record a sub-name.
    pub has_sub_names: bool,
    /// Suggested sub-names.
    pub sub_names: BTreeSet<String>,
    /// Scoring methods in lookup order.
    pub scorings: Vec<Scoring>,
}

impl Named for Event {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Event {
    /// An event with no scoring methods.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Reads an event. Scoring methods are checked against `divisions`; a bad one drops only itself.
    pub fn load(
        divisions: &[Division],
        tree: &Element,
        version: Version,
        ctx: &mut LoadContext<'_>,
    ) -> Option<Self> {
        let mut event = Event {
            name: ctx.required_name(tree, "Name")?,
            has_table: ctx.opt_bool(tree, "hasTable", false)?,
            has_partner: ctx.opt_bool(tree, "hasPartner", false)?,
            has_sub_names: ctx.opt_bool(tree, "hasSubNames", false)?,
            ..Event::default()
        };
        for child in tree.children() {
            match child.name() {
                "Desc" => event.desc = child.value().to_string(),
                "SubName" => {
                    event.sub_names.insert(child.value().to_string());
                }
                super::scoring::TAG => {
                    // A broken scoring method drops only itself.
                    if let Some(scoring) = Scoring::load(divisions, child, version, ctx) {
                        event.scorings.push(scoring);
                    }
                }
                _ => {}
            }
        }
        Some(event)
    }

    /// Writes the event and its scoring methods under `parent`.
    pub fn save(&self, parent: &mut Element) -> bool {
        let event = parent.add_element(TAG);
        event.add_attrib("Name", &self.name);
        event.add_text_element("Desc", &self.desc);
        if self.has_table {
            event.add_attrib("hasTable", true);
        }
        if self.has_partner {
            event.add_attrib("hasPartner", true);
        }
        if self.has_sub_names {
            event.add_attrib("hasSubNames", true);
            for name in self.sub_names.iter().filter(|name| !name.is_empty()) {
                event.add_element("SubName").set_value(name);
            }
        }
        self.scorings.iter().all(|scoring| scoring.save(event))
    }

    /// Scoring methods for a division and level, falling back through the
    /// wildcards `(div, *)`, `(*, level)` and `(*, *)`. A date restricts the
    /// search to methods valid that day.
    pub fn find_all_scorings(
        &self,
        division: &str,
        level: &str,
        date: Option<Date>,
        title_points_only: bool,
    ) -> Vec<&Scoring> {
        let candidates: Vec<&Scoring> = self
            .scorings
            .iter()
            .filter(|scoring| date.is_none_or(|date| scoring.is_valid_on(date)))
            .collect();
        let mut found: Vec<&Scoring> = candidates
            .iter()
            .copied()
            .filter(|s| s.division == division && s.level == level)
            .collect();
        if found.is_empty() {
            let fallbacks = [(division, WILDCARD), (WILDCARD, level), (WILDCARD, WILDCARD)];
            if let Some(scoring) = fallbacks.iter().find_map(|(div, lvl)| {
                candidates
                    .iter()
                    .copied()
                    .find(|s| s.division == *div && s.level == *lvl)
            }) {
                found.push(scoring);
            }
        }
        if title_points_only {
            found.retain(|scoring| !scoring.title_points.is_empty());
        }
        found
    }

    /// First matching scoring method.
    pub fn find_scoring(&self, division: &str, level: &str, date: Option<Date>) -> Option<&Scoring> {
        self.find_all_scorings(division, level, date, false).into_iter().next()
    }

    /// True when some scoring method covers the division and level.
    pub fn verify_event(&self, division: &str, level: &str, date: Option<Date>) -> bool {
        self.find_scoring(division, level, date).is_some()
    }

    /// Retargets scoring methods from division `old` to `new`. Returns how many changed.
    pub fn rename_division(&mut self, old: &str, new: &str) -> usize {
        let mut count = 0;
        for scoring in self.scorings.iter_mut().filter(|s| s.division == old) {
            scoring.division = new.to_string();
            count += 1;
        }
        count
    }

    /// Drops scoring methods for `division`. Returns how many went.
    pub fn delete_division(&mut self, division: &str) -> usize {
        let before = self.scorings.len();
        self.scorings.retain(|s| s.division != division);
        before - self.scorings.len()
    }

    /// Renames a level in methods for `division` or the wildcard division.
    pub fn rename_level(&mut self, division: &str, old: &str, new: &str) -> usize {
        let mut count = 0;
        for scoring in self.scorings.iter_mut() {
            if scoring.level == old && (scoring.division == WILDCARD || scoring.division == division) {
                scoring.level = new.to_string();
                count += 1;
            }
        }
        count
    }

    /// Drops scoring methods for `level` in `division` or the wildcard division.
    pub fn delete_level(&mut self, division: &str, level: &str) -> usize {
        let before = self.scorings.len();
        self.scorings
            .retain(|s| !(s.level == level && (s.division == WILDCARD || s.division == division)));
        before - self.scorings.len()
    }

    /// Merges `new` into this event. Scoring methods are replaced wholesale
    /// after counting the differences by division and level.
    pub fn update(&mut self, indent: usize, new: &Event, info: &mut String, loc: &dyn Localization) -> bool {
        let (_, indent_buffer) = indents(indent);
        let mut changes = false;
        if self.desc != new.desc {
            self.desc.clone_from(&new.desc);
            changes = true;
        }
        if self.has_table != new.has_table {
            self.has_table = new.has_table;
            changes = true;
        }
        if self.has_partner != new.has_partner {
            self.has_partner = new.has_partner;
            changes = true;
        }
        if self.has_sub_names != new.has_sub_names {
            self.has_sub_names = new.has_sub_names;
            changes = true;
        }
        if self.sub_names != new.sub_names {
            self.sub_names.clone_from(&new.sub_names);
            changes = true;
        }

        if self.scorings != new.scorings {
            let same_key = |a: &Scoring, b: &Scoring| a.division == b.division && a.level == b.level;
            let (mut added, mut deleted, mut updated, mut skipped) = (0, 0, 0, 0);
            for old in &self.scorings {
                match new.scorings.iter().find(|s| same_key(old, s)) {
                    Some(s) if s == old => skipped += 1,
                    Some(_) => updated += 1,
                    None => deleted += 1,
                }
            }
            for s in &new.scorings {
                if !self.scorings.iter().any(|old| same_key(old, s)) {
                    added += 1;
                }
            }
            self.scorings.clone_from(&new.scorings);
            if added > 0 || deleted > 0 || updated > 0 {
                info.push_str(&format!(
                    "{indent_buffer}{}{}\n",
                    self.name,
                    loc.message(&Message::UpdateRules {
                        added,
                        deleted,
                        updated,
                        skipped
                    })
                ));
                changes = true;
            }
        }
        changes
    }
}

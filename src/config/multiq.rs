use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{Named, division::Division, event::Event, find_named};
use crate::{
    element::Element,
    error::LoadContext,
    localization::Message,
    types::{Date, Version},
};

/// Element name of a multi-Q.
pub const TAG: &str = "MultiQ";
/// Element name of one required run.
pub const ITEM_TAG: &str = "MultiQItem";

/// One run a multi-Q requires.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MultiQItem {
    /// Division of the run.
    pub division: String,
    /// Level of the run.
    pub level: String,
    /// Event of the run.
    pub event: String,
}

/// The division/level/event a run was entered in.
pub trait RunKey {
    /// Division name.
    fn division(&self) -> &str;
    /// Level name.
    fn level(&self) -> &str;
    /// Event name.
    fn event(&self) -> &str;
}

/// A bonus earned by qualifying in every listed run on one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiQ {
    /// Full name, as stored on runs.
    pub name: String,
    /// Abbreviation.
    pub short_name: String,
    /// First day the award counts.
    pub valid_from: Option<Date>,
    /// Last day the award counts.
    pub valid_to: Option<Date>,
    /// Runs that must all qualify.
    pub items: BTreeSet<MultiQItem>,
}

impl Named for MultiQ {
    fn name(&self) -> &str {
        &self.name
    }
}

impl MultiQ {
    /// A multi-Q with no items and an open validity window.
    pub fn new(name: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short_name: short_name.into(),
            ..Self::default()
        }
    }

    /// Loads a multi-Q, checking each item against the venue's divisions and events.
    pub fn load(
        divisions: &[Division],
        events: &[Event],
        tree: &Element,
        _version: Version,
        ctx: &mut LoadContext<'_>,
    ) -> Option<Self> {
        let mut multiq = MultiQ {
            name: ctx.required_name(tree, "Name")?,
            short_name: ctx.required_name(tree, "SName")?,
            valid_from: ctx.opt_date(tree, "ValidFrom")?,
            valid_to: ctx.opt_date(tree, "ValidTo")?,
            items: BTreeSet::new(),
        };
        for child in tree.children_named(ITEM_TAG) {
            let item = MultiQItem {
                division: ctx.required_name(child, "Div")?,
                level: ctx.required_name(child, "Level")?,
                event: ctx.required_name(child, "Event")?,
            };
            let Some(division) = find_named(divisions, &item.division) else {
                let detail = format!("{}{}", ctx.loc.message(&Message::InvalidDivLevel), item.division);
                return ctx.invalid(ITEM_TAG, "Div", Some(&detail));
            };
            let Some(level) = division.find_sub_level(&item.level) else {
                let detail = format!(
                    "{}{}/{}",
                    ctx.loc.message(&Message::InvalidDivLevel),
                    item.division,
                    item.level
                );
                return ctx.invalid(ITEM_TAG, "Level", Some(&detail));
            };
            let known = find_named(events, &item.event)
                .is_some_and(|event| event.verify_event(&item.division, &level.name, None));
            if !known {
                let detail = format!(
                    "{}{}/{}/{}",
                    ctx.loc.message(&Message::InvalidEventName),
                    item.division,
                    item.level,
                    item.event
                );
                return ctx.invalid(ITEM_TAG, "Event", Some(&detail));
            }
            multiq.items.insert(item);
        }
        Some(multiq)
    }

    /// Writes the multi-Q and its items under `parent`.
    pub fn save(&self, parent: &mut Element) -> bool {
        let multiq = parent.add_element(TAG);
        multiq.add_attrib("Name", &self.name);
        multiq.add_attrib("SName", &self.short_name);
        if let Some(from) = self.valid_from {
            multiq.add_attrib("ValidFrom", from);
        }
        if let Some(to) = self.valid_to {
            multiq.add_attrib("ValidTo", to);
        }
        for item in &self.items {
            let el = multiq.add_element(ITEM_TAG);
            el.add_attrib("Div", &item.division);
            el.add_attrib("Level", &item.level);
            el.add_attrib("Event", &item.event);
        }
        true
    }

    /// Inside the validity window. Open ends always match.
    pub fn is_valid_on(&self, date: Date) -> bool {
        !(self.valid_from.is_some_and(|from| date < from) || self.valid_to.is_some_and(|to| date > to))
    }

    /// Adds an item; empty names and duplicates are refused.
    pub fn add_item(&mut self, division: &str, level: &str, event: &str) -> bool {
        if division.is_empty() || level.is_empty() || event.is_empty() {
            return false;
        }
        self.items.insert(MultiQItem {
            division: division.into(),
            level: level.into(),
            event: event.into(),
        })
    }

    /// True when the same-day `runs` cover every item. Runs must already be
    /// filtered to qualifying runs on `date`.
    pub fn matches<R: RunKey>(&self, runs: &[&R], date: Date) -> bool {
        self.matched_runs(runs, date).is_some()
    }

    /// Indices into `runs` of the runs earning this multi-Q, one per item.
    /// A run fills at most one item.
    pub fn matched_runs<R: RunKey>(&self, runs: &[&R], date: Date) -> Option<Vec<usize>> {
        if self.items.is_empty() || runs.len() < self.items.len() || !self.is_valid_on(date) {
            return None;
        }
        let mut used = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let idx = runs.iter().enumerate().position(|(idx, run)| {
                !used.contains(&idx)
                    && run.division() == item.division
                    && run.level() == item.level
                    && run.event() == item.event
            })?;
            used.push(idx);
        }
        used.sort_unstable();
        Some(used)
    }

    fn retarget(&mut self, mut edit: impl FnMut(&mut MultiQItem) -> bool) -> usize {
        let mut count = 0;
        self.items = std::mem::take(&mut self.items)
            .into_iter()
            .map(|mut item| {
                if edit(&mut item) {
                    count += 1;
                }
                item
            })
            .collect();
        count
    }

    fn remove(&mut self, mut doomed: impl FnMut(&MultiQItem) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !doomed(item));
        before - self.items.len()
    }

    /// Retargets items from division `old` to `new`.
    pub fn rename_division(&mut self, old: &str, new: &str) -> usize {
        if old == new {
            return 0;
        }
        self.retarget(|item| {
            let hit = item.division == old;
            if hit {
                item.division = new.to_string();
            }
            hit
        })
    }

    /// Drops items in `division`.
    pub fn delete_division(&mut self, division: &str) -> usize {
        self.remove(|item| item.division == division)
    }

    /// Retargets items from level `old` to `new` within `division`.
    pub fn rename_level(&mut self, division: &str, old: &str, new: &str) -> usize {
        if old == new {
            return 0;
        }
        self.retarget(|item| {
            let hit = item.division == division && item.level == old;
            if hit {
                item.level = new.to_string();
            }
            hit
        })
    }

    /// Drops items for `level` in `division`.
    pub fn delete_level(&mut self, division: &str, level: &str) -> usize {
        self.remove(|item| item.division == division && item.level == level)
    }

    /// Retargets items from event `old` to `new`.
    pub fn rename_event(&mut self, old: &str, new: &str) -> usize {
        if old == new {
            return 0;
        }
        self.retarget(|item| {
            let hit = item.event == old;
            if hit {
                item.event = new.to_string();
            }
            hit
        })
    }

    /// Drops items for `event`.
    pub fn delete_event(&mut self, event: &str) -> usize {
        self.remove(|item| item.event == event)
    }
}

/// Sums a per-multi-Q edit across a venue's list.
pub fn for_each_multiq(multiqs: &mut [MultiQ], mut edit: impl FnMut(&mut MultiQ) -> usize) -> usize {
    multiqs.iter_mut().map(|multiq| edit(multiq)).sum()
}

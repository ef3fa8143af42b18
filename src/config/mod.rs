//! Venue rules and the other configuration lists a document carries.

/// Calendar plugins.
pub mod cal_site;
/// Divisions, levels and sublevels.
pub mod division;
/// Events and scoring lookup.
pub mod event;
/// Multi-Q definitions.
pub mod multiq;
/// Other-points categories.
pub mod other_points;
/// Scoring methods and their points tables.
pub mod scoring;
/// Venue titles.
pub mod title;
/// Venues and their merge.
pub mod venue;

use serde::{Deserialize, Serialize};

pub use cal_site::CalSite;
pub use division::{Division, Level, SubLevel};
pub use event::Event;
pub use multiq::{MultiQ, MultiQItem};
pub use other_points::OtherPoints;
pub use scoring::{LifetimePoints, PlaceInfo, Scoring, TitlePoints};
pub use title::{Title, TitleMultiple};
pub use venue::Venue;

use crate::{
    action::{ActionList, ConfigAction},
    element::{AttribLookup, Element},
    error::LoadContext,
    localization::{Localization, Message},
    types::{ConfigVersion, Version},
};

/// Element name of the configuration section.
pub const TAG: &str = "Configuration";
/// Element name of a fault type.
pub const FAULT_TAG: &str = "FaultType";

/// Entries keyed by a unique name.
pub trait Named {
    /// The unique name.
    fn name(&self) -> &str;
}

/// Entry named `name`.
pub fn find_named<'a, T: Named>(list: &'a [T], name: &str) -> Option<&'a T> {
    list.iter().find(|item| item.name() == name)
}

/// Mutable entry named `name`.
pub fn find_named_mut<'a, T: Named>(list: &'a mut [T], name: &str) -> Option<&'a mut T> {
    list.iter_mut().find(|item| item.name() == name)
}

/// Moves entries named in `order` to the front in that order. Others keep
/// their relative order after them.
pub fn reorder_by<T: Named>(list: &mut [T], order: &[T]) {
    list.sort_by_key(|item| {
        order
            .iter()
            .position(|o| o.name() == item.name())
            .unwrap_or(usize::MAX)
    });
}

/// The configuration section of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Whether the user accepts configuration updates.
    pub update: bool,
    /// Configuration version. Actions at or below it have already been applied.
    pub version: ConfigVersion,
    /// Pending migrations. Only update documents carry these; they are
    /// never written back.
    pub actions: ActionList,
    /// Calendar plugins.
    pub cal_sites: Vec<CalSite>,
    /// Fault type names offered when recording runs.
    pub faults: Vec<String>,
    /// Venues, sorted by name.
    pub venues: Vec<Venue>,
    /// Other-points categories.
    pub other_points: Vec<OtherPoints>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            update: true,
            version: 0,
            actions: ActionList::default(),
            cal_sites: Vec::new(),
            faults: Vec::new(),
            venues: Vec::new(),
            other_points: Vec::new(),
        }
    }
}

impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.cal_sites == other.cal_sites
            && self.faults == other.faults
            && self.venues == other.venues
            && self.other_points == other.other_points
    }
}

impl Named for CalSite {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for OtherPoints {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Title {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Config {
    /// Reads the configuration section. Any failing venue, action, calendar site or other-points entry fails the load.
    pub fn load(tree: &Element, version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let mut config = Config::default();
        match tree.attrib::<bool>("update") {
            AttribLookup::Invalid => return ctx.invalid_bool(TAG, "update"),
            found => config.update = found.found().unwrap_or(true),
        }
        config.version = tree.attrib("version").found().unwrap_or(0);

        for child in tree.children() {
            match child.name() {
                crate::action::TAG => {
                    let action = ConfigAction::load(child, version, ctx)?;
                    config.actions.push(action);
                }
                cal_site::TAG => config.cal_sites.push(CalSite::load(child, version, ctx)?),
                venue::TAG => {
                    let legacy = venue::LegacyLists {
                        faults: &mut config.faults,
                        other_points: &mut config.other_points,
                    };
                    let venue = Venue::load(child, version, legacy, ctx)?;
                    config.venues.push(venue);
                }
                FAULT_TAG => {
                    if !child.value().is_empty() {
                        config.faults.push(child.value().to_string());
                    }
                }
                other_points::TAG => config.other_points.push(OtherPoints::load(child, version, ctx)?),
                _ => {}
            }
        }
        config.sort_venues();
        Some(config)
    }

    /// Writes the configuration under `parent`. Pending actions are not written.
    pub fn save(&self, parent: &mut Element) -> bool {
        let config = parent.add_element(TAG);
        if !self.update {
            config.add_attrib("update", false);
        }
        config.add_attrib("version", self.version);
        if !self.cal_sites.iter().all(|site| site.save(config)) || !self.venues.iter().all(|venue| venue.save(config)) {
            return false;
        }
        for fault in &self.faults {
            config.add_text_element(FAULT_TAG, fault);
        }
        self.other_points.iter().all(|other| other.save(config))
    }

    /// Sorts venues by name.
    pub fn sort_venues(&mut self) {
        self.venues.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Venue named `name`.
    pub fn find_venue(&self, name: &str) -> Option<&Venue> {
        find_named(&self.venues, name)
    }

    /// Mutable venue named `name`.
    pub fn find_venue_mut(&mut self, name: &str) -> Option<&mut Venue> {
        find_named_mut(&mut self.venues, name)
    }

    /// Other-points category named `name`.
    pub fn find_other_points(&self, name: &str) -> Option<&OtherPoints> {
        find_named(&self.other_points, name)
    }

    /// Adds a venue, keeping the list sorted. Duplicate names are refused.
    pub fn add_venue(&mut self, venue: Venue) -> bool {
        if venue.name.is_empty() || self.find_venue(&venue.name).is_some() {
            return false;
        }
        self.venues.push(venue);
        self.sort_venues();
        true
    }

    /// Removes the venue. Returns false when there was none.
    pub fn delete_venue(&mut self, name: &str) -> bool {
        let before = self.venues.len();
        self.venues.retain(|venue| venue.name != name);
        before != self.venues.len()
    }

    /// Merges a newer master configuration into this one. Actions are not
    /// applied here. Returns true if anything changed.
    pub fn update(&mut self, indent: usize, new: &Config, info: &mut String, loc: &dyn Localization) -> bool {
        let mut text = String::new();

        let (mut added, mut updated, mut skipped) = (0, 0, 0);
        for site in &new.cal_sites {
            match find_named_mut(&mut self.cal_sites, &site.name) {
                Some(old) if *old == *site => skipped += 1,
                Some(old) => {
                    *old = site.clone();
                    updated += 1;
                }
                None => {
                    self.cal_sites.push(site.clone());
                    added += 1;
                }
            }
        }
        if added > 0 || updated > 0 {
            text.push_str(&loc.message(&Message::UpdateCalSites { added, updated, skipped }));
            text.push('\n');
        }

        let (mut added, mut skipped) = (0, 0);
        for fault in &new.faults {
            if self.faults.contains(fault) {
                skipped += 1;
            } else {
                self.faults.push(fault.clone());
                added += 1;
            }
        }
        if added > 0 {
            text.push_str(&loc.message(&Message::UpdateFaults { added, skipped }));
            text.push('\n');
        }

        let (mut added, mut updated, mut skipped) = (0, 0, 0);
        for other in &new.other_points {
            match find_named_mut(&mut self.other_points, &other.name) {
                Some(old) if *old == *other => skipped += 1,
                Some(old) => {
                    *old = other.clone();
                    updated += 1;
                }
                None => {
                    self.other_points.push(other.clone());
                    added += 1;
                }
            }
        }
        if added > 0 || updated > 0 {
            text.push_str(&loc.message(&Message::UpdateOtherPts { added, updated, skipped }));
            text.push('\n');
        }

        let mut detail = String::new();
        let (mut added, mut updated, mut skipped) = (0, 0, 0);
        for venue in &new.venues {
            match find_named_mut(&mut self.venues, &venue.name) {
                Some(old) if *old == *venue => skipped += 1,
                Some(old) => {
                    if old.update(indent + 1, venue, &mut detail, loc) {
                        updated += 1;
                    }
                }
                None => {
                    self.venues.push(venue.clone());
                    added += 1;
                    detail.push_str(&format!("+{}\n", venue.name));
                }
            }
        }
        self.sort_venues();
        if added > 0 || updated > 0 {
            text.push_str(&loc.message(&Message::UpdateVenues { added, updated, skipped }));
            text.push('\n');
            text.push_str(&detail);
        }

        if new.version > self.version {
            self.version = new.version;
        }
        if !new.update {
            self.update = false;
        }

        let changed = !text.is_empty();
        if changed {
            tracing::info!(version = self.version, "configuration updated");
            info.push_str(&text);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorLog, localization::English, types::CURRENT_DOC_VERSION};

    #[test]
    fn reorder_keeps_unlisted_entries_last() {
        let mut mine = vec![Title::new("C"), Title::new("A"), Title::new("X"), Title::new("B")];
        let order = vec![Title::new("A"), Title::new("B"), Title::new("C")];
        reorder_by(&mut mine, &order);
        let names: Vec<_> = mine.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C", "X"]);
    }

    #[test]
    fn update_merges_lists_and_takes_newer_version() {
        let mut mine = Config {
            version: 3,
            faults: vec!["Bar".into()],
            ..Config::default()
        };
        mine.venues.push(Venue::new("USDAA"));
        let mut new = mine.clone();
        new.version = 5;
        new.faults.push("Refusal".into());
        new.venues.push(Venue::new("AKC"));

        let mut info = String::new();
        assert!(mine.update(0, &new, &mut info, &English));
        assert_eq!(mine.version, 5);
        assert_eq!(mine.faults, ["Bar", "Refusal"]);
        assert_eq!(mine.venues[0].name, "AKC");
        assert_eq!(
            info,
            "Faults: 1 added, 1 identical\nVenues: 1 added, 0 updated, 1 identical\n+AKC\n"
        );

        let mut again = String::new();
        assert!(!mine.update(0, &new, &mut again, &English));
        assert!(again.is_empty());
    }

    #[test]
    fn save_omits_actions_and_default_update_flag() {
        let mut config = Config {
            version: 7,
            ..Config::default()
        };
        config.actions.push(ConfigAction::DeleteCalPlugin {
            version: 8,
            name: "site".into(),
        });
        let mut root = Element::new("AgilityBook");
        assert!(config.save(&mut root));
        let tree = &root.children()[0];
        assert_eq!(tree.raw_attrib("update"), None);
        assert!(tree.find_child(crate::action::TAG).is_none());

        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        let loaded = Config::load(tree, CURRENT_DOC_VERSION, &mut ctx).expect("loads");
        assert_eq!(loaded, config);
        assert!(loaded.actions.is_empty());
    }
}

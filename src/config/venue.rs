use serde::{Deserialize, Serialize};

use super::{
    Named,
    division::{self, Division, indents},
    event::{self, Event},
    find_named, find_named_mut,
    multiq::{self, MultiQ},
    other_points::{self, OtherPoints},
    reorder_by,
    scoring::Scoring,
    title::{self, Title},
};
use crate::{
    element::Element,
    error::LoadContext,
    localization::{Localization, Message},
    types::{Date, Version},
};

/// Element name of a venue.
pub const TAG: &str = "Venue";

/// A sanctioning organization and its rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    /// Short name, as clubs and records refer to it.
    pub name: String,
    /// Full name.
    pub long_name: String,
    /// Home page.
    pub url: String,
    /// Description text.
    pub desc: String,
    /// Icon index.
    pub icon: i16,
    /// Titles awarded.
    pub titles: Vec<Title>,
    /// Divisions, before any event.
    pub divisions: Vec<Division>,
    /// Events.
    pub events: Vec<Event>,
    /// Multi-Q awards.
    pub multiqs: Vec<MultiQ>,
}

impl Named for Venue {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Config-level lists that documents before 3.0 kept under each venue.
pub struct LegacyLists<'a> {
    /// Fault types found under the venue.
    pub faults: &'a mut Vec<String>,
    /// Other-points categories found under the venue.
    pub other_points: &'a mut Vec<OtherPoints>,
}

impl Venue {
    /// An empty venue.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Reads a venue and migrates older layouts. Bad children are logged and dropped.
    pub fn load(
        tree: &Element,
        version: Version,
        legacy: LegacyLists<'_>,
        ctx: &mut LoadContext<'_>,
    ) -> Option<Self> {
        let mut venue = Venue {
            name: ctx.required_name(tree, "Name")?,
            long_name: tree.attrib("LongName").found().unwrap_or_default(),
            url: tree.attrib("URL").found().unwrap_or_default(),
            icon: tree.attrib("icon").found().unwrap_or(0),
            ..Venue::default()
        };

        // Children load best-effort: a bad entry is logged and dropped.
        for child in tree.children() {
            match child.name() {
                "Desc" => venue.desc = child.value().to_string(),
                title::TAG => {
                    if let Some(title) = Title::load(child, version, ctx) {
                        venue.titles.push(title);
                    }
                }
                division::TAG => {
                    // Scoring methods are validated against divisions, so
                    // every division must precede the first event.
                    if !venue.events.is_empty() {
                        ctx.log(Message::InvalidDocStructure("divisions must precede events"));
                        return None;
                    }
                    if let Some(div) = Division::load(child, version, &mut venue.titles, ctx) {
                        venue.divisions.push(div);
                    }
                }
                event::TAG => {
                    if let Some(event) = Event::load(&venue.divisions, child, version, ctx) {
                        venue.events.push(event);
                    }
                }
                multiq::TAG => {
                    if let Some(multiq) = MultiQ::load(&venue.divisions, &venue.events, child, version, ctx) {
                        venue.multiqs.push(multiq);
                    }
                }
                "FaultType" if version < Version::new(3, 0) => {
                    let fault = child.value();
                    if !fault.is_empty() && !legacy.faults.iter().any(|f| f == fault) {
                        legacy.faults.push(fault.to_string());
                    }
                }
                other_points::TAG if version < Version::new(3, 0) => {
                    if let Some(other) = OtherPoints::load(child, version, ctx) {
                        legacy.other_points.push(other);
                    }
                }
                _ => {}
            }
        }

        if version < Version::new(11, 0) {
            venue.convert_double_qs(tree);
        }
        if version < Version::new(14, 4) {
            // From 12.6 to 14.3 the venue named its single lifetime total.
            if let Some(name) = tree.raw_attrib("LifetimeName").filter(|name| !name.is_empty()) {
                for scoring in venue.events.iter_mut().flat_map(|event| event.scorings.iter_mut()) {
                    for row in scoring.lifetime_points.iter_mut().filter(|row| row.name.is_empty()) {
                        row.name = name.to_string();
                    }
                    scoring.sort_points();
                }
            }
        }
        Some(venue)
    }

    /// Documents before 11.0 flagged double-Q runs on each scoring method;
    /// those flags become one "Double Q" multi-Q.
    fn convert_double_qs(&mut self, tree: &Element) {
        let mut double_q = MultiQ::new("Double Q", "QQ");
        for event in tree.children_named(event::TAG) {
            let Some(event_name) = event.raw_attrib("Name") else {
                continue;
            };
            for scoring in event.children_named(super::scoring::TAG) {
                if scoring.attrib::<bool>("doubleQ").found() == Some(true) {
                    double_q.add_item(
                        scoring.raw_attrib("Division").unwrap_or_default(),
                        scoring.raw_attrib("Level").unwrap_or_default(),
                        event_name,
                    );
                }
            }
        }
        if double_q.items.len() > 1 && find_named(&self.multiqs, &double_q.name).is_none() {
            self.multiqs.push(double_q);
        }
    }

    /// Writes the venue and its lists under `parent`.
    pub fn save(&self, parent: &mut Element) -> bool {
        let venue = parent.add_element(TAG);
        venue.add_attrib("Name", &self.name);
        if !self.long_name.is_empty() {
            venue.add_attrib("LongName", &self.long_name);
        }
        if !self.url.is_empty() {
            venue.add_attrib("URL", &self.url);
        }
        venue.add_attrib("icon", self.icon);
        venue.add_text_element("Desc", &self.desc);
        self.titles.iter().all(|t| t.save(venue))
            && self.divisions.iter().all(|d| d.save(venue))
            && self.events.iter().all(|e| e.save(venue))
            && self.multiqs.iter().all(|m| m.save(venue))
    }

    /// Division named `name`.
    pub fn find_division(&self, name: &str) -> Option<&Division> {
        find_named(&self.divisions, name)
    }

    /// Event named `name`.
    pub fn find_event_named(&self, name: &str) -> Option<&Event> {
        find_named(&self.events, name)
    }

    /// Title named `name`.
    pub fn find_title(&self, name: &str) -> Option<&Title> {
        find_named(&self.titles, name)
    }

    /// Multi-Q by full or short name.
    pub fn find_multiq(&self, name: &str, use_short_name: bool) -> Option<&MultiQ> {
        self.multiqs.iter().find(|m| {
            if use_short_name {
                m.short_name == name
            } else {
                m.name == name
            }
        })
    }

    /// Resolves the scoring method for a run. `level` is the leaf the run
    /// recorded; it is mapped to its parent level first.
    pub fn find_event(
        &self,
        event: &str,
        division: &str,
        level: &str,
        date: Option<Date>,
    ) -> Option<(&Event, &Scoring)> {
        let parent = self.find_division(division)?.find_sub_level(level)?;
        let event = self.find_event_named(event)?;
        let scoring = event.find_scoring(division, &parent.name, date)?;
        Some((event, scoring))
    }

    /// True when the run's event, division and level resolve to a scoring method.
    pub fn verify_event(&self, event: &str, division: &str, level: &str, date: Option<Date>) -> bool {
        self.find_event(event, division, level, date).is_some()
    }

    /// Merges `new` into this venue, writing an indented summary to `info`.
    pub fn update(&mut self, indent: usize, new: &Venue, info: &mut String, loc: &dyn Localization) -> bool {
        if self.name != new.name {
            return false;
        }
        let (indent_name, indent_buffer) = indents(indent);
        let mut changes = false;
        for (mine, theirs) in [
            (&mut self.long_name, &new.long_name),
            (&mut self.url, &new.url),
            (&mut self.desc, &new.desc),
        ] {
            if mine != theirs {
                mine.clone_from(theirs);
                changes = true;
            }
        }
        if self.icon != new.icon {
            self.icon = new.icon;
            changes = true;
        }

        let mut text = String::new();
        if self.titles != new.titles {
            let (mut added, mut updated, mut skipped) = (0, 0, 0);
            for title in &new.titles {
                match find_named_mut(&mut self.titles, &title.name) {
                    Some(old) if *old == *title => skipped += 1,
                    Some(old) => {
                        *old = title.clone();
                        updated += 1;
                    }
                    None => {
                        self.titles.push(title.clone());
                        added += 1;
                    }
                }
            }
            reorder_by(&mut self.titles, &new.titles);
            text.push_str(&indent_buffer);
            if added > 0 || updated > 0 {
                text.push_str(&loc.message(&Message::UpdateTitles { added, updated, skipped }));
            } else {
                text.push_str(&loc.message(&Message::UpdateTitlesReordered));
            }
            text.push('\n');
        }

        if self.divisions != new.divisions {
            let mut detail = String::new();
            let (mut added, mut updated, mut skipped) = (0, 0, 0);
            for div in &new.divisions {
                match find_named_mut(&mut self.divisions, &div.name) {
                    Some(old) if *old == *div => skipped += 1,
                    Some(old) => {
                        if old.update(indent + 1, div, &mut detail, loc) {
                            updated += 1;
                        }
                    }
                    None => {
                        self.divisions.push(div.clone());
                        added += 1;
                        detail.push_str(&format!("{indent_buffer}+{}\n", div.name));
                    }
                }
            }
            reorder_by(&mut self.divisions, &new.divisions);
            text.push_str(&indent_buffer);
            if added > 0 || updated > 0 {
                text.push_str(&loc.message(&Message::UpdateDivisions { added, updated, skipped }));
                text.push('\n');
                text.push_str(&detail);
            } else {
                text.push_str(&loc.message(&Message::UpdateDivisionsReordered));
                text.push('\n');
            }
        }

        if self.events != new.events {
            let mut detail = String::new();
            let (mut added, mut updated, mut skipped) = (0, 0, 0);
            for event in &new.events {
                match find_named_mut(&mut self.events, &event.name) {
                    Some(old) if *old == *event => skipped += 1,
                    Some(old) => {
                        if old.update(indent + 1, event, &mut detail, loc) {
                            updated += 1;
                        }
                    }
                    None => {
                        self.events.push(event.clone());
                        added += 1;
                        detail.push_str(&format!("{indent_buffer}+{}\n", event.name));
                    }
                }
            }
            reorder_by(&mut self.events, &new.events);
            text.push_str(&indent_buffer);
            if added > 0 || updated > 0 {
                text.push_str(&loc.message(&Message::UpdateEvents { added, updated, skipped }));
                text.push('\n');
                text.push_str(&detail);
            } else {
                text.push_str(&loc.message(&Message::UpdateEventsReordered));
                text.push('\n');
            }
        }

        if self.multiqs != new.multiqs {
            let skipped = self.multiqs.iter().filter(|m| new.multiqs.contains(m)).count();
            let deleted = self.multiqs.len() - skipped;
            let added = new.multiqs.iter().filter(|m| !self.multiqs.contains(m)).count();
            self.multiqs.clone_from(&new.multiqs);
            text.push_str(&indent_buffer);
            if added > 0 || deleted > 0 {
                text.push_str(&self.name);
                text.push_str(&loc.message(&Message::UpdateMultiqs { added, deleted, skipped }));
            } else {
                text.push_str(&loc.message(&Message::UpdateMultiqsReordered));
            }
            text.push('\n');
        }

        if !text.is_empty() {
            changes = true;
            info.push_str(&format!("{indent_name}{}\n{text}", self.name));
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::division::{Level, SubLevel},
        localization::English,
        types::ScoringStyle,
    };

    pub(crate) fn agility_venue() -> Venue {
        let mut venue = Venue::new("AKC");
        let mut div = Division::new("Standard");
        div.levels.push(Level {
            name: "Novice".into(),
            sub_levels: vec![SubLevel { name: "Novice A".into() }, SubLevel { name: "Novice B".into() }],
        });
        div.levels.push(Level::new("Open"));
        venue.divisions.push(div);
        let mut event = Event::new("Jumpers");
        event.scorings.push(Scoring::new("Standard", "Novice", ScoringStyle::FaultsThenTime));
        event.scorings.push(Scoring::new("*", "Open", ScoringStyle::TimePlusFaults));
        venue.events.push(event);
        venue
    }

    #[test]
    fn find_event_maps_sub_level_to_parent() {
        let venue = agility_venue();
        let (event, scoring) = venue
            .find_event("Jumpers", "Standard", "Novice A", None)
            .expect("sub-level resolves");
        assert_eq!(event.name, "Jumpers");
        assert_eq!(scoring.level, "Novice");
        assert!(venue.verify_event("Jumpers", "Standard", "Open", None));
        // A level with sublevels is not itself a leaf.
        assert!(!venue.verify_event("Jumpers", "Standard", "Novice", None));
    }

    #[test]
    fn division_after_event_is_rejected() {
        let mut root = Element::new("Root");
        agility_venue().save(&mut root);
        let mut tree = root.children()[0].clone();
        tree.add_element(division::TAG).add_attrib("Name", "Preferred");

        let mut faults = Vec::new();
        let mut others = Vec::new();
        let mut log = crate::error::ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        let legacy = LegacyLists {
            faults: &mut faults,
            other_points: &mut others,
        };
        assert!(Venue::load(&tree, Version::new(15, 3), legacy, &mut ctx).is_none());
    }

    #[test]
    fn update_adds_titles_and_reports() {
        let mut old = agility_venue();
        let mut new = agility_venue();
        new.titles.push(Title::new("NA"));

        let mut info = String::new();
        assert!(old.update(1, &new, &mut info, &English));
        assert_eq!(old, new);
        assert_eq!(info, "-AKC\n   Titles: 1 added, 0 updated, 0 identical\n");
    }

    #[test]
    fn venue_lifetime_name_is_applied_to_unnamed_rows() {
        let mut venue = agility_venue();
        venue.events[0].scorings[1]
            .lifetime_points
            .push(crate::config::LifetimePoints::new("", 1.0, 0.0));
        let mut root = Element::new("Root");
        venue.save(&mut root);
        let mut tree = root.children()[0].clone();
        tree.add_attrib("LifetimeName", "Champion");

        let mut faults = Vec::new();
        let mut others = Vec::new();
        let mut log = crate::error::ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        for (version, expected) in [(Version::new(13, 0), "Champion"), (Version::new(15, 3), "")] {
            let legacy = LegacyLists {
                faults: &mut faults,
                other_points: &mut others,
            };
            let loaded = Venue::load(&tree, version, legacy, &mut ctx).expect("loads");
            assert_eq!(loaded.events[0].scorings[1].lifetime_points[0].name, expected);
        }
    }
}

//! Free-form notes about clubs, judges and locations.

use serde::{Deserialize, Serialize};

use crate::{element::Element, error::LoadContext, types::Version};

/// Element name of the info block.
pub const TAG: &str = "Info";
/// Element name of a club note.
pub const CLUB_TAG: &str = "ClubInfo";
/// Element name of a judge note.
pub const JUDGE_TAG: &str = "JudgeInfo";
/// Element name of a location note.
pub const LOCATION_TAG: &str = "LocationInfo";

/// A named note. Hidden items stay in the file but drop out of pick lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoItem {
    /// Club, judge or location name.
    pub name: String,
    /// Free text.
    pub comment: String,
    /// Shown in pick lists.
    pub visible: bool,
}

impl InfoItem {
    /// A visible item with no comment.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: String::new(),
            visible: true,
        }
    }

    /// Reads one info item.
    pub fn load(tree: &Element, _version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let Some(name) = tree.attrib::<String>("Name").found() else {
            return ctx.missing(tree.name(), "Name");
        };
        Some(InfoItem {
            name,
            comment: tree.value().to_string(),
            visible: ctx.opt_bool(tree, "Visible", true)?,
        })
    }

    /// Appends one info item as `tag`.
    pub fn save(&self, parent: &mut Element, tag: &str) -> bool {
        let item = parent.add_element(tag);
        item.add_attrib("Name", &self.name);
        if !self.visible {
            item.add_attrib("Visible", false);
        }
        if !self.comment.is_empty() {
            item.set_value(&self.comment);
        }
        true
    }

    /// Worth writing: a comment, or hidden.
    pub fn has_data(&self) -> bool {
        !self.comment.is_empty() || !self.visible
    }
}

/// The three info lists of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    /// Club notes.
    pub clubs: Vec<InfoItem>,
    /// Judge notes.
    pub judges: Vec<InfoItem>,
    /// Location notes.
    pub locations: Vec<InfoItem>,
}

impl Info {
    /// Reads the `Info` block.
    pub fn load(tree: &Element, version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let mut info = Info::default();
        for child in tree.children() {
            let list = match child.name() {
                CLUB_TAG => &mut info.clubs,
                JUDGE_TAG => &mut info.judges,
                LOCATION_TAG => &mut info.locations,
                _ => continue,
            };
            list.push(InfoItem::load(child, version, ctx)?);
        }
        for list in [&mut info.clubs, &mut info.judges, &mut info.locations] {
            list.sort_by(|a, b| a.name.cmp(&b.name));
        }
        Some(info)
    }

    /// Writes the `Info` element. Items without data are skipped.
    pub fn save(&self, parent: &mut Element) -> bool {
        let info = parent.add_element(TAG);
        [
            (CLUB_TAG, &self.clubs),
            (JUDGE_TAG, &self.judges),
            (LOCATION_TAG, &self.locations),
        ]
        .into_iter()
        .all(|(tag, list)| list.iter().filter(|item| item.has_data()).all(|item| item.save(info, tag)))
    }

    /// True when all three lists are empty.
    pub fn is_empty(&self) -> bool {
        self.clubs.is_empty() && self.judges.is_empty() && self.locations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorLog, localization::English, types::CURRENT_DOC_VERSION};

    #[test]
    fn items_without_data_are_not_written() {
        let mut info = Info::default();
        let mut judge = InfoItem::new("Smith");
        judge.comment = "strict on contacts".into();
        info.judges.push(judge);
        let mut club = InfoItem::new("Bay Team");
        club.visible = false;
        info.clubs.push(club);
        info.locations.push(InfoItem::new("Fairgrounds"));

        let mut root = Element::new("AgilityBook");
        assert!(info.save(&mut root));
        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        let loaded = Info::load(&root.children()[0], CURRENT_DOC_VERSION, &mut ctx).expect("loads");
        info.locations.clear();
        assert_eq!(loaded, info);
    }

    #[test]
    fn name_is_required() {
        let mut root = Element::new(TAG);
        root.add_element(CLUB_TAG).set_value("no name");
        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        assert!(Info::load(&root, CURRENT_DOC_VERSION, &mut ctx).is_none());
        assert!(log.text().contains("ClubInfo"));
    }
}

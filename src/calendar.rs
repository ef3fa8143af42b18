//! Calendar entries and the training log.

use serde::{Deserialize, Serialize};

use crate::{
    element::{AttribLookup, Element},
    error::LoadContext,
    types::{Accommodations, Date, EntryStatus, Version},
};

/// Element name of a calendar entry.
pub const TAG: &str = "Calendar";
/// Element name of a training-log entry.
pub const TRAINING_TAG: &str = "Training";

/// An upcoming or past trial on the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    /// First day.
    pub start: Date,
    /// Last day.
    pub end: Date,
    /// Entries open.
    pub opening: Option<Date>,
    /// Entry draw.
    pub draw: Option<Date>,
    /// Entries close.
    pub closing: Option<Date>,
    /// Dates not yet confirmed.
    pub tentative: bool,
    /// Trial site.
    pub location: String,
    /// Hosting club.
    pub club: String,
    /// Venue the trial is held under.
    pub venue: String,
    /// Entry status.
    pub entered: EntryStatus,
    /// Lodging status.
    pub accommodation: Accommodations,
    /// Entry confirmation number.
    pub confirmation: String,
    /// Trial secretary address.
    pub secretary_email: String,
    /// Premium list link.
    pub premium_url: String,
    /// Online entry link.
    pub online_url: String,
    /// Free text.
    pub note: String,
}

impl Calendar {
    /// An entry spanning `start` to `end` with nothing else set.
    pub fn new(start: Date, end: Date) -> Self {
        Self {
            start,
            end,
            opening: None,
            draw: None,
            closing: None,
            tentative: false,
            location: String::new(),
            club: String::new(),
            venue: String::new(),
            entered: EntryStatus::Not,
            accommodation: Accommodations::None,
            confirmation: String::new(),
            secretary_email: String::new(),
            premium_url: String::new(),
            online_url: String::new(),
            note: String::new(),
        }
    }

    /// Reads one entry. Version 1 documents used `PlanOn` instead of `Entered`.
    pub fn load(tree: &Element, version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let mut cal = Calendar::new(ctx.required_date(tree, "DateStart")?, ctx.required_date(tree, "DateEnd")?);
        cal.opening = ctx.opt_date(tree, "DateOpening")?;
        cal.draw = ctx.opt_date(tree, "DateDraw")?;
        cal.closing = ctx.opt_date(tree, "DateClosing")?;
        cal.tentative = ctx.opt_bool(tree, "isTentative", false)?;
        cal.location = tree.attrib("Location").found().unwrap_or_default();
        cal.club = tree.attrib("Club").found().unwrap_or_default();
        cal.venue = tree.attrib("Venue").found().unwrap_or_default();

        if version == Version::new(1, 0) {
            if let AttribLookup::Found(plan) = tree.attrib::<String>("PlanOn") {
                cal.entered = if plan == "y" {
                    EntryStatus::Planning
                } else {
                    EntryStatus::Not
                };
            }
        } else if version >= Version::new(2, 0) {
            if let Some(raw) = tree.raw_attrib("Entered") {
                let Some(entered) = EntryStatus::from_attrib(raw) else {
                    return ctx.invalid_choice(TAG, "Entered", &["E", "O", "P", "N"]);
                };
                cal.entered = entered;
            }
            if let Some(raw) = tree.raw_attrib("Acc") {
                let Some(accommodation) = Accommodations::from_attrib(raw) else {
                    return ctx.invalid_choice(TAG, "Acc", &["N", "T", "C"]);
                };
                cal.accommodation = accommodation;
            }
            cal.confirmation = tree.attrib("Confirm").found().unwrap_or_default();
        }
        cal.secretary_email = tree.attrib("SecEmail").found().unwrap_or_default();
        cal.premium_url = tree.attrib("PremiumURL").found().unwrap_or_default();
        cal.online_url = tree.attrib("OnlineURL").found().unwrap_or_default();
        cal.note = tree.value().to_string();
        Some(cal)
    }

    /// Writes the entry under `parent`.
    pub fn save(&self, parent: &mut Element) -> bool {
        let cal = parent.add_element(TAG);
        cal.add_attrib("DateStart", self.start);
        cal.add_attrib("DateEnd", self.end);
        for (attrib, date) in [
            ("DateOpening", self.opening),
            ("DateDraw", self.draw),
            ("DateClosing", self.closing),
        ] {
            if let Some(date) = date {
                cal.add_attrib(attrib, date);
            }
        }
        if self.tentative {
            cal.add_attrib("isTentative", true);
        }
        cal.add_attrib("Location", &self.location);
        cal.add_attrib("Club", &self.club);
        cal.add_attrib("Venue", &self.venue);
        cal.add_attrib("Entered", self.entered.as_str());
        cal.add_attrib("Acc", self.accommodation.as_str());
        for (attrib, text) in [
            ("Confirm", &self.confirmation),
            ("SecEmail", &self.secretary_email),
            ("PremiumURL", &self.premium_url),
            ("OnlineURL", &self.online_url),
        ] {
            if !text.is_empty() {
                cal.add_attrib(attrib, text);
            }
        }
        if !self.note.is_empty() {
            cal.set_value(&self.note);
        }
        true
    }

    /// True when the whole event is over before `date`.
    pub fn is_before(&self, date: Date) -> bool {
        self.start < date && self.end < date
    }
}

/// One training-log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Training {
    /// Session date.
    pub date: Date,
    /// What was trained.
    pub name: String,
    /// Finer category under `name`.
    pub sub_name: String,
    /// Free text.
    pub note: String,
}

impl Training {
    /// An entry with no sub-name or note.
    pub fn new(date: Date, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
            sub_name: String::new(),
            note: String::new(),
        }
    }

    /// Reads one entry. The note is the element text.
    pub fn load(tree: &Element, _version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let mut training = Training::new(ctx.required_date(tree, "Date")?, "");
        training.name = tree.attrib("Name").found().unwrap_or_default();
        training.sub_name = tree.attrib("SubName").found().unwrap_or_default();
        training.note = tree.value().to_string();
        Some(training)
    }

    /// Writes the entry under `parent`.
    pub fn save(&self, parent: &mut Element) -> bool {
        let training = parent.add_element(TRAINING_TAG);
        training.add_attrib("Date", self.date);
        if !self.name.is_empty() {
            training.add_attrib("Name", &self.name);
        }
        if !self.sub_name.is_empty() {
            training.add_attrib("SubName", &self.sub_name);
        }
        if !self.note.is_empty() {
            training.set_value(&self.note);
        }
        true
    }
}

/// Stable sort by start date.
pub fn sort_calendar(entries: &mut [Calendar]) {
    entries.sort_by_key(|cal| cal.start);
}

/// Stable sort by date.
pub fn sort_training(entries: &mut [Training]) {
    entries.sort_by_key(|training| training.date);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorLog, localization::English, types::CURRENT_DOC_VERSION};

    fn day(d: u32) -> Date {
        Date::from_ymd_opt(2025, 5, d).unwrap()
    }

    #[test]
    fn calendar_survives_save() {
        let mut cal = Calendar::new(day(10), day(11));
        cal.closing = Some(day(1));
        cal.tentative = true;
        cal.venue = "USDAA".into();
        cal.entered = EntryStatus::Pending;
        cal.accommodation = Accommodations::Todo;
        cal.premium_url = "https://example.org/premium.pdf".into();
        cal.note = "bring crate".into();

        let mut root = Element::new("AgilityBook");
        assert!(cal.save(&mut root));
        let tree = &root.children()[0];
        assert_eq!(tree.raw_attrib("DateOpening"), None);
        assert_eq!(tree.raw_attrib("Entered"), Some("O"));

        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        assert_eq!(Calendar::load(tree, CURRENT_DOC_VERSION, &mut ctx), Some(cal));
    }

    #[test]
    fn first_format_used_plan_on() {
        let mut tree = Element::new(TAG);
        tree.add_attrib("DateStart", day(1));
        tree.add_attrib("DateEnd", day(2));
        tree.add_attrib("PlanOn", "y");
        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        let cal = Calendar::load(&tree, Version::new(1, 0), &mut ctx).expect("loads");
        assert_eq!(cal.entered, EntryStatus::Planning);
    }

    #[test]
    fn bad_entry_state_lists_choices() {
        let mut tree = Element::new(TAG);
        tree.add_attrib("DateStart", day(1));
        tree.add_attrib("DateEnd", day(2));
        tree.add_attrib("Entered", "X");
        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        assert!(Calendar::load(&tree, CURRENT_DOC_VERSION, &mut ctx).is_none());
        assert!(log.text().contains("E, O, P, N"));
    }

    #[test]
    fn training_requires_a_date() {
        let mut training = Training::new(day(3), "Weaves");
        training.sub_name = "12 poles".into();
        let mut root = Element::new("AgilityBook");
        assert!(training.save(&mut root));
        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        assert_eq!(
            Training::load(&root.children()[0], CURRENT_DOC_VERSION, &mut ctx),
            Some(training)
        );

        let mut undated = Element::new(TRAINING_TAG);
        undated.add_attrib("Name", "Contacts");
        assert!(Training::load(&undated, CURRENT_DOC_VERSION, &mut ctx).is_none());
    }
}

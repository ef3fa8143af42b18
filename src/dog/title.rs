use serde::{Deserialize, Serialize};

use crate::{
    config::{Config, Title as ConfigTitle, TitleMultiple},
    element::{AttribLookup, Element},
    error::LoadContext,
    types::{Date, Version},
};

/// Element name of a dog title.
pub const TAG: &str = "Title";

/// A title a dog has earned, or is working toward when it has no date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DogTitle {
    /// Venue awarding the title.
    pub venue: String,
    /// Title name.
    pub name: String,
    /// Date earned. `None` while in progress.
    pub date: Option<Date>,
    /// Instance number of a repeating title.
    pub instance: i16,
    /// Show the number on the first instance of a repeating title.
    pub show_instance_one: bool,
    /// Certificate came back.
    pub received: bool,
    /// Left out of title lists.
    pub hidden: bool,
}

impl DogTitle {
    /// First instance of `name` in `venue`.
    pub fn new(venue: impl Into<String>, name: impl Into<String>, date: Option<Date>) -> Self {
        Self {
            venue: venue.into(),
            name: name.into(),
            date,
            instance: 1,
            show_instance_one: false,
            received: false,
            hidden: date.is_none(),
        }
    }

    /// Reads a `Title` element. The title must exist in `config`.
    pub fn load(config: &Config, tree: &Element, version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let venue_name = ctx.required_name(tree, "Venue")?;
        let Some(venue) = config.find_venue(&venue_name) else {
            return ctx.invalid(TAG, "Venue", Some(&venue_name));
        };
        let name = ctx.required_name(tree, "Name")?;
        let mut title = DogTitle::new(venue_name, name, None);
        title.hidden = ctx.opt_bool(tree, "isHidden", false)?;
        match tree.attrib::<Date>("Date") {
            AttribLookup::Found(date) => title.date = Some(date),
            // From 8.5 a missing date marks an unearned title kept hidden.
            AttribLookup::NotFound if version < Version::new(8, 5) => return ctx.missing(TAG, "Date"),
            AttribLookup::NotFound => title.hidden = true,
            AttribLookup::Invalid => return ctx.invalid_date(tree, "Date"),
        }
        title.instance = tree.attrib("instance").found().unwrap_or(1);
        title.show_instance_one = ctx.opt_bool(tree, "show", false)?;
        title.received = ctx.opt_bool(tree, "isReceived", false)?;

        if venue.find_title(&title.name).is_none() {
            // Very old files stored the display name instead of the abbreviation.
            let Some(config_title) = venue.titles.iter().find(|t| t.complete_name(title.instance) == title.name) else {
                let detail = format!("{}/{}", title.venue, title.name);
                return ctx.invalid(TAG, "Name", Some(&detail));
            };
            title.name.clone_from(&config_title.name);
        }
        Some(title)
    }

    /// Appends a `Title` element.
    pub fn save(&self, parent: &mut Element) -> bool {
        let title = parent.add_element(TAG);
        title.add_attrib("Venue", &self.venue);
        title.add_attrib("Name", &self.name);
        if let Some(date) = self.date {
            title.add_attrib("Date", date);
        }
        if self.hidden {
            title.add_attrib("isHidden", true);
        }
        if self.instance != 1 {
            title.add_attrib("instance", self.instance);
        }
        if self.show_instance_one {
            title.add_attrib("show", true);
        }
        if self.received {
            title.add_attrib("isReceived", true);
        }
        true
    }

    /// Abbreviation as shown, numbered per the configured title.
    pub fn display_name(&self, config: Option<&ConfigTitle>) -> String {
        match config {
            Some(config) if self.show_instance_one && self.instance == 1 && config.multiple != TitleMultiple::Single => {
                format!("{}1", self.name)
            }
            Some(config) => config.title_name(self.instance),
            None => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Venue, error::ErrorLog, localization::English};

    fn config() -> Config {
        let mut venue = Venue::new("AKC");
        let mut mach = ConfigTitle::new("MACH");
        mach.long_name = "Master Agility Champion".into();
        mach.multiple = TitleMultiple::AfterFirst;
        venue.titles.push(mach);
        let mut config = Config::default();
        config.venues.push(venue);
        config
    }

    fn load(tree: &Element, version: Version) -> (Option<DogTitle>, ErrorLog) {
        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        (DogTitle::load(&config(), tree, version, &mut ctx), log)
    }

    #[test]
    fn undated_title_is_hidden_from_8_5() {
        let mut tree = Element::new(TAG);
        tree.add_attrib("Venue", "AKC");
        tree.add_attrib("Name", "MACH");
        assert!(load(&tree, Version::new(8, 4)).0.is_none());
        let title = load(&tree, Version::new(8, 5)).0.expect("loads");
        assert!(title.hidden);
        assert_eq!(title.date, None);
    }

    #[test]
    fn display_name_is_mapped_back_to_the_abbreviation() {
        let mut tree = Element::new(TAG);
        tree.add_attrib("Venue", "AKC");
        tree.add_attrib("Name", "Master Agility Champion [MACH]");
        tree.add_attrib("Date", "2012-04-01");
        let title = load(&tree, Version::new(15, 3)).0.expect("loads");
        assert_eq!(title.name, "MACH");
    }

    #[test]
    fn saved_title_reloads() {
        let mut title = DogTitle::new("AKC", "MACH", Date::from_ymd_opt(2015, 8, 9));
        title.instance = 3;
        title.received = true;
        let mut root = Element::new("Dog");
        assert!(title.save(&mut root));
        let (loaded, log) = load(&root.children()[0], Version::new(15, 3));
        assert!(log.is_empty(), "{}", log.text());
        assert_eq!(loaded, Some(title.clone()));

        let config = config();
        let config_title = config.venues[0].find_title("MACH");
        assert_eq!(title.display_name(config_title), "MACH3");
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    element::{AttribLookup, Element},
    error::LoadContext,
    types::Version,
};

/// Element name of a calendar site.
pub const TAG: &str = "CalSite";

/// A calendar plugin: a search URL template plus code tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalSite {
    /// Plugin name. Calendar actions delete by this name.
    pub name: String,
    /// Description text.
    pub desc: String,
    /// Search URL template.
    pub search_url: String,
    /// Help page link.
    pub help_url: String,
    /// Location codes and their display names.
    pub loc_codes: BTreeMap<String, String>,
    /// Venue codes and the venues they map to.
    pub venue_codes: BTreeMap<String, String>,
}

impl CalSite {
    /// Reads a site. `name` and `search` are required. Codes without `code` are skipped.
    pub fn load(tree: &Element, _version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let mut site = CalSite::default();
        match tree.attrib::<String>("name") {
            AttribLookup::Found(name) => site.name = name,
            _ => return ctx.missing(TAG, "name"),
        }
        match tree.attrib::<String>("search") {
            AttribLookup::Found(url) => site.search_url = url,
            _ => return ctx.missing(TAG, "search"),
        }
        site.help_url = tree.attrib("help").found().unwrap_or_default();

        for child in tree.children() {
            match child.name() {
                "Desc" => site.desc = child.value().to_string(),
                "LocCode" => {
                    if let Some(code) = child.attrib::<String>("code").found() {
                        let name = child.attrib("name").found().unwrap_or_else(|| code.clone());
                        site.loc_codes.insert(code, name);
                    }
                }
                "VenueCode" => {
                    if let Some(code) = child.attrib::<String>("code").found() {
                        let venue = child.attrib("venue").found().unwrap_or_default();
                        site.venue_codes.insert(code, venue);
                    }
                }
                _ => {}
            }
        }
        Some(site)
    }

    /// Writes the site under `parent`.
    pub fn save(&self, parent: &mut Element) -> bool {
        let site = parent.add_element(TAG);
        site.add_attrib("name", &self.name);
        site.add_attrib("search", &self.search_url);
        if !self.help_url.is_empty() {
            site.add_attrib("help", &self.help_url);
        }
        site.add_text_element("Desc", &self.desc);
        for (code, name) in &self.loc_codes {
            let loc = site.add_element("LocCode");
            loc.add_attrib("code", code);
            loc.add_attrib("name", name);
        }
        for (code, venue) in &self.venue_codes {
            let el = site.add_element("VenueCode");
            el.add_attrib("code", code);
            if !venue.is_empty() {
                el.add_attrib("venue", venue);
            }
        }
        true
    }
}

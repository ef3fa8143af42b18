use serde::{Deserialize, Serialize};

use crate::{config::Config, element::Element, error::LoadContext, types::Version};

/// Element name of a registration number.
pub const TAG: &str = "RegNum";

/// A registration number with a venue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegNum {
    /// Issuing venue.
    pub venue: String,
    /// The number itself.
    pub number: String,
    /// Height class registered under, if any.
    pub height: String,
    /// Paperwork came back.
    pub received: bool,
    /// Free text.
    pub note: String,
}

impl RegNum {
    /// A number for `venue`, not yet received.
    pub fn new(venue: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            venue: venue.into(),
            number: number.into(),
            ..Self::default()
        }
    }

    /// Reads a `RegNum` element. The venue must exist in `config`.
    pub fn load(config: &Config, tree: &Element, version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let venue = ctx.required_name(tree, "Venue")?;
        if config.find_venue(&venue).is_none() {
            return ctx.invalid(TAG, "Venue", Some(&venue));
        }
        let mut reg_num = RegNum::new(venue, "");
        // 1.0 and 9.0+ keep the number in an attribute; in between it was the
        // element text. From 9.0 the text is a note.
        if version == Version::new(1, 0) || version >= Version::new(9, 0) {
            reg_num.number = ctx.required_name(tree, "Number")?;
            if version >= Version::new(9, 0) {
                reg_num.note = tree.value().to_string();
            }
        } else {
            reg_num.number = tree.value().to_string();
            if reg_num.number.is_empty() {
                return ctx.missing(TAG, "Number");
            }
        }
        reg_num.height = tree.attrib("Height").found().unwrap_or_default();
        reg_num.received = ctx.opt_bool(tree, "isReceived", false)?;
        Some(reg_num)
    }

    /// Appends a `RegNum` element.
    pub fn save(&self, parent: &mut Element) -> bool {
        let reg_num = parent.add_element(TAG);
        reg_num.add_attrib("Venue", &self.venue);
        reg_num.add_attrib("Number", &self.number);
        if !self.height.is_empty() {
            reg_num.add_attrib("Height", &self.height);
        }
        if self.received {
            reg_num.add_attrib("isReceived", true);
        }
        if !self.note.is_empty() {
            reg_num.set_value(&self.note);
        }
        true
    }
}

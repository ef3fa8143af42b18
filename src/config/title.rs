use serde::{Deserialize, Serialize};

use crate::{
    element::{AttribLookup, Element},
    error::LoadContext,
    types::{Date, Version},
};

/// Element name of one title.
pub const TAG: &str = "Titles";

/// How repeated earnings of a title are numbered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TitleMultiple {
    /// Earned once.
    #[default]
    Single,
    /// Numbered from the first instance (`MX1`, `MX2`, ...).
    OnFirst,
    /// Numbered from the second instance (`MX`, `MX2`, ...).
    AfterFirst,
}

impl TitleMultiple {
    fn from_attrib(value: i16) -> Self {
        match value {
            1 => TitleMultiple::OnFirst,
            2 => TitleMultiple::AfterFirst,
            _ => TitleMultiple::Single,
        }
    }

    fn to_attrib(self) -> i16 {
        match self {
            TitleMultiple::Single => 0,
            TitleMultiple::OnFirst => 1,
            TitleMultiple::AfterFirst => 2,
        }
    }
}

/// A title a venue awards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Title {
    /// Short name, as dogs record it.
    pub name: String,
    /// Full name.
    pub long_name: String,
    /// Description text.
    pub desc: String,
    /// Shown before the dog's name.
    pub prefix: bool,
    /// Numbering of repeat earnings.
    pub multiple: TitleMultiple,
    /// First day the title can be earned.
    pub valid_from: Option<Date>,
    /// Last day the title can be earned.
    pub valid_to: Option<Date>,
}

impl Title {
    /// A single-instance title with an open validity window.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Reads a title. The description is the element text.
    pub fn load(tree: &Element, _version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let name = ctx.required_name(tree, "Name")?;
        let long_name = tree.attrib("LongName").found().unwrap_or_default();
        let prefix = ctx.opt_bool(tree, "Prefix", false)?;
        let valid_from = ctx.opt_date(tree, "ValidFrom")?;
        let valid_to = ctx.opt_date(tree, "ValidTo")?;
        let multiple = match tree.attrib::<i16>("Multiple") {
            AttribLookup::Found(value) => TitleMultiple::from_attrib(value),
            _ => TitleMultiple::Single,
        };
        Some(Self {
            name,
            long_name,
            desc: tree.value().to_string(),
            prefix,
            multiple,
            valid_from,
            valid_to,
        })
    }

    /// Writes the title under `parent`.
    pub fn save(&self, parent: &mut Element) -> bool {
        let title = parent.add_element(TAG);
        title.add_attrib("Name", &self.name);
        if !self.long_name.is_empty() {
            title.add_attrib("LongName", &self.long_name);
        }
        if !self.desc.is_empty() {
            title.set_value(&self.desc);
        }
        if self.prefix {
            title.add_attrib("Prefix", true);
        }
        if let Some(from) = self.valid_from {
            title.add_attrib("ValidFrom", from);
        }
        if let Some(to) = self.valid_to {
            title.add_attrib("ValidTo", to);
        }
        if self.multiple != TitleMultiple::Single {
            title.add_attrib("Multiple", self.multiple.to_attrib());
        }
        true
    }

    /// Abbreviation with the instance number, when one is shown.
    pub fn title_name(&self, instance: i16) -> String {
        let numbered = match self.multiple {
            TitleMultiple::Single => false,
            TitleMultiple::OnFirst => instance >= 1,
            TitleMultiple::AfterFirst => instance > 1,
        };
        if numbered {
            format!("{}{instance}", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Long name followed by the bracketed abbreviation.
    pub fn complete_name(&self, instance: i16) -> String {
        let short = self.title_name(instance);
        if self.long_name.is_empty() {
            short
        } else {
            format!("{} [{short}]", self.long_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_numbering_follows_multiple_style() {
        let mut title = Title::new("MX");
        assert_eq!(title.title_name(3), "MX");

        title.multiple = TitleMultiple::AfterFirst;
        assert_eq!(title.title_name(1), "MX");
        assert_eq!(title.title_name(2), "MX2");

        title.multiple = TitleMultiple::OnFirst;
        title.long_name = "Master Agility Excellent".into();
        assert_eq!(title.complete_name(1), "Master Agility Excellent [MX1]");
    }
}

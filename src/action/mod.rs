//! Scripted configuration migrations.
//!
//! A master configuration ships a list of [`ConfigAction`]s. Each one renames
//! or deletes a configuration entry and carries the change through every dog
//! record that names it. Actions are tagged with the configuration version
//! that introduced them so a document only replays the ones it has not seen.

mod apply;

use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    dog::DogList,
    element::{AttribLookup, Element},
    error::{ArbResult, LoadContext},
    localization::Localization,
    types::{ConfigVersion, Version},
};

/// Element name of one action.
pub const TAG: &str = "Action";

/// Confirmation hooks for destructive actions.
pub trait ActionCallback {
    /// Called before dog records are deleted. An implementation that wants
    /// to cancel makes [`ActionCallback::can_continue`] return false.
    fn pre_delete(&mut self, msg: &str);

    /// Called after records were removed during a configuration update.
    fn post_delete(&mut self, _msg: &str) {}

    /// False once the user cancelled. Checked after every action.
    fn can_continue(&self) -> bool {
        true
    }
}

/// Callback that records every prompt. With `decline` set, the first
/// pre-delete prompt cancels the rest of the run.
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    /// Pre-delete prompts, in order.
    pub pre_deletes: Vec<String>,
    /// Post-delete reports, in order.
    pub post_deletes: Vec<String>,
    /// Cancel at the first pre-delete prompt.
    pub decline: bool,
    declined: bool,
}

impl ActionLog {
    /// A log that accepts every delete.
    pub fn new() -> Self {
        Self::default()
    }

    /// A log that refuses every delete.
    pub fn declining() -> Self {
        Self {
            decline: true,
            ..Self::default()
        }
    }
}

impl ActionCallback for ActionLog {
    fn pre_delete(&mut self, msg: &str) {
        self.pre_deletes.push(msg.to_string());
        if self.decline {
            self.declined = true;
        }
    }

    fn post_delete(&mut self, msg: &str) {
        self.post_deletes.push(msg.to_string());
    }

    fn can_continue(&self) -> bool {
        !self.declined
    }
}

/// One rename or delete.
///
/// Level actions name a sublevel when `level` holds its parent level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verb")]
pub enum ConfigAction {
    /// Removes a calendar site.
    DeleteCalPlugin {
        /// Configuration version that introduced the action.
        version: ConfigVersion,
        /// Name of the entry to delete.
        name: String,
    },
    /// Renames an other-points category.
    RenameOtherPoints {
        /// Configuration version that introduced the action.
        version: ConfigVersion,
        /// Current name.
        old: String,
        /// Name after the rename.
        new: String,
    },
    /// Removes an other-points category.
    DeleteOtherPoints {
        /// Configuration version that introduced the action.
        version: ConfigVersion,
        /// Name of the entry to delete.
        name: String,
    },
    /// Renames a venue.
    RenameVenue {
        /// Configuration version that introduced the action.
        version: ConfigVersion,
        /// Current name.
        old: String,
        /// Name after the rename.
        new: String,
    },
    /// Removes a venue and every trial held under it.
    DeleteVenue {
        /// Configuration version that introduced the action.
        version: ConfigVersion,
        /// Name of the entry to delete.
        name: String,
    },
    /// Renames a multi-Q.
    RenameMultiQ {
        /// Configuration version that introduced the action.
        version: ConfigVersion,
        /// Venue the entry belongs to.
        venue: String,
        /// Current name.
        old: String,
        /// Name after the rename.
        new: String,
    },
    /// Removes a multi-Q.
    DeleteMultiQ {
        /// Configuration version that introduced the action.
        version: ConfigVersion,
        /// Venue the entry belongs to.
        venue: String,
        /// Name of the entry to delete.
        name: String,
    },
    /// Renames a division.
    RenameDivision {
        /// Configuration version that introduced the action.
        version: ConfigVersion,
        /// Venue the entry belongs to.
        venue: String,
        /// Current name.
        old: String,
        /// Name after the rename.
        new: String,
    },
    /// Removes a division.
    DeleteDivision {
        /// Configuration version that introduced the action.
        version: ConfigVersion,
        /// Venue the entry belongs to.
        venue: String,
        /// Name of the entry to delete.
        name: String,
    },
    /// Renames a level or sublevel.
    RenameLevel {
        /// Configuration version that introduced the action.
        version: ConfigVersion,
        /// Venue the entry belongs to.
        venue: String,
        /// Division holding the level.
        division: String,
        /// Parent level when the target is a sublevel.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        level: Option<String>,
        /// Current name.
        old: String,
        /// Name after the rename.
        new: String,
    },
    /// Removes a level or sublevel.
    DeleteLevel {
        /// Configuration version that introduced the action.
        version: ConfigVersion,
        /// Venue the entry belongs to.
        venue: String,
        /// Division holding the level.
        division: String,
        /// Parent level when the target is a sublevel.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        level: Option<String>,
        /// Name of the entry to delete.
        name: String,
    },
    /// Renames a title.
    RenameTitle {
        /// Configuration version that introduced the action.
        version: ConfigVersion,
        /// Venue the entry belongs to.
        venue: String,
        /// Current name.
        old: String,
        /// Name after the rename.
        new: String,
    },
    /// With a replacement, dog titles move to it instead of being deleted.
    DeleteTitle {
        /// Configuration version that introduced the action.
        version: ConfigVersion,
        /// Venue the entry belongs to.
        venue: String,
        /// Name of the entry to delete.
        name: String,
        /// Title that takes over the deleted one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        replacement: Option<String>,
    },
    /// Renames a event.
    RenameEvent {
        /// Configuration version that introduced the action.
        version: ConfigVersion,
        /// Venue the entry belongs to.
        venue: String,
        /// Current name.
        old: String,
        /// Name after the rename.
        new: String,
    },
    /// Removes a event.
    DeleteEvent {
        /// Configuration version that introduced the action.
        version: ConfigVersion,
        /// Venue the entry belongs to.
        venue: String,
        /// Name of the entry to delete.
        name: String,
    },
}

const VERBS: [&str; 15] = [
    "DeleteCalPlugin",
    "RenameOtherPoints",
    "DeleteOtherPoints",
    "RenameVenue",
    "DeleteVenue",
    "RenameMultiQ",
    "DeleteMultiQ",
    "RenameDivision",
    "DeleteDivision",
    "RenameLevel",
    "DeleteLevel",
    "RenameTitle",
    "DeleteTitle",
    "RenameEvent",
    "DeleteEvent",
];

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

impl ConfigAction {
    /// Configuration version that introduced the action. Zero always applies.
    pub fn version(&self) -> ConfigVersion {
        match self {
            ConfigAction::DeleteCalPlugin { version, .. }
            | ConfigAction::RenameOtherPoints { version, .. }
            | ConfigAction::DeleteOtherPoints { version, .. }
            | ConfigAction::RenameVenue { version, .. }
            | ConfigAction::DeleteVenue { version, .. }
            | ConfigAction::RenameMultiQ { version, .. }
            | ConfigAction::DeleteMultiQ { version, .. }
            | ConfigAction::RenameDivision { version, .. }
            | ConfigAction::DeleteDivision { version, .. }
            | ConfigAction::RenameLevel { version, .. }
            | ConfigAction::DeleteLevel { version, .. }
            | ConfigAction::RenameTitle { version, .. }
            | ConfigAction::DeleteTitle { version, .. }
            | ConfigAction::RenameEvent { version, .. }
            | ConfigAction::DeleteEvent { version, .. } => *version,
        }
    }

    /// Verb written to the `Verb` attribute.
    pub fn verb(&self) -> &'static str {
        match self {
            ConfigAction::DeleteCalPlugin { .. } => VERBS[0],
            ConfigAction::RenameOtherPoints { .. } => VERBS[1],
            ConfigAction::DeleteOtherPoints { .. } => VERBS[2],
            ConfigAction::RenameVenue { .. } => VERBS[3],
            ConfigAction::DeleteVenue { .. } => VERBS[4],
            ConfigAction::RenameMultiQ { .. } => VERBS[5],
            ConfigAction::DeleteMultiQ { .. } => VERBS[6],
            ConfigAction::RenameDivision { .. } => VERBS[7],
            ConfigAction::DeleteDivision { .. } => VERBS[8],
            ConfigAction::RenameLevel { .. } => VERBS[9],
            ConfigAction::DeleteLevel { .. } => VERBS[10],
            ConfigAction::RenameTitle { .. } => VERBS[11],
            ConfigAction::DeleteTitle { .. } => VERBS[12],
            ConfigAction::RenameEvent { .. } => VERBS[13],
            ConfigAction::DeleteEvent { .. } => VERBS[14],
        }
    }

    /// Reads one action. Before 12.12 a missing `Config` attribute means version 0.
    pub fn load(tree: &Element, version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let verb = ctx.required_name(tree, "Verb")?;
        let config_version = match tree.attrib::<ConfigVersion>("Config") {
            AttribLookup::Found(found) => found,
            AttribLookup::NotFound if version < Version::new(12, 12) => 0,
            AttribLookup::NotFound => return ctx.missing(TAG, "Config"),
            AttribLookup::Invalid => return ctx.invalid(TAG, "Config", None),
        };
        let text = |attrib: &str| tree.attrib::<String>(attrib).found().unwrap_or_default();
        let (venue, division, old, new) = (text("Venue"), text("Div"), text("OldName"), text("NewName"));
        let level = non_empty(text("Level"));
        let version = config_version;

        let action = match verb.as_str() {
            "DeleteCalPlugin" => ConfigAction::DeleteCalPlugin { version, name: old },
            "RenameOtherPoints" => ConfigAction::RenameOtherPoints { version, old, new },
            "DeleteOtherPoints" => ConfigAction::DeleteOtherPoints { version, name: old },
            "RenameVenue" => ConfigAction::RenameVenue { version, old, new },
            "DeleteVenue" => ConfigAction::DeleteVenue { version, name: old },
            "RenameMultiQ" => ConfigAction::RenameMultiQ { version, venue, old, new },
            "DeleteMultiQ" => ConfigAction::DeleteMultiQ {
                version,
                venue,
                name: old,
            },
            "RenameDivision" => ConfigAction::RenameDivision { version, venue, old, new },
            "DeleteDivision" => ConfigAction::DeleteDivision {
                version,
                venue,
                name: old,
            },
            "RenameLevel" => ConfigAction::RenameLevel {
                version,
                venue,
                division,
                level,
                old,
                new,
            },
            "DeleteLevel" => ConfigAction::DeleteLevel {
                version,
                venue,
                division,
                level,
                name: old,
            },
            "RenameTitle" => ConfigAction::RenameTitle { version, venue, old, new },
            // Div was once written on title deletes; titles are per venue.
            "DeleteTitle" => ConfigAction::DeleteTitle {
                version,
                venue,
                name: old,
                replacement: non_empty(new),
            },
            "RenameEvent" => ConfigAction::RenameEvent { version, venue, old, new },
            "DeleteEvent" => ConfigAction::DeleteEvent {
                version,
                venue,
                name: old,
            },
            _ => return ctx.invalid_choice(TAG, "Verb", &VERBS),
        };
        Some(action)
    }

    /// Writes the action as an `Action` child of `parent`.
    pub fn save(&self, parent: &mut Element) -> bool {
        let action = parent.add_element(TAG);
        action.add_attrib("Verb", self.verb());
        action.add_attrib("Config", self.version());
        let mut put = |attrib: &str, text: &str| {
            if !text.is_empty() {
                action.add_attrib(attrib, text);
            }
        };
        match self {
            ConfigAction::DeleteCalPlugin { name, .. }
            | ConfigAction::DeleteOtherPoints { name, .. }
            | ConfigAction::DeleteVenue { name, .. } => put("OldName", name),
            ConfigAction::RenameOtherPoints { old, new, .. } | ConfigAction::RenameVenue { old, new, .. } => {
                put("OldName", old);
                put("NewName", new);
            }
            ConfigAction::DeleteMultiQ { venue, name, .. }
            | ConfigAction::DeleteDivision { venue, name, .. }
            | ConfigAction::DeleteEvent { venue, name, .. } => {
                put("Venue", venue);
                put("OldName", name);
            }
            ConfigAction::RenameMultiQ { venue, old, new, .. }
            | ConfigAction::RenameDivision { venue, old, new, .. }
            | ConfigAction::RenameTitle { venue, old, new, .. }
            | ConfigAction::RenameEvent { venue, old, new, .. } => {
                put("Venue", venue);
                put("OldName", old);
                put("NewName", new);
            }
            ConfigAction::RenameLevel {
                venue,
                division,
                level,
                old,
                new,
                ..
            } => {
                put("Venue", venue);
                put("Div", division);
                put("Level", level.as_deref().unwrap_or_default());
                put("OldName", old);
                put("NewName", new);
            }
            ConfigAction::DeleteLevel {
                venue,
                division,
                level,
                name,
                ..
            } => {
                put("Venue", venue);
                put("Div", division);
                put("Level", level.as_deref().unwrap_or_default());
                put("OldName", name);
            }
            ConfigAction::DeleteTitle {
                venue,
                name,
                replacement,
                ..
            } => {
                put("Venue", venue);
                put("OldName", name);
                put("NewName", replacement.as_deref().unwrap_or_default());
            }
        }
        true
    }
}

/// An ordered migration script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionList(Vec<ConfigAction>);

impl ActionList {
    /// An empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an action.
    pub fn push(&mut self, action: ConfigAction) {
        self.0.push(action);
    }

    /// True when the script has no actions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Actions in replay order.
    pub fn iter(&self) -> std::slice::Iter<'_, ConfigAction> {
        self.0.iter()
    }

    /// Writes every action under `parent`.
    pub fn save(&self, parent: &mut Element) -> bool {
        self.0.iter().all(|action| action.save(parent))
    }

    /// Parses a JSON script.
    pub fn from_json(json: &str) -> ArbResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty-printed JSON script.
    pub fn to_json(&self) -> ArbResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replays every action newer than the configuration, in order. Stops
    /// once the callback cancels. Returns how many actions changed something.
    pub fn apply(
        &self,
        config: &mut Config,
        dogs: &mut DogList,
        info: &mut String,
        callback: &mut dyn ActionCallback,
        loc: &dyn Localization,
    ) -> usize {
        let mut changes = 0;
        for action in &self.0 {
            let version = action.version();
            if version != 0 && config.version >= version {
                continue;
            }
            if action.apply(config, dogs, info, callback, loc) {
                changes += 1;
            }
            if !callback.can_continue() {
                tracing::info!(verb = action.verb(), "configuration actions cancelled");
                break;
            }
        }
        if changes > 0 {
            info.push('\n');
        }
        changes
    }
}

impl FromIterator<ConfigAction> for ActionList {
    fn from_iter<I: IntoIterator<Item = ConfigAction>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ActionList {
    type Item = &'a ConfigAction;
    type IntoIter = std::slice::Iter<'a, ConfigAction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorLog, localization::English, types::CURRENT_DOC_VERSION};

    fn every_verb() -> Vec<ConfigAction> {
        let s = |text: &str| text.to_string();
        vec![
            ConfigAction::DeleteCalPlugin { version: 0, name: s("site") },
            ConfigAction::RenameOtherPoints { version: 1, old: s("a"), new: s("b") },
            ConfigAction::DeleteOtherPoints { version: 2, name: s("a") },
            ConfigAction::RenameVenue { version: 3, old: s("NADAC"), new: s("NADAC2") },
            ConfigAction::DeleteVenue { version: 4, name: s("ASCA") },
            ConfigAction::RenameMultiQ { version: 5, venue: s("AKC"), old: s("QQ"), new: s("Double Q") },
            ConfigAction::DeleteMultiQ { version: 6, venue: s("AKC"), name: s("QQ") },
            ConfigAction::RenameDivision { version: 7, venue: s("CPE"), old: s("Reg"), new: s("Regular") },
            ConfigAction::DeleteDivision { version: 8, venue: s("CPE"), name: s("Vet") },
            ConfigAction::RenameLevel {
                version: 9,
                venue: s("USDAA"),
                division: s("Champ"),
                level: Some(s("Masters")),
                old: s("Mast"),
                new: s("Masters A"),
            },
            ConfigAction::DeleteLevel {
                version: 10,
                venue: s("USDAA"),
                division: s("Champ"),
                level: None,
                name: s("Starters"),
            },
            ConfigAction::RenameTitle { version: 11, venue: s("USDAA"), old: s("PG"), new: s("PG3") },
            ConfigAction::DeleteTitle {
                version: 12,
                venue: s("USDAA"),
                name: s("PS"),
                replacement: Some(s("PK3")),
            },
            ConfigAction::RenameEvent { version: 13, venue: s("AKC"), old: s("JWW"), new: s("Jumpers") },
            ConfigAction::DeleteEvent { version: 14, venue: s("AKC"), name: s("FAST") },
        ]
    }

    #[test]
    fn every_verb_survives_xml_and_json() {
        let actions: ActionList = every_verb().into_iter().collect();
        let mut root = Element::new("Configuration");
        assert!(actions.save(&mut root));

        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        let loaded: ActionList = root
            .children()
            .iter()
            .map(|tree| ConfigAction::load(tree, CURRENT_DOC_VERSION, &mut ctx).expect("loads"))
            .collect();
        assert_eq!(loaded, actions);

        let json = actions.to_json().expect("serializes");
        assert!(json.contains("\"verb\": \"RenameLevel\""));
        assert_eq!(ActionList::from_json(&json).expect("parses"), actions);
    }

    #[test]
    fn config_version_is_required_from_12_12() {
        let mut tree = Element::new(TAG);
        tree.add_attrib("Verb", "RenameVenue");
        tree.add_attrib("OldName", "A");
        tree.add_attrib("NewName", "B");
        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        let old = ConfigAction::load(&tree, Version::new(12, 11), &mut ctx);
        assert_eq!(old.map(|a| a.version()), Some(0));
        assert!(ConfigAction::load(&tree, Version::new(12, 12), &mut ctx).is_none());
    }

    #[test]
    fn unknown_verb_lists_valid_values() {
        let mut tree = Element::new(TAG);
        tree.add_attrib("Verb", "MergeVenue");
        tree.add_attrib("Config", 3u16);
        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        assert!(ConfigAction::load(&tree, CURRENT_DOC_VERSION, &mut ctx).is_none());
        assert!(log.text().contains("DeleteCalPlugin, RenameOtherPoints"));
    }

    #[test]
    fn declining_log_stops_after_first_prompt() {
        let mut log = ActionLog::declining();
        assert!(log.can_continue());
        log.pre_delete("really?");
        assert!(!log.can_continue());
        assert_eq!(log.pre_deletes, ["really?"]);
    }
}

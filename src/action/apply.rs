use super::{ActionCallback, ConfigAction};
use crate::{
    config::{Config, Named, Venue, find_named, find_named_mut, multiq::for_each_multiq},
    dog::DogList,
    localization::{Localization, Message},
};

fn push_line(info: &mut String, text: &str) {
    info.push_str(text);
    info.push('\n');
}

/// Asks before deleting `count` records. Returns false when the callback
/// cancelled; nothing has been touched at that point.
fn confirm(
    count: usize,
    msg: Message<'_>,
    info: &mut String,
    callback: &mut dyn ActionCallback,
    loc: &dyn Localization,
) -> bool {
    if count == 0 {
        return true;
    }
    let text = loc.message(&msg);
    callback.pre_delete(&text);
    if !callback.can_continue() {
        return false;
    }
    push_line(info, &text);
    true
}

/// Renames `old` to `new`, or drops `old` when `new` already exists.
fn rename_entry<T: Named>(list: &mut Vec<T>, old: &str, new: &str, set_name: impl FnOnce(&mut T)) {
    if old == new {
        return;
    }
    if find_named(list, new).is_some() {
        list.retain(|item| item.name() != old);
    } else if let Some(item) = find_named_mut(list, old) {
        set_name(item);
    }
}

fn remove_entry<T: Named>(list: &mut Vec<T>, name: &str) {
    list.retain(|item| item.name() != name);
}

fn venue_has(config: &Config, venue: &str, check: impl FnOnce(&Venue) -> bool) -> bool {
    config.find_venue(venue).is_some_and(check)
}

/// Leaves a level delete removes. `None` when the target does not exist.
fn doomed_leaves(config: &Config, venue: &str, division: &str, level: Option<&str>, name: &str) -> Option<Vec<String>> {
    let div = config.find_venue(venue)?.find_division(division)?;
    match level {
        None => {
            let level = div.find_level(name)?;
            if level.is_leaf() {
                Some(vec![level.name.clone()])
            } else {
                Some(level.sub_levels.iter().map(|sub| sub.name.clone()).collect())
            }
        }
        Some(parent) => div
            .find_level(parent)?
            .sub_levels
            .iter()
            .any(|sub| sub.name == name)
            .then(|| vec![name.to_string()]),
    }
}

impl ConfigAction {
    /// Applies the action to a configuration and the dogs recorded against
    /// it. Progress lines are appended to `info`. Returns false when the
    /// target does not exist or the callback declined a delete.
    pub fn apply(
        &self,
        config: &mut Config,
        dogs: &mut DogList,
        info: &mut String,
        callback: &mut dyn ActionCallback,
        loc: &dyn Localization,
    ) -> bool {
        let changed = match self {
            ConfigAction::DeleteCalPlugin { name, .. } => {
                if find_named(&config.cal_sites, name).is_none() {
                    return false;
                }
                push_line(info, &loc.message(&Message::ActionDeleteCalPlugin { name }));
                remove_entry(&mut config.cal_sites, name);
                true
            }

            ConfigAction::RenameOtherPoints { old, new, .. } => {
                if config.find_other_points(old).is_none() {
                    return false;
                }
                let count = dogs.rename_other_points(old, new);
                push_line(info, &loc.message(&Message::ActionRenameOtherPoints { old, new, count }));
                rename_entry(&mut config.other_points, old, new, |other| other.name = new.clone());
                true
            }

            ConfigAction::DeleteOtherPoints { name, .. } => {
                if config.find_other_points(name).is_none() {
                    return false;
                }
                let count = dogs.other_points_in_use(name);
                let msg = Message::ActionPreDeleteOtherPoints { name, count };
                if !confirm(count, msg, info, callback, loc) {
                    return false;
                }
                dogs.delete_other_points(name);
                push_line(info, &loc.message(&Message::ActionDeleteOtherPoints { name }));
                remove_entry(&mut config.other_points, name);
                true
            }

            ConfigAction::RenameVenue { old, new, .. } => {
                if config.find_venue(old).is_none() {
                    return false;
                }
                let count = dogs.rename_venue(old, new);
                push_line(info, &loc.message(&Message::ActionRenameVenue { old, new, count }));
                rename_entry(&mut config.venues, old, new, |venue| venue.name = new.clone());
                config.sort_venues();
                true
            }

            ConfigAction::DeleteVenue { name, .. } => {
                if config.find_venue(name).is_none() {
                    return false;
                }
                let count = dogs.venue_in_use(name);
                let msg = Message::ActionPreDeleteVenue { name, count };
                if !confirm(count, msg, info, callback, loc) {
                    return false;
                }
                dogs.delete_venue(name);
                push_line(info, &loc.message(&Message::ActionDeleteVenue { name }));
                config.delete_venue(name);
                true
            }

            ConfigAction::RenameMultiQ { venue, old, new, .. } => {
                let Some(target) = config.find_venue_mut(venue) else {
                    return false;
                };
                if find_named(&target.multiqs, old).is_none() {
                    return false;
                }
                let count = dogs.rename_multiq(venue, old, new);
                push_line(info, &loc.message(&Message::ActionRenameMultiQ { venue, old, new, count }));
                rename_entry(&mut target.multiqs, old, new, |multiq| multiq.name = new.clone());
                true
            }

            ConfigAction::DeleteMultiQ { venue, name, .. } => {
                if !venue_has(config, venue, |v| find_named(&v.multiqs, name).is_some()) {
                    return false;
                }
                let count = dogs.multiq_in_use(venue, name);
                let msg = Message::ActionPreDeleteMultiQ { venue, name, count };
                if !confirm(count, msg, info, callback, loc) {
                    return false;
                }
                dogs.delete_multiq(venue, name);
                push_line(info, &loc.message(&Message::ActionDeleteMultiQ { venue, name }));
                if let Some(target) = config.find_venue_mut(venue) {
                    remove_entry(&mut target.multiqs, name);
                }
                true
            }

            ConfigAction::RenameDivision { venue, old, new, .. } => {
                let Some(target) = config.find_venue_mut(venue) else {
                    return false;
                };
                if target.find_division(old).is_none() {
                    return false;
                }
                let count = dogs.rename_division(venue, old, new);
                push_line(info, &loc.message(&Message::ActionRenameDivision { venue, old, new, count }));
                if old != new {
                    for event in target.events.iter_mut() {
                        event.rename_division(old, new);
                    }
                    for_each_multiq(&mut target.multiqs, |multiq| multiq.rename_division(old, new));
                }
                rename_entry(&mut target.divisions, old, new, |div| div.name = new.clone());
                true
            }

            ConfigAction::DeleteDivision { venue, name, .. } => {
                if !venue_has(config, venue, |v| v.find_division(name).is_some()) {
                    return false;
                }
                let count = dogs.division_in_use(venue, name);
                let msg = Message::ActionPreDeleteDivision { venue, name, count };
                if !confirm(count, msg, info, callback, loc) {
                    return false;
                }
                dogs.delete_division(venue, name);
                push_line(info, &loc.message(&Message::ActionDeleteDivision { venue, name }));
                if let Some(target) = config.find_venue_mut(venue) {
                    remove_entry(&mut target.divisions, name);
                    for event in target.events.iter_mut() {
                        event.delete_division(name);
                    }
                    for_each_multiq(&mut target.multiqs, |multiq| multiq.delete_division(name));
                }
                true
            }

            ConfigAction::RenameLevel {
                venue,
                division,
                level,
                old,
                new,
                ..
            } => {
                let Some(Venue {
                    divisions,
                    events,
                    multiqs,
                    ..
                }) = config.find_venue_mut(venue)
                else {
                    return false;
                };
                let Some(div) = find_named_mut(divisions, division) else {
                    return false;
                };
                // Runs record leaves, so a level with sublevels only renames
                // the configuration side.
                let leaf = match level {
                    None => match div.find_level(old) {
                        Some(found) => found.is_leaf(),
                        None => return false,
                    },
                    Some(parent) => match div.find_level(parent) {
                        Some(found) if found.sub_levels.iter().any(|sub| sub.name == *old) => true,
                        _ => return false,
                    },
                };
                let count = if leaf {
                    dogs.rename_level(venue, division, old, new)
                } else {
                    0
                };
                push_line(info, &loc.message(&Message::ActionRenameLevel { venue, old, new, count }));
                if old == new {
                    return true;
                }
                if level.is_none() {
                    for event in events.iter_mut() {
                        event.rename_level(division, old, new);
                    }
                }
                if leaf {
                    for_each_multiq(multiqs, |multiq| multiq.rename_level(division, old, new));
                }
                match level {
                    None => {
                        if div.find_level(new).is_some() {
                            div.delete_level(old, events);
                        } else if let Some(found) = find_named_mut(&mut div.levels, old) {
                            found.name = new.clone();
                        }
                    }
                    Some(parent) => {
                        if let Some(found) = find_named_mut(&mut div.levels, parent) {
                            rename_entry(&mut found.sub_levels, old, new, |sub| sub.name = new.clone());
                        }
                    }
                }
                true
            }

            ConfigAction::DeleteLevel {
                venue,
                division,
                level,
                name,
                ..
            } => {
                let Some(leaves) = doomed_leaves(config, venue, division, level.as_deref(), name) else {
                    return false;
                };
                let count: usize = leaves
                    .iter()
                    .map(|leaf| dogs.level_in_use(venue, division, leaf))
                    .sum();
                let msg = Message::ActionPreDeleteLevel { venue, name, count };
                if !confirm(count, msg, info, callback, loc) {
                    return false;
                }
                for leaf in &leaves {
                    dogs.delete_level(venue, division, leaf);
                }
                push_line(info, &loc.message(&Message::ActionDeleteLevel { venue, name }));
                let Some(Venue {
                    divisions,
                    events,
                    multiqs,
                    ..
                }) = config.find_venue_mut(venue)
                else {
                    return true;
                };
                if let Some(div) = find_named_mut(divisions, division) {
                    if level.is_none() {
                        div.delete_level(name, events);
                    } else {
                        div.delete_sub_level(name);
                    }
                }
                for leaf in &leaves {
                    for_each_multiq(multiqs, |multiq| multiq.delete_level(division, leaf));
                }
                true
            }

            ConfigAction::RenameTitle { venue, old, new, .. } => {
                let Some(target) = config.find_venue_mut(venue) else {
                    return false;
                };
                if target.find_title(old).is_none() {
                    return false;
                }
                let count = dogs.rename_title(venue, old, new);
                push_line(info, &loc.message(&Message::ActionRenameTitle { venue, old, new, count }));
                rename_entry(&mut target.titles, old, new, |title| title.name = new.clone());
                true
            }

            ConfigAction::DeleteTitle {
                venue,
                name,
                replacement,
                ..
            } => {
                if !venue_has(config, venue, |v| v.find_title(name).is_some()) {
                    return false;
                }
                let count = dogs.title_in_use(venue, name);
                match replacement {
                    Some(new) if count > 0 => {
                        let msg = Message::ActionRenameTitle {
                            venue,
                            old: name,
                            new,
                            count,
                        };
                        push_line(info, &loc.message(&msg));
                        dogs.rename_title(venue, name, new);
                    }
                    _ => {
                        let msg = Message::ActionPreDeleteTitle { venue, name, count };
                        if !confirm(count, msg, info, callback, loc) {
                            return false;
                        }
                        dogs.delete_title(venue, name);
                    }
                }
                push_line(info, &loc.message(&Message::ActionDeleteTitle { venue, name }));
                if let Some(target) = config.find_venue_mut(venue) {
                    remove_entry(&mut target.titles, name);
                }
                true
            }

            ConfigAction::RenameEvent { venue, old, new, .. } => {
                let Some(target) = config.find_venue_mut(venue) else {
                    return false;
                };
                if target.find_event_named(old).is_none() {
                    return false;
                }
                let count = dogs.rename_event(venue, old, new);
                push_line(info, &loc.message(&Message::ActionRenameEvent { venue, old, new, count }));
                if old != new {
                    for_each_multiq(&mut target.multiqs, |multiq| multiq.rename_event(old, new));
                }
                rename_entry(&mut target.events, old, new, |event| event.name = new.clone());
                true
            }

            ConfigAction::DeleteEvent { venue, name, .. } => {
                if !venue_has(config, venue, |v| v.find_event_named(name).is_some()) {
                    return false;
                }
                let count = dogs.event_in_use(venue, name);
                let msg = Message::ActionPreDeleteEvent { venue, name, count };
                if !confirm(count, msg, info, callback, loc) {
                    return false;
                }
                dogs.delete_event(venue, name);
                push_line(info, &loc.message(&Message::ActionDeleteEvent { venue, name }));
                if let Some(target) = config.find_venue_mut(venue) {
                    for_each_multiq(&mut target.multiqs, |multiq| multiq.delete_event(name));
                    remove_entry(&mut target.events, name);
                }
                true
            }
        };
        if changed {
            tracing::debug!(verb = self.verb(), version = self.version(), "applied configuration action");
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        action::{ActionList, ActionLog},
        config::{Division, Event, Level, MultiQ, Scoring, SubLevel, Title},
        dog::{Club, Dog, DogTitle, Run, Trial},
        localization::English,
        types::{Date, ScoringStyle},
    };

    fn day(d: u32) -> Date {
        Date::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn level_with(name: &str, subs: &[&str]) -> Level {
        let mut level = Level::new(name);
        level.sub_levels = subs.iter().map(|sub| SubLevel { name: sub.to_string() }).collect();
        level
    }

    fn config() -> Config {
        let mut cpe = Venue::new("CPE");
        let mut regular = Division::new("Regular");
        regular.levels.push(Level::new("Level 1"));
        regular.levels.push(level_with("Masters", &["Masters A", "Masters B"]));
        let mut veterans = Division::new("Veterans");
        veterans.levels.push(Level::new("Level 1"));
        cpe.divisions = vec![regular, veterans];
        for name in ["Standard", "Jackpot"] {
            let mut event = Event::new(name);
            event.scorings.push(Scoring::new("*", "*", ScoringStyle::FaultsThenTime));
            event.scorings.push(Scoring::new("Veterans", "Level 1", ScoringStyle::FaultsThenTime));
            cpe.events.push(event);
        }
        let mut multiq = MultiQ::new("Double", "DQ");
        multiq.add_item("Veterans", "Level 1", "Standard");
        multiq.add_item("Veterans", "Level 1", "Jackpot");
        cpe.multiqs.push(multiq);
        cpe.titles = vec![Title::new("CATCH"), Title::new("C-ATCH")];

        let mut config = Config::default();
        config.version = 5;
        config.venues = vec![cpe, Venue::new("CPE-old")];
        config
    }

    fn dogs() -> DogList {
        let mut dog = Dog::new("Skip");
        dog.titles.push(DogTitle::new("CPE", "CATCH", Some(day(1))));
        let mut trial = Trial::new("Barn");
        trial.clubs.push(Club::new("Dog Club", "CPE"));
        trial.runs = vec![
            Run::new(day(2), "Veterans", "Level 1", "Standard"),
            Run::new(day(2), "Veterans", "Level 1", "Jackpot"),
            Run::new(day(3), "Regular", "Masters A", "Standard"),
        ];
        dog.trials.push(trial);
        let mut old = Trial::new("Field");
        old.clubs.push(Club::new("Old Club", "CPE-old"));
        old.runs.push(Run::new(day(4), "Regular", "Level 1", "Standard"));
        dog.trials.push(old);
        DogList(vec![dog])
    }

    fn apply(action: ConfigAction, config: &mut Config, dogs: &mut DogList, log: &mut ActionLog) -> (bool, String) {
        let mut info = String::new();
        let changed = action.apply(config, dogs, &mut info, log, &English);
        (changed, info)
    }

    #[test]
    fn declined_division_delete_touches_nothing() {
        let (mut config, mut dogs) = (config(), dogs());
        let (config_before, dogs_before) = (config.clone(), dogs.clone());
        let mut log = ActionLog::declining();
        let action = ConfigAction::DeleteDivision {
            version: 6,
            venue: "CPE".into(),
            name: "Veterans".into(),
        };
        let (changed, info) = apply(action, &mut config, &mut dogs, &mut log);
        assert!(!changed);
        assert!(info.is_empty());
        assert_eq!(log.pre_deletes.len(), 1);
        assert!(log.pre_deletes[0].contains("2 records"));
        assert_eq!(config, config_before);
        assert_eq!(dogs, dogs_before);
    }

    #[test]
    fn division_delete_cascades() {
        let (mut config, mut dogs) = (config(), dogs());
        let mut log = ActionLog::new();
        let action = ConfigAction::DeleteDivision {
            version: 6,
            venue: "CPE".into(),
            name: "Veterans".into(),
        };
        let (changed, info) = apply(action, &mut config, &mut dogs, &mut log);
        assert!(changed);
        assert!(info.contains("Deleted division 'Veterans' in 'CPE'"));
        let cpe = config.find_venue("CPE").unwrap();
        assert!(cpe.find_division("Veterans").is_none());
        assert!(cpe.events.iter().all(|event| event.scorings.len() == 1));
        assert!(cpe.multiqs[0].items.is_empty());
        assert_eq!(dogs[0].trials[0].runs.len(), 1);
    }

    #[test]
    fn venue_rename_onto_existing_venue_merges() {
        let (mut config, mut dogs) = (config(), dogs());
        let mut log = ActionLog::new();
        let action = ConfigAction::RenameVenue {
            version: 6,
            old: "CPE-old".into(),
            new: "CPE".into(),
        };
        let (changed, info) = apply(action, &mut config, &mut dogs, &mut log);
        assert!(changed);
        assert!(info.contains("(1 record)"));
        assert_eq!(config.venues.len(), 1);
        assert_eq!(dogs[0].trials[1].clubs[0].venue, "CPE");
    }

    #[test]
    fn sublevel_rename_only_touches_that_leaf() {
        let (mut config, mut dogs) = (config(), dogs());
        let mut log = ActionLog::new();
        let action = ConfigAction::RenameLevel {
            version: 6,
            venue: "CPE".into(),
            division: "Regular".into(),
            level: Some("Masters".into()),
            old: "Masters A".into(),
            new: "Masters Gold".into(),
        };
        let (changed, _) = apply(action, &mut config, &mut dogs, &mut log);
        assert!(changed);
        let div = config.find_venue("CPE").unwrap().find_division("Regular").unwrap();
        assert!(div.find_sub_level("Masters Gold").is_some());
        assert_eq!(dogs[0].trials[0].runs[2].level, "Masters Gold");
        assert_eq!(dogs[0].trials[1].runs[0].level, "Level 1");
    }

    #[test]
    fn level_delete_removes_runs_at_every_sublevel() {
        let (mut config, mut dogs) = (config(), dogs());
        let mut log = ActionLog::new();
        let action = ConfigAction::DeleteLevel {
            version: 6,
            venue: "CPE".into(),
            division: "Regular".into(),
            level: None,
            name: "Masters".into(),
        };
        let (changed, info) = apply(action, &mut config, &mut dogs, &mut log);
        assert!(changed);
        assert!(info.starts_with("Deleting level 'Masters' in 'CPE' will remove 1 run\n"));
        assert_eq!(dogs[0].trials[0].runs.len(), 2);
        let div = config.find_venue("CPE").unwrap().find_division("Regular").unwrap();
        assert!(div.find_level("Masters").is_none());
    }

    #[test]
    fn title_delete_with_replacement_moves_titles() {
        let (mut config, mut dogs) = (config(), dogs());
        let mut log = ActionLog::declining();
        let action = ConfigAction::DeleteTitle {
            version: 6,
            venue: "CPE".into(),
            name: "CATCH".into(),
            replacement: Some("C-ATCH".into()),
        };
        let (changed, _) = apply(action, &mut config, &mut dogs, &mut log);
        assert!(changed);
        assert!(log.pre_deletes.is_empty());
        assert_eq!(dogs[0].titles[0].name, "C-ATCH");
        assert!(config.find_venue("CPE").unwrap().find_title("CATCH").is_none());
    }

    #[test]
    fn missing_targets_are_not_changes() {
        let (mut config, mut dogs) = (config(), dogs());
        let mut log = ActionLog::new();
        let action = ConfigAction::DeleteEvent {
            version: 6,
            venue: "CPE".into(),
            name: "Snooker".into(),
        };
        assert!(!apply(action, &mut config, &mut dogs, &mut log).0);
    }

    #[test]
    fn list_skips_seen_versions_and_stops_when_declined() {
        let (mut config, mut dogs) = (config(), dogs());
        let actions: ActionList = [
            ConfigAction::RenameEvent {
                version: 4,
                venue: "CPE".into(),
                old: "Standard".into(),
                new: "Regular Standard".into(),
            },
            ConfigAction::RenameEvent {
                version: 0,
                venue: "CPE".into(),
                old: "Jackpot".into(),
                new: "Gamble".into(),
            },
            ConfigAction::DeleteEvent {
                version: 6,
                venue: "CPE".into(),
                name: "Standard".into(),
            },
            ConfigAction::RenameTitle {
                version: 7,
                venue: "CPE".into(),
                old: "CATCH".into(),
                new: "CATCH2".into(),
            },
        ]
        .into_iter()
        .collect();
        let mut log = ActionLog::declining();
        let mut info = String::new();
        let changes = actions.apply(&mut config, &mut dogs, &mut info, &mut log, &English);
        assert_eq!(changes, 1);
        assert!(info.ends_with("\n\n"));
        let cpe = config.find_venue("CPE").unwrap();
        assert!(cpe.find_event_named("Standard").is_some());
        assert!(cpe.find_event_named("Gamble").is_some());
        assert!(cpe.multiqs[0].items.iter().any(|item| item.event == "Gamble"));
        assert!(cpe.find_title("CATCH").is_some());
    }
}

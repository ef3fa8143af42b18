use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::run::{self, Run};
use crate::{
    config::{Config, Event, Scoring},
    element::Element,
    error::LoadContext,
    types::{Date, Version},
};

/// Element name of a trial.
pub const TAG: &str = "Trial";
/// Element name of a hosting club.
pub const CLUB_TAG: &str = "Club";

/// A club hosting a trial under a venue's rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    /// Club name.
    pub name: String,
    /// Venue the club runs under.
    pub venue: String,
}

impl Club {
    /// A club under `venue`.
    pub fn new(name: impl Into<String>, venue: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            venue: venue.into(),
        }
    }

    /// Reads a `Club` element. The venue must exist in `config`.
    pub fn load(config: &Config, tree: &Element, version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let name = if version == Version::new(1, 0) {
            ctx.required_name(tree, "Name")?
        } else {
            tree.value().to_string()
        };
        let venue = ctx.required_name(tree, "Venue")?;
        if config.find_venue(&venue).is_none() {
            return ctx.invalid(CLUB_TAG, "Venue", Some(&venue));
        }
        Some(Club { name, venue })
    }

    /// Appends a `Club` element.
    pub fn save(&self, parent: &mut Element) -> bool {
        let club = parent.add_element(CLUB_TAG);
        club.add_attrib("Venue", &self.venue);
        club.set_value(&self.name);
        true
    }
}

/// Resolves a run's scoring method through a trial's clubs. The `preferred`
/// club is tried first, then every club in order. Returns the index of the
/// club that resolved it.
pub fn find_club_event<'c>(
    config: &'c Config,
    clubs: &[Club],
    preferred: Option<usize>,
    event: &str,
    division: &str,
    level: &str,
    date: Option<Date>,
) -> Option<(usize, &'c Event, &'c Scoring)> {
    let resolve = |idx: usize| {
        let club = clubs.get(idx)?;
        let (event, scoring) = config.find_venue(&club.venue)?.find_event(event, division, level, date)?;
        Some((idx, event, scoring))
    };
    preferred
        .and_then(resolve)
        .or_else(|| (0..clubs.len()).find_map(resolve))
}

/// A trial: the hosting clubs and the runs entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    /// Only kept while the trial has no runs; otherwise the first run's date.
    pub default_date: Option<Date>,
    /// Results checked against the official record.
    pub verified: bool,
    /// Where the trial was held.
    pub location: String,
    /// Free text.
    pub note: String,
    /// Hosting clubs. Runs refer to these by index.
    pub clubs: Vec<Club>,
    /// Runs, sorted by date.
    pub runs: Vec<Run>,
}

impl Trial {
    /// An empty trial at `location`.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    /// Loads a trial. Clubs and runs that fail to load are dropped; the
    /// trial itself fails only on its own attributes.
    pub fn load(config: &Config, tree: &Element, version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let mut trial = Trial {
            default_date: ctx.opt_date(tree, "Date")?,
            verified: ctx.opt_bool(tree, "Verified", false)?,
            ..Trial::default()
        };
        for child in tree.children() {
            match child.name() {
                "Location" => trial.location = child.value().to_string(),
                "Note" => trial.note = child.value().to_string(),
                CLUB_TAG => trial.clubs.extend(Club::load(config, child, version, ctx)),
                // Clubs precede runs in any file we wrote.
                run::TAG => {
                    if let Some(run) = Run::load(config, &trial.clubs, child, version, ctx) {
                        trial.runs.push(run);
                    }
                }
                _ => {}
            }
        }
        trial.set_multiqs(config);
        trial.sort_runs();
        if let Some(first) = trial.runs.first() {
            trial.default_date = Some(first.date);
        }
        Some(trial)
    }

    /// Appends a `Trial` element.
    pub fn save(&self, parent: &mut Element) -> bool {
        let trial = parent.add_element(TAG);
        if self.runs.is_empty() {
            if let Some(date) = self.default_date {
                trial.add_attrib("Date", date);
            }
        }
        if self.verified {
            trial.add_attrib("Verified", true);
        }
        trial.add_text_element("Location", &self.location);
        trial.add_text_element("Note", &self.note);
        self.clubs.iter().all(|club| club.save(trial)) && self.runs.iter().all(|run| run.save(trial))
    }

    /// Orders runs by date.
    pub fn sort_runs(&mut self) {
        self.runs.sort_by_key(|run| run.date);
    }

    /// Earliest run date, or the default date when there are no runs.
    pub fn start_date(&self) -> Option<Date> {
        self.runs.iter().map(|run| run.date).min().or(self.default_date)
    }

    /// True when any hosting club runs under `venue`.
    pub fn has_venue(&self, venue: &str) -> bool {
        self.clubs.iter().any(|club| club.venue == venue)
    }

    /// Venue whose rules score `run`.
    pub fn run_venue(&self, run: &Run) -> Option<&str> {
        self.clubs.get(run.club).map(|club| club.venue.as_str())
    }

    /// Runs scored under `venue`.
    pub fn venue_runs<'a>(&'a self, venue: &'a str) -> impl Iterator<Item = &'a Run> + 'a {
        let clubs = &self.clubs;
        self.runs
            .iter()
            .filter(move |run| clubs.get(run.club).is_some_and(|club| club.venue == venue))
    }

    /// Runs scored under `venue`, mutably.
    pub fn venue_runs_mut<'a>(&'a mut self, venue: &'a str) -> impl Iterator<Item = &'a mut Run> + 'a {
        let clubs = &self.clubs;
        self.runs
            .iter_mut()
            .filter(move |run| clubs.get(run.club).is_some_and(|club| club.venue == venue))
    }

    /// Removes runs scored under `venue` that match `doomed`.
    pub fn delete_venue_runs(&mut self, venue: &str, mut doomed: impl FnMut(&Run) -> bool) -> usize {
        let before = self.runs.len();
        let clubs = &self.clubs;
        self.runs
            .retain(|run| !(clubs.get(run.club).is_some_and(|club| club.venue == venue) && doomed(run)));
        before - self.runs.len()
    }

    /// Recomputes which runs earned each venue's multi-Qs. Runs only count
    /// toward multi-Qs of the venue that scored them.
    pub fn set_multiqs(&mut self, config: &Config) {
        for run in &mut self.runs {
            run.multiqs.clear();
        }
        let mut venues: Vec<&str> = self.clubs.iter().map(|club| club.venue.as_str()).collect();
        venues.sort_unstable();
        venues.dedup();

        let mut earned: Vec<(usize, String)> = Vec::new();
        for venue_name in venues {
            let Some(venue) = config.find_venue(venue_name) else {
                continue;
            };
            if venue.multiqs.is_empty() {
                continue;
            }
            let mut by_day: HashMap<Date, Vec<usize>> = HashMap::new();
            for (idx, run) in self.runs.iter().enumerate() {
                let in_venue = self.clubs.get(run.club).is_some_and(|club| club.venue == venue_name);
                if in_venue && run.q.qualified() {
                    by_day.entry(run.date).or_default().push(idx);
                }
            }
            for (date, indices) in &by_day {
                if indices.len() < 2 {
                    continue;
                }
                let runs: Vec<&Run> = indices.iter().map(|&idx| &self.runs[idx]).collect();
                for multiq in &venue.multiqs {
                    if let Some(matched) = multiq.matched_runs(&runs, *date) {
                        earned.extend(matched.into_iter().map(|pos| (indices[pos], multiq.name.clone())));
                    }
                }
            }
        }
        for (idx, name) in earned {
            self.runs[idx].multiqs.push(name);
        }
        for run in &mut self.runs {
            run.multiqs.sort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Division, Level, MultiQ, Venue},
        error::ErrorLog,
        localization::English,
        types::{CURRENT_DOC_VERSION, QStatus, ScoringStyle},
    };

    fn venue(name: &str, events: &[&str]) -> Venue {
        let mut venue = Venue::new(name);
        let mut div = Division::new("Standard");
        div.levels.push(Level::new("Excellent"));
        venue.divisions.push(div);
        for name in events {
            let mut event = Event::new(*name);
            event.scorings.push(Scoring::new("*", "*", ScoringStyle::FaultsThenTime));
            venue.events.push(event);
        }
        venue
    }

    fn config() -> Config {
        let mut akc = venue("AKC", &["Standard", "Jumpers"]);
        let mut qq = MultiQ::new("Double Q", "QQ");
        qq.add_item("Standard", "Excellent", "Standard");
        qq.add_item("Standard", "Excellent", "Jumpers");
        akc.multiqs.push(qq);
        let mut config = Config::default();
        config.venues.push(akc);
        config.venues.push(venue("UKI", &["Jumpers", "Speedstakes"]));
        config
    }

    fn day(d: u32) -> Date {
        Date::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn qualified(date: Date, event: &str, club: usize) -> Run {
        let mut run = Run::new(date, "Standard", "Excellent", event);
        run.q = QStatus::Q;
        run.club = club;
        run
    }

    #[test]
    fn later_club_resolves_when_the_first_cannot() {
        let config = config();
        let clubs = vec![Club::new("Kennel Club", "AKC"), Club::new("Agility Club", "UKI")];
        let found = find_club_event(&config, &clubs, None, "Speedstakes", "Standard", "Excellent", None);
        assert_eq!(found.map(|(idx, event, _)| (idx, event.name.as_str())), Some((1, "Speedstakes")));
        let preferred = find_club_event(&config, &clubs, Some(1), "Jumpers", "Standard", "Excellent", None);
        assert_eq!(preferred.map(|(idx, _, _)| idx), Some(1));
        assert!(find_club_event(&config, &clubs, None, "Snooker", "Standard", "Excellent", None).is_none());
    }

    #[test]
    fn multiq_needs_same_day_and_same_venue() {
        let config = config();
        let mut trial = Trial::new("Fairgrounds");
        trial.clubs = vec![Club::new("Kennel Club", "AKC"), Club::new("Agility Club", "UKI")];
        trial.runs = vec![
            qualified(day(1), "Standard", 0),
            qualified(day(1), "Jumpers", 0),
            qualified(day(2), "Standard", 0),
            qualified(day(2), "Jumpers", 1),
        ];
        trial.set_multiqs(&config);
        let names: Vec<usize> = trial.runs.iter().map(|run| run.multiqs.len()).collect();
        assert_eq!(names, [1, 1, 0, 0]);
        assert_eq!(trial.runs[0].multiqs, ["Double Q"]);
    }

    #[test]
    fn runs_load_sorted_and_set_the_default_date() {
        let config = config();
        let mut trial = Trial::new("Fairgrounds");
        trial.verified = true;
        trial.clubs.push(Club::new("Kennel Club", "AKC"));
        trial.runs = vec![qualified(day(2), "Jumpers", 0), qualified(day(1), "Standard", 0)];

        let mut root = Element::new("Dog");
        assert!(trial.save(&mut root));
        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        let loaded = Trial::load(&config, &root.children()[0], CURRENT_DOC_VERSION, &mut ctx).expect("loads");
        assert!(log.is_empty(), "{}", log.text());
        assert_eq!(loaded.default_date, Some(day(1)));
        assert_eq!(loaded.runs[0].event, "Standard");
        assert_eq!(loaded.start_date(), Some(day(1)));
    }

    #[test]
    fn bad_run_is_dropped_not_the_trial() {
        let config = config();
        let mut trial = Trial::new("Fairgrounds");
        trial.clubs.push(Club::new("Kennel Club", "AKC"));
        trial.runs = vec![qualified(day(1), "Standard", 0), qualified(day(1), "Snooker", 0)];
        let mut root = Element::new("Dog");
        assert!(trial.save(&mut root));
        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        let loaded = Trial::load(&config, &root.children()[0], CURRENT_DOC_VERSION, &mut ctx).expect("loads");
        assert_eq!(loaded.runs.len(), 1);
        assert!(!log.is_empty());
    }
}

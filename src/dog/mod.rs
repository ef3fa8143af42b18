//! Dogs and everything recorded about them.
//!
//! Records refer to configuration entries by name, so every configuration
//! rename or delete walks the whole [`DogList`].

/// Points earned before records were kept.
pub mod existing_points;
/// Run notes and course diagrams.
pub mod notes;
/// Registration numbers.
pub mod reg_num;
/// Runs and placements.
pub mod run;
/// Per-run scoring data.
pub mod run_scoring;
/// Titles a dog earned.
pub mod title;
/// Trials and their clubs.
pub mod trial;

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

pub use existing_points::ExistingPoints;
pub use notes::Notes;
pub use reg_num::RegNum;
pub use run::{Partner, ReferenceRun, Run, RunOtherPoints};
pub use run_scoring::RunScoring;
pub use title::DogTitle;
pub use trial::{Club, Trial};

use crate::{
    config::Config,
    element::Element,
    error::LoadContext,
    types::{Date, ExistingPointsType, Version},
};

/// Element name of a dog.
pub const TAG: &str = "Dog";

/// One dog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dog {
    /// Everyday name.
    pub call_name: String,
    /// Date of birth.
    pub dob: Option<Date>,
    /// Date of death.
    pub deceased: Option<Date>,
    /// Name on the registration.
    pub registered_name: String,
    /// Breed text.
    pub breed: String,
    /// Free text.
    pub note: String,
    /// Points earned before these records.
    pub existing_points: Vec<ExistingPoints>,
    /// Registration numbers, sorted by venue.
    pub reg_nums: Vec<RegNum>,
    /// Titles, sorted by date.
    pub titles: Vec<DogTitle>,
    /// Trials, sorted by first run date.
    pub trials: Vec<Trial>,
}

impl Dog {
    /// A dog with nothing recorded.
    pub fn new(call_name: impl Into<String>) -> Self {
        Self {
            call_name: call_name.into(),
            ..Self::default()
        }
    }

    /// Loads a dog. Child records that fail to load are logged and skipped.
    pub fn load(config: &Config, tree: &Element, version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let mut dog = Dog {
            call_name: ctx.required_name(tree, "CallName")?,
            dob: ctx.opt_date(tree, "DOB")?,
            deceased: ctx.opt_date(tree, "Deceased")?,
            ..Dog::default()
        };
        for child in tree.children() {
            match child.name() {
                "RegisteredName" => dog.registered_name = child.value().to_string(),
                "Breed" => dog.breed = child.value().to_string(),
                "Note" => dog.note = child.value().to_string(),
                existing_points::TAG => dog
                    .existing_points
                    .extend(ExistingPoints::load(config, child, version, ctx)),
                reg_num::TAG => dog.reg_nums.extend(RegNum::load(config, child, version, ctx)),
                title::TAG => dog.titles.extend(DogTitle::load(config, child, version, ctx)),
                trial::TAG => dog.trials.extend(Trial::load(config, child, version, ctx)),
                _ => {}
            }
        }
        dog.sort();
        Some(dog)
    }

    /// Writes the dog and its records under `parent`.
    pub fn save(&self, parent: &mut Element) -> bool {
        let dog = parent.add_element(TAG);
        dog.add_attrib("CallName", &self.call_name);
        if let Some(dob) = self.dob {
            dog.add_attrib("DOB", dob);
        }
        if let Some(deceased) = self.deceased {
            dog.add_attrib("Deceased", deceased);
        }
        dog.add_text_element("RegisteredName", &self.registered_name);
        dog.add_text_element("Breed", &self.breed);
        dog.add_text_element("Note", &self.note);
        self.existing_points.iter().all(|points| points.save(dog))
            && self.reg_nums.iter().all(|reg_num| reg_num.save(dog))
            && self.titles.iter().all(|title| title.save(dog))
            && self.trials.iter().all(|trial| trial.save(dog))
    }

    /// Orders every child list by its natural key. Sorts are stable.
    pub fn sort(&mut self) {
        self.existing_points
            .sort_by(|a, b| (a.date, &a.venue).cmp(&(b.date, &b.venue)));
        self.reg_nums.sort_by(|a, b| a.venue.cmp(&b.venue));
        // Undated titles sort last.
        self.titles.sort_by(|a, b| {
            (a.date.is_none(), a.date, &a.venue, &a.name).cmp(&(b.date.is_none(), b.date, &b.venue, &b.name))
        });
        self.trials.sort_by_key(Trial::start_date);
    }
}

/// Every dog in a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DogList(pub Vec<Dog>);

impl Deref for DogList {
    type Target = Vec<Dog>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DogList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl DogList {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    fn trials(&self) -> impl Iterator<Item = &Trial> {
        self.0.iter().flat_map(|dog| dog.trials.iter())
    }

    fn trials_mut(&mut self) -> impl Iterator<Item = &mut Trial> {
        self.0.iter_mut().flat_map(|dog| dog.trials.iter_mut())
    }

    fn count_runs(&self, venue: &str, pred: impl Fn(&Run) -> bool) -> usize {
        self.trials()
            .map(|trial| trial.venue_runs(venue).filter(|run| pred(run)).count())
            .sum()
    }

    fn edit_runs(&mut self, venue: &str, mut edit: impl FnMut(&mut Run) -> bool) -> usize {
        let mut count = 0;
        for trial in self.trials_mut() {
            for run in trial.venue_runs_mut(venue) {
                if edit(run) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Deletes runs scored under `venue`. A trial emptied by the delete goes
    /// with them; trials that were already empty stay.
    fn delete_runs(&mut self, venue: &str, mut doomed: impl FnMut(&Run) -> bool) -> usize {
        let mut count = 0;
        for dog in self.0.iter_mut() {
            dog.trials.retain_mut(|trial| {
                let removed = trial.delete_venue_runs(venue, &mut doomed);
                count += removed;
                !(removed > 0 && trial.runs.is_empty())
            });
        }
        count
    }

    fn count_points(&self, pred: impl Fn(&ExistingPoints) -> bool) -> usize {
        self.0
            .iter()
            .map(|dog| dog.existing_points.iter().filter(|points| pred(points)).count())
            .sum()
    }

    fn edit_points(&mut self, mut edit: impl FnMut(&mut ExistingPoints) -> bool) -> usize {
        let mut count = 0;
        for points in self.0.iter_mut().flat_map(|dog| dog.existing_points.iter_mut()) {
            if edit(points) {
                count += 1;
            }
        }
        count
    }

    fn delete_points(&mut self, doomed: impl Fn(&ExistingPoints) -> bool) -> usize {
        let mut count = 0;
        for dog in self.0.iter_mut() {
            let before = dog.existing_points.len();
            dog.existing_points.retain(|points| !doomed(points));
            count += before - dog.existing_points.len();
        }
        count
    }

    /// Recomputes multi-Q awards on every run.
    pub fn set_multiqs(&mut self, config: &Config) {
        for trial in self.trials_mut() {
            trial.set_multiqs(config);
        }
    }

    /// Drops multi-Q existing points naming a multi-Q `venue` no longer has.
    pub fn delete_multiqs(&mut self, config: &Config, venue: &str) -> usize {
        let Some(config_venue) = config.find_venue(venue) else {
            return 0;
        };
        self.delete_points(|points| {
            points.kind == ExistingPointsType::MultiQ
                && points.venue == venue
                && config_venue.find_multiq(&points.multiq, false).is_none()
        })
    }

    /// Existing points and run points that name the other-points category.
    pub fn other_points_in_use(&self, name: &str) -> usize {
        let in_points =
            self.count_points(|points| points.kind == ExistingPointsType::Other && points.other_points == name);
        let in_runs: usize = self
            .trials()
            .flat_map(|trial| trial.runs.iter())
            .map(|run| run.other_points_in_use(name))
            .sum();
        in_points + in_runs
    }

    /// Renames the other-points category everywhere it appears.
    pub fn rename_other_points(&mut self, old: &str, new: &str) -> usize {
        let mut count = self.edit_points(|points| {
            let hit = points.kind == ExistingPointsType::Other && points.other_points == old;
            if hit {
                points.other_points = new.to_string();
            }
            hit
        });
        for trial in self.trials_mut() {
            for run in trial.runs.iter_mut() {
                count += run.rename_other_points(old, new);
            }
        }
        count
    }

    /// Removes existing points and run points in the category.
    pub fn delete_other_points(&mut self, name: &str) -> usize {
        let mut count =
            self.delete_points(|points| points.kind == ExistingPointsType::Other && points.other_points == name);
        for trial in self.trials_mut() {
            for run in trial.runs.iter_mut() {
                count += run.delete_other_points(name);
            }
        }
        count
    }

    /// Existing points, registration numbers, titles and trials in `venue`.
    pub fn venue_in_use(&self, venue: &str) -> usize {
        let mut count = self.count_points(|points| points.venue == venue);
        for dog in self.0.iter() {
            count += dog.reg_nums.iter().filter(|reg_num| reg_num.venue == venue).count();
            count += dog.titles.iter().filter(|title| title.venue == venue).count();
            count += dog.trials.iter().filter(|trial| trial.has_venue(venue)).count();
        }
        count
    }

    /// Renames the venue on every record that names it.
    pub fn rename_venue(&mut self, old: &str, new: &str) -> usize {
        let mut count = self.edit_points(|points| {
            let hit = points.venue == old;
            if hit {
                points.venue = new.to_string();
            }
            hit
        });
        for dog in self.0.iter_mut() {
            for reg_num in dog.reg_nums.iter_mut().filter(|reg_num| reg_num.venue == old) {
                reg_num.venue = new.to_string();
                count += 1;
            }
            for title in dog.titles.iter_mut().filter(|title| title.venue == old) {
                title.venue = new.to_string();
                count += 1;
            }
            for club in dog
                .trials
                .iter_mut()
                .flat_map(|trial| trial.clubs.iter_mut())
                .filter(|club| club.venue == old)
            {
                club.venue = new.to_string();
                count += 1;
            }
        }
        count
    }

    /// Removes everything recorded under `venue`, including whole trials
    /// any of whose clubs ran under it.
    pub fn delete_venue(&mut self, venue: &str) -> usize {
        let mut count = self.delete_points(|points| points.venue == venue);
        for dog in self.0.iter_mut() {
            let before = dog.reg_nums.len() + dog.titles.len() + dog.trials.len();
            dog.reg_nums.retain(|reg_num| reg_num.venue != venue);
            dog.titles.retain(|title| title.venue != venue);
            dog.trials.retain(|trial| !trial.has_venue(venue));
            count += before - (dog.reg_nums.len() + dog.titles.len() + dog.trials.len());
        }
        count
    }

    /// Existing MQ points for the multi-Q.
    pub fn multiq_in_use(&self, venue: &str, name: &str) -> usize {
        self.count_points(|points| {
            points.kind == ExistingPointsType::MultiQ && points.venue == venue && points.multiq == name
        })
    }

    /// Renames the multi-Q on existing MQ points.
    pub fn rename_multiq(&mut self, venue: &str, old: &str, new: &str) -> usize {
        self.edit_points(|points| {
            let hit = points.kind == ExistingPointsType::MultiQ && points.venue == venue && points.multiq == old;
            if hit {
                points.multiq = new.to_string();
            }
            hit
        })
    }

    /// Removes existing MQ points for the multi-Q.
    pub fn delete_multiq(&mut self, venue: &str, name: &str) -> usize {
        self.delete_points(|points| {
            points.kind == ExistingPointsType::MultiQ && points.venue == venue && points.multiq == name
        })
    }

    /// Runs and existing points in `division` of `venue`.
    pub fn division_in_use(&self, venue: &str, division: &str) -> usize {
        self.count_runs(venue, |run| run.division == division)
            + self.count_points(|points| points.in_division(venue, division))
    }

    /// Renames the division on runs and existing points in `venue`.
    pub fn rename_division(&mut self, venue: &str, old: &str, new: &str) -> usize {
        let runs = self.edit_runs(venue, |run| {
            let hit = run.division == old;
            if hit {
                run.division = new.to_string();
            }
            hit
        });
        runs + self.edit_points(|points| {
            let hit = points.in_division(venue, old);
            if hit {
                points.division = new.to_string();
            }
            hit
        })
    }

    /// Removes runs and existing points in the division.
    pub fn delete_division(&mut self, venue: &str, division: &str) -> usize {
        self.delete_runs(venue, |run| run.division == division)
            + self.delete_points(|points| points.in_division(venue, division))
    }

    /// Runs and existing points recorded at the leaf `level`.
    pub fn level_in_use(&self, venue: &str, division: &str, level: &str) -> usize {
        self.count_runs(venue, |run| run.division == division && run.level == level)
            + self.count_points(|points| points.in_division(venue, division) && points.level == level)
    }

    /// Renames the leaf level on runs and existing points in `division`.
    pub fn rename_level(&mut self, venue: &str, division: &str, old: &str, new: &str) -> usize {
        let runs = self.edit_runs(venue, |run| {
            let hit = run.division == division && run.level == old;
            if hit {
                run.level = new.to_string();
            }
            hit
        });
        runs + self.edit_points(|points| {
            let hit = points.in_division(venue, division) && points.level == old;
            if hit {
                points.level = new.to_string();
            }
            hit
        })
    }

    /// Removes runs and existing points at the leaf level.
    pub fn delete_level(&mut self, venue: &str, division: &str, level: &str) -> usize {
        self.delete_runs(venue, |run| run.division == division && run.level == level)
            + self.delete_points(|points| points.in_division(venue, division) && points.level == level)
    }

    /// Dog titles with this name in `venue`.
    pub fn title_in_use(&self, venue: &str, name: &str) -> usize {
        self.0
            .iter()
            .flat_map(|dog| dog.titles.iter())
            .filter(|title| title.venue == venue && title.name == name)
            .count()
    }

    /// Renames dog titles in `venue`.
    pub fn rename_title(&mut self, venue: &str, old: &str, new: &str) -> usize {
        let mut count = 0;
        for title in self
            .0
            .iter_mut()
            .flat_map(|dog| dog.titles.iter_mut())
            .filter(|title| title.venue == venue && title.name == old)
        {
            title.name = new.to_string();
            count += 1;
        }
        count
    }

    /// Removes dog titles in `venue`.
    pub fn delete_title(&mut self, venue: &str, name: &str) -> usize {
        let mut count = 0;
        for dog in self.0.iter_mut() {
            let before = dog.titles.len();
            dog.titles.retain(|title| !(title.venue == venue && title.name == name));
            count += before - dog.titles.len();
        }
        count
    }

    /// Runs and existing points in the event.
    pub fn event_in_use(&self, venue: &str, event: &str) -> usize {
        self.count_runs(venue, |run| run.event == event)
            + self.count_points(|points| {
                points.kind != ExistingPointsType::MultiQ && points.venue == venue && points.event == event
            })
    }

    /// Renames the event on runs and existing points in `venue`.
    pub fn rename_event(&mut self, venue: &str, old: &str, new: &str) -> usize {
        let runs = self.edit_runs(venue, |run| {
            let hit = run.event == old;
            if hit {
                run.event = new.to_string();
            }
            hit
        });
        runs + self.edit_points(|points| {
            let hit = points.kind != ExistingPointsType::MultiQ && points.venue == venue && points.event == old;
            if hit {
                points.event = new.to_string();
            }
            hit
        })
    }

    /// Removes runs and existing points in the event.
    pub fn delete_event(&mut self, venue: &str, event: &str) -> usize {
        self.delete_runs(venue, |run| run.event == event)
            + self.delete_points(|points| {
                points.kind != ExistingPointsType::MultiQ && points.venue == venue && points.event == event
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Division, Event, Level, Scoring, Venue},
        error::ErrorLog,
        localization::English,
        types::{CURRENT_DOC_VERSION, QStatus, ScoringStyle},
    };

    fn day(d: u32) -> Date {
        Date::from_ymd_opt(2023, 9, d).unwrap()
    }

    fn dogs() -> DogList {
        let mut dog = Dog::new("Tess");
        dog.titles.push(DogTitle::new("AKC", "MX", Some(day(1))));
        dog.reg_nums.push(RegNum::new("AKC", "DN123"));

        let mut mixed = Trial::new("Park");
        mixed.clubs = vec![Club::new("Kennel Club", "AKC"), Club::new("Agility Club", "UKI")];
        let mut jumpers = Run::new(day(2), "Standard", "Excellent", "Jumpers");
        jumpers.q = QStatus::Q;
        let mut uki = Run::new(day(2), "Standard", "Excellent", "Jumpers");
        uki.club = 1;
        mixed.runs = vec![jumpers, uki];

        let mut akc = Trial::new("Arena");
        akc.clubs.push(Club::new("Kennel Club", "AKC"));
        akc.runs.push(Run::new(day(3), "Standard", "Excellent", "Standard"));

        let mut empty = Trial::new("Cancelled");
        empty.clubs.push(Club::new("Kennel Club", "AKC"));

        dog.trials = vec![mixed, akc, empty];
        dog.existing_points.push(ExistingPoints {
            kind: ExistingPointsType::Runs,
            venue: "AKC".into(),
            division: "Standard".into(),
            level: "Excellent".into(),
            event: "Standard".into(),
            points: 10.0,
            ..ExistingPoints::default()
        });
        DogList(vec![dog])
    }

    #[test]
    fn run_edits_stay_inside_the_scoring_venue() {
        let mut dogs = dogs();
        assert_eq!(dogs.event_in_use("AKC", "Jumpers"), 1);
        assert_eq!(dogs.rename_event("AKC", "Jumpers", "JWW"), 1);
        let trial = &dogs[0].trials[0];
        assert_eq!(trial.runs[0].event, "JWW");
        assert_eq!(trial.runs[1].event, "Jumpers");
        assert_eq!(dogs.division_in_use("AKC", "Standard"), 3);
    }

    #[test]
    fn deleting_runs_prunes_only_trials_it_emptied() {
        let mut dogs = dogs();
        assert_eq!(dogs.delete_event("AKC", "Standard"), 2);
        let locations: Vec<&str> = dogs[0].trials.iter().map(|t| t.location.as_str()).collect();
        assert_eq!(locations, ["Park", "Cancelled"]);
        assert!(dogs[0].existing_points.is_empty());
    }

    #[test]
    fn venue_rename_reaches_every_record_kind() {
        let mut dogs = dogs();
        let in_use = dogs.venue_in_use("AKC");
        assert_eq!(in_use, 6);
        assert_eq!(dogs.rename_venue("AKC", "American Kennel Club"), 6);
        assert_eq!(dogs.venue_in_use("AKC"), 0);
        assert_eq!(dogs.delete_venue("American Kennel Club"), 6);
        assert!(dogs[0].trials.is_empty());
        assert!(dogs[0].titles.is_empty());
    }

    #[test]
    fn dog_survives_save() {
        let mut config = Config::default();
        let mut venue = Venue::new("AKC");
        let mut div = Division::new("Standard");
        div.levels.push(Level::new("Excellent"));
        venue.divisions.push(div);
        for name in ["Standard", "Jumpers"] {
            let mut event = Event::new(name);
            event.scorings.push(Scoring::new("*", "*", ScoringStyle::FaultsThenTime));
            venue.events.push(event);
        }
        venue.titles.push(crate::config::Title::new("MX"));
        config.venues.push(venue);

        let mut dog = Dog::new("Tess");
        dog.dob = Some(day(1));
        dog.breed = "Border Collie".into();
        dog.titles.push(DogTitle::new("AKC", "MX", Some(day(1))));
        dog.reg_nums.push(RegNum::new("AKC", "DN123"));
        let mut trial = Trial::new("Arena");
        trial.clubs.push(Club::new("Kennel Club", "AKC"));
        trial.runs.push(Run::new(day(3), "Standard", "Excellent", "Standard"));
        trial.default_date = Some(day(3));
        dog.trials.push(trial);

        let mut root = Element::new("AgilityBook");
        assert!(dog.save(&mut root));
        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        let loaded = Dog::load(&config, &root.children()[0], CURRENT_DOC_VERSION, &mut ctx);
        assert!(log.is_empty(), "{}", log.text());
        assert_eq!(loaded, Some(dog));
    }
}

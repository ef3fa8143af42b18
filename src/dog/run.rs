use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{
    notes::{self, Notes},
    run_scoring::RunScoring,
    trial::{Club, find_club_event},
};
use crate::{
    config::{Config, Scoring, multiq::RunKey},
    element::{AttribLookup, Element},
    error::LoadContext,
    types::{Date, QStatus, ScoringStyle, ScoringType, Version},
};

/// Element name of a run.
pub const TAG: &str = "Run";
/// Element holding placement and other points.
pub const PLACEMENT_TAG: &str = "Placement";
/// Element name of a partner.
pub const PARTNER_TAG: &str = "Partner";
/// Element name of a reference run.
pub const REF_RUN_TAG: &str = "ReferenceRun";
/// Element name of a link.
pub const LINK_TAG: &str = "Link";
const OTHER_POINTS_TAG: &str = "OtherPoints";

/// Handler and dog sharing a pairs or team run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    /// Partner handler name.
    pub handler: String,
    /// Partner dog call name.
    pub dog: String,
    /// Partner dog registration number.
    pub reg_num: String,
}

impl Partner {
    /// Reads a `Partner` element.
    pub fn load(tree: &Element, _version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        Some(Partner {
            handler: ctx.required_name(tree, "Handler")?,
            dog: ctx.required_name(tree, "Dog")?,
            reg_num: tree.attrib("RegNum").found().unwrap_or_default(),
        })
    }

    /// Appends a `Partner` element.
    pub fn save(&self, parent: &mut Element) -> bool {
        let partner = parent.add_element(PARTNER_TAG);
        partner.add_attrib("Handler", &self.handler);
        partner.add_attrib("Dog", &self.dog);
        if !self.reg_num.is_empty() {
            partner.add_attrib("RegNum", &self.reg_num);
        }
        true
    }
}

/// Points a run earned in a user-defined category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunOtherPoints {
    /// Other points category, as named in the configuration.
    pub name: String,
    /// Points earned.
    pub points: f64,
}

impl RunOtherPoints {
    /// Reads an `OtherPoints` element. The category must exist in `config`.
    pub fn load(config: &Config, tree: &Element, _version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let name = ctx.required_name(tree, "Name")?;
        if config.find_other_points(&name).is_none() {
            return ctx.invalid(OTHER_POINTS_TAG, "Name", Some(&name));
        }
        Some(RunOtherPoints {
            name,
            points: tree.attrib("Points").found().unwrap_or(0.0),
        })
    }

    /// Appends an `OtherPoints` element.
    pub fn save(&self, parent: &mut Element) -> bool {
        let other = parent.add_element(OTHER_POINTS_TAG);
        other.add_attrib("Name", &self.name);
        other.add_attrib("Points", self.points);
        true
    }
}

/// Another competitor's result kept for comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRun {
    /// Qualifying status.
    pub q: QStatus,
    /// Placement, 0 when unknown.
    pub place: i16,
    /// Dog or handler name.
    pub name: String,
    /// Jump height.
    pub height: String,
    /// Breed.
    pub breed: String,
    /// Run time in seconds.
    pub time: f64,
    /// Score as shown on the results sheet.
    pub score: String,
    /// Free text.
    pub note: String,
}

impl ReferenceRun {
    /// Reads a `ReferenceRun` element.
    pub fn load(tree: &Element, _version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let raw_q = match tree.attrib::<String>("Q") {
            AttribLookup::Found(q) => q,
            _ => return ctx.missing(REF_RUN_TAG, "Q"),
        };
        let Some(q) = QStatus::from_attrib(&raw_q) else {
            return ctx.invalid(REF_RUN_TAG, "Q", Some(&raw_q));
        };
        let mut reference = ReferenceRun {
            q,
            place: tree.attrib("Place").found().unwrap_or(0),
            height: tree.attrib("Height").found().unwrap_or_default(),
            time: tree.attrib("Time").found().unwrap_or(0.0),
            ..ReferenceRun::default()
        };
        for child in tree.children() {
            let text = child.value().to_string();
            match child.name() {
                "Name" => reference.name = text,
                "Breed" => reference.breed = text,
                "ScoreOrFaults" => reference.score = text,
                "Note" => reference.note = text,
                _ => {}
            }
        }
        Some(reference)
    }

    /// Appends a `ReferenceRun` element.
    pub fn save(&self, parent: &mut Element) -> bool {
        let reference = parent.add_element(REF_RUN_TAG);
        reference.add_attrib("Q", self.q.as_str());
        reference.add_attrib("Place", self.place);
        reference.add_attrib("Time", self.time);
        if !self.height.is_empty() {
            reference.add_attrib("Height", &self.height);
        }
        reference.add_text_element("Name", &self.name);
        reference.add_text_element("Breed", &self.breed);
        reference.add_text_element("ScoreOrFaults", &self.score);
        reference.add_text_element("Note", &self.note);
        true
    }
}

/// One run at a trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Day the run took place.
    pub date: Date,
    /// Division name.
    pub division: String,
    /// The leaf level: a sublevel name when the level has sublevels.
    pub level: String,
    /// Jump height.
    pub height: String,
    /// Event name.
    pub event: String,
    /// Extra event name for events with subnames.
    pub sub_name: String,
    /// Index into the trial's clubs of the club whose venue scores this run.
    pub club: usize,
    /// Weather and ring conditions.
    pub conditions: String,
    /// Judge name.
    pub judge: String,
    /// Handler name.
    pub handler: String,
    /// Partners for pairs and team runs.
    pub partners: Vec<Partner>,
    /// Course numbers.
    pub scoring: RunScoring,
    /// Qualifying status.
    pub q: QStatus,
    /// Placement, 0 when unknown.
    pub place: i16,
    /// Negative when unknown.
    pub in_class: i16,
    /// Negative when unknown.
    pub dogs_qd: i16,
    /// Points in user-defined categories.
    pub other_points: Vec<RunOtherPoints>,
    /// Faults and free text.
    pub notes: Notes,
    /// Other competitors kept for comparison.
    pub ref_runs: Vec<ReferenceRun>,
    /// Web links.
    pub links: BTreeSet<String>,
    /// Multi-Qs this run helped earn. Recomputed, never saved.
    #[serde(skip)]
    pub multiqs: Vec<String>,
}

impl RunKey for Run {
    fn division(&self) -> &str {
        &self.division
    }

    fn level(&self) -> &str {
        &self.level
    }

    fn event(&self) -> &str {
        &self.event
    }
}

impl Run {
    /// A run with default scoring and no result yet.
    pub fn new(
        date: Date,
        division: impl Into<String>,
        level: impl Into<String>,
        event: impl Into<String>,
    ) -> Self {
        Self {
            date,
            division: division.into(),
            level: level.into(),
            height: String::new(),
            event: event.into(),
            sub_name: String::new(),
            club: 0,
            conditions: String::new(),
            judge: String::new(),
            handler: String::new(),
            partners: Vec::new(),
            scoring: RunScoring::default(),
            q: QStatus::Na,
            place: 0,
            in_class: -1,
            dogs_qd: -1,
            other_points: Vec::new(),
            notes: Notes::default(),
            ref_runs: Vec::new(),
            links: BTreeSet::new(),
            multiqs: Vec::new(),
        }
    }

    /// Loads a run. The event must resolve through one of the trial's clubs.
    pub fn load(
        config: &Config,
        clubs: &[Club],
        tree: &Element,
        version: Version,
        ctx: &mut LoadContext<'_>,
    ) -> Option<Self> {
        let date = ctx.required_date(tree, "Date")?;
        let division = ctx.required_name(tree, "Division")?;
        let level = ctx.required_name(tree, "Level")?;
        let event = ctx.required_name(tree, "Event")?;
        let mut run = Run::new(date, division, level, event);
        // Height has been optional since 8.1.
        run.height = tree.attrib("Height").found().unwrap_or_default();
        run.sub_name = tree.attrib("SubName").found().unwrap_or_default();

        let preferred = if version >= Version::new(15, 0) {
            tree.attrib::<u16>("Club").found().map(usize::from)
        } else {
            None
        };
        let Some((club, event, scoring)) = find_club_event(
            config,
            clubs,
            preferred,
            &run.event,
            &run.division,
            &run.level,
            Some(run.date),
        ) else {
            let mut detail = format!("{} ({}/{})", run.event, run.division, run.level);
            for club in clubs {
                detail.push_str(&format!("\n{} [{}]", club.name, club.venue));
            }
            return ctx.invalid(TAG, "Event", Some(&detail));
        };
        run.club = club;
        run.scoring = RunScoring::new(
            crate::scoring::translate_config_scoring(scoring.style),
            scoring.drop_fractions,
        );

        for child in tree.children() {
            match child.name() {
                "Conditions" => run.conditions = child.value().to_string(),
                "Judge" => run.judge = child.value().to_string(),
                "Handler" => run.handler = child.value().to_string(),
                // A bad partner, note or reference run drops only itself.
                PARTNER_TAG => run.partners.extend(Partner::load(child, version, ctx)),
                notes::TAG => run.notes = Notes::load(child, version, ctx).unwrap_or_default(),
                REF_RUN_TAG => run.ref_runs.extend(ReferenceRun::load(child, version, ctx)),
                LINK_TAG => {
                    if !child.value().is_empty() {
                        run.links.insert(child.value().to_string());
                    }
                }
                PLACEMENT_TAG => run.load_placement(config, child, version, ctx)?,
                name if ScoringType::from_tag(name).is_some() => {
                    if let Some(scoring) = RunScoring::load(config.version, event, scoring, child, version, ctx) {
                        run.scoring = scoring;
                    }
                }
                _ => {}
            }
        }
        Some(run)
    }

    fn load_placement(
        &mut self,
        config: &Config,
        tree: &Element,
        version: Version,
        ctx: &mut LoadContext<'_>,
    ) -> Option<()> {
        let raw_q = ctx.required_name(tree, "Q")?;
        self.q = match QStatus::from_attrib(&raw_q) {
            Some(q) => q,
            None => return ctx.invalid_choice(PLACEMENT_TAG, "Q", &["NA", "Q", "NQ", "E", "DNR", "SQ"]),
        };
        self.place = tree.attrib("Place").found().unwrap_or(0);
        self.in_class = tree.attrib("InClass").found().unwrap_or(-1);
        self.dogs_qd = tree.attrib("DogsQd").found().unwrap_or(-1);
        for child in tree.children_named(OTHER_POINTS_TAG) {
            self.other_points.extend(RunOtherPoints::load(config, child, version, ctx));
        }
        Some(())
    }

    /// Appends a `Run` element.
    pub fn save(&self, parent: &mut Element) -> bool {
        let run = parent.add_element(TAG);
        run.add_attrib("Date", self.date);
        run.add_attrib("Division", &self.division);
        run.add_attrib("Level", &self.level);
        if !self.height.is_empty() {
            run.add_attrib("Height", &self.height);
        }
        run.add_attrib("Event", &self.event);
        if !self.sub_name.is_empty() {
            run.add_attrib("SubName", &self.sub_name);
        }
        if self.club > 0 {
            run.add_attrib("Club", self.club as u32);
        }
        run.add_text_element("Conditions", &self.conditions);
        run.add_text_element("Judge", &self.judge);
        run.add_text_element("Handler", &self.handler);
        if !self.partners.iter().all(|partner| partner.save(run)) || !self.scoring.save(run) {
            return false;
        }
        if self.place > 0 || self.q != QStatus::Na {
            let placement = run.add_element(PLACEMENT_TAG);
            placement.add_attrib("Q", self.q.as_str());
            placement.add_attrib("Place", self.place);
            if self.in_class >= 0 {
                placement.add_attrib("InClass", self.in_class);
            }
            if self.dogs_qd >= 0 {
                placement.add_attrib("DogsQd", self.dogs_qd);
            }
            if !self.other_points.iter().all(|other| other.save(placement)) {
                return false;
            }
        }
        if !self.notes.save(run) || !self.ref_runs.iter().all(|reference| reference.save(run)) {
            return false;
        }
        for link in &self.links {
            run.add_text_element(LINK_TAG, link);
        }
        true
    }

    /// Number of entries in the `name` other points category.
    pub fn other_points_in_use(&self, name: &str) -> usize {
        self.other_points.iter().filter(|other| other.name == name).count()
    }

    /// Renames an other points category. Returns the entries changed.
    pub fn rename_other_points(&mut self, old: &str, new: &str) -> usize {
        let mut count = 0;
        for other in self.other_points.iter_mut().filter(|other| other.name == old) {
            other.name = new.to_string();
            count += 1;
        }
        count
    }

    /// Drops an other points category. Returns the entries removed.
    pub fn delete_other_points(&mut self, name: &str) -> usize {
        let before = self.other_points.len();
        self.other_points.retain(|other| other.name != name);
        before - self.other_points.len()
    }

    /// Score under the given method, in the units its style ranks by.
    pub fn score(&self, scoring: &Scoring) -> f64 {
        let s = &self.scoring;
        match s.kind {
            ScoringType::ByTime => {
                let faults = f64::from(s.course_faults) + s.time_faults(scoring);
                match scoring.style {
                    ScoringStyle::TimePlusFaults => faults + s.time,
                    ScoringStyle::Faults100ThenTime => 100.0 - faults,
                    ScoringStyle::Faults200ThenTime => 200.0 - faults,
                    _ => faults,
                }
            }
            ScoringType::ByOpenClose => {
                let mut pts = f64::from(s.open_pts) + f64::from(s.close_pts) - f64::from(s.course_faults);
                if scoring.subtract_time_faults {
                    pts -= s.time_faults(scoring);
                }
                pts
            }
            ScoringType::ByPoints => {
                let mut pts = f64::from(s.open_pts) - f64::from(s.course_faults);
                if scoring.subtract_time_faults {
                    pts -= s.time_faults(scoring);
                }
                pts
            }
        }
    }

    /// Title points earned under the given method. Zero unless qualified.
    pub fn title_points(&self, scoring: &Scoring) -> f64 {
        let s = &self.scoring;
        self.counted_faults(scoring).map_or(0.0, |faults| {
            scoring.title_points(faults, s.time, s.sct, self.place, self.in_class) + self.bonus_points(scoring)
        })
    }

    /// Lifetime points toward the total `name`. Zero unless qualified.
    pub fn lifetime_points(&self, scoring: &Scoring, name: &str) -> f64 {
        self.counted_faults(scoring).map_or(0.0, |faults| {
            scoring.lifetime_points(name, faults, self.speed_points(scoring)) + self.bonus_points(scoring)
        })
    }

    /// Whole seconds under course time, scaled by the place multiplier.
    pub fn speed_points(&self, scoring: &Scoring) -> i16 {
        let s = &self.scoring;
        if !scoring.speed_points || !self.q.qualified() || s.time <= 0.0 || s.sct <= 0.0 {
            return 0;
        }
        let mut pts = ((s.sct - s.time) as i16).max(0);
        if self.place > 0 {
            if let Some(mult) = scoring.speed_multiplier(self.place) {
                pts = (f64::from(pts) * mult) as i16;
            }
        }
        pts
    }

    /// Placement points `scoring` grants for this run.
    pub fn placement_points(&self, scoring: &Scoring) -> f64 {
        scoring.placement_points(self.place)
    }

    fn bonus_points(&self, scoring: &Scoring) -> f64 {
        if scoring.bonus_points { self.scoring.bonus_title_pts } else { 0.0 }
    }

    /// Faults a points table is looked up with, or `None` when the run
    /// earns nothing.
    fn counted_faults(&self, scoring: &Scoring) -> Option<f64> {
        if !self.q.qualified() {
            return None;
        }
        let s = &self.scoring;
        match s.kind {
            ScoringType::ByTime => {
                let mut faults = f64::from(s.course_faults) + s.time_faults(scoring);
                if scoring.style != ScoringStyle::TimePlusFaults {
                    return Some(faults);
                }
                if scoring.clean_q && faults > 0.0 {
                    return None;
                }
                if s.sct > 0.0 {
                    // Faults become the total over course time.
                    faults = (faults + s.time - s.sct).max(0.0);
                }
                Some(faults)
            }
            ScoringType::ByOpenClose | ScoringType::ByPoints => {
                let needed = if s.kind == ScoringType::ByOpenClose {
                    if s.open_pts < s.need_open_pts || s.close_pts < s.need_close_pts {
                        return None;
                    }
                    f64::from(s.need_open_pts) + f64::from(s.need_close_pts)
                } else {
                    if s.open_pts < s.need_open_pts {
                        return None;
                    }
                    f64::from(s.need_open_pts)
                };
                let mut time_faults = 0.0;
                if scoring.time_faults_under || scoring.time_faults_over {
                    time_faults = s.time_faults(scoring);
                    // Enough points even after subtraction means the faults do not count.
                    if time_faults > 0.0 && scoring.subtract_time_faults && needed <= self.score(scoring) {
                        time_faults = 0.0;
                    }
                }
                Some(time_faults)
            }
        }
    }

    /// Report line for a run removed during an update.
    pub(crate) fn describe(&self, venue: &str) -> String {
        format!(
            "   {} {} {} {}/{}\n",
            self.date, venue, self.event, self.division, self.level
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Division, Event, LifetimePoints, Level, PlaceInfo, TitlePoints, Venue},
        error::ErrorLog,
        localization::English,
        types::CURRENT_DOC_VERSION,
    };

    fn config() -> Config {
        let mut venue = Venue::new("USDAA");
        let mut div = Division::new("Championship");
        div.levels.push(Level::new("Masters"));
        venue.divisions.push(div);
        let mut standard = Event::new("Standard");
        standard.has_table = true;
        let mut scoring = Scoring::new("*", "*", ScoringStyle::FaultsThenTime);
        scoring.title_points.push(TitlePoints::new(1.0, 0.0));
        standard.scorings.push(scoring);
        venue.events.push(standard);
        let mut snooker = Event::new("Snooker");
        snooker.scorings.push(Scoring::new("*", "*", ScoringStyle::ScoreThenTime));
        venue.events.push(snooker);

        let mut config = Config {
            version: 10,
            ..Config::default()
        };
        config.venues.push(venue);
        config
    }

    fn clubs() -> Vec<Club> {
        vec![Club::new("Dog Sports Club", "USDAA")]
    }

    fn day() -> Date {
        Date::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn reload(run: &Run) -> (Option<Run>, ErrorLog) {
        let mut root = Element::new("Trial");
        assert!(run.save(&mut root));
        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        let loaded = Run::load(&config(), &clubs(), &root.children()[0], CURRENT_DOC_VERSION, &mut ctx);
        (loaded, log)
    }

    #[test]
    fn full_run_survives_save() {
        let mut run = Run::new(day(), "Championship", "Masters", "Standard");
        run.height = "22".into();
        run.judge = "Smith".into();
        run.q = QStatus::Q;
        run.place = 1;
        run.in_class = 14;
        run.scoring.has_table = true;
        run.scoring.time = 41.5;
        run.scoring.sct = 50.0;
        run.scoring.yards = 180.0;
        run.partners.push(Partner {
            handler: "Pat".into(),
            dog: "Zip".into(),
            reg_num: String::new(),
        });
        run.ref_runs.push(ReferenceRun {
            q: QStatus::Q,
            place: 2,
            name: "Rex".into(),
            time: 42.0,
            ..ReferenceRun::default()
        });
        run.links.insert("video.mp4".into());
        run.notes.faults.push("Bar".into());

        let (loaded, log) = reload(&run);
        assert!(log.is_empty(), "{}", log.text());
        assert_eq!(loaded, Some(run));
    }

    #[test]
    fn unresolved_event_names_the_clubs() {
        let run = Run::new(day(), "Championship", "Masters", "Gamblers");
        let (loaded, log) = reload(&run);
        assert!(loaded.is_none());
        assert!(log.text().contains("Gamblers (Championship/Masters)\nDog Sports Club [USDAA]"));
    }

    #[test]
    fn points_events_need_their_minimum() {
        let config = config();
        let scoring = &config.venues[0].events[1].scorings[0];
        let mut run = Run::new(day(), "Championship", "Masters", "Snooker");
        run.scoring.kind = ScoringType::ByPoints;
        run.scoring.need_open_pts = 37;
        run.scoring.open_pts = 40;
        run.scoring.course_faults = 1;
        assert_eq!(run.score(scoring), 39.0);
        run.q = QStatus::Q;
        assert_eq!(run.title_points(scoring), 0.0);
    }

    #[test]
    fn clean_run_earns_configured_points() {
        let config = config();
        let scoring = &config.venues[0].events[0].scorings[0];
        let mut run = Run::new(day(), "Championship", "Masters", "Standard");
        run.scoring.sct = 50.0;
        run.scoring.time = 45.0;
        assert_eq!(run.title_points(scoring), 0.0);
        run.q = QStatus::Q;
        assert_eq!(run.title_points(scoring), 1.0);
        run.scoring.time = 52.0;
        assert_eq!(run.title_points(scoring), 0.0);
    }

    #[test]
    fn speed_and_lifetime_points_follow_place() {
        let mut scoring = Scoring::new("*", "*", ScoringStyle::FaultsThenTime);
        scoring.speed_points = true;
        scoring.place_info = vec![PlaceInfo::new(1, 2.0, true), PlaceInfo::new(2, 1.5, true)];
        scoring.lifetime_points = vec![
            LifetimePoints::new("", 1.0, 5.0),
            LifetimePoints::with_speed_points("Speed", 0.0),
        ];
        scoring.placements = vec![PlaceInfo::new(-1, 1.0, true), PlaceInfo::new(1, 3.0, true)];

        let mut run = Run::new(day(), "Championship", "Masters", "Standard");
        run.scoring.sct = 50.0;
        run.scoring.time = 40.5;
        run.place = 2;
        assert_eq!(run.speed_points(&scoring), 0);
        run.q = QStatus::Q;
        assert_eq!(run.speed_points(&scoring), 13);
        assert_eq!(run.lifetime_points(&scoring, "Speed"), 13.0);
        assert_eq!(run.lifetime_points(&scoring, ""), 1.0);
        run.place = 1;
        assert_eq!(run.speed_points(&scoring), 18);
        run.place = 5;
        assert_eq!(run.speed_points(&scoring), 9);

        run.scoring.course_faults = 3;
        assert_eq!(run.lifetime_points(&scoring, "Speed"), 0.0);
        assert_eq!(run.lifetime_points(&scoring, ""), 1.0);

        assert_eq!(run.placement_points(&scoring), 1.0);
        run.place = 1;
        assert_eq!(run.placement_points(&scoring), 3.0);
        run.place = 0;
        assert_eq!(run.placement_points(&scoring), 0.0);
    }
}

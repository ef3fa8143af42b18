use serde::{Deserialize, Serialize};

use crate::{
    config::{Event, Scoring},
    element::{AttribLookup, Element},
    error::LoadContext,
    localization::Message,
    scoring::translate_config_scoring,
    types::{ConfigVersion, ScoringStyle, ScoringType, Version},
};

/// The numbers recorded for one run. Which fields matter depends on `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunScoring {
    /// Which fields apply.
    pub kind: ScoringType,
    /// Copied from the scoring method's drop-fractions flag.
    pub round_time_faults: bool,
    /// Run included the table.
    pub has_table: bool,
    /// Table flag still unresolved from a pre-8.6 document.
    #[serde(skip)]
    pub convert_table: bool,
    /// Course faults.
    pub course_faults: i16,
    /// Run time in seconds.
    pub time: f64,
    /// Standard course time.
    pub sct: f64,
    /// Second course time, for two-SCT events.
    pub sct2: f64,
    /// Course length.
    pub yards: f64,
    /// Opening points needed to qualify.
    pub need_open_pts: i16,
    /// Closing points needed to qualify.
    pub need_close_pts: i16,
    /// Opening points earned.
    pub open_pts: i16,
    /// Closing points earned.
    pub close_pts: i16,
    /// Extra title points awarded on top of the table.
    pub bonus_title_pts: f64,
}

impl Default for RunScoring {
    fn default() -> Self {
        Self::new(ScoringType::ByTime, false)
    }
}

impl RunScoring {
    /// Empty scoring of `kind`.
    pub fn new(kind: ScoringType, round_time_faults: bool) -> Self {
        Self {
            kind,
            round_time_faults,
            has_table: false,
            convert_table: false,
            course_faults: 0,
            time: 0.0,
            sct: 0.0,
            sct2: 0.0,
            yards: 0.0,
            need_open_pts: 0,
            need_close_pts: 0,
            open_pts: 0,
            close_pts: 0,
            bonus_title_pts: 0.0,
        }
    }

    /// Reads a `ByTime`, `ByOpenClose` or `ByPoints` element. The shape is
    /// dictated by the resolved scoring method; a tag that disagrees with it
    /// is ignored.
    pub fn load(
        config_version: ConfigVersion,
        event: &Event,
        scoring: &Scoring,
        tree: &Element,
        version: Version,
        ctx: &mut LoadContext<'_>,
    ) -> Option<Self> {
        let kind = translate_config_scoring(scoring.style);
        if ScoringType::from_tag(tree.name()) != Some(kind) {
            return None;
        }
        let mut run = RunScoring::new(kind, scoring.drop_fractions);
        run.course_faults = tree.attrib("CourseFaults").found().unwrap_or(0);
        run.time = tree.attrib("Time").found().unwrap_or(0.0);
        run.sct = tree.attrib("SCT").found().unwrap_or(0.0);
        run.bonus_title_pts = tree.attrib("BonusTitlePts").found().unwrap_or(0.0);

        match kind {
            ScoringType::ByTime => {
                if version < Version::new(8, 6) {
                    // 8.4/8.5 stored whether the table counted against YPS.
                    // Only an explicit "n" tells us there was a table.
                    run.convert_table = true;
                    if tree.attrib::<bool>("TableInYPS").found() == Some(false) {
                        run.has_table = true;
                        run.convert_table = false;
                    }
                } else {
                    match tree.attrib::<bool>("hasTable") {
                        AttribLookup::Found(table) => run.has_table = table,
                        AttribLookup::NotFound => {}
                        AttribLookup::Invalid => {
                            let detail = ctx.loc.message(&Message::ValidValuesBool);
                            ctx.log(Message::InvalidAttributeValue {
                                element: tree.name(),
                                attrib: "hasTable",
                                detail: Some(&detail),
                            });
                        }
                    }
                }
                // Older files could carry a stale table flag on non-table events.
                if run.has_table && version < Version::new(12, 6) && config_version >= 3 && !event.has_table {
                    run.has_table = false;
                }
                run.yards = tree.attrib("Yards").found().unwrap_or(0.0);
            }
            ScoringType::ByOpenClose => {
                run.sct2 = tree.attrib("SCT2").found().unwrap_or(0.0);
                run.need_open_pts = tree.attrib("NeedOpenPts").found().unwrap_or(0);
                run.need_close_pts = tree.attrib("NeedClosePts").found().unwrap_or(0);
                run.open_pts = tree.attrib("OpenPts").found().unwrap_or(0);
                run.close_pts = tree.attrib("ClosePts").found().unwrap_or(0);
            }
            ScoringType::ByPoints => {
                run.need_open_pts = tree.attrib("NeedPts").found().unwrap_or(0);
                run.open_pts = tree.attrib("Points").found().unwrap_or(0);
            }
        }
        Some(run)
    }

    /// Appends a `Scoring` element.
    pub fn save(&self, parent: &mut Element) -> bool {
        let scoring = parent.add_element(self.kind.tag());
        match self.kind {
            ScoringType::ByTime => {
                if self.has_table {
                    scoring.add_attrib("hasTable", true);
                }
                scoring.add_attrib("CourseFaults", self.course_faults);
                scoring.add_attrib("Time", self.time);
                scoring.add_attrib("SCT", self.sct);
                scoring.add_attrib("Yards", self.yards);
            }
            ScoringType::ByOpenClose => {
                if self.course_faults > 0 {
                    scoring.add_attrib("CourseFaults", self.course_faults);
                }
                scoring.add_attrib("Time", self.time);
                if self.sct > 0.0 {
                    scoring.add_attrib("SCT", self.sct);
                }
                if self.sct2 > 0.0 {
                    scoring.add_attrib("SCT2", self.sct2);
                }
                scoring.add_attrib("NeedOpenPts", self.need_open_pts);
                scoring.add_attrib("NeedClosePts", self.need_close_pts);
                scoring.add_attrib("OpenPts", self.open_pts);
                scoring.add_attrib("ClosePts", self.close_pts);
            }
            ScoringType::ByPoints => {
                if self.course_faults > 0 {
                    scoring.add_attrib("CourseFaults", self.course_faults);
                }
                scoring.add_attrib("Time", self.time);
                if self.sct > 0.0 {
                    scoring.add_attrib("SCT", self.sct);
                }
                scoring.add_attrib("NeedPts", self.need_open_pts);
                scoring.add_attrib("Points", self.open_pts);
            }
        }
        if self.bonus_title_pts > 0.0 {
            scoring.add_attrib("BonusTitlePts", self.bonus_title_pts);
        }
        true
    }

    /// Switches the recorded shape, keeping the numbers already entered.
    pub fn set_type(&mut self, kind: ScoringType, round_time_faults: bool) {
        self.kind = kind;
        self.round_time_faults = round_time_faults;
    }

    /// Time faults under the given scoring method, already multiplied.
    pub fn time_faults(&self, scoring: &Scoring) -> f64 {
        let mut time_sct = self.sct;
        let mut under = false;
        let mut over = self.kind == ScoringType::ByTime;
        if self.kind != ScoringType::ByTime {
            // Gamble-style events add the second course time.
            time_sct += self.sct2;
            under = scoring.time_faults_under;
            over = scoring.time_faults_over;
        } else if scoring.style == ScoringStyle::TimePlusFaults {
            under = scoring.time_faults_under;
            over = scoring.time_faults_over;
        }

        let mut faults = 0.0;
        if time_sct > 0.0 {
            if under {
                let time = if self.round_time_faults { self.time.ceil() } else { self.time };
                if time < time_sct {
                    faults = time_sct - time;
                }
            }
            if over {
                let time = if self.round_time_faults { self.time.floor() } else { self.time };
                if time > time_sct {
                    faults = time - time_sct;
                }
            }
        }
        faults * f64::from(scoring.time_fault_multiplier)
    }

    /// Yards per second, when both yardage and time are known.
    pub fn yps(&self) -> Option<f64> {
        (self.kind == ScoringType::ByTime && self.yards > 0.0 && self.time > 0.0).then(|| self.yards / self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorLog, localization::English};

    fn scoring(style: ScoringStyle) -> Scoring {
        Scoring::new("*", "*", style)
    }

    #[test]
    fn no_time_faults_without_course_time() {
        let run = RunScoring {
            time: 50.0,
            ..RunScoring::default()
        };
        assert_eq!(run.time_faults(&scoring(ScoringStyle::FaultsThenTime)), 0.0);
    }

    #[test]
    fn under_time_rounds_up_and_multiplies() {
        let mut config = scoring(ScoringStyle::TimePlusFaults);
        config.time_faults_under = true;
        config.time_fault_multiplier = 2;
        let run = RunScoring {
            time: 89.4,
            sct: 100.0,
            round_time_faults: true,
            ..RunScoring::default()
        };
        assert_eq!(run.time_faults(&config), 20.0);
    }

    #[test]
    fn plain_by_time_counts_over_only() {
        let mut config = scoring(ScoringStyle::FaultsThenTime);
        config.time_faults_under = true;
        let mut run = RunScoring {
            time: 90.0,
            sct: 100.0,
            ..RunScoring::default()
        };
        assert_eq!(run.time_faults(&config), 0.0);
        run.time = 103.5;
        assert_eq!(run.time_faults(&config), 3.5);
    }

    #[test]
    fn open_close_adds_second_course_time() {
        let mut config = scoring(ScoringStyle::OcScoreThenTime);
        config.time_faults_over = true;
        let run = RunScoring {
            kind: ScoringType::ByOpenClose,
            time: 50.0,
            sct: 30.0,
            sct2: 15.0,
            ..RunScoring::default()
        };
        assert_eq!(run.time_faults(&config), 5.0);
    }

    #[test]
    fn legacy_table_flag_waits_for_conversion() {
        let event = Event::new("Standard");
        let config = scoring(ScoringStyle::FaultsThenTime);
        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);

        let plain = Element::new("ByTime");
        let run = RunScoring::load(2, &event, &config, &plain, Version::new(8, 4), &mut ctx).expect("loads");
        assert!(run.convert_table);
        assert!(!run.has_table);

        let mut tabled = Element::new("ByTime");
        tabled.add_attrib("TableInYPS", false);
        let run = RunScoring::load(2, &event, &config, &tabled, Version::new(8, 4), &mut ctx).expect("loads");
        assert!(!run.convert_table);
        assert!(run.has_table);
    }

    #[test]
    fn stale_table_flag_is_cleared_on_non_table_events() {
        let event = Event::new("Jumpers");
        let config = scoring(ScoringStyle::FaultsThenTime);
        let mut tree = Element::new("ByTime");
        tree.add_attrib("hasTable", true);
        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        let run = RunScoring::load(3, &event, &config, &tree, Version::new(12, 5), &mut ctx).expect("loads");
        assert!(!run.has_table);
        let run = RunScoring::load(3, &event, &config, &tree, Version::new(12, 6), &mut ctx).expect("loads");
        assert!(run.has_table);
    }

    #[test]
    fn mismatched_tag_is_ignored() {
        let event = Event::new("Snooker");
        let config = scoring(ScoringStyle::ScoreThenTime);
        let tree = Element::new("ByTime");
        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        assert!(RunScoring::load(5, &event, &config, &tree, Version::new(15, 3), &mut ctx).is_none());
    }
}

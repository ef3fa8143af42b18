use serde::{Deserialize, Serialize};

use super::division::{Division, verify_level};
use crate::{
    element::{AttribLookup, Element},
    error::LoadContext,
    localization::{Localization, Message},
    scoring::calculator,
    types::{CalcPointsType, Date, ScoringStyle, Version},
};

/// Element name of a scoring method.
pub const TAG: &str = "Scoring";
/// Element name of a title-points row.
pub const TITLE_POINTS_TAG: &str = "TitlePoints";
/// Element name of a lifetime-points row.
pub const LIFETIME_POINTS_TAG: &str = "LifetimePoints";
/// Element name of a place row.
pub const PLACE_INFO_TAG: &str = "PlaceInfo";
/// Element wrapping the placement-points rows.
pub const PLACEMENTS_TAG: &str = "Placements";
/// Lifetime rows were saved under this name before 14.4.
const LEGACY_LIFETIME_TAG: &str = "LifeTime";

/// Points awarded for a qualifying run with at most `faults` faults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TitlePoints {
    /// Points awarded.
    pub points: f64,
    /// Most faults that still earn the points.
    pub faults: f64,
    /// Calculator. Only `Normal` uses the points and faults.
    pub kind: CalcPointsType,
}

impl TitlePoints {
    /// A row for the normal calculator.
    pub fn new(points: f64, faults: f64) -> Self {
        Self {
            points,
            faults,
            kind: CalcPointsType::Normal,
        }
    }

    /// Before 10.0 a row could also count toward lifetime points; such rows
    /// are copied into `lifetime`.
    pub fn load(
        tree: &Element,
        version: Version,
        lifetime: &mut Vec<LifetimePoints>,
        ctx: &mut LoadContext<'_>,
    ) -> Option<Self> {
        let kind = tree
            .attrib::<String>("type")
            .found()
            .map(|raw| CalcPointsType::from_attrib(&raw))
            .unwrap_or_default();
        let mut row = TitlePoints {
            kind,
            ..TitlePoints::default()
        };
        if kind == CalcPointsType::Normal {
            row.points = match tree.attrib::<f64>("Points") {
                AttribLookup::Found(points) => points,
                _ => return ctx.missing(TITLE_POINTS_TAG, "Points"),
            };
            row.faults = match tree.attrib::<f64>("Faults") {
                AttribLookup::Found(faults) => faults,
                _ => return ctx.missing(TITLE_POINTS_TAG, "Faults"),
            };
            if version < Version::new(10, 0)
                && tree.attrib::<bool>(LEGACY_LIFETIME_TAG).found() == Some(true)
                && !lifetime.iter().any(|life| life.name.is_empty() && life.faults == row.faults)
            {
                lifetime.push(LifetimePoints::new("", row.points, row.faults));
            }
        }
        Some(row)
    }

    /// Writes the row under `parent`.
    pub fn save(&self, parent: &mut Element) -> bool {
        let row = parent.add_element(TITLE_POINTS_TAG);
        if self.kind == CalcPointsType::Normal {
            row.add_attrib("Points", self.points);
            row.add_attrib("Faults", self.faults);
        } else {
            row.add_attrib("type", self.kind.as_str());
        }
        true
    }

    /// Display name of the row.
    pub fn generic_name(&self, loc: &dyn Localization) -> String {
        calculator(self.kind).generic_name(loc, self.points, self.faults)
    }
}

/// Lifetime points for a qualifying run with at most `faults` faults,
/// tallied under a named lifetime total. The empty name is the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifetimePoints {
    /// Lifetime total the row counts toward.
    pub name: String,
    /// Award the run's speed points instead of a fixed amount.
    pub speed_points: bool,
    /// Points awarded.
    pub points: f64,
    /// Most faults that still earn the points.
    pub faults: f64,
}

impl LifetimePoints {
    /// A fixed-points row.
    pub fn new(name: impl Into<String>, points: f64, faults: f64) -> Self {
        Self {
            name: name.into(),
            speed_points: false,
            points,
            faults,
        }
    }

    /// A row that awards the run's speed points.
    pub fn with_speed_points(name: impl Into<String>, faults: f64) -> Self {
        Self {
            name: name.into(),
            speed_points: true,
            points: 0.0,
            faults,
        }
    }

    /// Reads a row. Before 14.4 `Points` is required and the name is empty.
    pub fn load(tree: &Element, version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let mut row = LifetimePoints::default();
        if version < Version::new(14, 4) {
            // Points were required and rows had no name or speed flag.
            row.points = match tree.attrib::<f64>("Points") {
                AttribLookup::Found(points) => points,
                _ => return ctx.missing(LIFETIME_POINTS_TAG, "Points"),
            };
        } else {
            row.name = tree.attrib("Name").found().unwrap_or_default();
            row.speed_points = ctx.opt_bool(tree, "speedPts", false)?;
            row.points = tree.attrib("Points").found().unwrap_or(0.0);
        }
        row.faults = match tree.attrib::<f64>("Faults") {
            AttribLookup::Found(faults) => faults,
            _ => return ctx.missing(LIFETIME_POINTS_TAG, "Faults"),
        };
        Some(row)
    }

    /// Writes the row under `parent`.
    pub fn save(&self, parent: &mut Element) -> bool {
        let row = parent.add_element(LIFETIME_POINTS_TAG);
        if !self.name.is_empty() {
            row.add_attrib("Name", &self.name);
        }
        row.add_attrib("speedPts", self.speed_points);
        if !self.speed_points {
            row.add_attrib("Points", self.points);
        }
        row.add_attrib("Faults", self.faults);
        true
    }

    /// Display name of the row.
    pub fn generic_name(&self, loc: &dyn Localization) -> String {
        let points = (!self.speed_points).then_some(self.points);
        loc.message(&Message::LifetimePointsName {
            points,
            faults: self.faults,
        })
    }
}

/// A value tied to a finishing place: a speed-points multiplier or
/// placement points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaceInfo {
    /// Place -1 matches any placed run no other row covers.
    pub place: i16,
    /// Multiplier or points for the place.
    pub value: f64,
    /// The run must qualify.
    pub must_q: bool,
}

impl PlaceInfo {
    /// A row for `place`.
    pub fn new(place: i16, value: f64, must_q: bool) -> Self {
        Self { place, value, must_q }
    }

    /// Reads a row. `Place` and `Value` are required.
    pub fn load(tree: &Element, _version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let place = match tree.attrib::<i16>("Place") {
            AttribLookup::Found(place) => place,
            _ => return ctx.missing(PLACE_INFO_TAG, "Place"),
        };
        let value = match tree.attrib::<f64>("Value") {
            AttribLookup::Found(value) => value,
            _ => return ctx.missing(PLACE_INFO_TAG, "Value"),
        };
        let must_q = ctx.opt_bool(tree, "mustQ", true)?;
        Some(Self { place, value, must_q })
    }

    /// Writes the row under `parent`.
    pub fn save(&self, parent: &mut Element) -> bool {
        let row = parent.add_element(PLACE_INFO_TAG);
        row.add_attrib("Place", self.place);
        row.add_attrib("Value", self.value);
        if !self.must_q {
            row.add_attrib("mustQ", false);
        }
        true
    }

    /// Display name of the row.
    pub fn generic_name(&self, loc: &dyn Localization) -> String {
        loc.message(&Message::PlacementPointsName {
            points: self.value,
            place: self.place,
        })
    }

    /// Row for `place`. Places above zero fall back to the -1 row.
    pub fn find(rows: &[PlaceInfo], place: i16) -> Option<&PlaceInfo> {
        rows.iter()
            .find(|row| row.place == place)
            .or_else(|| if place > 0 { rows.iter().find(|row| row.place == -1) } else { None })
    }
}

/// One scoring method of an event, keyed by division, level and validity window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scoring {
    /// First day the method applies.
    pub valid_from: Option<Date>,
    /// Last day the method applies.
    pub valid_to: Option<Date>,
    /// Division or the wildcard.
    pub division: String,
    /// Level or the wildcard.
    pub level: String,
    /// How runs are ranked.
    pub style: ScoringStyle,
    /// Fractions of a fault are dropped.
    pub drop_fractions: bool,
    /// Only fault-free runs qualify.
    pub clean_q: bool,
    /// Time faults accrue under course time.
    pub time_faults_under: bool,
    /// Time faults accrue over course time.
    pub time_faults_over: bool,
    /// Time faults reduce the score.
    pub subtract_time_faults: bool,
    /// Time faults per second.
    pub time_fault_multiplier: i16,
    /// Free text.
    pub note: String,
    /// Opening points needed.
    pub opening_points: i16,
    /// Closing points needed.
    pub closing_points: i16,
    /// Runs can earn a super-Q.
    pub super_q: bool,
    /// Runs earn speed points.
    pub speed_points: bool,
    /// Runs can earn bonus title points.
    pub bonus_points: bool,
    /// Sorted by faults.
    pub title_points: Vec<TitlePoints>,
    /// Sorted by name, then faults.
    pub lifetime_points: Vec<LifetimePoints>,
    /// Speed-points multipliers by place. Saved only with `speed_points`.
    pub place_info: Vec<PlaceInfo>,
    /// Points awarded for placing. Sorted by place.
    pub placements: Vec<PlaceInfo>,
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            valid_from: None,
            valid_to: None,
            division: String::new(),
            level: String::new(),
            style: ScoringStyle::FaultsThenTime,
            drop_fractions: false,
            clean_q: false,
            time_faults_under: false,
            time_faults_over: false,
            subtract_time_faults: false,
            time_fault_multiplier: 1,
            note: String::new(),
            opening_points: 0,
            closing_points: 0,
            super_q: false,
            speed_points: false,
            bonus_points: false,
            title_points: Vec::new(),
            lifetime_points: Vec::new(),
            place_info: Vec::new(),
            placements: Vec::new(),
        }
    }
}

impl Scoring {
    /// A method for `division` and `level` with default rules.
    pub fn new(division: impl Into<String>, level: impl Into<String>, style: ScoringStyle) -> Self {
        Self {
            division: division.into(),
            level: level.into(),
            style,
            ..Self::default()
        }
    }

    /// Reads a method and migrates older layouts. Fails when the division and level are not configured.
    pub fn load(
        divisions: &[Division],
        tree: &Element,
        version: Version,
        ctx: &mut LoadContext<'_>,
    ) -> Option<Self> {
        let mut scoring = Scoring {
            valid_from: ctx.opt_date(tree, "ValidFrom")?,
            valid_to: ctx.opt_date(tree, "ValidTo")?,
            division: ctx.required_name(tree, "Division")?,
            level: ctx.required_name(tree, "Level")?,
            ..Scoring::default()
        };
        if !verify_level(divisions, &scoring.division, &scoring.level) {
            let detail = format!(
                "{}{}/{}",
                ctx.loc.message(&Message::InvalidDivLevel),
                scoring.division,
                scoring.level
            );
            return ctx.invalid(TAG, "Level", Some(&detail));
        }

        let raw_style = ctx.required_name(tree, "type")?;
        scoring.style = match ScoringStyle::from_attrib(&raw_style) {
            Some(style) => style,
            None => {
                let valid: Vec<&str> = ScoringStyle::ALL.iter().map(|s| s.as_str()).collect();
                return ctx.invalid_choice(TAG, "type", &valid);
            }
        };
        if scoring.style == ScoringStyle::Faults100ThenTime && version <= Version::new(3, 0) {
            scoring.drop_fractions = true;
        }

        // Read even on documents predating the attribute so hand edits survive.
        scoring.drop_fractions = ctx.opt_bool(tree, "dropFractions", scoring.drop_fractions)?;
        scoring.clean_q = ctx.opt_bool(tree, "cleanQ", false)?;
        scoring.time_faults_under = ctx.opt_bool(tree, "underTF", false)?;
        scoring.time_faults_over = ctx.opt_bool(tree, "overTF", false)?;
        scoring.subtract_time_faults = ctx.opt_bool(tree, "subtractTF", false)?;
        scoring.super_q = ctx.opt_bool(tree, "superQ", false)?;
        scoring.speed_points = if version < Version::new(10, 1) {
            ctx.opt_bool(tree, "machPts", false)?
        } else {
            ctx.opt_bool(tree, "speedPts", false)?
        };
        scoring.bonus_points = ctx.opt_bool(tree, "bonusPts", false)?;
        if scoring.speed_points && version < Version::new(12, 3) {
            scoring.place_info = vec![PlaceInfo::new(1, 2.0, true), PlaceInfo::new(2, 1.5, true)];
        }
        if let AttribLookup::Found(multiplier) = tree.attrib::<i16>("timeFault") {
            scoring.time_fault_multiplier = multiplier.max(1);
        }

        if version >= Version::new(5, 0) {
            scoring.opening_points = tree.attrib("OpeningPts").found().unwrap_or(0);
            scoring.closing_points = tree.attrib("ClosingPts").found().unwrap_or(0);
            for child in tree.children() {
                match child.name() {
                    "Note" => scoring.note = child.value().to_string(),
                    PLACE_INFO_TAG => scoring.place_info.push(PlaceInfo::load(child, version, ctx)?),
                    TITLE_POINTS_TAG => {
                        let row = TitlePoints::load(child, version, &mut scoring.lifetime_points, ctx)?;
                        scoring.title_points.push(row);
                    }
                    LIFETIME_POINTS_TAG | LEGACY_LIFETIME_TAG => {
                        if version >= Version::new(10, 0) {
                            let row = LifetimePoints::load(child, version, ctx)?;
                            scoring.lifetime_points.push(row);
                        }
                    }
                    PLACEMENTS_TAG => {
                        for place in child.children_named(PLACE_INFO_TAG) {
                            scoring.placements.push(PlaceInfo::load(place, version, ctx)?);
                        }
                    }
                    _ => {}
                }
            }
            scoring.sort_points();
        } else {
            // Pre-5 documents carried clean and faulted points as attributes.
            let clean = match tree.attrib::<i16>("Clean") {
                AttribLookup::Found(points) => points,
                _ => return ctx.missing(TAG, "Clean"),
            };
            if clean > 0 {
                scoring.title_points.push(TitlePoints::new(f64::from(clean), 0.0));
            }
            let faults_allowed: i16 = tree.attrib("FaultsAllowed").found().unwrap_or(0);
            let with_faults: i16 = tree.attrib("WithFaults").found().unwrap_or(0);
            if faults_allowed > 0 && with_faults > 0 {
                scoring
                    .title_points
                    .push(TitlePoints::new(f64::from(with_faults), f64::from(faults_allowed)));
            }
            if version >= Version::new(3, 0) {
                scoring.note = tree.value().to_string();
            }
        }
        Some(scoring)
    }

    /// Writes the method and its points tables under `parent`.
    pub fn save(&self, parent: &mut Element) -> bool {
        let scoring = parent.add_element(TAG);
        if let Some(from) = self.valid_from {
            scoring.add_attrib("ValidFrom", from);
        }
        if let Some(to) = self.valid_to {
            scoring.add_attrib("ValidTo", to);
        }
        scoring.add_attrib("Division", &self.division);
        scoring.add_attrib("Level", &self.level);
        scoring.add_attrib("type", self.style.as_str());
        for (attrib, set) in [
            ("dropFractions", self.drop_fractions),
            ("cleanQ", self.clean_q),
            ("underTF", self.time_faults_under),
            ("overTF", self.time_faults_over),
            ("subtractTF", self.subtract_time_faults),
            ("superQ", self.super_q),
            ("speedPts", self.speed_points),
            ("bonusPts", self.bonus_points),
        ] {
            if set {
                scoring.add_attrib(attrib, true);
            }
        }
        if self.time_fault_multiplier > 1 {
            scoring.add_attrib("timeFault", self.time_fault_multiplier);
        }
        if self.opening_points > 0 {
            scoring.add_attrib("OpeningPts", self.opening_points);
        }
        if self.closing_points > 0 {
            scoring.add_attrib("ClosingPts", self.closing_points);
        }
        scoring.add_text_element("Note", &self.note);
        if self.speed_points && !self.place_info.iter().all(|row| row.save(scoring)) {
            return false;
        }
        if !self.title_points.iter().all(|row| row.save(scoring))
            || !self.lifetime_points.iter().all(|row| row.save(scoring))
        {
            return false;
        }
        if !self.placements.is_empty() {
            let placements = scoring.add_element(PLACEMENTS_TAG);
            return self.placements.iter().all(|row| row.save(placements));
        }
        true
    }

    /// Inside the validity window. Open ends always match.
    pub fn is_valid_on(&self, date: Date) -> bool {
        !(self.valid_from.is_some_and(|from| date < from) || self.valid_to.is_some_and(|to| date > to))
    }

    /// Restores the lookup order of every points table.
    pub fn sort_points(&mut self) {
        self.title_points.sort_by(|a, b| a.faults.total_cmp(&b.faults));
        self.lifetime_points
            .sort_by(|a, b| a.name.cmp(&b.name).then(a.faults.total_cmp(&b.faults)));
        self.place_info.sort_by_key(|row| row.place);
        self.placements.sort_by_key(|row| row.place);
    }

    /// Title points earned by a qualifying run with `faults` faults. The
    /// first row sets the calculator for the whole table.
    pub fn title_points(&self, faults: f64, time: f64, sct: f64, place: i16, class_size: i16) -> f64 {
        let Some(first) = self.title_points.first() else {
            return 0.0;
        };
        let calc = calculator(first.kind);
        if !calc.allows_configuration() {
            return calc.points(0.0, time, sct, place, class_size);
        }
        self.title_points
            .iter()
            .find(|row| faults <= row.faults)
            .map(|row| calc.points(row.points, time, sct, place, class_size))
            .unwrap_or(0.0)
    }

    /// Lifetime points toward `name` for a qualifying run with `faults`
    /// faults. Speed rows award `speed_points` instead.
    pub fn lifetime_points(&self, name: &str, faults: f64, speed_points: i16) -> f64 {
        self.lifetime_points
            .iter()
            .find(|row| row.name == name && faults <= row.faults)
            .map_or(0.0, |row| if row.speed_points { f64::from(speed_points) } else { row.points })
    }

    /// Speed-points multiplier for a placed run. An unlisted place uses the
    /// place 0 row when there is one.
    pub fn speed_multiplier(&self, place: i16) -> Option<f64> {
        PlaceInfo::find(&self.place_info, place)
            .or_else(|| self.place_info.iter().find(|row| row.place == 0))
            .map(|row| row.value)
    }

    /// Points for finishing in `place`.
    pub fn placement_points(&self, place: i16) -> f64 {
        PlaceInfo::find(&self.placements, place).map_or(0.0, |row| row.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorLog, localization::English};

    fn standard() -> Vec<Division> {
        let mut div = Division::new("Standard");
        div.levels.push(super::super::division::Level::new("Novice"));
        vec![div]
    }

    #[test]
    fn pre_five_points_become_title_rows() {
        let mut tree = Element::new(TAG);
        tree.add_attrib("Division", "Standard");
        tree.add_attrib("Level", "Novice");
        tree.add_attrib("type", "Faults100ThenTime");
        tree.add_attrib("Clean", 10i16);
        tree.add_attrib("FaultsAllowed", 5i16);
        tree.add_attrib("WithFaults", 6i16);

        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        let scoring = Scoring::load(&standard(), &tree, Version::new(2, 0), &mut ctx).expect("loads");
        assert!(scoring.drop_fractions);
        assert_eq!(
            scoring.title_points,
            vec![TitlePoints::new(10.0, 0.0), TitlePoints::new(6.0, 5.0)]
        );
        assert_eq!(scoring.title_points(3.0, 0.0, 0.0, 0, 0), 6.0);
        assert_eq!(scoring.title_points(7.0, 0.0, 0.0, 0, 0), 0.0);
    }

    #[test]
    fn unknown_level_is_rejected() {
        let mut tree = Element::new(TAG);
        tree.add_attrib("Division", "Standard");
        tree.add_attrib("Level", "Masters");
        tree.add_attrib("type", "FaultsThenTime");

        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        assert!(Scoring::load(&standard(), &tree, Version::new(15, 3), &mut ctx).is_none());
        assert!(log.text().contains("Standard/Masters"));
    }

    #[test]
    fn validity_window_is_inclusive() {
        let mut scoring = Scoring::new("*", "*", ScoringStyle::FaultsThenTime);
        scoring.valid_from = Date::from_ymd_opt(2020, 1, 1);
        scoring.valid_to = Date::from_ymd_opt(2020, 12, 31);
        assert!(scoring.is_valid_on(Date::from_ymd_opt(2020, 1, 1).unwrap()));
        assert!(scoring.is_valid_on(Date::from_ymd_opt(2020, 12, 31).unwrap()));
        assert!(!scoring.is_valid_on(Date::from_ymd_opt(2021, 1, 1).unwrap()));
    }

    fn scoring_tree(version_attrs: &[(&str, &str)]) -> Element {
        let mut tree = Element::new(TAG);
        tree.add_attrib("Division", "Standard");
        tree.add_attrib("Level", "Novice");
        tree.add_attrib("type", "FaultsThenTime");
        for (name, value) in version_attrs {
            tree.add_attrib(name, *value);
        }
        tree
    }

    #[test]
    fn points_tables_survive_save() {
        let mut scoring = Scoring::new("Standard", "Novice", ScoringStyle::TimePlusFaults);
        scoring.speed_points = true;
        scoring.place_info = vec![PlaceInfo::new(1, 2.0, true), PlaceInfo::new(0, 1.0, false)];
        scoring.title_points.push(TitlePoints::new(10.0, 0.0));
        scoring.lifetime_points = vec![
            LifetimePoints::new("Gold", 5.0, 2.0),
            LifetimePoints::with_speed_points("", 0.0),
        ];
        scoring.placements = vec![PlaceInfo::new(2, 3.0, true), PlaceInfo::new(1, 5.0, false)];

        let mut root = Element::new("Event");
        assert!(scoring.save(&mut root));
        let saved = &root.children()[0];
        let order: Vec<&str> = saved.children().iter().map(Element::name).collect();
        assert_eq!(
            order,
            [PLACE_INFO_TAG, PLACE_INFO_TAG, TITLE_POINTS_TAG, LIFETIME_POINTS_TAG, LIFETIME_POINTS_TAG, PLACEMENTS_TAG]
        );

        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        let loaded = Scoring::load(&standard(), saved, Version::new(15, 3), &mut ctx).expect("loads");
        assert!(log.is_empty(), "{}", log.text());
        scoring.sort_points();
        assert_eq!(loaded, scoring);
        assert_eq!(loaded.lifetime_points[0].name, "");
        assert_eq!(loaded.placements[0].place, 1);
        assert_eq!(loaded.placement_points(2), 3.0);
        assert_eq!(loaded.speed_multiplier(4), Some(1.0));
    }

    #[test]
    fn speed_points_get_default_multipliers_before_12_3() {
        let tree = scoring_tree(&[("speedPts", "y")]);
        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        let old = Scoring::load(&standard(), &tree, Version::new(12, 2), &mut ctx).expect("loads");
        assert_eq!(old.place_info, vec![PlaceInfo::new(1, 2.0, true), PlaceInfo::new(2, 1.5, true)]);
        let new = Scoring::load(&standard(), &tree, Version::new(12, 3), &mut ctx).expect("loads");
        assert!(new.place_info.is_empty());
    }

    #[test]
    fn legacy_lifetime_rows_convert() {
        let mut tree = scoring_tree(&[]);
        let row = tree.add_element(TITLE_POINTS_TAG);
        row.add_attrib("Points", 2.0);
        row.add_attrib("Faults", 0.0);
        row.add_attrib(LEGACY_LIFETIME_TAG, true);
        let life = tree.add_element(LEGACY_LIFETIME_TAG);
        life.add_attrib("Points", 1.0);
        life.add_attrib("Faults", 5.0);

        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        // Before 10.0 only the flag on the title row counts.
        let v9 = Scoring::load(&standard(), &tree, Version::new(9, 0), &mut ctx).expect("loads");
        assert_eq!(v9.lifetime_points, vec![LifetimePoints::new("", 2.0, 0.0)]);
        let v12 = Scoring::load(&standard(), &tree, Version::new(12, 0), &mut ctx).expect("loads");
        assert_eq!(v12.lifetime_points, vec![LifetimePoints::new("", 1.0, 5.0)]);
        assert_eq!(v12.lifetime_points("", 3.0, 0), 1.0);
        assert_eq!(v12.lifetime_points("", 6.0, 0), 0.0);
        assert_eq!(v12.lifetime_points("Gold", 0.0, 0), 0.0);
    }

    #[test]
    fn lifetime_rows_need_faults() {
        let mut tree = scoring_tree(&[]);
        tree.add_element(LIFETIME_POINTS_TAG).add_attrib("Points", 1.0);
        let mut log = ErrorLog::new();
        let mut ctx = LoadContext::new(&English, &mut log);
        assert!(Scoring::load(&standard(), &tree, Version::new(15, 3), &mut ctx).is_none());
        assert!(log.text().contains("Faults"));
    }

    #[test]
    fn row_names() {
        assert_eq!(
            LifetimePoints::new("", 2.0, 1.0).generic_name(&English),
            "2 lifetime points with 1 faults"
        );
        assert_eq!(
            LifetimePoints::with_speed_points("", 0.0).generic_name(&English),
            "Speed lifetime points with 0 faults"
        );
        assert_eq!(PlaceInfo::new(1, 4.0, true).generic_name(&English), "4 points for place 1");
    }
}

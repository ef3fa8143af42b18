use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    element::{AttribLookup, Element},
    error::LoadContext,
    localization::Message,
    types::{Date, ExistingPointsType, Version},
};

/// Element name of an existing-points entry.
pub const TAG: &str = "ExistingPoints";

/// Points earned before the dog's runs were recorded here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExistingPoints {
    /// When the points were earned, if known.
    pub date: Option<Date>,
    /// What kind of points these are.
    pub kind: ExistingPointsType,
    /// Other-points category, for [`ExistingPointsType::Other`].
    pub other_points: String,
    /// Venue the points were earned in.
    pub venue: String,
    /// Multi-Q name, for [`ExistingPointsType::MultiQ`].
    pub multiq: String,
    /// Division, for run-based kinds.
    pub division: String,
    /// Level, for run-based kinds.
    pub level: String,
    /// Event, for run-based kinds.
    pub event: String,
    /// Event sub-name.
    pub sub_name: String,
    /// Number of points.
    pub points: f64,
    /// Free text.
    pub comment: String,
}

impl ExistingPoints {
    /// Reads an entry and checks every name it carries against `config`. Older `Mach` and `QQ` kinds are converted.
    pub fn load(config: &Config, tree: &Element, version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let mut points = ExistingPoints {
            date: ctx.opt_date(tree, "Date")?,
            ..ExistingPoints::default()
        };

        let raw_kind = ctx.required_name(tree, "Type")?;
        let mut converted_qq = false;
        points.kind = match raw_kind.as_str() {
            "Mach" if version < Version::new(10, 1) => ExistingPointsType::Speed,
            "QQ" if version < Version::new(11, 0) => {
                converted_qq = true;
                ExistingPointsType::MultiQ
            }
            "QQ" => {
                let valid: Vec<&str> = KINDS.iter().map(|kind| kind.as_str()).collect();
                return ctx.invalid_choice(TAG, "Type", &valid);
            }
            raw => match ExistingPointsType::from_attrib(raw) {
                Some(kind) => kind,
                None => {
                    let valid: Vec<&str> = KINDS.iter().map(|kind| kind.as_str()).collect();
                    return ctx.invalid_choice(TAG, "Type", &valid);
                }
            },
        };

        if points.kind == ExistingPointsType::Other {
            points.other_points = ctx.required_name(tree, "Other")?;
            if config.find_other_points(&points.other_points).is_none() {
                return ctx.invalid(TAG, "Other", Some(&points.other_points));
            }
        }

        points.venue = ctx.required_name(tree, "Venue")?;
        let Some(venue) = config.find_venue(&points.venue) else {
            return ctx.invalid(TAG, "Venue", Some(&points.venue));
        };

        if points.kind == ExistingPointsType::MultiQ {
            if converted_qq {
                // Before multi-Qs were configurable, QQ always meant the
                // venue's double Q. The configuration may not carry it yet.
                points.multiq = venue
                    .find_multiq("QQ", true)
                    .map_or_else(|| "Double Q".to_string(), |multiq| multiq.name.clone());
            } else {
                points.multiq = ctx.required_name(tree, "MultiQ")?;
                if venue.find_multiq(&points.multiq, false).is_none() {
                    let detail = format!("{}/{}", points.venue, points.multiq);
                    return ctx.invalid(TAG, "MultiQ", Some(&detail));
                }
            }
        } else {
            points.division = ctx.required_name(tree, "Div")?;
            points.level = ctx.required_name(tree, "Level")?;
        }

        match points.kind {
            ExistingPointsType::Other | ExistingPointsType::Runs | ExistingPointsType::SuperQ => {
                points.event = ctx.required_name(tree, "Event")?;
                if !venue.verify_event(&points.event, &points.division, &points.level, points.date) {
                    let detail = format!(
                        "{}{}/{}/{}/{}",
                        ctx.loc.message(&Message::InvalidEventName),
                        points.venue,
                        points.division,
                        points.level,
                        points.event
                    );
                    return ctx.invalid(TAG, "Event", Some(&detail));
                }
                points.sub_name = tree.attrib("SubName").found().unwrap_or_default();
            }
            ExistingPointsType::Speed => {
                let known = venue
                    .find_division(&points.division)
                    .is_some_and(|div| div.find_sub_level(&points.level).is_some());
                if !known {
                    let detail = format!(
                        "{}{}/{}",
                        ctx.loc.message(&Message::InvalidDivLevel),
                        points.division,
                        points.level
                    );
                    return ctx.invalid(TAG, "Level", Some(&detail));
                }
            }
            ExistingPointsType::MultiQ => {}
        }

        points.points = match tree.attrib::<f64>("Pts") {
            AttribLookup::Found(pts) => pts,
            AttribLookup::NotFound => 0.0,
            AttribLookup::Invalid => return ctx.invalid(TAG, "Pts", None),
        };
        points.comment = tree.value().to_string();
        Some(points)
    }

    /// Writes the entry under `parent`.
    pub fn save(&self, parent: &mut Element) -> bool {
        let points = parent.add_element(TAG);
        if let Some(date) = self.date {
            points.add_attrib("Date", date);
        }
        points.add_attrib("Type", self.kind.as_str());
        if self.kind == ExistingPointsType::Other {
            points.add_attrib("Other", &self.other_points);
        }
        points.add_attrib("Venue", &self.venue);
        if self.kind == ExistingPointsType::MultiQ {
            points.add_attrib("MultiQ", &self.multiq);
        } else {
            points.add_attrib("Div", &self.division);
            points.add_attrib("Level", &self.level);
        }
        if matches!(
            self.kind,
            ExistingPointsType::Other | ExistingPointsType::Runs | ExistingPointsType::SuperQ
        ) {
            points.add_attrib("Event", &self.event);
            if !self.sub_name.is_empty() {
                points.add_attrib("SubName", &self.sub_name);
            }
        }
        points.add_attrib("Pts", self.points);
        if !self.comment.is_empty() {
            points.set_value(&self.comment);
        }
        true
    }

    /// Whether a division/level edit in `venue` reaches this entry.
    pub(crate) fn in_division(&self, venue: &str, division: &str) -> bool {
        self.kind != ExistingPointsType::MultiQ && self.venue == venue && self.division == division
    }
}

const KINDS: [ExistingPointsType; 5] = [
    ExistingPointsType::Other,
    ExistingPointsType::Runs,
    ExistingPointsType::Speed,
    ExistingPointsType::MultiQ,
    ExistingPointsType::SuperQ,
];

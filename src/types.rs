//! Shared primitive types, version tags and record enums.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Calendar date used throughout the document.
pub type Date = chrono::NaiveDate;
/// Configuration revision number carried by `Configuration` and `Action` elements.
pub type ConfigVersion = u16;

/// Wildcard division or level name in scoring and multi-Q definitions.
pub const WILDCARD: &str = "*";

/// Newest document version this crate reads and writes.
pub const CURRENT_DOC_VERSION: Version = Version::new(15, 3);

/// Document version tag, stored as `(major << 8) | minor`.
///
/// Ordering is purely numeric, so `2.5 < 2.10`. The minor component is one
/// byte; larger minors clamp to 255 so they never reach the major.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(u32);

impl Version {
    /// Builds a version from its two components.
    pub const fn new(major: u16, minor: u16) -> Self {
        let minor = if minor > MAX_MINOR { MAX_MINOR } else { minor };
        Self(((major as u32) << 8) | minor as u32)
    }

    /// Major component.
    pub const fn major(self) -> u16 {
        (self.0 >> 8) as u16
    }

    /// Minor component.
    pub const fn minor(self) -> u16 {
        (self.0 & 0xff) as u16
    }

    /// Raw ordinal used for comparisons.
    pub const fn ordinal(self) -> u32 {
        self.0
    }

    /// Parses `"M.m"` leniently: each component reads its leading digits and
    /// a missing dot means a minor of zero.
    pub fn parse(text: &str) -> Self {
        match text.split_once('.') {
            Some((major, minor)) => Self::new(leading_number(major), leading_number(minor)),
            None => Self::new(leading_number(text), 0),
        }
    }

    /// Parses `"M"` or `"M.m"` exactly. Anything else, or a minor past 255,
    /// is `None`.
    pub fn parse_strict(text: &str) -> Option<Self> {
        let (major, minor) = text.split_once('.').unwrap_or((text, "0"));
        let number = |part: &str| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            part.parse::<u16>().ok()
        };
        let minor = number(minor).filter(|minor| *minor <= MAX_MINOR)?;
        Some(Self::new(number(major)?, minor))
    }
}

const MAX_MINOR: u16 = 0xff;

fn leading_number(text: &str) -> u16 {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major(), self.minor())
    }
}

/// Configured scoring style of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoringStyle {
    /// Faults, then time breaks ties.
    FaultsThenTime,
    /// Faults counted down from 100, then time.
    Faults100ThenTime,
    /// Faults counted down from 200, then time.
    Faults200ThenTime,
    /// Opening/closing point totals, then time.
    OcScoreThenTime,
    /// Point total, then time.
    ScoreThenTime,
    /// Time with faults added as seconds.
    TimePlusFaults,
}

impl ScoringStyle {
    /// Every style in attribute order.
    pub const ALL: [ScoringStyle; 6] = [
        ScoringStyle::FaultsThenTime,
        ScoringStyle::Faults100ThenTime,
        ScoringStyle::Faults200ThenTime,
        ScoringStyle::OcScoreThenTime,
        ScoringStyle::ScoreThenTime,
        ScoringStyle::TimePlusFaults,
    ];

    /// Attribute spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            ScoringStyle::FaultsThenTime => "FaultsThenTime",
            ScoringStyle::Faults100ThenTime => "Faults100ThenTime",
            ScoringStyle::Faults200ThenTime => "Faults200ThenTime",
            ScoringStyle::OcScoreThenTime => "OCScoreThenTime",
            ScoringStyle::ScoreThenTime => "ScoreThenTime",
            ScoringStyle::TimePlusFaults => "TimePlusFaults",
        }
    }

    /// Inverse of [`ScoringStyle::as_str`].
    pub fn from_attrib(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.as_str() == text)
    }
}

/// Shape of the numbers recorded on a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoringType {
    /// Course faults against standard course time.
    ByTime,
    /// Opening and closing point totals.
    ByOpenClose,
    /// A single point total.
    ByPoints,
}

impl ScoringType {
    /// Element tag used when the run scoring is saved.
    pub fn tag(self) -> &'static str {
        match self {
            ScoringType::ByTime => "ByTime",
            ScoringType::ByOpenClose => "ByOpenClose",
            ScoringType::ByPoints => "ByPoints",
        }
    }

    /// Inverse of [`ScoringType::tag`].
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ByTime" => Some(ScoringType::ByTime),
            "ByOpenClose" => Some(ScoringType::ByOpenClose),
            "ByPoints" => Some(ScoringType::ByPoints),
            _ => None,
        }
    }
}

/// Qualification outcome of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QStatus {
    /// Not applicable.
    #[default]
    Na,
    /// Qualified.
    Q,
    /// Not qualified.
    Nq,
    /// Eliminated.
    E,
    /// Did not run.
    Dnr,
    /// Super qualified.
    Sq,
}

impl QStatus {
    /// Attribute spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            QStatus::Na => "NA",
            QStatus::Q => "Q",
            QStatus::Nq => "NQ",
            QStatus::E => "E",
            QStatus::Dnr => "DNR",
            QStatus::Sq => "SQ",
        }
    }

    /// Inverse of [`QStatus::as_str`].
    pub fn from_attrib(text: &str) -> Option<Self> {
        match text {
            "NA" => Some(QStatus::Na),
            "Q" => Some(QStatus::Q),
            "NQ" => Some(QStatus::Nq),
            "E" => Some(QStatus::E),
            "DNR" => Some(QStatus::Dnr),
            "SQ" => Some(QStatus::Sq),
            _ => None,
        }
    }

    /// True for outcomes that count toward titles and multi-Qs.
    pub fn qualified(self) -> bool {
        matches!(self, QStatus::Q | QStatus::Sq)
    }
}

/// Entry state of a calendar event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryStatus {
    /// Not entered.
    #[default]
    Not,
    /// Entered.
    Entered,
    /// Entry sent, not yet confirmed.
    Pending,
    /// Planning to enter.
    Planning,
}

impl EntryStatus {
    /// Attribute spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            EntryStatus::Not => "N",
            EntryStatus::Entered => "E",
            EntryStatus::Pending => "O",
            EntryStatus::Planning => "P",
        }
    }

    /// Inverse of [`EntryStatus::as_str`].
    pub fn from_attrib(text: &str) -> Option<Self> {
        match text {
            "N" => Some(EntryStatus::Not),
            "E" => Some(EntryStatus::Entered),
            "O" => Some(EntryStatus::Pending),
            "P" => Some(EntryStatus::Planning),
            _ => None,
        }
    }
}

/// Lodging arrangements for a calendar event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accommodations {
    /// None needed.
    #[default]
    None,
    /// Still to book.
    Todo,
    /// Booked.
    Confirmed,
}

impl Accommodations {
    /// Attribute spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Accommodations::None => "N",
            Accommodations::Todo => "T",
            Accommodations::Confirmed => "C",
        }
    }

    /// Inverse of [`Accommodations::as_str`].
    pub fn from_attrib(text: &str) -> Option<Self> {
        match text {
            "N" => Some(Accommodations::None),
            "T" => Some(Accommodations::Todo),
            "C" => Some(Accommodations::Confirmed),
            _ => None,
        }
    }
}

/// How other points are tallied in the points view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TallyStyle {
    /// One running total.
    #[default]
    All,
    /// One total per event.
    AllByEvent,
    /// One total per level.
    Level,
    /// One total per level and event.
    LevelByEvent,
}

impl TallyStyle {
    /// Attribute spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            TallyStyle::All => "All",
            TallyStyle::AllByEvent => "AllByEvent",
            TallyStyle::Level => "Level",
            TallyStyle::LevelByEvent => "LevelByEvent",
        }
    }

    /// Inverse of [`TallyStyle::as_str`].
    pub fn from_attrib(text: &str) -> Option<Self> {
        match text {
            "All" => Some(TallyStyle::All),
            "AllByEvent" => Some(TallyStyle::AllByEvent),
            "Level" => Some(TallyStyle::Level),
            "LevelByEvent" => Some(TallyStyle::LevelByEvent),
            _ => None,
        }
    }
}

/// Kind of points carried over from before the dog's records were kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExistingPointsType {
    /// Points in a user-defined other-points category.
    Other,
    /// Title points from runs.
    #[default]
    Runs,
    /// Speed points.
    Speed,
    /// Multi-Q awards.
    MultiQ,
    /// Super-Q awards.
    SuperQ,
}

impl ExistingPointsType {
    /// Attribute spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            ExistingPointsType::Other => "Other",
            ExistingPointsType::Runs => "Run",
            ExistingPointsType::Speed => "Speed",
            ExistingPointsType::MultiQ => "MQ",
            ExistingPointsType::SuperQ => "SQ",
        }
    }

    /// Inverse of [`ExistingPointsType::as_str`]. `QQ` is the pre-multi-Q spelling.
    pub fn from_attrib(text: &str) -> Option<Self> {
        match text {
            "Other" => Some(ExistingPointsType::Other),
            "Run" => Some(ExistingPointsType::Runs),
            "Speed" => Some(ExistingPointsType::Speed),
            "MQ" | "QQ" => Some(ExistingPointsType::MultiQ),
            "SQ" => Some(ExistingPointsType::SuperQ),
            _ => None,
        }
    }
}

/// Title-point calculation policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalcPointsType {
    /// Configured points are awarded as-is.
    #[default]
    Normal,
    /// Time-to-beat banded points.
    T2B,
    /// Placement table keyed by class size.
    Uki,
}

impl CalcPointsType {
    /// Attribute spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            CalcPointsType::Normal => "Normal",
            CalcPointsType::T2B => "T2B",
            CalcPointsType::Uki => "UKI",
        }
    }

    /// Inverse of [`CalcPointsType::as_str`]; unknown spellings are Normal.
    pub fn from_attrib(text: &str) -> Self {
        match text {
            "T2B" => CalcPointsType::T2B,
            "UKI" => CalcPointsType::Uki,
            _ => CalcPointsType::Normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_never_spills_into_major() {
        assert_eq!(Version::new(2, 300), Version::new(2, 255));
        assert!(Version::parse("2.300") < Version::new(3, 0));
        assert_eq!(Version::parse("2.300").major(), 2);
    }

    #[test]
    fn strict_parse_rejects_malformed_text() {
        assert_eq!(Version::parse_strict("15.3"), Some(Version::new(15, 3)));
        assert_eq!(Version::parse_strict("12"), Some(Version::new(12, 0)));
        for raw in ["", "x", "2.300", "1.2.3", "1.", ".5", " 1.2", "-1.0"] {
            assert_eq!(Version::parse_strict(raw), None, "{raw}");
        }
    }
}

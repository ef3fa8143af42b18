//! User-facing text, supplied by an injected [`Localization`] provider.

/// Every user-facing sentence the document layer produces.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum Message<'a> {
    /// Version attribute could not be understood.
    UnknownVersion,
    /// File was written by a newer program with the same major version.
    WarningNewerDoc,
    /// The document layout is wrong.
    InvalidDocStructure(&'a str),
    /// Root element is not `AgilityBook`.
    InvalidRoot,
    /// No `Configuration` element.
    MissingConfig,
    /// More than one `Configuration` element.
    InvalidConfig,
    /// Prefix for a bad date value.
    InvalidDate,
    /// Prefix for a bad division/level pair.
    InvalidDivLevel,
    /// Prefix for an unknown event name.
    InvalidEventName,
    /// Prefix listing acceptable values.
    ValidValues,
    /// Acceptable boolean spellings.
    ValidValuesBool,
    /// A required attribute is absent.
    MissingAttribute {
        /// Element name.
        element: &'a str,
        /// Attribute name.
        attrib: &'a str,
        /// Extra context.
        detail: Option<&'a str>,
    },
    /// An attribute is present but unusable.
    InvalidAttributeValue {
        /// Element name.
        element: &'a str,
        /// Attribute name.
        attrib: &'a str,
        /// Extra context.
        detail: Option<&'a str>,
    },
    /// Calendar-site merge summary.
    UpdateCalSites { added: usize, updated: usize, skipped: usize },
    /// Fault-type merge summary.
    UpdateFaults { added: usize, skipped: usize },
    /// Other-points merge summary.
    UpdateOtherPts { added: usize, updated: usize, skipped: usize },
    /// Venue merge summary.
    UpdateVenues { added: usize, updated: usize, skipped: usize },
    /// Division merge summary.
    UpdateDivisions { added: usize, updated: usize, skipped: usize },
    /// Divisions only changed order.
    UpdateDivisionsReordered,
    /// Event merge summary.
    UpdateEvents { added: usize, updated: usize, skipped: usize },
    /// Events only changed order.
    UpdateEventsReordered,
    /// Multi-Q merge summary.
    UpdateMultiqs { added: usize, deleted: usize, skipped: usize },
    /// Multi-Qs only changed order.
    UpdateMultiqsReordered,
    /// Level merge summary.
    UpdateLevels { added: usize, updated: usize, skipped: usize },
    /// Levels only changed order.
    UpdateLevelsReordered,
    /// Title merge summary.
    UpdateTitles { added: usize, updated: usize, skipped: usize },
    /// Titles only changed order.
    UpdateTitlesReordered,
    /// Sublevel merge summary.
    UpdateSubLevels { added: usize },
    /// Sublevels only changed order.
    UpdateSubLevelsReordered,
    /// Scoring-rule merge summary.
    UpdateRules { added: usize, deleted: usize, updated: usize, skipped: usize },
    /// Runs removed because their scoring no longer resolves.
    WarnDeletedRuns { count: usize, runs: &'a str },
    /// Runs moved from one event to another by a migration.
    UpdateTeamRuns { count: usize, runs: &'a str },
    /// Runs whose table flag was resolved or cleared.
    UpdateTableRuns { count: usize, runs: &'a str },
    /// Runs whose sub-name was cleared because the event dropped sub-names.
    UpdateSubnameRuns { count: usize, runs: &'a str },
    /// A calendar plugin was removed.
    ActionDeleteCalPlugin { name: &'a str },
    /// Other-points category renamed.
    ActionRenameOtherPoints { old: &'a str, new: &'a str, count: usize },
    /// Confirmation before removing other points in use.
    ActionPreDeleteOtherPoints { name: &'a str, count: usize },
    /// Other-points category removed.
    ActionDeleteOtherPoints { name: &'a str },
    /// Venue renamed.
    ActionRenameVenue { old: &'a str, new: &'a str, count: usize },
    /// Confirmation before removing a venue in use.
    ActionPreDeleteVenue { name: &'a str, count: usize },
    /// Venue removed.
    ActionDeleteVenue { name: &'a str },
    /// Multi-Q renamed.
    ActionRenameMultiQ { venue: &'a str, old: &'a str, new: &'a str, count: usize },
    /// Confirmation before removing a multi-Q in use.
    ActionPreDeleteMultiQ { venue: &'a str, name: &'a str, count: usize },
    /// Multi-Q removed.
    ActionDeleteMultiQ { venue: &'a str, name: &'a str },
    /// Division renamed.
    ActionRenameDivision { venue: &'a str, old: &'a str, new: &'a str, count: usize },
    /// Confirmation before removing a division in use.
    ActionPreDeleteDivision { venue: &'a str, name: &'a str, count: usize },
    /// Division removed.
    ActionDeleteDivision { venue: &'a str, name: &'a str },
    /// Level renamed.
    ActionRenameLevel { venue: &'a str, old: &'a str, new: &'a str, count: usize },
    /// Confirmation before removing a level in use.
    ActionPreDeleteLevel { venue: &'a str, name: &'a str, count: usize },
    /// Level removed.
    ActionDeleteLevel { venue: &'a str, name: &'a str },
    /// Title renamed.
    ActionRenameTitle { venue: &'a str, old: &'a str, new: &'a str, count: usize },
    /// Confirmation before removing a title in use.
    ActionPreDeleteTitle { venue: &'a str, name: &'a str, count: usize },
    /// Title removed.
    ActionDeleteTitle { venue: &'a str, name: &'a str },
    /// Event renamed.
    ActionRenameEvent { venue: &'a str, old: &'a str, new: &'a str, count: usize },
    /// Confirmation before removing an event in use.
    ActionPreDeleteEvent { venue: &'a str, name: &'a str, count: usize },
    /// Event removed.
    ActionDeleteEvent { venue: &'a str, name: &'a str },
    /// Display name of a title-points row.
    TitlePointsName { points: f64, faults: f64 },
    /// Display name of a lifetime-points row. `None` points means speed points.
    LifetimePointsName { points: Option<f64>, faults: f64 },
    /// Display name of a placement-points row.
    PlacementPointsName { points: f64, place: i16 },
}

/// Supplies localized text for [`Message`]s.
pub trait Localization {
    /// Text for one message, without a trailing newline.
    fn message(&self, msg: &Message<'_>) -> String;
}

/// Stock English text.
#[derive(Debug, Clone, Copy, Default)]
pub struct English;

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

fn update_line(what: &str, added: usize, updated: usize, skipped: usize) -> String {
    format!("{what}: {added} added, {updated} updated, {skipped} identical")
}

impl Localization for English {
    fn message(&self, msg: &Message<'_>) -> String {
        use Message::*;
        match msg {
            UnknownVersion => "Unknown document version".into(),
            WarningNewerDoc => {
                "This file was created with a newer version of the program. Some data may be lost if it is saved.".into()
            }
            InvalidDocStructure(detail) => format!("Invalid document structure: {detail}"),
            InvalidRoot => "Root element is not 'AgilityBook'".into(),
            MissingConfig => "Missing 'Configuration' element".into(),
            InvalidConfig => "Only one 'Configuration' element is allowed".into(),
            InvalidDate => "Invalid date: ".into(),
            InvalidDivLevel => "Division/level pair has not been defined: ".into(),
            InvalidEventName => "Event has not been defined: ".into(),
            ValidValues => "Valid values: ".into(),
            ValidValuesBool => "Valid values: 'y', 'n'".into(),
            MissingAttribute {
                element,
                attrib,
                detail,
            } => {
                let mut text = format!("Missing required attribute '{attrib}' in element '{element}'");
                if let Some(detail) = detail {
                    text.push_str(": ");
                    text.push_str(detail);
                }
                text
            }
            InvalidAttributeValue {
                element,
                attrib,
                detail,
            } => {
                let mut text = format!("Invalid value for attribute '{attrib}' in element '{element}'");
                if let Some(detail) = detail {
                    text.push_str(": ");
                    text.push_str(detail);
                }
                text
            }
            UpdateCalSites { added, updated, skipped } => update_line("Calendar sites", *added, *updated, *skipped),
            UpdateFaults { added, skipped } => format!("Faults: {added} added, {skipped} identical"),
            UpdateOtherPts { added, updated, skipped } => update_line("Other points", *added, *updated, *skipped),
            UpdateVenues { added, updated, skipped } => update_line("Venues", *added, *updated, *skipped),
            UpdateDivisions { added, updated, skipped } => update_line("Divisions", *added, *updated, *skipped),
            UpdateDivisionsReordered => "Divisions: reordered".into(),
            UpdateEvents { added, updated, skipped } => update_line("Events", *added, *updated, *skipped),
            UpdateEventsReordered => "Events: reordered".into(),
            UpdateMultiqs { added, deleted, skipped } => {
                format!(" multiple Qs: {added} added, {deleted} deleted, {skipped} identical")
            }
            UpdateMultiqsReordered => "Multiple Qs: reordered".into(),
            UpdateLevels { added, updated, skipped } => update_line("Levels", *added, *updated, *skipped),
            UpdateLevelsReordered => "Levels: reordered".into(),
            UpdateTitles { added, updated, skipped } => update_line("Titles", *added, *updated, *skipped),
            UpdateTitlesReordered => "Titles: reordered".into(),
            UpdateSubLevels { added } => format!("Sub-levels: {added} added"),
            UpdateSubLevelsReordered => "Sub-levels: reordered".into(),
            UpdateRules {
                added,
                deleted,
                updated,
                skipped,
            } => format!(" scoring methods: {added} added, {deleted} deleted, {updated} updated, {skipped} identical"),
            WarnDeletedRuns { count, runs } => format!(
                "{} removed because the scoring method no longer exists:\n{runs}",
                plural(*count, "run was", "runs were")
            ),
            UpdateTeamRuns { count, runs } => format!(
                "{} moved to the new event:\n{runs}",
                plural(*count, "run was", "runs were")
            ),
            UpdateTableRuns { count, runs } => {
                let mut text = format!("Table setting updated on {}", plural(*count, "run", "runs"));
                if !runs.is_empty() {
                    text.push_str(":\n");
                    text.push_str(runs);
                }
                text
            }
            UpdateSubnameRuns { count, runs } => format!(
                "Sub-name removed from {}:\n{runs}",
                plural(*count, "run", "runs")
            ),
            ActionDeleteCalPlugin { name } => format!("Deleted calendar plugin '{name}'"),
            ActionRenameOtherPoints { old, new, count } => {
                format!("Renamed other points '{old}' to '{new}' ({})", plural(*count, "run", "runs"))
            }
            ActionPreDeleteOtherPoints { name, count } => format!(
                "Deleting other points '{name}' will remove it from {}",
                plural(*count, "run", "runs")
            ),
            ActionDeleteOtherPoints { name } => format!("Deleted other points '{name}'"),
            ActionRenameVenue { old, new, count } => {
                format!("Renamed venue '{old}' to '{new}' ({})", plural(*count, "record", "records"))
            }
            ActionPreDeleteVenue { name, count } => format!(
                "Deleting venue '{name}' will remove {}",
                plural(*count, "record", "records")
            ),
            ActionDeleteVenue { name } => format!("Deleted venue '{name}'"),
            ActionRenameMultiQ { venue, old, new, count } => format!(
                "Renamed multiple Q '{old}' to '{new}' in '{venue}' ({})",
                plural(*count, "record", "records")
            ),
            ActionPreDeleteMultiQ { venue, name, count } => format!(
                "Deleting multiple Q '{name}' in '{venue}' will remove {}",
                plural(*count, "record", "records")
            ),
            ActionDeleteMultiQ { venue, name } => format!("Deleted multiple Q '{name}' in '{venue}'"),
            ActionRenameDivision { venue, old, new, count } => format!(
                "Renamed division '{old}' to '{new}' in '{venue}' ({})",
                plural(*count, "run", "runs")
            ),
            ActionPreDeleteDivision { venue, name, count } => format!(
                "Deleting division '{name}' in '{venue}' will remove {}",
                plural(*count, "record", "records")
            ),
            ActionDeleteDivision { venue, name } => format!("Deleted division '{name}' in '{venue}'"),
            ActionRenameLevel { venue, old, new, count } => format!(
                "Renamed level '{old}' to '{new}' in '{venue}' ({})",
                plural(*count, "run", "runs")
            ),
            ActionPreDeleteLevel { venue, name, count } => format!(
                "Deleting level '{name}' in '{venue}' will remove {}",
                plural(*count, "run", "runs")
            ),
            ActionDeleteLevel { venue, name } => format!("Deleted level '{name}' in '{venue}'"),
            ActionRenameTitle { venue, old, new, count } => format!(
                "Renamed title '{old}' to '{new}' in '{venue}' ({})",
                plural(*count, "title", "titles")
            ),
            ActionPreDeleteTitle { venue, name, count } => format!(
                "Deleting title '{name}' in '{venue}' will remove {}",
                plural(*count, "title", "titles")
            ),
            ActionDeleteTitle { venue, name } => format!("Deleted title '{name}' in '{venue}'"),
            ActionRenameEvent { venue, old, new, count } => format!(
                "Renamed event '{old}' to '{new}' in '{venue}' ({})",
                plural(*count, "run", "runs")
            ),
            ActionPreDeleteEvent { venue, name, count } => format!(
                "Deleting event '{name}' in '{venue}' will remove {}",
                plural(*count, "run", "runs")
            ),
            ActionDeleteEvent { venue, name } => format!("Deleted event '{name}' in '{venue}'"),
            TitlePointsName { points, faults } => format!("{points} points with {faults} faults"),
            LifetimePointsName { points: Some(points), faults } => {
                format!("{points} lifetime points with {faults} faults")
            }
            LifetimePointsName { points: None, faults } => format!("Speed lifetime points with {faults} faults"),
            PlacementPointsName { points, place } => format!("{points} points for place {place}"),
        }
    }
}

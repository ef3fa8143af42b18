//! The document root and whole-document operations.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    action::ActionCallback,
    calendar::{self, Calendar, Training, sort_calendar, sort_training},
    config::{self, Config},
    dog::{self, Dog, DogList},
    element::{AttribLookup, Element},
    error::{ArbError, ArbResult, ErrorCallback, LoadContext},
    info::{self, Info},
    localization::{Localization, Message},
    scoring::translate_config_scoring,
    types::{CURRENT_DOC_VERSION, Version, WILDCARD},
};

/// Root element name.
pub const TAG: &str = "AgilityBook";

/// Which sections [`RecordBook::save`] writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveOptions {
    /// Write calendar entries.
    pub calendar: bool,
    /// Write the training log.
    pub training: bool,
    /// The configuration is written anyway when dogs are.
    pub config: bool,
    /// Write club, judge and location notes.
    pub info: bool,
    /// Write dogs and their records.
    pub dogs: bool,
    /// Stored in the `ver` attribute.
    pub program_version: String,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            calendar: true,
            training: true,
            config: true,
            info: true,
            dogs: true,
            program_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Root attributes of the last loaded file. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// `Book` attribute: document version.
    pub book: String,
    /// `ver` attribute: program that wrote the file.
    pub program: String,
    /// `timestamp` attribute.
    pub timestamp: String,
}

/// A whole document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordBook {
    /// Root attributes as read. Ignored by equality.
    pub file_info: FileInfo,
    /// Calendar entries.
    pub calendar: Vec<Calendar>,
    /// Training log.
    pub training: Vec<Training>,
    /// Venue configuration every record is checked against.
    pub config: Config,
    /// Club, judge and location notes.
    pub info: Info,
    /// Every dog.
    pub dogs: DogList,
}

impl PartialEq for RecordBook {
    fn eq(&self, other: &Self) -> bool {
        self.calendar == other.calendar
            && self.training == other.training
            && self.config == other.config
            && self.info == other.info
            && self.dogs == other.dogs
    }
}

const MIN_DOC_VERSION: Version = Version::new(1, 0);

/// Accumulates report lines for runs touched by one kind of fixup.
#[derive(Default)]
struct RunReport {
    count: usize,
    lines: String,
}

impl RunReport {
    fn add(&mut self, line: String) {
        self.count += 1;
        self.lines.push_str(&line);
    }
}

impl RecordBook {
    /// An empty document with a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a document tree. Calendar, training and dog entries that fail
    /// are dropped; a bad root, version or configuration fails the load.
    pub fn load(tree: &Element, callback: &mut dyn ErrorCallback, loc: &dyn Localization) -> Option<Self> {
        let mut ctx = LoadContext::new(loc, callback);
        if tree.name() != TAG {
            let detail = loc.message(&Message::InvalidRoot);
            ctx.log(Message::InvalidDocStructure(&detail));
            return None;
        }

        let version = match tree.attrib::<Version>("Book") {
            AttribLookup::Found(version) => version,
            AttribLookup::NotFound => return ctx.missing(TAG, "Book"),
            AttribLookup::Invalid => {
                let detail = loc.message(&Message::UnknownVersion);
                return ctx.invalid(TAG, "Book", Some(&detail));
            }
        };
        if version < MIN_DOC_VERSION || version > CURRENT_DOC_VERSION {
            if version.major() != CURRENT_DOC_VERSION.major() {
                let detail = loc.message(&Message::UnknownVersion);
                return ctx.invalid(TAG, "Book", Some(&detail));
            }
            tracing::warn!(%version, "document is newer than this reader");
            if !ctx.errors.on_error(&loc.message(&Message::WarningNewerDoc)) {
                return None;
            }
        }

        let text = |attrib: &str| tree.attrib::<String>(attrib).found().unwrap_or_default();
        let mut book = RecordBook {
            file_info: FileInfo {
                book: text("Book"),
                program: text("ver"),
                timestamp: text("timestamp"),
            },
            ..RecordBook::default()
        };

        for child in tree.children_named(calendar::TAG) {
            book.calendar.extend(Calendar::load(child, version, &mut ctx));
        }
        sort_calendar(&mut book.calendar);
        for child in tree.children_named(calendar::TRAINING_TAG) {
            book.training.extend(Training::load(child, version, &mut ctx));
        }
        sort_training(&mut book.training);

        // Dogs resolve their runs through the configuration, so it goes first.
        let mut configs = tree.children_named(config::TAG);
        let Some(config_tree) = configs.next() else {
            let detail = loc.message(&Message::MissingConfig);
            ctx.log(Message::InvalidDocStructure(&detail));
            return None;
        };
        if configs.next().is_some() {
            let detail = loc.message(&Message::InvalidConfig);
            ctx.log(Message::InvalidDocStructure(&detail));
            return None;
        }
        book.config = Config::load(config_tree, version, &mut ctx)?;

        for child in tree.children_named(dog::TAG) {
            book.dogs.extend(Dog::load(&book.config, child, version, &mut ctx));
        }
        if let Some(info_tree) = tree.find_child(info::TAG) {
            book.info = Info::load(info_tree, version, &mut ctx).unwrap_or_default();
        }

        tracing::debug!(
            %version,
            dogs = book.dogs.len(),
            calendar = book.calendar.len(),
            "loaded document"
        );
        Some(book)
    }

    /// Builds the `AgilityBook` tree at the current document version.
    pub fn save(&self, options: &SaveOptions) -> ArbResult<Element> {
        let mut root = Element::new(TAG);
        root.add_attrib("Book", CURRENT_DOC_VERSION);
        root.add_attrib("ver", &options.program_version);
        root.add_attrib("timestamp", chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string());

        let mut written = true;
        if options.calendar {
            written &= self.calendar.iter().all(|cal| cal.save(&mut root));
        }
        if options.training {
            written &= self.training.iter().all(|training| training.save(&mut root));
        }
        if options.config || options.dogs {
            written &= self.config.save(&mut root);
        }
        if options.info {
            written &= self.info.save(&mut root);
        }
        if options.dogs {
            written &= self.dogs.iter().all(|dog| dog.save(&mut root));
        }
        if !written {
            return Err(ArbError::Format("a record could not be written".into()));
        }
        Ok(root)
    }

    /// Reads and loads a document file. Load diagnostics go to `callback`.
    pub fn load_file(
        path: impl AsRef<Path>,
        callback: &mut dyn ErrorCallback,
        loc: &dyn Localization,
    ) -> ArbResult<Self> {
        let path = path.as_ref();
        let tree = Element::read_from(BufReader::new(File::open(path)?))?;
        let book = Self::load(&tree, callback, loc).ok_or(ArbError::Load)?;
        tracing::info!(path = %path.display(), "opened document");
        Ok(book)
    }

    /// Saves the document to `path` as indented UTF-8 XML.
    pub fn save_file(&self, path: impl AsRef<Path>, options: &SaveOptions) -> ArbResult<()> {
        let path = path.as_ref();
        let tree = self.save(options)?;
        let mut out = BufWriter::new(File::create(path)?);
        tree.write_to(&mut out)?;
        out.flush()?;
        tracing::info!(path = %path.display(), "saved document");
        Ok(())
    }

    /// Merges a newer master configuration: its actions first, then its
    /// entries, then the run fixups the new rules require. Returns true when
    /// anything changed.
    pub fn update(
        &mut self,
        indent: usize,
        new: &Config,
        info: &mut String,
        callback: &mut dyn ActionCallback,
        loc: &dyn Localization,
    ) -> bool {
        let cur_version = self.config.version;
        let mut changes = 0;
        if !new.actions.is_empty() {
            changes += new.actions.apply(&mut self.config, &mut self.dogs, info, callback, loc);
        }
        let mut changed = false;
        if callback.can_continue() {
            changed = self.config.update(indent, new, info, loc);
        }

        // Runs are fixed even after a cancel: actions already applied may
        // have orphaned some of them.
        let fix_pairs = cur_version <= 23 && new.version >= 24 && pairs_became_team(&self.config, new);
        let venues: Vec<String> = self.config.venues.iter().map(|venue| venue.name.clone()).collect();
        for venue in &venues {
            self.dogs.delete_multiqs(&self.config, venue);
        }
        changes += self.fix_runs(fix_pairs, info, callback, loc);

        if callback.can_continue() && cur_version <= 2 && new.version >= 3 {
            let converted = self.convert_tables();
            if converted > 0 {
                changes += converted;
                info.push_str(&loc.message(&Message::UpdateTableRuns {
                    count: converted,
                    runs: "",
                }));
                info.push('\n');
            }
        }

        if changes > 0 || changed {
            self.dogs.set_multiqs(&self.config);
            tracing::info!(changes, version = self.config.version, "configuration updated");
            return true;
        }
        false
    }

    /// Re-checks every run against its venue's rules. Returns the number of
    /// runs changed or removed.
    fn fix_runs(
        &mut self,
        fix_pairs: bool,
        info: &mut String,
        callback: &mut dyn ActionCallback,
        loc: &dyn Localization,
    ) -> usize {
        let config = &self.config;
        let mut team = RunReport::default();
        let mut deleted = RunReport::default();
        let mut table = RunReport::default();
        let mut subname = RunReport::default();

        for trial in self.dogs.iter_mut().flat_map(|dog| dog.trials.iter_mut()) {
            let clubs = &trial.clubs;
            trial.runs.retain_mut(|run| {
                let venue = clubs.get(run.club).map(|club| club.venue.as_str()).unwrap_or_default();
                if fix_pairs
                    && venue == "USDAA"
                    && run.event == "Pairs"
                    && (run.level == "Tournament" || run.level == "Nationals")
                {
                    run.event = "Team".into();
                    team.add(run.describe(venue));
                }
                let resolved = config
                    .find_venue(venue)
                    .and_then(|v| v.find_event(&run.event, &run.division, &run.level, Some(run.date)));
                let Some((event, scoring)) = resolved else {
                    deleted.add(run.describe(venue));
                    return false;
                };
                let kind = translate_config_scoring(scoring.style);
                if kind != run.scoring.kind {
                    run.scoring.set_type(kind, scoring.drop_fractions);
                }
                if !event.has_table && run.scoring.has_table {
                    run.scoring.has_table = false;
                    table.add(run.describe(venue));
                }
                if !event.has_sub_names && !run.sub_name.is_empty() {
                    run.sub_name.clear();
                    subname.add(run.describe(venue));
                }
                true
            });
        }

        let mut report = |count: usize, msg: Message<'_>| {
            if count > 0 {
                let text = loc.message(&msg);
                info.push('\n');
                info.push_str(&text);
                info.push('\n');
                Some(text)
            } else {
                None
            }
        };
        report(
            team.count,
            Message::UpdateTeamRuns {
                count: team.count,
                runs: &team.lines,
            },
        );
        if let Some(text) = report(
            deleted.count,
            Message::WarnDeletedRuns {
                count: deleted.count,
                runs: &deleted.lines,
            },
        ) {
            tracing::warn!(count = deleted.count, "runs deleted by configuration update");
            callback.post_delete(&text);
        }
        report(
            table.count,
            Message::UpdateTableRuns {
                count: table.count,
                runs: &table.lines,
            },
        );
        report(
            subname.count,
            Message::UpdateSubnameRuns {
                count: subname.count,
                runs: &subname.lines,
            },
        );
        team.count + deleted.count + table.count + subname.count
    }

    /// Resolves table flags left pending by documents before 8.6.
    fn convert_tables(&mut self) -> usize {
        let config = &self.config;
        let mut updated = 0;
        for trial in self.dogs.iter_mut().flat_map(|dog| dog.trials.iter_mut()) {
            let clubs = &trial.clubs;
            for run in trial.runs.iter_mut().filter(|run| run.scoring.convert_table) {
                let Some(venue) = clubs.get(run.club).and_then(|club| config.find_venue(&club.venue)) else {
                    continue;
                };
                if let Some((event, _)) = venue.find_event(&run.event, &run.division, &run.level, Some(run.date)) {
                    run.scoring.convert_table = false;
                    if run.scoring.has_table != event.has_table {
                        run.scoring.has_table = event.has_table;
                        updated += 1;
                    }
                }
            }
        }
        updated
    }
}

/// True when USDAA tournament pairs runs should move to the new Team event.
fn pairs_became_team(current: &Config, new: &Config) -> bool {
    let (Some(venue), Some(new_venue)) = (current.find_venue("USDAA"), new.find_venue("USDAA")) else {
        return false;
    };
    let (Some(pairs), Some(team)) = (venue.find_event_named("Pairs"), new_venue.find_event_named("Team")) else {
        return false;
    };
    ["Nationals", "Tournament"]
        .into_iter()
        .any(|level| pairs.verify_event(WILDCARD, level, None) || team.verify_event(WILDCARD, level, None))
}

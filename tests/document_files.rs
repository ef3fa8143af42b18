use std::fs;

use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

use arbook::{
    book::{RecordBook, SaveOptions},
    calendar::{Calendar, Training},
    config::{Division, Event, Level, Scoring, Title, Venue},
    dog::{Club, Dog, DogTitle, RegNum, Run, Trial},
    error::{ArbError, ErrorLog},
    localization::English,
    types::{Date, EntryStatus, QStatus, ScoringStyle},
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("arbook=info".parse().expect("directive")))
        .with_test_writer()
        .try_init();
}

fn day(m: u32, d: u32) -> Date {
    Date::from_ymd_opt(2025, m, d).expect("date")
}

fn sample_book() -> RecordBook {
    let mut book = RecordBook::new();
    book.config.version = 30;
    let mut venue = Venue::new("AKC");
    let mut div = Division::new("Standard");
    div.levels.push(Level::new("Novice"));
    div.levels.push(Level::new("Excellent"));
    venue.divisions.push(div);
    for name in ["Standard", "Jumpers"] {
        let mut event = Event::new(name);
        event.scorings.push(Scoring::new("*", "*", ScoringStyle::FaultsThenTime));
        venue.events.push(event);
    }
    venue.titles.push(Title::new("NA"));
    book.config.venues.push(venue);

    let mut cal = Calendar::new(day(6, 7), day(6, 8));
    cal.venue = "AKC".into();
    cal.club = "Valley Dogs".into();
    cal.entered = EntryStatus::Entered;
    book.calendar.push(cal);
    book.training.push(Training::new(day(5, 1), "Contacts"));

    let mut dog = Dog::new("Juno");
    dog.registered_name = "Juno of the Valley".into();
    dog.reg_nums.push(RegNum::new("AKC", "DN555"));
    dog.titles.push(DogTitle::new("AKC", "NA", Some(day(4, 2))));
    let mut trial = Trial::new("County Fairgrounds");
    trial.clubs.push(Club::new("Valley Dogs", "AKC"));
    let mut standard = Run::new(day(4, 1), "Standard", "Novice", "Standard");
    standard.q = QStatus::Q;
    standard.place = 2;
    standard.judge = "Smith".into();
    let mut jumpers = Run::new(day(4, 2), "Standard", "Novice", "Jumpers");
    jumpers.q = QStatus::Nq;
    trial.runs = vec![standard, jumpers];
    trial.default_date = Some(day(4, 1));
    dog.trials.push(trial);
    book.dogs.push(dog);
    book
}

#[test]
fn saved_file_loads_back_equal() {
    init_tracing();
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("juno.arb");
    let book = sample_book();
    book.save_file(&path, &SaveOptions::default()).expect("save");

    let text = fs::read_to_string(&path).expect("read");
    assert!(text.starts_with("<?xml"));
    assert!(text.contains("Book=\"15.3\""));

    let mut log = ErrorLog::new();
    let loaded = RecordBook::load_file(&path, &mut log, &English).expect("load");
    assert!(log.is_empty(), "{}", log.text());
    assert_eq!(loaded, book);
    assert_eq!(loaded.file_info.program, env!("CARGO_PKG_VERSION"));
}

#[test]
fn calendar_only_save_still_needs_a_configuration_to_load() {
    init_tracing();
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("calendar.arb");
    let options = SaveOptions {
        config: false,
        dogs: false,
        ..SaveOptions::default()
    };
    sample_book().save_file(&path, &options).expect("save");

    let mut log = ErrorLog::new();
    let err = RecordBook::load_file(&path, &mut log, &English).expect_err("no configuration");
    assert!(matches!(err, ArbError::Load));
    assert!(log.text().contains("Missing 'Configuration'"));
}

#[test]
fn missing_and_malformed_files_are_errors() {
    init_tracing();
    let tmp = TempDir::new().expect("tmp");
    let mut log = ErrorLog::new();

    let missing = RecordBook::load_file(tmp.path().join("nope.arb"), &mut log, &English);
    assert!(matches!(missing, Err(ArbError::Io(_))));

    let broken = tmp.path().join("broken.arb");
    fs::write(&broken, "<AgilityBook Book=\"15.3\"><Configuration>").expect("write");
    assert!(RecordBook::load_file(&broken, &mut log, &English).is_err());
    assert!(log.is_empty());
}

#[test]
fn bad_runs_are_dropped_but_the_document_loads() {
    init_tracing();
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("juno.arb");
    let mut book = sample_book();
    book.dogs[0].trials[0]
        .runs
        .push(Run::new(day(4, 3), "Standard", "Masters", "Standard"));
    book.save_file(&path, &SaveOptions::default()).expect("save");

    let mut log = ErrorLog::new();
    let loaded = RecordBook::load_file(&path, &mut log, &English).expect("load");
    assert_eq!(loaded.dogs[0].trials[0].runs.len(), 2);
    assert!(log.text().contains("Standard (Standard/Masters)"));
}

#[test]
fn text_whitespace_survives_a_file_round_trip() {
    init_tracing();
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("notes.arb");
    let mut book = sample_book();
    let dog = &mut book.dogs[0];
    dog.note = "  first line\n  indented\n".into();
    dog.breed = " Sheltie".into();
    dog.trials[0].note = "\tparking behind the barn ".into();
    dog.trials[0].runs[0].judge = " Smith ".into();
    dog.trials[0].runs[0].notes.faults = vec![String::new(), " Refusal".into()];
    book.save_file(&path, &SaveOptions::default()).expect("save");

    let mut log = ErrorLog::new();
    let loaded = RecordBook::load_file(&path, &mut log, &English).expect("load");
    assert!(log.is_empty(), "{}", log.text());
    assert_eq!(loaded.dogs[0].note, "  first line\n  indented\n");
    assert_eq!(loaded.dogs[0].breed, " Sheltie");
    assert_eq!(loaded, book);
}

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn caltable(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("caltable").unwrap();
    cmd.env("CALTABLE_DATA_DIR", dir.path())
        .env_remove("CALTABLE_LOG");
    cmd
}

fn add(dir: &TempDir, args: &[&str]) {
    caltable(dir)
        .args(["event", "add"])
        .args(args)
        .assert()
        .success();
}

#[test]
fn add_then_list() {
    let dir = TempDir::new().unwrap();

    caltable(&dir)
        .args(["event", "add", "Dentist", "--start", "2025-10-05 09:00", "--minutes", "45"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added event #1: Dentist"));

    caltable(&dir)
        .args(["event", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("09:00-09:45 Dentist"))
        .stdout(predicate::str::contains("Total: 1 event(s)"));

    let table = fs::read_to_string(dir.path().join("data").join("event.csv")).unwrap();
    assert_eq!(
        table,
        "eventId,title,description,startDateTime,endDateTime\n\
         1,Dentist,,2025-10-05T09:00:00,2025-10-05T09:45:00\n"
    );
}

#[test]
fn overlapping_add_is_refused_unless_forced() {
    let dir = TempDir::new().unwrap();
    add(&dir, &["Standup", "--start", "2025-10-05 09:00", "--end", "2025-10-05 10:00"]);

    caltable(&dir)
        .args(["event", "add", "Call", "--start", "2025-10-05 09:30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("overlaps"));

    // Touching the end of the first event is not a conflict
    add(&dir, &["Review", "--start", "2025-10-05 10:00"]);

    caltable(&dir)
        .args(["event", "add", "Call", "--start", "2025-10-05 09:30", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added event #3"));
}

#[test]
fn monthly_occurrences_step_from_clamped_day() {
    let dir = TempDir::new().unwrap();
    add(
        &dir,
        &[
            "Rent", "--start", "2025-01-31 08:00", "--repeat", "monthly", "--times", "3",
        ],
    );

    caltable(&dir)
        .args(["event", "occurrences", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-01-31 08:00-09:00 Rent (1/3)"))
        .stdout(predicate::str::contains("2025-02-28 08:00-09:00 Rent (2/3)"))
        .stdout(predicate::str::contains("2025-03-28 08:00-09:00 Rent (3/3)"));
}

#[test]
fn oversized_series_is_rejected() {
    let dir = TempDir::new().unwrap();

    caltable(&dir)
        .args([
            "event", "add", "Forever", "--start", "2025-10-05 09:00", "--repeat", "daily",
            "--times", "4000000000",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at most 10000 occurrences"));

    caltable(&dir)
        .args(["event", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No events found."));
}

#[test]
fn show_unknown_event_fails() {
    let dir = TempDir::new().unwrap();

    caltable(&dir)
        .args(["event", "show", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Event not found: 9"));
}

#[test]
fn edit_and_delete() {
    let dir = TempDir::new().unwrap();
    add(&dir, &["Draft", "--start", "2025-10-05 09:00"]);

    caltable(&dir)
        .args(["event", "edit", "1", "--title", "Final", "--location", "Room 3"])
        .assert()
        .success();

    caltable(&dir)
        .args(["event", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title:       Final"))
        .stdout(predicate::str::contains("Location:    Room 3"));

    caltable(&dir)
        .args(["event", "delete", "1"])
        .assert()
        .success();

    caltable(&dir)
        .args(["event", "delete", "1"])
        .assert()
        .failure();
}

#[test]
fn malformed_rows_are_skipped_with_a_warning() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(
        data.join("event.csv"),
        "eventId,title,description,startDateTime,endDateTime\n\
         1,Good,,2025-10-05T09:00:00,2025-10-05T10:00:00\n\
         2,Bad\n",
    )
    .unwrap();

    caltable(&dir)
        .args(["event", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 1 event(s)"))
        .stderr(predicate::str::contains("1 invalid row(s)"));
}

#[test]
fn backup_then_merge_restore_renumbers() {
    let dir = TempDir::new().unwrap();
    add(&dir, &["One", "--start", "2025-10-05 09:00"]);
    add(&dir, &["Two", "--start", "2025-10-06 09:00"]);

    let archive = dir.path().join("archive.txt");
    caltable(&dir)
        .args(["backup", "create"])
        .arg(&archive)
        .assert()
        .success();

    let text = fs::read_to_string(&archive).unwrap();
    assert!(text.starts_with("--- event.csv ---\n"));
    assert!(text.contains("--- recurrent.csv ---\n"));

    caltable(&dir)
        .args(["backup", "restore"])
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored 2 event(s) (merged)"))
        .stdout(predicate::str::contains("event #1 stored as #3"));

    caltable(&dir)
        .args(["event", "search", "One"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 2 event(s)"));
}

#[test]
fn overwrite_restore_needs_force() {
    let dir = TempDir::new().unwrap();
    add(&dir, &["Keep", "--start", "2025-10-05 09:00"]);

    let archive = dir.path().join("archive.txt");
    caltable(&dir)
        .args(["backup", "create"])
        .arg(&archive)
        .assert()
        .success();

    add(&dir, &["Later", "--start", "2025-10-07 09:00"]);

    caltable(&dir)
        .args(["backup", "restore", "--overwrite"])
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));

    caltable(&dir)
        .args(["backup", "restore", "--overwrite", "--force"])
        .arg(&archive)
        .assert()
        .success();

    caltable(&dir)
        .args(["event", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Keep"))
        .stdout(predicate::str::contains("Later").not());
}

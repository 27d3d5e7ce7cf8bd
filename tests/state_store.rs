//! Integration tests for the filesystem state store.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use todo_rpg::models::{GameState, Record, TaskList};
use todo_rpg::storage::{FileStateStore, StateStore};
use todo_rpg::Error;

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("write fixture");
}

fn str_field<'a>(record: &'a Record, key: &str) -> Option<&'a str> {
    record.get(key).and_then(|v| v.as_str())
}

#[test]
fn test_load_full_scenario() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "hero.character.yaml", "name: Thane\n");
    write(dir.path(), "camp.campaign.yaml", "setting: Ashfall\n");
    write(dir.path(), "todo.txt", "Buy sword\nTrain\n");

    let state = FileStateStore::new(dir.path()).load().unwrap();

    let character = state.character.as_ref().unwrap();
    assert_eq!(character.len(), 1);
    assert_eq!(str_field(character, "name"), Some("Thane"));

    let campaign = state.campaign.as_ref().unwrap();
    assert_eq!(campaign.len(), 1);
    assert_eq!(str_field(campaign, "setting"), Some("Ashfall"));

    assert_eq!(state.todos.as_slice(), ["Buy sword", "Train"]);
    assert!(state.rules.is_none());
}

#[test]
fn test_optional_files_may_be_missing() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "todo.txt", "Train\n");

    let state = FileStateStore::new(dir.path()).load().unwrap();
    assert!(state.character.is_none());
    assert!(state.campaign.is_none());
    assert!(state.rules.is_none());
    assert!(state.character_path.is_none());
    assert_eq!(state.todos.len(), 1);
}

#[test]
fn test_only_missing_todo_fails() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "hero.character.yaml", "name: Thane\n");
    write(dir.path(), "rules.md", "Dragons breathe fire.\n");

    let err = FileStateStore::new(dir.path()).load().unwrap_err();
    assert!(
        matches!(&err, Error::NotFound { path } if *path == dir.path().join("todo.txt")),
        "unexpected error: {err:?}"
    );
}

#[test]
fn test_blank_lines_are_dropped() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "todo.txt", "\nBuy sword\n   \n\t\nTrain\n\n");

    let state = FileStateStore::new(dir.path()).load().unwrap();
    assert_eq!(state.todos.as_slice(), ["Buy sword", "Train"]);
}

#[test]
fn test_rules_are_loaded_verbatim() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "todo.txt", "Train\n");
    write(dir.path(), "rules.md", "# Rules\n\n- XP per task: 10\n");

    let state = FileStateStore::new(dir.path()).load().unwrap();
    assert_eq!(state.rules.as_deref(), Some("# Rules\n\n- XP per task: 10\n"));
}

#[test]
fn test_yml_suffix_is_accepted() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "todo.txt", "Train\n");
    write(dir.path(), "character.yml", "name: Thane\nlevel: 3\n");
    write(dir.path(), "world.campaign.yml", "setting: Ashfall\n");

    let state = FileStateStore::new(dir.path()).load().unwrap();
    assert_eq!(str_field(state.character.as_ref().unwrap(), "name"), Some("Thane"));
    assert!(state.campaign.is_some());
}

#[test]
fn test_save_then_load_round_trips_tasks() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "todo.txt", "Buy sword\n\nTrain\n");
    let store = FileStateStore::new(dir.path());

    let state = store.load().unwrap();
    store.save(&state).unwrap();

    assert_eq!(store.read_task_file().unwrap(), "Buy sword\nTrain");
    assert_eq!(store.load().unwrap().todos, state.todos);
}

#[test]
fn test_character_written_back_to_its_own_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "hero.character.yaml", "name: Thane\nlevel: 1\n");
    write(dir.path(), "todo.txt", "Train\n");
    let store = FileStateStore::new(dir.path());

    let mut state = store.load().unwrap();
    let mut mapping = state.character.as_ref().unwrap().as_mapping().clone();
    mapping.insert("level".into(), 2.into());
    state.character = Some(Record::new(mapping));
    store.save(&state).unwrap();

    assert!(!dir.path().join("character.yaml").exists());
    assert!(!dir.path().join("character.yml").exists());

    let reloaded = store.load().unwrap();
    let level = reloaded.character.unwrap().get("level").and_then(|v| v.as_u64());
    assert_eq!(level, Some(2));
    assert_eq!(reloaded.character_path, Some(dir.path().join("hero.character.yaml")));
}

#[test]
fn test_campaign_and_rules_are_never_written() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "camp.campaign.yaml", "setting: Ashfall\n");
    write(dir.path(), "rules.md", "Be brave.\n");
    write(dir.path(), "todo.txt", "Train\n");
    let store = FileStateStore::new(dir.path());

    let mut state = store.load().unwrap();
    state.campaign = None;
    state.rules = Some("Changed".to_string());
    state.todos = TaskList::parse("Train\nRest");
    store.save(&state).unwrap();

    assert_eq!(fs::read_to_string(dir.path().join("camp.campaign.yaml")).unwrap(), "setting: Ashfall\n");
    assert_eq!(fs::read_to_string(dir.path().join("rules.md")).unwrap(), "Be brave.\n");
    assert_eq!(store.read_task_file().unwrap(), "Train\nRest");
}

#[test]
fn test_empty_task_list_saves_empty_file() {
    let dir = TempDir::new().unwrap();
    let store = FileStateStore::new(dir.path());

    store.save(&GameState::with_todos(TaskList::default())).unwrap();
    assert_eq!(store.read_task_file().unwrap(), "");
    assert!(store.load().unwrap().todos.is_empty());
}

mod common;

use anyhow::Result;
use common::TestEnvironment;

use quickfolder::events::AppEvent;
use quickfolder::hotkey::{BindError, ValidationError};
use quickfolder::launcher::LaunchError;
use quickfolder::storage::{Binding, Mapping};

#[test]
fn test_rebind_same_key_last_write_wins() -> Result<()> {
    let env = TestEnvironment::new()?;
    let mut harness = env.start();

    harness.registry.bind("ctrl+alt+c", "/path/a")?;
    harness.registry.bind("ctrl+alt+c", "/path/b")?;

    assert_eq!(harness.backend.ids_for("ctrl+alt+c").len(), 1);
    assert_eq!(harness.registry.len(), 1);
    assert_eq!(
        harness.registry.registration("ctrl+alt+c").unwrap().binding.path,
        "/path/b"
    );

    let on_disk = harness.store.load()?;
    assert_eq!(on_disk.len(), 1);
    assert_eq!(on_disk["ctrl+alt+c"], "/path/b");
    Ok(())
}

#[test]
fn test_differently_written_keys_collide() -> Result<()> {
    let env = TestEnvironment::new()?;
    let mut harness = env.start();

    harness.registry.bind("Ctrl + Alt+C", "/path/a")?;
    let binding = harness.registry.bind("alt+ctrl+c", "/path/b")?;

    assert_eq!(binding, Binding::new("ctrl+alt+c", "/path/b"));
    assert_eq!(harness.registry.active_bindings(), vec![binding]);
    assert_eq!(harness.backend.registered_count(), 1);
    assert_eq!(harness.store.bindings(), vec![Binding::new("ctrl+alt+c", "/path/b")]);
    Ok(())
}

#[test]
fn test_unbind_never_bound_key_is_noop() -> Result<()> {
    let env = TestEnvironment::new()?;
    let mut harness = env.start();
    harness.registry.bind("alt+b", "/b")?;
    let before = env.read_config()?;

    harness.registry.unbind("ctrl+q")?;
    harness.registry.unbind("")?;

    assert_eq!(env.read_config()?, before);
    assert!(harness.registry.is_bound("alt+b"));
    assert_eq!(harness.backend.unregister_calls(), 0);
    Ok(())
}

#[test]
fn test_unbind_stops_dispatch() -> Result<()> {
    let env = TestEnvironment::new()?;
    let mut harness = env.start();
    harness.registry.bind("a", "/x")?;
    let id = harness.registry.registration("a").unwrap().id;

    harness.registry.unbind("A")?;

    assert!(harness.registry.dispatch(id).is_none());
    assert!(harness.launcher.attempts().is_empty());
    assert!(!harness.registry.is_bound("a"));
    assert_eq!(harness.backend.registered_count(), 0);
    assert!(harness.store.load()?.is_empty());
    Ok(())
}

#[test]
fn test_press_opens_bound_folder() -> Result<()> {
    let env = TestEnvironment::new()?;
    let docs = env.create_folder("docs")?;
    let mut harness = env.start();
    harness.registry.bind("ctrl+shift+d", &docs)?;
    let id = harness.registry.registration("ctrl+shift+d").unwrap().id;

    assert!(matches!(harness.registry.dispatch(id), Some(Ok(()))));

    assert_eq!(harness.launcher.attempts(), vec![std::path::PathBuf::from(&docs)]);
    assert_eq!(
        harness.drain_events(),
        vec![AppEvent::FolderOpened {
            key: "ctrl+shift+d".to_string(),
            path: docs,
        }]
    );
    Ok(())
}

#[test]
fn test_failed_launch_keeps_key_bound() -> Result<()> {
    let env = TestEnvironment::new()?;
    let mut harness = env.start();
    harness.registry.bind("f5", "/nonexistent")?;
    let id = harness.registry.registration("f5").unwrap().id;

    let first = harness.registry.dispatch(id);
    assert!(matches!(first, Some(Err(LaunchError::NotFound(_)))));
    assert!(harness.registry.is_bound("f5"));

    // A later press still tries again
    let second = harness.registry.dispatch(id);
    assert!(matches!(second, Some(Err(_))));
    assert_eq!(harness.launcher.attempts().len(), 2);

    let events = harness.drain_events();
    assert_eq!(events.len(), 2);
    assert!(events
        .iter()
        .all(|e| matches!(e, AppEvent::LaunchFailed { key, .. } if key == "f5")));
    assert_eq!(harness.store.get("f5").as_deref(), Some("/nonexistent"));
    Ok(())
}

#[test]
fn test_rejected_combo_is_not_saved() -> Result<()> {
    let env = TestEnvironment::new()?;
    let mut harness = env.start();
    harness.backend.reserve("ctrl+c");

    let err = harness.registry.bind("Ctrl+C", "/x").unwrap_err();

    assert!(matches!(err, BindError::Rejected { ref key, .. } if key == "ctrl+c"));
    assert!(!err.is_bound());
    assert!(harness.store.is_empty());
    assert!(!env.config_path.exists());
    Ok(())
}

#[test]
fn test_failed_rebind_keeps_previous_folder() -> Result<()> {
    let env = TestEnvironment::new()?;
    let mut harness = env.start();
    harness.registry.bind("ctrl+k", "/old")?;

    harness.backend.fail_next_register();
    assert!(harness.registry.bind("ctrl+k", "/new").is_err());

    let registration = harness.registry.registration("ctrl+k").unwrap();
    assert_eq!(registration.binding.path, "/old");
    assert_eq!(harness.backend.ids_for("ctrl+k").len(), 1);
    assert_eq!(harness.store.get("ctrl+k").as_deref(), Some("/old"));

    // The restored registration still dispatches
    let id = registration.id;
    assert!(harness.registry.dispatch(id).is_some());
    Ok(())
}

#[test]
fn test_validation_errors_touch_nothing() -> Result<()> {
    let env = TestEnvironment::new()?;
    let mut harness = env.start();

    assert!(matches!(
        harness.registry.bind("", "/x"),
        Err(BindError::Invalid(ValidationError::EmptyKey))
    ));
    assert!(matches!(
        harness.registry.bind("a", "   "),
        Err(BindError::Invalid(ValidationError::EmptyPath))
    ));
    assert!(matches!(
        harness.registry.bind("ctrl+shift", "/x"),
        Err(BindError::Invalid(ValidationError::MissingKey(_)))
    ));

    assert_eq!(harness.backend.register_calls(), 0);
    assert!(!env.config_path.exists());
    Ok(())
}

#[test]
fn test_load_all_registers_without_writing() -> Result<()> {
    let env = TestEnvironment::new()?;
    let original = r#"{"Ctrl + Alt+C": "/c", "b": "/b"}"#;
    env.write_config(original)?;

    let harness = env.start();

    assert_eq!(harness.registry.len(), 2);
    assert!(harness.registry.is_bound("alt+ctrl+c"));
    assert!(harness.registry.is_bound("B"));
    assert_eq!(env.read_config()?, original);
    Ok(())
}

#[test]
fn test_load_all_reports_bad_entries() -> Result<()> {
    let env = TestEnvironment::new()?;
    let mut harness = env.start();
    harness.backend.reserve("ctrl+v");

    let mut mapping = Mapping::new();
    mapping.insert("ctrl+shift".to_string(), "/x".to_string());
    mapping.insert("ctrl+v".to_string(), "/v".to_string());
    mapping.insert("a".to_string(), "/a".to_string());
    mapping.insert("z".to_string(), "".to_string());

    let failures = harness.registry.load_all(&mapping);

    let mut keys: Vec<_> = failures.iter().map(|(key, _)| key.as_str()).collect();
    keys.sort();
    assert_eq!(keys, vec!["ctrl+shift", "ctrl+v", "z"]);
    assert_eq!(harness.registry.active_bindings(), vec![Binding::new("a", "/a")]);
    Ok(())
}

#[test]
fn test_legacy_spelling_is_cleaned_up_on_unbind() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_config(r#"{"Ctrl + Alt+C": "/c"}"#)?;
    let mut harness = env.start();

    harness.registry.unbind("ctrl+alt+c")?;

    assert!(harness.store.load()?.is_empty());
    assert_eq!(harness.backend.registered_count(), 0);
    Ok(())
}

#[test]
fn test_legacy_spelling_is_replaced_on_rebind() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_config(r#"{"Ctrl + Alt+C": "/c"}"#)?;
    let mut harness = env.start();

    harness.registry.bind("alt+ctrl+c", "/d")?;

    let on_disk = harness.store.load()?;
    assert_eq!(on_disk.len(), 1);
    assert_eq!(on_disk["ctrl+alt+c"], "/d");
    Ok(())
}

#[test]
fn test_shutdown_releases_registrations_but_keeps_mapping() -> Result<()> {
    let env = TestEnvironment::new()?;
    let mut harness = env.start();
    harness.registry.bind("a", "/a")?;
    harness.registry.bind("shift+b", "/b")?;

    harness.registry.shutdown();

    assert!(harness.registry.is_empty());
    assert_eq!(harness.backend.registered_count(), 0);
    assert_eq!(harness.store.load()?.len(), 2);
    Ok(())
}

#[test]
fn test_punctuation_spellings_collide() -> Result<()> {
    let env = TestEnvironment::new()?;
    let mut harness = env.start();

    for (named, symbol) in [("ctrl+minus", "ctrl+-"), ("alt+slash", "alt+/"), ("ctrl+bracketleft", "ctrl+[")] {
        harness.registry.bind(named, "/a")?;
        harness.registry.bind(symbol, "/b")?;

        assert_eq!(harness.backend.ids_for(named).len(), 1, "{named}");
        assert_eq!(harness.registry.registration(symbol).unwrap().binding.path, "/b");
    }

    assert_eq!(harness.registry.len(), 3);
    let on_disk = harness.store.load()?;
    assert_eq!(on_disk.len(), 3);
    assert_eq!(on_disk["ctrl+minus"], "/b");
    assert!(!on_disk.contains_key("ctrl+-"));
    Ok(())
}

#[test]
fn test_duplicate_spellings_in_file_are_all_unbound() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_config(r#"{"Ctrl+A": "/x", "ctrl+a": "/y"}"#)?;
    {
        let mut harness = env.start();
        assert_eq!(harness.registry.active_bindings(), vec![Binding::new("ctrl+a", "/y")]);

        harness.registry.unbind("ctrl+a")?;
        assert!(harness.store.load()?.is_empty());
    }

    let harness = env.start();
    assert!(harness.registry.is_empty());
    Ok(())
}

#[test]
fn test_canonical_spelling_wins_at_startup() -> Result<()> {
    let env = TestEnvironment::new()?;
    // "shift+ctrl+a" sorts after its canonical form
    env.write_config(r#"{"ctrl+shift+a": "/new", "shift+ctrl+a": "/old"}"#)?;

    let harness = env.start();

    assert_eq!(
        harness.registry.active_bindings(),
        vec![Binding::new("ctrl+shift+a", "/new")]
    );
    assert_eq!(harness.backend.registered_count(), 1);
    Ok(())
}

#[test]
fn test_rebind_drops_every_stored_spelling() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_config(r#"{"Ctrl+A": "/x", "a+ctrl": "/w", "ctrl+a": "/y"}"#)?;
    let mut harness = env.start();

    harness.registry.bind("CTRL+A", "/z")?;

    let on_disk = harness.store.load()?;
    assert_eq!(on_disk.len(), 1);
    assert_eq!(on_disk["ctrl+a"], "/z");
    Ok(())
}

#[test]
fn test_bind_with_unwritable_file_stays_active() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_config(r#"{"Ctrl+E": "/old"}"#)?;
    let mut harness = env.start();
    // A directory where the file should be makes every save fail
    std::fs::remove_file(&env.config_path)?;
    std::fs::create_dir_all(env.config_path.join("occupied"))?;

    let err = harness.registry.bind("ctrl+e", "/new").unwrap_err();

    assert!(matches!(err, BindError::NotSaved(_)));
    assert!(err.is_bound());
    assert!(harness.registry.is_bound("ctrl+e"));
    assert_eq!(
        harness.registry.registration("ctrl+e").unwrap().binding.path,
        "/new"
    );
    assert_eq!(harness.store.get("ctrl+e").as_deref(), Some("/new"));
    assert_eq!(harness.store.get("Ctrl+E"), None);
    Ok(())
}

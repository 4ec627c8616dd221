use pixelcast::{CatalogStore, MemoryStore, PixelcastError, Session};

fn session() -> Session<MemoryStore> {
    Session::load(MemoryStore::new()).unwrap()
}

#[test]
fn frame_import_with_one_bad_entry_adds_nothing() {
    let mut s = session();
    s.import_frames_json(r#"["ffffffffffffffff"]"#).unwrap();

    let batch = r#"["8000000000000000","0001020304050607","oops","00ff00ff00ff00ff"]"#;
    let err = s.import_frames_json(batch).unwrap_err();
    assert!(matches!(err, PixelcastError::ImportDecode(_)));
    assert_eq!(s.frames().len(), 1);

    // The persisted catalog was not touched either.
    let stored = s.store().load("frames").unwrap().unwrap();
    assert_eq!(stored, r#"["ffffffffffffffff"]"#);
}

#[test]
fn frame_import_happy_path_appends_in_order() {
    let mut s = session();
    let added = s
        .import_frames_json(r#"["8000000000000000","00ff00ff00ff00ff"]"#)
        .unwrap();
    assert_eq!(added, 2);
    assert_eq!(
        s.frames().export_hex(),
        vec!["8000000000000000", "00ff00ff00ff00ff"]
    );
}

#[test]
fn timeline_import_is_atomic_per_batch() {
    let mut s = session();
    let batch = r#"[
        {"name":"good","frames":["8000000000000000"],"speed":80,"repeat":true},
        {"name":"bad","frames":["8000000000000000","nope"],"speed":80,"repeat":true}
    ]"#;
    assert!(s.import_timelines_json(batch).is_err());
    assert_eq!(s.timelines().len(), 0);
    assert_eq!(s.store().load("timelines").unwrap(), None);
}

#[test]
fn timeline_import_rejects_invalid_parameters() {
    let mut s = session();
    let empty_name = r#"[{"name":"   ","frames":[],"speed":100,"repeat":true}]"#;
    assert!(s.import_timelines_json(empty_name).is_err());

    let zero_speed = r#"[{"name":"x","frames":[],"speed":0,"repeat":true}]"#;
    assert!(s.import_timelines_json(zero_speed).is_err());
}

#[test]
fn malformed_json_is_an_import_error_not_a_panic() {
    let mut s = session();
    assert!(matches!(
        s.import_frames_json("not json at all"),
        Err(PixelcastError::ImportDecode(_))
    ));
}

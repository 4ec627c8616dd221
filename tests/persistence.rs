use pixelcast::{DeviceTarget, Frame, JsonFileStore, RecordingTransport, Session};

#[test]
fn catalogs_survive_a_reload_through_the_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut t = RecordingTransport::new();

    {
        let mut s = Session::load(JsonFileStore::new(dir.path())).unwrap();
        s.set_editor(Frame::from_hex("00ff00ff00ff00ff").unwrap(), &mut t);
        s.commit_current().unwrap();

        let idx = s.create_timeline("pulse").unwrap();
        s.set_timeline_speed(idx, 60).unwrap();
        s.insert_current_into_timeline(0).unwrap();

        s.add_device(DeviceTarget::new("10.0.0.4", "desk", 9).unwrap(), &mut t)
            .unwrap();
    }

    let s = Session::load(JsonFileStore::new(dir.path())).unwrap();
    assert_eq!(s.frames().export_hex(), vec!["00ff00ff00ff00ff"]);
    let timeline = &s.timelines().timelines()[0];
    assert_eq!(timeline.name, "pulse");
    assert_eq!(timeline.speed_ms, 60);
    assert_eq!(timeline.frames[0].to_hex(), "00ff00ff00ff00ff");
    assert_eq!(s.devices()[0].ip, "10.0.0.4");
    assert_eq!(s.last_device(), Some(0));
}

#[test]
fn on_disk_representation_is_canonical_hex_everywhere() {
    let dir = tempfile::tempdir().unwrap();
    let mut t = RecordingTransport::new();

    let mut s = Session::load(JsonFileStore::new(dir.path())).unwrap();
    s.set_editor(Frame::from_hex("8000000000000001").unwrap(), &mut t);
    s.commit_current().unwrap();
    s.create_timeline("pulse").unwrap();
    s.insert_current_into_timeline(0).unwrap();

    let frames_json = std::fs::read_to_string(dir.path().join("frames.json")).unwrap();
    assert_eq!(frames_json, r#"["8000000000000001"]"#);

    // Timelines store their frames in the same hex form, not as raw
    // pixel arrays.
    let timelines_json = std::fs::read_to_string(dir.path().join("timelines.json")).unwrap();
    assert!(timelines_json.contains(r#""frames":["8000000000000001"]"#));
    assert!(!timelines_json.contains("[["));
}

#[test]
fn export_matches_import_format() {
    let mut t = RecordingTransport::new();
    let mut s = Session::load(pixelcast::MemoryStore::new()).unwrap();
    s.set_editor(Frame::from_hex("0102030405060708").unwrap(), &mut t);
    s.commit_current().unwrap();
    s.create_timeline("loop").unwrap();
    s.insert_current_into_timeline(0).unwrap();

    let frames = s.export_frames_json().unwrap();
    let timelines = s.export_timelines_json().unwrap();

    let mut restored = Session::load(pixelcast::MemoryStore::new()).unwrap();
    assert_eq!(restored.import_frames_json(&frames).unwrap(), 1);
    assert_eq!(restored.import_timelines_json(&timelines).unwrap(), 1);
    assert_eq!(restored.frames().export_hex(), s.frames().export_hex());
    assert_eq!(
        restored.timelines().timelines(),
        s.timelines().timelines()
    );
}

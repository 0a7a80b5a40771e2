use folio_responder::{
    default_table_config, Responder, ResponderError, ResponseTable, ResponseTableConfig, Topic,
};
use tempfile::TempDir;

#[test]
fn test_default_table_round_trips_through_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("responses.json");
    default_table_config().save_to_file(&path).unwrap();

    let table = ResponseTable::from_file(&path, "Grace").unwrap();
    let responder = Responder::new(table).with_seed(1);
    let reply = responder.respond("Where's the resume?");
    assert_eq!(reply.topic, Topic::Resume);
    assert!(!reply.text.contains("{name}"));
}

#[test]
fn test_custom_table_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.json");
    std::fs::write(
        &path,
        r#"{
            "buckets": [
                { "topic": "contact", "keywords": ["mail*", "phone number"], "replies": ["Write to {name}."] }
            ],
            "fallback": ["No idea."]
        }"#,
    )
    .unwrap();

    let responder = Responder::new(ResponseTable::from_file(&path, "Linus").unwrap());
    assert_eq!(responder.respond("mailbox?").text, "Write to Linus.");
    assert_eq!(responder.respond("what's your phone number").topic, Topic::Contact);
    assert_eq!(responder.respond("phone").text, "No idea.");
    assert_eq!(responder.respond("").topic, Topic::Default);
}

#[test]
fn test_malformed_table_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        ResponseTable::from_file(&path, "x"),
        Err(ResponderError::Json(_))
    ));
    assert!(matches!(
        ResponseTableConfig::load_from_file(dir.path().join("missing.json")),
        Err(ResponderError::Io(_))
    ));
}

use super::*;

#[test]
fn new_has_no_image() {
    let msg = Message::new("Ana", "hola", "8:03 PM");
    assert_eq!(msg.author, "Ana");
    assert_eq!(msg.content, "hola");
    assert_eq!(msg.timestamp, "8:03 PM");
    assert!(msg.image.is_none());
}

#[test]
fn with_image_attaches_reference() {
    let msg = Message::new("Ana", "look", NOW_TIMESTAMP).with_image("sticker.png");
    assert_eq!(msg.image.as_deref(), Some("sticker.png"));
}

#[test]
fn local_author_gets_own_avatar() {
    assert_eq!(Message::new(LOCAL_AUTHOR, "hi", NOW_TIMESTAMP).author_avatar(), Avatar::Me);
    assert_eq!(Message::new("Luis", "hi", NOW_TIMESTAMP).author_avatar(), Avatar::Someone);
}

#[test]
fn serialize_omits_missing_image() {
    let json = serde_json::to_value(Message::new("Ana", "hola", NOW_TIMESTAMP)).unwrap();
    assert!(json.get("image").is_none());
    assert_eq!(json["author"], "Ana");
}

#[test]
fn deserialize_without_image_field() {
    let msg: Message = serde_json::from_str(r#"{"author":"Luis","content":"yo","timestamp":"Now"}"#).unwrap();
    assert_eq!(msg, Message::new("Luis", "yo", "Now"));
}

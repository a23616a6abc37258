use frames::ShapeKind;

use super::*;

#[test]
fn browser_button_codes_map_to_buttons() {
    assert_eq!(map_button(0), Button::Primary);
    assert_eq!(map_button(1), Button::Middle);
    assert_eq!(map_button(2), Button::Secondary);
    // Back/forward buttons fall through to primary.
    assert_eq!(map_button(3), Button::Primary);
}

#[test]
fn modifiers_are_passed_through() {
    let m = map_modifiers(true, false, true, false);
    assert!(m.shift);
    assert!(!m.ctrl);
    assert!(m.alt);
    assert!(!m.meta);
}

#[test]
fn tool_names_use_wire_spelling() {
    assert_eq!(parse_tool("select").expect("select"), Tool::Select);
    assert_eq!(parse_tool("pen").expect("pen"), Tool::Pen);
    assert_eq!(parse_tool("rectangle").expect("rectangle"), Tool::Rectangle);
    assert_eq!(parse_tool("circle").expect("circle"), Tool::Circle);
    assert_eq!(parse_tool("arrow").expect("arrow"), Tool::Arrow);
}

#[test]
fn unknown_tool_is_rejected() {
    let err = parse_tool("eraser").expect_err("eraser is not a tool");
    assert!(matches!(err, HostError::UnknownTool(ref name) if name == "eraser"));
}

#[test]
fn catch_up_body_yields_ordered_shapes() {
    let body = r#"{"strokes":[
        {"tool":"pen","x":1,"y":2,"color":"red","size":3},
        {"tool":"rectangle","x":0,"y":0,"endX":10,"endY":5,"color":"blue","size":2}
    ]}"#;
    let shapes = parse_catch_up(body).expect("parse");
    assert_eq!(shapes.len(), 2);
    assert_eq!(shapes[0].kind, ShapeKind::Pen);
    assert_eq!(shapes[1], Shape::rectangle(0.0, 0.0, 10.0, 5.0, "blue", 2.0));
}

#[test]
fn catch_up_without_strokes_key_is_rejected() {
    assert!(matches!(parse_catch_up(r#"{"ok":true}"#), Err(HostError::CatchUp(_))));
    assert!(matches!(parse_catch_up("[]"), Err(HostError::CatchUp(_))));
}

#[test]
fn frames_are_encoded_in_order() {
    let events = vec![
        ClientEvent::JoinRoom { room_id: "a".into() },
        ClientEvent::DeleteStroke { room_id: "a".into(), stroke_index: 4 },
    ];
    let frames = encode_frames(&events).expect("encode");
    assert_eq!(frames.len(), 2);

    let first: serde_json::Value = serde_json::from_str(&frames[0]).expect("json");
    let second: serde_json::Value = serde_json::from_str(&frames[1]).expect("json");
    assert_eq!(first["type"], "join_room");
    assert_eq!(second["type"], "delete_stroke");
    assert_eq!(second["strokeIndex"], 4);
}

#[test]
fn notices_are_tagged_camel_case_json() {
    let chat = encode_notice(&Notice::Chat { user_id: "bob".into(), message: "hi".into() }).expect("encode");
    let chat: serde_json::Value = serde_json::from_str(&chat).expect("json");
    assert_eq!(chat, serde_json::json!({"type": "chat", "userId": "bob", "message": "hi"}));

    let count = encode_notice(&Notice::ActiveCount(3)).expect("encode");
    let count: serde_json::Value = serde_json::from_str(&count).expect("json");
    assert_eq!(count, serde_json::json!({"type": "active_count", "activeCount": 3}));
}

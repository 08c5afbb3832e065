use helm_derive::api_model;

#[api_model]
struct GatewayView {
    url: String,
    has_token: bool,
}

#[api_model(deny_unknown_fields = false)]
struct Loose {
    edit_mode: bool,
}

fn main() {
    let view = GatewayView { url: "ws://localhost:18789".to_owned(), has_token: true };
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["hasToken"], serde_json::Value::Bool(true));

    let strict: Result<GatewayView, _> =
        serde_json::from_str(r#"{"url":"ws://h:1","hasToken":false,"extra":1}"#);
    assert!(strict.is_err());

    let loose: Loose = serde_json::from_str(r#"{"editMode":true,"extra":1}"#).unwrap();
    assert!(loose.edit_mode);
}

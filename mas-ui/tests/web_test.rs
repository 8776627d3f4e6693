#![cfg(target_arch = "wasm32")]

use mas_client::{resolve_session_id, SessionStorage, SESSION_STORAGE_KEY};
use mas_ui::{client_config, LocalStorage};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn local_storage_round_trips_values() {
    LocalStorage.set("mas-ui-test-key", "value-1").unwrap();
    assert_eq!(
        LocalStorage.get("mas-ui-test-key").unwrap().as_deref(),
        Some("value-1")
    );
}

#[wasm_bindgen_test]
fn session_id_is_stable_across_resolutions() {
    LocalStorage.set(SESSION_STORAGE_KEY, "").unwrap();

    let first = resolve_session_id(&LocalStorage);
    let second = resolve_session_id(&LocalStorage);

    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert_eq!(
        LocalStorage.get(SESSION_STORAGE_KEY).unwrap().as_deref(),
        Some(first.as_str())
    );
}

#[wasm_bindgen_test]
fn client_config_derives_socket_base_from_api_base() {
    let config = client_config();
    let expected = if config.api_base.starts_with("https://") {
        config.api_base.replacen("https://", "wss://", 1)
    } else {
        config.api_base.replacen("http://", "ws://", 1)
    };
    if option_env!("MAS_WS_URL").is_none() {
        assert_eq!(config.ws_base, expected);
    }
    assert!(config.socket_url("abc").ends_with("/ws/chat/abc"));
}

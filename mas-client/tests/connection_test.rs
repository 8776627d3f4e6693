//! Connection manager integration tests against in-memory transports.

mod support;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use mas_client::transport::{CLOSE_GOING_AWAY, CLOSE_NORMAL};
use mas_client::{ClientError, EventKind, ServerEvent, SocketEvent};
use serde_json::json;
use shared_types::ClientMessage;

use support::{close, deliver, open, test_config, Rig, SESSION_ID};

#[test]
fn test_connect_uses_session_url() {
    let rig = Rig::new(test_config());
    let id = rig.establish();

    assert_eq!(
        rig.network.url(id),
        format!("ws://localhost:8000/ws/chat/{SESSION_ID}")
    );
    assert!(rig.manager.is_connected());
}

#[test]
fn test_connect_while_pending_opens_one_socket() {
    let rig = Rig::new(test_config());
    rig.manager.connect();
    rig.manager.connect();
    assert_eq!(rig.network.open_count(), 1);
    assert!(rig.manager.is_connecting());

    let id = rig.network.last_id().unwrap();
    open(&rig.manager, &rig.network, id);
    rig.manager.connect();
    assert_eq!(rig.network.open_count(), 1);
}

#[test]
fn test_normal_closures_never_reconnect() {
    for code in [CLOSE_NORMAL, CLOSE_GOING_AWAY] {
        let rig = Rig::new(test_config());
        let id = rig.establish();
        close(&rig.manager, &rig.network, id, code);

        assert!(!rig.manager.is_connected());
        assert!(!rig.manager.has_pending_reconnect());
        assert_eq!(rig.timers.pending_count(), 0, "close code {code}");
    }
}

#[test]
fn test_abnormal_closure_schedules_exactly_one_reconnect() {
    let rig = Rig::new(test_config());
    let id = rig.establish();
    close(&rig.manager, &rig.network, id, 1006);

    assert!(rig.manager.has_pending_reconnect());
    assert_eq!(rig.timers.pending_delays(), vec![Duration::from_millis(3000)]);
    assert_eq!(rig.manager.reconnect_attempts(), 1);

    assert_eq!(rig.timers.fire_pending(), 1);
    assert_eq!(rig.network.open_count(), 2);
    assert!(!rig.manager.has_pending_reconnect());

    let second = rig.network.last_id().unwrap();
    open(&rig.manager, &rig.network, second);
    assert!(rig.manager.is_connected());
    assert_eq!(rig.manager.reconnect_attempts(), 0);
}

#[test]
fn test_reconnect_keeps_retrying_without_cap() {
    let rig = Rig::new(test_config());
    let mut id = rig.establish();

    for attempt in 1..=5 {
        close(&rig.manager, &rig.network, id, 1011);
        assert_eq!(rig.manager.reconnect_attempts(), attempt);
        assert_eq!(rig.timers.fire_pending(), 1);
        id = rig.network.last_id().unwrap();
    }
    assert_eq!(rig.network.open_count(), 6);
}

#[test]
fn test_synchronous_open_failure_schedules_reconnect() {
    let rig = Rig::new(test_config());
    rig.network.fail_next_open();
    rig.manager.connect();

    assert_eq!(rig.network.open_count(), 0);
    assert!(!rig.manager.is_connecting());
    assert!(rig.manager.has_pending_reconnect());

    rig.timers.fire_pending();
    assert_eq!(rig.network.open_count(), 1);
}

#[test]
fn test_configured_reconnect_delay_is_used() {
    let mut config = test_config();
    config.reconnect_delay = Duration::from_millis(250);
    let rig = Rig::new(config);
    let id = rig.establish();
    close(&rig.manager, &rig.network, id, 1006);
    assert_eq!(rig.timers.pending_delays(), vec![Duration::from_millis(250)]);
}

#[test]
fn test_disconnect_cancels_pending_reconnect_and_closes_normally() {
    let rig = Rig::new(test_config());
    let id = rig.establish();
    rig.manager.disconnect();
    assert_eq!(
        rig.network.closed_with(id),
        Some((CLOSE_NORMAL, "User disconnect".to_string()))
    );
    assert!(!rig.manager.is_connected());

    let rig = Rig::new(test_config());
    let id = rig.establish();
    close(&rig.manager, &rig.network, id, 1006);
    assert!(rig.manager.has_pending_reconnect());
    rig.manager.disconnect();
    assert!(!rig.manager.has_pending_reconnect());
    assert_eq!(rig.timers.pending_count(), 0);

    rig.manager.disconnect();
}

#[test]
fn test_send_while_disconnected_fails() {
    let rig = Rig::new(test_config());
    let message = ClientMessage::ChatMessage {
        content: "hello".to_string(),
    };
    assert!(matches!(
        rig.manager.send_message(&message),
        Err(ClientError::NotConnected)
    ));

    rig.manager.connect();
    assert!(matches!(
        rig.manager.send_message(&message),
        Err(ClientError::NotConnected)
    ));
}

#[test]
fn test_send_serializes_typed_frame() {
    let rig = Rig::new(test_config());
    let id = rig.establish();
    rig.manager
        .send_message(&ClientMessage::ChatMessage {
            content: "What's the weather in Paris?".to_string(),
        })
        .unwrap();

    assert_eq!(
        rig.network.sent_json(id),
        vec![json!({"type": "chat_message", "content": "What's the weather in Paris?"})]
    );
}

#[test]
fn test_heartbeat_is_answered_with_pong() {
    let rig = Rig::new(test_config());
    let id = rig.establish();
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let _subscription = rig
        .manager
        .register_handler(EventKind::Heartbeat, move |_| counter.set(counter.get() + 1));

    deliver(&rig.manager, id, json!({"type": "heartbeat"}));

    assert_eq!(rig.network.sent(id), vec![r#"{"type":"pong"}"#.to_string()]);
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_dispatch_reaches_registered_handlers_until_unregistered() {
    let rig = Rig::new(test_config());
    let id = rig.establish();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let sink = seen.clone();
    let subscription = rig.manager.register_handler(EventKind::MessageReceived, move |event| {
        if let ServerEvent::MessageReceived(ack) = event {
            sink.borrow_mut().push(ack.message_id.clone());
        }
    });
    let other = Rc::new(Cell::new(0));
    let other_counter = other.clone();
    let _errors = rig
        .manager
        .register_handler(EventKind::Error, move |_| other_counter.set(other_counter.get() + 1));

    deliver(&rig.manager, id, json!({"type": "message_received", "message_id": "m-1"}));
    subscription.unregister();
    deliver(&rig.manager, id, json!({"type": "message_received", "message_id": "m-2"}));

    assert_eq!(*seen.borrow(), vec![Some("m-1".to_string())]);
    assert_eq!(other.get(), 0);
    assert_eq!(rig.manager.handler_count(EventKind::MessageReceived), 0);
}

#[test]
fn test_kind_can_be_named_by_wire_tag() {
    let rig = Rig::new(test_config());
    let id = rig.establish();
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let kind = "pong".parse::<EventKind>().unwrap();
    let _subscription = rig
        .manager
        .register_handler(kind, move |_| counter.set(counter.get() + 1));

    deliver(&rig.manager, id, json!({"type": "pong"}));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_handler_may_unregister_itself_during_dispatch() {
    let rig = Rig::new(test_config());
    let id = rig.establish();
    let calls = Rc::new(Cell::new(0));
    let slot: Rc<RefCell<Option<mas_client::Subscription>>> = Rc::new(RefCell::new(None));

    let counter = calls.clone();
    let own = slot.clone();
    let subscription = rig.manager.register_handler(EventKind::Error, move |_| {
        counter.set(counter.get() + 1);
        if let Some(subscription) = own.borrow_mut().take() {
            subscription.unregister();
        }
    });
    *slot.borrow_mut() = Some(subscription);

    deliver(&rig.manager, id, json!({"type": "error", "error": "first"}));
    deliver(&rig.manager, id, json!({"type": "error", "error": "second"}));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_garbage_frames_are_dropped() {
    let rig = Rig::new(test_config());
    let id = rig.establish();
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let _subscription = rig
        .manager
        .register_handler(EventKind::AgentResponse, move |_| counter.set(counter.get() + 1));

    rig.manager
        .handle_socket_event(id, SocketEvent::Message("not json {".to_string()));
    deliver(&rig.manager, id, json!({"content": "missing type"}));
    deliver(&rig.manager, id, json!({"type": "telemetry"}));
    deliver(&rig.manager, id, json!({"type": "agent_response", "agent_responses": 3}));

    assert_eq!(calls.get(), 0);
    assert!(rig.manager.is_connected());
    assert!(rig.network.sent(id).is_empty());
}

#[test]
fn test_events_from_replaced_socket_are_ignored() {
    let rig = Rig::new(test_config());
    let first = rig.establish();
    close(&rig.manager, &rig.network, first, 1006);
    rig.timers.fire_pending();
    let second = rig.network.last_id().unwrap();
    open(&rig.manager, &rig.network, second);

    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let _subscription = rig
        .manager
        .register_handler(EventKind::Pong, move |_| counter.set(counter.get() + 1));

    deliver(&rig.manager, first, json!({"type": "pong"}));
    rig.manager.handle_socket_event(
        first,
        SocketEvent::Closed {
            code: 1006,
            reason: "late".to_string(),
        },
    );

    assert_eq!(calls.get(), 0);
    assert!(rig.manager.is_connected());
    assert!(!rig.manager.has_pending_reconnect());
}

#[test]
fn test_connect_replaces_socket_left_behind_by_error() {
    let rig = Rig::new(test_config());
    let first = rig.establish();
    rig.manager
        .handle_socket_event(first, SocketEvent::Error("network down".to_string()));
    assert!(!rig.manager.is_connected());
    assert!(!rig.manager.is_connecting());

    rig.network.sever(first);
    rig.manager.connect();

    assert_eq!(
        rig.network.closed_with(first),
        Some((CLOSE_NORMAL, "Replaced by new connection".to_string()))
    );
    assert_eq!(rig.network.open_count(), 2);
    let second = rig.network.last_id().unwrap();
    assert_ne!(first, second);

    rig.manager.handle_socket_event(
        first,
        SocketEvent::Closed {
            code: 1006,
            reason: String::new(),
        },
    );
    assert_eq!(rig.timers.pending_count(), 0);
    assert!(!rig.manager.has_pending_reconnect());
    assert!(rig.manager.is_connecting());
}

#[test]
fn test_status_listeners_see_transitions() {
    let rig = Rig::new(test_config());
    let transitions = Rc::new(RefCell::new(Vec::new()));
    let sink = transitions.clone();
    rig.manager
        .on_status_change(move |connected| sink.borrow_mut().push(connected));

    let id = rig.establish();
    rig.manager
        .handle_socket_event(id, SocketEvent::Error("network".to_string()));
    close(&rig.manager, &rig.network, id, 1006);

    assert_eq!(*transitions.borrow(), vec![true, false]);
}

#[test]
fn test_keepalive_disabled_by_default() {
    let rig = Rig::new(test_config());
    rig.establish();
    assert_eq!(rig.timers.pending_count(), 0);
}

#[test]
fn test_keepalive_pings_only_while_connected() {
    let mut config = test_config();
    config.keepalive_interval = Some(Duration::from_secs(30));
    let rig = Rig::new(config);
    let id = rig.establish();

    assert_eq!(rig.timers.pending_delays(), vec![Duration::from_secs(30)]);
    rig.timers.fire_pending();
    rig.timers.fire_pending();
    assert_eq!(
        rig.network.sent_json(id),
        vec![json!({"type": "ping"}), json!({"type": "ping"})]
    );

    close(&rig.manager, &rig.network, id, CLOSE_NORMAL);
    assert_eq!(rig.timers.pending_count(), 0);
}

//! WeCom webhook delivery against a mock server.

use serde_json::json;
use statuspage_server::error::NotificationError;
use statuspage_server::heartbeat::Heartbeat;
use statuspage_server::notification::{Notification, NotificationProvider, WeCom};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn notification(key: Option<&str>) -> Notification {
    Notification {
        provider: "WeCom".into(),
        we_com_bot_key: key.map(ToString::to_string),
    }
}

#[tokio::test]
async fn posts_text_message_with_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/webhook/send"))
        .and(query_param("key", "bot-key-1"))
        .and(body_json(json!({
            "msgtype": "text",
            "text": {"content": "UptimeKuma Monitor Down[API] connection refused"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"errcode": 0, "errmsg": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = WeCom::with_base_url(reqwest::Client::new(), server.uri());
    let heartbeat = Heartbeat {
        status: 0,
        msg: "connection refused".into(),
        ..Default::default()
    };

    let confirmation = provider
        .send(
            &notification(Some("bot-key-1")),
            "[API] connection refused",
            None,
            Some(&heartbeat),
        )
        .await
        .expect("send");

    assert_eq!(confirmation, "Sent Successfully.");
}

#[tokio::test]
async fn server_error_becomes_send_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/webhook/send"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let provider = WeCom::with_base_url(reqwest::Client::new(), server.uri());
    let err = provider
        .send(&notification(Some("k")), "hello", None, None)
        .await
        .expect_err("must fail");

    match err {
        NotificationError::SendFailed { provider, reason } => {
            assert_eq!(provider, "WeCom");
            assert!(reason.contains("500"), "{reason}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn vendor_error_code_becomes_send_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/webhook/send"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"errcode": 93000, "errmsg": "invalid webhook url"})),
        )
        .mount(&server)
        .await;

    let provider = WeCom::with_base_url(reqwest::Client::new(), server.uri());
    let err = provider
        .send(&notification(Some("bad")), "hello", None, None)
        .await
        .expect_err("must fail");

    assert!(matches!(err, NotificationError::SendFailed { ref reason, .. } if reason.contains("93000")));
}

#[tokio::test]
async fn unreachable_host_becomes_send_failed() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let provider = WeCom::with_base_url(reqwest::Client::new(), uri);
    let err = provider
        .send(&notification(Some("k")), "hello", None, None)
        .await
        .expect_err("must fail");

    assert!(matches!(err, NotificationError::SendFailed { provider: "WeCom", .. }));
}

#[tokio::test]
async fn missing_key_is_a_config_error() {
    let provider = WeCom::with_base_url(reqwest::Client::new(), "http://127.0.0.1:9");
    let err = provider
        .send(&notification(None), "hello", None, None)
        .await
        .expect_err("must fail");

    assert!(matches!(err, NotificationError::InvalidConfig(_)));
}

#[tokio::test]
async fn transport_error_hides_bot_key() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let provider = WeCom::with_base_url(reqwest::Client::new(), uri);
    let err = provider
        .send(&notification(Some("SUPERSECRETKEY")), "hello", None, None)
        .await
        .expect_err("must fail");

    let text = err.to_string();
    assert!(text.starts_with("WeCom: notification send failed"), "{text}");
    assert!(!text.contains("SUPERSECRETKEY"), "{text}");
}

// Integration tests driving the API client and cart poller against a
// mock backend.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use pizzabot_cli::cart::refresh;
use pizzabot_cli::interface::{classify_submission, Submission};
use pizzabot_cli::logger::Logger;
use pizzabot_cli::transcript::SEND_FAILED_TEXT;
use pizzabot_cli::utils::render_fragment;
use pizzabot_cli::{
    ApiClient, AppConfig, CartBoard, CartPoller, ChatReply, Menu, Sender, Transcript,
};

fn test_config(server_url: String) -> AppConfig {
    AppConfig {
        server_url,
        ..AppConfig::default()
    }
}

fn test_logger(dir: &str) -> Logger {
    let _ = fs::remove_dir_all(dir);
    Logger::new(dir).unwrap()
}

#[tokio::test]
async fn test_menu_load_renders_both_fragments() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/menu")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"pizzas": "We have 1- Margherita, 2- Pepperoni.",
                "customizations": "Cheese Options:<br>- Mozzarella (₹50)"}"#,
        )
        .create_async()
        .await;

    let client = ApiClient::new(&test_config(server.url())).unwrap();
    let menu: Menu = client.fetch_menu().await.unwrap();
    mock.assert_async().await;

    let pizzas = render_fragment(&menu.pizzas);
    let customizations = render_fragment(&menu.customizations);
    assert!(pizzas.contains("Margherita"));
    assert!(pizzas.contains("Pepperoni"));
    assert!(customizations.contains("Cheese Options:\n- Mozzarella"));
}

#[tokio::test]
async fn test_menu_load_rejects_non_json_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/menu")
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let client = ApiClient::new(&test_config(server.url())).unwrap();
    let err = client.fetch_menu().await.unwrap_err();
    assert!(format!("{:#}", err).contains("/menu"));
}

#[tokio::test]
async fn test_cart_refresh_updates_board() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/cart")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"items": "1x Margherita", "total": "Total: ₹299.00"}"#)
        .create_async()
        .await;

    let client = ApiClient::new(&test_config(server.url())).unwrap();
    let board = CartBoard::new();
    let logger = test_logger("test_int_logs_cart_ok");

    assert!(refresh(&client, &board, &logger).await);

    let view = board.snapshot();
    let summary = view.summary.unwrap();
    assert_eq!(summary.items, "1x Margherita");
    assert_eq!(summary.total, "Total: ₹299.00");
    assert_eq!(view.refreshes, 1);
    assert_eq!(view.failures, 0);

    let _ = fs::remove_dir_all("test_int_logs_cart_ok");
}

#[tokio::test]
async fn test_failed_cart_refresh_keeps_stale_values() {
    let mut server = mockito::Server::new_async().await;
    let ok_mock = server
        .mock("GET", "/cart")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"items": "2x Pepperoni", "total": "Total: ₹698.00"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = ApiClient::new(&test_config(server.url())).unwrap();
    let board = CartBoard::new();
    let logger = test_logger("test_int_logs_cart_stale");

    assert!(refresh(&client, &board, &logger).await);
    ok_mock.remove_async().await;

    // Backend starts failing; the previous snapshot must stay visible.
    let _err_mock = server
        .mock("GET", "/cart")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    assert!(!refresh(&client, &board, &logger).await);

    let view = board.snapshot();
    let summary = view.summary.unwrap();
    assert_eq!(summary.items, "2x Pepperoni");
    assert_eq!(summary.total, "Total: ₹698.00");
    assert_eq!(view.failures, 1);

    // Failure was logged for diagnosis
    let log_dir = fs::read_dir("test_int_logs_cart_stale").unwrap();
    let log_file = log_dir.filter_map(|e| e.ok()).next().unwrap();
    let content = fs::read_to_string(log_file.path()).unwrap();
    assert!(content.contains("Cart refresh failed"));

    let _ = fs::remove_dir_all("test_int_logs_cart_stale");
}

#[tokio::test]
async fn test_send_message_posts_json_and_parses_reply() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/process_message")
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::JsonString(r#"{"message": "Hi"}"#.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"response": "Hello! What would you like to order?", "session_id": "s1"}"#)
        .create_async()
        .await;

    let client = ApiClient::new(&test_config(server.url())).unwrap();

    // Optimistic append first, exactly one bot entry after resolution.
    let mut transcript = Transcript::new();
    transcript.push_user("Hi");
    assert_eq!(transcript.len(), 1);

    let reply = client.send_message("Hi").await.unwrap();
    mock.assert_async().await;
    transcript.push_bot(&reply.response);

    assert_eq!(transcript.len(), 2);
    let bot = transcript.iter().last().unwrap();
    assert_eq!(bot.sender, Sender::Bot);
    assert!(!bot.error);
    assert_eq!(bot.text, "Hello! What would you like to order?");
    assert_eq!(reply.session_id.as_deref(), Some("s1"));
}

#[tokio::test]
async fn test_send_message_chat_variant_reply_field() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"reply": "Sure, one Margherita!"}"#)
        .create_async()
        .await;

    let config = AppConfig {
        server_url: server.url(),
        chat_endpoint: "chat".to_string(),
        ..AppConfig::default()
    };
    let client = ApiClient::new(&config).unwrap();

    let reply: ChatReply = client.send_message("One Margherita").await.unwrap();
    mock.assert_async().await;
    assert_eq!(reply.response, "Sure, one Margherita!");
    assert!(reply.session_id.is_none());
}

#[tokio::test]
async fn test_failed_send_yields_one_error_entry() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/process_message")
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let client = ApiClient::new(&test_config(server.url())).unwrap();

    let mut transcript = Transcript::new();
    transcript.push_user("Hi");

    let result = client.send_message("Hi").await;
    assert!(result.is_err());
    transcript.push_error();

    assert_eq!(transcript.len(), 2);
    let errors: Vec<_> = transcript.iter().filter(|e| e.error).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].sender, Sender::Bot);
    assert_eq!(errors[0].text, SEND_FAILED_TEXT);
    assert!(errors[0].text.contains("Oops"));
}

#[tokio::test]
async fn test_non_2xx_chat_response_is_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/process_message")
        .with_status(404)
        .with_body("not found")
        .create_async()
        .await;

    let client = ApiClient::new(&test_config(server.url())).unwrap();
    let err = client.send_message("Hi").await.unwrap_err();
    let msg = format!("{:#}", err);
    assert!(msg.contains("/process_message"));
    assert!(msg.contains("404"));
}

#[tokio::test]
async fn test_whitespace_only_submission_sends_nothing() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/process_message")
        .expect(0)
        .create_async()
        .await;

    let client = ApiClient::new(&test_config(server.url())).unwrap();
    let mut transcript = Transcript::new();

    // Same guard the REPL uses: only Message submissions reach the wire.
    for input in ["", "   ", "\t", " \n "] {
        if let Submission::Message(msg) = classify_submission(input) {
            transcript.push_user(msg);
            let _ = client.send_message(msg).await;
        }
    }

    assert!(transcript.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cart_poller_refreshes_until_stopped() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/cart")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"items": "1x Farmhouse", "total": "Total: ₹449.00"}"#)
        .expect_at_least(1)
        .create_async()
        .await;

    let client = Arc::new(ApiClient::new(&test_config(server.url())).unwrap());
    let board = Arc::new(CartBoard::new());
    let logger = Arc::new(test_logger("test_int_logs_poller"));

    let poller = CartPoller::spawn(client, board.clone(), logger, Duration::from_millis(20));

    // Let it tick a few times, then stop.
    tokio::time::sleep(Duration::from_millis(150)).await;
    poller.stop();

    let view = board.snapshot();
    assert!(view.refreshes >= 1);
    assert_eq!(view.summary.unwrap().items, "1x Farmhouse");

    let _ = fs::remove_dir_all("test_int_logs_poller");
}

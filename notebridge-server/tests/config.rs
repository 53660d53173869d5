use notebridge_server::{AllowedOrigins, ServerConfig};

#[test]
fn wildcard_or_blank_allows_any_origin() {
    assert_eq!(AllowedOrigins::parse("*"), AllowedOrigins::Any);
    assert_eq!(AllowedOrigins::parse(""), AllowedOrigins::Any);
    assert_eq!(AllowedOrigins::parse(" , "), AllowedOrigins::Any);
    assert_eq!(
        AllowedOrigins::parse("http://a.test, *"),
        AllowedOrigins::Any
    );
}

#[test]
fn comma_list_is_trimmed_and_blanks_dropped() {
    assert_eq!(
        AllowedOrigins::parse("http://localhost:3000, ,https://lab.example.org "),
        AllowedOrigins::List(vec![
            "http://localhost:3000".to_string(),
            "https://lab.example.org".to_string(),
        ])
    );
}

#[test]
fn defaults_bind_every_interface_on_8000() {
    let config = ServerConfig::default();
    assert_eq!(config.bind_address(), "0.0.0.0:8000");
    assert_eq!(config.allowed_origins(), AllowedOrigins::Any);
    assert!(config.notebook_log.is_none());
}

#[test]
fn flags_override_defaults() {
    use clap::Parser;

    let config = ServerConfig::try_parse_from([
        "notebridge",
        "--host",
        "127.0.0.1",
        "--port",
        "9001",
        "--allowed-origin",
        "http://localhost:3000",
        "--notebook-log",
        "/tmp/notebook.json",
    ])
    .unwrap();
    assert_eq!(config.bind_address(), "127.0.0.1:9001");
    assert_eq!(
        config.allowed_origins(),
        AllowedOrigins::List(vec!["http://localhost:3000".to_string()])
    );
    assert_eq!(
        config.notebook_log.as_deref(),
        Some(std::path::Path::new("/tmp/notebook.json"))
    );
}

use std::io::Write;

use super::*;

#[test]
fn defaults_are_valid() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.to_string(), "127.0.0.1:3000");
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert_eq!(settings.content.root, PathBuf::from("content"));
    assert!(settings.notify.webhook_url.is_none());
    assert_eq!(settings.site.owner, settings.site.title);
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn webhook_flag_overrides_configured_url() {
    let mut raw = RawSettings::default();
    raw.notify.webhook_url = Some("https://chat.example/hooks/file".to_string());

    let args = CliArgs::parse_from([
        "folio",
        "--webhook-url",
        "https://chat.example/hooks/cli",
        "notify",
        "test",
    ]);
    raw.apply_cli(&args);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(
        settings.notify.webhook_url.map(|url| url.to_string()),
        Some("https://chat.example/hooks/cli".to_string())
    );
}

#[test]
fn blank_webhook_url_means_unconfigured() {
    let mut raw = RawSettings::default();
    raw.notify.webhook_url = Some("   ".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.notify.webhook_url.is_none());
}

#[test]
fn malformed_webhook_url_is_rejected() {
    let mut raw = RawSettings::default();
    raw.notify.webhook_url = Some("not a url".to_string());

    let err = Settings::from_raw(raw).expect_err("invalid url");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "notify.webhook_url",
            ..
        }
    ));
}

#[test]
fn non_http_webhook_scheme_is_rejected() {
    let mut raw = RawSettings::default();
    raw.notify.webhook_url = Some("ftp://chat.example/hook".to_string());
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn invalid_log_level_is_reported_with_key() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());

    let err = Settings::from_raw(raw).expect_err("invalid level");
    assert!(err.to_string().contains("logging.level"));
}

#[test]
fn social_links_require_label_and_href() {
    let mut raw = RawSettings::default();
    raw.site.social = vec![RawSocialLink {
        label: "github".to_string(),
        href: " ".to_string(),
    }];
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn config_file_layers_under_cli() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    writeln!(
        file,
        r#"
[server]
port = 8080

[site]
title = "Jane Doe"
source_url = "https://github.com/janedoe/site"

[[site.social]]
label = "github"
href = "https://github.com/janedoe"
"#
    )
    .expect("write config");

    let path = file.path().to_string_lossy().to_string();
    let args = CliArgs::parse_from([
        "folio",
        "--config-file",
        path.as_str(),
        "serve",
        "--server-host",
        "0.0.0.0",
    ]);
    let settings = load(&args).expect("settings");

    assert_eq!(settings.server.addr.to_string(), "0.0.0.0:8080");
    assert_eq!(settings.site.title, "Jane Doe");
    assert_eq!(settings.site.social.len(), 1);
    assert_eq!(
        settings.site.source_url.as_deref(),
        Some("https://github.com/janedoe/site")
    );
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["folio"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_new_post_notification() {
    let args = CliArgs::parse_from([
        "folio",
        "notify",
        "new-post",
        "--title",
        "Hello",
        "--slug",
        "hello",
    ]);

    match args.command.expect("notify command") {
        Command::Notify(NotifyArgs {
            command: NotifyCommand::NewPost(post),
        }) => {
            assert_eq!(post.title, "Hello");
            assert_eq!(post.slug, "hello");
            assert_eq!(post.excerpt, "");
        }
        other => panic!("wrong command parsed: {other:?}"),
    }
}

#[test]
fn parse_deployment_notifications() {
    for (name, expected) in [
        ("deploy-started", "started"),
        ("deploy-succeeded", "succeeded"),
        ("deploy-failed", "failed"),
    ] {
        let args = CliArgs::parse_from(["folio", "notify", name]);
        let parsed = match args.command {
            Some(Command::Notify(NotifyArgs { command })) => match command {
                NotifyCommand::DeployStarted => "started",
                NotifyCommand::DeploySucceeded => "succeeded",
                NotifyCommand::DeployFailed => "failed",
                _ => "other",
            },
            _ => "none",
        };
        assert_eq!(parsed, expected);
    }
}

#[test]
fn parse_render_arguments() {
    let args = CliArgs::parse_from(["folio", "render", "--class", "prose", "post.md"]);

    match args.command.expect("render command") {
        Command::Render(render) => {
            assert_eq!(render.file, PathBuf::from("post.md"));
            assert_eq!(render.class.as_deref(), Some("prose"));
        }
        other => panic!("wrong command parsed: {other:?}"),
    }
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "folio",
        "serve",
        "--server-port",
        "8081",
        "--content-dir",
        "/srv/content",
        "--log-json",
        "true",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_port, Some(8081));
            assert_eq!(
                serve.overrides.content_dir.as_deref(),
                Some(std::path::Path::new("/srv/content"))
            );
            assert_eq!(serve.overrides.log_json, Some(true));
        }
        other => panic!("wrong command parsed: {other:?}"),
    }
}

use anyhow::Result;
use strum::IntoEnumIterator;

use super::Config;
use super::ConfigKey;
use crate::application::cli;

#[test]
fn it_serializes_to_valid_toml() -> Result<()> {
    let res = Config::serialize_default(cli::build());
    let doc = res.parse::<toml_edit::Document>()?;

    assert_eq!(
        doc.get("api-url").and_then(|e| return e.as_str()),
        Some("http://localhost:8080")
    );
    assert_eq!(
        doc.get("share-target").and_then(|e| return e.as_str()),
        Some("none")
    );
    assert!(doc.get("clerk-id").is_none());
    assert!(doc.get("config-file").is_none());
    assert!(res.contains("# clerk-id = \"\""));
    assert!(res.contains("[possible values: command, none]"));

    return Ok(());
}

#[test]
fn it_documents_every_key_but_the_config_file() {
    let res = Config::serialize_default(cli::build());
    for key in ConfigKey::iter() {
        let expected = key != ConfigKey::ConfigFile;
        assert_eq!(res.contains(&format!("{key} = ")), expected, "{key}");
    }
}

#[test]
fn it_has_defaults() {
    assert_eq!(Config::default(ConfigKey::ApiURL), "http://localhost:8080");
    assert_eq!(Config::default(ConfigKey::ShareTarget), "none");
    assert_eq!(Config::default(ConfigKey::ClerkID), "");
    assert!(Config::default(ConfigKey::ConfigFile).ends_with("config.toml"));
    assert!(Config::default(ConfigKey::DownloadDir).ends_with("toolgate"));
}

#[tokio::test]
async fn it_loads_config_from_file() -> Result<()> {
    let matches =
        cli::build().try_get_matches_from(vec!["toolgate", "-c", "./config.example.toml"])?;
    Config::load(cli::build(), vec![&matches]).await?;
    return Ok(());
}

#[tokio::test]
async fn it_fails_to_load_invalid_config_values() -> Result<()> {
    let matches =
        cli::build().try_get_matches_from(vec!["toolgate", "-c", "./test/bad-config.toml"])?;
    let res = Config::load(cli::build(), vec![&matches]).await;

    assert_eq!(
        res.map_err(|e| return e.to_string()),
        Err("config.toml has an invalid value for key 'share-target': carrier-pigeon\nPossible values are: command, none".to_string())
    );
    return Ok(());
}

/*!
 * Controller lifecycle tests: config file, catalog, empty and loaded corpus
 */

use anyhow::Result;
use std::sync::Arc;

use dramaline::app_config::Config;
use dramaline::app_controller::Controller;
use dramaline::corpus::Scope;
use crate::common::{self, FixedLookup};

#[test]
fn test_controller_withInvalidConfig_shouldRefuseToStart() {
    let mut config = Config::default();
    config.query.min_length = 9;
    config.query.max_length = 2;

    let result = Controller::with_config(config);

    let message = format!("{:#}", result.err().expect("validation error"));
    assert!(message.contains("Configuration validation failed"));
    assert!(message.contains("min_length"));
}

#[test]
fn test_controller_fromCreatedConfigFile_shouldListDefaultDramas() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config_path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&config_path)?;
    assert!(config_path.exists());

    let controller = Controller::with_config(config)?;
    let dramas = controller.dramas();
    let ids: Vec<&str> = dramas.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["zhenhuan", "lurk"]);
    assert_eq!((dramas[0].episode_start, dramas[0].episode_end), (1, 76));
    assert_eq!(controller.catalog().default_drama().map(|d| d.id.as_str()), Some("zhenhuan"));
    Ok(())
}

#[test]
fn test_queries_beforeLoad_shouldReturnNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path(), temp_dir.path(), temp_dir.path());
    let controller = Controller::with_lookup(config, Arc::new(FixedLookup::standard()))?;

    assert!(controller.search("皇上", &Scope::All, false, false).lines.is_empty());
    assert!(controller.rhyme("天下", &Scope::All, None, None, None).matches.is_empty());
    assert!(controller.timeline("demo", "demo_E01").is_none());
    assert_eq!(controller.status().stats.total_subtitles, 0);
    Ok(())
}

#[test]
fn test_load_withMissingAnnotationRoot_shouldYieldEmptyDrama() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let missing = temp_dir.path().join("not-there");
    let config = common::test_config(&missing, temp_dir.path(), temp_dir.path());
    let controller = Controller::with_lookup(config, Arc::new(FixedLookup::standard()))?;

    let stats = controller.load_corpus(false)?;

    assert_eq!(stats.dramas.len(), 1);
    assert_eq!(stats.dramas[0].episode_count, 0);
    assert_eq!(stats.total_subtitles, 0);
    Ok(())
}

#[test]
fn test_scope_withSelectedDrama_shouldLimitResults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::write_episode(temp_dir.path(), "demo_E01", Some(common::SUBTITLE_TEXT), None)?;
    let config = common::test_config(temp_dir.path(), temp_dir.path(), temp_dir.path());
    let controller = Controller::with_lookup(config, Arc::new(FixedLookup::standard()))?;
    controller.load_corpus(false)?;

    let in_demo = controller.search("皇上", &Scope::from_ids(["demo"]), false, false);
    let elsewhere = controller.search("皇上", &Scope::from_ids(["lurk"]), false, false);

    assert_eq!(in_demo.lines.len(), 1);
    assert!(elsewhere.lines.is_empty());
    Ok(())
}

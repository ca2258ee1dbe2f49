// tests/config_loading.rs
use ai_digest_curator::config::{CurationConfig, ENV_CURATION_CONFIG_PATH, ENV_MAX_COUNT};
use ai_digest_curator::judge::build_llm_client;
use ai_digest_curator::LlmClient;
use serial_test::serial;
use std::io::Write;

#[test]
fn shipped_config_matches_builtin_defaults() {
    let cfg = CurationConfig::load_from_file("config/curation.toml").expect("shipped config");
    assert_eq!(cfg, CurationConfig::default());
}

#[test]
#[serial]
fn env_path_wins_over_shipped_file() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "[selection]\nmax_count = 3\n[judge]\nenabled = false").unwrap();
    std::env::set_var(ENV_CURATION_CONFIG_PATH, f.path());
    std::env::remove_var(ENV_MAX_COUNT);

    let cfg = CurationConfig::load_default().unwrap();
    std::env::remove_var(ENV_CURATION_CONFIG_PATH);

    assert_eq!(cfg.selection.max_count, 3);
    assert!(!cfg.judge.enabled);
    assert!(build_llm_client(&cfg.judge).is_none());
}

#[test]
#[serial]
fn providers_without_keys_leave_no_judge() {
    let mut cfg = CurationConfig::default();
    for p in &mut cfg.judge.providers {
        p.api_key_env = format!("CURATION_TEST_UNSET_{}", p.name.to_uppercase());
        std::env::remove_var(&p.api_key_env);
    }
    assert!(build_llm_client(&cfg.judge).is_none());
}

#[test]
#[serial]
fn one_keyed_provider_is_enough() {
    let mut cfg = CurationConfig::default();
    cfg.judge.providers[0].api_key_env = "CURATION_TEST_KEY_A".into();
    cfg.judge.providers[1].api_key_env = "CURATION_TEST_KEY_B".into();
    std::env::set_var("CURATION_TEST_KEY_A", "sk-test");
    std::env::remove_var("CURATION_TEST_KEY_B");

    let client = build_llm_client(&cfg.judge);
    std::env::remove_var("CURATION_TEST_KEY_A");

    let client = client.expect("router over the keyed provider");
    assert_eq!(client.provider_name(), "router");
}

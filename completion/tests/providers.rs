use std::fs;
use std::time::{Duration, Instant};

use completion::{
    CancelToken, Config, ConfigError, FetchErrorKind, FixtureProvider, ValueTreeProvider,
};
use completion::config::ProviderKind;

#[test]
fn fixture_provider_reads_sanitized_file_names() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bitnami__redis.yaml"), "auth:\n  enabled: true\n").unwrap();

    let provider = FixtureProvider::new(dir.path());
    let tree = provider.fetch("bitnami/redis", &CancelToken::new()).unwrap();
    assert!(tree.get_path(&["auth", "enabled"]).is_some());

    let err = provider.fetch("bitnami/nginx", &CancelToken::new()).unwrap_err();
    assert_eq!(err.kind, FetchErrorKind::ExecutionFailed);
}

#[test]
fn config_defaults_to_helm() {
    let config = Config::from_toml("").unwrap();
    assert_eq!(config.provider.kind, ProviderKind::Helm);
    assert_eq!(config.provider.command, "helm");
    assert_eq!(config.provider.args, vec!["show", "values"]);
    assert_eq!(config.provider.timeout_ms, None);
    assert_eq!(config.document_patterns().unwrap().len(), 2);
}

#[test]
fn config_resolves_fixtures_dir_next_to_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("charts")).unwrap();
    fs::write(dir.path().join("charts/app.yaml"), "replicas: 1\n").unwrap();
    let path = dir.path().join("chartcomp.toml");
    fs::write(
        &path,
        "[provider]\nkind = \"fixtures\"\nfixtures_dir = \"charts\"\n",
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.provider.fixtures_dir, Some(dir.path().join("charts")));
    let provider = config.build_provider().unwrap();
    assert!(provider.fetch("app", &CancelToken::new()).is_ok());
}

#[test]
fn config_errors() {
    assert!(Config::from_toml("[provider]\nbogus = 1\n").is_err());

    let missing = Config::load(std::path::Path::new("/nonexistent/chartcomp.toml"));
    assert!(matches!(missing, Err(ConfigError::Read { .. })));

    let config = Config::from_toml("[provider]\nkind = \"fixtures\"\n").unwrap();
    assert!(matches!(
        config.build_provider(),
        Err(ConfigError::MissingFixturesDir)
    ));

    let config = Config::from_toml("[documents]\npatterns = [\"[\"]\n").unwrap();
    assert!(matches!(
        config.document_patterns(),
        Err(ConfigError::Pattern { .. })
    ));
}

#[cfg(unix)]
mod helm {
    use super::*;
    use completion::{HelmProvider, ValueCache};

    fn sh(script: &str) -> HelmProvider {
        HelmProvider::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[test]
    fn parses_command_output() {
        let provider = sh("printf 'replicaCount: 1\\nimage:\\n  tag: latest\\n'");
        let tree = provider.fetch("any/chart", &CancelToken::new()).unwrap();
        assert!(tree.get_path(&["image", "tag"]).is_some());
    }

    #[test]
    fn chart_ref_is_last_argument() {
        // With `sh -c`, the first extra argument becomes `$0`.
        let provider = sh("printf 'chart: %s\\n' \"$0\"");
        let tree = provider.fetch("bitnami/redis", &CancelToken::new()).unwrap();
        assert_eq!(
            tree.get_path(&["chart"]),
            Some(&completion::ValueNode::string("bitnami/redis"))
        );
    }

    #[test]
    fn failing_command_is_execution_failure() {
        let provider = sh("echo 'Error: chart not found' >&2; exit 1");
        let err = provider.fetch("x/y", &CancelToken::new()).unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::ExecutionFailed);
        assert!(err.message.contains("chart not found"));
    }

    #[test]
    fn missing_binary_is_execution_failure() {
        let provider = HelmProvider::new("chartcomp-no-such-binary", Vec::new());
        let err = provider.fetch("x/y", &CancelToken::new()).unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::ExecutionFailed);
    }

    #[test]
    fn non_mapping_output_is_parse_failure() {
        let provider = sh("echo '- a'");
        let err = provider.fetch("x/y", &CancelToken::new()).unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::ParseFailed);
    }

    #[test]
    fn invalid_utf8_output_is_parse_failure_and_not_cached() {
        let provider = sh("printf 'image:\\n  tag: \\377\\376\\n'");
        let err = provider.fetch("x/y", &CancelToken::new()).unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::ParseFailed);
        assert!(err.message.contains("UTF-8"));

        let mut cache = ValueCache::new();
        let cancel = CancelToken::new();
        assert!(cache.get_or_fetch("x/y", &provider, &cancel).is_err());
        assert!(cache.get_or_fetch("x/y", &provider, &cancel).is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn slow_command_times_out() {
        let provider = sh("exec sleep 5").with_timeout(Some(Duration::from_millis(100)));
        let started = Instant::now();
        let err = provider.fetch("x/y", &CancelToken::new()).unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn cancellation_aborts_running_command() {
        let provider = sh("exec sleep 5");
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            trigger.cancel();
        });
        let started = Instant::now();
        let err = provider.fetch("x/y", &cancel).unwrap_err();
        canceller.join().unwrap();
        assert_eq!(err.kind, FetchErrorKind::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}

use assert_cmd::Command;
use predicates::prelude::*;
use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*; // needed for .with()
use tracing_subscriber::{layer::Context, Layer, Registry};

#[test]
fn help_lists_every_subcommand() {
    let mut cmd = Command::cargo_bin("hoopstats").expect("Binary exists");
    cmd.arg("--help");
    cmd.assert().success().stdout(
        predicate::str::contains("leagues")
            .and(predicate::str::contains("paths"))
            .and(predicate::str::contains("season"))
            .and(predicate::str::contains("updated")),
    );
}

#[test]
fn season_requires_league_and_year() {
    let mut cmd = Command::cargo_bin("hoopstats").expect("Binary exists");
    cmd.arg("season").arg("--year").arg("2022");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--league"));
}

#[test]
fn unreadable_config_file_fails_before_touching_the_store() {
    let mut cmd = Command::cargo_bin("hoopstats").expect("Binary exists");
    cmd.arg("leagues")
        .arg("--config")
        .arg("/definitely/not/here/hoopstats.yaml");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events.lock().unwrap().push(format!("{:?}", event));
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use hoopstats::cli::{run, Cli, Commands};

    // A missing config file makes run() fail right after it starts.
    let cli = Cli {
        config: Some(std::path::PathBuf::from("dummy.yaml")),
        command: Commands::Updated,
    };

    let result = run(cli).await;
    assert!(result.is_err());

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}

#[tokio::test]
async fn unknown_season_is_one_error_naming_the_season() {
    use hoopstats::cli::{execute, Commands};
    use hoopstats_core::config::SiteConfig;
    use hoopstats_core::contract::{KeyPage, MockStoreBackend};
    use hoopstats_core::site::SiteData;
    use hoopstats_core::store::ObjectStoreClient;

    let mut backend = MockStoreBackend::new();
    backend.expect_list_page().times(1).returning(|_, _, _, _| {
        Ok(KeyPage::last(vec![
            "prod/teams/nba_2021_Regular Season_teams.csv".to_string(),
        ]))
    });
    backend.expect_get_object().never();
    let site = SiteData::new(SiteConfig::default(), ObjectStoreClient::new(backend));

    let err = execute(
        &site,
        Commands::Season {
            league: "nba".into(),
            year: "2021".into(),
            season_type: "Playoffs".into(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "season nba/2021 (Playoffs) not found");
}

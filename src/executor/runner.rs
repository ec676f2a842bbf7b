//! Top-level orchestration
//!
//! Drives every configured runtime target in order against one shared sink.

use tracing::info;

use super::driver::{Driver, TargetStatus};
use super::locator::RuntimeLocator;
use crate::models::{RunSummary, RuntimeTarget};
use crate::sink::{MultiSink, ResultSink, SinkError, SummaryCollector};
use crate::utils::timer::Timer;

/// Runs the suite under each target, one after another
pub struct Runner<L: RuntimeLocator> {
    driver: Driver<L>,
    targets: Vec<RuntimeTarget>,
}

impl<L: RuntimeLocator> Runner<L> {
    pub fn new(driver: Driver<L>, targets: Vec<RuntimeTarget>) -> Self {
        Self { driver, targets }
    }

    #[cfg(test)]
    pub fn driver(&self) -> &Driver<L> {
        &self.driver
    }

    /// Run every target and relay all results into `sink`.
    ///
    /// Targets that are missing or misbehave never stop the loop; only a
    /// failing sink does.
    pub async fn run_all(
        &self,
        sink: &mut dyn ResultSink,
        selectors: &[String],
    ) -> Result<RunSummary, SinkError> {
        info!(
            "Running {} across {} runtimes",
            selectors.join(" "),
            self.targets.len()
        );

        let mut summary = RunSummary::default();

        for target in &self.targets {
            let timer = Timer::start(target.executable.as_str());
            let mut collector = SummaryCollector::new(target.executable.as_str());

            let status = {
                let mut tee = MultiSink::new(vec![&mut *sink, &mut collector]);
                self.driver.run_target(target, &mut tee, selectors).await?
            };

            let runtime = collector.finish(timer.stop());
            match status {
                TargetStatus::Unavailable => info!("{} skipped", runtime.runtime),
                TargetStatus::Ran { .. } => info!("{}", runtime),
            }
            summary.runtimes.push(runtime);
        }

        sink.flush()?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::driver::DriverConfig;
    use crate::executor::locator::testing::{FakeLocator, Script};
    use crate::models::OutcomeKind;
    use crate::protocol::ProtocolClient;
    use crate::sink::EventLog;
    use std::path::PathBuf;

    fn driver_config() -> DriverConfig {
        DriverConfig {
            root: PathBuf::from("/src"),
            runner: vec!["-m".into(), "subunit.run".into()],
            warning_filter: "ignore".into(),
            search_path_var: "PYTHONPATH".into(),
            inherited_search_path: None,
        }
    }

    fn targets(versions: &[&str]) -> Vec<RuntimeTarget> {
        versions
            .iter()
            .map(|v| RuntimeTarget::from_template(*v, "python{version}"))
            .collect()
    }

    #[tokio::test]
    async fn test_targets_run_in_order() {
        let locator = FakeLocator::new()
            .with("python3.11", Script::available(b"test: a\nsuccess: a\n", b""))
            .with("python3.12", Script::available(b"test: a\nfailure: a\n", b"warn\n"));
        let runner = Runner::new(
            Driver::new(driver_config(), locator),
            targets(&["3.12", "2.4", "3.11"]),
        );
        let mut log = EventLog::new();

        let summary = runner
            .run_all(&mut log, &["pkg.tests".to_string()])
            .await
            .unwrap();

        assert_eq!(
            log.outcomes(),
            vec![
                ("a", OutcomeKind::Failure),
                ("python312", OutcomeKind::Error),
                ("python24", OutcomeKind::Skip),
                ("a", OutcomeKind::Success),
            ]
        );

        let programs: Vec<String> = runner
            .driver()
            .locator()
            .calls()
            .into_iter()
            .map(|c| c.program)
            .collect();
        assert_eq!(
            programs,
            vec!["python3.12", "python3.12", "python2.4", "python3.11", "python3.11"]
        );

        assert_eq!(summary.runtimes.len(), 3);
        assert_eq!(summary.runtimes[0].runtime, "python3.12");
        assert_eq!(summary.runtimes[0].failed, 1);
        assert_eq!(summary.runtimes[0].errors, 1);
        assert_eq!(summary.runtimes[1].skipped, 1);
        assert_eq!(summary.runtimes[2].passed, 1);
        assert!(!summary.was_successful());
    }

    #[tokio::test]
    async fn test_no_targets_available() {
        let runner = Runner::new(
            Driver::new(driver_config(), FakeLocator::new()),
            targets(&["2.4", "2.5"]),
        );
        let mut log = EventLog::new();

        let summary = runner.run_all(&mut log, &[]).await.unwrap();

        assert_eq!(
            log.outcomes(),
            vec![("python24", OutcomeKind::Skip), ("python25", OutcomeKind::Skip)]
        );
        assert!(summary.was_successful());
        assert_eq!(summary.total(), 2);
    }

    #[tokio::test]
    async fn test_relays_into_subunit_writer() {
        let locator = FakeLocator::new().with(
            "python3.13",
            Script::available(b"test: t\nsuccess: t\nnoise\n", b""),
        );
        let runner = Runner::new(Driver::new(driver_config(), locator), targets(&["3.13"]));
        let mut client = ProtocolClient::new(Vec::new());

        runner.run_all(&mut client, &[]).await.unwrap();

        let wire = String::from_utf8(client.into_inner()).unwrap();
        let lines: Vec<&str> = wire.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("time: "));
        assert!(lines[1].starts_with("time: "));
        assert_eq!(&lines[2..4], &["test: t", "success: t"]);
        assert!(lines[4].starts_with("time: "));
        assert!(!wire.contains("noise"));
    }
}

use dockformer_docker::DockerRuntime;
use dockformer_engine::{Engine, RecordUpdate};
use dockformer_inventory::open_inventory;
use dockformer_runtime::LogStreamType;
use dockformer_types::ContainersDocument;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::config::DockformerConfig;
use crate::output;
use crate::{Commands, OutputFormat, Result};

pub struct CommandHandler {
    engine: Engine,
    format: OutputFormat,
}

impl CommandHandler {
    /// Connect to the daemon and open the inventory named in `config`
    pub async fn new(config: &DockformerConfig, format: OutputFormat) -> Result<Self> {
        let runtime = DockerRuntime::connect(config.runtime.clone())?;
        let store = open_inventory(&config.inventory).await?;

        let engine = Engine::new(Arc::new(runtime), store)
            .with_config(config.engine_config())
            .with_reconcile_config(config.reconcile.clone());

        Ok(Self::from_engine(engine, format))
    }

    pub fn from_engine(engine: Engine, format: OutputFormat) -> Self {
        Self { engine, format }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub async fn execute(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Apply { file } => self.apply(&file).await,
            Commands::List => self.list().await,
            Commands::Show { name } => self.show(&name).await,
            Commands::Start { name } => {
                let record = self.engine.start(&name).await?;
                self.report_change(&record, "started")
            }
            Commands::Stop { name } => {
                let record = self.engine.stop(&name).await?;
                self.report_change(&record, "stopped")
            }
            Commands::Restart { name } => {
                let record = self.engine.restart(&name).await?;
                self.report_change(&record, "restarted")
            }
            Commands::Remove { name } => {
                self.engine.remove(&name).await?;
                if self.shows_status() {
                    output::success(&format!("Container '{}' removed", name));
                }
                Ok(())
            }
            Commands::Logs { name, tail } => self.logs(&name, tail).await,
            Commands::Update { name, image, ports } => {
                let record = self
                    .engine
                    .update_record(&name, RecordUpdate { image, ports })
                    .await?;
                output::print_record(&record, self.format)
            }
            Commands::Reconcile => self.reconcile().await,
            Commands::Supervise { file, interval } => {
                self.supervise(file.as_deref(), interval.map(Duration::from_secs))
                    .await
            }
        }
    }

    pub async fn apply(&self, file: &Path) -> Result<()> {
        let document = ContainersDocument::from_path(file)?;
        if document.is_empty() {
            if self.shows_status() {
                output::info("Document has no containers.");
            }
            return Ok(());
        }

        let pb = self.spinner(&format!("Applying {} container(s)...", document.len()));
        let result = self.engine.apply_document(&document).await;
        pb.finish_and_clear();

        let records = result?;
        if self.shows_status() {
            output::success(&format!("Applied {} container(s)", records.len()));
        }
        output::print_records(&records, self.format)
    }

    pub async fn list(&self) -> Result<()> {
        let records = self.engine.list().await?;
        output::print_records(&records, self.format)
    }

    pub async fn show(&self, name: &str) -> Result<()> {
        let record = self.engine.get(name).await?;
        output::print_record(&record, self.format)
    }

    pub async fn logs(&self, name: &str, tail: Option<usize>) -> Result<()> {
        let mut lines = self.engine.logs(name, tail).await?;
        while let Some(line) = lines.next().await {
            let line = line?;
            match line.stream {
                LogStreamType::Stdout => println!("{}", line.message),
                LogStreamType::Stderr => eprintln!("{}", line.message),
            }
        }
        Ok(())
    }

    pub async fn reconcile(&self) -> Result<()> {
        let pb = self.spinner("Reconciling inventory...");
        let result = self.engine.reconcile().await;
        pb.finish_and_clear();

        output::print_report(&result?, self.format)
    }

    /// Apply `file` once, then reconcile every `interval` until Ctrl-C.
    /// A failed pass is logged and the loop carries on.
    pub async fn supervise(&self, file: Option<&Path>, interval: Option<Duration>) -> Result<()> {
        if let Some(file) = file {
            let document = ContainersDocument::from_path(file)?;
            let records = self.engine.apply_document(&document).await?;
            info!(count = records.len(), file = %file.display(), "Applied container document");
        }

        let period = interval
            .filter(|d| !d.is_zero())
            .unwrap_or_else(|| self.engine.reconcile_config().interval());
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        info!(interval = ?period, "Supervisor started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.engine.reconcile().await {
                        Ok(report) if report.is_clean() => {
                            info!(
                                updated = report.updated.len(),
                                created = report.created.len(),
                                "Reconciliation pass complete"
                            );
                        }
                        Ok(report) => {
                            warn!(failed = ?report.failed, "Reconciliation pass completed with failures");
                        }
                        Err(e) => warn!(error = %e, "Reconciliation pass failed"),
                    }
                }
                result = &mut shutdown => {
                    if let Err(e) = result {
                        warn!(error = %e, "Failed to listen for shutdown signal");
                    }
                    info!("Supervisor stopping");
                    break;
                }
            }
        }

        Ok(())
    }

    fn report_change(&self, record: &dockformer_types::InventoryRecord, verb: &str) -> Result<()> {
        if !self.shows_status() {
            return output::print_record(record, self.format);
        }
        output::success(&format!("Container '{}' {}", record.name, verb));
        Ok(())
    }

    fn shows_status(&self) -> bool {
        self.format.shows_status()
    }

    fn spinner(&self, message: &str) -> ProgressBar {
        if !self.shows_status() {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

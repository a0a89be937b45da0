use std::sync::Arc;

use ilk_core::config::Config;
use ilk_jira::JiraClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ilk_core::logging::init("ilk")?;

    let cfg = Config::load()?;
    tracing::debug!(?cfg, "loaded config");

    let jira = JiraClient::new(cfg.http_timeout)?.with_api_base(cfg.jira_api_base.clone());

    ilk_host::router::run_stdio(&cfg, Arc::new(jira)).await
}

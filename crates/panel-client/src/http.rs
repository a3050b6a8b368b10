use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use panel_core::config::ApiConfig;
use panel_core::types::{FeatureLimits, Schedule, ScheduleId, ServerId, Task, TaskId};
use panel_protocol::paths::{self, OBJECT_SCHEDULE, OBJECT_SERVER, OBJECT_TASK};
use panel_protocol::{
    Envelope, ErrorBody, ListEnvelope, ProtocolError, RawSchedule, RawServer, RawTask,
    ScheduleBody, TaskBody,
};
use panel_scheduler::gateway::{
    GatewayError, SchedulePersistenceGateway, ScheduleRequest, TaskRequest,
};

/// Talks to `/api/client/...` with a bearer API key.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(cfg: &ApiConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = cfg.api_key.as_deref() {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| GatewayError::Transport(format!("invalid API key: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(transport)?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send and return the body of a successful response.
    async fn execute(&self, req: reqwest::RequestBuilder) -> Result<String, GatewayError> {
        let resp = req.send().await.map_err(transport)?;
        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(transport)?;

        if !(200..300).contains(&status) {
            warn!(status, body = %text, "panel API error");
            let message = ErrorBody::human_message(&text)
                .unwrap_or_else(|| format!("The panel responded with HTTP {status}."));
            return Err(GatewayError::Api { status, message });
        }
        Ok(text)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, GatewayError> {
        let text = self.execute(req).await?;
        serde_json::from_str(&text).map_err(|e| parse(ProtocolError::from(e)))
    }
}

fn transport(e: reqwest::Error) -> GatewayError {
    GatewayError::Transport(e.to_string())
}

fn parse(e: ProtocolError) -> GatewayError {
    GatewayError::Parse(e.to_string())
}

#[async_trait]
impl SchedulePersistenceGateway for HttpGateway {
    async fn list_schedules(&self, server: &ServerId) -> Result<Vec<Schedule>, GatewayError> {
        let url = self.url(&format!("{}?include=tasks", paths::schedules(server)));
        debug!(%server, "listing schedules");

        let list: ListEnvelope<RawSchedule> = self.fetch(self.client.get(&url)).await?;
        list.expect_items(OBJECT_SCHEDULE)
            .map_err(parse)?
            .into_iter()
            .map(|raw| raw.into_schedule().map_err(parse))
            .collect()
    }

    async fn feature_limits(&self, server: &ServerId) -> Result<FeatureLimits, GatewayError> {
        let url = self.url(&paths::server(server));
        let env: Envelope<RawServer> = self.fetch(self.client.get(&url)).await?;
        let raw = env.expect_object(OBJECT_SERVER).map_err(parse)?;
        Ok(raw.feature_limits.into())
    }

    async fn create_or_update_schedule(
        &self,
        server: &ServerId,
        req: &ScheduleRequest,
    ) -> Result<Schedule, GatewayError> {
        let url = self.url(&paths::schedule(server, req.id));
        let body = ScheduleBody::new(&req.name, &req.cron, req.is_active, req.only_when_online);
        debug!(%server, schedule_id = ?req.id, "saving schedule");

        let env: Envelope<RawSchedule> = self.fetch(self.client.post(&url).json(&body)).await?;
        env.expect_object(OBJECT_SCHEDULE)
            .and_then(RawSchedule::into_schedule)
            .map_err(parse)
    }

    async fn create_or_update_schedule_task(
        &self,
        server: &ServerId,
        schedule: ScheduleId,
        task: Option<TaskId>,
        req: &TaskRequest,
    ) -> Result<Task, GatewayError> {
        let url = self.url(&paths::schedule_task(server, schedule, task));
        let body = TaskBody {
            action: req.action.clone(),
            payload: req.payload.clone(),
            time_offset: req.time_offset,
            continue_on_failure: req.continue_on_failure,
        };
        debug!(%server, schedule_id = %schedule, task_id = ?task, action = %req.action, "saving task");

        let env: Envelope<RawTask> = self.fetch(self.client.post(&url).json(&body)).await?;
        env.expect_object(OBJECT_TASK).map(Task::from).map_err(parse)
    }

    async fn delete_schedule(
        &self,
        server: &ServerId,
        schedule: ScheduleId,
    ) -> Result<(), GatewayError> {
        let url = self.url(&paths::schedule(server, Some(schedule)));
        debug!(%server, schedule_id = %schedule, "deleting schedule");
        self.execute(self.client.delete(&url)).await?;
        Ok(())
    }
}

use super::error::CreosonError;
use super::protocol::{DataBuilder, Reply, Request, Response};
use super::CadSession;
use crate::model::{
    ExportRequest, ExportedFile, Feature, FeatureQuery, MassProperties, RunConfig, Transform,
};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, info};

/// Session with a CREOSON server.
///
/// Created unconnected; `connect` obtains the session id every later call carries.
pub struct CreosonClient {
    http: reqwest::Client,
    endpoint: String,
    session_id: Option<String>,
}

impl CreosonClient {
    pub fn new(cfg: &RunConfig) -> Result<Self, CreosonError> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.timeout)
            .build()?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
            session_id: None,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub async fn connect(&mut self) -> Result<(), CreosonError> {
        let reply = self.post(None, "connection", "connect", None).await?;
        let id = reply.session_id.ok_or(CreosonError::MissingField {
            command: "connection",
            function: "connect",
            field: "sessionId",
        })?;
        info!(endpoint = %self.endpoint, session_id = %id, "connected to CREOSON");
        self.session_id = Some(id);
        Ok(())
    }

    /// End the session. A client that never connected has nothing to release.
    pub async fn disconnect(&mut self) -> Result<(), CreosonError> {
        let Some(id) = self.session_id.take() else {
            return Ok(());
        };
        self.post(Some(&id), "connection", "disconnect", None)
            .await?;
        info!(session_id = %id, "disconnected from CREOSON");
        Ok(())
    }

    async fn call(
        &self,
        command: &'static str,
        function: &'static str,
        data: Option<Value>,
    ) -> Result<Reply, CreosonError> {
        let session = self
            .session_id
            .as_deref()
            .ok_or(CreosonError::NotConnected)?;
        self.post(Some(session), command, function, data).await
    }

    async fn post(
        &self,
        session_id: Option<&str>,
        command: &'static str,
        function: &'static str,
        data: Option<Value>,
    ) -> Result<Reply, CreosonError> {
        let req = Request {
            session_id,
            command,
            function,
            data,
        };
        debug!(command, function, "CREOSON request");
        let resp: Response = self
            .http
            .post(&self.endpoint)
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let reply = resp.into_reply(command, function)?;
        debug!(command, function, "CREOSON reply ok");
        Ok(reply)
    }
}

impl CadSession for CreosonClient {
    async fn is_running(&self) -> Result<bool, CreosonError> {
        self.call("connection", "is_creo_running", None)
            .await?
            .field("running")
    }

    async fn open_file(&self, file: &str) -> Result<Vec<String>, CreosonError> {
        let data = DataBuilder::new()
            .set("file", file)
            .set("display", true)
            .set("activate", true)
            .build();
        self.call("file", "open", Some(data)).await?.field("files")
    }

    async fn feature_list(&self, query: &FeatureQuery) -> Result<Vec<Feature>, CreosonError> {
        let data = DataBuilder::new()
            .set("file", query.file.as_str())
            .set_opt("type", query.feat_type.as_deref())
            .build();
        let reply = self.call("feature", "list", Some(data)).await?;
        // An empty listing comes back without the field at all.
        match reply.field("featlist") {
            Err(CreosonError::MissingField { .. }) => Ok(Vec::new()),
            other => other,
        }
    }

    async fn mass_properties(&self, file: &str) -> Result<MassProperties, CreosonError> {
        let data = DataBuilder::new().set("file", file).build();
        self.call("file", "massprops", Some(data)).await?.data()
    }

    async fn get_transform(
        &self,
        asm: Option<&str>,
        path: &[i64],
        csys: Option<&str>,
    ) -> Result<Transform, CreosonError> {
        let data = DataBuilder::new()
            .set_opt("asm", asm)
            .set("path", path.to_vec())
            .set_opt("csys", csys)
            .build();
        self.call("file", "get_transform", Some(data))
            .await?
            .field("transform")
    }

    async fn export_file(&self, req: &ExportRequest) -> Result<ExportedFile, CreosonError> {
        let data = DataBuilder::new()
            .set("file", req.file.as_str())
            .set("type", req.format.as_creoson_str())
            .set_opt("filename", req.filename.as_deref())
            .set_opt("dirname", req.dirname.as_deref())
            .build();
        let reply = self.call("interface", "export_file", Some(data)).await?;
        let dirname = match reply.field("dirname") {
            Err(CreosonError::MissingField { .. }) => String::new(),
            other => other?,
        };
        Ok(ExportedFile {
            dirname,
            filename: reply.field("filename")?,
        })
    }

    async fn working_directory(&self) -> Result<PathBuf, CreosonError> {
        let dir: String = self.call("creo", "pwd", None).await?.field("dirname")?;
        Ok(PathBuf::from(dir))
    }
}

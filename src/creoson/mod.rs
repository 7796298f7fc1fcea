mod client;
mod error;
mod protocol;

#[cfg(test)]
pub(crate) mod mock;

pub use client::CreosonClient;
pub use error::CreosonError;

use crate::model::{ExportRequest, ExportedFile, Feature, FeatureQuery, MassProperties, Transform};
use std::path::PathBuf;

/// Query and export calls against a running Creo session.
///
/// `CreosonClient` is the real implementation; workflows are generic over this
/// trait so they can run against a recording double.
#[allow(async_fn_in_trait)]
pub trait CadSession {
    /// Liveness check for the Creo process behind the server.
    async fn is_running(&self) -> Result<bool, CreosonError>;

    /// Open a model in Creo, returning the names of the files it loaded.
    async fn open_file(&self, file: &str) -> Result<Vec<String>, CreosonError>;

    async fn feature_list(&self, query: &FeatureQuery) -> Result<Vec<Feature>, CreosonError>;

    async fn mass_properties(&self, file: &str) -> Result<MassProperties, CreosonError>;

    /// Transform of the component addressed by `path` (feature ids from the
    /// assembly root), optionally relative to a named coordinate system.
    async fn get_transform(
        &self,
        asm: Option<&str>,
        path: &[i64],
        csys: Option<&str>,
    ) -> Result<Transform, CreosonError>;

    async fn export_file(&self, req: &ExportRequest) -> Result<ExportedFile, CreosonError>;

    async fn working_directory(&self) -> Result<PathBuf, CreosonError>;
}

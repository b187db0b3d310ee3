use crate::domain::model::{CatalogTable, LookupResult, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn link_column(&self) -> &str;
    fn sample_size(&self) -> usize;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<CatalogTable>;
    async fn transform(&self, table: CatalogTable) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}

/// Resolves one identifier to a lookup result.
///
/// Misses are reported inside the result; `Err` is reserved for failures that
/// escape every strategy.
#[async_trait]
pub trait LookupBackend: Send + Sync {
    async fn lookup(&self, isbn: &str) -> Result<LookupResult>;
}

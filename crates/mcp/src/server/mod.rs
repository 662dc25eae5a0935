mod core;
mod log_payload;
pub(crate) mod schemas;

pub use core::VoiceForgeMcpCore;
pub use schemas::input_schema_for;

use std::sync::Arc;

use anyhow::Result;
use rmcp::ServiceExt;

use crate::registry::ToolRegistry;

/// Serves `registry` over stdin/stdout until the host disconnects.
pub async fn serve_stdio(registry: Arc<ToolRegistry>) -> Result<()> {
    let core = VoiceForgeMcpCore::new(registry);
    let service = core.serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;
    Ok(())
}

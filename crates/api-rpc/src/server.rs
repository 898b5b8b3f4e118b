//! JSON-RPC Server
//!
//! Serves the intake/review API over TCP bound to localhost only.

use crate::handler::RpcHandler;
use crate::types::{
    ApproveRequest, AuditRequest, ConfirmRequest, ListRequest, LoginRequest, LogoutRequest,
    LookupRequest, RejectRequest, SetStatusRequest, SubmitRequest,
};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use printlab_core::config::LabConfig;
use printlab_core::port::{
    FileStore, JobRepository, NotificationOutbox, TimeProvider, TokenProvider,
};
use std::sync::Arc;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9640;

/// RPC Server Configuration
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: RpcServerConfig,
        repo: Arc<dyn JobRepository>,
        outbox: Arc<dyn NotificationOutbox>,
        files: Arc<dyn FileStore>,
        tokens: Arc<dyn TokenProvider>,
        clock: Arc<dyn TimeProvider>,
        lab_config: Arc<LabConfig>,
    ) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(
                repo, outbox, files, tokens, clock, lab_config,
            )),
        }
    }

    /// Start the JSON-RPC server.
    ///
    /// Binds to 127.0.0.1 only; the service is not meant to face the
    /// open network directly.
    pub async fn start(self) -> Result<ServerHandle, String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server on TCP (localhost only)"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;

        let mut module = RpcModule::new(());

        let handler = self.handler.clone();
        module
            .register_async_method("job.submit.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: SubmitRequest = params.parse()?;
                    handler.submit(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("staff.login.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: LoginRequest = params.parse()?;
                    handler.login(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("staff.logout.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: LogoutRequest = params.parse()?;
                    handler.logout(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("job.approve.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ApproveRequest = params.parse()?;
                    handler.approve(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("job.reject.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: RejectRequest = params.parse()?;
                    handler.reject(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("job.set_status.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: SetStatusRequest = params.parse()?;
                    handler.set_status(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("job.confirm.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ConfirmRequest = params.parse()?;
                    handler.confirm(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("job.lookup.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: LookupRequest = params.parse()?;
                    handler.lookup(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("job.list.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ListRequest = params.parse()?;
                    handler.list(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("job.audit.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: AuditRequest = params.parse()?;
                    handler.audit(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        info!("JSON-RPC server started successfully");

        let handle = server.start(module);
        Ok(handle)
    }
}

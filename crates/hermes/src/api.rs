//! Bootstrap: configuration + tables + handlers → a ready [`Pipeline`].

use std::sync::Arc;
use std::time::Duration;

use hermes_config::{load_registry, HermesConfig, LogFormat};
use hermes_core::{
    BoxFuture, Handler, HandlerOutput, HandlerRegistry, RequestContext, SchemaRegistry,
};
use hermes_pipeline::{ApiResponse, FnHook, Hook, Pipeline, RequestIdPolicy};
use hermes_server::{
    handle_gateway_event, GatewayProxyRequest, GatewayProxyResponse, HttpServer, ServerConfig,
    ShutdownSignal,
};
use hermes_telemetry::{LogConfig, MetricsConfig, TelemetryConfig};
use tracing::{info, warn};

use crate::error::ApiError;

/// A configured API: settings plus the pipeline built from them.
///
/// # Example
///
/// ```
/// use hermes::Api;
/// use hermes::core::{fixtures, HandlerOutput};
/// use serde_json::json;
///
/// let api = Api::builder()
///     .registry(fixtures::sample_registry().unwrap())
///     .handler_fn("index", |_ctx| HandlerOutput::ok(json!({ "up": true })))
///     .build()
///     .unwrap();
///
/// assert_eq!(api.pipeline().handlers().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Api {
    config: HermesConfig,
    pipeline: Pipeline,
}

impl Api {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn builder() -> ApiBuilder {
        ApiBuilder::new()
    }

    /// Loads the tables named by `config` and builds the API around
    /// `handlers`.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or the tables cannot be
    /// loaded.
    pub fn from_config(config: HermesConfig, handlers: HandlerRegistry) -> Result<Self, ApiError> {
        Self::builder().config(config).handlers(handlers).build()
    }

    /// Returns the settings.
    #[must_use]
    pub fn config(&self) -> &HermesConfig {
        &self.config
    }

    /// Returns the pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Installs logging and metrics as configured.
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber or recorder is already
    /// installed, or the metrics listener cannot start.
    pub fn init_telemetry(&self) -> Result<(), ApiError> {
        hermes_telemetry::init_telemetry(&telemetry_config(&self.config))?;
        Ok(())
    }

    /// Runs one request through the pipeline.
    pub async fn handle(&self, ctx: RequestContext) -> ApiResponse {
        self.pipeline.run(ctx).await
    }

    /// Runs one API-gateway event through the pipeline.
    pub async fn handle_gateway(&self, event: GatewayProxyRequest) -> GatewayProxyResponse {
        handle_gateway_event(&self.pipeline, event).await
    }

    /// Turns the API into an HTTP server.
    #[must_use]
    pub fn into_server(self) -> HttpServer {
        HttpServer::new(server_config(&self.config), self.pipeline)
    }

    /// Serves HTTP until SIGINT or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn serve(self) -> Result<(), ApiError> {
        self.into_server().run().await?;
        Ok(())
    }

    /// Serves HTTP until `shutdown` triggers.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn serve_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ApiError> {
        self.into_server().run_with_shutdown(shutdown).await?;
        Ok(())
    }
}

/// Builder for [`Api`].
pub struct ApiBuilder {
    config: HermesConfig,
    registry: Option<SchemaRegistry>,
    handlers: HandlerRegistry,
    pre_hook: Option<Arc<dyn Hook>>,
    post_hook: Option<Arc<dyn Hook>>,
}

impl ApiBuilder {
    /// Creates a builder with default settings and no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HermesConfig::default(),
            registry: None,
            handlers: HandlerRegistry::new(),
            pre_hook: None,
            post_hook: None,
        }
    }

    /// Sets the runtime settings.
    #[must_use]
    pub fn config(mut self, config: HermesConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses an already built registry instead of loading the files named in
    /// the settings.
    #[must_use]
    pub fn registry(mut self, registry: SchemaRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replaces every registered handler.
    #[must_use]
    pub fn handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    /// Registers a handler.
    #[must_use]
    pub fn handler(mut self, key: impl Into<String>, handler: impl Handler) -> Self {
        self.handlers.register(key, handler);
        self
    }

    /// Registers a synchronous closure.
    #[must_use]
    pub fn handler_fn<F>(mut self, key: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut RequestContext) -> HandlerOutput + Send + Sync + 'static,
    {
        self.handlers.register_fn(key, func);
        self
    }

    /// Registers a closure returning a boxed future.
    #[must_use]
    pub fn handler_async<F>(mut self, key: impl Into<String>, func: F) -> Self
    where
        F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, HandlerOutput>
            + Send
            + Sync
            + 'static,
    {
        self.handlers.register_async(key, func);
        self
    }

    /// Sets the hook run before dispatch.
    #[must_use]
    pub fn pre_hook(mut self, hook: impl Hook) -> Self {
        self.pre_hook = Some(Arc::new(hook));
        self
    }

    /// Sets a closure as the hook run before dispatch.
    #[must_use]
    pub fn pre_hook_fn<F>(self, hook: F) -> Self
    where
        F: Fn(&mut RequestContext) + Send + Sync + 'static,
    {
        self.pre_hook(FnHook::new(hook))
    }

    /// Sets the hook run after dispatch.
    #[must_use]
    pub fn post_hook(mut self, hook: impl Hook) -> Self {
        self.post_hook = Some(Arc::new(hook));
        self
    }

    /// Sets a closure as the hook run after dispatch.
    #[must_use]
    pub fn post_hook_fn<F>(self, hook: F) -> Self
    where
        F: Fn(&mut RequestContext) + Send + Sync + 'static,
    {
        self.post_hook(FnHook::new(hook))
    }

    /// Validates the settings, loads the tables if no registry was given,
    /// and builds the pipeline.
    ///
    /// Resources whose function has no registered handler are logged at
    /// startup; requests to them answer `I003`.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or the tables cannot be
    /// loaded.
    pub fn build(self) -> Result<Api, ApiError> {
        self.config.validate()?;

        let registry = match self.registry {
            Some(registry) => registry,
            None => load_registry(&self.config.api.routes_path, &self.config.api.codes_path)?,
        };

        for function in registry.functions() {
            if !self.handlers.contains(function) {
                warn!(function, "no handler registered for function");
            }
        }

        info!(
            routes = registry.route_count(),
            codes = registry.code_count(),
            handlers = self.handlers.len(),
            "api ready"
        );

        let mut pipeline = Pipeline::builder(registry, self.handlers)
            .request_id_policy(request_id_policy(&self.config));
        if let Some(hook) = self.pre_hook {
            pipeline = pipeline.pre_hook(hook);
        }
        if let Some(hook) = self.post_hook {
            pipeline = pipeline.post_hook(hook);
        }

        Ok(Api {
            config: self.config,
            pipeline: pipeline.build(),
        })
    }
}

impl Default for ApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ApiBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiBuilder")
            .field("config", &self.config)
            .field("registry", &self.registry.is_some())
            .field("handlers", &self.handlers.names())
            .finish_non_exhaustive()
    }
}

/// Request ID policy for the settings: tagged when host tags are configured.
#[must_use]
pub fn request_id_policy(config: &HermesConfig) -> RequestIdPolicy {
    if config.api.host_tags.is_empty() {
        RequestIdPolicy::Passthrough
    } else {
        RequestIdPolicy::tagged(config.api.host_tags.iter().cloned())
    }
}

/// HTTP adapter settings from the `[server]` section.
#[must_use]
pub fn server_config(config: &HermesConfig) -> ServerConfig {
    let server = &config.server;
    ServerConfig::builder()
        .http_addr(server.http_addr.as_str())
        .shutdown_timeout(Duration::from_secs(server.shutdown_timeout_secs))
        .body_timeout(Duration::from_millis(server.body_timeout_ms))
        .client_ip_header(&server.client_ip_header)
        .request_id_header(&server.request_id_header)
        .build()
}

/// Telemetry settings from the `[telemetry]` section.
#[must_use]
pub fn telemetry_config(config: &HermesConfig) -> TelemetryConfig {
    let section = &config.telemetry;

    let mut logging = match section.logging.format {
        LogFormat::Json => LogConfig::production(),
        LogFormat::Pretty => LogConfig::development(),
    };
    logging.enabled = section.logging.enabled;
    logging.level.clone_from(&section.logging.level);

    let metrics = MetricsConfig {
        enabled: section.metrics.enabled,
        addr: section.metrics.addr.clone(),
        ..MetricsConfig::default()
    };

    TelemetryConfig::builder()
        .service_name(&section.service_name)
        .logging(logging)
        .metrics(metrics)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::fixtures;

    #[test]
    fn test_request_id_policy_from_host_tags() {
        let mut config = HermesConfig::default();
        assert_eq!(request_id_policy(&config), RequestIdPolicy::Passthrough);

        config.api.host_tags = vec!["gru".to_string(), "vm-1".to_string()];
        assert_eq!(request_id_policy(&config), RequestIdPolicy::tagged(["gru", "vm-1"]));
    }

    #[test]
    fn test_server_config_conversion() {
        let mut config = HermesConfig::default();
        config.server.http_addr = "127.0.0.1:3000".to_string();
        config.server.shutdown_timeout_secs = 5;
        config.server.body_timeout_ms = 250;
        config.server.client_ip_header = "X-Real-IP".to_string();

        let server = server_config(&config);
        assert_eq!(server.http_addr(), "127.0.0.1:3000");
        assert_eq!(server.shutdown_timeout(), Duration::from_secs(5));
        assert_eq!(server.body_timeout(), Duration::from_millis(250));
        assert_eq!(server.client_ip_header(), "x-real-ip");
        assert_eq!(server.request_id_header(), "fly-request-id");
    }

    #[test]
    fn test_telemetry_config_conversion() {
        let config = HermesConfig::development();
        let telemetry = telemetry_config(&config);

        assert!(!telemetry.logging.json_format);
        assert_eq!(telemetry.logging.level, config.telemetry.logging.level);
        assert_eq!(telemetry.metrics.enabled, config.telemetry.metrics.enabled);
        assert_eq!(telemetry.metrics.service_name, config.telemetry.service_name);

        let telemetry = telemetry_config(&HermesConfig::production());
        assert!(telemetry.logging.json_format);
    }

    #[test]
    fn test_build_rejects_invalid_settings() {
        let mut config = HermesConfig::default();
        config.server.shutdown_timeout_secs = 0;

        let err = Api::builder()
            .config(config)
            .registry(fixtures::sample_registry().unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn test_build_without_tables_fails() {
        let mut config = HermesConfig::default();
        config.api.routes_path = "/nonexistent/routes.json".to_string();

        let err = Api::builder().config(config).build().unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn test_builder_debug_lists_handlers() {
        let builder = Api::builder().handlers(fixtures::sample_handlers());
        let debug = format!("{builder:?}");
        assert!(debug.contains("create_user"));
    }
}

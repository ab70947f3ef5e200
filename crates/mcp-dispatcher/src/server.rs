//! Top-level MCP server: registries for tools, resources, prompts, and
//! roots, wired to the `initialize` handshake and the built-in method
//! table through a single [`JsonRpcHandler`] implementation.
//!
//! `McpServer` is the thing an application actually builds: register
//! `McpTool`/`McpResource`/`McpPrompt`/`McpRoot` implementations on the
//! builder, then hand the built server to `mcp_http_transport` as a regular
//! JSON-RPC handler. `McpDispatcher` and the rest of this crate's traits are
//! available separately for applications that want to compose their own
//! method table instead of using this one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::warn;

use crate::uri_template::UriTemplate;

use mcp_jsonrpc::r#async::{JsonRpcHandler, SessionContext as WireSessionContext};
use mcp_jsonrpc::request::RequestParams;
use mcp_protocol::initialize::{Implementation, InitializeRequest, InitializeResult};
use mcp_protocol::logging::SetLevelParams;
use mcp_protocol::prompts::{GetPromptParams, ListPromptsResult};
use mcp_protocol::resources::{
    ListResourcesResult, ReadResourceParams as ResourceReadParams, ReadResourceResult, SubscribeParams,
};
use mcp_protocol::roots::ListRootsResult;
use mcp_protocol::tools::{CallToolParams, CallToolResult, ListToolsResult};
use mcp_protocol::version::McpVersion;
use mcp_protocol::{McpError, McpResult, ServerCapabilities};

use mcp_http_transport::middleware::{DispatcherResult, MiddlewareStack, RequestContext};

use crate::client_request::ClientRequestRegistry;
use crate::logging::McpLogger;
use crate::prompt::McpPrompt;
use crate::resource::McpResource;
use crate::roots::McpRoot;
use crate::session::SessionManager;
use crate::tool::{McpTool, ToolEntry};
pub use crate::dispatch::DispatchMiddleware;

const SUPPORTED_METHODS: &[&str] = &[
    "initialize",
    "ping",
    "tools/list",
    "tools/call",
    "resources/list",
    "resources/read",
    "resources/subscribe",
    "resources/unsubscribe",
    "prompts/list",
    "prompts/get",
    "roots/list",
    "logging/setLevel",
];

fn params_to_value(params: Option<RequestParams>) -> Value {
    params.map(|p| p.to_value()).unwrap_or(Value::Null)
}

fn deserialize_params<T: serde::de::DeserializeOwned>(params: Option<RequestParams>) -> McpResult<T> {
    serde_json::from_value(params_to_value(params)).map_err(|e| McpError::InvalidParameters(e.to_string()))
}

/// Restricts `caps` to what `version` actually supports, so a server never
/// advertises a capability a negotiated-down client can't use.
fn adjust_capabilities_for_version(caps: &ServerCapabilities, version: McpVersion) -> ServerCapabilities {
    let mut adjusted = caps.clone();
    if !version.supports_elicitation() {
        adjusted.elicitation = None;
    }
    adjusted
}

/// Routes a resource into the exact-match table or, when its descriptor URI
/// contains an RFC 6570 variable (`{...}`), the ordered template list.
/// A malformed template pattern is a registration-time programmer error, so
/// it's logged and dropped rather than panicking the server.
fn register_resource_entry(
    resources: &mut HashMap<String, Arc<dyn McpResource>>,
    templates: &mut Vec<(UriTemplate, Arc<dyn McpResource>)>,
    resource: Arc<dyn McpResource>,
) {
    let descriptor = resource.resource();
    if descriptor.uri.contains('{') {
        match UriTemplate::new(&descriptor.uri) {
            Ok(template) => templates.push((template, resource)),
            Err(err) => warn!(uri = %descriptor.uri, error = %err, "failed to compile resource URI template"),
        }
    } else {
        resources.insert(descriptor.uri, resource);
    }
}

/// Builder for [`McpServer`].
pub struct McpServerBuilder {
    server_info: Implementation,
    capabilities: ServerCapabilities,
    instructions: Option<String>,
    tools: HashMap<String, ToolEntry>,
    resources: HashMap<String, Arc<dyn McpResource>>,
    template_resources: Vec<(UriTemplate, Arc<dyn McpResource>)>,
    prompts: HashMap<String, Arc<dyn McpPrompt>>,
    roots: Vec<Arc<dyn McpRoot>>,
    logger: Option<Arc<dyn McpLogger>>,
    middleware: MiddlewareStack,
    session_timeout: Duration,
}

impl McpServerBuilder {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            server_info: Implementation::new(name, version),
            capabilities: ServerCapabilities::default(),
            instructions: None,
            tools: HashMap::new(),
            resources: HashMap::new(),
            template_resources: Vec::new(),
            prompts: HashMap::new(),
            roots: Vec::new(),
            logger: None,
            middleware: MiddlewareStack::new(),
            session_timeout: Duration::from_secs(30 * 60),
        }
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn capabilities(mut self, capabilities: ServerCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    pub fn tool(mut self, tool: impl McpTool + 'static) -> Self {
        let entry = ToolEntry::new(Arc::new(tool));
        self.tools.insert(entry.tool.tool().name.clone(), entry);
        self
    }

    /// Registers a resource. A URI descriptor containing `{...}` is treated
    /// as an RFC 6570 template and matched against at read time in
    /// registration order, after all exact-match resources; everything else
    /// is registered as an exact-match static resource.
    pub fn resource(mut self, resource: impl McpResource + 'static) -> Self {
        register_resource_entry(&mut self.resources, &mut self.template_resources, Arc::new(resource));
        self
    }

    pub fn prompt(mut self, prompt: impl McpPrompt + 'static) -> Self {
        let descriptor = prompt.prompt();
        self.prompts.insert(descriptor.name, Arc::new(prompt));
        self
    }

    pub fn root(mut self, root: impl McpRoot + 'static) -> Self {
        self.roots.push(Arc::new(root));
        self
    }

    pub fn logger(mut self, logger: impl McpLogger + 'static) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    pub fn middleware(mut self, middleware: Arc<dyn DispatchMiddleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    pub fn build(self) -> McpServer {
        let client_requests = ClientRequestRegistry::new();
        McpServer {
            inner: Arc::new(McpServerInner {
                server_info: self.server_info,
                capabilities: self.capabilities,
                instructions: self.instructions,
                tools: RwLock::new(self.tools),
                resources: RwLock::new(self.resources),
                template_resources: RwLock::new(self.template_resources),
                prompts: RwLock::new(self.prompts),
                roots: RwLock::new(self.roots),
                logger: RwLock::new(self.logger),
                middleware: self.middleware,
                sessions: SessionManager::with_timeout_and_registry(
                    ServerCapabilities::default(),
                    self.session_timeout,
                    client_requests.clone(),
                ),
                client_requests,
            }),
        }
    }
}

struct McpServerInner {
    server_info: Implementation,
    capabilities: ServerCapabilities,
    instructions: Option<String>,
    tools: RwLock<HashMap<String, ToolEntry>>,
    resources: RwLock<HashMap<String, Arc<dyn McpResource>>>,
    template_resources: RwLock<Vec<(UriTemplate, Arc<dyn McpResource>)>>,
    prompts: RwLock<HashMap<String, Arc<dyn McpPrompt>>>,
    roots: RwLock<Vec<Arc<dyn McpRoot>>>,
    logger: RwLock<Option<Arc<dyn McpLogger>>>,
    middleware: MiddlewareStack,
    sessions: SessionManager,
    client_requests: ClientRequestRegistry,
}

/// A complete MCP server: tool/resource/prompt/root registries, session
/// tracking, and the `JsonRpcHandler` impl that serves them over whatever
/// transport registers it.
///
/// Cheap to clone — every field lives behind the shared `Arc<McpServerInner>`.
#[derive(Clone)]
pub struct McpServer {
    inner: Arc<McpServerInner>,
}

impl McpServer {
    pub fn builder(name: impl Into<String>, version: impl Into<String>) -> McpServerBuilder {
        McpServerBuilder::new(name, version)
    }

    /// Handle to the session manager, for code outside the request path
    /// (background jobs, tests) that needs to push notifications.
    pub fn sessions(&self) -> &SessionManager {
        &self.inner.sessions
    }

    /// Handle to the server-to-client request registry, for wiring up
    /// elicitation/sampling calls from tool implementations.
    pub fn client_requests(&self) -> &ClientRequestRegistry {
        &self.inner.client_requests
    }

    pub async fn register_tool(&self, tool: impl McpTool + 'static) {
        let entry = ToolEntry::new(Arc::new(tool));
        self.inner.tools.write().await.insert(entry.tool.tool().name.clone(), entry);
    }

    pub async fn register_resource(&self, resource: impl McpResource + 'static) {
        let mut resources = self.inner.resources.write().await;
        let mut templates = self.inner.template_resources.write().await;
        register_resource_entry(&mut resources, &mut templates, Arc::new(resource));
    }

    pub async fn register_prompt(&self, prompt: impl McpPrompt + 'static) {
        let descriptor = prompt.prompt();
        self.inner.prompts.write().await.insert(descriptor.name, Arc::new(prompt));
    }

    /// Negotiates the protocol version for an `initialize` request.
    ///
    /// A recognized version is echoed back unchanged. An unrecognized one
    /// negotiates down to [`McpVersion::OLDEST`] rather than failing —
    /// `initialize` always succeeds; it's on the client to decide whether it
    /// can work with the version the server settled on.
    fn negotiate_version(requested: &str) -> McpVersion {
        McpVersion::from_str(requested).unwrap_or(McpVersion::OLDEST)
    }

    async fn handle_initialize(&self, params: Option<RequestParams>, session_id: Option<&str>) -> McpResult<Value> {
        let request: InitializeRequest = deserialize_params(params)?;
        let negotiated = Self::negotiate_version(&request.protocol_version);
        let capabilities = adjust_capabilities_for_version(&self.inner.capabilities, negotiated);

        if let Some(session_id) = session_id {
            self.inner
                .sessions
                .initialize(session_id, request.client_info, request.capabilities, negotiated)
                .await
                .map_err(|e| McpError::SessionError(e.to_string()))?;
        }

        let mut result = InitializeResult::new(negotiated, capabilities, self.inner.server_info.clone());
        if let Some(ref instructions) = self.inner.instructions {
            result = result.with_instructions(instructions.clone());
        }
        serde_json::to_value(result).map_err(McpError::SerializationError)
    }

    async fn handle_tools_list(&self) -> McpResult<Value> {
        let tools = self.inner.tools.read().await;
        let descriptors = tools.values().map(|entry| entry.tool.tool()).collect();
        serde_json::to_value(ListToolsResult::new(descriptors)).map_err(McpError::SerializationError)
    }

    async fn handle_tools_call(
        &self,
        params: Option<RequestParams>,
        session: Option<crate::session::SessionContext>,
    ) -> McpResult<Value> {
        let params: CallToolParams = deserialize_params(params)?;
        let entry = {
            let tools = self.inner.tools.read().await;
            tools.get(&params.name).cloned().ok_or_else(|| McpError::ToolNotFound(params.name.clone()))?
        };
        let args = params.arguments.map(Value::Object).unwrap_or_else(|| Value::Object(Default::default()));

        if let Some(validator) = &entry.input_validator {
            if let Err(err) = validator.validate(&args) {
                return Err(McpError::InvalidParameters(format!(
                    "tool '{}' arguments: {}",
                    params.name, err
                )));
            }
        }

        let result = match entry.tool.call(args, session).await {
            Ok(result) => result,
            Err(err) => CallToolResult::error(vec![mcp_protocol::tools::ToolResult::text(err.to_string())]),
        };

        if !result.is_error {
            if let Some(validator) = &entry.output_validator {
                let content = result.structured_content.clone().unwrap_or(Value::Null);
                if let Err(err) = validator.validate(&content) {
                    return Err(McpError::InvalidParameters(format!(
                        "tool '{}' structuredContent: {}",
                        params.name, err
                    )));
                }
            }
        }

        serde_json::to_value(result).map_err(McpError::SerializationError)
    }

    async fn handle_resources_list(&self) -> McpResult<Value> {
        let resources = self.inner.resources.read().await;
        let templates = self.inner.template_resources.read().await;
        let descriptors = resources
            .values()
            .map(|r| r.resource())
            .chain(templates.iter().map(|(_, r)| r.resource()))
            .collect();
        serde_json::to_value(ListResourcesResult::new(descriptors)).map_err(McpError::SerializationError)
    }

    /// Resolves a `resources/read` URI against exact matches first, then
    /// registered templates in registration order (first match wins), per
    /// how `ResourceEntry` lookup is specified.
    async fn resolve_resource(&self, uri: &str) -> McpResult<(Arc<dyn McpResource>, Option<Value>)> {
        if let Some(resource) = self.inner.resources.read().await.get(uri).cloned() {
            return Ok((resource, None));
        }

        let templates = self.inner.template_resources.read().await;
        for (template, resource) in templates.iter() {
            if template.matches(uri) {
                let vars = template.extract(uri)?;
                let vars_value = serde_json::to_value(vars).map_err(McpError::SerializationError)?;
                return Ok((resource.clone(), Some(vars_value)));
            }
        }

        Err(McpError::ResourceNotFound(uri.to_string()))
    }

    async fn handle_resources_read(
        &self,
        params: Option<RequestParams>,
        session: Option<&crate::session::SessionContext>,
    ) -> McpResult<Value> {
        let params: ResourceReadParams = deserialize_params(params)?;
        let (resource, template_vars) = self.resolve_resource(&params.uri).await?;
        let contents = resource.read(template_vars, session).await?;
        serde_json::to_value(ReadResourceResult::new(contents)).map_err(McpError::SerializationError)
    }

    async fn handle_resources_subscribe(&self, params: Option<RequestParams>, subscribe: bool) -> McpResult<Value> {
        let params: SubscribeParams = deserialize_params(params)?;
        let resource = {
            let resources = self.inner.resources.read().await;
            resources.get(&params.uri).cloned().ok_or_else(|| McpError::ResourceNotFound(params.uri.clone()))?
        };
        if subscribe {
            resource.subscribe(None).await?;
        } else {
            resource.unsubscribe(None).await?;
        }
        serde_json::to_value(mcp_protocol::ping::EmptyResult::new()).map_err(McpError::SerializationError)
    }

    async fn handle_prompts_list(&self) -> McpResult<Value> {
        let prompts = self.inner.prompts.read().await;
        let descriptors = prompts.values().map(|p| p.prompt()).collect();
        serde_json::to_value(ListPromptsResult::new(descriptors)).map_err(McpError::SerializationError)
    }

    async fn handle_prompts_get(&self, params: Option<RequestParams>) -> McpResult<Value> {
        let params: GetPromptParams = deserialize_params(params)?;
        let prompt = {
            let prompts = self.inner.prompts.read().await;
            prompts.get(&params.name).cloned().ok_or_else(|| McpError::PromptNotFound(params.name.clone()))?
        };
        let args = params
            .arguments
            .map(|args| args.into_iter().map(|(k, v)| (k, Value::String(v))).collect::<HashMap<_, _>>());
        let result = prompt.get_response(args).await?;
        serde_json::to_value(result).map_err(McpError::SerializationError)
    }

    async fn handle_roots_list(&self) -> McpResult<Value> {
        let roots = self.inner.roots.read().await;
        let descriptors = roots.iter().map(|r| r.root()).collect();
        serde_json::to_value(ListRootsResult::new(descriptors)).map_err(McpError::SerializationError)
    }

    async fn handle_logging_set_level(&self, params: Option<RequestParams>) -> McpResult<Value> {
        let params: SetLevelParams = deserialize_params(params)?;
        if let Some(logger) = self.inner.logger.read().await.as_ref() {
            logger.set_level(params.level).await?;
        }
        serde_json::to_value(mcp_protocol::ping::EmptyResult::new()).map_err(McpError::SerializationError)
    }

    /// Routes one already-middleware-cleared method call to its registry.
    /// `wire_session` is adopted into this server's own `SessionManager` via
    /// [`SessionManager::get_or_create`] so tool/resource/prompt handlers see
    /// the richer [`crate::session::SessionContext`] instead of the thin
    /// transport one.
    async fn dispatch(&self, method: &str, params: Option<RequestParams>, wire_session: Option<WireSessionContext>) -> McpResult<Value> {
        let session_id = wire_session.as_ref().map(|s| s.session_id.clone());
        let session = match &session_id {
            Some(id) => Some(self.inner.sessions.get_or_create(id).await),
            None => None,
        };

        match method {
            "initialize" => self.handle_initialize(params, session_id.as_deref()).await,
            "ping" => serde_json::to_value(mcp_protocol::ping::EmptyResult::new()).map_err(McpError::SerializationError),
            "tools/list" => self.handle_tools_list().await,
            "tools/call" => self.handle_tools_call(params, session).await,
            "resources/list" => self.handle_resources_list().await,
            "resources/read" => self.handle_resources_read(params, session.as_ref()).await,
            "resources/subscribe" => self.handle_resources_subscribe(params, true).await,
            "resources/unsubscribe" => self.handle_resources_subscribe(params, false).await,
            "prompts/list" => self.handle_prompts_list().await,
            "prompts/get" => self.handle_prompts_get(params).await,
            "roots/list" => self.handle_roots_list().await,
            "logging/setLevel" => self.handle_logging_set_level(params).await,
            other => Err(McpError::InvalidCapability(format!("unsupported method: {other}"))),
        }
    }
}

#[async_trait]
impl JsonRpcHandler for McpServer {
    type Error = McpError;

    async fn handle(
        &self,
        method: &str,
        params: Option<RequestParams>,
        session_context: Option<WireSessionContext>,
    ) -> Result<Value, Self::Error> {
        if self.inner.middleware.is_empty() {
            return self.dispatch(method, params, session_context).await;
        }

        let params_value = params.as_ref().map(|p| p.to_value());
        let mut ctx = RequestContext::new(method, params_value);

        // The middleware chain's auth/rate-limit lookups take a
        // `SessionView` from `mcp-session-storage`, a different session
        // abstraction than the one this server tracks; bridging that is out
        // of scope here, so middleware sees `None` even for established
        // sessions. Middleware that only needs request metadata (method,
        // params, headers) is unaffected.
        if let Err(err) = self.inner.middleware.execute_before(&mut ctx, None).await {
            return Err(McpError::InvalidCapability(err.to_string()));
        }

        let effective_params = ctx.params().cloned().map(|v| match v {
            Value::Array(items) => RequestParams::Array(items),
            Value::Object(map) => RequestParams::Object(map.into_iter().collect()),
            other => RequestParams::Array(vec![other]),
        });

        let result = self.dispatch(method, effective_params, session_context).await;

        let mut dispatcher_result = match &result {
            Ok(value) => DispatcherResult::Success(value.clone()),
            Err(err) => DispatcherResult::Error(err.to_string()),
        };

        if let Err(err) = self.inner.middleware.execute_after(&ctx, &mut dispatcher_result).await {
            return Err(McpError::InvalidCapability(err.to_string()));
        }

        match dispatcher_result {
            DispatcherResult::Success(value) => Ok(value),
            DispatcherResult::Error(message) => Err(McpError::InvalidCapability(message)),
        }
    }

    async fn handle_notification(
        &self,
        method: &str,
        _params: Option<RequestParams>,
        _session_context: Option<WireSessionContext>,
    ) -> Result<(), Self::Error> {
        if method != "notifications/initialized" {
            warn!(method, "unhandled notification");
        }
        Ok(())
    }

    fn supported_methods(&self) -> Vec<String> {
        SUPPORTED_METHODS.iter().map(|s| s.to_string()).collect()
    }

    /// A client's reply to a server-initiated `elicitation/create` or
    /// `sampling/createMessage` request arrives with no `method`, so the
    /// dispatcher routes it here instead of through `handle`. Resolve it
    /// against the pending request it answers, if there still is one.
    async fn handle_client_response(
        &self,
        id: mcp_jsonrpc::RequestId,
        result: Option<Value>,
        error: Option<mcp_jsonrpc::error::JsonRpcErrorObject>,
    ) {
        let request_id = id.to_string();
        let response = match (result, error) {
            (_, Some(error)) => crate::client_request::ClientResponse::Error {
                code: error.code,
                message: error.message,
            },
            (Some(result), None) => crate::client_request::ClientResponse::Result(result),
            (None, None) => crate::client_request::ClientResponse::Result(Value::Null),
        };
        if !self.inner.client_requests.resolve(&request_id, response).await {
            warn!(request_id, "client response had no matching pending request");
        }
    }
}

//! JSON-RPC client for the Zabbix API.
//!
//! One attempt per call: transport failures and error envelopes are
//! surfaced to the caller unchanged.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::ZabbixError;
use crate::model::SessionToken;
use crate::protocol::{LoginParams, RpcRequest, RpcResponse, JSONRPC_VERSION};

/// Delivers one serialized JSON-RPC request and returns the decoded body.
pub trait Transport: Send + Sync {
    fn post(&self, payload: &Value) -> Result<Value, ZabbixError>;
}

/// Blocking HTTP POST to the configured API endpoint.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, ZabbixError> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            url: config.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for HttpTransport {
    fn post(&self, payload: &Value) -> Result<Value, ZabbixError> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()?
            .error_for_status()?;
        Ok(response.json::<Value>()?)
    }
}

pub struct ApiClient<T: Transport> {
    transport: T,
    next_id: AtomicU64,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn call<P, R>(
        &self,
        method: &str,
        params: &P,
        auth: Option<&SessionToken>,
    ) -> Result<R, ZabbixError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
            auth: auth.map(SessionToken::as_str),
            id,
        };
        debug!("-> {method} (id {id})");
        let payload = serde_json::to_value(&request)?;
        let body = self.transport.post(&payload)?;
        let response: RpcResponse = serde_json::from_value(body)?;

        if let Some(error) = response.error {
            return Err(ZabbixError::Api {
                code: error.code,
                message: error.message,
                data: error.data,
            });
        }
        let result = response.result.ok_or_else(|| {
            ZabbixError::Decode(format!("{method}: response has neither result nor error"))
        })?;
        serde_json::from_value(result)
            .map_err(|err| ZabbixError::Decode(format!("{method}: {err}")))
    }

    /// Authenticate and bind the returned token to this client.
    pub fn login(self, username: &str, password: &str) -> Result<Session<T>, ZabbixError> {
        let token: String = self.call("user.login", &LoginParams { username, password }, None)?;
        Ok(Session {
            client: self,
            token: SessionToken::new(token),
        })
    }
}

/// An authenticated client. There is no refresh; an expired token shows up
/// as an API error on the next call.
pub struct Session<T: Transport> {
    client: ApiClient<T>,
    token: SessionToken,
}

impl<T: Transport> Session<T> {
    pub fn call<P, R>(&self, method: &str, params: &P) -> Result<R, ZabbixError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        self.client.call(method, params, Some(&self.token))
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde_json::{json, Value};

    use super::{ApiClient, Session, Transport};
    use crate::error::ZabbixError;

    type Handler = Box<dyn Fn(&Value) -> Result<Value, ZabbixError> + Send + Sync>;

    /// Answers each method with a canned `result`, recording every request.
    #[derive(Default)]
    pub struct ScriptedTransport {
        handlers: HashMap<String, Handler>,
        requests: Mutex<Vec<Value>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default().on("user.login", |_| Ok(json!("test-token")))
        }

        /// Register a handler receiving `params` and returning `result`.
        pub fn on<F>(mut self, method: &str, handler: F) -> Self
        where
            F: Fn(&Value) -> Result<Value, ZabbixError> + Send + Sync + 'static,
        {
            self.handlers.insert(method.to_string(), Box::new(handler));
            self
        }

        pub fn requests(&self) -> Vec<Value> {
            self.requests.lock().unwrap().clone()
        }

        pub fn methods(&self) -> Vec<String> {
            self.requests()
                .iter()
                .map(|r| r["method"].as_str().unwrap_or_default().to_string())
                .collect()
        }

        pub fn into_session(self) -> Session<Self> {
            ApiClient::new(self).login("Admin", "zabbix").unwrap()
        }
    }

    impl Transport for ScriptedTransport {
        fn post(&self, payload: &Value) -> Result<Value, ZabbixError> {
            self.requests.lock().unwrap().push(payload.clone());
            let method = payload["method"].as_str().unwrap_or_default();
            let handler = self.handlers.get(method).ok_or_else(|| ZabbixError::Api {
                code: -32601,
                message: "Method not found.".to_string(),
                data: Some(method.to_string()),
            })?;
            let result = handler(&payload["params"])?;
            Ok(json!({"jsonrpc": "2.0", "result": result, "id": payload["id"]}))
        }
    }

    impl<T: Transport> Session<T> {
        pub fn transport(&self) -> &T {
            &self.client.transport
        }
    }
}

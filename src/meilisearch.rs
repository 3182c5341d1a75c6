use std::time::Duration;

use indicatif::ProgressBar;
use log::{debug, info};
use miette::{IntoDiagnostic, Result};
use reqwest::{
    blocking::{Client, RequestBuilder, Response},
    header::USER_AGENT,
    StatusCode,
};
use serde_json::Value;

use crate::{
    error::{CliError, Credential, Missing},
    format::{self, write_response_headers},
    options::GlobalOptions,
};

pub type TaskId = u64;

/// A resolved connection to a MeiliSearch instance plus the output preferences
/// shared by every command.
#[derive(Debug, Clone)]
pub struct Meilisearch {
    pub addr: String,
    pub key: Option<String>,
    pub user_agent: String,
    pub custom_header: Option<(String, String)>,
    pub verbose: usize,
    pub raw: bool,
    pub wait: bool,
    pub interval: u64,
    client: Client,
}

/// What a command needs from the environment before it can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Only the address of the server.
    UrlOnly,
    /// The address of the server and the master key.
    MasterKey,
}

impl Meilisearch {
    pub fn connect(options: &GlobalOptions, auth: Auth) -> Result<Self> {
        let url = options.url.as_deref().map(str::trim).filter(|url| !url.is_empty());
        let key = options
            .master_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        let mut missing = Vec::new();
        if url.is_none() {
            missing.push(Credential::Url);
        }
        if auth == Auth::MasterKey && key.is_none() {
            missing.push(Credential::MasterKey);
        }
        let url = match url {
            Some(url) if missing.is_empty() => url,
            _ => {
                return Err(CliError::MissingCredentials {
                    missing: Missing(missing),
                }
                .into())
            }
        };

        Ok(Meilisearch {
            addr: url.trim_end_matches('/').to_string(),
            key,
            user_agent: options.user_agent.clone(),
            custom_header: options.header()?,
            verbose: options.verbose,
            raw: options.raw,
            wait: options.wait,
            interval: options.interval,
            client: Client::new(),
        })
    }

    pub fn get(&self, url: impl AsRef<str>) -> RequestBuilder {
        self.request(|c| c.get(url.as_ref()))
    }

    pub fn post(&self, url: impl AsRef<str>) -> RequestBuilder {
        self.request(|c| c.post(url.as_ref()))
    }

    pub fn put(&self, url: impl AsRef<str>) -> RequestBuilder {
        self.request(|c| c.put(url.as_ref()))
    }

    pub fn patch(&self, url: impl AsRef<str>) -> RequestBuilder {
        self.request(|c| c.patch(url.as_ref()))
    }

    pub fn delete(&self, url: impl AsRef<str>) -> RequestBuilder {
        self.request(|c| c.delete(url.as_ref()))
    }

    fn request(&self, closure: impl Fn(&Client) -> RequestBuilder) -> RequestBuilder {
        let mut req_builder = closure(&self.client);
        if let Some(ref key) = self.key {
            req_builder = req_builder.bearer_auth(key);
        }
        if let Some((key, value)) = &self.custom_header {
            req_builder = req_builder.header(key, value);
        }
        req_builder.header(USER_AGENT, &self.user_agent)
    }

    /// Sends the request while a spinner displays `message` on stderr.
    pub fn send(&self, request: RequestBuilder, message: &str) -> Result<Value> {
        let response = with_spinner(message, |_| {
            let request = request.build().into_diagnostic()?;
            debug!("{} {}", request.method(), request.url());
            self.client.execute(request).into_diagnostic()
        })?;
        self.handle_response(response)
    }

    /// Turns a response into its json body, or into an error if the server
    /// refused the request. An empty body gives `Value::Null`.
    pub fn handle_response(&self, response: Response) -> Result<Value> {
        write_response_headers(&response, self.verbose)?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        let body = response.text().into_diagnostic()?;
        if !status.is_success() {
            return Err(CliError::from_response(status.as_u16(), &body).into());
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).into_diagnostic()
    }

    /// Prints `value` as a titled panel, or as json with `--raw`.
    pub fn display(&self, title: &str, value: &Value) -> Result<()> {
        if self.raw {
            format::write_json(value)
        } else {
            format::write_panel(title, value)
        }
    }

    /// Common flow of every write: without `--wait` the enqueued task is
    /// printed, otherwise the task is awaited and `then` prints the outcome.
    pub fn process_task(
        &self,
        title: &str,
        task: Value,
        then: impl FnOnce(&Self) -> Result<()>,
    ) -> Result<()> {
        if !self.wait {
            return self.display(title, &task);
        }
        match task_uid(&task) {
            Some(uid) => {
                self.wait_for_task(uid)?;
                then(self)
            }
            None => self.display(title, &task),
        }
    }

    /// Polls the task until it leaves the `enqueued` and `processing` states.
    /// A task that did not succeed is printed and reported as an error.
    pub fn wait_for_task(&self, uid: TaskId) -> Result<Value> {
        let task = with_spinner(&format!("Waiting for task {uid}..."), |spinner| loop {
            let response = self
                .get(format!("{}/tasks/{}", self.addr, uid))
                .send()
                .into_diagnostic()?;
            let task = self.handle_response(response)?;
            match task["status"].as_str() {
                Some(status @ ("enqueued" | "processing")) => {
                    spinner.set_message(format!("Task {uid} is {status}..."));
                    info!("task {uid} is {status}");
                }
                _ => return Ok(task),
            }
            std::thread::sleep(Duration::from_millis(self.interval));
        })?;

        match task["status"].as_str() {
            Some("succeeded") | Some("processed") => {
                info!("task {uid} succeeded");
                Ok(task)
            }
            status => {
                self.display("Failed Task", &task)?;
                let error = &task["error"];
                Err(CliError::TaskFailed {
                    uid,
                    status: status.unwrap_or("unknown").to_string(),
                    message: error["message"]
                        .as_str()
                        .unwrap_or("no error message was returned")
                        .to_string(),
                    link: error["link"].as_str().map(str::to_string),
                }
                .into())
            }
        }
    }
}

/// Extracts the uid of an enqueued task. Older servers answer with `uid` or
/// `updateId` instead of `taskUid`.
pub fn task_uid(task: &Value) -> Option<TaskId> {
    task["taskUid"]
        .as_u64()
        .or_else(|| task["uid"].as_u64())
        .or_else(|| task["updateId"].as_u64())
}

/// Splits a `name: value` header.
pub fn parse_header(header: &str) -> Result<(String, String)> {
    match header.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(CliError::InvalidHeader {
            header: header.to_string(),
        }
        .into()),
    }
}

/// Runs `f` while a spinner displays `message` on stderr. The spinner is
/// cleared whatever the outcome.
fn with_spinner<T>(message: &str, f: impl FnOnce(&ProgressBar) -> Result<T>) -> Result<T> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(100);
    let ret = f(&spinner);
    spinner.finish_and_clear();
    ret
}

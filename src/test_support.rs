//! Shared fixtures for unit tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::{GhviewError, Result};
use crate::github::auth::{OAuthApp, TokenGrant};
use crate::github::gateway::RemoteGateway;
use crate::github::models::{BranchDto, RepositoryDto, SearchResponseDto, UserDto};

pub const TEST_LOGIN: &str = "octo";

pub fn repo_dto(owner: &str, name: &str) -> RepositoryDto {
    RepositoryDto {
        id: name.bytes().map(u64::from).sum(),
        name: name.to_string(),
        full_name: format!("{}/{}", owner, name),
        description: None,
        private: false,
        stargazers_count: 0,
        forks_count: 0,
        language: Some("Rust".to_string()),
        updated_at: "2024-01-01T00:00:00Z".to_string(),
        owner: UserDto {
            id: 1,
            login: owner.to_string(),
            avatar_url: String::new(),
        },
    }
}

/// `count` repositories named `{prefix}-{n}`
pub fn repo_dtos(prefix: &str, count: usize) -> Vec<RepositoryDto> {
    (0..count)
        .map(|n| repo_dto(TEST_LOGIN, &format!("{}-{}", prefix, n)))
        .collect()
}

#[derive(Clone)]
struct Reply {
    delay: Duration,
    result: std::result::Result<Vec<RepositoryDto>, String>,
}

/// Gateway whose list and search replies are scripted per request, each with
/// its own latency
///
/// Requests are keyed `list:<page>` and `search:<query>:<page>`, where
/// `<query>` is the text before the `user:` scope. Replies queued for a key
/// are served in order and the last one repeats. Unscripted requests return
/// an empty page immediately.
#[derive(Default)]
pub struct ScriptedGateway {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, page: u32, delay_ms: u64, repos: Vec<RepositoryDto>) -> &Self {
        self.push(format!("list:{}", page), delay_ms, Ok(repos))
    }

    pub fn list_fails(&self, page: u32, message: &str) -> &Self {
        self.push(format!("list:{}", page), 0, Err(message.to_string()))
    }

    pub fn search(&self, query: &str, page: u32, delay_ms: u64, repos: Vec<RepositoryDto>) -> &Self {
        self.push(format!("search:{}:{}", query, page), delay_ms, Ok(repos))
    }

    pub fn search_fails(&self, query: &str, page: u32, message: &str) -> &Self {
        self.push(format!("search:{}:{}", query, page), 0, Err(message.to_string()))
    }

    /// Keys of every list/search request received, in arrival order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with("search:"))
            .collect()
    }

    fn push(
        &self,
        key: String,
        delay_ms: u64,
        result: std::result::Result<Vec<RepositoryDto>, String>,
    ) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(key)
            .or_default()
            .push_back(Reply {
                delay: Duration::from_millis(delay_ms),
                result,
            });
        self
    }

    async fn reply(&self, key: String) -> Result<Vec<RepositoryDto>> {
        self.calls.lock().unwrap().push(key.clone());

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            match replies.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        let Some(reply) = reply else {
            return Ok(Vec::new());
        };

        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result.map_err(GhviewError::Custom)
    }
}

#[async_trait]
impl RemoteGateway for ScriptedGateway {
    async fn list_repositories(
        &self,
        _token: Option<SecretString>,
        page: u32,
        _per_page: u32,
    ) -> Result<Vec<RepositoryDto>> {
        self.reply(format!("list:{}", page)).await
    }

    async fn list_branches(
        &self,
        _token: Option<SecretString>,
        _owner: String,
        _repo: String,
        _page: u32,
        _per_page: u32,
    ) -> Result<Vec<BranchDto>> {
        Ok(Vec::new())
    }

    async fn search_repositories(
        &self,
        _token: Option<SecretString>,
        query: String,
        page: u32,
        _per_page: u32,
    ) -> Result<SearchResponseDto> {
        let term = query
            .split(" user:")
            .next()
            .unwrap_or_default()
            .to_string();
        let items = self.reply(format!("search:{}:{}", term, page)).await?;
        Ok(SearchResponseDto {
            total_count: items.len() as u64,
            items,
        })
    }

    async fn current_user(&self, _token: Option<SecretString>) -> Result<UserDto> {
        Ok(UserDto {
            id: 1,
            login: TEST_LOGIN.to_string(),
            avatar_url: String::new(),
        })
    }

    async fn exchange_code_for_token(&self, _app: OAuthApp, _code: String) -> Result<TokenGrant> {
        Err(GhviewError::AuthenticationFailed(
            "code exchange is not scripted".to_string(),
        ))
    }
}

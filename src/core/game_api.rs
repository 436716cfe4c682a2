//=========================================================================
// Game Session API Client
//=========================================================================
//
// Blocking client for the account and score service behind the login,
// register and dashboard pages.
//
//   POST /users/login                       form → {access_token, token_type}
//   POST /users/register                    json → user record
//   POST /game/session/start?game_type=          → {session_id, message}
//   POST /game/session/{id}/end?score=           → {session_id, final_score, duration, message}
//   POST /game/session/{id}/save           json → {session_id, message}
//   GET  /game/leaderboard/{game}?limit=         → {game_type, leaderboard[], total_players}
//   GET  /health                                 → {status}
//
// A 401 drops the stored access token.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::core::config::EndpointConfig;

//=== GameApiError ========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameApiError {
    /// Missing, expired or rejected access token.
    Unauthorized,

    NotFound,

    Transport(String),

    Status(u16),

    Decode(String),
}

impl fmt::Display for GameApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "Not authorized"),
            Self::NotFound => write!(f, "Not found"),
            Self::Transport(e) => write!(f, "Game service unreachable: {}", e),
            Self::Status(code) => write!(f, "Game service returned status {}", code),
            Self::Decode(e) => write!(f, "Malformed game service response: {}", e),
        }
    }
}

impl std::error::Error for GameApiError {}

impl From<reqwest::Error> for GameApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

//=== Wire Types ==========================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionStarted {
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionEnded {
    pub session_id: String,
    pub final_score: i64,
    /// Seconds between start and end.
    pub duration: f64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StateSaved {
    pub session_id: String,
    pub message: String,
}

/// One finished session on a leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScoreRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub user_id: u64,
    pub game_type: String,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub level: Option<u32>,
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Leaderboard {
    pub game_type: String,
    pub leaderboard: Vec<ScoreRecord>,
    pub total_players: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Health {
    pub status: String,
}

#[derive(Serialize)]
struct SaveRequest<'a> {
    session_id: &'a str,
    game_data: &'a serde_json::Value,
    timestamp: String,
}

//=== GameSessionClient ===================================================

pub struct GameSessionClient {
    base_url: String,
    http: Client,
    token: Option<String>,
}

impl GameSessionClient {
    pub fn new(endpoint: &EndpointConfig) -> Result<Self, GameApiError> {
        let http = Client::builder().timeout(endpoint.timeout()).build()?;
        Ok(Self {
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            http,
            token: None,
        })
    }

    //--- Auth -------------------------------------------------------------

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    pub fn logout(&mut self) {
        self.token = None;
    }

    /// Exchanges credentials for an access token and keeps it.
    pub fn login(&mut self, username: &str, password: &str) -> Result<AccessToken, GameApiError> {
        let request = self
            .http
            .post(self.url("/users/login"))
            .form(&[("username", username), ("password", password)]);
        let token: AccessToken = self.send(request)?;
        self.token = Some(token.access_token.clone());
        Ok(token)
    }

    pub fn register(&mut self, registration: &Registration) -> Result<UserRecord, GameApiError> {
        let request = self.http.post(self.url("/users/register")).json(registration);
        self.send(request)
    }

    //--- Sessions ---------------------------------------------------------

    pub fn start_session(&mut self, game_type: &str) -> Result<SessionStarted, GameApiError> {
        let request = self
            .http
            .post(self.url("/game/session/start"))
            .query(&[("game_type", game_type)]);
        self.send(request)
    }

    pub fn end_session(&mut self, session_id: &str, score: i64) -> Result<SessionEnded, GameApiError> {
        let request = self
            .http
            .post(self.url(&format!("/game/session/{}/end", session_id)))
            .query(&[("score", score)]);
        self.send(request)
    }

    pub fn save_state(
        &mut self,
        session_id: &str,
        game_data: &serde_json::Value,
        timestamp: &str,
    ) -> Result<StateSaved, GameApiError> {
        let body = SaveRequest {
            session_id,
            game_data,
            timestamp: timestamp.to_string(),
        };
        let request = self
            .http
            .post(self.url(&format!("/game/session/{}/save", session_id)))
            .json(&body);
        self.send(request)
    }

    pub fn leaderboard(&mut self, game_type: &str, limit: u32) -> Result<Leaderboard, GameApiError> {
        let request = self
            .http
            .get(self.url(&format!("/game/leaderboard/{}", game_type)))
            .query(&[("limit", limit)]);
        self.send(request)
    }

    pub fn health(&mut self) -> Result<Health, GameApiError> {
        let request = self.http.get(self.url("/health"));
        self.send(request)
    }

    //--- Internal Helpers -------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send<T: DeserializeOwned>(&mut self, request: RequestBuilder) -> Result<T, GameApiError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send()?;
        let status = response.status();
        debug!(target: "game_api", "{} {}", status, response.url().path());

        match status {
            StatusCode::UNAUTHORIZED => {
                warn!(target: "game_api", "Access token rejected, signing out");
                self.token = None;
                Err(GameApiError::Unauthorized)
            }
            StatusCode::NOT_FOUND => Err(GameApiError::NotFound),
            s if !s.is_success() => Err(GameApiError::Status(s.as_u16())),
            _ => Ok(response.json()?),
        }
    }
}

//=========================================================================
// Tests
//=========================================================================

//! Bearer-token sessions.
//!
//! Identity lives outside this service; a session binds an opaque token
//! to an actor (id, display name, role). Tokens are random 256-bit
//! values handed to the client once and stored here only as SHA-256
//! hashes.

use std::collections::HashMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::enums::Role;

/// The authenticated caller attached to each request.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

/// In-memory token → actor map, keyed by token hash.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, Actor>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session and return the plaintext token. The token is
    /// not recoverable afterwards.
    pub fn issue(&mut self, actor: Actor) -> String {
        let token = generate_token();
        self.sessions.insert(hash_token(&token), actor);
        token
    }

    pub fn resolve(&self, token: &str) -> Option<&Actor> {
        self.sessions.get(&hash_token(token))
    }

    /// Change the role on every live session of the given user.
    /// Returns the previous role if any session matched.
    pub fn update_role(&mut self, user_id: &Uuid, role: Role) -> Option<Role> {
        let mut previous = None;
        for actor in self.sessions.values_mut() {
            if actor.id == *user_id {
                previous.get_or_insert(actor.role);
                actor.role = role;
            }
        }
        previous
    }

    pub fn revoke(&mut self, token: &str) -> bool {
        self.sessions.remove(&hash_token(token)).is_some()
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

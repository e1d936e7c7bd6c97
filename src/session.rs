use tracing::{info, warn};

use crate::authority::LegalityAuthority;
use crate::codec::{self, CodecError};
use crate::navigate::{BoardView, NavigationState};
use crate::pgn;
use crate::tree::OpeningTree;

/// Repertoire used when a loaded file yields no valid game at all.
pub const DEFAULT_OPENINGS: &str = r#"[Event "Italian Game"]

1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 {The classical Giuoco Piano} 4. c3 Nf6 5. d3 *

[Event "Ruy Lopez"]

1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. Ba4 Nf6 5. O-O Be7 {The closed main line} *
"#;

/// One loaded repertoire: the unmodified source text, the merged tree behind
/// its navigation state, and the per-game errors collected while loading.
///
/// A session is built per load and replaced wholesale; dropping the old one
/// releases its board view before the next session installs a new one.
pub struct Session<A: LegalityAuthority, B: BoardView> {
    source: String,
    load_errors: Vec<String>,
    used_default: bool,
    nav: NavigationState<A, B>,
}

impl<A: LegalityAuthority, B: BoardView> Session<A, B> {
    /// Loads a repertoire from raw text.
    ///
    /// Per-game parse failures are collected, not fatal. A file with zero
    /// valid games falls back to the built-in default opening set.
    pub fn from_text(text: String, authority: A, board: B) -> Session<A, B> {
        let mut outcome = pgn::parse_file(&text);
        let mut source = text;
        let mut used_default = false;

        if outcome.games.is_empty() {
            warn!("no valid game in file, falling back to the default opening set");
            let fallback = pgn::parse_file(DEFAULT_OPENINGS);
            outcome.games = fallback.games;
            source = DEFAULT_OPENINGS.to_string();
            used_default = true;
        }

        info!(
            games = outcome.games.len(),
            errors = outcome.errors.len(),
            "repertoire loaded"
        );

        let mut tree = OpeningTree::new();
        tree.merge(&outcome.games, &authority);

        Session {
            source,
            load_errors: outcome.errors,
            used_default,
            nav: NavigationState::new(tree, authority, board),
        }
    }

    /// Loads from an inline content token, as decoded from a shareable link.
    pub fn from_token(token: &str, authority: A, board: B) -> Result<Session<A, B>, CodecError> {
        let text = codec::decode_content(token)?;
        Ok(Session::from_text(text, authority, board))
    }

    /// Loads from a remote address, exactly as a local upload would.
    pub fn from_remote(uri: &str, authority: A, board: B) -> Result<Session<A, B>, CodecError> {
        let text = codec::load_from_remote(uri)?;
        Ok(Session::from_text(text, authority, board))
    }

    /// Loads from a shareable-link query parameter: `pgn=<token>` carries
    /// inline compressed content, `url=<token>` an encoded remote address.
    pub fn from_link(param: &str, authority: A, board: B) -> Result<Session<A, B>, CodecError> {
        if let Some(token) = param.strip_prefix("pgn=") {
            Session::from_token(token, authority, board)
        } else if let Some(token) = param.strip_prefix("url=") {
            let uri = codec::decode_remote_uri(token)?;
            Session::from_remote(&uri, authority, board)
        } else {
            Err(CodecError::Decode(format!(
                "unrecognized link parameter: {}",
                param
            )))
        }
    }

    pub fn nav(&self) -> &NavigationState<A, B> {
        &self.nav
    }

    pub fn nav_mut(&mut self) -> &mut NavigationState<A, B> {
        &mut self.nav
    }

    /// Errors collected at load time, for a non-fatal summary to the user.
    pub fn load_errors(&self) -> &[String] {
        &self.load_errors
    }

    pub fn used_default(&self) -> bool {
        self.used_default
    }

    /// The source text as loaded, unmodified; export hands back the original
    /// file, not a re-derived tree dump.
    pub fn export(&self) -> &str {
        &self.source
    }

    /// URL-embeddable token for the current source.
    pub fn share_token(&self) -> Result<String, CodecError> {
        codec::encode_content(&self.source)
    }

    /// Shareable-link parameter for the current source, in the form
    /// [`from_link`](Session::from_link) accepts back.
    pub fn share_link(&self) -> Result<String, CodecError> {
        Ok(format!("pgn={}", self.share_token()?))
    }
}

//! Sign-in handshake
//!
//! The handshake replays what a browser does when signing in:
//!
//! | Response path      | Action                                          |
//! |--------------------|-------------------------------------------------|
//! | site root          | Visit the sign-in entry page                    |
//! | sign-in entry page | Extract tokens and post the login form          |
//! | anything else      | Stop; the login form was never reached          |
//!
//! The path of each response (after redirects) is the only state. Steps run
//! one at a time.

use crate::auth::tokens::{LoginTokens, TokenExtractor};
use crate::config::{validate_credentials, Credentials, SiteConfig};
use crate::session::{fetch_page, submit_form, Session};
use crate::CrawlerError;
use url::Url;

/// Upper bound on navigation steps before the login form is reached
const MAX_HANDSHAKE_STEPS: usize = 8;

/// How the login attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The login form was posted and accepted by the transport
    Submitted,
    /// The site answered the login post with an anti-bot challenge
    CaptchaChallenge,
    /// Navigation ended on a page that is not part of the sign-in flow
    NotReached,
}

/// A session the handshake has finished with
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    session: Session,
    outcome: LoginOutcome,
}

impl AuthenticatedSession {
    pub fn new(session: Session, outcome: LoginOutcome) -> Self {
        Self { session, outcome }
    }

    pub fn outcome(&self) -> LoginOutcome {
        self.outcome
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }
}

/// Handshake state, derived from a response path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Root,
    SignInEntry,
    Other,
}

/// Compiled handshake configuration for one site
#[derive(Debug, Clone)]
pub struct Handshake {
    tokens: TokenExtractor,
    base_url: Url,
    sign_in_url: Url,
    submit_url: Url,
}

impl Handshake {
    pub fn new(site: &SiteConfig) -> Result<Self, CrawlerError> {
        Ok(Self {
            tokens: TokenExtractor::new()?,
            base_url: Url::parse(&site.base_url)?,
            sign_in_url: Url::parse(&site.sign_in_url)?,
            submit_url: Url::parse(&site.sign_in_submit_url)?,
        })
    }

    /// Maps a response URL to the handshake state it represents
    pub fn classify(&self, url: &Url) -> HandshakeState {
        let path = url.path();
        if path == self.sign_in_url.path() {
            HandshakeState::SignInEntry
        } else if path == self.base_url.path() {
            HandshakeState::Root
        } else {
            HandshakeState::Other
        }
    }

    /// Drives the handshake to completion on `session`
    pub async fn run(
        &self,
        session: Session,
        credentials: &Credentials,
    ) -> Result<AuthenticatedSession, CrawlerError> {
        validate_credentials(credentials)?;

        let mut next = self.base_url.clone();
        let mut referer: Option<Url> = None;

        for _ in 0..MAX_HANDSHAKE_STEPS {
            let page = fetch_page(session.client(), &next, referer.as_ref()).await?;

            match self.classify(&page.url) {
                HandshakeState::Root => {
                    tracing::debug!("Reached site root, moving to sign-in page");
                    referer = Some(page.url);
                    next = self.sign_in_url.clone();
                }
                HandshakeState::SignInEntry => {
                    let tokens = self.tokens.extract(&page.body)?;
                    let outcome = self.submit(&session, &page.url, credentials, &tokens).await?;
                    return Ok(AuthenticatedSession::new(session, outcome));
                }
                HandshakeState::Other => {
                    tracing::warn!(
                        "Sign-in flow ended at unexpected page {}; continuing without login",
                        page.url
                    );
                    return Ok(AuthenticatedSession::new(session, LoginOutcome::NotReached));
                }
            }
        }

        Err(CrawlerError::HandshakeStalled {
            steps: MAX_HANDSHAKE_STEPS,
        })
    }

    async fn submit(
        &self,
        session: &Session,
        referer: &Url,
        credentials: &Credentials,
        tokens: &LoginTokens,
    ) -> Result<LoginOutcome, CrawlerError> {
        let fields = login_form(self.base_url.as_str(), credentials, tokens);

        match submit_form(session.client(), &self.submit_url, Some(referer), &fields).await {
            Ok(_) => {
                tracing::info!("Login form submitted");
                Ok(LoginOutcome::Submitted)
            }
            Err(e) if e.is_captcha_challenge(self.submit_url.path()) => {
                tracing::warn!(
                    "Status Code: {}; {}; Captcha check required",
                    e.status().map(|s| s.as_u16()).unwrap_or_default(),
                    e
                );
                Ok(LoginOutcome::CaptchaChallenge)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Builds the login form fields expected by the sign-in endpoint
fn login_form<'a>(
    return_url: &'a str,
    credentials: &'a Credentials,
    tokens: &'a LoginTokens,
) -> Vec<(&'static str, &'a str)> {
    vec![
        ("userid", credentials.login.as_str()),
        ("pass", credentials.password.as_str()),
        ("kmsi-unchecked", "1"),
        ("kmsi", "1"),
        ("pageType", "-1"),
        ("returnUrl", return_url),
        ("srt", tokens.session_token.as_str()),
        ("rtmData", "PS=T.0"),
        ("rqid", tokens.request_id.as_str()),
        ("lkdhjebhsjdhejdshdjchquwekguid", tokens.request_id.as_str()),
        ("lastAttemptMethod", "password"),
        ("showWebAuthnOptIn", "1"),
        ("mid", tokens.device_id.as_str()),
        ("isRecgUser", "false"),
    ]
}

/// Signs in on `session` and returns it once the login post has completed
///
/// # Errors
///
/// Returns an error if the credentials are empty, a request fails, or the
/// sign-in page no longer carries the expected tokens. A captcha challenge
/// on the login post is not an error; it is reported through
/// [`AuthenticatedSession::outcome`].
pub async fn run_handshake(
    session: Session,
    credentials: &Credentials,
) -> Result<AuthenticatedSession, CrawlerError> {
    let handshake = Handshake::new(session.site())?;
    handshake.run(session, credentials).await
}

//! Session holder: cached view of the auth collaborator's session

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::observer::{Listeners, Subscription};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// Push notification from the auth collaborator: the full new state.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthChange {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Github,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
        }
    }
}

/// What a successful sign-up produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn,
    ConfirmationPending,
}

/// The auth collaborator.
#[allow(async_fn_in_trait)]
pub trait AuthBackend {
    async fn get_session(&self) -> Result<Option<Session>, AuthError>;

    fn on_auth_state_change(&self, listener: impl Fn(&AuthChange) + 'static) -> Subscription;

    async fn sign_in_with_password(&self, email: &str, password: &str)
    -> Result<Session, AuthError>;

    /// `Ok(None)` means the account exists but awaits email confirmation.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: Option<&str>,
    ) -> Result<(), AuthError>;
}

/// Read-only copy of the current session state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub session: Option<Session>,
    /// True until the initial session fetch (or a push) resolves.
    pub loading: bool,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        SessionSnapshot {
            user: None,
            session: None,
            loading: true,
        }
    }
}

impl SessionSnapshot {
    fn resolved(session: Option<Session>) -> SessionSnapshot {
        SessionSnapshot {
            user: session.as_ref().map(|s| s.user.clone()),
            session,
            loading: false,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }
}

/// Holds the session for the lifetime of a popup and threads it to whoever
/// is handed a clone.
///
/// Every push from the backend overwrites the cached state. The initial fetch
/// is only applied if no push arrived while it was in flight.
pub struct SessionHolder<A> {
    backend: Rc<A>,
    state: Rc<RefCell<SessionSnapshot>>,
    observers: Listeners<SessionSnapshot>,
    push_seen: Rc<Cell<bool>>,
    push_subscription: Rc<RefCell<Option<Subscription>>>,
}

impl<A: AuthBackend> SessionHolder<A> {
    /// Register for push notifications. Call [`SessionHolder::load`] to fetch
    /// the existing session.
    pub fn new(backend: Rc<A>) -> Self {
        let state = Rc::new(RefCell::new(SessionSnapshot::default()));
        let observers = Listeners::new();
        let push_seen = Rc::new(Cell::new(false));

        let subscription = {
            let state = Rc::clone(&state);
            let observers = observers.clone();
            let push_seen = Rc::clone(&push_seen);
            backend.on_auth_state_change(move |change: &AuthChange| {
                log::debug!("auth state change: {:?}", change.event);
                push_seen.set(true);
                apply(&state, &observers, change.session.clone());
            })
        };

        SessionHolder {
            backend,
            state,
            observers,
            push_seen,
            push_subscription: Rc::new(RefCell::new(Some(subscription))),
        }
    }

    /// Construct and fetch the existing session once.
    pub async fn connect(backend: Rc<A>) -> Self {
        let holder = SessionHolder::new(backend);
        holder.load().await;
        holder
    }

    pub async fn load(&self) {
        match self.backend.get_session().await {
            Ok(session) if !self.push_seen.get() => {
                apply(&self.state, &self.observers, session);
            }
            Ok(_) => {
                log::debug!("initial session superseded by push notification");
            }
            Err(e) => {
                log::error!("Error fetching session: {}", e);
                if self.state.borrow().loading {
                    apply(&self.state, &self.observers, None);
                }
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    /// Be told about every state change until the handle is dropped.
    pub fn observe(&self, observer: impl Fn(&SessionSnapshot) + 'static) -> Subscription {
        self.observers.subscribe(observer)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        validate_credentials(email, password)?;
        let session = self
            .backend
            .sign_in_with_password(email.trim(), password)
            .await?;
        apply(&self.state, &self.observers, Some(session));
        Ok(())
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        validate_credentials(email, password)?;
        match self.backend.sign_up(email.trim(), password).await? {
            Some(session) => {
                apply(&self.state, &self.observers, Some(session));
                Ok(SignUpOutcome::SignedIn)
            }
            None => Ok(SignUpOutcome::ConfirmationPending),
        }
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.backend.sign_out().await?;
        apply(&self.state, &self.observers, None);
        Ok(())
    }

    pub async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: Option<&str>,
    ) -> Result<(), AuthError> {
        self.backend.sign_in_with_oauth(provider, redirect_to).await
    }

    /// Stop applying push notifications. Also happens when the last clone
    /// is dropped.
    pub fn disconnect(&self) {
        if let Some(subscription) = self.push_subscription.borrow_mut().take() {
            subscription.unsubscribe();
        }
    }
}

fn apply(
    state: &RefCell<SessionSnapshot>,
    observers: &Listeners<SessionSnapshot>,
    session: Option<Session>,
) {
    let snapshot = SessionSnapshot::resolved(session);
    *state.borrow_mut() = snapshot.clone();
    observers.notify(&snapshot);
}

/// Reject obviously malformed credentials before calling the backend.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    let email_ok = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .map(|re| re.is_match(email.trim()))
        .unwrap_or(false);
    if !email_ok {
        return Err(AuthError::InvalidEmail);
    }
    if password.is_empty() {
        return Err(AuthError::EmptyPassword);
    }
    Ok(())
}

impl<A> Clone for SessionHolder<A> {
    fn clone(&self) -> Self {
        SessionHolder {
            backend: Rc::clone(&self.backend),
            state: Rc::clone(&self.state),
            observers: self.observers.clone(),
            push_seen: Rc::clone(&self.push_seen),
            push_subscription: Rc::clone(&self.push_subscription),
        }
    }
}

impl<A> PartialEq for SessionHolder<A> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl<A> fmt::Debug for SessionHolder<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHolder")
            .field("state", &*self.state.borrow())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub fn session_for(user_id: &str) -> Session {
        Session {
            access_token: format!("token-{user_id}"),
            refresh_token: None,
            expires_at: None,
            user: User {
                id: user_id.to_string(),
                email: Some(format!("{user_id}@example.com")),
            },
        }
    }

    /// In-memory auth backend that counts calls.
    #[derive(Default)]
    pub struct FakeAuth {
        pub listeners: Listeners<AuthChange>,
        pub stored: RefCell<Option<Session>>,
        pub fail_with: RefCell<Option<String>>,
        pub push_during_fetch: RefCell<Option<Session>>,
        pub calls: Cell<usize>,
    }

    impl FakeAuth {
        fn check(&self) -> Result<(), AuthError> {
            self.calls.set(self.calls.get() + 1);
            match self.fail_with.borrow().clone() {
                Some(msg) => Err(AuthError::rejected(msg)),
                None => Ok(()),
            }
        }

        pub fn push(&self, event: AuthEvent, session: Option<Session>) {
            *self.stored.borrow_mut() = session.clone();
            self.listeners.notify(&AuthChange { event, session });
        }
    }

    impl AuthBackend for FakeAuth {
        async fn get_session(&self) -> Result<Option<Session>, AuthError> {
            self.check()?;
            let stale = self.stored.borrow().clone();
            if let Some(pushed) = self.push_during_fetch.borrow_mut().take() {
                self.push(AuthEvent::SignedIn, Some(pushed));
            }
            Ok(stale)
        }

        fn on_auth_state_change(&self, listener: impl Fn(&AuthChange) + 'static) -> Subscription {
            self.listeners.subscribe(listener)
        }

        async fn sign_in_with_password(
            &self,
            email: &str,
            _password: &str,
        ) -> Result<Session, AuthError> {
            self.check()?;
            let user_id = email.split('@').next().unwrap_or_default();
            let session = session_for(user_id);
            self.push(AuthEvent::SignedIn, Some(session.clone()));
            Ok(session)
        }

        async fn sign_up(&self, _email: &str, _password: &str) -> Result<Option<Session>, AuthError> {
            self.check()?;
            Ok(None)
        }

        async fn sign_out(&self) -> Result<(), AuthError> {
            self.check()?;
            self.push(AuthEvent::SignedOut, None);
            Ok(())
        }

        async fn sign_in_with_oauth(
            &self,
            _provider: OAuthProvider,
            _redirect_to: Option<&str>,
        ) -> Result<(), AuthError> {
            self.check()
        }
    }
}

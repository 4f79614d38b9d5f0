//! Thin wrapper around an external identity provider.
//!
//! The provider is a black box; this module validates input, makes exactly
//! one call per operation and turns provider error codes into user-facing text.

use std::fmt;

use thiserror::Error;
use tracing::{info, warn};

/// Third-party sign-in options offered on the login screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FederatedProvider {
    Google,
    Apple,
    Facebook,
}

impl fmt::Display for FederatedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FederatedProvider::Google => "Google",
            FederatedProvider::Apple => "Apple",
            FederatedProvider::Facebook => "Facebook",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub user_id: String,
    /// `false` while a confirmation code is still outstanding.
    pub confirmed: bool,
}

/// Failure reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

pub trait IdentityProvider: Send + Sync {
    fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, ProviderError>;
    fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), ProviderError>;
    fn sign_in(&self, email: &str, password: &str) -> Result<Session, ProviderError>;
    fn sign_out(&self) -> Result<(), ProviderError>;
    fn reset_password(&self, email: &str) -> Result<(), ProviderError>;
    fn confirm_reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), ProviderError>;
    /// Starts the provider's redirect flow.
    fn federated_sign_in(&self, provider: FederatedProvider) -> Result<(), ProviderError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(String),
    /// Provider failure translated for display.
    #[error("{message}")]
    Provider { code: String, message: String },
}

const MIN_PASSWORD_LEN: usize = 8;

const MESSAGES: &[(&str, &str)] = &[
    ("UserNotFoundException", "No account exists for this email."),
    ("NotAuthorizedException", "Incorrect email or password."),
    ("UsernameExistsException", "An account with this email already exists."),
    ("CodeMismatchException", "The verification code is incorrect."),
    ("ExpiredCodeException", "The verification code has expired. Request a new one."),
    (
        "InvalidPasswordException",
        "Password must be at least 8 characters and include a number and a symbol.",
    ),
    ("UserNotConfirmedException", "Please confirm your email before signing in."),
    ("LimitExceededException", "Too many attempts. Please try again later."),
    ("TooManyRequestsException", "Too many attempts. Please try again later."),
    ("InvalidParameterException", "Some of the details entered are invalid."),
    ("NetworkError", "Unable to reach the server. Check your connection."),
];

/// User-facing text for a provider error code, if the code is known.
pub fn message_for_code(code: &str) -> Option<&'static str> {
    MESSAGES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, message)| *message)
}

impl From<ProviderError> for AuthError {
    fn from(err: ProviderError) -> Self {
        let message = message_for_code(&err.code)
            .map(str::to_string)
            .unwrap_or(err.message);
        AuthError::Provider {
            code: err.code,
            message,
        }
    }
}

pub struct AuthService<P> {
    provider: P,
}

impl<P: IdentityProvider> AuthService<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let email = validate_email(email)?;
        validate_password(password)?;
        let outcome = self
            .provider
            .sign_up(&email, password)
            .map_err(|err| report("sign_up", err))?;
        info!(user = %outcome.user_id, confirmed = outcome.confirmed, "signed up");
        Ok(outcome)
    }

    pub fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), AuthError> {
        let email = validate_email(email)?;
        let code = validate_code(code)?;
        self.provider
            .confirm_sign_up(&email, code)
            .map_err(|err| report("confirm_sign_up", err))?;
        info!("sign-up confirmed");
        Ok(())
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = validate_email(email)?;
        if password.is_empty() {
            return Err(AuthError::InvalidInput("Password is required.".into()));
        }
        let session = self
            .provider
            .sign_in(&email, password)
            .map_err(|err| report("sign_in", err))?;
        info!(user = %session.user_id, "signed in");
        Ok(session)
    }

    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.provider
            .sign_out()
            .map_err(|err| report("sign_out", err))?;
        info!("signed out");
        Ok(())
    }

    pub fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let email = validate_email(email)?;
        self.provider
            .reset_password(&email)
            .map_err(|err| report("reset_password", err))
    }

    pub fn confirm_reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let email = validate_email(email)?;
        let code = validate_code(code)?;
        validate_password(new_password)?;
        self.provider
            .confirm_reset_password(&email, code, new_password)
            .map_err(|err| report("confirm_reset_password", err))?;
        info!("password reset confirmed");
        Ok(())
    }

    pub fn federated_sign_in(&self, provider: FederatedProvider) -> Result<(), AuthError> {
        self.provider
            .federated_sign_in(provider)
            .map_err(|err| report("federated_sign_in", err))?;
        info!(%provider, "federated sign-in started");
        Ok(())
    }
}

fn report(operation: &str, err: ProviderError) -> AuthError {
    warn!(operation, code = %err.code, "identity provider call failed");
    err.into()
}

fn validate_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email.to_lowercase())
    } else {
        Err(AuthError::InvalidInput("Enter a valid email address.".into()))
    }
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    Ok(())
}

fn validate_code(code: &str) -> Result<&str, AuthError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(AuthError::InvalidInput("Verification code is required.".into()));
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeProvider {
        calls: Mutex<Vec<String>>,
        fail_with: Option<ProviderError>,
    }

    impl FakeProvider {
        fn failing(code: &str, message: &str) -> Self {
            Self {
                fail_with: Some(ProviderError::new(code, message)),
                ..Self::default()
            }
        }

        fn record(&self, call: &str) -> Result<(), ProviderError> {
            self.calls.lock().unwrap().push(call.to_string());
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl IdentityProvider for FakeProvider {
        fn sign_up(&self, email: &str, _password: &str) -> Result<SignUpOutcome, ProviderError> {
            self.record("sign_up")?;
            Ok(SignUpOutcome {
                user_id: format!("user-{email}"),
                confirmed: false,
            })
        }

        fn confirm_sign_up(&self, _email: &str, _code: &str) -> Result<(), ProviderError> {
            self.record("confirm_sign_up")
        }

        fn sign_in(&self, email: &str, _password: &str) -> Result<Session, ProviderError> {
            self.record("sign_in")?;
            Ok(Session {
                user_id: "user-1".into(),
                email: email.into(),
            })
        }

        fn sign_out(&self) -> Result<(), ProviderError> {
            self.record("sign_out")
        }

        fn reset_password(&self, _email: &str) -> Result<(), ProviderError> {
            self.record("reset_password")
        }

        fn confirm_reset_password(
            &self,
            _email: &str,
            _code: &str,
            _new_password: &str,
        ) -> Result<(), ProviderError> {
            self.record("confirm_reset_password")
        }

        fn federated_sign_in(&self, provider: FederatedProvider) -> Result<(), ProviderError> {
            self.record(&format!("federated:{provider}"))
        }
    }

    #[test]
    fn sign_in_normalises_email() {
        let auth = AuthService::new(FakeProvider::default());
        let session = auth.sign_in("  Sam@Example.com ", "hunter22!").unwrap();
        assert_eq!(session.email, "sam@example.com");
        assert_eq!(auth.provider().calls(), vec!["sign_in"]);
    }

    #[test]
    fn invalid_input_never_reaches_provider() {
        let auth = AuthService::new(FakeProvider::default());
        assert!(matches!(
            auth.sign_up("not-an-email", "long-enough-1"),
            Err(AuthError::InvalidInput(_))
        ));
        assert!(matches!(
            auth.sign_up("sam@example.com", "short"),
            Err(AuthError::InvalidInput(_))
        ));
        assert!(matches!(
            auth.confirm_sign_up("sam@example.com", "  "),
            Err(AuthError::InvalidInput(_))
        ));
        assert!(auth.provider().calls().is_empty());
    }

    #[test]
    fn known_codes_map_to_friendly_messages() {
        let auth = AuthService::new(FakeProvider::failing(
            "NotAuthorizedException",
            "Incorrect username or password.",
        ));
        let err = auth.sign_in("sam@example.com", "wrong-pass").unwrap_err();
        assert_eq!(err.to_string(), "Incorrect email or password.");
        assert_eq!(auth.provider().calls().len(), 1);
    }

    #[test]
    fn unknown_codes_fall_back_to_provider_message() {
        let auth = AuthService::new(FakeProvider::failing("Weird", "Something odd happened"));
        let err = auth.reset_password("sam@example.com").unwrap_err();
        assert_eq!(
            err,
            AuthError::Provider {
                code: "Weird".into(),
                message: "Something odd happened".into(),
            }
        );
    }

    #[test]
    fn federated_sign_in_passes_provider_through() {
        let auth = AuthService::new(FakeProvider::default());
        auth.federated_sign_in(FederatedProvider::Apple).unwrap();
        auth.sign_out().unwrap();
        assert_eq!(auth.provider().calls(), vec!["federated:Apple", "sign_out"]);
    }
}

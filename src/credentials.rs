//! API key storage
//!
//! The Weather API key is looked up in the `WEATHER_API_KEY` environment
//! variable first, then in the OS keyring. `--setup` stores a key in the
//! keyring after reading it from the terminal without echo.

use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use thiserror::Error;
use tracing::debug;

const SERVICE_NAME: &str = "weather-cli";
const API_KEY_NAME: &str = "api-key";

/// Environment variable that takes precedence over the keyring
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("No API key configured. Run 'weather-cli --setup' or set WEATHER_API_KEY")]
    NoApiKey,

    #[error("OS keyring is not available on this system. Set WEATHER_API_KEY instead: {0}")]
    KeyringUnavailable(#[source] keyring::Error),

    #[error("Keyring error: {0}")]
    Keyring(#[source] keyring::Error),

    #[error("API key cannot be empty")]
    EmptyKey,

    #[error("Failed to read API key: {0}")]
    Prompt(#[from] io::Error),
}

impl From<keyring::Error> for CredentialsError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) => {
                CredentialsError::KeyringUnavailable(err)
            }
            other => CredentialsError::Keyring(other),
        }
    }
}

/// Returns the configured API key
pub fn api_key() -> Result<String, CredentialsError> {
    resolve_api_key(std::env::var(API_KEY_ENV).ok(), || {
        keyring_entry()?.get_password()
    })
}

/// Picks the environment value if set, otherwise asks the keyring
fn resolve_api_key<F>(env_value: Option<String>, stored: F) -> Result<String, CredentialsError>
where
    F: FnOnce() -> Result<String, keyring::Error>,
{
    if let Some(key) = env_value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        debug!("Using API key from environment");
        return Ok(key);
    }

    match stored() {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        Ok(_) | Err(keyring::Error::NoEntry) => Err(CredentialsError::NoApiKey),
        Err(e) => Err(e.into()),
    }
}

/// Stores `key` in the OS keyring
pub fn store_api_key(key: &str) -> Result<(), CredentialsError> {
    let key = validate_key(key)?;
    keyring_entry()?.set_password(&key)?;
    Ok(())
}

/// Removes the stored key; deleting a missing key is not an error
pub fn delete_api_key() -> Result<(), CredentialsError> {
    match keyring_entry()?.delete_password() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Interactive setup: prompts for a key and stores it
pub fn run_setup() -> Result<(), CredentialsError> {
    println!("Get a free API key from https://www.weatherapi.com/");
    println!();

    let key = prompt_for_api_key()?;
    store_api_key(&key)?;

    println!("API key stored securely in OS keyring.");
    Ok(())
}

/// Reads an API key from the terminal without echoing it
pub fn prompt_for_api_key() -> Result<String, CredentialsError> {
    print!("Enter your Weather API key: ");
    io::stdout().flush()?;

    let input = if io::stdin().is_terminal() {
        let input = read_hidden_line();
        println!();
        input?
    } else {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        line
    };

    validate_key(&input)
}

fn validate_key(key: &str) -> Result<String, CredentialsError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(CredentialsError::EmptyKey);
    }
    Ok(key.to_string())
}

fn keyring_entry() -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(SERVICE_NAME, API_KEY_NAME)
}

fn read_hidden_line() -> io::Result<String> {
    terminal::enable_raw_mode()?;
    let result = read_keys_until_enter();
    terminal::disable_raw_mode()?;
    result
}

fn read_keys_until_enter() -> io::Result<String> {
    let mut input = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        else {
            continue;
        };
        if kind == KeyEventKind::Release {
            continue;
        }

        match code {
            KeyCode::Enter => return Ok(input),
            KeyCode::Esc => return Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled")),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled"));
            }
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(c) => input.push(c),
            _ => {}
        }
    }
}

/// Portal controller
///
/// The non-visual half of the upload/browse pages. A UI calls these methods
/// and renders what they return; every catalog action needs the session
/// token issued at login.

use chrono::Utc;
use tracing::info;

use crate::auth::{AuthOutcome, SessionGate, SessionToken};
use crate::error::{Error, Result};
use crate::state::{ImageRecord, RecordStore};
use crate::upload;

pub const UPLOAD_SUCCESS: &str = "Image successfully uploaded!";
pub const LOGIN_FAILED: &str = "Authentication failed. Please check your credentials.";
pub const LOGIN_PROMPT: &str = "Please log in to continue.";
pub const EMPTY_CATALOG: &str = "No images uploaded yet.";

/// Banner for the current login outcome
pub fn greeting(outcome: &AuthOutcome) -> String {
    match outcome {
        AuthOutcome::Authenticated(name) => format!("Welcome {name}!"),
        AuthOutcome::Rejected => LOGIN_FAILED.to_string(),
        AuthOutcome::Pending => LOGIN_PROMPT.to_string(),
    }
}

/// User-facing message for a failed action
pub fn failure_message(err: &Error) -> String {
    match err {
        Error::Unauthorized => LOGIN_PROMPT.to_string(),
        Error::UnsupportedFile { file_name } => format!(
            "{file_name} is not an accepted image type ({}).",
            upload::ACCEPTED_EXTENSIONS.join(", ")
        ),
        Error::InvalidImage { file_name, .. } => format!("{file_name} could not be read as an image."),
        err if err.is_storage() => format!("The image database is unavailable, please try again. ({err})"),
        err => format!("Something went wrong: {err}"),
    }
}

pub struct Portal {
    gate: SessionGate,
    store: RecordStore,
}

impl Portal {
    pub fn new(gate: SessionGate, store: RecordStore) -> Self {
        Self { gate, store }
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Validate and store an upload, returning the new record id
    pub fn upload(
        &self,
        token: Option<&SessionToken>,
        disease_name: &str,
        file_name: &str,
        image_bytes: &[u8],
    ) -> Result<i64> {
        let token = self.authorize(token)?;
        upload::validate_upload(file_name, image_bytes)?;

        self.store.initialize()?;
        let id = self.store.create(disease_name, file_name, image_bytes)?;
        info!(id, user = token.username(), "upload accepted");
        Ok(id)
    }

    /// Every stored record; re-fetch after each mutation
    pub fn browse(&self, token: Option<&SessionToken>) -> Result<Vec<ImageRecord>> {
        self.authorize(token)?;
        self.store.initialize()?;
        self.store.list_all()
    }

    pub fn view(&self, token: Option<&SessionToken>, id: i64) -> Result<Option<ImageRecord>> {
        self.authorize(token)?;
        self.store.get(id)
    }

    pub fn rename(&self, token: Option<&SessionToken>, id: i64, new_name: &str) -> Result<()> {
        let token = self.authorize(token)?;
        self.store.update_disease_name(id, new_name)?;
        info!(id, user = token.username(), new_name, "disease name changed");
        Ok(())
    }

    pub fn remove(&self, token: Option<&SessionToken>, id: i64) -> Result<()> {
        let token = self.authorize(token)?;
        self.store.delete(id)?;
        info!(id, user = token.username(), "image removed");
        Ok(())
    }

    /// The token, if this portal's gate still accepts it
    fn authorize<'t>(&self, token: Option<&'t SessionToken>) -> Result<&'t SessionToken> {
        let now = Utc::now();
        token
            .filter(|t| self.gate.accepts(t, now))
            .ok_or(Error::Unauthorized)
    }
}

impl std::fmt::Debug for Portal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Portal").field("store", &self.store).finish_non_exhaustive()
    }
}

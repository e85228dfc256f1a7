//! Wiring of the authorizer, sequencer and presenter for one process run.

use std::io::Write;
use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::presenter::TerminalPresenter;
use crate::config::TrackerConfig;
use crate::domain::{
    Authorizer, MealDraft, PhotoFile, SubmissionOutcome, SubmissionPorts, SubmissionSequencer,
};
use crate::outbound::drive::DriveHttpPhotoStore;
use crate::outbound::oauth::{LoopbackConsentFlow, LoopbackConsentSettings};
use crate::outbound::sheets::SheetsHttpLog;

/// Authorizer and sequencer shared by the `log` and `session` commands.
pub struct App<W> {
    authorizer: Arc<Authorizer>,
    sequencer: SubmissionSequencer,
    presenter: Arc<TerminalPresenter<W>>,
}

impl<W: Write + Send + 'static> App<W> {
    /// Build the Google adapters from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when a reqwest client cannot be constructed.
    pub fn from_config(
        config: &TrackerConfig,
        clock: Arc<dyn Clock>,
        presenter: Arc<TerminalPresenter<W>>,
    ) -> Result<Self, reqwest::Error> {
        let consent = LoopbackConsentFlow::new(
            LoopbackConsentSettings {
                client_secret: config.client_secret.clone(),
                auth_endpoint: config.endpoints.auth.clone(),
                token_endpoint: config.endpoints.token.clone(),
                redirect_port: config.redirect_port,
                consent_timeout: config.consent_timeout,
                request_timeout: config.request_timeout,
            },
            clock.clone(),
            presenter.clone(),
        )?;
        let authorizer = Arc::new(Authorizer::new(
            Arc::new(consent),
            clock.clone(),
            config.client_id.clone(),
        ));

        let photo_store =
            DriveHttpPhotoStore::new(config.endpoints.upload.clone(), config.request_timeout)?;
        let mut sheet_log =
            SheetsHttpLog::new(config.endpoints.sheets.clone(), config.request_timeout)?;
        if let Some(api_key) = &config.api_key {
            sheet_log = sheet_log.with_api_key(api_key.as_str());
        }
        let sequencer = SubmissionSequencer::new(
            authorizer.clone(),
            SubmissionPorts {
                photo_store: Arc::new(photo_store),
                sheet_log: Arc::new(sheet_log),
            },
            clock,
            config.target.clone(),
        );

        Ok(Self::new(authorizer, sequencer, presenter))
    }
}

impl<W: Write + Send> App<W> {
    /// Assemble from prebuilt parts.
    #[must_use]
    pub const fn new(
        authorizer: Arc<Authorizer>,
        sequencer: SubmissionSequencer,
        presenter: Arc<TerminalPresenter<W>>,
    ) -> Self {
        Self {
            authorizer,
            sequencer,
            presenter,
        }
    }

    /// Presenter used for every user-visible line.
    #[must_use]
    pub fn presenter(&self) -> &TerminalPresenter<W> {
        &self.presenter
    }

    /// Run consent unless a usable credential is already held.
    ///
    /// Returns whether the user is signed in afterwards.
    pub async fn sign_in(&self) -> bool {
        if self.authorizer.is_authorized() {
            return true;
        }
        match self.authorizer.ensure_authorized().await {
            Ok(_) => {
                self.presenter.signed_in();
                true
            }
            Err(error) => {
                self.presenter.sign_in_failed(&error);
                false
            }
        }
    }

    /// Sign in if needed, then submit one entry and report the outcome.
    ///
    /// A rejected credential is not retried here; the authorizer is cleared
    /// and the next call prompts for consent again.
    pub async fn save(&mut self, draft: &MealDraft, photo: &PhotoFile) -> SubmissionOutcome {
        if !self.sign_in().await {
            let outcome = SubmissionOutcome::NotAuthorized(Some(
                "Please sign in with Google first".to_owned(),
            ));
            self.presenter.outcome(&outcome);
            return outcome;
        }

        self.presenter.saving();
        let outcome = self.sequencer.submit(draft, photo).await;
        info!(
            success = outcome.is_success(),
            requires_consent = outcome.requires_consent(),
            "submission finished"
        );
        self.presenter.outcome(&outcome);
        outcome
    }
}

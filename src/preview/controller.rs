//! Profile form controller
//!
//! Bridges persisted profile data, the two pattern-pair copies, the sample
//! input, and the submit/validation lifecycle. The controller owns the
//! debounce worker and the (best-effort) sample seeding task; the host UI
//! owns the transport and the profile store and passes them in.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::config::PreviewConfig;
use crate::errors::types::{AppError, FieldError};
use crate::models::{
    merge_notes, PatternPair, PreviewResult, Profile, ProfileCreateRequest, ProfileTestRequest,
    ProfileUpdateRequest,
};
use crate::preview::channel::LivePreviewChannel;
use crate::preview::debounce::Debouncer;
use crate::preview::evaluator;

/// Persistence collaborator for profiles (REST client, database, ...)
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn create_profile(
        &self,
        playlist_id: Uuid,
        request: ProfileCreateRequest,
    ) -> Result<Profile, AppError>;

    async fn update_profile(
        &self,
        playlist_id: Uuid,
        request: ProfileUpdateRequest,
    ) -> Result<Profile, AppError>;

    async fn delete_profile(&self, playlist_id: Uuid, profile_id: Uuid) -> Result<(), AppError>;
}

/// Backend query for a real stream URL to seed the sample input with.
/// Implementations page through the playlist's streams; only the first
/// result is used.
#[async_trait]
pub trait SampleUrlProvider: Send + Sync {
    async fn first_stream_url(&self, playlist_id: Uuid) -> Result<Option<String>, AppError>;
}

/// Form lifecycle per mount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Editing,
    Submitting,
}

/// Plain form fields outside the pattern pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFormFields {
    pub name: String,
    pub max_streams: u32,
    pub is_backup_only: bool,
    pub notes: String,
}

/// State shared with the seeding task: the stabilized pair, the sample the
/// user (or the seed) supplied, and the authoritative stream URL.
#[derive(Debug, Default)]
struct PreviewState {
    stabilized: PatternPair,
    sample: String,
    stream_url: Option<String>,
}

pub struct ProfileFormController {
    store: Arc<dyn ProfileStore>,
    samples: Arc<dyn SampleUrlProvider>,
    channel: LivePreviewChannel,
    playlist_id: Uuid,

    profile: Option<Profile>,
    fields: ProfileFormFields,
    state: FormState,

    /// Updated on every keystroke, drives the local preview
    immediate: PatternPair,
    preview_state: Arc<RwLock<PreviewState>>,

    debouncer: Debouncer<PatternPair>,
    stabilized_rx: mpsc::UnboundedReceiver<PatternPair>,

    /// Bumped on every load/reset; in-flight async results from an older
    /// generation are discarded, never applied
    generation: Arc<AtomicU64>,
    seed_requested: bool,
    seed_task: Option<JoinHandle<()>>,
}

impl ProfileFormController {
    pub fn new(
        config: &PreviewConfig,
        playlist_id: Uuid,
        store: Arc<dyn ProfileStore>,
        samples: Arc<dyn SampleUrlProvider>,
        channel: LivePreviewChannel,
    ) -> Self {
        let (stabilized_tx, stabilized_rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::spawn(config.debounce_window(), stabilized_tx);

        Self {
            store,
            samples,
            channel,
            playlist_id,
            profile: None,
            fields: ProfileFormFields::default(),
            state: FormState::Idle,
            immediate: PatternPair::default(),
            preview_state: Arc::new(RwLock::new(PreviewState::default())),
            debouncer,
            stabilized_rx,
            generation: Arc::new(AtomicU64::new(0)),
            seed_requested: false,
            seed_task: None,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn fields(&self) -> &ProfileFormFields {
        &self.fields
    }

    pub fn immediate(&self) -> &PatternPair {
        &self.immediate
    }

    pub async fn stabilized(&self) -> PatternPair {
        self.preview_state.read().await.stabilized.clone()
    }

    pub async fn sample(&self) -> String {
        self.preview_state.read().await.sample.clone()
    }

    pub async fn stream_url(&self) -> Option<String> {
        self.preview_state.read().await.stream_url.clone()
    }

    /// Begin editing `profile`, or begin create mode with `None`.
    ///
    /// Resets all local state to the profile's persisted values (or empty
    /// defaults), cancels any pending debounce emission, and invalidates
    /// in-flight async results from the previous mount.
    pub async fn load(&mut self, profile: Option<Profile>) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.debouncer.cancel();
        while self.stabilized_rx.try_recv().is_ok() {}

        match &profile {
            Some(p) => {
                self.fields = ProfileFormFields {
                    name: p.name.clone(),
                    max_streams: p.max_streams,
                    is_backup_only: p.is_backup_only,
                    notes: p.notes().to_string(),
                };
                self.immediate = p.pattern_pair();
            }
            None => {
                self.fields = ProfileFormFields::default();
                self.immediate = PatternPair::default();
            }
        }

        {
            let mut state = self.preview_state.write().await;
            state.stabilized = self.immediate.clone();
            state.sample.clear();
            state.stream_url = None;
        }

        self.profile = profile;
        self.state = FormState::Idle;
        self.seed_requested = false;
    }

    /// Best-effort, one-shot per mount: fetch the first stream URL of the
    /// owning playlist and seed the sample input with it. Failures are
    /// logged and leave the sample empty; a result arriving after the next
    /// `load` is discarded.
    pub fn seed_sample(&mut self) {
        if self.seed_requested {
            return;
        }
        self.seed_requested = true;

        let samples = Arc::clone(&self.samples);
        let playlist_id = self.playlist_id;
        let generation = Arc::clone(&self.generation);
        let expected_generation = generation.load(Ordering::SeqCst);
        let preview_state = Arc::clone(&self.preview_state);
        let channel = self.channel.clone();

        self.seed_task = Some(tokio::spawn(async move {
            let url = match samples.first_stream_url(playlist_id).await {
                Ok(Some(url)) => url,
                Ok(None) => {
                    debug!("Playlist {} has no streams to seed a sample from", playlist_id);
                    return;
                }
                Err(e) => {
                    warn!("Failed to fetch sample stream URL: {}", e);
                    return;
                }
            };

            if Url::parse(&url).is_err() {
                warn!("Ignoring unparseable sample stream URL '{}'", url);
                return;
            }

            {
                let mut state = preview_state.write().await;
                // checked under the lock: a concurrent `load` bumps the
                // generation before taking this lock, so a stale result can
                // never be installed into the fresh mount
                if generation.load(Ordering::SeqCst) != expected_generation {
                    debug!("Discarding stale sample stream URL for a torn-down form");
                    return;
                }
                state.stream_url = Some(url.clone());
                if state.sample.is_empty() {
                    state.sample = url;
                }
            }

            dispatch_test(&preview_state, &channel).await;
        }));
    }

    /// Await the in-flight seed task, if any. Intended for hosts that want
    /// a deterministic point after which the sample is settled.
    pub async fn await_sample_seed(&mut self) {
        if let Some(task) = self.seed_task.take() {
            let _ = task.await;
        }
    }

    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.fields.name = name.into();
        self.mark_editing();
    }

    pub fn set_max_streams(&mut self, max_streams: u32) {
        self.fields.max_streams = max_streams;
        self.mark_editing();
    }

    pub fn set_backup_only(&mut self, is_backup_only: bool) {
        self.fields.is_backup_only = is_backup_only;
        self.mark_editing();
    }

    pub fn set_notes<S: Into<String>>(&mut self, notes: S) {
        self.fields.notes = notes.into();
        self.mark_editing();
    }

    /// Keystroke in the search field: updates the immediate pair and
    /// restarts the debounce window.
    pub fn edit_search<S: Into<String>>(&mut self, search: S) {
        self.immediate.search = search.into();
        self.mark_editing();
        self.debouncer.update(self.immediate.clone());
    }

    /// Keystroke in the replace field: updates the immediate pair and
    /// restarts the debounce window.
    pub fn edit_replace<S: Into<String>>(&mut self, replace: S) {
        self.immediate.replace = replace.into();
        self.mark_editing();
        self.debouncer.update(self.immediate.clone());
    }

    /// User-supplied sample input; triggers a fresh test request.
    pub async fn set_sample<S: Into<String>>(&mut self, sample: S) {
        {
            let mut state = self.preview_state.write().await;
            state.sample = sample.into();
        }
        self.dispatch().await;
    }

    /// Authoritative stream URL changed; triggers a fresh test request.
    pub async fn set_stream_url<S: Into<String>>(&mut self, url: S) {
        {
            let mut state = self.preview_state.write().await;
            state.stream_url = Some(url.into());
        }
        self.dispatch().await;
    }

    /// The shared transport (re)connected; triggers a fresh test request.
    pub async fn on_transport_ready(&self) {
        self.dispatch().await;
    }

    /// Await the next debounced pattern pair, record it as stabilized and
    /// trigger a test request. Returns `None` only if the debounce worker
    /// is gone.
    pub async fn next_stabilized(&mut self) -> Option<PatternPair> {
        let pair = self.stabilized_rx.recv().await?;
        self.apply_stabilized(pair.clone()).await;
        Some(pair)
    }

    /// Record a stabilized pair and trigger a test request.
    pub async fn apply_stabilized(&mut self, pair: PatternPair) {
        {
            let mut state = self.preview_state.write().await;
            state.stabilized = pair;
        }
        self.dispatch().await;
    }

    /// Local preview of the current sample against the immediate pair.
    /// Cheap enough to recompute on every keystroke.
    pub async fn preview(&self) -> PreviewResult {
        let state = self.preview_state.read().await;
        PreviewResult {
            highlighted: evaluator::highlight_matches(&state.sample, &self.immediate.search),
            replaced: evaluator::apply_replace(
                &state.sample,
                &self.immediate.search,
                &self.immediate.replace,
            ),
        }
    }

    /// Validate the form fields for submission.
    ///
    /// Name is always required. For non-default profiles the search and
    /// replace patterns are required too; for default profiles the rewrite
    /// and limit fields are fixed and never checked. Evaluated fresh on
    /// every call.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let is_default = self.profile.as_ref().is_some_and(|p| p.is_default);
        let mut errors = Vec::new();

        if self.fields.name.trim().is_empty() {
            errors.push(FieldError::required("name"));
        }

        if !is_default {
            if self.immediate.search.is_empty() {
                errors.push(FieldError::required("search_pattern"));
            }
            if self.immediate.replace.is_empty() {
                errors.push(FieldError::required("replace_pattern"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and persist the form.
    ///
    /// Default profiles submit only name and custom properties (with notes
    /// merged into the pre-existing map); everything else submits the full
    /// payload. Presence of a profile id selects update over create. On
    /// success the form resets to create mode; on failure it stays editable
    /// for resubmission.
    pub async fn submit(&mut self) -> Result<Profile, AppError> {
        self.state = FormState::Submitting;

        if let Err(fields) = self.validate() {
            self.state = FormState::Editing;
            return Err(AppError::validation(fields));
        }

        let is_default = self.profile.as_ref().is_some_and(|p| p.is_default);
        let custom_properties = merge_notes(
            self.profile.as_ref().map(|p| &p.custom_properties),
            &self.fields.notes,
        );

        let (max_streams, is_backup_only, search_pattern, replace_pattern) = if is_default {
            (None, None, None, None)
        } else {
            (
                Some(self.fields.max_streams),
                Some(self.fields.is_backup_only),
                Some(self.immediate.search.clone()),
                Some(self.immediate.replace.clone()),
            )
        };

        let result = match self.profile.as_ref().map(|p| p.id) {
            Some(id) => {
                self.store
                    .update_profile(
                        self.playlist_id,
                        ProfileUpdateRequest {
                            id,
                            name: self.fields.name.clone(),
                            max_streams,
                            is_backup_only,
                            search_pattern,
                            replace_pattern,
                            custom_properties,
                        },
                    )
                    .await
            }
            None => {
                self.store
                    .create_profile(
                        self.playlist_id,
                        ProfileCreateRequest {
                            name: self.fields.name.clone(),
                            max_streams,
                            is_backup_only,
                            search_pattern,
                            replace_pattern,
                            custom_properties,
                        },
                    )
                    .await
            }
        };

        match result {
            Ok(profile) => {
                debug!("Profile '{}' saved", profile.name);
                self.load(None).await;
                Ok(profile)
            }
            Err(e) => {
                self.state = FormState::Editing;
                Err(e)
            }
        }
    }

    /// Delete the loaded profile. Default profiles are system-managed and
    /// cannot be deleted.
    pub async fn delete(&mut self) -> Result<(), AppError> {
        let (profile_id, is_default) = match &self.profile {
            Some(p) => (p.id, p.is_default),
            None => return Err(AppError::internal("no profile loaded to delete")),
        };

        if is_default {
            return Err(AppError::permission_denied("delete", "default profile"));
        }

        self.store
            .delete_profile(self.playlist_id, profile_id)
            .await?;
        self.load(None).await;
        Ok(())
    }

    fn mark_editing(&mut self) {
        if self.state == FormState::Idle {
            self.state = FormState::Editing;
        }
    }

    async fn dispatch(&self) {
        dispatch_test(&self.preview_state, &self.channel).await;
    }
}

impl Drop for ProfileFormController {
    fn drop(&mut self) {
        if let Some(task) = self.seed_task.take() {
            task.abort();
        }
    }
}

/// Build and send one test request from the current stabilized pair and the
/// current sample, falling back to the authoritative stream URL when no
/// sample has been entered.
async fn dispatch_test(preview_state: &RwLock<PreviewState>, channel: &LivePreviewChannel) {
    let request = {
        let state = preview_state.read().await;
        let url = if !state.sample.is_empty() {
            state.sample.clone()
        } else {
            state.stream_url.clone().unwrap_or_default()
        };
        ProfileTestRequest::new(url, state.stabilized.search.clone(), state.stabilized.replace.clone())
    };
    channel.send_test_request(request);
}

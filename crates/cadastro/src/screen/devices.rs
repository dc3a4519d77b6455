//! Device registration screen: the device form plus the owner's device list.

use tracing::{debug, error, warn};

use super::{DeviceForm, FormScreen, Phase, ScreenContext, SubmitOutcome};
use crate::form::{DeviceDraft, DeviceField};
use crate::record::{Collection, StoredDevice};
use crate::render::{DeviceCard, FormView};

/// The `/devices` screen.
#[derive(Debug)]
pub struct DeviceScreen {
    form: FormScreen<DeviceForm>,
    devices: Vec<StoredDevice>,
}

impl DeviceScreen {
    /// Mount the screen.
    #[must_use]
    pub fn mount(ctx: ScreenContext) -> Self {
        Self {
            form: FormScreen::mount(ctx),
            devices: Vec::new(),
        }
    }

    /// Resolve the session and, once authenticated, load the device list.
    pub async fn start(&mut self) -> Phase {
        let phase = self.form.start().await;
        if phase == Phase::Ready {
            self.refresh().await;
        }
        phase
    }

    /// Re-query every device owned by the current user.
    ///
    /// On failure the current list is kept.
    pub async fn refresh(&mut self) {
        let Some(uid) = self.form.session().map(|s| s.uid.clone()) else {
            return;
        };
        let lifetime = self.form.lifetime();

        let result = self
            .form
            .context()
            .store
            .query_eq(Collection::Devices, "userId", &uid)
            .await;

        if !lifetime.is_active() {
            debug!("Screen unmounted during refresh, dropping result");
            return;
        }

        match result {
            Ok(docs) => {
                self.devices = docs
                    .iter()
                    .filter_map(|doc| match StoredDevice::try_from(doc) {
                        Ok(device) if device.record.user_id == uid => Some(device),
                        Ok(device) => {
                            warn!(id = %device.id, "Skipping device owned by another user");
                            None
                        }
                        Err(e) => {
                            warn!(id = %doc.id, error = %e, "Skipping malformed device");
                            None
                        }
                    })
                    .collect();
                debug!(count = self.devices.len(), "Device list refreshed");
            }
            Err(e) => error!(error = %e, "Erro ao carregar dispositivos"),
        }
    }

    /// Wait for the next session change and apply it.
    ///
    /// A sign-out empties the list; any session notification reloads it.
    /// Returns `None` when no further changes can arrive.
    pub async fn follow_session(&mut self) -> Option<Phase> {
        let phase = self.form.follow_session().await?;
        self.session_changed(phase).await;
        Some(phase)
    }

    /// Apply a session notification that was already published, without
    /// waiting for one.
    pub async fn sync_session(&mut self) -> Option<Phase> {
        let phase = self.form.sync_session()?;
        self.session_changed(phase).await;
        Some(phase)
    }

    async fn session_changed(&mut self, phase: Phase) {
        if phase == Phase::Redirected {
            self.devices.clear();
        } else if phase.shows_content() {
            self.refresh().await;
        }
    }

    /// Submit the device draft; a created record triggers a full refresh.
    pub async fn submit(&mut self) -> SubmitOutcome {
        self.sync_session().await;
        let outcome = self.form.submit().await;
        if matches!(outcome, SubmitOutcome::Created(_)) {
            self.refresh().await;
        }
        outcome
    }

    /// Apply an input change.
    pub fn update(&mut self, field: DeviceField, value: impl Into<String>) -> bool {
        self.form.update(field, value)
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.form.phase()
    }

    /// The draft, while the form is shown.
    #[must_use]
    pub fn draft(&self) -> Option<&DeviceDraft> {
        self.form.draft()
    }

    /// The loaded devices, in creation order.
    #[must_use]
    pub fn devices(&self) -> &[StoredDevice] {
        &self.devices
    }

    /// Cards for the device list. Empty while loading or redirected.
    #[must_use]
    pub fn cards(&self) -> Vec<DeviceCard> {
        if !self.form.phase().shows_content() {
            return Vec::new();
        }
        self.devices.iter().map(DeviceCard::from).collect()
    }

    /// The form part of the screen.
    #[must_use]
    pub fn view(&self) -> Option<FormView> {
        self.form.view()
    }

    /// The underlying form screen.
    #[must_use]
    pub fn form(&self) -> &FormScreen<DeviceForm> {
        &self.form
    }

    /// The "Voltar" action.
    pub fn go_back(&self) {
        self.form.go_back();
    }

    /// Unmount the screen.
    pub fn unmount(&mut self) {
        self.form.unmount();
    }
}

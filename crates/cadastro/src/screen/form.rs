//! Form screens and the submission workflow they share.

use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::{GateState, Phase, ScreenContext, ScreenLifetime, SessionGate, SuccessBanner};
use crate::error::{Error, Result};
use crate::form::{ConstraintViolation, DeviceDraft, DeviceField, ProfileDraft, ProfileField};
use crate::identity::Session;
use crate::record::{non_empty, Collection, DeviceRecord, ProfileSubmission, RecordId};
use crate::render::{FieldView, FormView};
use crate::router::Route;

/// User-facing text of a form screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormCopy {
    /// Heading.
    pub title: &'static str,
    /// Sub-heading.
    pub subtitle: &'static str,
    /// Submit label while idle.
    pub submit_label: &'static str,
    /// Submit label while a submission is in flight.
    pub submitting_label: &'static str,
    /// Banner text after a successful submission.
    pub success_message: &'static str,
    /// Alert text after a failed submission.
    pub failure_alert: &'static str,
}

/// What distinguishes one form screen from another.
pub trait FormKind: Send + Sync + 'static {
    /// In-progress values.
    type Draft: Clone + PartialEq + fmt::Debug + Send + Sync;
    /// Editable field selector.
    type Field: Copy + fmt::Debug;
    /// The record written to the store.
    type Record: Serialize + fmt::Debug;

    /// Destination collection.
    const COLLECTION: Collection;
    /// The screen's own route.
    const ROUTE: Route;
    /// User-facing text.
    const COPY: FormCopy;

    /// The draft a fresh (or freshly reset) form starts with.
    fn initial_draft(session: &Session) -> Self::Draft;

    /// Carry a refreshed session of the same owner into a live draft.
    fn rebind(_draft: &mut Self::Draft, _session: &Session) {}

    /// Replace one field's value.
    fn set_field(draft: &mut Self::Draft, field: Self::Field, value: String);

    /// Declared constraints the draft breaks.
    fn violations(draft: &Self::Draft) -> Vec<ConstraintViolation>;

    /// Merge the draft with the owner and submission time.
    fn build_record(draft: &Self::Draft, session: &Session, at: DateTime<Utc>) -> Self::Record;

    /// Inputs as shown to the user.
    fn fields(draft: &Self::Draft) -> Vec<FieldView>;
}

/// The profile form (`/formulario`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileForm;

impl FormKind for ProfileForm {
    type Draft = ProfileDraft;
    type Field = ProfileField;
    type Record = ProfileSubmission;

    const COLLECTION: Collection = Collection::Formularios;
    const ROUTE: Route = Route::Formulario;
    const COPY: FormCopy = FormCopy {
        title: "Formulário de Cadastro",
        subtitle: "Preencha os dados abaixo",
        submit_label: "Enviar Formulário",
        submitting_label: "Enviando...",
        success_message: "Formulário enviado com sucesso!",
        failure_alert: "Erro ao enviar formulário. Tente novamente.",
    };

    fn initial_draft(session: &Session) -> ProfileDraft {
        ProfileDraft::for_session(session)
    }

    fn rebind(draft: &mut ProfileDraft, session: &Session) {
        draft.email.clone_from(&session.email);
    }

    fn set_field(draft: &mut ProfileDraft, field: ProfileField, value: String) {
        draft.set(field, value);
    }

    fn violations(draft: &ProfileDraft) -> Vec<ConstraintViolation> {
        draft.violations()
    }

    fn build_record(
        draft: &ProfileDraft,
        session: &Session,
        at: DateTime<Utc>,
    ) -> ProfileSubmission {
        ProfileSubmission {
            nome: draft.nome.clone(),
            email: draft.email.clone(),
            telefone: draft.telefone.clone(),
            idade: draft.idade.clone(),
            profissao: draft.profissao.clone(),
            mensagem: draft.mensagem.clone(),
            user_id: session.uid.clone(),
            timestamp: at,
        }
    }

    fn fields(draft: &ProfileDraft) -> Vec<FieldView> {
        vec![
            FieldView::editable("nome", "Nome Completo *", &draft.nome),
            FieldView::read_only("email", "Email *", &draft.email),
            FieldView::editable("telefone", "Telefone", &draft.telefone),
            FieldView::editable("idade", "Idade", &draft.idade),
            FieldView::editable("profissao", "Profissão", &draft.profissao),
            FieldView::editable("mensagem", "Mensagem", &draft.mensagem),
        ]
    }
}

/// The device registration form (`/devices`).
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceForm;

impl FormKind for DeviceForm {
    type Draft = DeviceDraft;
    type Field = DeviceField;
    type Record = DeviceRecord;

    const COLLECTION: Collection = Collection::Devices;
    const ROUTE: Route = Route::Devices;
    const COPY: FormCopy = FormCopy {
        title: "Cadastro de Dispositivos",
        subtitle: "Registre seus dispositivos eletrônicos",
        submit_label: "Cadastrar Dispositivo",
        submitting_label: "Cadastrando...",
        success_message: "Dispositivo cadastrado com sucesso!",
        failure_alert: "Erro ao cadastrar dispositivo. Tente novamente.",
    };

    fn initial_draft(_session: &Session) -> DeviceDraft {
        DeviceDraft::default()
    }

    fn set_field(draft: &mut DeviceDraft, field: DeviceField, value: String) {
        draft.set(field, value);
    }

    fn violations(draft: &DeviceDraft) -> Vec<ConstraintViolation> {
        draft.violations()
    }

    fn build_record(draft: &DeviceDraft, session: &Session, at: DateTime<Utc>) -> DeviceRecord {
        DeviceRecord {
            nome: draft.nome.clone(),
            tipo: draft.tipo,
            marca: draft.marca.clone(),
            modelo: draft.modelo.clone(),
            sistema_operacional: draft.sistema_operacional,
            versao: draft.versao.clone(),
            imei: non_empty(&draft.imei),
            numero_serie: non_empty(&draft.numero_serie),
            observacoes: non_empty(&draft.observacoes),
            user_id: session.uid.clone(),
            data_registro: at,
        }
    }

    fn fields(draft: &DeviceDraft) -> Vec<FieldView> {
        DeviceField::ALL
            .into_iter()
            .map(|field| {
                let label = match field {
                    DeviceField::Nome => "Nome do Dispositivo *",
                    DeviceField::Tipo => "Tipo *",
                    DeviceField::Marca => "Marca *",
                    DeviceField::Modelo => "Modelo *",
                    DeviceField::SistemaOperacional => "Sistema Operacional *",
                    DeviceField::Versao => "Versão do SO",
                    DeviceField::Imei => "IMEI (para dispositivos móveis)",
                    DeviceField::NumeroSerie => "Número de Série",
                    DeviceField::Observacoes => "Observações",
                };
                FieldView::editable(field.name(), label, draft.get(field))
            })
            .collect()
    }
}

/// Result of a submit action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The record was created; the draft was reset and the banner shown.
    Created(RecordId),
    /// The store rejected the record; an alert was shown and the draft kept.
    Failed(String),
    /// The draft breaks a declared constraint; nothing was sent.
    Invalid(Vec<ConstraintViolation>),
    /// The submit control wasn't available (not ready, or already submitting).
    Ignored,
    /// The screen was unmounted before the store answered; the answer was dropped.
    Abandoned,
}

/// A record handed to the store, between [`FormScreen::begin_submit`] and
/// [`FormScreen::finish_submit`].
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmission {
    owner: Session,
    payload: serde_json::Value,
}

impl PendingSubmission {
    /// The JSON document to create.
    #[must_use]
    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// The session the record belongs to.
    #[must_use]
    pub fn owner(&self) -> &Session {
        &self.owner
    }
}

/// A gated form screen.
pub struct FormScreen<K: FormKind> {
    ctx: ScreenContext,
    lifetime: ScreenLifetime,
    gate: SessionGate,
    phase: Phase,
    draft: Option<K::Draft>,
    owner: Option<String>,
    banner: SuccessBanner,
    _kind: PhantomData<K>,
}

impl<K: FormKind> fmt::Debug for FormScreen<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormScreen")
            .field("collection", &K::COLLECTION)
            .field("phase", &self.phase)
            .field("draft", &self.draft)
            .finish_non_exhaustive()
    }
}

impl<K: FormKind> FormScreen<K> {
    /// Mount the screen: subscribe to the session and start loading.
    #[must_use]
    pub fn mount(ctx: ScreenContext) -> Self {
        let gate = SessionGate::mount(ctx.identity.as_ref(), ctx.navigator.clone());
        let banner = SuccessBanner::new(ctx.banner_duration);
        debug!(route = %K::ROUTE, "Mounted form screen");
        Self {
            ctx,
            lifetime: ScreenLifetime::new(),
            gate,
            phase: Phase::Loading,
            draft: None,
            owner: None,
            banner,
            _kind: PhantomData,
        }
    }

    /// Wait for the session decision and reveal the form or redirect.
    pub async fn start(&mut self) -> Phase {
        let state = self.gate.resolve().await.clone();
        if !self.lifetime.is_active() {
            debug!(route = %K::ROUTE, "Screen unmounted while loading");
            return self.phase;
        }
        self.apply_gate(state);
        self.phase
    }

    /// Wait for the next session change and apply it.
    ///
    /// Returns the resulting phase, or `None` if no further changes can
    /// arrive.
    pub async fn follow_session(&mut self) -> Option<Phase> {
        let state = self.gate.next_change().await?.clone();
        if !self.lifetime.is_active() {
            return None;
        }
        self.apply_gate(state);
        Some(self.phase)
    }

    /// Apply a session notification that was already published, without
    /// waiting for one.
    ///
    /// Returns the resulting phase when something was applied.
    pub fn sync_session(&mut self) -> Option<Phase> {
        let state = self.gate.poll()?.clone();
        self.apply_gate(state);
        Some(self.phase)
    }

    fn apply_gate(&mut self, state: GateState) {
        match state {
            GateState::Authenticated(session) => {
                let same_owner = self.owner.as_deref() == Some(session.uid.as_str());
                let live = self.phase != Phase::Loading;
                if let (true, Some(draft)) = (live, self.draft.as_mut()) {
                    if same_owner {
                        K::rebind(draft, &session);
                    } else {
                        info!(uid = %session.uid, "Session owner changed, resetting form");
                        *draft = K::initial_draft(&session);
                    }
                } else {
                    self.draft = Some(K::initial_draft(&session));
                }
                self.owner = Some(session.uid);
                if self.phase == Phase::Loading {
                    self.phase = Phase::Ready;
                }
            }
            GateState::Redirected => {
                self.draft = None;
                self.owner = None;
                self.phase = Phase::Redirected;
            }
            GateState::Loading => {}
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The draft, while the form is shown.
    #[must_use]
    pub fn draft(&self) -> Option<&K::Draft> {
        self.draft.as_ref()
    }

    /// The session the gate let through.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.gate.session()
    }

    /// A handle to this screen's lifetime.
    #[must_use]
    pub fn lifetime(&self) -> ScreenLifetime {
        self.lifetime.clone()
    }

    /// The collaborators this screen was mounted with.
    #[must_use]
    pub fn context(&self) -> &ScreenContext {
        &self.ctx
    }

    /// Whether the success banner is showing.
    #[must_use]
    pub fn banner_visible(&self) -> bool {
        self.banner.is_visible()
    }

    /// Whether the submit control accepts clicks.
    #[must_use]
    pub fn submit_enabled(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Current label of the submit control.
    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        if self.phase == Phase::Submitting {
            K::COPY.submitting_label
        } else {
            K::COPY.submit_label
        }
    }

    /// Apply an input change.
    ///
    /// Returns `false` when no form is shown (loading or redirected).
    pub fn update(&mut self, field: K::Field, value: impl Into<String>) -> bool {
        if !self.phase.shows_content() {
            return false;
        }
        match self.draft.as_mut() {
            Some(draft) => {
                K::set_field(draft, field, value.into());
                true
            }
            None => false,
        }
    }

    /// Submit the draft.
    ///
    /// A session change already published is applied first, so a signed-out
    /// or switched session never submits under the previous owner.
    pub async fn submit(&mut self) -> SubmitOutcome {
        self.sync_session();
        let pending = match self.begin_submit() {
            Ok(pending) => pending,
            Err(outcome) => return outcome,
        };
        let result = self
            .ctx
            .store
            .create(K::COLLECTION, pending.payload.clone())
            .await;
        self.finish_submit(pending, result)
    }

    /// First half of [`submit`](Self::submit): check the draft, build the
    /// record and disable the submit control.
    ///
    /// # Errors
    ///
    /// Returns the final outcome when nothing should be sent: the screen is
    /// not ready, the draft breaks a constraint, or the record can't be
    /// encoded.
    pub fn begin_submit(&mut self) -> std::result::Result<PendingSubmission, SubmitOutcome> {
        if self.phase != Phase::Ready {
            debug!(phase = ?self.phase, "Submit ignored");
            return Err(SubmitOutcome::Ignored);
        }
        let (Some(owner), Some(draft)) = (self.gate.session().cloned(), self.draft.as_ref())
        else {
            return Err(SubmitOutcome::Ignored);
        };

        let violations = K::violations(draft);
        if !violations.is_empty() {
            debug!(count = violations.len(), "Submit blocked by form constraints");
            return Err(SubmitOutcome::Invalid(violations));
        }

        let record = K::build_record(draft, &owner, Utc::now());
        match serde_json::to_value(&record) {
            Ok(payload) => {
                self.phase = Phase::Submitting;
                Ok(PendingSubmission { owner, payload })
            }
            Err(e) => Err(self.fail(&Error::from(e))),
        }
    }

    /// Second half of [`submit`](Self::submit): apply the store's answer.
    pub fn finish_submit(
        &mut self,
        pending: PendingSubmission,
        result: Result<RecordId>,
    ) -> SubmitOutcome {
        if !self.lifetime.is_active() {
            warn!(collection = %K::COLLECTION, "Screen unmounted during submit, dropping result");
            return SubmitOutcome::Abandoned;
        }
        if self.phase == Phase::Submitting {
            self.phase = Phase::Ready;
        }

        match result {
            Ok(id) => {
                info!(collection = %K::COLLECTION, id = %id, "Record created");
                self.banner.show();
                if self.phase == Phase::Ready {
                    let session = self.gate.session().cloned().unwrap_or(pending.owner);
                    self.draft = Some(K::initial_draft(&session));
                }
                SubmitOutcome::Created(id)
            }
            Err(e) => self.fail(&e),
        }
    }

    fn fail(&self, e: &Error) -> SubmitOutcome {
        error!(collection = %K::COLLECTION, error = %e, "Submission failed");
        self.ctx.notifier.alert(K::COPY.failure_alert);
        SubmitOutcome::Failed(e.to_string())
    }

    /// The "Voltar" action.
    pub fn go_back(&self) {
        self.ctx.navigator.navigate(Route::Welcome);
    }

    /// What the screen shows, once content is visible.
    #[must_use]
    pub fn view(&self) -> Option<FormView> {
        if !self.phase.shows_content() {
            return None;
        }
        let draft = self.draft.as_ref()?;
        Some(FormView {
            title: K::COPY.title,
            subtitle: K::COPY.subtitle,
            banner: self.banner_visible().then_some(K::COPY.success_message),
            fields: K::fields(draft),
            submit_label: self.submit_label(),
            submit_enabled: self.submit_enabled(),
        })
    }

    /// Unmount: end the lifetime and release the subscription.
    pub fn unmount(&mut self) {
        self.lifetime.end();
        self.gate.unmount();
        debug!(route = %K::ROUTE, "Unmounted form screen");
    }
}

//! Welcome screen.

use tracing::{error, info};

use super::{GateState, Phase, ScreenContext, ScreenLifetime, SessionGate};
use crate::router::Route;

/// The `/welcome` screen: greets the user and offers navigation.
#[derive(Debug)]
pub struct WelcomeScreen {
    ctx: ScreenContext,
    lifetime: ScreenLifetime,
    gate: SessionGate,
    phase: Phase,
}

impl WelcomeScreen {
    /// Mount the screen.
    #[must_use]
    pub fn mount(ctx: ScreenContext) -> Self {
        let gate = SessionGate::mount(ctx.identity.as_ref(), ctx.navigator.clone());
        Self {
            ctx,
            lifetime: ScreenLifetime::new(),
            gate,
            phase: Phase::Loading,
        }
    }

    /// Wait for the session decision.
    pub async fn start(&mut self) -> Phase {
        let state = self.gate.resolve().await.clone();
        if self.lifetime.is_active() {
            self.apply_gate(&state);
        }
        self.phase
    }

    /// Apply the next session change, if one can still arrive.
    pub async fn follow_session(&mut self) -> Option<Phase> {
        let state = self.gate.next_change().await?.clone();
        if !self.lifetime.is_active() {
            return None;
        }
        self.apply_gate(&state);
        Some(self.phase)
    }

    fn apply_gate(&mut self, state: &GateState) {
        self.phase = match state {
            GateState::Authenticated(_) => Phase::Ready,
            GateState::Redirected => Phase::Redirected,
            GateState::Loading => Phase::Loading,
        };
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The signed-in user's email, once content is shown.
    #[must_use]
    pub fn greeting(&self) -> Option<&str> {
        if self.phase != Phase::Ready {
            return None;
        }
        self.gate.session().map(|s| s.email.as_str())
    }

    /// "Ir para o Formulário".
    pub fn go_to_form(&self) {
        self.ctx.navigator.navigate(Route::Formulario);
    }

    /// "Meus Dispositivos".
    pub fn go_to_devices(&self) {
        self.ctx.navigator.navigate(Route::Devices);
    }

    /// "Sair": end the session and return to the login screen.
    ///
    /// A failed sign-out is logged and the screen stays as it is.
    pub async fn sign_out(&mut self) -> bool {
        if self.phase != Phase::Ready {
            return false;
        }
        let result = self.ctx.identity.sign_out().await;
        if !self.lifetime.is_active() {
            return result.is_ok();
        }
        match result {
            Ok(()) => {
                info!("Leaving welcome screen for {}", Route::Login);
                self.gate.unmount();
                self.ctx.navigator.navigate(Route::Login);
                self.phase = Phase::Redirected;
                true
            }
            Err(e) => {
                error!(error = %e, "Sign-out failed");
                false
            }
        }
    }

    /// Unmount the screen.
    pub fn unmount(&mut self) {
        self.lifetime.end();
        self.gate.unmount();
    }
}

//! Plain-text rendering of screen views.
//!
//! Screens expose view structs ([`FormView`], [`DeviceCard`]); this module
//! turns them into terminal text. Layout beyond that is out of scope.

use std::fmt::Write;

use serde::Serialize;

use crate::record::{RecordId, StoredDevice};

/// One input of a form as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    /// Wire name.
    pub name: &'static str,
    /// Label, with `*` on required inputs.
    pub label: &'static str,
    /// Current value.
    pub value: String,
    /// Whether the input is read-only.
    pub read_only: bool,
}

impl FieldView {
    /// An editable input.
    #[must_use]
    pub fn editable(name: &'static str, label: &'static str, value: &str) -> Self {
        Self {
            name,
            label,
            value: value.to_string(),
            read_only: false,
        }
    }

    /// A read-only input.
    #[must_use]
    pub fn read_only(name: &'static str, label: &'static str, value: &str) -> Self {
        Self {
            read_only: true,
            ..Self::editable(name, label, value)
        }
    }
}

/// Everything a form screen shows once the gate lets content through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    /// Heading.
    pub title: &'static str,
    /// Sub-heading.
    pub subtitle: &'static str,
    /// Success banner text, while visible.
    pub banner: Option<&'static str>,
    /// Inputs, in form order.
    pub fields: Vec<FieldView>,
    /// Submit control label.
    pub submit_label: &'static str,
    /// Whether the submit control accepts clicks.
    pub submit_enabled: bool,
}

/// Summary card for one registered device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceCard {
    /// Record identifier, used as the card key.
    pub key: RecordId,
    /// Glyph for the device type.
    pub glyph: &'static str,
    /// Device name.
    pub title: String,
    /// Brand and model.
    pub subtitle: String,
    /// Labelled detail lines, present fields only.
    pub details: Vec<(&'static str, String)>,
    /// Notes, when present.
    pub notes: Option<String>,
}

impl From<&StoredDevice> for DeviceCard {
    fn from(device: &StoredDevice) -> Self {
        let record = &device.record;

        let mut details = vec![
            ("Tipo", record.tipo.to_string()),
            (
                "SO",
                format!("{} {}", record.sistema_operacional, record.versao)
                    .trim_end()
                    .to_string(),
            ),
        ];
        if let Some(imei) = present(record.imei.as_deref()) {
            details.push(("IMEI", imei));
        }
        if let Some(serial) = present(record.numero_serie.as_deref()) {
            details.push(("Serial", serial));
        }

        Self {
            key: device.id.clone(),
            glyph: record.tipo.glyph(),
            title: record.nome.clone(),
            subtitle: format!("{} {}", record.marca, record.modelo),
            details,
            notes: present(record.observacoes.as_deref()),
        }
    }
}

fn present(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Render a form view.
#[must_use]
pub fn render_form(view: &FormView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.title);
    let _ = writeln!(out, "{}", view.subtitle);
    let _ = writeln!(out, "{}", "=".repeat(view.title.chars().count()));

    if let Some(banner) = view.banner {
        let _ = writeln!(out, "✅ {banner}");
    }

    for field in &view.fields {
        let suffix = if field.read_only { " (somente leitura)" } else { "" };
        let _ = writeln!(out, "  {}: {}{}", field.label, field.value, suffix);
    }

    let state = if view.submit_enabled { "" } else { " (desabilitado)" };
    let _ = writeln!(out, "[ {} ]{}", view.submit_label, state);
    out
}

/// Render the device list section.
///
/// Returns an empty string when there are no cards; the section is omitted.
#[must_use]
pub fn render_cards(cards: &[DeviceCard]) -> String {
    if cards.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Meus Dispositivos");
    let _ = writeln!(out, "Dispositivos já cadastrados");

    for card in cards {
        let _ = writeln!(out);
        let _ = writeln!(out, "{} {}  [{}]", card.glyph, card.title, card.key);
        let _ = writeln!(out, "   {}", card.subtitle);
        for (label, value) in &card.details {
            let _ = writeln!(out, "   {label}: {value}");
        }
        if let Some(notes) = &card.notes {
            let _ = writeln!(out, "   Obs: {notes}");
        }
    }
    out
}

/// Render the welcome screen for a signed-in user.
#[must_use]
pub fn render_welcome(email: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Bem-vindo(a)!");
    let _ = writeln!(out, "Olá, {email}!");
    let _ = writeln!(
        out,
        "É ótimo ter você aqui. Estamos prontos para começar sua jornada."
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "  cadastro form show     Ir para o Formulário");
    let _ = writeln!(out, "  cadastro devices list  Meus Dispositivos");
    let _ = writeln!(out, "  cadastro logout        Sair");
    out
}

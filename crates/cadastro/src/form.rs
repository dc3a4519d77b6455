//! Form drafts: the in-progress, unsaved values of each screen's form.
//!
//! Each screen has a fixed draft struct with one named field per input.
//! Updates are total and touch exactly one field. The only checks are the
//! constraints the browser form declares (`required`, `type=email`,
//! `min`/`max` on numbers); nothing else is validated before submission.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::identity::Session;
use crate::record::{DeviceType, OperatingSystem};

/// A declared input constraint that the draft currently breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    /// Wire name of the offending field.
    pub field: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl ConstraintViolation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    fn required(field: &'static str) -> Self {
        Self::new(field, "campo obrigatório")
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// The email shape browsers accept for `type=email` inputs.
fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
        )
        .expect("email pattern is valid")
    })
}

/// Whether `email` has the shape of an email address.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

// === Profile form ===

/// Editable fields of the profile form.
///
/// `email` is absent: it comes from the session and is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    /// Full name.
    Nome,
    /// Phone number.
    Telefone,
    /// Age.
    Idade,
    /// Profession.
    Profissao,
    /// Free-form message.
    Mensagem,
}

impl ProfileField {
    /// Every editable field, in form order.
    pub const ALL: [ProfileField; 5] = [
        ProfileField::Nome,
        ProfileField::Telefone,
        ProfileField::Idade,
        ProfileField::Profissao,
        ProfileField::Mensagem,
    ];

    /// The field's wire name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Nome => "nome",
            Self::Telefone => "telefone",
            Self::Idade => "idade",
            Self::Profissao => "profissao",
            Self::Mensagem => "mensagem",
        }
    }
}

/// Draft of the profile form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileDraft {
    pub(crate) nome: String,
    pub(crate) email: String,
    pub(crate) telefone: String,
    pub(crate) idade: String,
    pub(crate) profissao: String,
    pub(crate) mensagem: String,
}

impl ProfileDraft {
    /// The initial draft for a session: empty, with the email pre-seeded.
    #[must_use]
    pub fn for_session(session: &Session) -> Self {
        Self {
            email: session.email.clone(),
            ..Self::default()
        }
    }

    /// Replace one field's value.
    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ProfileField::Nome => self.nome = value,
            ProfileField::Telefone => self.telefone = value,
            ProfileField::Idade => self.idade = value,
            ProfileField::Profissao => self.profissao = value,
            ProfileField::Mensagem => self.mensagem = value,
        }
    }

    /// Current value of an editable field.
    #[must_use]
    pub fn get(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Nome => &self.nome,
            ProfileField::Telefone => &self.telefone,
            ProfileField::Idade => &self.idade,
            ProfileField::Profissao => &self.profissao,
            ProfileField::Mensagem => &self.mensagem,
        }
    }

    /// The read-only email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Constraints the form declares that the draft currently breaks.
    #[must_use]
    pub fn violations(&self) -> Vec<ConstraintViolation> {
        let mut violations = Vec::new();

        if self.nome.is_empty() {
            violations.push(ConstraintViolation::required("nome"));
        }

        if self.email.is_empty() {
            violations.push(ConstraintViolation::required("email"));
        } else if !email_regex().is_match(&self.email) {
            violations.push(ConstraintViolation::new("email", "email inválido"));
        }

        if !self.idade.is_empty() {
            match self.idade.trim().parse::<i64>() {
                Ok(age) if (1..=120).contains(&age) => {}
                Ok(_) => violations.push(ConstraintViolation::new(
                    "idade",
                    "deve estar entre 1 e 120",
                )),
                Err(_) => violations.push(ConstraintViolation::new(
                    "idade",
                    "deve ser um número inteiro",
                )),
            }
        }

        violations
    }
}

// === Device form ===

/// Fields of the device registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceField {
    /// Display name.
    Nome,
    /// Device kind (select).
    Tipo,
    /// Manufacturer.
    Marca,
    /// Model.
    Modelo,
    /// Operating system (select).
    SistemaOperacional,
    /// Operating system version.
    Versao,
    /// IMEI.
    Imei,
    /// Serial number.
    NumeroSerie,
    /// Notes.
    Observacoes,
}

impl DeviceField {
    /// Every field, in form order.
    pub const ALL: [DeviceField; 9] = [
        DeviceField::Nome,
        DeviceField::Tipo,
        DeviceField::Marca,
        DeviceField::Modelo,
        DeviceField::SistemaOperacional,
        DeviceField::Versao,
        DeviceField::Imei,
        DeviceField::NumeroSerie,
        DeviceField::Observacoes,
    ];

    /// The field's wire name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Nome => "nome",
            Self::Tipo => "tipo",
            Self::Marca => "marca",
            Self::Modelo => "modelo",
            Self::SistemaOperacional => "sistemaOperacional",
            Self::Versao => "versao",
            Self::Imei => "imei",
            Self::NumeroSerie => "numeroSerie",
            Self::Observacoes => "observacoes",
        }
    }
}

/// Draft of the device registration form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceDraft {
    pub(crate) nome: String,
    pub(crate) tipo: DeviceType,
    pub(crate) marca: String,
    pub(crate) modelo: String,
    pub(crate) sistema_operacional: OperatingSystem,
    pub(crate) versao: String,
    pub(crate) imei: String,
    pub(crate) numero_serie: String,
    pub(crate) observacoes: String,
}

impl DeviceDraft {
    /// Replace one field's value.
    ///
    /// Select fields take their stored value (`"laptop"`, `"iOS"`); a value
    /// that isn't one of the options selects `outros`.
    pub fn set(&mut self, field: DeviceField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DeviceField::Nome => self.nome = value,
            DeviceField::Tipo => {
                self.tipo = value.parse().unwrap_or_else(|_| {
                    warn!(value = %value, "Unknown device type, using outros");
                    DeviceType::Outros
                });
            }
            DeviceField::Marca => self.marca = value,
            DeviceField::Modelo => self.modelo = value,
            DeviceField::SistemaOperacional => {
                self.sistema_operacional = value.parse().unwrap_or_else(|_| {
                    warn!(value = %value, "Unknown operating system, using outros");
                    OperatingSystem::Outros
                });
            }
            DeviceField::Versao => self.versao = value,
            DeviceField::Imei => self.imei = value,
            DeviceField::NumeroSerie => self.numero_serie = value,
            DeviceField::Observacoes => self.observacoes = value,
        }
    }

    /// Current value of a field, as the form shows it.
    #[must_use]
    pub fn get(&self, field: DeviceField) -> &str {
        match field {
            DeviceField::Nome => &self.nome,
            DeviceField::Tipo => self.tipo.as_str(),
            DeviceField::Marca => &self.marca,
            DeviceField::Modelo => &self.modelo,
            DeviceField::SistemaOperacional => self.sistema_operacional.as_str(),
            DeviceField::Versao => &self.versao,
            DeviceField::Imei => &self.imei,
            DeviceField::NumeroSerie => &self.numero_serie,
            DeviceField::Observacoes => &self.observacoes,
        }
    }

    /// Constraints the form declares that the draft currently breaks.
    #[must_use]
    pub fn violations(&self) -> Vec<ConstraintViolation> {
        [
            ("nome", &self.nome),
            ("marca", &self.marca),
            ("modelo", &self.modelo),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| ConstraintViolation::required(field))
        .collect()
    }
}

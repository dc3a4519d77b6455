//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::form::{DeviceField, ProfileField};

/// Login command arguments.
#[derive(Debug, Args)]
pub struct LoginCommand {
    /// Email address to sign in with
    #[arg(short, long)]
    pub email: String,
}

/// Profile form commands.
#[derive(Debug, Subcommand)]
pub enum FormCommand {
    /// Show the empty form, with the email taken from the session
    Show,

    /// Fill in and submit the form
    Submit(ProfileArgs),
}

/// Profile form fields.
#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Full name
    #[arg(long)]
    pub nome: String,

    /// Phone number
    #[arg(long)]
    pub telefone: Option<String>,

    /// Age
    #[arg(long)]
    pub idade: Option<String>,

    /// Profession
    #[arg(long)]
    pub profissao: Option<String>,

    /// Free-form message
    #[arg(long)]
    pub mensagem: Option<String>,
}

impl ProfileArgs {
    /// The given fields, as form inputs.
    #[must_use]
    pub fn inputs(&self) -> Vec<(ProfileField, String)> {
        let optional = [
            (ProfileField::Telefone, &self.telefone),
            (ProfileField::Idade, &self.idade),
            (ProfileField::Profissao, &self.profissao),
            (ProfileField::Mensagem, &self.mensagem),
        ];
        std::iter::once((ProfileField::Nome, self.nome.clone()))
            .chain(
                optional
                    .into_iter()
                    .filter_map(|(field, value)| value.clone().map(|v| (field, v))),
            )
            .collect()
    }
}

/// Device registration commands.
#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List your registered devices
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Register a device
    Add(DeviceArgs),
}

/// Device form fields.
#[derive(Debug, Args)]
pub struct DeviceArgs {
    /// Device name
    #[arg(long)]
    pub nome: String,

    /// Device type (smartphone, tablet, laptop, desktop, smartwatch, outros)
    #[arg(long, default_value = "smartphone")]
    pub tipo: String,

    /// Brand
    #[arg(long)]
    pub marca: String,

    /// Model
    #[arg(long)]
    pub modelo: String,

    /// Operating system (Android, iOS, Windows, macOS, Linux, outros)
    #[arg(long = "so", default_value = "Android")]
    pub sistema_operacional: String,

    /// Operating system version
    #[arg(long)]
    pub versao: Option<String>,

    /// IMEI, for mobile devices
    #[arg(long)]
    pub imei: Option<String>,

    /// Serial number
    #[arg(long = "serie")]
    pub numero_serie: Option<String>,

    /// Notes
    #[arg(long = "obs")]
    pub observacoes: Option<String>,
}

impl DeviceArgs {
    /// The given fields, as form inputs.
    #[must_use]
    pub fn inputs(&self) -> Vec<(DeviceField, String)> {
        let mut inputs = vec![
            (DeviceField::Nome, self.nome.clone()),
            (DeviceField::Tipo, self.tipo.clone()),
            (DeviceField::Marca, self.marca.clone()),
            (DeviceField::Modelo, self.modelo.clone()),
            (DeviceField::SistemaOperacional, self.sistema_operacional.clone()),
        ];
        let optional = [
            (DeviceField::Versao, &self.versao),
            (DeviceField::Imei, &self.imei),
            (DeviceField::NumeroSerie, &self.numero_serie),
            (DeviceField::Observacoes, &self.observacoes),
        ];
        inputs.extend(
            optional
                .into_iter()
                .filter_map(|(field, value)| value.clone().map(|v| (field, v))),
        );
        inputs
    }
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable cards
    #[default]
    Plain,
    /// JSON
    Json,
}

use crate::registry::ProcessorKey;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Client section precedence must list site, app and dooh exactly once, got {0:?}")]
    ClientSectionPrecedence(Vec<ClientSection>),

    #[error("Invalid disabled processor {key:?}: {reason}")]
    InvalidProcessorKey { key: String, reason: String },

    #[error("Empty currency")]
    EmptyCurrency,

    #[error("Empty native version")]
    EmptyNativeVersion,
}

/// Mutually exclusive top-level OpenRTB request sections describing where the
/// request originates.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ClientSection {
    Site,
    App,
    Dooh,
}

impl ClientSection {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ClientSection::Site => "site",
            ClientSection::App => "app",
            ClientSection::Dooh => "dooh",
        }
    }
}

impl fmt::Display for ClientSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Converter configuration
///
/// Every field has a default, so an empty document is a valid configuration.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConverterConfig {
    /// Currency used for `cur` in requests and for bids whose response has none.
    pub currency: Option<String>,
    /// TTL in seconds for bids that don't carry `exp`.
    pub ttl: Option<u64>,
    /// Reported as `netRevenue` on every bid response.
    pub net_revenue: Option<bool>,
    /// OpenRTB native version advertised in `imp.native.ver` when the ad unit
    /// does not specify one.
    pub native_version: String,
    /// Which client section survives when first-party data sets several.
    /// Earlier entries win.
    pub client_section_precedence: Vec<ClientSection>,
    /// Processors replaced by no-ops at startup, as `<point>.<name>` keys
    /// (e.g. `imp.secure`).
    pub disabled_processors: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            currency: Some("USD".to_string()),
            ttl: Some(300),
            net_revenue: Some(true),
            native_version: "1.2".to_string(),
            client_section_precedence: vec![
                ClientSection::Dooh,
                ClientSection::App,
                ClientSection::Site,
            ],
            disabled_processors: Vec::new(),
        }
    }
}

impl ConverterConfig {
    /// Validates the converter configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.currency.as_deref().is_some_and(str::is_empty) {
            return Err(ValidationError::EmptyCurrency);
        }

        if self.native_version.is_empty() {
            return Err(ValidationError::EmptyNativeVersion);
        }

        let unique: HashSet<&ClientSection> = self.client_section_precedence.iter().collect();
        if self.client_section_precedence.len() != 3 || unique.len() != 3 {
            return Err(ValidationError::ClientSectionPrecedence(
                self.client_section_precedence.clone(),
            ));
        }

        self.disabled_processor_keys()?;

        Ok(())
    }

    /// Parses `disabled_processors` into registry keys.
    pub fn disabled_processor_keys(&self) -> Result<Vec<ProcessorKey>, ValidationError> {
        self.disabled_processors
            .iter()
            .map(|key| {
                key.parse::<ProcessorKey>()
                    .map_err(|e| ValidationError::InvalidProcessorKey {
                        key: key.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect()
    }
}

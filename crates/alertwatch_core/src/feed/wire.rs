//! Serde mirror of the subset of the alert feed the pipeline reads.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FeedMessage {
    #[serde(default)]
    pub entity: Vec<FeedEntity>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeedEntity {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub alert: Option<Alert>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Alert {
    #[serde(default)]
    pub header_text: Option<TranslatedString>,
    #[serde(default)]
    pub informed_entity: Vec<InformedEntity>,
    #[serde(default, rename = "transit_realtime.mercury_alert")]
    pub mercury_alert: Option<MercuryAlert>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MercuryAlert {
    #[serde(default)]
    pub human_readable_active_period: Option<TranslatedString>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct InformedEntity {
    #[serde(default, rename = "transit_realtime.mercury_entity_selector")]
    pub mercury_entity_selector: Option<MercuryEntitySelector>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MercuryEntitySelector {
    #[serde(default)]
    pub sort_order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TranslatedString {
    #[serde(default)]
    pub translation: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Translation {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
}

impl TranslatedString {
    /// First translation tagged with `language`.
    pub fn text_for(&self, language: &str) -> Option<&str> {
        self.translation
            .iter()
            .find(|translation| translation.language.as_deref() == Some(language))
            .map(|translation| translation.text.as_str())
    }
}

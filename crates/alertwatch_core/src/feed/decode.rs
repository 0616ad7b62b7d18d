//! Feed document decoding.

use crate::feed::wire::FeedMessage;
use crate::model::alert::RawAlert;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const FEED_LANGUAGE: &str = "en";

/// Feed decoding error.
#[derive(Debug)]
pub enum FeedError {
    /// Body is not a JSON document of the expected shape.
    Json(serde_json::Error),
}

impl Display for FeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid alert feed document: {err}"),
        }
    }
}

impl Error for FeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Decodes a feed JSON body into raw alerts in feed order.
///
/// Entities without an `alert` section are skipped, as are alerts whose id
/// is blank since the snapshot store keys on it.
///
/// # Errors
/// - `FeedError::Json` when the body is not valid JSON or a present field
///   has the wrong type.
pub fn decode_feed(body: &str) -> Result<Vec<RawAlert>, FeedError> {
    let message: FeedMessage = serde_json::from_str(body)?;
    let total = message.entity.len();

    let alerts: Vec<RawAlert> = message
        .entity
        .into_iter()
        .filter_map(|entity| {
            let alert = entity.alert?;
            if entity.id.trim().is_empty() {
                warn!("event=feed_decode module=feed status=skip reason=blank_alert_id");
                return None;
            }
            let header_text = alert
                .header_text
                .as_ref()
                .and_then(|header| header.text_for(FEED_LANGUAGE))
                .map(str::to_string);
            let raw_active_period = alert
                .mercury_alert
                .as_ref()
                .and_then(|mercury| mercury.human_readable_active_period.as_ref())
                .and_then(|period| period.text_for(FEED_LANGUAGE))
                .map(str::to_string);
            let sort_orders = alert
                .informed_entity
                .iter()
                .filter_map(|informed| informed.mercury_entity_selector.as_ref())
                .filter_map(|selector| selector.sort_order.clone())
                .collect();

            Some(RawAlert {
                id: entity.id,
                header_text,
                raw_active_period,
                sort_orders,
            })
        })
        .collect();

    info!(
        "event=feed_decode module=feed status=ok entities={} alerts={}",
        total,
        alerts.len()
    );
    Ok(alerts)
}

#[cfg(test)]
mod tests {
    use super::{decode_feed, FeedError};
    use serde_json::json;

    #[test]
    fn decodes_english_translations_and_sort_orders() {
        let body = json!({
            "header": {"gtfs_realtime_version": "1.0"},
            "entity": [{
                "id": "lmm:planned_work:1",
                "alert": {
                    "header_text": {"translation": [
                        {"text": "<p>[7]</p>", "language": "en-html"},
                        {"text": "No [7] trains between Queensboro Plaza and 34 St", "language": "en"}
                    ]},
                    "informed_entity": [
                        {"route_id": "7", "transit_realtime.mercury_entity_selector": {"sort_order": "MTASBWY:7:20"}},
                        {"stop_id": "718"}
                    ],
                    "transit_realtime.mercury_alert": {
                        "human_readable_active_period": {"translation": [
                            {"text": "Sat 12:15 AM to Mon 5:00 AM, Feb 22 - Mar 17", "language": "en"}
                        ]}
                    }
                }
            }, {
                "id": "trip_update_only"
            }]
        })
        .to_string();

        let alerts = decode_feed(&body).unwrap();
        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.id, "lmm:planned_work:1");
        assert_eq!(
            alert.header_text.as_deref(),
            Some("No [7] trains between Queensboro Plaza and 34 St")
        );
        assert_eq!(
            alert.raw_active_period.as_deref(),
            Some("Sat 12:15 AM to Mon 5:00 AM, Feb 22 - Mar 17")
        );
        assert_eq!(alert.sort_orders, vec!["MTASBWY:7:20".to_string()]);
    }

    #[test]
    fn missing_sections_decode_as_absent() {
        let alerts = decode_feed(r#"{"entity": [{"id": "a", "alert": {}}]}"#).unwrap();
        assert_eq!(alerts[0].header_text, None);
        assert_eq!(alerts[0].raw_active_period, None);
        assert!(alerts[0].sort_orders.is_empty());

        assert!(decode_feed("{}").unwrap().is_empty());
    }

    #[test]
    fn alerts_with_blank_ids_are_skipped() {
        let body = r#"{"entity": [
            {"alert": {}},
            {"id": "  ", "alert": {}},
            {"id": "kept", "alert": {}}
        ]}"#;
        let ids: Vec<String> = decode_feed(body)
            .unwrap()
            .into_iter()
            .map(|alert| alert.id)
            .collect();
        assert_eq!(ids, vec!["kept".to_string()]);
    }

    #[test]
    fn invalid_json_is_reported() {
        let err = decode_feed("not json").unwrap_err();
        assert!(matches!(err, FeedError::Json(_)));
        assert!(err.to_string().contains("invalid alert feed document"));
    }
}

//! Race server wire types.
//!
//! Push messages are JSON objects tagged by `type` (older servers use
//! `kind`). Example:
//! ```json
//! {"type":"race_progression","new_race":{"raceNumber":10,"raceName":"Spanish Grand Prix",
//!  "location":"Barcelona","latitude":41.57,"longitude":2.2611,
//!  "raceDateTime":"2025-06-22 14:00:00","status":"upcoming"}}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    parse_timestamp, Coordinates, DomainError, EventDescriptor, LapSummary, Prediction,
    PredictionSet, RaceStatus, RoundId, SessionKey,
};
use crate::port::{ChannelFrame, PushMessage};

/// Race configuration as the server sends and accepts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceConfigDto {
    pub race_number: u32,
    pub race_name: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub race_date_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RaceStatus>,
}

impl RaceConfigDto {
    /// Convert to a domain descriptor, validating every field.
    pub fn to_event(&self) -> Result<EventDescriptor, DomainError> {
        let id = RoundId::try_new(self.race_number)?;
        let coordinates = Coordinates::try_new(self.latitude, self.longitude)?;
        let starts_at = parse_timestamp(&self.race_date_time)?;
        let event = EventDescriptor::new(
            id,
            self.race_name.clone(),
            self.location.clone(),
            coordinates,
            starts_at,
        );
        Ok(match self.status {
            Some(status) => event.with_status(status),
            None => event,
        })
    }
}

impl From<&EventDescriptor> for RaceConfigDto {
    fn from(event: &EventDescriptor) -> Self {
        Self {
            race_number: event.id().get(),
            race_name: event.name().to_string(),
            location: event.location().to_string(),
            latitude: event.coordinates().latitude(),
            longitude: event.coordinates().longitude(),
            race_date_time: event.starts_at().format("%Y-%m-%d %H:%M:%S").to_string(),
            status: Some(event.status()),
        }
    }
}

/// A percentage that some servers send as a string (`"87.3"`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PercentDto {
    Number(f64),
    Text(String),
}

impl PercentDto {
    fn value(&self) -> Result<f64, String> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Text(text) => text
                .trim()
                .trim_end_matches('%')
                .parse()
                .map_err(|_| format!("'{text}' is not a percentage")),
        }
    }
}

/// One row of a prediction list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionDto {
    pub driver: String,
    #[serde(default)]
    pub team: String,
    /// Missing on the live endpoint; the predicted slot stands in.
    #[serde(default)]
    pub qualifying_pos: Option<u32>,
    pub predicted_pos: u32,
    #[serde(default)]
    pub confidence: Option<PercentDto>,
    #[serde(default)]
    pub win_probability: Option<PercentDto>,
}

impl PredictionDto {
    fn to_prediction(&self) -> Result<Prediction, String> {
        let percent = |value: &Option<PercentDto>| -> Result<f64, String> {
            value.as_ref().map_or(Ok(0.0), PercentDto::value)
        };
        Prediction::try_new(
            self.driver.as_str(),
            self.team.as_str(),
            self.qualifying_pos.unwrap_or(self.predicted_pos),
            self.predicted_pos,
            percent(&self.confidence)?,
            percent(&self.win_probability)?,
        )
        .map_err(|err| err.to_string())
    }
}

/// Validate a list of wire predictions as one set.
pub fn to_prediction_set(entries: &[PredictionDto]) -> Result<PredictionSet, String> {
    let predictions = entries
        .iter()
        .map(PredictionDto::to_prediction)
        .collect::<Result<Vec<_>, _>>()?;
    PredictionSet::try_new(predictions).map_err(|err| err.to_string())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionEstablishedDto {
    #[serde(default)]
    message: String,
    #[serde(default)]
    current_config: Option<RaceConfigDto>,
}

#[derive(Debug, Deserialize)]
struct RaceStatusDto {
    status: RaceStatus,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RaceProgressionDto {
    new_race: RaceConfigDto,
}

#[derive(Debug, Deserialize)]
struct PredictionsUpdateDto {
    predictions: Vec<PredictionDto>,
    #[serde(default)]
    timestamp: Option<String>,
}

/// Keepalive probe. Carries both tag keys so either server flavour answers.
#[derive(Debug, Serialize)]
pub struct KeepaliveDto {
    #[serde(rename = "type")]
    msg_type: &'static str,
    kind: &'static str,
}

impl Default for KeepaliveDto {
    fn default() -> Self {
        Self {
            msg_type: "ping",
            kind: "ping",
        }
    }
}

/// Decode one text frame.
///
/// Never fails: undecodable input becomes [`ChannelFrame::Malformed`] and
/// unknown kinds become [`ChannelFrame::Ignored`].
#[must_use]
pub fn decode_frame(text: &str) -> ChannelFrame {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => return malformed(err),
    };

    let Some(kind) = message_kind(&value) else {
        return ChannelFrame::Malformed {
            reason: "message has no type".into(),
        };
    };

    match kind.as_str() {
        "connection_established" => parse::<ConnectionEstablishedDto>(value, |dto| {
            let current_event = dto
                .current_config
                .map(|config| config.to_event())
                .transpose()
                .map_err(|err| err.to_string())?;
            Ok(PushMessage::ConnectionEstablished {
                message: dto.message,
                current_event,
            })
        }),
        "race_status" => parse::<RaceStatusDto>(value, |dto| {
            Ok(PushMessage::StatusChanged {
                status: dto.status,
                message: dto.message,
            })
        }),
        "race_progression" => parse::<RaceProgressionDto>(value, |dto| {
            let new_event = dto.new_race.to_event().map_err(|err| err.to_string())?;
            Ok(PushMessage::EventAdvanced { new_event })
        }),
        "predictions_update" => parse::<PredictionsUpdateDto>(value, |dto| {
            let predictions = to_prediction_set(&dto.predictions)?;
            let timestamp = dto.timestamp.as_deref().and_then(parse_optional_timestamp);
            Ok(PushMessage::PredictionsUpdated {
                predictions,
                timestamp,
            })
        }),
        "countdown" => ChannelFrame::Message(PushMessage::Countdown),
        "pong" => ChannelFrame::Message(PushMessage::KeepaliveAck),
        _ => ChannelFrame::Ignored { kind },
    }
}

fn message_kind(value: &Value) -> Option<String> {
    ["type", "kind"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

fn parse<T>(value: Value, convert: impl FnOnce(T) -> Result<PushMessage, String>) -> ChannelFrame
where
    T: serde::de::DeserializeOwned,
{
    match serde_json::from_value::<T>(value) {
        Ok(dto) => match convert(dto) {
            Ok(message) => ChannelFrame::Message(message),
            Err(reason) => ChannelFrame::Malformed { reason },
        },
        Err(err) => malformed(err),
    }
}

fn malformed(err: serde_json::Error) -> ChannelFrame {
    ChannelFrame::Malformed {
        reason: err.to_string(),
    }
}

/// A server timestamp we can't read is treated as absent.
fn parse_optional_timestamp(text: &str) -> Option<DateTime<Utc>> {
    parse_timestamp(text).ok()
}

/// HTTP replies are either the payload or `{"error": "..."}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ServerReply<T> {
    Failure { error: String },
    Success(T),
}

/// One lap record. Fields follow the timing library's column names.
#[derive(Debug, Clone, Deserialize)]
pub struct LapRecordDto {
    #[serde(rename = "LapNumber", default)]
    pub lap_number: Option<f64>,
    #[serde(rename = "Driver", default)]
    pub driver: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LapsDto {
    #[serde(default)]
    pub laps: Vec<LapRecordDto>,
}

impl LapsDto {
    #[must_use]
    pub fn summary(&self) -> LapSummary {
        let leader_lap = self
            .laps
            .iter()
            .filter_map(|lap| lap.lap_number)
            .filter(|lap| lap.is_finite() && *lap >= 0.0)
            .map(|lap| lap as u32)
            .max();
        LapSummary {
            lap_count: u32::try_from(self.laps.len()).unwrap_or(u32::MAX),
            leader_lap,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LivePredictionsDto {
    #[serde(default)]
    pub predictions: Vec<PredictionDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatusDto {
    pub status: String,
    #[serde(default)]
    pub active_connections: Option<u32>,
}

/// Session selection as the server accepts it.
#[derive(Debug, Serialize)]
pub struct SessionDto {
    pub year: u16,
    pub round: u32,
    pub session: &'static str,
}

impl From<&SessionKey> for SessionDto {
    fn from(key: &SessionKey) -> Self {
        Self {
            year: key.season,
            round: key.round.get(),
            session: key.kind.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: &str) -> PushMessage {
        match decode_frame(text) {
            ChannelFrame::Message(message) => message,
            other => panic!("expected a message, got {other:?}"),
        }
    }

    #[test]
    fn decodes_status_change() {
        let decoded = message(r#"{"type":"race_status","status":"live","message":"Go"}"#);
        assert_eq!(
            decoded,
            PushMessage::StatusChanged {
                status: RaceStatus::Live,
                message: Some("Go".into())
            }
        );
    }

    #[test]
    fn kind_key_is_accepted() {
        assert_eq!(message(r#"{"kind":"pong"}"#), PushMessage::KeepaliveAck);
    }

    #[test]
    fn decodes_progression_into_event() {
        let decoded = message(
            r#"{"type":"race_progression","new_race":{"raceNumber":10,
            "raceName":"Spanish Grand Prix","location":"Barcelona","latitude":41.57,
            "longitude":2.2611,"raceDateTime":"2025-06-22 14:00:00","status":"upcoming"}}"#,
        );
        let PushMessage::EventAdvanced { new_event } = decoded else {
            panic!("expected EventAdvanced");
        };
        assert_eq!(new_event.id().get(), 10);
        assert_eq!(new_event.location(), "Barcelona");
        assert_eq!(
            new_event.starts_at().to_rfc3339(),
            "2025-06-22T14:00:00+00:00"
        );
    }

    #[test]
    fn greeting_carries_current_config() {
        let decoded = message(
            r#"{"type":"connection_established","message":"hi","currentConfig":{"raceNumber":9,
            "raceName":"Canadian Grand Prix","location":"Montreal","latitude":45.5,
            "longitude":-73.55,"raceDateTime":"2025-06-15 14:00:00","status":"upcoming"},
            "timeUntilRace":"1d"}"#,
        );
        let PushMessage::ConnectionEstablished { current_event, .. } = decoded else {
            panic!("expected ConnectionEstablished");
        };
        assert_eq!(current_event.map(|event| event.id().get()), Some(9));
    }

    #[test]
    fn predictions_accept_string_percentages() {
        let decoded = message(
            r#"{"type":"predictions_update","timestamp":"2025-06-15T14:30:00",
            "predictions":[
              {"driver":"NOR","team":"McLaren","qualifyingPos":2,"predictedPos":2,
               "confidence":"71.0","winProbability":"30.5"},
              {"driver":"VER","team":"Red Bull","qualifyingPos":1,"predictedPos":1,
               "confidence":87.3,"winProbability":45}]}"#,
        );
        let PushMessage::PredictionsUpdated {
            predictions,
            timestamp,
        } = decoded
        else {
            panic!("expected PredictionsUpdated");
        };
        assert_eq!(predictions.len(), 2);
        let leader = predictions.leader().unwrap();
        assert_eq!(leader.driver().as_str(), "VER");
        assert_eq!(leader.confidence(), 87.3);
        assert_eq!(predictions.entries()[1].win_probability(), 30.5);
        assert!(timestamp.is_some());
    }

    #[test]
    fn invalid_prediction_set_is_malformed() {
        let frame = decode_frame(
            r#"{"type":"predictions_update","predictions":[
              {"driver":"VER","predictedPos":1},{"driver":"NOR","predictedPos":1}]}"#,
        );
        assert!(matches!(frame, ChannelFrame::Malformed { .. }));
    }

    #[test]
    fn unknown_kind_is_ignored() {
        assert_eq!(
            decode_frame(r#"{"type":"live_laps_update","laps":[]}"#),
            ChannelFrame::Ignored {
                kind: "live_laps_update".into()
            }
        );
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(decode_frame("not json"), ChannelFrame::Malformed { .. }));
        assert!(matches!(decode_frame(r#"{"status":"live"}"#), ChannelFrame::Malformed { .. }));
        assert!(matches!(
            decode_frame(r#"{"type":"race_status","status":"paused"}"#),
            ChannelFrame::Malformed { .. }
        ));
    }

    #[test]
    fn keepalive_carries_both_tags() {
        let json = serde_json::to_string(&KeepaliveDto::default()).unwrap();
        assert_eq!(json, r#"{"type":"ping","kind":"ping"}"#);
    }

    #[test]
    fn race_config_round_trips_through_descriptor() {
        let dto = RaceConfigDto {
            race_number: 9,
            race_name: "Canadian Grand Prix".into(),
            location: "Montreal".into(),
            latitude: 45.5048,
            longitude: -73.5522,
            race_date_time: "2025-06-15 14:00:00".into(),
            status: None,
        };
        let event = dto.to_event().unwrap();
        let back = RaceConfigDto::from(&event);
        assert_eq!(back.race_date_time, dto.race_date_time);
        assert_eq!(back.status, Some(RaceStatus::Upcoming));
    }

    #[test]
    fn error_payload_is_a_failure() {
        let reply: ServerReply<LapsDto> =
            serde_json::from_str(r#"{"error":"No session loaded"}"#).unwrap();
        assert!(matches!(reply, ServerReply::Failure { error } if error == "No session loaded"));
    }

    #[test]
    fn lap_summary_counts_records_and_max_lap() {
        let reply: ServerReply<LapsDto> = serde_json::from_str(
            r#"{"laps":[{"LapNumber":1.0,"Driver":"VER"},{"LapNumber":2.0,"Driver":"VER"},
            {"LapNumber":null,"Driver":"NOR"}]}"#,
        )
        .unwrap();
        let ServerReply::Success(laps) = reply else {
            panic!("expected laps");
        };
        assert_eq!(
            laps.summary(),
            LapSummary {
                lap_count: 3,
                leader_lap: Some(2)
            }
        );
    }
}

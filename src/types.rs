use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// Inbound body: { "data": <feature payload> }. `data` stays untyped so
// malformed payloads are forwarded unchanged; a missing key becomes null.
#[derive(Debug, Clone, Default)]
pub struct RelayRequest {
    pub data: Value,
}

// Only a JSON object is a request; the derived impl would also take `[data]`.
impl<'de> Deserialize<'de> for RelayRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut body = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self {
            data: body.remove("data").unwrap_or(Value::Null),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ResponseBody", from = "ResponseBody")]
pub enum RelayResponse {
    Success {
        prediction: Value,
    },
    Failure {
        error: String,
        /// Upstream HTTP status when the failure came from upstream. Not serialized;
        /// the wire carries it as the response status instead.
        status: Option<u16>,
        message: Option<String>,
        details: Option<String>,
    },
}

impl RelayResponse {
    pub fn success(prediction: Value) -> Self {
        RelayResponse::Success { prediction }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RelayResponse::Success { .. })
    }

    pub fn prediction(&self) -> Option<&Value> {
        match self {
            RelayResponse::Success { prediction } => Some(prediction),
            RelayResponse::Failure { .. } => None,
        }
    }
}

// Wire shape shared by both variants.
#[derive(Serialize, Deserialize)]
struct ResponseBody {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prediction: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl From<RelayResponse> for ResponseBody {
    fn from(response: RelayResponse) -> Self {
        match response {
            RelayResponse::Success { prediction } => ResponseBody {
                success: true,
                prediction: Some(prediction),
                error: None,
                message: None,
                details: None,
            },
            RelayResponse::Failure {
                error,
                message,
                details,
                ..
            } => ResponseBody {
                success: false,
                prediction: None,
                error: Some(error),
                message,
                details,
            },
        }
    }
}

impl From<ResponseBody> for RelayResponse {
    fn from(body: ResponseBody) -> Self {
        if body.success {
            RelayResponse::Success {
                prediction: body.prediction.unwrap_or(Value::Null),
            }
        } else {
            RelayResponse::Failure {
                error: body.error.unwrap_or_default(),
                status: None,
                message: body.message,
                details: body.details,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_wire_shape() {
        let response = RelayResponse::success(json!({ "predicted_power_kw": 2.34 }));
        let wire = serde_json::to_value(&response).unwrap();
        assert_eq!(
            wire,
            json!({ "success": true, "prediction": { "predicted_power_kw": 2.34 } })
        );
    }

    #[test]
    fn upstream_failure_omits_message() {
        let response = RelayResponse::Failure {
            error: "API Gateway error (503)".to_string(),
            status: Some(503),
            message: None,
            details: Some("Service Unavailable".to_string()),
        };
        let wire = serde_json::to_value(&response).unwrap();
        assert_eq!(
            wire,
            json!({
                "success": false,
                "error": "API Gateway error (503)",
                "details": "Service Unavailable"
            })
        );
    }

    #[test]
    fn failure_body_parses_back() {
        let wire = r#"{"success":false,"error":"Prediction failed","message":"boom","details":"TransportError: boom"}"#;
        let response: RelayResponse = serde_json::from_str(wire).unwrap();
        assert!(!response.is_success());
        assert_eq!(response.prediction(), None);
        assert!(matches!(
            response,
            RelayResponse::Failure { ref error, status: None, .. } if error == "Prediction failed"
        ));

        let ok: RelayResponse = serde_json::from_str(r#"{"success":true,"prediction":[2.34]}"#).unwrap();
        assert!(ok.is_success());
        assert_eq!(ok.prediction(), Some(&json!([2.34])));
    }

    #[test]
    fn missing_data_key_becomes_null() {
        let request: RelayRequest = serde_json::from_str(r#"{"other": 1}"#).unwrap();
        assert_eq!(request.data, Value::Null);
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        for body in ["[5]", "5", "\"data\"", "null"] {
            assert!(
                serde_json::from_str::<RelayRequest>(body).is_err(),
                "{body} should not parse as a request"
            );
        }

        let request: RelayRequest = serde_json::from_str(r#"{"data":[5]}"#).unwrap();
        assert_eq!(request.data, json!([5]));
    }
}

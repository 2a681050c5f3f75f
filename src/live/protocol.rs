//! JSON envelopes exchanged with the live classroom socket.
//!
//! Every frame is `{"type": ..., "payload": ...}`. Inbound frames carry a pushed
//! activity; outbound frames carry a student response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A teacher-pushed activity. Replaces whatever was shown before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activity {
    Quiz {
        text: String,
        options: Vec<String>,
    },
    Poll {
        text: String,
        options: Vec<String>,
    },
    Material {
        title: String,
        content: Option<String>,
        url: Option<String>,
    },
}

impl Activity {
    pub fn options(&self) -> &[String] {
        match self {
            Activity::Quiz { options, .. } | Activity::Poll { options, .. } => options,
            Activity::Material { .. } => &[],
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Debug, Deserialize)]
struct ChoicePayload {
    #[serde(alias = "question")]
    text: String,
    #[serde(default)]
    options: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MaterialPayload {
    #[serde(alias = "text")]
    title: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Why an inbound frame did not produce an activity.
#[derive(Debug, PartialEq, Eq)]
pub enum ParseOutcome {
    Activity(Activity),
    /// Well-formed envelope with a type this client does not handle
    Ignored(String),
}

/// Parse one inbound text frame.
pub fn parse_inbound(text: &str) -> serde_json::Result<ParseOutcome> {
    let envelope: Envelope = serde_json::from_str(text)?;
    let activity = match envelope.kind.as_str() {
        "PUSH_QUIZ" => {
            let p: ChoicePayload = serde_json::from_value(envelope.payload)?;
            Activity::Quiz {
                text: p.text,
                options: p.options,
            }
        }
        "PUSH_POLL" => {
            let p: ChoicePayload = serde_json::from_value(envelope.payload)?;
            Activity::Poll {
                text: p.text,
                options: p.options,
            }
        }
        "PUSH_MATERIAL" => {
            let p: MaterialPayload = serde_json::from_value(envelope.payload)?;
            Activity::Material {
                title: p.title,
                content: p.content,
                url: p.url,
            }
        }
        _ => return Ok(ParseOutcome::Ignored(envelope.kind)),
    };
    Ok(ParseOutcome::Activity(activity))
}

/// Student responses relayed back to the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outbound {
    SubmitAnswer { answer: String },
    SubmitPoll { option: String },
    RaiseHand { student_id: String },
}

impl Outbound {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_quiz() {
        let outcome = parse_inbound(
            r#"{"type":"PUSH_QUIZ","payload":{"text":"2+2?","options":["3","4","5"]}}"#,
        )
        .unwrap();

        assert_eq!(
            outcome,
            ParseOutcome::Activity(Activity::Quiz {
                text: "2+2?".to_string(),
                options: vec!["3".to_string(), "4".to_string(), "5".to_string()],
            })
        );
    }

    #[test]
    fn test_push_poll_accepts_question_alias() {
        let outcome = parse_inbound(
            r#"{"type":"PUSH_POLL","payload":{"question":"Pace ok?","options":["Yes","No"]}}"#,
        )
        .unwrap();

        match outcome {
            ParseOutcome::Activity(Activity::Poll { text, options }) => {
                assert_eq!(text, "Pace ok?");
                assert_eq!(options.len(), 2);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_push_material_optional_fields() {
        let outcome =
            parse_inbound(r#"{"type":"PUSH_MATERIAL","payload":{"title":"Fractions"}}"#).unwrap();

        let ParseOutcome::Activity(activity) = outcome else {
            panic!("expected activity");
        };
        assert_eq!(
            activity,
            Activity::Material {
                title: "Fractions".to_string(),
                content: None,
                url: None,
            }
        );
        assert!(activity.options().is_empty());
    }

    #[test]
    fn test_unknown_type_is_ignored() {
        let outcome = parse_inbound(r#"{"type":"STUDENT_JOINED","payload":{"id":3}}"#).unwrap();
        assert_eq!(outcome, ParseOutcome::Ignored("STUDENT_JOINED".to_string()));
    }

    #[test]
    fn test_malformed_frames_are_errors() {
        assert!(parse_inbound("not json").is_err());
        assert!(parse_inbound(r#"{"payload":{}}"#).is_err());
        assert!(parse_inbound(r#"{"type":"PUSH_QUIZ","payload":{"options":[]}}"#).is_err());
    }

    #[test]
    fn test_outbound_envelopes() {
        let answer = Outbound::SubmitAnswer {
            answer: "4".to_string(),
        };
        let poll = Outbound::SubmitPoll {
            option: "Yes".to_string(),
        };
        let hand = Outbound::RaiseHand {
            student_id: "17".to_string(),
        };

        let as_value = |o: &Outbound| serde_json::from_str::<Value>(&o.to_json().unwrap()).unwrap();
        assert_eq!(
            as_value(&answer),
            json!({"type": "SUBMIT_ANSWER", "payload": {"answer": "4"}})
        );
        assert_eq!(
            as_value(&poll),
            json!({"type": "SUBMIT_POLL", "payload": {"option": "Yes"}})
        );
        assert_eq!(
            as_value(&hand),
            json!({"type": "RAISE_HAND", "payload": {"student_id": "17"}})
        );
    }
}

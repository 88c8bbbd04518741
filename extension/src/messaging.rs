// Runtime message channel
// Any inbound message gets an immediate acknowledgement; payloads are not interpreted yet

use serde::Serialize;
use serde_json::Value;

pub const ACK_STATUS: &str = "received";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acknowledgement {
    pub status: &'static str,
}

/// Build the response for an inbound `chrome.runtime.onMessage` message
pub fn acknowledge(message: &Value) -> Acknowledgement {
    log::debug!("Received runtime message: {}", message);
    Acknowledgement {
        status: ACK_STATUS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_any_message_is_acknowledged() {
        for message in [json!(null), json!("ping"), json!({ "type": "whatever", "n": 1 })] {
            let ack = acknowledge(&message);
            assert_eq!(serde_json::to_value(&ack).unwrap(), json!({ "status": "received" }));
        }
    }
}

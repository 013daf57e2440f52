use serde::Serialize;

#[derive(Serialize)]
struct Message<'a> {
    message: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub reason: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    pub fn json_message(status: u16, reason: &'static str, message: &str) -> Self {
        let body = serde_json::to_string(&Message { message })
            .unwrap_or_else(|_| String::from("{}"));
        Response {
            status,
            reason,
            content_type: "application/json",
            body,
        }
    }

    pub fn ok() -> Self {
        Self::json_message(200, "OK", "Ok!")
    }

    pub fn bad_request() -> Self {
        Self::json_message(400, "Bad Request", "Malformed request.")
    }

    pub fn forbidden() -> Self {
        Self::json_message(
            403,
            "Forbidden",
            "You do not have permission to access this resource.",
        )
    }

    pub fn not_found() -> Self {
        Self::json_message(404, "Not Found", "The requested resource was not found.")
    }

    pub fn file(content_type: &'static str, body: String) -> Self {
        Response {
            status: 200,
            reason: "OK",
            content_type,
            body,
        }
    }

    /// Serializes the response, headers included. The connection is always closed afterwards.
    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status,
            self.reason,
            self.content_type,
            self.body.len(),
            self.body
        )
        .into_bytes()
    }
}

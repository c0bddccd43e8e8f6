use thiserror::Error;

/// Non-success responses from the CRM backend
#[derive(Error, Debug)]
pub enum ApiError {
  #[error("Unauthorized - check CRMVIEW_TOKEN")]
  Unauthorized,

  #[error("Access denied: {0}")]
  Forbidden(String),

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Server error ({status}): {body}")]
  Server { status: u16, body: String },

  #[error("Unexpected status {status}: {body}")]
  Unexpected { status: u16, body: String },
}

/// Error bodies are cut to this many bytes
const MAX_ERROR_BODY_LENGTH: usize = 500;

fn truncate_body(body: &str) -> String {
  if body.len() <= MAX_ERROR_BODY_LENGTH {
    return body.to_string();
  }
  let mut end = MAX_ERROR_BODY_LENGTH;
  while !body.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}... ({} bytes total)", &body[..end], body.len())
}

impl ApiError {
  pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
    let body = truncate_body(body);
    match status.as_u16() {
      401 => ApiError::Unauthorized,
      403 => ApiError::Forbidden(body),
      404 => ApiError::NotFound(body),
      code @ 500..=599 => ApiError::Server { status: code, body },
      code => ApiError::Unexpected { status: code, body },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use reqwest::StatusCode;

  #[test]
  fn test_status_mapping() {
    assert!(matches!(
      ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
      ApiError::Unauthorized
    ));
    assert!(matches!(
      ApiError::from_status(StatusCode::NOT_FOUND, "no lead"),
      ApiError::NotFound(body) if body == "no lead"
    ));
    assert!(matches!(
      ApiError::from_status(StatusCode::BAD_GATEWAY, ""),
      ApiError::Server { status: 502, .. }
    ));
  }

  #[test]
  fn test_long_body_truncated() {
    let body = "é".repeat(400);
    let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
    let ApiError::Server { body: kept, .. } = err else {
      panic!("expected server error");
    };
    assert!(kept.ends_with("(800 bytes total)"));
    assert!(kept.len() < 540);
  }
}

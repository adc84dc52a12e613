use campus_types::AuthRejection;

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched exactly and there must be exactly one token after
/// it.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, AuthRejection> {
    let header = header.ok_or(AuthRejection::Missing)?;
    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(token),
        _ => Err(AuthRejection::Malformed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(parse_bearer(Some("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
    }

    #[test]
    fn missing_and_malformed_are_distinguished() {
        assert_eq!(parse_bearer(None), Err(AuthRejection::Missing));
        assert_eq!(parse_bearer(Some("abc")), Err(AuthRejection::Malformed));
        assert_eq!(parse_bearer(Some("Basic abc")), Err(AuthRejection::Malformed));
        assert_eq!(parse_bearer(Some("Bearer a b")), Err(AuthRejection::Malformed));
        assert_eq!(parse_bearer(Some("Bearer")), Err(AuthRejection::Malformed));
    }
}

use thiserror::Error;

/// Everything that can go wrong between requesting the feed and getting a
/// usable arrival list out of it. The refresh loop downgrades all of these
/// to an error string on the snapshot; none of them is fatal.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("feed returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("feed decode failed: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("feed read failed: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_names_the_code() {
        let err = FeedError::Status(reqwest::StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "feed returned HTTP 502 Bad Gateway");
    }

    #[test]
    fn test_decode_error_converts_from_prost() {
        let bad: &[u8] = &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        let decode_err =
            <crate::gtfs_rt::FeedMessage as prost::Message>::decode(bad).unwrap_err();
        let err: FeedError = decode_err.into();
        assert!(matches!(err, FeedError::Decode(_)));
        assert!(err.to_string().starts_with("feed decode failed"));
    }

    #[test]
    fn test_io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such feed file");
        let err: FeedError = io_err.into();
        assert!(matches!(err, FeedError::Io(_)));
        assert!(err.to_string().contains("no such feed file"));
    }
}

use std::env;
use std::sync::OnceLock;

static GRAPHRT_HOST_MEMORY_LIMIT: OnceLock<Option<usize>> = OnceLock::new();

fn parse_bytes(value: &str) -> Option<usize> {
    let normalized = value.trim().to_ascii_lowercase();
    let (digits, scale) = if let Some(rest) = normalized.strip_suffix('k') {
        (rest, 1usize << 10)
    } else if let Some(rest) = normalized.strip_suffix('m') {
        (rest, 1usize << 20)
    } else if let Some(rest) = normalized.strip_suffix('g') {
        (rest, 1usize << 30)
    } else {
        (normalized.as_str(), 1)
    };
    digits.trim().parse::<usize>().ok()?.checked_mul(scale)
}

/// Byte budget for the default host allocator, unlimited when unset or unparsable.
pub(crate) fn host_memory_limit() -> Option<usize> {
    *GRAPHRT_HOST_MEMORY_LIMIT.get_or_init(|| match env::var("GRAPHRT_HOST_MEMORY_LIMIT") {
        Ok(value) if !value.trim().is_empty() => {
            let parsed = parse_bytes(&value);
            if parsed.is_none() {
                tracing::warn!("ignoring unparsable GRAPHRT_HOST_MEMORY_LIMIT={value:?}");
            }
            parsed
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::parse_bytes;

    #[test]
    fn parses_plain_and_suffixed_sizes() {
        assert_eq!(parse_bytes("4096"), Some(4096));
        assert_eq!(parse_bytes(" 2k "), Some(2048));
        assert_eq!(parse_bytes("3M"), Some(3 << 20));
        assert_eq!(parse_bytes("1g"), Some(1 << 30));
        assert_eq!(parse_bytes("lots"), None);
    }
}

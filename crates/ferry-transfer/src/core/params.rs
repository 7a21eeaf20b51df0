use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything but the RFC 3986 unreserved characters.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Encode parameters as `key=value` pairs joined by `&`.
///
/// Every value of a key produces its own pair, in the order given. With
/// `encode` set, keys and values are percent-encoded; otherwise they are
/// written verbatim.
///
/// # Examples
///
/// ```
/// use ferry_transfer::core::encode_params;
///
/// let params = vec![
///     ("q".to_string(), vec!["a b".to_string()]),
///     ("tag".to_string(), vec!["x".to_string(), "y".to_string()]),
/// ];
/// assert_eq!(encode_params(&params, true), "q=a%20b&tag=x&tag=y");
/// assert_eq!(encode_params(&params, false), "q=a b&tag=x&tag=y");
/// ```
pub fn encode_params(params: &[(String, Vec<String>)], encode: bool) -> String {
    let mut pairs = Vec::new();
    for (key, values) in params {
        for value in values {
            if encode {
                pairs.push(format!(
                    "{}={}",
                    utf8_percent_encode(key, COMPONENT),
                    utf8_percent_encode(value, COMPONENT)
                ));
            } else {
                pairs.push(format!("{key}={value}"));
            }
        }
    }
    pairs.join("&")
}

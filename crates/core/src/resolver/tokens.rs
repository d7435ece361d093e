// Name-token substitution and path-segment helpers
// Placeholders have the form %TOKEN% and are bound from a location's token
// map; derived path kinds are produced by stripping trailing segments.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Result, SchemaError};
use crate::model::location::Location;

/// Placeholder pattern for name tokens: %TOKEN%
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%([A-Za-z0-9_]+)%").expect("invalid token regex"));

/// Extract all token names appearing in a templated path.
pub fn path_tokens(path: &str) -> Vec<String> {
    TOKEN_PATTERN
        .captures_iter(path)
        .map(|capture| capture[1].to_string())
        .collect()
}

/// Substitute every `%TOKEN%` placeholder in `path` from the location's token
/// map.
///
/// A placeholder with no bound token is fatal on any non-terminal segment.
/// On the terminal segment it is fatal only when `require_complete` is set
/// (the path kind needs a fully concrete result); otherwise the placeholder
/// is left in place.
pub fn replace_path_tokens(
    location: &Location,
    path: &str,
    require_complete: bool,
) -> Result<String> {
    let segments: Vec<&str> = path.split('/').collect();
    let last_index = segments.len() - 1;
    let mut result = Vec::with_capacity(segments.len());

    for (index, segment) in segments.iter().enumerate() {
        let mut resolved = segment.to_string();
        for token in path_tokens(segment) {
            match location.name_for_token(&token) {
                Some(name) => {
                    resolved = resolved.replace(&format!("%{token}%"), name);
                }
                None if index == last_index && !require_complete => {}
                None => {
                    return Err(SchemaError::MissingNameToken {
                        location: location.folder_path(),
                        token,
                    });
                }
            }
        }
        result.push(resolved);
    }

    Ok(result.join("/"))
}

/// Drop `count` trailing segments from a slash-delimited path, never
/// stripping past the root.
pub fn strip_trailing_segments(path: &str, count: usize) -> String {
    let mut remaining = path.trim_end_matches('/');
    for _ in 0..count {
        match remaining.rfind('/') {
            Some(0) | None => return "/".to_string(),
            Some(index) => remaining = &remaining[..index],
        }
    }
    if remaining.is_empty() {
        "/".to_string()
    } else {
        remaining.to_string()
    }
}

/// Number of times a `%TOKEN%` placeholder occurs in a path.
pub fn count_token_occurrences(placeholder: &str, path: &str) -> usize {
    path.matches(placeholder).count()
}

/// Resolve a single value that may be a `%TOKEN%` placeholder; a bare value
/// passes through unchanged.
pub fn token_value(location: &Location, value: &str) -> Result<String> {
    if let Some(token) = whole_value_token(value) {
        match location.name_for_token(token) {
            Some(name) => Ok(name.to_string()),
            None => Err(SchemaError::MissingNameToken {
                location: location.folder_path(),
                token: token.to_string(),
            }),
        }
    } else {
        Ok(value.to_string())
    }
}

/// The token name when `value` is exactly one `%TOKEN%` placeholder.
pub fn whole_value_token(value: &str) -> Option<&str> {
    if value.len() > 2 && value.starts_with('%') && value.ends_with('%') {
        let inner = &value[1..value.len() - 1];
        if !inner.contains('%') {
            return Some(inner);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location_with_tokens(tokens: &[(&str, &str)]) -> Location {
        let mut location = Location::from_folders(["Server"]);
        for (token, name) in tokens {
            location.add_name_token(*token, *name);
        }
        location
    }

    #[test]
    fn replaces_all_bound_tokens() {
        let location = location_with_tokens(&[("SERVER", "admin"), ("CHANNEL", "default")]);
        let path =
            replace_path_tokens(&location, "/Server/%SERVER%/Channel/%CHANNEL%", true).unwrap();
        assert_eq!(path, "/Server/admin/Channel/default");
        assert!(path_tokens(&path).is_empty());
    }

    #[test]
    fn missing_non_terminal_token_is_fatal() {
        let location = location_with_tokens(&[]);
        let error =
            replace_path_tokens(&location, "/Server/%SERVER%/Channel/%CHANNEL%", false).unwrap_err();
        assert!(matches!(
            error,
            SchemaError::MissingNameToken { ref token, .. } if token == "SERVER"
        ));
    }

    #[test]
    fn missing_terminal_token_depends_on_completeness() {
        let location = location_with_tokens(&[("SERVER", "admin")]);
        let partial =
            replace_path_tokens(&location, "/Server/%SERVER%/Channel/%CHANNEL%", false).unwrap();
        assert_eq!(partial, "/Server/admin/Channel/%CHANNEL%");

        assert!(
            replace_path_tokens(&location, "/Server/%SERVER%/Channel/%CHANNEL%", true).is_err()
        );
    }

    #[test]
    fn strip_trailing_segments_is_associative() {
        let path = "/A/B/%TOK%/C/%TOK2%";
        let once_then_twice = strip_trailing_segments(&strip_trailing_segments(path, 1), 2);
        assert_eq!(once_then_twice, strip_trailing_segments(path, 3));
        assert_eq!(strip_trailing_segments(path, 1), "/A/B/%TOK%/C");
        assert_eq!(strip_trailing_segments(path, 2), "/A/B/%TOK%");
    }

    #[test]
    fn strip_never_goes_past_root() {
        assert_eq!(strip_trailing_segments("/A", 1), "/");
        assert_eq!(strip_trailing_segments("/A/B", 5), "/");
        assert_eq!(strip_trailing_segments("/", 1), "/");
    }

    #[test]
    fn whole_value_tokens_resolve_via_location() {
        let location = location_with_tokens(&[("SERVER", "admin")]);
        assert_eq!(token_value(&location, "%SERVER%").unwrap(), "admin");
        assert_eq!(token_value(&location, "PlainName").unwrap(), "PlainName");
        assert!(token_value(&location, "%CLUSTER%").is_err());
        assert_eq!(whole_value_token("%SERVER%suffix"), None);
    }
}

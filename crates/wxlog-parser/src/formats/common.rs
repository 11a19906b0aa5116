use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::LineRejection;

/// Tokens a frame must carry after marker and checksum removal.
pub(crate) const FRAME_TOKENS: usize = 13;

/// Position of the reserved telemetry slot inside a full frame.
pub(crate) const RESERVED_SLOT: usize = FRAME_TOKENS - 2;

/// Positions that use signed-magnitude encoding with an explicit `+`.
pub(crate) const SIGNED_SLOTS: [usize; 2] = [5, 6];

const QUERY_MARKER: &str = "Q";
const STX: char = '\u{2}';
const ETX: char = '\u{3}';

static PREAMBLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]{3} [0-9]{2} [A-Za-z]{3} [0-9]{4} [0-9]{2}:[0-9]{2}:[0-9]{2}")
        .expect("preamble pattern is valid")
});

static CHECKSUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Fa-f]{1,2}$").expect("checksum pattern is valid"));

/// Checks the logger timestamp preamble and returns the payload that follows
/// the first comma, with leading whitespace removed.
pub(crate) fn split_payload(line: &str) -> Result<&str, LineRejection> {
    if !PREAMBLE.is_match(line) {
        return Err(LineRejection::MissingPreamble);
    }
    let (_, payload) = line
        .split_once(',')
        .ok_or(LineRejection::MissingDelimiter)?;
    Ok(payload.trim_start())
}

pub(crate) fn tokenize(payload: &str) -> Vec<String> {
    payload
        .split(',')
        .map(clean_token)
        .filter(|token| !token.is_empty())
        .collect()
}

fn clean_token(raw: &str) -> String {
    raw.replace([STX, ETX], "").trim().to_string()
}

/// Removes a leading poll marker. Returns whether one was present.
pub(crate) fn strip_query_marker(tokens: &mut Vec<String>) -> bool {
    if tokens.first().is_some_and(|first| first == QUERY_MARKER) {
        tokens.remove(0);
        true
    } else {
        false
    }
}

/// Removes a trailing one- or two-digit hex checksum. The value is never
/// validated, and a data token with the same shape is dropped as well.
pub(crate) fn strip_checksum(tokens: &mut Vec<String>) -> Option<String> {
    if tokens.last().is_some_and(|last| CHECKSUM.is_match(last)) {
        tokens.pop()
    } else {
        None
    }
}

pub(crate) fn check_arity(tokens: &[String]) -> Result<(), LineRejection> {
    if tokens.len() == FRAME_TOKENS {
        Ok(())
    } else {
        Err(LineRejection::WrongArity {
            expected: FRAME_TOKENS,
            found: tokens.len(),
        })
    }
}

/// Strips the explicit `+` from the signed slots; `-` is left for numeric
/// parsing.
pub(crate) fn normalize_signs(tokens: &mut [String]) {
    for slot in SIGNED_SLOTS {
        if let Some(token) = tokens.get_mut(slot) {
            let stripped = token.trim_start_matches('+');
            if stripped.len() != token.len() {
                *token = stripped.to_string();
            }
        }
    }
}

pub(crate) fn drop_reserved_slot(tokens: &mut Vec<String>) -> Option<String> {
    (tokens.len() == FRAME_TOKENS).then(|| tokens.remove(RESERVED_SLOT))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn payload_requires_preamble() {
        assert_eq!(
            split_payload("garbage, 1, 2"),
            Err(LineRejection::MissingPreamble)
        );
        assert_eq!(
            split_payload("Mon 1 Jan 2024 10:00:00, 1"),
            Err(LineRejection::MissingPreamble)
        );
        assert_eq!(
            split_payload("Mon 01 Jan 2024 10:00:00, Q,1"),
            Ok("Q,1")
        );
    }

    #[test]
    fn payload_requires_delimiter() {
        assert_eq!(
            split_payload("Mon 01 Jan 2024 10:00:00 banner"),
            Err(LineRejection::MissingDelimiter)
        );
    }

    #[test]
    fn tokenize_strips_control_characters_and_empties() {
        let tokens = tokenize("\u{2}Q, 1.0 ,,\u{3}, 2\u{3}\r\n");
        assert_eq!(tokens, owned(&["Q", "1.0", "2"]));
    }

    #[test]
    fn query_marker_only_removed_in_first_position() {
        let mut tokens = owned(&["Q", "1", "Q"]);
        assert!(strip_query_marker(&mut tokens));
        assert_eq!(tokens, owned(&["1", "Q"]));
        assert!(!strip_query_marker(&mut tokens));

        let mut lowercase = owned(&["q", "1"]);
        assert!(!strip_query_marker(&mut lowercase));
    }

    #[test]
    fn checksum_matches_one_or_two_hex_digits() {
        let mut tokens = owned(&["10.5", "3F"]);
        assert_eq!(strip_checksum(&mut tokens), Some("3F".to_string()));
        assert_eq!(tokens, owned(&["10.5"]));

        let mut single = owned(&["x", "a"]);
        assert_eq!(strip_checksum(&mut single), Some("a".to_string()));

        let mut three = owned(&["x", "ABC"]);
        assert_eq!(strip_checksum(&mut three), None);
        assert_eq!(three.len(), 2);

        let mut not_hex = owned(&["x", "0G"]);
        assert_eq!(strip_checksum(&mut not_hex), None);
    }

    #[test]
    fn checksum_shaped_data_is_indistinguishable() {
        let mut tokens = owned(&["1", "2", "00"]);
        assert_eq!(strip_checksum(&mut tokens), Some("00".to_string()));
        assert_eq!(tokens, owned(&["1", "2"]));
    }

    #[test]
    fn arity_is_exact() {
        assert!(check_arity(&vec![String::new(); FRAME_TOKENS]).is_ok());
        assert_eq!(
            check_arity(&vec![String::new(); FRAME_TOKENS + 1]),
            Err(LineRejection::WrongArity {
                expected: FRAME_TOKENS,
                found: FRAME_TOKENS + 1
            })
        );
    }

    #[test]
    fn signs_only_normalized_in_signed_slots() {
        let mut tokens = owned(&[
            "+1", "2", "3", "4", "5", "+21.5", "-5.0", "8", "9", "10", "t", "r", "f",
        ]);
        normalize_signs(&mut tokens);
        assert_eq!(tokens[0], "+1");
        assert_eq!(tokens[5], "21.5");
        assert_eq!(tokens[6], "-5.0");
    }

    #[test]
    fn repeated_plus_signs_are_all_stripped() {
        let mut tokens = owned(&["", "", "", "", "", "++3", "+"]);
        normalize_signs(&mut tokens);
        assert_eq!(tokens[5], "3");
        assert_eq!(tokens[6], "");
    }

    #[test]
    fn reserved_slot_is_second_to_last() {
        let mut tokens: Vec<String> = (0..FRAME_TOKENS).map(|i| i.to_string()).collect();
        assert_eq!(drop_reserved_slot(&mut tokens), Some("11".to_string()));
        assert_eq!(tokens.len(), FRAME_TOKENS - 1);
        assert_eq!(tokens.last().map(String::as_str), Some("12"));
    }
}

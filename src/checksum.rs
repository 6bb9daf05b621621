use crate::NavError;

/// XOR of every byte in `payload`
pub fn nmea_checksum(payload: &str) -> u8 {
    payload.as_bytes().iter().fold(0, |acc, &x| acc ^ x)
}

/// Verify the trailing `*hh` checksum of a raw sentence.
///
/// The checksum covers everything between the leading `$` and the `*`.
/// A line without exactly one `*` followed by two hex digits cannot be checked
/// at all and is reported as [`NavError::MalformedSentence`].
pub fn validate_checksum(sentence: &str) -> Result<(), NavError> {
    let mut parts = sentence.split('*');
    let (body, cksum) = match (parts.next(), parts.next(), parts.next()) {
        (Some(body), Some(cksum), None) => (body, cksum),
        _ => {
            return Err(NavError::MalformedSentence(format!(
                "expected one checksum delimiter in {sentence:?}"
            )))
        }
    };
    if cksum.len() != 2 || !cksum.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(NavError::MalformedSentence(format!(
            "invalid checksum field {cksum:?}"
        )));
    }
    let expected = u8::from_str_radix(cksum, 16)
        .map_err(|e| NavError::MalformedSentence(e.to_string()))?;
    let payload = body.strip_prefix('$').unwrap_or(body);
    let computed = nmea_checksum(payload);
    if computed == expected {
        Ok(())
    } else {
        Err(NavError::ChecksumMismatch { expected, computed })
    }
}

//! Splitting of the `Display text<signature>` reference shorthand.

use crate::error::IrefError;

/// A parsed reference shorthand: the text shown to the reader and the key used to match
/// references against targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedText {
    pub display: String,
    pub signature: String,
}

/// Split raw role content into `(display, signature)`.
///
/// The first `<` separates display text from the signature and a single trailing `>` is
/// stripped from the signature. Nothing is trimmed or normalized. There is no escape for `<` or
/// `>` inside the display text.
///
/// When the display text is empty (`<t1>`) the signature is used as display text.
///
/// ```
/// # use noet_iref::signature::split_signature;
/// let signed = split_signature("Alpha<shared>").unwrap();
/// assert_eq!(signed.display, "Alpha");
/// assert_eq!(signed.signature, "shared");
/// ```
pub fn split_signature(raw: &str) -> Result<SignedText, IrefError> {
    let Some(open) = raw.find('<') else {
        return Err(IrefError::MalformedReference(raw.to_string()));
    };
    let display = &raw[..open];
    let rest = &raw[open + 1..];
    let signature = rest.strip_suffix('>').unwrap_or(rest);
    let display = if display.is_empty() {
        signature
    } else {
        display
    };
    Ok(SignedText {
        display: display.to_string(),
        signature: signature.to_string(),
    })
}

/// Encode a display name in the card's cardholder-name layout.
///
/// "First Middle Last" becomes "Last<<Middle<<First". A single token is
/// returned as-is, with no separator.
pub fn encode_cardholder_name(name: &str) -> String {
    name.split_whitespace().rev().collect::<Vec<_>>().join("<<")
}
